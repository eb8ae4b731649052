//! Annotation transforms for object-detection datasets.
//!
//! - [`reanchor`]: crop YOLO labels to a region of interest
//! - [`convert`]: turn LabelMe polygons into binary masks and YOLO boxes
//!
//! Both build on the coordinate helpers in [`geometry`]. [`pipeline`] runs
//! either transform over folders of images.

pub mod catalog;
pub mod convert;
pub mod errors;
pub mod file_io;
pub mod geometry;
pub mod labelme;
pub mod logging;
pub mod mask;
pub mod pipeline;
pub mod reanchor;
pub mod roi;
pub mod settings;
pub mod yolo;

pub use catalog::LabelCatalog;
pub use errors::{LabelError, Result};
pub use geometry::{AbsoluteBox, NormalizedBox, PixelBounds};
pub use labelme::Polygon;
pub use roi::Roi;
