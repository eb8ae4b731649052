//! Error types for the label transforms and the batch runner.
//!
//! Parsing and configuration problems are raised by the core transforms.
//! The remaining variants wrap collaborator failures (file system, image
//! codec, JSON) and always carry the path of the item they belong to so the
//! batch runner can report them and move on.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LabelError {
    /// A YOLO line or a LabelMe shape does not have the expected shape.
    #[error("malformed annotation in {origin}{}: {message}", line_suffix(.line))]
    MalformedAnnotation {
        /// File name or other identifier of the annotation source.
        origin: String,
        /// 1-based line number, when the source is line oriented.
        line: Option<usize>,
        message: String,
    },

    /// ROI or label catalog violates its invariants.
    #[error("configuration: {0}")]
    Configuration(String),

    #[error("i/o error on {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("image error on {}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("invalid LabelMe JSON in {}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

fn line_suffix(line: &Option<usize>) -> String {
    match line {
        Some(n) => format!(" (line {n})"),
        None => String::new(),
    }
}

impl LabelError {
    pub fn malformed(origin: impl Into<String>, line: Option<usize>, message: impl Into<String>) -> Self {
        Self::MalformedAnnotation {
            origin: origin.into(),
            line,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub fn image(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        Self::Image { path: path.into(), source }
    }

    /// True for errors that must stop a run before any item is processed.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

pub type Result<T> = std::result::Result<T, LabelError>;
