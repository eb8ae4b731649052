/// Batch runners for the `crop` and `mask` commands
///
/// A job is validated up front (ROI, label catalog, output folders). After
/// that every image/annotation pair is processed on its own: a failure is
/// logged with the item's path and counted, and the run moves on.
use std::path::{Path, PathBuf};

use rayon::prelude::*;
#[allow(unused_imports)]
use log::{debug, info, warn, error};

use crate::catalog::LabelCatalog;
use crate::convert::{convert_polygons, mask_file_names};
use crate::errors::{LabelError, Result};
use crate::file_io::{self, ItemPair};
use crate::geometry::NormalizedBox;
use crate::labelme::LabelMeDocument;
use crate::reanchor::reanchor_boxes;
use crate::roi::Roi;
use crate::yolo;

/// Crop images to a fixed ROI and re-anchor their YOLO labels
#[derive(Debug, Clone)]
pub struct CropJob {
    pub images_dir: PathBuf,
    pub labels_dir: PathBuf,
    pub out_images_dir: PathBuf,
    pub out_labels_dir: PathBuf,
    pub roi: Roi,
    pub image_extensions: Vec<String>,
    pub parallel: bool,
}

/// Turn LabelMe polygons into per-instance masks and YOLO labels
#[derive(Debug, Clone)]
pub struct MaskJob {
    pub images_dir: PathBuf,
    pub json_dir: PathBuf,
    pub out_dir: PathBuf,
    pub catalog: LabelCatalog,
    pub image_extensions: Vec<String>,
    pub parallel: bool,
}

#[derive(Debug)]
pub struct ItemFailure {
    /// Path of the image the failure belongs to
    pub item: PathBuf,
    pub error: LabelError,
}

/// Summary of a batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Items that completed
    pub processed: usize,
    /// Boxes written across all completed items
    pub boxes_written: usize,
    pub failures: Vec<ItemFailure>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

fn matches_extension(extensions: &[String], path: &Path) -> bool {
    extensions.iter().any(|ext| file_io::has_extension(path, ext))
}

/// Process every pair, isolating failures per item.
fn run_items<F>(pairs: &[ItemPair], parallel: bool, process: F) -> BatchReport
where
    F: Fn(&ItemPair) -> Result<usize> + Sync,
{
    let outcomes: Vec<(&ItemPair, Result<usize>)> = if parallel {
        pairs.par_iter().map(|pair| (pair, process(pair))).collect()
    } else {
        pairs.iter().map(|pair| (pair, process(pair))).collect()
    };

    let mut report = BatchReport::default();
    for (pair, outcome) in outcomes {
        match outcome {
            Ok(boxes) => {
                report.processed += 1;
                report.boxes_written += boxes;
            }
            Err(e) => {
                error!("Failed to process {}: {}", pair.image.display(), error_chain(&e));
                report.failures.push(ItemFailure {
                    item: pair.image.clone(),
                    error: e,
                });
            }
        }
    }

    info!(
        "Finished: {} processed, {} failed, {} box(es) written",
        report.processed,
        report.failures.len(),
        report.boxes_written
    );
    report
}

/// Render an error with its sources, e.g. `i/o error on a.txt: No such file`
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(&format!(": {cause}"));
        source = cause.source();
    }
    message
}

pub fn run_crop(job: &CropJob) -> Result<BatchReport> {
    file_io::ensure_dir(&job.out_images_dir)?;
    file_io::ensure_dir(&job.out_labels_dir)?;

    let images = file_io::list_files(&job.images_dir, |p| matches_extension(&job.image_extensions, p))?;
    let pairs = file_io::pair_with_annotations(&images, &job.labels_dir, "txt");
    info!(
        "Cropping {} of {} image(s) in {} to ROI {}",
        pairs.len(),
        images.len(),
        job.images_dir.display(),
        job.roi
    );

    Ok(run_items(&pairs, job.parallel, |pair| crop_item(job, pair)))
}

/// Crop one image and write its re-anchored labels. Returns the number of
/// boxes kept.
pub fn crop_item(job: &CropJob, pair: &ItemPair) -> Result<usize> {
    let file_name = pair.image.file_name().ok_or_else(|| {
        LabelError::io(
            &pair.image,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
        )
    })?;

    // Labels first: a malformed label file should not leave a cropped image behind
    let boxes = yolo::read_labels(&pair.annotation)?;

    let image = image::open(&pair.image).map_err(|e| LabelError::image(&pair.image, e))?;
    let (width, height) = (image.width(), image.height());
    job.roi.check_within(width, height)?;

    let adjusted: Vec<NormalizedBox> = reanchor_boxes(&boxes, &job.roi, width, height);

    let out_image = job.out_images_dir.join(file_name);
    job.roi
        .crop(&image)
        .save(&out_image)
        .map_err(|e| LabelError::image(&out_image, e))?;

    let out_labels = job.out_labels_dir.join(format!("{}.txt", pair.stem));
    yolo::write_labels(&out_labels, &adjusted)?;

    info!(
        "Processed {} ({} of {} box(es) kept)",
        pair.image.display(),
        adjusted.len(),
        boxes.len()
    );
    Ok(adjusted.len())
}

pub fn run_mask(job: &MaskJob) -> Result<BatchReport> {
    file_io::ensure_dir(&job.out_dir)?;

    let images = file_io::list_files(&job.images_dir, |p| matches_extension(&job.image_extensions, p))?;
    let jsons = file_io::list_files(&job.json_dir, |p| file_io::has_extension(p, "json"))?;
    let pairs = file_io::pair_by_stem(&images, &jsons);
    info!(
        "Converting {} annotated image(s) with labels {:?}",
        pairs.len(),
        job.catalog.labels()
    );

    Ok(run_items(&pairs, job.parallel, |pair| mask_item(job, pair)))
}

/// Write the masks and the YOLO label file for one LabelMe document.
/// Returns the number of instances converted.
pub fn mask_item(job: &MaskJob, pair: &ItemPair) -> Result<usize> {
    let document = LabelMeDocument::from_file(&pair.annotation)?;

    // Header only, no full decode
    let (width, height) = image::image_dimensions(&pair.image).map_err(|e| LabelError::image(&pair.image, e))?;
    if let (Some(w), Some(h)) = (document.image_width, document.image_height) {
        if (w, h) != (width, height) {
            warn!(
                "{} declares {}x{} but {} is {}x{}, using the image size",
                pair.annotation.display(),
                w,
                h,
                pair.image.display(),
                width,
                height
            );
        }
    }

    let origin = pair.annotation.display().to_string();
    let instances = convert_polygons(&document.polygons(), &job.catalog, width, height, &origin)?;

    for (instance, name) in instances.iter().zip(mask_file_names(&pair.stem, &instances)) {
        let path = job.out_dir.join(name);
        instance.mask.save(&path).map_err(|e| LabelError::image(&path, e))?;
    }

    let boxes: Vec<NormalizedBox> = instances.iter().map(|instance| instance.bbox).collect();
    yolo::write_labels(&job.out_dir.join(format!("{}.txt", pair.stem)), &boxes)?;

    info!("Processed {} ({} instance(s))", pair.annotation.display(), instances.len());
    Ok(instances.len())
}
