mod build_info;

#[allow(unused_imports)]
use log::{Level, trace, debug, info, warn, error};

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use labelkit::pipeline::{self, BatchReport, CropJob, MaskJob};
use labelkit::settings::Settings;
use labelkit::{logging, LabelCatalog, LabelError, Roi};

use crate::build_info::BuildInfo;

#[derive(Parser, Debug)]
#[command(name = "labelkit", version, long_version = BuildInfo::LONG_VERSION)]
#[command(about = "Re-anchor YOLO labels to a cropped region and turn LabelMe polygons into masks")]
struct Cli {
    /// Settings file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crop images to a region of interest and re-anchor their YOLO labels
    Crop {
        /// Folder with source images
        #[arg(long)]
        images: PathBuf,
        /// Folder with YOLO .txt labels named after the images
        #[arg(long)]
        labels: PathBuf,
        /// Where cropped images are written
        #[arg(long)]
        out_images: PathBuf,
        /// Where re-anchored labels are written
        #[arg(long)]
        out_labels: PathBuf,
        /// Region of interest in pixels
        #[arg(long, num_args = 4, value_names = ["X_MIN", "Y_MIN", "X_MAX", "Y_MAX"])]
        roi: Option<Vec<u32>>,
        /// Process images one at a time
        #[arg(long)]
        sequential: bool,
    },
    /// Rasterize LabelMe polygons into masks and YOLO labels
    Mask {
        /// Folder with source images
        #[arg(long)]
        images: PathBuf,
        /// Folder with LabelMe .json files named after the images
        #[arg(long)]
        json: PathBuf,
        /// Where masks and labels are written
        #[arg(long)]
        out: PathBuf,
        /// Comma separated labels to convert; the position is the class id
        #[arg(long, value_delimiter = ',')]
        labels: Option<Vec<String>>,
        /// Process images one at a time
        #[arg(long)]
        sequential: bool,
    },
    /// Write a commented settings file
    InitConfig {
        /// Target path (defaults to the user config directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

fn resolve_roi(cli_roi: Option<Vec<u32>>, settings: &Settings) -> Result<Roi, LabelError> {
    match cli_roi {
        Some(values) => match values.as_slice() {
            &[x_min, y_min, x_max, y_max] => Roi::new(x_min, y_min, x_max, y_max),
            _ => Err(LabelError::config("--roi takes exactly four values")),
        },
        None => settings.roi.ok_or_else(|| {
            LabelError::config("no ROI given; pass --roi or set `roi` in the settings file")
        }),
    }
}

fn resolve_catalog(cli_labels: Option<Vec<String>>, settings: &Settings) -> Result<LabelCatalog, LabelError> {
    let labels = cli_labels.unwrap_or_else(|| settings.labels.clone());
    LabelCatalog::new(labels.into_iter().map(|label| label.trim().to_string()))
}

fn run(cli: Cli) -> Result<Option<BatchReport>, LabelError> {
    let settings = Settings::load(cli.config.as_deref());

    match cli.command {
        Command::Crop { images, labels, out_images, out_labels, roi, sequential } => {
            let job = CropJob {
                images_dir: images,
                labels_dir: labels,
                out_images_dir: out_images,
                out_labels_dir: out_labels,
                roi: resolve_roi(roi, &settings)?,
                image_extensions: settings.image_extensions.clone(),
                parallel: settings.parallel && !sequential,
            };
            pipeline::run_crop(&job).map(Some)
        }
        Command::Mask { images, json, out, labels, sequential } => {
            let job = MaskJob {
                images_dir: images,
                json_dir: json,
                out_dir: out,
                catalog: resolve_catalog(labels, &settings)?,
                image_extensions: settings.image_extensions.clone(),
                parallel: settings.parallel && !sequential,
            };
            pipeline::run_mask(&job).map(Some)
        }
        Command::InitConfig { path } => {
            let path = path.unwrap_or_else(Settings::settings_path);
            Settings::default().write_template(&path)?;
            println!("Wrote settings template to {}", path.display());
            Ok(None)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::setup_logger(cli.verbose);
    debug!("labelkit {}", BuildInfo::display_version());

    match run(cli) {
        Ok(Some(report)) if !report.is_success() => {
            for failure in &report.failures {
                warn!("Needs follow-up: {}", failure.item.display());
            }
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", pipeline::error_chain(&e));
            if e.is_configuration() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
