use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use log::{debug, info, warn, error};

use crate::errors::{LabelError, Result};
use crate::roi::Roi;

/// User settings shared by the `crop` and `mask` commands.
/// Command line flags take precedence over values from the settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Region of interest `[x_min, y_min, x_max, y_max]` used by `crop`
    #[serde(default)]
    pub roi: Option<Roi>,

    /// Ordered label list used by `mask`; the index is the class id
    #[serde(default)]
    pub labels: Vec<String>,

    /// Image file extensions picked up when scanning folders
    #[serde(default = "default_image_extensions")]
    pub image_extensions: Vec<String>,

    /// Process images on the rayon thread pool
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

fn default_image_extensions() -> Vec<String> {
    vec!["jpg".to_string(), "jpeg".to_string(), "png".to_string()]
}

fn default_parallel() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            roi: None,
            labels: Vec::new(),
            image_extensions: default_image_extensions(),
            parallel: default_parallel(),
        }
    }
}

impl Settings {
    /// Get the path to the settings file
    /// On macOS: ~/Library/Application Support/labelkit/settings.yaml
    /// On Linux: ~/.config/labelkit/settings.yaml
    /// On Windows: C:\Users\<user>\AppData\Roaming\labelkit\settings.yaml
    pub fn settings_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."));

        config_dir.join("labelkit").join("settings.yaml")
    }

    /// Load settings from the YAML file
    /// If custom_path is provided, uses that path; otherwise uses the default settings path
    pub fn load(custom_path: Option<&Path>) -> Self {
        let path = match custom_path {
            Some(p) => {
                info!("Using custom settings path: {}", p.display());
                p.to_path_buf()
            }
            None => Self::settings_path(),
        };

        if !path.exists() {
            info!("Settings file not found at {:?}, using defaults", path);
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(contents) => {
                match Self::from_yaml(&contents) {
                    Ok(settings) => {
                        info!("Loaded settings from {:?}", path);
                        debug!("Settings: roi={:?}, labels={:?}, extensions={:?}, parallel={}",
                            settings.roi, settings.labels, settings.image_extensions, settings.parallel);
                        settings
                    }
                    Err(e) => {
                        error!("Failed to parse settings file at {:?}: {}", path, e);
                        warn!("Using default settings");
                        Self::default()
                    }
                }
            }
            Err(e) => {
                error!("Failed to read settings file at {:?}: {}", path, e);
                warn!("Using default settings");
                Self::default()
            }
        }
    }

    pub fn from_yaml(contents: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str::<Settings>(contents)
    }

    /// Write a commented settings file. Refuses to overwrite an existing one.
    pub fn write_template(&self, path: &Path) -> Result<()> {
        if path.exists() {
            return Err(LabelError::config(format!(
                "settings file already exists at {}",
                path.display()
            )));
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| LabelError::io(parent, e))?;
            }
        }

        fs::write(path, self.to_yaml_with_comments()).map_err(|e| LabelError::io(path, e))?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }

    /// Generate YAML content with comments for new files
    fn to_yaml_with_comments(&self) -> String {
        let roi = match self.roi {
            Some(roi) => format!("[{}, {}, {}, {}]", roi.x_min(), roi.y_min(), roi.x_max(), roi.y_max()),
            None => "null".to_string(),
        };
        let labels = format!(
            "[{}]",
            self.labels.iter().map(|l| format!("\"{}\"", l)).collect::<Vec<_>>().join(", ")
        );
        let extensions = format!(
            "[{}]",
            self.image_extensions.iter().map(|e| format!("\"{}\"", e)).collect::<Vec<_>>().join(", ")
        );

        format!(
            r#"# labelkit settings
# Values given on the command line override the ones in this file.

# Region of interest for `labelkit crop`: [x_min, y_min, x_max, y_max] in pixels.
# x_min must be smaller than x_max and y_min smaller than y_max.
roi: {}

# Labels converted by `labelkit mask`. The position in this list is the YOLO
# class id, so keep the order stable once a model has been trained on it.
labels: {}

# Image file extensions picked up when scanning folders
image_extensions: {}

# Process images in parallel
parallel: {}
"#,
            roi, labels, extensions, self.parallel
        )
    }
}
