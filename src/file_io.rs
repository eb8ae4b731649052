use std::collections::{HashMap, HashSet};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

#[allow(unused_imports)]
use log::{debug, info, warn, error};

use crate::errors::{LabelError, Result};

/// An image together with the annotation file that shares its stem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemPair {
    pub stem: String,
    pub image: PathBuf,
    pub annotation: PathBuf,
}

pub fn file_stem(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|os_str| os_str.to_str())
        .map(|s| s.to_string())
}

/// List files in `directory_path` accepted by `filter`, sorted like a file manager would
pub fn list_files(directory_path: &Path, filter: impl Fn(&Path) -> bool) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(directory_path).map_err(|e| LabelError::io(directory_path, e))?;

    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && filter(path))
        .collect();

    // Sort paths like Nautilus file viewer. `paths.sort()` does not work as expected
    alphanumeric_sort::sort_path_slice(&mut paths);
    Ok(paths)
}

pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .map(|ext| ext.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

/// Pair each image with `<annotation_dir>/<stem>.<extension>`.
/// Images without a matching annotation file are skipped. The first image
/// wins if two share a stem, since both would write the same output labels.
pub fn pair_with_annotations(images: &[PathBuf], annotation_dir: &Path, extension: &str) -> Vec<ItemPair> {
    let mut seen = HashSet::new();
    images
        .iter()
        .filter_map(|image| {
            let stem = file_stem(image)?;
            let annotation = annotation_dir.join(format!("{stem}.{extension}"));
            if !annotation.is_file() {
                debug!("No {} annotation for {}, skipping", extension, image.display());
                return None;
            }
            if !seen.insert(stem.clone()) {
                warn!("Several images share the stem '{}', skipping {}", stem, image.display());
                return None;
            }
            Some(ItemPair { stem, image: image.clone(), annotation })
        })
        .collect()
}

/// Pair images and annotation files found in separate listings by stem.
/// Order follows `images`. The first image wins if two share a stem.
pub fn pair_by_stem(images: &[PathBuf], annotations: &[PathBuf]) -> Vec<ItemPair> {
    let by_stem: HashMap<String, &PathBuf> = annotations
        .iter()
        .filter_map(|path| Some((file_stem(path)?, path)))
        .collect();

    let mut seen = HashSet::new();
    images
        .iter()
        .filter_map(|image| {
            let stem = file_stem(image)?;
            let annotation = by_stem.get(&stem)?;
            if !seen.insert(stem.clone()) {
                warn!("Several images share the stem '{}', keeping the first one", stem);
                return None;
            }
            Some(ItemPair {
                stem,
                image: image.clone(),
                annotation: (*annotation).clone(),
            })
        })
        .collect()
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| LabelError::io(path, e))?;
        info!("Created output directory {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        fs::write(path, b"").expect("write file");
    }

    #[test]
    fn test_list_files_sorted_naturally() {
        let dir = tempfile::tempdir().expect("create temp dir");
        for name in ["img10.jpg", "img2.jpg", "img1.jpg", "notes.txt"] {
            touch(&dir.path().join(name));
        }
        fs::create_dir(dir.path().join("sub.jpg")).unwrap();

        let images = list_files(dir.path(), |p| has_extension(p, "jpg")).unwrap();
        let names: Vec<_> = images.iter().map(|p| file_stem(p).unwrap()).collect();
        assert_eq!(names, vec!["img1", "img2", "img10"]);

        assert!(list_files(&dir.path().join("missing"), |_| true).is_err());
    }

    #[test]
    fn test_pair_with_annotations() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let labels = dir.path().join("labels");
        fs::create_dir(&labels).unwrap();
        touch(&labels.join("a.txt"));

        let images = vec![dir.path().join("a.jpg"), dir.path().join("b.jpg")];
        let pairs = pair_with_annotations(&images, &labels, "txt");
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].stem, "a");
        assert_eq!(pairs[0].annotation, labels.join("a.txt"));
    }

    #[test]
    fn test_pair_with_annotations_shared_stem() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let labels = dir.path().join("labels");
        fs::create_dir(&labels).unwrap();
        touch(&labels.join("a.txt"));
        touch(&labels.join("b.txt"));

        let images = vec![
            dir.path().join("a.jpg"),
            dir.path().join("a.png"),
            dir.path().join("b.png"),
        ];
        let pairs = pair_with_annotations(&images, &labels, "txt");
        let found: Vec<_> = pairs.iter().map(|p| p.image.clone()).collect();
        assert_eq!(found, vec![dir.path().join("a.jpg"), dir.path().join("b.png")]);
    }

    #[test]
    fn test_pair_by_stem() {
        let images = vec![
            PathBuf::from("img/x.jpg"),
            PathBuf::from("img/y.png"),
            PathBuf::from("img/x.png"),
            PathBuf::from("img/z.jpg"),
        ];
        let jsons = vec![PathBuf::from("json/x.json"), PathBuf::from("json/y.json")];

        let pairs = pair_by_stem(&images, &jsons);
        let stems: Vec<_> = pairs.iter().map(|p| p.stem.as_str()).collect();
        assert_eq!(stems, vec!["x", "y"]);
        assert_eq!(pairs[0].image, PathBuf::from("img/x.jpg"));
        assert_eq!(pairs[1].annotation, PathBuf::from("json/y.json"));
    }
}
