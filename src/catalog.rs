/// Label catalog: maps label names to YOLO class ids
///
/// The id of a label is its position in the list the catalog was built from,
/// so the list must stay stable across runs for ids to stay consistent with a
/// trained model.
use std::collections::HashMap;

use crate::errors::{LabelError, Result};

#[derive(Debug, Clone)]
pub struct LabelCatalog {
    labels: Vec<String>,
    ids: HashMap<String, u32>,
}

impl LabelCatalog {
    /// Build a catalog from an ordered label list. Empty lists, blank names
    /// and duplicates are configuration errors.
    pub fn new<I, S>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.is_empty() {
            return Err(LabelError::config("label catalog is empty"));
        }

        let mut ids = HashMap::with_capacity(labels.len());
        for (idx, label) in labels.iter().enumerate() {
            if label.trim().is_empty() {
                return Err(LabelError::config(format!("label #{idx} is blank")));
            }
            if ids.insert(label.clone(), idx as u32).is_some() {
                return Err(LabelError::config(format!("label '{label}' is listed twice")));
            }
        }

        Ok(Self { labels, ids })
    }

    pub fn class_id(&self, label: &str) -> Option<u32> {
        self.ids.get(label).copied()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_follow_list_order() {
        let catalog = LabelCatalog::new(["human", "dog", "cat"]).unwrap();
        assert_eq!(catalog.class_id("human"), Some(0));
        assert_eq!(catalog.class_id("dog"), Some(1));
        assert_eq!(catalog.class_id("cat"), Some(2));
        assert_eq!(catalog.class_id("bird"), None);
        assert_eq!(catalog.class_id("Cat"), None);
        assert_eq!(catalog.labels(), ["human", "dog", "cat"]);
    }

    #[test]
    fn test_invalid_catalogs() {
        assert!(LabelCatalog::new(Vec::<String>::new()).unwrap_err().is_configuration());
        assert!(LabelCatalog::new(["dog", "dog"]).unwrap_err().is_configuration());
        assert!(LabelCatalog::new(["dog", " "]).unwrap_err().is_configuration());
    }
}
