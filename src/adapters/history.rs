use crate::domain::model::HistoryEntry;
use crate::domain::ports::HistoryStore;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Appends one JSON line per recorded generation to a local file. Purely a
/// collaborator convenience; the pipeline never reads this back.
#[derive(Debug, Clone)]
pub struct JsonlHistory {
    path: PathBuf,
}

impl JsonlHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl HistoryStore for JsonlHistory {
    async fn record(&self, entry: &HistoryEntry) -> Result<()> {
        let line = serde_json::to_string(entry)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{
        Lang, ListingBundle, ListingVariant, MarketplacePack, UniversalProduct,
    };
    use chrono::Utc;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn sample_bundle() -> ListingBundle {
        let variant = ListingVariant {
            title: "Title".to_string(),
            bullets: vec!["bullet".to_string()],
            description: "Description".to_string(),
            keywords: vec!["kw".to_string()],
            attributes: BTreeMap::new(),
            compliance_todos: vec![],
            uncertainty: vec![],
        };
        ListingBundle {
            lang: Lang::Ru,
            universal: UniversalProduct {
                product_type: "mug".to_string(),
                brand: Some("Acme".to_string()),
                model: None,
                color: None,
                material: None,
                condition: None,
                key_attributes: vec![],
                detected_text: vec![],
                uncertainty: vec![],
            },
            listings: MarketplacePack {
                olx: variant.clone(),
                wildberries: variant.clone(),
                ozon: variant,
            },
        }
    }

    fn sample_entry() -> HistoryEntry {
        let bundle = sample_bundle();
        HistoryEntry {
            requestor: "cli".to_string(),
            lang: bundle.lang,
            hint: Some("hint".to_string()),
            image_count: 2,
            image_names: vec!["a.jpg".to_string(), "b.jpg".to_string()],
            product_type: bundle.universal.product_type.clone(),
            brand: bundle.universal.brand.clone(),
            bundle,
            created_at: Utc::now(),
            elapsed_ms: 1234,
        }
    }

    #[tokio::test]
    async fn appends_one_json_line_per_record() {
        let dir = TempDir::new().unwrap();
        let store = JsonlHistory::new(dir.path().join("history.jsonl"));

        store.record(&sample_entry()).await.unwrap();
        store.record(&sample_entry()).await.unwrap();

        let content = std::fs::read_to_string(store.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let parsed: HistoryEntry = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed.requestor, "cli");
        assert_eq!(parsed.image_count, 2);
        assert_eq!(parsed.product_type, "mug");
    }

    #[tokio::test]
    async fn creates_missing_parent_directories() {
        let dir = TempDir::new().unwrap();
        let store = JsonlHistory::new(dir.path().join("nested/deeper/history.jsonl"));

        store.record(&sample_entry()).await.unwrap();
        assert!(store.path().exists());
    }
}
