//! File-backed content store
//!
//! Each category lives in `<root>/<category>.yml` as a YAML sequence of
//! items. Writes go through a temporary file followed by a rename so a
//! batch is either fully on disk or not at all.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use walkdir::WalkDir;

use super::item::{self, Item, ItemId, OrderUpdate};
use super::store::{self, ContentStore, Fields, StoreError};

/// Content store over a directory of YAML files
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    categories: Vec<String>,
    /// Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Create a store for the given content directory and categories
    pub fn new<P: AsRef<Path>>(root: P, categories: Vec<String>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            categories,
            write_lock: Mutex::new(()),
        }
    }

    /// Content directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a category's file
    pub fn category_path(&self, category: &str) -> PathBuf {
        self.root.join(format!("{}.yml", category))
    }

    /// Category files present on disk, whether configured or not
    pub fn files_on_disk(&self) -> Vec<String> {
        if !self.root.exists() {
            return Vec::new();
        }

        let mut names: Vec<String> = WalkDir::new(&self.root)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "yml" || ext == "yaml")
                    .unwrap_or(false)
            })
            .filter_map(|e| {
                e.path()
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .map(|s| s.to_string())
            })
            .collect();
        names.sort();
        names
    }

    fn check_category(&self, category: &str) -> Result<PathBuf, StoreError> {
        if self.categories.iter().any(|c| c == category) {
            Ok(self.category_path(category))
        } else {
            Err(StoreError::UnknownCategory(category.to_string()))
        }
    }

    /// Read a category file in stored sequence
    async fn read(&self, path: &Path) -> Result<Vec<Item>, StoreError> {
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = tokio::fs::read_to_string(path).await?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_yaml::from_str(&content).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    async fn write(&self, path: &Path, items: &[Item]) -> Result<(), StoreError> {
        let content = serde_yaml::to_string(items)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = path.with_extension("yml.tmp");
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, path).await?;
        tracing::debug!("Wrote {} items to {:?}", items.len(), path);
        Ok(())
    }
}

#[async_trait]
impl ContentStore for FileStore {
    fn categories(&self) -> Vec<String> {
        self.categories.clone()
    }

    async fn fetch_items(&self, category: &str) -> Result<Vec<Item>, StoreError> {
        let path = self.check_category(category)?;
        let mut items = self.read(&path).await?;
        item::sort_by_order(&mut items);
        Ok(items)
    }

    async fn persist_order(
        &self,
        category: &str,
        updates: &[OrderUpdate],
    ) -> Result<(), StoreError> {
        let path = self.check_category(category)?;
        let _guard = self.write_lock.lock().await;

        let mut items = self.read(&path).await?;
        store::apply_updates(&mut items, category, updates)?;
        self.write(&path, &items).await
    }

    async fn insert_item(&self, category: &str, fields: Fields) -> Result<Item, StoreError> {
        let path = self.check_category(category)?;
        let _guard = self.write_lock.lock().await;

        let mut items = self.read(&path).await?;
        let item = Item {
            id: store::new_item_id(&fields),
            order: store::next_order(&items),
            fields,
        };
        items.push(item.clone());
        self.write(&path, &items).await?;
        Ok(item)
    }

    async fn delete_item(&self, category: &str, id: &ItemId) -> Result<(), StoreError> {
        let path = self.check_category(category)?;
        let _guard = self.write_lock.lock().await;

        let mut items = self.read(&path).await?;
        let before = items.len();
        items.retain(|i| &i.id != id);
        if items.len() == before {
            return Err(StoreError::UnknownItem {
                category: category.to_string(),
                id: id.clone(),
            });
        }
        self.write(&path, &items).await
    }
}
