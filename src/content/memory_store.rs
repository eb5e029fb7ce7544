//! In-memory content store

use async_trait::async_trait;
use indexmap::IndexMap;
use std::sync::{Mutex, MutexGuard};

use super::item::{self, Item, ItemId, OrderUpdate};
use super::store::{self, ContentStore, Fields, StoreError};

/// Content store kept entirely in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<IndexMap<String, Vec<Item>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store serving the given (empty) categories
    pub fn with_categories<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let data = categories
            .into_iter()
            .map(|name| (name.into(), Vec::new()))
            .collect();
        Self {
            data: Mutex::new(data),
        }
    }

    /// Replace a category's items, registering the category if needed
    pub fn set_items(&self, category: &str, items: Vec<Item>) {
        self.lock().insert(category.to_string(), items);
    }

    fn lock(&self) -> MutexGuard<'_, IndexMap<String, Vec<Item>>> {
        // A poisoned map is still structurally valid
        self.data.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    fn categories(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    async fn fetch_items(&self, category: &str) -> Result<Vec<Item>, StoreError> {
        let data = self.lock();
        let mut items = data
            .get(category)
            .cloned()
            .ok_or_else(|| StoreError::UnknownCategory(category.to_string()))?;
        item::sort_by_order(&mut items);
        Ok(items)
    }

    async fn persist_order(
        &self,
        category: &str,
        updates: &[OrderUpdate],
    ) -> Result<(), StoreError> {
        let mut data = self.lock();
        let items = data
            .get_mut(category)
            .ok_or_else(|| StoreError::UnknownCategory(category.to_string()))?;
        store::apply_updates(items, category, updates)
    }

    async fn insert_item(&self, category: &str, fields: Fields) -> Result<Item, StoreError> {
        let mut data = self.lock();
        let items = data
            .get_mut(category)
            .ok_or_else(|| StoreError::UnknownCategory(category.to_string()))?;

        let item = Item {
            id: store::new_item_id(&fields),
            order: store::next_order(items),
            fields,
        };
        items.push(item.clone());
        Ok(item)
    }

    async fn delete_item(&self, category: &str, id: &ItemId) -> Result<(), StoreError> {
        let mut data = self.lock();
        let items = data
            .get_mut(category)
            .ok_or_else(|| StoreError::UnknownCategory(category.to_string()))?;

        let before = items.len();
        items.retain(|i| &i.id != id);
        if items.len() == before {
            return Err(StoreError::UnknownItem {
                category: category.to_string(),
                id: id.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_category() {
        let store = MemoryStore::with_categories(["skills"]);
        assert!(store.fetch_items("skills").await.unwrap().is_empty());
        assert!(matches!(
            store.fetch_items("hobbies").await,
            Err(StoreError::UnknownCategory(_))
        ));
    }

    #[tokio::test]
    async fn test_insert_appends_after_last() {
        let store = MemoryStore::new();
        store.set_items("skills", vec![Item::new("a", 0), Item::new("b", 4)]);

        let mut fields = Fields::new();
        fields.insert("title".to_string(), "Rust".into());
        let item = store.insert_item("skills", fields).await.unwrap();

        assert_eq!(item.order, 5);
        assert!(item.id.as_str().starts_with("rust-"));
        let items = store.fetch_items("skills").await.unwrap();
        assert_eq!(items.last().unwrap().id, item.id);
    }

    #[tokio::test]
    async fn test_delete_unknown_item() {
        let store = MemoryStore::new();
        store.set_items("skills", vec![Item::new("a", 0)]);
        let err = store.delete_item("skills", &"b".into()).await.unwrap_err();
        assert!(matches!(err, StoreError::UnknownItem { .. }));
    }
}
