//! Content store abstraction

use async_trait::async_trait;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::path::PathBuf;
use thiserror::Error;

use super::item::{self, Item, ItemId, OrderUpdate};

/// Errors raised by a content store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Item {id} not found in {category}")]
    UnknownItem { category: String, id: ItemId },

    #[error("Invalid content in {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("{count} items in {category} have no id; give them ids before renumbering")]
    MissingIds { category: String, count: usize },
}

/// Fields of a new item, in insertion order
pub type Fields = IndexMap<String, serde_yaml::Value>;

/// Backing storage for categorized, orderable content
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Names of the categories this store serves
    fn categories(&self) -> Vec<String>;

    /// Fetch a category sorted by `order`
    async fn fetch_items(&self, category: &str) -> Result<Vec<Item>, StoreError>;

    /// Apply a whole batch of order assignments, or none of them
    async fn persist_order(&self, category: &str, updates: &[OrderUpdate])
        -> Result<(), StoreError>;

    /// Create an item and assign its id and trailing order
    async fn insert_item(&self, category: &str, fields: Fields) -> Result<Item, StoreError>;

    /// Remove an item; remaining orders are left as they are
    async fn delete_item(&self, category: &str, id: &ItemId) -> Result<(), StoreError>;
}

/// Rewrite a category's orders to `0..N-1` in their current sequence.
///
/// Returns `false` without writing when the category is already normalized.
/// Items without an id cannot be part of the batch, so a category holding
/// any is rejected with [`StoreError::MissingIds`] before anything is written.
pub async fn normalize<S>(store: &S, category: &str) -> Result<bool, StoreError>
where
    S: ContentStore + ?Sized,
{
    let mut items = store.fetch_items(category).await?;
    if item::is_normalized(&items) {
        return Ok(false);
    }
    check_assigned(&items, category)?;

    item::renumber(&mut items);
    store
        .persist_order(category, &item::order_updates(&items))
        .await?;
    tracing::info!("Normalized {} items in {}", items.len(), category);
    Ok(true)
}

/// Delete an item, optionally closing the gap it leaves behind
pub async fn remove_item<S>(
    store: &S,
    category: &str,
    id: &ItemId,
    renormalize: bool,
) -> Result<(), StoreError>
where
    S: ContentStore + ?Sized,
{
    if renormalize {
        // Refuse up front rather than delete and then fail to renumber
        check_assigned(&store.fetch_items(category).await?, category)?;
    }

    store.delete_item(category, id).await?;
    tracing::info!("Deleted {} from {}", id, category);

    if renormalize {
        normalize(store, category).await?;
    }
    Ok(())
}

fn check_assigned(items: &[Item], category: &str) -> Result<(), StoreError> {
    let count = items.iter().filter(|i| !i.id.is_assigned()).count();
    if count > 0 {
        return Err(StoreError::MissingIds {
            category: category.to_string(),
            count,
        });
    }
    Ok(())
}

/// Generate an id for a new item from its title
pub fn new_item_id(fields: &Fields) -> ItemId {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    let suffix = &suffix[..8];

    match fields.get("title").and_then(|v| v.as_str()) {
        Some(title) if !slug::slugify(title).is_empty() => {
            ItemId::new(format!("{}-{}", slug::slugify(title), suffix))
        }
        _ => ItemId::new(suffix),
    }
}

/// Order for an item appended after `items`
pub fn next_order(items: &[Item]) -> i64 {
    items
        .iter()
        .map(|i| i.order.saturating_add(1))
        .max()
        .unwrap_or(0)
}

/// Apply an order batch in place after checking every id exists
pub(crate) fn apply_updates(
    items: &mut [Item],
    category: &str,
    updates: &[OrderUpdate],
) -> Result<(), StoreError> {
    let known: HashSet<&ItemId> = items.iter().map(|i| &i.id).collect();
    if let Some(missing) = updates.iter().find(|u| !known.contains(&u.id)) {
        return Err(StoreError::UnknownItem {
            category: category.to_string(),
            id: missing.id.clone(),
        });
    }

    for update in updates {
        for item in items.iter_mut().filter(|i| i.id == update.id) {
            item.order = update.order;
        }
    }
    item::sort_by_order(items);
    Ok(())
}
