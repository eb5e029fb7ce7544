//! Orderable item model

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Custom deserializer that accepts ids written as strings or as numbers
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, Visitor};

    struct StringOrNumber;

    impl<'de> Visitor<'de> for StringOrNumber {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or an integer id")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(value)
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(String::new())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(String::new())
        }
    }

    deserializer.deserialize_any(StringOrNumber)
}

/// Store-assigned identifier of an item.
///
/// An empty id marks an item the store has not saved yet; such items are
/// never part of an order batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        string_or_number(deserializer).map(ItemId)
    }
}

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the store has assigned this id
    pub fn is_assigned(&self) -> bool {
        !self.0.trim().is_empty()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A content record with a persisted position inside its category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Identifier assigned by the store
    #[serde(default)]
    pub id: ItemId,

    /// Display position; may have gaps or duplicates until normalized
    #[serde(default)]
    pub order: i64,

    /// Category-specific fields (title, description, ...)
    #[serde(flatten)]
    pub fields: IndexMap<String, serde_yaml::Value>,
}

impl Item {
    pub fn new(id: impl Into<ItemId>, order: i64) -> Self {
        Self {
            id: id.into(),
            order,
            fields: IndexMap::new(),
        }
    }

    /// Builder-style field setter
    pub fn with_field(mut self, key: &str, value: impl Into<serde_yaml::Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    /// Get a string field
    pub fn field_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(|v| v.as_str())
    }

    /// Human readable title, falling back to `name` and then the id
    pub fn title(&self) -> &str {
        self.field_str("title")
            .or_else(|| self.field_str("name"))
            .unwrap_or_else(|| self.id.as_str())
    }
}

/// A single `{id, order}` assignment sent to the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderUpdate {
    pub id: ItemId,
    pub order: i64,
}

/// Stable sort by `order`; ties keep their stored sequence
pub fn sort_by_order(items: &mut [Item]) {
    items.sort_by_key(|item| item.order);
}

/// Set every item's `order` to its position
pub fn renumber(items: &mut [Item]) {
    for (position, item) in items.iter_mut().enumerate() {
        item.order = position as i64;
    }
}

/// Whether `items[k].order == k` for every position
pub fn is_normalized(items: &[Item]) -> bool {
    items
        .iter()
        .enumerate()
        .all(|(position, item)| item.order == position as i64)
}

/// Build the order batch for all items that carry a real id
pub fn order_updates(items: &[Item]) -> Vec<OrderUpdate> {
    items
        .iter()
        .filter(|item| item.id.is_assigned())
        .map(|item| OrderUpdate {
            id: item.id.clone(),
            order: item.order,
        })
        .collect()
}
