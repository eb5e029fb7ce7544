//! Add an item to a category

use anyhow::{anyhow, Result};

use crate::content::{ContentStore, Fields, Item};
use crate::Folio;

/// Create an item titled `title` with extra `key=value` fields
pub async fn run(folio: &Folio, category: &str, title: &str, fields: &[String]) -> Result<Item> {
    folio.check_category(category)?;

    let mut values = Fields::new();
    values.insert("title".to_string(), title.into());
    for field in fields {
        let (key, value) = parse_field(field)?;
        values.insert(key, value);
    }

    let item = folio.store().insert_item(category, values).await?;
    tracing::info!("Added {} to {} at order {}", item.id, category, item.order);
    Ok(item)
}

/// Parse `key=value`; the value is read as YAML so numbers and lists keep their type
fn parse_field(field: &str) -> Result<(String, serde_yaml::Value)> {
    let (key, raw) = field
        .split_once('=')
        .ok_or_else(|| anyhow!("Invalid field {:?}, expected key=value", field))?;

    let key = key.trim();
    if key.is_empty() || key == "id" || key == "order" {
        anyhow::bail!("Invalid field name: {:?}", key);
    }

    let value = serde_yaml::from_str(raw)
        .unwrap_or_else(|_| serde_yaml::Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}
