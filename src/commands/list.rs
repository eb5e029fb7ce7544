//! List site content

use anyhow::Result;

use crate::content::{ContentStore, Item};
use crate::Folio;

/// List categories, or the items of one category in display order
pub async fn run(folio: &Folio, category: Option<&str>) -> Result<()> {
    let store = folio.store();

    match category {
        Some(category) => {
            folio.check_category(category)?;
            let items = store.fetch_items(category).await?;
            println!("{} ({}):", category, items.len());
            for (index, item) in items.iter().enumerate() {
                println!("{}", format_item(index, item));
            }
        }
        None => {
            println!("Categories ({}):", folio.config.categories.len());
            for category in &folio.config.categories {
                let count = store.fetch_items(&category.name).await?.len();
                let visibility = if category.public { "" } else { " [private]" };
                println!("  {} ({}){}", category.name, count, visibility);
            }

            for orphan in store
                .files_on_disk()
                .into_iter()
                .filter(|name| folio.config.category(name).is_none())
            {
                tracing::warn!("Content file for unconfigured category: {}", orphan);
            }
        }
    }

    Ok(())
}

/// One listing line: position, stored order, id and title
pub fn format_item(index: usize, item: &Item) -> String {
    format!(
        "  {:>3}. [order {}] {} - {}",
        index,
        item.order,
        item.id,
        item.title()
    )
}
