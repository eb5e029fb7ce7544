//! Delete an item from a category

use anyhow::Result;

use crate::content::{store, ItemId};
use crate::Folio;

/// Delete an item, closing the gap when `admin.renormalize_on_delete` is set
pub async fn run(folio: &Folio, category: &str, id: &str) -> Result<()> {
    folio.check_category(category)?;

    let renormalize = folio.config.admin.renormalize_on_delete;
    store::remove_item(&folio.store(), category, &ItemId::from(id), renormalize).await?;
    println!("Deleted {} from {}", id, category);
    Ok(())
}
