//! Move an item one position within its category

use anyhow::Result;
use std::sync::Arc;

use crate::reorder::{Direction, MoveOutcome, ReorderController};
use crate::Folio;

/// Move the item at `index` up or down and print the new sequence
pub async fn run(folio: &Folio, category: &str, index: usize, direction: Direction) -> Result<()> {
    folio.check_category(category)?;

    let store = Arc::new(folio.store());
    let controller = ReorderController::load(store, category).await?;

    match controller.move_item(index, direction).await? {
        MoveOutcome::Moved => {
            tracing::info!("Moved {}[{}] {:?}", category, index, direction);
            for (position, item) in controller.items().iter().enumerate() {
                println!("{}", super::list::format_item(position, item));
            }
        }
        MoveOutcome::Unchanged => {
            println!("Item {} is already at the edge, nothing to do", index);
        }
    }

    Ok(())
}
