//! Content module - orderable items, content stores and aggregation

pub mod aggregate;
mod file_store;
pub mod item;
mod memory_store;
pub mod store;

pub use aggregate::{aggregate, SiteContent};
pub use file_store::FileStore;
pub use item::{Item, ItemId, OrderUpdate};
pub use memory_store::MemoryStore;
pub use store::{ContentStore, Fields, StoreError};
