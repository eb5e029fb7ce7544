//! Reorder controller for admin-managed lists
//!
//! Holds the displayed sequence of one category and moves an item one
//! position up or down. The new sequence is applied locally first, then
//! persisted as one `{id, order}` batch; a failed write restores the
//! sequence that was shown before the move.
//!
//! Only one move may be in flight per controller. A move requested while
//! another is pending is rejected with [`ReorderError::Busy`] and changes
//! nothing. Store changes made beside the controller (deletes, renumbering)
//! take the same hold through [`ReorderController::begin_edit`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

use crate::content::item::{self, Item, OrderUpdate};
use crate::content::{ContentStore, StoreError};

/// Errors returned by reorder operations
#[derive(Error, Debug)]
pub enum ReorderError {
    #[error("A reorder of {0} is already in progress")]
    Busy(String),

    #[error("Index {index} is out of range for {len} items")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Failed to persist order: {0}")]
    Persist(#[from] StoreError),
}

/// Direction of a single-step move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            other => Err(format!("Unknown direction: {}. Available: up, down", other)),
        }
    }
}

/// Result of a move that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Items were swapped and the new order persisted
    Moved,
    /// The item was already at the edge; nothing was written
    Unchanged,
}

/// Callback run after a successful write, e.g. to re-sync a view
pub type RefreshHook = Box<dyn Fn(&str, &[OrderUpdate]) + Send + Sync>;

/// Ordered list state for one category
pub struct ReorderController<S: ?Sized> {
    category: String,
    store: Arc<S>,
    items: Mutex<Vec<Item>>,
    pending: AtomicBool,
    /// Set while the store may differ from `items`
    stale: AtomicBool,
    on_persisted: Option<RefreshHook>,
}

/// Clears the pending flag when the operation ends, however it ends
struct PendingGuard<'a>(&'a AtomicBool);

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Exclusive hold on a controller while the store is changed directly.
///
/// Moves and reloads are rejected as busy until the hold is dropped. The
/// controller counts as stale from the start of the edit; [`Edit::finish`]
/// re-reads the category, otherwise the next move does.
pub struct Edit<'a, S: ?Sized> {
    controller: &'a ReorderController<S>,
    _pending: PendingGuard<'a>,
}

impl<S: ContentStore + ?Sized> Edit<'_, S> {
    /// Re-read the category and release the hold
    pub async fn finish(self) -> Result<(), StoreError> {
        self.controller.refresh().await
    }
}

impl<S: ContentStore + ?Sized> ReorderController<S> {
    /// Create a controller over an already loaded sequence
    pub fn new(store: Arc<S>, category: impl Into<String>, items: Vec<Item>) -> Self {
        Self {
            category: category.into(),
            store,
            items: Mutex::new(items),
            pending: AtomicBool::new(false),
            stale: AtomicBool::new(false),
            on_persisted: None,
        }
    }

    /// Create a controller with a fresh copy of the category
    pub async fn load(store: Arc<S>, category: &str) -> Result<Self, StoreError> {
        let items = store.fetch_items(category).await?;
        Ok(Self::new(store, category, items))
    }

    /// Register a callback invoked after every successful write
    pub fn with_refresh<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str, &[OrderUpdate]) + Send + Sync + 'static,
    {
        self.on_persisted = Some(Box::new(hook));
        self
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// Snapshot of the displayed sequence
    pub fn items(&self) -> Vec<Item> {
        self.lock().clone()
    }

    /// Whether a write is in flight; move controls should be disabled
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Replace the local sequence with the store's current one
    pub async fn reload(&self) -> Result<(), ReorderError> {
        let _pending = self.claim()?;
        self.refresh().await?;
        Ok(())
    }

    /// Claim the controller for a store change made outside a move
    pub fn begin_edit(&self) -> Result<Edit<'_, S>, ReorderError> {
        let pending = self.claim()?;
        self.stale.store(true, Ordering::Release);
        Ok(Edit {
            controller: self,
            _pending: pending,
        })
    }

    /// Move the item at `index` one position earlier
    pub async fn move_up(&self, index: usize) -> Result<MoveOutcome, ReorderError> {
        self.move_item(index, Direction::Up).await
    }

    /// Move the item at `index` one position later
    pub async fn move_down(&self, index: usize) -> Result<MoveOutcome, ReorderError> {
        self.move_item(index, Direction::Down).await
    }

    pub async fn move_item(
        &self,
        index: usize,
        direction: Direction,
    ) -> Result<MoveOutcome, ReorderError> {
        let _pending = self.claim()?;
        if self.stale.load(Ordering::Acquire) {
            self.refresh().await?;
        }

        let (snapshot, updates) = {
            let mut items = self.lock();
            let Some(next) = swapped(&items, index, direction)? else {
                return Ok(MoveOutcome::Unchanged);
            };
            let updates = item::order_updates(&next);
            let snapshot = std::mem::replace(&mut *items, next);
            (snapshot, updates)
        };

        tracing::debug!(
            "Moving {}[{}] {:?}, persisting {} orders",
            self.category,
            index,
            direction,
            updates.len()
        );

        match self.store.persist_order(&self.category, &updates).await {
            Ok(()) => {
                if let Some(hook) = &self.on_persisted {
                    hook(&self.category, &updates);
                }
                Ok(MoveOutcome::Moved)
            }
            Err(e) => {
                tracing::warn!("Reorder of {} failed, rolling back: {}", self.category, e);
                *self.lock() = snapshot;
                Err(e.into())
            }
        }
    }

    /// Replace the local sequence; callers hold the pending flag
    async fn refresh(&self) -> Result<(), StoreError> {
        let items = self.store.fetch_items(&self.category).await?;
        tracing::debug!("Reloaded {} items for {}", items.len(), self.category);
        *self.lock() = items;
        self.stale.store(false, Ordering::Release);
        Ok(())
    }

    fn claim(&self) -> Result<PendingGuard<'_>, ReorderError> {
        self.pending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| PendingGuard(&self.pending))
            .map_err(|_| ReorderError::Busy(self.category.clone()))
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Item>> {
        // Writers replace the whole vector, so a poisoned value is still whole
        self.items.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// The sequence after moving `index` one step, renumbered `0..N-1`.
///
/// `None` when the move is a no-op (first item up, last item down, or an
/// empty list).
fn swapped(
    items: &[Item],
    index: usize,
    direction: Direction,
) -> Result<Option<Vec<Item>>, ReorderError> {
    let len = items.len();
    if len == 0 {
        return Ok(None);
    }
    if index >= len {
        return Err(ReorderError::IndexOutOfRange { index, len });
    }

    let target = match direction {
        Direction::Up if index == 0 => return Ok(None),
        Direction::Up => index - 1,
        Direction::Down if index + 1 == len => return Ok(None),
        Direction::Down => index + 1,
    };

    let mut next = items.to_vec();
    next.swap(index, target);
    item::renumber(&mut next);
    Ok(Some(next))
}
