//! Cumulative reveal of an already-fetched collection
//!
//! The visible prefix grows by one page per `load_more`, after a short
//! settling delay. At most one expansion is in flight; triggers that arrive
//! meanwhile are dropped, not queued. Replacing the collection resets the
//! window and discards any expansion started for the old one.

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::{ListingError, Result};

/// Incremental list settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListConfig {
    /// Items revealed per step
    pub page_size: usize,
    /// Pause before an expansion is applied
    pub settle_delay: Duration,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            page_size: 12,
            settle_delay: Duration::from_millis(300),
        }
    }
}

/// Read-only view of the window
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindowSnapshot<T> {
    pub visible_items: Vec<T>,
    pub loaded_count: usize,
    pub total_count: usize,
    pub has_more: bool,
    pub is_loading_more: bool,
}

#[derive(Debug)]
struct Window<T> {
    items: Arc<[T]>,
    loaded_count: usize,
    is_loading_more: bool,
    /// Bumped on every reset; stale expansions compare against it
    epoch: u64,
}

impl<T> Window<T> {
    fn reset(&mut self, page_size: usize) {
        self.loaded_count = page_size.min(self.items.len());
        self.is_loading_more = false;
        self.epoch += 1;
    }

    fn has_more(&self) -> bool {
        self.loaded_count < self.items.len()
    }
}

/// Controller for progressive rendering and scroll-triggered loading
///
/// Clones share one window. When the last clone is dropped, expansions
/// started with [`IncrementalList::trigger_load_more`] finish without
/// touching anything.
#[derive(Debug)]
pub struct IncrementalList<T> {
    window: Arc<Mutex<Window<T>>>,
    config: ListConfig,
}

impl<T> Clone for IncrementalList<T> {
    fn clone(&self) -> Self {
        Self {
            window: Arc::clone(&self.window),
            config: self.config.clone(),
        }
    }
}

impl<T> IncrementalList<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Start with the first page of `items` visible
    ///
    /// # Errors
    ///
    /// Returns `InvalidPageSize` for a zero page size.
    pub fn new(items: impl Into<Arc<[T]>>, config: ListConfig) -> Result<Self> {
        if config.page_size == 0 {
            return Err(ListingError::InvalidPageSize(0));
        }

        let items = items.into();
        let loaded_count = config.page_size.min(items.len());
        Ok(Self {
            window: Arc::new(Mutex::new(Window {
                items,
                loaded_count,
                is_loading_more: false,
                epoch: 0,
            })),
            config,
        })
    }

    /// Like [`IncrementalList::new`] with the default settle delay
    pub fn with_page_size(items: impl Into<Arc<[T]>>, page_size: usize) -> Result<Self> {
        Self::new(
            items,
            ListConfig {
                page_size,
                ..ListConfig::default()
            },
        )
    }

    /// Reveal the next page
    ///
    /// Returns `false` without waiting if an expansion is already running or
    /// everything is visible, and `false` after waiting if the collection was
    /// replaced meanwhile. The expansion runs on its own task, so dropping
    /// this future does not leave the list stuck in `is_loading_more`.
    pub async fn load_more(&self) -> bool {
        match self.trigger_load_more() {
            Some(handle) => handle.await.unwrap_or(false),
            None => false,
        }
    }

    /// Reveal the next page in the background
    ///
    /// `None` means the trigger was dropped. The returned task yields
    /// whether the expansion was applied.
    pub fn trigger_load_more(&self) -> Option<JoinHandle<bool>> {
        let epoch = self.begin_expansion()?;
        let window: Weak<Mutex<Window<T>>> = Arc::downgrade(&self.window);
        let delay = self.config.settle_delay;
        let page_size = self.config.page_size;

        Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match window.upgrade() {
                Some(window) => finish_expansion(&window, epoch, page_size),
                None => false,
            }
        }))
    }

    /// Back to the first page of the current items
    pub fn reset(&self) {
        self.window.lock().reset(self.config.page_size);
    }

    /// Swap in a new collection
    ///
    /// Resets when the new collection is a different allocation or has a
    /// different length. Returns whether a reset happened.
    pub fn replace_items(&self, items: impl Into<Arc<[T]>>) -> bool {
        let items = items.into();
        let mut window = self.window.lock();
        if Arc::ptr_eq(&window.items, &items) && window.items.len() == items.len() {
            return false;
        }

        debug!(
            "List source changed ({} -> {} items), resetting window",
            window.items.len(),
            items.len()
        );
        window.items = items;
        window.reset(self.config.page_size);
        true
    }

    pub fn snapshot(&self) -> WindowSnapshot<T> {
        let window = self.window.lock();
        WindowSnapshot {
            visible_items: window.items[..window.loaded_count].to_vec(),
            loaded_count: window.loaded_count,
            total_count: window.items.len(),
            has_more: window.has_more(),
            is_loading_more: window.is_loading_more,
        }
    }

    pub fn visible_items(&self) -> Vec<T> {
        let window = self.window.lock();
        window.items[..window.loaded_count].to_vec()
    }

    pub fn loaded_count(&self) -> usize {
        self.window.lock().loaded_count
    }

    pub fn total_count(&self) -> usize {
        self.window.lock().items.len()
    }

    pub fn has_more(&self) -> bool {
        self.window.lock().has_more()
    }

    pub fn is_loading_more(&self) -> bool {
        self.window.lock().is_loading_more
    }

    pub fn page_size(&self) -> usize {
        self.config.page_size
    }

    /// Claim the single expansion slot
    fn begin_expansion(&self) -> Option<u64> {
        let mut window = self.window.lock();
        if window.is_loading_more {
            debug!("Expansion already in flight, dropping trigger");
            return None;
        }
        if !window.has_more() {
            return None;
        }
        window.is_loading_more = true;
        Some(window.epoch)
    }
}

fn finish_expansion<T>(window: &Mutex<Window<T>>, epoch: u64, page_size: usize) -> bool {
    let mut window = window.lock();
    if window.epoch != epoch {
        debug!("Discarding expansion for a replaced collection");
        return false;
    }
    window.loaded_count = (window.loaded_count + page_size).min(window.items.len());
    window.is_loading_more = false;
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(n: usize) -> Vec<usize> {
        (1..=n).collect()
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let err = IncrementalList::with_page_size(numbers(3), 0).unwrap_err();
        assert_eq!(err, ListingError::InvalidPageSize(0));
    }

    #[test]
    fn test_init_clamps_to_length() {
        let list = IncrementalList::with_page_size(numbers(5), 12).unwrap();
        assert_eq!(list.loaded_count(), 5);
        assert!(!list.has_more());

        let empty = IncrementalList::<usize>::with_page_size(Vec::new(), 12).unwrap();
        assert_eq!(empty.loaded_count(), 0);
        assert!(empty.visible_items().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_more_applies_after_settle_delay() {
        let list = IncrementalList::with_page_size(numbers(50), 12).unwrap();

        let handle = list.trigger_load_more().expect("trigger accepted");
        assert!(list.is_loading_more());
        assert_eq!(list.loaded_count(), 12);

        assert!(handle.await.unwrap());
        assert!(!list.is_loading_more());
        assert_eq!(list.loaded_count(), 24);
    }

    #[tokio::test]
    async fn test_exhausted_list_ignores_load_more() {
        let list = IncrementalList::new(
            numbers(3),
            ListConfig {
                page_size: 3,
                settle_delay: Duration::ZERO,
            },
        )
        .unwrap();

        assert!(!list.load_more().await);
        assert!(list.trigger_load_more().is_none());
        assert_eq!(list.loaded_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_discards_in_flight_expansion() {
        let list = IncrementalList::with_page_size(numbers(40), 10).unwrap();
        list.load_more().await;
        assert_eq!(list.loaded_count(), 20);

        let handle = list.trigger_load_more().unwrap();
        list.reset();

        assert!(!handle.await.unwrap());
        assert_eq!(list.loaded_count(), 10);
        assert!(!list.is_loading_more());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_list_ignores_completion() {
        let list = IncrementalList::with_page_size(numbers(30), 10).unwrap();
        let handle = list.trigger_load_more().unwrap();
        drop(list);

        assert!(!handle.await.unwrap());
    }
}
