//! Fixed-size page navigation
//!
//! Pages are 1-based. An empty collection still has one (empty) page, so
//! "page 1 of 1" is always a valid position.

use serde::Serialize;
use std::sync::Arc;

use crate::error::{ListingError, Result};

/// Page position summary for "showing 21-25 of 25" style footers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    /// 1-based index of the first item shown, 0 when empty
    pub first_item: usize,
    /// 1-based index of the last item shown, 0 when empty
    pub last_item: usize,
}

/// Pagination controller
#[derive(Debug, Clone)]
pub struct Paginator<T> {
    items: Arc<[T]>,
    page_size: usize,
    current_page: usize,
}

impl<T> Paginator<T> {
    /// Start on page 1
    ///
    /// # Errors
    ///
    /// Returns `InvalidPageSize` for a zero page size.
    pub fn new(items: impl Into<Arc<[T]>>, page_size: usize) -> Result<Self> {
        if page_size == 0 {
            return Err(ListingError::InvalidPageSize(page_size));
        }
        Ok(Self {
            items: items.into(),
            page_size,
            current_page: 1,
        })
    }

    /// `ceil(len / page_size)`, never less than 1
    pub fn total_pages(&self) -> usize {
        self.items.len().div_ceil(self.page_size).max(1)
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_items(&self) -> usize {
        self.items.len()
    }

    /// Move to page `page`, clamped to `[1, total_pages]`
    ///
    /// Returns the page actually selected.
    pub fn go_to_page(&mut self, page: usize) -> usize {
        self.current_page = page.clamp(1, self.total_pages());
        self.current_page
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    /// Returns whether the page changed
    pub fn next_page(&mut self) -> bool {
        if !self.has_next() {
            return false;
        }
        self.current_page += 1;
        true
    }

    /// Returns whether the page changed
    pub fn previous_page(&mut self) -> bool {
        if !self.has_previous() {
            return false;
        }
        self.current_page -= 1;
        true
    }

    /// Change the page size and go back to page 1
    pub fn set_page_size(&mut self, page_size: usize) -> Result<()> {
        if page_size == 0 {
            return Err(ListingError::InvalidPageSize(page_size));
        }
        self.page_size = page_size;
        self.current_page = 1;
        Ok(())
    }

    /// Swap in a new collection, back to page 1 if it differs
    pub fn replace_items(&mut self, items: impl Into<Arc<[T]>>) -> bool {
        let items = items.into();
        if Arc::ptr_eq(&self.items, &items) && self.items.len() == items.len() {
            return false;
        }
        self.items = items;
        self.current_page = 1;
        true
    }

    /// Items on the current page
    pub fn page_items(&self) -> &[T] {
        let start = (self.current_page - 1) * self.page_size;
        let start = start.min(self.items.len());
        let end = (start + self.page_size).min(self.items.len());
        &self.items[start..end]
    }

    /// 1-based `(first, last)` indices shown, `(0, 0)` when the page is empty
    pub fn item_range(&self) -> (usize, usize) {
        let shown = self.page_items().len();
        if shown == 0 {
            return (0, 0);
        }
        let first = (self.current_page - 1) * self.page_size + 1;
        (first, first + shown - 1)
    }

    pub fn info(&self) -> PageInfo {
        let (first_item, last_item) = self.item_range();
        PageInfo {
            current_page: self.current_page,
            total_pages: self.total_pages(),
            total_items: self.items.len(),
            first_item,
            last_item,
        }
    }
}
