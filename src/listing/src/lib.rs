//! # Storynest Listing
//!
//! View-state controllers for long, already-fetched collections of stories,
//! courses and games.
//!
//! - [`IncrementalList`]: a visible prefix that grows one page at a time,
//!   driven by [`ScrollObserver`] near-bottom signals
//! - [`Paginator`]: classic numbered pages with clamped navigation
//!
//! ## Example
//!
//! ```rust
//! use storynest_listing::Paginator;
//!
//! let mut pager = Paginator::new((1..=25).collect::<Vec<u32>>(), 10).unwrap();
//! assert_eq!(pager.total_pages(), 3);
//! assert_eq!(pager.go_to_page(5), 3);
//! assert_eq!(pager.page_items(), &[21, 22, 23, 24, 25]);
//! ```

pub mod error;
pub mod incremental;
pub mod pagination;
pub mod scroll;

pub use error::{ListingError, Result};
pub use incremental::{IncrementalList, ListConfig, WindowSnapshot};
pub use pagination::{PageInfo, Paginator};
pub use scroll::{ScrollMetrics, ScrollObserver, DEFAULT_THRESHOLD_PX};
