//! Near-bottom detection for scroll-triggered loading

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use crate::error::{ListingError, Result};
use crate::incremental::IncrementalList;

/// Default distance from the end that counts as "near the bottom"
pub const DEFAULT_THRESHOLD_PX: f64 = 200.0;

/// Scroll position reported by the rendering layer, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub viewport_height: f64,
    pub content_height: f64,
}

impl ScrollMetrics {
    pub fn new(scroll_top: f64, viewport_height: f64, content_height: f64) -> Self {
        Self {
            scroll_top,
            viewport_height,
            content_height,
        }
    }

    /// Pixels left below the viewport
    pub fn distance_to_bottom(&self) -> f64 {
        (self.content_height - self.scroll_top - self.viewport_height).max(0.0)
    }
}

/// Turns scroll positions into `load_more` triggers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollObserver {
    threshold_px: f64,
}

impl ScrollObserver {
    /// # Errors
    ///
    /// Returns `InvalidThreshold` unless the threshold is finite and
    /// positive. A zero threshold could never fire under the strict
    /// near-bottom test.
    pub fn new(threshold_px: f64) -> Result<Self> {
        if !threshold_px.is_finite() || threshold_px <= 0.0 {
            return Err(ListingError::InvalidThreshold(threshold_px));
        }
        Ok(Self { threshold_px })
    }

    pub fn threshold_px(&self) -> f64 {
        self.threshold_px
    }

    pub fn is_near_bottom(&self, metrics: &ScrollMetrics) -> bool {
        metrics.distance_to_bottom() < self.threshold_px
    }

    /// Trigger an expansion of `list` if `metrics` is near the bottom
    ///
    /// Returns the background task when an expansion was started.
    pub fn observe<T>(&self, metrics: &ScrollMetrics, list: &IncrementalList<T>) -> Option<JoinHandle<bool>>
    where
        T: Clone + Send + Sync + 'static,
    {
        if !self.is_near_bottom(metrics) || !list.has_more() {
            return None;
        }
        list.trigger_load_more()
    }
}

impl Default for ScrollObserver {
    fn default() -> Self {
        Self {
            threshold_px: DEFAULT_THRESHOLD_PX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_near_bottom_threshold() {
        let observer = ScrollObserver::default();

        assert!(!observer.is_near_bottom(&ScrollMetrics::new(0.0, 800.0, 3000.0)));
        assert!(!observer.is_near_bottom(&ScrollMetrics::new(2000.0, 800.0, 3000.0)));
        assert!(observer.is_near_bottom(&ScrollMetrics::new(2001.0, 800.0, 3000.0)));
        assert!(observer.is_near_bottom(&ScrollMetrics::new(2500.0, 800.0, 3000.0)));
    }

    #[test]
    fn test_short_content_is_near_bottom() {
        let metrics = ScrollMetrics::new(0.0, 800.0, 400.0);
        assert_eq!(metrics.distance_to_bottom(), 0.0);
        assert!(ScrollObserver::default().is_near_bottom(&metrics));
    }

    #[test]
    fn test_rejects_bad_thresholds() {
        assert!(ScrollObserver::new(-1.0).is_err());
        assert!(ScrollObserver::new(f64::NAN).is_err());
        assert_eq!(ScrollObserver::new(0.0), Err(ListingError::InvalidThreshold(0.0)));

        let tight = ScrollObserver::new(1.0).unwrap();
        assert!(tight.is_near_bottom(&ScrollMetrics::new(2200.0, 800.0, 3000.0)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_observe_triggers_once_while_in_flight() {
        let list = IncrementalList::with_page_size((0..30).collect::<Vec<u32>>(), 10).unwrap();
        let observer = ScrollObserver::default();
        let bottom = ScrollMetrics::new(1000.0, 800.0, 1900.0);

        let first = observer.observe(&bottom, &list).expect("expansion started");
        assert!(observer.observe(&bottom, &list).is_none());

        assert!(first.await.unwrap());
        assert_eq!(list.loaded_count(), 20);

        let top = ScrollMetrics::new(0.0, 800.0, 1900.0);
        assert!(observer.observe(&top, &list).is_none());
    }
}
