use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::types::StockDataPoint;

/// Immutable, canonical daily series: strictly ascending by date, one bar per
/// trading day, every bar carrying well-formed prices.
///
/// A series is created once per data-provider fetch; user intents never patch
/// it incrementally, a new fetch replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StockSeries {
    points: Vec<StockDataPoint>,
}

impl StockSeries {
    /// Canonicalizes raw provider records: malformed bars are dropped, bars are
    /// sorted ascending by date, and duplicate dates collapse last-wins.
    #[must_use]
    pub fn from_points(mut points: Vec<StockDataPoint>) -> Self {
        let original_len = points.len();
        points.retain(StockDataPoint::has_valid_prices);
        points.sort_by_key(|point| point.time);

        let mut deduped: Vec<StockDataPoint> = Vec::with_capacity(points.len());
        let mut duplicate_count = 0_usize;
        for point in points {
            if let Some(last) = deduped.last_mut() {
                if point.time == last.time {
                    *last = point;
                    duplicate_count += 1;
                    continue;
                }
            }
            deduped.push(point);
        }

        let filtered_count = original_len.saturating_sub(deduped.len() + duplicate_count);
        if filtered_count > 0 || duplicate_count > 0 {
            warn!(
                filtered_count,
                duplicate_count,
                canonical_count = deduped.len(),
                "canonicalized stock series"
            );
        } else {
            debug!(count = deduped.len(), "stock series accepted as-is");
        }

        Self { points: deduped }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn points(&self) -> &[StockDataPoint] {
        &self.points
    }

    #[must_use]
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|point| point.time)
    }

    /// Inclusive index window; both bounds must already be in range.
    #[must_use]
    pub fn window(&self, start: usize, end: usize) -> &[StockDataPoint] {
        &self.points[start..=end]
    }

    /// First index whose date is on or after `date`, if any.
    #[must_use]
    pub fn first_index_on_or_after(&self, date: NaiveDate) -> Option<usize> {
        self.points.iter().position(|point| point.time >= date)
    }
}
