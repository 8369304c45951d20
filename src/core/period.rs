use chrono::Months;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::series::StockSeries;

/// Named trailing-window presets measured in calendar months from the last
/// record's date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PeriodToken {
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "3M")]
    ThreeMonths,
    #[serde(rename = "6M")]
    SixMonths,
    #[serde(rename = "1Y")]
    OneYear,
    #[serde(rename = "5Y")]
    FiveYears,
    #[serde(rename = "ALL")]
    All,
}

impl PeriodToken {
    #[must_use]
    pub const fn months_back(self) -> Option<u32> {
        match self {
            Self::OneMonth => Some(1),
            Self::ThreeMonths => Some(3),
            Self::SixMonths => Some(6),
            Self::OneYear => Some(12),
            Self::FiveYears => Some(60),
            Self::All => None,
        }
    }
}

/// A user-selected display period: either a preset token or explicit slider
/// bounds. Custom bounds are slider-domain integers and may be out of range;
/// resolution clamps and reorders them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodSelection {
    Preset(PeriodToken),
    Custom { start: i64, end: i64 },
}

impl PeriodSelection {
    /// Seed bounds when entering custom mode for the first time: full range.
    #[must_use]
    pub fn full_custom(series_len: usize) -> Self {
        Self::Custom {
            start: 0,
            end: series_len.saturating_sub(1) as i64,
        }
    }

    /// Resolves this selection to an inclusive, in-bounds, non-empty index
    /// window over `series`. Returns `None` only for an empty series.
    #[must_use]
    pub fn resolve(self, series: &StockSeries) -> Option<IndexWindow> {
        if series.is_empty() {
            return None;
        }
        let last_index = series.len() - 1;

        let window = match self {
            Self::Preset(token) => {
                let start = match token.months_back() {
                    None => 0,
                    Some(months) => {
                        let last_date = series.last_date()?;
                        // A window wider than the calendar representation
                        // clamps to the start of the series.
                        match last_date.checked_sub_months(Months::new(months)) {
                            Some(cutoff) => series.first_index_on_or_after(cutoff).unwrap_or(0),
                            None => 0,
                        }
                    }
                };
                IndexWindow {
                    start,
                    end: last_index,
                }
            }
            Self::Custom { start, end } => {
                let clamp = |bound: i64| bound.clamp(0, last_index as i64) as usize;
                let (low, high) = if start <= end {
                    (clamp(start), clamp(end))
                } else {
                    (clamp(end), clamp(start))
                };
                IndexWindow {
                    start: low,
                    end: high,
                }
            }
        };

        debug!(
            start = window.start,
            end = window.end,
            series_len = series.len(),
            "resolved period selection"
        );
        Some(window)
    }
}

/// Inclusive, in-bounds index window over a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexWindow {
    pub start: usize,
    pub end: usize,
}

impl IndexWindow {
    #[must_use]
    pub const fn len(self) -> usize {
        self.end - self.start + 1
    }

    /// Windows are non-empty by construction; both bounds are inclusive.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        false
    }
}
