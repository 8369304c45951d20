pub mod indicators;
pub mod period;
pub mod series;
pub mod types;

pub use indicators::EnrichedWindow;
pub use period::{IndexWindow, PeriodSelection, PeriodToken};
pub use series::StockSeries;
pub use types::{IndicatorConfig, IndicatorKind, IndicatorParams, IndicatorSettings, StockDataPoint};
