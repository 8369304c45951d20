//! stockchart-rs: indicator computation and redraw orchestration for a
//! three-panel (price/MACD/RSI) daily stock chart.
//!
//! The crate owns the technical-indicator engine, period resolution, the
//! declarative per-panel dataset/options descriptors, and the single-flight
//! redraw state machine. Data fetching and actual drawing are external
//! collaborators behind the [`render::PanelBackend`] port.

pub mod api;
pub mod core;
pub mod error;
pub mod render;
pub mod telemetry;

pub use api::{Dataset, Panel, PanelOptions, RedrawOrchestrator};
pub use crate::core::{
    IndicatorConfig, IndicatorKind, PeriodSelection, PeriodToken, StockDataPoint, StockSeries,
};
pub use error::{ChartError, ChartResult};
