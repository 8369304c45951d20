use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::dataset::{Dataset, Panel};

/// Month-granularity tick label, `YYYY/MM`.
#[must_use]
pub fn format_tick(date: NaiveDate) -> String {
    date.format("%Y/%m").to_string()
}

/// Tooltip date label, `YYYY/MM/DD`.
#[must_use]
pub fn format_tooltip_date(date: NaiveDate) -> String {
    date.format("%Y/%m/%d").to_string()
}

/// Hit-testing mode for tooltip and hover: whole time-axis index, no
/// per-series intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionOptions {
    pub index_mode: bool,
    pub intersect: bool,
}

impl Default for InteractionOptions {
    fn default() -> Self {
        Self {
            index_mode: true,
            intersect: false,
        }
    }
}

/// Time-axis configuration shared by all three panels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeAxisOptions {
    pub unit: String,
    pub tick_format: String,
    pub tooltip_format: String,
}

impl Default for TimeAxisOptions {
    fn default() -> Self {
        Self {
            unit: "month".to_owned(),
            tick_format: "%Y/%m".to_owned(),
            tooltip_format: "%Y/%m/%d".to_owned(),
        }
    }
}

/// One vertical axis: optional fixed range plus horizontal reference lines.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValueAxisOptions {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub reference_lines: Vec<f64>,
    /// Secondary axes skip grid lines over the chart area.
    pub draw_grid: bool,
}

/// Declarative per-panel options descriptor consumed by the rendering
/// backend alongside the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelOptions {
    pub panel: Panel,
    pub tooltip: InteractionOptions,
    pub hover: InteractionOptions,
    pub time_axis: TimeAxisOptions,
    pub primary_axis: ValueAxisOptions,
    /// Present only when the dataset scales a series against the right axis.
    pub secondary_axis: Option<ValueAxisOptions>,
}

impl PanelOptions {
    /// Derives the options descriptor for a built dataset.
    #[must_use]
    pub fn for_dataset(dataset: &Dataset) -> Self {
        let primary_axis = match dataset.panel {
            Panel::Rsi => ValueAxisOptions {
                min: Some(0.0),
                max: Some(100.0),
                reference_lines: vec![30.0, 70.0],
                draw_grid: true,
            },
            Panel::Price | Panel::Macd => ValueAxisOptions {
                draw_grid: true,
                ..ValueAxisOptions::default()
            },
        };

        let secondary_axis = dataset.uses_secondary_axis().then(|| ValueAxisOptions {
            draw_grid: false,
            ..ValueAxisOptions::default()
        });

        Self {
            panel: dataset.panel,
            tooltip: InteractionOptions::default(),
            hover: InteractionOptions::default(),
            time_axis: TimeAxisOptions::default(),
            primary_axis,
            secondary_axis,
        }
    }
}
