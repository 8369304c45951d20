pub mod dataset;
pub mod options;
pub mod orchestrator;

pub use dataset::{Dataset, OhlcBar, Panel, SeriesChannel, SeriesKind, SeriesSpec, ValueAxis};
pub use options::{
    InteractionOptions, PanelOptions, TimeAxisOptions, ValueAxisOptions, format_tick,
    format_tooltip_date,
};
pub use orchestrator::{Intent, PanelMap, PanelVersions, Phase, RedrawOrchestrator};
