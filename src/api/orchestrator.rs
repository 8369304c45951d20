//! Single-flight redraw state machine for the three chart panels.
//!
//! Chart instances owned by the rendering backend are not safe to mutate
//! concurrently with destroy/recreate, so every input change funnels through
//! one Idle/Drawing lock with trailing-edge coalescing: an intent arriving
//! mid-cycle is remembered (latest wins) and replayed once against the
//! then-current inputs after the in-flight cycle settles.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::core::indicators::{self, EnrichedWindow};
use crate::core::period::{IndexWindow, PeriodSelection, PeriodToken};
use crate::core::series::StockSeries;
use crate::core::types::{IndicatorConfig, IndicatorKind, IndicatorParams, StockDataPoint};
use crate::error::ChartResult;
use crate::render::{PanelBackend, PanelCreateRequest};

use super::dataset::{Dataset, Panel};
use super::options::PanelOptions;

/// Discrete user intent pushed into the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    PeriodChanged,
    IndicatorToggled,
    DataReplaced,
    ViewportResized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    Idle,
    Drawing,
}

/// One value per panel, addressable by [`Panel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PanelMap<T> {
    pub price: T,
    pub macd: T,
    pub rsi: T,
}

impl<T> PanelMap<T> {
    #[must_use]
    pub fn get(&self, panel: Panel) -> &T {
        match panel {
            Panel::Price => &self.price,
            Panel::Macd => &self.macd,
            Panel::Rsi => &self.rsi,
        }
    }

    pub fn get_mut(&mut self, panel: Panel) -> &mut T {
        match panel {
            Panel::Price => &mut self.price,
            Panel::Macd => &mut self.macd,
            Panel::Rsi => &mut self.rsi,
        }
    }
}

/// Monotonic per-panel instance counters, bumped before each recreation.
pub type PanelVersions = PanelMap<u64>;

/// Serializes destroy→recreate cycles of the three panel chart instances.
///
/// Owns the mutable redraw state exclusively; the presentation layer observes
/// it through the read accessors (`busy`, `versions`, `current_window`,
/// `panel_error`) and must disable intent-emitting controls while `busy()`.
pub struct RedrawOrchestrator<B: PanelBackend> {
    backend: B,

    series: StockSeries,
    config: IndicatorConfig,
    selection: PeriodSelection,

    phase: Phase,
    pending_intent: Option<Intent>,
    versions: PanelVersions,
    errors: PanelMap<bool>,
    settled: PanelMap<bool>,
    versions_at_cycle_start: PanelVersions,

    current_window: Option<IndexWindow>,
    resolved: EnrichedWindow,
}

impl<B: PanelBackend> RedrawOrchestrator<B> {
    /// Starts idle over an empty series with the conventional `3M` period.
    /// The first `replace_data` call draws the initial charts.
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            series: StockSeries::default(),
            config: IndicatorConfig::default(),
            selection: PeriodSelection::Preset(PeriodToken::ThreeMonths),
            phase: Phase::Idle,
            pending_intent: None,
            versions: PanelVersions::default(),
            errors: PanelMap::default(),
            settled: PanelMap::default(),
            versions_at_cycle_start: PanelVersions::default(),
            current_window: None,
            resolved: EnrichedWindow::default(),
        }
    }

    // ----- inbound intents -------------------------------------------------

    pub fn set_period(&mut self, token: PeriodToken) {
        self.selection = PeriodSelection::Preset(token);
        self.submit(Intent::PeriodChanged);
    }

    /// Switches to custom mode, seeding full-range bounds on first entry.
    pub fn enter_custom_period(&mut self) {
        if !matches!(self.selection, PeriodSelection::Custom { .. }) {
            self.selection = PeriodSelection::full_custom(self.series.len());
        }
        self.submit(Intent::PeriodChanged);
    }

    /// Applies slider bounds; out-of-range or reversed bounds are tolerated
    /// and clamped at resolution time.
    pub fn set_custom_period(&mut self, start: i64, end: i64) {
        self.selection = PeriodSelection::Custom { start, end };
        self.submit(Intent::PeriodChanged);
    }

    pub fn toggle_indicator(&mut self, kind: IndicatorKind, enabled: bool) {
        self.config.set_enabled(kind, enabled);
        self.submit(Intent::IndicatorToggled);
    }

    pub fn set_indicator_params(&mut self, kind: IndicatorKind, params: IndicatorParams) {
        self.config.set_params(kind, params);
        self.submit(Intent::IndicatorToggled);
    }

    /// Replaces the whole series (new provider fetch). The swap applies
    /// immediately, so a coalesced trailing cycle renders the new data; a
    /// stale period selection re-clamps instead of failing.
    pub fn replace_data(&mut self, points: Vec<StockDataPoint>) {
        self.series = StockSeries::from_points(points);
        self.submit(Intent::DataReplaced);
    }

    pub fn notify_resize(&mut self) {
        self.submit(Intent::ViewportResized);
    }

    // ----- backend completion ----------------------------------------------

    /// Reports the settlement of one panel's asynchronous creation, in any
    /// order. A failed panel keeps its previous version and last-good chart;
    /// the cycle still leaves `Drawing` once all three panels settle.
    pub fn settle_panel(&mut self, panel: Panel, result: ChartResult<()>) {
        if self.phase != Phase::Drawing {
            warn!(?panel, "panel settled outside a redraw cycle, ignoring");
            return;
        }
        if *self.settled.get(panel) {
            warn!(?panel, "panel settled twice in one cycle, ignoring");
            return;
        }
        *self.settled.get_mut(panel) = true;

        match result {
            Ok(()) => {
                *self.errors.get_mut(panel) = false;
                trace!(?panel, version = self.versions.get(panel), "panel settled");
            }
            Err(err) => {
                *self.errors.get_mut(panel) = true;
                *self.versions.get_mut(panel) = *self.versions_at_cycle_start.get(panel);
                warn!(?panel, error = %err, "panel render failed, keeping last-good instance");
            }
        }

        let all_settled = Panel::ALL.iter().all(|panel| *self.settled.get(*panel));
        if all_settled {
            self.phase = Phase::Idle;
            debug!("redraw cycle settled");
            if let Some(intent) = self.pending_intent.take() {
                self.begin_cycle(intent);
            }
        }
    }

    // ----- read port --------------------------------------------------------

    #[must_use]
    pub fn busy(&self) -> bool {
        self.phase == Phase::Drawing
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn versions(&self) -> PanelVersions {
        self.versions
    }

    #[must_use]
    pub fn version_of(&self, panel: Panel) -> u64 {
        *self.versions.get(panel)
    }

    #[must_use]
    pub fn panel_error(&self, panel: Panel) -> bool {
        *self.errors.get(panel)
    }

    #[must_use]
    pub fn current_window(&self) -> Option<IndexWindow> {
        self.current_window
    }

    /// Indicator columns of the last drawn window, for read-only display.
    #[must_use]
    pub fn resolved_values(&self) -> &EnrichedWindow {
        &self.resolved
    }

    #[must_use]
    pub fn selection(&self) -> PeriodSelection {
        self.selection
    }

    #[must_use]
    pub fn indicator_config(&self) -> &IndicatorConfig {
        &self.config
    }

    #[must_use]
    pub fn series(&self) -> &StockSeries {
        &self.series
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    #[must_use]
    pub fn into_backend(self) -> B {
        self.backend
    }

    // ----- state machine ----------------------------------------------------

    fn submit(&mut self, intent: Intent) {
        match self.phase {
            Phase::Drawing => {
                if let Some(previous) = self.pending_intent.replace(intent) {
                    trace!(?previous, ?intent, "coalesced pending intent");
                }
            }
            Phase::Idle => self.begin_cycle(intent),
        }
    }

    fn begin_cycle(&mut self, intent: Intent) {
        let Some(window) = self.selection.resolve(&self.series) else {
            debug!(?intent, "skipping redraw over empty series");
            self.current_window = None;
            self.resolved = EnrichedWindow::default();
            return;
        };

        let slice = self.series.window(window.start, window.end);
        let enriched = indicators::enrich(slice, &self.config);

        self.phase = Phase::Drawing;
        self.settled = PanelMap::default();
        self.versions_at_cycle_start = self.versions;
        self.current_window = Some(window);
        debug!(
            ?intent,
            start = window.start,
            end = window.end,
            "redraw cycle started"
        );

        // Fixed issue order; completion order is up to the backend.
        for panel in Panel::ALL {
            self.backend.destroy(panel);
            *self.versions.get_mut(panel) += 1;
            let dataset = Dataset::build_with(panel, slice, &enriched, &self.config);
            let request = PanelCreateRequest {
                version: *self.versions.get(panel),
                options: PanelOptions::for_dataset(&dataset),
                dataset,
            };
            self.backend.create(panel, &request);
        }

        self.resolved = enriched;
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::core::types::StockDataPoint;
    use crate::error::ChartError;
    use crate::render::{BackendCall, RecordingBackend};

    use super::{Intent, Panel, Phase, RedrawOrchestrator};

    fn points(days: usize) -> Vec<StockDataPoint> {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).expect("valid date");
        (0..days)
            .map(|i| {
                let date = start
                    .checked_add_days(chrono::Days::new(i as u64))
                    .expect("valid date");
                let close = 100.0 + i as f64;
                StockDataPoint::new(date, close, close + 2.0, close - 2.0, close, 1000)
            })
            .collect()
    }

    fn settle_all(orchestrator: &mut RedrawOrchestrator<RecordingBackend>) {
        for panel in Panel::ALL {
            orchestrator.settle_panel(panel, Ok(()));
        }
    }

    #[test]
    fn starts_idle_with_three_month_preset() {
        let orchestrator = RedrawOrchestrator::new(RecordingBackend::default());
        assert_eq!(orchestrator.phase(), Phase::Idle);
        assert!(!orchestrator.busy());
        assert_eq!(
            orchestrator.selection(),
            crate::core::period::PeriodSelection::Preset(
                crate::core::period::PeriodToken::ThreeMonths
            )
        );
    }

    #[test]
    fn first_data_replacement_draws_all_panels_in_order() {
        let mut orchestrator = RedrawOrchestrator::new(RecordingBackend::default());
        orchestrator.replace_data(points(10));

        assert!(orchestrator.busy());
        let calls = &orchestrator.backend().calls;
        assert_eq!(calls.len(), 6);
        let panels: Vec<Panel> = calls
            .iter()
            .filter_map(|call| match call {
                BackendCall::Create { panel, .. } => Some(*panel),
                BackendCall::Destroy { .. } => None,
            })
            .collect();
        assert_eq!(panels, vec![Panel::Price, Panel::Macd, Panel::Rsi]);
        assert_eq!(orchestrator.backend().alignment_errors, 0);

        settle_all(&mut orchestrator);
        assert!(!orchestrator.busy());
        assert_eq!(orchestrator.version_of(Panel::Price), 1);
    }

    #[test]
    fn empty_series_never_starts_a_cycle() {
        let mut orchestrator = RedrawOrchestrator::new(RecordingBackend::default());
        orchestrator.replace_data(Vec::new());

        assert!(!orchestrator.busy());
        assert!(orchestrator.backend().calls.is_empty());
        assert_eq!(orchestrator.current_window(), None);
    }

    #[test]
    fn settle_outside_cycle_is_ignored() {
        let mut orchestrator = RedrawOrchestrator::new(RecordingBackend::default());
        orchestrator.settle_panel(Panel::Price, Ok(()));
        assert_eq!(orchestrator.phase(), Phase::Idle);
        assert_eq!(orchestrator.version_of(Panel::Price), 0);
    }

    #[test]
    fn duplicate_settle_does_not_end_the_cycle_early() {
        let mut orchestrator = RedrawOrchestrator::new(RecordingBackend::default());
        orchestrator.replace_data(points(10));

        orchestrator.settle_panel(Panel::Price, Ok(()));
        orchestrator.settle_panel(Panel::Price, Ok(()));
        orchestrator.settle_panel(Panel::Macd, Ok(()));
        assert!(orchestrator.busy());

        orchestrator.settle_panel(Panel::Rsi, Ok(()));
        assert!(!orchestrator.busy());
    }

    #[test]
    fn failed_panel_keeps_its_version_and_flags_the_error() {
        let mut orchestrator = RedrawOrchestrator::new(RecordingBackend::default());
        orchestrator.replace_data(points(10));
        settle_all(&mut orchestrator);
        assert_eq!(orchestrator.version_of(Panel::Macd), 1);

        orchestrator.notify_resize();
        orchestrator.settle_panel(Panel::Price, Ok(()));
        orchestrator.settle_panel(
            Panel::Macd,
            Err(ChartError::InvalidData("backend rejected".into())),
        );
        orchestrator.settle_panel(Panel::Rsi, Ok(()));

        assert!(!orchestrator.busy(), "one failure must not hold the lock");
        assert!(orchestrator.panel_error(Panel::Macd));
        assert!(!orchestrator.panel_error(Panel::Price));
        assert_eq!(orchestrator.version_of(Panel::Macd), 1);
        assert_eq!(orchestrator.version_of(Panel::Price), 2);

        // The next successful cycle clears the flag.
        orchestrator.notify_resize();
        settle_all(&mut orchestrator);
        assert!(!orchestrator.panel_error(Panel::Macd));
        assert_eq!(orchestrator.version_of(Panel::Macd), 3);
    }

    #[test]
    fn intents_mid_cycle_coalesce_latest_wins() {
        let mut orchestrator = RedrawOrchestrator::new(RecordingBackend::default());
        orchestrator.replace_data(points(40));
        assert!(orchestrator.busy());

        // Two toggles land while drawing; only one trailing cycle runs and it
        // must observe the second toggle's final state.
        orchestrator.toggle_indicator(crate::core::types::IndicatorKind::Sma, true);
        orchestrator.toggle_indicator(crate::core::types::IndicatorKind::Sma, false);

        settle_all(&mut orchestrator);
        assert!(orchestrator.busy(), "pending intent must replay");
        settle_all(&mut orchestrator);
        assert!(!orchestrator.busy());

        // Two completed cycles in total: versions advanced by exactly 2.
        assert_eq!(orchestrator.version_of(Panel::Price), 2);
        assert_eq!(orchestrator.version_of(Panel::Macd), 2);
        assert_eq!(orchestrator.version_of(Panel::Rsi), 2);
        assert_eq!(orchestrator.backend().creates_for(Panel::Price), 2);
        assert!(!orchestrator
            .indicator_config()
            .enabled(crate::core::types::IndicatorKind::Sma));
    }

    #[test]
    fn pending_intent_uses_inputs_current_at_replay_time() {
        let mut orchestrator = RedrawOrchestrator::new(RecordingBackend::default());
        orchestrator.replace_data(points(10));
        assert!(orchestrator.busy());

        // A full replacement lands mid-cycle.
        orchestrator.replace_data(points(20));
        settle_all(&mut orchestrator);

        // Trailing cycle renders the replacement series.
        assert!(orchestrator.busy());
        let window = orchestrator.current_window().expect("cycle running");
        assert_eq!(window.end, 19);
        settle_all(&mut orchestrator);
        assert!(!orchestrator.busy());
    }

    #[test]
    fn submit_reenters_drawing_for_intent_kinds() {
        // Intent is carried for observability; every kind drives the same path.
        let mut orchestrator = RedrawOrchestrator::new(RecordingBackend::default());
        orchestrator.replace_data(points(10));
        settle_all(&mut orchestrator);

        for (i, intent) in [
            Intent::PeriodChanged,
            Intent::IndicatorToggled,
            Intent::ViewportResized,
        ]
        .iter()
        .enumerate()
        {
            match intent {
                Intent::PeriodChanged => {
                    orchestrator.set_period(crate::core::period::PeriodToken::All);
                }
                Intent::IndicatorToggled => {
                    orchestrator.toggle_indicator(crate::core::types::IndicatorKind::Ema, true);
                }
                Intent::ViewportResized => orchestrator.notify_resize(),
                Intent::DataReplaced => unreachable!(),
            }
            assert!(orchestrator.busy());
            settle_all(&mut orchestrator);
            assert_eq!(orchestrator.version_of(Panel::Price), i as u64 + 2);
        }
    }

    #[test]
    fn entering_custom_mode_seeds_full_range_once() {
        let mut orchestrator = RedrawOrchestrator::new(RecordingBackend::default());
        orchestrator.replace_data(points(10));
        settle_all(&mut orchestrator);

        orchestrator.enter_custom_period();
        assert_eq!(
            orchestrator.selection(),
            crate::core::period::PeriodSelection::Custom { start: 0, end: 9 }
        );
        settle_all(&mut orchestrator);

        orchestrator.set_custom_period(2, 5);
        settle_all(&mut orchestrator);

        // Re-entering custom mode keeps the dragged bounds.
        orchestrator.enter_custom_period();
        assert_eq!(
            orchestrator.selection(),
            crate::core::period::PeriodSelection::Custom { start: 2, end: 5 }
        );
        settle_all(&mut orchestrator);
    }
}
