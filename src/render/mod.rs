use serde::{Deserialize, Serialize};

use crate::api::{Dataset, Panel, PanelOptions};

/// Everything the rendering backend needs to (re)create one panel chart
/// instance: the monotonic instance version plus the declarative dataset and
/// options descriptors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelCreateRequest {
    pub version: u64,
    pub dataset: Dataset,
    pub options: PanelOptions,
}

/// Contract implemented by any rendering backend.
///
/// `destroy` must be idempotent when no instance exists. `create` starts an
/// asynchronous chart construction; its completion is reported back to the
/// orchestrator through `settle_panel`, in any order.
pub trait PanelBackend {
    fn destroy(&mut self, panel: Panel);
    fn create(&mut self, panel: Panel, request: &PanelCreateRequest);
}

/// One observed backend call, in issue order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    Destroy {
        panel: Panel,
    },
    Create {
        panel: Panel,
        version: u64,
        label_count: usize,
        series_count: usize,
    },
}

/// No-op backend used by tests and headless orchestration.
///
/// It still validates dataset alignment so tests catch misaligned series
/// before a real backend is introduced.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub calls: Vec<BackendCall>,
    pub alignment_errors: usize,
}

impl RecordingBackend {
    #[must_use]
    pub fn creates_for(&self, panel: Panel) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, BackendCall::Create { panel: p, .. } if *p == panel))
            .count()
    }
}

impl PanelBackend for RecordingBackend {
    fn destroy(&mut self, panel: Panel) {
        self.calls.push(BackendCall::Destroy { panel });
    }

    fn create(&mut self, panel: Panel, request: &PanelCreateRequest) {
        if request.dataset.validate().is_err() {
            self.alignment_errors += 1;
        }
        self.calls.push(BackendCall::Create {
            panel,
            version: request.version,
            label_count: request.dataset.labels.len(),
            series_count: request.dataset.series.len(),
        });
    }
}
