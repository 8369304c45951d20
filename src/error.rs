use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("panel {panel:?} render rejected: {reason}")]
    PanelRender {
        panel: crate::api::Panel,
        reason: String,
    },
}
