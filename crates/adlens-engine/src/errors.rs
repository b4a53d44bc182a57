use thiserror::Error;

/// Errors emitted by the metrics engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Data(#[from] adlens_core::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
