use thiserror::Error;

// Caller-visible failure classes. Per-query and parse failures are absorbed
// inside the pipeline and never surface through this type.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid input: {0}")]
    Input(String),
    #[error("AI service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("analysis failed: {0}")]
    Failed(String),
}
