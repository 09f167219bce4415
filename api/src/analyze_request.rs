use analysis_engine::FilePayload;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    pub file: Option<FilePayload>,
    pub message: Option<String>,
}
