use analysis_engine::ComponentRecord;
use serde::Serialize;

#[derive(Serialize)]
pub struct AnalyzeResponse {
    pub response: String,
    pub bom: Vec<ComponentRecord>,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}
