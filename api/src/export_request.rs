use analysis_engine::ComponentRecord;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct ExportRequest {
    pub bom: Vec<ComponentRecord>,
}
