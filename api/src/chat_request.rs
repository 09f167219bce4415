use analysis_engine::ChatMessage;
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: Option<String>,
    pub context: Option<Vec<ChatMessage>>,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub response: String,
}
