use serde::{Deserialize, Serialize};

// Placeholders for fields the model output leaves blank.
pub const UNKNOWN_COMPONENT: &str = "unknown";
pub const NO_DESCRIPTION: &str = "no description available";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilePayload {
    pub data: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub name: String,
}

// One row of the final Bill of Materials. Renumbered by the aggregator,
// gap-filled (never overwritten) by the reference enricher.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRecord {
    pub plant: String,
    pub article_id: String,
    pub component_name: String,
    pub description: String,
    pub remark: String,
    pub count: u32,
    pub size: Option<String>,
    pub signal: Option<String>,
    pub rating: Option<String>,
    pub material: Option<String>,
}

impl ComponentRecord {
    pub fn with_name(component_name: String) -> Self {
        Self {
            plant: UNKNOWN_COMPONENT.to_string(),
            article_id: String::new(),
            component_name,
            description: NO_DESCRIPTION.to_string(),
            remark: String::new(),
            count: 1,
            size: None,
            signal: None,
            rating: None,
            material: None,
        }
    }

    pub fn has_placeholder_description(&self) -> bool {
        self.description.trim().is_empty() || self.description == NO_DESCRIPTION
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub query_name: String,
    pub raw_text: String,
    pub succeeded: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceEntry {
    pub code: String,
    pub description: String,
    pub size: Option<String>,
    pub signal: Option<String>,
    pub rating: Option<String>,
    pub material: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AnalysisQuery {
    pub name: &'static str,
    pub system_prompt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub response: String,
    pub bom: Vec<ComponentRecord>,
    pub succeeded: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: MessageContent::Text(text.into()),
        }
    }
}

// Either a plain string or a text/image part list for vision requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatChoice {
    pub message: ResponseMessage,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
}
