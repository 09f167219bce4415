use crate::error::AnalysisError;
use crate::models::*;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::env;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gpt-4o";
const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
const MAX_TOKENS: u32 = 1500;
// Upper bound on a single external call. A query exceeding it is treated as
// failed by the dispatcher and the batch continues.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

// Seam to the external chat-completions service; mocked in tests.
#[async_trait]
pub trait ChatModel: Send + Sync {
    // Vision-style completion: one system prompt plus mixed text/image
    // user content. Returns the raw text of the first choice.
    async fn complete(&self, system_prompt: &str, user_content: Vec<ContentPart>) -> Result<String>;

    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<String>;
}

pub struct OpenAiService {
    client: Client,
    api_key: String,
    model: String,
}

impl OpenAiService {
    pub fn new() -> Result<Self, AnalysisError> {
        let api_key = env::var("OPENAI_API_KEY").map_err(|_| {
            AnalysisError::ServiceUnavailable(
                "OPENAI_API_KEY environment variable not set".to_string(),
            )
        })?;

        let model = env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AnalysisError::ServiceUnavailable(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn send(&self, request: &ChatCompletionRequest) -> Result<String> {
        let response = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("OpenAI API error ({}): {}", status, error_text));
        }

        let completion: ChatCompletionResponse = response.json().await?;

        let answer = completion
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_else(|| "No response generated".to_string());

        Ok(answer)
    }
}

#[async_trait]
impl ChatModel for OpenAiService {
    async fn complete(&self, system_prompt: &str, user_content: Vec<ContentPart>) -> Result<String> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(system_prompt),
                ChatMessage {
                    role: "user".to_string(),
                    content: MessageContent::Parts(user_content),
                },
            ],
            max_tokens: MAX_TOKENS,
        };

        self.send(&request).await
    }

    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            max_tokens: MAX_TOKENS,
        };

        self.send(&request).await
    }
}
