use crate::file_classifier::AnalysisContent;
use crate::models::*;
use crate::openai_service::ChatModel;
use crate::progress::ProgressStore;
use crate::query_set::analysis_queries;
use std::sync::Arc;

const DEFAULT_MESSAGE: &str = "Please analyze this technical drawing.";

// Dispatch occupies the 10-70 band of the progress range; the surrounding
// pipeline stages own the rest.
const DISPATCH_PROGRESS_START: u8 = 10;
const DISPATCH_PROGRESS_SPAN: u8 = 60;

// Runs the analysis query set against the model, one query at a time, to
// bound rate-limit exposure and keep the progress indicator monotonic.
// A single query's failure is recorded as an empty-array response; the
// batch always runs to completion.
pub struct QueryDispatcher {
    model: Arc<dyn ChatModel>,
    progress: ProgressStore,
}

impl QueryDispatcher {
    pub fn new(model: Arc<dyn ChatModel>, progress: ProgressStore) -> Self {
        Self { model, progress }
    }

    pub async fn dispatch(
        &self,
        content: &AnalysisContent,
        message: Option<&str>,
        session: &str,
    ) -> Vec<QueryResult> {
        let queries = analysis_queries();
        let user_content = build_user_content(content, message);
        let mut results = Vec::with_capacity(queries.len());

        for (index, query) in queries.iter().enumerate() {
            let progress = DISPATCH_PROGRESS_START
                + (index as u8 * DISPATCH_PROGRESS_SPAN) / queries.len() as u8;
            self.progress
                .update(
                    session,
                    "analyzing",
                    progress,
                    &format!("running query {} of {}: {}", index + 1, queries.len(), query.name),
                )
                .await;

            let result = match self
                .model
                .complete(&query.system_prompt, user_content.clone())
                .await
            {
                Ok(raw_text) => {
                    log::info!("query '{}' returned {} characters", query.name, raw_text.len());
                    QueryResult {
                        query_name: query.name.to_string(),
                        raw_text,
                        succeeded: true,
                    }
                }
                Err(err) => {
                    log::warn!("query '{}' failed, continuing batch: {}", query.name, err);
                    QueryResult {
                        query_name: query.name.to_string(),
                        raw_text: "[]".to_string(),
                        succeeded: false,
                    }
                }
            };
            results.push(result);
        }

        self.progress
            .update(
                session,
                "analyzing",
                DISPATCH_PROGRESS_START + DISPATCH_PROGRESS_SPAN,
                "all analysis queries dispatched",
            )
            .await;

        results
    }
}

// The user content shared by every query in the set: extracted text for
// PDFs, a text-plus-image part list for images.
fn build_user_content(content: &AnalysisContent, message: Option<&str>) -> Vec<ContentPart> {
    let message = match message {
        Some(m) if !m.trim().is_empty() => m,
        _ => DEFAULT_MESSAGE,
    };

    match content {
        AnalysisContent::Text(text) => vec![ContentPart::Text {
            text: format!("{}\n\nPDF Content:\n{}", message, text),
        }],
        AnalysisContent::Image(url) => vec![
            ContentPart::Text {
                text: message.to_string(),
            },
            ContentPart::ImageUrl {
                image_url: ImageUrl { url: url.clone() },
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::Mutex;

    // Scripted responses, records every system prompt it sees.
    struct ScriptedModel {
        responses: Mutex<Vec<Result<String>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        fn new(responses: Vec<Result<String>>) -> Self {
            let mut responses = responses;
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        async fn complete(
            &self,
            system_prompt: &str,
            _user_content: Vec<ContentPart>,
        ) -> Result<String> {
            self.prompts.lock().unwrap().push(system_prompt.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Ok("[]".to_string()))
        }

        async fn chat(&self, _messages: Vec<ChatMessage>) -> Result<String> {
            Ok(String::new())
        }
    }

    #[tokio::test]
    async fn one_failing_query_does_not_abort_the_batch() {
        let model = Arc::new(ScriptedModel::new(vec![
            Ok(r#"[{"komponente":"Valve A"}]"#.to_string()),
            Err(anyhow::anyhow!("timeout")),
            Ok("[]".to_string()),
            Ok(r#"[{"komponente":"Fan 1"}]"#.to_string()),
        ]));
        let dispatcher = QueryDispatcher::new(model, ProgressStore::new());

        let results = dispatcher
            .dispatch(&AnalysisContent::Text("drawing text".to_string()), None, "s1")
            .await;

        assert_eq!(results.len(), 4);
        assert!(results[0].succeeded);
        assert!(!results[1].succeeded);
        assert_eq!(results[1].raw_text, "[]");
        assert!(results[3].succeeded);
    }

    #[tokio::test]
    async fn every_query_gets_its_own_system_prompt() {
        let model = Arc::new(ScriptedModel::new(vec![]));
        let dispatcher = QueryDispatcher::new(model.clone(), ProgressStore::new());

        dispatcher
            .dispatch(&AnalysisContent::Text("text".to_string()), Some("find valves"), "s1")
            .await;

        let prompts = model.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 4);
        assert_ne!(prompts[0], prompts[1]);
    }

    #[test]
    fn pdf_text_and_caller_message_share_one_text_part() {
        let parts = build_user_content(
            &AnalysisContent::Text("P-101 pump".to_string()),
            Some("list all pumps"),
        );
        assert_eq!(parts.len(), 1);
        match &parts[0] {
            ContentPart::Text { text } => {
                assert!(text.starts_with("list all pumps"));
                assert!(text.contains("PDF Content:\nP-101 pump"));
            }
            other => panic!("unexpected part: {:?}", other),
        }
    }

    #[test]
    fn image_content_defaults_the_caller_message() {
        let parts = build_user_content(&AnalysisContent::Image("data:image/png;base64,xx".to_string()), None);
        assert_eq!(parts.len(), 2);
        match &parts[0] {
            ContentPart::Text { text } => assert_eq!(text, DEFAULT_MESSAGE),
            other => panic!("unexpected part: {:?}", other),
        }
        assert!(matches!(&parts[1], ContentPart::ImageUrl { .. }));
    }
}
