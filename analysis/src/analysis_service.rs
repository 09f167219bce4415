use crate::aggregator::{aggregate, placeholder_error_record};
use crate::error::AnalysisError;
use crate::file_classifier::classify;
use crate::models::*;
use crate::openai_service::ChatModel;
use crate::progress::ProgressStore;
use crate::query_dispatcher::QueryDispatcher;
use crate::query_set::analysis_queries;
use crate::reference_data::ReferenceData;
use crate::response_normalizer::normalize_response;
use std::sync::Arc;

const CHAT_SYSTEM_PROMPT: &str = "You are an expert in technical drawings and documents. Help \
    users understand technical components and answer their questions about specifications, \
    systems, and technical details.";

// One aggregation run: classify -> dispatch -> normalize -> aggregate ->
// enrich -> summarize.
pub struct AnalysisService {
    model: Arc<dyn ChatModel>,
    reference: ReferenceData,
    progress: ProgressStore,
}

impl AnalysisService {
    pub fn new(model: Arc<dyn ChatModel>, reference: ReferenceData, progress: ProgressStore) -> Self {
        Self {
            model,
            reference,
            progress,
        }
    }

    pub async fn analyze(
        &self,
        file: &FilePayload,
        message: Option<&str>,
        session: &str,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        log::info!("starting analysis of '{}' ({})", file.name, file.mime_type);

        self.progress
            .update(session, "classifying", 5, "inspecting uploaded file")
            .await;
        let content = classify(file)?;

        let dispatcher = QueryDispatcher::new(self.model.clone(), self.progress.clone());
        let results = dispatcher.dispatch(&content, message, session).await;

        self.progress
            .update(session, "normalizing", 75, "parsing query responses")
            .await;
        let normalized: Vec<Vec<ComponentRecord>> = results
            .iter()
            .map(|result| {
                let records = normalize_response(&result.raw_text);
                log::info!(
                    "query '{}' contributed {} records",
                    result.query_name,
                    records.len()
                );
                records
            })
            .collect();

        self.progress
            .update(session, "aggregating", 85, "merging duplicate detections")
            .await;
        let mut bom = aggregate(&normalized);
        let succeeded = !bom.is_empty();
        if bom.is_empty() {
            log::error!("no usable response from any of the {} queries", results.len());
            bom.push(placeholder_error_record());
        }

        self.progress
            .update(session, "enriching", 92, "filling gaps from reference data")
            .await;
        self.reference.enrich_all(&mut bom);

        let response = if succeeded {
            format!(
                "Identified {} unique components across {} analysis passes.",
                bom.len(),
                analysis_queries().len()
            )
        } else {
            "Analysis failed: no usable response from any analysis query.".to_string()
        };

        let stage = if succeeded { "complete" } else { "failed" };
        self.progress.update(session, stage, 100, &response).await;

        Ok(AnalysisOutcome {
            response,
            bom,
            succeeded,
        })
    }

    // Plain conversational turn over prior context; no BOM pipeline.
    pub async fn chat(
        &self,
        message: &str,
        context: Vec<ChatMessage>,
    ) -> Result<String, AnalysisError> {
        let mut messages = vec![ChatMessage::system(CHAT_SYSTEM_PROMPT)];
        messages.extend(context);
        messages.push(ChatMessage::user(message));

        self.model
            .chat(messages)
            .await
            .map_err(|e| AnalysisError::Failed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;

    struct FixedModel {
        response: Result<String, String>,
    }

    #[async_trait]
    impl ChatModel for FixedModel {
        async fn complete(
            &self,
            _system_prompt: &str,
            _user_content: Vec<ContentPart>,
        ) -> Result<String> {
            self.response
                .clone()
                .map_err(|e| anyhow::anyhow!("{}", e))
        }

        async fn chat(&self, _messages: Vec<ChatMessage>) -> Result<String> {
            Ok("answer".to_string())
        }
    }

    fn service(response: Result<String, String>) -> AnalysisService {
        AnalysisService::new(
            Arc::new(FixedModel { response }),
            ReferenceData::empty(),
            ProgressStore::new(),
        )
    }

    fn image_payload() -> FilePayload {
        FilePayload {
            data: "data:image/png;base64,aGVsbG8=".to_string(),
            mime_type: "image/png".to_string(),
            name: "drawing.png".to_string(),
        }
    }

    #[tokio::test]
    async fn successful_run_produces_a_deduplicated_bom() {
        let service = service(Ok(
            r#"```json
[{"komponente":"Valve A","beschreibung":"DN20 ball valve","stueck":1}]
```"#
                .to_string(),
        ));

        let outcome = service
            .analyze(&image_payload(), Some("find the valves"), "s1")
            .await
            .unwrap();

        assert!(outcome.succeeded);
        // All four queries reported the same record; dedup keeps one.
        assert_eq!(outcome.bom.len(), 1);
        assert_eq!(outcome.bom[0].article_id, "ART-001");
        assert_eq!(outcome.bom[0].component_name, "Valve A");
    }

    #[tokio::test]
    async fn total_failure_still_returns_one_placeholder_row() {
        let service = service(Err("connect timeout".to_string()));

        let outcome = service.analyze(&image_payload(), None, "s1").await.unwrap();

        assert!(!outcome.succeeded);
        assert_eq!(outcome.bom.len(), 1);
        assert_eq!(outcome.bom[0].component_name, "error");
        assert_eq!(outcome.bom[0].article_id, "ART-001");
    }

    #[tokio::test]
    async fn unsupported_file_fails_before_any_model_call() {
        let service = service(Ok("should never be used".to_string()));
        let file = FilePayload {
            data: "data:text/plain;base64,aGVsbG8=".to_string(),
            mime_type: "text/plain".to_string(),
            name: "notes.txt".to_string(),
        };

        match service.analyze(&file, None, "s1").await {
            Err(AnalysisError::Input(_)) => {}
            other => panic!("expected input error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn progress_reaches_completion() {
        let service = service(Ok("[]".to_string()));
        let progress = service.progress.clone();

        service.analyze(&image_payload(), None, "s1").await.unwrap();

        let last = progress.get("s1").await.unwrap();
        assert_eq!(last.progress, 100);
        assert_eq!(last.stage, "failed");
    }
}
