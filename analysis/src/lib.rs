pub mod aggregator;
pub mod analysis_service;
pub mod csv_export;
pub mod error;
pub mod file_classifier;
pub mod models;
pub mod openai_service;
pub mod progress;
pub mod query_dispatcher;
pub mod query_set;
pub mod reference_data;
pub mod response_normalizer;

pub use analysis_service::AnalysisService;
pub use error::AnalysisError;
pub use models::*;
pub use openai_service::{ChatModel, OpenAiService, DEFAULT_MODEL};
pub use progress::{ProgressStore, ProgressUpdate};
pub use reference_data::ReferenceData;
