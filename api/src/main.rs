mod analyze_request;
mod analyze_response;
mod auth;
mod chat_request;
mod export_request;
mod handlers;

use analysis_engine::{AnalysisService, ChatModel, OpenAiService, ProgressStore, ReferenceData};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::env;
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub struct AppState {
    pub service: Option<AnalysisService>,
    pub progress: ProgressStore,
    pub model_name: String,
}

#[tokio::main]
async fn main() {
    // Initialize environment variables and logging
    dotenv::dotenv().ok();
    env_logger::init();

    let reference_dir = env::var("REFERENCE_DATA_DIR").unwrap_or_else(|_| "data".to_string());
    let reference = ReferenceData::load(Path::new(&reference_dir));

    let progress = ProgressStore::new();

    // A missing API key disables analysis but never blocks startup; the
    // affected routes answer 503 instead.
    let (service, model_name) = match OpenAiService::new() {
        Ok(openai) => {
            let model_name = openai.model().to_string();
            println!("OpenAI client initialized (model: {})", model_name);
            let model: Arc<dyn ChatModel> = Arc::new(openai);
            (
                Some(AnalysisService::new(model, reference, progress.clone())),
                model_name,
            )
        }
        Err(err) => {
            eprintln!("AI features disabled: {}", err);
            (None, analysis_engine::DEFAULT_MODEL.to_string())
        }
    };

    let state = Arc::new(AppState {
        service,
        progress,
        model_name,
    });

    let api_routes = Router::new()
        .route("/analyze", post(handlers::analyze))
        .route("/chat", post(handlers::chat))
        .route("/export", post(handlers::export))
        .route("/progress", get(handlers::progress))
        .route_layer(middleware::from_fn(auth::auth_middleware));

    let app = Router::new()
        .route("/health", get(handlers::health))
        .route("/ping", get(handlers::ping))
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
        .with_state(state);

    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .unwrap();
    println!("Listening on {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.unwrap();
}
