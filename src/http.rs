use crate::config::PulseConfig;
use crate::error::PulseError;
use crate::pipeline::UpdatePipeline;
use crate::source::PriceSnapshot;
use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{routing::get, Json, Router};
use serde::Serialize;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<UpdatePipeline>,
    pub config: PulseConfig,
}

// Wire names stay camelCase for compatibility with the original endpoints.

#[derive(Serialize)]
struct TestResponse {
    environment: EnvironmentFlags,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EnvironmentFlags {
    bot_token: bool,
    chat_id: bool,
    port: u16,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateResponse {
    success: bool,
    message: String,
    prices: Option<PriceSnapshot>,
    telegram_response: Value,
}

#[derive(Serialize)]
struct RateLimitResponse {
    success: bool,
    error: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FailureResponse {
    success: bool,
    error: String,
    stack: String,
    bot_token: bool,
    chat_id: bool,
}

async fn handle_root() -> &'static str {
    "Crypto Price Bot is running!"
}

async fn handle_test(State(state): State<AppState>) -> Json<TestResponse> {
    Json(TestResponse {
        environment: EnvironmentFlags {
            bot_token: state.config.telegram.has_bot_token(),
            chat_id: state.config.telegram.has_chat_id(),
            port: state.config.server.port,
        },
    })
}

/// Synchronous trigger. Deliberately permissive debug surface: failure
/// responses carry the error's debug rendering and credential presence flags.
async fn handle_update(State(state): State<AppState>) -> Response {
    match state.pipeline.run_update().await {
        Ok(report) => (
            StatusCode::OK,
            Json(UpdateResponse {
                success: true,
                message: report.message,
                prices: report.prices,
                telegram_response: report.telegram_response,
            }),
        )
            .into_response(),
        Err(PulseError::RateLimited { message }) => (
            StatusCode::TOO_MANY_REQUESTS,
            Json(RateLimitResponse {
                success: false,
                error: message,
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("On-demand update failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(FailureResponse {
                    success: false,
                    error: e.to_string(),
                    stack: format!("{:?}", e),
                    bot_token: state.config.telegram.has_bot_token(),
                    chat_id: state.config.telegram.has_chat_id(),
                }),
            )
                .into_response()
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handle_root))
        .route("/api/test", get(handle_test))
        .route("/api/update", get(handle_update))
        .with_state(state)
}

pub async fn run_http_server(state: AppState) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.server.port));
    let app = router(state);
    tracing::info!("Starting HTTP server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
