//! HTTP chat server.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/` | Minimal chat page |
//! | `POST` | `/chat` | Answer a question: `{ "message": ... }` → `{ "response": ... }` |
//! | `POST` | `/clear_db` | Empty the configured collection |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! Ingestion is not exposed over HTTP; use `amrag ingest`.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so the chat page can be
//! served from elsewhere.

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::answer::answer_question;
use crate::context::AppContext;

const CHAT_PAGE: &str = include_str!("chat.html");

/// Starts the HTTP server on `[server].bind`. Runs until the process is
/// terminated.
pub async fn run_server(ctx: Arc<AppContext>) -> anyhow::Result<()> {
    let bind_addr = ctx.config().server.bind.clone();
    let app = router(ctx);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "chat server listening");
    println!("Chat server listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Build the router with all routes and the CORS layer.
pub fn router(ctx: Arc<AppContext>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_index))
        .route("/chat", post(handle_chat))
        .route("/clear_db", post(handle_clear))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(ctx)
}

// ============ GET / ============

async fn handle_index() -> Html<&'static str> {
    Html(CHAT_PAGE)
}

// ============ POST /chat ============

#[derive(Deserialize)]
struct ChatRequest {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Serialize)]
struct ChatResponse {
    response: String,
}

/// Always answers with a `response` string. Collaborator failures are
/// already turned into user-facing text by the answer orchestrator, so only
/// a missing message is a client error.
async fn handle_chat(
    State(ctx): State<Arc<AppContext>>,
    Json(request): Json<ChatRequest>,
) -> Response {
    let message = request.message.unwrap_or_default();
    if message.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ChatResponse {
                response: "No message provided.".to_string(),
            }),
        )
            .into_response();
    }

    let n_results = ctx.config().retrieval.n_results;
    let response = answer_question(&ctx, &message, n_results).await;
    Json(ChatResponse { response }).into_response()
}

// ============ POST /clear_db ============

#[derive(Serialize)]
struct StatusResponse {
    status: String,
    message: String,
}

async fn handle_clear(State(ctx): State<Arc<AppContext>>) -> Response {
    match ctx.clear().await {
        Ok(()) => Json(StatusResponse {
            status: "success".to_string(),
            message: "Database cleared and re-initialized successfully.".to_string(),
        })
        .into_response(),
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "clearing the database failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(StatusResponse {
                    status: "error".to_string(),
                    message: format!("Error clearing database: {:#}", e),
                }),
            )
                .into_response()
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{context_with, HashEmbedder, StubGenerator};
    use crate::store::VectorStore;
    use crate::models::{Chunk, ChunkRecord};

    fn ctx() -> (Arc<AppContext>, Arc<crate::store::memory::InMemoryStore>) {
        let (ctx, store) = context_with(Arc::new(HashEmbedder::new(4)), Arc::new(StubGenerator::default()));
        (Arc::new(ctx), store)
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn empty_message_is_rejected() {
        let (ctx, _) = ctx();
        let response = handle_chat(State(ctx), Json(ChatRequest { message: None })).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "response": "No message provided." })
        );
    }

    #[tokio::test]
    async fn chat_answers_from_the_store() {
        let (ctx, store) = ctx();
        store.get_or_create_collection("collection4").await.unwrap();
        let chunk = Chunk {
            source_file: "a.txt".to_string(),
            chunk_index: 0,
            text: "ሰላም ነው።".to_string(),
        };
        store
            .insert("collection4", &[ChunkRecord::new(&chunk, HashEmbedder::new(4).vector("ሰላም ነው።"))])
            .await
            .unwrap();

        let response = handle_chat(
            State(ctx),
            Json(ChatRequest {
                message: Some("ሰላም?".to_string()),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["response"], "አዲስ አበባ");
    }

    #[tokio::test]
    async fn clear_reports_success() {
        let (ctx, _) = ctx();
        let response = handle_clear(State(ctx.clone())).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "success");
        assert_eq!(ctx.store().unwrap().count("collection4").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn health_reports_version() {
        let Json(health) = handle_health().await;
        assert_eq!(health.status, "ok");
        assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
    }
}
