//! HTTP API server for integration with other systems.
//!
//! Exposes the pipeline invocation contract: an upload frontend creates a
//! pending lecture and triggers processing here by ID, then observes the
//! lecture's status field.

use crate::cli::Output;
use crate::config::Settings;
use crate::error::LecternError;
use crate::orchestrator::Orchestrator;
use crate::store::{Lecture, LectureStore};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Shared application state.
struct AppState {
    orchestrator: Orchestrator,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::new(settings)?;

    let state = Arc::new(AppState { orchestrator });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/lectures", get(list_lectures).post(create_lecture))
        .route("/lectures/{lecture_id}", get(get_lecture))
        .route("/process", post(process))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Lectern API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Create Lecture", "POST /lectures");
    Output::kv("List Lectures", "GET  /lectures");
    Output::kv("Get Lecture", "GET  /lectures/:lecture_id");
    Output::kv("Process", "POST /process");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct CreateLectureRequest {
    title: String,
    transcript: String,
    #[serde(default = "default_user")]
    user_id: String,
}

fn default_user() -> String {
    "api".to_string()
}

#[derive(Serialize)]
struct CreateLectureResponse {
    lecture_id: String,
    status: String,
}

#[derive(Deserialize)]
struct ProcessRequest {
    lecture_id: String,
}

#[derive(Serialize)]
struct ProcessResponse {
    success: bool,
    lecture_id: String,
    topic_count: usize,
    chunks_processed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct LectureListResponse {
    lectures: Vec<LectureInfo>,
    total: usize,
}

#[derive(Serialize)]
struct LectureInfo {
    lecture_id: String,
    title: String,
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    topic_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    processed_at: Option<String>,
}

#[derive(Serialize)]
struct LectureDetailResponse {
    lecture_id: String,
    title: String,
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    processing_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    topic_count: Option<u32>,
    chunk_count: usize,
    topics: Vec<TopicInfo>,
}

#[derive(Serialize)]
struct TopicInfo {
    title: String,
    summary: String,
    order_index: u32,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn create_lecture(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateLectureRequest>,
) -> impl IntoResponse {
    let lecture = Lecture::new(req.user_id, req.title, req.transcript);

    match state.orchestrator.store().create_lecture(&lecture).await {
        Ok(()) => Json(CreateLectureResponse {
            lecture_id: lecture.id,
            status: lecture.status.to_string(),
        })
        .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

async fn process(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProcessRequest>,
) -> impl IntoResponse {
    match state.orchestrator.process_lecture(&req.lecture_id).await {
        Ok(outcome) => Json(ProcessResponse {
            success: true,
            lecture_id: outcome.lecture_id,
            topic_count: outcome.topic_count,
            chunks_processed: outcome.chunks_processed,
            error: None,
        })
        .into_response(),
        Err(e) => {
            let status = match &e {
                LecternError::LectureNotFound(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (
                status,
                Json(ProcessResponse {
                    success: false,
                    lecture_id: req.lecture_id,
                    topic_count: 0,
                    chunks_processed: 0,
                    error: Some(e.to_string()),
                }),
            )
                .into_response()
        }
    }
}

async fn list_lectures(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.orchestrator.store().list_lectures().await {
        Ok(lectures) => Json(LectureListResponse {
            total: lectures.len(),
            lectures: lectures
                .into_iter()
                .map(|l| LectureInfo {
                    lecture_id: l.id,
                    title: l.title,
                    status: l.status.to_string(),
                    topic_count: l.topic_count,
                    processed_at: l.processed_at.map(|dt| dt.to_rfc3339()),
                })
                .collect(),
        })
        .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

async fn get_lecture(
    State(state): State<Arc<AppState>>,
    axum::extract::Path(lecture_id): axum::extract::Path<String>,
) -> impl IntoResponse {
    let store = state.orchestrator.store();

    let lecture = match store.get_lecture(&lecture_id).await {
        Ok(Some(lecture)) => lecture,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: format!("Lecture not found: {}", lecture_id),
                }),
            )
                .into_response()
        }
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    };

    let chunk_count = match store.chunks_for_lecture(&lecture_id).await {
        Ok(chunks) => chunks.len(),
        Err(_) => 0,
    };

    let topics = match store.topics_for_lecture(&lecture_id).await {
        Ok(topics) => topics,
        Err(_) => Vec::new(),
    };

    Json(LectureDetailResponse {
        lecture_id: lecture.id,
        title: lecture.title,
        status: lecture.status.to_string(),
        processing_error: lecture.processing_error,
        topic_count: lecture.topic_count,
        chunk_count,
        topics: topics
            .into_iter()
            .map(|t| TopicInfo {
                title: t.title,
                summary: t.summary,
                order_index: t.order_index,
            })
            .collect(),
    })
    .into_response()
}
