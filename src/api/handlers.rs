//! HTTP request handlers for the chunking service.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, info};

use crate::batch::{BatchConfig, BatchProcessor};
use crate::chunkers::{Chunker, ContextChunker};
use crate::error::ChunkError;
use crate::processing::split_into_chapters;
use crate::types::{
    BatchChunkRequest, BookChunkRequest, BookChunkResponse, ChapterChunks, ChunkConfig,
    ChunkRequest, ChunkResponse, DocumentChunks, ServiceConfig,
};

/// Application state shared across handlers.
pub struct AppState {
    pub chunker: Arc<dyn Chunker>,
    pub batch: BatchProcessor,
    pub config: ServiceConfig,
}

impl AppState {
    pub fn new(config: ServiceConfig) -> Self {
        let chunker: Arc<dyn Chunker> = Arc::new(ContextChunker::new());
        let batch = BatchProcessor::new(
            Arc::clone(&chunker),
            BatchConfig {
                concurrency: config.batch_concurrency,
                continue_on_error: true,
            },
        );
        Self {
            chunker,
            batch,
            config,
        }
    }

    /// Chunk configuration for a request, applying an optional budget.
    pub fn chunk_config(&self, max_chars: Option<i64>) -> Result<ChunkConfig, ChunkError> {
        self.config.chunk_config_for(max_chars)
    }
}

/// Errors returned to HTTP clients.
#[derive(Debug)]
pub enum ApiError {
    /// The request broke the chunking contract
    BadRequest(String),
    /// Anything else
    Internal(String),
}

impl From<ChunkError> for ApiError {
    fn from(err: ChunkError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<ChunkError>() {
            Some(chunk_err) => ApiError::BadRequest(chunk_err.to_string()),
            None => ApiError::Internal(err.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Internal(message) => {
                error!(error = %message, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
}

/// Health check endpoint.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Chunk a single text.
pub async fn chunk_text(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChunkRequest>,
) -> Result<Json<ChunkResponse>, ApiError> {
    let config = state.chunk_config(request.max_chars)?;
    let chunks = state.chunker.chunk(&request.text, &config)?;

    info!(
        text_len = request.text.len(),
        max_chars = config.max_chars,
        chunks = chunks.len(),
        "Chunked text"
    );

    Ok(Json(ChunkResponse::new(config.max_chars, chunks)))
}

/// Batch chunking response.
#[derive(Debug, Serialize)]
pub struct BatchChunkResponse {
    pub max_chars: usize,
    pub total_items: usize,
    pub processed_items: usize,
    pub failed_items: usize,
    pub total_chunks: usize,
    pub documents: Vec<DocumentChunks>,
}

/// Chunk several documents concurrently.
pub async fn chunk_batch(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BatchChunkRequest>,
) -> Result<Json<BatchChunkResponse>, ApiError> {
    let config = state.chunk_config(request.max_chars)?;
    let (documents, result) = state.batch.process_batch(request.documents, &config).await?;

    Ok(Json(BatchChunkResponse {
        max_chars: config.max_chars,
        total_items: result.total_items,
        processed_items: result.processed_items,
        failed_items: result.failed_items,
        total_chunks: result.total_chunks,
        documents,
    }))
}

/// Split a book into chapters and chunk each chapter.
pub async fn chunk_book(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BookChunkRequest>,
) -> Result<Json<BookChunkResponse>, ApiError> {
    let config = state.chunk_config(request.max_chars)?;
    let book = split_into_chapters(&request.text);

    let chapters = book
        .chapters
        .iter()
        .map(|chapter| {
            Ok(ChapterChunks {
                title: chapter.title.clone(),
                number: chapter.number_or_zero(),
                chunks: state.chunker.chunk(&chapter.content, &config)?,
            })
        })
        .collect::<Result<Vec<_>, ChunkError>>()?;

    Ok(Json(BookChunkResponse {
        book_name: book.name,
        max_chars: config.max_chars,
        chapters,
    }))
}

/// Get the default chunk configuration.
pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<ChunkConfig> {
    Json(state.config.chunk_config())
}
