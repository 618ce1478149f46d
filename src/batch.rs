//! Batch processing for chunking many documents at once.

use std::sync::Arc;

use anyhow::Result;
use futures::stream::{self, StreamExt};
use tracing::{info, warn};
use uuid::Uuid;

use crate::chunkers::Chunker;
use crate::types::{ChunkConfig, DocumentChunks, DocumentItem};
use crate::DEFAULT_BATCH_CONCURRENCY;

/// Configuration for batch processing.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Maximum documents to chunk concurrently
    pub concurrency: usize,
    /// Whether to continue on individual item failures
    pub continue_on_error: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_BATCH_CONCURRENCY,
            continue_on_error: true,
        }
    }
}

/// Result of batch processing.
#[derive(Debug, Clone)]
pub struct BatchResult {
    pub total_items: usize,
    pub processed_items: usize,
    pub failed_items: usize,
    pub total_chunks: usize,
    pub errors: Vec<BatchError>,
}

/// Error during batch processing.
#[derive(Debug, Clone)]
pub struct BatchError {
    pub item_id: Uuid,
    pub error: String,
}

/// Chunks independent documents in parallel on the blocking thread pool.
///
/// Each document is chunked with its own local state, so no
/// synchronisation is needed between tasks.
pub struct BatchProcessor {
    chunker: Arc<dyn Chunker>,
    config: BatchConfig,
}

impl BatchProcessor {
    /// Create a new batch processor.
    pub fn new(chunker: Arc<dyn Chunker>, config: BatchConfig) -> Self {
        Self { chunker, config }
    }

    /// Chunk a batch of documents and return their chunks in input order.
    ///
    /// An invalid budget fails the whole batch before any document is
    /// touched.
    pub async fn process_batch(
        &self,
        items: Vec<DocumentItem>,
        chunk_config: &ChunkConfig,
    ) -> Result<(Vec<DocumentChunks>, BatchResult)> {
        chunk_config.validate()?;

        let total_items = items.len();
        info!(total_items, chunker = self.chunker.name(), "Starting batch processing");

        let outcomes: Vec<(Uuid, Result<DocumentChunks>)> = stream::iter(items)
            .map(|item| {
                let chunker = Arc::clone(&self.chunker);
                let config = chunk_config.clone();
                async move {
                    let id = item.id;
                    (id, chunk_item(chunker, item, config).await)
                }
            })
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await;

        let mut documents = Vec::with_capacity(total_items);
        let mut errors = Vec::new();

        for (item_id, outcome) in outcomes {
            match outcome {
                Ok(doc) => documents.push(doc),
                Err(e) => {
                    if !self.config.continue_on_error {
                        return Err(e);
                    }
                    warn!(item_id = %item_id, error = %e, "Failed to process item");
                    errors.push(BatchError {
                        item_id,
                        error: e.to_string(),
                    });
                }
            }
        }

        let result = BatchResult {
            total_items,
            processed_items: documents.len(),
            failed_items: errors.len(),
            total_chunks: documents.iter().map(|d| d.chunks.len()).sum(),
            errors,
        };

        info!(
            processed = result.processed_items,
            failed = result.failed_items,
            chunks = result.total_chunks,
            "Batch processing complete"
        );

        Ok((documents, result))
    }
}

async fn chunk_item(
    chunker: Arc<dyn Chunker>,
    item: DocumentItem,
    config: ChunkConfig,
) -> Result<DocumentChunks> {
    let DocumentItem { id, title, text } = item;
    let chunks = tokio::task::spawn_blocking(move || chunker.chunk(&text, &config)).await??;

    Ok(DocumentChunks {
        document_id: id,
        title,
        chunks,
    })
}
