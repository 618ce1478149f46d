//! Core types for the chunking service.

mod chunk;
mod config;
mod source;

pub use chunk::{Chunk, ChunkKind, ContextHeader, PARAGRAPH_DELIMITER};
pub use config::{ChunkConfig, CompletionSettings, ServiceConfig};
pub use source::{
    BatchChunkRequest, BookChunkRequest, BookChunkResponse, ChapterChunks, ChunkRequest,
    ChunkResponse, Document, DocumentChunks, DocumentItem,
};
