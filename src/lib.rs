//! Passage Chunker Library
//!
//! Splits long documents into ordered chunks that each fit a character
//! budget, respecting paragraph and sentence boundaries. Every paragraph
//! batch after the first repeats the previous batch's last paragraph as a
//! context header, so a size-limited consumer can process the document
//! piece by piece without losing the thread.

pub mod api;
pub mod batch;
pub mod chunkers;
pub mod error;
pub mod output;
pub mod processing;
pub mod types;

pub use batch::{BatchConfig, BatchProcessor, BatchResult};
pub use chunkers::{chunk_text, Chunker, ContextChunker, SentenceSplitter};
pub use error::ChunkError;
pub use types::{Chunk, ChunkConfig, ChunkKind, Document};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::batch::*;
    pub use crate::chunkers::*;
    pub use crate::error::ChunkError;
    pub use crate::types::*;
}

/// Default chunk budget in characters
pub const DEFAULT_MAX_CHARS: usize = 2000;

/// Characters charged for a context header on top of the carried paragraph.
///
/// Stands in for the header wording regardless of the label's actual length.
pub const CONTEXT_HEADER_OVERHEAD: usize = 20;

/// Label printed above a carried paragraph
pub const DEFAULT_CONTEXT_LABEL: &str = "Previous context:";

/// Default number of documents chunked in parallel
pub const DEFAULT_BATCH_CONCURRENCY: usize = 4;

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 3017;
