//! Source documents and request/response definitions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::chunk::{Chunk, PARAGRAPH_DELIMITER};

/// A document viewed as an ordered run of non-empty paragraphs.
///
/// Paragraphs borrow from the source text and are trimmed of surrounding
/// whitespace. Whitespace-only runs between blank lines are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document<'a> {
    paragraphs: Vec<&'a str>,
}

impl<'a> Document<'a> {
    /// Split raw text on blank-line delimiters.
    pub fn parse(text: &'a str) -> Self {
        let paragraphs = text
            .split(PARAGRAPH_DELIMITER)
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        Self { paragraphs }
    }

    /// The paragraphs in source order.
    pub fn paragraphs(&self) -> &[&'a str] {
        &self.paragraphs
    }

    /// Number of non-empty paragraphs.
    pub fn len(&self) -> usize {
        self.paragraphs.len()
    }

    /// Whether the document has no content.
    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    /// Total characters across all paragraphs, delimiters excluded.
    pub fn char_count(&self) -> usize {
        self.paragraphs.iter().map(|p| p.chars().count()).sum()
    }
}

/// Request to chunk a single text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRequest {
    /// The text to chunk
    pub text: String,

    /// Character budget; the service default applies when absent
    #[serde(default)]
    pub max_chars: Option<i64>,
}

/// Response with the chunks of a single text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkResponse {
    /// Budget the text was chunked with
    pub max_chars: usize,

    /// Number of chunks produced
    pub total_chunks: usize,

    /// Chunks in emission order
    pub chunks: Vec<Chunk>,
}

impl ChunkResponse {
    pub fn new(max_chars: usize, chunks: Vec<Chunk>) -> Self {
        Self {
            max_chars,
            total_chunks: chunks.len(),
            chunks,
        }
    }
}

/// One document inside a batch request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentItem {
    /// Caller-supplied identifier, generated when absent
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    /// Optional human-readable title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// The text to chunk
    pub text: String,
}

impl DocumentItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: None,
            text: text.into(),
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Request to chunk several documents at once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchChunkRequest {
    /// Documents to chunk
    pub documents: Vec<DocumentItem>,

    /// Character budget shared by all documents
    #[serde(default)]
    pub max_chars: Option<i64>,
}

/// Chunks produced for one document of a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunks {
    /// ID of the document these chunks came from
    pub document_id: Uuid,

    /// Title of the document, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Chunks in emission order
    pub chunks: Vec<Chunk>,
}

/// Request to split a book into chapters and chunk each one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookChunkRequest {
    /// Full text of the book
    pub text: String,

    /// Character budget per chunk
    #[serde(default)]
    pub max_chars: Option<i64>,
}

/// Chunks of a single chapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterChunks {
    /// Chapter title with heading markers removed
    pub title: String,

    /// Chapter number, 0 when it could not be read from the title
    pub number: u32,

    /// Chunks of the chapter content
    pub chunks: Vec<Chunk>,
}

/// Response for a book chunking request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookChunkResponse {
    /// Book name detected from the opening lines
    pub book_name: String,

    /// Budget the chapters were chunked with
    pub max_chars: usize,

    /// Chapters in source order
    pub chapters: Vec<ChapterChunks>,
}
