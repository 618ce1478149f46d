//! Chunk type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Separator placed between paragraphs inside a chunk.
pub const PARAGRAPH_DELIMITER: &str = "\n\n";

/// How the body of a chunk was assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkKind {
    /// Whole paragraphs batched under the budget, joined by a blank line.
    Paragraphs,
    /// Sentences of one oversized paragraph, concatenated as-is.
    Sentences,
}

impl ChunkKind {
    /// Separator used to join the segments of a chunk of this kind.
    pub fn separator(&self) -> &'static str {
        match self {
            ChunkKind::Paragraphs => PARAGRAPH_DELIMITER,
            ChunkKind::Sentences => "",
        }
    }
}

impl std::fmt::Display for ChunkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChunkKind::Paragraphs => write!(f, "paragraphs"),
            ChunkKind::Sentences => write!(f, "sentences"),
        }
    }
}

/// A bounded unit of text ready to be handed to a downstream consumer.
///
/// `content` is the exact text to send. `segments` keeps the real
/// paragraphs (or sentences) it was built from, so the injected context
/// header can always be told apart from document content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique identifier for this chunk
    pub id: Uuid,

    /// Order of this chunk in the emitted sequence (0-indexed)
    pub chunk_index: usize,

    /// How the body was assembled
    pub kind: ChunkKind,

    /// Rendered text, including the context header when present
    pub content: String,

    /// Last paragraph of the previous batched chunk, carried as context
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    /// Real document content, in order, header excluded
    pub segments: Vec<String>,

    /// Number of characters in `content`
    pub char_count: usize,

    /// A single sentence that alone exceeds the budget
    #[serde(default)]
    pub irreducible: bool,

    /// When this chunk was created
    pub created_at: DateTime<Utc>,
}

impl Chunk {
    /// Create a chunk from its segments, rendering the content.
    pub fn new(
        chunk_index: usize,
        kind: ChunkKind,
        context: Option<ContextHeader<'_>>,
        segments: Vec<String>,
    ) -> Self {
        let body = segments.join(kind.separator());
        let content = match &context {
            Some(header) => format!("{}{}{}", header.render(), PARAGRAPH_DELIMITER, body),
            None => body,
        };

        Self {
            id: Uuid::new_v4(),
            chunk_index,
            kind,
            char_count: content.chars().count(),
            content,
            context: context.map(|h| h.paragraph.to_string()),
            segments,
            irreducible: false,
            created_at: Utc::now(),
        }
    }

    /// Mark this chunk as holding a sentence that cannot be split further.
    pub fn with_irreducible(mut self, irreducible: bool) -> Self {
        self.irreducible = irreducible;
        self
    }

    /// Document content of the chunk with any context header removed.
    pub fn body(&self) -> String {
        self.segments.join(self.kind.separator())
    }

    /// Whether a context header was prepended.
    pub fn has_context(&self) -> bool {
        self.context.is_some()
    }

    /// Get the length of the chunk content in characters.
    pub fn len(&self) -> usize {
        self.char_count
    }

    /// Check if the chunk is empty.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Synthetic pseudo-paragraph carrying the previous chunk's last paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextHeader<'a> {
    pub label: &'a str,
    pub paragraph: &'a str,
}

impl<'a> ContextHeader<'a> {
    pub fn new(label: &'a str, paragraph: &'a str) -> Self {
        Self { label, paragraph }
    }

    /// Render the header as it appears at the top of a chunk.
    pub fn render(&self) -> String {
        format!("{}\n{}\n", self.label, self.paragraph)
    }
}
