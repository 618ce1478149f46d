//! Base traits for chunkers and sentence tokenizers.

use unicode_segmentation::UnicodeSegmentation;

use crate::error::ChunkError;
use crate::types::{Chunk, ChunkConfig};

/// The core trait that all chunkers must implement.
///
/// A chunker takes raw text and splits it into bounded chunks that a
/// size-limited consumer can process one at a time.
pub trait Chunker: Send + Sync {
    /// Get the name of this chunker.
    fn name(&self) -> &'static str;

    /// Chunk the given text with the provided configuration.
    ///
    /// # Arguments
    /// * `text` - The raw document text
    /// * `config` - Configuration for chunking
    ///
    /// # Returns
    /// The chunks in emission order, or [`ChunkError::InvalidBudget`] when
    /// the budget is zero.
    fn chunk(&self, text: &str, config: &ChunkConfig) -> Result<Vec<Chunk>, ChunkError>;

    /// Get the description of this chunker.
    fn description(&self) -> &'static str {
        "A text chunker"
    }
}

/// Strategy for cutting a paragraph into sentences.
///
/// Implementations must partition the input: the returned pieces,
/// concatenated in order, equal the input exactly. Empty pieces are never
/// returned.
pub trait SentenceSplitter: Send + Sync {
    /// Split text into sentences.
    fn split<'a>(&self, text: &'a str) -> Vec<&'a str>;

    /// Short identifier for logs.
    fn name(&self) -> &'static str;
}

/// Sentence-ending marks recognised by default: CJK full-width and ASCII.
pub const DEFAULT_TERMINATORS: &[char] = &['。', '！', '？', '.', '!', '?'];

/// Splits after each run of terminal punctuation.
///
/// The punctuation stays with the sentence it ends. Whitespace following it
/// belongs to the next sentence, so nothing is lost. An ASCII terminator
/// only ends a sentence before whitespace or the end of text, which keeps
/// `3.14` and `www.example.com` whole. Full-width marks end a sentence
/// wherever they appear.
#[derive(Debug, Clone)]
pub struct PunctuationSplitter {
    terminators: Vec<char>,
}

impl PunctuationSplitter {
    /// Create a splitter with the default terminator set.
    pub fn new() -> Self {
        Self::with_terminators(DEFAULT_TERMINATORS.to_vec())
    }

    /// Create a splitter with a custom terminator set.
    pub fn with_terminators(terminators: Vec<char>) -> Self {
        Self { terminators }
    }

    fn is_terminator(&self, c: char) -> bool {
        self.terminators.contains(&c)
    }
}

impl Default for PunctuationSplitter {
    fn default() -> Self {
        Self::new()
    }
}

impl SentenceSplitter for PunctuationSplitter {
    fn split<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut sentences = Vec::new();
        let mut start = 0;
        let mut chars = text.char_indices().peekable();

        while let Some((i, c)) = chars.next() {
            if !self.is_terminator(c) {
                continue;
            }
            let next = chars.peek().map(|&(_, next)| next);
            // Keep "?!" and "..." together
            if next.map_or(false, |next| self.is_terminator(next)) {
                continue;
            }
            if c.is_ascii() && next.map_or(false, |next| !next.is_whitespace()) {
                continue;
            }
            let end = i + c.len_utf8();
            sentences.push(&text[start..end]);
            start = end;
        }

        if start < text.len() {
            sentences.push(&text[start..]);
        }

        sentences
    }

    fn name(&self) -> &'static str {
        "punctuation"
    }
}

/// Splits on Unicode sentence boundaries (UAX #29).
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeSentenceSplitter;

impl SentenceSplitter for UnicodeSentenceSplitter {
    fn split<'a>(&self, text: &'a str) -> Vec<&'a str> {
        text.split_sentence_bounds().filter(|s| !s.is_empty()).collect()
    }

    fn name(&self) -> &'static str {
        "unicode"
    }
}

/// Length of text in characters, the unit every budget is expressed in.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}
