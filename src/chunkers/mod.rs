//! Chunking strategies and sentence tokenizers.

mod base;
mod context_chunker;
mod sentence_packer;

pub use base::{
    char_len, Chunker, PunctuationSplitter, SentenceSplitter, UnicodeSentenceSplitter,
    DEFAULT_TERMINATORS,
};
pub use context_chunker::{chunk_text, ContextChunker};
pub use sentence_packer::{SentenceGroup, SentencePacker};
