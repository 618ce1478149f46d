//! Processing around the chunker: chapter detection and file output.
//!
//! This module provides:
//! - Book name and chapter heading detection
//! - Chinese numeral parsing for chapter numbers
//! - Markdown file output for chapters and chunks
//! - Word frequency counts

pub mod chapters;
pub mod numerals;
pub mod word_frequency;
pub mod writer;

pub use chapters::{chapter_number, extract_book_name, split_into_chapters, Book, Chapter};
pub use numerals::parse_chinese_numeral;
pub use word_frequency::{write_word_frequencies, WordFrequencies, WORD_FREQUENCY_FILE};
pub use writer::{chapter_dir, write_chapter, write_chunks};
