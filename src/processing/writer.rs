//! Writing chapters and chunks to Markdown files.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use super::chapters::Chapter;
use crate::types::Chunk;

/// Replace characters that cannot appear in a single path component.
pub fn sanitize_component(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            other => other,
        })
        .collect();

    match cleaned.as_str() {
        "" | "." | ".." => "_".to_string(),
        _ => cleaned,
    }
}

/// Write a chapter to `<output>/<book>/<chapter title>/原文_第<n>章.md`.
///
/// The file starts with the book name as a level-one heading.
pub fn write_chapter(output_dir: &Path, book_name: &str, chapter: &Chapter) -> Result<PathBuf> {
    let chapter_dir = chapter_dir(output_dir, book_name, chapter);
    fs::create_dir_all(&chapter_dir)
        .with_context(|| format!("Failed to create directory {}", chapter_dir.display()))?;

    let path = chapter_dir.join(format!("原文_第{}章.md", chapter.number_or_zero()));
    let body = format!("# {}\n\n{}", book_name, chapter.content);
    fs::write(&path, body).with_context(|| format!("Failed to write {}", path.display()))?;

    info!(path = %path.display(), "Saved chapter");
    Ok(path)
}

/// Directory a chapter and its chunks are written to.
pub fn chapter_dir(output_dir: &Path, book_name: &str, chapter: &Chapter) -> PathBuf {
    output_dir
        .join(sanitize_component(book_name))
        .join(sanitize_component(&chapter.title))
}

/// Write each chunk to `<dir>/<stem>_<NNN>.md`, numbered from 1.
pub fn write_chunks(dir: &Path, stem: &str, chunks: &[Chunk]) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory {}", dir.display()))?;

    let stem = sanitize_component(stem);
    chunks
        .iter()
        .map(|chunk| {
            let path = dir.join(format!("{}_{:03}.md", stem, chunk.chunk_index + 1));
            fs::write(&path, &chunk.content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            Ok(path)
        })
        .collect()
}
