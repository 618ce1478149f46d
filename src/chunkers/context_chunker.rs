//! Paragraph chunker with context carry-over between chunks.

use std::sync::Arc;

use tracing::debug;

use super::base::{char_len, Chunker, PunctuationSplitter, SentenceSplitter};
use super::sentence_packer::{SentenceGroup, SentencePacker};
use crate::error::ChunkError;
use crate::types::{Chunk, ChunkConfig, ChunkKind, ContextHeader, Document};

/// Chunker that batches whole paragraphs under a character budget.
///
/// Each paragraph-batched chunk after the first opens with a context header
/// holding the last paragraph of the previous paragraph-batched chunk.
/// Paragraphs longer than the budget are re-split into sentences and
/// emitted as their own chunks. Those sentence chunks never carry a header
/// and never become the source of one.
pub struct ContextChunker {
    packer: SentencePacker,
}

impl ContextChunker {
    /// Create a chunker that splits sentences on terminal punctuation.
    pub fn new() -> Self {
        Self::with_splitter(PunctuationSplitter::new())
    }

    /// Create a chunker with a custom sentence tokenizer.
    pub fn with_splitter<S: SentenceSplitter + 'static>(splitter: S) -> Self {
        Self {
            packer: SentencePacker::new(Arc::new(splitter)),
        }
    }

    /// Chunk an already parsed document.
    pub fn chunk_document(
        &self,
        document: &Document<'_>,
        config: &ChunkConfig,
    ) -> Result<Vec<Chunk>, ChunkError> {
        config.validate()?;

        let max_chars = config.max_chars;
        let mut out = Emitter::new(config);
        let mut pending = Pending::new();
        let mut last_paragraph: Option<&str> = None;

        for &paragraph in document.paragraphs() {
            let len = char_len(paragraph);

            if pending.is_vacant() {
                pending.carry(last_paragraph, config);
            }

            if len > max_chars {
                if pending.has_content() {
                    last_paragraph = out.flush(&mut pending);
                }
                for group in self.packer.pack(paragraph, max_chars) {
                    out.emit_sentences(group);
                }
                continue;
            }

            if pending.len + len > max_chars && pending.has_content() {
                last_paragraph = out.flush(&mut pending);
                pending.carry(last_paragraph, config);
            }

            pending.push(paragraph, len);
        }

        if pending.has_content() {
            out.flush(&mut pending);
        }

        let chunks = out.finish();
        debug!(
            paragraphs = document.len(),
            chunks = chunks.len(),
            max_chars,
            splitter = self.packer.splitter_name(),
            "Chunked document"
        );

        Ok(chunks)
    }
}

impl Default for ContextChunker {
    fn default() -> Self {
        Self::new()
    }
}

impl Chunker for ContextChunker {
    fn name(&self) -> &'static str {
        "context"
    }

    fn description(&self) -> &'static str {
        "Batches paragraphs under a character budget and carries the previous chunk's last paragraph as context"
    }

    fn chunk(&self, text: &str, config: &ChunkConfig) -> Result<Vec<Chunk>, ChunkError> {
        self.chunk_document(&Document::parse(text), config)
    }
}

/// Chunk `text` under `max_chars` and return the rendered chunk texts.
///
/// Fails with [`ChunkError::InvalidBudget`] before doing any work when
/// `max_chars` is zero or negative. Empty input yields an empty vector.
pub fn chunk_text(text: &str, max_chars: i64) -> Result<Vec<String>, ChunkError> {
    let config = ChunkConfig::from_budget(max_chars)?;
    let chunks = ContextChunker::new().chunk(text, &config)?;
    Ok(chunks.into_iter().map(|c| c.content).collect())
}

/// Paragraphs waiting to become the next chunk.
///
/// `len` counts paragraph characters plus the fixed charge for a context
/// header. Delimiters are not counted.
struct Pending<'a> {
    context: Option<&'a str>,
    paragraphs: Vec<&'a str>,
    len: usize,
}

impl<'a> Pending<'a> {
    fn new() -> Self {
        Self {
            context: None,
            paragraphs: Vec::new(),
            len: 0,
        }
    }

    fn is_vacant(&self) -> bool {
        self.context.is_none() && self.paragraphs.is_empty()
    }

    /// A header on its own is not content and is never flushed.
    fn has_content(&self) -> bool {
        !self.paragraphs.is_empty()
    }

    fn carry(&mut self, last_paragraph: Option<&'a str>, config: &ChunkConfig) {
        if !config.carry_context {
            return;
        }
        if let Some(paragraph) = last_paragraph {
            self.context = Some(paragraph);
            self.len += char_len(paragraph) + config.context_overhead;
        }
    }

    fn push(&mut self, paragraph: &'a str, len: usize) {
        self.paragraphs.push(paragraph);
        self.len += len;
    }

    fn take(&mut self) -> Self {
        std::mem::replace(self, Self::new())
    }
}

/// Collects chunks in emission order.
struct Emitter<'c> {
    config: &'c ChunkConfig,
    chunks: Vec<Chunk>,
}

impl<'c> Emitter<'c> {
    fn new(config: &'c ChunkConfig) -> Self {
        Self {
            config,
            chunks: Vec::new(),
        }
    }

    /// Emit the pending batch and reset it. Returns its last paragraph.
    fn flush<'a>(&mut self, pending: &mut Pending<'a>) -> Option<&'a str> {
        let batch = pending.take();
        let last = batch.paragraphs.last().copied();
        let header = batch
            .context
            .map(|p| ContextHeader::new(&self.config.context_label, p));
        let segments = batch.paragraphs.iter().map(|p| p.to_string()).collect();

        let chunk = Chunk::new(self.chunks.len(), ChunkKind::Paragraphs, header, segments);
        self.chunks.push(chunk);
        last
    }

    fn emit_sentences(&mut self, group: SentenceGroup<'_>) {
        let irreducible = group.is_irreducible(self.config.max_chars);
        let segments = group.sentences.iter().map(|s| s.to_string()).collect();

        let chunk = Chunk::new(self.chunks.len(), ChunkKind::Sentences, None, segments)
            .with_irreducible(irreducible);
        self.chunks.push(chunk);
    }

    fn finish(self) -> Vec<Chunk> {
        self.chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunkers::base::UnicodeSentenceSplitter;
    use pretty_assertions::assert_eq;

    fn chunk(text: &str, config: &ChunkConfig) -> Vec<Chunk> {
        ContextChunker::new().chunk(text, config).unwrap()
    }

    /// Rebuild the paragraph sequence from chunk bodies, joining the sentence
    /// chunks of each oversized paragraph back together.
    fn reconstruct(chunks: &[Chunk], paragraphs: &[&str], max_chars: usize) -> Vec<String> {
        let mut rebuilt = Vec::new();
        let mut iter = chunks.iter();
        let mut expected = paragraphs.iter();

        while let Some(chunk) = iter.next() {
            match chunk.kind {
                ChunkKind::Paragraphs => {
                    for segment in &chunk.segments {
                        rebuilt.push(segment.clone());
                        expected.next();
                    }
                }
                ChunkKind::Sentences => {
                    let target = expected.next().copied().unwrap_or_default();
                    assert!(char_len(target) > max_chars);
                    let mut text = chunk.body();
                    while text != target {
                        let next = iter.next().expect("sentence chunks ran out");
                        assert_eq!(next.kind, ChunkKind::Sentences);
                        text.push_str(&next.body());
                    }
                    rebuilt.push(text);
                }
            }
        }
        rebuilt
    }

    fn sample_document() -> String {
        let long = "The river bent twice before the mill. Nobody remembered who built it! \
                    Was it the miller's grandfather? Some said so, others laughed. \
                    In any case the wheel still turned every spring.";
        [
            "Opening line of the story.",
            "A second, slightly longer paragraph about the valley and its people.",
            long,
            "Short.",
            "Another paragraph follows the long one and closes the scene.",
            "The end.",
        ]
        .join("\n\n")
    }

    #[test]
    fn test_two_short_paragraphs_force_flush() {
        let text = "A short first paragraph.\n\nA second paragraph that is also short.";
        let chunks = chunk(text, &ChunkConfig::with_max_chars(40));

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].content, "A short first paragraph.");
        assert_eq!(chunks[1].body(), "A second paragraph that is also short.");
        assert_eq!(chunks[1].context.as_deref(), Some("A short first paragraph."));
    }

    #[test]
    fn test_two_short_paragraphs_without_context() {
        let text = "A short first paragraph.\n\nA second paragraph that is also short.";
        let chunks = chunk(text, &ChunkConfig::with_max_chars(40).without_context());
        let contents: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();

        assert_eq!(
            contents,
            vec!["A short first paragraph.", "A second paragraph that is also short."]
        );
    }

    #[test]
    fn test_oversized_paragraph_splits_into_sentences() {
        let paragraph = format!(
            "{}. {}. {}.",
            "a".repeat(165),
            "b".repeat(165),
            "c".repeat(165)
        );
        assert_eq!(char_len(&paragraph), 500);

        let chunks = chunk(&paragraph, &ChunkConfig::with_max_chars(200));

        assert_eq!(chunks.len(), 3);
        for c in &chunks {
            assert_eq!(c.kind, ChunkKind::Sentences);
            assert!(!c.has_context());
            assert!(c.len() <= 200);
        }
        let joined: String = chunks.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(joined, paragraph);
    }

    #[test]
    fn test_tiny_input_under_budget() {
        assert_eq!(chunk_text("Hi.", 10).unwrap(), vec!["Hi.".to_string()]);
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        assert!(chunk_text("", 100).unwrap().is_empty());
        assert!(chunk_text("   \n\n \t \n\n", 100).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_budget_fails_fast() {
        assert_eq!(
            chunk_text("Some text.", 0),
            Err(ChunkError::InvalidBudget { max_chars: 0 })
        );
        assert_eq!(
            chunk_text("", -7),
            Err(ChunkError::InvalidBudget { max_chars: -7 })
        );
        let result = ContextChunker::new().chunk("text", &ChunkConfig::with_max_chars(0));
        assert!(result.is_err());
    }

    #[test]
    fn test_oversized_paragraph_keeps_dotted_tokens_whole() {
        let chunks = chunk_text("Visit the site. See www.example.com now.", 30).unwrap();
        assert_eq!(chunks, vec!["Visit the site.", " See www.example.com now."]);

        let chunks = chunk_text("Pi is 3.14159 roughly. And e is 2.71828.", 25).unwrap();
        assert_eq!(chunks, vec!["Pi is 3.14159 roughly.", " And e is 2.71828."]);
    }

    #[test]
    fn test_paragraph_equal_to_budget_is_not_split() {
        let chunks = chunk("Abcd. Efg.", &ChunkConfig::with_max_chars(10));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].kind, ChunkKind::Paragraphs);
        assert_eq!(chunks[0].content, "Abcd. Efg.");
    }

    #[test]
    fn test_sentence_chunks_do_not_update_context() {
        let text = "Alpha paragraph.\n\n\
                    First long sentence here. Second long sentence here. Third one.\n\n\
                    Omega paragraph.";
        let chunks = chunk(text, &ChunkConfig::with_max_chars(30));

        assert_eq!(chunks[0].content, "Alpha paragraph.");
        let last = chunks.last().unwrap();
        assert_eq!(last.kind, ChunkKind::Paragraphs);
        assert_eq!(last.segments, vec!["Omega paragraph.".to_string()]);
        assert_eq!(last.context.as_deref(), Some("Alpha paragraph."));

        let middle = &chunks[1..chunks.len() - 1];
        assert!(!middle.is_empty());
        assert!(middle
            .iter()
            .all(|c| c.kind == ChunkKind::Sentences && !c.has_context()));
    }

    #[test]
    fn test_header_alone_is_never_emitted() {
        let text = "Intro.\n\n\
                    This paragraph is made of several sentences. Each one is short. Together they overflow.";
        let chunks = chunk(text, &ChunkConfig::with_max_chars(50));

        assert!(chunks.iter().all(|c| !c.segments.is_empty()));
        assert_eq!(chunks[0].content, "Intro.");
        assert!(chunks[1..].iter().all(|c| c.kind == ChunkKind::Sentences));
    }

    #[test]
    fn test_irreducible_sentence_is_flagged() {
        let text = "Short one. This single sentence is much longer than the tiny budget. End.";
        let chunks = chunk(text, &ChunkConfig::with_max_chars(20));

        let irreducible: Vec<&Chunk> = chunks.iter().filter(|c| c.irreducible).collect();
        assert_eq!(irreducible.len(), 1);
        assert!(irreducible[0].len() > 20);
        assert_eq!(irreducible[0].segments.len(), 1);
    }

    #[test]
    fn test_custom_label_is_rendered() {
        let config = ChunkConfig::with_max_chars(30).with_context_label("上文概要：");
        let chunks = chunk("第一段内容。\n\n第二段内容比较长一些，需要单独成块。", &config);

        assert_eq!(chunks.len(), 1);
        let config = ChunkConfig::with_max_chars(15).with_context_label("上文概要：");
        let chunks = chunk("第一段内容。\n\n第二段内容比较长一些。", &config);
        assert_eq!(chunks.len(), 2);
        assert_eq!(
            chunks[1].content,
            "上文概要：\n第一段内容。\n\n\n第二段内容比较长一些。"
        );
    }

    #[test]
    fn test_header_overhead_counts_against_budget() {
        // A 5-char paragraph carried at +20 leaves room for one more 5-char paragraph
        let config = ChunkConfig::with_max_chars(30);
        let chunks = chunk(
            "aaaaaaaaaaaaaaaaaaaaaaaaaa\n\nbbbbb\n\nccccc\n\nddddd",
            &config,
        );
        let bodies: Vec<String> = chunks.iter().map(Chunk::body).collect();
        assert_eq!(
            bodies,
            vec![
                "aaaaaaaaaaaaaaaaaaaaaaaaaa".to_string(),
                "bbbbb".to_string(),
                "ccccc".to_string(),
                "ddddd".to_string(),
            ]
        );

        let cheap = config.with_context_overhead(0);
        let chunks = chunk("aaaaaaaaaaaaaaaaaaaaaaaaaa\n\nbbbbb\n\nccccc\n\nddddd", &cheap);
        assert_eq!(chunks[1].segments, vec!["bbbbb".to_string()]);
        assert_eq!(chunks[2].segments, vec!["ccccc".to_string(), "ddddd".to_string()]);
    }

    #[test]
    fn test_order_and_content_preserved_across_budgets() {
        let text = sample_document();
        let document = Document::parse(&text);

        for max_chars in [20, 45, 80, 120, 400] {
            let chunks = chunk(&text, &ChunkConfig::with_max_chars(max_chars));
            let rebuilt = reconstruct(&chunks, document.paragraphs(), max_chars);
            assert_eq!(rebuilt, document.paragraphs().to_vec(), "budget {max_chars}");

            for (i, c) in chunks.iter().enumerate() {
                assert_eq!(c.chunk_index, i);
                assert!(!c.segments.is_empty());
                let body_chars: usize = c.segments.iter().map(|s| char_len(s)).sum();
                assert!(body_chars <= max_chars || c.irreducible || c.segments.len() == 1);
                if c.kind == ChunkKind::Sentences {
                    assert!(c.len() <= max_chars || c.irreducible);
                }
            }
        }
    }

    #[test]
    fn test_context_comes_from_previous_paragraph_chunk() {
        let text = sample_document();
        let chunks = chunk(&text, &ChunkConfig::with_max_chars(80));

        let mut last_batched: Option<&str> = None;
        for c in &chunks {
            if c.kind == ChunkKind::Paragraphs {
                assert_eq!(c.context.as_deref(), last_batched);
                last_batched = c.segments.last().map(String::as_str);
            } else {
                assert!(c.context.is_none());
            }
        }
    }

    #[test]
    fn test_deterministic_output() {
        let text = sample_document();
        let config = ChunkConfig::with_max_chars(60);
        let first: Vec<String> = chunk(&text, &config).into_iter().map(|c| c.content).collect();
        let second: Vec<String> = chunk(&text, &config).into_iter().map(|c| c.content).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unicode_splitter_can_be_injected() {
        let chunker = ContextChunker::with_splitter(UnicodeSentenceSplitter);
        let text = "One sentence here. Two sentences here. Three sentences here.";
        let chunks = chunker.chunk(text, &ChunkConfig::with_max_chars(40)).unwrap();

        assert!(chunks.len() > 1);
        let joined: String = chunks.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(joined, text);
    }

    #[test]
    fn test_chinese_novel_text() {
        let text = "第一段。\n\n很长的一段话。这是第二句。这是第三句！还有第四句吗？\n\n结尾。";
        let chunks = chunk(text, &ChunkConfig::with_max_chars(10));

        assert_eq!(chunks[0].content, "第一段。");
        let sentences: Vec<&str> = chunks
            .iter()
            .filter(|c| c.kind == ChunkKind::Sentences)
            .map(|c| c.content.as_str())
            .collect();
        assert_eq!(sentences.concat(), "很长的一段话。这是第二句。这是第三句！还有第四句吗？");
        assert_eq!(chunks.last().unwrap().context.as_deref(), Some("第一段。"));
    }
}
