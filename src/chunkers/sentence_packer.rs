//! Greedy sentence packing for paragraphs that exceed the budget.

use std::sync::Arc;

use super::base::{char_len, SentenceSplitter};

/// Consecutive sentences of one paragraph that fit the budget together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentenceGroup<'a> {
    pub sentences: Vec<&'a str>,
    pub char_count: usize,
}

impl<'a> SentenceGroup<'a> {
    fn new() -> Self {
        Self {
            sentences: Vec::new(),
            char_count: 0,
        }
    }

    fn push(&mut self, sentence: &'a str, len: usize) {
        self.sentences.push(sentence);
        self.char_count += len;
    }

    fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    /// A lone sentence that is longer than the budget by itself.
    pub fn is_irreducible(&self, max_chars: usize) -> bool {
        self.sentences.len() == 1 && self.char_count > max_chars
    }

    /// The group's text, sentences concatenated as they appeared.
    pub fn text(&self) -> String {
        self.sentences.concat()
    }
}

/// Packs the sentences of an oversized paragraph into budget-sized groups.
pub struct SentencePacker {
    splitter: Arc<dyn SentenceSplitter>,
}

impl SentencePacker {
    pub fn new(splitter: Arc<dyn SentenceSplitter>) -> Self {
        Self { splitter }
    }

    /// Name of the underlying sentence tokenizer.
    pub fn splitter_name(&self) -> &'static str {
        self.splitter.name()
    }

    /// Split `paragraph` into sentences and pack them greedily.
    ///
    /// A group is closed when the next sentence would push it past
    /// `max_chars`. A sentence longer than the budget always ends up alone
    /// in its group.
    pub fn pack<'a>(&self, paragraph: &'a str, max_chars: usize) -> Vec<SentenceGroup<'a>> {
        let mut groups = Vec::new();
        let mut current = SentenceGroup::new();

        for sentence in self.splitter.split(paragraph) {
            let len = char_len(sentence);

            if current.char_count + len > max_chars && !current.is_empty() {
                groups.push(std::mem::replace(&mut current, SentenceGroup::new()));
            }
            current.push(sentence, len);
        }

        if !current.is_empty() {
            groups.push(current);
        }

        groups
    }
}
