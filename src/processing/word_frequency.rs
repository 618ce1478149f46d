//! Word frequency counts for a document.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::info;
use unicode_segmentation::UnicodeSegmentation;

/// File name the counts are written to, next to the input.
pub const WORD_FREQUENCY_FILE: &str = "word_frequency_result.json";

/// Words and their counts, most frequent first.
///
/// Words come from Unicode word boundaries (UAX #29), so punctuation and
/// whitespace are never counted and each CJK ideograph counts on its own.
/// Ties keep the order in which words first appear.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordFrequencies {
    counts: Vec<(String, usize)>,
}

impl WordFrequencies {
    /// Count the words in `text`.
    pub fn count(text: &str) -> Self {
        let mut seen: HashMap<&str, (usize, usize)> = HashMap::new();
        for (position, word) in text.unicode_words().enumerate() {
            seen.entry(word).or_insert((0, position)).0 += 1;
        }

        let mut entries: Vec<(&str, (usize, usize))> = seen.into_iter().collect();
        entries.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));

        Self {
            counts: entries
                .into_iter()
                .map(|(word, (count, _))| (word.to_string(), count))
                .collect(),
        }
    }

    /// Number of distinct words.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Count for a single word, 0 if absent.
    pub fn get(&self, word: &str) -> usize {
        self.counts
            .iter()
            .find(|(w, _)| w == word)
            .map_or(0, |(_, count)| *count)
    }

    /// Words in descending frequency.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(word, count)| (word.as_str(), *count))
    }
}

// Serialized as a JSON object whose keys keep frequency order.
impl Serialize for WordFrequencies {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.counts.len()))?;
        for (word, count) in &self.counts {
            map.serialize_entry(word, count)?;
        }
        map.end()
    }
}

/// Count the words of `input` and write them next to it as JSON.
pub fn write_word_frequencies(input: &Path) -> Result<(PathBuf, WordFrequencies)> {
    let text = fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let frequencies = WordFrequencies::count(&text);

    let dir = input.parent().unwrap_or_else(|| Path::new("."));
    let path = dir.join(WORD_FREQUENCY_FILE);
    let json = serde_json::to_string_pretty(&frequencies)?;
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;

    info!(path = %path.display(), words = frequencies.len(), "Saved word frequencies");
    Ok((path, frequencies))
}
