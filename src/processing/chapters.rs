//! Book name and chapter boundary detection.
//!
//! Chapters are recognised line by line from a fixed set of heading
//! patterns (`# 第十二章 …`, `## 第三回 …`, `# Chapter 4 …`, `# 5章 …`).
//! Text before the first heading is treated as front matter and dropped.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::numerals::parse_chinese_numeral;

/// Book name used when none can be found in the opening lines.
pub const UNKNOWN_BOOK_NAME: &str = "未知书名";

/// Number of opening lines searched for a book name.
const BOOK_NAME_SCAN_LINES: usize = 10;

lazy_static! {
    static ref CHAPTER_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"^#{1,2}\s*第[一二三四五六七八九十百千零〇两\d]+[章回]\s*[^#\n]*").unwrap(),
        Regex::new(r"(?i)^#{1,2}\s*Chapter\s*\d+[^#\n]*").unwrap(),
        Regex::new(r"^#{1,2}\s*\d+\s*[章回][^#\n]*").unwrap(),
    ];
    static ref HEADING_MARKS: Regex = Regex::new(r"^#+\s*").unwrap();
    static ref CN_CHAPTER_NUMBER: Regex =
        Regex::new(r"第([一二三四五六七八九十百千零〇两\d]+)[章回]").unwrap();
    static ref EN_CHAPTER_NUMBER: Regex = Regex::new(r"(?i)Chapter\s*(\d+)").unwrap();
    static ref BARE_CHAPTER_NUMBER: Regex = Regex::new(r"^(\d+)\s*[章回]").unwrap();
    static ref BOOK_LABEL: Regex = Regex::new(r"(?:书名|标题)[:：]\s*(.+)").unwrap();
    static ref BOOK_QUOTED: Regex = Regex::new(r"《(.+?)》").unwrap();
    static ref LEADING_MARKS: Regex = Regex::new(r"^[#\s]*").unwrap();
    static ref COLON_SUFFIX: Regex = Regex::new(r"[:：].*$").unwrap();
}

/// A single chapter extracted from a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    /// Heading text with leading `#` markers removed
    pub title: String,

    /// Number read from the heading, if any
    pub number: Option<u32>,

    /// Chapter body, lines trimmed and rejoined with `\n`
    pub content: String,
}

impl Chapter {
    /// Chapter number, or 0 when the heading carries none.
    pub fn number_or_zero(&self) -> u32 {
        self.number.unwrap_or(0)
    }
}

/// A book split into its chapters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub name: String,
    pub chapters: Vec<Chapter>,
}

impl Book {
    /// Whether no chapter headings were found.
    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }
}

/// Check whether a trimmed line is a chapter heading, returning the match.
fn match_chapter_heading(line: &str) -> Option<&str> {
    CHAPTER_PATTERNS
        .iter()
        .find_map(|pattern| pattern.find(line))
        .map(|m| m.as_str())
}

/// Read the chapter number from a heading.
pub fn chapter_number(title: &str) -> Option<u32> {
    if let Some(caps) = CN_CHAPTER_NUMBER.captures(title) {
        return caps.get(1).and_then(|m| parse_chinese_numeral(m.as_str()));
    }
    EN_CHAPTER_NUMBER
        .captures(title)
        .or_else(|| BARE_CHAPTER_NUMBER.captures(title))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Find the book name in the first lines of the text.
///
/// Looks for a `书名:`/`标题:` label, a `《…》` title, or a `#` heading, in
/// that order on each line, and stops at the first line that yields one.
pub fn extract_book_name(content: &str) -> String {
    let mut name: Option<String> = None;

    for line in content.trim().lines().take(BOOK_NAME_SCAN_LINES) {
        if line.contains(':') || line.contains('：') {
            if let Some(caps) = BOOK_LABEL.captures(line) {
                name = caps.get(1).map(|m| m.as_str().trim().to_string());
                break;
            }
        }
        if let Some(caps) = BOOK_QUOTED.captures(line) {
            name = caps.get(1).map(|m| m.as_str().trim().to_string());
            break;
        }
        if line.starts_with('#') {
            name = Some(line.trim_start_matches('#').trim().to_string());
            break;
        }
    }

    let name = name.unwrap_or_default();
    let name = LEADING_MARKS.replace(&name, "");
    let name = COLON_SUFFIX.replace(&name, "");
    let name = name.trim();

    if name.is_empty() {
        UNKNOWN_BOOK_NAME.to_string()
    } else {
        name.to_string()
    }
}

/// Split a book into chapters at recognised headings.
pub fn split_into_chapters(content: &str) -> Book {
    let name = extract_book_name(content);
    let mut chapters = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in content.trim().lines() {
        let line = line.trim();

        if let Some(heading) = match_chapter_heading(line) {
            if let Some((title, lines)) = current.take() {
                push_chapter(&mut chapters, title, &lines);
            }
            let title = HEADING_MARKS.replace(heading.trim(), "").to_string();
            current = Some((title, Vec::new()));
        } else if let Some((_, lines)) = current.as_mut() {
            lines.push(line);
        }
    }

    if let Some((title, lines)) = current.take() {
        push_chapter(&mut chapters, title, &lines);
    }

    info!(book = %name, chapters = chapters.len(), "Split book into chapters");

    Book { name, chapters }
}

fn push_chapter(chapters: &mut Vec<Chapter>, title: String, lines: &[&str]) {
    let content = lines.join("\n").trim().to_string();
    if content.is_empty() {
        debug!(title = %title, "Skipping empty chapter");
        return;
    }
    chapters.push(Chapter {
        number: chapter_number(&title),
        title,
        content,
    });
}
