//! Short social-media notes assembled from a completion reply.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

/// System prompt used to turn organized text into a note.
pub const DEFAULT_NOTE_PROMPT: &str = "You write short, punchy social-media reading notes. \
Turn the text you are given into a note. Put a catchy one-line title on the first line, \
without a leading '#'. Write the body in short paragraphs, each opening with an emoji, \
and bold the key points. End with a line naming the book the text comes from. \
Finish with hashtags: #reading, #<book name> and #checkin first, then one or two \
topic, long-tail and recommendation tags.";

lazy_static! {
    static ref TAG: Regex = Regex::new(r"#([^\s#]+)").unwrap();
}

/// A note ready to be written out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    /// Title line picked from the reply
    pub title: Option<String>,

    /// Hashtags without the leading `#`, in order of first appearance
    pub tags: Vec<String>,

    /// Note text as returned by the completion service
    pub body: String,
}

impl Note {
    /// Build a note from a completion reply.
    pub fn from_reply(reply: &str) -> Self {
        Self {
            title: extract_title(reply).map(str::to_string),
            tags: extract_tags(reply),
            body: reply.trim().to_string(),
        }
    }

    /// A note that carries the text unchanged, with no title or tags.
    pub fn plain(content: &str) -> Self {
        Self {
            title: None,
            tags: Vec::new(),
            body: content.trim().to_string(),
        }
    }

    /// Render as Markdown: title heading, body, then a tag footer.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Some(title) = &self.title {
            out.push_str(&format!("# {}\n\n", title));
        }
        out.push_str(&self.body);
        if !self.tags.is_empty() {
            out.push_str("\n\n---\n");
            let footer: Vec<String> = self.tags.iter().map(|tag| format!("#{}", tag)).collect();
            out.push_str(&footer.join("\n"));
        }
        out
    }
}

/// First line that reads like a title.
///
/// Skips blank lines, Markdown headings and hashtag lines, and anything
/// containing `：` or `。`, which mark labels and prose.
pub fn extract_title(content: &str) -> Option<&str> {
    content
        .lines()
        .map(str::trim)
        .find(|line| {
            !line.is_empty()
                && !line.starts_with('#')
                && !line.contains('：')
                && !line.contains('。')
        })
}

/// Every `#tag` in the text, deduplicated.
pub fn extract_tags(content: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for caps in TAG.captures_iter(content) {
        let tag = &caps[1];
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const REPLY: &str = "\n## 开篇\n\n读完这本书我破防了\n\n\
                         📖 作者说：坚持是最好的老师。\n\n\
                         以上信息来自于《西游记》\n\n#阅读 #西游记 #打卡\n#成长 #阅读";

    #[test]
    fn test_extract_title_skips_headings_and_prose() {
        assert_eq!(extract_title(REPLY), Some("读完这本书我破防了"));
        assert_eq!(extract_title("说明：无\n一句话。"), None);
        assert_eq!(extract_title("  A Catchy Title  \nbody"), Some("A Catchy Title"));
    }

    #[test]
    fn test_extract_tags_in_order_without_duplicates() {
        assert_eq!(extract_tags(REPLY), vec!["阅读", "西游记", "打卡", "成长"]);
        assert!(extract_tags("## Heading only\n\nNo tags.").is_empty());
    }

    #[test]
    fn test_render_note() {
        let note = Note {
            title: Some("Title".to_string()),
            tags: vec!["reading".to_string(), "books".to_string()],
            body: "First part.\n\nSecond part.".to_string(),
        };
        assert_eq!(
            note.render(),
            "# Title\n\nFirst part.\n\nSecond part.\n\n---\n#reading\n#books"
        );
    }

    #[test]
    fn test_plain_note_renders_body_only() {
        let note = Note::plain("  just the text \n");
        assert_eq!(note.render(), "just the text");
    }

    #[test]
    fn test_from_reply() {
        let note = Note::from_reply(REPLY);
        assert_eq!(note.title.as_deref(), Some("读完这本书我破防了"));
        assert_eq!(note.tags.len(), 4);
        assert!(note.body.starts_with("## 开篇"));
        assert!(note.render().ends_with("---\n#阅读\n#西游记\n#打卡\n#成长"));
    }
}
