//! Clients for downstream text consumers and the notes they produce.

pub mod completion_client;
pub mod note;

pub use completion_client::{
    ChatMessage, CompletionClient, CompletionRequest, Organized, DEFAULT_ORGANIZE_PROMPT,
};
pub use note::{extract_tags, extract_title, Note, DEFAULT_NOTE_PROMPT};
