//! UI-agnostic message types
//!
//! A message lives only as long as the transcript that displays it; there is
//! no identity beyond its position in the log.

use serde::{Deserialize, Serialize};

/// One entry in the chat transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub origin: Origin,
    pub content: String,
}

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    User,
    Ai,
}

impl Origin {
    pub fn label(&self) -> &'static str {
        match self {
            Origin::User => "You:",
            Origin::Ai => "AI:",
        }
    }
}

impl Message {
    pub fn new(origin: Origin, content: impl Into<String>) -> Self {
        Self {
            origin,
            content: content.into(),
        }
    }
}
