use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::providers::{Speaker, Turn};

/// Title given to a session before its first user message
pub const DEFAULT_SESSION_TITLE: &str = "Cuộc trò chuyện mới";

/// Author of a stored message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The teacher
    User,
    /// The assistant
    Model,
}

impl From<Role> for Speaker {
    fn from(role: Role) -> Self {
        match role {
            Role::User => Speaker::User,
            Role::Model => Speaker::Model,
        }
    }
}

/// Earlier text of a regenerated message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageVersion {
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// A single chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique identifier
    pub id: String,
    /// Author
    pub role: Role,
    /// Current text
    pub text: String,
    /// When the current text was produced
    pub timestamp: DateTime<Utc>,
    /// Prior texts, oldest first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub versions: Vec<MessageVersion>,
}

impl ChatMessage {
    /// Creates a message stamped with the current time
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            text: text.into(),
            timestamp: Utc::now(),
            versions: Vec::new(),
        }
    }

    /// Creates a user message
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    /// Creates a model message
    pub fn model(text: impl Into<String>) -> Self {
        Self::new(Role::Model, text)
    }

    /// Replaces the text, keeping the old one as a version
    pub fn replace_text(&mut self, text: impl Into<String>) {
        self.versions.push(MessageVersion {
            text: std::mem::take(&mut self.text),
            timestamp: self.timestamp,
        });
        self.text = text.into();
        self.timestamp = Utc::now();
    }

    /// Converts to an API turn
    pub fn to_turn(&self) -> Turn {
        Turn {
            speaker: self.role.into(),
            text: self.text.clone(),
        }
    }
}

/// Metadata for a chat session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSession {
    /// Unique identifier for the session
    pub id: String,
    /// User-friendly title
    pub title: String,
    /// When the session was created
    pub created_at: DateTime<Utc>,
    /// Folder the session is filed under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    /// Topic tags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Pinned sessions sort first
    #[serde(default)]
    pub pinned: bool,
    /// Reference documents used as prompt context
    #[serde(default)]
    pub selected_doc_ids: Vec<String>,
}

impl ChatSession {
    /// Creates a session with a fresh id
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            created_at: Utc::now(),
            folder: None,
            tags: None,
            pinned: false,
            selected_doc_ids: Vec::new(),
        }
    }
}

/// A bookmarked message with enough context to show it standalone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: String,
    pub session_id: String,
    pub session_title: String,
    pub message: ChatMessage,
    pub bookmarked_at: DateTime<Utc>,
}

/// An uploaded reference document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceDocument {
    pub id: String,
    pub title: String,
    /// Lowercased extension of the source file
    pub file_type: String,
    /// Size of the source file in bytes
    pub file_size: u64,
    /// Extracted text; empty in listings
    #[serde(default)]
    pub content: String,
    pub chunk_count: usize,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub folder: String,
    pub created_at: DateTime<Utc>,
}

/// Sessions created on one calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayActivity {
    /// Short weekday label (CN, T2 .. T7)
    pub day: String,
    pub count: usize,
}

/// Usage summary across the whole store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_chats: usize,
    pub total_messages: usize,
    pub total_ai_messages: usize,
    pub total_documents: usize,
    /// Three minutes per assistant reply, in hours, one decimal
    pub estimated_hours_saved: f64,
    pub tag_breakdown: BTreeMap<String, usize>,
    /// Last seven days, oldest first
    pub weekly_activity: Vec<DayActivity>,
}
