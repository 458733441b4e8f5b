//! Chat store backed by an embedded key-value database
//!
//! Every collection lives under its own key as a JSON document: the session
//! list, one message list per session, bookmarks, folders, reference
//! documents, and a few scalar preferences. A value that fails to decode is
//! treated as absent and replaced by an empty default on the next write.

use crate::config::{StorageConfig, TeacherProfile};
use crate::error::{Result, TeachmateError};
use chrono::{Datelike, Local, NaiveDate, Utc, Weekday};
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub mod documents;
pub mod types;
pub use documents::NewDocument;
pub use types::{
    Bookmark, ChatMessage, ChatSession, DashboardStats, DayActivity, MessageVersion,
    ReferenceDocument, Role, DEFAULT_SESSION_TITLE,
};

const SESSIONS_KEY: &str = "chat_sessions";
const MESSAGES_PREFIX: &str = "chat_messages_";
const BOOKMARKS_KEY: &str = "chat_bookmarks";
const FOLDERS_KEY: &str = "chat_folders";
const SELECTED_MODEL_KEY: &str = "selected_model";
const AI_LANGUAGE_KEY: &str = "ai_language";
const DARK_MODE_KEY: &str = "dark_mode_preference";
const PROFILE_KEY: &str = "teacher_profile";

/// Tag used for sessions that were never tagged
const UNTAGGED_LABEL: &str = "Khác";

/// Persistent chat store
pub struct ChatStore {
    db: sled::Db,
}

impl ChatStore {
    /// Open or create a store at `path`
    ///
    /// # Examples
    ///
    /// ```
    /// use teachmate::storage::ChatStore;
    ///
    /// # fn main() -> teachmate::error::Result<()> {
    /// let dir = tempfile::tempdir()?;
    /// let store = ChatStore::open(dir.path().join("store"))?;
    /// assert!(store.sessions()?.is_empty());
    /// # Ok(())
    /// # }
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                TeachmateError::Storage(format!("Failed to create store directory: {}", e))
            })?;
        }
        let db = sled::open(path)
            .map_err(|e| TeachmateError::Storage(format!("Failed to open database: {}", e)))?;
        tracing::debug!("Opened chat store at {}", path.display());
        Ok(Self { db })
    }

    /// Open the store named by configuration, or the platform default
    pub fn open_configured(config: &StorageConfig) -> Result<Self> {
        match &config.path {
            Some(path) => Self::open(path),
            None => Self::open(Self::default_path()?),
        }
    }

    /// Open a throwaway store that is deleted on drop
    pub fn temporary() -> Result<Self> {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .map_err(|e| TeachmateError::Storage(format!("Failed to open database: {}", e)))?;
        Ok(Self { db })
    }

    /// Default store location in the user's data directory
    pub fn default_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "teachmate", "teachmate")
            .ok_or_else(|| TeachmateError::Storage("Could not determine data directory".into()))?;
        Ok(proj_dirs.data_dir().join("store"))
    }

    // ----- raw key-value access -------------------------------------------------

    fn read_json<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T> {
        let bytes = self
            .db
            .get(key)
            .map_err(|e| TeachmateError::Storage(format!("Get failed: {}", e)))?;
        match bytes {
            Some(bytes) => match serde_json::from_slice(&bytes) {
                Ok(value) => Ok(value),
                Err(e) => {
                    tracing::warn!(key, error = %e, "Corrupt store entry, using empty default");
                    Ok(T::default())
                }
            },
            None => Ok(T::default()),
        }
    }

    fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value)
            .map_err(|e| TeachmateError::Storage(format!("Serialization failed: {}", e)))?;
        self.db
            .insert(key, bytes)
            .map_err(|e| TeachmateError::Storage(format!("Insert failed: {}", e)))?;
        self.flush()
    }

    fn read_string(&self, key: &str) -> Result<Option<String>> {
        let bytes = self
            .db
            .get(key)
            .map_err(|e| TeachmateError::Storage(format!("Get failed: {}", e)))?;
        Ok(bytes.and_then(|b| String::from_utf8(b.to_vec()).ok()))
    }

    fn write_string(&self, key: &str, value: &str) -> Result<()> {
        self.db
            .insert(key, value.as_bytes())
            .map_err(|e| TeachmateError::Storage(format!("Insert failed: {}", e)))?;
        self.flush()
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.db
            .remove(key)
            .map_err(|e| TeachmateError::Storage(format!("Remove failed: {}", e)))?;
        self.flush()
    }

    fn flush(&self) -> Result<()> {
        self.db
            .flush()
            .map_err(|e| TeachmateError::Storage(format!("Flush failed: {}", e)))?;
        Ok(())
    }

    // ----- sessions -------------------------------------------------------------

    /// All sessions, newest first
    pub fn sessions(&self) -> Result<Vec<ChatSession>> {
        self.read_json(SESSIONS_KEY)
    }

    /// Replace the session list
    pub fn save_sessions(&self, sessions: &[ChatSession]) -> Result<()> {
        self.write_json(SESSIONS_KEY, sessions)
    }

    /// Look up one session
    pub fn session(&self, id: &str) -> Result<Option<ChatSession>> {
        Ok(self.sessions()?.into_iter().find(|s| s.id == id))
    }

    /// Create an empty session and put it at the top of the list
    pub fn create_session(&self) -> Result<ChatSession> {
        let session = ChatSession::new(DEFAULT_SESSION_TITLE);
        let mut sessions = self.sessions()?;
        sessions.insert(0, session.clone());
        self.save_sessions(&sessions)?;
        tracing::info!(session = %session.id, "Created chat session");
        Ok(session)
    }

    /// Apply `change` to the session with `id` and persist it
    ///
    /// # Errors
    ///
    /// Returns [`TeachmateError::NotFound`] when no such session exists.
    pub fn update_session<F>(&self, id: &str, change: F) -> Result<ChatSession>
    where
        F: FnOnce(&mut ChatSession),
    {
        let mut sessions = self.sessions()?;
        let session = sessions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| TeachmateError::NotFound(format!("session {}", id)))?;
        change(session);
        let updated = session.clone();
        self.save_sessions(&sessions)?;
        Ok(updated)
    }

    /// Delete a session and its messages
    pub fn delete_session(&self, id: &str) -> Result<()> {
        let sessions: Vec<ChatSession> = self
            .sessions()?
            .into_iter()
            .filter(|s| s.id != id)
            .collect();
        self.save_sessions(&sessions)?;
        self.remove(&format!("{}{}", MESSAGES_PREFIX, id))?;
        tracing::info!(session = %id, "Deleted chat session");
        Ok(())
    }

    /// Rename a session
    pub fn rename_session(&self, id: &str, title: &str) -> Result<ChatSession> {
        self.update_session(id, |s| s.title = title.to_string())
    }

    /// File a session under `folder`, or unfile it with `None`
    pub fn update_session_folder(&self, id: &str, folder: Option<&str>) -> Result<ChatSession> {
        self.update_session(id, |s| s.folder = folder.map(str::to_string))
    }

    /// Replace a session's tags
    pub fn update_session_tags(&self, id: &str, tags: Vec<String>) -> Result<ChatSession> {
        self.update_session(id, |s| s.tags = Some(tags))
    }

    /// Flip the pinned flag; returns the new value
    pub fn toggle_pin(&self, id: &str) -> Result<bool> {
        Ok(self.update_session(id, |s| s.pinned = !s.pinned)?.pinned)
    }

    /// Choose the reference documents used as context for a session
    pub fn set_session_documents(&self, id: &str, doc_ids: Vec<String>) -> Result<ChatSession> {
        self.update_session(id, |s| s.selected_doc_ids = doc_ids)
    }

    /// Sessions matching a title search and folder, pinned first
    ///
    /// The search is case-insensitive; blank searches match everything.
    /// Relative order is otherwise preserved.
    pub fn filtered_sessions(
        &self,
        search: Option<&str>,
        folder: Option<&str>,
    ) -> Result<Vec<ChatSession>> {
        let needle = search
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());
        let mut sessions: Vec<ChatSession> = self
            .sessions()?
            .into_iter()
            .filter(|s| {
                let matches_search = needle
                    .as_ref()
                    .map_or(true, |n| s.title.to_lowercase().contains(n));
                let matches_folder = folder.map_or(true, |f| s.folder.as_deref() == Some(f));
                matches_search && matches_folder
            })
            .collect();
        sessions.sort_by_key(|s| !s.pinned);
        Ok(sessions)
    }

    /// Resolve a full session id from a unique prefix
    ///
    /// # Errors
    ///
    /// Returns [`TeachmateError::NotFound`] when nothing matches and
    /// [`TeachmateError::Storage`] when the prefix is ambiguous.
    pub fn resolve_session_id(&self, prefix: &str) -> Result<String> {
        let matches: Vec<String> = self
            .sessions()?
            .into_iter()
            .map(|s| s.id)
            .filter(|id| id.starts_with(prefix))
            .collect();
        if matches.iter().any(|id| id == prefix) {
            return Ok(prefix.to_string());
        }
        match matches.len() {
            0 => Err(TeachmateError::NotFound(format!("session {}", prefix)).into()),
            1 => Ok(matches.into_iter().next().unwrap_or_default()),
            n => Err(TeachmateError::Storage(format!(
                "Session prefix {} is ambiguous ({} matches)",
                prefix, n
            ))
            .into()),
        }
    }

    // ----- messages -------------------------------------------------------------

    /// Messages of a session, oldest first
    pub fn messages(&self, session_id: &str) -> Result<Vec<ChatMessage>> {
        self.read_json(&format!("{}{}", MESSAGES_PREFIX, session_id))
    }

    /// Replace the messages of a session
    pub fn save_messages(&self, session_id: &str, messages: &[ChatMessage]) -> Result<()> {
        self.write_json(&format!("{}{}", MESSAGES_PREFIX, session_id), messages)
    }

    // ----- bookmarks ------------------------------------------------------------

    /// Bookmarks, newest first
    pub fn bookmarks(&self) -> Result<Vec<Bookmark>> {
        self.read_json(BOOKMARKS_KEY)
    }

    /// Bookmark a message; returns `false` if it was already bookmarked
    pub fn add_bookmark(
        &self,
        session_id: &str,
        session_title: &str,
        message: &ChatMessage,
    ) -> Result<bool> {
        let mut bookmarks = self.bookmarks()?;
        if bookmarks.iter().any(|b| b.message.id == message.id) {
            return Ok(false);
        }
        bookmarks.insert(
            0,
            Bookmark {
                id: uuid::Uuid::new_v4().to_string(),
                session_id: session_id.to_string(),
                session_title: session_title.to_string(),
                message: message.clone(),
                bookmarked_at: Utc::now(),
            },
        );
        self.write_json(BOOKMARKS_KEY, &bookmarks)?;
        Ok(true)
    }

    /// Remove the bookmark for a message, if any
    pub fn remove_bookmark(&self, message_id: &str) -> Result<()> {
        let bookmarks: Vec<Bookmark> = self
            .bookmarks()?
            .into_iter()
            .filter(|b| b.message.id != message_id)
            .collect();
        self.write_json(BOOKMARKS_KEY, &bookmarks)
    }

    /// Whether a message is bookmarked
    pub fn is_bookmarked(&self, message_id: &str) -> Result<bool> {
        Ok(self.bookmarks()?.iter().any(|b| b.message.id == message_id))
    }

    // ----- folders --------------------------------------------------------------

    /// Folder names in creation order
    pub fn folders(&self) -> Result<Vec<String>> {
        self.read_json(FOLDERS_KEY)
    }

    /// Add a folder; existing names are left alone
    pub fn add_folder(&self, name: &str) -> Result<()> {
        let mut folders = self.folders()?;
        if !folders.iter().any(|f| f == name) {
            folders.push(name.to_string());
            self.write_json(FOLDERS_KEY, &folders)?;
        }
        Ok(())
    }

    /// Delete a folder and unfile every session that used it
    pub fn delete_folder(&self, name: &str) -> Result<()> {
        let folders: Vec<String> = self.folders()?.into_iter().filter(|f| f != name).collect();
        self.write_json(FOLDERS_KEY, &folders)?;

        let mut sessions = self.sessions()?;
        for session in sessions.iter_mut() {
            if session.folder.as_deref() == Some(name) {
                session.folder = None;
            }
        }
        self.save_sessions(&sessions)
    }

    // ----- preferences ----------------------------------------------------------

    /// Preferred model, if the user picked one
    pub fn selected_model(&self) -> Result<Option<String>> {
        let model = self.read_string(SELECTED_MODEL_KEY)?;
        Ok(model.filter(|m| !m.is_empty()))
    }

    /// Remember the preferred model
    pub fn set_selected_model(&self, model: &str) -> Result<()> {
        self.write_string(SELECTED_MODEL_KEY, model)
    }

    /// Reply language code, if the user picked one
    pub fn ai_language(&self) -> Result<Option<String>> {
        Ok(self.read_string(AI_LANGUAGE_KEY)?.filter(|l| !l.is_empty()))
    }

    /// Remember the reply language code
    pub fn set_ai_language(&self, code: &str) -> Result<()> {
        self.write_string(AI_LANGUAGE_KEY, code)
    }

    /// Dark mode preference; `None` means follow the terminal
    pub fn dark_mode(&self) -> Result<Option<bool>> {
        Ok(self
            .read_string(DARK_MODE_KEY)?
            .and_then(|v| v.parse::<bool>().ok()))
    }

    /// Remember the dark mode preference
    pub fn set_dark_mode(&self, dark: bool) -> Result<()> {
        self.write_string(DARK_MODE_KEY, &dark.to_string())
    }

    /// Saved teacher profile, if one was set
    pub fn teacher_profile(&self) -> Result<Option<TeacherProfile>> {
        let bytes = self
            .db
            .get(PROFILE_KEY)
            .map_err(|e| TeachmateError::Storage(format!("Get failed: {}", e)))?;
        Ok(bytes.and_then(|b| match serde_json::from_slice(&b) {
            Ok(profile) => Some(profile),
            Err(e) => {
                tracing::warn!(error = %e, "Corrupt teacher profile, ignoring");
                None
            }
        }))
    }

    /// Save the teacher profile
    pub fn set_teacher_profile(&self, profile: &TeacherProfile) -> Result<()> {
        self.write_json(PROFILE_KEY, profile)
    }

    // ----- dashboard ------------------------------------------------------------

    /// Usage summary as of today (local time)
    pub fn dashboard_stats(&self) -> Result<DashboardStats> {
        self.dashboard_stats_on(Local::now().date_naive())
    }

    /// Usage summary with the week ending on `today`
    pub fn dashboard_stats_on(&self, today: NaiveDate) -> Result<DashboardStats> {
        let sessions = self.sessions()?;
        let mut total_messages = 0;
        let mut total_ai_messages = 0;
        let mut tag_breakdown: BTreeMap<String, usize> = BTreeMap::new();

        let days: Vec<NaiveDate> = (0..7)
            .rev()
            .filter_map(|back| today.checked_sub_days(chrono::Days::new(back)))
            .collect();
        let mut weekly_activity: Vec<DayActivity> = days
            .iter()
            .map(|d| DayActivity {
                day: weekday_label(d.weekday()).to_string(),
                count: 0,
            })
            .collect();

        for session in &sessions {
            let messages = self.messages(&session.id)?;
            total_messages += messages.len();
            total_ai_messages += messages.iter().filter(|m| m.role == Role::Model).count();

            let labels = match &session.tags {
                Some(tags) if !tags.is_empty() => tags.clone(),
                _ => vec![UNTAGGED_LABEL.to_string()],
            };
            for label in labels {
                *tag_breakdown.entry(label).or_default() += 1;
            }

            let created = session.created_at.with_timezone(&Local).date_naive();
            if let Some(pos) = days.iter().position(|d| *d == created) {
                weekly_activity[pos].count += 1;
            }
        }

        let total_documents = self.documents()?.len();
        let estimated_hours_saved = ((total_ai_messages as f64 * 3.0) / 60.0 * 10.0).round() / 10.0;

        Ok(DashboardStats {
            total_chats: sessions.len(),
            total_messages,
            total_ai_messages,
            total_documents,
            estimated_hours_saved,
            tag_breakdown,
            weekly_activity,
        })
    }
}

fn weekday_label(day: Weekday) -> &'static str {
    match day {
        Weekday::Sun => "CN",
        Weekday::Mon => "T2",
        Weekday::Tue => "T3",
        Weekday::Wed => "T4",
        Weekday::Thu => "T5",
        Weekday::Fri => "T6",
        Weekday::Sat => "T7",
    }
}
