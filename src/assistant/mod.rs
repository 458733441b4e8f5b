//! Conversation flow on top of the store and the dispatcher
//!
//! The assistant owns no conversation state of its own. Each call reads the
//! session from the store, builds the request history, dispatches it, and
//! writes the result back.

pub mod topics;

use std::sync::Arc;

use crate::config::{Config, TeacherProfile};
use crate::credentials::CredentialStore;
use crate::dispatcher::{DispatchSettings, Dispatcher};
use crate::error::{Result, TeachmateError};
use crate::prompts;
use crate::providers::Provider;
use crate::storage::{ChatMessage, ChatSession, ChatStore, Role};

/// Result of sending one question
#[derive(Debug, Clone)]
pub struct Exchange {
    /// The stored assistant message (an error notice when dispatch failed)
    pub reply: ChatMessage,
    /// Model that answered, or `None` when every candidate failed
    pub model: Option<String>,
}

impl Exchange {
    /// Whether the reply is an error notice
    pub fn failed(&self) -> bool {
        self.model.is_none()
    }
}

/// Teaching assistant session driver
pub struct Assistant {
    config: Config,
    store: Arc<ChatStore>,
    credentials: Arc<dyn CredentialStore>,
    dispatcher: Dispatcher,
}

impl Assistant {
    /// Creates an assistant
    ///
    /// # Arguments
    ///
    /// * `config` - Loaded configuration
    /// * `store` - Conversation store
    /// * `credentials` - Source of the API key, read on every request
    /// * `provider` - Generation backend
    pub fn new(
        config: Config,
        store: Arc<ChatStore>,
        credentials: Arc<dyn CredentialStore>,
        provider: Arc<dyn Provider>,
    ) -> Self {
        Self {
            config,
            store,
            credentials,
            dispatcher: Dispatcher::new(provider),
        }
    }

    /// The underlying store
    pub fn store(&self) -> &ChatStore {
        &self.store
    }

    /// Drop cached provider clients after a credential change
    pub fn invalidate(&self) {
        self.dispatcher.invalidate();
    }

    /// Dispatch settings from the current credential and model preference
    ///
    /// A credential store that cannot be read counts as no key, so dispatch
    /// fails with [`TeachmateError::CredentialMissing`].
    pub fn settings(&self) -> Result<DispatchSettings> {
        let api_key = self.credentials.api_key().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Could not read API key");
            None
        });
        Ok(DispatchSettings::from_config(
            &self.config.provider,
            api_key,
            self.store.selected_model()?,
        ))
    }

    /// Saved profile, else the configured one
    pub fn profile(&self) -> Result<TeacherProfile> {
        Ok(self
            .store
            .teacher_profile()?
            .unwrap_or_else(|| self.config.assistant.profile.clone()))
    }

    /// Reply language code: saved preference, else the configured default
    pub fn language(&self) -> Result<String> {
        Ok(self
            .store
            .ai_language()?
            .unwrap_or_else(|| self.config.assistant.default_language.clone()))
    }

    /// System prompt plus reference document context for a session
    pub fn system_prompt(&self, session: &ChatSession) -> Result<String> {
        let has_documents = !session.selected_doc_ids.is_empty();
        let prompt = prompts::system_prompt(&self.profile()?, has_documents, &self.language()?);
        let contents = self.store.document_contents(&session.selected_doc_ids)?;
        let context =
            prompts::document_context(&contents, self.config.documents.per_document_chars);
        Ok(prompt + &context)
    }

    fn session(&self, session_id: &str) -> Result<ChatSession> {
        self.store
            .session(session_id)?
            .ok_or_else(|| TeachmateError::NotFound(format!("session {}", session_id)).into())
    }

    /// Ask a question in a session
    ///
    /// The question and the reply are both persisted. The first question of a
    /// session also sets its title and topic tags. A failed dispatch is not an
    /// error here: it produces an error notice as the reply.
    ///
    /// # Errors
    ///
    /// Returns an error only when the session does not exist or the store
    /// fails.
    pub async fn send(&self, session_id: &str, text: &str) -> Result<Exchange> {
        let session = self.session(session_id)?;
        let mut messages = self.store.messages(session_id)?;
        let history = prompts::build_history(&self.system_prompt(&session)?, &messages);

        let first_question = !messages.iter().any(|m| m.role == Role::User);
        messages.push(ChatMessage::user(text));
        self.store.save_messages(session_id, &messages)?;

        if first_question {
            let title = topics::generate_title(text);
            let tags = topics::auto_detect_tags(text);
            self.store.update_session(session_id, |s| {
                s.title = title;
                s.tags = Some(tags);
            })?;
        }

        let exchange = match self.dispatch(&history, text).await {
            Ok((reply, model)) => Exchange {
                reply: ChatMessage::model(reply),
                model: Some(model),
            },
            Err(e) => {
                tracing::error!(session = %session_id, error = %e, "Generation failed");
                Exchange {
                    reply: ChatMessage::model(error_reply(&e.to_string())),
                    model: None,
                }
            }
        };

        messages.push(exchange.reply.clone());
        self.store.save_messages(session_id, &messages)?;
        Ok(exchange)
    }

    /// Produce a new answer for an assistant message
    ///
    /// The previous text is kept in the message's version list.
    ///
    /// # Errors
    ///
    /// Returns [`TeachmateError::NotFound`] when the message does not exist, is
    /// not an assistant message, or has no question before it. Dispatch
    /// failures are returned unchanged and leave the message untouched.
    pub async fn regenerate(&self, session_id: &str, message_id: &str) -> Result<ChatMessage> {
        let session = self.session(session_id)?;
        let mut messages = self.store.messages(session_id)?;

        let index = messages
            .iter()
            .position(|m| m.id == message_id && m.role == Role::Model)
            .ok_or_else(|| TeachmateError::NotFound(format!("assistant message {}", message_id)))?;
        let question_index = messages[..index]
            .iter()
            .rposition(|m| m.role == Role::User)
            .ok_or_else(|| {
                TeachmateError::NotFound(format!("question before message {}", message_id))
            })?;

        let question = messages[question_index].text.clone();
        let history =
            prompts::build_history(&self.system_prompt(&session)?, &messages[..question_index]);
        let (text, model) = self.dispatch(&history, &question).await?;
        tracing::info!(session = %session_id, model = %model, "Regenerated reply");

        let message = &mut messages[index];
        message.replace_text(text);
        let updated = message.clone();
        self.store.save_messages(session_id, &messages)?;
        Ok(updated)
    }

    /// Id of the most recent assistant message, if any
    pub fn last_reply_id(&self, session_id: &str) -> Result<Option<String>> {
        Ok(self
            .store
            .messages(session_id)?
            .iter()
            .rev()
            .find(|m| m.role == Role::Model)
            .map(|m| m.id.clone()))
    }

    async fn dispatch(
        &self,
        history: &[crate::providers::Turn],
        message: &str,
    ) -> Result<(String, String)> {
        let settings = self.settings()?;
        let reply = self
            .dispatcher
            .dispatch(&settings, history, message)
            .await?;
        Ok((reply.text, reply.model))
    }
}

/// Assistant message shown when generation fails
pub fn error_reply(detail: &str) -> String {
    format!(
        "**⚠️ Lỗi:** {}\n\nVui lòng kiểm tra:\n- API Key có đúng không?\n- Kết nối mạng có ổn không?\n- API Key đã hết quota chưa?\n\n👉 Chạy `teachmate auth set` để cập nhật API Key.",
        detail
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::MemoryCredentialStore;
    use crate::providers::{MockProvider, Speaker};
    use crate::storage::NewDocument;
    use crate::test_utils::UnavailableCredentialStore;

    fn assistant_with(provider: MockProvider, key: Option<&str>) -> Assistant {
        let credentials: Arc<dyn CredentialStore> = match key {
            Some(k) => Arc::new(MemoryCredentialStore::with_key(k)),
            None => Arc::new(MemoryCredentialStore::new()),
        };
        Assistant::new(
            Config::default(),
            Arc::new(ChatStore::temporary().unwrap()),
            credentials,
            Arc::new(provider),
        )
    }

    #[tokio::test]
    async fn test_first_question_sets_title_and_tags() {
        let mut provider = MockProvider::new();
        provider
            .expect_generate()
            .withf(|key, model, history, message, cap| {
                key == "k"
                    && model == "gemini-3-flash-preview"
                    && history.len() == 2
                    && history[1].text == prompts::ACKNOWLEDGEMENT
                    && message == "Soạn giáo án Toán 6 bài phân số"
                    && *cap == 4096
            })
            .times(1)
            .returning(|_, _, _, _, _| Ok("## Giáo án".to_string()));

        let assistant = assistant_with(provider, Some("k"));
        let session = assistant.store().create_session().unwrap();

        let exchange = assistant
            .send(&session.id, "Soạn giáo án Toán 6 bài phân số")
            .await
            .unwrap();
        assert!(!exchange.failed());
        assert_eq!(exchange.model.as_deref(), Some("gemini-3-flash-preview"));

        let messages = assistant.store().messages(&session.id).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[1].text, "## Giáo án");

        let session = assistant.store().session(&session.id).unwrap().unwrap();
        assert_eq!(session.title, "Soạn giáo án Toán 6 bài phân số");
        assert_eq!(session.tags, Some(vec!["Giáo án".to_string()]));
    }

    #[tokio::test]
    async fn test_follow_up_keeps_title_and_sends_history() {
        let mut provider = MockProvider::new();
        provider
            .expect_generate()
            .withf(|_, _, history, _, _| history.len() == 2)
            .times(1)
            .returning(|_, _, _, _, _| Ok("first".to_string()));
        provider
            .expect_generate()
            .withf(|_, _, history, message, _| {
                history.len() == 4
                    && history[2].speaker == Speaker::User
                    && history[3].text == "first"
                    && message == "tiếp"
            })
            .times(1)
            .returning(|_, _, _, _, _| Ok("second".to_string()));

        let assistant = assistant_with(provider, Some("k"));
        let id = assistant.store().create_session().unwrap().id;
        assistant.send(&id, "Xin chào").await.unwrap();
        assistant.send(&id, "tiếp").await.unwrap();

        let session = assistant.store().session(&id).unwrap().unwrap();
        assert_eq!(session.title, "Xin chào");
        assert_eq!(assistant.store().messages(&id).unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_unreadable_credentials_report_missing_key() {
        let mut provider = MockProvider::new();
        provider.expect_generate().never();

        let assistant = Assistant::new(
            Config::default(),
            Arc::new(ChatStore::temporary().unwrap()),
            Arc::new(UnavailableCredentialStore),
            Arc::new(provider),
        );
        assert!(assistant.settings().unwrap().api_key.is_none());

        let id = assistant.store().create_session().unwrap().id;
        let exchange = assistant.send(&id, "hỏi").await.unwrap();
        let reply = &exchange.reply.text;
        assert!(exchange.failed());
        assert!(reply.starts_with("**⚠️ Lỗi:** API key is not configured"));
        assert!(!reply.contains("secret service"));
    }

    #[tokio::test]
    async fn test_missing_key_becomes_error_reply() {
        let mut provider = MockProvider::new();
        provider.expect_generate().never();

        let assistant = assistant_with(provider, None);
        let id = assistant.store().create_session().unwrap().id;
        let exchange = assistant.send(&id, "hỏi").await.unwrap();

        let reply = &exchange.reply.text;
        assert!(exchange.failed());
        assert!(reply.starts_with("**⚠️ Lỗi:** API key is not configured"));
        assert!(reply.contains("hết quota"));
        assert_eq!(assistant.store().messages(&id).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_send_to_unknown_session_fails() {
        let assistant = assistant_with(MockProvider::new(), Some("k"));
        assert!(assistant.send("missing", "x").await.is_err());
    }

    #[tokio::test]
    async fn test_selected_documents_reach_the_prompt() {
        let mut provider = MockProvider::new();
        provider
            .expect_generate()
            .withf(|_, _, history, _, _| {
                let system = &history[0].text;
                system.contains("6. **Tài liệu**")
                    && system.contains("--- Tài liệu 1 ---\nNội dung SGK")
            })
            .times(1)
            .returning(|_, _, _, _, _| Ok("ok".to_string()));

        let assistant = assistant_with(provider, Some("k"));
        let doc = assistant
            .store()
            .save_document(
                NewDocument {
                    title: "SGK".to_string(),
                    file_type: "txt".to_string(),
                    file_size: 3,
                    content: "Nội dung SGK".to_string(),
                    tags: Vec::new(),
                    folder: String::new(),
                },
                12_000,
                100_000,
            )
            .unwrap();
        let id = assistant.store().create_session().unwrap().id;
        assistant
            .store()
            .set_session_documents(&id, vec![doc.id])
            .unwrap();

        assistant.send(&id, "Tóm tắt").await.unwrap();
    }

    #[tokio::test]
    async fn test_preferred_model_and_language_from_store() {
        let mut provider = MockProvider::new();
        provider
            .expect_generate()
            .withf(|key, model, history, message, _| {
                key == "k"
                    && model == "gemini-2.5-flash"
                    && message == "hello"
                    && history[0].text.contains("bằng English.")
            })
            .times(1)
            .returning(|_, _, _, _, _| Ok("hi".to_string()));

        let assistant = assistant_with(provider, Some("k"));
        assistant
            .store()
            .set_selected_model("gemini-2.5-flash")
            .unwrap();
        assistant.store().set_ai_language("en").unwrap();
        let id = assistant.store().create_session().unwrap().id;
        let exchange = assistant.send(&id, "hello").await.unwrap();
        assert_eq!(exchange.model.as_deref(), Some("gemini-2.5-flash"));
    }

    #[tokio::test]
    async fn test_regenerate_keeps_previous_version() {
        let mut provider = MockProvider::new();
        let mut seq = mockall::Sequence::new();
        provider
            .expect_generate()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _, _, _| Ok("bản 1".to_string()));
        provider
            .expect_generate()
            .withf(|_, _, history, message, _| history.len() == 2 && message == "câu hỏi")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _, _, _| Ok("bản 2".to_string()));

        let assistant = assistant_with(provider, Some("k"));
        let id = assistant.store().create_session().unwrap().id;
        let reply = assistant.send(&id, "câu hỏi").await.unwrap().reply;

        let updated = assistant.regenerate(&id, &reply.id).await.unwrap();
        assert_eq!(updated.id, reply.id);
        assert_eq!(updated.text, "bản 2");
        assert_eq!(updated.versions.len(), 1);
        assert_eq!(updated.versions[0].text, "bản 1");
        assert_eq!(updated.versions[0].timestamp, reply.timestamp);

        let stored = assistant.store().messages(&id).unwrap();
        assert_eq!(stored[1], updated);
    }

    #[tokio::test]
    async fn test_regenerate_rejects_user_message_and_orphan_reply() {
        let assistant = assistant_with(MockProvider::new(), Some("k"));
        let id = assistant.store().create_session().unwrap().id;
        let question = ChatMessage::user("q");
        let orphan = ChatMessage::model("welcome");
        assistant
            .store()
            .save_messages(&id, &[orphan.clone(), question.clone()])
            .unwrap();

        assert!(assistant.regenerate(&id, &question.id).await.is_err());
        assert!(assistant.regenerate(&id, &orphan.id).await.is_err());
    }

    #[tokio::test]
    async fn test_regenerate_failure_leaves_message() {
        let mut provider = MockProvider::new();
        provider
            .expect_generate()
            .returning(|_, _, _, _, _| Err(anyhow::anyhow!("503")));

        let assistant = assistant_with(provider, Some("k"));
        let id = assistant.store().create_session().unwrap().id;
        let question = ChatMessage::user("q");
        let answer = ChatMessage::model("a");
        assistant
            .store()
            .save_messages(&id, &[question, answer.clone()])
            .unwrap();

        let err = assistant.regenerate(&id, &answer.id).await.unwrap_err();
        assert!(err.to_string().contains("503"));
        assert_eq!(assistant.store().messages(&id).unwrap()[1], answer);
    }

    #[test]
    fn test_error_reply_format() {
        let text = error_reply("boom");
        assert!(text.starts_with("**⚠️ Lỗi:** boom\n\nVui lòng kiểm tra:\n"));
        assert!(text.contains("- API Key có đúng không?"));
        assert!(text.contains("- Kết nối mạng có ổn không?"));
    }
}
