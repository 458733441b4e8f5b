//! Chat store contents survive closing and reopening the database

use teachmate::config::TeacherProfile;
use teachmate::storage::{ChatMessage, ChatStore, NewDocument};
use tempfile::TempDir;

#[test]
fn test_store_reopen_keeps_everything() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store");

    let (session_id, reply_id, doc_id) = {
        let store = ChatStore::open(&path).unwrap();
        let session = store.create_session().unwrap();
        store
            .rename_session(&session.id, "Đề cương ôn tập")
            .unwrap();
        store
            .update_session_tags(&session.id, vec!["Đề kiểm tra".to_string()])
            .unwrap();
        store.add_folder("Học kỳ 2").unwrap();
        store
            .update_session_folder(&session.id, Some("Học kỳ 2"))
            .unwrap();
        store.toggle_pin(&session.id).unwrap();

        let question = ChatMessage::user("Lập đề cương");
        let mut reply = ChatMessage::model("Bản nháp");
        reply.replace_text("Bản chính thức");
        store
            .save_messages(&session.id, &[question, reply.clone()])
            .unwrap();
        store
            .add_bookmark(&session.id, "Đề cương ôn tập", &reply)
            .unwrap();

        let doc = store
            .save_document(
                NewDocument {
                    title: "sgk-chuong-3".to_string(),
                    file_type: "pdf".to_string(),
                    file_size: 2048,
                    content: "x".repeat(30),
                    tags: vec!["SGK".to_string()],
                    folder: "Tài liệu".to_string(),
                },
                10,
                25,
            )
            .unwrap();
        store
            .set_session_documents(&session.id, vec![doc.id.clone()])
            .unwrap();

        store.set_selected_model("gemini-2.5-flash").unwrap();
        store.set_ai_language("fr").unwrap();
        store.set_dark_mode(false).unwrap();
        store
            .set_teacher_profile(&TeacherProfile {
                name: "Cô Hạnh".to_string(),
                subject: "Hóa học".to_string(),
                school_level: "THPT".to_string(),
                school_name: None,
            })
            .unwrap();

        (session.id, reply.id, doc.id)
    };

    let store = ChatStore::open(&path).unwrap();

    let session = store.session(&session_id).unwrap().unwrap();
    assert_eq!(session.title, "Đề cương ôn tập");
    assert_eq!(session.folder.as_deref(), Some("Học kỳ 2"));
    assert_eq!(session.tags, Some(vec!["Đề kiểm tra".to_string()]));
    assert!(session.pinned);
    assert_eq!(session.selected_doc_ids, vec![doc_id.clone()]);

    let messages = store.messages(&session_id).unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].text, "Bản chính thức");
    assert_eq!(messages[1].versions.len(), 1);
    assert_eq!(messages[1].versions[0].text, "Bản nháp");

    assert!(store.is_bookmarked(&reply_id).unwrap());
    assert_eq!(store.folders().unwrap(), vec!["Học kỳ 2".to_string()]);

    let documents = store.documents().unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].chunk_count, 3);
    assert!(documents[0].content.is_empty());
    assert_eq!(store.document_content(&doc_id).unwrap().unwrap().len(), 25);

    assert_eq!(
        store.selected_model().unwrap().as_deref(),
        Some("gemini-2.5-flash")
    );
    assert_eq!(store.ai_language().unwrap().as_deref(), Some("fr"));
    assert_eq!(store.dark_mode().unwrap(), Some(false));
    assert_eq!(store.teacher_profile().unwrap().unwrap().name, "Cô Hạnh");

    let stats = store.dashboard_stats().unwrap();
    assert_eq!(stats.total_chats, 1);
    assert_eq!(stats.total_messages, 2);
    assert_eq!(stats.total_ai_messages, 1);
    assert_eq!(stats.total_documents, 1);
    assert_eq!(stats.estimated_hours_saved, 0.1);
    assert_eq!(stats.tag_breakdown.get("Đề kiểm tra"), Some(&1));
}
