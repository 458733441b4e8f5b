//! System prompt and request history construction
//!
//! Every generation request carries the full conversation. The first two
//! turns are synthetic: the system prompt (with any reference document text)
//! sent as a user turn, and a fixed acknowledgement from the model.

pub mod tools;

use crate::config::TeacherProfile;
use crate::providers::Turn;
use crate::storage::ChatMessage;

/// Reply the model is credited with after reading the system prompt
pub const ACKNOWLEDGEMENT: &str =
    "Tôi đã hiểu thông tin và tài liệu tham khảo. Tôi sẵn sàng hỗ trợ bạn.";

/// Language the assistant answers in unless told otherwise
pub const DEFAULT_LANGUAGE: &str = "vi";

/// Selectable reply languages as `(code, label)`
pub const LANGUAGES: &[(&str, &str)] = &[
    ("vi", "Tiếng Việt"),
    ("en", "English"),
    ("ja", "日本語"),
    ("ko", "한국어"),
    ("zh", "中文"),
    ("fr", "Français"),
];

/// Display label for a language code; unknown codes are returned as is
///
/// # Examples
///
/// ```
/// use teachmate::prompts::language_label;
///
/// assert_eq!(language_label("ja"), "日本語");
/// assert_eq!(language_label("de"), "de");
/// ```
pub fn language_label(code: &str) -> &str {
    LANGUAGES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, label)| *label)
        .unwrap_or(code)
}

/// Builds the system prompt for a teacher
///
/// # Arguments
///
/// * `profile` - Who the assistant is helping
/// * `has_documents` - Whether reference documents are attached to the session
/// * `language` - Reply language code
///
/// # Returns
///
/// The prompt text, in Vietnamese, with a language override section when
/// `language` is not `vi`
///
/// # Examples
///
/// ```
/// use teachmate::config::TeacherProfile;
/// use teachmate::prompts::system_prompt;
///
/// let prompt = system_prompt(&TeacherProfile::default(), false, "en");
/// assert!(prompt.contains("## NGÔN NGỮ TRẢ LỜI"));
/// assert!(prompt.contains("English"));
/// ```
pub fn system_prompt(profile: &TeacherProfile, has_documents: bool, language: &str) -> String {
    let documents_rule = if has_documents {
        "\n6. **Tài liệu**: Giáo viên đã cung cấp tài liệu tham khảo bên dưới. Hãy SỬ DỤNG LINH HOẠT nội dung này khi trả lời - trích dẫn, phân tích, tóm tắt theo yêu cầu."
    } else {
        ""
    };

    let language_rule = if language != DEFAULT_LANGUAGE {
        let label = language_label(language);
        format!(
            "\n\n## NGÔN NGỮ TRẢ LỜI\nHãy trả lời TOÀN BỘ bằng {label}. Dù user hỏi bằng tiếng Việt, bạn vẫn phải trả lời bằng {label}."
        )
    } else {
        String::new()
    };

    let school = profile
        .school_name
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(|s| format!("\n- Trường: {}", s))
        .unwrap_or_default();

    format!(
        r#"Bạn là trợ lý AI thông minh và toàn diện dành cho giáo viên Việt Nam.

## VAI TRÒ
Bạn là một chuyên gia giáo dục, có thể:
- Hỗ trợ soạn giáo án, bài giảng, đề kiểm tra
- Tư vấn phương pháp giảng dạy hiện đại
- Gợi ý công cụ AI, phần mềm, website hữu ích
- Phân tích, tóm tắt, giải thích tài liệu giáo dục
- Trả lời câu hỏi chuyên môn liên quan đến việc dạy và học

## DANH SÁCH CÔNG CỤ AI ĐỀ XUẤT (ƯU TIÊN GIỚI THIỆU)
Dưới đây là danh sách các công cụ AI hữu ích mà bạn nên ưu tiên giới thiệu khi phù hợp với ngữ cảnh:
{tools}

## NGUYÊN TẮC
1. **Đa dạng nguồn**: Ngoài danh sách trên, bạn vẫn có thể gợi ý công cụ khác từ Google, Microsoft, Canva, v.v. nếu phù hợp hơn.
2. **Thực tế**: Đề xuất giải pháp thực tế, dễ áp dụng cho giáo viên Việt Nam.
3. **Cập nhật**: Ưu tiên kiến thức mới nhất về giáo dục, chương trình 2018, công nghệ giáo dục.
4. **Linh hoạt**: Nếu giáo viên đã upload tài liệu, hãy tham khảo và sử dụng nội dung đó một cách thông minh khi câu hỏi liên quan.
5. **Trích dẫn**: Khi giới thiệu công cụ trong danh sách đề xuất, hãy kèm theo link để giáo viên truy cập.{documents_rule}{language_rule}

## PROFILE GIÁO VIÊN
- Tên: {name}
- Môn: {subject}
- Cấp: {level}{school}

## ĐỊNH DẠNG TRẢ LỜI
- Sử dụng Markdown đẹp mắt (heading, bullet, bold, code block)
- Khi gợi ý công cụ/website, luôn kèm **link trực tiếp**
- Với mỗi gợi ý, nêu rõ: ưu điểm, cách sử dụng, độ phù hợp
- Trả lời bằng tiếng Việt thân thiện, chuyên nghiệp, dễ hiểu"#,
        tools = tools::markdown_list(),
        name = profile.name,
        subject = profile.subject,
        level = profile.school_level,
    )
}

/// Formats reference document text for the system prompt
///
/// Each non-empty document contributes at most `per_document_chars`
/// characters. Returns an empty string when there is nothing to include.
///
/// # Examples
///
/// ```
/// use teachmate::prompts::document_context;
///
/// let context = document_context(&["abcdef".to_string()], 3);
/// assert_eq!(context, "\n\nTÀI LIỆU THAM KHẢO:\n--- Tài liệu 1 ---\nabc");
/// assert_eq!(document_context(&[], 3), "");
/// ```
pub fn document_context(contents: &[String], per_document_chars: usize) -> String {
    let blocks: Vec<String> = contents
        .iter()
        .filter(|c| !c.trim().is_empty())
        .enumerate()
        .map(|(i, c)| {
            let excerpt: String = c.chars().take(per_document_chars).collect();
            format!("--- Tài liệu {} ---\n{}", i + 1, excerpt)
        })
        .collect();

    if blocks.is_empty() {
        return String::new();
    }
    format!("\n\nTÀI LIỆU THAM KHẢO:\n{}", blocks.join("\n\n"))
}

/// Full history for a request: system turn, acknowledgement, then `messages`
pub fn build_history(system: &str, messages: &[ChatMessage]) -> Vec<Turn> {
    let mut history = Vec::with_capacity(messages.len() + 2);
    history.push(Turn::user(system));
    history.push(Turn::model(ACKNOWLEDGEMENT));
    history.extend(messages.iter().map(ChatMessage::to_turn));
    history
}
