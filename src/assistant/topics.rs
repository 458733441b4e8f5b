//! Session titles and topic tags derived from the first question

/// Longest title taken from a question before it is elided
pub const TITLE_MAX_CHARS: usize = 40;

/// Tag applied when no keyword matches
pub const FALLBACK_TAG: &str = "Hỏi đáp";

/// Topic tags and the lowercase keywords that select them
pub const TAG_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "Giáo án",
        &[
            "giáo án",
            "kế hoạch bài dạy",
            "tiết dạy",
            "5512",
            "khbd",
            "soạn bài",
            "5e",
            "stem",
            "pbl",
        ],
    ),
    (
        "Đề thi",
        &[
            "đề thi",
            "đề kiểm tra",
            "trắc nghiệm",
            "tự luận",
            "ma trận",
            "kiểm tra",
            "exit ticket",
            "bloom",
        ],
    ),
    (
        "Nhận xét",
        &[
            "nhận xét",
            "học bạ",
            "sổ liên lạc",
            "đánh giá",
            "năng lực",
            "phẩm chất",
        ],
    ),
    (
        "SKKN",
        &[
            "sáng kiến",
            "skkn",
            "kinh nghiệm",
            "thực trạng",
            "giải pháp",
        ],
    ),
    (
        "Phương pháp",
        &[
            "phương pháp",
            "dạy học",
            "phân hóa",
            "tích hợp",
            "cntt",
            "công nghệ",
        ],
    ),
    (
        "Quản lý lớp",
        &[
            "quản lý lớp",
            "chủ nhiệm",
            "phụ huynh",
            "nội quy",
            "mâu thuẫn",
            "kỷ luật",
            "họp phụ huynh",
        ],
    ),
    (
        "Học liệu",
        &[
            "slide",
            "video",
            "kahoot",
            "sơ đồ tư duy",
            "flashcard",
            "mindmap",
            "quizizz",
        ],
    ),
];

/// Session title from the first question
///
/// # Examples
///
/// ```
/// use teachmate::assistant::topics::generate_title;
///
/// assert_eq!(generate_title("  Soạn giáo án\nToán 6 "), "Soạn giáo án Toán 6");
/// assert_eq!(generate_title(&"a".repeat(41)), format!("{}...", "a".repeat(40)));
/// ```
pub fn generate_title(question: &str) -> String {
    let clean = question.replace('\n', " ");
    let clean = clean.trim();
    if clean.chars().count() <= TITLE_MAX_CHARS {
        return clean.to_string();
    }
    let head: String = clean.chars().take(TITLE_MAX_CHARS).collect();
    format!("{}...", head)
}

/// Topic tags for a question, in table order
pub fn auto_detect_tags(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let tags: Vec<String> = TAG_KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|kw| lower.contains(kw)))
        .map(|(tag, _)| tag.to_string())
        .collect();

    if tags.is_empty() {
        vec![FALLBACK_TAG.to_string()]
    } else {
        tags
    }
}
