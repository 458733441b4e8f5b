//! Markdown export

use super::Transcript;

/// Render a transcript as Markdown
pub fn render(transcript: &Transcript<'_>) -> String {
    let mut md = format!(
        "# {}\n> Xuất ngày: {}\n\n---\n\n",
        transcript.title,
        transcript.date_label()
    );
    for message in transcript.messages {
        md.push_str(&format!(
            "### {}\n{}\n\n---\n\n",
            transcript.speaker_label(message),
            message.text
        ));
    }
    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::tests::{sample_messages, sample_transcript};

    #[test]
    fn test_render_markdown() {
        let messages = sample_messages();
        let md = render(&sample_transcript(&messages));
        let expected = "# Giáo án <Toán>\n> Xuất ngày: 02/03/2026\n\n---\n\n\
                        ### 👤 Bạn (09:05)\nSoạn giáo án Toán 6\n\n---\n\n\
                        ### 🤖 Trợ lý GV (09:06)\n## Mục tiêu\n- Hiểu **phân số**\n1. Khởi động\n\n---\n\n";
        assert_eq!(md, expected);
    }

    #[test]
    fn test_render_empty_conversation() {
        let t = sample_transcript(&[]);
        assert_eq!(
            render(&t),
            "# Giáo án <Toán>\n> Xuất ngày: 02/03/2026\n\n---\n\n"
        );
    }
}
