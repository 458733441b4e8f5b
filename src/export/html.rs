//! Print-ready HTML export
//!
//! The page is self-contained so it can be opened in any browser and saved as
//! PDF from the print dialog.

use regex::Regex;

use super::Transcript;
use crate::error::Result;
use crate::storage::Role;

const STYLE: &str = r#"  * { margin: 0; padding: 0; box-sizing: border-box; }
  body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; padding: 40px; color: #1e293b; line-height: 1.7; }
  h1 { text-align: center; color: #0d9488; margin-bottom: 5px; font-size: 24px; }
  .date { text-align: center; color: #94a3b8; font-style: italic; margin-bottom: 30px; font-size: 13px; }
  .msg { margin-bottom: 20px; padding: 16px 20px; border-radius: 12px; page-break-inside: avoid; }
  .user { background: #f0fdfa; border-left: 4px solid #14b8a6; }
  .ai { background: #f8fafc; border-left: 4px solid #06b6d4; }
  .speaker { font-weight: 700; font-size: 13px; margin-bottom: 6px; }
  .user .speaker { color: #0d9488; }
  .ai .speaker { color: #0891b2; }
  .content { font-size: 14px; white-space: pre-wrap; }
  .content strong { font-weight: 700; }
  hr { border: none; border-top: 1px solid #e2e8f0; margin: 15px 0; }
  @media print { body { padding: 20px; } }"#;

/// Escape text for HTML element content
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Compiled line rules for message bodies
struct Rules {
    bold: Regex,
    h3: Regex,
    h2: Regex,
    h1: Regex,
    bullet: Regex,
    numbered: Regex,
}

impl Rules {
    fn new() -> Result<Self> {
        Ok(Self {
            bold: Regex::new(r"\*\*(.*?)\*\*")?,
            h3: Regex::new(r"(?m)^### (.*)$")?,
            h2: Regex::new(r"(?m)^## (.*)$")?,
            h1: Regex::new(r"(?m)^# (.*)$")?,
            bullet: Regex::new(r"(?m)^- (.*)$")?,
            numbered: Regex::new(r"(?m)^\d+\. .*$")?,
        })
    }

    fn apply(&self, text: &str) -> String {
        let html = escape_html(text);
        let html = self.bold.replace_all(&html, "<strong>$1</strong>");
        let html = self.h3.replace_all(
            &html,
            r#"<h4 style="margin:8px 0 4px;font-size:15px;color:#334155">$1</h4>"#,
        );
        let html = self.h2.replace_all(
            &html,
            r#"<h3 style="margin:10px 0 5px;font-size:16px;color:#1e293b">$1</h3>"#,
        );
        let html = self.h1.replace_all(
            &html,
            r#"<h2 style="margin:12px 0 6px;font-size:18px;color:#0f172a">$1</h2>"#,
        );
        let html = self
            .bullet
            .replace_all(&html, r#"<div style="padding-left:16px">• $1</div>"#);
        self.numbered
            .replace_all(&html, r#"<div style="padding-left:16px">$0</div>"#)
            .into_owned()
    }
}

/// Render a transcript as a standalone HTML page
pub fn render(transcript: &Transcript<'_>) -> Result<String> {
    let rules = Rules::new()?;
    let title = escape_html(transcript.title);

    let mut html = format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\">\n<title>{title}</title>\n<style>\n{STYLE}\n</style>\n</head><body>\n<h1>{title}</h1>\n<p class=\"date\">Xuất ngày: {date}</p>",
        date = transcript.date_label(),
    );

    for message in transcript.messages {
        let class = match message.role {
            Role::User => "user",
            Role::Model => "ai",
        };
        html.push_str(&format!(
            "<div class=\"msg {}\"><div class=\"speaker\">{}</div><div class=\"content\">{}</div></div>",
            class,
            transcript.speaker_label(message),
            rules.apply(&message.text)
        ));
    }

    html.push_str("</body></html>");
    Ok(html)
}
