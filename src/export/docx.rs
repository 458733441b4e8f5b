//! Word (.docx) export
//!
//! Builds a minimal WordprocessingML package by hand: content types, the
//! package relationship, and a single `word/document.xml` body. Message text
//! is translated line by line from the Markdown the assistant produces.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::{inline_bold_runs, Transcript};
use crate::error::{Result, TeachmateError};
use crate::storage::Role;

const USER_COLOR: &str = "4F46E5";
const MODEL_COLOR: &str = "059669";

/// Body font size in half-points
const BODY_SIZE: u32 = 22;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

/// Render a transcript as a .docx package
pub fn render(transcript: &Transcript<'_>) -> Result<Vec<u8>> {
    let body = document_xml(transcript);

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, content) in [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", PACKAGE_RELS),
        ("word/document.xml", body.as_str()),
    ] {
        zip.start_file(name, options)?;
        zip.write_all(content.as_bytes())
            .map_err(|e| TeachmateError::Export(format!("Failed to write {}: {}", name, e)))?;
    }
    Ok(zip.finish()?.into_inner())
}

/// The `word/document.xml` part for a transcript
pub fn document_xml(transcript: &Transcript<'_>) -> String {
    let mut body = String::new();

    body.push_str(&paragraph(
        r#"<w:jc w:val="center"/><w:spacing w:after="200"/>"#,
        &run(transcript.title, RunStyle::sized(40).bold()),
    ));
    body.push_str(&paragraph(
        r#"<w:jc w:val="center"/><w:spacing w:after="400"/>"#,
        &run(
            &format!("Xuất ngày: {}", transcript.date_label()),
            RunStyle::sized(20).italic().color("888888"),
        ),
    ));
    body.push_str(&rule("CCCCCC"));

    for message in transcript.messages {
        let color = match message.role {
            Role::User => USER_COLOR,
            Role::Model => MODEL_COLOR,
        };
        body.push_str(&paragraph(
            r#"<w:spacing w:before="300" w:after="100"/>"#,
            &run(
                &transcript.speaker_label(message),
                RunStyle::sized(24).bold().color(color),
            ),
        ));
        body.push_str(&message_body(&message.text));
        body.push_str(&rule("EEEEEE"));
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}<w:sectPr><w:pgMar w:top="1000" w:right="1000" w:bottom="1000" w:left="1000" w:header="720" w:footer="720" w:gutter="0"/></w:sectPr></w:body></w:document>"#,
        body
    )
}

/// Translate Markdown lines into paragraphs and tables
fn message_body(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut out = String::new();
    let mut i = 0;
    while i < lines.len() {
        let trimmed = lines[i].trim();
        if trimmed.starts_with('|') {
            let start = i;
            while i < lines.len() && lines[i].trim().starts_with('|') {
                i += 1;
            }
            out.push_str(&table(&lines[start..i]));
            continue;
        }
        out.push_str(&line_paragraph(trimmed));
        i += 1;
    }
    out
}

fn line_paragraph(trimmed: &str) -> String {
    let body_style = RunStyle::sized(BODY_SIZE);
    let list_props = r#"<w:ind w:left="360"/><w:spacing w:after="50"/>"#;
    let plain_props = r#"<w:spacing w:after="50"/>"#;

    if let Some(rest) = trimmed.strip_prefix("### ") {
        heading(rest, 26, 100)
    } else if let Some(rest) = trimmed.strip_prefix("## ") {
        heading(rest, 28, 150)
    } else if let Some(rest) = trimmed.strip_prefix("# ") {
        heading(rest, 32, 200)
    } else if let Some(rest) = trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))
    {
        paragraph(list_props, &bold_runs(&format!("• {}", rest), body_style))
    } else if is_numbered(trimmed) {
        paragraph(list_props, &bold_runs(trimmed, body_style))
    } else if trimmed.len() >= 4 && trimmed.starts_with("**") && trimmed.ends_with("**") {
        paragraph(
            plain_props,
            &run(&trimmed.replace("**", ""), body_style.bold()),
        )
    } else if trimmed.is_empty() {
        paragraph(plain_props, "")
    } else {
        paragraph(plain_props, &bold_runs(trimmed, body_style))
    }
}

fn heading(text: &str, size: u32, before: u32) -> String {
    let text = text.trim_start_matches('#').trim();
    paragraph(
        &format!(r#"<w:spacing w:before="{}" w:after="50"/>"#, before),
        &run(text, RunStyle::sized(size).bold()),
    )
}

/// `1. item`, `23. item`
fn is_numbered(line: &str) -> bool {
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    digits > 0
        && line[digits..].starts_with('.')
        && line[digits + 1..].starts_with(|c: char| c.is_whitespace())
}

/// A `|---|:--:|` style separator row
fn is_separator_row(cells: &[String]) -> bool {
    !cells.is_empty()
        && cells.iter().all(|c| {
            let c = c.trim();
            !c.is_empty() && c.contains('-') && c.chars().all(|ch| matches!(ch, '-' | ':'))
        })
}

fn table_cells(line: &str) -> Vec<String> {
    let inner = line.trim();
    let inner = inner.strip_prefix('|').unwrap_or(inner);
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    inner.split('|').map(|c| c.trim().to_string()).collect()
}

fn table(lines: &[&str]) -> String {
    let rows: Vec<Vec<String>> = lines
        .iter()
        .map(|l| table_cells(l))
        .filter(|cells| !is_separator_row(cells))
        .collect();
    let has_header = lines.len() > 1 && is_separator_row(&table_cells(lines[1]));
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);

    let mut xml = String::from(
        r#"<w:tbl><w:tblPr><w:tblW w:w="5000" w:type="pct"/><w:tblBorders><w:top w:val="single" w:sz="4" w:space="0" w:color="999999"/><w:left w:val="single" w:sz="4" w:space="0" w:color="999999"/><w:bottom w:val="single" w:sz="4" w:space="0" w:color="999999"/><w:right w:val="single" w:sz="4" w:space="0" w:color="999999"/><w:insideH w:val="single" w:sz="4" w:space="0" w:color="999999"/><w:insideV w:val="single" w:sz="4" w:space="0" w:color="999999"/></w:tblBorders></w:tblPr><w:tblGrid>"#,
    );
    for _ in 0..columns {
        xml.push_str("<w:gridCol/>");
    }
    xml.push_str("</w:tblGrid>");

    for (r, cells) in rows.iter().enumerate() {
        let header = has_header && r == 0;
        xml.push_str("<w:tr>");
        for c in 0..columns {
            let text = cells.get(c).map(String::as_str).unwrap_or("");
            let style = RunStyle::sized(BODY_SIZE).bold_if(header);
            let shading = if header {
                r#"<w:shd w:val="clear" w:color="auto" w:fill="F1F5F9"/>"#
            } else {
                ""
            };
            xml.push_str(&format!(
                "<w:tc><w:tcPr>{}</w:tcPr>{}</w:tc>",
                shading,
                paragraph("", &bold_runs(text, style))
            ));
        }
        xml.push_str("</w:tr>");
    }
    xml.push_str("</w:tbl>");
    // Word needs a paragraph between adjacent tables
    xml.push_str(&paragraph(r#"<w:spacing w:after="50"/>"#, ""));
    xml
}

fn rule(color: &str) -> String {
    paragraph(
        &format!(
            r#"<w:pBdr><w:bottom w:val="single" w:sz="4" w:space="1" w:color="{}"/></w:pBdr><w:spacing w:before="100" w:after="200"/>"#,
            color
        ),
        "",
    )
}

#[derive(Debug, Clone, Copy, Default)]
struct RunStyle {
    bold: bool,
    italic: bool,
    /// Half-points; 0 keeps the default
    size: u32,
    color: Option<&'static str>,
}

impl RunStyle {
    fn sized(size: u32) -> Self {
        RunStyle {
            size,
            ..RunStyle::default()
        }
    }

    fn bold(self) -> Self {
        self.bold_if(true)
    }

    fn bold_if(mut self, bold: bool) -> Self {
        self.bold |= bold;
        self
    }

    fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    fn color(mut self, color: &'static str) -> Self {
        self.color = Some(color);
        self
    }
}

fn paragraph(properties: &str, runs: &str) -> String {
    if properties.is_empty() {
        format!("<w:p>{}</w:p>", runs)
    } else {
        format!("<w:p><w:pPr>{}</w:pPr>{}</w:p>", properties, runs)
    }
}

fn run(text: &str, style: RunStyle) -> String {
    let mut props = String::new();
    if style.bold {
        props.push_str("<w:b/>");
    }
    if style.italic {
        props.push_str("<w:i/>");
    }
    if let Some(color) = style.color {
        props.push_str(&format!(r#"<w:color w:val="{}"/>"#, color));
    }
    if style.size > 0 {
        props.push_str(&format!(
            r#"<w:sz w:val="{0}"/><w:szCs w:val="{0}"/>"#,
            style.size
        ));
    }
    let props = if props.is_empty() {
        String::new()
    } else {
        format!("<w:rPr>{}</w:rPr>", props)
    };
    format!(
        r#"<w:r>{}<w:t xml:space="preserve">{}</w:t></w:r>"#,
        props,
        escape_xml(text)
    )
}

fn bold_runs(text: &str, style: RunStyle) -> String {
    inline_bold_runs(text)
        .into_iter()
        .map(|(segment, bold)| run(&segment, style.bold_if(bold)))
        .collect()
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::tests::{sample_messages, sample_transcript};
    use crate::ingest::document_xml_text;
    use std::io::Read;

    #[test]
    fn test_package_contains_required_parts() {
        let messages = sample_messages();
        let bytes = render(&sample_transcript(&messages)).unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        for name in ["[Content_Types].xml", "_rels/.rels", "word/document.xml"] {
            assert!(archive.by_name(name).is_ok(), "missing {}", name);
        }
        let mut xml = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        assert!(xml.contains("Giáo án &lt;Toán&gt;"));
        assert!(xml.contains(USER_COLOR));
        assert!(xml.contains(MODEL_COLOR));
    }

    #[test]
    fn test_exported_text_reads_back() {
        let messages = sample_messages();
        let xml = document_xml(&sample_transcript(&messages));
        let text = document_xml_text(&xml).unwrap();
        assert!(text.contains("Xuất ngày: 02/03/2026"));
        assert!(text.contains("👤 Bạn (09:05)"));
        assert!(text.contains("Mục tiêu"));
        assert!(text.contains("• Hiểu phân số"));
        assert!(text.contains("1. Khởi động"));
    }

    #[test]
    fn test_line_rules() {
        assert!(line_paragraph("# Tiêu đề").contains(r#"<w:sz w:val="32"/>"#));
        assert!(line_paragraph("* mục").contains("• mục"));
        assert!(line_paragraph("**Ghi chú**").contains("<w:b/>"));
        assert!(!line_paragraph("**Ghi chú**").contains("**"));
        assert_eq!(
            line_paragraph(""),
            r#"<w:p><w:pPr><w:spacing w:after="50"/></w:pPr></w:p>"#
        );

        let mixed = line_paragraph("Học **phân số** nhé");
        assert_eq!(mixed.matches("<w:r>").count(), 3);
        assert_eq!(mixed.matches("<w:b/>").count(), 1);
    }

    #[test]
    fn test_is_numbered() {
        assert!(is_numbered("1. a"));
        assert!(is_numbered("12. b"));
        assert!(!is_numbered("1.5 c"));
        assert!(!is_numbered("a. d"));
        assert!(!is_numbered("3."));
    }

    #[test]
    fn test_markdown_table_becomes_word_table() {
        let xml = message_body("Bảng:\n| Tuần | Nội dung |\n|---|:---:|\n| 1 | **Số** |\nHết");
        assert_eq!(xml.matches("<w:tbl>").count(), 1);
        assert_eq!(xml.matches("<w:tr>").count(), 2);
        assert_eq!(xml.matches("<w:tc>").count(), 4);
        assert!(!xml.contains("---"));
        assert!(xml.contains("F1F5F9"));
        assert!(xml.find("Bảng:").unwrap() < xml.find("<w:tbl>").unwrap());
        assert!(xml.find("</w:tbl>").unwrap() < xml.find("Hết").unwrap());
    }

    #[test]
    fn test_table_without_separator_has_no_header() {
        let xml = message_body("| a | b |\n| c |");
        assert!(!xml.contains("F1F5F9"));
        // short rows are padded to the widest row
        assert_eq!(xml.matches("<w:tc>").count(), 4);
    }

    #[test]
    fn test_separator_detection() {
        assert!(is_separator_row(&table_cells("|---|:--:|")));
        assert!(!is_separator_row(&table_cells("| a | - |")));
        assert!(!is_separator_row(&table_cells("| | |")));
    }
}
