//! Résumé rendering from aggregated site content

use chrono::NaiveDate;
use pulldown_cmark::{html, Options, Parser};
use std::fmt::Write;

use crate::content::{Item, SiteContent};

/// Fields tried, in order, for the line next to an item's title
const SUBTITLE_FIELDS: &[&str] = &["company", "institution", "organization", "subtitle", "role"];

/// Render the résumé as Markdown
pub fn render_markdown(content: &SiteContent, generated: NaiveDate) -> String {
    let profile = &content.profile;
    let mut out = String::new();

    let _ = writeln!(out, "# {}", profile.author);
    if !profile.subtitle.is_empty() {
        let _ = writeln!(out, "\n_{}_", profile.subtitle);
    }
    if !profile.description.is_empty() {
        let _ = writeln!(out, "\n{}", profile.description);
    }

    for section in content.sections.values() {
        if section.items.is_empty() {
            continue;
        }

        let _ = writeln!(out, "\n## {}\n", section.label);
        for item in &section.items {
            out.push_str(&render_item(item));
        }
    }

    let _ = writeln!(out, "\n---\n\nGenerated on {}", generated.format("%Y-%m-%d"));
    out
}

/// Render the résumé as a standalone HTML document
pub fn render_html(content: &SiteContent, generated: NaiveDate) -> String {
    let body = markdown_to_html(&render_markdown(content, generated));
    format!(
        "<!DOCTYPE html>\n<html lang=\"{}\">\n<head>\n<meta charset=\"utf-8\">\n<title>{} - Résumé</title>\n</head>\n<body>\n{}</body>\n</html>\n",
        content.profile.language,
        escape(&content.profile.author),
        body
    )
}

/// Convert Markdown to an HTML fragment
pub fn markdown_to_html(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let parser = Parser::new_ext(markdown, options);

    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

fn render_item(item: &Item) -> String {
    let mut line = format!("- **{}**", item.title());

    if let Some(subtitle) = SUBTITLE_FIELDS.iter().find_map(|key| field_text(item, key)) {
        let _ = write!(line, " — {}", subtitle);
    }

    match (field_text(item, "start"), field_text(item, "end")) {
        (Some(start), Some(end)) => {
            let _ = write!(line, " ({} – {})", start, end);
        }
        (Some(start), None) => {
            let _ = write!(line, " ({} – present)", start);
        }
        (None, Some(end)) => {
            let _ = write!(line, " ({})", end);
        }
        (None, None) => {}
    }
    line.push('\n');

    if let Some(description) = field_text(item, "description") {
        let _ = writeln!(line, "  {}", description.trim().replace('\n', " "));
    }

    line
}

/// Scalar field as display text
fn field_text(item: &Item, key: &str) -> Option<String> {
    match item.fields.get(key)? {
        serde_yaml::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
