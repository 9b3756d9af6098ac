//! Tab-specific content rendering.

pub mod companies;
pub mod dashboard;
pub mod leads;
pub mod replies;
pub mod settings;

use ratatui::text::{Line, Span};

use oreeai_core::research::{sequence_emails, LineKind, Section, ViewLine};

use super::styles;

const INDENT: &str = "  ";

/// A "Label:  value" detail row.
pub(crate) fn field_line(label: &str, value: impl Into<String>) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<14}", format!("{}:", label)), styles::muted_style()),
        Span::raw(value.into()),
    ])
}

pub(crate) fn heading(text: impl Into<String>) -> Line<'static> {
    Line::from(Span::styled(text.into(), styles::highlight_style()))
}

pub(crate) fn wrap_text(s: &str, max_width: usize) -> Vec<String> {
    let max_width = max_width.max(1);
    let mut lines = Vec::new();

    for paragraph in s.lines() {
        let mut current_line = String::new();
        for word in paragraph.split_whitespace() {
            if current_line.is_empty() {
                current_line = word.to_string();
            } else if current_line.chars().count() + 1 + word.chars().count() <= max_width {
                current_line.push(' ');
                current_line.push_str(word);
            } else {
                lines.push(std::mem::take(&mut current_line));
                current_line = word.to_string();
            }
        }
        lines.push(current_line);
    }

    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

/// Render flattened research lines, wrapping text to `width`.
pub(crate) fn view_lines(lines: &[ViewLine], width: usize) -> Vec<Line<'static>> {
    let mut out = Vec::new();
    for line in lines {
        let indent = INDENT.repeat(line.depth + 1);
        let room = width.saturating_sub(indent.len() + 2);
        match line.kind {
            LineKind::Label => out.push(Line::from(vec![
                Span::raw(indent),
                Span::styled(line.text.clone(), styles::title_style()),
            ])),
            LineKind::Text => {
                for chunk in wrap_text(&line.text, room) {
                    out.push(Line::from(vec![Span::raw(indent.clone()), Span::raw(chunk)]));
                }
            }
            LineKind::Bullet => {
                for (i, chunk) in wrap_text(&line.text, room).into_iter().enumerate() {
                    let marker = if i == 0 { "• " } else { "  " };
                    out.push(Line::from(vec![
                        Span::raw(indent.clone()),
                        Span::styled(marker, styles::muted_style()),
                        Span::raw(chunk),
                    ]));
                }
            }
            LineKind::Muted => out.push(Line::from(vec![
                Span::raw(indent),
                Span::styled(line.text.clone(), styles::muted_style()),
            ])),
            LineKind::Separator => out.push(Line::from("")),
        }
    }
    out
}

pub(crate) fn section_lines(sections: &[Section], width: usize) -> Vec<Line<'static>> {
    let mut out = Vec::new();
    for section in sections {
        out.push(heading(section.title.clone()));
        out.extend(view_lines(&section.view.lines(), width));
        out.push(Line::from(""));
    }
    out
}

/// Outreach sequence as email cards, or the generic tree when the
/// payload has no email list.
pub(crate) fn sequence_lines(sequence: &serde_json::Value, width: usize) -> Vec<Line<'static>> {
    let Some(emails) = sequence_emails(sequence) else {
        let view = oreeai_core::research::build_view(sequence);
        return view_lines(&view.lines(), width);
    };

    let mut out = Vec::new();
    for email in emails {
        out.push(Line::from(vec![
            Span::raw(INDENT),
            Span::styled(email.step, styles::help_key_style()),
            Span::styled(format!("  [{}]", email.status), styles::muted_style()),
        ]));
        out.push(Line::from(vec![
            Span::raw(INDENT),
            Span::styled(email.subject, styles::title_style()),
        ]));
        let mut facts = Vec::new();
        if let Some(words) = email.word_count {
            facts.push(format!("{} words", words));
        }
        if let Some(days) = email.send_after_days {
            facts.push(format!("send after {} days", days));
        }
        if !facts.is_empty() {
            out.push(Line::from(vec![
                Span::raw(INDENT),
                Span::styled(facts.join(" · "), styles::muted_style()),
            ]));
        }
        for chunk in wrap_text(&email.body, width.saturating_sub(6)) {
            out.push(Line::from(format!("{}{}", INDENT.repeat(2), chunk)));
        }
        out.push(Line::from(""));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wrap_text() {
        assert_eq!(wrap_text("one two three", 7), vec!["one two", "three"]);
        assert_eq!(wrap_text("a\n\nb", 10), vec!["a", "", "b"]);
        assert!(wrap_text("", 10).is_empty());
    }

    #[test]
    fn test_sequence_lines_fall_back_to_tree() {
        let lines = sequence_lines(&json!({ "note": "draft" }), 40);
        assert_eq!(lines.len(), 2);

        let cards = sequence_lines(
            &json!({ "emails": [{ "subject": "Hi", "body": "Hello there", "word_count": 2 }] }),
            40,
        );
        assert!(cards.len() >= 4);
    }
}
