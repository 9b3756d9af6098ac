//! Research payload presentation.
//!
//! Enrichment jobs attach arbitrary JSON to leads and companies. This module
//! turns such a value into a `ViewNode` tree with no rendering concerns, then
//! flattens the tree into indented `ViewLine`s the terminal UI can draw.
//! Depth and total size are bounded so hostile or runaway payloads cannot
//! blow the stack or the screen.

use serde_json::Value;

use crate::models::raw::{parse_json_value, value_to_string, RawRecord};
use crate::utils::humanize_label;

/// Nesting depth past which a subtree is replaced by `ViewNode::Truncated`.
pub const MAX_VIEW_DEPTH: usize = 16;

/// Upper bound on nodes built for one value.
pub const MAX_VIEW_NODES: usize = 2_000;

/// Placeholder text for empty values.
pub const NO_DATA: &str = "No data";

const COMPANY_RESEARCH_KEYS: &[&str] = &[
    "research_data",
    "researchData",
    "research",
    "research_summary",
    "company_research",
    "companyResearch",
];
const LEAD_RESEARCH_KEYS: &[&str] = &["research", "research_data", "researchData"];
const CONTENT_SEQUENCE_KEYS: &[&str] = &[
    "content_sequence",
    "contentSequence",
    "sequence",
    "sequence_data",
    "sequenceData",
    "email_sequence",
];

/// Sections shown first, in this order, when present.
const SECTION_ORDER: &[&str] = &[
    "company_name",
    "job_title",
    "lead_name",
    "lead_email",
    "researched_at",
    "full_context",
    "company_insights",
    "research_summary",
    "data_sources_used",
    "research_completeness",
    "lead_linkedin_activity",
    "company_linkedin_activity",
];
const HIDDEN_SECTIONS: &[&str] = &["lead_id", "client_id"];

#[derive(Debug, Clone, PartialEq)]
pub enum ViewNode {
    Empty,
    Primitive(String),
    /// Array whose items are all scalars.
    List(Vec<String>),
    /// Array with at least one nested item.
    Stack(Vec<ViewNode>),
    /// Object entries with humanized labels, in source order.
    Group(Vec<(String, ViewNode)>),
    Truncated,
}

/// Build the view tree for a JSON value.
pub fn build_view(value: &Value) -> ViewNode {
    let mut builder = ViewBuilder { nodes: 0 };
    builder.build(value, 0)
}

struct ViewBuilder {
    nodes: usize,
}

impl ViewBuilder {
    fn build(&mut self, value: &Value, depth: usize) -> ViewNode {
        if depth >= MAX_VIEW_DEPTH || self.nodes >= MAX_VIEW_NODES {
            return ViewNode::Truncated;
        }
        self.nodes += 1;

        match value {
            Value::Null => ViewNode::Empty,
            Value::String(s) if s.is_empty() => ViewNode::Empty,
            Value::String(_) | Value::Number(_) | Value::Bool(_) => {
                ViewNode::Primitive(value_to_string(value))
            }
            Value::Array(items) if items.is_empty() => ViewNode::Empty,
            Value::Array(items) if items.iter().all(is_scalar) => {
                self.nodes += items.len();
                ViewNode::List(items.iter().map(value_to_string).collect())
            }
            Value::Array(items) => {
                ViewNode::Stack(items.iter().map(|item| self.build(item, depth + 1)).collect())
            }
            Value::Object(map) if map.is_empty() => ViewNode::Empty,
            Value::Object(map) => ViewNode::Group(
                map.iter()
                    .map(|(key, entry)| (humanize_label(key), self.build(entry, depth + 1)))
                    .collect(),
            ),
        }
    }
}

fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Heading for an object entry.
    Label,
    Text,
    /// One item of a scalar list.
    Bullet,
    /// Placeholder such as "No data".
    Muted,
    /// Gap between items of a stack.
    Separator,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewLine {
    pub depth: usize,
    pub kind: LineKind,
    pub text: String,
}

impl ViewLine {
    fn new(depth: usize, kind: LineKind, text: impl Into<String>) -> Self {
        Self {
            depth,
            kind,
            text: text.into(),
        }
    }
}

impl ViewNode {
    /// Flatten into display lines, children indented one level.
    pub fn lines(&self) -> Vec<ViewLine> {
        let mut out = Vec::new();
        self.push_lines(0, &mut out);
        out
    }

    fn push_lines(&self, depth: usize, out: &mut Vec<ViewLine>) {
        match self {
            ViewNode::Empty => out.push(ViewLine::new(depth, LineKind::Muted, NO_DATA)),
            ViewNode::Truncated => out.push(ViewLine::new(depth, LineKind::Muted, "…")),
            ViewNode::Primitive(text) => {
                for line in text.lines() {
                    out.push(ViewLine::new(depth, LineKind::Text, line));
                }
            }
            ViewNode::List(items) => {
                for item in items {
                    out.push(ViewLine::new(depth, LineKind::Bullet, item.as_str()));
                }
            }
            ViewNode::Stack(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(ViewLine::new(depth, LineKind::Separator, ""));
                    }
                    item.push_lines(depth, out);
                }
            }
            ViewNode::Group(entries) => {
                for (label, node) in entries {
                    out.push(ViewLine::new(depth, LineKind::Label, label.as_str()));
                    node.push_lines(depth + 1, out);
                }
            }
        }
    }
}

/// One titled block of a research payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub key: String,
    pub title: String,
    pub view: ViewNode,
}

/// Decode a section value. Null and empty strings mean "nothing".
pub fn parse_section_value(value: &Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        other => Some(parse_json_value(other)),
    }
}

/// Research payload attached to a company's metadata.
pub fn company_research(metadata: Option<&Value>) -> Option<Value> {
    let metadata = metadata.map(parse_json_value)?;
    let raw = RawRecord::new(&metadata).first_truthy(COMPANY_RESEARCH_KEYS)?;
    parse_section_value(raw)
}

/// Research payload attached to a lead's metadata.
pub fn lead_research(metadata: Option<&Value>) -> Option<Value> {
    pick_section(metadata, LEAD_RESEARCH_KEYS)
}

/// Generated outreach sequence attached to a lead's metadata.
pub fn content_sequence(metadata: Option<&Value>) -> Option<Value> {
    pick_section(metadata, CONTENT_SEQUENCE_KEYS)
}

fn pick_section(metadata: Option<&Value>, keys: &[&str]) -> Option<Value> {
    let metadata = metadata.map(parse_json_value)?;
    let raw = RawRecord::new(&metadata).first_present(keys)?;
    parse_section_value(raw)
}

/// Split a research payload into sections: known keys first in a fixed
/// order, then everything else in source order. Internal ids are hidden.
/// A payload that is not an object becomes a single "Research" section.
pub fn research_sections(payload: Option<&Value>) -> Vec<Section> {
    let Some(Value::Object(map)) = payload else {
        return vec![Section {
            key: "research".to_string(),
            title: "Research".to_string(),
            view: payload.map(build_view).unwrap_or(ViewNode::Empty),
        }];
    };

    let section = |key: &str, value: &Value| Section {
        key: key.to_string(),
        title: humanize_label(key),
        view: build_view(value),
    };

    let mut sections = Vec::new();
    let mut used: Vec<&str> = Vec::new();
    for &key in SECTION_ORDER {
        if let Some(value) = map.get(key).filter(|v| !v.is_null()) {
            used.push(key);
            sections.push(section(key, value));
        }
    }
    for (key, value) in map {
        if !used.contains(&key.as_str()) && !HIDDEN_SECTIONS.contains(&key.as_str()) {
            sections.push(section(key, value));
        }
    }
    sections
}

/// One email of a generated outreach sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceEmail {
    pub subject: String,
    pub step: String,
    pub status: String,
    pub word_count: Option<String>,
    pub send_after_days: Option<String>,
    pub body: String,
}

/// Emails of a content sequence, or `None` when it has no `emails` list
/// (the caller then shows the payload as a generic tree).
pub fn sequence_emails(sequence: &Value) -> Option<Vec<SequenceEmail>> {
    let emails = sequence.get("emails")?.as_array()?;
    if emails.is_empty() {
        return None;
    }
    Some(
        emails
            .iter()
            .enumerate()
            .map(|(i, email)| {
                let rec = RawRecord::new(email);
                SequenceEmail {
                    subject: rec.str_or(&["subject"], "No subject"),
                    step: rec
                        .first_str(&["sequence_position", "sequence_position_label", "type"])
                        .unwrap_or_else(|| format!("Step {}", i + 1)),
                    status: rec.str_or(&["status"], "unknown"),
                    word_count: rec.first_present(&["word_count", "wordCount"]).map(value_to_string),
                    send_after_days: rec
                        .first_present(&["send_after_days", "sendAfterDays"])
                        .map(value_to_string),
                    body: rec.str_or(&["body", "email_body"], ""),
                }
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_view_shapes() {
        assert_eq!(build_view(&json!(null)), ViewNode::Empty);
        assert_eq!(build_view(&json!("")), ViewNode::Empty);
        assert_eq!(build_view(&json!([])), ViewNode::Empty);
        assert_eq!(build_view(&json!({})), ViewNode::Empty);
        assert_eq!(build_view(&json!(false)), ViewNode::Primitive("false".into()));
        assert_eq!(build_view(&json!(3.5)), ViewNode::Primitive("3.5".into()));
        assert_eq!(
            build_view(&json!(["a", 1, true])),
            ViewNode::List(vec!["a".into(), "1".into(), "true".into()])
        );
        assert_eq!(
            build_view(&json!(["a", { "k": null }])),
            ViewNode::Stack(vec![
                ViewNode::Primitive("a".into()),
                ViewNode::Group(vec![("K".into(), ViewNode::Empty)]),
            ])
        );
    }

    #[test]
    fn test_group_labels_humanized() {
        let view = build_view(&json!({ "company_insights": "Growing fast" }));
        assert_eq!(
            view,
            ViewNode::Group(vec![(
                "Company Insights".into(),
                ViewNode::Primitive("Growing fast".into())
            )])
        );
    }

    #[test]
    fn test_depth_limit() {
        let mut value = json!("leaf");
        for _ in 0..(MAX_VIEW_DEPTH + 5) {
            value = json!({ "n": value });
        }
        let mut node = build_view(&value);
        let mut depth = 0;
        while let ViewNode::Group(mut entries) = node {
            node = entries.remove(0).1;
            depth += 1;
        }
        assert_eq!(node, ViewNode::Truncated);
        assert_eq!(depth, MAX_VIEW_DEPTH);
    }

    #[test]
    fn test_node_limit() {
        let wide: Vec<Value> = (0..MAX_VIEW_NODES + 10).map(|i| json!({ "i": i })).collect();
        let view = build_view(&Value::Array(wide));
        let ViewNode::Stack(items) = view else {
            panic!("expected stack");
        };
        assert_eq!(items.last(), Some(&ViewNode::Truncated));
    }

    #[test]
    fn test_lines() {
        let view = build_view(&json!({ "alpha": "line one\nline two", "beta": ["a", "b"], "gamma": [] }));
        let lines = view.lines();
        let texts: Vec<(usize, LineKind, &str)> =
            lines.iter().map(|l| (l.depth, l.kind, l.text.as_str())).collect();
        assert_eq!(
            texts,
            vec![
                (0, LineKind::Label, "Alpha"),
                (1, LineKind::Text, "line one"),
                (1, LineKind::Text, "line two"),
                (0, LineKind::Label, "Beta"),
                (1, LineKind::Bullet, "a"),
                (1, LineKind::Bullet, "b"),
                (0, LineKind::Label, "Gamma"),
                (1, LineKind::Muted, NO_DATA),
            ]
        );
    }

    #[test]
    fn test_company_research_picks_first_truthy_and_decodes() {
        let metadata = json!({
            "research_data": "",
            "research": "{\"research_summary\":\"ok\"}"
        });
        let research = company_research(Some(&metadata));
        assert_eq!(research, Some(json!({ "research_summary": "ok" })));

        // metadata itself may arrive encoded
        let encoded = json!(serde_json::to_string(&metadata).unwrap());
        assert_eq!(company_research(Some(&encoded)), research);

        assert_eq!(company_research(None), None);
        assert_eq!(company_research(Some(&json!({ "other": 1 }))), None);
    }

    #[test]
    fn test_research_sections_order_and_hidden() {
        let payload = json!({
            "zeta": 1,
            "lead_id": "hidden",
            "research_summary": "summary",
            "company_name": "Acme",
            "client_id": "hidden"
        });
        let keys: Vec<String> = research_sections(Some(&payload)).into_iter().map(|s| s.key).collect();
        assert_eq!(keys, vec!["company_name", "research_summary", "zeta"]);

        // a null known key is not promoted but still listed with the rest
        let nulls = json!({ "job_title": null });
        let sections = research_sections(Some(&nulls));
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Job Title");
        assert_eq!(sections[0].view, ViewNode::Empty);
    }

    #[test]
    fn test_research_sections_non_object() {
        let sections = research_sections(Some(&json!("plain text")));
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Research");
        assert_eq!(sections[0].view, ViewNode::Primitive("plain text".into()));

        assert_eq!(research_sections(None)[0].view, ViewNode::Empty);
    }

    #[test]
    fn test_sequence_emails() {
        let metadata = json!({
            "content_sequence": {
                "emails": [
                    { "subject": "Intro", "type": "initial", "word_count": 120, "body": "Hi" },
                    { "status": "draft", "sendAfterDays": 3 }
                ]
            }
        });
        let sequence = content_sequence(Some(&metadata)).unwrap();
        let emails = sequence_emails(&sequence).unwrap();
        assert_eq!(emails.len(), 2);
        assert_eq!(emails[0].step, "initial");
        assert_eq!(emails[0].word_count.as_deref(), Some("120"));
        assert_eq!(emails[0].status, "unknown");
        assert_eq!(emails[1].subject, "No subject");
        assert_eq!(emails[1].step, "Step 2");
        assert_eq!(emails[1].send_after_days.as_deref(), Some("3"));

        assert_eq!(sequence_emails(&json!({ "emails": [] })), None);
        assert_eq!(sequence_emails(&json!("text")), None);
    }
}
