use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::paged::PagedResult;
use super::raw::{value_to_string, RawRecord};

const LEAD_ID_KEYS: &[&str] = &["lead_id", "leadId"];
const LEAD_EMAIL_KEYS: &[&str] = &["lead_email", "leadEmail"];
const LEAD_NAME_KEYS: &[&str] = &["lead_name", "leadName"];
const TIMESTAMP_KEYS: &[&str] = &["created_at", "timestamp"];
const SUBJECT_KEYS: &[&str] = &["email_subject", "subject"];
const PREVIEW_KEYS: &[&str] = &["reply_snippet", "preview", "reply_content"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    #[default]
    Neutral,
    Negative,
}

impl Sentiment {
    /// Unrecognized values read as neutral.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "positive" => Sentiment::Positive,
            "negative" => Sentiment::Negative,
            _ => Sentiment::Neutral,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "lowercase")]
pub enum ReplyStatus {
    #[default]
    Unread,
    Read,
    Archived,
}

impl ReplyStatus {
    pub const ALL: [ReplyStatus; 3] = [ReplyStatus::Unread, ReplyStatus::Read, ReplyStatus::Archived];

    /// Unrecognized values read as unread.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "read" => ReplyStatus::Read,
            "archived" => ReplyStatus::Archived,
            _ => ReplyStatus::Unread,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReplyStatus::Unread => "unread",
            ReplyStatus::Read => "read",
            ReplyStatus::Archived => "archived",
        }
    }
}

impl std::fmt::Display for ReplyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplyStatus::Unread => write!(f, "Unread"),
            ReplyStatus::Read => write!(f, "Read"),
            ReplyStatus::Archived => write!(f, "Archived"),
        }
    }
}

/// An inbound reply to an outreach email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub id: String,
    pub lead_id: String,
    pub lead_email: String,
    pub lead_name: String,
    pub timestamp: String,
    pub subject: String,
    pub preview: String,
    pub sentiment: Sentiment,
    pub status: ReplyStatus,
}

impl Reply {
    pub fn from_raw(raw: &Value) -> Self {
        let rec = RawRecord::new(raw);
        let lead_id = rec.str_or(LEAD_ID_KEYS, "");

        let joined = ["lead_first_name", "lead_last_name"]
            .iter()
            .filter_map(|k| rec.first_str(&[*k]))
            .collect::<Vec<_>>()
            .join(" ");
        let lead_name = if !joined.is_empty() {
            joined
        } else if let Some(name) = rec.first_str(LEAD_NAME_KEYS) {
            name
        } else if !lead_id.is_empty() {
            format!("Lead {}", lead_id.chars().take(8).collect::<String>())
        } else {
            "Unknown".to_string()
        };

        Self {
            id: rec.first_present(&["id"]).map(value_to_string).unwrap_or_default(),
            lead_email: rec.str_or(LEAD_EMAIL_KEYS, ""),
            lead_name,
            lead_id,
            timestamp: rec.str_or(TIMESTAMP_KEYS, ""),
            subject: rec.str_or(SUBJECT_KEYS, "Reply"),
            preview: rec.str_or(PREVIEW_KEYS, ""),
            sentiment: rec
                .first_str(&["sentiment"])
                .map(|s| Sentiment::parse(&s))
                .unwrap_or_default(),
            status: rec
                .first_str(&["status"])
                .map(|s| ReplyStatus::parse(&s))
                .unwrap_or_default(),
        }
    }
}

/// Counters the backend attaches to reply listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ReplyStats {
    pub total: u64,
    pub unread: u64,
    pub positive: u64,
}

impl ReplyStats {
    pub fn from_raw(raw: &Value) -> Option<Self> {
        let rec = RawRecord::new(raw);
        if rec.is_empty() {
            return None;
        }
        Some(Self {
            total: rec.count(&["total"]),
            unread: rec.count(&["unread"]),
            positive: rec.count(&["positive"]),
        })
    }
}

/// A page of replies plus optional listing counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct RepliesResult {
    #[serde(flatten)]
    pub page: PagedResult<Reply>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<ReplyStats>,
}

/// Partial update sent when triaging a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplyUpdate {
    pub status: Option<ReplyStatus>,
    pub sentiment: Option<Sentiment>,
}

impl ReplyUpdate {
    pub fn status(status: ReplyStatus) -> Self {
        Self {
            status: Some(status),
            sentiment: None,
        }
    }

    pub fn to_body(&self) -> Value {
        let mut body = Map::new();
        if let Some(status) = self.status {
            body.insert("status".into(), Value::from(status.as_str()));
        }
        if let Some(sentiment) = self.sentiment {
            body.insert("sentiment".into(), Value::from(sentiment.as_str()));
        }
        Value::Object(body)
    }

    /// Apply the update to a local copy of a reply.
    pub fn apply(&self, reply: &mut Reply) {
        if let Some(status) = self.status {
            reply.status = status;
        }
        if let Some(sentiment) = self.sentiment {
            reply.sentiment = sentiment;
        }
    }

    /// Apply the update to the reply with `id` in a loaded list.
    /// Returns false when no such reply is loaded.
    pub fn apply_to(&self, replies: &mut [Reply], id: &str) -> bool {
        match replies.iter_mut().find(|r| r.id == id) {
            Some(reply) => {
                self.apply(reply);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_id_only_record() {
        let reply = Reply::from_raw(&json!({ "id": 9 }));
        assert_eq!(reply.id, "9");
        assert_eq!(reply.lead_id, "");
        assert_eq!(reply.lead_name, "Unknown");
        assert_eq!(reply.subject, "Reply");
        assert_eq!(reply.preview, "");
        assert_eq!(reply.sentiment, Sentiment::Neutral);
        assert_eq!(reply.status, ReplyStatus::Unread);
    }

    #[test]
    fn test_lead_name_fallbacks() {
        let joined = Reply::from_raw(&json!({ "lead_first_name": "Ana", "lead_last_name": "Lopez", "lead_name": "x" }));
        assert_eq!(joined.lead_name, "Ana Lopez");

        let named = Reply::from_raw(&json!({ "leadName": "Bo" }));
        assert_eq!(named.lead_name, "Bo");

        let by_id = Reply::from_raw(&json!({ "lead_id": "0f3a9c2e-77aa-4b1e" }));
        assert_eq!(by_id.lead_name, "Lead 0f3a9c2e");
    }

    #[test]
    fn test_field_priorities() {
        let reply = Reply::from_raw(&json!({
            "created_at": "2024-01-01T00:00:00Z",
            "timestamp": "ignored",
            "email_subject": "Re: Demo",
            "reply_content": "full body",
            "preview": "short",
            "leadEmail": "bo@x.io"
        }));
        assert_eq!(reply.timestamp, "2024-01-01T00:00:00Z");
        assert_eq!(reply.subject, "Re: Demo");
        assert_eq!(reply.preview, "short");
        assert_eq!(reply.lead_email, "bo@x.io");
    }

    #[test]
    fn test_enums_are_strict() {
        let reply = Reply::from_raw(&json!({ "sentiment": "ECSTATIC", "status": "Snoozed" }));
        assert_eq!(reply.sentiment, Sentiment::Neutral);
        assert_eq!(reply.status, ReplyStatus::Unread);

        let reply = Reply::from_raw(&json!({ "sentiment": "Negative", "status": "ARCHIVED" }));
        assert_eq!(reply.sentiment, Sentiment::Negative);
        assert_eq!(reply.status, ReplyStatus::Archived);
    }

    #[test]
    fn test_update_body_and_apply() {
        let update = ReplyUpdate::status(ReplyStatus::Read);
        assert_eq!(update.to_body(), json!({ "status": "read" }));

        let mut reply = Reply::from_raw(&json!({ "id": 1, "sentiment": "positive" }));
        update.apply(&mut reply);
        assert_eq!(reply.status, ReplyStatus::Read);
        assert_eq!(reply.sentiment, Sentiment::Positive);
    }

    #[test]
    fn test_reply_stats() {
        assert_eq!(ReplyStats::from_raw(&json!(null)), None);
        assert_eq!(
            ReplyStats::from_raw(&json!({ "total": 12, "unread": "3" })),
            Some(ReplyStats { total: 12, unread: 3, positive: 0 })
        );
    }
}
