use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::form::{optional_text, FormError};
use super::raw::{parse_json_value, percentage, value_to_string, RawRecord};
use crate::utils::format_timestamp;

const NAME_KEYS: &[&str] = &["full_name"];
const COMPANY_KEYS: &[&str] = &["company_name", "company_domain", "company"];
const STATUS_KEYS: &[&str] = &["status", "sequence_status"];
const EMAILS_SENT_KEYS: &[&str] = &["emails_sent", "emailsSent"];
const EMAILS_REPLIED_KEYS: &[&str] = &["emails_replied", "emailsReplied"];
const SOURCE_KEYS: &[&str] = &["source", "external_id"];
const NEXT_ACTION_KEYS: &[&str] = &["next_action", "nextAction"];

/// Metadata keys that may hold a job title, in lookup order.
const JOB_TITLE_KEYS: &[&str] = &[
    "job_title",
    "jobTitle",
    "title",
    "position",
    "role",
    "apollo_raw.title",
    "apollo_raw.person.title",
];

/// Placeholder shown when a lead has never been emailed.
pub const NO_EMAIL_YET: &str = "—";

/// A prospect in an outreach campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: String,
    pub email: String,
    pub name: String,
    pub company: String,
    pub status: String,
    pub emails_sent: u64,
    pub last_email: String,
    pub response_rate: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "ts", ts(type = "unknown"))]
    pub metadata: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Lead {
    /// Build a lead from whatever shape the backend returned.
    pub fn from_raw(raw: &Value) -> Self {
        let rec = RawRecord::new(raw);
        let emails_sent = rec.count(EMAILS_SENT_KEYS);

        let last_email = match rec.first_str(&["last_email_sent_at"]) {
            Some(sent_at) => format_timestamp(&sent_at),
            None => rec.str_or(&["lastEmail"], NO_EMAIL_YET),
        };

        let status = rec
            .first_str(STATUS_KEYS)
            .map(|s| s.to_lowercase())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "unknown".to_string());

        Self {
            id: rec.first_present(&["id"]).map(value_to_string).unwrap_or_default(),
            email: rec.str_or(&["email"], ""),
            name: display_name(&rec),
            company: rec.str_or(COMPANY_KEYS, "Unknown"),
            status,
            emails_sent,
            last_email,
            response_rate: response_rate(&rec),
            source: Some(rec.str_or(SOURCE_KEYS, "")),
            metadata: rec.get("metadata").map(parse_json_value),
            next_action: rec.first_str(NEXT_ACTION_KEYS),
            notes: rec.first_present(&["notes"]).map(value_to_string),
        }
    }

    /// Job title from enrichment metadata, if any source has one.
    pub fn job_title(&self) -> Option<String> {
        let metadata = self.metadata.as_ref()?;
        RawRecord::new(metadata).first_str(JOB_TITLE_KEYS)
    }

    pub fn has_metadata(&self) -> bool {
        match &self.metadata {
            None | Some(Value::Null) => false,
            Some(Value::Object(map)) => !map.is_empty(),
            Some(Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        }
    }
}

/// Percentage of sent emails that got a reply; 0 when nothing was sent.
pub fn response_rate(rec: &RawRecord) -> u32 {
    let sent = rec.number(EMAILS_SENT_KEYS);
    if sent <= 0.0 {
        return 0;
    }
    percentage(rec.number(EMAILS_REPLIED_KEYS), sent)
}

fn display_name(rec: &RawRecord) -> String {
    if let Some(full) = rec.first_str(NAME_KEYS) {
        return full;
    }
    let joined = ["first_name", "last_name"]
        .iter()
        .filter_map(|k| rec.first_str(&[*k]))
        .collect::<Vec<_>>()
        .join(" ");
    if !joined.is_empty() {
        return joined;
    }
    rec.str_or(&["name", "email"], "Unknown")
}

/// Payload for creating a lead by hand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadCreate {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub company_name: String,
    pub company_domain: String,
    pub job_title: String,
    pub source: String,
}

impl LeadCreate {
    /// Validate and build the request body. Blank optional fields are left out.
    pub fn to_body(&self) -> Result<Value, FormError> {
        let email = optional_text(&self.email).ok_or(FormError::Required("Email"))?;
        let source = optional_text(&self.source).unwrap_or_else(|| "manual".to_string());

        let mut body = Map::new();
        body.insert("email".into(), Value::String(email));
        body.insert("source".into(), Value::String(source));
        for (key, value) in [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("company_name", &self.company_name),
            ("company_domain", &self.company_domain),
            ("job_title", &self.job_title),
        ] {
            if let Some(text) = optional_text(value) {
                body.insert(key.into(), Value::String(text));
            }
        }
        Ok(Value::Object(body))
    }
}
