//! Ideal Customer Profile search criteria.
//!
//! `IcpSettings` mirrors the backend document field for field. `IcpForm` is
//! the editable text version: lists become comma-separated strings and
//! employee ranges (which themselves contain commas) are separated by `|`.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::form::{optional_number, optional_text, FormError};
use super::raw::value_to_string;

/// Separator used when displaying employee ranges as one line.
pub const RANGE_SEPARATOR: &str = " | ";
const LIST_SEPARATOR: &str = ", ";

fn default_true() -> bool {
    true
}

// The backend sends `null` for cleared fields and sometimes quotes numbers.
// These accept any JSON value and fall back to the field default.

fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .iter()
            .map(value_to_string)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(s) => parse_list(&s),
        _ => Vec::new(),
    })
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::String(s) => !matches!(s.trim().to_lowercase().as_str(), "false" | "0" | "no"),
        Value::Number(n) => n.as_f64() != Some(0.0),
        _ => default_true(),
    })
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = value_to_string(&Value::deserialize(deserializer)?);
    Ok(optional_text(&text))
}

fn number_from(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite())
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(number_from(&Value::deserialize(deserializer)?))
}

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(number_from(&Value::deserialize(deserializer)?)
        .filter(|n| *n >= 0.0 && *n <= f64::from(u32::MAX))
        .map(|n| n.round() as u32))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct IcpSettings {
    #[serde(default, deserialize_with = "lenient_list")]
    pub person_titles: Vec<String>,
    #[serde(default = "default_true", deserialize_with = "lenient_flag")]
    pub include_similar_titles: bool,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub q_keywords: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub person_locations: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub person_seniorities: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub organization_locations: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub q_organization_domains_list: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub contact_email_status: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub organization_ids: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub organization_num_employees_ranges: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub q_organization_keyword_tags: Vec<String>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub revenue_range_min: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub revenue_range_max: Option<f64>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub currently_using_all_of_technology_uids: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub currently_using_any_of_technology_uids: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub currently_not_using_any_of_technology_uids: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub q_organization_job_titles: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub organization_job_locations: Vec<String>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub organization_num_jobs_range_min: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub organization_num_jobs_range_max: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub organization_job_posted_at_range_min: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub organization_job_posted_at_range_max: Option<String>,
    #[serde(default, deserialize_with = "lenient_count", skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "lenient_count", skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
}

impl Default for IcpSettings {
    fn default() -> Self {
        Self {
            person_titles: Vec::new(),
            include_similar_titles: true,
            q_keywords: None,
            person_locations: Vec::new(),
            person_seniorities: Vec::new(),
            organization_locations: Vec::new(),
            q_organization_domains_list: Vec::new(),
            contact_email_status: Vec::new(),
            organization_ids: Vec::new(),
            organization_num_employees_ranges: Vec::new(),
            q_organization_keyword_tags: Vec::new(),
            revenue_range_min: None,
            revenue_range_max: None,
            currently_using_all_of_technology_uids: Vec::new(),
            currently_using_any_of_technology_uids: Vec::new(),
            currently_not_using_any_of_technology_uids: Vec::new(),
            q_organization_job_titles: Vec::new(),
            organization_job_locations: Vec::new(),
            organization_num_jobs_range_min: None,
            organization_num_jobs_range_max: None,
            organization_job_posted_at_range_min: None,
            organization_job_posted_at_range_max: None,
            page: None,
            per_page: None,
        }
    }
}

/// Text form of `IcpSettings`, one string per input field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IcpForm {
    pub person_titles: String,
    pub include_similar_titles: bool,
    pub q_keywords: String,
    pub person_locations: String,
    pub person_seniorities: String,
    pub organization_locations: String,
    pub q_organization_domains_list: String,
    pub contact_email_status: String,
    pub organization_ids: String,
    pub organization_num_employees_ranges: String,
    pub q_organization_keyword_tags: String,
    pub revenue_range_min: String,
    pub revenue_range_max: String,
    pub currently_using_all_of_technology_uids: String,
    pub currently_using_any_of_technology_uids: String,
    pub currently_not_using_any_of_technology_uids: String,
    pub q_organization_job_titles: String,
    pub organization_job_locations: String,
    pub organization_num_jobs_range_min: String,
    pub organization_num_jobs_range_max: String,
    pub organization_job_posted_at_range_min: String,
    pub organization_job_posted_at_range_max: String,
    pub page: String,
    pub per_page: String,
}

/// Editable fields in display order: (label, backend key).
pub const ICP_FIELDS: &[(&str, &str)] = &[
    ("Person titles", "person_titles"),
    ("Include similar titles", "include_similar_titles"),
    ("Keywords", "q_keywords"),
    ("Person locations", "person_locations"),
    ("Seniorities", "person_seniorities"),
    ("Organization locations", "organization_locations"),
    ("Organization domains", "q_organization_domains_list"),
    ("Email status", "contact_email_status"),
    ("Organization IDs", "organization_ids"),
    ("Employee ranges", "organization_num_employees_ranges"),
    ("Keyword tags", "q_organization_keyword_tags"),
    ("Revenue min", "revenue_range_min"),
    ("Revenue max", "revenue_range_max"),
    ("Uses all of", "currently_using_all_of_technology_uids"),
    ("Uses any of", "currently_using_any_of_technology_uids"),
    ("Uses none of", "currently_not_using_any_of_technology_uids"),
    ("Job titles hiring", "q_organization_job_titles"),
    ("Job locations", "organization_job_locations"),
    ("Open jobs min", "organization_num_jobs_range_min"),
    ("Open jobs max", "organization_num_jobs_range_max"),
    ("Job posted after", "organization_job_posted_at_range_min"),
    ("Job posted before", "organization_job_posted_at_range_max"),
    ("Page", "page"),
    ("Per page", "per_page"),
];

impl IcpForm {
    pub fn from_settings(settings: &IcpSettings) -> Self {
        let list = |items: &[String]| items.join(LIST_SEPARATOR);
        let number = |n: Option<f64>| n.map(format_number).unwrap_or_default();
        let int = |n: Option<u32>| n.map(|n| n.to_string()).unwrap_or_default();

        Self {
            person_titles: list(&settings.person_titles),
            include_similar_titles: settings.include_similar_titles,
            q_keywords: settings.q_keywords.clone().unwrap_or_default(),
            person_locations: list(&settings.person_locations),
            person_seniorities: list(&settings.person_seniorities),
            organization_locations: list(&settings.organization_locations),
            q_organization_domains_list: list(&settings.q_organization_domains_list),
            contact_email_status: list(&settings.contact_email_status),
            organization_ids: list(&settings.organization_ids),
            organization_num_employees_ranges: settings
                .organization_num_employees_ranges
                .join(RANGE_SEPARATOR),
            q_organization_keyword_tags: list(&settings.q_organization_keyword_tags),
            revenue_range_min: number(settings.revenue_range_min),
            revenue_range_max: number(settings.revenue_range_max),
            currently_using_all_of_technology_uids: list(
                &settings.currently_using_all_of_technology_uids,
            ),
            currently_using_any_of_technology_uids: list(
                &settings.currently_using_any_of_technology_uids,
            ),
            currently_not_using_any_of_technology_uids: list(
                &settings.currently_not_using_any_of_technology_uids,
            ),
            q_organization_job_titles: list(&settings.q_organization_job_titles),
            organization_job_locations: list(&settings.organization_job_locations),
            organization_num_jobs_range_min: number(settings.organization_num_jobs_range_min),
            organization_num_jobs_range_max: number(settings.organization_num_jobs_range_max),
            organization_job_posted_at_range_min: settings
                .organization_job_posted_at_range_min
                .clone()
                .unwrap_or_default(),
            organization_job_posted_at_range_max: settings
                .organization_job_posted_at_range_max
                .clone()
                .unwrap_or_default(),
            page: int(settings.page),
            per_page: int(settings.per_page),
        }
    }

    pub fn to_settings(&self) -> Result<IcpSettings, FormError> {
        Ok(IcpSettings {
            person_titles: parse_list(&self.person_titles),
            include_similar_titles: self.include_similar_titles,
            q_keywords: optional_text(&self.q_keywords),
            person_locations: parse_list(&self.person_locations),
            person_seniorities: parse_list(&self.person_seniorities),
            organization_locations: parse_list(&self.organization_locations),
            q_organization_domains_list: parse_list(&self.q_organization_domains_list),
            contact_email_status: parse_list(&self.contact_email_status),
            organization_ids: parse_list(&self.organization_ids),
            organization_num_employees_ranges: parse_employee_ranges(
                &self.organization_num_employees_ranges,
            ),
            q_organization_keyword_tags: parse_list(&self.q_organization_keyword_tags),
            revenue_range_min: optional_number("Revenue min", &self.revenue_range_min)?,
            revenue_range_max: optional_number("Revenue max", &self.revenue_range_max)?,
            currently_using_all_of_technology_uids: parse_list(
                &self.currently_using_all_of_technology_uids,
            ),
            currently_using_any_of_technology_uids: parse_list(
                &self.currently_using_any_of_technology_uids,
            ),
            currently_not_using_any_of_technology_uids: parse_list(
                &self.currently_not_using_any_of_technology_uids,
            ),
            q_organization_job_titles: parse_list(&self.q_organization_job_titles),
            organization_job_locations: parse_list(&self.organization_job_locations),
            organization_num_jobs_range_min: optional_number(
                "Open jobs min",
                &self.organization_num_jobs_range_min,
            )?,
            organization_num_jobs_range_max: optional_number(
                "Open jobs max",
                &self.organization_num_jobs_range_max,
            )?,
            organization_job_posted_at_range_min: optional_text(
                &self.organization_job_posted_at_range_min,
            ),
            organization_job_posted_at_range_max: optional_text(
                &self.organization_job_posted_at_range_max,
            ),
            page: optional_number("Page", &self.page)?,
            per_page: optional_number("Per page", &self.per_page)?,
        })
    }

    /// Text value of a field by backend key. The boolean field reads as "yes"/"no".
    pub fn field(&self, key: &str) -> Option<String> {
        if key == "include_similar_titles" {
            let flag = if self.include_similar_titles { "yes" } else { "no" };
            return Some(flag.to_string());
        }
        self.text_field(key).cloned()
    }

    /// Replace a text field by backend key. Returns false for unknown keys.
    pub fn set_field(&mut self, key: &str, value: String) -> bool {
        if key == "include_similar_titles" {
            self.include_similar_titles = matches!(
                value.trim().to_lowercase().as_str(),
                "yes" | "y" | "true" | "1"
            );
            return true;
        }
        match self.text_field_mut(key) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    fn text_field(&self, key: &str) -> Option<&String> {
        Some(match key {
            "person_titles" => &self.person_titles,
            "q_keywords" => &self.q_keywords,
            "person_locations" => &self.person_locations,
            "person_seniorities" => &self.person_seniorities,
            "organization_locations" => &self.organization_locations,
            "q_organization_domains_list" => &self.q_organization_domains_list,
            "contact_email_status" => &self.contact_email_status,
            "organization_ids" => &self.organization_ids,
            "organization_num_employees_ranges" => &self.organization_num_employees_ranges,
            "q_organization_keyword_tags" => &self.q_organization_keyword_tags,
            "revenue_range_min" => &self.revenue_range_min,
            "revenue_range_max" => &self.revenue_range_max,
            "currently_using_all_of_technology_uids" => {
                &self.currently_using_all_of_technology_uids
            }
            "currently_using_any_of_technology_uids" => {
                &self.currently_using_any_of_technology_uids
            }
            "currently_not_using_any_of_technology_uids" => {
                &self.currently_not_using_any_of_technology_uids
            }
            "q_organization_job_titles" => &self.q_organization_job_titles,
            "organization_job_locations" => &self.organization_job_locations,
            "organization_num_jobs_range_min" => &self.organization_num_jobs_range_min,
            "organization_num_jobs_range_max" => &self.organization_num_jobs_range_max,
            "organization_job_posted_at_range_min" => &self.organization_job_posted_at_range_min,
            "organization_job_posted_at_range_max" => &self.organization_job_posted_at_range_max,
            "page" => &self.page,
            "per_page" => &self.per_page,
            _ => return None,
        })
    }

    fn text_field_mut(&mut self, key: &str) -> Option<&mut String> {
        Some(match key {
            "person_titles" => &mut self.person_titles,
            "q_keywords" => &mut self.q_keywords,
            "person_locations" => &mut self.person_locations,
            "person_seniorities" => &mut self.person_seniorities,
            "organization_locations" => &mut self.organization_locations,
            "q_organization_domains_list" => &mut self.q_organization_domains_list,
            "contact_email_status" => &mut self.contact_email_status,
            "organization_ids" => &mut self.organization_ids,
            "organization_num_employees_ranges" => &mut self.organization_num_employees_ranges,
            "q_organization_keyword_tags" => &mut self.q_organization_keyword_tags,
            "revenue_range_min" => &mut self.revenue_range_min,
            "revenue_range_max" => &mut self.revenue_range_max,
            "currently_using_all_of_technology_uids" => {
                &mut self.currently_using_all_of_technology_uids
            }
            "currently_using_any_of_technology_uids" => {
                &mut self.currently_using_any_of_technology_uids
            }
            "currently_not_using_any_of_technology_uids" => {
                &mut self.currently_not_using_any_of_technology_uids
            }
            "q_organization_job_titles" => &mut self.q_organization_job_titles,
            "organization_job_locations" => &mut self.organization_job_locations,
            "organization_num_jobs_range_min" => &mut self.organization_num_jobs_range_min,
            "organization_num_jobs_range_max" => &mut self.organization_num_jobs_range_max,
            "organization_job_posted_at_range_min" => {
                &mut self.organization_job_posted_at_range_min
            }
            "organization_job_posted_at_range_max" => {
                &mut self.organization_job_posted_at_range_max
            }
            "page" => &mut self.page,
            "per_page" => &mut self.per_page,
            _ => return None,
        })
    }
}

/// Split on commas, trim, drop empties.
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn employee_range_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+\s*,\s*\d+").expect("valid employee range regex"))
}

/// Pull `min,max` pairs out of free text ("1, 10 | 11,50" -> ["1,10", "11,50"]).
/// Falls back to a plain list when no pair is found.
pub fn parse_employee_ranges(value: &str) -> Vec<String> {
    let ranges: Vec<String> = employee_range_regex()
        .find_iter(value)
        .map(|m| m.as_str().chars().filter(|c| !c.is_whitespace()).collect())
        .collect();
    if ranges.is_empty() {
        parse_list(value)
    } else {
        ranges
    }
}

/// Whole numbers print without a fractional part.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_defaults() {
        let settings: IcpSettings = serde_json::from_value(json!({ "person_titles": ["CTO"] })).unwrap();
        assert_eq!(settings.person_titles, vec!["CTO"]);
        assert!(settings.include_similar_titles);
        assert!(settings.person_locations.is_empty());
        assert_eq!(settings.revenue_range_min, None);
    }

    #[test]
    fn test_deserialize_tolerates_nulls_and_quoted_numbers() {
        let settings: IcpSettings = serde_json::from_value(json!({
            "person_titles": ["CTO", null, " "],
            "person_locations": null,
            "organization_num_employees_ranges": ["1,10"],
            "include_similar_titles": null,
            "q_keywords": null,
            "revenue_range_min": "250000",
            "revenue_range_max": null,
            "page": "1",
            "per_page": 25.0
        }))
        .unwrap();
        assert_eq!(settings.person_titles, vec!["CTO"]);
        assert!(settings.person_locations.is_empty());
        assert_eq!(settings.organization_num_employees_ranges, vec!["1,10"]);
        assert!(settings.include_similar_titles);
        assert_eq!(settings.q_keywords, None);
        assert_eq!(settings.revenue_range_min, Some(250000.0));
        assert_eq!(settings.revenue_range_max, None);
        assert_eq!(settings.page, Some(1));
        assert_eq!(settings.per_page, Some(25));
    }

    #[test]
    fn test_deserialize_flag_variants() {
        let parse = |v: Value| {
            serde_json::from_value::<IcpSettings>(json!({ "include_similar_titles": v }))
                .unwrap()
                .include_similar_titles
        };
        assert!(!parse(json!(false)));
        assert!(!parse(json!("false")));
        assert!(!parse(json!(0)));
        assert!(parse(json!("true")));
        assert!(parse(Value::Null));
    }

    #[test]
    fn test_deserialize_rejects_nonsense_counts() {
        let settings: IcpSettings =
            serde_json::from_value(json!({ "page": "first", "per_page": -5 })).unwrap();
        assert_eq!(settings.page, None);
        assert_eq!(settings.per_page, None);
    }

    #[test]
    fn test_serialize_omits_unset_scalars() {
        let value = serde_json::to_value(IcpSettings::default()).unwrap();
        assert!(value.get("q_keywords").is_none());
        assert!(value.get("revenue_range_min").is_none());
        assert_eq!(value["person_titles"], json!([]));
        assert_eq!(value["include_similar_titles"], json!(true));
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list(" CTO , ,VP Sales,"), vec!["CTO", "VP Sales"]);
        assert!(parse_list("   ").is_empty());
    }

    #[test]
    fn test_parse_employee_ranges() {
        assert_eq!(parse_employee_ranges("1, 10 | 11,50"), vec!["1,10", "11,50"]);
        assert_eq!(parse_employee_ranges("51 ,200"), vec!["51,200"]);
        assert_eq!(parse_employee_ranges("small, medium"), vec!["small", "medium"]);
        assert!(parse_employee_ranges("").is_empty());
    }

    #[test]
    fn test_form_round_trip_text() {
        let settings = IcpSettings {
            person_titles: vec!["CTO".into(), "VP Engineering".into()],
            organization_num_employees_ranges: vec!["1,10".into(), "11,50".into()],
            revenue_range_min: Some(1000000.0),
            organization_num_jobs_range_max: Some(2.5),
            per_page: Some(25),
            ..Default::default()
        };
        let form = IcpForm::from_settings(&settings);
        assert_eq!(form.person_titles, "CTO, VP Engineering");
        assert_eq!(form.organization_num_employees_ranges, "1,10 | 11,50");
        assert_eq!(form.revenue_range_min, "1000000");
        assert_eq!(form.organization_num_jobs_range_max, "2.5");
        assert_eq!(form.per_page, "25");
        assert_eq!(form.to_settings().unwrap(), settings);
    }

    #[test]
    fn test_invalid_number_names_field() {
        let form = IcpForm {
            revenue_range_max: "lots".into(),
            ..IcpForm::from_settings(&IcpSettings::default())
        };
        assert_eq!(
            form.to_settings(),
            Err(FormError::InvalidNumber { field: "Revenue max", value: "lots".into() })
        );
    }

    #[test]
    fn test_field_access() {
        let mut form = IcpForm::from_settings(&IcpSettings::default());
        assert!(form.set_field("q_keywords", "saas".into()));
        assert_eq!(form.field("q_keywords").as_deref(), Some("saas"));
        assert!(form.set_field("include_similar_titles", "no".into()));
        assert_eq!(form.field("include_similar_titles").as_deref(), Some("no"));
        assert!(!form.set_field("nonsense", "x".into()));

        // every listed field is addressable
        for (_, key) in ICP_FIELDS {
            assert!(form.field(key).is_some(), "{key}");
        }
    }
}
