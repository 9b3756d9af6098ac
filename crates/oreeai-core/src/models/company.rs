use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::form::{optional_number, optional_text, FormError};
use super::raw::{coerce_number, parse_json_value, to_count, value_to_string, RawRecord};
use crate::utils::contains_ignore_case;

/// Direct size fields, checked before any enrichment payload.
const SIZE_KEYS: &[&str] = &[
    "size_max",
    "size_min",
    "size",
    "employee_count",
    "employees",
    "headcount",
];
const ORG_SIZE_KEYS: &[&str] = &["estimated_num_employees", "employee_count", "size"];
const WEBSITE_KEYS: &[&str] = &["domain", "website"];
const ORG_WEBSITE_KEYS: &[&str] = &["website_url", "website"];
const RESEARCH_STATUS_KEYS: &[&str] = &["reasearch_status", "research_status", "researchStatus"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "lowercase")]
pub enum CompanyStatus {
    #[default]
    Active,
    Inactive,
}

impl CompanyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompanyStatus::Active => "active",
            CompanyStatus::Inactive => "inactive",
        }
    }
}

impl std::fmt::Display for CompanyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompanyStatus::Active => write!(f, "Active"),
            CompanyStatus::Inactive => write!(f, "Inactive"),
        }
    }
}

/// Rough bucket for a company's engagement score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngagementTier {
    High,
    Good,
    Fair,
    Low,
}

impl EngagementTier {
    pub fn from_score(score: u32) -> Self {
        match score {
            80.. => EngagementTier::High,
            60..=79 => EngagementTier::Good,
            40..=59 => EngagementTier::Fair,
            _ => EngagementTier::Low,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EngagementTier::High => "High",
            EngagementTier::Good => "Good",
            EngagementTier::Fair => "Fair",
            EngagementTier::Low => "Low",
        }
    }
}

/// An organization that leads belong to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Company {
    pub id: String,
    pub name: String,
    pub industry: String,
    pub size: u64,
    pub leads: u64,
    pub engagement: u32,
    pub status: CompanyStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "ts", ts(type = "unknown"))]
    pub metadata: Option<Value>,
    /// The backend spells this field `reasearch_status`.
    #[serde(rename = "reasearch_status", alias = "research_status", default)]
    pub research_status: bool,
}

impl Company {
    pub fn from_raw(raw: &Value) -> Self {
        let rec = RawRecord::new(raw);
        let metadata = rec.get("metadata").map(parse_json_value);

        let meta = metadata
            .as_ref()
            .map(RawRecord::new)
            .unwrap_or_else(RawRecord::empty);
        let apollo = meta.nested("apollo_raw");
        let organization = apollo.first_nested(&["organization", "company", "account"]);
        let apollo_org = apollo.nested("organization");

        let name = rec
            .first_str(&["name"])
            .or_else(|| organization.first_str(&["name"]))
            .or_else(|| apollo_org.first_str(&["name"]))
            .unwrap_or_else(|| "Unknown".to_string());

        let industry = rec
            .first_str(&["industry"])
            .or_else(|| organization.first_str(&["industry"]))
            .or_else(|| apollo_org.first_str(&["industry"]))
            .unwrap_or_else(|| "Unknown".to_string());

        let size = rec
            .first_present(SIZE_KEYS)
            .or_else(|| organization.first_present(ORG_SIZE_KEYS))
            .or_else(|| apollo_org.first_present(&["estimated_num_employees"]))
            .map(|v| to_count(coerce_number(v)))
            .unwrap_or(0);

        let website = rec
            .first_str(WEBSITE_KEYS)
            .or_else(|| organization.first_str(ORG_WEBSITE_KEYS))
            .or_else(|| apollo_org.first_str(&["website_url"]))
            .map(|domain| {
                if domain.starts_with("http") {
                    domain
                } else {
                    format!("https://{}", domain)
                }
            });

        let status = if rec.str_or(&["status"], "").to_lowercase().contains("inactive") {
            CompanyStatus::Inactive
        } else {
            CompanyStatus::Active
        };

        Self {
            id: rec.first_present(&["id"]).map(value_to_string).unwrap_or_default(),
            name,
            industry,
            size,
            leads: rec.count(&["leads"]),
            engagement: rec.count(&["engagement"]).min(u32::MAX as u64) as u32,
            status,
            website,
            metadata,
            research_status: rec
                .first_present(RESEARCH_STATUS_KEYS)
                .map(normalize_bool)
                .unwrap_or(false),
        }
    }

    pub fn engagement_tier(&self) -> EngagementTier {
        EngagementTier::from_score(self.engagement)
    }
}

/// Loose boolean reading used for research flags.
///
/// Numbers are true only when exactly 1; strings accept `true`, `1`, `yes`,
/// `y` and `t` in any case.
pub fn normalize_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() == Some(1.0),
        Value::String(s) => matches!(
            s.trim().to_lowercase().as_str(),
            "true" | "1" | "yes" | "y" | "t"
        ),
        _ => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResearchFilter {
    #[default]
    All,
    Researched,
    NotResearched,
}

impl ResearchFilter {
    pub fn next(self) -> Self {
        match self {
            ResearchFilter::All => ResearchFilter::Researched,
            ResearchFilter::Researched => ResearchFilter::NotResearched,
            ResearchFilter::NotResearched => ResearchFilter::All,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ResearchFilter::All => "All",
            ResearchFilter::Researched => "Researched",
            ResearchFilter::NotResearched => "Not researched",
        }
    }
}

/// In-memory filter for the company list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyFilter {
    pub search: String,
    pub size_min: Option<u64>,
    pub size_max: Option<u64>,
    pub research: ResearchFilter,
}

impl CompanyFilter {
    pub fn matches(&self, company: &Company) -> bool {
        let search = self.search.trim();
        if !search.is_empty()
            && !contains_ignore_case(&company.name, search)
            && !contains_ignore_case(&company.industry, search)
        {
            return false;
        }
        if self.size_min.is_some_and(|min| company.size < min) {
            return false;
        }
        if self.size_max.is_some_and(|max| company.size > max) {
            return false;
        }
        match self.research {
            ResearchFilter::All => true,
            ResearchFilter::Researched => company.research_status,
            ResearchFilter::NotResearched => !company.research_status,
        }
    }

    pub fn apply<'a>(&self, companies: &'a [Company]) -> Vec<&'a Company> {
        companies.iter().filter(|c| self.matches(c)).collect()
    }

    pub fn is_active(&self) -> bool {
        !self.search.trim().is_empty()
            || self.size_min.is_some()
            || self.size_max.is_some()
            || self.research != ResearchFilter::All
    }
}

/// Payload for creating a company by hand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyCreate {
    pub name: String,
    pub domain: String,
    pub industry: String,
    pub size_min: String,
    pub size_max: String,
    pub location: String,
}

impl CompanyCreate {
    pub fn to_body(&self) -> Result<Value, FormError> {
        let name = optional_text(&self.name).ok_or(FormError::Required("Company name"))?;

        let mut body = Map::new();
        body.insert("name".into(), Value::String(name));
        for (key, value) in [
            ("domain", &self.domain),
            ("industry", &self.industry),
            ("location", &self.location),
        ] {
            if let Some(text) = optional_text(value) {
                body.insert(key.into(), Value::String(text));
            }
        }
        if let Some(min) = optional_number::<u64>("Minimum size", &self.size_min)? {
            body.insert("size_min".into(), Value::from(min));
        }
        if let Some(max) = optional_number::<u64>("Maximum size", &self.size_max)? {
            body.insert("size_max".into(), Value::from(max));
        }
        Ok(Value::Object(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_id_only_record() {
        let company = Company::from_raw(&json!({ "id": "7" }));
        assert_eq!(company.id, "7");
        assert_eq!(company.name, "Unknown");
        assert_eq!(company.industry, "Unknown");
        assert_eq!(company.size, 0);
        assert_eq!(company.status, CompanyStatus::Active);
        assert_eq!(company.website, None);
        assert!(!company.research_status);
    }

    #[test]
    fn test_enrichment_fallbacks() {
        let raw = json!({
            "id": 3,
            "metadata": serde_json::to_string(&json!({
                "apollo_raw": {
                    "account": { "name": "Globex", "estimated_num_employees": 250 },
                    "organization": { "industry": "Energy" }
                }
            })).unwrap()
        });
        let company = Company::from_raw(&raw);
        // organization wins over account when both exist
        assert_eq!(company.industry, "Energy");
        assert_eq!(company.name, "Unknown");
        assert!(company.metadata.as_ref().unwrap().is_object());

        let account_only = json!({
            "metadata": { "apollo_raw": { "account": {
                "name": "Globex", "estimated_num_employees": "250", "website_url": "globex.io"
            } } }
        });
        let company = Company::from_raw(&account_only);
        assert_eq!(company.name, "Globex");
        assert_eq!(company.size, 250);
        assert_eq!(company.website.as_deref(), Some("https://globex.io"));
    }

    #[test]
    fn test_size_priority() {
        let company = Company::from_raw(&json!({ "size_min": 10, "size_max": 50, "size": 5 }));
        assert_eq!(company.size, 50);

        let zero = Company::from_raw(&json!({ "size_max": 0, "size": 5 }));
        assert_eq!(zero.size, 0);

        let nulls = Company::from_raw(&json!({ "size_max": null, "headcount": "75" }));
        assert_eq!(nulls.size, 75);
    }

    #[test]
    fn test_website_prefix() {
        let bare = Company::from_raw(&json!({ "domain": "acme.com" }));
        assert_eq!(bare.website.as_deref(), Some("https://acme.com"));

        let full = Company::from_raw(&json!({ "website": "http://acme.com" }));
        assert_eq!(full.website.as_deref(), Some("http://acme.com"));
    }

    #[test]
    fn test_status() {
        let inactive = Company::from_raw(&json!({ "status": "INACTIVE_PAUSED" }));
        assert_eq!(inactive.status, CompanyStatus::Inactive);

        let other = Company::from_raw(&json!({ "status": "prospect" }));
        assert_eq!(other.status, CompanyStatus::Active);
    }

    #[test]
    fn test_normalize_bool() {
        for truthy in [json!("true"), json!(1), json!("yes"), json!(true), json!(" Y "), json!("T")] {
            assert!(normalize_bool(&truthy), "{truthy} should be true");
        }
        for falsy in [json!("false"), json!(0), json!("no"), json!(false), json!("maybe"), json!(2), json!(null)] {
            assert!(!normalize_bool(&falsy), "{falsy} should be false");
        }
    }

    #[test]
    fn test_research_status_spellings() {
        let misspelled = Company::from_raw(&json!({ "reasearch_status": "yes", "research_status": false }));
        assert!(misspelled.research_status);

        let camel = Company::from_raw(&json!({ "researchStatus": 1 }));
        assert!(camel.research_status);
    }

    #[test]
    fn test_serializes_backend_spelling() {
        let company = Company::from_raw(&json!({ "id": 1, "research_status": true }));
        let value = serde_json::to_value(&company).unwrap();
        assert_eq!(value["reasearch_status"], json!(true));
        assert_eq!(value["status"], json!("active"));
    }

    #[test]
    fn test_engagement_tier() {
        assert_eq!(EngagementTier::from_score(80), EngagementTier::High);
        assert_eq!(EngagementTier::from_score(79), EngagementTier::Good);
        assert_eq!(EngagementTier::from_score(40), EngagementTier::Fair);
        assert_eq!(EngagementTier::from_score(39), EngagementTier::Low);
    }

    #[test]
    fn test_company_filter() {
        let mut big = Company::from_raw(&json!({ "id": 1, "name": "TechCorp", "industry": "Software", "size": 500 }));
        big.research_status = true;
        let small = Company::from_raw(&json!({ "id": 2, "name": "StartupHub", "industry": "Startup Support", "size": 50 }));
        let companies = vec![big, small];

        let filter = CompanyFilter { search: "soft".into(), ..Default::default() };
        assert_eq!(filter.apply(&companies).len(), 1);

        let filter = CompanyFilter { size_min: Some(50), size_max: Some(50), ..Default::default() };
        let matched = filter.apply(&companies);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].name, "StartupHub");

        let filter = CompanyFilter { research: ResearchFilter::NotResearched, ..Default::default() };
        assert_eq!(filter.apply(&companies)[0].id, "2");
        assert!(filter.is_active());
        assert!(!CompanyFilter::default().is_active());
    }

    #[test]
    fn test_company_create_body() {
        assert_eq!(CompanyCreate::default().to_body(), Err(FormError::Required("Company name")));

        let form = CompanyCreate {
            name: "Acme".into(),
            domain: "acme.com".into(),
            size_min: "10".into(),
            size_max: "".into(),
            ..Default::default()
        };
        assert_eq!(
            form.to_body().unwrap(),
            json!({ "name": "Acme", "domain": "acme.com", "size_min": 10 })
        );

        let bad = CompanyCreate { name: "Acme".into(), size_max: "big".into(), ..Default::default() };
        assert!(matches!(bad.to_body(), Err(FormError::InvalidNumber { field: "Maximum size", .. })));
    }
}
