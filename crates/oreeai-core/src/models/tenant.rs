use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::raw::{value_to_string, RawRecord};

const NAME_KEYS: &[&str] = &[
    "name",
    "company_name",
    "company",
    "companyName",
    "organization_name",
];
const COMPANY_NAME_KEYS: &[&str] = &[
    "company_name",
    "company",
    "companyName",
    "organization_name",
    "name",
];
const INDUSTRY_KEYS: &[&str] = &["industry", "company_industry", "organization_industry"];
const WEBSITE_KEYS: &[&str] = &["website", "company_website", "domain"];
const PHONE_KEYS: &[&str] = &["phone", "phone_number", "company_phone"];

/// The signed-in client organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct TenantProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl TenantProfile {
    pub fn from_raw(raw: &Value) -> Self {
        let rec = RawRecord::new(raw);
        Self {
            id: rec
                .first_present(&["id"])
                .map(value_to_string)
                .filter(|s| !s.is_empty()),
            name: rec.first_str(NAME_KEYS),
            email: rec.first_str(&["email"]),
            company_name: rec.first_str(COMPANY_NAME_KEYS),
            industry: rec.first_str(INDUSTRY_KEYS),
            website: rec.first_str(WEBSITE_KEYS),
            phone: rec.first_str(PHONE_KEYS),
        }
    }

    /// Request body for saving: `name` and `company_name` always agree.
    pub fn update_body(&self) -> Self {
        let display = self.company_name.clone().or_else(|| self.name.clone());
        Self {
            name: display.clone(),
            company_name: display,
            ..self.clone()
        }
    }

    pub fn display_name(&self) -> &str {
        self.company_name
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("Your company")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mapping_fallbacks() {
        let profile = TenantProfile::from_raw(&json!({
            "id": 17,
            "companyName": "Acme",
            "company_industry": "Software",
            "domain": "acme.com",
            "phone_number": "555-123-4567"
        }));
        assert_eq!(profile.id.as_deref(), Some("17"));
        assert_eq!(profile.name.as_deref(), Some("Acme"));
        assert_eq!(profile.company_name.as_deref(), Some("Acme"));
        assert_eq!(profile.industry.as_deref(), Some("Software"));
        assert_eq!(profile.website.as_deref(), Some("acme.com"));
        assert_eq!(profile.phone.as_deref(), Some("555-123-4567"));
        assert_eq!(profile.email, None);
    }

    #[test]
    fn test_name_and_company_name_orders_differ() {
        let profile = TenantProfile::from_raw(&json!({ "name": "Ana", "company_name": "Acme" }));
        assert_eq!(profile.name.as_deref(), Some("Ana"));
        assert_eq!(profile.company_name.as_deref(), Some("Acme"));
    }

    #[test]
    fn test_empty_record() {
        assert_eq!(TenantProfile::from_raw(&json!({})), TenantProfile::default());
        assert_eq!(TenantProfile::default().display_name(), "Your company");
    }

    #[test]
    fn test_update_body() {
        let profile = TenantProfile {
            name: Some("Ana".into()),
            company_name: Some("Acme".into()),
            phone: Some("1".into()),
            ..Default::default()
        };
        let body = serde_json::to_value(profile.update_body()).unwrap();
        assert_eq!(body, json!({ "name": "Acme", "company_name": "Acme", "phone": "1" }));

        let name_only = TenantProfile { name: Some("Solo".into()), ..Default::default() };
        assert_eq!(name_only.update_body().company_name.as_deref(), Some("Solo"));
    }
}
