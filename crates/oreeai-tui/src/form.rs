//! Editable form overlays: add lead, add company, company size filter,
//! ICP settings and the company profile.
//!
//! A form is a flat list of labelled text fields. Converting the entered
//! text into request payloads is left to the core models so validation
//! messages are the same everywhere.

use oreeai_core::models::form::{optional_number, optional_text};
use oreeai_core::models::icp::ICP_FIELDS;
use oreeai_core::models::{
    CompanyCreate, CompanyFilter, FormError, IcpForm, IcpSettings, LeadCreate, TenantProfile,
};

/// Longest value accepted in a single form field.
const MAX_FIELD_LENGTH: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    AddLead,
    AddCompany,
    CompanyFilter,
    Icp,
    Profile,
}

impl FormKind {
    pub fn title(&self) -> &'static str {
        match self {
            FormKind::AddLead => "Add Lead",
            FormKind::AddCompany => "Add Company",
            FormKind::CompanyFilter => "Filter Companies",
            FormKind::Icp => "Ideal Customer Profile",
            FormKind::Profile => "Company Profile",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub label: &'static str,
    pub key: &'static str,
    pub value: String,
}

impl FormField {
    fn new(label: &'static str, key: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            key,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FormState {
    pub kind: FormKind,
    pub fields: Vec<FormField>,
    pub selection: usize,
    pub error: Option<String>,
    /// Set while the request for this form is in flight.
    pub submitting: bool,
}

impl FormState {
    fn new(kind: FormKind, fields: Vec<FormField>) -> Self {
        Self {
            kind,
            fields,
            selection: 0,
            error: None,
            submitting: false,
        }
    }

    pub fn add_lead() -> Self {
        Self::new(
            FormKind::AddLead,
            vec![
                FormField::new("Email *", "email", ""),
                FormField::new("First name", "first_name", ""),
                FormField::new("Last name", "last_name", ""),
                FormField::new("Company", "company_name", ""),
                FormField::new("Company domain", "company_domain", ""),
                FormField::new("Job title", "job_title", ""),
                FormField::new("Source", "source", "manual"),
            ],
        )
    }

    pub fn add_company() -> Self {
        Self::new(
            FormKind::AddCompany,
            vec![
                FormField::new("Name *", "name", ""),
                FormField::new("Domain", "domain", ""),
                FormField::new("Industry", "industry", ""),
                FormField::new("Min size", "size_min", ""),
                FormField::new("Max size", "size_max", ""),
                FormField::new("Location", "location", ""),
            ],
        )
    }

    pub fn company_filter(filter: &CompanyFilter) -> Self {
        let bound = |b: Option<u64>| b.map(|n| n.to_string()).unwrap_or_default();
        Self::new(
            FormKind::CompanyFilter,
            vec![
                FormField::new("Min size", "size_min", bound(filter.size_min)),
                FormField::new("Max size", "size_max", bound(filter.size_max)),
            ],
        )
    }

    pub fn icp(settings: Option<&IcpSettings>) -> Self {
        let form = settings.map(IcpForm::from_settings).unwrap_or_default();
        let fields = ICP_FIELDS
            .iter()
            .map(|&(label, key)| FormField::new(label, key, form.field(key).unwrap_or_default()))
            .collect();
        Self::new(FormKind::Icp, fields)
    }

    pub fn profile(profile: Option<&TenantProfile>) -> Self {
        let p = profile.cloned().unwrap_or_default();
        Self::new(
            FormKind::Profile,
            vec![
                FormField::new("Company name", "company_name", p.company_name.unwrap_or_default()),
                FormField::new("Email", "email", p.email.unwrap_or_default()),
                FormField::new("Industry", "industry", p.industry.unwrap_or_default()),
                FormField::new("Website", "website", p.website.unwrap_or_default()),
                FormField::new("Phone", "phone", p.phone.unwrap_or_default()),
            ],
        )
    }

    pub fn title(&self) -> &'static str {
        self.kind.title()
    }

    pub fn value(&self, key: &str) -> &str {
        self.fields
            .iter()
            .find(|f| f.key == key)
            .map(|f| f.value.as_str())
            .unwrap_or("")
    }

    fn owned(&self, key: &str) -> String {
        self.value(key).to_string()
    }

    // ===== Editing =====

    pub fn next_field(&mut self) {
        if !self.fields.is_empty() {
            self.selection = (self.selection + 1) % self.fields.len();
        }
    }

    pub fn prev_field(&mut self) {
        if !self.fields.is_empty() {
            self.selection = (self.selection + self.fields.len() - 1) % self.fields.len();
        }
    }

    pub fn on_last_field(&self) -> bool {
        self.selection + 1 >= self.fields.len()
    }

    pub fn push_char(&mut self, c: char) {
        if c.is_control() {
            return;
        }
        if let Some(field) = self.fields.get_mut(self.selection) {
            if field.value.chars().count() < MAX_FIELD_LENGTH {
                field.value.push(c);
                self.error = None;
            }
        }
    }

    pub fn pop_char(&mut self) {
        if let Some(field) = self.fields.get_mut(self.selection) {
            field.value.pop();
        }
    }

    // ===== Conversion =====

    pub fn lead_create(&self) -> LeadCreate {
        LeadCreate {
            email: self.owned("email"),
            first_name: self.owned("first_name"),
            last_name: self.owned("last_name"),
            company_name: self.owned("company_name"),
            company_domain: self.owned("company_domain"),
            job_title: self.owned("job_title"),
            source: self.owned("source"),
        }
    }

    pub fn company_create(&self) -> CompanyCreate {
        CompanyCreate {
            name: self.owned("name"),
            domain: self.owned("domain"),
            industry: self.owned("industry"),
            size_min: self.owned("size_min"),
            size_max: self.owned("size_max"),
            location: self.owned("location"),
        }
    }

    /// Apply the size bounds to a copy of `filter`.
    pub fn filtered(&self, filter: &CompanyFilter) -> Result<CompanyFilter, FormError> {
        Ok(CompanyFilter {
            size_min: optional_number("Min size", self.value("size_min"))?,
            size_max: optional_number("Max size", self.value("size_max"))?,
            ..filter.clone()
        })
    }

    pub fn icp_settings(&self) -> Result<IcpSettings, FormError> {
        let mut form = IcpForm::default();
        for field in &self.fields {
            form.set_field(field.key, field.value.clone());
        }
        form.to_settings()
    }

    /// Profile to save. Fields left blank keep their loaded value.
    pub fn tenant_profile(&self, loaded: Option<&TenantProfile>) -> TenantProfile {
        let base = loaded.cloned().unwrap_or_default();
        let pick = |key: &str, current: Option<String>| optional_text(self.value(key)).or(current);
        TenantProfile {
            company_name: pick("company_name", base.company_name.clone()),
            email: pick("email", base.email.clone()),
            industry: pick("industry", base.industry.clone()),
            website: pick("website", base.website.clone()),
            phone: pick("phone", base.phone.clone()),
            ..base
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(form: &mut FormState, key: &str, value: &str) {
        let index = form.fields.iter().position(|f| f.key == key).unwrap();
        form.selection = index;
        for c in value.chars() {
            form.push_char(c);
        }
    }

    #[test]
    fn test_field_navigation_wraps() {
        let mut form = FormState::company_filter(&CompanyFilter::default());
        assert_eq!(form.selection, 0);
        form.prev_field();
        assert_eq!(form.selection, 1);
        assert!(form.on_last_field());
        form.next_field();
        assert_eq!(form.selection, 0);
    }

    #[test]
    fn test_control_chars_ignored() {
        let mut form = FormState::add_lead();
        form.push_char('\n');
        form.push_char('a');
        assert_eq!(form.value("email"), "a");
        form.pop_char();
        assert_eq!(form.value("email"), "");
    }

    #[test]
    fn test_lead_form_requires_email() {
        let mut form = FormState::add_lead();
        fill(&mut form, "first_name", "Ana");
        let err = form.lead_create().to_body().unwrap_err();
        assert_eq!(err, FormError::Required("Email"));

        fill(&mut form, "email", "ana@acme.com");
        let body = form.lead_create().to_body().unwrap();
        assert_eq!(body["email"], "ana@acme.com");
        assert_eq!(body["source"], "manual");
        assert_eq!(body["first_name"], "Ana");
    }

    #[test]
    fn test_company_form_number_validation() {
        let mut form = FormState::add_company();
        fill(&mut form, "name", "Acme");
        fill(&mut form, "size_min", "ten");
        assert!(matches!(
            form.company_create().to_body(),
            Err(FormError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_company_filter_bounds() {
        let current = CompanyFilter {
            search: "soft".into(),
            size_max: Some(10),
            ..Default::default()
        };
        let mut form = FormState::company_filter(&current);
        assert_eq!(form.value("size_max"), "10");

        fill(&mut form, "size_min", "50");
        form.fields[1].value.clear();
        let updated = form.filtered(&current).unwrap();
        assert_eq!(updated.size_min, Some(50));
        assert_eq!(updated.size_max, None);
        assert_eq!(updated.search, "soft");
    }

    #[test]
    fn test_icp_form_round_trips_loaded_settings() {
        let settings = IcpSettings {
            person_titles: vec!["CTO".into(), "VP Engineering".into()],
            include_similar_titles: false,
            revenue_range_min: Some(1_000_000.0),
            ..Default::default()
        };
        let form = FormState::icp(Some(&settings));
        assert_eq!(form.fields.len(), ICP_FIELDS.len());
        assert_eq!(form.value("include_similar_titles"), "no");

        let parsed = form.icp_settings().unwrap();
        assert_eq!(parsed.person_titles, settings.person_titles);
        assert!(!parsed.include_similar_titles);
        assert_eq!(parsed.revenue_range_min, Some(1_000_000.0));
    }

    #[test]
    fn test_profile_keeps_loaded_values_for_blank_fields() {
        let loaded = TenantProfile {
            id: Some("3".into()),
            company_name: Some("Acme".into()),
            phone: Some("555".into()),
            ..Default::default()
        };
        let mut form = FormState::profile(Some(&loaded));
        form.fields.iter_mut().find(|f| f.key == "phone").unwrap().value.clear();
        fill(&mut form, "industry", "Software");

        let profile = form.tenant_profile(Some(&loaded));
        assert_eq!(profile.id.as_deref(), Some("3"));
        assert_eq!(profile.company_name.as_deref(), Some("Acme"));
        assert_eq!(profile.phone.as_deref(), Some("555"));
        assert_eq!(profile.industry.as_deref(), Some("Software"));
    }
}
