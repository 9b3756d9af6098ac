//! Lead-to-company association.
//!
//! Leads reference their company loosely: by id, by name, or by domain, and
//! under several spellings of each. `LeadIndex` buckets raw lead records by
//! every normalized key they carry so a company can be matched against all
//! three tiers. Precedence is id, then name, then domain.

use std::collections::HashMap;

use serde_json::Value;

use crate::models::lead::{self, Lead};
use crate::models::raw::{value_to_string, RawRecord};
use crate::models::Company;

const LEAD_COMPANY_ID_KEYS: &[&str] = &["company_id", "companyId", "company.id"];
const LEAD_COMPANY_NAME_KEYS: &[&str] = &["company_name", "companyName"];
const LEAD_COMPANY_DOMAIN_KEYS: &[&str] = &["company_domain", "companyDomain", "domain"];

/// Matching tiers, highest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchTier {
    Id,
    Name,
    Domain,
}

impl MatchTier {
    pub const ALL: [MatchTier; 3] = [MatchTier::Id, MatchTier::Name, MatchTier::Domain];
}

/// Trimmed, lower-cased key. Empty means "no key".
pub fn normalize_key(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Domain key: scheme, `www.` and trailing slashes removed.
///
/// Stripping repeats until nothing changes, so the result is a fixed point
/// (`normalize_domain(normalize_domain(x)) == normalize_domain(x)`).
pub fn normalize_domain(value: &str) -> String {
    let mut current = normalize_key(value);
    loop {
        let mut next = current.as_str();
        for prefix in ["https://", "http://", "www."] {
            if let Some(rest) = next.strip_prefix(prefix) {
                next = rest;
            }
        }
        let next = next.trim_end_matches('/').trim().to_string();
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Normalized company keys of one lead, per tier. Each list is deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadKeys {
    pub ids: Vec<String>,
    pub names: Vec<String>,
    pub domains: Vec<String>,
}

impl LeadKeys {
    pub fn from_raw(raw: &Value) -> Self {
        let rec = RawRecord::new(raw);
        let collect = |keys: &[&str], normalize: fn(&str) -> String| {
            let mut out: Vec<String> = Vec::new();
            for key in keys {
                if let Some(value) = rec.first_str(&[*key]) {
                    let normalized = normalize(&value);
                    if !normalized.is_empty() && !out.contains(&normalized) {
                        out.push(normalized);
                    }
                }
            }
            out
        };

        let mut names = collect(LEAD_COMPANY_NAME_KEYS, normalize_key);
        // `company` names the company only when it is a plain string
        if let Some(Value::String(company)) = rec.get("company") {
            let normalized = normalize_key(company);
            if !normalized.is_empty() && !names.contains(&normalized) {
                names.push(normalized);
            }
        }

        Self {
            ids: collect(LEAD_COMPANY_ID_KEYS, normalize_key),
            names,
            domains: collect(LEAD_COMPANY_DOMAIN_KEYS, normalize_domain),
        }
    }

    fn tier(&self, tier: MatchTier) -> &[String] {
        match tier {
            MatchTier::Id => &self.ids,
            MatchTier::Name => &self.names,
            MatchTier::Domain => &self.domains,
        }
    }
}

/// Normalized lookup keys of one company.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyKeys {
    pub id: String,
    pub name: String,
    pub domain: String,
}

impl CompanyKeys {
    pub fn from_raw(raw: &Value) -> Self {
        let rec = RawRecord::new(raw);
        Self {
            id: normalize_key(&rec.first_present(&["id"]).map(value_to_string).unwrap_or_default()),
            name: normalize_key(&rec.str_or(&["name"], "")),
            domain: normalize_domain(&rec.str_or(&["domain", "website"], "")),
        }
    }

    fn tier(&self, tier: MatchTier) -> &str {
        match tier {
            MatchTier::Id => &self.id,
            MatchTier::Name => &self.name,
            MatchTier::Domain => &self.domain,
        }
    }
}

/// Raw leads bucketed by normalized company id, name and domain.
#[derive(Debug)]
pub struct LeadIndex<'a> {
    leads: &'a [Value],
    keys: Vec<LeadKeys>,
    by_id: HashMap<String, Vec<usize>>,
    by_name: HashMap<String, Vec<usize>>,
    by_domain: HashMap<String, Vec<usize>>,
}

impl<'a> LeadIndex<'a> {
    pub fn build(leads: &'a [Value]) -> Self {
        let mut index = Self {
            leads,
            keys: Vec::with_capacity(leads.len()),
            by_id: HashMap::new(),
            by_name: HashMap::new(),
            by_domain: HashMap::new(),
        };

        for (pos, raw) in leads.iter().enumerate() {
            let keys = LeadKeys::from_raw(raw);
            for tier in MatchTier::ALL {
                for key in keys.tier(tier) {
                    index
                        .bucket_mut(tier)
                        .entry(key.clone())
                        .or_default()
                        .push(pos);
                }
            }
            index.keys.push(keys);
        }
        index
    }

    pub fn len(&self) -> usize {
        self.leads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leads.is_empty()
    }

    fn bucket(&self, tier: MatchTier) -> &HashMap<String, Vec<usize>> {
        match tier {
            MatchTier::Id => &self.by_id,
            MatchTier::Name => &self.by_name,
            MatchTier::Domain => &self.by_domain,
        }
    }

    fn bucket_mut(&mut self, tier: MatchTier) -> &mut HashMap<String, Vec<usize>> {
        match tier {
            MatchTier::Id => &mut self.by_id,
            MatchTier::Name => &mut self.by_name,
            MatchTier::Domain => &mut self.by_domain,
        }
    }

    /// Leads matching one tier's key; empty key matches nothing.
    pub fn lookup(&self, tier: MatchTier, key: &str) -> &[usize] {
        if key.is_empty() {
            return &[];
        }
        self.bucket(tier).get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every lead matching the company under any tier, id matches first,
    /// then name, then domain, each lead once.
    pub fn leads_for(&self, company: &CompanyKeys) -> Vec<&'a Value> {
        let mut seen = vec![false; self.leads.len()];
        let mut matched = Vec::new();
        for tier in MatchTier::ALL {
            for &pos in self.lookup(tier, company.tier(tier)) {
                if !seen[pos] {
                    seen[pos] = true;
                    matched.push(&self.leads[pos]);
                }
            }
        }
        matched
    }

    /// Attribute every lead across a company list.
    ///
    /// A lead counts only for the companies it matches at its
    /// highest-precedence tier: a lead naming company A and carrying
    /// company B's domain belongs to A. Returns one lead list per company,
    /// in input order.
    pub fn attribute(&self, companies: &[CompanyKeys]) -> Vec<Vec<&'a Value>> {
        let mut by_tier: HashMap<(MatchTier, &str), Vec<usize>> = HashMap::new();
        for (pos, company) in companies.iter().enumerate() {
            for tier in MatchTier::ALL {
                let key = company.tier(tier);
                if !key.is_empty() {
                    by_tier.entry((tier, key)).or_default().push(pos);
                }
            }
        }

        let mut assigned: Vec<Vec<&'a Value>> = vec![Vec::new(); companies.len()];
        for (lead_pos, keys) in self.keys.iter().enumerate() {
            for tier in MatchTier::ALL {
                let mut targets: Vec<usize> = keys
                    .tier(tier)
                    .iter()
                    .filter_map(|key| by_tier.get(&(tier, key.as_str())))
                    .flatten()
                    .copied()
                    .collect();
                if targets.is_empty() {
                    continue;
                }
                targets.sort_unstable();
                targets.dedup();
                for company_pos in targets {
                    assigned[company_pos].push(&self.leads[lead_pos]);
                }
                break;
            }
        }
        assigned
    }
}

/// Override a company's lead count and engagement from its matched leads.
/// With no matches the backend's own numbers are kept.
pub fn apply_matches(mut company: Company, matched: &[&Value]) -> Company {
    if matched.is_empty() {
        return company;
    }
    let total: u64 = matched
        .iter()
        .map(|raw| u64::from(lead::response_rate(&RawRecord::new(raw))))
        .sum();
    company.leads = matched.len() as u64;
    company.engagement = (total as f64 / matched.len() as f64).round() as u32;
    company
}

/// Map a raw company list, attributing leads across the whole list.
pub fn resolve_companies(raw_companies: &[Value], raw_leads: &[Value]) -> Vec<Company> {
    let index = LeadIndex::build(raw_leads);
    let keys: Vec<CompanyKeys> = raw_companies.iter().map(CompanyKeys::from_raw).collect();
    let assigned = index.attribute(&keys);

    raw_companies
        .iter()
        .zip(assigned)
        .map(|(raw, matched)| apply_matches(Company::from_raw(raw), &matched))
        .collect()
}

/// Map one company and collect every lead associated with it.
pub fn resolve_company(raw_company: &Value, raw_leads: &[Value]) -> (Company, Vec<Lead>) {
    let index = LeadIndex::build(raw_leads);
    let matched = index.leads_for(&CompanyKeys::from_raw(raw_company));
    let company = apply_matches(Company::from_raw(raw_company), &matched);
    let leads = matched.into_iter().map(Lead::from_raw).collect();
    (company, leads)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_domain() {
        assert_eq!(normalize_domain(" HTTPS://www.Acme.com/ "), "acme.com");
        assert_eq!(normalize_domain("http://acme.com//"), "acme.com");
        assert_eq!(normalize_domain("https://https://www.www.acme.com/"), "acme.com");
        assert_eq!(normalize_domain(""), "");
    }

    #[test]
    fn test_normalize_domain_idempotent() {
        for input in [
            "https://www.acme.com/",
            "www.http://acme.com",
            " WWW.Acme.COM/ / ",
            "http://",
            "acme.com/path/",
            "https:// www.acme.com",
        ] {
            let once = normalize_domain(input);
            assert_eq!(normalize_domain(&once), once, "input {input:?}");
        }
    }

    #[test]
    fn test_lead_keys_every_variant() {
        let keys = LeadKeys::from_raw(&json!({
            "company_id": 7,
            "company": { "id": "8" },
            "company_name": " Acme ",
            "companyName": "acme",
            "companyDomain": "https://acme.io/"
        }));
        assert_eq!(keys.ids, vec!["7", "8"]);
        assert_eq!(keys.names, vec!["acme"]);
        assert_eq!(keys.domains, vec!["acme.io"]);

        let plain = LeadKeys::from_raw(&json!({ "company": "Globex" }));
        assert_eq!(plain.names, vec!["globex"]);
    }

    #[test]
    fn test_acme_scenario() {
        let company = json!({ "id": "7", "name": "Acme", "domain": "acme.com", "size_max": 120 });
        let leads = vec![
            json!({ "company_domain": "acme.com", "emails_sent": 4, "emails_replied": 2 }),
            json!({ "company_name": "acme", "emails_sent": 0 }),
        ];

        let (single, matched) = resolve_company(&company, &leads);
        assert_eq!(single.leads, 2);
        assert_eq!(single.engagement, 25);
        assert_eq!(single.size, 120);
        assert_eq!(matched.len(), 2);

        let listed = resolve_companies(std::slice::from_ref(&company), &leads);
        assert_eq!(listed[0].leads, 2);
        assert_eq!(listed[0].engagement, 25);
    }

    #[test]
    fn test_leads_for_orders_by_tier() {
        let leads = vec![
            json!({ "id": "d", "company_domain": "www.acme.com" }),
            json!({ "id": "n", "company_name": "ACME" }),
            json!({ "id": "i", "company_id": 7, "company_name": "acme" }),
        ];
        let index = LeadIndex::build(&leads);
        let keys = CompanyKeys::from_raw(&json!({ "id": 7, "name": "Acme", "website": "https://acme.com" }));
        let ids: Vec<&str> = index
            .leads_for(&keys)
            .iter()
            .map(|l| l["id"].as_str().unwrap_or_default())
            .collect();
        // the id match comes first and is not repeated by its name match
        assert_eq!(ids, vec!["i", "n", "d"]);
    }

    #[test]
    fn test_attribute_precedence() {
        let companies = vec![
            CompanyKeys::from_raw(&json!({ "id": "a", "name": "Alpha" })),
            CompanyKeys::from_raw(&json!({ "id": "b", "name": "Beta", "domain": "beta.com" })),
        ];
        let leads = vec![
            // name says Alpha, domain says Beta: name wins
            json!({ "company_name": "alpha", "company_domain": "beta.com" }),
            // id says Beta, name says Alpha: id wins
            json!({ "company_id": "b", "company_name": "alpha" }),
            json!({ "company_domain": "beta.com" }),
            json!({ "company_name": "nobody" }),
        ];
        let index = LeadIndex::build(&leads);
        let assigned = index.attribute(&companies);
        assert_eq!(assigned[0].len(), 1);
        assert_eq!(assigned[1].len(), 2);
    }

    #[test]
    fn test_no_matches_keep_backend_numbers() {
        let companies = vec![json!({ "id": 1, "name": "Solo", "leads": 12, "engagement": 78 })];
        let leads = vec![json!({ "company_name": "Other", "emails_sent": 1, "emails_replied": 1 })];
        let resolved = resolve_companies(&companies, &leads);
        assert_eq!(resolved[0].leads, 12);
        assert_eq!(resolved[0].engagement, 78);
    }

    #[test]
    fn test_empty_keys_never_match() {
        let leads = vec![json!({ "email": "x@y.z" })];
        let index = LeadIndex::build(&leads);
        assert_eq!(index.len(), 1);
        assert!(index.leads_for(&CompanyKeys::from_raw(&json!({}))).is_empty());
        assert!(index.lookup(MatchTier::Name, "").is_empty());
    }
}
