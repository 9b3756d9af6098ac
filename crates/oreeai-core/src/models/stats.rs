use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::raw::RawRecord;

const TOTAL_EMAILS_KEYS: &[&str] = &["totalEmails", "total_emails"];
const RESPONSE_RATE_KEYS: &[&str] = &["responseRate", "response_rate"];
const AVG_ENGAGEMENT_KEYS: &[&str] = &["avgEngagement", "avg_engagement"];
const PENDING_REPLIES_KEYS: &[&str] = &["pendingReplies", "pending_replies"];
const ACTIVE_CAMPAIGNS_KEYS: &[&str] = &["activeCampaigns", "active_campaigns"];
const TOTAL_LEADS_KEYS: &[&str] = &["totalLeads", "total_leads"];
const ACTIVE_LEADS_KEYS: &[&str] = &["activeLeads", "active_leads"];
const COMPANIES_KEYS: &[&str] = &["companies", "totalCompanies", "total_companies"];

// Lifetime counters nested under `all_time`
const ALL_TIME_EMAILS_KEYS: &[&str] = &["emails_sent", "emailsSent"];
const ALL_TIME_REPLY_RATE_KEYS: &[&str] = &["reply_rate", "replyRate"];
const ALL_TIME_OPEN_RATE_KEYS: &[&str] = &["open_rate", "openRate"];
const ALL_TIME_REPLIES_KEYS: &[&str] = &["replies", "repliesCount"];

const LAST_7_DAYS_KEYS: &[&str] = &["reply_rate", "replyRate", "open_rate", "openRate"];

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_leads: u64,
    pub active_leads: u64,
    pub companies: u64,
    pub response_rate: u64,
    pub total_emails: u64,
    pub pending_replies: u64,
    pub avg_engagement: u64,
    pub active_campaigns: u64,
    #[serde(rename = "last7DaysPerformance")]
    pub last_7_days_performance: u64,
}

impl DashboardStats {
    pub fn from_raw(raw: &Value) -> Self {
        let rec = RawRecord::new(raw);
        let all_time = rec.first_nested(&["all_time", "allTime"]);
        let last_7_days = rec.first_nested(&["last_7_days", "last7Days"]);

        Self {
            total_leads: rec.count(TOTAL_LEADS_KEYS),
            active_leads: rec.count(ACTIVE_LEADS_KEYS),
            companies: rec.count(COMPANIES_KEYS),
            response_rate: top_or_nested(&rec, RESPONSE_RATE_KEYS, &all_time, ALL_TIME_REPLY_RATE_KEYS),
            total_emails: top_or_nested(&rec, TOTAL_EMAILS_KEYS, &all_time, ALL_TIME_EMAILS_KEYS),
            pending_replies: top_or_nested(&rec, PENDING_REPLIES_KEYS, &all_time, ALL_TIME_REPLIES_KEYS),
            avg_engagement: top_or_nested(&rec, AVG_ENGAGEMENT_KEYS, &all_time, ALL_TIME_OPEN_RATE_KEYS),
            active_campaigns: rec.count(ACTIVE_CAMPAIGNS_KEYS),
            last_7_days_performance: last_7_days.count(LAST_7_DAYS_KEYS),
        }
    }

    /// Whether the primary stats are too thin to show without the
    /// supplementary lead and company counts.
    pub fn needs_totals(&self) -> bool {
        self.total_leads == 0 || self.companies == 0
    }

    /// Fill zero counters from separately resolved totals.
    pub fn fill_totals(mut self, leads: u64, companies: u64) -> Self {
        if self.total_leads == 0 {
            self.total_leads = leads;
        }
        if self.active_leads == 0 {
            self.active_leads = leads;
        }
        if self.companies == 0 {
            self.companies = companies;
        }
        self
    }

    /// Primary stats accepted as-is; active leads default to the total.
    pub fn with_active_default(mut self) -> Self {
        if self.active_leads == 0 {
            self.active_leads = self.total_leads;
        }
        self
    }
}

/// Top-level spellings win; nested counters fill in only when absent.
fn top_or_nested(rec: &RawRecord, top: &[&str], nested: &RawRecord, keys: &[&str]) -> u64 {
    match rec.first_present(top) {
        Some(_) => rec.count(top),
        None => nested.count(keys),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flat_spellings() {
        let stats = DashboardStats::from_raw(&json!({
            "totalLeads": 120, "active_leads": 80, "totalCompanies": 14,
            "responseRate": 12.6, "total_emails": "400", "pendingReplies": 5,
            "avgEngagement": 40, "active_campaigns": 2
        }));
        assert_eq!(stats.total_leads, 120);
        assert_eq!(stats.active_leads, 80);
        assert_eq!(stats.companies, 14);
        assert_eq!(stats.response_rate, 13);
        assert_eq!(stats.total_emails, 400);
        assert_eq!(stats.active_campaigns, 2);
        assert!(!stats.needs_totals());
    }

    #[test]
    fn test_nested_counters() {
        let stats = DashboardStats::from_raw(&json!({
            "allTime": { "emailsSent": 900, "reply_rate": 7.4, "openRate": 51.5, "replies": 30 },
            "last_7_days": { "open_rate": 44, "replyRate": null }
        }));
        assert_eq!(stats.total_emails, 900);
        assert_eq!(stats.response_rate, 7);
        assert_eq!(stats.avg_engagement, 52);
        assert_eq!(stats.pending_replies, 30);
        assert_eq!(stats.last_7_days_performance, 44);
        assert!(stats.needs_totals());
    }

    #[test]
    fn test_top_level_zero_beats_nested() {
        let stats = DashboardStats::from_raw(&json!({
            "total_emails": 0,
            "all_time": { "emails_sent": 50 }
        }));
        assert_eq!(stats.total_emails, 0);
    }

    #[test]
    fn test_fill_totals() {
        let stats = DashboardStats::from_raw(&json!({ "total_leads": 0, "companies": 3 }))
            .fill_totals(40, 9);
        assert_eq!(stats.total_leads, 40);
        assert_eq!(stats.active_leads, 40);
        assert_eq!(stats.companies, 3);

        let primary = DashboardStats::from_raw(&json!({ "total_leads": 10, "companies": 2 }))
            .with_active_default();
        assert_eq!(primary.active_leads, 10);
    }

    #[test]
    fn test_serialized_names() {
        let value = serde_json::to_value(DashboardStats::default()).unwrap();
        assert!(value.get("last7DaysPerformance").is_some());
        assert!(value.get("totalLeads").is_some());
    }
}
