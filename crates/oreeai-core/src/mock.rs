//! Static sample data served when the backend cannot be reached.
//!
//! Filtering and paging here match what the list endpoints do server-side
//! closely enough for the dashboard to behave the same offline.

use crate::models::paged::PagedResult;
use crate::models::{
    Company, CompanyStatus, DashboardStats, Lead, RepliesResult, Reply, ReplyStatus, Sentiment,
};
use crate::service::{LeadFilter, ReplyFilter};
use crate::utils::contains_ignore_case;

/// Response rate shown with the sample statistics.
pub const MOCK_RESPONSE_RATE: u64 = 58;
/// Average engagement shown with the sample statistics.
pub const MOCK_AVG_ENGAGEMENT: u64 = 62;

struct LeadRow {
    id: &'static str,
    email: &'static str,
    name: &'static str,
    company: &'static str,
    status: &'static str,
    emails_sent: u64,
    last_email: &'static str,
    response_rate: u32,
    next_action: &'static str,
    notes: Option<&'static str>,
}

const LEADS: &[LeadRow] = &[
    LeadRow { id: "1", email: "john@techcorp.com", name: "John Smith", company: "TechCorp", status: "responded", emails_sent: 3, last_email: "2 hours ago", response_rate: 100, next_action: "Schedule meeting", notes: Some("Interested in demo") },
    LeadRow { id: "2", email: "sarah@innovate.io", name: "Sarah Johnson", company: "Innovate Inc", status: "active", emails_sent: 2, last_email: "1 day ago", response_rate: 0, next_action: "Follow-up email", notes: Some("Viewed email twice") },
    LeadRow { id: "3", email: "mike@growth.com", name: "Mike Chen", company: "Growth Labs", status: "active", emails_sent: 1, last_email: "3 days ago", response_rate: 0, next_action: "Send cold email", notes: None },
    LeadRow { id: "4", email: "emma@digital.co", name: "Emma Wilson", company: "Digital Solutions", status: "responded", emails_sent: 4, last_email: "5 hours ago", response_rate: 75, next_action: "Close deal", notes: None },
    LeadRow { id: "5", email: "alex@future.ai", name: "Alex Rodriguez", company: "Future Systems", status: "inactive", emails_sent: 5, last_email: "2 weeks ago", response_rate: 20, next_action: "Re-engage", notes: None },
    LeadRow { id: "6", email: "lisa@venture.io", name: "Lisa Park", company: "Venture Partners", status: "active", emails_sent: 1, last_email: "4 hours ago", response_rate: 0, next_action: "Wait for response", notes: None },
    LeadRow { id: "7", email: "david@enterprise.com", name: "David Kumar", company: "Enterprise Corp", status: "responded", emails_sent: 2, last_email: "30 mins ago", response_rate: 100, next_action: "Set meeting", notes: None },
    LeadRow { id: "8", email: "sophia@startup.co", name: "Sophia Martinez", company: "StartupHub", status: "active", emails_sent: 3, last_email: "1 day ago", response_rate: 33, next_action: "Follow-up", notes: None },
];

// (id, name, industry, size, leads, engagement, active, website)
type CompanyRow = (&'static str, &'static str, &'static str, u64, u64, u32, bool, Option<&'static str>);

const COMPANIES: &[CompanyRow] = &[
    ("1", "TechCorp", "Software", 500, 12, 78, true, Some("techcorp.com")),
    ("2", "Innovate Inc", "AI/ML", 150, 8, 65, true, None),
    ("3", "Growth Labs", "Marketing", 75, 5, 45, true, None),
    ("4", "Digital Solutions", "Consulting", 200, 10, 82, true, None),
    ("5", "Future Systems", "Blockchain", 100, 4, 30, false, None),
    ("6", "Venture Partners", "Finance", 250, 15, 88, true, None),
    ("7", "Enterprise Corp", "Enterprise", 1000, 20, 92, true, None),
    ("8", "StartupHub", "Startup Support", 50, 6, 55, true, None),
];

// (id, lead_id, lead_email, lead_name, timestamp, subject, preview, sentiment, status)
type ReplyRow = (
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    Sentiment,
    ReplyStatus,
);

const REPLIES: &[ReplyRow] = &[
    ("1", "1", "john@techcorp.com", "John Smith", "2 hours ago", "Re: OreeAI Demo", "Looks interesting! I'd like to schedule a demo for next week.", Sentiment::Positive, ReplyStatus::Unread),
    ("2", "4", "emma@digital.co", "Emma Wilson", "5 hours ago", "Re: Partnership Opportunity", "Our team is very interested in exploring this further...", Sentiment::Positive, ReplyStatus::Unread),
    ("3", "7", "david@enterprise.com", "David Kumar", "30 mins ago", "Re: OreeAI Integration", "When are you available for a call this week?", Sentiment::Positive, ReplyStatus::Unread),
    ("4", "2", "sarah@innovate.io", "Sarah Johnson", "1 day ago", "Re: Email Outreach Tool", "Thanks for reaching out, but we're not interested at this time.", Sentiment::Neutral, ReplyStatus::Read),
    ("5", "8", "sophia@startup.co", "Sophia Martinez", "2 days ago", "Re: Pricing Question", "Can you send over your pricing details?", Sentiment::Neutral, ReplyStatus::Read),
];

pub fn leads() -> Vec<Lead> {
    LEADS
        .iter()
        .map(|row| Lead {
            id: row.id.to_string(),
            email: row.email.to_string(),
            name: row.name.to_string(),
            company: row.company.to_string(),
            status: row.status.to_string(),
            emails_sent: row.emails_sent,
            last_email: row.last_email.to_string(),
            response_rate: row.response_rate,
            source: None,
            metadata: None,
            next_action: Some(row.next_action.to_string()),
            notes: row.notes.map(str::to_string),
        })
        .collect()
}

pub fn companies() -> Vec<Company> {
    COMPANIES
        .iter()
        .map(|&(id, name, industry, size, leads, engagement, active, website)| Company {
            id: id.to_string(),
            name: name.to_string(),
            industry: industry.to_string(),
            size,
            leads,
            engagement,
            status: if active {
                CompanyStatus::Active
            } else {
                CompanyStatus::Inactive
            },
            website: website.map(str::to_string),
            metadata: None,
            research_status: false,
        })
        .collect()
}

pub fn replies() -> Vec<Reply> {
    REPLIES
        .iter()
        .map(
            |&(id, lead_id, lead_email, lead_name, timestamp, subject, preview, sentiment, status)| {
                Reply {
                    id: id.to_string(),
                    lead_id: lead_id.to_string(),
                    lead_email: lead_email.to_string(),
                    lead_name: lead_name.to_string(),
                    timestamp: timestamp.to_string(),
                    subject: subject.to_string(),
                    preview: preview.to_string(),
                    sentiment,
                    status,
                }
            },
        )
        .collect()
}

/// Statistics derived from the sample data.
pub fn stats() -> DashboardStats {
    let leads = leads();
    DashboardStats {
        total_leads: leads.len() as u64,
        active_leads: leads.iter().filter(|l| l.status == "active").count() as u64,
        companies: COMPANIES.len() as u64,
        response_rate: MOCK_RESPONSE_RATE,
        total_emails: leads.iter().map(|l| l.emails_sent).sum(),
        pending_replies: REPLIES
            .iter()
            .filter(|r| r.8 == ReplyStatus::Unread)
            .count() as u64,
        avg_engagement: MOCK_AVG_ENGAGEMENT,
        active_campaigns: 0,
        last_7_days_performance: 0,
    }
}

/// Sample leads with the list filters applied. Paged only when both page
/// and page size are given.
pub fn filter_leads(filter: &LeadFilter) -> PagedResult<Lead> {
    let search = filter.search.trim();
    let filtered: Vec<Lead> = leads()
        .into_iter()
        .filter(|l| filter.status.as_deref().map_or(true, |s| l.status == s))
        .filter(|l| {
            search.is_empty()
                || contains_ignore_case(&l.email, search)
                || contains_ignore_case(&l.name, search)
                || contains_ignore_case(&l.company, search)
        })
        .collect();

    match (filter.page, filter.per_page) {
        (Some(page), Some(per_page)) => PagedResult::paginate(filtered, page, per_page),
        _ => PagedResult::single(filtered),
    }
}

/// Sample replies with the list filters applied, always paged.
pub fn filter_replies(filter: &ReplyFilter) -> RepliesResult {
    let search = filter.search.trim();
    let filtered: Vec<Reply> = replies()
        .into_iter()
        .filter(|r| filter.status.map_or(true, |s| r.status == s))
        .filter(|r| {
            search.is_empty()
                || contains_ignore_case(&r.lead_name, search)
                || contains_ignore_case(&r.lead_email, search)
                || contains_ignore_case(&r.preview, search)
        })
        .collect();

    RepliesResult {
        page: PagedResult::paginate(filtered, filter.page(), filter.per_page()),
        stats: None,
    }
}

pub fn lead(id: &str) -> Option<Lead> {
    leads().into_iter().find(|l| l.id == id)
}

/// Sample company by id, with the sample leads that name it.
pub fn company(id: &str) -> Option<(Company, Vec<Lead>)> {
    let company = companies().into_iter().find(|c| c.id == id)?;
    let leads = leads()
        .into_iter()
        .filter(|l| l.company.eq_ignore_ascii_case(&company.name))
        .collect();
    Some((company, leads))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_from_samples() {
        let stats = stats();
        assert_eq!(stats.total_leads, 8);
        assert_eq!(stats.active_leads, 4);
        assert_eq!(stats.companies, 8);
        assert_eq!(stats.response_rate, 58);
        assert_eq!(stats.total_emails, 21);
        assert_eq!(stats.pending_replies, 3);
        assert_eq!(stats.avg_engagement, 62);
        assert_eq!(stats.active_campaigns, 0);
    }

    #[test]
    fn test_filter_leads() {
        let all = filter_leads(&LeadFilter::default());
        assert_eq!(all.items.len(), 8);
        assert_eq!(all.total_pages, 1);

        let active = filter_leads(&LeadFilter { status: Some("active".into()), ..Default::default() });
        assert_eq!(active.total, 4);

        let search = filter_leads(&LeadFilter { search: "DIGITAL".into(), ..Default::default() });
        assert_eq!(search.items.len(), 1);
        assert_eq!(search.items[0].name, "Emma Wilson");

        let paged = filter_leads(&LeadFilter { page: Some(3), per_page: Some(3), ..Default::default() });
        assert_eq!(paged.items.len(), 2);
        assert_eq!(paged.total, 8);
        assert_eq!(paged.total_pages, 3);
    }

    #[test]
    fn test_filter_replies() {
        let unread = filter_replies(&ReplyFilter { status: Some(ReplyStatus::Unread), ..Default::default() });
        assert_eq!(unread.page.total, 3);
        assert_eq!(unread.page.per_page, 50);

        let search = filter_replies(&ReplyFilter { search: "pricing".into(), ..Default::default() });
        assert_eq!(search.page.items.len(), 1);
        assert_eq!(search.page.items[0].id, "5");
    }

    #[test]
    fn test_company_with_leads() {
        let (company, leads) = company("1").unwrap();
        assert_eq!(company.name, "TechCorp");
        assert_eq!(leads.len(), 1);
        assert!(super::company("99").is_none());
    }
}
