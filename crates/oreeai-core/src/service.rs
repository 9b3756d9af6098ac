//! Data operations behind every dashboard view.
//!
//! Reads never fail from the caller's point of view: list and statistics
//! reads fall back to the sample data in `mock`, single-entity reads fall
//! back to `None`. Creates propagate errors so forms can show them; updates
//! report success as `bool`/`Option`. Nothing is retried.

use anyhow::Result;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::api::{ApiError, Backend};
use crate::index;
use crate::mock;
use crate::models::paged::{raw_items, raw_total};
use crate::models::raw::RawRecord;
use crate::models::{
    Company, CompanyCreate, DashboardStats, IcpSettings, Lead, LeadCreate, PagedResult,
    RepliesResult, Reply, ReplyStats, ReplyStatus, ReplyUpdate, TenantProfile,
};

/// Page size used for replies when the caller does not choose one.
pub const DEFAULT_REPLY_PAGE_SIZE: u64 = 50;

/// Replies shown on the dashboard overview.
pub const RECENT_REPLIES: u64 = 5;

/// How many leads to pull when associating leads with companies.
const LEAD_SCAN_PAGE_SIZE: &str = "1000";

/// Filters for the lead list. `status: None` means all statuses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadFilter {
    pub status: Option<String>,
    pub search: String,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

impl LeadFilter {
    /// Set the status filter; "all" (any case) clears it.
    pub fn with_status(mut self, status: &str) -> Self {
        let status = status.trim().to_lowercase();
        self.status = (!status.is_empty() && status != "all").then_some(status);
        self
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(status) = &self.status {
            query.push(("status", status.to_uppercase()));
        }
        if !self.search.trim().is_empty() {
            query.push(("q", self.search.trim().to_string()));
        }
        if let Some(page) = self.page {
            query.push(("page", page.to_string()));
        }
        if let Some(per_page) = self.per_page {
            query.push(("per_page", per_page.to_string()));
        }
        query
    }
}

/// Filters for the reply list. `status: None` means all statuses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplyFilter {
    pub status: Option<ReplyStatus>,
    pub search: String,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

impl ReplyFilter {
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn per_page(&self) -> u64 {
        self.per_page.unwrap_or(DEFAULT_REPLY_PAGE_SIZE).max(1)
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(page) = self.page {
            query.push(("page", page.to_string()));
        }
        if let Some(per_page) = self.per_page {
            query.push(("limit", per_page.to_string()));
        }
        if let Some(status) = self.status {
            query.push(("status", status.as_str().to_string()));
        }
        if !self.search.trim().is_empty() {
            query.push(("search", self.search.trim().to_string()));
        }
        query
    }
}

/// A list or statistics read. `fallback` is set when the backend failed
/// and `data` is the built-in sample set.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub data: T,
    pub fallback: bool,
}

impl<T> Fetched<T> {
    fn live(data: T) -> Self {
        Self { data, fallback: false }
    }

    fn sample(data: T) -> Self {
        Self { data, fallback: true }
    }
}

/// Stat cards plus the latest replies.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub recent_replies: Vec<Reply>,
}

/// A company with the leads associated to it.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyDetail {
    pub company: Company,
    pub leads: Vec<Lead>,
}

/// Dashboard data operations over a `Backend`.
#[derive(Clone)]
pub struct DataService<B> {
    backend: B,
}

impl<B: Backend> DataService<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    // ===== Statistics =====

    pub async fn dashboard_stats(&self) -> Fetched<DashboardStats> {
        match self.fetch_stats().await {
            Ok(stats) => Fetched::live(stats),
            Err(e) => {
                warn!(error = %e, "Failed to load dashboard stats, using sample data");
                Fetched::sample(mock::stats())
            }
        }
    }

    async fn fetch_stats(&self) -> Result<DashboardStats> {
        let raw = self.backend.get_json("/client/stats", &[]).await?;
        let stats = DashboardStats::from_raw(&raw);
        if !stats.needs_totals() {
            return Ok(stats.with_active_default());
        }

        debug!(
            total_leads = stats.total_leads,
            companies = stats.companies,
            "Stats incomplete, resolving totals"
        );
        let per_page = [("per_page", "1".to_string())];
        let (leads, companies) = futures::join!(
            self.backend.get_json("/leads", &per_page),
            self.backend.get_json("/companies", &per_page),
        );
        Ok(stats.fill_totals(raw_total(&leads?), raw_total(&companies?)))
    }

    pub async fn dashboard(&self) -> Fetched<Dashboard> {
        let recent = ReplyFilter {
            page: Some(1),
            per_page: Some(RECENT_REPLIES),
            ..Default::default()
        };
        let (stats, replies) = futures::join!(self.dashboard_stats(), self.replies(&recent));
        Fetched {
            fallback: stats.fallback || replies.fallback,
            data: Dashboard {
                stats: stats.data,
                recent_replies: replies.data.page.items,
            },
        }
    }

    // ===== Leads =====

    pub async fn leads(&self, filter: &LeadFilter) -> Fetched<PagedResult<Lead>> {
        match self.backend.get_json("/leads", &filter.query()).await {
            Ok(raw) => Fetched::live(PagedResult::from_raw(&raw, Lead::from_raw)),
            Err(e) => {
                warn!(error = %e, "Failed to load leads, using sample data");
                Fetched::sample(mock::filter_leads(filter))
            }
        }
    }

    pub async fn lead(&self, id: &str) -> Option<Lead> {
        match self.backend.get_json(&format!("/leads/{}", id), &[]).await {
            Ok(raw) => Some(Lead::from_raw(&raw)),
            Err(e) if is_not_found(&e) => {
                debug!(lead_id = %id, "Lead not found, using sample data");
                mock::lead(id)
            }
            Err(e) => {
                warn!(lead_id = %id, error = %e, "Failed to load lead, using sample data");
                mock::lead(id)
            }
        }
    }

    pub async fn add_lead(&self, form: &LeadCreate) -> Result<Lead> {
        let body = form.to_body()?;
        let raw = self.backend.send_json(Method::POST, "/leads", Some(&body)).await?;
        Ok(Lead::from_raw(&raw))
    }

    // ===== Companies =====

    async fn lead_scan(&self) -> Result<Value> {
        self.backend
            .get_json("/leads", &[("per_page", LEAD_SCAN_PAGE_SIZE.to_string())])
            .await
    }

    pub async fn companies(&self) -> Fetched<Vec<Company>> {
        let (companies, leads) = futures::join!(
            self.backend.get_json("/companies", &[]),
            self.lead_scan(),
        );
        match (companies, leads) {
            (Ok(companies), Ok(leads)) => Fetched::live(index::resolve_companies(
                raw_items(&companies),
                raw_items(&leads),
            )),
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "Failed to load companies, using sample data");
                Fetched::sample(mock::companies())
            }
        }
    }

    pub async fn company(&self, id: &str) -> Option<CompanyDetail> {
        let company_path = format!("/companies/{}", id);
        let (company, leads) = futures::join!(
            self.backend.get_json(&company_path, &[]),
            self.lead_scan(),
        );
        match (company, leads) {
            (Ok(company), Ok(leads)) => {
                let (company, leads) = index::resolve_company(&company, raw_items(&leads));
                Some(CompanyDetail { company, leads })
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!(company_id = %id, error = %e, "Failed to load company, using sample data");
                mock::company(id).map(|(company, leads)| CompanyDetail { company, leads })
            }
        }
    }

    pub async fn add_company(&self, form: &CompanyCreate) -> Result<Company> {
        let body = form.to_body()?;
        let raw = self
            .backend
            .send_json(Method::POST, "/companies", Some(&body))
            .await?;
        Ok(Company::from_raw(&raw))
    }

    // ===== Replies =====

    pub async fn replies(&self, filter: &ReplyFilter) -> Fetched<RepliesResult> {
        match self.backend.get_json("/replies", &filter.query()).await {
            Ok(raw) => Fetched::live(replies_from_raw(&raw, filter)),
            Err(e) => {
                warn!(error = %e, "Failed to load replies, using sample data");
                Fetched::sample(mock::filter_replies(filter))
            }
        }
    }

    pub async fn update_reply_status(&self, id: &str, update: ReplyUpdate) -> bool {
        let body = update.to_body();
        match self
            .backend
            .send_json(Method::PATCH, &format!("/replies/{}", id), Some(&body))
            .await
        {
            Ok(_) => true,
            Err(e) => {
                error!(reply_id = %id, error = %e, "Failed to update reply status");
                false
            }
        }
    }

    // ===== Settings =====

    pub async fn icp_settings(&self) -> Option<IcpSettings> {
        match self.backend.get_optional("/client/icp").await {
            Ok(Some(raw)) => match serde_json::from_value(raw) {
                Ok(settings) => Some(settings),
                Err(e) => {
                    warn!(error = %e, "ICP settings response was not understood");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Failed to load ICP settings");
                None
            }
        }
    }

    pub async fn update_icp_settings(&self, settings: &IcpSettings) -> Option<IcpSettings> {
        let body = match serde_json::to_value(settings) {
            Ok(body) => body,
            Err(e) => {
                error!(error = %e, "Failed to encode ICP settings");
                return None;
            }
        };
        match self
            .backend
            .send_json(Method::PUT, "/client/icp", Some(&body))
            .await
        {
            // An empty acknowledgement means the backend stored what was sent
            Ok(Value::Null) => Some(settings.clone()),
            Ok(raw) => Some(serde_json::from_value(raw).unwrap_or_else(|e| {
                debug!(error = %e, "ICP save response not a settings document");
                settings.clone()
            })),
            Err(e) => {
                error!(error = %e, "Failed to save ICP settings");
                None
            }
        }
    }

    pub async fn tenant_profile(&self) -> Option<TenantProfile> {
        match self.fetch_tenant_profile().await {
            Ok(raw) => Some(TenantProfile::from_raw(&raw.unwrap_or(Value::Null))),
            Err(e) => {
                warn!(error = %e, "Failed to load tenant profile");
                None
            }
        }
    }

    async fn fetch_tenant_profile(&self) -> Result<Option<Value>> {
        if let Some(profile) = self.backend.get_optional("/client/profile").await? {
            return Ok(Some(profile));
        }
        debug!("No /client/profile, falling back to /client");
        self.backend.get_optional("/client").await
    }

    pub async fn update_tenant_profile(&self, profile: &TenantProfile) -> Option<TenantProfile> {
        let update = profile.update_body();
        let body = match serde_json::to_value(&update) {
            Ok(body) => body,
            Err(e) => {
                error!(error = %e, "Failed to encode tenant profile");
                return None;
            }
        };
        match self.backend.send_json(Method::PUT, "/client", Some(&body)).await {
            Ok(Value::Null) => Some(update),
            Ok(raw) => Some(TenantProfile::from_raw(&raw)),
            Err(e) => {
                error!(error = %e, "Failed to save tenant profile");
                None
            }
        }
    }
}

fn is_not_found(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<ApiError>()
        .is_some_and(ApiError::is_not_found)
}

/// Map a reply listing. Page size is the requested one, not the server's.
fn replies_from_raw(raw: &Value, filter: &ReplyFilter) -> RepliesResult {
    let rec = RawRecord::new(raw);
    let items: Vec<Reply> = raw_items(raw).iter().map(Reply::from_raw).collect();
    let present = |key: &str| rec.first_present(&[key]).is_some();

    RepliesResult {
        page: PagedResult {
            page: if present("currentPage") {
                rec.count(&["currentPage"])
            } else {
                filter.page()
            },
            per_page: filter.per_page(),
            total: if present("total") {
                rec.count(&["total"])
            } else {
                items.len() as u64
            },
            total_pages: if present("totalPages") {
                rec.count(&["totalPages"])
            } else {
                1
            },
            items,
        },
        stats: rec.get("stats").and_then(ReplyStats::from_raw),
    }
}
