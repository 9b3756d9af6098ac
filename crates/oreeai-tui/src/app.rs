//! Application state management for the OreeAI dashboard.
//!
//! This module contains the core `App` struct that owns the session, the
//! data service and everything the tabs display. Every backend call runs in
//! a spawned task that reports back through an MPSC channel.

use std::collections::HashMap;
use std::future::Future;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use oreeai_core::auth::{CredentialStore, Session};
use oreeai_core::models::{
    Company, CompanyFilter, IcpSettings, Lead, PagedResult, RepliesResult, Reply, ReplyStatus,
    ReplyUpdate, TenantProfile,
};
use oreeai_core::service::{CompanyDetail, Dashboard, Fetched, LeadFilter, ReplyFilter};
use oreeai_core::{ApiClient, ApiError, Config, DataService};

use crate::form::{FormKind, FormState};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum length for email input (RFC 5321 path limit).
const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum length for password input.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Number of rows to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

/// Leads requested per page.
pub const LEADS_PER_PAGE: u64 = 25;

/// Status filters offered on the Leads tab, "all" first.
pub const LEAD_STATUSES: &[&str] = &["all", "new", "active", "responded", "inactive"];

// ============================================================================
// UI State Types
// ============================================================================

/// Main navigation tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Dashboard,
    Leads,
    Companies,
    Replies,
    Settings,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Dashboard,
        Tab::Leads,
        Tab::Companies,
        Tab::Replies,
        Tab::Settings,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Leads => "Leads",
            Tab::Companies => "Companies",
            Tab::Replies => "Replies",
            Tab::Settings => "Settings",
        }
    }

    fn index(&self) -> usize {
        Tab::ALL.iter().position(|t| t == self).unwrap_or(0)
    }

    /// Get the next tab (wrapping around)
    pub fn next(&self) -> Self {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    /// Get the previous tab (wrapping around)
    pub fn prev(&self) -> Self {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}

/// Current UI focus area (list panel or detail panel)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Detail,
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Searching,
    ShowingHelp,
    LoggingIn,
    EditingForm,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoginFocus {
    Email,
    Password,
    Button,
}

// ============================================================================
// Background Tasks
// ============================================================================

/// One kind of view data. At most one load per kind is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadKind {
    Dashboard,
    Leads,
    LeadDetail,
    Companies,
    CompanyDetail,
    Replies,
    IcpSettings,
    TenantProfile,
}

/// Data produced by a load task.
enum LoadResult {
    Dashboard(Fetched<Dashboard>),
    Leads(Fetched<PagedResult<Lead>>),
    LeadDetail(Option<Lead>),
    Companies(Fetched<Vec<Company>>),
    CompanyDetail(Option<CompanyDetail>),
    Replies(Fetched<RepliesResult>),
    IcpSettings(Option<IcpSettings>),
    TenantProfile(Option<TenantProfile>),
}

/// Outcome of a user-initiated write.
enum MutationResult {
    LeadAdded(Result<Lead, String>),
    CompanyAdded(Result<Company, String>),
    ReplyUpdated { id: String, ok: bool },
    IcpSaved(Option<IcpSettings>),
    ProfileSaved(Option<TenantProfile>),
}

enum BackgroundMessage {
    Loaded {
        kind: LoadKind,
        generation: u64,
        result: LoadResult,
    },
    Mutated {
        session: u64,
        result: MutationResult,
    },
}

/// Tracks in-flight loads so that a late response can never overwrite
/// state from a newer request.
///
/// Every load gets a generation from a single increasing counter. Only the
/// latest generation per kind is accepted; starting a newer load of the
/// same kind aborts the older task. Writes are not tracked per kind but
/// carry the session they were started in, so a save that finishes after
/// logout is ignored.
#[derive(Default)]
pub struct LoadTracker {
    generation: u64,
    session: u64,
    current: HashMap<LoadKind, u64>,
    handles: HashMap<LoadKind, JoinHandle<()>>,
}

impl LoadTracker {
    /// Reserve a generation for a new load of `kind`.
    pub fn begin(&mut self, kind: LoadKind) -> u64 {
        self.generation += 1;
        self.current.insert(kind, self.generation);
        self.generation
    }

    /// Remember the task for `kind`, aborting the one it replaces.
    pub fn track(&mut self, kind: LoadKind, handle: JoinHandle<()>) {
        if let Some(previous) = self.handles.insert(kind, handle) {
            previous.abort();
        }
    }

    /// Accept a finished load. False means a newer load superseded it.
    pub fn finish(&mut self, kind: LoadKind, generation: u64) -> bool {
        if self.current.get(&kind) != Some(&generation) {
            return false;
        }
        self.current.remove(&kind);
        self.handles.remove(&kind);
        true
    }

    /// Abort every in-flight load; their results will be dropped.
    pub fn cancel_all(&mut self) {
        for (kind, handle) in self.handles.drain() {
            debug!(?kind, "Aborting load");
            handle.abort();
        }
        self.current.clear();
    }

    pub fn is_loading(&self) -> bool {
        !self.current.is_empty()
    }

    pub fn session(&self) -> u64 {
        self.session
    }

    /// False for a write started before the last logout.
    pub fn accepts_write(&self, session: u64) -> bool {
        session == self.session
    }

    /// Abort all loads and disown every write still in flight.
    pub fn end_session(&mut self) {
        self.cancel_all();
        self.session += 1;
    }
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub config: Config,
    pub session: Session,
    api: ApiClient,
    service: DataService<ApiClient>,

    // UI State
    pub state: AppState,
    pub current_tab: Tab,
    pub focus: Focus,
    pub search_query: String,
    pub detail_scroll: u16,
    pub form: Option<FormState>,

    // Login form state
    pub login_email: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,

    // Dashboard
    pub dashboard: Option<Dashboard>,

    // Leads tab
    pub leads: PagedResult<Lead>,
    pub lead_filter: LeadFilter,
    pub lead_status_index: usize,
    pub lead_selection: usize,
    pub lead_detail: Option<Lead>,

    // Companies tab
    pub companies: Vec<Company>,
    pub company_filter: CompanyFilter,
    pub company_selection: usize,
    pub company_detail: Option<CompanyDetail>,

    // Replies tab
    pub replies: RepliesResult,
    pub reply_filter: ReplyFilter,
    pub reply_selection: usize,

    // Settings tab
    pub icp_settings: Option<IcpSettings>,
    pub tenant_profile: Option<TenantProfile>,

    // Background task channel
    tx: mpsc::Sender<BackgroundMessage>,
    rx: mpsc::Receiver<BackgroundMessage>,
    loads: LoadTracker,

    pub status_message: Option<String>,
}

impl App {
    /// Create a new application instance
    pub fn new() -> Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };
        let base_url = config.api_base_url();
        debug!(%base_url, "API base URL resolved");

        let mut session = Session::new(Config::config_dir()?);
        match session.load() {
            Ok(restored) => debug!(restored, "Session loaded"),
            Err(e) => warn!(error = %e, "Failed to load session"),
        }

        let mut api = ApiClient::new(&base_url)?;
        if let Some(token) = session.token() {
            api.set_token(token.to_string());
        }
        let service = DataService::new(api.clone());

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let login_email = config.last_email.clone().unwrap_or_default();
        let login_password = if login_email.is_empty() {
            String::new()
        } else {
            CredentialStore::get_password(&login_email).unwrap_or_default()
        };

        Ok(Self {
            config,
            session,
            api,
            service,

            state: AppState::Normal,
            current_tab: Tab::Dashboard,
            focus: Focus::List,
            search_query: String::new(),
            detail_scroll: 0,
            form: None,

            login_email,
            login_password,
            login_focus: LoginFocus::Email,
            login_error: None,

            dashboard: None,

            leads: PagedResult::default(),
            lead_filter: LeadFilter {
                page: Some(1),
                per_page: Some(LEADS_PER_PAGE),
                ..Default::default()
            },
            lead_status_index: 0,
            lead_selection: 0,
            lead_detail: None,

            companies: Vec::new(),
            company_filter: CompanyFilter::default(),
            company_selection: 0,
            company_detail: None,

            replies: RepliesResult {
                page: PagedResult::default(),
                stats: None,
            },
            reply_filter: ReplyFilter::default(),
            reply_selection: 0,

            icp_settings: None,
            tenant_profile: None,

            tx,
            rx,
            loads: LoadTracker::default(),

            status_message: None,
        })
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    pub fn is_authenticated(&self) -> bool {
        self.session.is_valid()
    }

    /// Display name of the signed-in client.
    pub fn user_label(&self) -> Option<String> {
        self.session
            .user()
            .map(|u| format!("{} <{}>", u.name, u.email))
    }

    /// Show the login overlay
    pub fn start_login(&mut self) {
        self.state = AppState::LoggingIn;
        self.login_focus = if self.login_email.is_empty() {
            LoginFocus::Email
        } else {
            LoginFocus::Password
        };
        self.login_error = None;
    }

    fn install_token(&mut self) {
        match self.session.token() {
            Some(token) => self.api.set_token(token.to_string()),
            None => self.api.clear_token(),
        }
        self.service = DataService::new(self.api.clone());
    }

    /// Attempt login with the credentials from the login form
    pub async fn attempt_login(&mut self) -> Result<()> {
        let email = self.login_email.trim().to_string();
        let password = self.login_password.clone();

        if email.is_empty() || password.is_empty() {
            self.login_error = Some("Email and password required".to_string());
            return Err(anyhow::anyhow!("Email and password required"));
        }

        self.login_error = None;

        match self.api.authenticate(&email, &password).await {
            Ok(session_data) => {
                if let Err(e) = CredentialStore::store(&email, &password) {
                    warn!(error = %e, "Failed to store credentials");
                }

                self.config.last_email = Some(email);
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }

                self.session.update(session_data);
                if let Err(e) = self.session.save() {
                    warn!(error = %e, "Failed to save session");
                }
                self.install_token();

                self.login_password.clear();
                self.state = AppState::Normal;
                info!("Login successful");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                self.login_error = Some(login_error_message(&e));
                Err(e)
            }
        }
    }

    /// Sign out: tell the backend, then drop the local token and data.
    pub async fn logout(&mut self) {
        if let Err(e) = self.api.logout().await {
            warn!(error = %e, "Logout request failed");
        }
        if let Err(e) = self.session.clear() {
            warn!(error = %e, "Failed to clear session");
        }
        self.install_token();
        self.loads.end_session();
        self.clear_data();
        info!("Logged out");
        self.start_login();
    }

    fn clear_data(&mut self) {
        self.dashboard = None;
        self.leads = PagedResult::default();
        self.lead_detail = None;
        self.companies.clear();
        self.company_detail = None;
        self.replies.page = PagedResult::default();
        self.replies.stats = None;
        self.icp_settings = None;
        self.tenant_profile = None;
        self.lead_selection = 0;
        self.company_selection = 0;
        self.reply_selection = 0;
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Switch tabs. Loads for the old view are aborted and the new view
    /// is fetched fresh.
    pub fn switch_tab(&mut self, tab: Tab) {
        if tab == self.current_tab {
            return;
        }
        self.loads.cancel_all();
        self.current_tab = tab;
        self.focus = Focus::List;
        self.detail_scroll = 0;
        self.search_query = self.current_search().to_string();
        self.refresh_current_tab();
    }

    fn current_search(&self) -> &str {
        match self.current_tab {
            Tab::Leads => &self.lead_filter.search,
            Tab::Companies => &self.company_filter.search,
            Tab::Replies => &self.reply_filter.search,
            Tab::Dashboard | Tab::Settings => "",
        }
    }

    /// Push the search box contents into the current tab's filter.
    pub fn apply_search(&mut self) {
        let query = self.search_query.clone();
        match self.current_tab {
            Tab::Leads => {
                self.lead_filter.search = query;
                self.lead_filter.page = Some(1);
                self.lead_selection = 0;
                self.load_leads();
            }
            Tab::Companies => {
                self.company_filter.search = query;
                self.company_selection = 0;
            }
            Tab::Replies => {
                self.reply_filter.search = query;
                self.reply_filter.page = None;
                self.reply_selection = 0;
                self.load_replies();
            }
            Tab::Dashboard | Tab::Settings => {}
        }
    }

    pub fn list_len(&self) -> usize {
        match self.current_tab {
            Tab::Dashboard => self
                .dashboard
                .as_ref()
                .map(|d| d.recent_replies.len())
                .unwrap_or(0),
            Tab::Leads => self.leads.items.len(),
            Tab::Companies => self.visible_companies().len(),
            Tab::Replies => self.replies.page.items.len(),
            Tab::Settings => 0,
        }
    }

    fn selection_mut(&mut self) -> Option<&mut usize> {
        match self.current_tab {
            Tab::Leads => Some(&mut self.lead_selection),
            Tab::Companies => Some(&mut self.company_selection),
            Tab::Replies => Some(&mut self.reply_selection),
            Tab::Dashboard | Tab::Settings => None,
        }
    }

    /// Move the list selection by `delta` rows, clamped to the list.
    pub fn move_selection(&mut self, delta: isize) {
        let len = self.list_len();
        if let Some(selection) = self.selection_mut() {
            *selection = step(*selection, delta, len);
            self.detail_scroll = 0;
        }
    }

    pub fn scroll_detail(&mut self, delta: isize) {
        self.detail_scroll = if delta < 0 {
            self.detail_scroll.saturating_sub(delta.unsigned_abs() as u16)
        } else {
            self.detail_scroll.saturating_add(delta as u16)
        };
    }

    // =========================================================================
    // Selections
    // =========================================================================

    pub fn selected_lead(&self) -> Option<&Lead> {
        self.leads.items.get(self.lead_selection)
    }

    /// The selected lead, preferring a freshly fetched copy.
    pub fn lead_for_detail(&self) -> Option<&Lead> {
        let selected = self.selected_lead()?;
        match &self.lead_detail {
            Some(detail) if detail.id == selected.id => Some(detail),
            _ => Some(selected),
        }
    }

    pub fn visible_companies(&self) -> Vec<&Company> {
        self.company_filter.apply(&self.companies)
    }

    pub fn selected_company(&self) -> Option<&Company> {
        self.visible_companies().get(self.company_selection).copied()
    }

    /// Loaded detail for the selected company, if it is the one loaded.
    pub fn selected_company_detail(&self) -> Option<&CompanyDetail> {
        let selected = self.selected_company()?;
        self.company_detail
            .as_ref()
            .filter(|d| d.company.id == selected.id)
    }

    pub fn selected_reply(&self) -> Option<&Reply> {
        self.replies.page.items.get(self.reply_selection)
    }

    pub fn lead_status_label(&self) -> &'static str {
        LEAD_STATUSES[self.lead_status_index]
    }

    pub fn is_loading(&self) -> bool {
        self.loads.is_loading()
    }

    // =========================================================================
    // Loading
    // =========================================================================

    fn spawn_load<F, Fut>(&mut self, kind: LoadKind, fetch: F)
    where
        F: FnOnce(DataService<ApiClient>) -> Fut,
        Fut: Future<Output = LoadResult> + Send + 'static,
    {
        let generation = self.loads.begin(kind);
        let tx = self.tx.clone();
        let fetch = fetch(self.service.clone());
        debug!(?kind, generation, "Starting load");

        let handle = tokio::spawn(async move {
            let result = fetch.await;
            send_message(&tx, BackgroundMessage::Loaded { kind, generation, result }).await;
        });
        self.loads.track(kind, handle);
    }

    fn spawn_mutation<F, Fut>(&self, run: F)
    where
        F: FnOnce(DataService<ApiClient>) -> Fut,
        Fut: Future<Output = MutationResult> + Send + 'static,
    {
        let tx = self.tx.clone();
        let session = self.loads.session();
        let run = run(self.service.clone());
        tokio::spawn(async move {
            let result = run.await;
            send_message(&tx, BackgroundMessage::Mutated { session, result }).await;
        });
    }

    /// Reload everything the current tab shows
    pub fn refresh_current_tab(&mut self) {
        match self.current_tab {
            Tab::Dashboard => self.load_dashboard(),
            Tab::Leads => self.load_leads(),
            Tab::Companies => self.load_companies(),
            Tab::Replies => self.load_replies(),
            Tab::Settings => self.load_settings(),
        }
    }

    pub fn load_dashboard(&mut self) {
        self.spawn_load(LoadKind::Dashboard, |service| async move {
            LoadResult::Dashboard(service.dashboard().await)
        });
    }

    pub fn load_leads(&mut self) {
        let filter = self.lead_filter.clone();
        self.spawn_load(LoadKind::Leads, |service| async move {
            LoadResult::Leads(service.leads(&filter).await)
        });
    }

    pub fn load_lead_detail(&mut self) {
        let Some(id) = self.selected_lead().map(|l| l.id.clone()) else {
            return;
        };
        self.spawn_load(LoadKind::LeadDetail, |service| async move {
            LoadResult::LeadDetail(service.lead(&id).await)
        });
    }

    pub fn load_companies(&mut self) {
        self.spawn_load(LoadKind::Companies, |service| async move {
            LoadResult::Companies(service.companies().await)
        });
    }

    pub fn load_company_detail(&mut self) {
        let Some(id) = self.selected_company().map(|c| c.id.clone()) else {
            return;
        };
        self.spawn_load(LoadKind::CompanyDetail, |service| async move {
            LoadResult::CompanyDetail(service.company(&id).await)
        });
    }

    pub fn load_replies(&mut self) {
        let filter = self.reply_filter.clone();
        self.spawn_load(LoadKind::Replies, |service| async move {
            LoadResult::Replies(service.replies(&filter).await)
        });
    }

    pub fn load_settings(&mut self) {
        self.spawn_load(LoadKind::IcpSettings, |service| async move {
            LoadResult::IcpSettings(service.icp_settings().await)
        });
        self.spawn_load(LoadKind::TenantProfile, |service| async move {
            LoadResult::TenantProfile(service.tenant_profile().await)
        });
    }

    // =========================================================================
    // Filters and Paging
    // =========================================================================

    pub fn cycle_lead_status(&mut self) {
        self.lead_status_index = (self.lead_status_index + 1) % LEAD_STATUSES.len();
        self.lead_filter = self.lead_filter.clone().with_status(self.lead_status_label());
        self.lead_filter.page = Some(1);
        self.lead_selection = 0;
        self.load_leads();
    }

    pub fn change_lead_page(&mut self, forward: bool) {
        let can_move = if forward {
            self.leads.has_next()
        } else {
            self.leads.has_prev()
        };
        if !can_move {
            return;
        }
        let page = self.lead_filter.page.unwrap_or(1);
        self.lead_filter.page = Some(if forward { page + 1 } else { page.saturating_sub(1).max(1) });
        self.lead_selection = 0;
        self.load_leads();
    }

    pub fn cycle_research_filter(&mut self) {
        self.company_filter.research = self.company_filter.research.next();
        self.company_selection = 0;
    }

    pub fn clear_company_filter(&mut self) {
        self.company_filter = CompanyFilter::default();
        self.search_query.clear();
        self.company_selection = 0;
    }

    pub fn cycle_reply_status(&mut self) {
        self.reply_filter.status = next_reply_status(self.reply_filter.status);
        self.reply_filter.page = None;
        self.reply_selection = 0;
        self.load_replies();
    }

    pub fn change_reply_page(&mut self, forward: bool) {
        let page = &self.replies.page;
        if (forward && !page.has_next()) || (!forward && !page.has_prev()) {
            return;
        }
        let current = self.reply_filter.page();
        self.reply_filter.page = Some(if forward { current + 1 } else { current.saturating_sub(1).max(1) });
        self.reply_selection = 0;
        self.load_replies();
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Triage the selected reply. The change shows immediately; the list is
    /// reloaded once the backend answers, success or not.
    pub fn set_reply_status(&mut self, status: ReplyStatus) {
        let Some(id) = self.selected_reply().map(|r| r.id.clone()) else {
            return;
        };
        let update = ReplyUpdate::status(status);
        update.apply_to(&mut self.replies.page.items, &id);
        if let Some(dashboard) = self.dashboard.as_mut() {
            update.apply_to(&mut dashboard.recent_replies, &id);
        }

        self.spawn_mutation(|service| async move {
            let ok = service.update_reply_status(&id, update).await;
            MutationResult::ReplyUpdated { id, ok }
        });
    }

    pub fn open_form(&mut self, kind: FormKind) {
        let form = match kind {
            FormKind::AddLead => FormState::add_lead(),
            FormKind::AddCompany => FormState::add_company(),
            FormKind::CompanyFilter => FormState::company_filter(&self.company_filter),
            FormKind::Icp => FormState::icp(self.icp_settings.as_ref()),
            FormKind::Profile => FormState::profile(self.tenant_profile.as_ref()),
        };
        self.form = Some(form);
        self.state = AppState::EditingForm;
    }

    pub fn close_form(&mut self) {
        self.form = None;
        self.state = AppState::Normal;
    }

    /// Validate the open form and send it. Validation errors stay in the form.
    pub fn submit_form(&mut self) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        if form.submitting {
            return;
        }

        match form.kind {
            FormKind::AddLead => {
                let create = form.lead_create();
                if let Err(e) = create.to_body() {
                    form.error = Some(e.to_string());
                    return;
                }
                form.submitting = true;
                self.spawn_mutation(|service| async move {
                    let result = service.add_lead(&create).await.map_err(|e| format!("{:#}", e));
                    MutationResult::LeadAdded(result)
                });
            }
            FormKind::AddCompany => {
                let create = form.company_create();
                if let Err(e) = create.to_body() {
                    form.error = Some(e.to_string());
                    return;
                }
                form.submitting = true;
                self.spawn_mutation(|service| async move {
                    let result = service.add_company(&create).await.map_err(|e| format!("{:#}", e));
                    MutationResult::CompanyAdded(result)
                });
            }
            FormKind::CompanyFilter => match form.filtered(&self.company_filter) {
                Ok(filter) => {
                    self.company_filter = filter;
                    self.company_selection = 0;
                    self.close_form();
                }
                Err(e) => form.error = Some(e.to_string()),
            },
            FormKind::Icp => match form.icp_settings() {
                Ok(settings) => {
                    form.submitting = true;
                    self.spawn_mutation(|service| async move {
                        MutationResult::IcpSaved(service.update_icp_settings(&settings).await)
                    });
                }
                Err(e) => form.error = Some(e.to_string()),
            },
            FormKind::Profile => {
                let profile = form.tenant_profile(self.tenant_profile.as_ref());
                form.submitting = true;
                self.spawn_mutation(|service| async move {
                    MutationResult::ProfileSaved(service.update_tenant_profile(&profile).await)
                });
            }
        }
    }

    /// Report a failed submit on the form if it is still open.
    fn form_failed(&mut self, kind: FormKind, message: String) {
        match self.form.as_mut().filter(|f| f.kind == kind) {
            Some(form) => {
                form.submitting = false;
                form.error = Some(message);
            }
            None => self.status_message = Some(message),
        }
    }

    fn form_succeeded(&mut self, kind: FormKind, message: &str) {
        if self.form.as_ref().is_some_and(|f| f.kind == kind) {
            self.close_form();
        }
        self.status_message = Some(message.to_string());
    }

    // =========================================================================
    // Background Results
    // =========================================================================

    /// Apply every result that has arrived since the last frame
    pub fn check_background_tasks(&mut self) {
        let mut messages = Vec::new();
        while let Ok(message) = self.rx.try_recv() {
            messages.push(message);
        }
        for message in messages {
            self.process_message(message);
        }
    }

    fn process_message(&mut self, message: BackgroundMessage) {
        match message {
            BackgroundMessage::Loaded {
                kind,
                generation,
                result,
            } => {
                if !self.loads.finish(kind, generation) {
                    debug!(?kind, generation, "Dropping stale load result");
                    return;
                }
                self.apply_load(result);
            }
            BackgroundMessage::Mutated { session, result } => {
                if !self.loads.accepts_write(session) {
                    debug!(session, "Dropping write result from an earlier session");
                    return;
                }
                self.apply_mutation(result);
            }
        }
    }

    fn apply_load(&mut self, result: LoadResult) {
        match result {
            LoadResult::Dashboard(dashboard) => {
                self.note_fallback("dashboard", dashboard.fallback);
                self.dashboard = Some(dashboard.data);
            }
            LoadResult::Leads(page) => {
                self.note_fallback("leads", page.fallback);
                self.leads = page.data;
                self.lead_selection = clamp(self.lead_selection, self.leads.items.len());
            }
            LoadResult::LeadDetail(lead) => {
                if lead.is_none() {
                    self.status_message = Some("Lead not found".to_string());
                }
                self.lead_detail = lead;
            }
            LoadResult::Companies(companies) => {
                self.note_fallback("companies", companies.fallback);
                self.companies = companies.data;
                self.company_selection =
                    clamp(self.company_selection, self.visible_companies().len());
            }
            LoadResult::CompanyDetail(detail) => {
                if detail.is_none() {
                    self.status_message = Some("Company not found".to_string());
                }
                self.company_detail = detail;
            }
            LoadResult::Replies(replies) => {
                self.note_fallback("replies", replies.fallback);
                self.replies = replies.data;
                self.reply_selection = clamp(self.reply_selection, self.replies.page.items.len());
            }
            LoadResult::IcpSettings(settings) => {
                self.icp_settings = settings;
            }
            LoadResult::TenantProfile(profile) => {
                if profile.is_none() {
                    self.status_message = Some("Failed to load company profile".to_string());
                }
                self.tenant_profile = profile;
            }
        }
    }

    /// Sample data stands in for a failed read; say so in the status bar.
    fn note_fallback(&mut self, what: &str, fallback: bool) {
        if fallback {
            self.status_message = Some(fallback_message(what));
        }
    }

    fn apply_mutation(&mut self, result: MutationResult) {
        match result {
            MutationResult::LeadAdded(Ok(lead)) => {
                info!(lead_id = %lead.id, "Lead added");
                self.form_succeeded(FormKind::AddLead, "Lead added");
                if self.current_tab == Tab::Leads {
                    self.load_leads();
                }
            }
            MutationResult::LeadAdded(Err(message)) => {
                self.form_failed(FormKind::AddLead, message);
            }
            MutationResult::CompanyAdded(Ok(company)) => {
                info!(company_id = %company.id, "Company added");
                self.form_succeeded(FormKind::AddCompany, "Company added");
                if self.current_tab == Tab::Companies {
                    self.load_companies();
                }
            }
            MutationResult::CompanyAdded(Err(message)) => {
                self.form_failed(FormKind::AddCompany, message);
            }
            MutationResult::ReplyUpdated { id, ok } => {
                if !ok {
                    warn!(reply_id = %id, "Reply status not saved, reloading");
                    self.status_message = Some("Failed to update reply status".to_string());
                }
                match self.current_tab {
                    Tab::Replies => self.load_replies(),
                    Tab::Dashboard => self.load_dashboard(),
                    _ => {}
                }
            }
            MutationResult::IcpSaved(Some(settings)) => {
                self.icp_settings = Some(settings);
                self.form_succeeded(FormKind::Icp, "ICP settings saved");
            }
            MutationResult::IcpSaved(None) => {
                self.form_failed(FormKind::Icp, "Failed to save ICP settings".to_string());
            }
            MutationResult::ProfileSaved(Some(profile)) => {
                self.tenant_profile = Some(profile);
                self.form_succeeded(FormKind::Profile, "Company profile saved");
            }
            MutationResult::ProfileSaved(None) => {
                self.form_failed(FormKind::Profile, "Failed to save company profile".to_string());
            }
        }
    }
}

async fn send_message(tx: &mpsc::Sender<BackgroundMessage>, message: BackgroundMessage) {
    if tx.send(message).await.is_err() {
        error!("Failed to send background result - channel closed");
    }
}

fn fallback_message(what: &str) -> String {
    format!("Failed to load {}, showing sample data", what)
}

/// User-facing text for a failed login.
fn login_error_message(e: &anyhow::Error) -> String {
    match e.downcast_ref::<ApiError>() {
        Some(ApiError::Unauthorized) => "Invalid email or password".to_string(),
        Some(ApiError::NetworkError(_)) => {
            "Unable to connect to server. Check the API URL.".to_string()
        }
        Some(ApiError::InvalidResponse { body, .. }) | Some(ApiError::AccessDenied(body)) => {
            body.clone()
        }
        _ => format!("Login failed: {}", e),
    }
}

fn next_reply_status(current: Option<ReplyStatus>) -> Option<ReplyStatus> {
    match current {
        None => Some(ReplyStatus::Unread),
        Some(ReplyStatus::Unread) => Some(ReplyStatus::Read),
        Some(ReplyStatus::Read) => Some(ReplyStatus::Archived),
        Some(ReplyStatus::Archived) => None,
    }
}

fn step(selection: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let next = selection as isize + delta;
    next.clamp(0, len as isize - 1) as usize
}

fn clamp(selection: usize, len: usize) -> usize {
    selection.min(len.saturating_sub(1))
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

pub fn can_add_email_char(current_len: usize, c: char) -> bool {
    current_len < MAX_EMAIL_LENGTH && is_valid_input_char(c) && !c.is_whitespace()
}

pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_next() {
        assert_eq!(Tab::Dashboard.next(), Tab::Leads);
        assert_eq!(Tab::Leads.next(), Tab::Companies);
        assert_eq!(Tab::Replies.next(), Tab::Settings);
        assert_eq!(Tab::Settings.next(), Tab::Dashboard); // Wraps around
    }

    #[test]
    fn test_tab_prev() {
        assert_eq!(Tab::Dashboard.prev(), Tab::Settings); // Wraps around
        assert_eq!(Tab::Companies.prev(), Tab::Leads);
    }

    #[test]
    fn test_fallback_message() {
        assert_eq!(
            fallback_message("leads"),
            "Failed to load leads, showing sample data"
        );
    }

    #[test]
    fn test_step_and_clamp() {
        assert_eq!(step(0, -1, 5), 0);
        assert_eq!(step(3, 10, 5), 4);
        assert_eq!(step(2, 1, 0), 0);
        assert_eq!(clamp(7, 3), 2);
        assert_eq!(clamp(0, 0), 0);
    }

    #[test]
    fn test_reply_status_cycle() {
        let mut status = None;
        let mut seen = Vec::new();
        for _ in 0..4 {
            status = next_reply_status(status);
            seen.push(status);
        }
        assert_eq!(
            seen,
            vec![
                Some(ReplyStatus::Unread),
                Some(ReplyStatus::Read),
                Some(ReplyStatus::Archived),
                None
            ]
        );
    }

    #[test]
    fn test_can_add_email_char() {
        assert!(can_add_email_char(0, 'a'));
        assert!(can_add_email_char(253, '@'));
        assert!(!can_add_email_char(254, 'a'));
        assert!(!can_add_email_char(0, ' '));
        assert!(!can_add_email_char(0, '\t'));
    }

    #[test]
    fn test_can_add_password_char() {
        assert!(can_add_password_char(0, ' '));
        assert!(can_add_password_char(127, '!'));
        assert!(!can_add_password_char(128, 'a'));
        assert!(!can_add_password_char(0, '\r'));
    }

    #[test]
    fn test_login_error_messages() {
        let unauthorized: anyhow::Error = ApiError::Unauthorized.into();
        assert_eq!(login_error_message(&unauthorized), "Invalid email or password");

        let rejected: anyhow::Error = ApiError::InvalidResponse {
            status: 400,
            body: "Account disabled".into(),
        }
        .into();
        assert_eq!(login_error_message(&rejected), "Account disabled");
    }

    #[tokio::test]
    async fn test_login_error_for_unreachable_server() {
        let api = ApiClient::new("http://127.0.0.1:1").unwrap();
        let err = api.authenticate("ana@acme.com", "secret").await.unwrap_err();
        assert_eq!(
            login_error_message(&err),
            "Unable to connect to server. Check the API URL."
        );
    }

    #[test]
    fn test_tracker_accepts_only_latest_generation() {
        let mut tracker = LoadTracker::default();
        let first = tracker.begin(LoadKind::Leads);
        let second = tracker.begin(LoadKind::Leads);
        let other = tracker.begin(LoadKind::Replies);

        assert!(!tracker.finish(LoadKind::Leads, first));
        assert!(tracker.finish(LoadKind::Leads, second));
        // already consumed
        assert!(!tracker.finish(LoadKind::Leads, second));
        assert!(tracker.is_loading());
        assert!(tracker.finish(LoadKind::Replies, other));
        assert!(!tracker.is_loading());
    }

    #[tokio::test]
    async fn test_tracker_aborts_superseded_task() {
        let mut tracker = LoadTracker::default();
        tracker.begin(LoadKind::Companies);
        let (alive, dropped) = tokio::sync::oneshot::channel::<()>();
        tracker.track(
            LoadKind::Companies,
            tokio::spawn(async move {
                let _alive = alive;
                std::future::pending::<()>().await;
            }),
        );

        tracker.begin(LoadKind::Companies);
        tracker.track(LoadKind::Companies, tokio::spawn(async {}));
        // the aborted task drops its sender
        assert!(dropped.await.is_err());
    }

    #[tokio::test]
    async fn test_end_session_disowns_writes() {
        let mut tracker = LoadTracker::default();
        let before = tracker.session();
        assert!(tracker.accepts_write(before));

        let generation = tracker.begin(LoadKind::TenantProfile);
        tracker.track(LoadKind::TenantProfile, tokio::spawn(std::future::pending::<()>()));
        tracker.end_session();

        assert!(!tracker.accepts_write(before));
        assert!(tracker.accepts_write(tracker.session()));
        assert!(!tracker.finish(LoadKind::TenantProfile, generation));
        assert!(!tracker.is_loading());
    }

    #[tokio::test]
    async fn test_cancel_all_drops_pending_results() {
        let mut tracker = LoadTracker::default();
        let generation = tracker.begin(LoadKind::Dashboard);
        tracker.track(LoadKind::Dashboard, tokio::spawn(std::future::pending::<()>()));
        tracker.cancel_all();
        assert!(!tracker.is_loading());
        assert!(!tracker.finish(LoadKind::Dashboard, generation));
    }
}
