//! View models for OreeAI data.
//!
//! Every entity is built from a raw backend record through its `from_raw`
//! constructor. Those constructors are total: any JSON value, including
//! `{}` or a non-object, yields a usable model with placeholder fields.

pub mod company;
pub mod form;
pub mod icp;
pub mod lead;
pub mod paged;
pub mod raw;
pub mod reply;
pub mod stats;
pub mod tenant;

pub use company::{Company, CompanyCreate, CompanyFilter, CompanyStatus, EngagementTier, ResearchFilter};
pub use form::FormError;
pub use icp::{IcpForm, IcpSettings};
pub use lead::{Lead, LeadCreate};
pub use paged::PagedResult;
pub use reply::{RepliesResult, Reply, ReplyStats, ReplyStatus, ReplyUpdate, Sentiment};
pub use stats::DashboardStats;
pub use tenant::TenantProfile;
