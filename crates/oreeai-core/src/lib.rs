//! Core library for the OreeAI outreach dashboard.
//!
//! This crate holds everything that is not terminal rendering:
//!
//! - `api`: HTTP client for the OreeAI backend and its route table
//! - `auth`: session token handling and credential storage
//! - `config`: on-disk configuration and API base URL resolution
//! - `models`: view models and the raw-record normalization layer
//! - `index`: lead-to-company association index
//! - `mock`: static datasets used when the backend is unreachable
//! - `research`: render-agnostic tree for nested research payloads
//! - `service`: data-fetch and mutation operations with fallback policy

pub mod api;
pub mod auth;
pub mod config;
pub mod index;
pub mod mock;
pub mod models;
pub mod research;
pub mod service;
pub mod utils;

pub use api::{ApiClient, ApiError, Backend};
pub use config::Config;
pub use service::{CompanyDetail, Dashboard, DataService, Fetched, LeadFilter, ReplyFilter};
