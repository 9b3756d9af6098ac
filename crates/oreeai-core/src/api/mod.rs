//! REST API client module for the OreeAI backend.
//!
//! This module provides the `ApiClient` for communicating with the
//! backend to fetch leads, companies, replies and tenant settings.
//!
//! The API uses JWT bearer token authentication obtained through
//! the `/client/login` endpoint.

pub mod client;
pub mod error;
pub mod routes;

pub use client::{ApiClient, Backend};
pub use error::ApiError;
