//! Twitter API module.
//!
//! This module provides:
//! - HTTP client for the v1.1 and v2 REST APIs
//! - OAuth 1.0a request signing
//! - Paginated timeline access
//! - API response types

pub mod auth;
pub mod client;
pub mod timeline;
pub mod types;

pub use client::{TwitterApi, API_BASE};
pub use timeline::{TimelineSource, UserTimeline};
pub use types::*;
