//! # Data Retrieval Module
//!
//! Generic HTTP plumbing shared by the API clients in this crate.
//!
//! ## Contained Modules:
//!
//! - **`ky_http`**: `ApiClient`, a JSON client on `reqwest` and
//!   `reqwest-middleware` that joins endpoints onto a base URL, sends
//!   `Content-Type: application/json` by default, and can retry transient
//!   failures with exponential backoff.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// JSON HTTP client with optional retry middleware.
pub mod ky_http;

pub use ky_http::{ApiClient, ApiError, ApiResponse};
