//! # Documents Module
//!
//! Everything the client knows about documents: the wire model, the sort
//! engine used by list and grid views, the session cache that owns the
//! authoritative collection, the REST client, and the creation path.
//!
//! ## Contained Modules:
//!
//! - **`model`**: `Document`, `CreateDocumentRequest` and the live-feed
//!   `NotificationItem`, all with Pascal-case wire names.
//! - **`sorting`**: `SortOption` and the copy-and-sort `sort_documents`.
//! - **`cache`**: `DocumentCache`, an explicitly owned store shared by handle.
//! - **`api`**: `DocumentsApi` for `GET`/`POST /documents`.
//! - **`creation`**: `DocumentCreator`, validation plus delayed append.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Wire shapes for documents and notifications.
pub mod model;
/// The sort engine.
pub mod sorting;
/// The session document cache.
pub mod cache;
/// REST client for the documents endpoints.
pub mod api;
/// Validation and creation into the cache.
pub mod creation;
mod error;

pub use api::DocumentsApi;
pub use cache::{DocumentCache, DOCUMENTS_KEY};
pub use creation::{CreateOutcome, CreationBackend, DocumentCreator};
pub use error::DocumentError;
pub use model::{Contributor, CreateDocumentRequest, Document, NotificationItem};
pub use sorting::{sort_documents, SortOption};
