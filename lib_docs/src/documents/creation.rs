//! # Document Creation
//!
//! The only path by which the client adds documents to its cache.
//!
//! ## Workflow:
//! 1.  **Validate**: `Title` and `Version` must be non-empty after trimming.
//!     A failing request is abandoned with `ok == false` and the messages in
//!     `errors`; the cache is not touched.
//! 2.  **Wait**: the simulated backend sleeps for the configured creation delay
//!     to model the server round-trip. The delay runs on `tokio::time`, so a
//!     paused test clock can advance it deterministically.
//! 3.  **Synthesize or send**: the simulated backend builds the record locally
//!     (fresh ID, no contributors, `CreatedAt == UpdatedAt == now`); the remote
//!     backend posts it to `/documents` and takes the server's record.
//! 4.  **Append**: the record goes to the end of the cached collection.
//!
//! Failures after validation are logged and reported as `ok == false`; they
//! never reach the caller as an `Err`.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use super::api::DocumentsApi;
use super::cache::{DocumentCache, DOCUMENTS_KEY};
use super::error::DocumentError;
use super::model::{CreateDocumentRequest, Document};
use crate::utils::clock::{iso_timestamp, Clock, SystemClock};
use crate::utils::ids::generate_document_id;

/// Where created documents come from.
#[derive(Clone, Default)]
pub enum CreationBackend {
    /// Built locally after the creation delay; no request leaves the device.
    #[default]
    Simulated,
    /// Posted to the documents API; the server's record is cached.
    Remote(DocumentsApi),
}

/// Result of a creation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOutcome {
    /// True when a document was appended to the cache.
    pub ok: bool,
    /// Validation messages; empty unless validation failed.
    pub errors: Vec<String>,
    /// The appended document.
    pub document: Option<Document>,
}

impl CreateOutcome {
    fn created(document: Document) -> Self {
        Self {
            ok: true,
            errors: Vec::new(),
            document: Some(document),
        }
    }

    fn rejected(errors: Vec<String>) -> Self {
        Self {
            ok: false,
            errors,
            document: None,
        }
    }

    fn failed() -> Self {
        Self::rejected(Vec::new())
    }
}

/// Creates documents into a session cache.
#[derive(Clone)]
pub struct DocumentCreator {
    cache: DocumentCache,
    delay: Duration,
    clock: Arc<dyn Clock>,
    backend: CreationBackend,
}

impl DocumentCreator {
    /// A simulated creator on the system clock.
    pub fn new(cache: DocumentCache, delay: Duration) -> Self {
        Self {
            cache,
            delay,
            clock: Arc::new(SystemClock),
            backend: CreationBackend::Simulated,
        }
    }

    /// Replaces the clock used for `CreatedAt`/`UpdatedAt`.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the backend.
    pub fn with_backend(mut self, backend: CreationBackend) -> Self {
        self.backend = backend;
        self
    }

    /// The simulated round-trip delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Validates, creates and appends `request`. Never returns an error;
    /// see the module docs for the outcome shape.
    pub async fn create_document_request(&self, request: CreateDocumentRequest) -> CreateOutcome {
        let errors = request.validate();
        if !errors.is_empty() {
            log::warn!("Document creation rejected: {}", errors.join(", "));
            return CreateOutcome::rejected(errors);
        }

        match self.create_validated(request).await {
            Ok(document) => CreateOutcome::created(document),
            Err(e) => {
                log::error!("Error creating document: {}", e);
                CreateOutcome::failed()
            }
        }
    }

    /// Fire-and-continue variant: runs the creation on its own task.
    pub fn spawn_create(&self, request: CreateDocumentRequest) -> JoinHandle<CreateOutcome> {
        let creator = self.clone();
        tokio::spawn(async move { creator.create_document_request(request).await })
    }

    /// Builds the local record for a validated request.
    pub fn synthesize(&self, request: CreateDocumentRequest) -> Document {
        let now = iso_timestamp(self.clock.now());
        Document {
            id: generate_document_id(),
            title: request.title,
            version: request.version,
            attachments: request.attachments,
            created_at: now.clone(),
            updated_at: now,
            contributors: Some(Vec::new()),
        }
    }

    async fn create_validated(&self, request: CreateDocumentRequest) -> Result<Document, DocumentError> {
        let document = match &self.backend {
            CreationBackend::Simulated => {
                tokio::time::sleep(self.delay).await;
                self.synthesize(request)
            }
            CreationBackend::Remote(api) => api.create(&request).await?,
        };

        let len = self.cache.append(DOCUMENTS_KEY, document.clone());
        log::info!("Document '{}' added to cache ({} cached)", document.title, len);
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieve::ky_http::ApiClient;
    use crate::utils::clock::FixedClock;
    use chrono::{TimeZone, Utc};

    fn creator(cache: &DocumentCache) -> DocumentCreator {
        DocumentCreator::new(cache.clone(), Duration::from_millis(1000))
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn test_empty_title_is_rejected_without_write() {
        let cache = DocumentCache::new();
        let outcome = creator(&cache)
            .create_document_request(CreateDocumentRequest::new("", "1.0"))
            .await;

        assert!(!outcome.ok);
        assert_eq!(outcome.errors, vec!["Title is required"]);
        assert!(cache.get(DOCUMENTS_KEY).is_none());
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn test_valid_request_appends_after_delay() {
        let cache = DocumentCache::new();
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let creator = creator(&cache).with_clock(Arc::new(FixedClock(at)));

        let handle = creator.spawn_create(CreateDocumentRequest::new("Spec", "1.0"));

        // Let the task reach its sleep, then stop just short of the delay.
        tokio::task::yield_now().await;
        tokio::time::advance(Duration::from_millis(999)).await;
        tokio::task::yield_now().await;
        assert!(cache.is_empty(DOCUMENTS_KEY));

        tokio::time::advance(Duration::from_millis(1)).await;
        let outcome = handle.await.unwrap();
        assert!(outcome.ok);

        let docs = cache.get(DOCUMENTS_KEY).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].title, "Spec");
        assert!(!docs[0].id.is_empty());
        assert_eq!(docs[0].created_at, docs[0].updated_at);
        assert_eq!(docs[0].created_at, "2024-01-01T10:00:00.000Z");
        assert_eq!(docs[0].contributors, Some(Vec::new()));
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn test_new_documents_go_to_the_end() {
        let cache = DocumentCache::new();
        let creator = creator(&cache);
        assert!(creator.create_document_request(CreateDocumentRequest::new("First", "1")).await.ok);
        assert!(creator.create_document_request(CreateDocumentRequest::new("Second", "1")).await.ok);

        let titles: Vec<_> = cache.get(DOCUMENTS_KEY).unwrap().into_iter().map(|d| d.title).collect();
        assert_eq!(titles, vec!["First", "Second"]);
    }

    #[tokio::test]
    async fn test_remote_failure_is_reported_not_raised() {
        let cache = DocumentCache::new();
        // Nothing listens on port 9 of the loopback interface.
        let client = ApiClient::new("http://127.0.0.1:9", 0).unwrap();
        let api = DocumentsApi::new(client, cache.clone());
        let creator = creator(&cache).with_backend(CreationBackend::Remote(api));

        let outcome = creator
            .create_document_request(CreateDocumentRequest::new("Spec", "1.0"))
            .await;

        assert!(!outcome.ok);
        assert!(outcome.errors.is_empty());
        assert!(cache.get(DOCUMENTS_KEY).is_none());
    }
}
