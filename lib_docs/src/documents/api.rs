//! # Documents API Client
//!
//! A dedicated client for the documents REST endpoints, built on the generic
//! `ApiClient`. Listing refreshes the session cache so sorted views read the
//! latest server state.

use reqwest::header::HeaderMap;
use reqwest::Method;

use super::cache::{DocumentCache, DOCUMENTS_KEY};
use super::error::DocumentError;
use super::model::{CreateDocumentRequest, Document};
use crate::retrieve::ky_http::ApiClient;

/// Path of the document collection.
pub const DOCUMENTS_ENDPOINT: &str = "/documents";
/// Path documents are created at.
pub const CREATE_DOCUMENT_ENDPOINT: &str = "/documents";

/// Client for `GET /documents` and `POST /documents`.
#[derive(Clone)]
pub struct DocumentsApi {
    /// The underlying HTTP client, bound to the API base URL.
    client: ApiClient,
    /// The session cache refreshed by `list`.
    cache: DocumentCache,
}

impl DocumentsApi {
    /// Creates a client that refreshes `cache`.
    pub fn new(client: ApiClient, cache: DocumentCache) -> Self {
        Self { client, cache }
    }

    /// The session cache this client writes to.
    pub fn cache(&self) -> &DocumentCache {
        &self.cache
    }

    /// Fetches every document and stores the result under [`DOCUMENTS_KEY`].
    ///
    /// Transport, status and decode failures propagate; the cache is left
    /// untouched in that case.
    pub async fn list(&self) -> Result<Vec<Document>, DocumentError> {
        self.list_with_headers(None).await
    }

    /// Like [`list`](Self::list) with extra request headers.
    pub async fn list_with_headers(
        &self,
        headers: Option<HeaderMap>,
    ) -> Result<Vec<Document>, DocumentError> {
        let documents = self
            .client
            .request_json::<Vec<Document>, ()>(Method::GET, DOCUMENTS_ENDPOINT, None, headers)
            .await?;
        log::info!("Fetched {} documents", documents.len());
        self.cache.set(DOCUMENTS_KEY, documents.clone());
        Ok(documents)
    }

    /// Creates a document on the server and returns the stored record.
    ///
    /// The request is validated first; nothing is sent when a required field
    /// is missing. The cache is not touched here.
    pub async fn create(&self, request: &CreateDocumentRequest) -> Result<Document, DocumentError> {
        let errors = request.validate();
        if !errors.is_empty() {
            return Err(DocumentError::Validation(errors));
        }

        let created = self
            .client
            .request_json::<Document, CreateDocumentRequest>(
                Method::POST,
                CREATE_DOCUMENT_ENDPOINT,
                Some(request),
                None,
            )
            .await?;
        log::info!("Created document '{}' ({})", created.title, created.id);
        Ok(created)
    }
}
