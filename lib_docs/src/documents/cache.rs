//! # Document Cache
//!
//! The client-held, authoritative in-memory collection of documents, keyed by
//! a logical resource name. A `DocumentCache` is a cheap handle: clones share
//! the same store, so one instance is created per session and passed to every
//! consumer that needs it. Readers always get owned copies.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::model::Document;
use super::sorting::{sort_optional, SortOption};

/// Cache key of the document list.
pub const DOCUMENTS_KEY: &str = "documents";

/// Shared store of document collections.
#[derive(Debug, Clone, Default)]
pub struct DocumentCache {
    entries: Arc<Mutex<HashMap<String, Vec<Document>>>>,
}

impl DocumentCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    // Critical sections never await, so a poisoned lock still holds a
    // consistent map.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<Document>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a copy of the collection under `key`, if one was ever stored.
    pub fn get(&self, key: &str) -> Option<Vec<Document>> {
        self.lock().get(key).cloned()
    }

    /// Replaces the collection under `key`.
    pub fn set(&self, key: &str, documents: Vec<Document>) {
        log::debug!("Cache '{}' set to {} documents", key, documents.len());
        self.lock().insert(key.to_string(), documents);
    }

    /// Appends one document to the end of the collection under `key`,
    /// starting an empty collection if none exists. Returns the new length.
    pub fn append(&self, key: &str, document: Document) -> usize {
        let mut entries = self.lock();
        let list = entries.entry(key.to_string()).or_default();
        list.push(document);
        log::debug!("Cache '{}' appended, now {} documents", key, list.len());
        list.len()
    }

    /// Number of documents under `key`; zero when absent.
    pub fn len(&self, key: &str) -> usize {
        self.lock().get(key).map_or(0, Vec::len)
    }

    /// True when nothing is cached under `key`.
    pub fn is_empty(&self, key: &str) -> bool {
        self.len(key) == 0
    }

    /// A sorted copy of the collection under `key`; empty when absent.
    pub fn sorted(&self, key: &str, sort_option: SortOption) -> Vec<Document> {
        let entries = self.lock();
        sort_optional(entries.get(key).map(Vec::as_slice), sort_option)
    }
}
