//! # lib_docs
//!
//! Client core for the documents app. Each top-level folder is a module that
//! can be switched on independently through a Cargo feature of the same name;
//! the `full` feature (the default) enables all of them.
//!
//! - **`configs`**: endpoint resolution and timing configuration.
//! - **`core`**: the notification queue and the task that owns it.
//! - **`documents`**: document model, sort engine, cache and creation path.
//! - **`ingestors`**: the WebSocket live feed listener.
//! - **`retrieve`**: the HTTP client used by the documents API.
//! - **`utils`**: ID generation and clocks.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms, unused_qualifications)]

#[cfg(feature = "configs")]
pub mod configs;
#[cfg(feature = "core")]
pub mod core;
#[cfg(feature = "documents")]
pub mod documents;
#[cfg(feature = "ingestors")]
pub mod ingestors;
#[cfg(feature = "retrieve")]
pub mod retrieve;
#[cfg(feature = "utils")]
pub mod utils;
