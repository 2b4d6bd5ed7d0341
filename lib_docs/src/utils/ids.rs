//! # Document Identifiers
//!
//! Locally created documents need an ID before the server ever sees them.
//! The IDs are short base-36 strings; they are unique enough for a client-side
//! cache but carry no ordering or collision guarantee.

use rand::Rng;

/// Number of characters in a generated ID.
pub const DOCUMENT_ID_LEN: usize = 13;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generates a 13 character lowercase base-36 identifier.
pub fn generate_document_id() -> String {
    let mut rng = rand::rng();
    (0..DOCUMENT_ID_LEN)
        .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
        .collect()
}
