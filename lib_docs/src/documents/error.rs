use thiserror::Error;

use crate::retrieve::ky_http::ApiError;

/// Failures of the documents API and the creation path.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Required fields are missing; one message per field.
    #[error("invalid document: {}", .0.join(", "))]
    Validation(Vec<String>),

    /// The HTTP exchange failed (transport, status or decode).
    #[error(transparent)]
    Api(#[from] ApiError),
}
