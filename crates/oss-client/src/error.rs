//! Error types for the descriptor-driven client.

use thiserror::Error;

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors surfaced by descriptor loading and API invocation.
///
/// None of these are retried anywhere in the core; each propagates to
/// the immediate caller, which decides whether to try again.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Network or transport failure while fetching the API descriptor
    #[error("Failed to fetch API descriptor: {0}")]
    DescriptorFetch(String),

    /// The descriptor payload is not a well-formed Swagger/OpenAPI document
    #[error("Malformed API descriptor: {0}")]
    DescriptorParse(String),

    /// Invocation attempted while the lazy descriptor load keeps failing
    #[error("API client not ready: {0}")]
    ClientNotReady(String),

    /// A text request body could not be decoded into a structured value
    #[error("Request body is not valid JSON: {0}")]
    InvalidRequestBody(String),

    /// The transport call completed with a failure status, or failed outright
    #[error("API call failed: {message}")]
    Invocation {
        /// HTTP status code, when the call reached the server
        status: Option<u16>,
        message: String,
    },
}
