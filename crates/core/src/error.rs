//! Error types for the shuttlechat domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each external collaborator has its own error enum.

use thiserror::Error;

/// The top-level error type for all shuttlechat operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Knowledge errors ---
    #[error("Knowledge error: {0}")]
    Knowledge(#[from] KnowledgeError),

    // --- Broadcast errors ---
    #[error("Broadcast error: {0}")]
    Broadcast(#[from] BroadcastError),

    // --- Input validation ---
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Collaborator errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Clone, Error)]
pub enum KnowledgeError {
    #[error("Knowledge lookup failed: {0}")]
    LookupFailed(String),

    #[error("Location search failed: {0}")]
    LocationSearchFailed(String),

    #[error("Failed to load knowledge corpus from {path}: {reason}")]
    CorpusLoad { path: String, reason: String },
}

#[derive(Debug, Clone, Error)]
pub enum BroadcastError {
    #[error("Publish failed: {0}")]
    PublishFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn knowledge_error_converts_into_top_level() {
        let err: Error = KnowledgeError::CorpusLoad {
            path: "/tmp/corpus.json".into(),
            reason: "missing field `topics`".into(),
        }
        .into();
        assert!(matches!(err, Error::Knowledge(_)));
        assert!(err.to_string().contains("corpus.json"));
    }

    #[test]
    fn invalid_input_message() {
        let err = Error::InvalidInput("message must not be empty".into());
        assert_eq!(err.to_string(), "Invalid input: message must not be empty");
    }
}
