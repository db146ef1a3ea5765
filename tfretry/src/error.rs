//! Error types for tfretry

/// Error type for tfretry operations
#[derive(Debug, thiserror::Error)]
pub enum TfretryError {
    #[error("Provider not configured")]
    ProviderNotConfigured,
}

/// Result type alias for tfretry operations
pub type Result<T> = std::result::Result<T, TfretryError>;
