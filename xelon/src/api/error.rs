use thiserror::Error;

use super::common::ApiErrorDetails;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error (HTTP {status}): {message}")]
    ApiError {
        status: u16,
        message: String,
        #[source]
        details: Option<Box<ApiErrorDetails>>,
    },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Authentication failed")]
    AuthError,

    #[error("Request timeout after {0} seconds")]
    Timeout(u64),

    #[error("Too many requests, rate limited")]
    RateLimited,
}

impl ApiError {
    /// HTTP status code behind this error, when the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::ApiError { status, .. } => Some(*status),
            ApiError::AuthError => Some(401),
            ApiError::RateLimited => Some(429),
            ApiError::RequestError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// The backend answers 500/503 for objects that are still being provisioned
    pub fn is_transient_provisioning(&self) -> bool {
        matches!(self.status(), Some(500) | Some(503))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http(status: u16) -> ApiError {
        ApiError::ApiError {
            status,
            message: "error".to_string(),
            details: None,
        }
    }

    #[test]
    fn transient_provisioning_allowlist_is_500_and_503_only() {
        assert!(http(500).is_transient_provisioning());
        assert!(http(503).is_transient_provisioning());

        for status in [400, 403, 404, 409, 422, 502, 504] {
            assert!(!http(status).is_transient_provisioning(), "{}", status);
        }
        assert!(!ApiError::AuthError.is_transient_provisioning());
        assert!(!ApiError::RateLimited.is_transient_provisioning());
        assert!(!ApiError::Timeout(30).is_transient_provisioning());
    }

    #[test]
    fn not_found_detection() {
        assert!(http(404).is_not_found());
        assert!(!http(500).is_not_found());
        assert!(!ApiError::ParseError("bad".into()).is_not_found());
    }

    #[test]
    fn auth_error_reports_401() {
        assert_eq!(ApiError::AuthError.status(), Some(401));
    }
}
