use thiserror::Error;

/// Errors raised while talking to a controller's Integration API.
///
/// `unisync-core` folds these into per-controller fetch and apply failures.
#[derive(Debug, Error)]
pub enum Error {
    /// The configured key is not a valid header value.
    #[error("API key is not usable as a header: {reason}")]
    MalformedApiKey { reason: String },

    /// The controller answered 401.
    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// CA bundle unreadable or client construction failed.
    #[error("TLS setup failed: {0}")]
    Tls(String),

    /// Non-success response, with the controller's error code when it sent one.
    #[error("Controller rejected request (HTTP {status}): {message}")]
    Rejected {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// A success response whose body did not match the expected shape.
    #[error("Unexpected response body: {message}")]
    Decode { message: String, body: String },
}

impl Error {
    /// The controller's machine-readable error code, e.g.
    /// `api.dns.policy.validation.overlap-with-local-dns`.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Rejected { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// HTTP status of a rejected request.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_only_on_rejections() {
        let rejected = Error::Rejected {
            status: 400,
            code: Some("api.dns.policy.validation.cname-alias-overlap".into()),
            message: "overlap".into(),
        };
        assert_eq!(
            rejected.code(),
            Some("api.dns.policy.validation.cname-alias-overlap")
        );
        assert_eq!(rejected.status(), Some(400));

        assert_eq!(Error::InvalidApiKey.code(), None);
        assert_eq!(Error::Tls("bad pem".into()).status(), None);
    }
}
