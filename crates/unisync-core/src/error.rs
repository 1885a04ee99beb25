// ── Core error types ──
//
// Errors raised by the reconciliation engine. Transport-level failures
// from unisync-api are translated into domain variants by the
// `From<unisync_api::Error>` impl; per-controller failures are wrapped in
// `ControllerFetch` / `ControllerApply` so the cycle report can attribute them.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Record model ─────────────────────────────────────────────────
    #[error("Unsupported record type: {record_type}")]
    UnsupportedRecordType { record_type: String },

    #[error("Malformed record '{domain}': {reason}")]
    MalformedRecord { domain: String, reason: String },

    // ── Per-controller failures ──────────────────────────────────────
    #[error("Fetch from controller '{controller}' failed: {source}")]
    ControllerFetch {
        controller: String,
        #[source]
        source: Box<CoreError>,
    },

    #[error("{action} of '{identity}' on controller '{controller}' failed: {source}")]
    ControllerApply {
        controller: String,
        action: String,
        identity: String,
        #[source]
        source: Box<CoreError>,
    },

    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to controller at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Controller request timed out")]
    Timeout,

    #[error("Site not found: {name} (available: {})", available.join(", "))]
    SiteNotFound { name: String, available: Vec<String> },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// The API-specific error code (e.g., "api.dns.policy.validation.overlap-with-local-dns").
        code: Option<String>,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Cycle errors ─────────────────────────────────────────────────
    #[error("No controllers configured")]
    NoControllers,

    #[error("Controller '{id}' is configured more than once")]
    DuplicateController { id: String },

    #[error("Sync cycle cancelled")]
    Cancelled,

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Returns `true` if the next cycle may succeed where this one failed.
    ///
    /// Model and configuration errors are permanent; everything that
    /// depends on the controller being reachable is worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ControllerFetch { source, .. } | Self::ControllerApply { source, .. } => {
                source.is_retryable()
            }
            Self::ConnectionFailed { .. } | Self::Timeout | Self::Cancelled => true,
            Self::Api { status, .. } => status.is_none_or(|s| s == 429 || s >= 500),
            _ => false,
        }
    }

    /// The Integration API error code carried by this error, if any.
    pub fn api_code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => code.as_deref(),
            Self::ControllerFetch { source, .. } | Self::ControllerApply { source, .. } => {
                source.api_code()
            }
            _ => None,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<unisync_api::Error> for CoreError {
    fn from(err: unisync_api::Error) -> Self {
        use unisync_api::Error as Api;

        match err {
            Api::MalformedApiKey { reason } => CoreError::AuthenticationFailed { message: reason },
            Api::InvalidApiKey => CoreError::AuthenticationFailed {
                message: "Invalid API key".into(),
            },
            Api::Http(e) if e.is_timeout() => CoreError::Timeout,
            Api::Http(e) if e.is_connect() => CoreError::ConnectionFailed {
                url: e
                    .url()
                    .map_or_else(|| "<unknown>".into(), ToString::to_string),
                reason: e.to_string(),
            },
            Api::Http(e) => CoreError::Api {
                message: e.to_string(),
                code: None,
                status: e.status().map(|s| s.as_u16()),
            },
            Api::Url(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            Api::Tls(reason) => CoreError::ConnectionFailed {
                url: String::new(),
                reason,
            },
            Api::Rejected {
                status,
                code,
                message,
            } => CoreError::Api {
                message,
                code,
                status: Some(status),
            },
            Api::Decode { message, .. } => {
                CoreError::Internal(format!("Unexpected controller response: {message}"))
            }
        }
    }
}
