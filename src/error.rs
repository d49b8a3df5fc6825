use std::fmt;

/// Top-level error type for the integration client
#[derive(Debug)]
pub enum Cin7Error {
    /// REST channel errors
    Api(ApiError),
    /// Browser session / login errors
    Browser(BrowserError),
    /// Per-item UI workflow errors
    Workflow(WorkflowError),
    /// Configuration errors
    Config(ConfigError),
    /// Anything else (wrapping third-party errors)
    Other(String),
}

impl fmt::Display for Cin7Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cin7Error::Api(e) => write!(f, "API error: {}", e),
            Cin7Error::Browser(e) => write!(f, "browser error: {}", e),
            Cin7Error::Workflow(e) => write!(f, "workflow error: {}", e),
            Cin7Error::Config(e) => write!(f, "configuration error: {}", e),
            Cin7Error::Other(msg) => write!(f, "error: {}", msg),
        }
    }
}

impl std::error::Error for Cin7Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Cin7Error::Api(e) => Some(e),
            Cin7Error::Browser(e) => Some(e),
            Cin7Error::Workflow(e) => Some(e),
            Cin7Error::Config(e) => Some(e),
            Cin7Error::Other(_) => None,
        }
    }
}

/// REST channel errors
#[derive(Debug)]
pub enum ApiError {
    /// The request never completed at the HTTP level
    RequestFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The vendor returned a non-2xx status other than 429
    BadStatus {
        path: String,
        status: u16,
        body: String,
    },
    /// 429 retries exhausted
    RateLimited {
        path: String,
        attempts: u32,
    },
    /// Every rotation key is at or over its call quota
    QuotaExhausted,
    /// The vendor acknowledged the upsert but reported failure
    UpsertRejected {
        errors: Vec<String>,
    },
    /// Response body could not be parsed as JSON
    JsonParseFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::RequestFailed { path, source } => {
                write!(f, "request to {} failed: {}", path, source)
            }
            ApiError::BadStatus { path, status, body } => {
                write!(f, "{} returned status {}: {}", path, status, body)
            }
            ApiError::RateLimited { path, attempts } => {
                write!(f, "{} still rate limited after {} attempts", path, attempts)
            }
            ApiError::QuotaExhausted => {
                write!(f, "all API keys have reached their call quota")
            }
            ApiError::UpsertRejected { errors } => {
                write!(f, "{}", errors.join(", "))
            }
            ApiError::JsonParseFailed { source } => {
                write!(f, "failed to parse response body: {}", source)
            }
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::RequestFailed { source, .. } | ApiError::JsonParseFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// Browser session / login errors
#[derive(Debug)]
pub enum BrowserError {
    /// Launching the headless browser failed
    LaunchFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// Browser configuration was rejected
    ConfigurationFailed {
        message: String,
    },
    /// The login attempt did not land where expected
    LoginFailed {
        url: String,
    },
    /// The one-time-code submission did not navigate
    TwoFactorFailed,
    /// Navigation to a URL failed
    NavigationFailed {
        url: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// A devtools command failed
    CommandFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for BrowserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrowserError::LaunchFailed { source } => {
                write!(f, "failed to launch browser: {}", source)
            }
            BrowserError::ConfigurationFailed { message } => {
                write!(f, "browser configuration failed: {}", message)
            }
            BrowserError::LoginFailed { url } => {
                write!(f, "Failed to login (landed on {})", url)
            }
            BrowserError::TwoFactorFailed => write!(f, "Failed to login twofa"),
            BrowserError::NavigationFailed { url, source } => {
                write!(f, "failed to navigate to {}: {}", url, source)
            }
            BrowserError::CommandFailed { source } => {
                write!(f, "browser command failed: {}", source)
            }
        }
    }
}

impl std::error::Error for BrowserError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BrowserError::LaunchFailed { source }
            | BrowserError::NavigationFailed { source, .. }
            | BrowserError::CommandFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// Per-item UI workflow errors
#[derive(Debug)]
pub enum WorkflowError {
    /// An expected element never appeared
    SelectorTimeout {
        selector: String,
        waited_ms: u64,
    },
    /// A navigation did not complete in time
    NavigationTimeout {
        waited_ms: u64,
    },
    /// A page script returned something unusable
    EvalFailed {
        detail: String,
    },
}

impl fmt::Display for WorkflowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowError::SelectorTimeout {
                selector,
                waited_ms,
            } => {
                write!(
                    f,
                    "element {} did not appear within {}ms",
                    selector, waited_ms
                )
            }
            WorkflowError::NavigationTimeout { waited_ms } => {
                write!(f, "navigation did not complete within {}ms", waited_ms)
            }
            WorkflowError::EvalFailed { detail } => {
                write!(f, "page script failed: {}", detail)
            }
        }
    }
}

impl std::error::Error for WorkflowError {}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
    /// UI operations require the UI credential bundle
    UiCredentialsMissing,
    /// Key rotation is enabled but no counter collaborator was supplied
    RotationCounterMissing,
    /// A batch item declared an unknown timezone
    InvalidTimezone {
        value: String,
    },
    /// The shared TOTP secret is unusable
    InvalidOtpSecret {
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UiCredentialsMissing => {
                write!(
                    f,
                    "UI credentials not initialized. Construct the client with ui credentials first"
                )
            }
            ConfigError::RotationCounterMissing => {
                write!(
                    f,
                    "key rotation is enabled but no rotation counter was provided"
                )
            }
            ConfigError::InvalidTimezone { value } => {
                write!(f, "unknown timezone: {}", value)
            }
            ConfigError::InvalidOtpSecret { reason } => {
                write!(f, "invalid TOTP secret: {}", reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ========== conversions from common error types ==========

impl From<chromiumoxide::error::CdpError> for Cin7Error {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        Cin7Error::Browser(BrowserError::CommandFailed {
            source: Box::new(err),
        })
    }
}

impl From<reqwest::Error> for Cin7Error {
    fn from(err: reqwest::Error) -> Self {
        let path = err.url().map(|u| u.path().to_string()).unwrap_or_default();
        Cin7Error::Api(ApiError::RequestFailed {
            path,
            source: Box::new(err),
        })
    }
}

impl From<serde_json::Error> for Cin7Error {
    fn from(err: serde_json::Error) -> Self {
        Cin7Error::Api(ApiError::JsonParseFailed {
            source: Box::new(err),
        })
    }
}

// ========== convenience constructors ==========

impl Cin7Error {
    pub fn selector_timeout(selector: impl Into<String>, waited_ms: u64) -> Self {
        Cin7Error::Workflow(WorkflowError::SelectorTimeout {
            selector: selector.into(),
            waited_ms,
        })
    }

    pub fn navigation_timeout(waited_ms: u64) -> Self {
        Cin7Error::Workflow(WorkflowError::NavigationTimeout { waited_ms })
    }

    pub fn eval_failed(detail: impl Into<String>) -> Self {
        Cin7Error::Workflow(WorkflowError::EvalFailed {
            detail: detail.into(),
        })
    }

    pub fn bad_status(path: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Cin7Error::Api(ApiError::BadStatus {
            path: path.into(),
            status,
            body: body.into(),
        })
    }

    pub fn navigation_failed(
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Cin7Error::Browser(BrowserError::NavigationFailed {
            url: url.into(),
            source: Box::new(source),
        })
    }
}

// ========== Result alias ==========

/// Result type used across the crate
pub type Result<T> = std::result::Result<T, Cin7Error>;
