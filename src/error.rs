use thiserror::Error;

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    /// HTTP transport or status errors
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),
    /// Login flow errors
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),
    /// HTML extraction errors
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    /// Configuration errors
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    /// The dashboard listed no course that passed the filter
    #[error("no courses found")]
    NoCourses,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// HTTP errors
#[derive(Debug, Error)]
pub enum HttpError {
    /// Request could not be sent or the body could not be read
    #[error("request to {url} failed: {source}")]
    RequestFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// Server answered with a non-success status
    #[error("{url} answered with status {status}")]
    BadStatus { url: String, status: u16 },
}

/// Login errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// The login page carried no `logintoken` input
    #[error("login token not found on the login page")]
    LoginTokenMissing,
    /// The profile page still shows a login form after posting credentials
    #[error("username or password is incorrect (user: {username})")]
    InvalidCredentials { username: String },
}

/// HTML extraction errors
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid CSS selector `{selector}`: {message}")]
    InvalidSelector { selector: String, message: String },
    #[error("invalid pattern `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable missing
    #[error("environment variable {var_name} is not set")]
    EnvVarNotFound { var_name: String },
    /// Environment variable present but not parseable
    #[error("environment variable {var_name}: value '{value}' is not a valid {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    #[error("cannot read config file {path}: {source}")]
    FileReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse config file {path}: {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// Value present but outside what the crawler accepts
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: String, reason: String },
}

// ========== Convenience constructors ==========

impl AppError {
    /// Wrap a reqwest failure for the given URL
    pub fn request_failed(url: impl Into<String>, source: reqwest::Error) -> Self {
        AppError::Http(HttpError::RequestFailed {
            url: url.into(),
            source,
        })
    }

    /// Non-success HTTP status
    pub fn bad_status(url: impl Into<String>, status: u16) -> Self {
        AppError::Http(HttpError::BadStatus {
            url: url.into(),
            status,
        })
    }

    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::Config(ConfigError::Invalid {
            field: field.into(),
            reason: reason.into(),
        })
    }

    /// Whether retrying the same request could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::Http(HttpError::RequestFailed { .. }) => true,
            AppError::Http(HttpError::BadStatus { status, .. }) => *status >= 500,
            _ => false,
        }
    }
}

// ========== Result alias ==========

/// Result type for the library layers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_server_errors_are_retryable() {
        assert!(AppError::bad_status("https://example.test/", 502).is_retryable());
        assert!(!AppError::bad_status("https://example.test/", 404).is_retryable());
        assert!(!AppError::NoCourses.is_retryable());
        assert!(!AppError::Auth(AuthError::LoginTokenMissing).is_retryable());
    }

    #[test]
    fn test_display_nests_inner_message() {
        let err = AppError::invalid_config("absence_limit", "must be at least 1");
        assert_eq!(
            err.to_string(),
            "config error: invalid value for absence_limit: must be at least 1"
        );
    }
}
