use crate::error::{AppResult, ConfigError};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "lepkom.toml";

/// Program configuration
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Portal root, without trailing slash
    pub base_url: String,
    pub username: String,
    pub password: String,
    /// Number of courses crawled at the same time
    pub max_concurrent_courses: usize,
    /// Absences after which a participant is marked for deletion
    pub absence_limit: usize,
    /// Course names (upper-cased) starting with one of these are skipped
    pub excluded_course_prefixes: Vec<String>,
    /// Course names (upper-cased) containing one of these are skipped
    pub excluded_course_keywords: Vec<String>,
    /// Grader rows whose NPM slot holds one of these are staff, not students
    pub assistant_roles: Vec<String>,
    /// Directory receiving the course reports
    pub output_dir: String,
    /// Run log file
    pub output_log_file: String,
    /// Whether to show debug logs
    pub verbose_logging: bool,
    pub request_timeout_secs: u64,
    /// Retries for transport errors and 5xx answers
    pub max_retries: u32,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://kursusvmlepkom.gunadarma.ac.id".to_string(),
            username: String::new(),
            password: String::new(),
            max_concurrent_courses: 4,
            absence_limit: 2,
            excluded_course_prefixes: vec!["ACTIVITY".to_string()],
            excluded_course_keywords: vec!["TESTING".to_string()],
            assistant_roles: vec!["Asisten".to_string(), "PJ".to_string()],
            output_dir: "output".to_string(),
            output_log_file: "output.txt".to_string(),
            verbose_logging: false,
            request_timeout_secs: 30,
            max_retries: 2,
            user_agent: concat!("lepkom_attendance/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Config {
    /// Load defaults, then the TOML file (if any), then environment overrides.
    ///
    /// The file is `$LEPKOM_CONFIG` when set, otherwise `lepkom.toml` when it
    /// exists in the working directory.
    pub fn load() -> AppResult<Self> {
        let mut config = match std::env::var("LEPKOM_CONFIG") {
            Ok(path) => Self::from_toml_file(Path::new(&path))?,
            Err(_) if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_toml_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            Err(_) => Self::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML config file; missing keys keep their defaults
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|source| ConfigError::FileReadFailed {
                path: path.display().to_string(),
                source,
            })?;
        let config = Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::TomlParseFailed { source, .. } => ConfigError::TomlParseFailed {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::TomlParseFailed {
            path: String::new(),
            source,
        })
    }

    /// Overlay `LEPKOM_*` environment variables
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Some(v) = env_string("LEPKOM_BASE_URL") {
            self.base_url = v;
        }
        if let Some(v) = env_string("LEPKOM_USERNAME") {
            self.username = v;
        }
        if let Some(v) = env_string("LEPKOM_PASSWORD") {
            self.password = v;
        }
        if let Some(v) = env_parse("LEPKOM_MAX_CONCURRENT_COURSES", "usize")? {
            self.max_concurrent_courses = v;
        }
        if let Some(v) = env_parse("LEPKOM_ABSENCE_LIMIT", "usize")? {
            self.absence_limit = v;
        }
        if let Some(v) = env_string("LEPKOM_OUTPUT_DIR") {
            self.output_dir = v;
        }
        if let Some(v) = env_string("LEPKOM_OUTPUT_LOG_FILE") {
            self.output_log_file = v;
        }
        if let Some(v) = env_parse("LEPKOM_VERBOSE_LOGGING", "bool")? {
            self.verbose_logging = v;
        }
        if let Some(v) = env_parse("LEPKOM_REQUEST_TIMEOUT_SECS", "u64")? {
            self.request_timeout_secs = v;
        }
        if let Some(v) = env_parse("LEPKOM_MAX_RETRIES", "u32")? {
            self.max_retries = v;
        }
        Ok(())
    }

    /// Reject values the crawler cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.username.trim().is_empty() {
            return Err(ConfigError::EnvVarNotFound {
                var_name: "LEPKOM_USERNAME".to_string(),
            });
        }
        if self.password.is_empty() {
            return Err(ConfigError::EnvVarNotFound {
                var_name: "LEPKOM_PASSWORD".to_string(),
            });
        }
        if url::Url::parse(&self.base_url).is_err() {
            return Err(invalid("base_url", format!("'{}' is not a URL", self.base_url)));
        }
        if self.absence_limit == 0 {
            return Err(invalid("absence_limit", "must be at least 1"));
        }
        if self.max_concurrent_courses == 0 {
            return Err(invalid("max_concurrent_courses", "must be at least 1"));
        }
        Ok(())
    }

    /// Base URL with the trailing slash removed
    pub fn portal_root(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        reason: reason.into(),
    }
}

fn env_string(var_name: &str) -> Option<String> {
    std::env::var(var_name).ok().filter(|v| !v.is_empty())
}

fn env_parse<T: FromStr>(var_name: &str, expected_type: &str) -> Result<Option<T>, ConfigError> {
    match env_string(var_name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_credentials() -> Config {
        Config {
            username: "asisten01".to_string(),
            password: "secret".to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn test_toml_keeps_defaults_for_missing_keys() {
        let config = Config::from_toml_str(
            r#"
            username = "asisten01"
            password = "secret"
            absence_limit = 3
            assistant_roles = ["Asisten", "PJ", "Dosen"]
            "#,
        )
        .unwrap();

        assert_eq!(config.username, "asisten01");
        assert_eq!(config.absence_limit, 3);
        assert_eq!(config.assistant_roles.len(), 3);
        assert_eq!(config.max_concurrent_courses, 4);
        assert_eq!(config.base_url, "https://kursusvmlepkom.gunadarma.ac.id");
        assert_eq!(config.excluded_course_prefixes, vec!["ACTIVITY"]);
    }

    #[test]
    fn test_toml_syntax_error() {
        let err = Config::from_toml_str("username = ").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParseFailed { .. }));
    }

    #[test]
    fn test_validate_requires_credentials() {
        let err = Config::default().validate().unwrap_err();
        assert!(matches!(err, ConfigError::EnvVarNotFound { ref var_name } if var_name == "LEPKOM_USERNAME"));

        let config = Config {
            password: String::new(),
            ..with_credentials()
        };
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::EnvVarNotFound { ref var_name } if var_name == "LEPKOM_PASSWORD"
        ));

        assert!(with_credentials().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let config = Config {
            absence_limit: 0,
            ..with_credentials()
        };
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::Invalid { ref field, .. } if field == "absence_limit"
        ));

        let config = Config {
            max_concurrent_courses: 0,
            ..with_credentials()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_portal_root_trims_slash() {
        let config = Config {
            base_url: "https://portal.example.test/".to_string(),
            ..Config::default()
        };
        assert_eq!(config.portal_root(), "https://portal.example.test");
    }
}
