/// Portal HTTP client
///
/// Owns the cookie-backed session with the e-learning portal. Every page
/// request goes through here; turning HTML into data is left to `parsers`.
use crate::config::Config;
use crate::error::{AppError, AppResult, AuthError};
use crate::models::{Course, GraderReport};
use crate::parsers::{self, CourseFilter};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use url::Url;

const LOGIN_PATH: &str = "login/index.php";
const PROFILE_PATH: &str = "user/profile.php";
const GRADER_PATH: &str = "grade/report/grader/index.php";
const BACKOFF_BASE_MS: u64 = 500;

/// Portal client
pub struct PortalClient {
    client: reqwest::Client,
    base_url: Url,
    max_retries: u32,
    assistant_roles: Vec<String>,
}

impl PortalClient {
    /// Create a client with an empty cookie jar
    pub fn new(config: &Config) -> AppResult<Self> {
        let base_url = Url::parse(&format!("{}/", config.portal_root()))
            .map_err(|e| AppError::invalid_config("base_url", e.to_string()))?;

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| AppError::request_failed(base_url.as_str(), e))?;

        Ok(Self {
            client,
            base_url,
            max_retries: config.max_retries,
            assistant_roles: config.assistant_roles.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL of a portal path
    pub fn url(&self, path: &str) -> String {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map(|u| u.to_string())
            .unwrap_or_else(|_| format!("{}{}", self.base_url, path))
    }

    /// Log in and confirm the session is authenticated
    ///
    /// # Arguments
    /// - `username`: portal account
    /// - `password`: portal password
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<()> {
        let token = self.fetch_login_token().await?;
        self.login(username, password, &token).await?;

        if !self.check_login().await? {
            return Err(AuthError::InvalidCredentials {
                username: username.to_string(),
            }
            .into());
        }

        info!("✓ Logged in as {}", username);
        Ok(())
    }

    /// Read the CSRF token the login form expects back
    pub async fn fetch_login_token(&self) -> AppResult<String> {
        let html = self.get_html(LOGIN_PATH).await?;
        let token = parsers::extract_login_token(&html)?
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::LoginTokenMissing)?;

        debug!("Login token: {}", token);
        Ok(token)
    }

    /// Post the login form; session cookies land in the client's jar
    pub async fn login(&self, username: &str, password: &str, token: &str) -> AppResult<()> {
        let url = self.url(LOGIN_PATH);
        let form = [
            ("username", username),
            ("password", password),
            ("logintoken", token),
        ];

        let response = self
            .client
            .post(&url)
            .form(&form)
            .send()
            .await
            .map_err(|e| AppError::request_failed(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::bad_status(url, status.as_u16()));
        }
        Ok(())
    }

    /// Whether the current session can open the profile page
    pub async fn check_login(&self) -> AppResult<bool> {
        let html = self.get_html(PROFILE_PATH).await?;
        Ok(parsers::is_authenticated(&html)?)
    }

    /// Courses on the dashboard that pass `filter`
    pub async fn fetch_courses(&self, filter: &CourseFilter) -> AppResult<Vec<Course>> {
        let html = self.get_html("").await?;
        let courses = parsers::parse_courses(&html, Some(&self.base_url), filter)?;

        if courses.is_empty() {
            return Err(AppError::NoCourses);
        }
        Ok(courses)
    }

    /// Participants, meetings and exams of one course
    pub async fn fetch_grader_report(&self, course_id: &str) -> AppResult<GraderReport> {
        let html = self
            .get_html(&format!("{}?id={}", GRADER_PATH, course_id))
            .await?;
        Ok(parsers::parse_grader_report(&html, &self.assistant_roles)?)
    }

    /// GET a portal page as text.
    ///
    /// Transport errors and 5xx answers are retried with exponential backoff;
    /// other statuses fail immediately.
    pub async fn get_html(&self, path: &str) -> AppResult<String> {
        let url = self.url(path);
        let mut attempt = 0u32;

        loop {
            match self.get_once(&url).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = backoff_delay(attempt);
                    warn!(
                        "Request to {} failed ({}), retry {}/{} in {:?}",
                        url, e, attempt, self.max_retries, delay
                    );
                    sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn get_once(&self, url: &str) -> AppResult<String> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::request_failed(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::bad_status(url, status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| AppError::request_failed(url, e))
    }
}

/// Wait before retry `attempt` (1-based): 500ms doubling, saturating
fn backoff_delay(attempt: u32) -> Duration {
    let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
    Duration::from_millis(BACKOFF_BASE_MS.saturating_mul(factor))
}
