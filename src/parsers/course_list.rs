use scraper::Html;
use tracing::debug;
use url::Url;

use super::{element_text, selector};
use crate::config::Config;
use crate::error::ParseError;
use crate::models::{parse_course_id, Course};

/// Which dashboard entries are real courses
#[derive(Debug, Clone, Default)]
pub struct CourseFilter {
    /// Upper-case prefixes to skip
    pub excluded_prefixes: Vec<String>,
    /// Upper-case substrings to skip
    pub excluded_keywords: Vec<String>,
}

impl CourseFilter {
    pub fn from_config(config: &Config) -> Self {
        Self {
            excluded_prefixes: upper_all(&config.excluded_course_prefixes),
            excluded_keywords: upper_all(&config.excluded_course_keywords),
        }
    }

    /// `name` must already be upper-cased
    pub fn accepts(&self, name: &str) -> bool {
        !self.excluded_prefixes.iter().any(|p| name.starts_with(p.as_str()))
            && !self.excluded_keywords.iter().any(|k| name.contains(k.as_str()))
    }
}

fn upper_all(values: &[String]) -> Vec<String> {
    values.iter().map(|v| v.to_uppercase()).collect()
}

/// Extract the courses listed on the dashboard.
///
/// # Arguments
/// - `html`: dashboard page
/// - `base_url`: used to resolve relative course links
/// - `filter`: drops activity and testing courses
///
/// # Returns
/// Courses in page order; entries without a course id are skipped
pub fn parse_courses(
    html: &str,
    base_url: Option<&Url>,
    filter: &CourseFilter,
) -> Result<Vec<Course>, ParseError> {
    let document = Html::parse_document(html);
    let heading = selector("h3.coursename")?;
    let link = selector("a")?;

    let mut courses = Vec::new();
    for entry in document.select(&heading) {
        let Some(anchor) = entry.select(&link).next() else {
            continue;
        };

        let name = element_text(anchor).to_uppercase();
        if !filter.accepts(&name) {
            debug!("Skipping course: {}", name);
            continue;
        }

        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(id) = parse_course_id(href, base_url) else {
            debug!("Course link without id: {}", href);
            continue;
        };

        let url = match base_url {
            Some(base) => base.join(href).map(|u| u.to_string()).unwrap_or_else(|_| href.to_string()),
            None => href.to_string(),
        };

        courses.push(Course { name, url, id });
    }

    Ok(courses)
}
