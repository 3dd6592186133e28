use serde::{Deserialize, Serialize};
use url::Url;

/// A course listed on the portal dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Upper-cased, trimmed link text
    pub name: String,
    pub url: String,
    /// Value of the `id` query parameter
    pub id: String,
}

impl std::fmt::Display for Course {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (id={})", self.name, self.id)
    }
}

/// Extract the `id` query parameter from a course link.
///
/// Relative links are resolved against `base` when given. Returns `None`
/// when the link cannot be parsed or carries no non-empty `id`.
pub fn parse_course_id(href: &str, base: Option<&Url>) -> Option<String> {
    let url = match base {
        Some(base) => base.join(href).ok()?,
        None => Url::parse(href).ok()?,
    };

    url.query_pairs()
        .find(|(key, _)| key == "id")
        .map(|(_, value)| value.into_owned())
        .filter(|id| !id.is_empty())
}
