//! Page extractors
//!
//! Pure functions turning portal HTML into model values. No I/O happens here;
//! the portal client fetches, these read.

pub mod course_list;
pub mod grader_report;
pub mod login_page;

pub use course_list::{parse_courses, CourseFilter};
pub use grader_report::{parse_grader_report, parse_student_label};
pub use login_page::{extract_login_token, is_authenticated};

use crate::error::ParseError;
use scraper::{ElementRef, Selector};

/// Compile a CSS selector, mapping failures to [`ParseError`]
pub(crate) fn selector(css: &str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|e| ParseError::InvalidSelector {
        selector: css.to_string(),
        message: e.to_string(),
    })
}

/// Element text with whitespace runs collapsed
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
