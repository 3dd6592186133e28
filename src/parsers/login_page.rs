use scraper::Html;

use super::selector;
use crate::error::ParseError;

const LOGIN_TOKEN_SELECTOR: &str = r#"input[name="logintoken"]"#;

/// Value of the `logintoken` hidden input, if the page has one
pub fn extract_login_token(html: &str) -> Result<Option<String>, ParseError> {
    let document = Html::parse_document(html);
    let token = selector(LOGIN_TOKEN_SELECTOR)?;

    Ok(document
        .select(&token)
        .filter_map(|input| input.value().attr("value"))
        .map(str::to_string)
        .next())
}

/// Whether `html` is a page served to a logged-in user.
///
/// The portal redirects anonymous requests to the login form, which always
/// carries a non-empty login token.
pub fn is_authenticated(html: &str) -> Result<bool, ParseError> {
    Ok(!extract_login_token(html)?.is_some_and(|token| !token.is_empty()))
}
