//! Cookie header helpers
//!
//! The backend authenticates with a Django session cookie and checks a
//! CSRF token that is also published as a cookie.

use percent_encoding::percent_decode_str;

/// Cookie holding the CSRF token
pub const CSRF_COOKIE: &str = "csrftoken";

/// Cookie holding the session id
pub const SESSION_COOKIE: &str = "sessionid";

/// Find a cookie in a `Cookie` header and percent-decode its value
pub fn cookie_value(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|cookie| cookie.strip_prefix(name)?.strip_prefix('='))
        .map(|value| percent_decode_str(value).decode_utf8_lossy().into_owned())
}

/// Join name/value pairs into a `Cookie` header
pub fn cookie_header<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    pairs
        .into_iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join("; ")
}
