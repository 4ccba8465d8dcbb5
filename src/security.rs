use axum::http::{header, HeaderMap};
use subtle::ConstantTimeEq;

/// Name of the cookie carrying the admin session token.
pub const ADMIN_COOKIE: &str = "admin_token";

/// Constant-time string comparison to prevent timing attacks
/// Use this for comparing session tokens and other sensitive values
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Value of a cookie from the request's `Cookie` headers.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value storing the admin token for the admin area only.
pub fn admin_session_cookie(token: &str) -> String {
    format!(
        "{}={}; Path=/admin; HttpOnly; SameSite=Strict",
        ADMIN_COOKIE, token
    )
}

/// `Set-Cookie` value expiring the admin token.
pub fn clear_admin_session_cookie() -> String {
    format!(
        "{}=; Path=/admin; HttpOnly; SameSite=Strict; Max-Age=0",
        ADMIN_COOKIE
    )
}
