//! Request plumbing: session token and client origin extraction.

use std::net::IpAddr;

use axum::http::HeaderMap;
use axum::http::header::{AUTHORIZATION, COOKIE};

/// Name of the session cookie set by the auth callback.
pub const SESSION_COOKIE: &str = "fl_session";

/// Pull the session token from `Authorization: Bearer …` or, failing
/// that, the session cookie.
#[must_use]
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty());
    if bearer.is_some() {
        return bearer;
    }
    headers
        .get(COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|cookies| {
            cookies.split(';').map(str::trim).find_map(|pair| {
                pair.strip_prefix(SESSION_COOKIE)
                    .and_then(|rest| rest.strip_prefix('='))
            })
        })
        .filter(|token| !token.is_empty())
}

/// Best-effort client network origin: first `X-Forwarded-For` hop, then
/// `X-Real-IP`. Behind the platform proxy these are always present.
#[must_use]
pub fn client_ip(headers: &HeaderMap) -> Option<IpAddr> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|raw| raw.split(',').next())
        .and_then(|first| first.trim().parse().ok());
    if forwarded.is_some() {
        return forwarded;
    }
    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .and_then(|raw| raw.trim().parse().ok())
}

/// The rate-limit key for this client. Unattributable callers share one
/// bucket rather than bypassing the limiter.
#[must_use]
pub fn client_key(headers: &HeaderMap) -> String {
    client_ip(headers).map_or_else(|| "unknown".to_string(), |ip| ip.to_string())
}
