//! Caller address resolution from proxy headers
//!
//! The address is advisory. It is whatever the nearest proxy claims and is
//! only ever written to the ledger.

use crate::types::CallerAddress;
use axum::http::HeaderMap;

/// Header set by most reverse proxies, possibly holding a comma separated chain
pub const FORWARDED_FOR: &str = "x-forwarded-for";

/// Header set by nginx-style proxies
pub const REAL_IP: &str = "x-real-ip";

/// Resolve the caller address from request headers
///
/// Prefers the first entry of `X-Forwarded-For`, then `X-Real-IP`, then
/// falls back to [`CallerAddress::unknown`].
///
/// # Examples
///
/// ```
/// use axum::http::HeaderMap;
/// use yt_fetch::api::resolve_caller;
///
/// let mut headers = HeaderMap::new();
/// headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
/// assert_eq!(resolve_caller(&headers).to_string(), "203.0.113.7");
/// ```
pub fn resolve_caller(headers: &HeaderMap) -> CallerAddress {
    let forwarded = headers
        .get(FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let real_ip = || {
        headers
            .get(REAL_IP)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    match forwarded.or_else(real_ip) {
        Some(addr) => CallerAddress(addr.to_string()),
        None => CallerAddress::unknown(),
    }
}
