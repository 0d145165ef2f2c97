//! Cross-origin allow-listing.
//!
//! [`AllowList::is_origin_allowed`] decides once per request, in
//! [`enforce_origin`], whether a browser caller may reach the handlers at all.
//! Permitted callers then get the usual CORS headers from [`cors_layer`].

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, HeaderValue, Method};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tower_http::cors::{AllowOrigin, CorsLayer};

use super::types::ApiError;

/// Includes the server's own default origin so a client served from
/// `STATIC_DIR` can write.
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://localhost:3001,http://localhost:5173";
pub const DEFAULT_ALLOWED_SUFFIXES: &str = ".vercel.app,.onrender.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowList {
    exact: Vec<String>,
    suffixes: Vec<String>,
}

impl AllowList {
    /// `suffixes` are host suffixes such as `.vercel.app`; a missing leading
    /// dot is added so that `evilvercel.app` never matches.
    pub fn new(exact: Vec<String>, suffixes: Vec<String>) -> Self {
        let suffixes = suffixes
            .into_iter()
            .map(|s| if s.starts_with('.') { s } else { format!(".{s}") })
            .collect();
        Self { exact, suffixes }
    }

    /// Requests without an `Origin` header are not cross-origin and pass.
    pub fn is_origin_allowed(&self, origin: Option<&str>) -> bool {
        let Some(origin) = origin else { return true };
        if self.exact.iter().any(|allowed| allowed == origin) {
            return true;
        }
        let Some(host) = origin_host(origin) else { return false };
        self.suffixes
            .iter()
            .any(|suffix| host.len() > suffix.len() && host.ends_with(suffix.as_str()))
    }
}

impl Default for AllowList {
    fn default() -> Self {
        Self::new(split_list(DEFAULT_ALLOWED_ORIGINS), split_list(DEFAULT_ALLOWED_SUFFIXES))
    }
}

/// Splits a comma separated setting, dropping blanks.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from).collect()
}

/// `scheme://host[:port]` -> `host`, for http and https only.
fn origin_host(origin: &str) -> Option<&str> {
    let rest = origin.strip_prefix("https://").or_else(|| origin.strip_prefix("http://"))?;
    let host = match rest.rsplit_once(':') {
        Some((host, port)) if !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()) => host,
        Some(_) => return None,
        None => rest,
    };
    if host.is_empty() || host.contains('/') { None } else { Some(host) }
}

pub async fn enforce_origin(State(allow): State<Arc<AllowList>>, req: Request, next: Next) -> Response {
    let origin = match req.headers().get(header::ORIGIN).map(HeaderValue::to_str) {
        None => None,
        Some(Ok(origin)) => Some(origin),
        Some(Err(_)) => return ApiError::OriginNotAllowed.into_response(),
    };
    if !allow.is_origin_allowed(origin) {
        tracing::warn!(origin = origin.unwrap_or_default(), "rejected cross-origin request");
        return ApiError::OriginNotAllowed.into_response();
    }
    next.run(req).await
}

pub fn cors_layer(allow: Arc<AllowList>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _| {
            origin.to_str().map(|o| allow.is_origin_allowed(Some(o))).unwrap_or(false)
        }))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}
