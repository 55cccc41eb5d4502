use crate::errors::ApiBody;
use hyper::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_MAX_AGE, HeaderMap, HeaderValue, VARY,
};
use hyper::Response;
use shared::http::full_body;

const ALLOW_METHODS: &str = "GET, POST, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type, Authorization";
// Browsers may cache a preflight for one day.
const MAX_AGE: &str = "86400";

/// Emits the CORS headers of every API response.
///
/// An empty allow-list allows any origin with `*`. Otherwise only listed origins are echoed
/// back, and other origins get no `Access-Control-Allow-Origin` at all.
#[derive(Clone, Debug)]
pub struct Cors {
    allowed_origins: Vec<String>,
}

impl Cors {
    pub fn new(allowed_origins: Vec<String>) -> Self {
        Cors { allowed_origins }
    }

    fn allow_origin(&self, origin: Option<&str>) -> Option<HeaderValue> {
        if self.allowed_origins.is_empty() {
            return Some(HeaderValue::from_static("*"));
        }

        let origin = origin?;
        if self.allowed_origins.iter().any(|allowed| allowed == origin) {
            HeaderValue::from_str(origin).ok()
        } else {
            tracing::debug!(origin, "Origin not in the allow-list");
            None
        }
    }

    /// Adds the CORS headers to a response.
    pub fn apply(&self, origin: Option<&str>, headers: &mut HeaderMap) {
        if let Some(value) = self.allow_origin(origin) {
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, value);
        }
        if !self.allowed_origins.is_empty() {
            headers.append(VARY, HeaderValue::from_static("Origin"));
        }
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        );
    }

    /// Answers an `OPTIONS` preflight request.
    pub fn preflight(&self, origin: Option<&str>) -> Response<ApiBody> {
        let mut response = Response::new(full_body(""));
        let headers = response.headers_mut();
        self.apply(origin, headers);
        headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static(MAX_AGE));
        response
    }
}
