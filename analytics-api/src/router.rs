use hyper::Method;

const RECORD_PATH: &str = "/requests/record";
const RECORD_IP_UNKNOWN_PATH: &str = "/requests/record/ipunknown";
const COUNT_PATH: &str = "/requests/get/count";
const QUERY_PATH_PREFIX: &str = "/requests/get";

/// Endpoints of the analytics API
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    /// CORS preflight, for any path
    Preflight,
    Record,
    RecordIpUnknown,
    Count,
    Query,
    NotFound,
}

impl Route {
    /// Matches a request by method and path.
    pub fn resolve(method: &Method, path: &str) -> Route {
        if method == Method::OPTIONS {
            return Route::Preflight;
        }

        match (method, path) {
            (&Method::POST, RECORD_PATH) => Route::Record,
            (&Method::POST, RECORD_IP_UNKNOWN_PATH) => Route::RecordIpUnknown,
            (&Method::GET, COUNT_PATH) => Route::Count,
            (&Method::GET, path) if path.starts_with(QUERY_PATH_PREFIX) => Route::Query,
            _ => Route::NotFound,
        }
    }

    /// Name used in logs and metric tags
    pub fn name(&self) -> &'static str {
        match self {
            Route::Preflight => "preflight",
            Route::Record => "record",
            Route::RecordIpUnknown => "record_ip_unknown",
            Route::Count => "count",
            Route::Query => "query",
            Route::NotFound => "not_found",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_matching() {
        let cases = [
            (Method::POST, "/requests/record", Route::Record),
            (
                Method::POST,
                "/requests/record/ipunknown",
                Route::RecordIpUnknown,
            ),
            (Method::GET, "/requests/get/count", Route::Count),
            (Method::GET, "/requests/get", Route::Query),
            (Method::GET, "/requests/get/", Route::Query),
            (Method::GET, "/requests/getall", Route::Query),
            (Method::OPTIONS, "/requests/record", Route::Preflight),
            (Method::OPTIONS, "/anything", Route::Preflight),
        ];

        for (method, path, expected) in cases {
            assert_eq!(Route::resolve(&method, path), expected, "{method} {path}");
        }
    }

    #[test]
    fn test_method_matching() {
        let cases = [
            (Method::GET, "/requests/record"),
            (Method::PUT, "/requests/record"),
            (Method::GET, "/requests/record/ipunknown"),
            (Method::POST, "/requests/get"),
            (Method::POST, "/requests/get/count"),
            (Method::DELETE, "/requests/get"),
        ];

        for (method, path) in cases {
            assert_eq!(
                Route::resolve(&method, path),
                Route::NotFound,
                "{method} {path}"
            );
        }
    }

    #[test]
    fn test_no_route_matched() {
        for path in ["/", "/requests", "/requests/record/other", "/health"] {
            assert_eq!(Route::resolve(&Method::GET, path), Route::NotFound, "{path}");
        }
    }
}
