use crate::cors::Cors;
use crate::errors::{ApiBody, ApiError};
use crate::handlers::Handlers;
use crate::metrics_defs::{REQUEST_DURATION, REQUESTS_INFLIGHT};
use crate::router::Route;
use hyper::body::{Body, Bytes, Incoming};
use hyper::header::ORIGIN;
use hyper::service::Service;
use hyper::{Request, Response};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

/// The public analytics API.
#[derive(Clone)]
pub struct AnalyticsService {
    handlers: Arc<Handlers>,
    cors: Arc<Cors>,
}

impl AnalyticsService {
    pub fn new(handlers: Handlers, cors: Cors) -> Self {
        AnalyticsService {
            handlers: Arc::new(handlers),
            cors: Arc::new(cors),
        }
    }

    /// Serves one request. Errors are turned into responses here, so this never fails.
    pub async fn handle<B>(&self, req: Request<B>) -> Response<ApiBody>
    where
        B: Body<Data = Bytes>,
        B::Error: std::fmt::Display,
    {
        let start = Instant::now();
        let _inflight = InflightGuard::new();

        let route = Route::resolve(req.method(), req.uri().path());
        let origin = req
            .headers()
            .get(ORIGIN)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        let result = match route {
            Route::Preflight => Ok(self.cors.preflight(origin.as_deref())),
            Route::Record => self.handlers.record(req).await,
            Route::RecordIpUnknown => self.handlers.record_ip_unknown(req).await,
            Route::Count => self.handlers.count(req).await,
            Route::Query => self.handlers.query(req).await,
            Route::NotFound => Err(ApiError::NotFound),
        };

        let mut response = match result {
            Ok(response) => response,
            Err(e) => {
                if e.status().is_server_error() {
                    tracing::error!(
                        error = &e as &dyn std::error::Error,
                        route = route.name(),
                        "Request failed"
                    );
                } else {
                    tracing::debug!(error = %e, route = route.name(), "Request rejected");
                }
                e.into_response()
            }
        };

        // Preflight responses carry their CORS headers already.
        if route != Route::Preflight {
            self.cors.apply(origin.as_deref(), response.headers_mut());
        }

        shared::histogram!(
            REQUEST_DURATION,
            "route" => route.name(),
            "status" => response.status().as_u16().to_string(),
        )
        .record(start.elapsed().as_secs_f64());

        response
    }
}

/// Counts a request in `requests.inflight` until dropped, including when the client goes
/// away and the request future is dropped mid-flight.
struct InflightGuard;

impl InflightGuard {
    fn new() -> Self {
        shared::gauge!(REQUESTS_INFLIGHT).increment(1.0);
        InflightGuard
    }
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        shared::gauge!(REQUESTS_INFLIGHT).decrement(1.0);
    }
}

impl Service<Request<Incoming>> for AnalyticsService {
    type Response = Response<ApiBody>;
    type Error = ApiError;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let service = self.clone();
        Box::pin(async move { Ok(service.handle(req).await) })
    }
}
