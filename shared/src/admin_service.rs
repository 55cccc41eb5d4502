use crate::http::{make_boxed_error_response, text_response};
use http_body_util::combinators::BoxBody;
use hyper::body::{Bytes, Incoming};
use hyper::service::Service;
use hyper::{Method, Request, Response, StatusCode};
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;

/// Serves the health and readiness probes on the admin listener.
pub struct AdminService<F, E> {
    is_ready: F,
    _error: PhantomData<fn() -> E>,
}

impl<F, E> AdminService<F, E>
where
    F: Fn() -> bool,
{
    pub fn new(is_ready: F) -> Self {
        Self {
            is_ready,
            _error: PhantomData,
        }
    }

    fn respond<B>(&self, req: &Request<B>) -> Response<BoxBody<Bytes, E>> {
        if req.method() != Method::GET {
            return make_boxed_error_response(StatusCode::NOT_FOUND);
        }

        match req.uri().path() {
            "/health" => text_response(StatusCode::OK, "ok\n"),
            "/ready" => match (self.is_ready)() {
                true => text_response(StatusCode::OK, "ok\n"),
                false => make_boxed_error_response(StatusCode::SERVICE_UNAVAILABLE),
            },
            _ => make_boxed_error_response(StatusCode::NOT_FOUND),
        }
    }
}

impl<F, E> Service<Request<Incoming>> for AdminService<F, E>
where
    F: Fn() -> bool,
    E: Send + 'static,
{
    type Response = Response<BoxBody<Bytes, E>>;
    type Error = E;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let res = self.respond(&req);
        Box::pin(async move { Ok(res) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn get(path: &str) -> Request<()> {
        Request::builder().uri(path).body(()).unwrap()
    }

    #[test]
    fn test_health_and_ready() {
        let ready = Arc::new(AtomicBool::new(false));
        let ready_clone = ready.clone();
        let admin: AdminService<_, Infallible> =
            AdminService::new(move || ready_clone.load(Ordering::Relaxed));

        assert_eq!(admin.respond(&get("/health")).status(), StatusCode::OK);
        assert_eq!(
            admin.respond(&get("/ready")).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );

        ready.store(true, Ordering::Relaxed);
        assert_eq!(admin.respond(&get("/ready")).status(), StatusCode::OK);
        assert_eq!(admin.respond(&get("/other")).status(), StatusCode::NOT_FOUND);
    }
}
