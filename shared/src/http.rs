use http::header::{CONTENT_TYPE, HeaderValue};
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::service::{Service, service_fn};
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioExecutor;
use hyper_util::rt::TokioIo;
use hyper_util::server::conn::auto::Builder;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Address of the client on the other end of the connection.
///
/// Inserted into the extensions of every request served by [`run_http_service`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PeerAddr(pub SocketAddr);

pub async fn run_http_service<S, E>(host: &str, port: u16, service: S) -> Result<(), E>
where
    S: Service<Request<Incoming>, Response = Response<BoxBody<Bytes, E>>, Error = E>
        + Send
        + Sync
        + 'static,
    S::Future: Send + 'static,
    E: From<std::io::Error> + std::error::Error + Send + Sync + 'static,
{
    let listener = TcpListener::bind(format!("{host}:{port}")).await?;
    tracing::info!(host, port, "Listening");
    let service_arc = Arc::new(service);

    loop {
        let (stream, peer_addr) = listener.accept().await?;
        let _ = stream.set_nodelay(true);
        let io = TokioIo::new(stream);
        let svc = service_arc.clone();

        let conn_svc = service_fn(move |mut req: Request<Incoming>| {
            req.extensions_mut().insert(PeerAddr(peer_addr));
            svc.call(req)
        });

        // Hand the connection to hyper; auto-detect h1/h2 on this socket
        tokio::spawn(async move {
            if let Err(e) = Builder::new(TokioExecutor::new())
                .serve_connection(io, conn_svc)
                .await
            {
                tracing::debug!(error = %e, peer = %peer_addr, "Connection closed with error");
            }
        });
    }
}

/// Wraps a complete payload into the boxed body type used by all services.
pub fn full_body<E>(bytes: impl Into<Bytes>) -> BoxBody<Bytes, E> {
    Full::new(bytes.into()).map_err(|e| match e {}).boxed()
}

/// Response carrying the canonical reason phrase of `status_code` as a plain text body.
pub fn make_boxed_error_response<E>(status_code: StatusCode) -> Response<BoxBody<Bytes, E>> {
    let message = status_code
        .canonical_reason()
        .unwrap_or("an error occurred");

    text_response(status_code, message)
}

pub fn text_response<E>(
    status_code: StatusCode,
    body: impl Into<Bytes>,
) -> Response<BoxBody<Bytes, E>> {
    let mut response = Response::new(full_body(body));
    *response.status_mut() = status_code;
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}

pub fn json_response<T: Serialize, E>(
    status_code: StatusCode,
    value: &T,
) -> Result<Response<BoxBody<Bytes, E>>, serde_json::Error> {
    let bytes = serde_json::to_vec(value)?;
    let mut response = Response::new(full_body(bytes));
    *response.status_mut() = status_code;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(response)
}
