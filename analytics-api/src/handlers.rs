use crate::auth::authorize;
use crate::country::CountryResolver;
use crate::errors::{ApiBody, ApiError};
use crate::metrics_defs::{COUNTRY_LOOKUP_FAILURES, STORE_READ_FAILURES};
use http_body_util::BodyExt;
use hyper::body::{Body, Bytes};
use hyper::{Request, Response, StatusCode};
use request_store::validator::{validate, validate_with_country};
use request_store::{QueryParams, RequestStore};
use serde::Serialize;
use serde_json::{Map, Value};
use shared::http::{PeerAddr, json_response, text_response};
use std::sync::Arc;

/// Country stored when the request's origin could not be determined
pub const UNKNOWN_COUNTRY: &str = "unknown";

#[derive(Serialize)]
struct CountResponse {
    count: u64,
}

/// Everything the handlers need to serve a request.
pub struct Handlers {
    store: Arc<dyn RequestStore>,
    secret: String,
    resolver: Arc<dyn CountryResolver>,
}

impl Handlers {
    pub fn new(
        store: Arc<dyn RequestStore>,
        secret: String,
        resolver: Arc<dyn CountryResolver>,
    ) -> Self {
        Handlers {
            store,
            secret,
            resolver,
        }
    }

    /// `POST /requests/record`
    pub async fn record<B>(&self, req: Request<B>) -> Result<Response<ApiBody>, ApiError>
    where
        B: Body<Data = Bytes>,
        B::Error: std::fmt::Display,
    {
        authorize(req.headers(), &self.secret)?;

        let fields = read_json_object(req.into_body()).await?;
        let record = validate(&fields)?;

        self.store
            .append(&record)
            .await
            .map_err(ApiError::StoreWrite)?;

        tracing::debug!(domain = %record.domain, path = %record.path, "Recorded request");
        Ok(text_response(StatusCode::OK, "Recorded"))
    }

    /// `POST /requests/record/ipunknown`
    ///
    /// The client does not know where its visitor came from, so the country is resolved
    /// here. A `country` field in the body is ignored.
    pub async fn record_ip_unknown<B>(
        &self,
        req: Request<B>,
    ) -> Result<Response<ApiBody>, ApiError>
    where
        B: Body<Data = Bytes>,
        B::Error: std::fmt::Display,
    {
        authorize(req.headers(), &self.secret)?;

        let peer = req.extensions().get::<PeerAddr>().map(|peer| peer.0);
        let (parts, body) = req.into_parts();
        let fields = read_json_object(body).await?;

        // Client fields are checked before any country lookup.
        let mut record = validate_with_country(&fields, UNKNOWN_COUNTRY)?;
        match self.resolver.resolve(&parts.headers, peer).await {
            Some(country) => record.country = country,
            None => shared::counter!(COUNTRY_LOOKUP_FAILURES).increment(1),
        }

        self.store
            .append(&record)
            .await
            .map_err(ApiError::StoreWrite)?;

        tracing::debug!(domain = %record.domain, country = %record.country, "Recorded request");
        Ok(text_response(StatusCode::OK, "Recorded"))
    }

    /// `GET /requests/get/count`
    pub async fn count<B>(&self, _req: Request<B>) -> Result<Response<ApiBody>, ApiError> {
        let count = match self.store.count().await {
            Ok(count) => count,
            Err(e) => {
                self.read_failed("count", &e);
                0
            }
        };

        Ok(json_response(StatusCode::OK, &CountResponse { count })?)
    }

    /// `GET /requests/get`
    pub async fn query<B>(&self, req: Request<B>) -> Result<Response<ApiBody>, ApiError> {
        let QueryParams { filter, page } = QueryParams::from_query(req.uri().query());

        let records = match self.store.query(&filter, &page).await {
            Ok(records) => records,
            Err(e) => {
                self.read_failed("query", &e);
                Vec::new()
            }
        };

        Ok(json_response(StatusCode::OK, &records)?)
    }

    fn read_failed(&self, operation: &'static str, error: &request_store::StoreError) {
        let store = self.store.name();
        tracing::warn!(error = %error, store, operation, "Store read failed, answering empty");
        shared::counter!(STORE_READ_FAILURES, "store" => store, "operation" => operation)
            .increment(1);
    }
}

async fn read_json_object<B>(body: B) -> Result<Map<String, Value>, ApiError>
where
    B: Body<Data = Bytes>,
    B::Error: std::fmt::Display,
{
    let bytes = body
        .collect()
        .await
        .map_err(|e| ApiError::RequestBody(e.to_string()))?
        .to_bytes();

    match serde_json::from_slice(&bytes) {
        Ok(Value::Object(fields)) => Ok(fields),
        _ => Err(ApiError::InvalidJson),
    }
}
