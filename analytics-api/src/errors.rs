use http_body_util::combinators::BoxBody;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use request_store::StoreError;
use request_store::validator::ValidationError;
use shared::http::{make_boxed_error_response, text_response};
use thiserror::Error;

pub type ApiBody = BoxBody<Bytes, ApiError>;

/// Errors that can occur while serving the analytics API
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Missing or invalid authorization")]
    Unauthorized,

    #[error("Invalid record: {0}")]
    Validation(#[from] ValidationError),

    #[error("Request body is not a JSON object")]
    InvalidJson,

    #[error("Failed to read request body: {0}")]
    RequestBody(String),

    #[error("Failed to store record: {0}")]
    StoreWrite(#[source] StoreError),

    #[error("Failed to open store: {0}")]
    StoreOpen(#[source] StoreError),

    #[error("Failed to serialize response: {0}")]
    ResponseSerialization(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Invalid header name: {0}")]
    InvalidHeaderName(#[from] hyper::header::InvalidHeaderName),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("No route matched for request")]
    NotFound,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Validation(_) | ApiError::InvalidJson | ApiError::RequestBody(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::StoreWrite(_)
            | ApiError::StoreOpen(_)
            | ApiError::ResponseSerialization(_)
            | ApiError::HttpClient(_)
            | ApiError::InvalidHeaderName(_)
            | ApiError::InvalidUrl(_)
            | ApiError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converts the error into the plain text response sent to the client.
    ///
    /// Server-side details are logged by the caller, never sent.
    pub fn into_response(self) -> Response<ApiBody> {
        let status = self.status();
        match self {
            ApiError::Unauthorized => text_response(status, "Unauthorized"),
            ApiError::Validation(ValidationError::MissingField(field)) => text_response(
                status,
                format!("Bad Request: Missing required field: {field}"),
            ),
            ApiError::Validation(ValidationError::InvalidField { field, expected }) => {
                text_response(
                    status,
                    format!("Bad Request: Invalid field: {field} must be {expected}"),
                )
            }
            ApiError::InvalidJson | ApiError::RequestBody(_) => {
                text_response(status, "Bad Request: Invalid JSON")
            }
            _ => make_boxed_error_response(status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_string(response: Response<ApiBody>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_error_responses() {
        let response = ApiError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_string(response).await, "Unauthorized");

        let response = ApiError::from(ValidationError::MissingField("path")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_string(response).await,
            "Bad Request: Missing required field: path"
        );

        let response = ApiError::InvalidJson.into_response();
        assert_eq!(body_string(response).await, "Bad Request: Invalid JSON");

        let response = ApiError::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(response).await, "Not Found");

        let store_error = StoreError::Io(std::io::Error::other("disk full"));
        let response = ApiError::StoreWrite(store_error).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_string(response).await, "Internal Server Error");
    }
}
