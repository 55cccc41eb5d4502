use crate::errors::ApiError;
use hyper::header::{AUTHORIZATION, HeaderMap};

/// Checks the `Authorization` header against the shared secret.
///
/// Plain equality: the header must hold exactly the secret, with no scheme prefix.
pub fn authorize(headers: &HeaderMap, secret: &str) -> Result<(), ApiError> {
    match headers.get(AUTHORIZATION) {
        Some(value) if value.as_bytes() == secret.as_bytes() => Ok(()),
        _ => Err(ApiError::Unauthorized),
    }
}
