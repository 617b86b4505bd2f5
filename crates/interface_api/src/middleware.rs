//! API middleware

use std::convert::Infallible;

use axum::{
    async_trait,
    body::Body,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::info;

use core_kernel::OperationMetadata;

/// Header carrying the request id set by the request-id layer
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Header naming the staff member acting on the request
pub const STAFF_ID_HEADER: &str = "x-staff-id";

const SOURCE_SYSTEM: &str = "warranty-api";

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|h| h.to_str().ok())
}

/// Audit logging middleware
///
/// Logs every API request with its request id, caller, and outcome
pub async fn audit_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_id = header(request.headers(), REQUEST_ID_HEADER)
        .unwrap_or("-")
        .to_string();
    let staff = header(request.headers(), STAFF_ID_HEADER)
        .unwrap_or("anonymous")
        .to_string();

    let start = Utc::now();

    let response = next.run(request).await;

    let duration = Utc::now() - start;
    let status = response.status();

    info!(
        method = %method,
        uri = %uri,
        request_id = %request_id,
        staff = %staff,
        status = %status.as_u16(),
        duration_ms = duration.num_milliseconds(),
        "API request"
    );

    response
}

/// Operation metadata derived from request headers
///
/// The request id becomes the correlation id handed to the ports.
#[derive(Debug, Clone)]
pub struct RequestMetadata(pub OperationMetadata);

impl RequestMetadata {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self(OperationMetadata {
            correlation_id: header(headers, REQUEST_ID_HEADER).map(str::to_string),
            initiated_by: header(headers, STAFF_ID_HEADER).map(str::to_string),
            source_system: Some(SOURCE_SYSTEM.to_string()),
        })
    }

    pub fn into_inner(self) -> Option<OperationMetadata> {
        Some(self.0)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestMetadata
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_metadata_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("req-1"));
        headers.insert(STAFF_ID_HEADER, HeaderValue::from_static("900"));

        let metadata = RequestMetadata::from_headers(&headers).0;
        assert_eq!(metadata.correlation_id.as_deref(), Some("req-1"));
        assert_eq!(metadata.initiated_by.as_deref(), Some("900"));
        assert_eq!(metadata.source_system.as_deref(), Some("warranty-api"));
    }

    #[test]
    fn test_metadata_without_headers() {
        let metadata = RequestMetadata::from_headers(&HeaderMap::new()).0;
        assert!(metadata.correlation_id.is_none());
        assert!(metadata.initiated_by.is_none());
    }
}
