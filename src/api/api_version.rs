use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap, StatusCode},
    response::Json,
};

use crate::error::ErrorResponse;

pub const API_VERSION_HEADER: &str = "x-broker-api-version";
pub const SUPPORTED_MAJOR_VERSION: u32 = 2;

/// Value of the `X-Broker-API-Version` header sent by the platform, e.g. `2.14`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrokerApiVersion {
    pub major: u32,
    pub minor: u32,
}

impl BrokerApiVersion {
    pub fn parse(raw: &str) -> Option<Self> {
        let (major, minor) = raw.trim().split_once('.')?;
        Some(Self {
            major: major.parse().ok()?,
            minor: minor.parse().ok()?,
        })
    }
}

/// Axum extractor rejecting requests that do not speak major version 2 of the broker API
#[async_trait]
impl<S> FromRequestParts<S> for BrokerApiVersion
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = extract_header_value(&parts.headers, API_VERSION_HEADER).ok_or_else(|| {
            precondition_failed("Missing X-Broker-API-Version header".to_string())
        })?;

        let version = BrokerApiVersion::parse(&raw)
            .ok_or_else(|| precondition_failed(format!("Malformed X-Broker-API-Version '{}'", raw)))?;

        if version.major != SUPPORTED_MAJOR_VERSION {
            return Err(precondition_failed(format!(
                "Unsupported broker API version {}.{}, expected {}.x",
                version.major, version.minor, SUPPORTED_MAJOR_VERSION
            )));
        }

        Ok(version)
    }
}

fn precondition_failed(description: String) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::PRECONDITION_FAILED,
        Json(ErrorResponse::new("PreconditionFailed", &description)),
    )
}

/// Extract header value as string
fn extract_header_value(headers: &HeaderMap, header_name: &str) -> Option<String> {
    headers
        .get(header_name)
        .and_then(|value| value.to_str().ok())
        .map(|s| s.to_string())
}
