//! Classification of remote-call outcomes into the error taxonomy.
//!
//! Classification is total: every failed response or transport error maps
//! to exactly one [`PtuError`] variant.

use reqwest::StatusCode;
use serde::Deserialize;

use azptu_core::PtuError;

#[derive(Debug, Deserialize)]
struct ArmErrorBody {
    error: ArmErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ArmErrorDetail {
    #[serde(default)]
    code: Option<String>,
    message: String,
}

/// Extracts the human-readable message from an ARM error body, falling back
/// to the raw body when it does not match the envelope.
fn extract_message(body: &str) -> String {
    match serde_json::from_str::<ArmErrorBody>(body) {
        Ok(envelope) => match envelope.error.code {
            Some(code) => format!("{code}: {}", envelope.error.message),
            None => envelope.error.message,
        },
        Err(_) => body.trim().to_string(),
    }
}

/// Maps a non-success HTTP status to the taxonomy.
///
/// `resource` names what was being addressed, for NotFound reporting.
pub fn classify_status(status: StatusCode, body: &str, resource: &str) -> PtuError {
    let message = extract_message(body);
    match status {
        StatusCode::UNAUTHORIZED => PtuError::authentication(message),
        StatusCode::NOT_FOUND => PtuError::not_found(resource),
        StatusCode::TOO_MANY_REQUESTS => PtuError::CapacityUnavailable { message },
        StatusCode::FORBIDDEN => PtuError::QuotaInsufficient { message },
        other => PtuError::Remote {
            code: other.as_u16(),
            message,
        },
    }
}

/// Maps a transport-level failure (connect, timeout, body read) with no
/// status code available.
pub fn classify_transport(err: reqwest::Error) -> PtuError {
    PtuError::transport(err.to_string())
}
