//! Error bodies returned by the calculation relay
//!
//! Every rejection carries a stable machine-readable `error` code. Callers
//! match on the code, never on `message`.

use serde::{Deserialize, Serialize};

// =============================================================================
// Error Codes
// =============================================================================

/// Error classification codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // === Client Errors (4xx) ===
    /// A required numeric field is absent or not a number
    MissingFields,
    /// Body is not JSON or a value is outside its range
    InvalidRequest,
    /// Shared-secret header missing or wrong
    Unauthorized,
    /// No calculation at this path
    UnknownEndpoint,

    // === Server Errors (5xx) ===
    /// No shared secret configured on the server
    ServerNotConfigured,

    /// Unknown variant for forward compatibility
    #[serde(other)]
    Unknown,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingFields => "missing_fields",
            Self::InvalidRequest => "invalid_request",
            Self::Unauthorized => "unauthorized",
            Self::UnknownEndpoint => "unknown_endpoint",
            Self::ServerNotConfigured => "server_not_configured",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JSON body of every relay error: `{ "error": "<code>", "message"?: "..." }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn new(error: ErrorCode) -> Self {
        Self {
            error,
            message: None,
        }
    }

    pub fn with_message(error: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            error,
            message: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_serialize_as_snake_case() {
        let body = ErrorBody::new(ErrorCode::ServerNotConfigured);
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"error":"server_not_configured"}"#);
    }

    #[test]
    fn test_message_is_included_when_present() {
        let body = ErrorBody::with_message(ErrorCode::MissingFields, "missing required fields: total");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["error"], "missing_fields");
        assert_eq!(json["message"], "missing required fields: total");
    }

    #[test]
    fn test_unknown_code_deserializes_to_fallback() {
        let body: ErrorBody = serde_json::from_str(r#"{"error":"rate_limited"}"#).unwrap();
        assert_eq!(body.error, ErrorCode::Unknown);
    }

    #[test]
    fn test_display_matches_wire_name() {
        assert_eq!(ErrorCode::UnknownEndpoint.to_string(), "unknown_endpoint");
    }
}
