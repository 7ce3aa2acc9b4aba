// Wire types for the refresh-token exchange

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Refresh exchange request body
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Refresh exchange response body
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Renewed token data handed back to the pipeline
#[derive(Debug, Clone)]
pub struct TokenData {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_request_serializes_camel_case() {
        let request = RefreshRequest {
            refresh_token: "r-123".to_string(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["refreshToken"], "r-123");
    }

    #[test]
    fn test_refresh_response_optional_fields() {
        let full: RefreshResponse = serde_json::from_str(
            r#"{"accessToken":"a-1","refreshToken":"r-1","expiresIn":3600}"#,
        )
        .unwrap();
        assert_eq!(full.access_token, "a-1");
        assert_eq!(full.refresh_token.as_deref(), Some("r-1"));
        assert_eq!(full.expires_in, Some(3600));

        let minimal: RefreshResponse = serde_json::from_str(r#"{"accessToken":"a-2"}"#).unwrap();
        assert_eq!(minimal.access_token, "a-2");
        assert!(minimal.refresh_token.is_none());
        assert!(minimal.expires_in.is_none());
    }
}
