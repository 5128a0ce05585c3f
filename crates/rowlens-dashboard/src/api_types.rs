//! API request and response types.

use axum::{
    Form, Json,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Returned when a body cannot be decoded at all.
pub const INVALID_REQUEST: &str = "Invalid request";

// =============================================================================
// Envelope
// =============================================================================

/// `{success, data}` envelope shared by every JSON endpoint.
///
/// Failures carry a message string in `data` and are still sent with HTTP 200.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Response {
        Json(ApiResponse { success: true, data }).into_response()
    }
}

impl ApiResponse<String> {
    pub fn fail(message: impl Into<String>) -> Response {
        Json(ApiResponse {
            success: false,
            data: message.into(),
        })
        .into_response()
    }
}

// =============================================================================
// Table Data
// =============================================================================

/// Body of `POST /api/table-data`.
#[derive(Debug, Default, Deserialize)]
pub struct TableDataRequest {
    #[serde(default)]
    pub nonce: String,
    #[serde(default)]
    pub table: String,
    #[serde(default, deserialize_with = "lenient_int")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub per_page: Option<i64>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub orderby: Option<String>,
    #[serde(default)]
    pub order: Option<String>,
}

/// Body of `POST /api/table-counts`.
#[derive(Debug, Default, Deserialize)]
pub struct TableCountsRequest {
    #[serde(default)]
    pub nonce: String,
}

/// Body of `POST /api/render`.
#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    pub content: String,
}

/// Response of `POST /api/render`.
#[derive(Debug, Serialize, Deserialize)]
pub struct RenderResponse {
    pub html: String,
    pub tables: Vec<String>,
}

// =============================================================================
// Viewer Fragments
// =============================================================================

/// Query string of `GET /fragments/table`.
#[derive(Debug, Default, Deserialize)]
pub struct FragmentQuery {
    #[serde(default)]
    pub nonce: String,
    #[serde(default)]
    pub table: String,
    #[serde(default, deserialize_with = "lenient_int")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub per_page: Option<i64>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub orderby: Option<String>,
    #[serde(default)]
    pub order: Option<String>,
    /// Sequence number chosen by the browser, echoed back untouched.
    #[serde(default)]
    pub seq: u64,
}

/// Rendered fragment for one viewer fetch.
#[derive(Debug, Serialize, Deserialize)]
pub struct FragmentResponse {
    pub seq: u64,
    /// Parameters of the page just rendered; the search box builds on them.
    pub query: String,
    /// Table markup, or the no-data block.
    pub content: String,
    pub pagination_info: String,
    pub pagination_controls: String,
}

/// Query string of `GET /view`.
#[derive(Debug, Default, Deserialize)]
pub struct ViewQuery {
    #[serde(default)]
    pub table: Option<String>,
}

// =============================================================================
// Extractors
// =============================================================================

/// Accepts either a urlencoded form or a JSON body, picked by content type.
///
/// Undecodable bodies are answered with the failure envelope rather than a
/// 4xx, matching every other failure of these endpoints.
#[derive(Debug)]
pub struct FormOrJson<T>(pub T);

impl<T, S> FromRequest<S> for FormOrJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));

        let decoded = if is_json {
            Json::<T>::from_request(req, state)
                .await
                .map(|Json(value)| value)
                .map_err(|e| e.body_text())
        } else {
            Form::<T>::from_request(req, state)
                .await
                .map(|Form(value)| value)
                .map_err(|e| e.body_text())
        };

        decoded.map(FormOrJson).map_err(|detail| {
            tracing::debug!(error = %detail, "Rejected request body");
            ApiResponse::fail(INVALID_REQUEST)
        })
    }
}

/// Deserialize an integer leniently.
///
/// Accepts numbers and numeric strings. A string is read up to its first
/// non-digit, so `"3abc"` is 3 and `"abc"` is 0; values past the `i64` range
/// saturate. Empty strings and nulls are treated as absent.
pub fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        None => None,
        Some(Raw::Int(n)) => Some(n),
        Some(Raw::Float(f)) => Some(f as i64),
        Some(Raw::Text(s)) => parse_leading_int(&s),
    })
}

fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    let (negative, digits) = match s.as_bytes()[0] {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let digits = &digits[..end];
    if digits.is_empty() {
        return Some(0);
    }
    // Out-of-range values saturate.
    let signed = if negative {
        format!("-{digits}")
    } else {
        digits.to_string()
    };
    Some(signed.parse::<i64>().unwrap_or(if negative { i64::MIN } else { i64::MAX }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn leading_integers() {
        assert_eq!(parse_leading_int("3"), Some(3));
        assert_eq!(parse_leading_int(" 42abc"), Some(42));
        assert_eq!(parse_leading_int("abc"), Some(0));
        assert_eq!(parse_leading_int("-7"), Some(-7));
        assert_eq!(parse_leading_int(""), None);
    }

    #[test]
    fn oversized_integers_saturate() {
        assert_eq!(parse_leading_int("99999999999999999999"), Some(i64::MAX));
        assert_eq!(parse_leading_int("-99999999999999999999"), Some(i64::MIN));
        assert_eq!(parse_leading_int("-9223372036854775808"), Some(i64::MIN));
        assert_eq!(parse_leading_int("9223372036854775807x"), Some(i64::MAX));
    }

    #[test]
    fn json_body_accepts_numbers_and_strings() {
        let req: TableDataRequest =
            serde_json::from_str(r#"{"table":"wp_posts","page":"2","per_page":50.0}"#).unwrap();
        assert_eq!(req.table, "wp_posts");
        assert_eq!(req.page, Some(2));
        assert_eq!(req.per_page, Some(50));
        assert_eq!(req.search, None);
    }

    #[test]
    fn null_fields_are_absent() {
        let req: TableDataRequest = serde_json::from_str(r#"{"page":null}"#).unwrap();
        assert_eq!(req.page, None);
    }

    #[test]
    fn failure_envelope_shape() {
        let body = serde_json::to_value(ApiResponse {
            success: false,
            data: "Security check failed".to_string(),
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"success": false, "data": "Security check failed"})
        );
    }
}
