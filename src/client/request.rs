//! Request descriptor and the classification of a single attempt.
//!
//! A logical request moves `INITIAL → SENT → (EXPIRED_AWAIT_REFRESH →
//! RETRIED) → DONE | FAILED`. [`Reply::classify`] decides the edge taken
//! after each send; the refresh branch is only reachable from the initial
//! attempt.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::error;

use crate::client::error::ApiError;
use crate::envelope::{ApiResponse, error_code};

/// Everything needed to (re)issue one call.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Endpoint path relative to the API base, e.g. `/productos`
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let body = serde_json::to_value(body).map_err(|e| {
            error!(path = %self.path, error = %e, "failed to serialize request body");
            ApiError::transport()
        })?;
        self.body = Some(body);
        Ok(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    Initial,
    Retry,
}

/// What to do with a parsed reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Return `data` to the caller.
    Success,
    /// No token was presented: redirect to login and fail.
    TokenMissing,
    /// Access token expired on the initial attempt: refresh, then retry once.
    TokenExpired,
    /// Surface the backend's status, message and code.
    Failure,
}

/// A response whose body parsed as an envelope.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub envelope: ApiResponse<Value>,
}

impl Reply {
    pub fn classify(&self, attempt: Attempt) -> Verdict {
        if self.envelope.has_code(error_code::TOKEN_MISSING) {
            return Verdict::TokenMissing;
        }
        if self.status == StatusCode::UNAUTHORIZED
            && self.envelope.has_code(error_code::TOKEN_EXPIRED)
            && attempt == Attempt::Initial
        {
            return Verdict::TokenExpired;
        }
        if !self.status.is_success() || !self.envelope.success {
            return Verdict::Failure;
        }
        Verdict::Success
    }

    pub fn error_code(&self) -> Option<String> {
        self.envelope.error_code.clone()
    }

    pub fn into_error(self) -> ApiError {
        ApiError::new(
            self.status.as_u16(),
            self.envelope
                .error_message
                .unwrap_or_else(|| "API Error".to_string()),
            self.envelope.error_code,
        )
    }

    /// Decode `data` into the caller's type. A missing `data` decodes as
    /// JSON `null`, which suits `()` and `Option<_>`.
    pub fn into_data<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        serde_json::from_value(self.envelope.data.unwrap_or(Value::Null)).map_err(|e| {
            error!(status = %self.status, error = %e, "response data did not match the expected type");
            ApiError::transport()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reply(status: u16, body: Value) -> Reply {
        Reply {
            status: StatusCode::from_u16(status).unwrap(),
            envelope: serde_json::from_value(body).unwrap(),
        }
    }

    #[test]
    fn expired_token_triggers_refresh_only_on_first_attempt() {
        let r = reply(401, json!({ "success": false, "errorCode": "TOKEN_EXPIRED" }));
        assert_eq!(r.classify(Attempt::Initial), Verdict::TokenExpired);
        assert_eq!(r.classify(Attempt::Retry), Verdict::Failure);
    }

    #[test]
    fn expired_code_without_401_is_a_plain_failure() {
        let r = reply(403, json!({ "success": false, "errorCode": "TOKEN_EXPIRED" }));
        assert_eq!(r.classify(Attempt::Initial), Verdict::Failure);
    }

    #[test]
    fn missing_token_wins_regardless_of_status() {
        let r = reply(401, json!({ "success": false, "errorCode": "TOKEN_MISSING" }));
        assert_eq!(r.classify(Attempt::Initial), Verdict::TokenMissing);
        assert_eq!(r.classify(Attempt::Retry), Verdict::TokenMissing);

        let r = reply(200, json!({ "success": false, "errorCode": "TOKEN_MISSING" }));
        assert_eq!(r.classify(Attempt::Initial), Verdict::TokenMissing);
    }

    #[test]
    fn success_requires_ok_status_and_flag() {
        assert_eq!(
            reply(200, json!({ "success": true, "data": [] })).classify(Attempt::Initial),
            Verdict::Success
        );
        assert_eq!(
            reply(200, json!({ "success": false })).classify(Attempt::Initial),
            Verdict::Failure
        );
        assert_eq!(
            reply(500, json!({ "success": true })).classify(Attempt::Initial),
            Verdict::Failure
        );
    }

    #[test]
    fn failure_carries_backend_details() {
        let err = reply(
            404,
            json!({ "success": false, "errorMessage": "producto not found.", "errorCode": "NOT_FOUND" }),
        )
        .into_error();
        assert_eq!(err, ApiError::new(404, "producto not found.", Some("NOT_FOUND".into())));

        let err = reply(400, json!({ "success": false })).into_error();
        assert_eq!(err.message, "API Error");
    }

    #[test]
    fn data_is_returned_without_the_envelope() {
        let data: Vec<u32> = reply(200, json!({ "success": true, "data": [1, 2, 3], "message": "ok" }))
            .into_data()
            .unwrap();
        assert_eq!(data, vec![1, 2, 3]);

        reply(200, json!({ "success": true }))
            .into_data::<()>()
            .unwrap();

        let wrong = reply(200, json!({ "success": true, "data": "nope" })).into_data::<Vec<u32>>();
        assert_eq!(wrong.unwrap_err().status, 500);
    }

    #[test]
    fn json_body_is_captured_for_retries() {
        let req = ApiRequest::post("/ventas").json(&json!({ "total": 10 })).unwrap();
        let again = req.clone();
        assert_eq!(again.body, Some(json!({ "total": 10 })));
        assert_eq!(again.method, Method::POST);
    }
}
