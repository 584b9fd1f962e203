//! RFC 7807 problem-document rendering of [`AppError`] at the HTTP boundary.
//!
//! The internal error machinery (`AppError`/`ErrorCode`/`ErrorCategory`) is
//! unchanged; this module only controls how an `AppError` is serialized once
//! it crosses into an HTTP response.

use super::category::ErrorCategory;
use super::types::AppError;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// An RFC 7807 problem document.
#[derive(Debug, Clone, Serialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub problem_type: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub instance: String,
    #[serde(rename = "traceId")]
    pub trace_id: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none", rename = "fieldErrors")]
    pub field_errors: Option<HashMap<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violations: Option<Vec<String>>,
}

impl ProblemDetails {
    pub fn from_app_error(err: &AppError, instance: impl Into<String>, trace_id: impl Into<String>) -> Self {
        let status = err.http_status();
        Self {
            problem_type: format!(
                "https://errors.pos.internal/{}/{}",
                err.code.category().slug(),
                err.code.code()
            ),
            title: err.code.category().title().to_string(),
            status: status.as_u16(),
            detail: err.message.clone(),
            instance: instance.into(),
            trace_id: trace_id.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            field_errors: err.details.clone(),
            violations: None,
        }
    }

    pub fn with_violations(mut self, violations: Vec<String>) -> Self {
        self.violations = Some(violations);
        self
    }
}

impl ErrorCategory {
    /// Slug used in the problem document's `type` URI.
    pub fn slug(&self) -> &'static str {
        self.name()
    }

    /// Human title for the problem document, grouped by error category
    /// (VALIDATION/AUTHENTICATION/AUTHORIZATION/NOT_FOUND/CONFLICT/
    /// BUSINESS_RULE/RATE_LIMIT/DEPENDENCY/INTERNAL).
    pub fn title(&self) -> &'static str {
        match self {
            Self::General => "Validation Error",
            Self::Auth => "Authentication Error",
            Self::Permission => "Authorization Error",
            Self::Tenant => "Tenant Error",
            Self::Order => "Order Business Rule Violation",
            Self::Payment => "Payment Business Rule Violation",
            Self::Product => "Catalog Error",
            Self::Table => "Dining Room Business Rule Violation",
            Self::Employee => "User Error",
            Self::System => "Internal Error",
            Self::Cash => "Cash Register Business Rule Violation",
        }
    }
}

impl axum::response::IntoResponse for ProblemDetails {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, Json(self)).into_response();
        response
            .headers_mut()
            .insert("content-type", "application/problem+json".parse().unwrap());
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::codes::ErrorCode;

    #[test]
    fn renders_problem_document_from_app_error() {
        let err = AppError::with_message(ErrorCode::OrderNotOpen, "order is not open")
            .with_detail("order_id", "abc");
        let problem = ProblemDetails::from_app_error(&err, "/api/orders/abc/lines", "trace-1");
        assert_eq!(problem.status, 422);
        assert_eq!(problem.title, "Order Business Rule Violation");
        assert_eq!(problem.instance, "/api/orders/abc/lines");
        assert_eq!(problem.trace_id, "trace-1");
        assert!(problem.field_errors.unwrap().contains_key("order_id"));
    }
}
