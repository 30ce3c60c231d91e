//! Serde-deserializable types matching backend responses.
//!
//! These types are separate from domain types so the paging envelope and the
//! error body can change shape without touching the rest of the app.

use serde::Deserialize;

use super::error::ValidationFailure;
use super::types::{Employee, PageWindow};

// ============================================================================
// Paging envelope
// ============================================================================

/// Spring `Page<T>` as serialized by the backend. Extra fields are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPage<T> {
  #[serde(default = "Vec::new")]
  pub content: Vec<T>,
  #[serde(default)]
  pub number: u32,
  #[serde(default)]
  pub size: u32,
  #[serde(default)]
  pub total_elements: u64,
  #[serde(default)]
  pub total_pages: Option<u32>,
}

impl ApiPage<Employee> {
  /// Convert into a window for the requested page.
  ///
  /// The requested size is authoritative; a backend that echoes a different
  /// size (or none) does not change the window's page size.
  pub fn into_window(self, page_index: u32, page_size: u32) -> PageWindow<Employee> {
    PageWindow {
      content: self.content,
      page_index: if self.size == 0 { page_index } else { self.number },
      page_size,
      total_elements: self.total_elements,
    }
  }
}

// ============================================================================
// Error body
// ============================================================================

/// Error body produced by the backend's exception handler.
///
/// Shapes seen from the backend:
/// - `{message, status, timestamp, errors}` where `errors` may be `null`
/// - `{status, messages, error}`
/// - Spring's default `{timestamp, status, error, message, path}`
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ApiErrorBody {
  pub message: Option<String>,
  pub status: Option<u16>,
  pub errors: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawErrorBody {
  #[serde(default)]
  message: Option<String>,
  /// Reason phrase; only used when `message` is missing or blank
  #[serde(default)]
  error: Option<String>,
  #[serde(default)]
  status: Option<u16>,
  #[serde(default, alias = "messages")]
  errors: Option<Vec<String>>,
}

fn non_blank(s: Option<String>) -> Option<String> {
  s.filter(|s| !s.trim().is_empty())
}

impl ApiErrorBody {
  /// Parse a response body, returning `None` unless it carries something useful.
  pub fn parse(body: &str) -> Option<Self> {
    let raw: RawErrorBody = serde_json::from_str(body).ok()?;
    let parsed = ApiErrorBody {
      message: non_blank(raw.message).or_else(|| non_blank(raw.error)),
      status: raw.status,
      errors: raw.errors.unwrap_or_default(),
    };
    if parsed.message.is_some() || !parsed.errors.is_empty() {
      Some(parsed)
    } else {
      None
    }
  }

  pub fn into_failure(self, status: u16) -> ValidationFailure {
    ValidationFailure {
      status: self.status.unwrap_or(status),
      message: self.message.unwrap_or_default(),
      errors: self.errors,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const PAGE_JSON: &str = r#"{
    "content": [
      {"id":1,"fullName":"Nguyen Van A","email":"a@x.com","dateOfBirth":"1990-01-01",
       "gender":"MALE","phoneNumber":"0912345678","active":true,"createdAt":"2024-01-01T08:00:00"}
    ],
    "pageable": {"pageNumber": 1, "pageSize": 8},
    "last": true,
    "totalElements": 9,
    "totalPages": 2,
    "size": 8,
    "number": 1,
    "first": false,
    "numberOfElements": 1,
    "empty": false
  }"#;

  #[test]
  fn test_spring_page_into_window() {
    let page: ApiPage<Employee> = serde_json::from_str(PAGE_JSON).unwrap();
    assert_eq!(page.total_pages, Some(2));

    let window = page.into_window(1, 8);
    assert_eq!(window.page_index, 1);
    assert_eq!(window.page_size, 8);
    assert_eq!(window.total_elements, 9);
    assert_eq!(window.content.len(), 1);
    assert_eq!(window.content[0].full_name, "Nguyen Van A");
  }

  #[test]
  fn test_error_body_validation_shape() {
    let body = r#"{"message":"Validation failed","status":400,
      "timestamp":"2024-01-01T08:00:00","errors":["email: Email must be valid"]}"#;
    let failure = ApiErrorBody::parse(body).unwrap().into_failure(400);
    assert_eq!(failure.status, 400);
    assert_eq!(failure.message, "Validation failed");
    assert_eq!(failure.errors, vec!["email: Email must be valid"]);
  }

  #[test]
  fn test_error_body_alternate_shape() {
    let body = r#"{"status":409,"messages":["Email a@x.com already exists"],"error":"Conflict"}"#;
    let failure = ApiErrorBody::parse(body).unwrap().into_failure(409);
    assert_eq!(failure.message, "Conflict");
    assert_eq!(failure.errors.len(), 1);
  }

  #[test]
  fn test_error_body_null_errors() {
    let body = r#"{"message":"Email a@x.com already exists","status":409,
      "timestamp":"2024-01-01T08:00:00","errors":null}"#;
    let failure = ApiErrorBody::parse(body).unwrap().into_failure(409);
    assert_eq!(failure.message, "Email a@x.com already exists");
    assert!(failure.errors.is_empty());
  }

  #[test]
  fn test_error_body_spring_default_shape() {
    let body = r#"{"timestamp":"2024-01-01T08:00:00.000+00:00","status":400,
      "error":"Bad Request","message":"Validation failed","path":"/api/employees"}"#;
    let parsed = ApiErrorBody::parse(body).unwrap();
    assert_eq!(parsed.message.as_deref(), Some("Validation failed"));
    assert_eq!(parsed.status, Some(400));

    // Blank message falls back to the reason phrase
    let body = r#"{"status":400,"error":"Bad Request","message":"","path":"/api/employees"}"#;
    let parsed = ApiErrorBody::parse(body).unwrap();
    assert_eq!(parsed.message.as_deref(), Some("Bad Request"));
  }

  #[test]
  fn test_error_body_rejects_unstructured() {
    assert!(ApiErrorBody::parse("").is_none());
    assert!(ApiErrorBody::parse("<html>Bad Gateway</html>").is_none());
    assert!(ApiErrorBody::parse("{}").is_none());
    assert!(ApiErrorBody::parse(r#"{"message":""}"#).is_none());
  }
}
