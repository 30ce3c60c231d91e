//! Error taxonomy for employee API calls.

use std::fmt;
use thiserror::Error;

use super::types::EmployeeId;

/// Structured rejection reported by the backend (4xx with an error body)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
  pub status: u16,
  pub message: String,
  /// Field-level messages, usually `"field: message"`
  pub errors: Vec<String>,
}

impl fmt::Display for ValidationFailure {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.errors.is_empty() {
      write!(f, "{}", self.message)
    } else if self.message.is_empty() {
      write!(f, "{}", self.errors.join("; "))
    } else {
      write!(f, "{} ({})", self.message, self.errors.join("; "))
    }
  }
}

/// API client error.
///
/// Cloneable so a single coalesced fetch can hand its failure to every waiter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
  /// Network failure, unreachable backend, or non-2xx without a structured body
  #[error("transport error: {0}")]
  Transport(String),

  /// Backend rejected the payload
  #[error("validation failed: {0}")]
  Validation(ValidationFailure),

  /// Id-addressed operation on a missing record
  #[error("employee {0} not found")]
  NotFound(EmployeeId),
}

impl ApiError {
  pub fn is_not_found(&self) -> bool {
    matches!(self, ApiError::NotFound(_))
  }

  pub fn is_validation(&self) -> bool {
    matches!(self, ApiError::Validation(_))
  }
}

impl From<reqwest::Error> for ApiError {
  fn from(err: reqwest::Error) -> Self {
    ApiError::Transport(err.to_string())
  }
}

pub type ApiResult<T> = Result<T, ApiError>;
