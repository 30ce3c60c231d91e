use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-assigned employee identifier
pub type EmployeeId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
  Male,
  Female,
  Other,
}

impl Gender {
  pub fn label(&self) -> &'static str {
    match self {
      Gender::Male => "Male",
      Gender::Female => "Female",
      Gender::Other => "Other",
    }
  }

  /// Next variant in display order, wrapping around
  pub fn cycle(&self) -> Gender {
    match self {
      Gender::Male => Gender::Female,
      Gender::Female => Gender::Other,
      Gender::Other => Gender::Male,
    }
  }
}

impl fmt::Display for Gender {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

/// Employee record as returned by the backend.
///
/// The password is write-only and never appears here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
  pub id: EmployeeId,
  pub full_name: String,
  pub email: String,
  pub date_of_birth: NaiveDate,
  pub gender: Gender,
  pub phone_number: String,
  pub active: bool,
  pub created_at: NaiveDateTime,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub updated_at: Option<NaiveDateTime>,
}

/// Payload for `POST /employees`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeCreateRequest {
  pub full_name: String,
  pub email: String,
  pub date_of_birth: NaiveDate,
  pub gender: Gender,
  pub phone_number: String,
  pub password: String,
  pub active: bool,
}

/// Payload for `PUT /employees/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeUpdateRequest {
  pub full_name: String,
  pub email: String,
  pub date_of_birth: NaiveDate,
  pub gender: Gender,
  pub phone_number: String,
  pub active: bool,
}

/// One page of records plus pagination metadata.
///
/// `content.len() <= page_size` always holds for windows produced by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow<T> {
  pub content: Vec<T>,
  pub page_index: u32,
  pub page_size: u32,
  pub total_elements: u64,
}

impl<T> PageWindow<T> {
  /// Number of pages needed for `total_elements`, at least one
  pub fn total_pages(&self) -> u32 {
    if self.page_size == 0 {
      return 1;
    }
    let pages = self.total_elements.div_ceil(u64::from(self.page_size));
    u32::try_from(pages).unwrap_or(u32::MAX).max(1)
  }

  pub fn is_empty(&self) -> bool {
    self.content.is_empty()
  }
}
