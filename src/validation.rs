//! Local field validation for employee forms.
//!
//! Payloads that fail here never reach the API client.

use chrono::NaiveDate;
use std::borrow::Cow;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use thiserror::Error;

use crate::api::{Employee, EmployeeCreateRequest, EmployeeUpdateRequest, Gender};

const FULL_NAME_MIN: usize = 4;
const FULL_NAME_MAX: usize = 160;
const EMAIL_MAX: usize = 100;
const PHONE_DIGITS: usize = 10;
const PASSWORD_MIN: usize = 6;

/// Accepted input formats for the date of birth, ISO first
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

static EMAIL_RE: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
  FullName,
  Email,
  DateOfBirth,
  Gender,
  PhoneNumber,
  Password,
  Active,
}

impl Field {
  /// Field for a backend property name such as `phoneNumber`
  pub fn from_wire(name: &str) -> Option<Field> {
    match name {
      "fullName" => Some(Field::FullName),
      "email" => Some(Field::Email),
      "dateOfBirth" => Some(Field::DateOfBirth),
      "gender" => Some(Field::Gender),
      "phoneNumber" => Some(Field::PhoneNumber),
      "password" => Some(Field::Password),
      "active" => Some(Field::Active),
      _ => None,
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      Field::FullName => "Full name",
      Field::Email => "Email",
      Field::DateOfBirth => "Date of birth",
      Field::Gender => "Gender",
      Field::PhoneNumber => "Phone number",
      Field::Password => "Password",
      Field::Active => "Active",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
  pub field: Field,
  pub message: Cow<'static, str>,
}

/// Every rule violation found in a form, in field order
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
  /// Map backend `"field: message"` entries onto form fields.
  ///
  /// Entries naming an unknown field, or without a field prefix, are left
  /// out. Returns `None` when nothing maps.
  pub fn from_backend(entries: &[String]) -> Option<FieldErrors> {
    let errors: Vec<FieldError> = entries
      .iter()
      .filter_map(|entry| {
        let (name, message) = entry.split_once(':')?;
        Some(FieldError {
          field: Field::from_wire(name.trim())?,
          message: Cow::Owned(message.trim().to_string()),
        })
      })
      .collect();
    (!errors.is_empty()).then_some(FieldErrors(errors))
  }

  pub fn for_field(&self, field: Field) -> Option<&str> {
    self
      .0
      .iter()
      .find(|e| e.field == field)
      .map(|e| e.message.as_ref())
  }

  pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
    self.0.iter()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }
}

impl fmt::Display for FieldErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let parts: Vec<String> = self
      .0
      .iter()
      .map(|e| format!("{}: {}", e.field.label(), e.message))
      .collect();
    f.write_str(&parts.join("; "))
  }
}

/// Raw form input as typed by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeForm {
  pub full_name: String,
  pub email: String,
  /// `YYYY-MM-DD` or `DD/MM/YYYY`
  pub date_of_birth: String,
  pub gender: Option<Gender>,
  pub phone_number: String,
  /// Only used in create mode
  pub password: String,
  pub active: bool,
}

impl Default for EmployeeForm {
  fn default() -> Self {
    Self {
      full_name: String::new(),
      email: String::new(),
      date_of_birth: String::new(),
      gender: None,
      phone_number: String::new(),
      password: String::new(),
      active: true,
    }
  }
}

struct Common {
  full_name: String,
  email: String,
  date_of_birth: NaiveDate,
  gender: Gender,
  phone_number: String,
}

impl EmployeeForm {
  /// Prefill from an existing record for editing. The password stays empty.
  pub fn from_employee(employee: &Employee) -> Self {
    Self {
      full_name: employee.full_name.clone(),
      email: employee.email.clone(),
      date_of_birth: employee.date_of_birth.format("%Y-%m-%d").to_string(),
      gender: Some(employee.gender),
      phone_number: employee.phone_number.clone(),
      password: String::new(),
      active: employee.active,
    }
  }

  pub fn validate_create(&self, today: NaiveDate) -> Result<EmployeeCreateRequest, FieldErrors> {
    let mut errors = Vec::new();
    let common = self.validate_common(today, &mut errors);

    if self.password.is_empty() {
      errors.push(error(Field::Password, "Password is required"));
    } else if self.password.chars().count() < PASSWORD_MIN {
      errors.push(error(Field::Password, "Password must be at least 6 characters"));
    }

    match common {
      Some(c) if errors.is_empty() => Ok(EmployeeCreateRequest {
        full_name: c.full_name,
        email: c.email,
        date_of_birth: c.date_of_birth,
        gender: c.gender,
        phone_number: c.phone_number,
        password: self.password.clone(),
        active: self.active,
      }),
      _ => Err(FieldErrors(errors)),
    }
  }

  pub fn validate_update(&self, today: NaiveDate) -> Result<EmployeeUpdateRequest, FieldErrors> {
    let mut errors = Vec::new();
    match self.validate_common(today, &mut errors) {
      Some(c) if errors.is_empty() => Ok(EmployeeUpdateRequest {
        full_name: c.full_name,
        email: c.email,
        date_of_birth: c.date_of_birth,
        gender: c.gender,
        phone_number: c.phone_number,
        active: self.active,
      }),
      _ => Err(FieldErrors(errors)),
    }
  }

  fn validate_common(&self, today: NaiveDate, errors: &mut Vec<FieldError>) -> Option<Common> {
    let full_name = self.full_name.trim();
    let name_len = full_name.chars().count();
    if name_len == 0 {
      errors.push(error(Field::FullName, "Full name is required"));
    } else if !(FULL_NAME_MIN..=FULL_NAME_MAX).contains(&name_len) {
      errors.push(error(
        Field::FullName,
        "Full name must be between 4 and 160 characters",
      ));
    }

    let email = self.email.trim();
    if email.is_empty() {
      errors.push(error(Field::Email, "Email is required"));
    } else if email.chars().count() > EMAIL_MAX {
      errors.push(error(Field::Email, "Email must be at most 100 characters"));
    } else if !EMAIL_RE.is_match(email) {
      errors.push(error(Field::Email, "Email must be valid"));
    }

    let date_of_birth = match parse_date(self.date_of_birth.trim()) {
      _ if self.date_of_birth.trim().is_empty() => {
        errors.push(error(Field::DateOfBirth, "Date of birth is required"));
        None
      }
      None => {
        errors.push(error(
          Field::DateOfBirth,
          "Date of birth must be YYYY-MM-DD or DD/MM/YYYY",
        ));
        None
      }
      Some(date) if date >= today => {
        errors.push(error(Field::DateOfBirth, "Date of birth must be in the past"));
        None
      }
      Some(date) => Some(date),
    };

    if self.gender.is_none() {
      errors.push(error(Field::Gender, "Gender is required"));
    }

    let phone = self.phone_number.trim();
    if phone.is_empty() {
      errors.push(error(Field::PhoneNumber, "Phone number is required"));
    } else if phone.len() != PHONE_DIGITS || !phone.bytes().all(|b| b.is_ascii_digit()) {
      errors.push(error(Field::PhoneNumber, "Phone number must be 10 digits"));
    }

    Some(Common {
      full_name: full_name.to_string(),
      email: email.to_string(),
      date_of_birth: date_of_birth?,
      gender: self.gender?,
      phone_number: phone.to_string(),
    })
  }
}

fn error(field: Field, message: &'static str) -> FieldError {
  FieldError {
    field,
    message: Cow::Borrowed(message),
  }
}

fn parse_date(input: &str) -> Option<NaiveDate> {
  DATE_FORMATS
    .iter()
    .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
}
