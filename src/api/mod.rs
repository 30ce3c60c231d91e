//! Typed access to the employee REST resource.

pub mod api_types;
pub mod client;
pub mod error;
pub mod types;

#[cfg(test)]
pub mod fake;

pub use client::{EmployeeApi, HttpEmployeeClient};
pub use error::{ApiError, ApiResult};
pub use types::{
  Employee, EmployeeCreateRequest, EmployeeId, EmployeeUpdateRequest, Gender, PageWindow,
};
