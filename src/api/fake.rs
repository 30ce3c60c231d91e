//! In-memory backend used by tests.
//!
//! Mirrors the backend contract closely enough to exercise the cache and the
//! controller: id ordering, email uniqueness, 404 on missing ids.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

use crate::cache::PageKey;

use super::client::EmployeeApi;
use super::error::{ApiError, ApiResult, ValidationFailure};
use super::types::{Employee, EmployeeCreateRequest, EmployeeId, EmployeeUpdateRequest, PageWindow};

#[derive(Default)]
struct State {
  records: BTreeMap<EmployeeId, Employee>,
  next_id: EmployeeId,
  fail_next: Option<ApiError>,
}

#[derive(Default)]
pub struct FakeBackend {
  state: Mutex<State>,
  list_calls: AtomicUsize,
  write_calls: AtomicUsize,
  list_gate: Mutex<Option<Arc<Semaphore>>>,
}

impl FakeBackend {
  pub fn new() -> Self {
    Self::default()
  }

  /// Backend pre-populated with `count` valid records (ids 1..=count)
  pub fn with_records(count: usize) -> Self {
    let backend = Self::new();
    {
      let mut state = backend.state.lock().unwrap();
      for i in 0..count {
        let id = i as EmployeeId + 1;
        state.records.insert(id, sample_employee(id));
      }
      state.next_id = count as EmployeeId;
    }
    backend
  }

  pub fn list_calls(&self) -> usize {
    self.list_calls.load(Ordering::SeqCst)
  }

  pub fn write_calls(&self) -> usize {
    self.write_calls.load(Ordering::SeqCst)
  }

  pub fn len(&self) -> usize {
    self.state.lock().unwrap().records.len()
  }

  /// Make the next call (of any kind) fail with `err`
  pub fn fail_next(&self, err: ApiError) {
    self.state.lock().unwrap().fail_next = Some(err);
  }

  /// Hold every list call until `release_lists` hands out permits
  pub fn hold_lists(&self) {
    *self.list_gate.lock().unwrap() = Some(Arc::new(Semaphore::new(0)));
  }

  pub fn release_lists(&self, permits: usize) {
    if let Some(gate) = self.list_gate.lock().unwrap().as_ref() {
      gate.add_permits(permits);
    }
  }

  fn take_failure(&self) -> ApiResult<()> {
    match self.state.lock().unwrap().fail_next.take() {
      Some(err) => Err(err),
      None => Ok(()),
    }
  }

  fn check_email(state: &State, email: &str, except: Option<EmployeeId>) -> ApiResult<()> {
    if !email.contains('@') {
      return Err(validation(400, "email: Email must be valid"));
    }
    let taken = state
      .records
      .values()
      .any(|e| e.email == email && Some(e.id) != except);
    if taken {
      return Err(validation(409, &format!("Email {} already exists", email)));
    }
    Ok(())
  }
}

fn validation(status: u16, message: &str) -> ApiError {
  ApiError::Validation(ValidationFailure {
    status,
    message: message.to_string(),
    errors: Vec::new(),
  })
}

pub fn sample_employee(id: EmployeeId) -> Employee {
  Employee {
    id,
    full_name: format!("Employee Number {}", id),
    email: format!("employee{}@example.com", id),
    date_of_birth: chrono::NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
    gender: super::types::Gender::Other,
    phone_number: "0912345678".to_string(),
    active: true,
    created_at: Utc::now().naive_utc(),
    updated_at: None,
  }
}

#[async_trait]
impl EmployeeApi for FakeBackend {
  async fn list_page(&self, key: PageKey) -> ApiResult<PageWindow<Employee>> {
    self.list_calls.fetch_add(1, Ordering::SeqCst);

    let gate = self.list_gate.lock().unwrap().clone();
    if let Some(gate) = gate {
      gate
        .acquire()
        .await
        .map_err(|e| ApiError::Transport(e.to_string()))?
        .forget();
    }

    self.take_failure()?;
    let state = self.state.lock().unwrap();
    let content = state
      .records
      .values()
      .skip(key.page() as usize * key.size() as usize)
      .take(key.size() as usize)
      .cloned()
      .collect();

    Ok(PageWindow {
      content,
      page_index: key.page(),
      page_size: key.size(),
      total_elements: state.records.len() as u64,
    })
  }

  async fn get_by_id(&self, id: EmployeeId) -> ApiResult<Employee> {
    self.take_failure()?;
    let state = self.state.lock().unwrap();
    state.records.get(&id).cloned().ok_or(ApiError::NotFound(id))
  }

  async fn create(&self, payload: &EmployeeCreateRequest) -> ApiResult<Employee> {
    self.write_calls.fetch_add(1, Ordering::SeqCst);
    self.take_failure()?;

    let mut state = self.state.lock().unwrap();
    Self::check_email(&state, &payload.email, None)?;

    state.next_id += 1;
    let employee = Employee {
      id: state.next_id,
      full_name: payload.full_name.clone(),
      email: payload.email.clone(),
      date_of_birth: payload.date_of_birth,
      gender: payload.gender,
      phone_number: payload.phone_number.clone(),
      active: payload.active,
      created_at: Utc::now().naive_utc(),
      updated_at: None,
    };
    state.records.insert(employee.id, employee.clone());
    Ok(employee)
  }

  async fn update(&self, id: EmployeeId, payload: &EmployeeUpdateRequest) -> ApiResult<Employee> {
    self.write_calls.fetch_add(1, Ordering::SeqCst);
    self.take_failure()?;

    let mut state = self.state.lock().unwrap();
    if !state.records.contains_key(&id) {
      return Err(ApiError::NotFound(id));
    }
    Self::check_email(&state, &payload.email, Some(id))?;

    let employee = state.records.get_mut(&id).ok_or(ApiError::NotFound(id))?;
    employee.full_name = payload.full_name.clone();
    employee.email = payload.email.clone();
    employee.date_of_birth = payload.date_of_birth;
    employee.gender = payload.gender;
    employee.phone_number = payload.phone_number.clone();
    employee.active = payload.active;
    employee.updated_at = Some(Utc::now().naive_utc());
    Ok(employee.clone())
  }

  async fn delete(&self, id: EmployeeId) -> ApiResult<()> {
    self.write_calls.fetch_add(1, Ordering::SeqCst);
    self.take_failure()?;

    let mut state = self.state.lock().unwrap();
    state.records.remove(&id).map(|_| ()).ok_or(ApiError::NotFound(id))
  }
}
