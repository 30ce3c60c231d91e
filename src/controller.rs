//! Interaction controller between user intents and the page cache.
//!
//! Owns the edit session state machine, the current listing page and the
//! notification queue. Every network step is split in three:
//!
//! 1. `prepare_*` (sync) validates the intent and records that it is pending
//! 2. `run` (async) owns its API/cache handles, so the caller can spawn it and
//!    keep handling input while it is in flight
//! 3. `complete_*` (sync) applies the outcome to controller state
//!
//! The `submit`, `request_delete` and `load` helpers chain all three for
//! callers that can simply await.

use chrono::{DateTime, Local, Utc};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::{
  ApiError, ApiResult, Employee, EmployeeApi, EmployeeCreateRequest, EmployeeId,
  EmployeeUpdateRequest, PageWindow,
};
use crate::cache::{CacheResult, Invalidation, PageCache, PageKey};
use crate::validation::{EmployeeForm, FieldErrors};

pub type SessionId = u64;

/// Intents rejected before anything is sent to the backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntentError {
  #[error("an edit session is already open")]
  AlreadyComposing,
  #[error("no edit session is open")]
  NotComposing,
  #[error("a submission is already in progress")]
  SubmitPending,
  #[error("employee {0} is already being deleted")]
  DeletePending(EmployeeId),
  #[error("{0}")]
  Invalid(#[from] FieldErrors),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
  #[error(transparent)]
  Intent(#[from] IntentError),
  #[error(transparent)]
  Api(#[from] ApiError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionTarget {
  New,
  Editing(Employee),
}

/// An open create or edit form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
  id: SessionId,
  target: SessionTarget,
  pending: bool,
  last_error: Option<String>,
  /// Backend rejections that name a form field
  field_errors: Option<FieldErrors>,
}

impl EditSession {
  #[allow(dead_code)]
  pub fn target(&self) -> &SessionTarget {
    &self.target
  }

  pub fn editing(&self) -> Option<&Employee> {
    match &self.target {
      SessionTarget::Editing(employee) => Some(employee),
      SessionTarget::New => None,
    }
  }

  /// A submit has been sent and not yet resolved
  pub fn is_pending(&self) -> bool {
    self.pending
  }

  /// Error from the last failed submit, if any
  pub fn last_error(&self) -> Option<&str> {
    self.last_error.as_deref()
  }

  pub fn field_errors(&self) -> Option<&FieldErrors> {
    self.field_errors.as_ref()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
  Success,
  Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
  pub level: Level,
  pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
  Create(EmployeeCreateRequest),
  Update(EmployeeId, EmployeeUpdateRequest),
}

/// A validated submit, ready to be sent
pub struct PendingWrite {
  session: SessionId,
  op: WriteOp,
  api: Arc<dyn EmployeeApi>,
  cache: PageCache,
}

impl PendingWrite {
  /// Send the write; on success the cache is invalidated before returning.
  pub async fn run(self) -> WriteOutcome {
    let result = match &self.op {
      WriteOp::Create(request) => self
        .api
        .create(request)
        .await
        .inspect(|created| self.cache.apply_create(created)),
      WriteOp::Update(id, request) => self
        .api
        .update(*id, request)
        .await
        .inspect(|updated| self.cache.apply_update(updated)),
    };

    WriteOutcome {
      session: self.session,
      is_create: matches!(self.op, WriteOp::Create(_)),
      result,
    }
  }
}

#[derive(Debug, Clone)]
pub struct WriteOutcome {
  session: SessionId,
  is_create: bool,
  result: ApiResult<Employee>,
}

pub struct PendingDelete {
  id: EmployeeId,
  api: Arc<dyn EmployeeApi>,
  cache: PageCache,
}

impl PendingDelete {
  pub async fn run(self) -> DeleteOutcome {
    let result = self
      .api
      .delete(self.id)
      .await
      .inspect(|_| self.cache.apply_delete(self.id));
    DeleteOutcome {
      id: self.id,
      result,
    }
  }
}

#[derive(Debug, Clone)]
pub struct DeleteOutcome {
  id: EmployeeId,
  result: ApiResult<()>,
}

pub struct PendingLoad {
  key: PageKey,
  cache: PageCache,
}

impl PendingLoad {
  pub async fn run(self) -> LoadOutcome {
    let result = self.cache.read(self.key).await;
    LoadOutcome {
      key: self.key,
      result,
    }
  }
}

#[derive(Debug, Clone)]
pub struct LoadOutcome {
  key: PageKey,
  result: ApiResult<CacheResult<PageWindow<Employee>>>,
}

/// What `complete_load` did with an outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
  Applied,
  /// Outcome was for a page that is no longer current
  Discarded,
  /// Current page turned out to be past the end; the page was moved back
  /// and needs loading again
  Reload,
}

#[derive(Debug)]
struct Listing {
  key: PageKey,
  window: Option<PageWindow<Employee>>,
  fetched_at: Option<DateTime<Utc>>,
  loading: bool,
  error: Option<String>,
}

/// Pagination metadata for display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageMeta {
  pub index: u32,
  pub size: u32,
  pub total_elements: u64,
  pub total_pages: u32,
}

/// Everything the presentation layer needs to render one frame
#[derive(Debug)]
pub struct ViewModel<'a> {
  pub records: &'a [Employee],
  pub loading: bool,
  pub error: Option<&'a str>,
  pub page: PageMeta,
  pub fetched_at: Option<DateTime<Utc>>,
  pub session: Option<&'a EditSession>,
}

pub struct Controller {
  api: Arc<dyn EmployeeApi>,
  cache: PageCache,
  session: Option<EditSession>,
  next_session: SessionId,
  deleting: HashSet<EmployeeId>,
  listing: Listing,
  notifications: VecDeque<Notification>,
}

impl Controller {
  pub fn new(api: Arc<dyn EmployeeApi>, cache: PageCache, first_page: PageKey) -> Self {
    Self {
      api,
      cache,
      session: None,
      next_session: 0,
      deleting: HashSet::new(),
      listing: Listing {
        key: first_page,
        window: None,
        fetched_at: None,
        loading: false,
        error: None,
      },
      notifications: VecDeque::new(),
    }
  }

  // ==========================================================================
  // Edit session
  // ==========================================================================

  pub fn session(&self) -> Option<&EditSession> {
    self.session.as_ref()
  }

  pub fn is_composing(&self) -> bool {
    self.session.is_some()
  }

  pub fn start_create(&mut self) -> Result<(), IntentError> {
    self.open_session(SessionTarget::New)
  }

  pub fn start_edit(&mut self, employee: Employee) -> Result<(), IntentError> {
    self.open_session(SessionTarget::Editing(employee))
  }

  /// Opening a second session is rejected; the open one must be cancelled first.
  fn open_session(&mut self, target: SessionTarget) -> Result<(), IntentError> {
    if self.session.is_some() {
      warn!("rejected new edit session while one is open");
      return Err(IntentError::AlreadyComposing);
    }
    self.next_session += 1;
    debug!(session = self.next_session, ?target, "edit session opened");
    self.session = Some(EditSession {
      id: self.next_session,
      target,
      pending: false,
      last_error: None,
      field_errors: None,
    });
    Ok(())
  }

  /// Close the open session without contacting the backend. No-op when idle.
  ///
  /// A write already sent for the session still completes and still
  /// invalidates the cache; it just has no session to return to.
  pub fn cancel(&mut self) {
    if let Some(session) = self.session.take() {
      debug!(session = session.id, pending = session.pending, "edit session cancelled");
    }
  }

  /// Validate the form and mark the session as submitting.
  pub fn prepare_submit(&mut self, form: &EmployeeForm) -> Result<PendingWrite, IntentError> {
    let session = self.session.as_mut().ok_or(IntentError::NotComposing)?;
    if session.pending {
      return Err(IntentError::SubmitPending);
    }

    let today = Local::now().date_naive();
    let op = match &session.target {
      SessionTarget::New => WriteOp::Create(form.validate_create(today)?),
      SessionTarget::Editing(employee) => {
        WriteOp::Update(employee.id, form.validate_update(today)?)
      }
    };

    session.pending = true;
    session.last_error = None;
    session.field_errors = None;
    Ok(PendingWrite {
      session: session.id,
      op,
      api: Arc::clone(&self.api),
      cache: self.cache.clone(),
    })
  }

  /// Apply a finished write. Closes the session on success, keeps it open
  /// with the error on failure. A session closed meanwhile is not reopened.
  pub fn complete_submit(&mut self, outcome: WriteOutcome) -> ApiResult<Employee> {
    let verb = if outcome.is_create { "create" } else { "update" };

    match &outcome.result {
      Ok(employee) => {
        info!(id = employee.id, "employee {}d", verb);
        self.notify(
          Level::Success,
          if outcome.is_create {
            "Employee created".to_string()
          } else {
            "Employee updated".to_string()
          },
        );
      }
      Err(err) => {
        warn!(error = %err, "failed to {} employee", verb);
        self.notify(Level::Error, format!("Failed to {} employee: {}", verb, err));
      }
    }

    let owns_session = self
      .session
      .as_ref()
      .is_some_and(|session| session.id == outcome.session);
    if !owns_session {
      debug!(session = outcome.session, "write finished after its session closed");
    } else if let Err(err) = &outcome.result {
      if let Some(session) = self.session.as_mut() {
        session.pending = false;
        session.last_error = Some(err.to_string());
        session.field_errors = match err {
          ApiError::Validation(failure) => FieldErrors::from_backend(&failure.errors),
          _ => None,
        };
      }
    } else {
      self.session = None;
    }

    outcome.result
  }

  #[allow(dead_code)]
  pub async fn submit(&mut self, form: &EmployeeForm) -> Result<Employee, ControllerError> {
    let pending = self.prepare_submit(form)?;
    let outcome = pending.run().await;
    Ok(self.complete_submit(outcome)?)
  }

  // ==========================================================================
  // Delete
  // ==========================================================================

  /// Valid from any session state.
  pub fn prepare_delete(&mut self, id: EmployeeId) -> Result<PendingDelete, IntentError> {
    if !self.deleting.insert(id) {
      return Err(IntentError::DeletePending(id));
    }
    Ok(PendingDelete {
      id,
      api: Arc::clone(&self.api),
      cache: self.cache.clone(),
    })
  }

  /// Apply a finished delete.
  ///
  /// Deleting the record open in the edit form closes the form and drops
  /// its unsaved changes.
  pub fn complete_delete(&mut self, outcome: DeleteOutcome) -> ApiResult<()> {
    self.deleting.remove(&outcome.id);

    match &outcome.result {
      Ok(()) => {
        info!(id = outcome.id, "employee deleted");
        self.notify(Level::Success, "Employee deleted".to_string());

        let editing_deleted = self
          .session
          .as_ref()
          .and_then(EditSession::editing)
          .is_some_and(|e| e.id == outcome.id);
        if editing_deleted {
          info!(id = outcome.id, "closing edit form for deleted employee");
          self.session = None;
        }
      }
      Err(err) => {
        warn!(id = outcome.id, error = %err, "failed to delete employee");
        self.notify(Level::Error, format!("Failed to delete employee: {}", err));
        // Someone else removed it; the listing that offered it is out of date
        if err.is_not_found() {
          self.cache.invalidate(Invalidation::All);
        }
      }
    }

    outcome.result
  }

  #[allow(dead_code)]
  pub async fn request_delete(&mut self, id: EmployeeId) -> Result<(), ControllerError> {
    let pending = self.prepare_delete(id)?;
    let outcome = pending.run().await;
    Ok(self.complete_delete(outcome)?)
  }

  // ==========================================================================
  // Listing
  // ==========================================================================

  pub fn page_key(&self) -> PageKey {
    self.listing.key
  }

  /// Switch to page `page` (zero-based), clamped to the last known page.
  /// Returns whether the current page changed.
  pub fn change_page(&mut self, page: u32) -> bool {
    let page = match &self.listing.window {
      Some(window) => page.min(window.total_pages() - 1),
      None => page,
    };
    if page == self.listing.key.page() {
      return false;
    }
    self.listing.key = self.listing.key.with_page(page);
    debug!(key = %self.listing.key, "page changed");
    true
  }

  pub fn next_page(&mut self) -> bool {
    self.change_page(self.listing.key.page().saturating_add(1))
  }

  pub fn previous_page(&mut self) -> bool {
    self.change_page(self.listing.key.page().saturating_sub(1))
  }

  /// Start loading the current page. Any cached window for it, even a stale
  /// one, is shown while the read is pending.
  pub fn prepare_load(&mut self) -> PendingLoad {
    let key = self.listing.key;
    match self.cache.peek(key) {
      Some(cached) => {
        debug!(%key, stale = cached.is_stale(), "showing cached page while loading");
        self.listing.window = Some(cached.data);
        self.listing.fetched_at = Some(cached.fetched_at);
      }
      None => {
        let same_page = self
          .listing
          .window
          .as_ref()
          .is_some_and(|w| w.page_index == key.page() && w.page_size == key.size());
        if !same_page {
          self.listing.window = None;
          self.listing.fetched_at = None;
        }
      }
    }
    self.listing.loading = true;
    self.listing.error = None;
    PendingLoad {
      key,
      cache: self.cache.clone(),
    }
  }

  /// Invalidate the current page, then load it.
  pub fn prepare_refresh(&mut self) -> PendingLoad {
    self
      .cache
      .invalidate(Invalidation::Page(self.listing.key.page()));
    self.prepare_load()
  }

  pub fn complete_load(&mut self, outcome: LoadOutcome) -> LoadStatus {
    if outcome.key != self.listing.key {
      debug!(key = %outcome.key, current = %self.listing.key, "discarding load for stale page");
      return LoadStatus::Discarded;
    }
    self.listing.loading = false;

    match outcome.result {
      Ok(result) => {
        let window = result.data;
        let past_end =
          window.is_empty() && window.total_elements > 0 && outcome.key.page() > 0;
        let last_page = window.total_pages() - 1;
        self.listing.window = Some(window);
        self.listing.fetched_at = Some(result.fetched_at);

        if past_end && last_page < outcome.key.page() {
          self.listing.key = outcome.key.with_page(last_page);
          self.listing.loading = true;
          debug!(key = %self.listing.key, "page past the end, moving back");
          return LoadStatus::Reload;
        }
        LoadStatus::Applied
      }
      Err(err) => {
        warn!(key = %outcome.key, error = %err, "failed to load employees");
        self.listing.error = Some(err.to_string());
        self.notify(Level::Error, format!("Failed to load employees: {}", err));
        LoadStatus::Applied
      }
    }
  }

  /// Load the current page, following at most one move back past the end.
  #[allow(dead_code)]
  pub async fn load(&mut self) {
    for _ in 0..2 {
      let outcome = self.prepare_load().run().await;
      if self.complete_load(outcome) != LoadStatus::Reload {
        return;
      }
    }
  }

  // ==========================================================================
  // Presentation
  // ==========================================================================

  fn notify(&mut self, level: Level, message: String) {
    self.notifications.push_back(Notification { level, message });
  }

  /// Drain queued notifications, oldest first
  pub fn take_notifications(&mut self) -> Vec<Notification> {
    self.notifications.drain(..).collect()
  }

  pub fn view_model(&self) -> ViewModel<'_> {
    let key = self.listing.key;
    let window = self.listing.window.as_ref();
    ViewModel {
      records: window.map(|w| w.content.as_slice()).unwrap_or(&[]),
      loading: self.listing.loading,
      error: self.listing.error.as_deref(),
      page: PageMeta {
        index: key.page(),
        size: key.size(),
        total_elements: window.map(|w| w.total_elements).unwrap_or(0),
        total_pages: window.map(|w| w.total_pages()).unwrap_or(1),
      },
      fetched_at: self.listing.fetched_at,
      session: self.session.as_ref(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::fake::FakeBackend;
  use crate::api::error::ValidationFailure;
  use crate::api::Gender;
  use crate::validation::Field;
  use std::num::NonZeroU32;

  fn setup(records: usize) -> (Arc<FakeBackend>, PageCache, Controller) {
    let backend = Arc::new(FakeBackend::with_records(records));
    let cache = PageCache::new(backend.clone());
    let key = PageKey::new(0, NonZeroU32::new(8).unwrap());
    let controller = Controller::new(backend.clone(), cache.clone(), key);
    (backend, cache, controller)
  }

  fn scenario_form() -> EmployeeForm {
    EmployeeForm {
      full_name: "Nguyen Van A".to_string(),
      email: "a@x.com".to_string(),
      date_of_birth: "1990-01-01".to_string(),
      gender: Some(Gender::Male),
      phone_number: "0912345678".to_string(),
      password: "secret1".to_string(),
      active: true,
    }
  }

  #[tokio::test]
  async fn test_initial_load() {
    let (_backend, _cache, mut controller) = setup(10);
    controller.load().await;

    let vm = controller.view_model();
    assert!(!vm.loading);
    assert_eq!(vm.records.len(), 8);
    assert_eq!(vm.page.total_elements, 10);
    assert_eq!(vm.page.total_pages, 2);
    assert!(vm.session.is_none());
  }

  #[test]
  fn test_cancel_when_idle_is_noop() {
    let (_backend, _cache, mut controller) = setup(0);
    controller.cancel();
    assert!(!controller.is_composing());
    assert!(controller.take_notifications().is_empty());
  }

  #[test]
  fn test_start_edit_while_composing_is_rejected() {
    let (_backend, _cache, mut controller) = setup(0);
    controller.start_create().unwrap();

    let other = crate::api::fake::sample_employee(3);
    assert_eq!(
      controller.start_edit(other.clone()),
      Err(IntentError::AlreadyComposing)
    );
    assert_eq!(controller.session().unwrap().target(), &SessionTarget::New);

    controller.cancel();
    controller.start_edit(other.clone()).unwrap();
    assert_eq!(controller.session().unwrap().editing(), Some(&other));
  }

  #[tokio::test]
  async fn test_create_scenario_round_trip() {
    let (backend, cache, mut controller) = setup(3);
    controller.load().await;
    let before = controller.view_model().page.total_elements;

    controller.start_create().unwrap();
    let created = controller.submit(&scenario_form()).await.unwrap();
    assert_eq!(created.id, 4);
    assert_eq!(created.email, "a@x.com");

    assert!(!controller.is_composing());
    assert!(cache.peek(controller.page_key()).unwrap().is_stale());

    controller.load().await;
    let vm = controller.view_model();
    assert_eq!(vm.page.total_elements, before + 1);
    assert_eq!(vm.records.iter().filter(|e| e.id == created.id).count(), 1);
    assert_eq!(backend.list_calls(), 2);

    let notes = controller.take_notifications();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].level, Level::Success);
  }

  #[tokio::test]
  async fn test_invalid_update_keeps_session_and_cache() {
    let (backend, cache, mut controller) = setup(8);
    controller.load().await;

    let employee = controller.view_model().records[4].clone();
    assert_eq!(employee.id, 5);
    controller.start_edit(employee.clone()).unwrap();

    let mut form = EmployeeForm::from_employee(&employee);
    form.email = "bad-email".to_string();

    let err = controller.submit(&form).await.unwrap_err();
    match err {
      ControllerError::Intent(IntentError::Invalid(errors)) => {
        assert!(errors.for_field(Field::Email).is_some());
      }
      other => panic!("expected field errors, got {:?}", other),
    }

    let session = controller.session().unwrap();
    assert_eq!(session.editing(), Some(&employee));
    assert!(!session.is_pending());
    assert_eq!(backend.write_calls(), 0);
    assert!(!cache.peek(controller.page_key()).unwrap().is_stale());
  }

  #[tokio::test]
  async fn test_backend_rejection_keeps_session_open() {
    let (backend, cache, mut controller) = setup(8);
    controller.load().await;

    let employee = controller.view_model().records[4].clone();
    controller.start_edit(employee.clone()).unwrap();

    // Email of record 1 is taken
    let mut form = EmployeeForm::from_employee(&employee);
    form.email = "employee1@example.com".to_string();

    let err = controller.submit(&form).await.unwrap_err();
    assert!(matches!(err, ControllerError::Api(ApiError::Validation(_))));
    assert_eq!(backend.write_calls(), 1);

    let session = controller.session().unwrap();
    assert!(!session.is_pending());
    assert!(session.last_error().unwrap().contains("already exists"));
    assert!(!cache.peek(controller.page_key()).unwrap().is_stale());

    let notes = controller.take_notifications();
    assert_eq!(notes[0].level, Level::Error);

    // User corrects the input and resubmits from the same session
    form.email = "fixed@example.com".to_string();
    let updated = controller.submit(&form).await.unwrap();
    assert_eq!(updated.email, "fixed@example.com");
    assert!(!controller.is_composing());
  }

  #[tokio::test]
  async fn test_backend_field_errors_reach_the_session() {
    let (backend, _cache, mut controller) = setup(3);
    controller.start_create().unwrap();

    backend.fail_next(ApiError::Validation(ValidationFailure {
      status: 400,
      message: "Validation failed".to_string(),
      errors: vec!["phoneNumber: Phone number is already registered".to_string()],
    }));
    let err = controller.submit(&scenario_form()).await.unwrap_err();
    assert!(matches!(err, ControllerError::Api(ApiError::Validation(_))));

    let session = controller.session().unwrap();
    let errors = session.field_errors().unwrap();
    assert_eq!(
      errors.for_field(Field::PhoneNumber),
      Some("Phone number is already registered")
    );
    assert!(errors.for_field(Field::Email).is_none());

    // A transport failure on retry clears them
    backend.fail_next(ApiError::Transport("connection reset".to_string()));
    controller.submit(&scenario_form()).await.unwrap_err();
    assert!(controller.session().unwrap().field_errors().is_none());
  }

  #[tokio::test]
  async fn test_submit_is_not_reentrant() {
    let (backend, _cache, mut controller) = setup(0);
    controller.start_create().unwrap();

    let first = controller.prepare_submit(&scenario_form()).unwrap();
    assert!(controller.session().unwrap().is_pending());
    assert!(matches!(
      controller.prepare_submit(&scenario_form()),
      Err(IntentError::SubmitPending)
    ));

    backend.fail_next(ApiError::Transport("connection reset".to_string()));
    let outcome = first.run().await;
    assert!(controller.complete_submit(outcome).is_err());

    // Failure releases the guard
    let retry = controller.prepare_submit(&scenario_form()).unwrap();
    let outcome = retry.run().await;
    assert!(controller.complete_submit(outcome).is_ok());
    assert_eq!(backend.write_calls(), 2);
  }

  #[tokio::test]
  async fn test_cancel_during_write_does_not_resurrect_session() {
    let (backend, cache, mut controller) = setup(2);
    controller.load().await;

    controller.start_create().unwrap();
    let pending = controller.prepare_submit(&scenario_form()).unwrap();
    controller.cancel();

    let outcome = pending.run().await;
    assert!(controller.complete_submit(outcome).is_ok());
    assert!(controller.session().is_none());
    assert_eq!(backend.len(), 3);
    assert!(cache.peek(controller.page_key()).unwrap().is_stale());

    // A new session opened meanwhile is not touched by the old write either
    controller.start_create().unwrap();
    let pending = controller.prepare_submit(&EmployeeForm {
      email: "b@x.com".to_string(),
      ..scenario_form()
    });
    let pending = pending.unwrap();
    controller.cancel();
    controller.start_create().unwrap();
    let outcome = pending.run().await;
    controller.complete_submit(outcome).unwrap();
    let session = controller.session().unwrap();
    assert!(!session.is_pending());
    assert_eq!(session.target(), &SessionTarget::New);
  }

  #[tokio::test]
  async fn test_delete_then_lookup_is_not_found() {
    let (backend, _cache, mut controller) = setup(3);
    controller.load().await;

    controller.request_delete(2).await.unwrap();
    assert_eq!(backend.get_by_id(2).await, Err(ApiError::NotFound(2)));

    controller.load().await;
    let vm = controller.view_model();
    assert_eq!(vm.page.total_elements, 2);
    assert!(vm.records.iter().all(|e| e.id != 2));
  }

  #[tokio::test]
  async fn test_delete_failure_reports_without_transition() {
    let (_backend, _cache, mut controller) = setup(3);
    controller.start_create().unwrap();

    let err = controller.request_delete(42).await.unwrap_err();
    assert_eq!(err, ControllerError::Api(ApiError::NotFound(42)));
    assert!(controller.is_composing());

    let notes = controller.take_notifications();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].level, Level::Error);
  }

  #[tokio::test]
  async fn test_delete_of_vanished_record_invalidates_listing() {
    let (backend, cache, mut controller) = setup(3);
    controller.load().await;

    // Removed behind our back
    backend.delete(3).await.unwrap();
    let err = controller.request_delete(3).await.unwrap_err();
    assert!(matches!(err, ControllerError::Api(ApiError::NotFound(3))));
    assert!(cache.peek(controller.page_key()).unwrap().is_stale());

    controller.load().await;
    assert_eq!(controller.view_model().page.total_elements, 2);
  }

  #[tokio::test]
  async fn test_duplicate_delete_is_rejected_while_pending() {
    let (_backend, _cache, mut controller) = setup(3);
    let pending = controller.prepare_delete(1).unwrap();
    assert!(matches!(
      controller.prepare_delete(1),
      Err(IntentError::DeletePending(1))
    ));
    let outcome = pending.run().await;
    controller.complete_delete(outcome).unwrap();
    assert!(controller.prepare_delete(1).is_ok());
  }

  #[tokio::test]
  async fn test_deleting_record_under_edit_closes_session() {
    let (_backend, _cache, mut controller) = setup(3);
    controller.load().await;

    let employee = controller.view_model().records[1].clone();
    controller.start_edit(employee.clone()).unwrap();
    controller.request_delete(employee.id).await.unwrap();
    assert!(!controller.is_composing());

    // Deleting some other record leaves an open session alone
    controller.start_create().unwrap();
    controller.request_delete(1).await.unwrap();
    assert!(controller.is_composing());
  }

  #[tokio::test]
  async fn test_change_page_clamps_to_last_page() {
    let (_backend, _cache, mut controller) = setup(20);
    controller.load().await;

    assert!(controller.change_page(7));
    assert_eq!(controller.page_key().page(), 2);
    assert!(!controller.next_page());

    controller.load().await;
    assert_eq!(controller.view_model().records.len(), 4);

    assert!(controller.previous_page());
    assert_eq!(controller.page_key().page(), 1);
  }

  #[tokio::test]
  async fn test_load_for_previous_page_is_discarded() {
    let (_backend, _cache, mut controller) = setup(20);
    let stale = controller.prepare_load();
    assert!(controller.change_page(1));
    let current = controller.prepare_load();

    let outcome = stale.run().await;
    assert_eq!(controller.complete_load(outcome), LoadStatus::Discarded);
    assert!(controller.view_model().loading);

    let outcome = current.run().await;
    assert_eq!(controller.complete_load(outcome), LoadStatus::Applied);
    assert_eq!(controller.view_model().records[0].id, 9);
  }

  #[tokio::test]
  async fn test_deleting_last_record_on_page_moves_back() {
    let (_backend, _cache, mut controller) = setup(9);
    controller.load().await;
    controller.next_page();
    controller.load().await;
    assert_eq!(controller.view_model().records.len(), 1);

    controller.request_delete(9).await.unwrap();
    controller.load().await;

    let vm = controller.view_model();
    assert_eq!(vm.page.index, 0);
    assert_eq!(vm.records.len(), 8);
  }

  #[tokio::test]
  async fn test_load_failure_keeps_previous_window() {
    let (backend, _cache, mut controller) = setup(5);
    controller.load().await;

    backend.fail_next(ApiError::Transport("503 Service Unavailable".to_string()));
    let outcome = controller.prepare_refresh().run().await;
    controller.complete_load(outcome);

    let vm = controller.view_model();
    assert_eq!(vm.records.len(), 5);
    assert!(vm.error.unwrap().contains("503"));
    assert!(!vm.loading);
  }
}
