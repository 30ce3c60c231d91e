use crate::api::Employee;
use crate::config::Config;
use crate::controller::{
  Controller, EditSession, IntentError, Level, LoadStatus, Notification, ViewModel,
};
use crate::event::{Event, EventHandler};
use crate::ui;
use crate::ui::components::{ConfirmDelete, ConfirmEvent, EmployeeFormView, FormEvent, KeyResult};
use crate::ui::views::ensure_valid_selection;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use ratatui::widgets::TableState;
use std::io::stdout;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

/// Borrowed state for rendering one frame
pub struct Screen<'a> {
  pub title: &'a str,
  pub api_url: &'a str,
  pub view: ViewModel<'a>,
  pub table: &'a mut TableState,
  pub form: Option<&'a EmployeeFormView>,
  pub confirm: Option<&'a ConfirmDelete>,
  pub status: Option<&'a Notification>,
}

/// Main application state
pub struct App {
  controller: Controller,

  /// Application configuration
  config: Config,

  /// Header title, resolved once from config
  title: String,

  table_state: TableState,

  /// Open create/edit popup. Present exactly while the controller has a session.
  form: Option<EmployeeFormView>,

  /// Pending delete confirmation
  confirm: Option<ConfirmDelete>,

  /// Latest notification for the status bar
  status: Option<Notification>,

  /// Event sender for async tasks
  event_tx: mpsc::UnboundedSender<Event>,

  /// Whether to quit
  should_quit: bool,
}

impl App {
  pub fn new(config: Config, controller: Controller) -> Self {
    let (tx, _rx) = mpsc::unbounded_channel();
    Self {
      controller,
      title: config.display_title(),
      config,
      table_state: TableState::default(),
      form: None,
      confirm: None,
      status: None,
      event_tx: tx,
      should_quit: false,
    }
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    // Create event handler
    let mut events = EventHandler::new(Duration::from_millis(250));
    self.event_tx = events.sender();

    // Initial data load
    self.load();

    let result = self.main_loop(&mut terminal, &mut events).await;

    // Cleanup terminal, even when the loop failed
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn main_loop(
    &mut self,
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    events: &mut EventHandler,
  ) -> Result<()> {
    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self.screen()))?;

      if let Some(event) = events.next().await {
        self.handle_event(event);
      }
    }
    Ok(())
  }

  fn screen(&mut self) -> Screen<'_> {
    Screen {
      title: &self.title,
      api_url: &self.config.api.url,
      view: self.controller.view_model(),
      table: &mut self.table_state,
      form: self.form.as_ref(),
      confirm: self.confirm.as_ref(),
      status: self.status.as_ref(),
    }
  }

  // ==========================================================================
  // Background requests
  // ==========================================================================

  fn load(&mut self) {
    debug!(key = %self.controller.page_key(), "loading page");
    let pending = self.controller.prepare_load();
    let tx = self.event_tx.clone();
    tokio::spawn(async move {
      let _ = tx.send(Event::Loaded(pending.run().await));
    });
  }

  fn refresh(&mut self) {
    let pending = self.controller.prepare_refresh();
    let tx = self.event_tx.clone();
    tokio::spawn(async move {
      let _ = tx.send(Event::Loaded(pending.run().await));
    });
  }

  fn submit(&mut self) {
    let Some(form) = self.form.as_mut() else {
      return;
    };
    match self.controller.prepare_submit(&form.to_form()) {
      Ok(pending) => {
        form.clear_errors();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
          let _ = tx.send(Event::Written(pending.run().await));
        });
      }
      Err(IntentError::Invalid(errors)) => {
        debug!(count = errors.len(), "form rejected locally");
        form.set_errors(errors);
      }
      Err(err) => self.show_error(err),
    }
  }

  fn delete(&mut self, employee: &Employee) {
    match self.controller.prepare_delete(employee.id) {
      Ok(pending) => {
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
          let _ = tx.send(Event::Deleted(pending.run().await));
        });
      }
      Err(err) => self.show_error(err),
    }
  }

  // ==========================================================================
  // Events
  // ==========================================================================

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Tick => {} // UI refresh happens automatically
      Event::Loaded(outcome) => {
        if self.controller.complete_load(outcome) == LoadStatus::Reload {
          self.load();
        }
      }
      Event::Written(outcome) => match self.controller.complete_submit(outcome) {
        Ok(_) => self.load(),
        Err(err) if err.is_validation() => {
          let errors = self.controller.session().and_then(EditSession::field_errors);
          if let (Some(form), Some(errors)) = (self.form.as_mut(), errors) {
            form.set_errors(errors.clone());
          }
        }
        Err(_) => {}
      },
      Event::Deleted(outcome) => match self.controller.complete_delete(outcome) {
        Ok(()) => self.load(),
        Err(err) if err.is_not_found() => self.load(),
        Err(_) => {}
      },
    }

    // A closed session takes its form with it
    if !self.controller.is_composing() {
      self.form = None;
    }
    let rows = self.controller.view_model().records.len();
    ensure_valid_selection(&mut self.table_state, rows);
    if let Some(latest) = self.controller.take_notifications().pop() {
      self.status = Some(latest);
    }
  }

  fn show_error(&mut self, err: IntentError) {
    self.status = Some(Notification {
      level: Level::Error,
      message: err.to_string(),
    });
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    if let Some(confirm) = &self.confirm {
      if let KeyResult::Event(event) = confirm.handle_key(key) {
        self.confirm = None;
        if let ConfirmEvent::Confirmed(employee) = event {
          self.delete(&employee);
        }
      }
      return;
    }

    if let Some(form) = self.form.as_mut() {
      match form.handle_key(key) {
        KeyResult::Event(FormEvent::Submit) => self.submit(),
        KeyResult::Event(FormEvent::Cancel) => {
          self.controller.cancel();
          self.form = None;
        }
        KeyResult::Handled | KeyResult::NotHandled => {}
      }
      return;
    }

    self.handle_list_key(key);
  }

  fn handle_list_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Char('q') => self.should_quit = true,

      // Navigation
      KeyCode::Down | KeyCode::Char('j') => self.table_state.select_next(),
      KeyCode::Up | KeyCode::Char('k') => self.table_state.select_previous(),
      KeyCode::Left | KeyCode::Char('h') => {
        if self.controller.previous_page() {
          self.table_state.select(Some(0));
          self.load();
        }
      }
      KeyCode::Right | KeyCode::Char('l') => {
        if self.controller.next_page() {
          self.table_state.select(Some(0));
          self.load();
        }
      }
      KeyCode::Char('r') => self.refresh(),

      // Mutations
      KeyCode::Enter | KeyCode::Char('a') => match self.controller.start_create() {
        Ok(()) => self.form = Some(EmployeeFormView::for_create()),
        Err(err) => self.show_error(err),
      },
      KeyCode::Char('e') => {
        if let Some(employee) = self.selected_employee() {
          let form = EmployeeFormView::for_edit(&employee);
          match self.controller.start_edit(employee) {
            Ok(()) => self.form = Some(form),
            Err(err) => self.show_error(err),
          }
        }
      }
      KeyCode::Char('d') => {
        if let Some(employee) = self.selected_employee() {
          self.confirm = Some(ConfirmDelete::new(employee));
        }
      }
      _ => {}
    }
  }

  fn selected_employee(&self) -> Option<Employee> {
    let index = self.table_state.selected()?;
    self.controller.view_model().records.get(index).cloned()
  }
}
