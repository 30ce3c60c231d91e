use super::{KeyResult, TextInput};
use crate::api::{Employee, Gender};
use crate::controller::EditSession;
use crate::ui::renderfns::centered_rect;
use crate::validation::{EmployeeForm, Field, FieldErrors};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

const LABEL_WIDTH: usize = 15;

/// Events emitted by the form that the app needs to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
  Submit,
  Cancel,
}

/// Popup form for creating or editing an employee
#[derive(Debug, Clone)]
pub struct EmployeeFormView {
  creating: bool,
  full_name: TextInput,
  email: TextInput,
  date_of_birth: TextInput,
  gender: Option<Gender>,
  phone_number: TextInput,
  password: TextInput,
  active: bool,
  focus: usize,
  errors: Option<FieldErrors>,
}

impl EmployeeFormView {
  pub fn for_create() -> Self {
    Self::from_form(true, EmployeeForm::default())
  }

  pub fn for_edit(employee: &Employee) -> Self {
    Self::from_form(false, EmployeeForm::from_employee(employee))
  }

  fn from_form(creating: bool, form: EmployeeForm) -> Self {
    Self {
      creating,
      full_name: TextInput::with_value(&form.full_name),
      email: TextInput::with_value(&form.email),
      date_of_birth: TextInput::with_value(&form.date_of_birth),
      gender: form.gender,
      phone_number: TextInput::with_value(&form.phone_number),
      password: TextInput::masked(),
      active: form.active,
      focus: 0,
      errors: None,
    }
  }

  /// Fields in tab order. The password only exists when creating.
  fn fields(&self) -> &'static [Field] {
    if self.creating {
      &[
        Field::FullName,
        Field::Email,
        Field::DateOfBirth,
        Field::Gender,
        Field::PhoneNumber,
        Field::Password,
        Field::Active,
      ]
    } else {
      &[
        Field::FullName,
        Field::Email,
        Field::DateOfBirth,
        Field::Gender,
        Field::PhoneNumber,
        Field::Active,
      ]
    }
  }

  pub fn focused(&self) -> Field {
    self.fields()[self.focus]
  }

  fn input_mut(&mut self, field: Field) -> Option<&mut TextInput> {
    match field {
      Field::FullName => Some(&mut self.full_name),
      Field::Email => Some(&mut self.email),
      Field::DateOfBirth => Some(&mut self.date_of_birth),
      Field::PhoneNumber => Some(&mut self.phone_number),
      Field::Password => Some(&mut self.password),
      Field::Gender | Field::Active => None,
    }
  }

  fn input(&self, field: Field) -> Option<&TextInput> {
    match field {
      Field::FullName => Some(&self.full_name),
      Field::Email => Some(&self.email),
      Field::DateOfBirth => Some(&self.date_of_birth),
      Field::PhoneNumber => Some(&self.phone_number),
      Field::Password => Some(&self.password),
      Field::Gender | Field::Active => None,
    }
  }

  /// Current input as a form to validate
  pub fn to_form(&self) -> EmployeeForm {
    EmployeeForm {
      full_name: self.full_name.value().to_string(),
      email: self.email.value().to_string(),
      date_of_birth: self.date_of_birth.value().to_string(),
      gender: self.gender,
      phone_number: self.phone_number.value().to_string(),
      password: self.password.value().to_string(),
      active: self.active,
    }
  }

  /// Show validation errors and move focus to the first failing field
  pub fn set_errors(&mut self, errors: FieldErrors) {
    if let Some(first) = errors.iter().next() {
      if let Some(pos) = self.fields().iter().position(|f| *f == first.field) {
        self.focus = pos;
      }
    }
    self.errors = Some(errors);
  }

  pub fn clear_errors(&mut self) {
    self.errors = None;
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<FormEvent> {
    let field_count = self.fields().len();
    match key.code {
      KeyCode::Esc => return KeyResult::Event(FormEvent::Cancel),
      KeyCode::Enter => return KeyResult::Event(FormEvent::Submit),
      KeyCode::Tab | KeyCode::Down => {
        self.focus = (self.focus + 1) % field_count;
        return KeyResult::Handled;
      }
      KeyCode::BackTab | KeyCode::Up => {
        self.focus = (self.focus + field_count - 1) % field_count;
        return KeyResult::Handled;
      }
      _ => {}
    }

    let field = self.focused();
    match field {
      Field::Gender => match key.code {
        KeyCode::Char(' ') | KeyCode::Right => {
          self.gender = Some(self.gender.map(|g| g.cycle()).unwrap_or(Gender::Male));
        }
        KeyCode::Char('m') => self.gender = Some(Gender::Male),
        KeyCode::Char('f') => self.gender = Some(Gender::Female),
        KeyCode::Char('o') => self.gender = Some(Gender::Other),
        _ => return KeyResult::NotHandled,
      },
      Field::Active => match key.code {
        KeyCode::Char(' ') | KeyCode::Right | KeyCode::Left => self.active = !self.active,
        KeyCode::Char('y') => self.active = true,
        KeyCode::Char('n') => self.active = false,
        _ => return KeyResult::NotHandled,
      },
      _ => {
        let handled = self
          .input_mut(field)
          .is_some_and(|input| input.handle_key(key));
        if !handled {
          return KeyResult::NotHandled;
        }
      }
    }
    KeyResult::Handled
  }

  fn value_text(&self, field: Field) -> String {
    match field {
      Field::Gender => match self.gender {
        Some(gender) => format!("< {} >", gender.label()),
        None => "< select >".to_string(),
      },
      Field::Active if self.active => "[x] active".to_string(),
      Field::Active => "[ ] inactive".to_string(),
      _ => self.input(field).map(TextInput::display).unwrap_or_default(),
    }
  }

  pub fn render(&self, frame: &mut Frame, area: Rect, session: Option<&EditSession>) {
    let fields = self.fields();
    // Each field takes a value row and an error row
    let height = (fields.len() as u16) * 2 + 5;
    let popup = centered_rect(64, height, area);
    frame.render_widget(Clear, popup);

    let title = match session.and_then(EditSession::editing) {
      Some(employee) => format!(" Edit employee #{} ", employee.id),
      None => " New employee ".to_string(),
    };
    let pending = session.is_some_and(EditSession::is_pending);
    let block = Block::default()
      .title(title)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(if pending { Color::DarkGray } else { Color::Yellow }));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let mut lines = Vec::new();
    for (i, field) in fields.iter().enumerate() {
      let focused = i == self.focus;
      let label_style = if focused {
        Style::default().fg(Color::Cyan).bold()
      } else {
        Style::default().fg(Color::Gray)
      };
      lines.push(Line::from(vec![
        Span::styled(format!(" {:<width$}", field.label(), width = LABEL_WIDTH), label_style),
        Span::styled(self.value_text(*field), Style::default().fg(Color::White)),
      ]));

      let error = self.errors.as_ref().and_then(|e| e.for_field(*field));
      lines.push(match error {
        Some(message) => Line::from(Span::styled(
          format!(" {:<width$}{}", "", message, width = LABEL_WIDTH),
          Style::default().fg(Color::Red),
        )),
        None => Line::raw(""),
      });
    }

    let status = if pending {
      Line::from(Span::styled(" Saving...", Style::default().fg(Color::Yellow)))
    } else if let Some(err) = session.and_then(EditSession::last_error) {
      Line::from(Span::styled(format!(" {}", err), Style::default().fg(Color::Red)))
    } else {
      Line::raw("")
    };
    lines.push(status);
    lines.push(Line::from(vec![
      Span::styled(" <tab>", Style::default().fg(Color::Cyan)),
      Span::styled(" next  ", Style::default().fg(Color::DarkGray)),
      Span::styled("<space>", Style::default().fg(Color::Cyan)),
      Span::styled(" toggle  ", Style::default().fg(Color::DarkGray)),
      Span::styled("<enter>", Style::default().fg(Color::Cyan)),
      Span::styled(" save  ", Style::default().fg(Color::DarkGray)),
      Span::styled("<esc>", Style::default().fg(Color::Cyan)),
      Span::styled(" cancel", Style::default().fg(Color::DarkGray)),
    ]));

    frame.render_widget(Paragraph::new(lines), inner);

    let field = self.focused();
    if let Some(input) = self.input(field) {
      let x = inner.x + 1 + LABEL_WIDTH as u16 + input.cursor_position() as u16;
      let y = inner.y + (self.focus as u16) * 2;
      if x < inner.right() && y < inner.bottom() {
        frame.set_cursor_position((x, y));
      }
    }
  }
}
