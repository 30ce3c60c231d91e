use super::KeyResult;
use crate::api::Employee;
use crate::ui::renderfns::centered_rect;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmEvent {
  Confirmed(Employee),
  Cancelled,
}

/// Yes/no prompt shown before deleting an employee
#[derive(Debug, Clone)]
pub struct ConfirmDelete {
  employee: Employee,
}

impl ConfirmDelete {
  pub fn new(employee: Employee) -> Self {
    Self { employee }
  }

  pub fn handle_key(&self, key: KeyEvent) -> KeyResult<ConfirmEvent> {
    match key.code {
      KeyCode::Char('y') | KeyCode::Char('Y') => {
        KeyResult::Event(ConfirmEvent::Confirmed(self.employee.clone()))
      }
      KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc | KeyCode::Char('q') => {
        KeyResult::Event(ConfirmEvent::Cancelled)
      }
      _ => KeyResult::Handled,
    }
  }

  pub fn render(&self, frame: &mut Frame, area: Rect) {
    let popup = centered_rect(50, 6, area);
    frame.render_widget(Clear, popup);

    let block = Block::default()
      .title(" Delete employee ")
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Red));

    let lines = vec![
      Line::from(vec![
        Span::raw(" Delete "),
        Span::styled(self.employee.full_name.clone(), Style::default().bold()),
        Span::raw(format!(" (#{})?", self.employee.id)),
      ]),
      Line::raw(""),
      Line::from(vec![
        Span::styled(" <y>", Style::default().fg(Color::Cyan)),
        Span::styled(" delete   ", Style::default().fg(Color::DarkGray)),
        Span::styled("<n>", Style::default().fg(Color::Cyan)),
        Span::styled(" keep", Style::default().fg(Color::DarkGray)),
      ]),
    ];

    let paragraph = Paragraph::new(lines)
      .block(block)
      .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, popup);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::fake::sample_employee;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  #[test]
  fn test_confirm_and_cancel() {
    let employee = sample_employee(2);
    let confirm = ConfirmDelete::new(employee.clone());
    assert_eq!(
      confirm.handle_key(key(KeyCode::Char('y'))),
      KeyResult::Event(ConfirmEvent::Confirmed(employee))
    );
    assert_eq!(
      confirm.handle_key(key(KeyCode::Esc)),
      KeyResult::Event(ConfirmEvent::Cancelled)
    );
    assert_eq!(confirm.handle_key(key(KeyCode::Char('x'))), KeyResult::Handled);
  }
}
