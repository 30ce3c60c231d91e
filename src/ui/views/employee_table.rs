use crate::api::Employee;
use crate::controller::ViewModel;
use crate::ui::renderfns::{active_color, gender_color, truncate};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};

const HEADERS: [&str; 8] = [
  "ID", "Full name", "Email", "Born", "Gender", "Phone", "Active", "Created",
];

/// Clamp the selection to the rows on screen
pub fn ensure_valid_selection(state: &mut TableState, len: usize) {
  match state.selected() {
    _ if len == 0 => state.select(None),
    Some(i) if i >= len => state.select(Some(len - 1)),
    None => state.select(Some(0)),
    Some(_) => {}
  }
}

fn title(vm: &ViewModel<'_>) -> String {
  let paging = format!(
    "page {}/{}, {} total",
    vm.page.index + 1,
    vm.page.total_pages,
    vm.page.total_elements
  );
  if vm.loading {
    format!(" Employees ({}) (loading...) ", paging)
  } else if let Some(err) = vm.error {
    format!(" Employees ({}) (error: {}) ", paging, truncate(err, 40))
  } else {
    format!(" Employees ({}) ", paging)
  }
}

fn row(employee: &Employee) -> Row<'static> {
  Row::new(vec![
    Cell::from(employee.id.to_string()).style(Style::default().fg(Color::Cyan)),
    Cell::from(truncate(&employee.full_name, 28)),
    Cell::from(truncate(&employee.email, 32)),
    Cell::from(employee.date_of_birth.format("%d/%m/%Y").to_string()),
    Cell::from(employee.gender.label()).style(Style::default().fg(gender_color(employee.gender))),
    Cell::from(employee.phone_number.clone()),
    Cell::from(if employee.active { "yes" } else { "no" })
      .style(Style::default().fg(active_color(employee.active))),
    Cell::from(employee.created_at.format("%d/%m/%Y %H:%M").to_string())
      .style(Style::default().fg(Color::DarkGray)),
  ])
}

pub fn draw_employee_table(frame: &mut Frame, area: Rect, vm: &ViewModel<'_>, state: &mut TableState) {
  ensure_valid_selection(state, vm.records.len());

  let block = Block::default()
    .title(title(vm))
    .title_alignment(Alignment::Center)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Blue));

  if vm.records.is_empty() {
    let content = if vm.loading {
      "Loading employees..."
    } else if vm.error.is_some() {
      "Failed to load employees. Press 'r' to retry."
    } else {
      "No employees yet. Press 'a' to add one."
    };
    let paragraph = Paragraph::new(content)
      .block(block)
      .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
    return;
  }

  let header = Row::new(HEADERS.iter().map(|h| Cell::from(*h)))
    .style(Style::default().fg(Color::Yellow).bold());
  let rows: Vec<Row> = vm.records.iter().map(row).collect();
  let widths = [
    Constraint::Length(6),
    Constraint::Min(16),
    Constraint::Min(20),
    Constraint::Length(10),
    Constraint::Length(6),
    Constraint::Length(11),
    Constraint::Length(6),
    Constraint::Length(16),
  ];

  let table = Table::new(rows, widths)
    .header(header)
    .block(block)
    .row_highlight_style(
      Style::default()
        .bg(Color::DarkGray)
        .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("> ");

  frame.render_stateful_widget(table, area, state);
}
