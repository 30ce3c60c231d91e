pub mod components;
pub mod renderfns;
pub mod views;

use crate::app::Screen;
use ratatui::prelude::*;

/// Main draw function
pub fn draw(frame: &mut Frame, screen: Screen<'_>) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Employee table
      Constraint::Length(1), // Status bar
    ])
    .split(frame.area());

  renderfns::draw_header(frame, chunks[0], screen.title, screen.api_url);
  views::draw_employee_table(frame, chunks[1], &screen.view, screen.table);
  renderfns::draw_footer(
    frame,
    chunks[2],
    screen.status,
    screen.view.page,
    screen.view.fetched_at,
  );

  // Overlays on top of the table
  if let Some(form) = screen.form {
    form.render(frame, chunks[1], screen.view.session);
  }
  if let Some(confirm) = screen.confirm {
    confirm.render(frame, chunks[1]);
  }
}
