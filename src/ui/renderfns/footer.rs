use crate::controller::{Level, Notification, PageMeta};
use chrono::{DateTime, Local, Utc};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the status bar: last notification on the left, paging on the right
pub fn draw_footer(
  frame: &mut Frame,
  area: Rect,
  status: Option<&Notification>,
  page: PageMeta,
  fetched_at: Option<DateTime<Utc>>,
) {
  let left = match status {
    Some(note) => {
      let color = match note.level {
        Level::Success => Color::Green,
        Level::Error => Color::Red,
      };
      Span::styled(format!(" {}", note.message), Style::default().fg(color))
    }
    None => Span::styled(
      " j/k:nav  Enter/a:new  e:edit  d:delete  Ctrl-C:quit",
      Style::default().fg(Color::DarkGray),
    ),
  };

  let mut right = format!(
    "page {}/{}  {} total",
    page.index + 1,
    page.total_pages,
    page.total_elements
  );
  if let Some(at) = fetched_at {
    right.push_str(&format!(
      "  fetched {}",
      at.with_timezone(&Local).format("%H:%M:%S")
    ));
  }
  right.push(' ');

  let chunks = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Min(1), Constraint::Length(right.len() as u16)])
    .split(area);

  let bar = Style::default().bg(Color::Black);
  frame.render_widget(Paragraph::new(Line::from(left)).style(bar), chunks[0]);
  frame.render_widget(
    Paragraph::new(right)
      .style(bar.fg(Color::White))
      .alignment(Alignment::Right),
    chunks[1],
  );
}
