use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the header bar with logo, backend and shortcuts
pub fn draw_header(frame: &mut Frame, area: Rect, title: &str, api_url: &str) {
  let domain = extract_domain(api_url);

  let mut spans = vec![
    Span::styled(" roster ", Style::default().fg(Color::Cyan).bold()),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(format!(" {} ", title), Style::default().fg(Color::Yellow).bold()),
  ];
  if title != domain {
    spans.push(Span::styled("│", Style::default().fg(Color::DarkGray)));
    spans.push(Span::styled(
      format!(" {} ", domain),
      Style::default().fg(Color::White),
    ));
  }
  spans.push(Span::raw("  "));

  // Shortcuts - keys highlighted, descriptions dimmed
  for (key, label) in [
    ("<a>", "new"),
    ("<e>", "edit"),
    ("<d>", "delete"),
    ("<h/l>", "page"),
    ("<r>", "refresh"),
    ("<q>", "quit"),
  ] {
    spans.push(Span::styled(key, Style::default().fg(Color::Cyan)));
    spans.push(Span::styled(
      format!(" {}   ", label),
      Style::default().fg(Color::DarkGray),
    ));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}

/// Host (and port) part of the API url
fn extract_domain(url: &str) -> &str {
  url
    .strip_prefix("https://")
    .or_else(|| url.strip_prefix("http://"))
    .unwrap_or(url)
    .split('/')
    .next()
    .unwrap_or(url)
}
