use crate::api::Gender;
use ratatui::prelude::{Color, Rect};

/// Truncate a string to at most `max_chars` characters, adding "..." if truncated
pub fn truncate(s: &str, max_chars: usize) -> String {
  if s.chars().count() <= max_chars {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

pub fn active_color(active: bool) -> Color {
  if active {
    Color::Green
  } else {
    Color::DarkGray
  }
}

pub fn gender_color(gender: Gender) -> Color {
  match gender {
    Gender::Male => Color::Blue,
    Gender::Female => Color::Magenta,
    Gender::Other => Color::White,
  }
}

/// A `width` x `height` rect centered in `area`, shrunk to fit
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
  let width = width.min(area.width);
  let height = height.min(area.height);
  let x = area.x + (area.width - width) / 2;
  let y = area.y + (area.height - height) / 2;
  Rect::new(x, y, width, height)
}
