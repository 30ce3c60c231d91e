use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Single-line text input.
///
/// The cursor counts characters, not bytes, so names with diacritics edit
/// correctly.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
  buffer: String,
  cursor: usize,
  masked: bool,
}

impl TextInput {
  /// Input that renders every character as `*`
  pub fn masked() -> Self {
    Self {
      masked: true,
      ..Self::default()
    }
  }

  pub fn with_value(value: &str) -> Self {
    Self {
      buffer: value.to_string(),
      cursor: value.chars().count(),
      masked: false,
    }
  }

  pub fn value(&self) -> &str {
    &self.buffer
  }

  /// Text as it should be drawn
  pub fn display(&self) -> String {
    if self.masked {
      "*".repeat(self.buffer.chars().count())
    } else {
      self.buffer.clone()
    }
  }

  /// Cursor position in characters
  pub fn cursor_position(&self) -> usize {
    self.cursor
  }

  fn byte_index(&self, char_index: usize) -> usize {
    self
      .buffer
      .char_indices()
      .nth(char_index)
      .map(|(i, _)| i)
      .unwrap_or(self.buffer.len())
  }

  fn len_chars(&self) -> usize {
    self.buffer.chars().count()
  }

  /// Apply an editing key. Returns false for keys that are not edits
  /// (Enter, Esc, Tab...) so the parent can handle them.
  pub fn handle_key(&mut self, key: KeyEvent) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
      KeyCode::Backspace => {
        if self.cursor > 0 {
          self.cursor -= 1;
          let at = self.byte_index(self.cursor);
          self.buffer.remove(at);
        }
      }
      KeyCode::Delete => {
        if self.cursor < self.len_chars() {
          let at = self.byte_index(self.cursor);
          self.buffer.remove(at);
        }
      }
      KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
      KeyCode::Right => self.cursor = (self.cursor + 1).min(self.len_chars()),
      KeyCode::Home => self.cursor = 0,
      KeyCode::End => self.cursor = self.len_chars(),
      KeyCode::Char('a') if ctrl => self.cursor = 0,
      KeyCode::Char('e') if ctrl => self.cursor = self.len_chars(),
      KeyCode::Char('u') if ctrl => {
        let at = self.byte_index(self.cursor);
        self.buffer.replace_range(..at, "");
        self.cursor = 0;
      }
      KeyCode::Char(_) if ctrl => return false,
      KeyCode::Char(c) => {
        let at = self.byte_index(self.cursor);
        self.buffer.insert(at, c);
        self.cursor += 1;
      }
      _ => return false,
    }
    true
  }
}
