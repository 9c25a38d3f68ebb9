//! Single-line text editing shared by the search bar and prompts.

use crate::tui::component::InputOutcome;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    style::Style,
    text::{Line, Span},
};

/// Text plus a cursor counted in chars
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextField {
    text: String,
    cursor: usize,
}

impl TextField {
    pub fn new(initial: impl Into<String>) -> Self {
        let text = initial.into();
        let cursor = text.chars().count();
        Self { text, cursor }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = self.text.chars().count();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    pub fn insert_char(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
    }

    pub fn insert_str(&mut self, s: &str) {
        for c in s.chars().filter(|c| !c.is_control()) {
            self.insert_char(c);
        }
    }

    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let at = self.byte_index(self.cursor);
        self.text.remove(at);
        true
    }

    pub fn delete(&mut self) -> bool {
        if self.cursor >= self.text.chars().count() {
            return false;
        }
        let at = self.byte_index(self.cursor);
        self.text.remove(at);
        true
    }

    /// Apply an editing key. Enter submits, Esc cancels.
    pub fn handle_key(&mut self, key: KeyEvent) -> InputOutcome {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Enter => InputOutcome::Submitted(self.text.clone()),
            KeyCode::Esc => InputOutcome::Cancelled,
            KeyCode::Char('u') if ctrl => {
                if self.text.is_empty() {
                    InputOutcome::Ignored
                } else {
                    self.clear();
                    InputOutcome::Edited
                }
            }
            KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
                self.insert_char(c);
                InputOutcome::Edited
            }
            KeyCode::Backspace if self.backspace() => InputOutcome::Edited,
            KeyCode::Delete if self.delete() => InputOutcome::Edited,
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                InputOutcome::Ignored
            }
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(self.text.chars().count());
                InputOutcome::Ignored
            }
            KeyCode::Home => {
                self.cursor = 0;
                InputOutcome::Ignored
            }
            KeyCode::End => {
                self.cursor = self.text.chars().count();
                InputOutcome::Ignored
            }
            _ => InputOutcome::Ignored,
        }
    }

    /// The text as spans with the cursor cell drawn in `cursor_style`
    pub fn line(&self, text_style: Style, cursor_style: Style, show_cursor: bool) -> Line<'static> {
        if !show_cursor {
            return Line::from(Span::styled(self.text.clone(), text_style));
        }
        let before: String = self.text.chars().take(self.cursor).collect();
        let at: String = self.text.chars().nth(self.cursor).map(String::from).unwrap_or_else(|| " ".into());
        let after: String = self.text.chars().skip(self.cursor + 1).collect();
        Line::from(vec![
            Span::styled(before, text_style),
            Span::styled(at, cursor_style),
            Span::styled(after, text_style),
        ])
    }
}
