//! Column search input.
//!
//! The bar only edits text. Filtering happens in the session once the
//! debounce period after the last keystroke has passed.

use crate::tui::component::{InputOutcome, RenderContext, TextInput};
use crate::tui::components::TextField;
use crate::tui::{Action, Component, Focusable};
use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

#[derive(Debug, Default)]
pub struct SearchBar {
    field: TextField,
    focused: bool,
}

impl SearchBar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.field.clear();
    }
}

impl Component for SearchBar {
    fn handle_action(&mut self, action: Action) -> Result<bool> {
        match action {
            Action::Search => {
                self.focused = true;
                Ok(true)
            }
            Action::ClearSearch => {
                self.field.clear();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &RenderContext) {
        let theme = ctx.theme;
        let session = ctx.session;

        let border = if self.focused {
            theme.focused_border_style()
        } else {
            theme.border_style()
        };
        let block = Block::default()
            .title(" Search columns ")
            .borders(Borders::ALL)
            .border_style(border);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mut spans = if self.field.text().is_empty() && !self.focused {
            vec![Span::styled(
                format!("Press {} to filter columns", ctx.keybindings.hint(Action::Search)),
                theme.muted_style(),
            )]
        } else {
            self.field
                .line(theme.normal_style(), theme.match_style(), self.focused)
                .spans
        };

        if session.no_results() {
            spans.push(Span::styled("   No columns match", theme.warning_style()));
        } else if !session.search_term().is_empty() && session.search_term() != self.field.text() {
            spans.push(Span::styled("   …", theme.muted_style()));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), inner);
    }

    fn supported_actions(&self) -> &[Action] {
        &[Action::Search, Action::ClearSearch]
    }

    fn name(&self) -> &str {
        "SearchBar"
    }
}

impl Focusable for SearchBar {
    fn is_focused(&self) -> bool {
        self.focused
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}

impl TextInput for SearchBar {
    /// Enter and Esc both leave the bar; the term stays applied.
    fn handle_key(&mut self, key: KeyEvent) -> InputOutcome {
        let outcome = self.field.handle_key(key);
        if matches!(outcome, InputOutcome::Submitted(_) | InputOutcome::Cancelled) {
            self.focused = false;
        }
        outcome
    }

    fn value(&self) -> &str {
        self.field.text()
    }
}
