//! Modal one-line prompt: file to open, filename to export to.

use crate::core::ExportEndpoint;
use crate::tui::component::{InputOutcome, RenderContext, TextInput};
use crate::tui::components::TextField;
use crate::tui::{Action, Component, Focusable};
use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};

/// What the answer will be used for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptPurpose {
    OpenFile,
    ServerExport(ExportEndpoint),
    LocalCsv,
}

impl PromptPurpose {
    pub fn title(&self) -> &'static str {
        match self {
            Self::OpenFile => " Open JSON file ",
            Self::ServerExport(ExportEndpoint::Download) => " Export spreadsheet ",
            Self::ServerExport(ExportEndpoint::DownloadCsv) => " Export spreadsheet (CSV route) ",
            Self::LocalCsv => " Export insight as CSV ",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::OpenFile => "Path:",
            _ => "Filename:",
        }
    }
}

pub struct PromptDialog {
    purpose: PromptPurpose,
    field: TextField,
    focused: bool,
}

impl PromptDialog {
    pub fn new(purpose: PromptPurpose, initial: impl Into<String>) -> Self {
        Self {
            purpose,
            field: TextField::new(initial),
            focused: true,
        }
    }

    pub fn purpose(&self) -> PromptPurpose {
        self.purpose
    }
}

impl Component for PromptDialog {
    fn handle_action(&mut self, action: Action) -> Result<bool> {
        Ok(matches!(action, Action::Confirm | Action::Cancel))
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &RenderContext) {
        let theme = ctx.theme;
        frame.render_widget(Clear, area);

        let block = Block::default()
            .title(self.purpose.title())
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .border_style(theme.focused_border_style())
            .style(theme.normal_style());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mut input = vec![Span::styled(format!("{} ", self.purpose.label()), theme.header_style())];
        input.extend(
            self.field
                .line(theme.normal_style(), theme.match_style(), self.focused)
                .spans,
        );

        let lines = vec![
            Line::from(input),
            Line::default(),
            Line::from(Span::styled("Enter to confirm · Esc to cancel", theme.muted_style())),
        ];
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn supported_actions(&self) -> &[Action] {
        &[Action::Confirm, Action::Cancel]
    }

    fn name(&self) -> &str {
        "PromptDialog"
    }
}

impl Focusable for PromptDialog {
    fn is_focused(&self) -> bool {
        self.focused
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}

impl TextInput for PromptDialog {
    fn handle_key(&mut self, key: KeyEvent) -> InputOutcome {
        self.field.handle_key(key)
    }

    fn value(&self) -> &str {
        self.field.text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    #[test]
    fn test_prefilled_answer_can_be_replaced() {
        let mut dialog = PromptDialog::new(
            PromptPurpose::ServerExport(ExportEndpoint::Download),
            "r1_2026-10-15.xlsx",
        );
        assert_eq!(dialog.value(), "r1_2026-10-15.xlsx");
        dialog.handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        dialog.handle_key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE));
        assert_eq!(
            dialog.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)),
            InputOutcome::Submitted("a".into())
        );
    }

    #[test]
    fn test_labels() {
        assert_eq!(PromptPurpose::OpenFile.label(), "Path:");
        assert_eq!(PromptPurpose::LocalCsv.label(), "Filename:");
    }
}
