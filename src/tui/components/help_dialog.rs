use crate::tui::component::RenderContext;
use crate::tui::{Action, ActionCategory, Component, KeyBindings};
use color_eyre::Result;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Overlay listing every action and its keys, grouped by category
#[derive(Debug, Default)]
pub struct HelpDialog {
    scroll: u16,
}

impl HelpDialog {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(category, [(keys, description)])` in action order
    pub fn entries(keybindings: &KeyBindings) -> Vec<(ActionCategory, Vec<(String, &'static str)>)> {
        let mut groups: Vec<(ActionCategory, Vec<(String, &'static str)>)> = Vec::new();
        for action in Action::all() {
            let keys = keybindings.get_keys_for_action(action).join(", ");
            let entry = (keys, action.description());
            match groups.iter_mut().find(|(c, _)| *c == action.category()) {
                Some((_, items)) => items.push(entry),
                None => groups.push((action.category(), vec![entry])),
            }
        }
        groups
    }
}

impl Component for HelpDialog {
    fn handle_action(&mut self, action: Action) -> Result<bool> {
        match action {
            Action::ScrollDown => self.scroll = self.scroll.saturating_add(1),
            Action::ScrollUp => self.scroll = self.scroll.saturating_sub(1),
            Action::Home => self.scroll = 0,
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &RenderContext) {
        let theme = ctx.theme;
        frame.render_widget(Clear, area);

        let mut lines = Vec::new();
        for (category, items) in Self::entries(ctx.keybindings) {
            if !lines.is_empty() {
                lines.push(Line::default());
            }
            lines.push(Line::from(Span::styled(category.to_string(), theme.header_style())));
            for (keys, description) in items {
                lines.push(Line::from(vec![
                    Span::styled(format!("  {keys:<22}"), theme.info_style()),
                    Span::styled(description, theme.normal_style()),
                ]));
            }
        }

        let paragraph = Paragraph::new(lines)
            .block(
                Block::default()
                    .title(" Help ")
                    .borders(Borders::ALL)
                    .border_style(theme.focused_border_style())
                    .style(theme.normal_style()),
            )
            .scroll((self.scroll, 0));
        frame.render_widget(paragraph, area);
    }

    fn supported_actions(&self) -> &[Action] {
        &[Action::ScrollUp, Action::ScrollDown, Action::Home]
    }

    fn name(&self) -> &str {
        "HelpDialog"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_cover_every_action_once() {
        let entries = HelpDialog::entries(&KeyBindings::default());
        let total: usize = entries.iter().map(|(_, items)| items.len()).sum();
        assert_eq!(total, Action::all().len());
        assert_eq!(entries[0].0, ActionCategory::Navigation);
    }
}
