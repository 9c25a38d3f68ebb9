use crate::core::TabSet;
use crate::tui::component::RenderContext;
use crate::tui::{Action, Component};
use color_eyre::Result;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const SEPARATOR: &str = " │ ";

/// One label per insight. Scrolls sideways to keep the active tab in view.
#[derive(Debug, Default)]
pub struct TabBar {
    first_visible: usize,
}

impl TabBar {
    pub fn new() -> Self {
        Self::default()
    }

    /// First tab to draw so that `active` fits in `width` columns
    pub fn window_start(&self, tabs: &TabSet, width: usize) -> usize {
        let Some(active) = tabs.active_index() else {
            return 0;
        };
        let widths: Vec<usize> = tabs
            .tabs()
            .iter()
            .map(|t| t.label.chars().count() + 2 + SEPARATOR.chars().count())
            .collect();

        let mut start = self.first_visible.min(active);
        while start < active && widths[start..=active].iter().sum::<usize>() > width {
            start += 1;
        }
        start
    }
}

impl Component for TabBar {
    fn handle_action(&mut self, _action: Action) -> Result<bool> {
        Ok(false)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &RenderContext) {
        let theme = ctx.theme;
        let tabs = ctx.session.tabs();
        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(theme.border_style());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if tabs.is_empty() {
            return;
        }

        self.first_visible = self.window_start(tabs, inner.width as usize);
        let mut spans = Vec::new();
        if self.first_visible > 0 {
            spans.push(Span::styled("‹ ", theme.muted_style()));
        }
        for (i, tab) in tabs.tabs().iter().enumerate().skip(self.first_visible) {
            if i > self.first_visible {
                spans.push(Span::styled(SEPARATOR, theme.border_style()));
            }
            let style = if tab.active {
                theme.active_tab_style()
            } else {
                theme.tab_style()
            };
            spans.push(Span::styled(format!(" {} ", tab.label), style));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), inner);
    }

    fn supported_actions(&self) -> &[Action] {
        &[]
    }

    fn name(&self) -> &str {
        "TabBar"
    }
}
