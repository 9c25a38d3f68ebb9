use crate::services::StatsService;
use crate::tui::component::RenderContext;
use crate::tui::{Action, Component, Theme};
use color_eyre::Result;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use std::time::{Duration, Instant};

const FLASH_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    Info,
    Success,
    Warning,
}

#[derive(Debug, Clone)]
struct Flash {
    message: String,
    kind: FlashKind,
    shown_at: Instant,
}

/// Bottom line: collection stats, transient messages, key hints
#[derive(Debug, Default)]
pub struct StatusBar {
    flash: Option<Flash>,
}

impl StatusBar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flash(&mut self, message: impl Into<String>, kind: FlashKind) {
        self.flash = Some(Flash {
            message: message.into(),
            kind,
            shown_at: Instant::now(),
        });
    }

    pub fn flash_message(&self) -> Option<&str> {
        self.flash.as_ref().map(|f| f.message.as_str())
    }

    /// Drop the flash once it has been up long enough
    pub fn expire(&mut self, now: Instant) {
        if self
            .flash
            .as_ref()
            .is_some_and(|f| now.saturating_duration_since(f.shown_at) >= FLASH_TTL)
        {
            self.flash = None;
        }
    }

    fn flash_style(kind: FlashKind, theme: &Theme) -> Style {
        match kind {
            FlashKind::Info => theme.info_style(),
            FlashKind::Success => theme.success_style(),
            FlashKind::Warning => theme.warning_style(),
        }
    }
}

impl Component for StatusBar {
    fn handle_action(&mut self, _action: Action) -> Result<bool> {
        Ok(false)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &RenderContext) {
        let theme = ctx.theme;
        let session = ctx.session;
        let mut spans = Vec::new();

        if session.has_data() {
            let stats = session.stats();
            spans.push(Span::styled(
                format!(
                    " {} insights · {} facts · {} data points ",
                    StatsService::format_count(stats.count),
                    StatsService::format_count(stats.total_facts),
                    StatsService::format_count(stats.total_data_points),
                ),
                theme.header_style(),
            ));
        }

        if session.is_busy() {
            spans.push(Span::styled(" Converting… ", theme.warning_style()));
        }

        if let Some(flash) = &self.flash {
            spans.push(Span::styled(
                format!(" {} ", flash.message),
                Self::flash_style(flash.kind, theme),
            ));
        } else {
            let keys = ctx.keybindings;
            spans.push(Span::styled(
                format!(
                    " {} search · {} open · {} export · {} help · {} quit",
                    keys.hint(Action::Search),
                    keys.hint(Action::OpenFile),
                    keys.hint(Action::Export),
                    keys.hint(Action::ToggleHelp),
                    keys.hint(Action::Quit),
                ),
                theme.muted_style(),
            ));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn supported_actions(&self) -> &[Action] {
        &[]
    }

    fn name(&self) -> &str {
        "StatusBar"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flash_expires() {
        let mut bar = StatusBar::new();
        bar.flash("Saved", FlashKind::Success);
        let shown = Instant::now();
        bar.expire(shown);
        assert_eq!(bar.flash_message(), Some("Saved"));
        bar.expire(shown + FLASH_TTL + Duration::from_millis(1));
        assert_eq!(bar.flash_message(), None);
    }
}
