//! The active insight: its details and every fact table the filter kept.
//!
//! Tables are laid out as styled text lines so the whole panel scrolls as one
//! document. Horizontal scrolling shifts whole columns.

use crate::services::render_service::{Stripe, VisibleFact, VisiblePanel};
use crate::tui::component::RenderContext;
use crate::tui::{Action, Component, Theme};
use color_eyre::Result;
use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

const MAX_COLUMN_WIDTH: usize = 32;
const MIN_COLUMN_WIDTH: usize = 3;
const COLUMN_GAP: &str = " │ ";
const DETAIL_LABEL_WIDTH: usize = 16;

#[derive(Debug, Default)]
pub struct InsightPanel {
    scroll: usize,
    column_offset: usize,
    viewport_height: usize,
    content_height: usize,
}

impl InsightPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Back to the top-left corner, e.g. after switching tabs
    pub fn reset_scroll(&mut self) {
        self.scroll = 0;
        self.column_offset = 0;
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn column_offset(&self) -> usize {
        self.column_offset
    }

    fn max_scroll(&self) -> usize {
        self.content_height.saturating_sub(self.viewport_height.max(1))
    }

    fn page(&self) -> usize {
        self.viewport_height.saturating_sub(2).max(1)
    }

    /// Lay out a panel as text. `column_offset` hides that many leading columns
    /// of every table.
    pub fn panel_lines(panel: &VisiblePanel, column_offset: usize, theme: &Theme) -> Vec<Line<'static>> {
        let mut lines = vec![Line::from(Span::styled(
            "Insight Details",
            theme.header_style(),
        ))];
        for (field, value) in &panel.details {
            lines.push(Line::from(vec![
                Span::styled(format!("{field:<DETAIL_LABEL_WIDTH$}"), theme.muted_style()),
                Span::styled(value.clone(), theme.normal_style()),
            ]));
        }

        for fact in &panel.facts {
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                fact.heading.clone(),
                theme.info_style().add_modifier(Modifier::BOLD),
            )));
            lines.extend(Self::fact_lines(fact, column_offset, theme));
        }
        lines
    }

    fn fact_lines(fact: &VisibleFact, column_offset: usize, theme: &Theme) -> Vec<Line<'static>> {
        if fact.headers.is_empty() {
            return vec![Line::from(Span::styled("(no columns)", theme.muted_style()))];
        }

        let offset = column_offset.min(fact.headers.len() - 1);
        let widths: Vec<usize> = (0..fact.headers.len())
            .map(|i| {
                fact.rows
                    .iter()
                    .filter_map(|r| r.cells.get(i))
                    .map(|c| c.chars().count())
                    .chain(std::iter::once(fact.headers[i].label.chars().count()))
                    .max()
                    .unwrap_or(0)
                    .clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH)
            })
            .collect();

        let mut lines = Vec::with_capacity(fact.rows.len() + 2);

        let mut header = Vec::new();
        if offset > 0 {
            header.push(Span::styled("‹ ", theme.muted_style()));
        }
        for (i, h) in fact.headers.iter().enumerate().skip(offset) {
            if i > offset {
                header.push(Span::styled(COLUMN_GAP, theme.border_style()));
            }
            let style = if h.highlighted {
                theme.match_style()
            } else {
                theme.header_style()
            };
            header.push(Span::styled(fit(&h.label, widths[i]), style));
        }
        lines.push(Line::from(header));

        let rule_width = widths[offset..].iter().sum::<usize>()
            + COLUMN_GAP.chars().count() * (widths.len() - offset - 1);
        lines.push(Line::from(Span::styled("─".repeat(rule_width), theme.border_style())));

        if fact.rows.is_empty() {
            lines.push(Line::from(Span::styled("(no rows)", theme.muted_style())));
        }
        for row in &fact.rows {
            let style = match row.stripe {
                Stripe::Base => theme.normal_style(),
                Stripe::Alternate => theme.alt_row_style(),
            };
            let mut spans = Vec::new();
            if offset > 0 {
                spans.push(Span::styled("  ", style));
            }
            for (i, width) in widths.iter().enumerate().skip(offset) {
                if i > offset {
                    spans.push(Span::styled(COLUMN_GAP, style.patch(theme.border_style())));
                }
                let cell = row.cells.get(i).map(String::as_str).unwrap_or("");
                spans.push(Span::styled(fit(cell, *width), style));
            }
            lines.push(Line::from(spans));
        }
        lines
    }

    fn filtered_out_lines(ctx: &RenderContext) -> Vec<Line<'static>> {
        let session = ctx.session;
        let label = session
            .active_index()
            .and_then(|i| session.tabs().tabs().get(i))
            .map(|t| t.label.clone())
            .unwrap_or_default();
        let mut lines = vec![Line::from(Span::styled(
            format!("No columns in '{label}' match \"{}\"", session.search_term()),
            ctx.theme.warning_style(),
        ))];

        let matching: Vec<&str> = session
            .tabs()
            .tabs()
            .iter()
            .enumerate()
            .filter(|(i, _)| session.state().panels.get(*i).is_some_and(|p| p.visible))
            .map(|(_, t)| t.label.as_str())
            .collect();
        if !matching.is_empty() {
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                format!("Matches in: {}", matching.join(", ")),
                ctx.theme.muted_style(),
            )));
        }
        lines
    }

    fn welcome_lines(ctx: &RenderContext) -> Vec<Line<'static>> {
        let keys = ctx.keybindings;
        let muted = ctx.theme.muted_style();
        vec![
            Line::from(Span::styled("No insights loaded", ctx.theme.header_style())),
            Line::default(),
            Line::from(Span::styled(
                format!("{}  open a JSON file", keys.hint(Action::OpenFile)),
                muted,
            )),
            Line::from(Span::styled(
                format!("{}  convert JSON from the clipboard", keys.hint(Action::PasteJson)),
                muted,
            )),
            Line::from(Span::styled(
                format!("{}  help", keys.hint(Action::ToggleHelp)),
                muted,
            )),
        ]
    }
}

/// Pad or truncate to exactly `width` chars
fn fit(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count <= width {
        format!("{text:<width$}")
    } else {
        let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

impl Component for InsightPanel {
    fn handle_action(&mut self, action: Action) -> Result<bool> {
        match action {
            Action::ScrollUp => self.scroll = self.scroll.saturating_sub(1),
            Action::ScrollDown => self.scroll = (self.scroll + 1).min(self.max_scroll()),
            Action::PageUp => self.scroll = self.scroll.saturating_sub(self.page()),
            Action::PageDown => self.scroll = (self.scroll + self.page()).min(self.max_scroll()),
            Action::Home => self.scroll = 0,
            Action::End => self.scroll = self.max_scroll(),
            Action::ScrollLeft => self.column_offset = self.column_offset.saturating_sub(1),
            Action::ScrollRight => self.column_offset += 1,
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &RenderContext) {
        let theme = ctx.theme;
        let session = ctx.session;

        let (title, lines) = match session.active_panel() {
            Some(panel) => {
                let widest = panel.facts.iter().map(|f| f.headers.len()).max().unwrap_or(0);
                self.column_offset = self.column_offset.min(widest.saturating_sub(1));
                (
                    format!(" {} ", panel.label),
                    Self::panel_lines(&panel, self.column_offset, theme),
                )
            }
            None if session.has_data() => (" No match ".to_string(), Self::filtered_out_lines(ctx)),
            None => (" insightview ".to_string(), Self::welcome_lines(ctx)),
        };

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(theme.border_style());
        let inner = block.inner(area);

        self.viewport_height = inner.height as usize;
        self.content_height = lines.len();
        self.scroll = self.scroll.min(self.max_scroll());

        let paragraph = Paragraph::new(lines)
            .block(block)
            .scroll((self.scroll.min(u16::MAX as usize) as u16, 0));
        frame.render_widget(paragraph, area);
    }

    fn supported_actions(&self) -> &[Action] {
        &[
            Action::ScrollUp,
            Action::ScrollDown,
            Action::ScrollLeft,
            Action::ScrollRight,
            Action::PageUp,
            Action::PageDown,
            Action::Home,
            Action::End,
        ]
    }

    fn name(&self) -> &str {
        "InsightPanel"
    }
}

/// Wrapped text panel for the error banner
pub fn error_paragraph<'a>(message: &'a str, dismiss_key: &str, theme: &Theme) -> Paragraph<'a> {
    Paragraph::new(vec![
        Line::from(Span::styled(message, theme.error_style().add_modifier(Modifier::BOLD))),
        Line::default(),
        Line::from(Span::styled(
            format!("Press {dismiss_key} to dismiss"),
            theme.muted_style(),
        )),
    ])
    .block(
        Block::default()
            .title(" Error ")
            .borders(Borders::ALL)
            .border_style(theme.error_style()),
    )
    .wrap(Wrap { trim: true })
}
