use crate::services::InsightSession;
use crate::tui::action::Action;
use crate::tui::{KeyBindings, Theme};
use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};

/// Read-only view of application state handed to components while drawing
pub struct RenderContext<'a> {
    pub session: &'a InsightSession,
    pub theme: &'a Theme,
    pub keybindings: &'a KeyBindings,
}

/// Base trait for all TUI components
pub trait Component {
    /// Returns Ok(true) if the action was consumed, Ok(false) to let it propagate.
    fn handle_action(&mut self, action: Action) -> Result<bool>;

    fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &RenderContext);

    /// Actions this component reacts to (drives the help screen)
    fn supported_actions(&self) -> &[Action];

    fn name(&self) -> &str;

    /// Called on every tick
    fn update(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Components that take keyboard focus
pub trait Focusable: Component {
    fn is_focused(&self) -> bool;

    fn set_focused(&mut self, focused: bool);
}

/// What a text field did with a raw key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    /// The text changed
    Edited,
    /// Cursor moved or nothing visible happened
    Ignored,
    Submitted(String),
    Cancelled,
}

/// Components that edit text from raw key events
pub trait TextInput: Focusable {
    fn handle_key(&mut self, key: KeyEvent) -> InputOutcome;

    fn value(&self) -> &str;
}
