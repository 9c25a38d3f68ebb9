pub mod action;
pub mod app;
pub mod component;
pub mod components;
pub mod keybindings;
pub mod theme;

pub use action::{Action, ActionCategory};
pub use app::{App, AppEvent, AppSettings};
pub use component::{Component, Focusable, InputOutcome, RenderContext, TextInput};
pub use keybindings::{KeyBinding, KeyBindings, KeyPattern};
pub use theme::Theme;
