pub mod help_dialog;
pub mod insight_panel;
pub mod prompt_dialog;
pub mod search_bar;
pub mod status_bar;
pub mod tab_bar;
pub mod text_field;

pub use help_dialog::HelpDialog;
pub use insight_panel::InsightPanel;
pub use prompt_dialog::{PromptDialog, PromptPurpose};
pub use search_bar::SearchBar;
pub use status_bar::{FlashKind, StatusBar};
pub use tab_bar::TabBar;
pub use text_field::TextField;
