use serde::{Deserialize, Serialize};
use std::fmt;

/// Everything a key can trigger in the viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Action {
    // Navigation
    ScrollUp,
    ScrollDown,
    ScrollLeft,
    ScrollRight,
    PageUp,
    PageDown,
    Home,
    End,

    // Tabs
    NextTab,
    PrevTab,

    // Search
    Search,
    ClearSearch,

    // Input
    OpenFile,
    PasteJson,

    // Export
    Export,
    ExportCsv,
    CopyMarkdown,

    // View
    ToggleHelp,
    DismissError,

    // Application
    Quit,
    Confirm,
    Cancel,
}

impl Action {
    pub fn description(&self) -> &'static str {
        match self {
            Action::ScrollUp => "Scroll up",
            Action::ScrollDown => "Scroll down",
            Action::ScrollLeft => "Scroll columns left",
            Action::ScrollRight => "Scroll columns right",
            Action::PageUp => "Page up",
            Action::PageDown => "Page down",
            Action::Home => "Go to top of panel",
            Action::End => "Go to bottom of panel",
            Action::NextTab => "Next insight",
            Action::PrevTab => "Previous insight",
            Action::Search => "Filter columns",
            Action::ClearSearch => "Clear filter",
            Action::OpenFile => "Open JSON file",
            Action::PasteJson => "Convert JSON from clipboard",
            Action::Export => "Export spreadsheet",
            Action::ExportCsv => "Export insight as CSV",
            Action::CopyMarkdown => "Copy insight as Markdown",
            Action::ToggleHelp => "Toggle help screen",
            Action::DismissError => "Dismiss error",
            Action::Quit => "Quit application",
            Action::Confirm => "Confirm action",
            Action::Cancel => "Cancel action",
        }
    }

    /// Grouping for the help screen
    pub fn category(&self) -> ActionCategory {
        match self {
            Action::ScrollUp
            | Action::ScrollDown
            | Action::ScrollLeft
            | Action::ScrollRight
            | Action::PageUp
            | Action::PageDown
            | Action::Home
            | Action::End => ActionCategory::Navigation,

            Action::NextTab | Action::PrevTab => ActionCategory::Tabs,

            Action::Search | Action::ClearSearch => ActionCategory::Search,

            Action::OpenFile | Action::PasteJson => ActionCategory::Input,

            Action::Export | Action::ExportCsv | Action::CopyMarkdown => ActionCategory::Export,

            Action::ToggleHelp | Action::DismissError => ActionCategory::View,

            Action::Quit | Action::Confirm | Action::Cancel => ActionCategory::Application,
        }
    }

    /// Get all possible actions (for validation)
    pub fn all() -> Vec<Action> {
        vec![
            Action::ScrollUp,
            Action::ScrollDown,
            Action::ScrollLeft,
            Action::ScrollRight,
            Action::PageUp,
            Action::PageDown,
            Action::Home,
            Action::End,
            Action::NextTab,
            Action::PrevTab,
            Action::Search,
            Action::ClearSearch,
            Action::OpenFile,
            Action::PasteJson,
            Action::Export,
            Action::ExportCsv,
            Action::CopyMarkdown,
            Action::ToggleHelp,
            Action::DismissError,
            Action::Quit,
            Action::Confirm,
            Action::Cancel,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionCategory {
    Navigation,
    Tabs,
    Search,
    Input,
    Export,
    View,
    Application,
}

impl fmt::Display for ActionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionCategory::Navigation => write!(f, "Navigation"),
            ActionCategory::Tabs => write!(f, "Insights"),
            ActionCategory::Search => write!(f, "Search"),
            ActionCategory::Input => write!(f, "Load Data"),
            ActionCategory::Export => write!(f, "Export"),
            ActionCategory::View => write!(f, "View"),
            ActionCategory::Application => write!(f, "Application"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_actions_have_descriptions() {
        for action in Action::all() {
            assert!(!action.description().is_empty());
        }
    }

    #[test]
    fn test_export_actions_grouped() {
        assert_eq!(Action::CopyMarkdown.category(), ActionCategory::Export);
        assert_eq!(Action::PasteJson.category(), ActionCategory::Input);
        assert_eq!(ActionCategory::Tabs.to_string(), "Insights");
    }

    #[test]
    fn test_action_serialization() {
        let json = serde_json::to_string(&Action::CopyMarkdown).unwrap();
        assert_eq!(json, "\"CopyMarkdown\"");

        let restored: Action = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, Action::CopyMarkdown);
    }
}
