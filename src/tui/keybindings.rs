use crate::tui::action::Action;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::warn;

/// Key to action table, loadable from a JSON file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyBindings {
    #[serde(rename = "bindings")]
    bindings_list: Vec<KeyBinding>,

    #[serde(skip)]
    bindings_map: HashMap<KeyPattern, Action>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyBinding {
    pub key: String,
    pub action: Action,
}

/// Normalized key: character codes are lower-cased, case lives in `modifiers`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPattern {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let bindings_list = vec![
            // Scrolling
            KeyBinding::new("Up", Action::ScrollUp),
            KeyBinding::new("Down", Action::ScrollDown),
            KeyBinding::new("Left", Action::ScrollLeft),
            KeyBinding::new("Right", Action::ScrollRight),
            KeyBinding::new("k", Action::ScrollUp),
            KeyBinding::new("j", Action::ScrollDown),
            KeyBinding::new("h", Action::ScrollLeft),
            KeyBinding::new("l", Action::ScrollRight),
            KeyBinding::new("PageUp", Action::PageUp),
            KeyBinding::new("PageDown", Action::PageDown),
            KeyBinding::new("Ctrl+u", Action::PageUp),
            KeyBinding::new("Ctrl+d", Action::PageDown),
            KeyBinding::new("Home", Action::Home),
            KeyBinding::new("End", Action::End),
            KeyBinding::new("g", Action::Home),
            KeyBinding::new("G", Action::End),
            // Insight tabs
            KeyBinding::new("Tab", Action::NextTab),
            KeyBinding::new("Shift+Tab", Action::PrevTab),
            KeyBinding::new("]", Action::NextTab),
            KeyBinding::new("[", Action::PrevTab),
            // Search
            KeyBinding::new("/", Action::Search),
            KeyBinding::new("Ctrl+f", Action::Search),
            KeyBinding::new("x", Action::ClearSearch),
            // Loading data
            KeyBinding::new("o", Action::OpenFile),
            KeyBinding::new("p", Action::PasteJson),
            KeyBinding::new("Ctrl+v", Action::PasteJson),
            // Export
            KeyBinding::new("e", Action::Export),
            KeyBinding::new("E", Action::ExportCsv),
            KeyBinding::new("c", Action::CopyMarkdown),
            // View
            KeyBinding::new("?", Action::ToggleHelp),
            KeyBinding::new("F1", Action::ToggleHelp),
            KeyBinding::new("d", Action::DismissError),
            // Application
            KeyBinding::new("q", Action::Quit),
            KeyBinding::new("Ctrl+c", Action::Quit),
            KeyBinding::new("Esc", Action::Cancel),
            KeyBinding::new("Enter", Action::Confirm),
        ];

        Self::from_list(bindings_list)
    }
}

impl KeyBindings {
    fn from_list(bindings_list: Vec<KeyBinding>) -> Self {
        let bindings_map = Self::build_map(&bindings_list);
        Self {
            bindings_list,
            bindings_map,
        }
    }

    fn build_map(bindings: &[KeyBinding]) -> HashMap<KeyPattern, Action> {
        bindings
            .iter()
            .filter_map(|b| match KeyPattern::from_string(&b.key) {
                Ok(pattern) => Some((pattern, b.action)),
                Err(e) => {
                    warn!("Ignoring binding for {:?}: {e}", b.action);
                    None
                }
            })
            .collect()
    }

    /// Look up a key event.
    ///
    /// Terminals disagree on whether punctuation like `?` carries SHIFT, so for
    /// non-letter characters the lookup retries with SHIFT toggled.
    pub fn get_action(&self, key: &KeyEvent) -> Option<Action> {
        let pattern = KeyPattern::from_event(key);
        if let Some(action) = self.bindings_map.get(&pattern) {
            return Some(*action);
        }
        match pattern.code {
            KeyCode::Char(c) if !c.is_alphabetic() => {
                let toggled = KeyPattern::new(pattern.code, pattern.modifiers ^ KeyModifiers::SHIFT);
                self.bindings_map.get(&toggled).copied()
            }
            _ => None,
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let bindings: KeyBindings = serde_json::from_str(&content)?;
        Ok(Self::from_list(bindings.bindings_list))
    }

    /// Bindings from `path` when given and readable, the defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        match Self::load_from_file(path) {
            Ok(bindings) => {
                for warning in bindings.validate() {
                    warn!("{warning}");
                }
                bindings
            }
            Err(e) => {
                warn!("Could not load keybindings from {}: {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Keys bound to `action`, in file order (for the help screen and status hints)
    pub fn get_keys_for_action(&self, action: Action) -> Vec<String> {
        self.bindings_list
            .iter()
            .filter(|b| b.action == action)
            .map(|b| b.key.clone())
            .collect()
    }

    /// First key bound to `action`, for one-line hints
    pub fn hint(&self, action: Action) -> String {
        self.get_keys_for_action(action)
            .into_iter()
            .next()
            .unwrap_or_else(|| "unbound".to_string())
    }

    pub fn get_unbound_actions(&self) -> Vec<(Action, &'static str)> {
        let bound_actions: HashSet<Action> = self.bindings_list.iter().map(|b| b.action).collect();

        Action::all()
            .into_iter()
            .filter(|action| !bound_actions.contains(action))
            .map(|action| (action, action.description()))
            .collect()
    }

    /// Human-readable problems with the table: duplicates, unbound actions, bad keys.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        let mut seen: HashMap<KeyPattern, Action> = HashMap::new();
        for binding in &self.bindings_list {
            match KeyPattern::from_string(&binding.key) {
                Ok(pattern) => {
                    if let Some(existing) = seen.insert(pattern, binding.action) {
                        if existing != binding.action {
                            warnings.push(format!(
                                "Duplicate key '{}': bound to both {:?} and {:?}",
                                binding.key, existing, binding.action
                            ));
                        }
                    }
                }
                Err(e) => warnings.push(format!(
                    "Invalid key pattern '{}' for action {:?}: {e}",
                    binding.key, binding.action
                )),
            }
        }

        let unbound = self.get_unbound_actions();
        if !unbound.is_empty() {
            warnings.push(format!(
                "{} action(s) have no keybindings: {}",
                unbound.len(),
                unbound
                    .iter()
                    .map(|(action, _)| format!("{:?}", action))
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }

        warnings
    }
}

impl KeyBinding {
    pub fn new(key: &str, action: Action) -> Self {
        Self {
            key: key.to_string(),
            action,
        }
    }
}

impl KeyPattern {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub fn from_event(event: &KeyEvent) -> Self {
        let mut modifiers = event.modifiers;
        let code = match event.code {
            KeyCode::Char(c) if c.is_uppercase() => {
                modifiers |= KeyModifiers::SHIFT;
                KeyCode::Char(c.to_ascii_lowercase())
            }
            KeyCode::BackTab => {
                modifiers |= KeyModifiers::SHIFT;
                KeyCode::BackTab
            }
            other => other,
        };
        Self { code, modifiers }
    }

    /// Parse "Ctrl+f", "Shift+Tab", "E", "F1", "PageDown"
    pub fn from_string(s: &str) -> Result<Self, String> {
        if s == "+" {
            return Ok(Self::new(KeyCode::Char('+'), KeyModifiers::SHIFT));
        }
        let parts: Vec<&str> = s.split('+').collect();
        let (key_part, modifier_parts) = match parts.split_last() {
            Some((last, rest)) if !last.is_empty() => (*last, rest),
            _ => return Err(format!("Empty key in '{s}'")),
        };

        let mut modifiers = KeyModifiers::empty();
        for part in modifier_parts {
            match part.to_lowercase().as_str() {
                "ctrl" | "control" => modifiers |= KeyModifiers::CONTROL,
                "alt" | "option" => modifiers |= KeyModifiers::ALT,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                "cmd" | "command" | "super" => {
                    #[cfg(target_os = "macos")]
                    {
                        modifiers |= KeyModifiers::SUPER;
                    }
                    #[cfg(not(target_os = "macos"))]
                    {
                        modifiers |= KeyModifiers::CONTROL;
                    }
                }
                other => return Err(format!("Unknown modifier: {other}")),
            }
        }

        let mut chars = key_part.chars();
        if let (Some(ch), None) = (chars.next(), chars.next()) {
            if ch.is_uppercase() || "~!@#$%^&*()_{}|:\"<>?".contains(ch) {
                modifiers |= KeyModifiers::SHIFT;
            }
            return Ok(Self::new(KeyCode::Char(ch.to_ascii_lowercase()), modifiers));
        }

        let code = match key_part.to_lowercase().as_str() {
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "pageup" | "pgup" => KeyCode::PageUp,
            "pagedown" | "pgdown" | "pgdn" => KeyCode::PageDown,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "tab" if modifiers.contains(KeyModifiers::SHIFT) => KeyCode::BackTab,
            "tab" => KeyCode::Tab,
            "backtab" => {
                modifiers |= KeyModifiers::SHIFT;
                KeyCode::BackTab
            }
            "enter" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "backspace" => KeyCode::Backspace,
            "delete" | "del" => KeyCode::Delete,
            "space" => KeyCode::Char(' '),
            f if f.starts_with('f') => match f[1..].parse::<u8>() {
                Ok(n) if (1..=12).contains(&n) => KeyCode::F(n),
                _ => return Err(format!("Invalid function key: {key_part}")),
            },
            _ => return Err(format!("Unknown key: {key_part}")),
        };

        Ok(Self { code, modifiers })
    }
}
