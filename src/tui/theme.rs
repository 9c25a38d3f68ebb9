use ratatui::style::{Color, Modifier, Style};

/// Color scheme for the viewer
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,

    // General UI colors
    pub background: Color,
    pub foreground: Color,
    pub muted: Color,
    pub border: Color,
    pub border_focused: Color,

    // Tabs
    pub tab_fg: Color,
    pub tab_active_fg: Color,
    pub tab_active_bg: Color,

    // Tables
    pub header_fg: Color,
    pub header_bg: Color,
    pub row_alt_bg: Color, // zebra striping
    pub match_fg: Color,
    pub match_bg: Color,

    // Status/feedback colors
    pub success: Color,
    pub error: Color,
    pub warning: Color,
    pub info: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: "Default Dark".to_string(),
            background: Color::Reset,
            foreground: Color::Gray,
            muted: Color::DarkGray,
            border: Color::DarkGray,
            border_focused: Color::Cyan,
            tab_fg: Color::Gray,
            tab_active_fg: Color::Black,
            tab_active_bg: Color::Cyan,
            header_fg: Color::Cyan,
            header_bg: Color::Reset,
            row_alt_bg: Color::Rgb(25, 25, 35),
            match_fg: Color::Black,
            match_bg: Color::Yellow,
            success: Color::Green,
            error: Color::Red,
            warning: Color::Yellow,
            info: Color::Blue,
        }
    }

    pub fn light() -> Self {
        Self {
            name: "Light".to_string(),
            background: Color::White,
            foreground: Color::Black,
            muted: Color::Gray,
            border: Color::Gray,
            border_focused: Color::Blue,
            tab_fg: Color::DarkGray,
            tab_active_fg: Color::White,
            tab_active_bg: Color::Blue,
            header_fg: Color::Blue,
            header_bg: Color::Rgb(240, 240, 240),
            row_alt_bg: Color::Rgb(245, 245, 250),
            match_fg: Color::Black,
            match_bg: Color::Rgb(255, 220, 120),
            success: Color::Green,
            error: Color::Red,
            warning: Color::Rgb(200, 150, 0), // Darker yellow for light bg
            info: Color::Blue,
        }
    }

    /// Theme by config name; unknown names fall back to dark
    pub fn by_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "light" => Self::light(),
            _ => Self::dark(),
        }
    }

    pub fn header_style(&self) -> Style {
        Style::default()
            .fg(self.header_fg)
            .bg(self.header_bg)
            .add_modifier(Modifier::BOLD)
    }

    /// Header cell whose label matched the search term
    pub fn match_style(&self) -> Style {
        Style::default()
            .fg(self.match_fg)
            .bg(self.match_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn tab_style(&self) -> Style {
        Style::default().fg(self.tab_fg)
    }

    pub fn active_tab_style(&self) -> Style {
        Style::default()
            .fg(self.tab_active_fg)
            .bg(self.tab_active_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn normal_style(&self) -> Style {
        Style::default().fg(self.foreground).bg(self.background)
    }

    pub fn alt_row_style(&self) -> Style {
        Style::default().fg(self.foreground).bg(self.row_alt_bg)
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn focused_border_style(&self) -> Style {
        Style::default().fg(self.border_focused)
    }

    pub fn success_style(&self) -> Style {
        Style::default().fg(self.success)
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error)
    }

    pub fn warning_style(&self) -> Style {
        Style::default().fg(self.warning)
    }

    pub fn info_style(&self) -> Style {
        Style::default().fg(self.info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_theme() {
        let theme = Theme::default();
        assert_eq!(theme.name, "Default Dark");
        assert_ne!(theme.header_fg, Color::Reset);
        assert_ne!(theme.tab_active_bg, Color::Reset);
    }

    #[test]
    fn test_by_name() {
        assert_eq!(Theme::by_name("Light").name, "Light");
        assert_eq!(Theme::by_name("dark").name, "Default Dark");
        assert_eq!(Theme::by_name("solarized").name, "Default Dark");
    }

    #[test]
    fn test_match_style_stands_out() {
        let theme = Theme::default();
        let style = theme.match_style();
        assert!(style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(style.bg, Some(theme.match_bg));
        assert_ne!(theme.header_style().bg, style.bg);
    }
}
