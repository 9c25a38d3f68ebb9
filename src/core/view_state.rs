//! View-only state: which tab is active and what the search filter left visible.
//!
//! Nothing here touches insight data. The session rebuilds a fresh
//! [`RenderState`] for every accepted conversion and the filter overwrites the
//! per-panel entries on every search.

use std::collections::BTreeSet;

/// Which cell positions of a fact table are shown
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ColumnVisibility {
    /// Every header and every body cell, including extra cells of ragged rows
    #[default]
    All,
    /// Only these column indexes
    Only(BTreeSet<usize>),
}

impl ColumnVisibility {
    pub fn is_visible(&self, index: usize) -> bool {
        match self {
            Self::All => true,
            Self::Only(kept) => kept.contains(&index),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Only(kept) if kept.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactViewState {
    pub visible: bool,
    pub columns: ColumnVisibility,
    /// Headers matched directly by the search term (the pinned column excluded)
    pub highlighted: BTreeSet<usize>,
}

impl Default for FactViewState {
    fn default() -> Self {
        Self {
            visible: true,
            columns: ColumnVisibility::All,
            highlighted: BTreeSet::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelViewState {
    /// Cleared when a search leaves no fact table in this panel
    pub visible: bool,
    pub facts: Vec<FactViewState>,
}

impl PanelViewState {
    pub fn new(fact_count: usize) -> Self {
        Self {
            visible: true,
            facts: vec![FactViewState::default(); fact_count],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    pub label: String,
    pub active: bool,
}

/// One tab and one panel per insight
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabSet {
    tabs: Vec<Tab>,
    selected_panels: Vec<bool>,
}

impl TabSet {
    /// Tab 0 starts active with its panel selected.
    pub fn new(labels: Vec<String>) -> Self {
        let count = labels.len();
        let tabs = labels
            .into_iter()
            .enumerate()
            .map(|(i, label)| Tab { label, active: i == 0 })
            .collect();
        let selected_panels = (0..count).map(|i| i == 0).collect();
        Self {
            tabs,
            selected_panels,
        }
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn active_index(&self) -> Option<usize> {
        self.tabs.iter().position(|t| t.active)
    }

    pub fn is_panel_selected(&self, index: usize) -> bool {
        self.selected_panels.get(index).copied().unwrap_or(false)
    }

    /// Deactivate every tab and panel, then activate `index`.
    ///
    /// Out-of-range indexes leave the state untouched and return false.
    pub fn activate(&mut self, index: usize) -> bool {
        if index >= self.tabs.len() {
            return false;
        }
        for tab in &mut self.tabs {
            tab.active = false;
        }
        for selected in &mut self.selected_panels {
            *selected = false;
        }
        self.tabs[index].active = true;
        self.selected_panels[index] = true;
        true
    }

    pub fn next(&mut self) -> bool {
        match self.active_index() {
            Some(i) if !self.tabs.is_empty() => self.activate((i + 1) % self.tabs.len()),
            _ => self.activate(0),
        }
    }

    pub fn previous(&mut self) -> bool {
        let len = self.tabs.len();
        match self.active_index() {
            Some(i) if len > 0 => self.activate((i + len - 1) % len),
            _ => self.activate(0),
        }
    }
}

/// Everything the UI needs to decide what is visible
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderState {
    pub tabs: TabSet,
    pub panels: Vec<PanelViewState>,
    pub search_term: String,
    pub no_results: bool,
}

impl RenderState {
    /// Fresh state: first tab active, everything visible, no search.
    pub fn new(tabs: TabSet, fact_counts: impl IntoIterator<Item = usize>) -> Self {
        Self {
            tabs,
            panels: fact_counts.into_iter().map(PanelViewState::new).collect(),
            search_term: String::new(),
            no_results: false,
        }
    }

    /// A panel is on screen when its tab is active and the filter kept it.
    pub fn is_panel_shown(&self, index: usize) -> bool {
        self.tabs.is_panel_selected(index)
            && self.panels.get(index).is_some_and(|p| p.visible)
    }

    pub fn fact_state(&self, panel: usize, fact: usize) -> Option<&FactViewState> {
        self.panels.get(panel).and_then(|p| p.facts.get(fact))
    }
}
