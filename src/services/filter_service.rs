//! Column filter driven by search text.
//!
//! Each fact table is filtered on its own: a column survives when its header
//! contains the term, and the first identifier-looking column always survives
//! a non-empty search. Panels with no surviving table are hidden. The filter
//! only produces view state; rendered data is never modified.

use crate::core::{ColumnVisibility, FactViewState, PanelViewState, RenderState};
use crate::services::render_service::RenderedInsight;
use std::collections::BTreeSet;
use tracing::debug;

/// Headers containing this marker (case-insensitive) are identifier columns.
/// Substring match: "guidance" qualifies too.
pub const PINNED_COLUMN_MARKER: &str = "id";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOutcome {
    pub panels: Vec<PanelViewState>,
    /// Term was non-empty and no fact table anywhere kept a column
    pub no_results: bool,
}

pub struct FilterService;

impl FilterService {
    /// First header (already lower-cased) containing the pinned marker
    pub fn pinned_index(lowered_headers: &[String]) -> Option<usize> {
        lowered_headers
            .iter()
            .position(|h| h.contains(PINNED_COLUMN_MARKER))
    }

    /// Filter one fact table. `term` must already be lower-cased.
    pub fn filter_fact(headers: &[String], term: &str) -> FactViewState {
        if term.is_empty() {
            return FactViewState::default();
        }

        let lowered: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();
        let pinned = Self::pinned_index(&lowered);

        let mut kept = BTreeSet::new();
        let mut highlighted = BTreeSet::new();
        for (idx, header) in lowered.iter().enumerate() {
            let matched = header.contains(term);
            if matched || Some(idx) == pinned {
                kept.insert(idx);
            }
            if matched && Some(idx) != pinned {
                highlighted.insert(idx);
            }
        }

        FactViewState {
            visible: !kept.is_empty(),
            columns: ColumnVisibility::Only(kept),
            highlighted,
        }
    }

    /// Filter every panel. The term is lower-cased here; it is not trimmed.
    pub fn filter(rendered: &[RenderedInsight], term: &str) -> FilterOutcome {
        let term = term.to_lowercase();
        let mut any_match = false;

        let panels = rendered
            .iter()
            .map(|insight| {
                let facts: Vec<FactViewState> = insight
                    .facts
                    .iter()
                    .map(|fact| Self::filter_fact(&fact.headers, &term))
                    .collect();
                let has_visible_fact = facts.iter().any(|f| f.visible);
                any_match |= has_visible_fact;
                PanelViewState {
                    visible: term.is_empty() || has_visible_fact,
                    facts,
                }
            })
            .collect();

        FilterOutcome {
            panels,
            no_results: !term.is_empty() && !any_match,
        }
    }

    /// Run the filter and store the outcome in `state`. Tab selection is untouched.
    pub fn apply(state: &mut RenderState, rendered: &[RenderedInsight], term: &str) {
        let outcome = Self::filter(rendered, term);
        debug!(
            "Filter '{term}': {} of {} panels visible, no_results={}",
            outcome.panels.iter().filter(|p| p.visible).count(),
            outcome.panels.len(),
            outcome.no_results
        );
        state.panels = outcome.panels;
        state.no_results = outcome.no_results;
        state.search_term = term.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|s| s.to_string()).collect()
    }

    fn kept(state: &FactViewState) -> Vec<usize> {
        match &state.columns {
            ColumnVisibility::All => vec![],
            ColumnVisibility::Only(set) => set.iter().copied().collect(),
        }
    }

    #[test]
    fn test_empty_term_keeps_everything() {
        let state = FilterService::filter_fact(&headers(&["A", "B"]), "");
        assert_eq!(state, FactViewState::default());
    }

    #[test]
    fn test_pinned_column_survives() {
        let state = FilterService::filter_fact(&headers(&["Name", "CustomerID", "Score"]), "score");
        assert!(state.visible);
        assert_eq!(kept(&state), vec![1, 2]);
        assert_eq!(state.highlighted.iter().copied().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_pinned_match_is_not_highlighted() {
        let state = FilterService::filter_fact(&headers(&["CustomerID", "Score"]), "customer");
        assert_eq!(kept(&state), vec![0]);
        assert!(state.highlighted.is_empty());
    }

    #[test]
    fn test_only_first_id_column_is_pinned() {
        let state = FilterService::filter_fact(&headers(&["OrderId", "UserId", "Total"]), "total");
        assert_eq!(kept(&state), vec![0, 2]);
    }

    #[test]
    fn test_guidance_counts_as_identifier() {
        let lowered = headers(&["name", "guidance"]);
        assert_eq!(FilterService::pinned_index(&lowered), Some(1));

        let state = FilterService::filter_fact(&headers(&["Name", "Guidance"]), "zzz");
        assert!(state.visible);
        assert_eq!(kept(&state), vec![1]);
    }

    #[test]
    fn test_no_match_hides_fact() {
        let state = FilterService::filter_fact(&headers(&["Name", "Score"]), "zzz");
        assert!(!state.visible);
        assert!(state.columns.is_empty());
    }

    #[test]
    fn test_attribute_type_suffix_is_searchable() {
        let state = FilterService::filter_fact(&headers(&["Amount (currency)", "Name"]), "currency");
        assert_eq!(kept(&state), vec![0]);
    }
}
