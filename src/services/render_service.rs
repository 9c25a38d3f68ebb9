//! Turns insights into table view models.
//!
//! Rendering is total: facts that are not tables are skipped, never reported.
//! The result owns plain strings so the filter and the terminal components
//! can work without touching JSON again.

use crate::core::{cell_text, Fact, Insight, InsightCollection, PanelViewState};
use serde_json::Value;
use tracing::debug;

/// Cosmetic zebra stripe by row parity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stripe {
    Base,
    Alternate,
}

impl Stripe {
    pub fn for_row(index: usize) -> Self {
        if index % 2 == 0 {
            Self::Base
        } else {
            Self::Alternate
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRow {
    pub cells: Vec<String>,
    pub stripe: Stripe,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFact {
    pub name: String,
    /// `"<name> (<type>)"`
    pub heading: String,
    pub kind: String,
    pub headers: Vec<String>,
    pub rows: Vec<RenderedRow>,
}

impl RenderedFact {
    /// Widest of the header row and every body row
    pub fn width(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.cells.len())
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedInsight {
    pub label: String,
    pub details: Vec<(&'static str, String)>,
    pub facts: Vec<RenderedFact>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleHeader {
    pub index: usize,
    pub label: String,
    pub highlighted: bool,
}

/// A fact table after the column filter, ready to draw or export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleFact {
    pub name: String,
    pub heading: String,
    pub kind: String,
    pub headers: Vec<VisibleHeader>,
    pub rows: Vec<RenderedRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisiblePanel {
    pub label: String,
    pub details: Vec<(&'static str, String)>,
    pub facts: Vec<VisibleFact>,
}

pub struct RenderService;

impl RenderService {
    pub fn render_all(collection: &InsightCollection) -> Vec<RenderedInsight> {
        collection
            .insights
            .iter()
            .enumerate()
            .map(|(i, insight)| Self::render(insight, i))
            .collect()
    }

    /// Render one insight; `index` is its tab position, used for the fallback label.
    pub fn render(insight: &Insight, index: usize) -> RenderedInsight {
        let mut facts = Vec::new();
        for (name, value) in &insight.facts {
            match Fact::from_value(value) {
                Some(fact) => facts.push(Self::render_fact(name, &fact)),
                None => debug!("Skipping non-tabular fact '{name}' in insight {index}"),
            }
        }

        RenderedInsight {
            label: insight.tab_label(index),
            details: insight.details(),
            facts,
        }
    }

    pub fn render_fact(name: &str, fact: &Fact) -> RenderedFact {
        let headers = (0..fact.columns.len())
            .map(|i| fact.header_label(i))
            .collect();

        let rows = fact
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| RenderedRow {
                cells: row.iter().map(Self::render_cell).collect(),
                stripe: Stripe::for_row(i),
            })
            .collect();

        let kind = fact.kind_label().to_string();
        RenderedFact {
            name: name.to_string(),
            heading: format!("{name} ({kind})"),
            kind,
            headers,
            rows,
        }
    }

    pub fn render_cell(value: &Value) -> String {
        cell_text(value)
    }

    /// Apply a panel's filter state to its rendered tables.
    ///
    /// Hidden facts are dropped. With every column visible, ragged rows that are
    /// wider than the header get untitled header cells.
    pub fn project(rendered: &RenderedInsight, state: &PanelViewState) -> VisiblePanel {
        let facts = rendered
            .facts
            .iter()
            .enumerate()
            .filter_map(|(i, fact)| {
                let fact_state = state.facts.get(i).cloned().unwrap_or_default();
                if !fact_state.visible {
                    return None;
                }

                let headers = (0..fact.width())
                    .filter(|idx| fact_state.columns.is_visible(*idx))
                    .map(|idx| VisibleHeader {
                        index: idx,
                        label: fact.headers.get(idx).cloned().unwrap_or_default(),
                        highlighted: fact_state.highlighted.contains(&idx),
                    })
                    .collect();

                let rows = fact
                    .rows
                    .iter()
                    .map(|row| RenderedRow {
                        cells: row
                            .cells
                            .iter()
                            .enumerate()
                            .filter(|(idx, _)| fact_state.columns.is_visible(*idx))
                            .map(|(_, cell)| cell.clone())
                            .collect(),
                        stripe: row.stripe,
                    })
                    .collect();

                Some(VisibleFact {
                    name: fact.name.clone(),
                    heading: fact.heading.clone(),
                    kind: fact.kind.clone(),
                    headers,
                    rows,
                })
            })
            .collect();

        VisiblePanel {
            label: rendered.label.clone(),
            details: rendered.details.clone(),
            facts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ColumnVisibility, FactViewState};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn churn() -> Insight {
        serde_json::from_value(json!({
            "useCaseId": "Churn",
            "facts": {
                "summary": {"columns": ["CustomerID", "Score"], "rows": [[1, 0.8], [2, 0.3]]}
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_render_churn_scenario() {
        let rendered = RenderService::render(&churn(), 0);
        assert_eq!(rendered.label, "Churn");
        assert_eq!(rendered.facts.len(), 1);

        let fact = &rendered.facts[0];
        assert_eq!(fact.headers, vec!["CustomerID", "Score"]);
        assert_eq!(fact.rows.len(), 2);
        assert_eq!(fact.rows[0].cells, vec!["1", "0.8"]);
        assert_eq!(fact.rows[0].stripe, Stripe::Base);
        assert_eq!(fact.rows[1].stripe, Stripe::Alternate);
        assert_eq!(fact.heading, "summary (Table)");
    }

    #[test]
    fn test_header_labels_carry_attribute_types() {
        let insight: Insight = serde_json::from_value(json!({
            "facts": {
                "t": {"headers": ["a", "b", "c"], "rows": [], "attributesTypes": ["int", ""], "type": "Metric"}
            }
        }))
        .unwrap();
        let rendered = RenderService::render(&insight, 0);
        assert_eq!(rendered.facts[0].headers, vec!["a (int)", "b", "c"]);
        assert_eq!(rendered.facts[0].heading, "t (Metric)");
    }

    #[test]
    fn test_non_tabular_facts_are_skipped() {
        let insight: Insight = serde_json::from_value(json!({
            "facts": {
                "storyId": "abc-123",
                "broken": {"rows": [[1]]},
                "ok": {"cols": ["x"], "rows": [["y"]]}
            }
        }))
        .unwrap();
        let rendered = RenderService::render(&insight, 4);
        assert_eq!(rendered.label, "Insight 5");
        assert_eq!(rendered.facts.len(), 1);
        assert_eq!(rendered.facts[0].name, "ok");
    }

    #[test]
    fn test_ragged_rows_are_tolerated() {
        let insight: Insight = serde_json::from_value(json!({
            "facts": {"t": {"cols": ["a", "b"], "rows": [["1"], ["1", "2", "3"]]}}
        }))
        .unwrap();
        let rendered = RenderService::render(&insight, 0);
        let fact = &rendered.facts[0];
        assert_eq!(fact.rows[0].cells.len(), 1);
        assert_eq!(fact.width(), 3);

        let panel = RenderService::project(&rendered, &PanelViewState::new(1));
        let labels: Vec<&str> = panel.facts[0].headers.iter().map(|h| h.label.as_str()).collect();
        assert_eq!(labels, vec!["a", "b", ""]);
    }

    #[test]
    fn test_project_hides_columns_and_facts() {
        let rendered = RenderService::render(&churn(), 0);
        let mut state = PanelViewState::new(1);
        state.facts[0] = FactViewState {
            visible: true,
            columns: ColumnVisibility::Only([1].into_iter().collect()),
            highlighted: [1].into_iter().collect(),
        };

        let panel = RenderService::project(&rendered, &state);
        let fact = &panel.facts[0];
        assert_eq!(fact.headers.len(), 1);
        assert_eq!(fact.headers[0].label, "Score");
        assert!(fact.headers[0].highlighted);
        assert_eq!(fact.rows[1].cells, vec!["0.3"]);

        state.facts[0].visible = false;
        assert!(RenderService::project(&rendered, &state).facts.is_empty());
    }
}
