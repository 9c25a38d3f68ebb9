//! End-to-end session behaviour against an in-process conversion backend

use insightview::core::{ExportEndpoint, InputSource, InsightCollection, InsightError};
use insightview::services::{ConversionOutcome, ConvertService, ExportFile, InsightSession};
use insightview::ConversionBackend;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

/// Converts the way the server does for well-formed input: echoes the request.
struct EchoBackend;

impl ConversionBackend for EchoBackend {
    fn convert(&self, payload: &Value) -> Result<InsightCollection, InsightError> {
        ConvertService::parse_response(payload.clone())
    }

    fn download(&self, _endpoint: ExportEndpoint, _body: &Value) -> Result<ExportFile, InsightError> {
        Err(InsightError::network("Download failed"))
    }
}

fn sample() -> String {
    json!({
        "requestId": "req-42",
        "insights": [
            {
                "useCaseId": "Churn",
                "score": 0.91,
                "facts": {
                    "summary": {
                        "cols": ["CustomerID", "Score", "Region"],
                        "rows": [[1, 0.8, "EU"], [2, 0.4, "US"]]
                    },
                    "notes": "free text"
                }
            },
            {
                "facts": {
                    "guidance": {
                        "headers": ["Guidance", "Action"],
                        "rows": [["a", "call"]]
                    }
                }
            }
        ]
    })
    .to_string()
}

fn loaded() -> InsightSession {
    let mut session = InsightSession::new();
    let outcome = session
        .convert_blocking(&EchoBackend, &sample(), &InputSource::Pasted)
        .unwrap();
    assert_eq!(outcome, ConversionOutcome::Applied);
    session
}

#[test]
fn test_load_builds_tabs_and_stats() {
    let session = loaded();
    let labels: Vec<&str> = session.tabs().tabs().iter().map(|t| t.label.as_str()).collect();
    assert_eq!(labels, vec!["Churn", "Insight 2"]);
    assert_eq!(session.active_index(), Some(0));

    let stats = session.stats();
    assert_eq!(stats.count, 2);
    assert_eq!(stats.total_facts, 3);
    assert!(session.results_visible());
    assert_eq!(session.error(), None);
}

#[test]
fn test_non_tabular_fact_is_not_rendered() {
    let session = loaded();
    let panel = session.active_panel().unwrap();
    let names: Vec<&str> = panel.facts.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["summary"]);
}

#[test]
fn test_search_keeps_pinned_identifier_column() {
    let mut session = loaded();
    session.search("REGION");

    let panel = session.active_panel().unwrap();
    let labels: Vec<&str> = panel.facts[0].headers.iter().map(|h| h.label.as_str()).collect();
    assert_eq!(labels, vec!["CustomerID", "Region"]);
    assert!(!panel.facts[0].headers[0].highlighted);
    assert!(panel.facts[0].headers[1].highlighted);
    assert_eq!(panel.facts[0].rows[0].cells, vec!["1", "EU"]);

    // "guidance" contains "id", so that panel keeps its first column
    assert!(session.state().panels[1].visible);
    assert!(!session.no_results());
}

#[test]
fn test_pinned_columns_survive_unmatched_search() {
    let mut session = loaded();
    session.search("zzz");
    assert_eq!(session.search_term(), "zzz");

    let visible: Vec<bool> = session.state().panels.iter().map(|p| p.visible).collect();
    assert_eq!(visible, vec![true, true]);
    assert!(!session.no_results());

    let panel = session.active_panel().unwrap();
    let labels: Vec<&str> = panel.facts[0].headers.iter().map(|h| h.label.as_str()).collect();
    assert_eq!(labels, vec!["CustomerID"]);
}

#[test]
fn test_search_without_matches_flags_no_results() {
    let mut session = InsightSession::new();
    session
        .convert_blocking(
            &EchoBackend,
            r#"[{"facts": {"t": {"cols": ["Name", "Region"], "rows": [["x", "EU"]]}}}]"#,
            &InputSource::Pasted,
        )
        .unwrap();

    session.search("zzz");
    assert!(session.no_results());
    assert!(!session.state().panels[0].visible);
    assert!(session.active_panel().is_none());
    assert_eq!(session.active_index(), Some(0));

    session.search("");
    assert!(!session.no_results());
    assert_eq!(session.active_panel().unwrap().facts[0].headers.len(), 2);
}

#[test]
fn test_clearing_search_restores_everything() {
    let mut session = loaded();
    let before = session.state().clone();

    session.search("score");
    session.search("");
    assert_eq!(session.state(), &before);

    session.search("score");
    let once = session.state().clone();
    session.search("score");
    assert_eq!(session.state(), &once);
}

#[test]
fn test_stale_completion_is_dropped() {
    let mut session = InsightSession::new();
    let first = session
        .prepare_conversion(&sample(), &InputSource::Pasted)
        .unwrap();
    let second = session
        .prepare_conversion(r#"[{"useCaseId": "Only"}]"#, &InputSource::Pasted)
        .unwrap();

    let newest = EchoBackend.convert(&second.payload);
    assert_eq!(session.complete_conversion(second.token, newest), ConversionOutcome::Applied);

    let late = EchoBackend.convert(&first.payload);
    assert_eq!(session.complete_conversion(first.token, late), ConversionOutcome::Stale);

    assert_eq!(session.tabs().len(), 1);
    assert_eq!(session.tabs().tabs()[0].label, "Only");
}

#[test]
fn test_malformed_paste_raises_banner_and_hides_results() {
    let mut session = loaded();
    let err = session
        .convert_blocking(&EchoBackend, "{not json", &InputSource::Pasted)
        .unwrap_err();
    assert!(matches!(err, InsightError::Input(_)));
    assert!(session.error().unwrap().starts_with("Invalid JSON format"));
    assert!(!session.results_visible());

    session.dismiss_error();
    assert!(session.results_visible());
    assert_eq!(session.tabs().len(), 2);
}

#[test]
fn test_file_parse_error_wording() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ nope").unwrap();

    let mut session = InsightSession::new();
    assert!(session.prepare_file(&path).is_err());
    assert!(session.error().unwrap().starts_with("Error reading file"));
}

#[test]
fn test_empty_insights_shows_no_insights_message() {
    let mut session = InsightSession::new();
    let outcome = session
        .convert_blocking(&EchoBackend, r#"{"insights": []}"#, &InputSource::Pasted)
        .unwrap();
    assert_eq!(outcome, ConversionOutcome::Failed);
    assert!(session.error().is_some());
    assert!(!session.has_data());
}
