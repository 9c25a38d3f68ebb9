//! The viewer's state machine: input, conversion results, search, tabs, errors.
//!
//! The session is owned by whoever drives the UI. Remote calls are not made
//! here; `prepare_conversion` hands out the payload and a token, and the
//! caller reports back through `complete_conversion` from whatever thread or
//! task ran the request.

use crate::core::{
    ExportEndpoint, InputSource, InsightCollection, InsightError, RenderState, RequestSequencer,
    RequestToken, TabSet,
};
use crate::services::convert_service::{ConversionBackend, ConvertService};
use crate::services::export_service::ExportService;
use crate::services::filter_service::FilterService;
use crate::services::render_service::{RenderService, RenderedInsight, VisiblePanel};
use crate::services::stats_service::{InsightStats, StatsService};
use crate::services::tab_service::TabService;
use chrono::{NaiveDate, Utc};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info, warn};

pub const EMPTY_INPUT_MESSAGE: &str = "Please enter JSON data";
pub const NOTHING_TO_DOWNLOAD_MESSAGE: &str = "No data to download";
pub const NOTHING_TO_COPY_MESSAGE: &str = "No data available to copy";

/// A conversion ready to send
#[derive(Debug, Clone, PartialEq)]
pub struct PendingConversion {
    pub token: RequestToken,
    pub payload: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionOutcome {
    /// New data is on screen
    Applied,
    /// A newer request was issued after this one; the result was dropped
    Stale,
    /// The error banner is showing
    Failed,
}

/// A server export ready to send
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    pub endpoint: ExportEndpoint,
    pub filename: String,
    pub body: Value,
}

#[derive(Debug, Default)]
pub struct InsightSession {
    collection: Option<InsightCollection>,
    rendered: Vec<RenderedInsight>,
    state: RenderState,
    stats: InsightStats,
    error: Option<String>,
    results_visible: bool,
    sequencer: RequestSequencer,
    in_flight: Option<RequestToken>,
}

impl InsightSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collection(&self) -> Option<&InsightCollection> {
        self.collection.as_ref()
    }

    pub fn rendered(&self) -> &[RenderedInsight] {
        &self.rendered
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    pub fn tabs(&self) -> &TabSet {
        &self.state.tabs
    }

    pub fn stats(&self) -> InsightStats {
        self.stats
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn results_visible(&self) -> bool {
        self.results_visible
    }

    pub fn search_term(&self) -> &str {
        &self.state.search_term
    }

    pub fn no_results(&self) -> bool {
        self.state.no_results
    }

    pub fn has_data(&self) -> bool {
        self.collection.as_ref().is_some_and(|c| !c.is_empty())
    }

    /// A conversion has been issued and its result has not come back yet
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Validate raw input and turn it into a `/convert` request.
    ///
    /// Failures also raise the error banner.
    pub fn prepare_conversion(
        &mut self,
        text: &str,
        source: &InputSource,
    ) -> Result<PendingConversion, InsightError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(self.fail(InsightError::input(EMPTY_INPUT_MESSAGE)));
        }

        let document: Value = match serde_json::from_str(trimmed) {
            Ok(document) => document,
            Err(e) => {
                let message = match source {
                    InputSource::Pasted => format!("Invalid JSON format: {e}"),
                    InputSource::File(_) | InputSource::Stdin => format!("Error reading file: {e}"),
                };
                warn!("Rejected input from {source}: {e}");
                return Err(self.fail(InsightError::input(message)));
            }
        };

        let request_id = Utc::now().timestamp_millis().to_string();
        let payload = ConvertService::normalize_payload(document, request_id);
        let token = self.sequencer.issue();
        self.in_flight = Some(token);
        debug!("Issued conversion {token} for {source}");
        Ok(PendingConversion { token, payload })
    }

    /// Read a JSON file and prepare it for conversion.
    pub fn prepare_file(&mut self, path: &Path) -> Result<PendingConversion, InsightError> {
        match std::fs::read_to_string(path) {
            Ok(text) => self.prepare_conversion(&text, &InputSource::File(path.to_path_buf())),
            Err(e) => {
                warn!("Failed to read {}: {e}", path.display());
                Err(self.fail(InsightError::input(format!("Error reading file: {e}"))))
            }
        }
    }

    /// Accept the result of a conversion. Only the latest issued token counts.
    pub fn complete_conversion(
        &mut self,
        token: RequestToken,
        result: Result<InsightCollection, InsightError>,
    ) -> ConversionOutcome {
        if !self.sequencer.is_current(token) {
            debug!("Discarding stale conversion {token}");
            return ConversionOutcome::Stale;
        }
        self.in_flight = None;

        let collection = match result {
            Ok(collection) => collection,
            Err(e) => {
                warn!("Conversion {token} failed: {e}");
                self.show_error(format!("Error processing data: {e}"));
                return ConversionOutcome::Failed;
            }
        };

        let tabs = match TabService::build_tabs(&collection.insights) {
            Ok(tabs) => tabs,
            Err(e) => {
                self.show_error(e.to_string());
                return ConversionOutcome::Failed;
            }
        };

        self.rendered = RenderService::render_all(&collection);
        self.state = RenderState::new(tabs, self.rendered.iter().map(|r| r.facts.len()));
        self.stats = StatsService::aggregate(&collection.insights);
        info!(
            "Showing {} insights, {} facts, {} data points",
            self.stats.count, self.stats.total_facts, self.stats.total_data_points
        );
        self.collection = Some(collection);
        self.error = None;
        self.results_visible = true;
        ConversionOutcome::Applied
    }

    /// Convert synchronously through `backend`.
    pub fn convert_blocking(
        &mut self,
        backend: &dyn ConversionBackend,
        text: &str,
        source: &InputSource,
    ) -> Result<ConversionOutcome, InsightError> {
        let pending = self.prepare_conversion(text, source)?;
        let result = backend.convert(&pending.payload);
        Ok(self.complete_conversion(pending.token, result))
    }

    /// Apply the column filter. The active tab does not change.
    pub fn search(&mut self, term: &str) {
        if self.rendered.is_empty() {
            self.state.search_term = term.to_string();
            return;
        }
        FilterService::apply(&mut self.state, &self.rendered, term);
    }

    pub fn activate_tab(&mut self, index: usize) -> bool {
        self.state.tabs.activate(index)
    }

    pub fn next_tab(&mut self) -> bool {
        self.state.tabs.next()
    }

    pub fn previous_tab(&mut self) -> bool {
        self.state.tabs.previous()
    }

    pub fn active_index(&self) -> Option<usize> {
        self.state.tabs.active_index()
    }

    /// Panel `index` as the filter left it, whether or not it is on screen.
    pub fn visible_panel(&self, index: usize) -> Option<VisiblePanel> {
        let rendered = self.rendered.get(index)?;
        let state = self.state.panels.get(index)?;
        Some(RenderService::project(rendered, state))
    }

    /// The panel on screen, if the active tab survived the filter.
    pub fn active_panel(&self) -> Option<VisiblePanel> {
        let index = self.active_index()?;
        if !self.state.is_panel_shown(index) {
            return None;
        }
        self.visible_panel(index)
    }

    pub fn default_export_filename(&self, today: NaiveDate) -> String {
        let request_id = self.collection.as_ref().and_then(|c| c.request_id.as_deref());
        ExportService::default_filename(request_id, today)
    }

    /// Build a server export. `filename` is the prompt's answer: `None` takes
    /// the default name, a blank answer takes the fallback.
    pub fn export_request(
        &self,
        endpoint: ExportEndpoint,
        filename: Option<&str>,
        today: NaiveDate,
    ) -> Result<ExportRequest, InsightError> {
        let collection = self
            .collection
            .as_ref()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| InsightError::input(NOTHING_TO_DOWNLOAD_MESSAGE))?;

        let filename = match filename.map(str::trim) {
            None => self.default_export_filename(today),
            Some("") => ExportService::fallback_filename(today),
            Some(name) => name.to_string(),
        };
        let body = ExportService::request_body(endpoint, collection, &filename);
        Ok(ExportRequest {
            endpoint,
            filename,
            body,
        })
    }

    /// The active panel as Markdown
    pub fn markdown(&self) -> Result<String, InsightError> {
        self.active_panel()
            .map(|panel| ExportService::markdown(&panel))
            .ok_or_else(|| InsightError::input(NOTHING_TO_COPY_MESSAGE))
    }

    /// Show the banner and hide the results area. Loaded data is kept.
    pub fn show_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        debug!("Error banner: {message}");
        self.error = Some(message);
        self.results_visible = false;
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
        self.results_visible = self.has_data();
    }

    fn fail(&mut self, err: InsightError) -> InsightError {
        self.show_error(err.to_string());
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::convert_service::ExportFile;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn churn() -> InsightCollection {
        serde_json::from_value(json!({
            "requestId": "r-7",
            "insights": [
                {"useCaseId": "Churn", "facts": {"summary": {"columns": ["CustomerID", "Score"], "rows": [[1, 0.8], [2, 0.3]]}}},
                {"useCaseId": "Upsell", "facts": {"offers": {"cols": ["Offer", "Price"], "rows": [["a", 1]]}}}
            ]
        }))
        .unwrap()
    }

    fn loaded() -> InsightSession {
        let mut session = InsightSession::new();
        let pending = session
            .prepare_conversion(r#"{"insights": []}"#, &InputSource::Pasted)
            .unwrap();
        assert_eq!(
            session.complete_conversion(pending.token, Ok(churn())),
            ConversionOutcome::Applied
        );
        session
    }

    #[test]
    fn test_empty_input_is_rejected() {
        let mut session = InsightSession::new();
        let err = session.prepare_conversion("   \n", &InputSource::Pasted).unwrap_err();
        assert!(matches!(err, InsightError::Input(_)));
        assert_eq!(session.error(), Some(EMPTY_INPUT_MESSAGE));
        assert!(!session.is_busy());
    }

    #[test]
    fn test_invalid_json_wording_depends_on_source() {
        let mut session = InsightSession::new();
        let err = session.prepare_conversion("{not json", &InputSource::Pasted).unwrap_err();
        assert!(err.to_string().starts_with("Invalid JSON format: "));
        assert!(!session.results_visible());

        let err = session
            .prepare_conversion("{not json", &InputSource::File("a.json".into()))
            .unwrap_err();
        assert!(err.to_string().starts_with("Error reading file: "));
    }

    #[test]
    fn test_prepare_wraps_bare_array() {
        let mut session = InsightSession::new();
        let pending = session
            .prepare_conversion(r#"[{"id": 1}]"#, &InputSource::Pasted)
            .unwrap();
        assert_eq!(pending.payload["insights"], json!([{"id": 1}]));
        assert!(pending.payload["requestId"].is_string());
        assert!(session.is_busy());
    }

    #[test]
    fn test_complete_applies_collection() {
        let session = loaded();
        assert!(session.results_visible());
        assert_eq!(session.error(), None);
        assert_eq!(session.tabs().len(), 2);
        assert_eq!(session.active_index(), Some(0));
        assert_eq!(session.stats().total_data_points, 6);
        assert!(!session.is_busy());
    }

    #[test]
    fn test_stale_completion_is_discarded() {
        let mut session = InsightSession::new();
        let first = session.prepare_conversion("[1]", &InputSource::Pasted).unwrap();
        let second = session.prepare_conversion("[2]", &InputSource::Pasted).unwrap();

        assert_eq!(
            session.complete_conversion(first.token, Ok(churn())),
            ConversionOutcome::Stale
        );
        assert!(session.collection().is_none());
        assert!(session.is_busy());

        assert_eq!(
            session.complete_conversion(second.token, Err(InsightError::network("boom"))),
            ConversionOutcome::Failed
        );
        assert_eq!(session.error(), Some("Error processing data: boom"));
    }

    #[test]
    fn test_empty_result_shows_no_insights() {
        let mut session = InsightSession::new();
        let pending = session.prepare_conversion("[]", &InputSource::Pasted).unwrap();
        let outcome = session.complete_conversion(pending.token, Ok(InsightCollection::default()));
        assert_eq!(outcome, ConversionOutcome::Failed);
        assert_eq!(session.error(), Some("No insights found in the data"));
    }

    #[test]
    fn test_error_keeps_prior_data() {
        let mut session = loaded();
        session.show_error("later failure");
        assert!(!session.results_visible());
        assert!(session.has_data());
        session.dismiss_error();
        assert!(session.results_visible());
    }

    #[test]
    fn test_search_keeps_active_tab() {
        let mut session = loaded();
        session.activate_tab(1);
        session.search("score");
        assert_eq!(session.active_index(), Some(1));
        assert!(session.active_panel().is_none());
        assert!(session.visible_panel(0).is_some_and(|p| p.facts.len() == 1));

        session.search("");
        assert!(session.active_panel().is_some());
    }

    #[test]
    fn test_export_request_filenames() {
        let day = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
        let session = loaded();

        let req = session.export_request(ExportEndpoint::Download, None, day).unwrap();
        assert_eq!(req.filename, "r-7_2026-10-15.xlsx");
        assert_eq!(req.body["filename"], json!("r-7_2026-10-15.xlsx"));

        let req = session.export_request(ExportEndpoint::Download, Some("  "), day).unwrap();
        assert_eq!(req.filename, "insights_2026-10-15.xlsx");

        let err = InsightSession::new()
            .export_request(ExportEndpoint::Download, None, day)
            .unwrap_err();
        assert_eq!(err.to_string(), NOTHING_TO_DOWNLOAD_MESSAGE);
    }

    #[test]
    fn test_markdown_requires_data() {
        assert_eq!(
            InsightSession::new().markdown().unwrap_err().to_string(),
            NOTHING_TO_COPY_MESSAGE
        );
        assert!(loaded().markdown().unwrap().starts_with("## Churn"));
    }

    struct Echo;

    impl ConversionBackend for Echo {
        fn convert(&self, _payload: &Value) -> Result<InsightCollection, InsightError> {
            Ok(churn())
        }

        fn download(&self, _endpoint: ExportEndpoint, _body: &Value) -> Result<ExportFile, InsightError> {
            Err(InsightError::network("Download failed"))
        }
    }

    #[test]
    fn test_convert_blocking() {
        let mut session = InsightSession::new();
        let outcome = session
            .convert_blocking(&Echo, r#"{"id": 1}"#, &InputSource::Stdin)
            .unwrap();
        assert_eq!(outcome, ConversionOutcome::Applied);
        assert_eq!(session.tabs().tabs()[1].label, "Upsell");
    }
}
