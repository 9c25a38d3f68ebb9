//! Getting insights out of the viewer: server exports, Markdown, CSV.

use crate::core::{ExportEndpoint, Fact, InsightCollection, InsightError};
use crate::services::render_service::VisiblePanel;
use arboard::Clipboard;
use chrono::NaiveDate;
use serde_json::{json, Map, Value};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

pub struct ExportService;

impl ExportService {
    /// `<requestId>_<YYYY-MM-DD>.xlsx`, with `insights` standing in for a missing id
    pub fn default_filename(request_id: Option<&str>, today: NaiveDate) -> String {
        let stem = request_id.filter(|id| !id.is_empty()).unwrap_or("insights");
        format!("{stem}_{}.xlsx", today.format("%Y-%m-%d"))
    }

    /// Used when the filename prompt is confirmed blank
    pub fn fallback_filename(today: NaiveDate) -> String {
        Self::default_filename(None, today)
    }

    /// `{requestId, insights}` with every tabular fact reduced to its table.
    ///
    /// Non-tabular facts are dropped. Tables go out as `cols`/`rows`/`type`,
    /// mirrored under `headers` and `attributesTypes` for the `/download-csv`
    /// route, which reads those keys.
    pub fn export_payload(collection: &InsightCollection) -> Value {
        let insights: Vec<Value> = collection
            .insights
            .iter()
            .map(|insight| {
                let mut value = serde_json::to_value(insight).unwrap_or(Value::Null);
                let facts: Map<String, Value> = insight
                    .facts
                    .iter()
                    .filter_map(|(name, raw)| Self::export_fact(raw).map(|f| (name.clone(), f)))
                    .collect();
                if let Value::Object(obj) = &mut value {
                    obj.insert("facts".to_string(), Value::Object(facts));
                }
                value
            })
            .collect();

        json!({
            "requestId": collection.request_id,
            "insights": insights,
        })
    }

    fn export_fact(raw: &Value) -> Option<Value> {
        let fact = Fact::from_value(raw)?;
        let obj = raw.as_object()?;
        let cols = ["cols", "headers", "columns"]
            .iter()
            .find_map(|key| obj.get(*key))
            .cloned()
            .unwrap_or(Value::Array(vec![]));

        let mut out = Map::new();
        out.insert("cols".into(), cols.clone());
        out.insert("headers".into(), cols);
        out.insert("rows".into(), obj.get("rows").cloned().unwrap_or(Value::Array(vec![])));
        if let Some(kind) = obj.get("type").filter(|v| !v.is_null()) {
            out.insert("type".into(), kind.clone());
        }
        if !fact.attribute_types.is_empty() {
            out.insert("attributesTypes".into(), json!(fact.attribute_types));
        }
        Some(Value::Object(out))
    }

    /// Request body for an export endpoint.
    pub fn request_body(endpoint: ExportEndpoint, collection: &InsightCollection, filename: &str) -> Value {
        let payload = Self::export_payload(collection);
        match endpoint {
            ExportEndpoint::Download => json!({"data": payload, "filename": filename}),
            ExportEndpoint::DownloadCsv => payload,
        }
    }

    /// Write exported bytes, creating parent directories as needed.
    pub fn save(path: &Path, bytes: &[u8]) -> Result<PathBuf, InsightError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, bytes)?;
        info!("Saved {} bytes to {}", bytes.len(), path.display());
        Ok(path.to_path_buf())
    }

    /// Markdown rendering of one panel as currently filtered.
    pub fn markdown(panel: &VisiblePanel) -> String {
        let mut out = String::new();
        out.push_str(&format!("## {}\n\n", escape_markdown(&panel.label)));
        out.push_str("| Field | Value |\n| --- | --- |\n");
        for (field, value) in &panel.details {
            out.push_str(&format!("| {} | {} |\n", field, escape_markdown(value)));
        }

        for fact in &panel.facts {
            out.push_str(&format!("\n### {}\n\n", escape_markdown(&fact.heading)));
            if fact.headers.is_empty() {
                out.push_str("_No columns_\n");
                continue;
            }
            let width = fact.headers.len();
            let header: Vec<String> = fact.headers.iter().map(|h| escape_markdown(&h.label)).collect();
            out.push_str(&format!("| {} |\n", header.join(" | ")));
            out.push_str(&format!("|{}\n", " --- |".repeat(width)));
            for row in &fact.rows {
                let cells: Vec<String> = (0..width)
                    .map(|i| row.cells.get(i).map(|c| escape_markdown(c)).unwrap_or_default())
                    .collect();
                out.push_str(&format!("| {} |\n", cells.join(" | ")));
            }
        }
        out
    }

    /// CSV in the server's sheet layout: a details block, then per fact a
    /// `Fact:` line, a `Type:` line, the header row and the data rows.
    pub fn write_csv<W: Write>(panel: &VisiblePanel, writer: W) -> Result<(), InsightError> {
        let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(writer);

        wtr.write_record(["Insight Details"])?;
        wtr.write_record(["Field", "Value"])?;
        for (field, value) in &panel.details {
            wtr.write_record([*field, value.as_str()])?;
        }

        for fact in &panel.facts {
            Self::blank_line(&mut wtr)?;
            wtr.write_record([format!("Fact: {}", fact.name)])?;
            wtr.write_record(["Type:", fact.kind.as_str()])?;
            if !fact.headers.is_empty() {
                wtr.write_record(fact.headers.iter().map(|h| h.label.as_str()))?;
            }
            for row in &fact.rows {
                if !row.cells.is_empty() {
                    wtr.write_record(&row.cells)?;
                }
            }
        }
        wtr.flush()?;
        Ok(())
    }

    fn blank_line<W: Write>(wtr: &mut csv::Writer<W>) -> Result<(), InsightError> {
        wtr.flush()?;
        wtr.get_mut().write_all(b"\n")?;
        Ok(())
    }

    pub fn save_csv(path: &Path, panel: &VisiblePanel) -> Result<PathBuf, InsightError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(path)?;
        Self::write_csv(panel, file)?;
        info!("Wrote CSV for '{}' to {}", panel.label, path.display());
        Ok(path.to_path_buf())
    }

    pub fn copy_to_clipboard(text: &str) -> Result<(), InsightError> {
        Clipboard::new()
            .and_then(|mut clipboard| clipboard.set_text(text.to_string()))
            .map_err(|e| InsightError::Clipboard(e.to_string()))
    }

    pub fn read_clipboard() -> Result<String, InsightError> {
        Clipboard::new()
            .and_then(|mut clipboard| clipboard.get_text())
            .map_err(|e| InsightError::Clipboard(e.to_string()))
    }
}

fn escape_markdown(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PanelViewState;
    use crate::services::render_service::RenderService;
    use crate::services::filter_service::FilterService;
    use pretty_assertions::assert_eq;

    fn collection() -> InsightCollection {
        serde_json::from_value(json!({
            "requestId": "r-1",
            "insights": [{
                "id": "i1",
                "useCaseId": "Churn",
                "owner": "ops",
                "facts": {
                    "storyId": "s-9",
                    "summary": {
                        "headers": ["CustomerID", "Score"],
                        "rows": [[1, 0.8], [2, "a|b"]],
                        "type": "Table",
                        "attributesTypes": ["int", "float"]
                    }
                }
            }]
        }))
        .unwrap()
    }

    #[test]
    fn test_default_filename() {
        let day = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
        assert_eq!(ExportService::default_filename(Some("r-1"), day), "r-1_2026-10-15.xlsx");
        assert_eq!(ExportService::default_filename(Some(""), day), "insights_2026-10-15.xlsx");
        assert_eq!(ExportService::fallback_filename(day), "insights_2026-10-15.xlsx");
    }

    #[test]
    fn test_export_payload_maps_headers_to_cols() {
        let payload = ExportService::export_payload(&collection());
        assert_eq!(payload["requestId"], json!("r-1"));

        let insight = &payload["insights"][0];
        assert_eq!(insight["owner"], json!("ops"));
        let facts = insight["facts"].as_object().unwrap();
        assert_eq!(facts.len(), 1);
        assert_eq!(facts["summary"]["cols"], json!(["CustomerID", "Score"]));
        assert_eq!(facts["summary"]["headers"], json!(["CustomerID", "Score"]));
        assert_eq!(facts["summary"]["type"], json!("Table"));
    }

    #[test]
    fn test_request_body_shapes() {
        let c = collection();
        let body = ExportService::request_body(ExportEndpoint::Download, &c, "out.xlsx");
        assert_eq!(body["filename"], json!("out.xlsx"));
        assert_eq!(body["data"]["requestId"], json!("r-1"));

        let body = ExportService::request_body(ExportEndpoint::DownloadCsv, &c, "out.xlsx");
        assert_eq!(body["requestId"], json!("r-1"));
        assert!(body.get("filename").is_none());
    }

    #[test]
    fn test_markdown_of_filtered_panel() {
        let c = collection();
        let rendered = RenderService::render_all(&c);
        let outcome = FilterService::filter(&rendered, "score");
        let panel = RenderService::project(&rendered[0], &outcome.panels[0]);

        let md = ExportService::markdown(&panel);
        assert!(md.starts_with("## Churn\n"));
        assert!(md.contains("| ID | i1 |"));
        assert!(md.contains("### summary (Table)"));
        assert!(md.contains("| CustomerID (int) | Score (float) |"));
        assert!(md.contains("| 2 | a\\|b |"));
    }

    #[test]
    fn test_csv_layout() {
        let c = collection();
        let rendered = RenderService::render_all(&c);
        let panel = RenderService::project(&rendered[0], &PanelViewState::new(1));

        let mut buf = Vec::new();
        ExportService::write_csv(&panel, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Insight Details");
        assert_eq!(lines[1], "Field,Value");
        assert!(lines.contains(&"Fact: summary"));
        assert!(lines.contains(&"Type:,Table"));
        assert!(lines.contains(&"CustomerID (int),Score (float)"));
        assert!(lines.contains(&"2,a|b"));
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("out.xlsx");
        ExportService::save(&path, b"PK\x03\x04").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"PK\x03\x04");
    }
}
