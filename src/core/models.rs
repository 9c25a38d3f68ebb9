use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One analyzed record: identity fields plus named facts.
///
/// Identity fields accept any JSON scalar and keep its display form, so a
/// numeric `score` survives as `"0.9"`. Facts are kept as raw JSON in insertion
/// order and interpreted on demand; entries that are not tabular stay in the
/// map untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    #[serde(default, deserialize_with = "display_string", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "display_string", skip_serializing_if = "Option::is_none")]
    pub insight_id: Option<String>,
    #[serde(default, deserialize_with = "display_string", skip_serializing_if = "Option::is_none")]
    pub use_case_id: Option<String>,
    #[serde(
        rename = "type",
        default,
        deserialize_with = "display_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "display_string", skip_serializing_if = "Option::is_none")]
    pub segment: Option<String>,
    #[serde(default, deserialize_with = "display_string", skip_serializing_if = "Option::is_none")]
    pub score: Option<String>,
    #[serde(default, deserialize_with = "display_string", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "display_string", skip_serializing_if = "Option::is_none")]
    pub generated_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_facts")]
    pub facts: Map<String, Value>,
    /// Fields this viewer does not interpret, re-sent verbatim on export
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Insight {
    /// Tab label: the use case id, or "Insight N" (1-based) when absent or empty.
    pub fn tab_label(&self, index: usize) -> String {
        match self.use_case_id.as_deref() {
            Some(label) if !label.is_empty() => label.to_string(),
            _ => format!("Insight {}", index + 1),
        }
    }

    /// Rows of the details table, in display order.
    pub fn details(&self) -> Vec<(&'static str, String)> {
        let field = |v: &Option<String>| v.clone().unwrap_or_default();
        vec![
            ("ID", field(&self.id)),
            ("Use Case", field(&self.use_case_id)),
            ("Type", field(&self.kind)),
            ("Segment", field(&self.segment)),
            ("Score", field(&self.score)),
            ("Status", field(&self.status)),
            ("Generated Date", field(&self.generated_date)),
        ]
    }

    /// Facts that parse as tables, in insertion order.
    pub fn tabular_facts(&self) -> impl Iterator<Item = (&str, Fact)> {
        self.facts
            .iter()
            .filter_map(|(name, value)| Fact::from_value(value).map(|fact| (name.as_str(), fact)))
    }
}

/// A named tabular dataset attached to an insight.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fact {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub kind: Option<String>,
    pub attribute_types: Vec<String>,
}

/// Keys the column list may arrive under, first present wins.
const COLUMN_KEYS: [&str; 3] = ["cols", "headers", "columns"];
const ATTRIBUTE_TYPE_KEYS: [&str; 2] = ["attributesTypes", "attributeTypes"];

impl Fact {
    /// Interpret a raw fact value. Returns `None` for anything that is not a
    /// table: non-objects, a missing or non-sequence column list or `rows`, or
    /// rows that are not sequences.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let columns = COLUMN_KEYS
            .iter()
            .find_map(|key| obj.get(*key))?
            .as_array()?
            .iter()
            .map(cell_text)
            .collect();

        let rows = obj
            .get("rows")?
            .as_array()?
            .iter()
            .map(|row| row.as_array().cloned())
            .collect::<Option<Vec<_>>>()?;

        let kind = obj
            .get("type")
            .filter(|v| !v.is_null())
            .map(cell_text)
            .filter(|s| !s.is_empty());

        let attribute_types = ATTRIBUTE_TYPE_KEYS
            .iter()
            .find_map(|key| obj.get(*key))
            .and_then(Value::as_array)
            .map(|types| types.iter().map(cell_text).collect())
            .unwrap_or_default();

        Some(Self {
            columns,
            rows,
            kind,
            attribute_types,
        })
    }

    /// Header label for column `index`, with the attribute type appended when declared.
    pub fn header_label(&self, index: usize) -> String {
        let column = self.columns.get(index).map(String::as_str).unwrap_or_default();
        match self.attribute_types.get(index) {
            Some(attr) if !attr.is_empty() => format!("{column} ({attr})"),
            _ => column.to_string(),
        }
    }

    /// Type label shown in the fact heading.
    pub fn kind_label(&self) -> &str {
        self.kind.as_deref().unwrap_or("Table")
    }
}

/// Ordered insights as returned by one conversion, plus the server's request id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightCollection {
    #[serde(default, deserialize_with = "display_string", skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default)]
    pub insights: Vec<Insight>,
}

impl InsightCollection {
    pub fn len(&self) -> usize {
        self.insights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insights.is_empty()
    }
}

/// Display text for a JSON value.
///
/// Null is empty, a language object yields its `en` text, other objects and
/// arrays their compact JSON, numbers print the way a browser would.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_text(n),
        Value::Object(obj) => match obj.get("en") {
            Some(en) if is_truthy(en) => cell_text(en),
            _ => value.to_string(),
        },
        Value::Array(_) => value.to_string(),
    }
}

fn number_text(n: &serde_json::Number) -> String {
    if n.is_f64() {
        if let Some(f) = n.as_f64() {
            if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e21 {
                return format!("{f:.0}");
            }
        }
    }
    n.to_string()
}

/// Browser truthiness of a JSON value
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn display_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.is_null()).map(|v| cell_text(&v)))
}

fn lenient_facts<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => {
            tracing::debug!("Ignoring non-object facts value: {other}");
            Ok(Map::new())
        }
    }
}
