use crate::core::Insight;
use serde::Serialize;
use serde_json::Value;

/// Summary counts over a collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightStats {
    pub count: usize,
    pub total_facts: usize,
    pub total_data_points: usize,
}

pub struct StatsService;

impl StatsService {
    /// Count insights, fact entries, and data points.
    ///
    /// Every key under `facts` counts as a fact, tabular or not. Data points are
    /// `rows * width of the first row`; later rows are not measured.
    pub fn aggregate(insights: &[Insight]) -> InsightStats {
        insights.iter().fold(
            InsightStats {
                count: insights.len(),
                ..Default::default()
            },
            |mut stats, insight| {
                stats.total_facts += insight.facts.len();
                stats.total_data_points += insight.facts.values().map(Self::data_points).sum::<usize>();
                stats
            },
        )
    }

    fn data_points(fact: &Value) -> usize {
        let Some(rows) = fact.get("rows").and_then(Value::as_array) else {
            return 0;
        };
        match rows.first().and_then(Value::as_array) {
            Some(first) => rows.len() * first.len(),
            None => 0,
        }
    }

    /// Group digits in thousands: `12345` → `"12,345"`.
    pub fn format_count(n: usize) -> String {
        let digits = n.to_string();
        let mut out = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(',');
            }
            out.push(ch);
        }
        out
    }
}
