use crate::core::{Insight, InsightError, TabSet};

/// Message shown when a conversion yields nothing to display
pub const NO_INSIGHTS_MESSAGE: &str = "No insights found in the data";

pub struct TabService;

impl TabService {
    /// One tab per insight, labelled by use case, first tab active.
    pub fn build_tabs(insights: &[Insight]) -> Result<TabSet, InsightError> {
        if insights.is_empty() {
            return Err(InsightError::data_shape(NO_INSIGHTS_MESSAGE));
        }
        let labels = insights
            .iter()
            .enumerate()
            .map(|(i, insight)| insight.tab_label(i))
            .collect();
        Ok(TabSet::new(labels))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_tabs_labels() {
        let insights = vec![
            Insight {
                use_case_id: Some("Churn".into()),
                ..Default::default()
            },
            Insight::default(),
        ];
        let tabs = TabService::build_tabs(&insights).unwrap();
        let labels: Vec<&str> = tabs.tabs().iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["Churn", "Insight 2"]);
        assert_eq!(tabs.active_index(), Some(0));
    }

    #[test]
    fn test_build_tabs_empty_is_data_shape_error() {
        let err = TabService::build_tabs(&[]).unwrap_err();
        assert!(matches!(err, InsightError::DataShape(_)));
        assert_eq!(err.to_string(), NO_INSIGHTS_MESSAGE);
    }
}
