use crate::types::DateRange;

/// Composable filter set sent with every enumeration call. Conditions are
/// predicate strings the platform evaluates server-side
/// (e.g. `Impressions > 100`); the date range scopes the stats window.
#[derive(Debug, Clone)]
pub struct Selector {
    conditions: Vec<String>,
    date_range: DateRange,
}

impl Selector {
    pub fn new(date_range: DateRange) -> Self {
        Self {
            conditions: Vec::new(),
            date_range,
        }
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.conditions.push(condition.into());
        self
    }

    pub fn for_date_range(mut self, date_range: DateRange) -> Self {
        self.date_range = date_range;
        self
    }

    pub fn date_range(&self) -> DateRange {
        self.date_range
    }

    pub fn conditions(&self) -> &[String] {
        &self.conditions
    }

    /// Render as repeatable query parameters for the platform API.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs: Vec<(&'static str, String)> = self
            .conditions
            .iter()
            .map(|c| ("condition", c.clone()))
            .collect();
        pairs.push(("dateRange", self.date_range.as_token().to_string()));
        pairs
    }
}
