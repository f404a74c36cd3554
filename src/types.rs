use crate::config::{ColumnKeywords, InsightConfig, contains_any};
use crate::value::{CellValue, ValueKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InferredType {
    Numeric,
    Text,
    Date,
    Boolean,
    Mixed,
}

impl InferredType {
    /// Maps the type names an upstream parser writes into `dataTypes`.
    pub fn from_metadata(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "number" | "numeric" => Some(InferredType::Numeric),
            "string" | "text" => Some(InferredType::Text),
            "date" => Some(InferredType::Date),
            "boolean" => Some(InferredType::Boolean),
            "mixed" => Some(InferredType::Mixed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainRole {
    Identifier,
    Geography,
    Currency,
    Score,
    Category,
}

pub struct ColumnTypeInferer<'a> {
    keywords: &'a ColumnKeywords,
    sample_size: usize,
}

impl<'a> ColumnTypeInferer<'a> {
    pub fn new(config: &'a InsightConfig) -> Self {
        ColumnTypeInferer {
            keywords: &config.columns,
            sample_size: config.sample_size,
        }
    }

    pub fn is_date_name(&self, name: &str) -> bool {
        contains_any(&name.to_lowercase(), &self.keywords.date)
    }

    /// Classifies a column from its first non-null values. Numeric wins only when
    /// every sample is a number; date needs both a date-like name and a majority of
    /// parseable samples.
    pub fn infer<'v>(
        &self,
        name: &str,
        values: impl IntoIterator<Item = &'v CellValue>,
    ) -> InferredType {
        let samples: Vec<&CellValue> = values
            .into_iter()
            .filter(|v| !v.is_null())
            .take(self.sample_size)
            .collect();
        if samples.is_empty() {
            return InferredType::Text;
        }

        let numbers = samples
            .iter()
            .filter(|v| v.kind() == ValueKind::Number)
            .count();
        if numbers == samples.len() {
            return InferredType::Numeric;
        }

        if self.is_date_name(name) {
            let dates = samples.iter().filter(|v| v.as_date().is_some()).count();
            if dates * 2 > samples.len() {
                return InferredType::Date;
            }
        }

        if samples.iter().all(|v| v.kind() == ValueKind::Bool) {
            return InferredType::Boolean;
        }

        // Mostly numbers with a few stray labels; kept out of the numeric set.
        if numbers * 5 > samples.len() * 4 {
            return InferredType::Mixed;
        }

        InferredType::Text
    }

    /// Role comes from the column name alone.
    pub fn role(&self, name: &str) -> Option<DomainRole> {
        let lower = name.to_lowercase();
        let padded = format!("_{}_", lower.replace([' ', '-'], "_"));
        if contains_any(&lower, &self.keywords.geo) {
            Some(DomainRole::Geography)
        } else if contains_any(&lower, &self.keywords.currency) {
            Some(DomainRole::Currency)
        } else if contains_any(&lower, &self.keywords.score) {
            Some(DomainRole::Score)
        } else if contains_any(&padded, &self.keywords.identifier) {
            Some(DomainRole::Identifier)
        } else if contains_any(&lower, &self.keywords.category) {
            Some(DomainRole::Category)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(raw: &[&str]) -> Vec<CellValue> {
        raw.iter().map(|v| CellValue::parse(v)).collect()
    }

    #[test]
    fn test_numeric_requires_every_sample() {
        let config = InsightConfig::default();
        let inferer = ColumnTypeInferer::new(&config);
        assert_eq!(
            inferer.infer("amount", &cells(&["1", "2.5", "", "4"])),
            InferredType::Numeric
        );
        assert_eq!(
            inferer.infer("amount", &cells(&["1", "two", "3"])),
            InferredType::Text
        );
    }

    #[test]
    fn test_only_first_samples_are_considered() {
        let config = InsightConfig::default();
        let inferer = ColumnTypeInferer::new(&config);
        let mut raw = vec!["1"; 10];
        raw.push("eleven");
        assert_eq!(inferer.infer("n", &cells(&raw)), InferredType::Numeric);
    }

    #[test]
    fn test_date_depends_on_column_name() {
        let config = InsightConfig::default();
        let inferer = ColumnTypeInferer::new(&config);
        let values = cells(&["2024-01-05", "2024-02-11", "2024-03-20"]);
        assert_eq!(inferer.infer("created_at", &values), InferredType::Date);
        assert_eq!(inferer.infer("label", &values), InferredType::Text);
    }

    #[test]
    fn test_empty_column_is_text() {
        let config = InsightConfig::default();
        let inferer = ColumnTypeInferer::new(&config);
        assert_eq!(inferer.infer("notes", &cells(&["", "NA"])), InferredType::Text);
    }

    #[test]
    fn test_boolean_and_mixed() {
        let config = InsightConfig::default();
        let inferer = ColumnTypeInferer::new(&config);
        assert_eq!(
            inferer.infer("active", &cells(&["true", "false", "TRUE"])),
            InferredType::Boolean
        );
        let raw = ["1", "2", "3", "4", "5", "6", "7", "8", "9", "n/a"];
        assert_eq!(inferer.infer("qty", &cells(&raw)), InferredType::Mixed);
    }

    #[test]
    fn test_roles_from_names() {
        let config = InsightConfig::default();
        let inferer = ColumnTypeInferer::new(&config);
        assert_eq!(inferer.role("Country"), Some(DomainRole::Geography));
        assert_eq!(inferer.role("deal_value"), Some(DomainRole::Currency));
        assert_eq!(inferer.role("exam_score"), Some(DomainRole::Score));
        assert_eq!(inferer.role("id"), Some(DomainRole::Identifier));
        assert_eq!(inferer.role("student_id"), Some(DomainRole::Identifier));
        assert_eq!(inferer.role("lead_source"), Some(DomainRole::Category));
        assert_eq!(inferer.role("paid"), None);
    }

    #[test]
    fn test_metadata_type_names() {
        assert_eq!(InferredType::from_metadata("number"), Some(InferredType::Numeric));
        assert_eq!(InferredType::from_metadata("string"), Some(InferredType::Text));
        assert_eq!(InferredType::from_metadata("blob"), None);
    }
}
