use crate::config::{DomainKeywords, InsightConfig, contains_any};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Business category of a dataset. Only picks narration phrasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainLabel {
    LeadManagement,
    Sales,
    Academic,
    Hr,
    Financial,
    ContactCrm,
    Analytics,
    Business,
}

impl fmt::Display for DomainLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DomainLabel::LeadManagement => "lead management",
            DomainLabel::Sales => "sales",
            DomainLabel::Academic => "academic",
            DomainLabel::Hr => "HR",
            DomainLabel::Financial => "financial",
            DomainLabel::ContactCrm => "contact/CRM",
            DomainLabel::Analytics => "analytics",
            DomainLabel::Business => "business",
        })
    }
}

pub struct DomainClassifier<'a> {
    keywords: &'a DomainKeywords,
}

impl<'a> DomainClassifier<'a> {
    pub fn new(config: &'a InsightConfig) -> Self {
        DomainClassifier {
            keywords: &config.domains,
        }
    }

    /// Scores in tie-break order: lead, sales, academic, HR, financial. A
    /// keyword counts once when it occurs in any haystack.
    pub fn scores(&self, haystacks: &[String]) -> [(DomainLabel, usize); 5] {
        let score = |set: &[String]| {
            set.iter()
                .filter(|k| haystacks.iter().any(|h| h.contains(k.as_str())))
                .count()
        };
        [
            (DomainLabel::LeadManagement, score(&self.keywords.lead)),
            (DomainLabel::Sales, score(&self.keywords.sales)),
            (DomainLabel::Academic, score(&self.keywords.academic)),
            (DomainLabel::Hr, score(&self.keywords.hr)),
            (DomainLabel::Financial, score(&self.keywords.financial)),
        ]
    }

    /// Best keyword match over column names (and the file stem when given).
    /// With no match at all, falls back to contact data, then numeric-heavy
    /// analytics, then generic business.
    pub fn classify(
        &self,
        columns: &[String],
        file_name: Option<&str>,
        numeric_columns: usize,
    ) -> DomainLabel {
        let lowered: Vec<String> = columns.iter().map(|c| c.to_lowercase()).collect();
        let mut haystacks = lowered.clone();
        if let Some(name) = file_name {
            let stem = name.rsplit_once('.').map_or(name, |(stem, _)| stem);
            haystacks.push(stem.to_lowercase());
        }

        let mut best = (DomainLabel::Business, 0usize);
        for (label, score) in self.scores(&haystacks) {
            if score > best.1 {
                best = (label, score);
            }
        }
        if best.1 > 0 {
            return best.0;
        }

        let has = |keywords: &[String]| lowered.iter().any(|c| contains_any(c, keywords));
        if has(&self.keywords.email) && has(&self.keywords.phone) && has(&self.keywords.name) {
            return DomainLabel::ContactCrm;
        }
        if !columns.is_empty()
            && numeric_columns as f64 > columns.len() as f64 * self.keywords.analytics_numeric_ratio
        {
            return DomainLabel::Analytics;
        }
        DomainLabel::Business
    }
}
