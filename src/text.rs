use crate::dataset::Dataset;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "excellent", "amazing", "wonderful", "fantastic", "positive", "success",
];
const NEGATIVE_WORDS: &[&str] = &[
    "bad", "terrible", "awful", "horrible", "negative", "fail", "problem", "issue",
];

/// Rows scanned for sentiment and topics.
const TEXT_ROW_LIMIT: usize = 100;
/// A value longer than this marks its column as free text.
const FREE_TEXT_MIN_CHARS: usize = 10;
const TOPIC_COUNT: usize = 5;
const KEY_PHRASE_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextInsights {
    pub columns: Vec<String>,
    pub sentiment: Sentiment,
    pub topics: Vec<String>,
    pub key_phrases: Vec<String>,
}

pub fn free_text_columns(dataset: &Dataset, sample_size: usize) -> Vec<String> {
    (0..dataset.column_count())
        .filter(|&idx| {
            dataset.column(idx).take(sample_size).any(|v| {
                v.as_text()
                    .is_some_and(|s| s.chars().count() > FREE_TEXT_MIN_CHARS)
            })
        })
        .map(|idx| dataset.columns()[idx].clone())
        .collect()
}

fn occurrences(text: &str, words: &[&str]) -> usize {
    words.iter().map(|w| text.matches(w).count()).sum()
}

/// Keyword sentiment and recurring words across free-text columns.
pub fn analyze_text(dataset: &Dataset, sample_size: usize) -> Option<TextInsights> {
    let columns = free_text_columns(dataset, sample_size);
    if columns.is_empty() {
        return None;
    }
    let indices: Vec<usize> = columns
        .iter()
        .filter_map(|c| dataset.column_index(c))
        .collect();

    let corpus = dataset
        .rows()
        .iter()
        .take(TEXT_ROW_LIMIT)
        .map(|row| {
            indices
                .iter()
                .map(|&i| row[i].label())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    let positive = occurrences(&corpus, POSITIVE_WORDS) as f64;
    let negative = occurrences(&corpus, NEGATIVE_WORDS) as f64;
    let sentiment = if positive > negative * 1.5 {
        Sentiment::Positive
    } else if negative > positive * 1.5 {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    };

    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for word in corpus.split_whitespace().filter(|w| w.chars().count() > 3) {
        *counts.entry(word).or_insert(0) += 1;
    }
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    let topics: Vec<String> = ranked
        .into_iter()
        .take(TOPIC_COUNT)
        .map(|(w, _)| w.to_string())
        .collect();
    let key_phrases = topics.iter().take(KEY_PHRASE_COUNT).cloned().collect();

    Some(TextInsights {
        columns,
        sentiment,
        topics,
        key_phrases,
    })
}
