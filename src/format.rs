//! Number formatting and the `{placeholder}` templates every narration is built
//! from. Keeping precision here means all renderers round the same way:
//! statistics to two decimals, percentages to one, coefficients to three.

use indexmap::IndexMap;
use tracing::warn;

/// Magnitudes from here up are written in scientific notation.
const SCIENTIFIC_FROM: f64 = 1e15;

fn fixed(value: f64, decimals: usize) -> String {
    if value.abs() >= SCIENTIFIC_FROM {
        return format!("{value:.decimals$e}");
    }
    let rendered = format!("{value:.decimals$}");
    // "-0.00" reads badly when spoken.
    if rendered.starts_with('-') && rendered[1..].chars().all(|c| c == '0' || c == '.') {
        rendered[1..].to_string()
    } else {
        rendered
    }
}

pub fn stat(value: f64) -> String {
    fixed(value, 2)
}

pub fn percent(value: f64) -> String {
    fixed(value, 1)
}

pub fn coefficient(value: f64) -> String {
    fixed(value, 3)
}

/// At most `limit` names, comma separated.
pub fn list<S: AsRef<str>>(items: &[S], limit: usize) -> String {
    items
        .iter()
        .take(limit)
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Text(String),
    Stat(f64),
    Percent(f64),
    Coefficient(f64),
    Count(usize),
}

impl Binding {
    fn render(&self) -> String {
        match self {
            Binding::Text(s) => s.clone(),
            Binding::Stat(v) => stat(*v),
            Binding::Percent(v) => percent(*v),
            Binding::Coefficient(v) => coefficient(*v),
            Binding::Count(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Bindings(IndexMap<&'static str, Binding>);

impl Bindings {
    pub fn new() -> Self {
        Bindings::default()
    }

    pub fn text(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.0.insert(key, Binding::Text(value.into()));
        self
    }

    pub fn stat(mut self, key: &'static str, value: f64) -> Self {
        self.0.insert(key, Binding::Stat(value));
        self
    }

    pub fn percent(mut self, key: &'static str, value: f64) -> Self {
        self.0.insert(key, Binding::Percent(value));
        self
    }

    pub fn coefficient(mut self, key: &'static str, value: f64) -> Self {
        self.0.insert(key, Binding::Coefficient(value));
        self
    }

    pub fn count(mut self, key: &'static str, value: usize) -> Self {
        self.0.insert(key, Binding::Count(value));
        self
    }

    pub fn get(&self, key: &str) -> Option<&Binding> {
        self.0.get(key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template(&'static str);

impl Template {
    pub const fn new(source: &'static str) -> Self {
        Template(source)
    }

    /// Replaces each `{key}` with its binding. An unbound key renders empty and is
    /// logged; an unmatched `{` is copied through.
    pub fn render(&self, bindings: &Bindings) -> String {
        let mut out = String::with_capacity(self.0.len() + 32);
        let mut rest = self.0;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            match after.find('}') {
                Some(close) => {
                    let key = &after[..close];
                    match bindings.get(key) {
                        Some(binding) => out.push_str(&binding.render()),
                        None => warn!(key, template = self.0, "template placeholder has no binding"),
                    }
                    rest = &after[close + 1..];
                }
                None => {
                    out.push_str(&rest[open..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precision() {
        assert_eq!(stat(3.14159), "3.14");
        assert_eq!(percent(16.6666), "16.7");
        assert_eq!(coefficient(0.87349), "0.873");
        assert_eq!(stat(-0.001), "0.00");
        assert_eq!(stat(-2.5), "-2.50");
    }

    #[test]
    fn test_huge_values_use_exponent() {
        assert_eq!(stat(2.5e307), "2.50e307");
        assert_eq!(stat(-1.5e20), "-1.50e20");
        assert_eq!(stat(999_999.0), "999999.00");
    }

    #[test]
    fn test_list_limit() {
        let names = ["a", "b", "c", "d"];
        assert_eq!(list(&names, 3), "a, b, c");
        assert_eq!(list::<&str>(&[], 3), "");
    }

    #[test]
    fn test_render_template() {
        let template = Template::new("{metric} averages {mean} ({share}% of {rows} rows)");
        let bindings = Bindings::new()
            .text("metric", "score")
            .stat("mean", 71.456)
            .percent("share", 12.345)
            .count("rows", 40);
        assert_eq!(template.render(&bindings), "score averages 71.46 (12.3% of 40 rows)");
    }

    #[test]
    fn test_render_missing_and_unclosed() {
        let template = Template::new("a {missing} b {open");
        assert_eq!(template.render(&Bindings::new()), "a  b {open");
    }
}
