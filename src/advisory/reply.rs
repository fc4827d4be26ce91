//! The model's answer and a best-effort reading of its three fields.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static FIELD_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\s>*_#-]*(Problem Summary|Suggested Fixer|Why)[*_]*\s*:[*_]*\s*(.*)$")
        .expect("field pattern is valid")
});

/// Raw text returned by the provider for one submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisoryReply {
    raw_text: String,
}

/// Fields picked out of a reply that followed the requested layout.
///
/// Any of them may be missing; the model is asked for the layout but nothing enforces it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AdvisoryFields {
    pub problem_summary: Option<String>,
    pub suggested_fixer: Option<String>,
    pub why: Option<String>,
}

impl AdvisoryFields {
    pub fn is_empty(&self) -> bool {
        self.problem_summary.is_none() && self.suggested_fixer.is_none() && self.why.is_none()
    }

    fn slot(&mut self, label: &str) -> &mut Option<String> {
        match label {
            "Problem Summary" => &mut self.problem_summary,
            "Suggested Fixer" => &mut self.suggested_fixer,
            _ => &mut self.why,
        }
    }
}

fn flush(fields: &mut AdvisoryFields, entry: Option<(&str, String)>) {
    if let Some((label, value)) = entry {
        let value = value.trim().to_string();
        if !value.is_empty() {
            *fields.slot(label) = Some(value);
        }
    }
}

impl AdvisoryReply {
    pub fn new(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
        }
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// Best-effort extraction of the labelled fields.
    ///
    /// A field starts at a line beginning with its label and a colon (markdown bullets and
    /// bold markers are tolerated) and runs until the next labelled line. Only the first
    /// occurrence of each label is kept.
    pub fn fields(&self) -> AdvisoryFields {
        let mut fields = AdvisoryFields::default();
        let mut current: Option<(&str, String)> = None;
        let mut seen: Vec<&str> = Vec::new();

        for line in self.raw_text.lines() {
            if let Some(caps) = FIELD_LINE.captures(line) {
                let label = caps.get(1).map_or("", |m| m.as_str());
                flush(&mut fields, current.take());
                if seen.contains(&label) {
                    continue;
                }
                seen.push(label);
                let rest = caps.get(2).map_or("", |m| m.as_str());
                current = Some((label, rest.trim_end_matches(['*', '_']).to_string()));
            } else if let Some((_, value)) = current.as_mut() {
                let line = line.trim();
                if !line.is_empty() {
                    if !value.is_empty() {
                        value.push(' ');
                    }
                    value.push_str(line);
                }
            }
        }
        flush(&mut fields, current.take());

        fields
    }
}
