//! Textual diagnostics for cleaned and flagged GLOBE Observer data.
//!
//! Summaries are built from table columns and collected into a
//! `DiagnosticReport`, which renders as a plain-text report for the
//! terminal.

use std::collections::BTreeMap;
use std::fmt;

use crate::model::GoError;
use crate::table::{Table, Value};

const RULE: &str = "═══════════════════════════════════════════════════════════";

// ============================================================================
// Report
// ============================================================================

/// One titled block of label/value rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub title: String,
    pub rows: Vec<(String, String)>,
}

impl Section {
    pub fn new(title: impl Into<String>) -> Self {
        Section {
            title: title.into(),
            rows: Vec::new(),
        }
    }

    pub fn row(mut self, label: impl Into<String>, value: impl ToString) -> Self {
        self.rows.push((label.into(), value.to_string()));
        self
    }

    /// A section listing a count per label.
    pub fn counts(title: impl Into<String>, counts: Vec<(String, usize)>) -> Self {
        counts
            .into_iter()
            .fold(Section::new(title), |section, (label, n)| section.row(label, n))
    }

    pub fn value(&self, label: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticReport {
    pub title: String,
    pub entries: usize,
    pub sections: Vec<Section>,
}

impl DiagnosticReport {
    pub fn new(title: impl Into<String>, entries: usize) -> Self {
        DiagnosticReport {
            title: title.into(),
            entries,
            sections: Vec::new(),
        }
    }

    pub fn push(&mut self, section: Section) {
        self.sections.push(section);
    }

    pub fn section(&self, title: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.title == title)
    }
}

impl fmt::Display for DiagnosticReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", RULE)?;
        writeln!(f, "{} DIAGNOSTICS ({} entries)", self.title.to_uppercase(), self.entries)?;
        writeln!(f, "{}", RULE)?;

        for section in &self.sections {
            writeln!(f)?;
            writeln!(f, "{}", section.title)?;
            if section.rows.is_empty() {
                writeln!(f, "  (no data)")?;
                continue;
            }
            let width = section.rows.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
            for (label, value) in &section.rows {
                writeln!(f, "  {:<width$}  {}", label, value, width = width)?;
            }
        }
        write!(f, "{}", RULE)
    }
}

// ============================================================================
// Summaries
// ============================================================================

/// Occurrences of each integer value in a column, ascending by value.
/// Non-integer cells are skipped.
pub fn int_distribution(table: &Table, column: &str) -> Result<Vec<(i64, usize)>, GoError> {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for value in table.values(column)? {
        if let Some(i) = value.as_i64() {
            *counts.entry(i).or_default() += 1;
        }
    }
    Ok(counts.into_iter().collect())
}

/// Occurrences of each distinct value in a column, most frequent first
/// (ties in label order). Nulls are counted under `null`.
pub fn value_frequencies(table: &Table, column: &str) -> Result<Vec<(String, usize)>, GoError> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for value in table.values(column)? {
        *counts.entry(value.to_string()).or_default() += 1;
    }
    let mut frequencies: Vec<(String, usize)> = counts.into_iter().collect();
    frequencies.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(frequencies)
}

/// Rows with each bit set in a bit-decimal flag column. `labels[0]` names
/// the most significant bit, matching the left-most digit of the binary
/// flag.
pub fn bit_frequencies(
    table: &Table,
    column: &str,
    labels: &[&str],
) -> Result<Vec<(String, usize)>, GoError> {
    let mut counts = vec![0usize; labels.len()];
    for value in table.values(column)? {
        let Some(bits) = value.as_i64() else { continue };
        for (i, count) in counts.iter_mut().enumerate() {
            let shift = labels.len() - 1 - i;
            if (bits >> shift) & 1 == 1 {
                *count += 1;
            }
        }
    }
    Ok(labels.iter().map(|l| l.to_string()).zip(counts).collect())
}

/// Sum of each numeric column.
pub fn column_totals(table: &Table, columns: &[&str]) -> Result<Vec<(String, i64)>, GoError> {
    columns
        .iter()
        .map(|column| -> Result<(String, i64), GoError> {
            let total = table.values(column)?.iter().filter_map(Value::as_i64).sum();
            Ok((column.to_string(), total))
        })
        .collect()
}

/// Histogram of scores in [0, 1] using `bins` equal-width bins. A score of
/// exactly 1 falls in the last bin; cells outside the range are skipped.
pub fn completeness_histogram(
    table: &Table,
    column: &str,
    bins: usize,
) -> Result<Vec<(String, usize)>, GoError> {
    let bins = bins.max(1);
    let mut counts = vec![0usize; bins];
    for value in table.values(column)? {
        let Some(score) = value.as_f64() else { continue };
        if !(0.0..=1.0).contains(&score) {
            continue;
        }
        let bin = ((score * bins as f64).floor() as usize).min(bins - 1);
        counts[bin] += 1;
    }

    let step = 1.0 / bins as f64;
    Ok(counts
        .into_iter()
        .enumerate()
        .map(|(i, n)| {
            let low = i as f64 * step;
            (format!("{:.2}-{:.2}", low, low + step), n)
        })
        .collect())
}

// ============================================================================
// Tests
// ============================================================================
