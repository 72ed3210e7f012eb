/// Landcover cleanup, classification unpacking, flagging and QA filtering.
///
/// ## Unpacking classifications
///
/// Each cardinal direction stores its land cover classifications as one
/// `;`-separated string such as
/// `60% MUC 02 (b) [Trees, Closely Spaced, Deciduous - Broad Leaved]`.
/// `unpack_classifications` turns these into numeric columns:
///
/// 1. Collect the unique, camel-cased classification names per direction
/// 2. Add a `lc_{Direction}_{Name}` column initialized to 0.0 for each one,
///    so `round_cols` never sees missing values there
/// 3. Group every directional column alphabetically right after `lc_pid`
/// 4. Fill in each row's percentages
///
/// The original classification columns are kept.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::cleanup::{self, abbreviate_column_prefix, camel_case, cumulative_scores, values_or_nulls};
use crate::diagnostics::{self, DiagnosticReport, Section};
use crate::logging::{self, Source};
use crate::model::{GoError, Protocol};
use crate::table::{Table, Value};

/// Directional classification columns, in unpacking order.
pub const CLASSIFICATION_COLUMNS: [&str; 4] = [
    "lc_WestClassifications",
    "lc_EastClassifications",
    "lc_NorthClassifications",
    "lc_SouthClassifications",
];

/// Photo URL columns in bit-flag order (up, down, north, south, east, west).
pub const PHOTO_COLUMNS: [&str; 6] = [
    "lc_UpwardPhotoUrl",
    "lc_DownwardPhotoUrl",
    "lc_NorthPhotoUrl",
    "lc_SouthPhotoUrl",
    "lc_EastPhotoUrl",
    "lc_WestPhotoUrl",
];

/// Column the directional columns are grouped after.
pub const PID_COLUMN: &str = "lc_pid";

const DIRECTION_KEYWORDS: [&str; 6] = ["downward", "upward", "west", "east", "north", "south"];

/// Delimiters removed when camel-casing classification names.
const NAME_DELIMITERS: [&str; 4] = [" ", ",", "-", "/"];

pub const ALL_PHOTOS_DECIMAL: i64 = 0b111111;
pub const ALL_CLASSIFICATIONS_DECIMAL: i64 = 0b1111;

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(.*)\]").expect("classification name pattern"));

static PERCENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*)%").expect("classification percentage pattern"));

// ---------------------------------------------------------------------------
// Classification parsing
// ---------------------------------------------------------------------------

/// `land_coversX` / `landcoversX` → `lc_X`, `X` → `lc_X`.
pub fn cleanup_column_prefix(table: &mut Table) {
    abbreviate_column_prefix(table, Protocol::LandCovers);
}

/// Description of a single classification: the text between the first `[`
/// and the last `]`.
pub fn extract_classification_name(entry: &str) -> Option<String> {
    NAME_RE
        .captures(entry)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Percentage of a single classification: the number before the `%`.
pub fn extract_classification_percentage(entry: &str) -> Option<f64> {
    PERCENT_RE
        .captures(entry)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().trim().parse().ok())
}

/// Descriptions of every classification in a `;`-separated entry.
pub fn extract_classifications(info: &str) -> Vec<String> {
    info.split(';').filter_map(extract_classification_name).collect()
}

/// Percentages of every classification in a `;`-separated entry.
pub fn extract_percentages(info: &str) -> Vec<f64> {
    info.split(';').filter_map(extract_classification_percentage).collect()
}

/// `(description, percentage)` pairs of an entry, in order. Classifications
/// missing either part are skipped.
pub fn extract_classification_dict(info: &str) -> Vec<(String, f64)> {
    info.split(';')
        .filter_map(|entry| {
            Some((
                extract_classification_name(entry)?,
                extract_classification_percentage(entry)?,
            ))
        })
        .collect()
}

/// `lc_WestClassifications` → `lc_West_`
fn direction_prefix(classification_col: &str) -> String {
    classification_col.replace("Classifications", "_")
}

fn column_name_for(name: &str) -> String {
    camel_case(name, &NAME_DELIMITERS).trim().to_string()
}

fn is_direction_column(name: &str) -> bool {
    let lower = name.to_lowercase();
    DIRECTION_KEYWORDS.iter().any(|d| lower.contains(d))
}

/// Column order with `to_move` placed right after `anchor`.
fn order_after(names: &[String], to_move: &[String], anchor: &str) -> Option<Vec<String>> {
    let anchor_idx = names.iter().position(|n| n == anchor)?;
    let mut order: Vec<String> = names[..=anchor_idx]
        .iter()
        .filter(|n| !to_move.contains(n))
        .cloned()
        .collect();
    order.extend(to_move.iter().cloned());
    let placed = order.clone();
    order.extend(names.iter().filter(|n| !placed.contains(n)).cloned());
    Some(order)
}

/// Unpacks the directional classification strings of prefix-cleaned
/// landcover data into one percentage column per classification.
pub fn unpack_classifications(table: &Table) -> Result<Table, GoError> {
    let mut unpacked = table.clone();

    for classification_col in CLASSIFICATION_COLUMNS {
        let names: BTreeSet<String> = values_or_nulls(table, classification_col)
            .iter()
            .filter_map(Value::as_str)
            .flat_map(extract_classifications)
            .map(|name| column_name_for(&name))
            .collect();

        let prefix = direction_prefix(classification_col);
        for name in names {
            unpacked.set_column(format!("{}{}", prefix, name), vec![Value::Float(0.0); table.len()])?;
        }
    }

    let mut direction_cols: Vec<String> = unpacked
        .column_names()
        .into_iter()
        .filter(|name| is_direction_column(name))
        .collect();
    direction_cols.sort();
    match order_after(&unpacked.column_names(), &direction_cols, PID_COLUMN) {
        Some(order) => unpacked.reorder(&order)?,
        None => logging::debug(
            Source::Cleanup,
            Some(PID_COLUMN),
            "column missing, directional columns left in place",
        ),
    }

    for classification_col in CLASSIFICATION_COLUMNS {
        let prefix = direction_prefix(classification_col);
        let entries = values_or_nulls(table, classification_col);
        for (row, cell) in entries.iter().enumerate() {
            let Some(info) = cell.as_str() else { continue };
            for (name, percent) in extract_classification_dict(info) {
                let column = format!("{}{}", prefix, column_name_for(&name));
                unpacked.set_cell(row, &column, Value::Float(percent))?;
            }
        }
    }

    Ok(unpacked)
}

/// Full cleanup of raw Landcover data from the API.
///
/// Removes homogeneous columns, renames the coordinate columns, shortens the
/// column prefix, unpacks classifications, rounds numeric columns and
/// standardizes null values. The input is left untouched.
pub fn apply_cleanup(raw: &Table) -> Result<Table, GoError> {
    let mut table = raw.clone();
    cleanup::remove_homogenous_cols(&mut table);
    cleanup::rename_latlon_cols(&mut table)?;
    cleanup_column_prefix(&mut table);
    let mut table = unpack_classifications(&table)?;
    cleanup::round_cols(&mut table);
    cleanup::standardize_null_vals(&mut table, &Value::Null);
    Ok(table)
}

// ---------------------------------------------------------------------------
// Flags
// ---------------------------------------------------------------------------

/// Photo flags over the six directional photo columns:
///
/// - `lc_PhotoCount`: number of photo URLs
/// - `lc_RejectedCount` / `lc_PendingCount`: rejected / pending photos
/// - `lc_EmptyCount`: directions without any photo entry
/// - `lc_PhotoBitBinary`: one digit per direction (up, down, north, south,
///   east, west), `1` when it holds a URL
/// - `lc_PhotoBitDecimal`: the binary string as a number
pub fn photo_bit_flags(
    table: &mut Table,
    up: &str,
    down: &str,
    north: &str,
    south: &str,
    east: &str,
    west: &str,
) -> Result<(), GoError> {
    let sources: Vec<Vec<Value>> = [up, down, north, south, east, west]
        .iter()
        .map(|column| values_or_nulls(table, column))
        .collect();

    let rows = table.len();
    let mut photo_counts = Vec::with_capacity(rows);
    let mut rejected_counts = Vec::with_capacity(rows);
    let mut pending_counts = Vec::with_capacity(rows);
    let mut empty_counts = Vec::with_capacity(rows);
    let mut binaries = Vec::with_capacity(rows);
    let mut decimals = Vec::with_capacity(rows);

    for row in 0..rows {
        let (mut photos, mut rejected, mut pending, mut empty) = (0i64, 0i64, 0i64, 0i64);
        let mut mask = String::with_capacity(sources.len());

        for column in &sources {
            let cell = &column[row];
            if cell.is_null() {
                empty += 1;
                mask.push('0');
                continue;
            }
            let text = cell.to_string();
            if text.contains("http") {
                mask.push('1');
                photos += text.matches("http").count() as i64;
            } else {
                mask.push('0');
            }
            pending += text.matches("pending").count() as i64;
            rejected += text.matches("rejected").count() as i64;
        }

        let decimal = i64::from_str_radix(&mask, 2).unwrap_or_default();
        photo_counts.push(Value::Int(photos));
        rejected_counts.push(Value::Int(rejected));
        pending_counts.push(Value::Int(pending));
        empty_counts.push(Value::Int(empty));
        binaries.push(Value::Text(mask));
        decimals.push(Value::Int(decimal));
    }

    table.set_column("lc_PhotoCount", photo_counts)?;
    table.set_column("lc_RejectedCount", rejected_counts)?;
    table.set_column("lc_PendingCount", pending_counts)?;
    table.set_column("lc_EmptyCount", empty_counts)?;
    table.set_column("lc_PhotoBitBinary", binaries)?;
    table.set_column("lc_PhotoBitDecimal", decimals)?;
    Ok(())
}

/// Classification flags over the north, south, east and west
/// classification columns: `lc_ClassificationCount`,
/// `lc_ClassificationBitBinary` (one digit per direction in that order) and
/// `lc_ClassificationBitDecimal`.
pub fn classification_bit_flags(
    table: &mut Table,
    north: &str,
    south: &str,
    east: &str,
    west: &str,
) -> Result<(), GoError> {
    let sources: Vec<Vec<Value>> = [north, south, east, west]
        .iter()
        .map(|column| values_or_nulls(table, column))
        .collect();

    let rows = table.len();
    let mut counts = Vec::with_capacity(rows);
    let mut binaries = Vec::with_capacity(rows);
    let mut decimals = Vec::with_capacity(rows);

    for row in 0..rows {
        let mask: String = sources
            .iter()
            .map(|column| if column[row].is_null() { '0' } else { '1' })
            .collect();
        let count = mask.chars().filter(|c| *c == '1').count() as i64;
        counts.push(Value::Int(count));
        decimals.push(Value::Int(i64::from_str_radix(&mask, 2).unwrap_or_default()));
        binaries.push(Value::Text(mask));
    }

    table.set_column("lc_ClassificationCount", counts)?;
    table.set_column("lc_ClassificationBitBinary", binaries)?;
    table.set_column("lc_ClassificationBitDecimal", decimals)?;
    Ok(())
}

/// Completeness scores:
///
/// - `lc_SubCompletenessScore`: share of the 6 photo and 4 classification
///   bits that are set
/// - `lc_CumulativeCompletenessScore`: share of non-null cells over all
///   columns, taken before either score column is added
///
/// Requires `lc_PhotoBitDecimal` and `lc_ClassificationBitDecimal`.
pub fn completion_scores(table: &mut Table) -> Result<(), GoError> {
    let bits = (PHOTO_COLUMNS.len() + CLASSIFICATION_COLUMNS.len()) as f64;
    let cumulative = cumulative_scores(table);
    let sub: Vec<Value> = table
        .values("lc_PhotoBitDecimal")?
        .iter()
        .zip(table.values("lc_ClassificationBitDecimal")?)
        .map(|(photos, classifications)| {
            let set = photos.as_i64().unwrap_or_default().count_ones()
                + classifications.as_i64().unwrap_or_default().count_ones();
            Value::float(f64::from(set) / bits)
        })
        .collect();

    table.set_column("lc_SubCompletenessScore", sub)?;
    table.set_column("lc_CumulativeCompletenessScore", cumulative)?;
    Ok(())
}

/// Adds photo, classification and completeness flags to cleaned data.
pub fn add_flags(table: &mut Table) -> Result<(), GoError> {
    let [up, down, north, south, east, west] = PHOTO_COLUMNS;
    photo_bit_flags(table, up, down, north, south, east, west)?;
    classification_bit_flags(
        table,
        "lc_NorthClassifications",
        "lc_SouthClassifications",
        "lc_EastClassifications",
        "lc_WestClassifications",
    )?;
    completion_scores(table)
}

// ---------------------------------------------------------------------------
// QA filtering
// ---------------------------------------------------------------------------

/// Quality filters for flagged data. The default keeps every row.
#[derive(Debug, Clone, Default)]
pub struct QaOptions {
    pub has_classification: bool,
    pub has_photo: bool,
    pub has_all_classifications: bool,
    pub has_all_photos: bool,
}

/// Keeps the rows of cleaned and flagged data that pass every enabled check.
pub fn qa_filter(table: &Table, options: &QaOptions) -> Result<Table, GoError> {
    let mut mask = vec![true; table.len()];

    let checks: [(bool, &str, fn(i64) -> bool); 4] = [
        (options.has_classification, "lc_ClassificationBitDecimal", |d| d > 0),
        (options.has_photo, "lc_PhotoBitDecimal", |d| d > 0),
        (options.has_all_classifications, "lc_ClassificationBitDecimal", |d| {
            d == ALL_CLASSIFICATIONS_DECIMAL
        }),
        (options.has_all_photos, "lc_PhotoBitDecimal", |d| d == ALL_PHOTOS_DECIMAL),
    ];

    for (enabled, column, check) in checks {
        if !enabled {
            continue;
        }
        for (keep, value) in mask.iter_mut().zip(table.values(column)?) {
            *keep &= value.as_i64().is_some_and(check);
        }
    }

    Ok(table.filter_rows(&mask))
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

/// Diagnostic summary of cleaned and flagged data: valid photo counts,
/// photo and classification frequency per direction, photo status totals
/// and both completeness score histograms.
pub fn diagnostics(table: &Table) -> Result<DiagnosticReport, GoError> {
    let mut report = DiagnosticReport::new("Land Cover", table.len());

    let photo_counts = diagnostics::int_distribution(table, "lc_PhotoCount")?;
    report.push(Section::counts(
        "Valid Photo Count",
        photo_counts.into_iter().map(|(count, n)| (count.to_string(), n)).collect(),
    ));

    report.push(Section::counts(
        "Photo Direction Frequency",
        diagnostics::bit_frequencies(
            table,
            "lc_PhotoBitDecimal",
            &["Up", "Down", "North", "South", "East", "West"],
        )?,
    ));
    report.push(Section::counts(
        "Classification Direction Frequency",
        diagnostics::bit_frequencies(
            table,
            "lc_ClassificationBitDecimal",
            &["North", "South", "East", "West"],
        )?,
    ));

    let totals =
        diagnostics::column_totals(table, &["lc_PhotoCount", "lc_RejectedCount", "lc_EmptyCount"])?;
    report.push(
        totals
            .into_iter()
            .fold(Section::new("Photo Summary"), |section, (column, total)| {
                section.row(column, total)
            }),
    );

    report.push(Section::counts(
        "Cumulative Completeness",
        diagnostics::completeness_histogram(table, "lc_CumulativeCompletenessScore", 10)?,
    ));
    report.push(Section::counts(
        "Sub Completeness",
        diagnostics::completeness_histogram(table, "lc_SubCompletenessScore", 10)?,
    ));
    Ok(report)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_CLASSIFICATION: &str =
        "60% MUC 02 (b) [Trees, Closely Spaced, Deciduous - Broad Leaved]";

    fn text_or_null(items: &[Option<&str>]) -> Vec<Value> {
        items.iter().map(|i| Value::from(*i)).collect()
    }

    fn ints(table: &Table, column: &str) -> Vec<i64> {
        table.values(column).unwrap().iter().map(|v| v.as_i64().unwrap()).collect()
    }

    fn floats(table: &Table, column: &str) -> Vec<f64> {
        table.values(column).unwrap().iter().map(|v| v.as_f64().unwrap()).collect()
    }

    #[test]
    fn test_classification_extraction() {
        assert_eq!(
            extract_classification_name(TEST_CLASSIFICATION).as_deref(),
            Some("Trees, Closely Spaced, Deciduous - Broad Leaved")
        );
        assert_eq!(extract_classification_percentage(TEST_CLASSIFICATION), Some(60.0));
        assert_eq!(extract_classification_name("no brackets"), None);
    }

    #[test]
    fn test_extract_multiple_classifications() {
        let info = "60% MUC 02 (b) [Category one]; 50% MUC 05 (b) [Category two]";
        assert_eq!(extract_classifications(info), vec!["Category one", "Category two"]);
        assert_eq!(extract_percentages(info), vec![60.0, 50.0]);
        assert_eq!(
            extract_classification_dict(info),
            vec![("Category one".to_string(), 60.0), ("Category two".to_string(), 50.0)]
        );
    }

    #[test]
    fn test_camel_cased_column_names() {
        assert_eq!(
            column_name_for("Trees, Closely Spaced, Deciduous - Broad Leaved"),
            "TreesCloselySpacedDeciduousBroadLeaved"
        );
    }

    #[test]
    fn test_unpack_classifications() {
        let sample = "60% MUC 02 (b) [Category one]; 50% MUC 05 (b) [Category two]";
        let mut columns: Vec<(&str, Vec<Value>)> = CLASSIFICATION_COLUMNS
            .iter()
            .map(|c| (*c, vec![Value::text(sample), Value::Null]))
            .collect();
        columns.insert(0, ("lc_siteId", vec![Value::Int(7), Value::Int(8)]));
        columns.insert(1, ("lc_pid", vec![Value::Int(0), Value::Int(1)]));
        let table = Table::from_columns(columns).unwrap();

        let unpacked = unpack_classifications(&table).unwrap();
        for classification in CLASSIFICATION_COLUMNS {
            let prefix = direction_prefix(classification);
            let one = format!("{}CategoryOne", prefix);
            let two = format!("{}CategoryTwo", prefix);
            assert_eq!(unpacked.cell(0, &one), Some(&Value::Float(60.0)));
            assert_eq!(unpacked.cell(0, &two), Some(&Value::Float(50.0)));
            assert_eq!(unpacked.cell(1, &one), Some(&Value::Float(0.0)));
        }

        let names = unpacked.column_names();
        assert_eq!(names[0], "lc_siteId");
        assert_eq!(names[1], "lc_pid");
        assert_eq!(names[2], "lc_EastClassifications");
        assert_eq!(names[3], "lc_East_CategoryOne");
        assert!(unpacked.has_column("lc_WestClassifications"));
        assert_eq!(unpacked.width(), 2 + 4 + 8);
    }

    #[test]
    fn test_photo_bit_flags() {
        let mut table = Table::from_columns(vec![
            (
                "up",
                text_or_null(&[Some("https://test"), Some("pending"), None, Some("rejected"), Some("pending")]),
            ),
            (
                "down",
                text_or_null(&[
                    Some("rejected"),
                    Some("https://test"),
                    Some("rejected"),
                    Some("https://test"),
                    Some("pending"),
                ]),
            ),
            (
                "north",
                text_or_null(&[None, Some("https://test"), Some("pending"), Some("rejected"), None]),
            ),
            (
                "east",
                text_or_null(&[Some("https://test"), None, Some("pending"), Some("rejected"), Some("pending")]),
            ),
            (
                "south",
                text_or_null(&[
                    None,
                    Some("https://test"),
                    Some("rejected"),
                    Some("pending"),
                    Some("https://test"),
                ]),
            ),
            (
                "west",
                text_or_null(&[
                    Some("https://test"),
                    Some("https://test"),
                    Some("pending"),
                    Some("rejected"),
                    None,
                ]),
            ),
        ])
        .unwrap();

        photo_bit_flags(&mut table, "up", "down", "north", "south", "east", "west").unwrap();

        assert_eq!(ints(&table, "lc_PhotoCount"), vec![3, 4, 0, 1, 1]);
        assert_eq!(ints(&table, "lc_RejectedCount"), vec![1, 0, 2, 4, 0]);
        assert_eq!(ints(&table, "lc_PendingCount"), vec![0, 1, 3, 1, 3]);
        assert_eq!(ints(&table, "lc_EmptyCount"), vec![2, 1, 1, 0, 2]);
        assert_eq!(
            table.values("lc_PhotoBitBinary").unwrap(),
            &["100011", "011101", "000000", "010000", "000100"].map(Value::text)
        );
        assert_eq!(ints(&table, "lc_PhotoBitDecimal"), vec![35, 29, 0, 16, 4]);
    }

    #[test]
    fn test_classification_bit_flags() {
        let mut table = Table::from_columns(vec![
            ("north", text_or_null(&[Some("test"), None, Some("test"), None])),
            ("east", text_or_null(&[None, None, Some("test"), Some("test")])),
            ("south", text_or_null(&[None, Some("test"), Some("test"), None])),
            ("west", text_or_null(&[Some("test"), None, Some("test"), None])),
        ])
        .unwrap();

        classification_bit_flags(&mut table, "north", "south", "east", "west").unwrap();

        assert_eq!(ints(&table, "lc_ClassificationCount"), vec![2, 1, 4, 1]);
        assert_eq!(
            table.values("lc_ClassificationBitBinary").unwrap(),
            &["1001", "0100", "1111", "0010"].map(Value::text)
        );
        assert_eq!(ints(&table, "lc_ClassificationBitDecimal"), vec![9, 4, 15, 2]);
    }

    #[test]
    fn test_completion_scores() {
        let mut table = Table::from_columns(vec![
            ("up", text_or_null(&[Some("https://test"), Some("pending"), None, Some("rejected")])),
            (
                "down",
                text_or_null(&[Some("rejected"), Some("https://test"), Some("rejected"), Some("https://test")]),
            ),
            ("north", text_or_null(&[None, Some("https://test"), Some("pending"), Some("rejected")])),
            ("east", text_or_null(&[Some("https://test"), None, Some("pending"), Some("rejected")])),
            ("south", text_or_null(&[None, Some("https://test"), Some("rejected"), Some("pending")])),
            (
                "west",
                text_or_null(&[Some("https://test"), Some("https://test"), Some("pending"), Some("rejected")]),
            ),
            ("north_classification", text_or_null(&[Some("test"), None, Some("test"), None])),
            ("east_classification", text_or_null(&[None, None, Some("test"), Some("test")])),
            ("south_classification", text_or_null(&[None, Some("test"), Some("test"), None])),
            ("west_classification", text_or_null(&[Some("test"), None, Some("test"), None])),
            ("extra", text_or_null(&[Some("a"), None, Some("b"), None])),
        ])
        .unwrap();

        photo_bit_flags(&mut table, "up", "down", "north", "south", "east", "west").unwrap();
        classification_bit_flags(
            &mut table,
            "north_classification",
            "south_classification",
            "east_classification",
            "west_classification",
        )
        .unwrap();
        completion_scores(&mut table).unwrap();

        assert_eq!(floats(&table, "lc_SubCompletenessScore"), vec![0.5, 0.5, 0.4, 0.2]);
        assert_eq!(floats(&table, "lc_CumulativeCompletenessScore"), vec![0.8, 0.75, 0.95, 0.8]);
    }

    #[test]
    fn test_qa_filter() {
        let table = Table::from_columns(vec![
            ("lc_PhotoBitDecimal", vec![Value::Int(63), Value::Int(4), Value::Int(0)]),
            ("lc_ClassificationBitDecimal", vec![Value::Int(15), Value::Int(0), Value::Int(9)]),
        ])
        .unwrap();

        assert_eq!(qa_filter(&table, &QaOptions::default()).unwrap().len(), 3);

        let photo = qa_filter(&table, &QaOptions { has_photo: true, ..Default::default() }).unwrap();
        assert_eq!(ints(&photo, "lc_PhotoBitDecimal"), vec![63, 4]);

        let classified =
            qa_filter(&table, &QaOptions { has_classification: true, ..Default::default() }).unwrap();
        assert_eq!(classified.len(), 2);

        let complete = QaOptions {
            has_all_photos: true,
            has_all_classifications: true,
            ..Default::default()
        };
        assert_eq!(qa_filter(&table, &complete).unwrap().len(), 1);
    }
}
