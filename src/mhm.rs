/// Mosquito Habitat Mapper cleanup, flagging and QA filtering.
///
/// ## Larvae counts
///
/// The raw larvae count is free text. `larvae_to_num` turns it into an
/// integer and records what was lost along the way:
///
/// - plain numbers are kept
/// - counts above 100 become 101, and `LarvaeCountMagnitude` holds how many
///   orders of magnitude past 100 the reported value was (capped at 4)
/// - ranges such as `25-50` keep their lower bound and set
///   `LarvaeCountIsRangeFlag`
/// - missing counts become -9999
///
/// Values too large to parse (`1e+27`) are first replaced by 100000, the
/// smallest value with the maximum magnitude.
///
/// ## Flags
///
/// `add_flags` adds genus, container and water-source bit flags, the photo
/// bit flags (`mhm_PhotoBitBinary` lists watersource, larvae and abdomen
/// photos in that order) and the two completeness scores.

use crate::cleanup::{self, abbreviate_column_prefix, cumulative_scores, values_or_nulls};
use crate::diagnostics::{self, DiagnosticReport, Section};
use crate::logging::{self, Source};
use crate::model::{GoError, NULL_SENTINEL, Protocol};
use crate::table::{Table, Value};

pub const GENUS_COLUMN: &str = "mhm_Genus";
pub const WATERSOURCE_COLUMN: &str = "mhm_WaterSource";
pub const LARVAE_COUNT_COLUMN: &str = "mhm_LarvaeCount";
pub const WATERSOURCE_PHOTOS_COLUMN: &str = "mhm_WaterSourcePhotoUrls";
pub const LARVAE_PHOTOS_COLUMN: &str = "mhm_LarvaFullBodyPhotoUrls";
pub const ABDOMEN_PHOTOS_COLUMN: &str = "mhm_AbdomenCloseupPhotoUrls";

/// Genera that transmit disease.
pub const GENERA_OF_INTEREST: &[&str] = &["Aedes", "Anopheles", "Culex"];

/// Water sources containing any of these words are not containers.
const NON_CONTAINER_KEYWORDS: &[&str] = &[
    "puddle",
    "still water",
    "stream",
    "estuary",
    "lake",
    "pond",
    "ditch",
    "bay",
    "ocean",
    "swamp",
    "wetland",
];

const MAX_LARVAE_COUNT: f64 = 100.0;
const MAX_MAGNITUDE: i64 = 4;

// ---------------------------------------------------------------------------
// Cleanup
// ---------------------------------------------------------------------------

/// `mosquitohabitatmapperX` → `mhm_X`, `X` → `mhm_X`.
pub fn cleanup_column_prefix(table: &mut Table) {
    abbreviate_column_prefix(table, Protocol::MosquitoHabitatMapper);
}

/// `(count, magnitude, is_range)` for one larvae count cell.
fn larvae_entry_to_num(value: &Value) -> (i64, i64, i64) {
    let number = match value {
        Value::Null => return (NULL_SENTINEL, 0, 0),
        Value::Text(text) if text == "more than 100" => return (101, 1, 1),
        Value::Text(text) if text.contains("e+") => Some(100000.0),
        Value::Text(text) => text.trim().parse::<f64>().ok(),
        other => other.as_f64(),
    };

    match number {
        Some(n) if n == f64::INFINITY => (101, MAX_MAGNITUDE, 0),
        Some(n) if !n.is_finite() => unreadable_larvae(value),
        Some(n) if n > MAX_LARVAE_COUNT => {
            let magnitude = ((n / MAX_LARVAE_COUNT).log10().floor() as i64)
                .saturating_add(1)
                .min(MAX_MAGNITUDE);
            (101, magnitude, 0)
        }
        Some(n) => (n.trunc() as i64, 0, 0),
        None => {
            // Ranges like "25-50" keep their lower bound.
            let text = value.to_string();
            let lower = text.split('-').next().unwrap_or_default().trim();
            match lower.parse::<f64>() {
                Ok(n) if n.is_finite() => (n.trunc() as i64, 0, 1),
                _ => unreadable_larvae(value),
            }
        }
    }
}

fn unreadable_larvae(value: &Value) -> (i64, i64, i64) {
    logging::warn(
        Source::Cleanup,
        Some(LARVAE_COUNT_COLUMN),
        &format!("unreadable larvae count '{}', treated as missing", value),
    );
    (NULL_SENTINEL, 0, 0)
}

/// Converts the larvae count column to integers and adds the
/// `{prefix}LarvaeCountMagnitude` and `{prefix}LarvaeCountIsRangeFlag`
/// columns, where `prefix` is the lower-cased column name with
/// `larvaecount` removed (`mhm_LarvaeCount` → `mhm_`).
pub fn larvae_to_num(table: &mut Table, column: &str) -> Result<(), GoError> {
    let prefix = column.to_lowercase().replace("larvaecount", "");
    let converted: Vec<(i64, i64, i64)> =
        table.values(column)?.iter().map(larvae_entry_to_num).collect();

    let mut counts = Vec::with_capacity(converted.len());
    let mut magnitudes = Vec::with_capacity(converted.len());
    let mut ranges = Vec::with_capacity(converted.len());
    for (count, magnitude, is_range) in converted {
        counts.push(Value::Int(count));
        magnitudes.push(Value::Int(magnitude));
        ranges.push(Value::Int(is_range));
    }

    table.set_column(column, counts)?;
    table.set_column(format!("{}LarvaeCountMagnitude", prefix), magnitudes)?;
    table.set_column(format!("{}LarvaeCountIsRangeFlag", prefix), ranges)?;
    Ok(())
}

/// Full cleanup of raw Mosquito Habitat Mapper data from the API.
///
/// Removes homogeneous columns, renames the coordinate columns, shortens the
/// column prefix, converts larvae counts, rounds numeric columns and
/// standardizes null values. The input is left untouched.
pub fn apply_cleanup(raw: &Table) -> Result<Table, GoError> {
    let mut table = raw.clone();
    cleanup::remove_homogenous_cols(&mut table);
    cleanup::rename_latlon_cols(&mut table)?;
    cleanup_column_prefix(&mut table);
    if table.has_column(LARVAE_COUNT_COLUMN) {
        larvae_to_num(&mut table, LARVAE_COUNT_COLUMN)?;
    } else {
        logging::warn(
            Source::Cleanup,
            Some(LARVAE_COUNT_COLUMN),
            "column missing after cleanup, larvae counts not converted",
        );
    }
    cleanup::round_cols(&mut table);
    cleanup::standardize_null_vals(&mut table, &Value::Null);
    Ok(table)
}

// ---------------------------------------------------------------------------
// Flags
// ---------------------------------------------------------------------------

fn flag_column<F: Fn(&Value) -> bool>(
    table: &mut Table,
    source: &str,
    output: &str,
    flag: F,
) -> Result<(), GoError> {
    let flags = values_or_nulls(table, source)
        .iter()
        .map(|v| Value::Int(i64::from(flag(v))))
        .collect();
    table.set_column(output, flags)?;
    Ok(())
}

/// `mhm_HasGenus`: 1 when a genus was recorded.
pub fn has_genus_flag(table: &mut Table, genus_col: &str) -> Result<(), GoError> {
    flag_column(table, genus_col, "mhm_HasGenus", |v| !v.is_null())
}

/// `mhm_IsGenusOfInterest`: 1 for Aedes, Anopheles and Culex.
pub fn infectious_genus_flag(table: &mut Table, genus_col: &str) -> Result<(), GoError> {
    flag_column(table, genus_col, "mhm_IsGenusOfInterest", |v| {
        v.as_str().is_some_and(|genus| GENERA_OF_INTEREST.contains(&genus))
    })
}

/// Whether a water source description names a container (ovitrap, pot,
/// tire, ...) rather than open water.
pub fn is_container(watersource: &str) -> bool {
    let lowercase = watersource.to_lowercase();
    !NON_CONTAINER_KEYWORDS.iter().any(|keyword| lowercase.contains(keyword))
}

/// `mhm_IsWaterSourceContainer`: 1 when the water source is a container.
/// A missing water source is not a container.
pub fn is_container_flag(table: &mut Table, watersource_col: &str) -> Result<(), GoError> {
    flag_column(table, watersource_col, "mhm_IsWaterSourceContainer", |v| {
        !v.is_null() && is_container(&v.to_string())
    })
}

/// `mhm_HasWaterSource`: 1 when a water source was recorded.
pub fn has_watersource_flag(table: &mut Table, watersource_col: &str) -> Result<(), GoError> {
    flag_column(table, watersource_col, "mhm_HasWaterSource", |v| !v.is_null())
}

/// Photo flags over the watersource, larvae and abdomen photo columns:
///
/// - `mhm_PhotoCount`: number of photo URLs
/// - `mhm_RejectedCount` / `mhm_PendingCount`: rejected / pending photos
/// - `mhm_PhotoBitBinary`: one digit per column, `1` when it holds a URL
/// - `mhm_PhotoBitDecimal`: the binary string as a number
pub fn photo_bit_flags(
    table: &mut Table,
    watersource_photos: &str,
    larvae_photos: &str,
    abdomen_photos: &str,
) -> Result<(), GoError> {
    let sources = [
        values_or_nulls(table, watersource_photos),
        values_or_nulls(table, larvae_photos),
        values_or_nulls(table, abdomen_photos),
    ];

    let mut photo_counts = Vec::with_capacity(table.len());
    let mut rejected_counts = Vec::with_capacity(table.len());
    let mut pending_counts = Vec::with_capacity(table.len());
    let mut binaries = Vec::with_capacity(table.len());
    let mut decimals = Vec::with_capacity(table.len());

    for row in 0..table.len() {
        let mut photos = 0;
        let mut rejected = 0;
        let mut pending = 0;
        let mut mask = String::with_capacity(sources.len());

        for column in &sources {
            match &column[row] {
                Value::Null => mask.push('0'),
                cell => {
                    let urls = cell.to_string();
                    mask.push(if urls.contains("http") { '1' } else { '0' });
                    photos += urls.matches("http").count() as i64;
                    pending += urls.matches("pending").count() as i64;
                    rejected += urls.matches("rejected").count() as i64;
                }
            }
        }

        let decimal = i64::from_str_radix(&mask, 2).unwrap_or_default();
        photo_counts.push(Value::Int(photos));
        rejected_counts.push(Value::Int(rejected));
        pending_counts.push(Value::Int(pending));
        binaries.push(Value::Text(mask));
        decimals.push(Value::Int(decimal));
    }

    table.set_column("mhm_PhotoCount", photo_counts)?;
    table.set_column("mhm_RejectedCount", rejected_counts)?;
    table.set_column("mhm_PendingCount", pending_counts)?;
    table.set_column("mhm_PhotoBitBinary", binaries)?;
    table.set_column("mhm_PhotoBitDecimal", decimals)?;
    Ok(())
}

/// Completeness scores:
///
/// - `mhm_SubCompletenessScore`: share of genus, watersource photo, larvae
///   photo and abdomen photo that are present
/// - `mhm_CumulativeCompletenessScore`: share of non-null cells over all
///   columns, taken before either score column is added
///
/// Requires `mhm_HasGenus` and `mhm_PhotoBitDecimal`.
pub fn completion_score_flag(table: &mut Table) -> Result<(), GoError> {
    let cumulative = cumulative_scores(table);
    let sub: Vec<Value> = table
        .values("mhm_HasGenus")?
        .iter()
        .zip(table.values("mhm_PhotoBitDecimal")?)
        .map(|(genus, photos)| {
            let genus = genus.as_i64().unwrap_or_default();
            let photo_bits = i64::from(photos.as_i64().unwrap_or_default().count_ones());
            Value::float((genus + photo_bits) as f64 / 4.0)
        })
        .collect();

    table.set_column("mhm_SubCompletenessScore", sub)?;
    table.set_column("mhm_CumulativeCompletenessScore", cumulative)?;
    Ok(())
}

/// Adds every Mosquito Habitat Mapper flag to cleaned data.
pub fn add_flags(table: &mut Table) -> Result<(), GoError> {
    has_genus_flag(table, GENUS_COLUMN)?;
    infectious_genus_flag(table, GENUS_COLUMN)?;
    is_container_flag(table, WATERSOURCE_COLUMN)?;
    has_watersource_flag(table, WATERSOURCE_COLUMN)?;
    photo_bit_flags(
        table,
        WATERSOURCE_PHOTOS_COLUMN,
        LARVAE_PHOTOS_COLUMN,
        ABDOMEN_PHOTOS_COLUMN,
    )?;
    completion_score_flag(table)
}

// ---------------------------------------------------------------------------
// QA filtering
// ---------------------------------------------------------------------------

/// Quality filters for flagged data. The default keeps every row.
#[derive(Debug, Clone, Default)]
pub struct QaOptions {
    pub has_genus: bool,
    pub min_larvae_count: Option<i64>,
    pub has_photos: bool,
    pub is_container: bool,
}

/// Keeps the rows of cleaned and flagged data that pass every enabled check.
pub fn qa_filter(table: &Table, options: &QaOptions) -> Result<Table, GoError> {
    let mut mask = vec![true; table.len()];

    let mut require = |column: &str, check: &dyn Fn(i64) -> bool| -> Result<(), GoError> {
        for (keep, value) in mask.iter_mut().zip(table.values(column)?) {
            *keep &= value.as_i64().is_some_and(check);
        }
        Ok(())
    };

    if options.has_genus {
        require("mhm_HasGenus", &|v| v == 1)?;
    }
    if let Some(min) = options.min_larvae_count {
        require(LARVAE_COUNT_COLUMN, &|v| v >= min)?;
    }
    if options.has_photos {
        require("mhm_PhotoBitDecimal", &|v| v > 0)?;
    }
    if options.is_container {
        require("mhm_IsWaterSourceContainer", &|v| v == 1)?;
    }

    Ok(table.filter_rows(&mask))
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

/// Diagnostic summary of cleaned and flagged data: larvae count
/// distribution (-9999 marks a missing count), water sources, photo
/// subjects, entries with and without photos, and both completeness score
/// histograms.
pub fn diagnostics(table: &Table) -> Result<DiagnosticReport, GoError> {
    let mut report = DiagnosticReport::new("Mosquito Habitat Mapper", table.len());

    let larvae = diagnostics::int_distribution(table, LARVAE_COUNT_COLUMN)?;
    report.push(Section::counts(
        "Larvae Count Distribution",
        larvae.into_iter().map(|(count, n)| (count.to_string(), n)).collect(),
    ));

    if table.has_column(WATERSOURCE_COLUMN) {
        report.push(Section::counts(
            "Water Source Frequency",
            diagnostics::value_frequencies(table, WATERSOURCE_COLUMN)?,
        ));
    }

    report.push(Section::counts(
        "Photo Subjects",
        diagnostics::bit_frequencies(
            table,
            "mhm_PhotoBitDecimal",
            &["Watersource Photos", "Larvae Photos", "Abdomen Photos"],
        )?,
    ));

    let with_photos = table
        .values("mhm_PhotoBitDecimal")?
        .iter()
        .filter(|v| v.as_i64().is_some_and(|d| d > 0))
        .count();
    report.push(Section::counts(
        "Entries with Photos vs No Photos",
        vec![
            ("Valid Photos".to_string(), with_photos),
            ("No Photos".to_string(), table.len() - with_photos),
        ],
    ));

    report.push(Section::counts(
        "Cumulative Completeness",
        diagnostics::completeness_histogram(table, "mhm_CumulativeCompletenessScore", 10)?,
    ));
    report.push(Section::counts(
        "Sub Completeness",
        diagnostics::completeness_histogram(table, "mhm_SubCompletenessScore", 4)?,
    ));
    Ok(report)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

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
    fn test_larvae_to_num() {
        let mut table = Table::from_columns(vec![(
            "mhm_LarvaeCount",
            text_or_null(&[
                None,
                Some("more than 100"),
                Some("25-50"),
                Some("10"),
                Some("200"),
                Some("1000"),
                Some("10000"),
                Some("1e+27"),
            ]),
        )])
        .unwrap();

        larvae_to_num(&mut table, "mhm_LarvaeCount").unwrap();

        assert_eq!(ints(&table, "mhm_LarvaeCount"), vec![-9999, 101, 25, 10, 101, 101, 101, 101]);
        assert_eq!(ints(&table, "mhm_LarvaeCountMagnitude"), vec![0, 1, 0, 0, 1, 2, 3, 4]);
        assert_eq!(ints(&table, "mhm_LarvaeCountIsRangeFlag"), vec![0, 1, 1, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_larvae_to_num_accepts_numeric_cells() {
        let mut table =
            Table::from_columns(vec![("mhm_LarvaeCount", vec![Value::Int(7), Value::Float(350.0)])])
                .unwrap();
        larvae_to_num(&mut table, "mhm_LarvaeCount").unwrap();
        assert_eq!(ints(&table, "mhm_LarvaeCount"), vec![7, 101]);
        assert_eq!(ints(&table, "mhm_LarvaeCountMagnitude"), vec![0, 1]);
    }

    #[test]
    fn test_larvae_to_num_non_finite_text() {
        let mut table = Table::from_columns(vec![(
            "mhm_LarvaeCount",
            text_or_null(&[Some("1e999"), Some("inf"), Some("-inf"), Some("NaN"), Some("nan-5")]),
        )])
        .unwrap();

        larvae_to_num(&mut table, "mhm_LarvaeCount").unwrap();

        assert_eq!(ints(&table, "mhm_LarvaeCount"), vec![101, 101, -9999, -9999, -9999]);
        assert_eq!(ints(&table, "mhm_LarvaeCountMagnitude"), vec![4, 4, 0, 0, 0]);
        assert_eq!(ints(&table, "mhm_LarvaeCountIsRangeFlag"), vec![0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_larvae_to_num_nan_float_cell() {
        let mut table =
            Table::from_columns(vec![("mhm_LarvaeCount", vec![Value::Float(f64::NAN)])]).unwrap();
        larvae_to_num(&mut table, "mhm_LarvaeCount").unwrap();
        assert_eq!(ints(&table, "mhm_LarvaeCount"), vec![-9999]);

        let bogus_kept = qa_filter(
            &table,
            &QaOptions { min_larvae_count: Some(0), ..QaOptions::default() },
        )
        .unwrap();
        assert!(bogus_kept.is_empty());
    }

    #[test]
    fn test_has_flags() {
        let values = text_or_null(&[None, Some("pot"), Some("container"), Some("lake"), None]);
        let mut table = Table::from_columns(vec![("col_of_interest", values)]).unwrap();

        has_genus_flag(&mut table, "col_of_interest").unwrap();
        has_watersource_flag(&mut table, "col_of_interest").unwrap();

        assert_eq!(ints(&table, "mhm_HasGenus"), vec![0, 1, 1, 1, 0]);
        assert_eq!(ints(&table, "mhm_HasWaterSource"), vec![0, 1, 1, 1, 0]);
    }

    #[test]
    fn test_infectious_genus() {
        let genus = ["Aedes", "Anopheles", "test", "Culex", "test"];
        let mut table =
            Table::from_columns(vec![("genus", genus.iter().map(|g| Value::text(*g)).collect())])
                .unwrap();
        infectious_genus_flag(&mut table, "genus").unwrap();
        assert_eq!(ints(&table, "mhm_IsGenusOfInterest"), vec![1, 1, 0, 1, 0]);
    }

    #[test]
    fn test_is_container() {
        let sources = [
            "container",
            "pot",
            "lake",
            "swamp",
            "tire",
            "ovitrap",
            "pond or estuary",
            "test or ocean",
        ];
        let mut values: Vec<Value> = sources.iter().map(|s| Value::text(*s)).collect();
        values.push(Value::Null);
        let mut table = Table::from_columns(vec![("watersource", values)]).unwrap();

        is_container_flag(&mut table, "watersource").unwrap();
        assert_eq!(
            ints(&table, "mhm_IsWaterSourceContainer"),
            vec![1, 1, 0, 0, 1, 1, 0, 0, 0]
        );
    }

    #[test]
    fn test_photo_bit_flags() {
        let mut table = Table::from_columns(vec![
            (
                "abdomen",
                text_or_null(&[
                    Some("https://test;rejected;https://test"),
                    Some("pending;rejected"),
                    None,
                    Some("rejected"),
                    Some("pending"),
                ]),
            ),
            (
                "larvae",
                text_or_null(&[
                    Some("rejected"),
                    Some("https://test"),
                    Some("rejected;https://test"),
                    Some("https://test"),
                    Some("pending"),
                ]),
            ),
            (
                "watersource",
                text_or_null(&[
                    None,
                    Some("https://test;https://test;https://test"),
                    Some("pending;rejected;pending"),
                    Some("rejected;pending;rejected"),
                    None,
                ]),
            ),
        ])
        .unwrap();

        photo_bit_flags(&mut table, "watersource", "larvae", "abdomen").unwrap();

        assert_eq!(ints(&table, "mhm_PhotoCount"), vec![2, 4, 1, 1, 0]);
        assert_eq!(ints(&table, "mhm_RejectedCount"), vec![2, 1, 2, 3, 0]);
        assert_eq!(ints(&table, "mhm_PendingCount"), vec![0, 1, 2, 1, 2]);
        assert_eq!(
            table.values("mhm_PhotoBitBinary").unwrap(),
            &["001", "110", "010", "010", "000"].map(Value::text)
        );
        assert_eq!(ints(&table, "mhm_PhotoBitDecimal"), vec![1, 6, 2, 2, 0]);
    }

    #[test]
    fn test_completeness_scores() {
        let mut table = Table::from_columns(vec![
            (
                "abdomen",
                text_or_null(&[Some("https://test"), Some("pending"), None, Some("rejected"), Some("pending")]),
            ),
            (
                "larvae",
                text_or_null(&[
                    Some("rejected"),
                    Some("https://test"),
                    Some("rejected"),
                    Some("https://test"),
                    Some("pending"),
                ]),
            ),
            (
                "watersource",
                text_or_null(&[
                    None,
                    Some("https://test"),
                    Some("pending;rejected;pending"),
                    Some("rejected;pending;rejected"),
                    None,
                ]),
            ),
            ("genus", text_or_null(&[None, Some("test"), None, Some("test"), Some("test")])),
            ("filler", text_or_null(&[Some("test"), None, Some("test"), Some("test"), None])),
        ])
        .unwrap();

        has_genus_flag(&mut table, "genus").unwrap();
        photo_bit_flags(&mut table, "watersource", "larvae", "abdomen").unwrap();
        completion_score_flag(&mut table).unwrap();

        assert_eq!(floats(&table, "mhm_SubCompletenessScore"), vec![0.25, 0.75, 0.0, 0.5, 0.25]);
        assert_eq!(
            floats(&table, "mhm_CumulativeCompletenessScore"),
            vec![0.82, 0.91, 0.82, 1.0, 0.82]
        );
    }

    #[test]
    fn test_qa_filter_default_keeps_everything() {
        let table = Table::from_columns(vec![
            ("mhm_HasGenus", vec![Value::Int(1), Value::Int(0)]),
            ("mhm_LarvaeCount", vec![Value::Int(5), Value::Int(-9999)]),
            ("mhm_PhotoBitDecimal", vec![Value::Int(0), Value::Int(4)]),
            ("mhm_IsWaterSourceContainer", vec![Value::Int(1), Value::Int(0)]),
        ])
        .unwrap();

        assert_eq!(qa_filter(&table, &QaOptions::default()).unwrap().len(), 2);

        let genus = qa_filter(&table, &QaOptions { has_genus: true, ..Default::default() }).unwrap();
        assert_eq!(ints(&genus, "mhm_HasGenus"), vec![1]);

        let larvae =
            qa_filter(&table, &QaOptions { min_larvae_count: Some(1), ..Default::default() }).unwrap();
        assert_eq!(ints(&larvae, "mhm_LarvaeCount"), vec![5]);

        let photos = qa_filter(&table, &QaOptions { has_photos: true, ..Default::default() }).unwrap();
        assert_eq!(ints(&photos, "mhm_PhotoBitDecimal"), vec![4]);

        let both = QaOptions { has_genus: true, has_photos: true, ..Default::default() };
        assert!(qa_filter(&table, &both).unwrap().is_empty());
    }

    #[test]
    fn test_cleanup_column_prefix() {
        let mut table = Table::from_columns(vec![
            ("mosquitohabitatmapperGenus", vec![Value::Null]),
            ("siteId", vec![Value::Int(1)]),
        ])
        .unwrap();
        cleanup_column_prefix(&mut table);
        assert_eq!(table.column_names(), vec!["mhm_Genus", "mhm_siteId"]);
    }
}
