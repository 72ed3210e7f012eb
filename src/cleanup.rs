/// General cleanup procedures for raw GLOBE Observer data.
///
/// These steps are shared by the protocol pipelines in `mhm` and `lc`:
///
/// 1. Drop columns that hold a single value for every row
/// 2. Rename the GPS / MGRS coordinate columns so `Latitude` and `Longitude`
///    are the GPS readings
/// 3. Replace the verbose protocol prefix with a short abbreviation
/// 4. Round numeric columns (coordinates to 5 decimals, everything else to
///    integers with `-9999` for missing values)
/// 5. Standardize the many no-data spellings to a single null value

use chrono::Duration;

use crate::logging::{self, Source};
use crate::model::{GoError, NULL_SENTINEL, Protocol};
use crate::table::{Table, TableError, Value};

/// Text cells treated as missing data in raw API output.
const TEXT_NULLS: &[&str] = &["", "null", "NaN", "nan"];

/// Decimal places kept for latitude / longitude columns (about a meter).
const COORDINATE_DECIMALS: i32 = 5;

// ---------------------------------------------------------------------------
// Column removal and renaming
// ---------------------------------------------------------------------------

/// Drops every column whose cells all hold the same value. A column of only
/// nulls counts as homogeneous; an empty table drops nothing.
///
/// Returns the names of the dropped columns.
pub fn remove_homogenous_cols(table: &mut Table) -> Vec<String> {
    let homogeneous: Vec<(String, Value)> = table
        .columns()
        .iter()
        .filter_map(|column| {
            let first = column.values.first()?;
            column
                .values
                .iter()
                .all(|v| v == first)
                .then(|| (column.name.clone(), first.clone()))
        })
        .collect();

    let mut dropped = Vec::with_capacity(homogeneous.len());
    for (name, value) in homogeneous {
        logging::info(Source::Cleanup, Some(&name), &format!("Dropped: {}", value));
        table.drop_column(&name);
        dropped.push(name);
    }
    dropped
}

/// Renames every column to `{replacement}_{column}` after removing the
/// underscore-less protocol name from it, e.g. with `mhm`:
/// `mosquitohabitatmapperLarvaeCount` → `mhm_LarvaeCount`,
/// `siteId` → `mhm_siteId`.
pub fn replace_column_prefix(table: &mut Table, protocol: &str, replacement: &str) {
    let protocol = protocol.replace('_', "");
    table.rename_columns_with(|name| format!("{}_{}", replacement, name.replace(&protocol, "")));
}

/// Same as `replace_column_prefix` using the protocol's own names.
pub fn abbreviate_column_prefix(table: &mut Table, protocol: Protocol) {
    replace_column_prefix(table, protocol.api_name(), protocol.abbreviation());
}

/// First column whose name contains `keyword`.
pub fn find_column(table: &Table, keyword: &str) -> Option<String> {
    table
        .columns()
        .iter()
        .find(|c| c.name.contains(keyword))
        .map(|c| c.name.clone())
}

/// Renames the coordinate columns of raw data.
///
/// The API reports MGRS coordinates in `latitude` / `longitude` and GPS
/// coordinates in `*MeasurementLatitude` / `*MeasurementLongitude`. After
/// renaming, `Latitude` / `Longitude` are GPS and `MGRSLatitude` /
/// `MGRSLongitude` are MGRS.
pub fn rename_latlon_cols(table: &mut Table) -> Result<(), GoError> {
    let latitude = find_column(table, "MeasurementLatitude")
        .ok_or_else(|| TableError::MissingColumn("MeasurementLatitude".to_string()))?;
    let longitude = find_column(table, "MeasurementLongitude")
        .ok_or_else(|| TableError::MissingColumn("MeasurementLongitude".to_string()))?;

    table.rename_column("latitude", "MGRSLatitude");
    table.rename_column("longitude", "MGRSLongitude");
    table.rename_column(&latitude, "Latitude");
    table.rename_column(&longitude, "Longitude");
    Ok(())
}

// ---------------------------------------------------------------------------
// Value normalization
// ---------------------------------------------------------------------------

fn is_coordinate_column(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("latitude") || lower.contains("longitude")
}

/// A column is numeric when it holds at least one number and every non-null
/// cell is a number.
fn is_numeric_column(values: &[Value]) -> bool {
    values.iter().any(Value::is_numeric) && values.iter().all(|v| v.is_null() || v.is_numeric())
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Rounds numeric columns.
///
/// Missing values become `-9999`. Latitude / longitude columns are rounded
/// to 5 decimal places; every other numeric column is truncated to integers.
/// Non-numeric columns are left alone.
pub fn round_cols(table: &mut Table) {
    let numeric: Vec<String> = table
        .columns()
        .iter()
        .filter(|c| is_numeric_column(&c.values))
        .map(|c| c.name.clone())
        .collect();

    for name in numeric {
        let coordinate = is_coordinate_column(&name);
        if coordinate {
            logging::info(Source::Cleanup, Some(&name), "Rounded to 5 decimals");
        } else {
            logging::info(Source::Cleanup, Some(&name), "Converted to integer");
        }

        let Ok(values) = table.values_mut(&name) else {
            continue;
        };
        for value in values.iter_mut() {
            *value = match (value.as_f64(), coordinate) {
                (None, true) => Value::Float(NULL_SENTINEL as f64),
                (None, false) => Value::Int(NULL_SENTINEL),
                (Some(x), true) => Value::float(round_to(x, COORDINATE_DECIMALS)),
                (Some(_), false) => Value::Int(value.as_i64().unwrap_or(NULL_SENTINEL)),
            };
        }
    }
}

/// Replaces `Null` and the text no-data markers (`""`, `"null"`, `"NaN"`,
/// `"nan"`) with `null_val` in every column.
pub fn standardize_null_vals(table: &mut Table, null_val: &Value) {
    table.for_each_cell_mut(|_, value| {
        let is_null = match value {
            Value::Null => true,
            Value::Text(s) => TEXT_NULLS.contains(&s.as_str()),
            _ => false,
        };
        if is_null {
            *value = null_val.clone();
        }
    });
}

/// Converts text into camel case: for each delimiter in turn the text is
/// split, the first character of every piece upper-cased, and the pieces
/// joined back together.
pub fn camel_case(text: &str, delimiters: &[&str]) -> String {
    let mut result = text.to_string();
    for delimiter in delimiters {
        result = result
            .split(delimiter)
            .map(|piece| {
                let mut chars = piece.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            })
            .collect();
    }
    result
}

// ---------------------------------------------------------------------------
// Helpers for protocol flags
// ---------------------------------------------------------------------------

/// Cells of `column`, or all nulls when cleanup removed it (a column dropped
/// as homogeneous usually held no data).
pub fn values_or_nulls(table: &Table, column: &str) -> Vec<Value> {
    match table.values(column) {
        Ok(values) => values.to_vec(),
        Err(_) => {
            logging::warn(
                Source::Cleanup,
                Some(column),
                "column not present, flagging as if every value were missing",
            );
            vec![Value::Null; table.len()]
        }
    }
}

/// Share of non-null cells per row over all columns, rounded to 2 decimals.
pub fn cumulative_scores(table: &Table) -> Vec<Value> {
    let width = table.width().max(1) as f64;
    (0..table.len())
        .map(|row| {
            let share = table.non_null_count(row) as f64 / width;
            Value::float((share * 100.0).round() / 100.0)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Time zones
// ---------------------------------------------------------------------------

/// Hours between UTC and local solar time at a longitude.
pub fn solar_offset_hours(longitude: f64) -> i64 {
    (longitude / 15.0).round() as i64
}

/// Converts UTC date-times in `time_col` to local solar time using each
/// row's longitude. Rows with a missing time or an out-of-range longitude
/// are left unchanged.
pub fn adjust_timezones(
    table: &mut Table,
    time_col: &str,
    lat_col: &str,
    lon_col: &str,
) -> Result<(), GoError> {
    let latitudes = table.values(lat_col)?.to_vec();
    let longitudes = table.values(lon_col)?.to_vec();
    let times = table.values_mut(time_col)?;

    for ((time, lat), lon) in times.iter_mut().zip(&latitudes).zip(&longitudes) {
        let (Value::DateTime(dt), Some(lat), Some(lon)) = (&*time, lat.as_f64(), lon.as_f64())
        else {
            continue;
        };
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            continue;
        }
        let local = *dt + Duration::hours(solar_offset_hours(lon));
        *time = Value::DateTime(local);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
