/// Generic row filters for GLOBE Observer tables.
///
/// Every filter returns a new table and leaves its input untouched; callers
/// that want in-place behavior reassign the result.

use std::collections::HashMap;

use crate::model::GoError;
use crate::table::{Table, Value};

// ---------------------------------------------------------------------------
// Mask filtering
// ---------------------------------------------------------------------------

/// Keeps the rows where `mask` is `true` when `include`, or the rows where it
/// is `false` otherwise.
pub fn filter_out_entries(table: &Table, mask: &[bool], include: bool) -> Table {
    let keep: Vec<bool> = mask.iter().map(|m| *m == include).collect();
    table.filter_rows(&keep)
}

// ---------------------------------------------------------------------------
// Coordinates
// ---------------------------------------------------------------------------

/// Drops rows with impossible coordinates. Latitudes must lie in (-90, 90)
/// and longitudes in (-180, 180), or the closed intervals when `inclusive`.
/// Rows without numeric coordinates are dropped too.
pub fn filter_invalid_coords(
    table: &Table,
    latitude: &str,
    longitude: &str,
    inclusive: bool,
) -> Result<Table, GoError> {
    let in_range = |value: f64, limit: f64| {
        if inclusive {
            (-limit..=limit).contains(&value)
        } else {
            -limit < value && value < limit
        }
    };

    let mask: Vec<bool> = table
        .values(latitude)?
        .iter()
        .zip(table.values(longitude)?)
        .map(|(lat, lon)| match (lat.as_f64(), lon.as_f64()) {
            (Some(lat), Some(lon)) => in_range(lat, 90.0) && in_range(lon, 180.0),
            _ => false,
        })
        .collect();
    Ok(table.filter_rows(&mask))
}

/// Drops rows whose GPS coordinates are likely wrong: the GPS reading equals
/// the MGRS reading, or the GPS latitude or longitude is a whole number.
pub fn filter_poor_geolocational_data(
    table: &Table,
    latitude: &str,
    longitude: &str,
    mgrs_latitude: &str,
    mgrs_longitude: &str,
) -> Result<Table, GoError> {
    let lat = table.values(latitude)?;
    let lon = table.values(longitude)?;
    let mgrs_lat = table.values(mgrs_latitude)?;
    let mgrs_lon = table.values(mgrs_longitude)?;

    let is_whole = |v: &Value| v.as_f64().is_some_and(|x| x.fract() == 0.0);

    let mask: Vec<bool> = (0..table.len())
        .map(|i| {
            let same_as_mgrs = lat[i].as_f64() == mgrs_lat[i].as_f64()
                && lon[i].as_f64() == mgrs_lon[i].as_f64();
            !same_as_mgrs && !is_whole(&lat[i]) && !is_whole(&lon[i])
        })
        .collect();
    Ok(table.filter_rows(&mask))
}

// ---------------------------------------------------------------------------
// Duplicates
// ---------------------------------------------------------------------------

/// Removes groups of duplicate rows.
///
/// Rows that agree on every column in `columns` form a group. Rows with a
/// null in any of those columns never join a group. Groups with at least
/// `group_size` rows are removed; with `keep_first` the first row of each
/// such group is kept.
pub fn filter_duplicates(
    table: &Table,
    columns: &[&str],
    group_size: usize,
    keep_first: bool,
) -> Result<Table, GoError> {
    let key_columns = columns
        .iter()
        .map(|c| table.values(c))
        .collect::<Result<Vec<_>, _>>()?;

    let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
    for row in 0..table.len() {
        let key: Vec<&Value> = key_columns.iter().map(|values| &values[row]).collect();
        if key.iter().any(|v| v.is_null()) {
            continue;
        }
        groups.entry(format!("{:?}", key)).or_default().push(row);
    }

    let mut mask = vec![true; table.len()];
    for rows in groups.values().filter(|rows| rows.len() >= group_size) {
        let skip = usize::from(keep_first);
        for row in rows.iter().skip(skip) {
            mask[*row] = false;
        }
    }
    Ok(table.filter_rows(&mask))
}

// ---------------------------------------------------------------------------
// GLOBE teams
// ---------------------------------------------------------------------------

/// Team names held by a cell: a list of names, or text with names separated
/// by `;` or `,` (optionally wrapped like `['A', 'B']`). `None` for nulls.
pub fn team_names(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Null => None,
        Value::List(items) => Some(items.iter().map(|v| v.to_string()).collect()),
        Value::Text(text) => Some(
            text.trim_matches(|c| c == '[' || c == ']')
                .split([';', ','])
                .map(|name| name.trim().trim_matches(|c| c == '\'' || c == '"').to_string())
                .filter(|name| !name.is_empty())
                .collect(),
        ),
        other => Some(vec![other.to_string()]),
    }
}

/// Keeps rows whose team list contains any of `teams`, or with `exclude`
/// the rows containing none of them. Rows with a null team cell are always
/// dropped.
pub fn filter_by_globe_team(
    table: &Table,
    team_col: &str,
    teams: &[&str],
    exclude: bool,
) -> Result<Table, GoError> {
    let mask: Vec<bool> = table
        .values(team_col)?
        .iter()
        .map(|cell| match team_names(cell) {
            None => false,
            Some(names) => {
                let member = names.iter().any(|name| teams.contains(&name.as_str()));
                member != exclude
            }
        })
        .collect();
    Ok(table.filter_rows(&mask))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
