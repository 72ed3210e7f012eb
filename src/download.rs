/// GLOBE API Data Client
///
/// Retrieves GLOBE Observer protocol measurements from the GLOBE
/// measurement search API and turns the JSON response into a `Table`.
///
/// API Documentation: https://www.globe.gov/globe-data/globe-api

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::config::Config;
use crate::logging::{self, Source};
use crate::model::{GoError, LatLonBox, Protocol};
use crate::table::{Table, Value};

// ============================================================================
// Request
// ============================================================================

/// Parameters of a single protocol download.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub protocol: Protocol,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub latlon_box: LatLonBox,
}

impl DownloadRequest {
    /// Whole-globe request from the configured default start date to today.
    pub fn new(protocol: Protocol, config: &Config) -> Result<Self, GoError> {
        Ok(DownloadRequest {
            protocol,
            start_date: parse_date(&config.download.default_start_date)?,
            end_date: Utc::now().date_naive(),
            latlon_box: LatLonBox::default(),
        })
    }

    pub fn with_dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    pub fn with_box(mut self, latlon_box: LatLonBox) -> Self {
        self.latlon_box = latlon_box;
        self
    }
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(text: &str) -> Result<NaiveDate, GoError> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .map_err(|_| GoError::InvalidDate(text.to_string()))
}

// ============================================================================
// URL Construction
// ============================================================================

/// Build the GLOBE API search URL.
///
/// A valid bounding box selects the lat/lon endpoint. An invalid box is
/// ignored with a warning and every observation for the protocol and date
/// range is requested instead.
pub fn build_api_url(
    base_url: &str,
    protocol: Protocol,
    start_date: NaiveDate,
    end_date: NaiveDate,
    latlon_box: &LatLonBox,
) -> String {
    let dates = format!(
        "protocols={}&startdate={}&enddate={}",
        protocol.api_name(),
        start_date.format("%Y-%m-%d"),
        end_date.format("%Y-%m-%d"),
    );

    if latlon_box.is_valid() {
        format!(
            "{}lat/lon/?{}&minlat={}&maxlat={}&minlon={}&maxlon={}&geojson=FALSE&sample=FALSE",
            base_url,
            dates,
            latlon_box.min_lat,
            latlon_box.max_lat,
            latlon_box.min_lon,
            latlon_box.max_lon,
        )
    } else {
        logging::warn(
            Source::GlobeApi,
            Some(protocol.api_name()),
            "You did not enter any valid/specific coordinates, so we gave you all the \
             observations for your protocol and date range.",
        );
        format!("{}?{}&geojson=FALSE&sample=FALSE", base_url, dates)
    }
}

// ============================================================================
// Response Parsing
// ============================================================================

/// Convert a GLOBE API response into a table.
///
/// Each entry of `results` becomes a row. The nested `data` object holds the
/// protocol-specific fields; they are flattened into columns placed after the
/// top-level fields, and the `data` column itself is dropped.
pub fn parse_api_data(response: &serde_json::Value) -> Result<Table, GoError> {
    let results = response
        .get("results")
        .and_then(|r| r.as_array())
        .ok_or(GoError::ApiDown)?;

    let mut top_level = Vec::with_capacity(results.len());
    let mut nested = Vec::with_capacity(results.len());
    for result in results {
        let mut record = result
            .as_object()
            .cloned()
            .ok_or_else(|| GoError::ParseError("result entry is not an object".to_string()))?;
        let data = match record.shift_remove("data") {
            Some(serde_json::Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        };
        top_level.push(record);
        nested.push(data);
    }

    let mut table = Table::from_json_records(&top_level);
    let data_table = Table::from_json_records(&nested);
    for column in data_table.columns() {
        if !table.has_column(&column.name) {
            table.set_column(column.name.clone(), column.values.clone())?;
        }
    }
    Ok(table)
}

// ============================================================================
// Date Conversion
// ============================================================================

/// Parse a GLOBE date or date-time string.
///
/// Accepts `YYYY-MM-DD HH:MM:SS`, ISO 8601 `YYYY-MM-DDTHH:MM:SS` (optionally
/// with fractional seconds or an RFC 3339 offset, converted to UTC) and plain
/// `YYYY-MM-DD` (midnight). Returns `None` for anything else.
pub fn convert_to_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

/// Convert one cell to a date-time. Integers are epoch milliseconds (the
/// representation ArcGIS uses for date fields).
pub fn value_to_datetime(value: &Value) -> Value {
    match value {
        Value::DateTime(_) => value.clone(),
        Value::Text(s) => convert_to_datetime(s).map(Value::DateTime).unwrap_or(Value::Null),
        Value::Int(ms) => DateTime::from_timestamp_millis(*ms)
            .map(|dt| Value::DateTime(dt.naive_utc()))
            .unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

/// Convert a single column to date-times. Missing columns are skipped.
pub fn convert_column_to_datetime(table: &mut Table, column: &str) {
    if let Ok(values) = table.values_mut(column) {
        for value in values.iter_mut() {
            *value = value_to_datetime(value);
        }
    }
}

/// Convert every column whose name contains `MeasuredAt` or `Date`.
pub fn convert_dates_to_datetime(table: &mut Table) {
    let date_columns: Vec<String> = table
        .column_names()
        .into_iter()
        .filter(|name| name.contains("MeasuredAt") || name.contains("Date"))
        .collect();
    for column in date_columns {
        convert_column_to_datetime(table, &column);
    }
}

// ============================================================================
// API Client Functions
// ============================================================================

/// Build the blocking HTTP client used for API requests.
pub fn build_client(config: &Config) -> Result<reqwest::blocking::Client, GoError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(config.api.timeout_secs))
        .build()?;
    Ok(client)
}

/// Download raw GLOBE Observer data for a protocol.
///
/// # Returns
/// A table of raw data with `measuredDate` and the protocol's measured-at
/// column converted to date-times.
pub fn get_api_data(
    client: &reqwest::blocking::Client,
    config: &Config,
    request: &DownloadRequest,
) -> Result<Table, GoError> {
    let url = build_api_url(
        &config.api.base_url,
        request.protocol,
        request.start_date,
        request.end_date,
        &request.latlon_box,
    );
    logging::debug(Source::GlobeApi, Some(request.protocol.api_name()), &url);

    let response = client
        .get(&url)
        .header("Accept", "application/json")
        .send()?;

    if !response.status().is_success() {
        return Err(GoError::HttpError(response.status().as_u16()));
    }

    let json: serde_json::Value = response.json()?;
    let mut table = parse_api_data(&json)?;

    if table.is_empty() {
        logging::warn(
            Source::GlobeApi,
            Some(request.protocol.api_name()),
            "API returned no observations for this request",
        );
    }

    convert_column_to_datetime(&mut table, "measuredDate");
    convert_column_to_datetime(&mut table, &request.protocol.measured_at_column());

    logging::info(
        Source::GlobeApi,
        Some(request.protocol.api_name()),
        &format!("downloaded {} observations", table.len()),
    );
    Ok(table)
}

// ============================================================================
// Tests
// ============================================================================
