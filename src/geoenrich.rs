/// Country-enriched GLOBE Observer data from ArcGIS
///
/// The GLOBE program publishes Mosquito Habitat Mapper and Landcover
/// observations as public ArcGIS feature layers with a `COUNTRY` attribute.
/// The layers are refreshed daily, so the newest observations may lag the
/// GLOBE API.
///
/// Flow: portal item → feature service URL → paged layer-0 queries.

use chrono::{Duration, NaiveTime};

use crate::config::Config;
use crate::download::{DownloadRequest, convert_dates_to_datetime};
use crate::logging::{self, Source};
use crate::model::{GoError, LatLonBox, Protocol};
use crate::regions;
use crate::table::{Table, Value};

/// Column holding the country name in the enriched layers.
pub const COUNTRY_COLUMN: &str = "COUNTRY";

// ============================================================================
// Items and URLs
// ============================================================================

/// ArcGIS portal item holding the country-enriched layer of a protocol.
pub fn item_id(protocol: Protocol) -> Result<&'static str, GoError> {
    match protocol {
        Protocol::MosquitoHabitatMapper => Ok("02e3c448f42e4c35a2dd0c6cbbf42d85"),
        Protocol::LandCovers => Ok("c68acbfc68db4409b495fd4636646aa6"),
        other => Err(GoError::InvalidProtocol(other.api_name().to_string())),
    }
}

pub fn build_item_url(portal_url: &str, item_id: &str) -> String {
    format!("{}/content/items/{}?f=json", portal_url.trim_end_matches('/'), item_id)
}

/// Query for one page of every feature of layer 0 of a feature service.
pub fn build_query_url(service_url: &str, offset: usize, page_size: usize) -> String {
    format!(
        "{}/0/query?where=1%3D1&outFields=*&returnGeometry=false&resultOffset={}&resultRecordCount={}&f=json",
        service_url.trim_end_matches('/'),
        offset,
        page_size,
    )
}

// ============================================================================
// Response Parsing
// ============================================================================

fn arcgis_error(json: &serde_json::Value) -> Option<GoError> {
    let error = json.get("error")?;
    let message = error
        .get("message")
        .and_then(|m| m.as_str())
        .unwrap_or("unknown ArcGIS error");
    Some(GoError::ParseError(format!("ArcGIS error: {}", message)))
}

/// Feature service URL of a portal item response.
pub fn parse_item_url(json: &serde_json::Value) -> Result<String, GoError> {
    if let Some(err) = arcgis_error(json) {
        return Err(err);
    }
    json.get("url")
        .and_then(|u| u.as_str())
        .map(str::to_string)
        .ok_or_else(|| GoError::ParseError("ArcGIS item has no service url".to_string()))
}

/// One page of features: the attribute records, and whether more pages
/// follow.
pub struct FeaturePage {
    pub records: Vec<serde_json::Map<String, serde_json::Value>>,
    pub exceeded_transfer_limit: bool,
}

pub fn parse_feature_page(json: &serde_json::Value) -> Result<FeaturePage, GoError> {
    if let Some(err) = arcgis_error(json) {
        return Err(err);
    }
    let features = json
        .get("features")
        .and_then(|f| f.as_array())
        .ok_or_else(|| GoError::ParseError("ArcGIS query response has no features".to_string()))?;

    let records = features
        .iter()
        .filter_map(|feature| feature.get("attributes").and_then(|a| a.as_object()).cloned())
        .collect();

    Ok(FeaturePage {
        records,
        exceeded_transfer_limit: json
            .get("exceededTransferLimit")
            .and_then(|e| e.as_bool())
            .unwrap_or(false),
    })
}

// ============================================================================
// Offline Filters
// ============================================================================

/// Keeps rows whose `column` date-time lies between the start of
/// `start_date` and the end of `end_date`.
pub fn filter_by_dates(
    table: &Table,
    column: &str,
    start_date: chrono::NaiveDate,
    end_date: chrono::NaiveDate,
) -> Result<Table, GoError> {
    let start = start_date.and_time(NaiveTime::MIN);
    let end = end_date.and_time(NaiveTime::MIN) + Duration::days(1);
    let mask: Vec<bool> = table
        .values(column)?
        .iter()
        .map(|v| matches!(v, Value::DateTime(dt) if *dt >= start && *dt < end))
        .collect();
    Ok(table.filter_rows(&mask))
}

/// Keeps rows whose `lat_col` / `lon_col` position lies inside the box.
/// An invalid box keeps everything.
pub fn filter_by_box(
    table: &Table,
    lat_col: &str,
    lon_col: &str,
    latlon_box: &LatLonBox,
) -> Result<Table, GoError> {
    if !latlon_box.is_valid() {
        return Ok(table.clone());
    }
    let mask: Vec<bool> = table
        .values(lat_col)?
        .iter()
        .zip(table.values(lon_col)?)
        .map(|(lat, lon)| match (lat.as_f64(), lon.as_f64()) {
            (Some(lat), Some(lon)) => latlon_box.contains(lat, lon),
            _ => false,
        })
        .collect();
    Ok(table.filter_rows(&mask))
}

/// Keeps rows whose `column` names one of `countries`.
pub fn filter_by_countries<S: AsRef<str>>(
    table: &Table,
    column: &str,
    countries: &[S],
) -> Result<Table, GoError> {
    let mask: Vec<bool> = table
        .values(column)?
        .iter()
        .map(|v| {
            v.as_str()
                .is_some_and(|country| countries.iter().any(|c| c.as_ref() == country))
        })
        .collect();
    Ok(table.filter_rows(&mask))
}

/// Countries selected directly plus every country of the selected regions.
/// Names are trimmed and blank names dropped. Empty when neither is given.
pub fn selected_countries(countries: &[String], region_names: &[String]) -> Result<Vec<String>, GoError> {
    let mut selected: Vec<String> = Vec::new();
    for country in countries.iter().map(|c| c.trim()).filter(|c| !c.is_empty()) {
        if !selected.iter().any(|c| c == country) {
            selected.push(country.to_string());
        }
    }
    let region_countries = regions::countries_in_regions(region_names).inspect_err(|_| {
        logging::warn(
            Source::ArcGis,
            None,
            &format!("known regions: {}", regions::all_region_names().join(", ")),
        );
    })?;
    for country in region_countries {
        if !selected.iter().any(|c| c == country) {
            selected.push(country.to_string());
        }
    }
    Ok(selected)
}

// ============================================================================
// API Client Functions
// ============================================================================

/// Resolve a portal item to its feature service URL.
pub fn resolve_service_url(
    client: &reqwest::blocking::Client,
    config: &Config,
    item_id: &str,
) -> Result<String, GoError> {
    let url = build_item_url(&config.arcgis.portal_url, item_id);
    let response = client.get(&url).send()?;
    if !response.status().is_success() {
        return Err(GoError::HttpError(response.status().as_u16()));
    }
    let json: serde_json::Value = response.json()?;
    parse_item_url(&json)
}

/// Fetch every feature of layer 0 of a feature service, page by page.
pub fn fetch_layer(
    client: &reqwest::blocking::Client,
    config: &Config,
    service_url: &str,
) -> Result<Table, GoError> {
    let page_size = config.arcgis.page_size;
    let mut records = Vec::new();

    loop {
        let url = build_query_url(service_url, records.len(), page_size);
        logging::debug(Source::ArcGis, None, &url);

        let response = client.get(&url).send()?;
        if !response.status().is_success() {
            return Err(GoError::HttpError(response.status().as_u16()));
        }
        let json: serde_json::Value = response.json()?;
        let page = parse_feature_page(&json)?;

        let received = page.records.len();
        records.extend(page.records);
        if !page.exceeded_transfer_limit || received == 0 {
            break;
        }
    }

    Ok(Table::from_json_records(&records))
}

/// Download country-enriched data for Mosquito Habitat Mapper or Landcover.
///
/// Rows are kept when their measured-at time falls within the requested
/// dates (the end date counts as a whole day), they lie in the requested
/// box (when valid), and, if any countries or regions are given, their
/// country is one of `countries` or belongs to one of `regions`.
pub fn get_country_api_data(
    client: &reqwest::blocking::Client,
    config: &Config,
    request: &DownloadRequest,
    countries: &[String],
    region_names: &[String],
) -> Result<Table, GoError> {
    let item = item_id(request.protocol)?;
    let selected = selected_countries(countries, region_names)?;

    let service_url = resolve_service_url(client, config, item)?;
    let mut table = fetch_layer(client, config, &service_url)?;
    logging::info(
        Source::ArcGis,
        Some(request.protocol.api_name()),
        &format!("fetched {} features", table.len()),
    );

    // Column names stay raw; mhm/lc cleanup renames them.
    convert_dates_to_datetime(&mut table);

    let measured_at = request.protocol.measured_at_column();
    let mut table = filter_by_dates(&table, &measured_at, request.start_date, request.end_date)?;
    if request.latlon_box.is_valid() {
        table = filter_by_box(&table, "latitude", "longitude", &request.latlon_box)?;
    }
    if !selected.is_empty() {
        table = filter_by_countries(&table, COUNTRY_COLUMN, &selected)?;
    }
    Ok(table)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::{convert_to_datetime, parse_date};

    #[test]
    fn test_item_ids() {
        assert_eq!(item_id(Protocol::MosquitoHabitatMapper).unwrap(), "02e3c448f42e4c35a2dd0c6cbbf42d85");
        assert_eq!(item_id(Protocol::LandCovers).unwrap(), "c68acbfc68db4409b495fd4636646aa6");
        assert!(matches!(item_id(Protocol::TreeHeights), Err(GoError::InvalidProtocol(_))));
    }

    #[test]
    fn test_query_url() {
        assert_eq!(
            build_query_url("https://services.arcgis.com/x/FeatureServer/", 2000, 1000),
            "https://services.arcgis.com/x/FeatureServer/0/query?where=1%3D1&outFields=*\
             &returnGeometry=false&resultOffset=2000&resultRecordCount=1000&f=json"
        );
    }

    #[test]
    fn test_parse_item_url_and_errors() {
        let ok: serde_json::Value =
            serde_json::from_str(r#"{"id": "abc", "url": "https://services.arcgis.com/x/FeatureServer"}"#)
                .unwrap();
        assert_eq!(parse_item_url(&ok).unwrap(), "https://services.arcgis.com/x/FeatureServer");

        let err: serde_json::Value =
            serde_json::from_str(r#"{"error": {"code": 400, "message": "Invalid URL"}}"#).unwrap();
        let message = parse_item_url(&err).unwrap_err().to_string();
        assert!(message.contains("Invalid URL"));
    }

    #[test]
    fn test_parse_feature_page() {
        let json: serde_json::Value = serde_json::from_str(
            r#"{"features": [{"attributes": {"COUNTRY": "Kenya", "siteId": 1}},
                             {"attributes": {"COUNTRY": "Peru", "siteId": 2}}],
                "exceededTransferLimit": true}"#,
        )
        .unwrap();
        let page = parse_feature_page(&json).unwrap();
        assert_eq!(page.records.len(), 2);
        assert!(page.exceeded_transfer_limit);
    }

    fn enriched() -> Table {
        let dt = |s: &str| Value::DateTime(convert_to_datetime(s).unwrap());
        Table::from_columns(vec![
            ("COUNTRY", vec![Value::text("Kenya"), Value::text("Canada"), Value::text("Peru")]),
            ("latitude", vec![Value::Float(-1.3), Value::Float(45.4), Value::Float(-12.0)]),
            ("longitude", vec![Value::Float(36.8), Value::Float(-75.7), Value::Float(-77.0)]),
            (
                "landcoversMeasuredAt",
                vec![dt("2021-01-05 17:42:00"), dt("2021-01-31 23:59:00"), dt("2021-02-01 00:00:00")],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_filter_by_dates_includes_whole_end_day() {
        let filtered = filter_by_dates(
            &enriched(),
            "landcoversMeasuredAt",
            parse_date("2021-01-05").unwrap(),
            parse_date("2021-01-31").unwrap(),
        )
        .unwrap();
        assert_eq!(
            filtered.values("COUNTRY").unwrap(),
            &[Value::text("Kenya"), Value::text("Canada")]
        );
    }

    #[test]
    fn test_filter_by_box() {
        let southern = LatLonBox { min_lat: -20.0, max_lat: 0.0, min_lon: -180.0, max_lon: 180.0 };
        assert_eq!(filter_by_box(&enriched(), "latitude", "longitude", &southern).unwrap().len(), 2);

        let invalid = LatLonBox { min_lat: 10.0, max_lat: 0.0, ..LatLonBox::default() };
        assert_eq!(filter_by_box(&enriched(), "latitude", "longitude", &invalid).unwrap().len(), 3);
    }

    #[test]
    fn test_countries_and_regions_are_combined() {
        let selected =
            selected_countries(&["Peru".to_string()], &["North America".to_string()]).unwrap();
        let filtered = filter_by_countries(&enriched(), COUNTRY_COLUMN, &selected).unwrap();
        assert_eq!(
            filtered.values("COUNTRY").unwrap(),
            &[Value::text("Canada"), Value::text("Peru")]
        );
        assert!(selected_countries(&[], &["Atlantis".to_string()]).is_err());
        assert!(selected_countries(&[], &[]).unwrap().is_empty());
    }

    #[test]
    fn test_country_and_region_names_are_trimmed() {
        // As split from `--countries "Kenya, Peru"`
        let countries = vec!["Kenya".to_string(), " Peru".to_string(), " ".to_string()];
        let selected = selected_countries(&countries, &[" North America ".to_string()]).unwrap();
        assert_eq!(&selected[..2], &["Kenya".to_string(), "Peru".to_string()]);
        assert!(selected.iter().all(|c| c.trim() == c && !c.is_empty()));

        let filtered = filter_by_countries(&enriched(), COUNTRY_COLUMN, &selected).unwrap();
        assert_eq!(filtered.len(), 3);
    }
}
