//! Data Source Verification Module
//!
//! Checks the live GLOBE API and the country-enriched ArcGIS layers with a
//! small sample request per protocol, and reports which sources respond with
//! the columns the cleanup code expects.
//!
//! Run this when downloads start failing, to tell an API outage from a
//! schema change.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::download::{self, DownloadRequest};
use crate::geoenrich;
use crate::model::{GoError, Protocol};

/// Days of data requested by a GLOBE API sample.
const SAMPLE_DAYS: i64 = 30;

// ============================================================================
// Verification Results
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    pub timestamp: String,
    pub globe_results: Vec<ProtocolVerification>,
    pub arcgis_results: Vec<ArcGisVerification>,
    pub summary: VerificationSummary,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerificationSummary {
    pub globe_total: usize,
    pub globe_working: usize,
    pub globe_failed: usize,
    pub arcgis_total: usize,
    pub arcgis_working: usize,
    pub arcgis_failed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolVerification {
    pub protocol: String,
    pub status: VerificationStatus,
    pub api_responsive: bool,
    pub sample_data_count: usize,
    pub columns_expected: Vec<String>,
    pub columns_missing: Vec<String>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArcGisVerification {
    pub protocol: String,
    pub item_id: String,
    pub status: VerificationStatus,
    pub service_url: Option<String>,
    pub sample_data_count: usize,
    pub has_country_column: bool,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum VerificationStatus {
    Success,
    PartialSuccess,
    Failed,
}

/// Raw API columns the cleanup of `protocol` relies on.
pub fn expected_columns(protocol: Protocol) -> Vec<String> {
    let prefix = protocol.column_prefix();
    let mut columns = vec![
        "siteId".to_string(),
        "latitude".to_string(),
        "longitude".to_string(),
        protocol.measured_at_column(),
    ];
    match protocol {
        Protocol::MosquitoHabitatMapper => {
            columns.push(format!("{}WaterSource", prefix));
            columns.push(format!("{}LarvaeCount", prefix));
            columns.push(format!("{}Genus", prefix));
        }
        Protocol::LandCovers => {
            for direction in ["North", "East", "South", "West"] {
                columns.push(format!("{}{}Classifications", prefix, direction));
            }
        }
        Protocol::SkyConditions | Protocol::TreeHeights => {}
    }
    columns
}

/// Success when there is data and nothing is missing, PartialSuccess when
/// the source responds but the sample is empty or incomplete.
pub fn status_for(responsive: bool, sample_count: usize, missing: &[String]) -> VerificationStatus {
    if !responsive {
        VerificationStatus::Failed
    } else if sample_count > 0 && missing.is_empty() {
        VerificationStatus::Success
    } else {
        VerificationStatus::PartialSuccess
    }
}

// ============================================================================
// GLOBE API Verification
// ============================================================================

pub fn verify_protocol(
    client: &reqwest::blocking::Client,
    config: &Config,
    protocol: Protocol,
) -> ProtocolVerification {
    let columns_expected = expected_columns(protocol);
    let mut result = ProtocolVerification {
        protocol: protocol.api_name().to_string(),
        status: VerificationStatus::Failed,
        api_responsive: false,
        sample_data_count: 0,
        columns_expected: columns_expected.clone(),
        columns_missing: Vec::new(),
        error_message: None,
    };

    let end = Utc::now().date_naive();
    let request = match DownloadRequest::new(protocol, config) {
        Ok(request) => request.with_dates(end - Duration::days(SAMPLE_DAYS), end),
        Err(e) => {
            result.error_message = Some(e.to_string());
            return result;
        }
    };

    match download::get_api_data(client, config, &request) {
        Ok(table) => {
            result.api_responsive = true;
            result.sample_data_count = table.len();
            result.columns_missing = columns_expected
                .into_iter()
                .filter(|column| !table.has_column(column))
                .collect();
        }
        Err(e) => {
            result.error_message = Some(format!("API request failed: {}", e));
        }
    }

    result.status = status_for(result.api_responsive, result.sample_data_count, &result.columns_missing);
    result
}

// ============================================================================
// ArcGIS Verification
// ============================================================================

fn sample_arcgis_layer(
    client: &reqwest::blocking::Client,
    config: &Config,
    item_id: &str,
    result: &mut ArcGisVerification,
) -> Result<(), GoError> {
    let service_url = geoenrich::resolve_service_url(client, config, item_id)?;
    let url = geoenrich::build_query_url(&service_url, 0, 1);
    result.service_url = Some(service_url);

    let response = client.get(&url).send()?;
    if !response.status().is_success() {
        return Err(GoError::HttpError(response.status().as_u16()));
    }
    let json: serde_json::Value = response.json()?;
    let page = geoenrich::parse_feature_page(&json)?;

    result.sample_data_count = page.records.len();
    result.has_country_column = page
        .records
        .first()
        .is_some_and(|record| record.contains_key(geoenrich::COUNTRY_COLUMN));
    Ok(())
}

pub fn verify_arcgis_layer(
    client: &reqwest::blocking::Client,
    config: &Config,
    protocol: Protocol,
) -> ArcGisVerification {
    let mut result = ArcGisVerification {
        protocol: protocol.api_name().to_string(),
        item_id: String::new(),
        status: VerificationStatus::Failed,
        service_url: None,
        sample_data_count: 0,
        has_country_column: false,
        error_message: None,
    };

    let item_id = match geoenrich::item_id(protocol) {
        Ok(id) => id,
        Err(e) => {
            result.error_message = Some(e.to_string());
            return result;
        }
    };
    result.item_id = item_id.to_string();

    let responsive = match sample_arcgis_layer(client, config, item_id, &mut result) {
        Ok(()) => true,
        Err(e) => {
            result.error_message = Some(format!("Layer query failed: {}", e));
            false
        }
    };

    let missing = if result.has_country_column {
        Vec::new()
    } else {
        vec![geoenrich::COUNTRY_COLUMN.to_string()]
    };
    result.status = status_for(responsive, result.sample_data_count, &missing);
    result
}

// ============================================================================
// Full Verification Runner
// ============================================================================

pub fn run_full_verification(config: &Config) -> Result<VerificationReport, GoError> {
    let client = download::build_client(config)?;

    let mut report = VerificationReport {
        timestamp: Utc::now().to_rfc3339(),
        globe_results: Vec::new(),
        arcgis_results: Vec::new(),
        summary: VerificationSummary::default(),
    };

    println!("🔍 Verifying GLOBE API protocols...");
    report.summary.globe_total = Protocol::ALL.len();

    for protocol in Protocol::ALL {
        print!("  {} ... ", protocol.api_name());
        let result = verify_protocol(&client, config, protocol);

        match result.status {
            VerificationStatus::Success => {
                println!("✓ OK ({} observations)", result.sample_data_count);
                report.summary.globe_working += 1;
            }
            VerificationStatus::PartialSuccess => {
                if result.sample_data_count == 0 {
                    println!("⚠ Responsive but no data in the last {} days", SAMPLE_DAYS);
                } else {
                    println!("⚠ Partial (missing: {:?})", result.columns_missing);
                }
                report.summary.globe_working += 1;
            }
            VerificationStatus::Failed => {
                println!("✗ FAILED: {}", result.error_message.as_deref().unwrap_or("Unknown"));
                report.summary.globe_failed += 1;
            }
        }

        report.globe_results.push(result);
    }

    println!("\n🔍 Verifying ArcGIS country layers...");
    let arcgis_protocols = [Protocol::MosquitoHabitatMapper, Protocol::LandCovers];
    report.summary.arcgis_total = arcgis_protocols.len();

    for protocol in arcgis_protocols {
        print!("  {} ... ", protocol.api_name());
        let result = verify_arcgis_layer(&client, config, protocol);

        match result.status {
            VerificationStatus::Success => {
                println!("✓ OK ({})", result.service_url.as_deref().unwrap_or("-"));
                report.summary.arcgis_working += 1;
            }
            VerificationStatus::PartialSuccess => {
                println!("⚠ Layer responds but has no {} data", geoenrich::COUNTRY_COLUMN);
                report.summary.arcgis_working += 1;
            }
            VerificationStatus::Failed => {
                println!("✗ FAILED: {}", result.error_message.as_deref().unwrap_or("Unknown"));
                report.summary.arcgis_failed += 1;
            }
        }

        report.arcgis_results.push(result);
    }

    Ok(report)
}

pub fn success_rate(summary: &VerificationSummary) -> f64 {
    let working = summary.globe_working + summary.arcgis_working;
    let total = summary.globe_total + summary.arcgis_total;
    if total > 0 {
        (working as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

pub fn print_summary(report: &VerificationReport) {
    let summary = &report.summary;
    println!("\n═══════════════════════════════════════════════════════════");
    println!("📊 VERIFICATION SUMMARY");
    println!("═══════════════════════════════════════════════════════════");
    println!();
    println!(
        "GLOBE Protocols:  {}/{} working  ({} failed)",
        summary.globe_working, summary.globe_total, summary.globe_failed
    );
    println!(
        "ArcGIS Layers:    {}/{} working  ({} failed)",
        summary.arcgis_working, summary.arcgis_total, summary.arcgis_failed
    );
    println!();
    println!(
        "Overall Success Rate: {:.1}% ({}/{})",
        success_rate(summary),
        summary.globe_working + summary.arcgis_working,
        summary.globe_total + summary.arcgis_total
    );
    println!("═══════════════════════════════════════════════════════════");
}
