/// Photo downloads for cleaned Mosquito Habitat Mapper and Landcover data.
///
/// Photo URL cells hold one or more `;`-separated URLs (rejected or pending
/// photos hold a status word instead). Every URL becomes a `DownloadTarget`
/// whose file name encodes the protocol, photo type, date, site and GLOBE
/// photo id, so a directory of photos can be matched back to the CSV.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::Config;
use crate::download::value_to_datetime;
use crate::lc;
use crate::logging::{self, Source};
use crate::mhm;
use crate::model::GoError;
use crate::table::{Table, Value};

const BAD_CHARACTERS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

pub const MHM_DATE_COLUMN: &str = "mhm_MeasuredAt";
const MHM_FALLBACK_DATE_COLUMN: &str = "mhm_measuredDate";
pub const MHM_SITE_COLUMN: &str = "mhm_siteId";
pub const MHM_SPECIES_COLUMN: &str = "mhm_Species";
pub const LC_DATE_COLUMN: &str = "lc_MeasuredAt";
pub const LC_SITE_COLUMN: &str = "lc_siteId";

// ---------------------------------------------------------------------------
// Naming
// ---------------------------------------------------------------------------

/// Removes characters that are not allowed in file names.
pub fn remove_bad_characters(name: &str) -> String {
    name.chars().filter(|c| !BAD_CHARACTERS.contains(c)).collect()
}

/// GLOBE photo id: the last path segment of the URL made only of digits.
pub fn photo_id(url: &str) -> Option<String> {
    url.split(['/', '?', '#'])
        .filter(|segment| !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit()))
        .last()
        .map(str::to_string)
}

/// The URLs in a photo cell. Status words such as `rejected` are dropped.
pub fn photo_urls(cell: &Value) -> Vec<String> {
    if cell.is_null() {
        return Vec::new();
    }
    cell.to_string()
        .split(';')
        .map(str::trim)
        .filter(|token| token.contains("http"))
        .map(str::to_string)
        .collect()
}

/// `YYYY-MM-DD` of a date cell, `None` when it is not a date.
fn date_label(cell: &Value) -> String {
    match value_to_datetime(cell) {
        Value::DateTime(dt) => dt.format("%Y-%m-%d").to_string(),
        _ => "None".to_string(),
    }
}

fn label(cell: Option<&Value>) -> String {
    match cell {
        None | Some(Value::Null) => "None".to_string(),
        Some(value) => value.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Targets
// ---------------------------------------------------------------------------

/// One photo to fetch and where to put it.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadTarget {
    pub url: String,
    pub directory: PathBuf,
    pub filename: String,
}

impl DownloadTarget {
    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.filename)
    }
}

/// Mosquito Habitat Mapper photo types to download.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MhmPhotoSelection {
    pub watersource: bool,
    pub larvae: bool,
    pub abdomen: bool,
    /// Put the species (or genus) in file names.
    pub species: bool,
}

impl MhmPhotoSelection {
    /// Every photo type, without classifications in the names.
    pub fn all() -> Self {
        MhmPhotoSelection {
            watersource: true,
            larvae: true,
            abdomen: true,
            species: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.watersource || self.larvae || self.abdomen)
    }
}

/// Landcover photo directions to download.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LcPhotoSelection {
    pub up: bool,
    pub down: bool,
    pub north: bool,
    pub south: bool,
    pub east: bool,
    pub west: bool,
}

impl LcPhotoSelection {
    pub fn all() -> Self {
        LcPhotoSelection {
            up: true,
            down: true,
            north: true,
            south: true,
            east: true,
            west: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.up || self.down || self.north || self.south || self.east || self.west)
    }
}

/// Targets for the selected photo types of every MHM row.
///
/// Names follow
/// `mhm-{Watersource|Larvae|Abdomen}-{watersource}-{date}-{siteId}[-{classification}]-{photoId}.png`,
/// where the classification is the species, else the genus, else `None`.
pub fn get_mhm_download_targets(
    table: &Table,
    directory: &Path,
    selection: &MhmPhotoSelection,
) -> Vec<DownloadTarget> {
    let photo_types = [
        (selection.watersource, "Watersource", mhm::WATERSOURCE_PHOTOS_COLUMN),
        (selection.larvae, "Larvae", mhm::LARVAE_PHOTOS_COLUMN),
        (selection.abdomen, "Abdomen", mhm::ABDOMEN_PHOTOS_COLUMN),
    ];
    let date_column = if table.has_column(MHM_DATE_COLUMN) {
        MHM_DATE_COLUMN
    } else {
        MHM_FALLBACK_DATE_COLUMN
    };

    let mut targets = Vec::new();
    for row in 0..table.len() {
        let watersource = label(table.cell(row, mhm::WATERSOURCE_COLUMN));
        let date = table.cell(row, date_column).map(date_label).unwrap_or_else(|| "None".to_string());
        let site = label(table.cell(row, MHM_SITE_COLUMN));
        let classification = [MHM_SPECIES_COLUMN, mhm::GENUS_COLUMN]
            .iter()
            .filter_map(|column| table.cell(row, column))
            .find(|cell| !cell.is_null())
            .map(Value::to_string)
            .unwrap_or_else(|| "None".to_string());

        for (selected, photo_type, column) in photo_types {
            if !selected {
                continue;
            }
            let Some(cell) = table.cell(row, column) else { continue };
            for url in photo_urls(cell) {
                let id = photo_id(&url).unwrap_or_else(|| "None".to_string());
                let name = if selection.species {
                    format!("mhm-{}-{}-{}-{}-{}-{}.png", photo_type, watersource, date, site, classification, id)
                } else {
                    format!("mhm-{}-{}-{}-{}-{}.png", photo_type, watersource, date, site, id)
                };
                targets.push(DownloadTarget {
                    url,
                    directory: directory.to_path_buf(),
                    filename: remove_bad_characters(&name),
                });
            }
        }
    }
    targets
}

/// Targets for the selected directions of every LC row, named
/// `lc-{Up|Down|North|South|East|West}-{date}-{siteId}-{photoId}.png`.
pub fn get_lc_download_targets(
    table: &Table,
    directory: &Path,
    selection: &LcPhotoSelection,
) -> Vec<DownloadTarget> {
    let [up, down, north, south, east, west] = lc::PHOTO_COLUMNS;
    let directions = [
        (selection.up, "Up", up),
        (selection.down, "Down", down),
        (selection.north, "North", north),
        (selection.south, "South", south),
        (selection.east, "East", east),
        (selection.west, "West", west),
    ];

    let mut targets = Vec::new();
    for row in 0..table.len() {
        let date = table.cell(row, LC_DATE_COLUMN).map(date_label).unwrap_or_else(|| "None".to_string());
        let site = label(table.cell(row, LC_SITE_COLUMN));

        for (selected, direction, column) in directions {
            if !selected {
                continue;
            }
            let Some(cell) = table.cell(row, column) else { continue };
            for url in photo_urls(cell) {
                let id = photo_id(&url).unwrap_or_else(|| "None".to_string());
                let name = format!("lc-{}-{}-{}-{}.png", direction, date, site, id);
                targets.push(DownloadTarget {
                    url,
                    directory: directory.to_path_buf(),
                    filename: remove_bad_characters(&name),
                });
            }
        }
    }
    targets
}

// ---------------------------------------------------------------------------
// Downloading
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    pub total: usize,
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// HTTP client for photo downloads, with the photo timeout from `config`.
pub fn build_photo_client(config: &Config) -> Result<reqwest::blocking::Client, GoError> {
    Ok(reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(config.download.photo_timeout_secs))
        .build()?)
}

fn download_photo(client: &reqwest::blocking::Client, target: &DownloadTarget) -> Result<(), GoError> {
    let response = client.get(&target.url).send()?;
    if !response.status().is_success() {
        return Err(GoError::HttpError(response.status().as_u16()));
    }
    let bytes = response.bytes()?;
    fs::write(target.path(), &bytes)?;
    Ok(())
}

/// Download every target in order. Files that already exist are skipped;
/// a failed photo is logged and counted, and the run continues.
pub fn download_photos(
    client: &reqwest::blocking::Client,
    targets: &[DownloadTarget],
) -> Result<DownloadSummary, GoError> {
    let mut summary = DownloadSummary {
        total: targets.len(),
        ..DownloadSummary::default()
    };

    for target in targets {
        fs::create_dir_all(&target.directory)?;
        if target.path().exists() {
            logging::debug(Source::Photos, Some(&target.filename), "already downloaded");
            summary.skipped += 1;
            continue;
        }
        match download_photo(client, target) {
            Ok(()) => summary.downloaded += 1,
            Err(e) => {
                logging::log_photo_failure(&target.filename, &e);
                summary.failed += 1;
            }
        }
    }

    logging::log_download_summary(summary.total, summary.downloaded, summary.skipped, summary.failed);
    Ok(summary)
}

/// Download MHM photos for a cleaned table. An empty selection downloads
/// every photo type.
pub fn download_mhm_photos(
    client: &reqwest::blocking::Client,
    table: &Table,
    directory: &Path,
    selection: MhmPhotoSelection,
) -> Result<DownloadSummary, GoError> {
    let selection = if selection.is_empty() {
        MhmPhotoSelection { species: selection.species, ..MhmPhotoSelection::all() }
    } else {
        selection
    };
    let targets = get_mhm_download_targets(table, directory, &selection);
    logging::info(Source::Photos, Some("mhm"), &format!("{} photos to download", targets.len()));
    download_photos(client, &targets)
}

/// Download LC photos for a cleaned table. An empty selection downloads
/// every direction.
pub fn download_lc_photos(
    client: &reqwest::blocking::Client,
    table: &Table,
    directory: &Path,
    selection: LcPhotoSelection,
) -> Result<DownloadSummary, GoError> {
    let selection = if selection.is_empty() { LcPhotoSelection::all() } else { selection };
    let targets = get_lc_download_targets(table, directory, &selection);
    logging::info(Source::Photos, Some("lc"), &format!("{} photos to download", targets.len()));
    download_photos(client, &targets)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
