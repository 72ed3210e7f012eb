// go-utils command line entry point.
//
// Every subcommand:
// 1. Loads config (go_utils.toml / GO_UTILS_CONFIG / --config)
// 2. Initializes tracing from the [logging] section
// 3. Runs the download, photo or verification flow

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use go_utils::config::{self, Config};
use go_utils::download::{self, DownloadRequest};
use go_utils::geoenrich;
use go_utils::lc;
use go_utils::logging::{self, Source};
use go_utils::mhm;
use go_utils::model::{LatLonBox, Protocol};
use go_utils::photo_download::{self, LcPhotoSelection, MhmPhotoSelection};
use go_utils::table::Table;
use go_utils::verify;

#[derive(Debug, Parser)]
#[command(name = "go-utils", version, about = "Download and clean GLOBE Observer data")]
struct Cli {
    /// Configuration file (defaults to go_utils.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Download, clean and flag Mosquito Habitat Mapper data
    MhmDownload {
        #[command(flatten)]
        download: DownloadArgs,

        /// Only keep entries with a genus classification
        #[arg(long = "hasgenus")]
        has_genus: bool,

        /// Only keep entries from container water sources
        #[arg(long = "iscontainer")]
        is_container: bool,

        /// Only keep entries with at least one photo
        #[arg(long = "hasphotos")]
        has_photos: bool,

        /// Only keep entries with at least this many larvae
        #[arg(long = "minlarvae")]
        min_larvae: Option<i64>,
    },

    /// Download, clean and flag Landcover data
    LcDownload {
        #[command(flatten)]
        download: DownloadArgs,

        /// Only keep entries with at least one classification
        #[arg(long = "hasclassification")]
        has_classification: bool,

        /// Only keep entries with at least one photo
        #[arg(long = "hasphoto")]
        has_photo: bool,

        /// Only keep entries classified in every direction
        #[arg(long = "hasallclassifications")]
        has_all_classifications: bool,

        /// Only keep entries with all six photos
        #[arg(long = "hasallphotos")]
        has_all_photos: bool,
    },

    /// Download the photos of a cleaned Mosquito Habitat Mapper CSV
    MhmPhotos {
        input: PathBuf,
        out: PathBuf,

        #[arg(short = 'l', long)]
        larvae: bool,

        #[arg(short = 'w', long)]
        watersource: bool,

        #[arg(short = 'a', long)]
        abdomen: bool,

        /// Include the species (or genus) in file names
        #[arg(short = 's', long)]
        species: bool,
    },

    /// Download the photos of a cleaned Landcover CSV
    LcPhotos {
        input: PathBuf,
        out: PathBuf,

        #[arg(short = 'u', long)]
        up: bool,

        #[arg(short = 'd', long)]
        down: bool,

        #[arg(short = 'n', long)]
        north: bool,

        #[arg(short = 's', long)]
        south: bool,

        #[arg(short = 'e', long)]
        east: bool,

        #[arg(short = 'w', long)]
        west: bool,

        #[arg(short = 'a', long)]
        all: bool,
    },

    /// Check that the GLOBE API and ArcGIS layers respond
    Verify {
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Args)]
struct DownloadArgs {
    /// Output CSV; a diagnostic report is printed when omitted
    #[arg(long)]
    out: Option<PathBuf>,

    /// Start date, YYYY-MM-DD
    #[arg(long)]
    start: Option<String>,

    /// End date, YYYY-MM-DD
    #[arg(long)]
    end: Option<String>,

    /// Comma separated country names
    #[arg(long, value_delimiter = ',')]
    countries: Vec<String>,

    /// Comma separated region names
    #[arg(long, value_delimiter = ',')]
    regions: Vec<String>,

    /// Bounding box: "min lat, min lon, max lat, max lon"
    #[arg(long = "box", allow_hyphen_values = true)]
    latlon_box: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = config::load_config(cli.config.as_deref()).context("failed to load configuration")?;
    let level = config.logging.level().context("invalid logging level")?;
    logging::init_logger(level, config.logging.file.as_deref(), config.logging.timestamps)
        .context("failed to initialize logging")?;

    match cli.command {
        Command::MhmDownload { download: args, has_genus, is_container, has_photos, min_larvae } => {
            let raw = fetch(&config, Protocol::MosquitoHabitatMapper, &args)?;
            if raw.is_empty() {
                println!("No observations found for this request.");
                return Ok(());
            }
            let mut table = mhm::apply_cleanup(&raw).context("failed to clean mosquito data")?;
            mhm::add_flags(&mut table).context("failed to flag mosquito data")?;
            let options = mhm::QaOptions {
                has_genus,
                min_larvae_count: min_larvae,
                has_photos,
                is_container,
            };
            let table = mhm::qa_filter(&table, &options)?;
            match &args.out {
                Some(out) => write_output(&table, out)?,
                None => println!("{}", mhm::diagnostics(&table)?),
            }
        }
        Command::LcDownload {
            download: args,
            has_classification,
            has_photo,
            has_all_classifications,
            has_all_photos,
        } => {
            let raw = fetch(&config, Protocol::LandCovers, &args)?;
            if raw.is_empty() {
                println!("No observations found for this request.");
                return Ok(());
            }
            let mut table = lc::apply_cleanup(&raw).context("failed to clean landcover data")?;
            lc::add_flags(&mut table).context("failed to flag landcover data")?;
            let options = lc::QaOptions {
                has_classification,
                has_photo,
                has_all_classifications,
                has_all_photos,
            };
            let table = lc::qa_filter(&table, &options)?;
            match &args.out {
                Some(out) => write_output(&table, out)?,
                None => println!("{}", lc::diagnostics(&table)?),
            }
        }
        Command::MhmPhotos { input, out, larvae, watersource, abdomen, species } => {
            let table = read_input(&input)?;
            let client = photo_download::build_photo_client(&config)?;
            let selection = MhmPhotoSelection { watersource, larvae, abdomen, species };
            let summary = photo_download::download_mhm_photos(&client, &table, &out, selection)
                .with_context(|| format!("failed to download photos to {}", out.display()))?;
            println!(
                "{} photos: {} downloaded, {} already present, {} failed",
                summary.total, summary.downloaded, summary.skipped, summary.failed
            );
        }
        Command::LcPhotos { input, out, up, down, north, south, east, west, all } => {
            let table = read_input(&input)?;
            let client = photo_download::build_photo_client(&config)?;
            let selection = if all {
                LcPhotoSelection::all()
            } else {
                LcPhotoSelection { up, down, north, south, east, west }
            };
            let summary = photo_download::download_lc_photos(&client, &table, &out, selection)
                .with_context(|| format!("failed to download photos to {}", out.display()))?;
            println!(
                "{} photos: {} downloaded, {} already present, {} failed",
                summary.total, summary.downloaded, summary.skipped, summary.failed
            );
        }
        Command::Verify { json } => {
            let report = verify::run_full_verification(&config)?;
            verify::print_summary(&report);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
        }
    }

    Ok(())
}

/// Raw data for a download command: country-enriched ArcGIS data when
/// countries or regions are given, GLOBE API data otherwise.
fn fetch(config: &Config, protocol: Protocol, args: &DownloadArgs) -> anyhow::Result<Table> {
    let mut request = DownloadRequest::new(protocol, config)?;
    if let Some(start) = &args.start {
        request.start_date = download::parse_date(start)?;
    }
    if let Some(end) = &args.end {
        request.end_date = download::parse_date(end)?;
    }
    if let Some(text) = &args.latlon_box {
        let latlon_box: LatLonBox = text.parse()?;
        request = request.with_box(latlon_box);
    }

    let client = download::build_client(config)?;
    let (source, result) = if args.countries.is_empty() && args.regions.is_empty() {
        (Source::GlobeApi, download::get_api_data(&client, config, &request))
    } else {
        let data =
            geoenrich::get_country_api_data(&client, config, &request, &args.countries, &args.regions);
        (Source::ArcGis, data)
    };

    result.map_err(|e| {
        logging::log_api_failure(source, protocol.api_name(), "download", &e);
        anyhow::Error::new(e).context(format!("failed to download {} data", protocol))
    })
}

fn read_input(path: &Path) -> anyhow::Result<Table> {
    Table::read_csv(path).with_context(|| format!("failed to read {}", path.display()))
}

fn write_output(table: &Table, path: &Path) -> anyhow::Result<()> {
    table
        .write_csv(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    logging::info(
        Source::System,
        None,
        &format!("wrote {} entries to {}", table.len(), path.display()),
    );
    Ok(())
}
