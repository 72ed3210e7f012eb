/// Structured logging for the GLOBE Observer utilities
///
/// Provides context-rich logging tagged with the data source and an optional
/// context identifier (a column name, a photo file, a protocol). Events are
/// emitted through `tracing`; `init_logger` installs the subscriber for
/// console or file output.

use std::fmt;
use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// Directive understood by `EnvFilter`.
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level: {}", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Data Source Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    GlobeApi,
    ArcGis,
    Cleanup,
    Photos,
    System,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::GlobeApi => write!(f, "GLOBE"),
            Source::ArcGis => write!(f, "ARCGIS"),
            Source::Cleanup => write!(f, "CLEANUP"),
            Source::Photos => write!(f, "PHOTOS"),
            Source::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - photo removed upstream, record without data
    Expected,
    /// Unexpected failure - indicates service degradation or configuration issue
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides `min_level` when set. With a `log_file`, events are
/// appended to that file without ANSI colors; otherwise they go to stderr.
/// Calling this more than once keeps the first subscriber.
pub fn init_logger(
    min_level: LogLevel,
    log_file: Option<&str>,
    console_timestamps: bool,
) -> std::io::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(min_level.as_filter()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.with_writer(Mutex::new(file)).with_ansi(false).try_init()
        }
        None if console_timestamps => builder.with_writer(std::io::stderr).try_init(),
        None => builder.with_writer(std::io::stderr).without_time().try_init(),
    }
    .ok();
    Ok(())
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Log a general informational message
pub fn info(source: Source, context: Option<&str>, message: &str) {
    tracing::info!(source = %source, context = context.unwrap_or("-"), "{}", message);
}

/// Log a warning message
pub fn warn(source: Source, context: Option<&str>, message: &str) {
    tracing::warn!(source = %source, context = context.unwrap_or("-"), "{}", message);
}

/// Log an error message
pub fn error(source: Source, context: Option<&str>, message: &str) {
    tracing::error!(source = %source, context = context.unwrap_or("-"), "{}", message);
}

/// Log a debug message
pub fn debug(source: Source, context: Option<&str>, message: &str) {
    tracing::debug!(source = %source, context = context.unwrap_or("-"), "{}", message);
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify a failed GLOBE/ArcGIS API request from its error text
pub fn classify_api_failure(error_message: &str) -> FailureType {
    if error_message.contains("most likely down") || error_message.contains("HTTP") {
        FailureType::Unexpected
    } else if error_message.contains("Parse error") {
        // Parse errors suggest API changes
        FailureType::Unexpected
    } else {
        FailureType::Unknown
    }
}

/// Classify a failed photo download from its error text
pub fn classify_photo_failure(error_message: &str) -> FailureType {
    // GLOBE removes rejected photos; a 404 on those is routine
    if error_message.contains("404") || error_message.contains("403") {
        FailureType::Expected
    } else if error_message.contains("HTTP") || error_message.contains("timed out") {
        FailureType::Unexpected
    } else {
        FailureType::Unknown
    }
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

fn log_classified(source: Source, context: &str, failure_type: FailureType, message: &str) {
    match failure_type {
        FailureType::Expected => debug(source, Some(context), message),
        FailureType::Unexpected => error(source, Some(context), message),
        FailureType::Unknown => warn(source, Some(context), message),
    }
}

/// Log an API failure with automatic classification
pub fn log_api_failure(source: Source, protocol: &str, operation: &str, err: &dyn std::error::Error) {
    let error_msg = err.to_string();
    let failure_type = classify_api_failure(&error_msg);
    let message = format!("{} failed [{}]: {}", operation, failure_type, error_msg);
    log_classified(source, protocol, failure_type, &message);
}

/// Log a photo download failure with classification
pub fn log_photo_failure(filename: &str, err: &dyn std::error::Error) {
    let error_msg = err.to_string();
    let failure_type = classify_photo_failure(&error_msg);
    let message = format!("download failed [{}]: {}", failure_type, error_msg);
    log_classified(Source::Photos, filename, failure_type, &message);
}

// ---------------------------------------------------------------------------
// Download Summary Logging
// ---------------------------------------------------------------------------

/// Log a summary of a photo download run
pub fn log_download_summary(total: usize, downloaded: usize, skipped: usize, failed: usize) {
    let message = format!(
        "Photo download complete: {}/{} downloaded, {} already present, {} failed",
        downloaded, total, skipped, failed
    );

    if failed == 0 {
        info(Source::Photos, None, &message);
    } else if downloaded == 0 && skipped == 0 {
        error(Source::Photos, None, &message);
    } else {
        warn(Source::Photos, None, &message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
    }

    #[test]
    fn test_log_level_parses_config_names() {
        assert_eq!("warning".parse::<LogLevel>(), Ok(LogLevel::Warning));
        assert_eq!("INFO".parse::<LogLevel>(), Ok(LogLevel::Info));
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_failure_classification() {
        let down = "Data Download Failed. The GLOBE API is most likely down.";
        assert_eq!(classify_api_failure(down), FailureType::Unexpected);

        assert_eq!(classify_photo_failure("HTTP 404 Not Found"), FailureType::Expected);
        assert_eq!(classify_photo_failure("HTTP 500"), FailureType::Unexpected);
        assert_eq!(classify_photo_failure("disk full"), FailureType::Unknown);
    }
}
