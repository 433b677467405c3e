use std::fmt;
use std::path::PathBuf;

/// Startup configuration error.
///
/// Every variant is fatal: no request can be served until the
/// configuration is fixed.
#[derive(Debug)]
pub enum ConfigError {
    /// Scanned declarations were found while the legacy declaration file
    /// is also present
    ConfigurationConflict { legacy_file: PathBuf },
    /// Neither scanned declarations nor a legacy declaration file exist
    NoConfigurationProvided {
        scan_listing: PathBuf,
        legacy_file: PathBuf,
    },
    /// A namespace named in the scan listing does not exist
    NamespaceScanError {
        namespace: String,
        scan_listing: PathBuf,
    },
    /// A configuration document is malformed
    ParseError { file: PathBuf, reason: String },
    /// A configuration document exists but cannot be read
    Io {
        file: PathBuf,
        source: std::io::Error,
    },
    /// A route's url pattern is not a valid regular expression
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ConfigurationConflict { legacy_file } => write!(
                f,
                "Declarations were found by scanning, but the legacy declaration file {} \
                 is also present. Remove it to avoid confusion with the scanned declarations",
                legacy_file.display()
            ),
            ConfigError::NoConfigurationProvided {
                scan_listing,
                legacy_file,
            } => write!(
                f,
                "No actions or forms are configured. Either declare them with markers and list \
                 their namespaces in {}, or declare them individually in {}. Neither was found",
                scan_listing.display(),
                legacy_file.display()
            ),
            ConfigError::NamespaceScanError {
                namespace,
                scan_listing,
            } => write!(
                f,
                "The namespace '{}' listed in {} does not exist",
                namespace,
                scan_listing.display()
            ),
            ConfigError::ParseError { file, reason } => write!(
                f,
                "The configuration file {} is not properly formed: {}",
                file.display(),
                reason
            ),
            ConfigError::Io { file, source } => {
                write!(f, "Cannot read configuration file {}: {}", file.display(), source)
            }
            ConfigError::InvalidPattern { pattern, source } => {
                write!(f, "Invalid url pattern '{}': {}", pattern, source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::InvalidPattern { source, .. } => Some(source),
            _ => None,
        }
    }
}
