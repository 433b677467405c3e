use super::types::{DeclarationFile, ScanListing, XmlDeclarationFile, XmlScanListing};
use super::ConfigError;
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, warn};

/// Document syntax, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Xml,
    Yaml,
}

impl DocumentFormat {
    /// `.json` and `.xml` (any case) select their syntax; anything else is YAML.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => DocumentFormat::Json,
            Some(ext) if ext.eq_ignore_ascii_case("xml") => DocumentFormat::Xml,
            _ => DocumentFormat::Yaml,
        }
    }
}

/// Deserialize a configuration document in the syntax selected by the
/// extension of `path`.
///
/// # Errors
///
/// [`ConfigError::ParseError`] naming `path`.
pub fn parse_document<T: DeserializeOwned>(path: &Path, content: &str) -> Result<T, ConfigError> {
    let parsed = match DocumentFormat::from_path(path) {
        DocumentFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        DocumentFormat::Xml => quick_xml::de::from_str(content).map_err(|e| e.to_string()),
        DocumentFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
    };
    parsed.map_err(|reason| ConfigError::ParseError {
        file: path.to_path_buf(),
        reason,
    })
}

/// File content, or `None` when the file does not exist.
///
/// # Errors
///
/// [`ConfigError::Io`] for any other read failure.
pub fn read_optional(path: &Path) -> Result<Option<String>, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ConfigError::Io {
            file: path.to_path_buf(),
            source,
        }),
    }
}

/// Load the scan listing. A missing file is `None`; an empty file lists
/// no namespaces.
///
/// # Errors
///
/// [`ConfigError::ParseError`] for a malformed listing.
pub fn load_scan_listing(path: &Path) -> Result<Option<ScanListing>, ConfigError> {
    let Some(content) = read_optional(path)? else {
        debug!(file = %path.display(), "No scan listing");
        return Ok(None);
    };
    if content.trim().is_empty() {
        warn!(file = %path.display(), "Scan listing is empty");
        return Ok(Some(ScanListing::Bare(Vec::new())));
    }
    let listing: ScanListing = match DocumentFormat::from_path(path) {
        DocumentFormat::Xml => parse_document::<XmlScanListing>(path, &content)?.into(),
        _ => parse_document(path, &content)?,
    };
    debug!(
        file = %path.display(),
        namespaces = ?listing.namespaces(),
        "Scan listing loaded"
    );
    Ok(Some(listing))
}

/// Load the legacy declaration file. A missing file is `None`; an empty
/// file declares nothing.
///
/// # Errors
///
/// [`ConfigError::ParseError`] for a malformed document, including blank
/// required values.
pub fn load_declarations(path: &Path) -> Result<Option<DeclarationFile>, ConfigError> {
    let Some(content) = read_optional(path)? else {
        debug!(file = %path.display(), "No legacy declaration file");
        return Ok(None);
    };
    if content.trim().is_empty() {
        warn!(file = %path.display(), "Legacy declaration file is empty");
        return Ok(Some(DeclarationFile::default()));
    }
    let declarations: DeclarationFile = match DocumentFormat::from_path(path) {
        DocumentFormat::Xml => parse_document::<XmlDeclarationFile>(path, &content)?.into(),
        _ => parse_document(path, &content)?,
    };
    if let Some((section, index, key)) = declarations.first_blank() {
        return Err(ConfigError::ParseError {
            file: path.to_path_buf(),
            reason: format!("{section}[{index}]: '{key}' must not be empty"),
        });
    }
    debug!(
        file = %path.display(),
        actions = declarations.actions.len(),
        forms = declarations.forms.len(),
        "Legacy declaration file loaded"
    );
    Ok(Some(declarations))
}
