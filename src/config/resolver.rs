use super::load::{load_declarations, load_scan_listing};
use super::scan::scan_catalog;
use super::types::ConfigSource;
use super::ConfigError;
use crate::catalog::TypeCatalog;
use crate::router::RouteTable;
use crate::runtime_config::RuntimeConfig;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Builds the route table from whichever configuration source is active.
///
/// Scanned declarations take precedence. The legacy declaration file is
/// only read when scanning yields no joined entry, and its mere presence
/// next to a non-empty scan result is a [`ConfigError::ConfigurationConflict`].
#[derive(Debug, Clone)]
pub struct RouteResolver {
    catalog: Arc<TypeCatalog>,
    config: RuntimeConfig,
}

impl RouteResolver {
    #[must_use]
    pub fn new(catalog: Arc<TypeCatalog>, config: RuntimeConfig) -> Self {
        Self { catalog, config }
    }

    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Resolve and compile the route table.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`]; all of them are fatal at startup. A legacy file
    /// whose sections join into no route counts as no configuration.
    pub fn resolve(&self) -> Result<RouteTable, ConfigError> {
        let start = Instant::now();
        let source = self.resolve_source().inspect_err(|e| {
            error!(error = %e, "Route resolution failed");
        })?;
        let table = RouteTable::new(source.entries())?;
        info!(
            source = source.label(),
            routes_count = table.len(),
            duration_us = start.elapsed().as_micros(),
            "Routing table loaded"
        );
        Ok(table)
    }

    /// Pick the active configuration source without compiling patterns.
    ///
    /// # Errors
    ///
    /// See [`resolve`](Self::resolve).
    pub fn resolve_source(&self) -> Result<ConfigSource, ConfigError> {
        let legacy_file = self.config.legacy_path();

        if let Some(scanned) = self.scan()? {
            if !scanned.entries().is_empty() {
                if legacy_file.exists() {
                    return Err(ConfigError::ConfigurationConflict { legacy_file });
                }
                return Ok(scanned);
            }
            debug!("Scan produced no route, falling back to the legacy declaration file");
        }

        let Some(declarations) = load_declarations(&legacy_file)? else {
            return Err(self.nothing_provided(legacy_file));
        };
        let declared = ConfigSource::Declared {
            actions: declarations.action_descriptors(),
            forms: declarations.form_descriptors(),
            file: legacy_file,
        };
        if declared.entries().is_empty() {
            warn!(
                actions = declared.actions().len(),
                forms = declared.forms().len(),
                "Legacy declaration file yields no route"
            );
            return Err(self.nothing_provided(self.config.legacy_path()));
        }
        Ok(declared)
    }

    fn nothing_provided(&self, legacy_file: PathBuf) -> ConfigError {
        ConfigError::NoConfigurationProvided {
            scan_listing: self.config.scan_listing_path(),
            legacy_file,
        }
    }

    fn scan(&self) -> Result<Option<ConfigSource>, ConfigError> {
        let scan_listing = self.config.scan_listing_path();
        let Some(listing) = load_scan_listing(&scan_listing)? else {
            return Ok(None);
        };
        let namespaces = listing.namespaces().to_vec();
        let found = scan_catalog(&self.catalog, &namespaces, &scan_listing)?;
        debug!(
            actions = found.actions.len(),
            forms = found.forms.len(),
            "Declaration scan complete"
        );
        Ok(Some(ConfigSource::Scanned {
            scan_listing,
            namespaces,
            actions: found.actions,
            forms: found.forms,
        }))
    }
}
