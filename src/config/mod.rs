//! # Configuration Module
//!
//! Turns the application's declarations into route entries.
//!
//! ## Overview
//!
//! Two mutually exclusive sources exist:
//!
//! - **Scanned**: the scan listing names catalog namespaces; action and form
//!   markers on the types under them are collected.
//! - **Declared**: the legacy declaration file lists actions and forms
//!   explicitly.
//!
//! Either way actions and forms are inner-joined on the form name into
//! `url pattern -> (action type, form type)` entries, which
//! [`RouteTable`](crate::router::RouteTable) compiles.
//!
//! ## Resolution
//!
//! 1. Scan the namespaces of the scan listing, if there is one
//! 2. A non-empty scan result wins, unless the legacy file also exists
//!    ([`ConfigError::ConfigurationConflict`])
//! 3. Otherwise the legacy file is read
//! 4. With neither, or with a legacy file that joins into no route,
//!    resolution fails with [`ConfigError::NoConfigurationProvided`]
//!
//! Documents are YAML, JSON (`.json`) or XML (`.xml`, the element layout
//! of [`XmlDeclarationFile`]).
//!
//! [`RouteCache`] runs this once per process.

mod cache;
mod error;
pub mod load;
mod resolver;
mod scan;
mod types;

pub use cache::RouteCache;
pub use error::ConfigError;
pub use load::{load_declarations, load_scan_listing, DocumentFormat};
pub use resolver::RouteResolver;
pub use scan::{scan_catalog, ScanResult};
pub use types::{
    join, ActionDeclaration, ActionDescriptor, ConfigSource, DeclarationFile, FormDeclaration,
    FormDescriptor, ScanListing, XmlDeclarationFile, XmlScanListing,
};
