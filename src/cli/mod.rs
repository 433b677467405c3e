//! # CLI Module
//!
//! Command-line access to route resolution, for checking a resource
//! directory before deploying it.
//!
//! ## Commands
//!
//! ```bash
//! actionroute routes --resources resources
//! actionroute match --resources resources /login.do
//! actionroute check --resources resources
//! ```
//!
//! `--resources` defaults to `ACTIONROUTE_RESOURCE_DIR`, then `resources`.
//!
//! ## Usage from Code
//!
//! The `actionroute` binary knows no application types. Applications using
//! scan-based configuration call [`run_with_catalog`] from their own binary:
//!
//! ```rust,ignore
//! use actionroute::cli::run_with_catalog;
//!
//! fn main() -> anyhow::Result<()> {
//!     run_with_catalog(std::sync::Arc::new(my_app::catalog()))
//! }
//! ```

mod commands;


pub use commands::{execute, run_cli, run_with_catalog, Cli, Commands};
