use crate::catalog::TypeCatalog;
use crate::config::{ConfigSource, RouteResolver};
use crate::router::RouteTable;
use crate::runtime_config::RuntimeConfig;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::env;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Command-line interface for actionroute
///
/// Resolves the declarations of a resource directory the same way an
/// application does at startup.
#[derive(Parser, Debug)]
#[command(name = "actionroute")]
#[command(about = "Inspect actionroute declarations", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve the route table and print it in match order
    Routes {
        /// Directory holding the declaration documents
        #[arg(short, long, env = "ACTIONROUTE_RESOURCE_DIR", default_value = "resources")]
        resources: PathBuf,
    },
    /// Report which route a request path matches
    Match {
        /// Directory holding the declaration documents
        #[arg(short, long, env = "ACTIONROUTE_RESOURCE_DIR", default_value = "resources")]
        resources: PathBuf,

        /// Request path, e.g. /login.do
        path: String,
    },
    /// Resolve only; fails on any configuration error
    Check {
        /// Directory holding the declaration documents
        #[arg(short, long, env = "ACTIONROUTE_RESOURCE_DIR", default_value = "resources")]
        resources: PathBuf,
    },
}

/// Run the CLI with an empty type catalog.
///
/// Only legacy declaration files resolve this way; scan listings name
/// namespaces the empty catalog does not have.
///
/// # Errors
///
/// Any resolution failure, or a path without a matching route for `match`.
pub fn run_cli() -> Result<()> {
    run_with_catalog(Arc::new(TypeCatalog::new()))
}

/// Run the CLI against an application's own catalog.
///
/// # Errors
///
/// See [`run_cli`].
pub fn run_with_catalog(catalog: Arc<TypeCatalog>) -> Result<()> {
    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute(&cli, catalog, &mut out)
}

/// Execute a parsed command, writing its report to `out`.
///
/// # Errors
///
/// See [`run_cli`].
pub fn execute<W: Write>(cli: &Cli, catalog: Arc<TypeCatalog>, out: &mut W) -> Result<()> {
    match &cli.command {
        Commands::Routes { resources } => {
            let (source, table) = resolve(resources, catalog)?;
            writeln!(out, "# {} configuration, {} routes", source.label(), table.len())?;
            for entry in table.entries() {
                writeln!(out, "{}\t{}\t{}", entry.pattern, entry.action_type, entry.form_type)?;
            }
        }
        Commands::Match { resources, path } => {
            let (_, table) = resolve(resources, catalog)?;
            match table.match_path(path) {
                Some(m) => writeln!(
                    out,
                    "{} -> {} (action {}, form {})",
                    path,
                    m.pattern(),
                    m.action_type(),
                    m.form_type()
                )?,
                None => bail!("No route matches {path}"),
            }
        }
        Commands::Check { resources } => {
            let (source, table) = resolve(resources, catalog)?;
            writeln!(
                out,
                "ok: {} routes from {} configuration",
                table.len(),
                source.label()
            )?;
        }
    }
    Ok(())
}

fn resolve(resources: &Path, catalog: Arc<TypeCatalog>) -> Result<(ConfigSource, RouteTable)> {
    let dir = resources.display().to_string();
    let config = RuntimeConfig::from_lookup(|key| {
        if key == "ACTIONROUTE_RESOURCE_DIR" {
            Some(dir.clone())
        } else {
            env::var(key).ok()
        }
    })
    .with_context(|| format!("Failed to read configuration in {dir}"))?;

    let resolver = RouteResolver::new(catalog, config);
    let source = resolver
        .resolve_source()
        .with_context(|| format!("Failed to resolve routes from {dir}"))?;
    let table = RouteTable::new(source.entries())
        .with_context(|| format!("Failed to compile routes from {dir}"))?;
    Ok((source, table))
}
