//! Router core module - per-request path matching.
//!
//! Patterns are compiled once in [`RouteTable::new`]; matching only runs
//! the compiled regexes and never allocates beyond the returned `Arc` clone.

use crate::config::ConfigError;
use regex::Regex;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// One route: a url pattern paired with its action and form types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    /// Regex the whole request path must match
    pub pattern: String,
    pub action_type: String,
    pub form_type: String,
}

impl RouteEntry {
    #[must_use]
    pub fn new(
        pattern: impl Into<String>,
        action_type: impl Into<String>,
        form_type: impl Into<String>,
    ) -> Self {
        Self {
            pattern: pattern.into(),
            action_type: action_type.into(),
            form_type: form_type.into(),
        }
    }
}

/// Result of successfully matching a request path.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// The matched entry (Arc to avoid cloning its strings per request)
    pub route: Arc<RouteEntry>,
}

impl RouteMatch {
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.route.pattern
    }

    #[must_use]
    pub fn action_type(&self) -> &str {
        &self.route.action_type
    }

    #[must_use]
    pub fn form_type(&self) -> &str {
        &self.route.form_type
    }
}

#[derive(Debug, Clone)]
struct CompiledRoute {
    regex: Regex,
    entry: Arc<RouteEntry>,
}

/// Ordered, immutable route table. First full match wins.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<CompiledRoute>,
}

impl RouteTable {
    /// Compile `entries` in order.
    ///
    /// An entry whose pattern was already seen replaces the earlier pair and
    /// keeps the earlier position.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidPattern`] for a pattern that is not a valid regex.
    pub fn new(entries: Vec<RouteEntry>) -> Result<Self, ConfigError> {
        let mut routes: Vec<CompiledRoute> = Vec::with_capacity(entries.len());

        for entry in entries {
            if let Some(existing) = routes.iter_mut().find(|r| r.entry.pattern == entry.pattern) {
                debug!(
                    pattern = %entry.pattern,
                    replaced_action = %existing.entry.action_type,
                    action_type = %entry.action_type,
                    "Duplicate url pattern, keeping the later pair"
                );
                existing.entry = Arc::new(entry);
                continue;
            }
            let regex = Self::compile(&entry.pattern)?;
            routes.push(CompiledRoute {
                regex,
                entry: Arc::new(entry),
            });
        }

        if routes.is_empty() {
            info!(routes_count = 0, "Routing table compiled with no routes");
        } else {
            let routes_summary: Vec<String> = routes
                .iter()
                .map(|r| format!("{} -> {}", r.entry.pattern, r.entry.action_type))
                .collect();
            info!(
                routes_count = routes.len(),
                routes_summary = ?routes_summary,
                "Routing table compiled"
            );
        }

        Ok(Self { routes })
    }

    /// Anchor `pattern` so it only matches whole paths.
    fn compile(pattern: &str) -> Result<Regex, ConfigError> {
        Regex::new(&format!("^(?:{pattern})$")).map_err(|source| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
    }

    /// First entry, in table order, whose pattern matches all of `path`.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<RouteMatch> {
        let start = Instant::now();
        debug!(path = %path, "Route match attempt");

        let found = self.routes.iter().find(|r| r.regex.is_match(path));
        let match_duration = start.elapsed();

        match found {
            Some(route) => {
                debug!(
                    path = %path,
                    route_pattern = %route.entry.pattern,
                    action_type = %route.entry.action_type,
                    form_type = %route.entry.form_type,
                    duration_us = match_duration.as_micros(),
                    "Route matched"
                );
                Some(RouteMatch {
                    route: Arc::clone(&route.entry),
                })
            }
            None => {
                warn!(
                    path = %path,
                    duration_us = match_duration.as_micros(),
                    "No route matched"
                );
                None
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Entries in match order.
    pub fn entries(&self) -> impl Iterator<Item = &RouteEntry> {
        self.routes.iter().map(|r| r.entry.as_ref())
    }

    /// Patterns in match order.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|r| r.entry.pattern.as_str())
    }
}
