use super::{ConfigError, RouteResolver};
use crate::router::RouteTable;
use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::info;

/// Resolves the route table once and hands out shared snapshots.
///
/// Readers never block once the table is resolved. Concurrent first
/// accesses are serialized so the resolver runs a single time.
pub struct RouteCache {
    resolver: RouteResolver,
    table: ArcSwapOption<RouteTable>,
    init: Mutex<()>,
}

impl RouteCache {
    #[must_use]
    pub fn new(resolver: RouteResolver) -> Self {
        Self {
            resolver,
            table: ArcSwapOption::empty(),
            init: Mutex::new(()),
        }
    }

    /// The cached table, resolving it on first access.
    ///
    /// # Errors
    ///
    /// The resolver's [`ConfigError`]; nothing is cached on failure, so the
    /// next call resolves again.
    pub fn table(&self) -> Result<Arc<RouteTable>, ConfigError> {
        if let Some(table) = self.table.load_full() {
            return Ok(table);
        }
        let _guard = self.init.lock();
        if let Some(table) = self.table.load_full() {
            return Ok(table);
        }
        let table = Arc::new(self.resolver.resolve()?);
        self.table.store(Some(Arc::clone(&table)));
        Ok(table)
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.table.load().is_some()
    }

    /// Drop the cached table; the next [`table`](Self::table) call resolves again.
    /// Snapshots already handed out stay valid.
    pub fn discard(&self) {
        let _guard = self.init.lock();
        if self.table.swap(None).is_some() {
            info!("Routing table discarded");
        }
    }

    #[must_use]
    pub fn resolver(&self) -> &RouteResolver {
        &self.resolver
    }
}
