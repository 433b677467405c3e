//! # Instance Registry
//!
//! Creates actions and forms by logical type name and keeps at most one
//! live instance per type name per session.
//!
//! Instances are stored as session attributes under their type name. The
//! check-construct-store sequence runs under a lock keyed by
//! `(session id, type name)`, so two overlapping requests from the same
//! client cannot both construct the same type. Sessions never share
//! instances.

use crate::action::{Action, Form};
use crate::catalog::{Capability, TypeCatalog};
use crate::server::{Session, SessionValue};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Session-held form, shared with the request scope for rendering.
pub type SharedForm = Arc<Mutex<Box<dyn Form>>>;
/// Session-held action.
pub type SharedAction = Arc<Mutex<Box<dyn Action>>>;

/// Which archetype a type name should resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceKind {
    Action,
    Form,
}

impl fmt::Display for InstanceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstanceKind::Action => write!(f, "action"),
            InstanceKind::Form => write!(f, "form"),
        }
    }
}

/// A constructed action or form.
#[derive(Clone)]
pub enum Instance {
    Action(SharedAction),
    Form(SharedForm),
}

impl Instance {
    #[must_use]
    pub fn kind(&self) -> InstanceKind {
        match self {
            Instance::Action(_) => InstanceKind::Action,
            Instance::Form(_) => InstanceKind::Form,
        }
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Instance::{:?}", self.kind())
    }
}

/// A type name could not be turned into a constructible type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeResolutionError {
    /// No catalog entry carries this name
    Unknown { type_name: String },
    /// The entry exists but is not of the requested archetype
    WrongKind {
        type_name: String,
        expected: InstanceKind,
    },
    /// The entry exists but is neither an action nor a form
    NotConstructible { type_name: String },
}

impl TypeResolutionError {
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            TypeResolutionError::Unknown { type_name }
            | TypeResolutionError::WrongKind { type_name, .. }
            | TypeResolutionError::NotConstructible { type_name } => type_name,
        }
    }
}

impl fmt::Display for TypeResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeResolutionError::Unknown { type_name } => write!(
                f,
                "The type {} is not registered. Please check the correspondence between \
                 your configuration and your types",
                type_name
            ),
            TypeResolutionError::WrongKind {
                type_name,
                expected,
            } => write!(f, "The type {} cannot be constructed as an {}", type_name, expected),
            TypeResolutionError::NotConstructible { type_name } => {
                write!(f, "The type {} is neither an action nor a form", type_name)
            }
        }
    }
}

impl std::error::Error for TypeResolutionError {}

/// Session-scoped factory for actions and forms.
pub struct InstanceRegistry {
    catalog: Arc<TypeCatalog>,
    locks: DashMap<(String, String), Arc<Mutex<()>>>,
}

impl InstanceRegistry {
    #[must_use]
    pub fn new(catalog: Arc<TypeCatalog>) -> Self {
        Self {
            catalog,
            locks: DashMap::new(),
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &Arc<TypeCatalog> {
        &self.catalog
    }

    /// Whether `type_name` can be constructed as `kind`, without constructing it.
    #[must_use]
    pub fn is_resolvable(&self, type_name: &str, kind: InstanceKind) -> bool {
        matches!(
            (self.catalog.get(type_name).map(|e| e.capability), kind),
            (Some(Capability::Action(_)), InstanceKind::Action)
                | (Some(Capability::Form(_)), InstanceKind::Form)
        )
    }

    /// Build a fresh instance, bypassing every session.
    ///
    /// # Errors
    ///
    /// [`TypeResolutionError::Unknown`] when the catalog has no such type,
    /// [`TypeResolutionError::NotConstructible`] when it is neither action
    /// nor form.
    pub fn construct(&self, type_name: &str) -> Result<Instance, TypeResolutionError> {
        let entry = self
            .catalog
            .get(type_name)
            .ok_or_else(|| TypeResolutionError::Unknown {
                type_name: type_name.to_string(),
            })?;
        match entry.capability {
            Capability::Action(make) => Ok(Instance::Action(Arc::new(Mutex::new(make())))),
            Capability::Form(make) => Ok(Instance::Form(Arc::new(Mutex::new(make())))),
            Capability::Plain => Err(TypeResolutionError::NotConstructible {
                type_name: type_name.to_string(),
            }),
        }
    }

    /// Return the session's instance of `type_name`, creating and storing
    /// it on first use.
    ///
    /// # Errors
    ///
    /// Propagates [`construct`](Self::construct) failures; nothing is stored
    /// in that case.
    pub fn get_or_create(
        &self,
        session: &dyn Session,
        type_name: &str,
    ) -> Result<Instance, TypeResolutionError> {
        let lock = Arc::clone(
            &self
                .locks
                .entry((session.id().to_string(), type_name.to_string()))
                .or_default(),
        );
        let _guard = lock.lock();

        if let Some(value) = session.attribute(type_name) {
            match value.downcast::<Instance>() {
                Ok(instance) => {
                    debug!(session_id = %session.id(), type_name = %type_name, "Reusing session instance");
                    return Ok(Instance::clone(&instance));
                }
                Err(_) => warn!(
                    session_id = %session.id(),
                    type_name = %type_name,
                    "Session attribute under type name is not an instance, replacing it"
                ),
            }
        }

        let instance = self.construct(type_name)?;
        let stored: SessionValue = Arc::new(instance.clone());
        session.set_attribute(type_name, stored);
        info!(
            session_id = %session.id(),
            type_name = %type_name,
            kind = %instance.kind(),
            "Instance created for session"
        );
        Ok(instance)
    }

    /// [`get_or_create`](Self::get_or_create) restricted to forms.
    ///
    /// # Errors
    ///
    /// [`TypeResolutionError::WrongKind`] when the type is not a form.
    pub fn get_or_create_form(
        &self,
        session: &dyn Session,
        type_name: &str,
    ) -> Result<SharedForm, TypeResolutionError> {
        if !self.is_resolvable(type_name, InstanceKind::Form) {
            return Err(self.resolution_error(type_name, InstanceKind::Form));
        }
        match self.get_or_create(session, type_name)? {
            Instance::Form(form) => Ok(form),
            Instance::Action(_) => Err(self.resolution_error(type_name, InstanceKind::Form)),
        }
    }

    /// [`get_or_create`](Self::get_or_create) restricted to actions.
    ///
    /// # Errors
    ///
    /// [`TypeResolutionError::WrongKind`] when the type is not an action.
    pub fn get_or_create_action(
        &self,
        session: &dyn Session,
        type_name: &str,
    ) -> Result<SharedAction, TypeResolutionError> {
        if !self.is_resolvable(type_name, InstanceKind::Action) {
            return Err(self.resolution_error(type_name, InstanceKind::Action));
        }
        match self.get_or_create(session, type_name)? {
            Instance::Action(action) => Ok(action),
            Instance::Form(_) => Err(self.resolution_error(type_name, InstanceKind::Action)),
        }
    }

    /// Drop the lock table entries of an expired session.
    ///
    /// Call it once the session can no longer receive requests. Entries
    /// still held by an in-flight `get_or_create` are kept, so a late
    /// request on the same session keeps sharing their lock.
    pub fn forget_session(&self, session_id: &str) {
        self.locks
            .retain(|(sid, _), lock| sid != session_id || Arc::strong_count(lock) > 1);
    }

    /// Number of `(session, type)` lock entries currently tracked.
    #[must_use]
    pub fn tracked_locks(&self) -> usize {
        self.locks.len()
    }

    fn resolution_error(&self, type_name: &str, expected: InstanceKind) -> TypeResolutionError {
        if self.catalog.contains(type_name) {
            TypeResolutionError::WrongKind {
                type_name: type_name.to_string(),
                expected,
            }
        } else {
            TypeResolutionError::Unknown {
                type_name: type_name.to_string(),
            }
        }
    }

    #[cfg(test)]
    fn lock_count(&self) -> usize {
        self.locks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Forward;
    use crate::catalog::TypeEntry;
    use crate::server::{ActionRequest, ActionResponse, InMemorySession};

    #[derive(Default)]
    struct Counter {
        calls: u32,
    }

    impl Action for Counter {
        fn execute(&mut self, _: &ActionRequest, _: &mut ActionResponse) -> Forward {
            self.calls += 1;
            Forward::to(format!("/count/{}", self.calls))
        }
    }

    fn registry() -> InstanceRegistry {
        let mut catalog = TypeCatalog::new();
        catalog
            .register(TypeEntry::action::<Counter>("app.Counter"))
            .register(TypeEntry::plain("app.Helper"));
        InstanceRegistry::new(Arc::new(catalog))
    }

    #[test]
    fn same_session_gets_same_instance() {
        let registry = registry();
        let session = InMemorySession::new();
        let a = registry.get_or_create_action(&session, "app.Counter").unwrap();
        let b = registry.get_or_create_action(&session, "app.Counter").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn different_sessions_get_distinct_instances() {
        let registry = registry();
        let a = registry
            .get_or_create_action(&InMemorySession::new(), "app.Counter")
            .unwrap();
        let b = registry
            .get_or_create_action(&InMemorySession::new(), "app.Counter")
            .unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn unknown_and_plain_types_do_not_resolve() {
        let registry = registry();
        let session = InMemorySession::new();
        assert!(matches!(
            registry.construct("app.Missing"),
            Err(TypeResolutionError::Unknown { .. })
        ));
        assert!(matches!(
            registry.get_or_create_action(&session, "app.Helper"),
            Err(TypeResolutionError::WrongKind { .. })
        ));
        assert!(session.is_empty());
    }

    #[test]
    fn forget_session_drops_its_locks() {
        let registry = registry();
        let session = InMemorySession::with_id("gone");
        registry.get_or_create(&session, "app.Counter").unwrap();
        assert_eq!(registry.lock_count(), 1);
        registry.forget_session("gone");
        assert_eq!(registry.lock_count(), 0);
    }
}
