use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Value stored in a session attribute.
pub type SessionValue = Arc<dyn Any + Send + Sync>;

/// Server-held per-client key/value store.
///
/// Implemented by the hosting transport's session store. Expiry is the
/// store's business; when it drops a session it should also call
/// [`InstanceRegistry::forget_session`](crate::registry::InstanceRegistry::forget_session).
pub trait Session: Send + Sync {
    /// Stable identifier of this session
    fn id(&self) -> &str;

    fn attribute(&self, key: &str) -> Option<SessionValue>;

    fn set_attribute(&self, key: &str, value: SessionValue);

    fn remove_attribute(&self, key: &str) -> Option<SessionValue>;
}

/// Process-local session backed by a hash map.
pub struct InMemorySession {
    id: String,
    attributes: RwLock<HashMap<String, SessionValue>>,
}

impl InMemorySession {
    /// New session with a generated ULID identifier.
    #[must_use]
    pub fn new() -> Self {
        Self::with_id(ulid::Ulid::new().to_string())
    }

    #[must_use]
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: RwLock::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.read().is_empty()
    }
}

impl Default for InMemorySession {
    fn default() -> Self {
        Self::new()
    }
}

impl Session for InMemorySession {
    fn id(&self) -> &str {
        &self.id
    }

    fn attribute(&self, key: &str) -> Option<SessionValue> {
        self.attributes.read().get(key).cloned()
    }

    fn set_attribute(&self, key: &str, value: SessionValue) {
        self.attributes.write().insert(key.to_string(), value);
    }

    fn remove_attribute(&self, key: &str) -> Option<SessionValue> {
        self.attributes.write().remove(key)
    }
}

impl fmt::Debug for InMemorySession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<String> = self.attributes.read().keys().cloned().collect();
        f.debug_struct("InMemorySession")
            .field("id", &self.id)
            .field("attributes", &keys)
            .finish()
    }
}
