//! # Type Catalog
//!
//! The set of action and form types an application makes available to the
//! framework, addressed by logical dotted type names such as
//! `shop.web.LoginAction`. The part before the last dot is the type's
//! namespace.
//!
//! The catalog plays two roles:
//!
//! - **Declaration scanning**: entries can carry an [`ActionMarker`] or a
//!   [`FormMarker`], which the resolver reads when the scan listing names
//!   the entry's namespace.
//! - **Construction**: each entry holds a zero-argument constructor the
//!   [`InstanceRegistry`](crate::registry::InstanceRegistry) calls when a
//!   session first needs the type.
//!
//! ```
//! use actionroute::action::{Action, Forward, Form};
//! use actionroute::bindable_form;
//! use actionroute::catalog::{TypeCatalog, TypeEntry};
//! use actionroute::server::{ActionRequest, ActionResponse};
//!
//! #[derive(Default)]
//! struct LoginAction;
//!
//! impl Action for LoginAction {
//!     fn execute(&mut self, _: &ActionRequest, _: &mut ActionResponse) -> Forward {
//!         Forward::to("/welcome.jsp")
//!     }
//! }
//!
//! #[derive(Default)]
//! struct LoginForm { user: String }
//!
//! impl LoginForm {
//!     fn set_user(&mut self, user: String) { self.user = user; }
//! }
//!
//! bindable_form! { LoginForm as "shop.web.LoginForm" { user: Text => "setUser" set_user } }
//! impl Form for LoginForm {}
//!
//! let mut catalog = TypeCatalog::new();
//! catalog
//!     .register(TypeEntry::action::<LoginAction>("shop.web.LoginAction")
//!         .with_action_marker(r"/login\.do", "login"))
//!     .register(TypeEntry::form::<LoginForm>("shop.web.LoginForm")
//!         .with_form_marker("login"));
//!
//! assert!(catalog.namespace_exists("shop"));
//! assert_eq!(catalog.types_in("shop.web").count(), 2);
//! ```

use crate::action::{Action, Form};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Zero-argument action constructor
pub type ActionFactory = fn() -> Box<dyn Action>;
/// Zero-argument form constructor
pub type FormFactory = fn() -> Box<dyn Form>;

/// What a catalog type can be instantiated as.
#[derive(Clone, Copy)]
pub enum Capability {
    Action(ActionFactory),
    Form(FormFactory),
    /// Known type without framework capability (helpers, DTOs, ...)
    Plain,
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Action(_) => write!(f, "Action"),
            Capability::Form(_) => write!(f, "Form"),
            Capability::Plain => write!(f, "Plain"),
        }
    }
}

/// Action declaration metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionMarker {
    /// Regex the request path must fully match
    pub url_pattern: String,
    /// Logical name of the paired form
    pub form_name: String,
}

/// Form declaration metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormMarker {
    /// Logical name actions refer to
    pub name: String,
}

/// One catalog type.
#[derive(Debug, Clone)]
pub struct TypeEntry {
    pub type_name: String,
    pub capability: Capability,
    pub action_marker: Option<ActionMarker>,
    pub form_marker: Option<FormMarker>,
}

fn construct_action<A: Action + Default + 'static>() -> Box<dyn Action> {
    Box::new(A::default())
}

fn construct_form<F: Form + Default + 'static>() -> Box<dyn Form> {
    Box::new(F::default())
}

impl TypeEntry {
    #[must_use]
    pub fn action<A: Action + Default + 'static>(type_name: impl Into<String>) -> Self {
        Self::with_capability(type_name, Capability::Action(construct_action::<A>))
    }

    #[must_use]
    pub fn form<F: Form + Default + 'static>(type_name: impl Into<String>) -> Self {
        Self::with_capability(type_name, Capability::Form(construct_form::<F>))
    }

    #[must_use]
    pub fn plain(type_name: impl Into<String>) -> Self {
        Self::with_capability(type_name, Capability::Plain)
    }

    #[must_use]
    pub fn with_capability(type_name: impl Into<String>, capability: Capability) -> Self {
        Self {
            type_name: type_name.into(),
            capability,
            action_marker: None,
            form_marker: None,
        }
    }

    #[must_use]
    pub fn with_action_marker(
        mut self,
        url_pattern: impl Into<String>,
        form_name: impl Into<String>,
    ) -> Self {
        self.action_marker = Some(ActionMarker {
            url_pattern: url_pattern.into(),
            form_name: form_name.into(),
        });
        self
    }

    #[must_use]
    pub fn with_form_marker(mut self, name: impl Into<String>) -> Self {
        self.form_marker = Some(FormMarker { name: name.into() });
        self
    }

    /// Namespace part of the type name (`""` for undotted names)
    #[must_use]
    pub fn namespace(&self) -> &str {
        self.type_name
            .rsplit_once('.')
            .map_or("", |(namespace, _)| namespace)
    }

    /// Whether the type lives in `namespace` or one nested below it.
    #[must_use]
    pub fn is_under(&self, namespace: &str) -> bool {
        let own = self.namespace();
        own == namespace
            || (own.len() > namespace.len()
                && own.starts_with(namespace)
                && own.as_bytes()[namespace.len()] == b'.')
    }
}

/// Registry of the application's types, in registration order.
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    entries: Vec<TypeEntry>,
    index: HashMap<String, usize>,
    namespaces: BTreeSet<String>,
}

impl TypeCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a type. Registering a name again replaces the previous entry in
    /// place.
    pub fn register(&mut self, entry: TypeEntry) -> &mut Self {
        self.add_namespace(entry.namespace().to_string());
        match self.index.get(&entry.type_name) {
            Some(&i) => self.entries[i] = entry,
            None => {
                self.index.insert(entry.type_name.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
        self
    }

    /// Declare a namespace that exists but may hold no types.
    pub fn register_namespace(&mut self, namespace: impl Into<String>) -> &mut Self {
        self.add_namespace(namespace.into());
        self
    }

    fn add_namespace(&mut self, namespace: String) {
        let mut current = namespace.as_str();
        while !current.is_empty() {
            self.namespaces.insert(current.to_string());
            current = current.rsplit_once('.').map_or("", |(parent, _)| parent);
        }
    }

    #[must_use]
    pub fn get(&self, type_name: &str) -> Option<&TypeEntry> {
        self.index.get(type_name).map(|&i| &self.entries[i])
    }

    #[must_use]
    pub fn contains(&self, type_name: &str) -> bool {
        self.index.contains_key(type_name)
    }

    /// Whether `namespace` is known, either declared or implied by a type name.
    #[must_use]
    pub fn namespace_exists(&self, namespace: &str) -> bool {
        self.namespaces.contains(namespace)
    }

    /// Types under `namespace` (nested namespaces included), in registration order.
    pub fn types_in<'a>(&'a self, namespace: &'a str) -> impl Iterator<Item = &'a TypeEntry> + 'a {
        self.entries.iter().filter(move |e| e.is_under(namespace))
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
