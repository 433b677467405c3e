//! # actionroute
//!
//! **actionroute** is a small front-controller MVC engine: each request path is matched
//! against a route table, a session-held form is bound from the request parameters and
//! validated, and the paired action runs and names the view to forward to.
//!
//! ## Overview
//!
//! The HTTP transport stays outside the crate. A host server hands each request to the
//! [`Dispatcher`](dispatcher::Dispatcher) as an [`ActionRequest`](server::ActionRequest)
//! and performs the forward through its own [`Forwarder`](server::Forwarder).
//!
//! ## Architecture
//!
//! - **[`catalog`]** - The application's action and form types, with their declaration markers
//! - **[`config`]** - Route resolution from scanned markers or the legacy declaration file
//! - **[`router`]** - Ordered, full-match path matching
//! - **[`registry`]** - One action and form instance per type per session
//! - **[`binder`]** - Name-based binding of request parameters onto forms
//! - **[`dispatcher`]** - The per-request flow
//! - **[`server`]** - Request, response, session and forwarder interfaces
//! - **[`logging`]** - `tracing` subscriber setup
//! - **[`cli`]** - Command-line route inspection
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Host as Host server
//!     participant Dispatcher
//!     participant Router as RouteTable
//!     participant Registry as InstanceRegistry
//!     participant Binder
//!     participant Form
//!     participant Action
//!
//!     Host->>Dispatcher: dispatch(request, response)
//!     Dispatcher->>Router: match_path("/login.do")
//!     Router-->>Dispatcher: (LoginAction, LoginForm)
//!     Dispatcher->>Registry: get_or_create_form(session, LoginForm)
//!     Dispatcher->>Form: reset(request)
//!     Dispatcher->>Binder: populate(form, parameters)
//!     Dispatcher->>Form: validate(request)
//!     alt Invalid
//!         Dispatcher-->>Host: forward(referrer, "please fill in all fields")
//!     else Valid
//!         Dispatcher->>Registry: get_or_create_action(session, LoginAction)
//!         Dispatcher->>Action: execute(request, response)
//!         Action-->>Dispatcher: Forward::To("/welcome.jsp")
//!         Dispatcher-->>Host: forward("/welcome.jsp")
//!     end
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use actionroute::action::{Action, Form, Forward};
//! use actionroute::bindable_form;
//! use actionroute::catalog::{TypeCatalog, TypeEntry};
//! use actionroute::dispatcher::{DispatchOutcome, Dispatcher};
//! use actionroute::registry::InstanceRegistry;
//! use actionroute::router::{RouteEntry, RouteTable};
//! use actionroute::server::{
//!     ActionRequest, ActionResponse, InMemorySession, Parameters, RecordingForwarder,
//! };
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct LoginForm { user: String }
//! impl LoginForm { fn set_user(&mut self, user: String) { self.user = user; } }
//! bindable_form! { LoginForm as "shop.LoginForm" { user: Text => "setUser" set_user } }
//! impl Form for LoginForm {
//!     fn validate(&self, _: &ActionRequest) -> bool { !self.user.is_empty() }
//! }
//!
//! #[derive(Default)]
//! struct LoginAction;
//! impl Action for LoginAction {
//!     fn execute(&mut self, _: &ActionRequest, _: &mut ActionResponse) -> Forward {
//!         Forward::to("/welcome.jsp")
//!     }
//! }
//!
//! let mut catalog = TypeCatalog::new();
//! catalog
//!     .register(TypeEntry::action::<LoginAction>("shop.LoginAction"))
//!     .register(TypeEntry::form::<LoginForm>("shop.LoginForm"));
//! let routes = RouteTable::new(vec![
//!     RouteEntry::new(r"/login\.do", "shop.LoginAction", "shop.LoginForm"),
//! ]).unwrap();
//!
//! let forwarder = Arc::new(RecordingForwarder::new());
//! let dispatcher = Dispatcher::new(
//!     Arc::new(routes),
//!     Arc::new(InstanceRegistry::new(Arc::new(catalog))),
//!     forwarder.clone(),
//! );
//!
//! let mut request = ActionRequest::new(http::Method::POST, "/login.do", Arc::new(InMemorySession::new()))
//!     .with_parameters(Parameters::from_urlencoded("user=ada"));
//! let outcome = dispatcher.dispatch(&mut request, &mut ActionResponse::new());
//! assert_eq!(outcome, DispatchOutcome::Forwarded { target: "/welcome.jsp".into() });
//! ```

pub mod action;
pub mod binder;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod ids;
pub mod logging;
pub mod registry;
pub mod router;
pub mod runtime_config;
pub mod server;

pub use action::{Action, Form, Forward};
pub use binder::{Bindable, BindError, BindReport, Binder};
pub use catalog::{TypeCatalog, TypeEntry};
pub use config::{ConfigError, RouteCache, RouteResolver};
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use registry::{InstanceRegistry, TypeResolutionError};
pub use router::{RouteEntry, RouteMatch, RouteTable};
pub use runtime_config::RuntimeConfig;
