//! Dispatcher core module - one request from route lookup to forward.

use crate::action::{Form, Forward};
use crate::binder::{Bindable, Binder};
use crate::config::{ConfigError, RouteCache};
use crate::registry::{InstanceKind, InstanceRegistry, SharedForm};
use crate::router::{RouteMatch, RouteTable};
use crate::server::{ActionRequest, ActionResponse, Forwarder, RequestAttribute};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, info_span, warn};
use url::Url;

/// Message forwarded when no route matches the request path
pub const ACTION_NOT_FOUND_MESSAGE: &str = "action not found";
/// Message forwarded when the form rejects its bound values
pub const FILL_ALL_FIELDS_MESSAGE: &str = "please fill in all fields";
/// Request attribute holding the bound form
pub const FORM_ATTRIBUTE: &str = "form";
/// Request attribute holding the message of a failed request
pub const MESSAGE_ATTRIBUTE: &str = "message";

/// Which of a route's two types could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingTypes {
    Form(String),
    Action(String),
    Both { action: String, form: String },
}

impl fmt::Display for MissingTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingTypes::Form(form) => write!(f, "The form class {} cannot be found", form),
            MissingTypes::Action(action) => {
                write!(f, "The action class {} cannot be found", action)
            }
            MissingTypes::Both { action, form } => write!(
                f,
                "The action class {} and the form class {} cannot be found",
                action, form
            ),
        }
    }
}

/// How a dispatched request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The action ran and its target was forwarded to
    Forwarded { target: String },
    /// The action wrote the response itself
    Handled,
    /// No route matched; forwarded back with [`ACTION_NOT_FOUND_MESSAGE`]
    NotFound { target: String },
    /// The route names types the catalog cannot construct
    MissingClasses { target: String, missing: MissingTypes },
    /// Binding failed; forwarded back with the failure text
    BindFailed { target: String, message: String },
    /// The form rejected its values; forwarded back with [`FILL_ALL_FIELDS_MESSAGE`]
    Invalid { target: String },
    /// The request had to go back but carried no referrer; answered with 400
    BadRequest { reason: String },
    /// The forwarder failed; answered with 500
    ForwardFailed { target: String },
}

impl DispatchOutcome {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            DispatchOutcome::Forwarded { .. } => "forwarded",
            DispatchOutcome::Handled => "handled",
            DispatchOutcome::NotFound { .. } => "not_found",
            DispatchOutcome::MissingClasses { .. } => "missing_classes",
            DispatchOutcome::BindFailed { .. } => "bind_failed",
            DispatchOutcome::Invalid { .. } => "invalid",
            DispatchOutcome::BadRequest { .. } => "bad_request",
            DispatchOutcome::ForwardFailed { .. } => "forward_failed",
        }
    }

    /// Forward target, for the outcomes that invoked the forwarder.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        match self {
            DispatchOutcome::Forwarded { target }
            | DispatchOutcome::NotFound { target }
            | DispatchOutcome::MissingClasses { target, .. }
            | DispatchOutcome::BindFailed { target, .. }
            | DispatchOutcome::Invalid { target }
            | DispatchOutcome::ForwardFailed { target } => Some(target),
            DispatchOutcome::Handled | DispatchOutcome::BadRequest { .. } => None,
        }
    }
}

/// Path a failed request is sent back to: `/` plus the last non-empty
/// segment of the referrer's path.
///
/// Absolute referrers are parsed as URLs and only their path is used. A
/// referrer without a path segment (`http://host/`) has no target.
#[must_use]
pub fn referrer_target(referrer: &str) -> Option<String> {
    let last = match Url::parse(referrer) {
        Ok(url) => url
            .path_segments()?
            .rfind(|segment| !segment.is_empty())
            .map(str::to_string),
        Err(_) => referrer
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .split('/')
            .rfind(|segment| !segment.is_empty())
            .map(str::to_string),
    };
    last.map(|segment| format!("/{segment}"))
}

/// Front controller: runs exactly one action per request.
pub struct Dispatcher {
    routes: Arc<RouteTable>,
    registry: Arc<InstanceRegistry>,
    binder: Binder,
    forwarder: Arc<dyn Forwarder>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(
        routes: Arc<RouteTable>,
        registry: Arc<InstanceRegistry>,
        forwarder: Arc<dyn Forwarder>,
    ) -> Self {
        info!(routes_count = routes.len(), "Dispatcher created");
        Self {
            routes,
            registry,
            binder: Binder::new(),
            forwarder,
        }
    }

    /// Build a dispatcher over the cached route table.
    ///
    /// # Errors
    ///
    /// The [`ConfigError`] of a failed first resolution.
    pub fn from_cache(
        cache: &RouteCache,
        registry: Arc<InstanceRegistry>,
        forwarder: Arc<dyn Forwarder>,
    ) -> Result<Self, ConfigError> {
        Ok(Self::new(cache.table()?, registry, forwarder))
    }

    #[must_use]
    pub fn routes(&self) -> &Arc<RouteTable> {
        &self.routes
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<InstanceRegistry> {
        &self.registry
    }

    /// Handle one request. Never fails: every error ends in a forward with a
    /// message or in a 400/500 response.
    pub fn dispatch(
        &self,
        request: &mut ActionRequest,
        response: &mut ActionResponse,
    ) -> DispatchOutcome {
        let span = info_span!(
            "dispatch",
            request_id = %request.request_id,
            method = %request.method,
            path = %request.path
        );
        let _enter = span.enter();
        let start = Instant::now();

        let outcome = self.run(request, response);

        info!(
            outcome = outcome.label(),
            target = outcome.target().unwrap_or_default(),
            status = response.status,
            duration_us = start.elapsed().as_micros(),
            "Request dispatched"
        );
        outcome
    }

    fn run(&self, request: &mut ActionRequest, response: &mut ActionResponse) -> DispatchOutcome {
        let Some(route) = self.routes.match_path(&request.path) else {
            return self.send_back(request, response, ACTION_NOT_FOUND_MESSAGE.to_string(), |target| {
                DispatchOutcome::NotFound { target }
            });
        };

        if let Some(missing) = self.missing_types(&route) {
            warn!(missing = %missing, route_pattern = %route.pattern(), "Route types cannot be resolved");
            return self.send_back(request, response, missing.to_string(), |target| {
                DispatchOutcome::MissingClasses { target, missing }
            });
        }

        let session = Arc::clone(request.session());
        let form = match self.registry.get_or_create_form(session.as_ref(), route.form_type()) {
            Ok(form) => form,
            Err(e) => {
                let missing = MissingTypes::Form(e.type_name().to_string());
                return self.send_back(request, response, missing.to_string(), |target| {
                    DispatchOutcome::MissingClasses { target, missing }
                });
            }
        };
        request.set_attribute(FORM_ATTRIBUTE, RequestAttribute::Form(Arc::clone(&form)));

        match self.bind_and_validate(&form, request) {
            Ok(true) => {}
            Ok(false) => {
                debug!(form_type = %route.form_type(), "Form rejected its values");
                return self.send_back(request, response, FILL_ALL_FIELDS_MESSAGE.to_string(), |target| {
                    DispatchOutcome::Invalid { target }
                });
            }
            Err(message) => {
                let forwarded = message.clone();
                return self.send_back(request, response, forwarded, |target| {
                    DispatchOutcome::BindFailed { target, message }
                });
            }
        }

        let action = match self
            .registry
            .get_or_create_action(session.as_ref(), route.action_type())
        {
            Ok(action) => action,
            Err(e) => {
                let missing = MissingTypes::Action(e.type_name().to_string());
                return self.send_back(request, response, missing.to_string(), |target| {
                    DispatchOutcome::MissingClasses { target, missing }
                });
            }
        };

        let forward = action.lock().execute(request, response);
        match forward {
            Forward::To(target) => self.forward(target, request, response, |target| {
                DispatchOutcome::Forwarded { target }
            }),
            Forward::Handled => DispatchOutcome::Handled,
        }
    }

    fn missing_types(&self, route: &RouteMatch) -> Option<MissingTypes> {
        let action_ok = self
            .registry
            .is_resolvable(route.action_type(), InstanceKind::Action);
        let form_ok = self
            .registry
            .is_resolvable(route.form_type(), InstanceKind::Form);
        match (action_ok, form_ok) {
            (true, true) => None,
            (true, false) => Some(MissingTypes::Form(route.form_type().to_string())),
            (false, true) => Some(MissingTypes::Action(route.action_type().to_string())),
            (false, false) => Some(MissingTypes::Both {
                action: route.action_type().to_string(),
                form: route.form_type().to_string(),
            }),
        }
    }

    /// Reset, bind and validate under one lock. `Err` carries the binding
    /// failure text.
    fn bind_and_validate(&self, form: &SharedForm, request: &ActionRequest) -> Result<bool, String> {
        let mut guard = form.lock();
        guard.reset(request);
        match self.binder.populate(&mut **guard, &request.parameters) {
            Ok(report) if report.is_clean() => {
                debug!(form = guard.type_name(), bound = ?report.bound, "Form bound");
                Ok(guard.validate(request))
            }
            Ok(report) => Err(report.summary()),
            Err(e) => Err(e.to_string()),
        }
    }

    /// Forward back to the referrer with `message`, or answer 400 when
    /// there is no referrer.
    fn send_back<F>(
        &self,
        request: &mut ActionRequest,
        response: &mut ActionResponse,
        message: String,
        outcome: F,
    ) -> DispatchOutcome
    where
        F: FnOnce(String) -> DispatchOutcome,
    {
        let Some(target) = request.referrer().and_then(referrer_target) else {
            let reason = format!("{message} (the request has no referrer to return to)");
            warn!(reason = %reason, "Bad request");
            response.text(400, &reason);
            return DispatchOutcome::BadRequest { reason };
        };
        request.set_attribute(MESSAGE_ATTRIBUTE, RequestAttribute::Text(message));
        self.forward(target, request, response, outcome)
    }

    fn forward<F>(
        &self,
        target: String,
        request: &ActionRequest,
        response: &mut ActionResponse,
        outcome: F,
    ) -> DispatchOutcome
    where
        F: FnOnce(String) -> DispatchOutcome,
    {
        match self.forwarder.forward(&target, request, response) {
            Ok(()) => outcome(target),
            Err(e) => {
                error!(target = %target, error = %e, "Forward failed");
                response.text(500, &format!("Cannot forward to {target}"));
                DispatchOutcome::ForwardFailed { target }
            }
        }
    }
}
