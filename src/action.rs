//! User-facing archetypes: [`Action`] handlers and the [`Form`]s they are
//! paired with.

use crate::binder::Bindable;
use crate::server::{ActionRequest, ActionResponse};

/// Where control goes after an action ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Forward {
    /// Forward to the given resource path (e.g. `/welcome.jsp`)
    To(String),
    /// The action already wrote the complete response; no forward happens
    Handled,
}

impl Forward {
    #[must_use]
    pub fn to(target: impl Into<String>) -> Self {
        Forward::To(target.into())
    }
}

/// Request handler selected by the route table.
///
/// One instance lives per session and is reused across that session's
/// requests, so `execute` may keep per-client state in `self`.
pub trait Action: Send {
    fn execute(&mut self, request: &ActionRequest, response: &mut ActionResponse) -> Forward;
}

/// Data holder bound from request parameters before its action runs.
///
/// Like actions, forms are cached per session: values bound by an earlier
/// request stay in place unless a later request overwrites them or
/// [`reset`](Form::reset) clears them.
pub trait Form: Bindable + Send {
    /// Whether the bound values allow the action to run.
    ///
    /// The default rejects everything; forms are expected to override it.
    fn validate(&self, _request: &ActionRequest) -> bool {
        false
    }

    /// Called before every binding pass. Unchecked checkboxes are not
    /// submitted, so boolean fields of session-held forms belong here.
    fn reset(&mut self, _request: &ActionRequest) {}
}
