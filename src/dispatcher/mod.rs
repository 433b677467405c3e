//! # Dispatcher Module
//!
//! The front controller: takes one request through route lookup, form
//! binding, validation and action execution.
//!
//! ## Request Flow
//!
//! 1. Router matches the request path -> action and form type names
//! 2. Both types are checked against the catalog
//! 3. The session's form is acquired, reset and bound from the request
//!    parameters, then published under [`FORM_ATTRIBUTE`]
//! 4. The form validates itself
//! 5. The session's action runs and names a forward target
//!
//! ## Error Handling
//!
//! Failures never escape [`Dispatcher::dispatch`]:
//! - Unknown paths, unresolvable types, binding failures and invalid forms
//!   forward back to the referrer with a message under [`MESSAGE_ATTRIBUTE`]
//! - Without a referrer the response becomes a 400
//! - A failing forwarder turns the response into a 500

mod core;

pub use self::core::{
    referrer_target, DispatchOutcome, Dispatcher, MissingTypes, ACTION_NOT_FOUND_MESSAGE,
    FILL_ALL_FIELDS_MESSAGE, FORM_ATTRIBUTE, MESSAGE_ATTRIBUTE,
};
