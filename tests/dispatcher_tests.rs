//! Tests for the front-controller request flow
//!
//! # Test Coverage
//!
//! Validates every terminal state of a dispatched request:
//! - Success: form bound and valid, action forwarded to its target
//! - Invalid form: forwarded back with "please fill in all fields"
//! - Unknown path: forwarded back with "action not found"
//! - Unresolvable route types: message naming the missing side(s)
//! - Binding failures: forwarded back with the failure text
//! - Missing or host-only referrer: 400 without forwarding
//! - Self-handled responses and failing forwarders
//!
//! # Test Strategy
//!
//! Requests go through a [`RecordingForwarder`], so each test asserts the
//! forward target and the message published for the view.

mod common;

use actionroute::action::Form;
use actionroute::binder::Bindable;
use actionroute::dispatcher::{
    DispatchOutcome, Dispatcher, MissingTypes, ACTION_NOT_FOUND_MESSAGE, FILL_ALL_FIELDS_MESSAGE,
    FORM_ATTRIBUTE, MESSAGE_ATTRIBUTE,
};
use actionroute::registry::InstanceRegistry;
use actionroute::router::{RouteEntry, RouteTable};
use actionroute::server::{
    ActionRequest, ActionResponse, ForwardRecord, Forwarder, InMemorySession, Parameters,
    RecordingForwarder, Session,
};
use common::fixtures::{self, LOGIN_ACTION, LOGIN_FORM, RAW_ACTION, SECRET_FORM};
use common::forwarders::FailingForwarder;
use http::Method;
use std::sync::atomic::Ordering;
use std::sync::Arc;

const REFERRER: &str = "http://localhost:8080/shop/login.jsp";

fn routes() -> RouteTable {
    RouteTable::new(vec![
        RouteEntry::new(r"/login\.do", LOGIN_ACTION, LOGIN_FORM),
        RouteEntry::new(r"/raw\.do", RAW_ACTION, SECRET_FORM),
        RouteEntry::new(r"/secret\.do", LOGIN_ACTION, SECRET_FORM),
        RouteEntry::new(r"/ghost-form\.do", LOGIN_ACTION, "shop.web.GhostForm"),
        RouteEntry::new(r"/ghost-action\.do", "shop.web.GhostAction", LOGIN_FORM),
        RouteEntry::new(r"/ghosts\.do", "shop.web.GhostAction", "shop.web.GhostForm"),
    ])
    .unwrap()
}

struct Harness {
    dispatcher: Dispatcher,
    forwarder: Arc<RecordingForwarder>,
}

impl Harness {
    fn new() -> Self {
        let forwarder = Arc::new(RecordingForwarder::new());
        let registry = Arc::new(InstanceRegistry::new(Arc::new(fixtures::catalog())));
        let dispatcher = Dispatcher::new(
            Arc::new(routes()),
            registry,
            Arc::clone(&forwarder) as Arc<dyn Forwarder>,
        );
        Self {
            dispatcher,
            forwarder,
        }
    }

    fn dispatch(&self, request: &mut ActionRequest) -> (DispatchOutcome, ActionResponse) {
        let mut response = ActionResponse::new();
        let outcome = self.dispatcher.dispatch(request, &mut response);
        (outcome, response)
    }
}

fn post(session: &Arc<dyn Session>, path: &str, body: &str) -> ActionRequest {
    ActionRequest::new(Method::POST, path, Arc::clone(session))
        .with_parameters(Parameters::from_urlencoded(body))
        .with_header("Referer", REFERRER)
}

fn session() -> Arc<dyn Session> {
    Arc::new(InMemorySession::new())
}

#[test]
fn test_login_success_forwards_to_welcome() {
    let harness = Harness::new();
    let mut request = post(&session(), "/login.do", "user=ada&password=lovelace");
    let (outcome, response) = harness.dispatch(&mut request);

    assert_eq!(
        outcome,
        DispatchOutcome::Forwarded {
            target: "/welcome.jsp".to_string()
        }
    );
    assert_eq!(
        harness.forwarder.records(),
        [ForwardRecord {
            target: "/welcome.jsp".to_string(),
            message: None,
        }]
    );
    assert_eq!(response.get_header("x-login-runs"), Some("1"));
}

#[test]
fn test_empty_parameters_ask_to_fill_all_fields() {
    let harness = Harness::new();
    let mut request = post(&session(), "/login.do", "");
    let (outcome, _) = harness.dispatch(&mut request);

    assert_eq!(
        outcome,
        DispatchOutcome::Invalid {
            target: "/login.jsp".to_string()
        }
    );
    let record = harness.forwarder.last().unwrap();
    assert_eq!(record.target, "/login.jsp");
    assert_eq!(record.message.as_deref(), Some(FILL_ALL_FIELDS_MESSAGE));
    assert_eq!(FILL_ALL_FIELDS_MESSAGE, "please fill in all fields");
}

#[test]
fn test_unknown_path_reports_action_not_found() {
    let harness = Harness::new();
    let mut request = post(&session(), "/nowhere.do", "user=ada");
    let (outcome, _) = harness.dispatch(&mut request);

    assert_eq!(
        outcome,
        DispatchOutcome::NotFound {
            target: "/login.jsp".to_string()
        }
    );
    assert_eq!(
        request.text_attribute(MESSAGE_ATTRIBUTE),
        Some(ACTION_NOT_FOUND_MESSAGE)
    );
    assert_eq!(
        harness.forwarder.last().unwrap().message.as_deref(),
        Some("action not found")
    );
}

#[test]
fn test_missing_classes_name_the_missing_side() {
    let harness = Harness::new();
    let cases = [
        ("/ghost-form.do", MissingTypes::Form("shop.web.GhostForm".to_string())),
        ("/ghost-action.do", MissingTypes::Action("shop.web.GhostAction".to_string())),
        (
            "/ghosts.do",
            MissingTypes::Both {
                action: "shop.web.GhostAction".to_string(),
                form: "shop.web.GhostForm".to_string(),
            },
        ),
    ];

    for (path, expected) in cases {
        let mut request = post(&session(), path, "user=ada&password=x");
        let (outcome, _) = harness.dispatch(&mut request);
        let message = expected.to_string();
        assert_eq!(
            outcome,
            DispatchOutcome::MissingClasses {
                target: "/login.jsp".to_string(),
                missing: expected,
            },
            "{path}"
        );
        assert_eq!(harness.forwarder.last().unwrap().message, Some(message));
    }

    let form_only = harness.forwarder.records()[0].message.clone().unwrap();
    assert!(form_only.contains("GhostForm") && !form_only.contains("GhostAction"));
}

#[test]
fn test_bind_failure_forwards_back_without_running_action() {
    let harness = Harness::new();
    let session = session();
    let mut request = post(&session, "/login.do", "user=ada&password=x&colour=red");
    let (outcome, response) = harness.dispatch(&mut request);

    match outcome {
        DispatchOutcome::BindFailed { target, message } => {
            assert_eq!(target, "/login.jsp");
            assert!(message.contains("colour"), "{message}");
        }
        other => panic!("Expected BindFailed, got {other:?}"),
    }
    assert_eq!(response.get_header("x-login-runs"), None);
    assert!(session.attribute(LOGIN_ACTION).is_none());
}

#[test]
fn test_access_denied_forwards_back() {
    let harness = Harness::new();
    let mut request = post(&session(), "/secret.do", "token=t");
    let (outcome, _) = harness.dispatch(&mut request);
    assert!(matches!(outcome, DispatchOutcome::BindFailed { .. }));
    let message = harness.forwarder.last().unwrap().message.unwrap();
    assert!(message.contains("forbidden"), "{message}");
}

#[test]
fn test_missing_referrer_is_bad_request() {
    let harness = Harness::new();
    let mut request = ActionRequest::new(Method::GET, "/nowhere.do", session());
    let (outcome, response) = harness.dispatch(&mut request);

    assert!(matches!(outcome, DispatchOutcome::BadRequest { .. }));
    assert_eq!(response.status, 400);
    assert!(response.body.contains(ACTION_NOT_FOUND_MESSAGE));
    assert!(harness.forwarder.records().is_empty());
}

#[test]
fn test_handled_response_is_not_forwarded() {
    let harness = Harness::new();
    let mut request = post(&session(), "/raw.do", "label=x");
    let (outcome, response) = harness.dispatch(&mut request);

    assert_eq!(outcome, DispatchOutcome::Handled);
    assert_eq!(response.body, "raw");
    assert!(harness.forwarder.records().is_empty());
}

#[test]
fn test_bound_form_is_published_for_the_view() {
    let harness = Harness::new();
    let mut request = post(&session(), "/login.do", "user=ada");
    harness.dispatch(&mut request);

    let form = request.form_attribute(FORM_ATTRIBUTE).unwrap();
    let form = form.lock();
    assert_eq!(form.type_name(), LOGIN_FORM);
    assert_eq!(form.field_value("user").as_deref(), Some("ada"));
    assert!(!form.validate(&request));
}

#[test]
fn test_session_form_keeps_values_and_resets_checkbox() {
    let harness = Harness::new();
    let session = session();

    let mut first = post(&session, "/login.do", "user=ada&remember=on");
    assert!(matches!(harness.dispatch(&mut first).0, DispatchOutcome::Invalid { .. }));

    // The user stays bound from the first request; `remember` is reset.
    let mut second = post(&session, "/login.do", "password=lovelace");
    let (outcome, _) = harness.dispatch(&mut second);
    assert!(matches!(outcome, DispatchOutcome::Forwarded { .. }));

    let form = second.form_attribute(FORM_ATTRIBUTE).unwrap().lock();
    assert_eq!(form.field_value("user").as_deref(), Some("ada"));
    assert_eq!(form.field_value("remember").as_deref(), Some("false"));
}

#[test]
fn test_action_instance_is_per_session() {
    let harness = Harness::new();
    let alice = session();
    let bob = session();

    for _ in 0..2 {
        harness.dispatch(&mut post(&alice, "/login.do", "user=a&password=p"));
    }
    let (_, alice_third) = harness.dispatch(&mut post(&alice, "/login.do", "user=a&password=p"));
    let (_, bob_first) = harness.dispatch(&mut post(&bob, "/login.do", "user=b&password=p"));

    assert_eq!(alice_third.get_header("x-login-runs"), Some("3"));
    assert_eq!(bob_first.get_header("x-login-runs"), Some("1"));
}

#[test]
fn test_forwarder_failure_becomes_500() {
    let forwarder = Arc::new(FailingForwarder::default());
    let dispatcher = Dispatcher::new(
        Arc::new(routes()),
        Arc::new(InstanceRegistry::new(Arc::new(fixtures::catalog()))),
        Arc::clone(&forwarder) as Arc<dyn Forwarder>,
    );
    let mut request = post(&session(), "/login.do", "user=ada&password=x");
    let mut response = ActionResponse::new();
    let outcome = dispatcher.dispatch(&mut request, &mut response);

    assert_eq!(
        outcome,
        DispatchOutcome::ForwardFailed {
            target: "/welcome.jsp".to_string()
        }
    );
    assert_eq!(response.status, 500);
    assert_eq!(forwarder.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_referrer_fallback_uses_last_segment() {
    let harness = Harness::new();
    let mut request = ActionRequest::new(Method::GET, "/nowhere.do", session())
        .with_header("referer", "http://localhost/app/forms/");
    harness.dispatch(&mut request);
    assert_eq!(harness.forwarder.last().unwrap().target, "/forms");
}

#[test]
fn test_host_only_referrer_is_bad_request() {
    let harness = Harness::new();
    let mut request = ActionRequest::new(Method::GET, "/nope.do", session())
        .with_header("Referer", "http://localhost:8080/");
    let (outcome, response) = harness.dispatch(&mut request);

    assert!(matches!(outcome, DispatchOutcome::BadRequest { .. }));
    assert_eq!(response.status, 400);
    assert!(harness.forwarder.records().is_empty());
}

#[test]
fn test_referrer_query_is_not_forwarded() {
    let harness = Harness::new();
    let mut request = ActionRequest::new(Method::GET, "/nope.do", session())
        .with_header("Referer", "http://localhost:8080/shop/login.jsp?err=1");
    let (outcome, _) = harness.dispatch(&mut request);
    assert_eq!(
        outcome,
        DispatchOutcome::NotFound {
            target: "/login.jsp".to_string()
        }
    );
}
