//! Tests for name-based form binding
//!
//! # Test Coverage
//!
//! - Parameter names resolved to declared fields and conventional setters
//! - Recorded failures (`FieldNotFound`, `SetterNotFound`, `InvocationFailed`)
//!   leave the other fields bound
//! - `AccessDenied` aborts the pass
//! - First value of a multi-valued parameter wins

mod common;

use actionroute::binder::{BindError, Bindable, Binder};
use actionroute::server::Parameters;
use common::fixtures::{LoginForm, SecretForm, LOGIN_FORM, SECRET_FORM};

fn params(pairs: &[(&str, &str)]) -> Parameters {
    pairs.iter().copied().collect()
}

#[test]
fn test_binds_declared_fields() {
    let mut form = LoginForm::default();
    let report = Binder::new()
        .populate(
            &mut form,
            &params(&[("user", "ada"), ("password", "lovelace"), ("age", "36"), ("remember", "on")]),
        )
        .unwrap();

    assert!(report.is_clean());
    assert_eq!(report.bound, ["user", "password", "age", "remember"]);
    assert_eq!(form.user, "ada");
    assert_eq!(form.age, Some(36));
    assert!(form.remember);
}

#[test]
fn test_unknown_field_does_not_stop_binding() {
    let mut form = LoginForm::default();
    let report = Binder::new()
        .populate(&mut form, &params(&[("user", "ada"), ("colour", "red"), ("password", "x")]))
        .unwrap();

    assert_eq!(
        report.failures,
        [BindError::FieldNotFound {
            form: LOGIN_FORM.to_string(),
            field: "colour".to_string(),
        }]
    );
    assert_eq!(form.user, "ada");
    assert_eq!(form.password, "x");
    assert!(report.summary().contains("colour"));
}

#[test]
fn test_field_without_setter() {
    let mut form = LoginForm::default();
    let report = Binder::new()
        .populate(&mut form, &params(&[("nickname", "countess")]))
        .unwrap();
    assert_eq!(
        report.failures,
        [BindError::SetterNotFound {
            form: LOGIN_FORM.to_string(),
            field: "nickname".to_string(),
            setter: "setNickname".to_string(),
        }]
    );
    assert!(form.nickname.is_empty());
}

#[test]
fn test_setter_of_wrong_kind_is_not_found() {
    let mut form = SecretForm::default();
    let report = Binder::new().populate(&mut form, &params(&[("count", "3")])).unwrap();
    assert!(matches!(
        report.failures.as_slice(),
        [BindError::SetterNotFound { setter, .. }] if setter == "setCount"
    ));
}

#[test]
fn test_conversion_failure_is_recorded() {
    let mut form = LoginForm::default();
    let report = Binder::new()
        .populate(&mut form, &params(&[("age", "old"), ("user", "ada")]))
        .unwrap();

    match report.failures.as_slice() {
        [BindError::InvocationFailed { field, setter, reason, .. }] => {
            assert_eq!(field, "age");
            assert_eq!(setter, "setAge");
            assert!(reason.contains("old"));
        }
        other => panic!("Expected one InvocationFailed, got {other:?}"),
    }
    assert_eq!(form.age, None);
    assert_eq!(form.user, "ada");
}

#[test]
fn test_access_denied_aborts() {
    let mut form = SecretForm::default();
    let err = Binder::new()
        .populate(&mut form, &params(&[("label", "kept"), ("token", "t"), ("label", "late")]))
        .unwrap_err();
    assert_eq!(
        err,
        BindError::AccessDenied {
            form: SECRET_FORM.to_string(),
            field: "token".to_string(),
        }
    );
    // Fields bound before the restricted one keep their value.
    assert_eq!(form.label, "kept");
}

#[test]
fn test_first_value_wins() {
    let mut form = LoginForm::default();
    let parameters = Parameters::from_urlencoded("user=first&user=second&password=p%26w");
    Binder::new().populate(&mut form, &parameters).unwrap();
    assert_eq!(form.user, "first");
    assert_eq!(form.password, "p&w");
}

#[test]
fn test_empty_value_clears_optional_field() {
    let mut form = LoginForm {
        age: Some(40),
        ..LoginForm::default()
    };
    Binder::new().populate(&mut form, &params(&[("age", "")])).unwrap();
    assert_eq!(form.age, None);
}

#[test]
fn test_field_values_render_for_views() {
    let mut form = LoginForm::default();
    Binder::new()
        .populate(&mut form, &params(&[("user", "ada"), ("age", "36")]))
        .unwrap();
    assert_eq!(form.field_value("user").as_deref(), Some("ada"));
    assert_eq!(form.field_value("age").as_deref(), Some("36"));
    assert_eq!(form.field_value("remember").as_deref(), Some("false"));
    assert_eq!(form.field_value("missing"), None);
    assert_eq!(form.type_name(), LOGIN_FORM);
}
