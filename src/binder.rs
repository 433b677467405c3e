//! # Form Binding
//!
//! Populates a form from the request's multi-valued parameter map by field
//! name. Forms describe themselves through [`Bindable`]: the fields they
//! declare, the setters each field exposes, and how to invoke a setter by
//! name. The [`bindable_form!`](crate::bindable_form) macro writes that
//! description for plain structs.
//!
//! ## Binding Rules
//!
//! For every submitted parameter name, in parameter order:
//!
//! 1. A field with exactly that name must exist, else [`BindError::FieldNotFound`].
//! 2. The field's metadata must be readable, else [`BindError::AccessDenied`],
//!    which aborts the whole call.
//! 3. A setter named `set` + the field name with its first letter upper-cased
//!    (`user` -> `setUser`) accepting the field's kind must exist, else
//!    [`BindError::SetterNotFound`].
//! 4. The setter receives the *first* submitted value; later values for the
//!    same name are ignored. A failing setter is recorded as
//!    [`BindError::InvocationFailed`].
//!
//! Failures other than `AccessDenied` are collected in the [`BindReport`]
//! and binding moves on to the next parameter.

use crate::server::Parameters;
use std::fmt;
use tracing::{debug, warn};

/// Value kind a field stores and a setter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Float,
    Boolean,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FieldKind::Text => "text",
            FieldKind::Integer => "integer",
            FieldKind::Float => "float",
            FieldKind::Boolean => "boolean",
        };
        write!(f, "{}", s)
    }
}

/// Whether the binder may read a field's metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldAccess {
    Open,
    Restricted,
}

/// A setter a form exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetterSpec {
    /// Conventional name, e.g. `setUser`
    pub name: &'static str,
    pub accepts: FieldKind,
}

/// A declared form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub access: FieldAccess,
    pub setters: &'static [SetterSpec],
}

impl FieldSpec {
    /// Open field with the given setters.
    #[must_use]
    pub const fn new(
        name: &'static str,
        kind: FieldKind,
        setters: &'static [SetterSpec],
    ) -> Self {
        Self {
            name,
            kind,
            access: FieldAccess::Open,
            setters,
        }
    }

    /// Field whose metadata the binder is not allowed to read.
    #[must_use]
    pub const fn restricted(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            access: FieldAccess::Restricted,
            setters: &[],
        }
    }

    fn setter(&self, name: &str) -> Option<&SetterSpec> {
        self.setters
            .iter()
            .find(|s| s.name == name && s.accepts == self.kind)
    }
}

/// A setter rejected its argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationError(pub String);

impl fmt::Display for InvocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for InvocationError {}

/// Name-based binding capability implemented by every form.
pub trait Bindable {
    /// Logical type name used in messages, e.g. `shop.forms.LoginForm`
    fn type_name(&self) -> &'static str;

    /// Fields declared by this form
    fn fields(&self) -> &'static [FieldSpec];

    /// Invoke the setter called `setter` with a raw parameter value.
    fn set_field(&mut self, setter: &str, value: &str) -> Result<(), InvocationError>;

    /// Current value of a field rendered as text, for pre-filling views.
    fn field_value(&self, name: &str) -> Option<String>;
}

/// Conversion from a raw parameter value into a setter argument.
pub trait FromParam: Sized {
    fn from_param(raw: &str) -> Result<Self, InvocationError>;
}

impl FromParam for String {
    fn from_param(raw: &str) -> Result<Self, InvocationError> {
        Ok(raw.to_string())
    }
}

impl FromParam for bool {
    fn from_param(raw: &str) -> Result<Self, InvocationError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "on" | "1" | "yes" => Ok(true),
            "false" | "off" | "0" | "no" | "" => Ok(false),
            other => Err(InvocationError(format!("'{}' is not a boolean", other))),
        }
    }
}

macro_rules! from_param_parse {
    ($($ty:ty => $what:literal),* $(,)?) => {
        $(
            impl FromParam for $ty {
                fn from_param(raw: &str) -> Result<Self, InvocationError> {
                    raw.trim().parse().map_err(|e| {
                        InvocationError(format!("'{}' is not {}: {}", raw, $what, e))
                    })
                }
            }
        )*
    };
}

from_param_parse! {
    i32 => "an integer",
    i64 => "an integer",
    u32 => "an unsigned integer",
    u64 => "an unsigned integer",
    f32 => "a number",
    f64 => "a number",
}

impl<T: FromParam> FromParam for Option<T> {
    fn from_param(raw: &str) -> Result<Self, InvocationError> {
        if raw.is_empty() {
            Ok(None)
        } else {
            T::from_param(raw).map(Some)
        }
    }
}

/// Rendering of a field value back into text.
pub trait ToParam {
    fn to_param(&self) -> String;
}

macro_rules! to_param_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ToParam for $ty {
                fn to_param(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

to_param_display!(String, bool, i32, i64, u32, u64, f32, f64);

impl<T: ToParam> ToParam for Option<T> {
    fn to_param(&self) -> String {
        self.as_ref().map(ToParam::to_param).unwrap_or_default()
    }
}

/// Binding failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// The parameter name matches no declared field
    FieldNotFound { form: String, field: String },
    /// The field exists but exposes no setter under the naming convention
    SetterNotFound {
        form: String,
        field: String,
        setter: String,
    },
    /// The field's metadata may not be read; aborts binding
    AccessDenied { form: String, field: String },
    /// The setter rejected the submitted value
    InvocationFailed {
        form: String,
        field: String,
        setter: String,
        reason: String,
    },
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindError::FieldNotFound { form, field } => write!(
                f,
                "The name '{}' provided to a form input has no matching field in the form {}",
                field, form
            ),
            BindError::SetterNotFound {
                form,
                field,
                setter,
            } => write!(
                f,
                "The form {} field '{}' has no setter named {}. \
                 The convention for a field named myField is a setter named setMyField",
                form, field, setter
            ),
            BindError::AccessDenied { form, field } => write!(
                f,
                "Access to the field '{}' of the form {} is forbidden",
                field, form
            ),
            BindError::InvocationFailed {
                form,
                field,
                setter,
                reason,
            } => write!(
                f,
                "The setter {} of the form {} rejected the value for '{}': {}",
                setter, form, field, reason
            ),
        }
    }
}

impl std::error::Error for BindError {}

/// Result of a completed (non-aborted) binding pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindReport {
    /// Fields whose setter ran successfully, in binding order
    pub bound: Vec<String>,
    /// Per-parameter failures, in binding order
    pub failures: Vec<BindError>,
}

impl BindReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// All failure messages, one per line.
    #[must_use]
    pub fn summary(&self) -> String {
        self.failures
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Conventional setter name for a field: `user` -> `setUser`.
#[must_use]
pub fn setter_name(field: &str) -> String {
    let mut chars = field.chars();
    let mut name = String::with_capacity(field.len() + 3);
    name.push_str("set");
    if let Some(first) = chars.next() {
        name.extend(first.to_uppercase());
        name.push_str(chars.as_str());
    }
    name
}

/// Populates forms from request parameters. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct Binder;

impl Binder {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Bind every parameter onto `target`.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::AccessDenied`] when a field's metadata may not be
    /// read; fields before it keep their new values. Every other failure is
    /// collected in the returned [`BindReport`].
    pub fn populate<B>(&self, target: &mut B, params: &Parameters) -> Result<BindReport, BindError>
    where
        B: Bindable + ?Sized,
    {
        let form = target.type_name();
        let fields = target.fields();
        let mut report = BindReport::default();

        for (name, values) in params.iter() {
            let Some(field) = fields.iter().find(|f| f.name == name) else {
                let err = BindError::FieldNotFound {
                    form: form.to_string(),
                    field: name.to_string(),
                };
                warn!(form = %form, field = %name, "Parameter has no matching form field");
                report.failures.push(err);
                continue;
            };

            if field.access == FieldAccess::Restricted {
                warn!(form = %form, field = %name, "Field access denied, binding aborted");
                return Err(BindError::AccessDenied {
                    form: form.to_string(),
                    field: name.to_string(),
                });
            }

            let setter = setter_name(field.name);
            if field.setter(&setter).is_none() {
                warn!(
                    form = %form,
                    field = %name,
                    setter = %setter,
                    kind = %field.kind,
                    "Field has no conventional setter"
                );
                report.failures.push(BindError::SetterNotFound {
                    form: form.to_string(),
                    field: name.to_string(),
                    setter,
                });
                continue;
            }

            let value = values.first().map(String::as_str).unwrap_or_default();
            match target.set_field(&setter, value) {
                Ok(()) => {
                    debug!(form = %form, field = %name, setter = %setter, "Field bound");
                    report.bound.push(name.to_string());
                }
                Err(e) => {
                    warn!(form = %form, field = %name, setter = %setter, error = %e, "Setter invocation failed");
                    report.failures.push(BindError::InvocationFailed {
                        form: form.to_string(),
                        field: name.to_string(),
                        setter,
                        reason: e.0,
                    });
                }
            }
        }

        Ok(report)
    }
}

/// Implement [`Bindable`] for a struct whose setters follow the naming
/// convention.
///
/// Each field lists its kind and, optionally, the conventional setter name
/// and the method implementing it. Fields without a setter are declared but
/// cannot be bound.
///
/// ```
/// use actionroute::bindable_form;
///
/// #[derive(Default)]
/// struct LoginForm {
///     user: String,
///     age: Option<u32>,
///     token: String,
/// }
///
/// impl LoginForm {
///     fn set_user(&mut self, user: String) { self.user = user; }
///     fn set_age(&mut self, age: Option<u32>) { self.age = age; }
/// }
///
/// bindable_form! {
///     LoginForm as "shop.forms.LoginForm" {
///         user: Text => "setUser" set_user,
///         age: Integer => "setAge" set_age,
///         token: Text,
///     }
/// }
/// ```
#[macro_export]
macro_rules! bindable_form {
    (
        $ty:ty as $type_name:literal {
            $( $field:ident : $kind:ident $( => $setter:literal $method:ident )? ),* $(,)?
        }
    ) => {
        impl $crate::binder::Bindable for $ty {
            fn type_name(&self) -> &'static str {
                $type_name
            }

            fn fields(&self) -> &'static [$crate::binder::FieldSpec] {
                const FIELDS: &[$crate::binder::FieldSpec] = &[
                    $(
                        $crate::binder::FieldSpec::new(
                            stringify!($field),
                            $crate::binder::FieldKind::$kind,
                            &[ $( $crate::binder::SetterSpec {
                                name: $setter,
                                accepts: $crate::binder::FieldKind::$kind,
                            } )? ],
                        ),
                    )*
                ];
                FIELDS
            }

            fn set_field(
                &mut self,
                setter: &str,
                value: &str,
            ) -> ::std::result::Result<(), $crate::binder::InvocationError> {
                match setter {
                    $( $(
                        $setter => {
                            self.$method($crate::binder::FromParam::from_param(value)?);
                            Ok(())
                        }
                    )? )*
                    other => Err($crate::binder::InvocationError(format!(
                        "no setter named {}",
                        other
                    ))),
                }
            }

            fn field_value(&self, name: &str) -> ::std::option::Option<String> {
                match name {
                    $( stringify!($field) => Some($crate::binder::ToParam::to_param(&self.$field)), )*
                    _ => None,
                }
            }
        }
    };
}
