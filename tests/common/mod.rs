#![allow(dead_code)]

pub mod fixtures {
    use actionroute::action::{Action, Form, Forward};
    use actionroute::bindable_form;
    use actionroute::binder::{Bindable, FieldKind, FieldSpec, InvocationError, SetterSpec};
    use actionroute::catalog::{TypeCatalog, TypeEntry};
    use actionroute::server::{ActionRequest, ActionResponse};

    pub const LOGIN_ACTION: &str = "shop.web.LoginAction";
    pub const LOGIN_FORM: &str = "shop.web.LoginForm";
    pub const RAW_ACTION: &str = "shop.web.RawAction";
    pub const SECRET_FORM: &str = "shop.web.SecretForm";

    /// Login form: valid once both user and password are set.
    #[derive(Debug, Default)]
    pub struct LoginForm {
        pub user: String,
        pub password: String,
        pub age: Option<u32>,
        pub remember: bool,
        pub nickname: String,
    }

    impl LoginForm {
        fn set_user(&mut self, user: String) {
            self.user = user;
        }

        fn set_password(&mut self, password: String) {
            self.password = password;
        }

        fn set_age(&mut self, age: Option<u32>) {
            self.age = age;
        }

        fn set_remember(&mut self, remember: bool) {
            self.remember = remember;
        }
    }

    bindable_form! {
        LoginForm as "shop.web.LoginForm" {
            user: Text => "setUser" set_user,
            password: Text => "setPassword" set_password,
            age: Integer => "setAge" set_age,
            remember: Boolean => "setRemember" set_remember,
            nickname: Text,
        }
    }

    impl Form for LoginForm {
        fn validate(&self, _request: &ActionRequest) -> bool {
            !self.user.is_empty() && !self.password.is_empty()
        }

        fn reset(&mut self, _request: &ActionRequest) {
            self.remember = false;
        }
    }

    /// Forwards to the welcome page and counts its runs.
    #[derive(Debug, Default)]
    pub struct LoginAction {
        pub runs: u32,
    }

    impl Action for LoginAction {
        fn execute(&mut self, _request: &ActionRequest, response: &mut ActionResponse) -> Forward {
            self.runs += 1;
            response.set_header("x-login-runs", self.runs.to_string());
            Forward::to("/welcome.jsp")
        }
    }

    /// Writes the response itself.
    #[derive(Debug, Default)]
    pub struct RawAction;

    impl Action for RawAction {
        fn execute(&mut self, _request: &ActionRequest, response: &mut ActionResponse) -> Forward {
            response.text(200, "raw");
            Forward::Handled
        }
    }

    /// Form with a field whose metadata may not be read.
    #[derive(Debug, Default)]
    pub struct SecretForm {
        pub label: String,
    }

    impl Bindable for SecretForm {
        fn type_name(&self) -> &'static str {
            SECRET_FORM
        }

        fn fields(&self) -> &'static [FieldSpec] {
            const FIELDS: &[FieldSpec] = &[
                FieldSpec::new(
                    "label",
                    FieldKind::Text,
                    &[SetterSpec {
                        name: "setLabel",
                        accepts: FieldKind::Text,
                    }],
                ),
                FieldSpec::restricted("token", FieldKind::Text),
                FieldSpec::new(
                    "count",
                    FieldKind::Integer,
                    &[SetterSpec {
                        name: "setCount",
                        accepts: FieldKind::Text,
                    }],
                ),
            ];
            FIELDS
        }

        fn set_field(&mut self, setter: &str, value: &str) -> Result<(), InvocationError> {
            match setter {
                "setLabel" => {
                    self.label = value.to_string();
                    Ok(())
                }
                other => Err(InvocationError(format!("no setter named {other}"))),
            }
        }

        fn field_value(&self, name: &str) -> Option<String> {
            (name == "label").then(|| self.label.clone())
        }
    }

    impl Form for SecretForm {
        fn validate(&self, _request: &ActionRequest) -> bool {
            true
        }
    }

    /// Catalog with the login pair marked for scanning under `shop.web`.
    pub fn catalog() -> TypeCatalog {
        let mut catalog = TypeCatalog::new();
        catalog
            .register(
                TypeEntry::action::<LoginAction>(LOGIN_ACTION)
                    .with_action_marker(r"/login\.do", "login"),
            )
            .register(TypeEntry::form::<LoginForm>(LOGIN_FORM).with_form_marker("login"))
            .register(TypeEntry::action::<RawAction>(RAW_ACTION))
            .register(TypeEntry::form::<SecretForm>(SECRET_FORM))
            .register(TypeEntry::plain("shop.util.Helper"))
            .register_namespace("shop.empty");
        catalog
    }
}

pub mod resources {
    use actionroute::runtime_config::RuntimeConfig;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    /// Temporary resource directory.
    pub struct ResourceDir {
        dir: TempDir,
    }

    impl ResourceDir {
        pub fn new() -> Self {
            Self {
                dir: tempfile::tempdir().unwrap(),
            }
        }

        pub fn with(self, name: &str, content: &str) -> Self {
            fs::write(self.dir.path().join(name), content).unwrap();
            self
        }

        pub fn path(&self) -> &Path {
            self.dir.path()
        }

        pub fn config(&self) -> RuntimeConfig {
            RuntimeConfig::load(self.dir.path()).unwrap()
        }
    }

    pub const LEGACY_LOGIN: &str = "\
actions:
  - url-pattern: /login\\.do
    action-class: shop.web.LoginAction
    form-name: login
forms:
  - form-name: login
    form-class: shop.web.LoginForm
";
}

pub mod forwarders {
    use actionroute::server::{ActionRequest, ActionResponse, Forwarder};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Forwarder whose every call fails.
    #[derive(Debug, Default)]
    pub struct FailingForwarder {
        pub calls: AtomicUsize,
    }

    impl Forwarder for FailingForwarder {
        fn forward(
            &self,
            target: &str,
            _request: &ActionRequest,
            _response: &mut ActionResponse,
        ) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("view {target} is not deployed")
        }
    }
}
