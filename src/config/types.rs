use crate::router::RouteEntry;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

/// An action discovered by scanning or read from the legacy file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionDescriptor {
    pub type_name: String,
    pub url_pattern: String,
    pub form_name: String,
}

/// A form discovered by scanning or read from the legacy file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormDescriptor {
    pub type_name: String,
    pub name: String,
}

/// The configuration source that produced the route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Markers found in the listed catalog namespaces
    Scanned {
        scan_listing: PathBuf,
        namespaces: Vec<String>,
        actions: Vec<ActionDescriptor>,
        forms: Vec<FormDescriptor>,
    },
    /// Entries of the legacy declaration file
    Declared {
        file: PathBuf,
        actions: Vec<ActionDescriptor>,
        forms: Vec<FormDescriptor>,
    },
}

impl ConfigSource {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            ConfigSource::Scanned { .. } => "scanned",
            ConfigSource::Declared { .. } => "declared",
        }
    }

    #[must_use]
    pub fn actions(&self) -> &[ActionDescriptor] {
        match self {
            ConfigSource::Scanned { actions, .. } | ConfigSource::Declared { actions, .. } => actions,
        }
    }

    #[must_use]
    pub fn forms(&self) -> &[FormDescriptor] {
        match self {
            ConfigSource::Scanned { forms, .. } | ConfigSource::Declared { forms, .. } => forms,
        }
    }

    /// Route entries produced by joining actions and forms on the form name.
    #[must_use]
    pub fn entries(&self) -> Vec<RouteEntry> {
        join(self.actions(), self.forms())
    }
}

/// Inner join of actions and forms on the form name.
///
/// Actions are keyed by form name: a later action naming the same form
/// replaces the earlier one in its original position. Descriptors without
/// a partner are dropped.
#[must_use]
pub fn join(actions: &[ActionDescriptor], forms: &[FormDescriptor]) -> Vec<RouteEntry> {
    let mut by_form: Vec<(&str, &ActionDescriptor)> = Vec::with_capacity(actions.len());
    for action in actions {
        match by_form.iter_mut().find(|(name, _)| *name == action.form_name) {
            Some(slot) => {
                debug!(
                    form_name = %action.form_name,
                    replaced = %slot.1.type_name,
                    by = %action.type_name,
                    "Form name claimed by a later action"
                );
                slot.1 = action;
            }
            None => by_form.push((action.form_name.as_str(), action)),
        }
    }

    let form_types: HashMap<&str, &str> = forms
        .iter()
        .map(|f| (f.name.as_str(), f.type_name.as_str()))
        .collect();

    let mut entries = Vec::with_capacity(by_form.len());
    for (form_name, action) in by_form {
        match form_types.get(form_name) {
            Some(form_type) => entries.push(RouteEntry::new(
                action.url_pattern.clone(),
                action.type_name.clone(),
                (*form_type).to_string(),
            )),
            None => debug!(
                action_type = %action.type_name,
                form_name = %form_name,
                "Action dropped, no form carries its form name"
            ),
        }
    }

    for form in forms {
        if !actions.iter().any(|a| a.form_name == form.name) {
            debug!(form_type = %form.type_name, form_name = %form.name, "Form dropped, no action refers to it");
        }
    }

    entries
}

/// The scan listing document.
///
/// ```yaml
/// packages-to-scan:
///   - shop.web
///   - shop.admin
/// ```
///
/// A bare sequence of namespaces is accepted as well.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ScanListing {
    Keyed {
        #[serde(rename = "packages-to-scan")]
        packages_to_scan: Vec<String>,
    },
    Bare(Vec<String>),
}

impl ScanListing {
    #[must_use]
    pub fn namespaces(&self) -> &[String] {
        match self {
            ScanListing::Keyed { packages_to_scan } => packages_to_scan,
            ScanListing::Bare(namespaces) => namespaces,
        }
    }
}

/// The legacy declaration file.
///
/// ```yaml
/// actions:
///   - url-pattern: /login\.do
///     action-class: shop.web.LoginAction
///     form-name: login
/// forms:
///   - form-name: login
///     form-class: shop.web.LoginForm
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeclarationFile {
    #[serde(default)]
    pub actions: Vec<ActionDeclaration>,
    #[serde(default)]
    pub forms: Vec<FormDeclaration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ActionDeclaration {
    pub url_pattern: String,
    pub action_class: String,
    pub form_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FormDeclaration {
    pub form_name: String,
    pub form_class: String,
}

/// Element layout of the legacy declaration file, read from `.xml` files.
///
/// ```xml
/// <configuration>
///   <actions>
///     <action>
///       <url-pattern>/login\.do</url-pattern>
///       <action-class>shop.web.LoginAction</action-class>
///       <form-name>login</form-name>
///     </action>
///   </actions>
///   <forms>
///     <form>
///       <form-name>login</form-name>
///       <form-class>shop.web.LoginForm</form-class>
///     </form>
///   </forms>
/// </configuration>
/// ```
///
/// The root element name is not checked.
#[derive(Debug, Default, Deserialize)]
pub struct XmlDeclarationFile {
    #[serde(default)]
    actions: XmlActions,
    #[serde(default)]
    forms: XmlForms,
}

#[derive(Debug, Default, Deserialize)]
struct XmlActions {
    #[serde(default)]
    action: Vec<ActionDeclaration>,
}

#[derive(Debug, Default, Deserialize)]
struct XmlForms {
    #[serde(default)]
    form: Vec<FormDeclaration>,
}

impl From<XmlDeclarationFile> for DeclarationFile {
    fn from(xml: XmlDeclarationFile) -> Self {
        Self {
            actions: xml.actions.action,
            forms: xml.forms.form,
        }
    }
}

/// Element layout of the scan listing:
/// `<packages-to-scan><package>shop.web</package></packages-to-scan>`.
#[derive(Debug, Default, Deserialize)]
pub struct XmlScanListing {
    #[serde(default)]
    package: Vec<String>,
}

impl From<XmlScanListing> for ScanListing {
    fn from(xml: XmlScanListing) -> Self {
        ScanListing::Bare(xml.package)
    }
}

impl DeclarationFile {
    /// First required value that is blank, as `(section, index, key)`.
    pub(crate) fn first_blank(&self) -> Option<(&'static str, usize, &'static str)> {
        for (i, a) in self.actions.iter().enumerate() {
            for (key, value) in [
                ("url-pattern", &a.url_pattern),
                ("action-class", &a.action_class),
                ("form-name", &a.form_name),
            ] {
                if value.trim().is_empty() {
                    return Some(("actions", i, key));
                }
            }
        }
        for (i, f) in self.forms.iter().enumerate() {
            for (key, value) in [("form-name", &f.form_name), ("form-class", &f.form_class)] {
                if value.trim().is_empty() {
                    return Some(("forms", i, key));
                }
            }
        }
        None
    }

    #[must_use]
    pub fn action_descriptors(&self) -> Vec<ActionDescriptor> {
        self.actions
            .iter()
            .map(|a| ActionDescriptor {
                type_name: a.action_class.trim().to_string(),
                url_pattern: a.url_pattern.trim().to_string(),
                form_name: a.form_name.trim().to_string(),
            })
            .collect()
    }

    #[must_use]
    pub fn form_descriptors(&self) -> Vec<FormDescriptor> {
        self.forms
            .iter()
            .map(|f| FormDescriptor {
                type_name: f.form_class.trim().to_string(),
                name: f.form_name.trim().to_string(),
            })
            .collect()
    }
}
