use super::types::{ActionDescriptor, FormDescriptor};
use super::ConfigError;
use crate::catalog::{Capability, TypeCatalog};
use std::path::Path;
use tracing::{debug, warn};

/// Declarations found under the listed namespaces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    pub actions: Vec<ActionDescriptor>,
    pub forms: Vec<FormDescriptor>,
}

/// Collect action and form markers from every catalog type under
/// `namespaces`, in listing order then registration order.
///
/// A marker on a type without the matching capability is ignored.
///
/// # Errors
///
/// [`ConfigError::NamespaceScanError`] for a blank namespace or one the
/// catalog does not know.
pub fn scan_catalog(
    catalog: &TypeCatalog,
    namespaces: &[String],
    scan_listing: &Path,
) -> Result<ScanResult, ConfigError> {
    let mut result = ScanResult::default();

    for raw in namespaces {
        let namespace = raw.trim();
        if namespace.is_empty() || !catalog.namespace_exists(namespace) {
            return Err(ConfigError::NamespaceScanError {
                namespace: raw.clone(),
                scan_listing: scan_listing.to_path_buf(),
            });
        }

        for entry in catalog.types_in(namespace) {
            match (&entry.capability, &entry.action_marker) {
                (Capability::Action(_), Some(marker)) => result.actions.push(ActionDescriptor {
                    type_name: entry.type_name.clone(),
                    url_pattern: marker.url_pattern.clone(),
                    form_name: marker.form_name.clone(),
                }),
                (_, Some(_)) => warn!(
                    type_name = %entry.type_name,
                    "Action marker ignored, type is not an action"
                ),
                _ => {}
            }
            match (&entry.capability, &entry.form_marker) {
                (Capability::Form(_), Some(marker)) => result.forms.push(FormDescriptor {
                    type_name: entry.type_name.clone(),
                    name: marker.name.clone(),
                }),
                (_, Some(_)) => warn!(
                    type_name = %entry.type_name,
                    "Form marker ignored, type is not a form"
                ),
                _ => {}
            }
        }
        debug!(namespace = %namespace, "Namespace scanned");
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{Action, Forward};
    use crate::server::{ActionRequest, ActionResponse};
    use crate::catalog::TypeEntry;

    #[derive(Default)]
    struct Noop;

    impl Action for Noop {
        fn execute(&mut self, _: &ActionRequest, _: &mut ActionResponse) -> Forward {
            Forward::Handled
        }
    }

    fn listing() -> &'static Path {
        Path::new("packages-to-scan.yaml")
    }

    #[test]
    fn markers_without_capability_are_ignored() {
        let mut catalog = TypeCatalog::new();
        catalog
            .register(TypeEntry::action::<Noop>("app.Real").with_action_marker("/real", "f"))
            .register(TypeEntry::plain("app.Fake").with_action_marker("/fake", "f"))
            .register(TypeEntry::plain("app.FakeForm").with_form_marker("f"));
        let result = scan_catalog(&catalog, &["app".to_string()], listing()).unwrap();
        assert_eq!(result.actions.len(), 1);
        assert_eq!(result.actions[0].type_name, "app.Real");
        assert!(result.forms.is_empty());
    }

    #[test]
    fn unknown_namespace_fails() {
        let catalog = TypeCatalog::new();
        let err = scan_catalog(&catalog, &["nowhere".to_string()], listing()).unwrap_err();
        assert!(matches!(err, ConfigError::NamespaceScanError { ref namespace, .. } if namespace == "nowhere"));
    }

    #[test]
    fn blank_namespace_fails() {
        let mut catalog = TypeCatalog::new();
        catalog.register(TypeEntry::plain("app.Thing"));
        assert!(scan_catalog(&catalog, &["  ".to_string()], listing()).is_err());
    }

    #[test]
    fn nested_namespaces_are_scanned() {
        let mut catalog = TypeCatalog::new();
        catalog.register(TypeEntry::action::<Noop>("app.web.admin.Panel").with_action_marker("/panel", "p"));
        let result = scan_catalog(&catalog, &["app.web".to_string()], listing()).unwrap();
        assert_eq!(result.actions.len(), 1);
    }
}
