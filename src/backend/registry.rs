use std::sync::{Arc, OnceLock};

use super::consul::ConsulTemplate;
use super::etcd::EtcdTemplate;
use super::zookeeper::ZookeeperTemplate;
use super::{BackendKind, BackendSpec, BackendTemplate, RenderedLaunch};
use crate::error::TemplateError;

/// Closed mapping from backend kind to its config template, populated once
/// at process start. Adding a backend means registering another template;
/// the lifecycle controller never changes.
#[derive(Clone)]
pub struct TemplateRegistry {
    templates: Vec<Arc<dyn BackendTemplate>>,
}

impl TemplateRegistry {
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self {
            templates: Vec::new(),
        };
        let builtins: [Arc<dyn BackendTemplate>; 3] = [
            Arc::new(EtcdTemplate),
            Arc::new(ZookeeperTemplate),
            Arc::new(ConsulTemplate),
        ];
        for builtin in builtins {
            if let Err(err) = registry.register_arc(builtin) {
                tracing::warn!("Skipping duplicate builtin backend template: {}", err);
            }
        }
        registry
    }

    #[must_use]
    pub const fn empty() -> Self {
        Self {
            templates: Vec::new(),
        }
    }

    /// Registers a backend template into this registry.
    ///
    /// # Errors
    ///
    /// Returns an error when a template for the same [`BackendKind`] is
    /// already registered.
    pub fn register<T>(&mut self, template: T) -> Result<(), TemplateError>
    where
        T: BackendTemplate + 'static,
    {
        self.register_arc(Arc::new(template))
    }

    fn register_arc(&mut self, template: Arc<dyn BackendTemplate>) -> Result<(), TemplateError> {
        let kind = template.kind();
        if self.templates.iter().any(|existing| existing.kind() == kind) {
            return Err(TemplateError::DuplicateTemplate { kind });
        }
        self.templates.push(template);
        Ok(())
    }

    pub fn template(&self, kind: BackendKind) -> Option<&dyn BackendTemplate> {
        self.templates
            .iter()
            .find(|template| template.kind() == kind)
            .map(Arc::as_ref)
    }

    /// Renders the config and launch plan for `spec` with the template
    /// registered for its backend kind.
    ///
    /// # Errors
    ///
    /// Returns `UnknownBackend` when no template is registered for the
    /// kind, or the template's own error when required fields are absent.
    pub fn render(&self, spec: &BackendSpec) -> Result<RenderedLaunch, TemplateError> {
        let template =
            self.template(spec.kind)
                .ok_or_else(|| TemplateError::UnknownBackend {
                    kind: spec.kind.as_str().to_owned(),
                })?;
        template.render(spec)
    }

    #[must_use]
    pub fn registered_kinds_csv(&self) -> String {
        let mut kinds: Vec<&'static str> = self
            .templates
            .iter()
            .map(|template| template.kind().as_str())
            .collect();
        kinds.sort_unstable();
        kinds.join(", ")
    }
}

pub fn template_registry() -> &'static TemplateRegistry {
    static REGISTRY: OnceLock<TemplateRegistry> = OnceLock::new();
    REGISTRY.get_or_init(TemplateRegistry::with_builtins)
}
