use crate::types::AsAny;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// **COMPONENT DENOTATION**
///
/// Immutable descriptor of a wanted component. Denotations are plain data;
/// two requests for a component are the same request only when they share
/// the same `Arc` allocation.
pub trait ComponentDenotation: AsAny + fmt::Debug {
    /// Type name used in diagnostics, e.g. `hydrux.StaticDomainSupplier`.
    fn type_signature(&self) -> &'static str;

    /// Scope the component must live in. `None` means the resolving scope.
    fn scope(&self) -> Option<&Arc<ScopeDenotation>> {
        None
    }

    /// Module supplying the factory. `None` means the platform module.
    fn module(&self) -> Option<&Arc<UxModule>> {
        None
    }
}

/// Descriptor of a node in the scope tree.
#[derive(Debug, Default)]
pub struct ScopeDenotation {
    pub name: String,
    pub default_domain: Option<Arc<dyn ComponentDenotation>>,
    pub controllers: Vec<Arc<dyn ComponentDenotation>>,
}

impl ScopeDenotation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_domain: None,
            controllers: Vec::new(),
        }
    }

    pub fn with_default_domain(mut self, supplier: Arc<dyn ComponentDenotation>) -> Self {
        self.default_domain = Some(supplier);
        self
    }

    pub fn with_controller(mut self, controller: Arc<dyn ComponentDenotation>) -> Self {
        self.controllers.push(controller);
        self
    }
}

/// A loadable code unit supplying component factories and processors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UxModule {
    pub name: String,
    pub path: String,
}

impl UxModule {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Top-level descriptor of a hosted application.
#[derive(Debug, Default)]
pub struct ApplicationDenotation {
    pub application_id: String,
    pub title: String,
    pub root_scope: Option<Arc<ScopeDenotation>>,
}

impl ApplicationDenotation {
    pub fn new(application_id: impl Into<String>, root_scope: Arc<ScopeDenotation>) -> Self {
        Self {
            application_id: application_id.into(),
            title: String::new(),
            root_scope: Some(root_scope),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}
