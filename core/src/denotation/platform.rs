//! Denotations of the components the platform module builds in: sessions,
//! session factories and domain suppliers.

use super::types::{ComponentDenotation, ScopeDenotation};
use std::sync::Arc;

/// A session opened from the session factory denoted by `factory`.
#[derive(Debug, Default)]
pub struct SessionDenotation {
    pub factory: Option<Arc<dyn ComponentDenotation>>,
    pub scope: Option<Arc<ScopeDenotation>>,
}

impl SessionDenotation {
    pub fn new(factory: Arc<dyn ComponentDenotation>) -> Self {
        Self {
            factory: Some(factory),
            scope: None,
        }
    }
}

impl ComponentDenotation for SessionDenotation {
    fn type_signature(&self) -> &'static str {
        "hydrux.Session"
    }

    fn scope(&self) -> Option<&Arc<ScopeDenotation>> {
        self.scope.as_ref()
    }
}

/// Factory of data-access sessions. `domain` names the access; when absent the
/// owning scope's domain is used.
#[derive(Debug, Default)]
pub struct AccessSessionFactoryDenotation {
    pub domain: Option<Arc<dyn ComponentDenotation>>,
    pub scope: Option<Arc<ScopeDenotation>>,
}

impl ComponentDenotation for AccessSessionFactoryDenotation {
    fn type_signature(&self) -> &'static str {
        "hydrux.AccessSessionFactory"
    }

    fn scope(&self) -> Option<&Arc<ScopeDenotation>> {
        self.scope.as_ref()
    }
}

/// Factory of service-domain sessions.
#[derive(Debug, Default)]
pub struct ServiceSessionFactoryDenotation {
    pub domain: Option<Arc<dyn ComponentDenotation>>,
    pub scope: Option<Arc<ScopeDenotation>>,
}

impl ComponentDenotation for ServiceSessionFactoryDenotation {
    fn type_signature(&self) -> &'static str {
        "hydrux.ServiceSessionFactory"
    }

    fn scope(&self) -> Option<&Arc<ScopeDenotation>> {
        self.scope.as_ref()
    }
}

/// Domain taken from the host settings.
#[derive(Debug, Default)]
pub struct ApplicationDomainSupplier {
    pub scope: Option<Arc<ScopeDenotation>>,
}

impl ComponentDenotation for ApplicationDomainSupplier {
    fn type_signature(&self) -> &'static str {
        "hydrux.ApplicationDomainSupplier"
    }

    fn scope(&self) -> Option<&Arc<ScopeDenotation>> {
        self.scope.as_ref()
    }
}

/// A fixed domain id.
#[derive(Debug, Default)]
pub struct StaticDomainSupplier {
    pub external_id: Option<String>,
    pub scope: Option<Arc<ScopeDenotation>>,
}

impl StaticDomainSupplier {
    pub fn new(external_id: impl Into<String>) -> Self {
        Self {
            external_id: Some(external_id.into()),
            scope: None,
        }
    }
}

impl ComponentDenotation for StaticDomainSupplier {
    fn type_signature(&self) -> &'static str {
        "hydrux.StaticDomainSupplier"
    }

    fn scope(&self) -> Option<&Arc<ScopeDenotation>> {
        self.scope.as_ref()
    }
}

/// Domain read from a query parameter of the current location.
#[derive(Debug, Default)]
pub struct UrlDomainSupplier {
    pub param_name: String,
    pub scope: Option<Arc<ScopeDenotation>>,
}

impl UrlDomainSupplier {
    pub fn new(param_name: impl Into<String>) -> Self {
        Self {
            param_name: param_name.into(),
            scope: None,
        }
    }
}

impl ComponentDenotation for UrlDomainSupplier {
    fn type_signature(&self) -> &'static str {
        "hydrux.UrlDomainSupplier"
    }

    fn scope(&self) -> Option<&Arc<ScopeDenotation>> {
        self.scope.as_ref()
    }
}

/// Ordered chain of suppliers; the first satisfied one wins.
#[derive(Debug, Default)]
pub struct FallbackDomainSupplier {
    pub suppliers: Vec<Arc<dyn ComponentDenotation>>,
    pub scope: Option<Arc<ScopeDenotation>>,
}

impl FallbackDomainSupplier {
    pub fn new(suppliers: Vec<Arc<dyn ComponentDenotation>>) -> Self {
        Self {
            suppliers,
            scope: None,
        }
    }
}

impl ComponentDenotation for FallbackDomainSupplier {
    fn type_signature(&self) -> &'static str {
        "hydrux.FallbackDomainSupplier"
    }

    fn scope(&self) -> Option<&Arc<ScopeDenotation>> {
        self.scope.as_ref()
    }
}
