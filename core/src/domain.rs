//! # DOMAIN RESOLUTION CHAIN
//!
//! Components answering "which domain is active here". Every strategy is a
//! [`DomainSupplier`]; the fallback chain resolves its nested suppliers
//! through the owning scope, strictly in declaration order.

use crate::config::HostSettings;
use crate::denotation::ComponentDenotation;
use crate::reason::{non_empty_or_not_found, Maybe, Reason};
use crate::scope::WeakScope;
use crate::types::BoxFuture;
use log::debug;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

type SupplyFn = dyn Fn() -> BoxFuture<'static, Maybe<String>> + Send + Sync;

/// **DOMAIN SUPPLIER**
///
/// Component resolved from any of the domain supplier denotations.
pub struct DomainSupplier {
    supply: Box<SupplyFn>,
}

impl DomainSupplier {
    pub fn new<F, Fut>(supply: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Maybe<String>> + Send + 'static,
    {
        Self {
            supply: Box::new(move || Box::pin(supply())),
        }
    }

    /// Supplier that always answers with `result`.
    pub fn fixed(result: Maybe<String>) -> Self {
        Self::new(move || std::future::ready(result.clone()))
    }

    pub async fn get_domain(&self) -> Maybe<String> {
        (self.supply)().await
    }
}

impl fmt::Debug for DomainSupplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomainSupplier").finish_non_exhaustive()
    }
}

/// Domain id configured in the host settings.
pub fn application_domain(settings: &HostSettings) -> DomainSupplier {
    DomainSupplier::fixed(non_empty_or_not_found(settings.domain_id(), || {
        "DomainId not configured in the host settings.".to_string()
    }))
}

pub fn static_domain(external_id: Option<&str>) -> DomainSupplier {
    DomainSupplier::fixed(non_empty_or_not_found(external_id, || {
        "Mandatory property StaticDomainSupplier.externalId is not set.".to_string()
    }))
}

/// Reads `param_name` from the current query string on every call.
pub fn url_domain(settings: &HostSettings, param_name: &str) -> DomainSupplier {
    let settings = settings.clone();
    let param_name = param_name.to_string();
    DomainSupplier::new(move || {
        let value = settings.query_param(&param_name);
        let result = non_empty_or_not_found(value.as_deref(), || {
            format!("URL parameter not found: {}", param_name)
        });
        std::future::ready(result)
    })
}

/// First satisfied supplier of `suppliers`, resolved through `scope`.
pub fn fallback_domain(
    scope: WeakScope,
    suppliers: Vec<Arc<dyn ComponentDenotation>>,
) -> DomainSupplier {
    DomainSupplier::new(move || {
        let scope = scope.clone();
        let suppliers = suppliers.clone();
        async move { resolve_from_suppliers(scope, &suppliers).await }
    })
}

async fn resolve_from_suppliers(
    scope: WeakScope,
    suppliers: &[Arc<dyn ComponentDenotation>],
) -> Maybe<String> {
    let scope = scope
        .upgrade()
        .ok_or_else(|| Reason::failure("Scope of the fallback domain supplier is gone."))?;

    let mut reasons = Vec::with_capacity(suppliers.len());
    for denotation in suppliers {
        let supplier = scope
            .resolve_domain_supplier(Arc::clone(denotation))
            .await
            .map_err(|e| e.into_reason())?;

        match supplier.get_domain().await {
            Ok(domain) => return Ok(domain),
            Err(reason) => {
                debug!(
                    "{} in {} did not provide a domain: {}",
                    denotation.type_signature(),
                    scope,
                    reason.text
                );
                reasons.push(reason);
            }
        }
    }

    Err(Reason::aggregate(
        "No supplier in the fallback chain provided a domain.",
        reasons,
    ))
}
