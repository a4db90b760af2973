//! # PLATFORM MODULE
//!
//! Built-in module used for every denotation that names no module. It binds
//! the session factories and the domain suppliers.

use crate::denotation::{
    AccessSessionFactoryDenotation, ApplicationDomainSupplier, FallbackDomainSupplier,
    ServiceSessionFactoryDenotation, SessionDenotation, StaticDomainSupplier, UrlDomainSupplier,
};
use crate::domain::{self, DomainSupplier};
use crate::errors::HxError;
use crate::module::{CreationContext, ModuleBindingContext, ModuleContract};
use crate::session::{SessionFactory, SessionHolder};
use log::debug;
use std::sync::Arc;

pub(crate) struct PlatformModule;

impl ModuleContract for PlatformModule {
    fn bind(&self, context: &mut ModuleBindingContext<'_>) -> Result<(), HxError> {
        let binder = context.component_binder();

        binder.bind_component(new_session);

        binder.bind_component(new_access_session_factory);
        binder.bind_component(new_service_session_factory);

        binder.bind_component(new_application_domain_supplier);
        binder.bind_component(new_static_domain_supplier);
        binder.bind_component(new_url_domain_supplier);
        binder.bind_component(new_fallback_domain_supplier);

        Ok(())
    }
}

async fn new_session(
    denotation: Arc<SessionDenotation>,
    context: CreationContext,
) -> Result<SessionHolder, HxError> {
    context.scope().resolve_session(&denotation).await
}

async fn new_access_session_factory(
    denotation: Arc<AccessSessionFactoryDenotation>,
    context: CreationContext,
) -> Result<SessionFactory, HxError> {
    let access_id = context.scope().resolve_domain(denotation.domain.as_ref()).await?;
    debug!("Opening access session factory for {}", access_id);

    let remote = context
        .application()
        .services_session()
        .access_session_factory(&access_id)
        .await?;
    Ok(SessionFactory::new(access_id, remote))
}

async fn new_service_session_factory(
    denotation: Arc<ServiceSessionFactoryDenotation>,
    context: CreationContext,
) -> Result<SessionFactory, HxError> {
    let external_id = context.scope().resolve_domain(denotation.domain.as_ref()).await?;
    debug!("Opening service session factory for {}", external_id);

    let remote = context
        .application()
        .services_session()
        .service_session_factory(&external_id)
        .await?;
    Ok(SessionFactory::new(external_id, remote))
}

async fn new_application_domain_supplier(
    _denotation: Arc<ApplicationDomainSupplier>,
    context: CreationContext,
) -> Result<DomainSupplier, HxError> {
    Ok(domain::application_domain(context.application().host_settings()))
}

async fn new_static_domain_supplier(
    denotation: Arc<StaticDomainSupplier>,
    _context: CreationContext,
) -> Result<DomainSupplier, HxError> {
    Ok(domain::static_domain(denotation.external_id.as_deref()))
}

async fn new_url_domain_supplier(
    denotation: Arc<UrlDomainSupplier>,
    context: CreationContext,
) -> Result<DomainSupplier, HxError> {
    Ok(domain::url_domain(
        context.application().host_settings(),
        &denotation.param_name,
    ))
}

async fn new_fallback_domain_supplier(
    denotation: Arc<FallbackDomainSupplier>,
    context: CreationContext,
) -> Result<DomainSupplier, HxError> {
    Ok(domain::fallback_domain(
        context.scope().downgrade(),
        denotation.suppliers.clone(),
    ))
}
