use crate::application::HxApplication;
use crate::denotation::{ComponentDenotation, ScopeDenotation, SessionDenotation};
use crate::dispatch::DialogComponent;
use crate::domain::DomainSupplier;
use crate::errors::{error_codes, HxError};
use crate::module::CreationContext;
use crate::reason::{non_empty_or_not_found, value_or_not_found, Maybe, Reason};
use crate::request::Evaluable;
use crate::scope::types::HxScope;
use crate::session::{SessionFactory, SessionHolder};
use crate::types::{identity_key, BoxFuture, Component};
use log::debug;
use std::any::{type_name, Any};
use std::sync::Arc;
use tokio::sync::OnceCell;

impl HxScope {
    /// Creates a scope and resolves its controllers. The scope is only handed
    /// out once every controller exists.
    pub(crate) async fn create(
        application: HxApplication,
        denotation: Arc<ScopeDenotation>,
        parent: Option<HxScope>,
    ) -> Result<HxScope, HxError> {
        let scope = HxScope::new_node(&application, denotation, parent.as_ref());
        debug!("Creating {}", scope);

        for controller in &scope.inner.denotation.controllers {
            scope.resolve_component(Arc::clone(controller)).await?;
        }
        Ok(scope)
    }

    /// **COMPONENT RESOLUTION**
    ///
    /// 1. Owning scope: the caller when the denotation declares none, else the
    ///    nearest ancestor created for the declared scope, else a child of the
    ///    caller created for it
    /// 2. Cache lookup on the owning scope by denotation identity
    /// 3. On miss, the factory of the denotation's module builds the component
    ///
    /// Concurrent resolutions of one denotation on one scope share a single
    /// factory call.
    pub fn resolve_component(
        &self,
        denotation: Arc<dyn ComponentDenotation>,
    ) -> BoxFuture<'static, Result<Component, HxError>> {
        let scope = self.clone();
        Box::pin(async move {
            let owner = scope.owning_scope(denotation.as_ref()).await?;
            owner.resolve_own(denotation).await
        })
    }

    /// Typed [`resolve_component`](Self::resolve_component).
    pub async fn resolve<C: Any + Send + Sync>(
        &self,
        denotation: Arc<dyn ComponentDenotation>,
    ) -> Result<Arc<C>, HxError> {
        let signature = denotation.type_signature();
        self.resolve_component(denotation)
            .await?
            .downcast::<C>()
            .map_err(|_| {
                HxError::resolution(
                    error_codes::COMPONENT_TYPE_MISMATCH,
                    format!("{} did not resolve to a {}", signature, type_name::<C>()),
                )
            })
    }

    pub async fn resolve_domain_supplier(
        &self,
        denotation: Arc<dyn ComponentDenotation>,
    ) -> Result<Arc<DomainSupplier>, HxError> {
        self.resolve::<DomainSupplier>(denotation).await
    }

    pub async fn resolve_session_factory(
        &self,
        denotation: Arc<dyn ComponentDenotation>,
    ) -> Result<Arc<SessionFactory>, HxError> {
        self.resolve::<SessionFactory>(denotation).await
    }

    /// Opens a new session from the factory `denotation` names. The session
    /// itself is not cached.
    pub async fn resolve_session(
        &self,
        denotation: &SessionDenotation,
    ) -> Result<SessionHolder, HxError> {
        let factory = denotation.factory.as_ref().ok_or_else(|| {
            HxError::configuration(
                error_codes::MISSING_SESSION_FACTORY,
                format!("No factory configured for session in {}", self),
            )
        })?;
        let factory = self.resolve_session_factory(Arc::clone(factory)).await?;
        Ok(SessionHolder::new(factory.new_session()))
    }

    pub async fn resolve_controller<C: Any + Send + Sync>(
        &self,
        denotation: Arc<dyn ComponentDenotation>,
    ) -> Result<Arc<C>, HxError> {
        self.resolve::<C>(denotation).await
    }

    pub async fn resolve_view<V: Any + Send + Sync>(
        &self,
        denotation: Arc<dyn ComponentDenotation>,
    ) -> Result<Arc<V>, HxError> {
        self.resolve::<V>(denotation).await
    }

    /// Component consuming the data of a view, typically bound to a session.
    pub async fn resolve_data_consumer<C: Any + Send + Sync>(
        &self,
        denotation: Arc<dyn ComponentDenotation>,
    ) -> Result<Arc<C>, HxError> {
        self.resolve::<C>(denotation).await
    }

    pub async fn resolve_selection_event_source<C: Any + Send + Sync>(
        &self,
        denotation: Arc<dyn ComponentDenotation>,
    ) -> Result<Arc<C>, HxError> {
        self.resolve::<C>(denotation).await
    }

    pub async fn resolve_request_dialog<R: Evaluable>(
        &self,
        denotation: Arc<dyn ComponentDenotation>,
    ) -> Result<Arc<DialogComponent<R>>, HxError> {
        self.resolve::<DialogComponent<R>>(denotation).await
    }

    async fn owning_scope(
        &self,
        denotation: &dyn ComponentDenotation,
    ) -> Result<HxScope, HxError> {
        let Some(scope_denotation) = denotation.scope() else {
            return Ok(self.clone());
        };
        if let Some(ancestor) = self.find_ancestor(scope_denotation) {
            return Ok(ancestor);
        }
        self.child_scope(Arc::clone(scope_denotation)).await
    }

    /// Child of this scope for `denotation`, created at most once.
    pub fn child_scope(
        &self,
        denotation: Arc<ScopeDenotation>,
    ) -> BoxFuture<'static, Result<HxScope, HxError>> {
        let slot = Arc::clone(
            self.inner
                .children
                .lock()
                .get_or_insert_with(&denotation, || Arc::new(OnceCell::new())),
        );
        let parent = self.clone();
        Box::pin(async move {
            slot.get_or_try_init(move || async move {
                let application = parent.application()?;
                HxScope::create(application, denotation, Some(parent)).await
            })
            .await
            .cloned()
        })
    }

    async fn resolve_own(
        &self,
        denotation: Arc<dyn ComponentDenotation>,
    ) -> Result<Component, HxError> {
        let slot = Arc::clone(
            self.inner
                .components
                .lock()
                .get_or_insert_with(&denotation, || Arc::new(OnceCell::new())),
        );
        slot.get_or_try_init(|| self.create_component(Arc::clone(&denotation)))
            .await
            .cloned()
    }

    async fn create_component(
        &self,
        denotation: Arc<dyn ComponentDenotation>,
    ) -> Result<Component, HxError> {
        let application = self.application()?;
        let module = application.resolve_module(denotation.module()).await?;
        let factory = module.component_registry().resolve_factory(denotation.as_ref())?;

        debug!("Creating {} in {}", denotation.type_signature(), self);
        let context = CreationContext::new(application.clone(), self.clone());
        let component = factory(denotation, context).await?;

        application.register_component(&component, self);
        Ok(component)
    }

    /// Drops the cache entry holding exactly `component`, so the next
    /// resolution of its denotation builds a new instance.
    pub(crate) fn evict(&self, component_key: usize) -> Maybe<Arc<dyn ComponentDenotation>> {
        let mut components = self.inner.components.lock();
        let denotation = components.find_key(|slot| {
            slot.get()
                .is_some_and(|cached| identity_key(cached) == component_key)
        });
        let denotation = value_or_not_found(denotation, || {
            format!("Component not found in what is allegedly its scope: {}", self)
        })?;
        components.remove(&denotation);
        Ok(denotation)
    }

    /// Denotation this scope resolved `component` from.
    pub fn find_denotation_for<C: ?Sized>(
        &self,
        component: &Arc<C>,
    ) -> Maybe<Arc<dyn ComponentDenotation>> {
        let key = identity_key(component);
        let found = self.inner.components.lock().find_key(|slot| {
            slot.get()
                .is_some_and(|cached| identity_key(cached) == key)
        });
        value_or_not_found(found, || {
            format!("Component not found in what is allegedly its scope: {}", self)
        })
    }

    /// Releases `component` through the application, which owns the
    /// component to scope mapping.
    pub fn release<C: ?Sized>(&self, component: &Arc<C>) -> Maybe<bool> {
        self.application()
            .map_err(HxError::into_reason)?
            .release_component(component)
    }

    /// **EFFECTIVE DOMAIN**
    ///
    /// The scope's own default domain supplier, else the parent's domain,
    /// else the domain id of the host settings. Memoised once satisfied;
    /// concurrent callers share one resolution.
    pub fn domain(&self) -> BoxFuture<'static, Maybe<String>> {
        let scope = self.clone();
        Box::pin(async move {
            scope
                .inner
                .domain
                .get_or_try_init(|| scope.compute_domain())
                .await
                .cloned()
        })
    }

    async fn compute_domain(&self) -> Maybe<String> {
        if let Some(supplier) = &self.inner.denotation.default_domain {
            return self.supply_domain(supplier).await;
        }
        if let Some(parent) = self.parent() {
            return parent.domain().await;
        }

        let application = self.application().map_err(HxError::into_reason)?;
        non_empty_or_not_found(application.host_settings().domain_id(), || {
            format!("No domain configured for {}", self)
        })
    }

    /// Domain of `supplier`, or of this scope when no supplier is given.
    pub async fn resolve_domain(
        &self,
        supplier: Option<&Arc<dyn ComponentDenotation>>,
    ) -> Maybe<String> {
        match supplier {
            Some(supplier) => self.supply_domain(supplier).await,
            None => self.domain().await,
        }
    }

    async fn supply_domain(&self, supplier: &Arc<dyn ComponentDenotation>) -> Maybe<String> {
        let resolved = self
            .resolve_domain_supplier(Arc::clone(supplier))
            .await
            .map_err(HxError::into_reason)?;

        resolved.get_domain().await.map_err(|reason| {
            Reason::new(
                reason.kind,
                format!(
                    "Unable to resolve domain id for domain supplier [{}] in {}",
                    supplier.type_signature(),
                    self
                ),
            )
            .with_reason(reason)
        })
    }
}
