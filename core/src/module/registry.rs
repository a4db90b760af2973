use crate::application::HxApplication;
use crate::denotation::{ComponentDenotation, UxModule};
use crate::dispatch::{DialogComponent, RequestDialog};
use crate::errors::{error_codes, HxError};
use crate::request::Evaluable;
use crate::scope::HxScope;
use crate::types::{BoxFuture, Component};
use log::debug;
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// What a factory sees while building a component.
#[derive(Clone)]
pub struct CreationContext {
    application: HxApplication,
    scope: HxScope,
}

impl CreationContext {
    pub(crate) fn new(application: HxApplication, scope: HxScope) -> Self {
        Self { application, scope }
    }

    pub fn application(&self) -> &HxApplication {
        &self.application
    }

    /// Scope that will own the component.
    pub fn scope(&self) -> &HxScope {
        &self.scope
    }
}

pub(crate) type ComponentFactory = Arc<
    dyn Fn(Arc<dyn ComponentDenotation>, CreationContext) -> BoxFuture<'static, Result<Component, HxError>>
        + Send
        + Sync,
>;

/// **COMPONENT REGISTRY**
///
/// Factories a module binds, keyed by the concrete denotation type they
/// build components for.
pub struct ComponentRegistry {
    module_name: String,
    factories: HashMap<TypeId, ComponentFactory>,
}

impl ComponentRegistry {
    pub(crate) fn new(module: &UxModule) -> Self {
        Self {
            module_name: module.name.clone(),
            factories: HashMap::new(),
        }
    }

    /// Binds the factory for denotations of type `D`. Rebinding replaces.
    pub fn bind_component<D, C, F, Fut>(&mut self, factory: F)
    where
        D: ComponentDenotation,
        C: Any + Send + Sync,
        F: Fn(Arc<D>, CreationContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<C, HxError>> + Send + 'static,
    {
        let module_name = self.module_name.clone();
        let erased: ComponentFactory = Arc::new(
            move |denotation: Arc<dyn ComponentDenotation>,
                  context: CreationContext|
                  -> BoxFuture<'static, Result<Component, HxError>> {
                let signature = denotation.type_signature();
                let typed = match denotation.into_any_arc().downcast::<D>() {
                    Ok(typed) => typed,
                    Err(_) => {
                        let error = HxError::binding(
                            error_codes::FACTORY_TYPE_MISMATCH,
                            format!(
                                "Factory for {} in UxModule {} received denotation {}",
                                type_name::<D>(),
                                module_name,
                                signature
                            ),
                        );
                        return Box::pin(async move { Err(error) });
                    }
                };
                let pending = factory(typed, context);
                Box::pin(async move {
                    let component = pending.await?;
                    Ok(Arc::new(component) as Component)
                })
            },
        );

        debug!(
            "UxModule {} binds factory for {}",
            self.module_name,
            type_name::<D>()
        );
        self.factories.insert(TypeId::of::<D>(), erased);
    }

    pub fn bind_view<D, C, F, Fut>(&mut self, factory: F)
    where
        D: ComponentDenotation,
        C: Any + Send + Sync,
        F: Fn(Arc<D>, CreationContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<C, HxError>> + Send + 'static,
    {
        self.bind_component::<D, C, F, Fut>(factory);
    }

    /// Binds a dialog factory. The created component is a
    /// [`DialogComponent<R>`], which is what `bind_dialog` expects to find.
    pub fn bind_request_dialog<D, R, G, F, Fut>(&mut self, factory: F)
    where
        D: ComponentDenotation,
        R: Evaluable,
        G: RequestDialog<R> + 'static,
        F: Fn(Arc<D>, CreationContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<G, HxError>> + Send + 'static,
    {
        self.bind_component::<D, DialogComponent<R>, _, _>(move |denotation, context| {
            let pending = factory(denotation, context);
            async move { Ok::<_, HxError>(Box::new(pending.await?) as DialogComponent<R>) }
        });
    }

    pub(crate) fn resolve_factory(
        &self,
        denotation: &dyn ComponentDenotation,
    ) -> Result<ComponentFactory, HxError> {
        self.factories
            .get(&denotation.as_any().type_id())
            .cloned()
            .ok_or_else(|| {
                HxError::binding(
                    error_codes::FACTORY_NOT_BOUND,
                    format!(
                        "No factory bound for component type '{}' in UxModule: {}",
                        denotation.type_signature(),
                        self.module_name
                    ),
                )
            })
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("module_name", &self.module_name)
            .field("factories", &self.factories.len())
            .finish()
    }
}
