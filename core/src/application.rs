//! # HYDRUX APPLICATION
//!
//! Root of the runtime. Owns the host settings, the services session, the
//! local evaluator, the module loader and the root scope, plus the component
//! to scope map used for release and introspection.

use crate::config::HostSettings;
use crate::denotation::{ApplicationDenotation, ScopeDenotation, UxModule};
use crate::dispatch::{ServiceEvaluator, ServiceProcessorBinder};
use crate::errors::{error_codes, HxError};
use crate::module::{HxModule, ModuleLoader, ModuleResolver};
use crate::push::PushBridge;
use crate::reason::{Maybe, Reason};
use crate::request::CallbackPushAddressing;
use crate::scope::types::ScopeInner;
use crate::scope::HxScope;
use crate::session::ServicesSession;
use crate::types::{identity_key, Component};
use log::{debug, info};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};
use tokio::sync::OnceCell;
use uuid::Uuid;

pub(crate) struct ApplicationInner {
    denotation: Arc<ApplicationDenotation>,
    root_denotation: Arc<ScopeDenotation>,
    settings: HostSettings,
    services_session: Arc<dyn ServicesSession>,
    evaluator: ServiceEvaluator,
    modules: ModuleLoader,
    push_channel_id: String,
    root_scope: OnceCell<HxScope>,
    component_scopes: Mutex<HashMap<usize, Weak<ScopeInner>>>,
}

/// **APPLICATION HANDLE**
///
/// Cheap to clone; all clones share one runtime.
#[derive(Clone)]
pub struct HxApplication {
    inner: Arc<ApplicationInner>,
}

impl HxApplication {
    /// Validates the configuration. The root scope is created by
    /// [`initialize`](Self::initialize).
    pub fn new(
        denotation: Arc<ApplicationDenotation>,
        settings: HostSettings,
        services_session: Arc<dyn ServicesSession>,
        module_resolver: Arc<dyn ModuleResolver>,
    ) -> Result<Self, HxError> {
        let root_denotation = denotation.root_scope.clone().ok_or_else(|| {
            HxError::configuration(
                error_codes::MISSING_ROOT_SCOPE,
                format!(
                    "Application {} has no root scope",
                    denotation.application_id
                ),
            )
        })?;
        settings.validate()?;

        let push_channel_id = Uuid::new_v4().to_string();
        info!(
            "Application {} using push channel {}",
            denotation.application_id, push_channel_id
        );

        Ok(Self {
            inner: Arc::new(ApplicationInner {
                denotation,
                root_denotation,
                settings,
                services_session,
                evaluator: ServiceEvaluator::new(),
                modules: ModuleLoader::new(module_resolver),
                push_channel_id,
                root_scope: OnceCell::new(),
                component_scopes: Mutex::new(HashMap::new()),
            }),
        })
    }

    /// Creates the root scope and its controllers. Idempotent.
    pub async fn initialize(&self) -> Result<HxScope, HxError> {
        self.inner
            .root_scope
            .get_or_try_init(|| {
                HxScope::create(self.clone(), Arc::clone(&self.inner.root_denotation), None)
            })
            .await
            .cloned()
    }

    /// [`new`](Self::new) followed by [`initialize`](Self::initialize).
    pub async fn start(
        denotation: Arc<ApplicationDenotation>,
        settings: HostSettings,
        services_session: Arc<dyn ServicesSession>,
        module_resolver: Arc<dyn ModuleResolver>,
    ) -> Result<Self, HxError> {
        let application = Self::new(denotation, settings, services_session, module_resolver)?;
        application.initialize().await?;
        Ok(application)
    }

    pub fn title(&self) -> &str {
        &self.inner.denotation.title
    }

    pub fn application_id(&self) -> &str {
        &self.inner.denotation.application_id
    }

    pub fn denotation(&self) -> &Arc<ApplicationDenotation> {
        &self.inner.denotation
    }

    pub fn host_settings(&self) -> &HostSettings {
        &self.inner.settings
    }

    pub fn services_session(&self) -> &Arc<dyn ServicesSession> {
        &self.inner.services_session
    }

    pub fn local_evaluator(&self) -> &ServiceEvaluator {
        &self.inner.evaluator
    }

    /// Evaluator that sends requests to the services host.
    pub fn evaluator(&self) -> ServiceEvaluator {
        self.inner.services_session.evaluator()
    }

    pub fn service_processor_binder(&self) -> ServiceProcessorBinder {
        ServiceProcessorBinder::new(self.inner.evaluator.clone(), self.downgrade())
    }

    pub fn push_channel_id(&self) -> &str {
        &self.inner.push_channel_id
    }

    pub fn new_push_address(&self, service_id: Option<&str>) -> CallbackPushAddressing {
        CallbackPushAddressing {
            push_channel_id: self.inner.push_channel_id.clone(),
            service_id: service_id.map(str::to_string),
        }
    }

    /// Bridge feeding pushed payloads into this application's evaluator.
    pub fn push_bridge(&self) -> PushBridge {
        PushBridge::new(self.clone())
    }

    pub fn root_scope(&self) -> Result<HxScope, HxError> {
        self.inner.root_scope.get().cloned().ok_or_else(|| {
            HxError::resolution(
                error_codes::ROOT_SCOPE_NOT_INITIALIZED,
                "Root scope was not initialized, call initialize() first",
            )
        })
    }

    /// Scope owning `component`.
    pub fn scope_of<C: ?Sized>(&self, component: &Arc<C>) -> Maybe<HxScope> {
        let scope = self
            .inner
            .component_scopes
            .lock()
            .get(&identity_key(component))
            .and_then(Weak::upgrade);
        scope
            .map(|inner| HxScope { inner })
            .ok_or_else(|| Reason::not_found("Scope not found for component"))
    }

    pub(crate) fn register_component(&self, component: &Component, scope: &HxScope) {
        self.inner
            .component_scopes
            .lock()
            .insert(identity_key(component), Arc::downgrade(&scope.inner));
    }

    /// Removes `component` from its owning scope. Releasing it again is
    /// `NotFound`.
    pub fn release_component<C: ?Sized>(&self, component: &Arc<C>) -> Maybe<bool> {
        let key = identity_key(component);
        let scope = self.inner.component_scopes.lock().remove(&key);
        let scope = scope
            .and_then(|weak| weak.upgrade())
            .map(|inner| HxScope { inner })
            .ok_or_else(|| Reason::not_found("Scope not found for component"))?;

        let denotation = scope.evict(key)?;
        debug!("Released {} from {}", denotation.type_signature(), scope);
        Ok(true)
    }

    /// Human readable description of `component` for diagnostics.
    pub fn print_component<C: ?Sized>(&self, component: &Arc<C>, include_scope: bool) -> String {
        let Ok(scope) = self.scope_of(component) else {
            return "Unknown component, whose scope cannot be found.".to_string();
        };
        let from_scope = if include_scope {
            format!(" from {}", scope)
        } else {
            String::new()
        };

        match scope.find_denotation_for(component) {
            Ok(denotation) => format!("{:?}{}", denotation, from_scope),
            Err(_) => format!(
                "Unknown component, whose denotation cannot be found{}.",
                from_scope
            ),
        }
    }

    /// Module supplying factories for `module`; `None` is the platform module.
    pub async fn resolve_module(
        &self,
        module: Option<&Arc<UxModule>>,
    ) -> Result<Arc<HxModule>, HxError> {
        self.inner.modules.resolve(self, module).await
    }

    pub fn load_css(&self, module: &UxModule, css_path: &str) -> bool {
        self.inner.modules.load_css(&self.inner.settings, module, css_path)
    }

    pub fn css_resources(&self) -> Vec<String> {
        self.inner.modules.css_resources()
    }

    pub fn downgrade(&self) -> WeakApplication {
        WeakApplication {
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub(crate) fn downgrade_inner(&self) -> Weak<ApplicationInner> {
        Arc::downgrade(&self.inner)
    }

    pub(crate) fn from_inner(inner: &Weak<ApplicationInner>) -> Option<Self> {
        inner.upgrade().map(|inner| Self { inner })
    }
}

impl fmt::Debug for HxApplication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HxApplication")
            .field("application_id", &self.inner.denotation.application_id)
            .field("push_channel_id", &self.inner.push_channel_id)
            .field("initialized", &self.inner.root_scope.initialized())
            .finish()
    }
}

/// Non-owning application handle for components and processors.
#[derive(Clone, Default)]
pub struct WeakApplication {
    inner: Weak<ApplicationInner>,
}

impl WeakApplication {
    pub fn upgrade(&self) -> Option<HxApplication> {
        HxApplication::from_inner(&self.inner)
    }
}

impl fmt::Debug for WeakApplication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WeakApplication")
    }
}
