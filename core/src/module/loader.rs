use crate::application::HxApplication;
use crate::config::HostSettings;
use crate::denotation::{DenotationMap, UxModule};
use crate::dispatch::ServiceProcessorBinder;
use crate::errors::{error_codes, HxError};
use crate::module::registry::ComponentRegistry;
use crate::platform::PlatformModule;
use crate::request::add_to_path;
use async_trait::async_trait;
use log::{debug, info};
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Name of the built-in module supplying session factories and domain suppliers.
pub const PLATFORM_MODULE_NAME: &str = "hydrux-platform";

const MODULE_ENTRY_POINT: &str = "index.js";

/// **MODULE CONTRACT**
///
/// Single entry point of a loadable code unit.
pub trait ModuleContract: Send + Sync {
    fn bind(&self, context: &mut ModuleBindingContext<'_>) -> Result<(), HxError>;
}

/// Everything a module may touch while binding.
pub struct ModuleBindingContext<'a> {
    module: &'a UxModule,
    registry: &'a mut ComponentRegistry,
    processors: ServiceProcessorBinder,
    application: &'a HxApplication,
}

impl ModuleBindingContext<'_> {
    pub fn component_binder(&mut self) -> &mut ComponentRegistry {
        &mut *self.registry
    }

    pub fn service_processor_binder(&self) -> &ServiceProcessorBinder {
        &self.processors
    }

    pub fn current_ux_module(&self) -> &UxModule {
        self.module
    }

    /// Registers a stylesheet shipped next to `module`'s entry point.
    pub fn load_css(&self, module: &UxModule, css_path: &str) -> bool {
        self.application.load_css(module, css_path)
    }
}

/// Pluggable capability locating the code of a module.
#[async_trait]
pub trait ModuleResolver: Send + Sync {
    async fn load_module(
        &self,
        module: &UxModule,
        url: &str,
    ) -> Result<Arc<dyn ModuleContract>, HxError>;
}

/// **STATIC MODULE RESOLVER**
///
/// Compiled-in registry of module contracts, keyed by module name.
#[derive(Default)]
pub struct StaticModuleResolver {
    contracts: RwLock<HashMap<String, Arc<dyn ModuleContract>>>,
}

impl StaticModuleResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, name: impl Into<String>, contract: Arc<dyn ModuleContract>) {
        self.contracts.write().insert(name.into(), contract);
    }

    pub fn with_module(self, name: impl Into<String>, contract: Arc<dyn ModuleContract>) -> Self {
        self.register(name, contract);
        self
    }
}

#[async_trait]
impl ModuleResolver for StaticModuleResolver {
    async fn load_module(
        &self,
        module: &UxModule,
        url: &str,
    ) -> Result<Arc<dyn ModuleContract>, HxError> {
        self.contracts
            .read()
            .get(&module.name)
            .cloned()
            .ok_or_else(|| {
                HxError::module(
                    error_codes::MODULE_NOT_FOUND,
                    format!("UxModule {} not found at {}", module.name, url),
                )
            })
    }
}

/// A bound module: its descriptor and the factories it registered.
pub struct HxModule {
    module: Arc<UxModule>,
    registry: ComponentRegistry,
}

impl HxModule {
    fn bind(
        application: &HxApplication,
        module: Arc<UxModule>,
        contract: &dyn ModuleContract,
    ) -> Result<Self, HxError> {
        let mut registry = ComponentRegistry::new(&module);
        let mut context = ModuleBindingContext {
            module: &module,
            registry: &mut registry,
            processors: application.service_processor_binder(),
            application,
        };
        contract.bind(&mut context)?;
        debug!(
            "UxModule {} bound {} component factories",
            module.name,
            registry.len()
        );

        Ok(Self { module, registry })
    }

    pub fn ux_module(&self) -> &Arc<UxModule> {
        &self.module
    }

    pub fn component_registry(&self) -> &ComponentRegistry {
        &self.registry
    }
}

impl fmt::Debug for HxModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HxModule")
            .field("module", &self.module)
            .field("registry", &self.registry)
            .finish()
    }
}

/// URL of a module: absolute paths and full URLs as is, anything else
/// relative to the services URL.
pub fn module_url(services_url: &str, module: &UxModule) -> String {
    let path = module.path.as_str();
    if path.starts_with('/') || path.contains(':') {
        path.to_string()
    } else {
        add_to_path(services_url, path)
    }
}

type ModuleSlot = Arc<OnceCell<Arc<HxModule>>>;

/// **MODULE LOADER**
///
/// Loads each module at most once at a time. Concurrent requests for the same
/// module share one load; a failed load leaves the slot empty so the next
/// request retries.
pub(crate) struct ModuleLoader {
    resolver: Arc<dyn ModuleResolver>,
    platform: OnceCell<Arc<HxModule>>,
    modules: Mutex<DenotationMap<UxModule, ModuleSlot>>,
    css_resources: Mutex<BTreeSet<String>>,
}

impl ModuleLoader {
    pub(crate) fn new(resolver: Arc<dyn ModuleResolver>) -> Self {
        Self {
            resolver,
            platform: OnceCell::new(),
            modules: Mutex::new(DenotationMap::new()),
            css_resources: Mutex::new(BTreeSet::new()),
        }
    }

    pub(crate) async fn resolve(
        &self,
        application: &HxApplication,
        module: Option<&Arc<UxModule>>,
    ) -> Result<Arc<HxModule>, HxError> {
        let Some(module) = module else {
            return self
                .platform
                .get_or_try_init(|| async {
                    let platform = Arc::new(UxModule::new(PLATFORM_MODULE_NAME, ""));
                    HxModule::bind(application, platform, &PlatformModule).map(Arc::new)
                })
                .await
                .cloned();
        };

        let slot = Arc::clone(
            self.modules
                .lock()
                .get_or_insert_with(module, || Arc::new(OnceCell::new())),
        );
        slot.get_or_try_init(|| self.load(application, module))
            .await
            .cloned()
    }

    async fn load(
        &self,
        application: &HxApplication,
        module: &Arc<UxModule>,
    ) -> Result<Arc<HxModule>, HxError> {
        let url = module_url(&application.host_settings().services_url, module);
        info!("Loading UxModule {} from {}", module.name, url);

        let contract = self.resolver.load_module(module, &url).await?;
        HxModule::bind(application, Arc::clone(module), contract.as_ref())
            .map(Arc::new)
            .map_err(|e| match e {
                e @ HxError::Module { .. } => e,
                other => HxError::module(
                    error_codes::MODULE_LOAD_FAILED,
                    format!("Binding UxModule {} failed: {}", module.name, other),
                ),
            })
    }

    /// Registers `<module base>/<css_path>` once. Only modules whose URL ends
    /// in the entry point file have a base to resolve against.
    pub(crate) fn load_css(&self, settings: &HostSettings, module: &UxModule, css_path: &str) -> bool {
        let url = module_url(&settings.services_url, module);
        let Some(base) = url.strip_suffix(MODULE_ENTRY_POINT) else {
            debug!("UxModule {} has no entry point base, ignoring css {}", module.name, css_path);
            return false;
        };

        let css = format!("{}{}", base, css_path);
        let added = self.css_resources.lock().insert(css.clone());
        if added {
            info!("Registered css resource {}", css);
        }
        added
    }

    pub(crate) fn css_resources(&self) -> Vec<String> {
        self.css_resources.lock().iter().cloned().collect()
    }
}
