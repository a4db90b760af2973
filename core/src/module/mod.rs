pub mod loader;
pub mod registry;

pub(crate) use loader::ModuleLoader;
pub use loader::{
    module_url, HxModule, ModuleBindingContext, ModuleContract, ModuleResolver,
    StaticModuleResolver, PLATFORM_MODULE_NAME,
};
pub use registry::{ComponentRegistry, CreationContext};
