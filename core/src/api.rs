pub use crate::application::{HxApplication, WeakApplication};
pub use crate::config::HostSettings;
pub use crate::denotation::{
    AccessSessionFactoryDenotation, ApplicationDenotation, ApplicationDomainSupplier,
    ComponentDenotation, DenotationMap, FallbackDomainSupplier, ScopeDenotation,
    ServiceSessionFactoryDenotation, SessionDenotation, StaticDomainSupplier, UrlDomainSupplier,
    UxModule,
};
pub use crate::dispatch::{
    processor_fn, AttributeContext, DialogComponent, EvalContext, RequestDialog,
    ServiceEvaluator, ServiceProcessor, ServiceProcessorBinder, Unbinder,
};
pub use crate::domain::DomainSupplier;
pub use crate::errors::{error_codes, HxError};
pub use crate::module::{
    ComponentRegistry, CreationContext, ModuleBindingContext, ModuleContract, ModuleResolver,
    StaticModuleResolver,
};
pub use crate::push::{JsonRequestCodec, PushBridge, PushDelivery, PushEvent, PushStats};
pub use crate::reason::{Maybe, Reason, ReasonKind};
pub use crate::request::{
    CallbackPushAddressing, DispatchableRequest, Evaluable, ServiceRequest,
};
pub use crate::scope::{HxScope, WeakScope};
pub use crate::session::{
    DecodedEntity, PersistenceSession, RemoteSessionFactory, ServicesSession, SessionFactory,
    SessionHolder,
};
pub use crate::types::{AsAny, Component};
