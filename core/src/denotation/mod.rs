pub mod map;
pub mod platform;
pub mod types;

pub use map::DenotationMap;
pub use platform::{
    AccessSessionFactoryDenotation, ApplicationDomainSupplier, FallbackDomainSupplier,
    ServiceSessionFactoryDenotation, SessionDenotation, StaticDomainSupplier, UrlDomainSupplier,
};
pub use types::{ApplicationDenotation, ComponentDenotation, ScopeDenotation, UxModule};
