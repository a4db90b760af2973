//! # HYDRUX TYPE DEFINITIONS
//!
//! Shared aliases and the type-erasure helpers the resolver and the evaluator
//! are built on.

use std::any::Any;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed, `Send` future used at recursive and type-erased async seams.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A live component instance, type-erased. Its identity is its allocation.
pub type Component = Arc<dyn Any + Send + Sync>;

/// **UPCAST SUPPORT**
///
/// Supertrait of every denotation and request trait, so trait objects can be
/// downcast to their concrete type. Call through a `&dyn Trait` (for example
/// `(*arc).as_any()`), never directly on the `Arc`.
pub trait AsAny: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Identity key of a shared allocation, independent of the pointer's metadata.
pub fn identity_key<T: ?Sized>(value: &Arc<T>) -> usize {
    Arc::as_ptr(value) as *const () as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Marker(u32);

    #[test]
    fn test_identity_key_survives_erasure() {
        let typed = Arc::new(Marker(1));
        let erased: Component = typed.clone();
        assert_eq!(identity_key(&typed), identity_key(&erased));

        let back = erased.downcast::<Marker>().unwrap();
        assert!(Arc::ptr_eq(&typed, &back));
    }

    #[test]
    fn test_identity_key_distinguishes_equal_values() {
        let a = Arc::new(Marker(1));
        let b = Arc::new(Marker(1));
        assert_eq!(*a, *b);
        assert_ne!(identity_key(&a), identity_key(&b));
    }
}
