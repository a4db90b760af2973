use crate::reason::{Maybe, Reason};
use parking_lot::RwLock;
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type AttributeValue = Arc<dyn Any + Send + Sync>;

/// **REQUEST ATTRIBUTE CONTEXT**
///
/// Mutable bag of typed attributes visible to a processor during one
/// evaluation. Attributes are keyed by their value type. Lookups fall back to
/// the parent context when the attribute is not set locally.
#[derive(Clone, Default)]
pub struct AttributeContext {
    frame: Arc<AttributeFrame>,
}

#[derive(Default)]
struct AttributeFrame {
    parent: Option<AttributeContext>,
    attributes: RwLock<HashMap<TypeId, AttributeValue>>,
}

impl AttributeContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Child context inheriting every attribute of `self`.
    pub fn derive(&self) -> Self {
        Self {
            frame: Arc::new(AttributeFrame {
                parent: Some(self.clone()),
                attributes: RwLock::new(HashMap::new()),
            }),
        }
    }

    pub fn set_attribute<A: Any + Send + Sync>(&self, value: A) {
        self.frame
            .attributes
            .write()
            .insert(TypeId::of::<A>(), Arc::new(value));
    }

    /// Copies the attributes set directly on `self` into `target`.
    pub(crate) fn copy_local_into(&self, target: &AttributeContext) {
        let local = self.frame.attributes.read().clone();
        target.frame.attributes.write().extend(local);
    }

    pub fn find_attribute<A: Any + Send + Sync>(&self) -> Option<Arc<A>> {
        let key = TypeId::of::<A>();
        let mut current = Some(self);
        while let Some(context) = current {
            let local = context.frame.attributes.read().get(&key).cloned();
            if let Some(value) = local {
                return value.downcast::<A>().ok();
            }
            current = context.frame.parent.as_ref();
        }
        None
    }

    pub fn get_attribute<A: Any + Send + Sync>(&self) -> Maybe<Arc<A>> {
        self.find_attribute::<A>()
            .ok_or_else(|| Reason::not_found(format!("Attribute not found: {}", type_name::<A>())))
    }

    pub fn find_or_default<A: Any + Send + Sync>(&self, default: A) -> Arc<A> {
        self.find_attribute::<A>().unwrap_or_else(|| Arc::new(default))
    }

    /// Whether the attribute is set on this context itself, ignoring parents.
    pub fn has_local_attribute<A: Any + Send + Sync>(&self) -> bool {
        self.frame.attributes.read().contains_key(&TypeId::of::<A>())
    }
}

impl fmt::Debug for AttributeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeContext")
            .field("local_attributes", &self.frame.attributes.read().len())
            .field("has_parent", &self.frame.parent.is_some())
            .finish()
    }
}
