use crate::application::{ApplicationInner, HxApplication};
use crate::denotation::{ComponentDenotation, DenotationMap, ScopeDenotation};
use crate::errors::{error_codes, HxError};
use crate::types::Component;
use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};
use tokio::sync::OnceCell;

pub(crate) type ComponentSlot = Arc<OnceCell<Component>>;
pub(crate) type ScopeSlot = Arc<OnceCell<HxScope>>;

pub(crate) struct ScopeInner {
    pub(crate) application: Weak<ApplicationInner>,
    pub(crate) denotation: Arc<ScopeDenotation>,
    pub(crate) parent: Option<Weak<ScopeInner>>,
    pub(crate) components: Mutex<DenotationMap<dyn ComponentDenotation, ComponentSlot>>,
    pub(crate) children: Mutex<DenotationMap<ScopeDenotation, ScopeSlot>>,
    pub(crate) domain: OnceCell<String>,
}

/// **SCOPE**
///
/// Node of the scope tree. Owns a per-scope cache of components keyed by
/// denotation identity. Clones are handles to the same node.
#[derive(Clone)]
pub struct HxScope {
    pub(crate) inner: Arc<ScopeInner>,
}

impl HxScope {
    pub(crate) fn new_node(
        application: &HxApplication,
        denotation: Arc<ScopeDenotation>,
        parent: Option<&HxScope>,
    ) -> Self {
        Self {
            inner: Arc::new(ScopeInner {
                application: application.downgrade_inner(),
                denotation,
                parent: parent.map(|p| Arc::downgrade(&p.inner)),
                components: Mutex::new(DenotationMap::new()),
                children: Mutex::new(DenotationMap::new()),
                domain: OnceCell::new(),
            }),
        }
    }

    pub fn denotation(&self) -> &Arc<ScopeDenotation> {
        &self.inner.denotation
    }

    pub fn name(&self) -> &str {
        &self.inner.denotation.name
    }

    pub fn parent(&self) -> Option<HxScope> {
        self.inner
            .parent
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|inner| HxScope { inner })
    }

    pub fn is_root(&self) -> bool {
        self.inner.parent.is_none()
    }

    pub fn application(&self) -> Result<HxApplication, HxError> {
        HxApplication::from_inner(&self.inner.application).ok_or_else(|| {
            HxError::resolution(
                error_codes::SCOPE_DETACHED,
                format!("{} outlived its application", self),
            )
        })
    }

    /// Names from the root down to this scope, joined with `/`.
    pub fn scope_path(&self) -> String {
        match self.parent() {
            Some(parent) => format!("{}/{}", parent.scope_path(), self.name()),
            None => self.name().to_string(),
        }
    }

    /// Nearest scope on the ancestor chain (self included) created for `denotation`.
    pub fn find_ancestor(&self, denotation: &Arc<ScopeDenotation>) -> Option<HxScope> {
        let mut current = Some(self.clone());
        while let Some(scope) = current {
            if Arc::ptr_eq(&scope.inner.denotation, denotation) {
                return Some(scope);
            }
            current = scope.parent();
        }
        None
    }

    /// Number of component slots currently cached.
    pub fn cached_components(&self) -> usize {
        self.inner.components.lock().len()
    }

    pub fn ptr_eq(&self, other: &HxScope) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn downgrade(&self) -> WeakScope {
        WeakScope {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

impl fmt::Display for HxScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HxScope[{}]", self.scope_path())
    }
}

impl fmt::Debug for HxScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HxScope")
            .field("path", &self.scope_path())
            .field("components", &self.cached_components())
            .finish()
    }
}

/// Non-owning handle to a scope, held by components that need their scope
/// back without keeping it alive.
#[derive(Clone, Default)]
pub struct WeakScope {
    inner: Weak<ScopeInner>,
}

impl WeakScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upgrade(&self) -> Option<HxScope> {
        self.inner.upgrade().map(|inner| HxScope { inner })
    }
}

impl fmt::Debug for WeakScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(scope) => write!(f, "WeakScope({})", scope),
            None => f.write_str("WeakScope(<dropped>)"),
        }
    }
}
