use crate::dispatch::context::AttributeContext;
use crate::dispatch::processor::{ErasedProcessor, ErasedResponse, ServiceProcessor, TypedProcessor};
use crate::reason::{Maybe, Reason};
use crate::request::{request_type_id, routing_id, Evaluable, ServiceRequest};
use crate::types::{identity_key, BoxFuture};
use log::debug;
use parking_lot::RwLock;
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

type ProcessorEntry = Arc<dyn ErasedProcessor>;

#[derive(Default)]
struct BindingTables {
    processors: HashMap<TypeId, ProcessorEntry>,
    dispatching: HashMap<TypeId, HashMap<String, ProcessorEntry>>,
}

impl BindingTables {
    fn lookup(&self, request: &dyn ServiceRequest) -> Option<ProcessorEntry> {
        let type_id = request_type_id(request);
        routing_id(request)
            .and_then(|id| self.dispatching.get(&type_id)?.get(id))
            .or_else(|| self.processors.get(&type_id))
            .cloned()
    }
}

/// **SERVICE EVALUATOR**
///
/// Two-tier processor registry. Requests are matched by exact type, refined
/// by routing id for dispatchable requests:
///
/// 1. `(type, routing id)` in the dispatching table, when the request carries
///    a non-empty routing id
/// 2. `type` in the flat table
///
/// Binding is last-writer-wins per key. Clones share the same tables.
#[derive(Clone, Default)]
pub struct ServiceEvaluator {
    tables: Arc<RwLock<BindingTables>>,
    ambient: AttributeContext,
}

impl ServiceEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context every evaluation without an explicit parent inherits from.
    pub fn ambient_context(&self) -> &AttributeContext {
        &self.ambient
    }

    pub fn bind<R, P>(&self, processor: P) -> Unbinder
    where
        R: Evaluable,
        P: ServiceProcessor<R>,
    {
        let type_id = TypeId::of::<R>();
        let entry: ProcessorEntry = Arc::new(TypedProcessor::<R, P>::new(processor));
        debug!("Binding processor for {}", type_name::<R>());

        self.tables.write().processors.insert(type_id, Arc::clone(&entry));
        Unbinder {
            tables: Arc::downgrade(&self.tables),
            key: BindingKey::Flat(type_id),
            entry,
        }
    }

    pub fn bind_dispatching<R, P>(&self, routing_id: impl Into<String>, processor: P) -> Unbinder
    where
        R: Evaluable,
        P: ServiceProcessor<R>,
    {
        let type_id = TypeId::of::<R>();
        let routing_id = routing_id.into();
        let entry: ProcessorEntry = Arc::new(TypedProcessor::<R, P>::new(processor));
        debug!(
            "Binding dispatching processor for {} with routing id '{}'",
            type_name::<R>(),
            routing_id
        );

        self.tables
            .write()
            .dispatching
            .entry(type_id)
            .or_default()
            .insert(routing_id.clone(), Arc::clone(&entry));
        Unbinder {
            tables: Arc::downgrade(&self.tables),
            key: BindingKey::Dispatching(type_id, routing_id),
            entry,
        }
    }

    pub fn eval<R: Evaluable>(&self, request: R) -> EvalContext<R> {
        self.eval_shared(Arc::new(request))
    }

    pub fn eval_shared<R: Evaluable>(&self, request: Arc<R>) -> EvalContext<R> {
        EvalContext {
            evaluator: self.clone(),
            request,
            parent: None,
            attributes: AttributeContext::new(),
        }
    }

    /// Evaluates a request whose concrete type is only known at runtime, as
    /// happens for decoded push payloads.
    pub fn eval_dyn(
        &self,
        request: Arc<dyn ServiceRequest>,
        context: AttributeContext,
    ) -> BoxFuture<'static, Maybe<ErasedResponse>> {
        let processor = self.tables.read().lookup(request.as_ref());
        match processor {
            Some(processor) => processor.process(context, request),
            None => {
                let reason = unsupported(request.as_ref());
                Box::pin(async move { Err(reason) })
            }
        }
    }

    pub fn has_processor(&self, request: &dyn ServiceRequest) -> bool {
        self.tables.read().lookup(request).is_some()
    }
}

impl fmt::Debug for ServiceEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tables = self.tables.read();
        f.debug_struct("ServiceEvaluator")
            .field("processors", &tables.processors.len())
            .field("dispatching", &tables.dispatching.len())
            .finish()
    }
}

fn unsupported(request: &dyn ServiceRequest) -> Reason {
    let signature = request.type_signature();
    let text = match request.as_dispatchable() {
        None => format!("No processor bound for request type {}", signature),
        Some(_) => match routing_id(request) {
            Some(id) => format!(
                "No processor bound for dispatchable request type {} with routing id '{}'",
                signature, id
            ),
            None => format!(
                "No processor bound for dispatchable request type {} (no routing id present)",
                signature
            ),
        },
    };
    Reason::unsupported_operation(text)
}

/// Pending evaluation of one request.
pub struct EvalContext<R: Evaluable> {
    evaluator: ServiceEvaluator,
    request: Arc<R>,
    parent: Option<AttributeContext>,
    attributes: AttributeContext,
}

impl<R: Evaluable> EvalContext<R> {
    /// Inherit attributes from `parent` instead of the evaluator's ambient context.
    pub fn with_parent_context(mut self, parent: &AttributeContext) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    /// Pre-populates an attribute the processor will see.
    pub fn with_attribute<A: Any + Send + Sync>(self, value: A) -> Self {
        self.attributes.set_attribute(value);
        self
    }

    pub async fn and_get_reasoned(self) -> Maybe<R::Response> {
        let parent = self
            .parent
            .unwrap_or_else(|| self.evaluator.ambient.clone());
        let context = parent.derive();
        self.attributes.copy_local_into(&context);

        let request: Arc<dyn ServiceRequest> = self.request;
        let response = self.evaluator.eval_dyn(request, context).await?;
        response.downcast::<R::Response>().map(|boxed| *boxed).map_err(|_| {
            Reason::failure(format!(
                "Processor returned an unexpected response type for {}",
                type_name::<R>()
            ))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum BindingKey {
    Flat(TypeId),
    Dispatching(TypeId, String),
}

/// **UNBINDER**
///
/// Handle returned by every bind call. Unbinding removes exactly the
/// processor this handle bound; a later rebind of the same key survives.
pub struct Unbinder {
    tables: Weak<RwLock<BindingTables>>,
    key: BindingKey,
    entry: ProcessorEntry,
}

impl Unbinder {
    /// Returns `false` when the binding was already replaced or removed.
    pub fn unbind(&self) -> bool {
        let Some(tables) = self.tables.upgrade() else {
            return false;
        };
        let mut tables = tables.write();
        let ours = |bound: &ProcessorEntry| identity_key(bound) == identity_key(&self.entry);

        match &self.key {
            BindingKey::Flat(type_id) => {
                if tables.processors.get(type_id).is_some_and(ours) {
                    tables.processors.remove(type_id);
                    return true;
                }
                false
            }
            BindingKey::Dispatching(type_id, routing_id) => {
                let Some(inner) = tables.dispatching.get_mut(type_id) else {
                    return false;
                };
                if !inner.get(routing_id).is_some_and(ours) {
                    return false;
                }
                inner.remove(routing_id);
                if inner.is_empty() {
                    tables.dispatching.remove(type_id);
                }
                true
            }
        }
    }
}

impl fmt::Debug for Unbinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unbinder").field("key", &self.key).finish()
    }
}
