use crate::application::{HxApplication, WeakApplication};
use crate::denotation::ComponentDenotation;
use crate::dispatch::context::AttributeContext;
use crate::dispatch::evaluator::{ServiceEvaluator, Unbinder};
use crate::errors::{error_codes, HxError};
use crate::reason::{Maybe, Reason};
use crate::request::{Evaluable, ServiceRequest};
use crate::types::{BoxFuture, Component};
use async_trait::async_trait;
use std::any::Any;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

/// **SERVICE PROCESSOR**
///
/// Handles one request type. Processors are free to suspend; the evaluator
/// imposes no timeout.
#[async_trait]
pub trait ServiceProcessor<R: Evaluable>: Send + Sync + 'static {
    async fn process(&self, context: &AttributeContext, request: Arc<R>) -> Maybe<R::Response>;
}

/// Processor backed by an async closure.
pub struct FnProcessor<F> {
    handler: F,
}

/// Wraps `handler` so it can be bound like any other [`ServiceProcessor`].
pub fn processor_fn<R, F, Fut>(handler: F) -> FnProcessor<F>
where
    R: Evaluable,
    F: Fn(AttributeContext, Arc<R>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Maybe<R::Response>> + Send + 'static,
{
    FnProcessor { handler }
}

#[async_trait]
impl<R, F, Fut> ServiceProcessor<R> for FnProcessor<F>
where
    R: Evaluable,
    F: Fn(AttributeContext, Arc<R>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Maybe<R::Response>> + Send + 'static,
{
    async fn process(&self, context: &AttributeContext, request: Arc<R>) -> Maybe<R::Response> {
        (self.handler)(context.clone(), request).await
    }
}

/// Response of a type-erased evaluation.
pub type ErasedResponse = Box<dyn Any + Send>;

/// Type-erased processor stored in the evaluator's tables.
pub(crate) trait ErasedProcessor: Send + Sync {
    fn process(
        &self,
        context: AttributeContext,
        request: Arc<dyn ServiceRequest>,
    ) -> BoxFuture<'static, Maybe<ErasedResponse>>;
}

pub(crate) struct TypedProcessor<R, P> {
    processor: Arc<P>,
    _request: PhantomData<fn() -> R>,
}

impl<R, P> TypedProcessor<R, P> {
    pub(crate) fn new(processor: P) -> Self {
        Self {
            processor: Arc::new(processor),
            _request: PhantomData,
        }
    }
}

impl<R, P> ErasedProcessor for TypedProcessor<R, P>
where
    R: Evaluable,
    P: ServiceProcessor<R>,
{
    fn process(
        &self,
        context: AttributeContext,
        request: Arc<dyn ServiceRequest>,
    ) -> BoxFuture<'static, Maybe<ErasedResponse>> {
        let processor = Arc::clone(&self.processor);
        Box::pin(async move {
            let signature = request.type_signature();
            let typed = request.into_any_arc().downcast::<R>().map_err(|_| {
                Reason::failure(format!(
                    "Processor bound for {} received a request of another type",
                    signature
                ))
            })?;
            let response = processor.process(&context, typed).await?;
            Ok(Box::new(response) as ErasedResponse)
        })
    }
}

/// **REQUEST DIALOG**
///
/// A processor that also presents UI and waits for the user. The dialog is a
/// component: the scope tree creates it, the dispatch table drives it.
#[async_trait]
pub trait RequestDialog<R: Evaluable>: Send + Sync {
    async fn show(&self, context: &AttributeContext, request: Arc<R>) -> Maybe<R::Response>;
}

/// Component type under which dialog factories register their instances.
pub type DialogComponent<R> = Box<dyn RequestDialog<R>>;

/// Releases a resolved dialog when dropped, so completion, failure and a
/// dropped evaluation future all end the dialog's life the same way.
struct DialogRelease {
    application: HxApplication,
    component: Component,
}

impl Drop for DialogRelease {
    fn drop(&mut self) {
        if let Err(reason) = self.application.release_component(&self.component) {
            log::warn!("Failed to release dialog component: {}", reason.full_text());
        }
    }
}

pub(crate) struct DialogProcessor {
    application: WeakApplication,
    denotation: Arc<dyn ComponentDenotation>,
    // One dialog of a binding is live at a time.
    turn: tokio::sync::Mutex<()>,
}

#[async_trait]
impl<R: Evaluable> ServiceProcessor<R> for DialogProcessor {
    async fn process(&self, context: &AttributeContext, request: Arc<R>) -> Maybe<R::Response> {
        let application = self.application.upgrade().ok_or_else(|| {
            Reason::failure(format!(
                "Application gone while dispatching {}",
                request.type_signature()
            ))
        })?;
        let _turn = self.turn.lock().await;
        let root = application.root_scope().map_err(HxError::into_reason)?;
        let component = root
            .resolve_component(Arc::clone(&self.denotation))
            .await
            .map_err(HxError::into_reason)?;

        let release = DialogRelease {
            application,
            component: Arc::clone(&component),
        };
        let dialog = component.downcast::<DialogComponent<R>>().map_err(|_| {
            HxError::resolution(
                error_codes::COMPONENT_TYPE_MISMATCH,
                format!(
                    "{} did not resolve to a dialog for {}",
                    self.denotation.type_signature(),
                    request.type_signature()
                ),
            )
            .into_reason()
        })?;

        let outcome = dialog.show(context, request).await;
        drop(release);
        outcome
    }
}

/// **SERVICE PROCESSOR BINDER**
///
/// Binding surface handed to modules. Every binding lands in the
/// application's local evaluator.
#[derive(Clone)]
pub struct ServiceProcessorBinder {
    evaluator: ServiceEvaluator,
    application: WeakApplication,
}

impl ServiceProcessorBinder {
    pub(crate) fn new(evaluator: ServiceEvaluator, application: WeakApplication) -> Self {
        Self {
            evaluator,
            application,
        }
    }

    pub fn bind<R, P>(&self, processor: P) -> Unbinder
    where
        R: Evaluable,
        P: ServiceProcessor<R>,
    {
        self.evaluator.bind::<R, P>(processor)
    }

    pub fn bind_dispatching<R, P>(&self, routing_id: impl Into<String>, processor: P) -> Unbinder
    where
        R: Evaluable,
        P: ServiceProcessor<R>,
    {
        self.evaluator.bind_dispatching::<R, P>(routing_id, processor)
    }

    /// Binds `R` to the dialog component `denotation` resolves to. Each
    /// evaluation gets a fresh dialog, released once it settles or is
    /// dropped. Evaluations of one binding show their dialogs one at a time.
    pub fn bind_dialog<R: Evaluable>(&self, denotation: Arc<dyn ComponentDenotation>) -> Unbinder {
        self.evaluator.bind::<R, DialogProcessor>(DialogProcessor {
            application: self.application.clone(),
            denotation,
            turn: tokio::sync::Mutex::new(()),
        })
    }

    pub fn evaluator(&self) -> &ServiceEvaluator {
        &self.evaluator
    }
}
