pub mod context;
pub mod evaluator;
pub mod processor;

pub use context::AttributeContext;
pub use evaluator::{EvalContext, ServiceEvaluator, Unbinder};
pub use processor::{
    processor_fn, DialogComponent, ErasedResponse, FnProcessor, RequestDialog, ServiceProcessor,
    ServiceProcessorBinder,
};
