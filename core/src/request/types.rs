use crate::types::AsAny;
use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::fmt;

/// **SERVICE REQUEST**
///
/// Anything the evaluator can dispatch. Routing support is a capability
/// declared at compile time through [`ServiceRequest::as_dispatchable`].
pub trait ServiceRequest: AsAny + fmt::Debug {
    fn type_signature(&self) -> &'static str;

    /// `Some` for requests that carry a routing id.
    fn as_dispatchable(&self) -> Option<&dyn DispatchableRequest> {
        None
    }
}

/// A request that can be routed by service id in addition to its type.
pub trait DispatchableRequest: ServiceRequest {
    fn service_id(&self) -> Option<&str>;
}

/// A request with a statically known response type.
pub trait Evaluable: ServiceRequest + Sized {
    type Response: Any + Send;
}

/// Concrete type of a type-erased request.
pub fn request_type_id(request: &dyn ServiceRequest) -> TypeId {
    request.as_any().type_id()
}

/// Routing id of a request, if it supports routing and carries a non-empty one.
pub fn routing_id(request: &dyn ServiceRequest) -> Option<&str> {
    request
        .as_dispatchable()
        .and_then(|dispatchable| dispatchable.service_id())
        .filter(|id| !id.is_empty())
}

/// Address a server uses to push a callback to this client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackPushAddressing {
    pub push_channel_id: String,
    pub service_id: Option<String>,
}
