pub mod parser;
pub mod types;

pub use parser::{add_to_path, build_query_string, parse_query_string};
pub use types::{
    request_type_id, routing_id, CallbackPushAddressing, DispatchableRequest, Evaluable,
    ServiceRequest,
};
