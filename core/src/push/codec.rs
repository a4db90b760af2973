use crate::errors::{error_codes, HxError};
use crate::request::ServiceRequest;
use crate::session::DecodedEntity;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Field carrying the type signature of an encoded entity.
pub const TYPE_FIELD: &str = "_type";

type DecodeFn = dyn Fn(Value) -> Result<Arc<dyn ServiceRequest>, serde_json::Error> + Send + Sync;

/// **JSON REQUEST CODEC**
///
/// Decodes JSON entities tagged with their type signature into service
/// requests. Only registered signatures become requests; everything else is
/// reported as [`DecodedEntity::Other`].
#[derive(Default)]
pub struct JsonRequestCodec {
    decoders: HashMap<String, Arc<DecodeFn>>,
}

impl JsonRequestCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<R>(&mut self, type_signature: impl Into<String>)
    where
        R: ServiceRequest + DeserializeOwned,
    {
        self.decoders.insert(
            type_signature.into(),
            Arc::new(|value: Value| -> Result<Arc<dyn ServiceRequest>, serde_json::Error> {
                let request: R = serde_json::from_value(value)?;
                Ok(Arc::new(request) as Arc<dyn ServiceRequest>)
            }),
        );
    }

    pub fn with<R>(mut self, type_signature: impl Into<String>) -> Self
    where
        R: ServiceRequest + DeserializeOwned,
    {
        self.register::<R>(type_signature);
        self
    }

    pub fn decode(&self, payload: &str) -> Result<DecodedEntity, HxError> {
        let value: Value = serde_json::from_str(payload).map_err(|e| {
            HxError::decoding(
                error_codes::INVALID_PAYLOAD,
                format!("Push payload is not valid JSON: {}", e),
            )
        })?;

        let Some(signature) = value.get(TYPE_FIELD).and_then(Value::as_str) else {
            return Ok(DecodedEntity::Other(describe(&value)));
        };
        let Some(decoder) = self.decoders.get(signature) else {
            return Ok(DecodedEntity::Other(signature.to_string()));
        };

        let signature = signature.to_string();
        decoder(value).map(DecodedEntity::Request).map_err(|e| {
            HxError::decoding(
                error_codes::INVALID_PAYLOAD,
                format!("Cannot decode {}: {}", signature, e),
            )
        })
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Object(_) => "untyped object".to_string(),
        Value::Array(items) => format!("array of {} items", items.len()),
        other => other.to_string(),
    }
}

impl fmt::Debug for JsonRequestCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut signatures: Vec<&String> = self.decoders.keys().collect();
        signatures.sort();
        f.debug_struct("JsonRequestCodec")
            .field("signatures", &signatures)
            .finish()
    }
}
