use crate::reason::{Reason, ReasonKind};
use thiserror::Error;

/// **HARD RUNTIME ERRORS**
///
/// Raised for deployment or programming defects: a missing root scope, a
/// component type nobody bound a factory for, a module that cannot be loaded.
/// Expected failures travel as [`Reason`] values instead.
#[derive(Debug, Error)]
pub enum HxError {
    #[error("CONFIGURATION ERROR: {code} - {message}")]
    Configuration { code: String, message: String },

    #[error("BINDING ERROR: {code} - {message}")]
    Binding { code: String, message: String },

    #[error("MODULE ERROR: {code} - {message}")]
    Module { code: String, message: String },

    #[error("RESOLUTION ERROR: {code} - {message}")]
    Resolution { code: String, message: String },

    #[error("DECODING ERROR: {code} - {message}")]
    Decoding { code: String, message: String },

    #[error("UNSATISFIED: {}", .0.full_text())]
    Unsatisfied(#[from] Reason),
}

impl HxError {
    pub fn configuration(code: &str, message: impl Into<String>) -> Self {
        HxError::Configuration {
            code: code.to_string(),
            message: message.into(),
        }
    }

    pub fn binding(code: &str, message: impl Into<String>) -> Self {
        HxError::Binding {
            code: code.to_string(),
            message: message.into(),
        }
    }

    pub fn module(code: &str, message: impl Into<String>) -> Self {
        HxError::Module {
            code: code.to_string(),
            message: message.into(),
        }
    }

    pub fn resolution(code: &str, message: impl Into<String>) -> Self {
        HxError::Resolution {
            code: code.to_string(),
            message: message.into(),
        }
    }

    pub fn decoding(code: &str, message: impl Into<String>) -> Self {
        HxError::Decoding {
            code: code.to_string(),
            message: message.into(),
        }
    }

    /// Stable error code, `None` for escalated reasons.
    pub fn code(&self) -> Option<&str> {
        match self {
            HxError::Configuration { code, .. }
            | HxError::Binding { code, .. }
            | HxError::Module { code, .. }
            | HxError::Resolution { code, .. }
            | HxError::Decoding { code, .. } => Some(code),
            HxError::Unsatisfied(_) => None,
        }
    }

    /// Folds the error into a [`Reason`] for operations that must answer with a `Maybe`.
    pub fn into_reason(self) -> Reason {
        match self {
            HxError::Unsatisfied(reason) => reason,
            other => Reason::new(ReasonKind::Failure, other.to_string()),
        }
    }
}

/// **RUNTIME ERROR CODES**
pub mod error_codes {
    pub const MISSING_ROOT_SCOPE: &str = "HX_RUNTIME_CONFIGURATION_MISSING_ROOT_SCOPE";
    pub const MISSING_SESSION_FACTORY: &str = "HX_RUNTIME_CONFIGURATION_MISSING_SESSION_FACTORY";
    pub const INVALID_HOST_SETTINGS: &str = "HX_RUNTIME_CONFIGURATION_INVALID_HOST_SETTINGS";
    pub const FACTORY_NOT_BOUND: &str = "HX_RUNTIME_BINDING_FACTORY_NOT_BOUND";
    pub const FACTORY_TYPE_MISMATCH: &str = "HX_RUNTIME_BINDING_FACTORY_TYPE_MISMATCH";
    pub const MODULE_NOT_FOUND: &str = "HX_RUNTIME_MODULE_NOT_FOUND";
    pub const MODULE_LOAD_FAILED: &str = "HX_RUNTIME_MODULE_LOAD_FAILED";
    pub const COMPONENT_TYPE_MISMATCH: &str = "HX_RUNTIME_RESOLUTION_COMPONENT_TYPE_MISMATCH";
    pub const SCOPE_DETACHED: &str = "HX_RUNTIME_RESOLUTION_SCOPE_DETACHED";
    pub const ROOT_SCOPE_NOT_INITIALIZED: &str = "HX_RUNTIME_RESOLUTION_ROOT_SCOPE_NOT_INITIALIZED";
    pub const INVALID_PAYLOAD: &str = "HX_RUNTIME_DECODING_INVALID_PAYLOAD";
}
