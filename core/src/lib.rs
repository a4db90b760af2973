//! # HYDRUX CORE LIBRARY
//!
//! **CLIENT-SIDE COMPONENT RUNTIME**
//!
//! **ARCHITECTURE**: Scope tree resolving denotations into cached components,
//! a two-tier service processor registry and a push bridge feeding the same
//! evaluator
//! **GUARANTEE**: Expected failures are `Maybe` values, never panics
//! **CONCURRENCY**: Single-flight resolution on any tokio runtime

pub mod api;
pub mod application;
pub mod config;
pub mod denotation;
pub mod dispatch;
pub mod domain;
pub mod errors;
pub mod module;
mod platform;
pub mod push;
pub mod reason;
pub mod request;
pub mod scope;
pub mod session;
pub mod types;
