//! # SESSIONS
//!
//! Surface of the remote services host the runtime talks to. The wire
//! protocol lives behind [`ServicesSession`]; the runtime only asks it for
//! its remote evaluator, session factories and decoding pushed payloads.

use crate::dispatch::ServiceEvaluator;
use crate::errors::HxError;
use crate::request::ServiceRequest;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// A data or service session bound to one domain.
pub trait PersistenceSession: Send + Sync + fmt::Debug {
    fn domain_id(&self) -> &str;
}

/// Remote-side factory for [`PersistenceSession`]s of one domain.
pub trait RemoteSessionFactory: Send + Sync {
    fn new_session(&self) -> Arc<dyn PersistenceSession>;
}

/// What a pushed payload decoded to.
#[derive(Debug, Clone)]
pub enum DecodedEntity {
    Request(Arc<dyn ServiceRequest>),
    /// Anything else, described for logging.
    Other(String),
}

/// **SERVICES SESSION**
///
/// Authenticated connection to the services host.
#[async_trait]
pub trait ServicesSession: Send + Sync {
    fn session_id(&self) -> String;

    /// Evaluator whose processors forward requests to the host.
    fn evaluator(&self) -> ServiceEvaluator;

    async fn access_session_factory(
        &self,
        access_id: &str,
    ) -> Result<Arc<dyn RemoteSessionFactory>, HxError>;

    async fn service_session_factory(
        &self,
        external_id: &str,
    ) -> Result<Arc<dyn RemoteSessionFactory>, HxError>;

    async fn decode_jse(&self, payload: &str) -> Result<DecodedEntity, HxError>;
}

/// **SESSION FACTORY COMPONENT**
///
/// What access and service session factory denotations resolve to.
#[derive(Clone)]
pub struct SessionFactory {
    domain_id: String,
    remote: Arc<dyn RemoteSessionFactory>,
}

impl SessionFactory {
    pub fn new(domain_id: impl Into<String>, remote: Arc<dyn RemoteSessionFactory>) -> Self {
        Self {
            domain_id: domain_id.into(),
            remote,
        }
    }

    pub fn domain_id(&self) -> &str {
        &self.domain_id
    }

    pub fn new_session(&self) -> Arc<dyn PersistenceSession> {
        self.remote.new_session()
    }
}

impl fmt::Debug for SessionFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionFactory")
            .field("domain_id", &self.domain_id)
            .finish()
    }
}

/// Holds one session opened from a [`SessionFactory`].
#[derive(Debug, Clone)]
pub struct SessionHolder {
    session: Arc<dyn PersistenceSession>,
}

impl SessionHolder {
    pub fn new(session: Arc<dyn PersistenceSession>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Arc<dyn PersistenceSession> {
        &self.session
    }
}
