use crate::application::HxApplication;
use crate::reason::Reason;
use crate::request::build_query_string;
use crate::session::DecodedEntity;
use log::{error, info, warn};
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};

/// Media type the runtime accepts on the push channel.
pub const PUSH_ACCEPT: &str = "gm/jse";

/// Event of the push transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushEvent {
    Opened,
    Message(String),
    Error(String),
    Closed { reason: String },
}

/// What happened to one pushed payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushDelivery {
    /// Decoded to a request and evaluated successfully.
    Processed,
    /// Decoded to a request whose evaluation was unsatisfied.
    Failed(Reason),
    /// Decoded to something that is not a service request.
    Ignored,
    /// Could not be decoded at all.
    Undecodable,
}

/// Counters of one [`PushBridge::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushStats {
    pub processed: usize,
    pub failed: usize,
    pub ignored: usize,
    pub undecodable: usize,
    pub transport_errors: usize,
}

impl PushStats {
    fn record(&mut self, delivery: &PushDelivery) {
        match delivery {
            PushDelivery::Processed => self.processed += 1,
            PushDelivery::Failed(_) => self.failed += 1,
            PushDelivery::Ignored => self.ignored += 1,
            PushDelivery::Undecodable => self.undecodable += 1,
        }
    }

    fn record_joined(&mut self, joined: Result<PushDelivery, JoinError>) {
        match joined {
            Ok(delivery) => self.record(&delivery),
            Err(e) => {
                error!("Push notification task did not complete: {}", e);
                self.failed += 1;
            }
        }
    }
}

/// **PUSH NOTIFICATION BRIDGE**
///
/// Feeds server-pushed payloads into the application's local evaluator, the
/// same one locally triggered requests go through. Nothing a payload does
/// can fail the bridge: every problem is logged and reported as a
/// [`PushDelivery`].
#[derive(Debug, Clone)]
pub struct PushBridge {
    application: HxApplication,
}

impl PushBridge {
    pub fn new(application: HxApplication) -> Self {
        Self { application }
    }

    /// Address the push transport connects to.
    pub fn web_socket_url(&self) -> String {
        let session_id = self.application.services_session().session_id();
        let query = build_query_string(&[
            ("sessionId", session_id.as_str()),
            ("clientId", self.application.application_id()),
            ("pushChannelId", self.application.push_channel_id()),
            ("accept", PUSH_ACCEPT),
        ]);
        format!("{}?{}", self.application.host_settings().web_socket_url, query)
    }

    pub async fn handle_message(&self, payload: &str) -> PushDelivery {
        let decoded = self.application.services_session().decode_jse(payload).await;

        match decoded {
            Err(e) => {
                error!("Cannot decode push notification: {}", e);
                PushDelivery::Undecodable
            }
            Ok(DecodedEntity::Other(description)) => {
                warn!(
                    "Received push notification that is not a ServiceRequest: {}",
                    description
                );
                PushDelivery::Ignored
            }
            Ok(DecodedEntity::Request(request)) => {
                let evaluator = self.application.local_evaluator();
                let context = evaluator.ambient_context().derive();
                match evaluator.eval_dyn(request, context).await {
                    Ok(_) => PushDelivery::Processed,
                    Err(reason) => {
                        error!(
                            "Processing push notification failed because: {}",
                            reason.full_text()
                        );
                        PushDelivery::Failed(reason)
                    }
                }
            }
        }
    }

    /// Drives the transport's events until the channel ends. Each pushed
    /// payload is evaluated on its own task, so a processor that waits does
    /// not hold back the payloads behind it.
    pub async fn run(&self, mut events: mpsc::Receiver<PushEvent>) -> PushStats {
        let url = self.web_socket_url();
        let mut stats = PushStats::default();
        let mut deliveries: JoinSet<PushDelivery> = JoinSet::new();

        loop {
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else { break };
                    match event {
                        PushEvent::Opened => info!("WebSocket connection established to: {}", url),
                        PushEvent::Message(payload) => {
                            let bridge = self.clone();
                            deliveries.spawn(async move { bridge.handle_message(&payload).await });
                        }
                        PushEvent::Error(message) => {
                            stats.transport_errors += 1;
                            warn!("Error with WebSocket connection to {}: {}", url, message);
                        }
                        PushEvent::Closed { reason } => {
                            info!("Lost WebSocket connection to: {}. Reason: {}", url, reason)
                        }
                    }
                }
                Some(joined) = deliveries.join_next(), if !deliveries.is_empty() => {
                    stats.record_joined(joined);
                }
            }
        }

        while let Some(joined) = deliveries.join_next().await {
            stats.record_joined(joined);
        }

        stats
    }
}
