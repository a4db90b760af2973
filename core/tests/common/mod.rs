#![allow(dead_code)]

use async_trait::async_trait;
use hydrux::api::*;
use parking_lot::Mutex;
use serde::Deserialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const TEST_MODULE: &str = "test-module";

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn settings() -> HostSettings {
    HostSettings::new("http://localhost:8080/services", "ws://localhost:8080/websocket")
}

pub fn test_module() -> Arc<UxModule> {
    Arc::new(UxModule::new(TEST_MODULE, "test-module/index.js"))
}

#[derive(Default)]
pub struct Counters {
    pub controllers: AtomicUsize,
    pub widgets: AtomicUsize,
    pub failing_attempts: AtomicUsize,
    pub counting_supplier_calls: AtomicUsize,
    pub dialogs_created: AtomicUsize,
    pub dialogs_shown: AtomicUsize,
    pub dialogs_dropped: AtomicUsize,
}

impl Counters {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

// **TEST DENOTATIONS**

#[derive(Debug)]
pub struct ControllerDenotation {
    pub module: Arc<UxModule>,
    pub scope: Option<Arc<ScopeDenotation>>,
}

impl ComponentDenotation for ControllerDenotation {
    fn type_signature(&self) -> &'static str {
        "test.Controller"
    }

    fn scope(&self) -> Option<&Arc<ScopeDenotation>> {
        self.scope.as_ref()
    }

    fn module(&self) -> Option<&Arc<UxModule>> {
        Some(&self.module)
    }
}

#[derive(Debug)]
pub struct WidgetDenotation {
    pub label: String,
    pub module: Arc<UxModule>,
    pub scope: Option<Arc<ScopeDenotation>>,
}

impl WidgetDenotation {
    pub fn new(label: &str, module: &Arc<UxModule>) -> Self {
        Self {
            label: label.to_string(),
            module: Arc::clone(module),
            scope: None,
        }
    }

    pub fn in_scope(mut self, scope: &Arc<ScopeDenotation>) -> Self {
        self.scope = Some(Arc::clone(scope));
        self
    }
}

impl ComponentDenotation for WidgetDenotation {
    fn type_signature(&self) -> &'static str {
        "test.Widget"
    }

    fn scope(&self) -> Option<&Arc<ScopeDenotation>> {
        self.scope.as_ref()
    }

    fn module(&self) -> Option<&Arc<UxModule>> {
        Some(&self.module)
    }
}

#[derive(Debug)]
pub struct FailingDenotation {
    pub module: Arc<UxModule>,
    pub fail_times: usize,
}

impl ComponentDenotation for FailingDenotation {
    fn type_signature(&self) -> &'static str {
        "test.Failing"
    }

    fn module(&self) -> Option<&Arc<UxModule>> {
        Some(&self.module)
    }
}

/// Domain supplier that records every call it answers.
#[derive(Debug)]
pub struct CountingDomainSupplier {
    pub module: Arc<UxModule>,
    pub domain: String,
}

impl ComponentDenotation for CountingDomainSupplier {
    fn type_signature(&self) -> &'static str {
        "test.CountingDomainSupplier"
    }

    fn module(&self) -> Option<&Arc<UxModule>> {
        Some(&self.module)
    }
}

#[derive(Debug)]
pub struct ConfirmDialogDenotation {
    pub module: Arc<UxModule>,
}

impl ComponentDenotation for ConfirmDialogDenotation {
    fn type_signature(&self) -> &'static str {
        "test.ConfirmDialog"
    }

    fn module(&self) -> Option<&Arc<UxModule>> {
        Some(&self.module)
    }
}

// **TEST COMPONENTS**

#[derive(Debug)]
pub struct CounterController {
    pub serial: usize,
}

#[derive(Debug)]
pub struct Widget {
    pub label: String,
    pub serial: usize,
    pub scope_path: String,
}

pub struct ConfirmDialog {
    pub serial: usize,
    counters: Arc<Counters>,
}

#[async_trait]
impl RequestDialog<Confirm> for ConfirmDialog {
    async fn show(&self, _context: &AttributeContext, request: Arc<Confirm>) -> Maybe<bool> {
        self.counters.dialogs_shown.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(1)).await;
        if request.question == "wait" {
            // Never answered.
            std::future::pending::<()>().await;
        }
        if request.question.is_empty() {
            return Err(Reason::new(ReasonKind::InvalidArgument, "Nothing to confirm"));
        }
        Ok(self.serial % 2 == 1)
    }
}

impl Drop for ConfirmDialog {
    fn drop(&mut self) {
        self.counters.dialogs_dropped.fetch_add(1, Ordering::SeqCst);
    }
}

// **TEST REQUESTS**

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Greet {
    pub name: String,
    #[serde(default)]
    pub service_id: Option<String>,
}

impl Greet {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            service_id: None,
        }
    }

    pub fn routed(name: &str, service_id: &str) -> Self {
        Self {
            name: name.to_string(),
            service_id: Some(service_id.to_string()),
        }
    }
}

impl ServiceRequest for Greet {
    fn type_signature(&self) -> &'static str {
        "test.Greet"
    }

    fn as_dispatchable(&self) -> Option<&dyn DispatchableRequest> {
        Some(self)
    }
}

impl DispatchableRequest for Greet {
    fn service_id(&self) -> Option<&str> {
        self.service_id.as_deref()
    }
}

impl Evaluable for Greet {
    type Response = String;
}

#[derive(Debug, Deserialize)]
pub struct Notify {
    pub text: String,
}

impl ServiceRequest for Notify {
    fn type_signature(&self) -> &'static str {
        "test.Notify"
    }
}

impl Evaluable for Notify {
    type Response = ();
}

#[derive(Debug)]
pub struct Confirm {
    pub question: String,
}

impl ServiceRequest for Confirm {
    fn type_signature(&self) -> &'static str {
        "test.Confirm"
    }
}

impl Evaluable for Confirm {
    type Response = bool;
}

// **TEST MODULE**

pub struct TestModule {
    counters: Arc<Counters>,
}

impl ModuleContract for TestModule {
    fn bind(&self, context: &mut ModuleBindingContext<'_>) -> Result<(), HxError> {
        let module_name = context.current_ux_module().name.clone();
        let binder = context.component_binder();

        let counters = Arc::clone(&self.counters);
        binder.bind_component(
            move |_denotation: Arc<ControllerDenotation>, _context: CreationContext| {
                let serial = counters.controllers.fetch_add(1, Ordering::SeqCst) + 1;
                async move { Ok::<_, HxError>(CounterController { serial }) }
            },
        );

        let counters = Arc::clone(&self.counters);
        binder.bind_component(
            move |denotation: Arc<WidgetDenotation>, context: CreationContext| {
                let counters = Arc::clone(&counters);
                async move {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    let serial = counters.widgets.fetch_add(1, Ordering::SeqCst) + 1;
                    Ok::<_, HxError>(Widget {
                        label: denotation.label.clone(),
                        serial,
                        scope_path: context.scope().scope_path(),
                    })
                }
            },
        );

        let counters = Arc::clone(&self.counters);
        binder.bind_component(
            move |denotation: Arc<FailingDenotation>, _context: CreationContext| {
                let attempt = counters.failing_attempts.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if attempt <= denotation.fail_times {
                        Err(HxError::Unsatisfied(Reason::failure(format!(
                            "attempt {} failed",
                            attempt
                        ))))
                    } else {
                        Ok(attempt)
                    }
                }
            },
        );

        let counters = Arc::clone(&self.counters);
        binder.bind_component(
            move |denotation: Arc<CountingDomainSupplier>, _context: CreationContext| {
                let counters = Arc::clone(&counters);
                async move {
                    let domain = denotation.domain.clone();
                    Ok::<_, HxError>(DomainSupplier::new(move || {
                        counters.counting_supplier_calls.fetch_add(1, Ordering::SeqCst);
                        std::future::ready(Ok::<_, Reason>(domain.clone()))
                    }))
                }
            },
        );

        let counters = Arc::clone(&self.counters);
        binder.bind_request_dialog::<ConfirmDialogDenotation, Confirm, ConfirmDialog, _, _>(
            move |_denotation: Arc<ConfirmDialogDenotation>, _context: CreationContext| {
                let counters = Arc::clone(&counters);
                async move {
                    let serial = counters.dialogs_created.fetch_add(1, Ordering::SeqCst) + 1;
                    Ok::<_, HxError>(ConfirmDialog { serial, counters })
                }
            },
        );

        context.load_css(&UxModule::new(module_name, "test-module/index.js"), "test.css");
        Ok(())
    }
}

// **SERVICES SESSION**

#[derive(Debug)]
pub struct MockSession {
    pub domain_id: String,
}

impl PersistenceSession for MockSession {
    fn domain_id(&self) -> &str {
        &self.domain_id
    }
}

pub struct MockRemoteFactory {
    domain_id: String,
}

impl RemoteSessionFactory for MockRemoteFactory {
    fn new_session(&self) -> Arc<dyn PersistenceSession> {
        Arc::new(MockSession {
            domain_id: self.domain_id.clone(),
        })
    }
}

pub struct MockServicesSession {
    codec: JsonRequestCodec,
    pub remote: ServiceEvaluator,
    pub access_requests: Mutex<Vec<String>>,
    pub service_requests: Mutex<Vec<String>>,
}

impl MockServicesSession {
    pub fn new() -> Self {
        Self {
            codec: JsonRequestCodec::new()
                .with::<Greet>("test.Greet")
                .with::<Notify>("test.Notify"),
            remote: ServiceEvaluator::new(),
            access_requests: Mutex::new(Vec::new()),
            service_requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ServicesSession for MockServicesSession {
    fn session_id(&self) -> String {
        "session-1".to_string()
    }

    fn evaluator(&self) -> ServiceEvaluator {
        self.remote.clone()
    }

    async fn access_session_factory(
        &self,
        access_id: &str,
    ) -> Result<Arc<dyn RemoteSessionFactory>, HxError> {
        self.access_requests.lock().push(access_id.to_string());
        Ok(Arc::new(MockRemoteFactory {
            domain_id: access_id.to_string(),
        }))
    }

    async fn service_session_factory(
        &self,
        external_id: &str,
    ) -> Result<Arc<dyn RemoteSessionFactory>, HxError> {
        self.service_requests.lock().push(external_id.to_string());
        Ok(Arc::new(MockRemoteFactory {
            domain_id: external_id.to_string(),
        }))
    }

    async fn decode_jse(&self, payload: &str) -> Result<DecodedEntity, HxError> {
        self.codec.decode(payload)
    }
}

// **FIXTURE**

pub struct Fixture {
    pub application: HxApplication,
    pub counters: Arc<Counters>,
    pub session: Arc<MockServicesSession>,
}

impl Fixture {
    pub fn new(root: Arc<ScopeDenotation>, settings: HostSettings) -> Self {
        init_logging();
        let counters = Arc::new(Counters::default());
        let session = Arc::new(MockServicesSession::new());
        let resolver = StaticModuleResolver::new().with_module(
            TEST_MODULE,
            Arc::new(TestModule {
                counters: Arc::clone(&counters),
            }),
        );
        let denotation = Arc::new(ApplicationDenotation::new("test-app", root).with_title("Test"));

        let application = HxApplication::new(
            denotation,
            settings,
            Arc::clone(&session) as Arc<dyn ServicesSession>,
            Arc::new(resolver),
        )
        .expect("valid application");

        Self {
            application,
            counters,
            session,
        }
    }

    pub async fn start(root: Arc<ScopeDenotation>, settings: HostSettings) -> Self {
        let fixture = Self::new(root, settings);
        fixture
            .application
            .initialize()
            .await
            .expect("root scope initializes");
        fixture
    }

    pub fn root(&self) -> HxScope {
        self.application.root_scope().expect("initialized")
    }
}

pub fn denote<D: ComponentDenotation>(denotation: D) -> Arc<dyn ComponentDenotation> {
    Arc::new(denotation)
}
