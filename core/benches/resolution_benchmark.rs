use async_trait::async_trait;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use hydrux::api::*;
use serde::Deserialize;
use std::hint::black_box;
use std::sync::Arc;
use tokio::runtime::Runtime;

struct OfflineSession {
    codec: JsonRequestCodec,
}

#[async_trait]
impl ServicesSession for OfflineSession {
    fn session_id(&self) -> String {
        "bench".to_string()
    }

    fn evaluator(&self) -> ServiceEvaluator {
        ServiceEvaluator::new()
    }

    async fn access_session_factory(
        &self,
        access_id: &str,
    ) -> Result<Arc<dyn RemoteSessionFactory>, HxError> {
        Err(HxError::Unsatisfied(Reason::unsupported_operation(format!(
            "offline: {}",
            access_id
        ))))
    }

    async fn service_session_factory(
        &self,
        external_id: &str,
    ) -> Result<Arc<dyn RemoteSessionFactory>, HxError> {
        Err(HxError::Unsatisfied(Reason::unsupported_operation(format!(
            "offline: {}",
            external_id
        ))))
    }

    async fn decode_jse(&self, payload: &str) -> Result<DecodedEntity, HxError> {
        self.codec.decode(payload)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Ping {
    seq: u64,
    #[serde(default)]
    service_id: Option<String>,
}

impl ServiceRequest for Ping {
    fn type_signature(&self) -> &'static str {
        "bench.Ping"
    }

    fn as_dispatchable(&self) -> Option<&dyn DispatchableRequest> {
        Some(self)
    }
}

impl DispatchableRequest for Ping {
    fn service_id(&self) -> Option<&str> {
        self.service_id.as_deref()
    }
}

impl Evaluable for Ping {
    type Response = u64;
}

fn start_application(runtime: &Runtime) -> HxApplication {
    let root = Arc::new(ScopeDenotation::new("root"));
    let session = OfflineSession {
        codec: JsonRequestCodec::new().with::<Ping>("bench.Ping"),
    };
    runtime
        .block_on(HxApplication::start(
            Arc::new(ApplicationDenotation::new("bench", root)),
            HostSettings::new("http://localhost/services", "ws://localhost/push"),
            Arc::new(session),
            Arc::new(StaticModuleResolver::new()),
        ))
        .expect("application starts")
}

fn benchmark_cached_resolution(c: &mut Criterion) {
    let runtime = Runtime::new().expect("runtime");
    let application = start_application(&runtime);
    let root = application.root_scope().expect("root scope");

    let mut group = c.benchmark_group("resolution");

    let supplier: Arc<dyn ComponentDenotation> = Arc::new(StaticDomainSupplier::new("bench"));
    runtime
        .block_on(root.resolve_component(Arc::clone(&supplier)))
        .expect("warm cache");
    group.bench_function("cached_component", |b| {
        b.iter(|| {
            let component = runtime.block_on(root.resolve_component(black_box(Arc::clone(&supplier))));
            black_box(component)
        });
    });

    // Nested scopes: resolution walks the ancestor chain before the cache hit.
    for depth in [1usize, 4, 16].iter() {
        let mut scope = root.clone();
        for level in 0..*depth {
            let child = Arc::new(ScopeDenotation::new(format!("level-{}", level)));
            scope = runtime.block_on(scope.child_scope(child)).expect("child scope");
        }
        let in_root: Arc<dyn ComponentDenotation> = Arc::new(StaticDomainSupplier {
            external_id: Some("root".to_string()),
            scope: Some(Arc::clone(root.denotation())),
        });
        runtime
            .block_on(scope.resolve_component(Arc::clone(&in_root)))
            .expect("warm cache");

        group.bench_with_input(BenchmarkId::new("ancestor_lookup", depth), &scope, |b, scope| {
            b.iter(|| {
                let component = runtime.block_on(scope.resolve_component(Arc::clone(&in_root)));
                black_box(component)
            });
        });
    }

    group.finish();
}

fn benchmark_dispatch(c: &mut Criterion) {
    let runtime = Runtime::new().expect("runtime");
    let application = start_application(&runtime);
    let binder = application.service_processor_binder();
    binder.bind::<Ping, _>(processor_fn(|_context: AttributeContext, ping: Arc<Ping>| async move {
        Ok::<_, Reason>(ping.seq)
    }));
    for route in 0..32 {
        binder.bind_dispatching::<Ping, _>(
            format!("route-{}", route),
            processor_fn(|_context: AttributeContext, ping: Arc<Ping>| async move {
                Ok::<_, Reason>(ping.seq + 1)
            }),
        );
    }
    let evaluator = application.local_evaluator().clone();

    let mut group = c.benchmark_group("dispatch");

    group.bench_function("flat_processor", |b| {
        b.iter(|| {
            let reply = runtime.block_on(
                evaluator
                    .eval(Ping {
                        seq: black_box(7),
                        service_id: None,
                    })
                    .and_get_reasoned(),
            );
            black_box(reply)
        });
    });

    group.bench_function("routed_processor", |b| {
        b.iter(|| {
            let reply = runtime.block_on(
                evaluator
                    .eval(Ping {
                        seq: black_box(7),
                        service_id: Some("route-17".to_string()),
                    })
                    .and_get_reasoned(),
            );
            black_box(reply)
        });
    });

    let bridge = application.push_bridge();
    let payload = r#"{"_type": "bench.Ping", "seq": 3, "serviceId": "route-3"}"#;
    group.bench_function("push_message", |b| {
        b.iter(|| {
            let delivery = runtime.block_on(bridge.handle_message(black_box(payload)));
            black_box(delivery)
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_cached_resolution, benchmark_dispatch);
criterion_main!(benches);
