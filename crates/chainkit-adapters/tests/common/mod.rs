#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chainkit_core::domain::CaipNetwork;
use chainkit_core::ports::{AuthenticatePayload, SessionPayload};
use chainkit_core::{
    AdapterDescriptor, AuthController, ChainCoordinator, ChainId, ClockPort, Namespace,
    NetworkPatch, PortError, SiweConfig, TrustAnchorPort,
};

use chainkit_adapters::resolver::{
    DirectoryResolver, NameServiceResolver, ProfileResolver, RemoteSignerNameResolver,
};
use chainkit_adapters::{ChainAdapterConfig, WalletAdapter, WalletRuntime, WalletRuntimePort};

#[derive(Debug)]
pub struct TestClock {
    now: AtomicU64,
    step: u64,
}

impl Default for TestClock {
    fn default() -> Self {
        Self::with_step(1)
    }
}

impl TestClock {
    pub fn with_step(step: u64) -> Self {
        Self {
            now: AtomicU64::new(0),
            step,
        }
    }
}

impl ClockPort for TestClock {
    fn now_ms(&self) -> Result<u64, PortError> {
        Ok(self.now.fetch_add(self.step, Ordering::SeqCst) + 1_739_750_400_000)
    }
}

#[derive(Default)]
pub struct MockTrustAnchorState {
    pub nonce: Option<String>,
    pub session: Option<SessionPayload>,
    pub token: Option<String>,
    pub authenticate_calls: Vec<AuthenticatePayload>,
    pub sign_out_count: u64,
}

#[derive(Default)]
pub struct MockTrustAnchor {
    pub state: Mutex<MockTrustAnchorState>,
}

impl MockTrustAnchor {
    pub fn verifying() -> Self {
        let anchor = Self::default();
        {
            let mut g = anchor.state.lock().expect("anchor lock");
            g.nonce = Some("n0nce".to_owned());
            g.token = Some("t0ken".to_owned());
        }
        anchor
    }

    pub fn rejecting() -> Self {
        let anchor = Self::default();
        anchor.state.lock().expect("anchor lock").nonce = Some("n0nce".to_owned());
        anchor
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MockTrustAnchorState>, PortError> {
        self.state
            .lock()
            .map_err(|e| PortError::Conflict(e.to_string()))
    }
}

impl TrustAnchorPort for MockTrustAnchor {
    fn fetch_nonce(&self) -> Result<Option<String>, PortError> {
        Ok(self.lock()?.nonce.clone())
    }

    fn fetch_session(&self) -> Result<Option<SessionPayload>, PortError> {
        Ok(self.lock()?.session.clone())
    }

    fn authenticate(&self, payload: &AuthenticatePayload) -> Result<Option<String>, PortError> {
        let mut g = self.lock()?;
        g.authenticate_calls.push(payload.clone());
        Ok(g.token.clone())
    }

    fn update_user(&self, _metadata: &serde_json::Value) -> Result<(), PortError> {
        Ok(())
    }

    fn sign_out(&self) -> Result<(), PortError> {
        self.lock()?.sign_out_count += 1;
        Ok(())
    }
}

pub fn eip155(reference: &str) -> ChainId {
    ChainId::new(Namespace::eip155(), reference)
}

pub fn mainnet() -> CaipNetwork {
    CaipNetwork::new(eip155("1"), "Ethereum")
}

pub fn polygon() -> CaipNetwork {
    CaipNetwork::new(eip155("137"), "Polygon")
}

pub fn test_config() -> ChainAdapterConfig {
    ChainAdapterConfig {
        confirmation_poll_interval_ms: 0,
        ..ChainAdapterConfig::default()
    }
}

pub struct Harness {
    pub runtime: Arc<WalletRuntime>,
    pub anchor: Arc<MockTrustAnchor>,
    pub coordinator: Arc<ChainCoordinator>,
    pub auth: Arc<AuthController>,
    pub adapter: Arc<WalletAdapter>,
}

pub fn harness() -> Harness {
    harness_with(MockTrustAnchor::verifying(), test_config())
}

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Fully wired eip155 adapter over a deterministic runtime, with mainnet
/// and polygon as the requested networks and mainnet active.
pub fn harness_with(anchor: MockTrustAnchor, config: ChainAdapterConfig) -> Harness {
    init_tracing();
    let runtime = Arc::new(WalletRuntime::deterministic());
    let anchor = Arc::new(anchor);
    let clock: Arc<dyn ClockPort> = Arc::new(TestClock::default());
    let coordinator = Arc::new(ChainCoordinator::new(true));
    let auth = Arc::new(AuthController::new(
        Arc::clone(&anchor) as _,
        Arc::clone(&clock),
        SiweConfig {
            domain: "app.example.org".to_owned(),
            uri: "https://app.example.org".to_owned(),
            statement: Some("Sign in to Example".to_owned()),
            ..SiweConfig::default()
        },
    ));

    let runtime_port: Arc<dyn WalletRuntimePort> = Arc::clone(&runtime) as _;
    let resolvers: Vec<Box<dyn ProfileResolver>> = vec![
        Box::new(DirectoryResolver::new(Arc::clone(&runtime_port))),
        Box::new(NameServiceResolver::new(
            Arc::clone(&runtime_port),
            &config.name_service_chain_ref,
        )),
        Box::new(RemoteSignerNameResolver::new(
            Arc::clone(&runtime_port),
            &config.remote_name_suffix,
        )),
    ];
    let adapter = Arc::new(WalletAdapter::new(
        Namespace::eip155(),
        runtime_port,
        Arc::clone(&coordinator),
        Arc::clone(&auth),
        clock,
        config,
        resolvers,
    ));

    coordinator
        .initialize(vec![AdapterDescriptor {
            namespace: Namespace::eip155(),
            connection_client: Arc::clone(&adapter) as _,
            network_client: Arc::clone(&adapter) as _,
            default_network: mainnet(),
        }])
        .expect("initialize coordinator");
    coordinator
        .set_chain_network_data(
            &Namespace::eip155(),
            NetworkPatch {
                requested_networks: Some(vec![mainnet(), polygon()]),
                ..NetworkPatch::default()
            },
            false,
        )
        .expect("seed requested networks");

    Harness {
        runtime,
        anchor,
        coordinator,
        auth,
        adapter,
    }
}
