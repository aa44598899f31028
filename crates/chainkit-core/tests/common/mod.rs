#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chainkit_core::domain::{
    CaipNetwork, EstimateGasArgs, SendTransactionArgs, WriteContractArgs,
};
use chainkit_core::ports::{ApprovedNetworks, AuthenticatePayload, SessionPayload};
use chainkit_core::{
    AdapterDescriptor, ChainCoordinator, ChainId, ClockPort, ConnectionClientPort,
    EmbeddedProviderPort, Namespace, NetworkClientPort, PortError, TrustAnchorPort, UiPort,
};

#[derive(Debug, Default)]
pub struct TestClock {
    now: AtomicU64,
}

impl ClockPort for TestClock {
    fn now_ms(&self) -> Result<u64, PortError> {
        Ok(self.now.fetch_add(1, Ordering::SeqCst) + 1_739_750_400_000)
    }
}

/// Connection client that signs deterministically and records calls.
#[derive(Default)]
pub struct StubConnectionClient {
    pub signed_messages: Mutex<Vec<String>>,
    pub disconnect_count: AtomicU64,
    pub fail_sign: std::sync::atomic::AtomicBool,
}

impl ConnectionClientPort for StubConnectionClient {
    fn connect_wallet_connect(&self, on_uri: &mut dyn FnMut(&str)) -> Result<(), PortError> {
        on_uri("wc:stub@2");
        Ok(())
    }

    fn connect_external(&self, _connector_id: &str) -> Result<(), PortError> {
        Ok(())
    }

    fn disconnect(&self) -> Result<(), PortError> {
        self.disconnect_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn sign_message(&self, message: &str) -> Result<String, PortError> {
        if self.fail_sign.load(Ordering::SeqCst) {
            return Err(PortError::Policy("user rejected signature".to_owned()));
        }
        self.signed_messages
            .lock()
            .map_err(|e| PortError::Conflict(e.to_string()))?
            .push(message.to_owned());
        Ok(format!("0xsig:{}", message.len()))
    }

    fn estimate_gas(&self, _args: &EstimateGasArgs) -> Result<u128, PortError> {
        Ok(21_000)
    }

    fn send_transaction(&self, _args: &SendTransactionArgs) -> Result<String, PortError> {
        Ok("0xhash".to_owned())
    }

    fn write_contract(&self, _args: &WriteContractArgs) -> Result<String, PortError> {
        Ok("0xhash".to_owned())
    }

    fn resolve_name(&self, _name: &str) -> Result<Option<String>, PortError> {
        Ok(None)
    }

    fn resolve_avatar(&self, _name: &str) -> Result<Option<String>, PortError> {
        Ok(None)
    }
}

#[derive(Default)]
pub struct StubNetworkClient {
    pub switched: Mutex<Vec<ChainId>>,
}

impl NetworkClientPort for StubNetworkClient {
    fn switch_network(&self, network: &CaipNetwork) -> Result<(), PortError> {
        self.switched
            .lock()
            .map_err(|e| PortError::Conflict(e.to_string()))?
            .push(network.id.clone());
        Ok(())
    }

    fn approved_networks(&self) -> Result<ApprovedNetworks, PortError> {
        Ok(ApprovedNetworks::all())
    }
}

#[derive(Default)]
pub struct MockTrustAnchorState {
    pub nonce: Option<String>,
    pub session: Option<SessionPayload>,
    pub token: Option<String>,
    pub fail_transport: bool,
    pub authenticate_calls: Vec<AuthenticatePayload>,
    pub sign_out_count: u64,
}

#[derive(Default)]
pub struct MockTrustAnchor {
    pub state: Mutex<MockTrustAnchorState>,
}

impl MockTrustAnchor {
    pub fn with_nonce_and_token(nonce: &str, token: &str) -> Self {
        let anchor = Self::default();
        {
            let mut g = anchor.state.lock().expect("anchor lock");
            g.nonce = Some(nonce.to_owned());
            g.token = Some(token.to_owned());
        }
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
        let g = self.lock()?;
        if g.fail_transport {
            return Err(PortError::Transport("anchor unreachable".to_owned()));
        }
        Ok(g.nonce.clone())
    }

    fn fetch_session(&self) -> Result<Option<SessionPayload>, PortError> {
        let g = self.lock()?;
        if g.fail_transport {
            return Err(PortError::Transport("anchor unreachable".to_owned()));
        }
        Ok(g.session.clone())
    }

    fn authenticate(&self, payload: &AuthenticatePayload) -> Result<Option<String>, PortError> {
        let mut g = self.lock()?;
        if g.fail_transport {
            return Err(PortError::Transport("anchor unreachable".to_owned()));
        }
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

#[derive(Default)]
pub struct MockUi {
    pub open: std::sync::atomic::AtomicBool,
    pub errors: Mutex<Vec<String>>,
    pub open_count: AtomicU64,
    pub close_count: AtomicU64,
}

impl UiPort for MockUi {
    fn open(&self) {
        self.open.store(true, Ordering::SeqCst);
        self.open_count.fetch_add(1, Ordering::SeqCst);
    }

    fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
        self.close_count.fetch_add(1, Ordering::SeqCst);
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    fn show_error(&self, message: &str) {
        if let Ok(mut g) = self.errors.lock() {
            g.push(message.to_owned());
        }
    }
}

#[derive(Default)]
pub struct MockEmbeddedProvider {
    pub reject_count: AtomicU64,
}

impl EmbeddedProviderPort for MockEmbeddedProvider {
    fn reject_rpc_requests(&self) -> Result<(), PortError> {
        self.reject_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub fn eip155(reference: &str) -> ChainId {
    ChainId::new(Namespace::eip155(), reference)
}

pub fn solana_chain(reference: &str) -> ChainId {
    ChainId::new(Namespace::solana(), reference)
}

pub fn mainnet() -> CaipNetwork {
    CaipNetwork::new(eip155("1"), "Ethereum")
}

pub fn polygon() -> CaipNetwork {
    CaipNetwork::new(eip155("137"), "Polygon")
}

pub fn solana_mainnet() -> CaipNetwork {
    CaipNetwork::new(
        solana_chain("5eykt4UsFv8P8NJdTREpY1vzqKqZKvdp"),
        "Solana",
    )
}

pub fn descriptor(network: CaipNetwork) -> AdapterDescriptor {
    AdapterDescriptor {
        namespace: network.id.namespace.clone(),
        connection_client: Arc::new(StubConnectionClient::default()),
        network_client: Arc::new(StubNetworkClient::default()),
        default_network: network,
    }
}

/// Coordinator registered with eip155 (active, Ethereum default) and solana.
pub fn two_chain_coordinator() -> ChainCoordinator {
    let coordinator = ChainCoordinator::new(true);
    coordinator
        .initialize(vec![descriptor(mainnet()), descriptor(solana_mainnet())])
        .expect("initialize coordinator");
    coordinator
}
