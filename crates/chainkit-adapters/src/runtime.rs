use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use alloy::primitives::{hex, keccak256};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use chainkit_core::auth::{format_siwe_message, SiweConfig, SiweMessageParams};
use chainkit_core::domain::{
    ConnectorKind, EstimateGasArgs, SendTransactionArgs, WriteContractArgs,
};
use chainkit_core::{ChainId, PortError};

use crate::ChainAdapterConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConnector {
    pub id: String,
    pub name: String,
    pub kind: ConnectorKind,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedCredential {
    pub message: String,
    pub signature: String,
}

/// One-click authentication request. The wallet side renders the signed
/// message, so this carries parameters rather than finished text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthRequest {
    pub chains: Vec<ChainId>,
    pub domain: String,
    pub uri: String,
    pub statement: Option<String>,
    pub nonce: String,
    pub issued_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityProfile {
    pub name: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeBalance {
    pub amount: String,
    pub symbol: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletMetadata {
    pub name: String,
    pub icon: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeEventKind {
    AccountsChanged {
        accounts: Vec<String>,
        chain_ref: String,
        connector_id: Option<String>,
    },
    ChainChanged {
        chain_ref: String,
    },
    ConnectorsChanged,
    Disconnected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeEvent {
    pub sequence: u64,
    pub kind: RuntimeEventKind,
}

/// Provider-facing surface a namespace adapter drives. One implementation
/// per wallet runtime (embedded, injected, remote signer).
pub trait WalletRuntimePort: Send + Sync {
    fn accounts(&self) -> Result<Vec<String>, PortError>;
    fn chain_ref(&self) -> Result<String, PortError>;
    fn connectors(&self) -> Result<Vec<RuntimeConnector>, PortError>;
    fn active_connector_id(&self) -> Result<Option<String>, PortError>;
    fn connect(&self, connector_id: Option<&str>) -> Result<(), PortError>;
    fn disconnect(&self) -> Result<(), PortError>;
    fn sign_message(&self, address: &str, message: &str) -> Result<String, PortError>;
    /// Returns the transaction hash without waiting for confirmation.
    fn send_transaction(&self, args: &SendTransactionArgs) -> Result<String, PortError>;
    /// `None` while the transaction is still pending.
    fn transaction_receipt(&self, hash: &str) -> Result<Option<String>, PortError>;
    fn estimate_gas(&self, args: &EstimateGasArgs) -> Result<u128, PortError>;
    fn write_contract(&self, args: &WriteContractArgs) -> Result<String, PortError>;
    fn switch_chain(&self, chain_ref: &str) -> Result<(), PortError>;
    fn pairing_uri(&self) -> Result<String, PortError>;
    fn supports_one_click_auth(&self) -> Result<bool, PortError>;
    /// One-click handshake over the pairing channel. `Ok(None)` means the
    /// remote signer declined the capability after advertising it.
    fn authenticate(&self, request: &AuthRequest) -> Result<Option<SignedCredential>, PortError>;
    /// Must run before `authenticate` so session settlement is evaluated
    /// against the requested set rather than stale state.
    fn set_requested_chains(&self, chains: &[ChainId]) -> Result<(), PortError>;
    fn requested_chains(&self) -> Result<Vec<ChainId>, PortError>;
    /// Chain references approved by the active remote-signer session.
    fn session_approved_chain_refs(&self) -> Result<Option<Vec<String>>, PortError>;
    fn smart_account_enabled_chain_refs(&self) -> Result<Vec<String>, PortError>;
    fn fetch_identity(&self, address: &str) -> Result<Option<IdentityProfile>, PortError>;
    fn name_service_name(&self, address: &str) -> Result<Option<String>, PortError>;
    fn name_service_avatar(&self, name: &str) -> Result<Option<String>, PortError>;
    fn name_service_address(&self, name: &str) -> Result<Option<String>, PortError>;
    fn remote_signer_name(&self, address: &str) -> Result<Option<String>, PortError>;
    fn balance(&self, address: &str, chain_ref: &str) -> Result<Option<NativeBalance>, PortError>;
    fn wallet_metadata(&self) -> Result<Option<WalletMetadata>, PortError>;
    fn drain_events(&self) -> Result<Vec<RuntimeEvent>, PortError>;
}

#[derive(Debug, Clone)]
enum RuntimeMode {
    Deterministic,
    Proxy(ProxyRuntime),
}

#[derive(Debug, Clone)]
struct ProxyRuntime {
    base_url: String,
    client: reqwest::blocking::Client,
}

#[derive(Debug, Clone)]
struct RuntimeState {
    connected: bool,
    accounts: Vec<String>,
    chain_ref: String,
    connectors: Vec<RuntimeConnector>,
    active_connector_id: Option<String>,
    requested_chains: Vec<ChainId>,
    approved_chain_refs: Option<Vec<String>>,
    smart_account_chain_refs: Vec<String>,
    one_click_auth: bool,
    identities: HashMap<String, IdentityProfile>,
    names: HashMap<String, String>,
    avatars: HashMap<String, String>,
    remote_names: HashMap<String, String>,
    balances: HashMap<(String, String), NativeBalance>,
    /// Remaining polls before each hash's receipt appears; absent means
    /// immediately confirmed.
    pending_receipt_polls: HashMap<String, u32>,
    metadata: Option<WalletMetadata>,
    fail_estimate_gas: bool,
    event_seq: u64,
    events: Vec<RuntimeEvent>,
    identity_fetch_count: u64,
    authenticate_count: u64,
    requested_chains_log: Vec<Vec<ChainId>>,
}

impl Default for RuntimeState {
    fn default() -> Self {
        Self {
            connected: false,
            accounts: vec!["0x1000000000000000000000000000000000000001".to_owned()],
            chain_ref: "1".to_owned(),
            connectors: vec![RuntimeConnector {
                id: "walletConnect".to_owned(),
                name: "WalletConnect".to_owned(),
                kind: ConnectorKind::WalletConnect,
                image_url: None,
            }],
            active_connector_id: None,
            requested_chains: Vec::new(),
            approved_chain_refs: None,
            smart_account_chain_refs: Vec::new(),
            one_click_auth: false,
            identities: HashMap::new(),
            names: HashMap::new(),
            avatars: HashMap::new(),
            remote_names: HashMap::new(),
            balances: HashMap::new(),
            pending_receipt_polls: HashMap::new(),
            metadata: None,
            fail_estimate_gas: false,
            event_seq: 0,
            events: Vec::new(),
            identity_fetch_count: 0,
            authenticate_count: 0,
            requested_chains_log: Vec::new(),
        }
    }
}

/// Wallet runtime with a deterministic in-process mode for tests and demos
/// and a JSON-RPC proxy mode for real providers.
#[derive(Debug, Clone)]
pub struct WalletRuntime {
    mode: RuntimeMode,
    state: Arc<Mutex<RuntimeState>>,
}

impl Default for WalletRuntime {
    fn default() -> Self {
        Self::deterministic()
    }
}

impl WalletRuntime {
    pub fn deterministic() -> Self {
        Self {
            mode: RuntimeMode::Deterministic,
            state: Arc::new(Mutex::new(RuntimeState::default())),
        }
    }

    pub fn proxy(base_url: &str, config: &ChainAdapterConfig) -> Result<Self, PortError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_millis(config.http_timeout_ms))
            .build()
            .map_err(|e| PortError::Transport(format!("runtime proxy client init failed: {e}")))?;
        Ok(Self {
            mode: RuntimeMode::Proxy(ProxyRuntime {
                base_url: base_url.to_owned(),
                client,
            }),
            state: Arc::new(Mutex::new(RuntimeState::default())),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, RuntimeState>, PortError> {
        self.state
            .lock()
            .map_err(|e| PortError::Transport(format!("runtime lock poisoned: {e}")))
    }

    fn proxy_call(&self, method: &str, params: Value) -> Result<Value, PortError> {
        let proxy = match &self.mode {
            RuntimeMode::Proxy(proxy) => proxy,
            RuntimeMode::Deterministic => {
                return Err(PortError::Wiring("runtime proxy not enabled".to_owned()))
            }
        };
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        let response = proxy
            .client
            .post(&proxy.base_url)
            .json(&payload)
            .send()
            .map_err(|e| PortError::Transport(format!("runtime proxy request failed: {e}")))?;
        let status = response.status();
        let body: Value = response
            .json()
            .map_err(|e| PortError::Transport(format!("runtime proxy json decode failed: {e}")))?;
        if !status.is_success() {
            return Err(PortError::Transport(format!(
                "runtime proxy status {status}: {body}"
            )));
        }
        if let Some(err) = body.get("error") {
            return Err(PortError::Transport(format!(
                "runtime proxy returned error: {err}"
            )));
        }
        body.get("result")
            .cloned()
            .ok_or_else(|| PortError::Transport("runtime proxy missing result".to_owned()))
    }

    fn deterministic_signature(&self, address: &str, payload: &[u8]) -> String {
        let mut seed = Vec::new();
        seed.extend_from_slice(address.as_bytes());
        seed.extend_from_slice(payload);
        let hash = keccak256(seed);
        let mut sig = Vec::with_capacity(65);
        sig.extend_from_slice(hash.as_slice());
        sig.extend_from_slice(hash.as_slice());
        sig.push(27);
        format!("0x{}", hex::encode(sig))
    }

    fn push_event(state: &mut RuntimeState, kind: RuntimeEventKind) {
        state.event_seq = state.event_seq.saturating_add(1);
        let sequence = state.event_seq;
        state.events.push(RuntimeEvent { sequence, kind });
    }

    fn emit_accounts_changed(state: &mut RuntimeState) {
        let kind = RuntimeEventKind::AccountsChanged {
            accounts: state.accounts.clone(),
            chain_ref: state.chain_ref.clone(),
            connector_id: state.active_connector_id.clone(),
        };
        Self::push_event(state, kind);
    }

    // -- Test hooks ----------------------------------------------------------

    pub fn debug_inject_accounts_changed(&self, accounts: Vec<String>) -> Result<(), PortError> {
        let mut g = self.lock()?;
        g.accounts = accounts;
        g.connected = true;
        Self::emit_accounts_changed(&mut g);
        Ok(())
    }

    pub fn debug_inject_chain_changed(&self, chain_ref: &str) -> Result<(), PortError> {
        let mut g = self.lock()?;
        g.chain_ref = chain_ref.to_owned();
        let kind = RuntimeEventKind::ChainChanged {
            chain_ref: chain_ref.to_owned(),
        };
        Self::push_event(&mut g, kind);
        Ok(())
    }

    pub fn debug_inject_disconnect(&self) -> Result<(), PortError> {
        let mut g = self.lock()?;
        g.connected = false;
        g.active_connector_id = None;
        Self::push_event(&mut g, RuntimeEventKind::Disconnected);
        Ok(())
    }

    pub fn debug_set_connectors(&self, connectors: Vec<RuntimeConnector>) -> Result<(), PortError> {
        let mut g = self.lock()?;
        g.connectors = connectors;
        Self::push_event(&mut g, RuntimeEventKind::ConnectorsChanged);
        Ok(())
    }

    pub fn debug_set_one_click_auth(&self, enabled: bool) -> Result<(), PortError> {
        self.lock()?.one_click_auth = enabled;
        Ok(())
    }

    pub fn debug_set_identity(&self, address: &str, profile: IdentityProfile) -> Result<(), PortError> {
        self.lock()?.identities.insert(address.to_lowercase(), profile);
        Ok(())
    }

    pub fn debug_set_name(&self, address: &str, name: &str) -> Result<(), PortError> {
        let mut g = self.lock()?;
        g.names.insert(address.to_lowercase(), name.to_owned());
        Ok(())
    }

    pub fn debug_set_avatar(&self, name: &str, avatar: &str) -> Result<(), PortError> {
        self.lock()?.avatars.insert(name.to_owned(), avatar.to_owned());
        Ok(())
    }

    pub fn debug_set_remote_name(&self, address: &str, name: &str) -> Result<(), PortError> {
        let mut g = self.lock()?;
        g.remote_names.insert(address.to_lowercase(), name.to_owned());
        Ok(())
    }

    pub fn debug_set_balance(
        &self,
        address: &str,
        chain_ref: &str,
        balance: NativeBalance,
    ) -> Result<(), PortError> {
        self.lock()?
            .balances
            .insert((address.to_lowercase(), chain_ref.to_owned()), balance);
        Ok(())
    }

    pub fn debug_set_approved_chain_refs(&self, refs: Option<Vec<String>>) -> Result<(), PortError> {
        self.lock()?.approved_chain_refs = refs;
        Ok(())
    }

    pub fn debug_set_smart_account_chain_refs(&self, refs: Vec<String>) -> Result<(), PortError> {
        self.lock()?.smart_account_chain_refs = refs;
        Ok(())
    }

    pub fn debug_set_metadata(&self, metadata: WalletMetadata) -> Result<(), PortError> {
        self.lock()?.metadata = Some(metadata);
        Ok(())
    }

    /// Receipt becomes available only after `polls` lookups; `polls == u32::MAX`
    /// keeps the transaction pending forever.
    pub fn debug_set_receipt_delay(&self, hash: &str, polls: u32) -> Result<(), PortError> {
        self.lock()?.pending_receipt_polls.insert(hash.to_owned(), polls);
        Ok(())
    }

    pub fn debug_set_fail_estimate_gas(&self, fail: bool) -> Result<(), PortError> {
        self.lock()?.fail_estimate_gas = fail;
        Ok(())
    }

    pub fn debug_identity_fetch_count(&self) -> Result<u64, PortError> {
        Ok(self.lock()?.identity_fetch_count)
    }

    pub fn debug_authenticate_count(&self) -> Result<u64, PortError> {
        Ok(self.lock()?.authenticate_count)
    }

    /// Every chain list handed to `set_requested_chains`, in call order.
    pub fn debug_requested_chains_log(&self) -> Result<Vec<Vec<ChainId>>, PortError> {
        Ok(self.lock()?.requested_chains_log.clone())
    }
}

impl WalletRuntimePort for WalletRuntime {
    fn accounts(&self) -> Result<Vec<String>, PortError> {
        let g = self.lock()?;
        if g.connected {
            Ok(g.accounts.clone())
        } else {
            Ok(Vec::new())
        }
    }

    fn chain_ref(&self) -> Result<String, PortError> {
        Ok(self.lock()?.chain_ref.clone())
    }

    fn connectors(&self) -> Result<Vec<RuntimeConnector>, PortError> {
        Ok(self.lock()?.connectors.clone())
    }

    fn active_connector_id(&self) -> Result<Option<String>, PortError> {
        Ok(self.lock()?.active_connector_id.clone())
    }

    fn connect(&self, connector_id: Option<&str>) -> Result<(), PortError> {
        let mut g = self.lock()?;
        if let Some(id) = connector_id {
            if !g.connectors.iter().any(|c| c.id == id) {
                return Err(PortError::NotFound(format!("connector not found: {id}")));
            }
            g.active_connector_id = Some(id.to_owned());
        } else {
            g.active_connector_id = Some("walletConnect".to_owned());
        }
        g.connected = true;
        Self::emit_accounts_changed(&mut g);
        Ok(())
    }

    fn disconnect(&self) -> Result<(), PortError> {
        let mut g = self.lock()?;
        g.connected = false;
        g.active_connector_id = None;
        g.approved_chain_refs = None;
        Self::push_event(&mut g, RuntimeEventKind::Disconnected);
        Ok(())
    }

    fn sign_message(&self, address: &str, message: &str) -> Result<String, PortError> {
        match &self.mode {
            RuntimeMode::Deterministic => {
                let g = self.lock()?;
                if !g.connected {
                    return Err(PortError::Policy("no wallet session".to_owned()));
                }
                drop(g);
                Ok(self.deterministic_signature(address, message.as_bytes()))
            }
            RuntimeMode::Proxy(_) => {
                let result = self.proxy_call(
                    "personal_sign",
                    serde_json::json!([message, address]),
                )?;
                result
                    .as_str()
                    .map(str::to_owned)
                    .ok_or_else(|| PortError::Transport("personal_sign result must be string".to_owned()))
            }
        }
    }

    fn send_transaction(&self, args: &SendTransactionArgs) -> Result<String, PortError> {
        match &self.mode {
            RuntimeMode::Deterministic => {
                let g = self.lock()?;
                if !g.connected {
                    return Err(PortError::Policy("no wallet session".to_owned()));
                }
                drop(g);
                let payload =
                    serde_json::to_vec(args).map_err(|e| PortError::Validation(e.to_string()))?;
                let hash = keccak256(payload);
                Ok(format!("0x{}", hex::encode(hash)))
            }
            RuntimeMode::Proxy(_) => {
                let result = self.proxy_call(
                    "eth_sendTransaction",
                    serde_json::json!([{
                        "from": args.address,
                        "to": args.to,
                        "value": args.value,
                        "gas": args.gas,
                        "gasPrice": args.gas_price,
                        "data": args.data,
                    }]),
                )?;
                result
                    .as_str()
                    .map(str::to_owned)
                    .ok_or_else(|| {
                        PortError::Transport("eth_sendTransaction result must be string".to_owned())
                    })
            }
        }
    }

    fn transaction_receipt(&self, hash: &str) -> Result<Option<String>, PortError> {
        match &self.mode {
            RuntimeMode::Deterministic => {
                let mut g = self.lock()?;
                match g.pending_receipt_polls.get_mut(hash) {
                    Some(&mut u32::MAX) => Ok(None),
                    Some(polls) if *polls > 0 => {
                        *polls -= 1;
                        Ok(None)
                    }
                    _ => Ok(Some(format!("receipt:{hash}"))),
                }
            }
            RuntimeMode::Proxy(_) => {
                let result =
                    self.proxy_call("eth_getTransactionReceipt", serde_json::json!([hash]))?;
                if result.is_null() {
                    Ok(None)
                } else {
                    Ok(Some(result.to_string()))
                }
            }
        }
    }

    fn estimate_gas(&self, args: &EstimateGasArgs) -> Result<u128, PortError> {
        match &self.mode {
            RuntimeMode::Deterministic => {
                let g = self.lock()?;
                if g.fail_estimate_gas {
                    return Err(PortError::Transport("estimation unavailable".to_owned()));
                }
                if !g.connected {
                    return Err(PortError::Policy("no wallet session".to_owned()));
                }
                // 21000 base + 16 per calldata byte, enough for tests.
                let data_len = args.data.as_deref().map(str::len).unwrap_or(0) as u128;
                Ok(21_000 + 16 * data_len)
            }
            RuntimeMode::Proxy(_) => {
                let result = self.proxy_call(
                    "eth_estimateGas",
                    serde_json::json!([{
                        "from": args.address,
                        "to": args.to,
                        "data": args.data,
                    }]),
                )?;
                let raw = result.as_str().ok_or_else(|| {
                    PortError::Transport("eth_estimateGas result must be string".to_owned())
                })?;
                u128::from_str_radix(raw.trim_start_matches("0x"), 16)
                    .map_err(|e| PortError::Validation(format!("invalid gas quantity: {e}")))
            }
        }
    }

    fn write_contract(&self, args: &WriteContractArgs) -> Result<String, PortError> {
        let g = self.lock()?;
        if !g.connected {
            return Err(PortError::Policy("no wallet session".to_owned()));
        }
        drop(g);
        let payload = serde_json::to_vec(args).map_err(|e| PortError::Validation(e.to_string()))?;
        let hash = keccak256(payload);
        Ok(format!("0x{}", hex::encode(hash)))
    }

    fn switch_chain(&self, chain_ref: &str) -> Result<(), PortError> {
        match &self.mode {
            RuntimeMode::Deterministic => {
                let mut g = self.lock()?;
                g.chain_ref = chain_ref.to_owned();
                let kind = RuntimeEventKind::ChainChanged {
                    chain_ref: chain_ref.to_owned(),
                };
                Self::push_event(&mut g, kind);
                Ok(())
            }
            RuntimeMode::Proxy(_) => {
                self.proxy_call(
                    "wallet_switchEthereumChain",
                    serde_json::json!([{ "chainId": chain_ref }]),
                )?;
                let mut g = self.lock()?;
                g.chain_ref = chain_ref.to_owned();
                Ok(())
            }
        }
    }

    fn pairing_uri(&self) -> Result<String, PortError> {
        Ok("wc:deadbeef@2?relay-protocol=irn&symKey=cafe".to_owned())
    }

    fn supports_one_click_auth(&self) -> Result<bool, PortError> {
        Ok(self.lock()?.one_click_auth)
    }

    fn authenticate(&self, request: &AuthRequest) -> Result<Option<SignedCredential>, PortError> {
        let (address, chain) = {
            let mut g = self.lock()?;
            g.authenticate_count += 1;
            if !g.one_click_auth {
                return Ok(None);
            }
            g.connected = true;
            if g.active_connector_id.is_none() {
                g.active_connector_id = Some("walletConnect".to_owned());
            }
            let chain = request
                .chains
                .first()
                .cloned()
                .ok_or_else(|| PortError::Validation("empty chain list".to_owned()))?;
            g.chain_ref = chain.reference.clone();
            let address = g
                .accounts
                .first()
                .cloned()
                .ok_or_else(|| PortError::Policy("no account in wallet session".to_owned()))?;
            (address, chain)
        };
        let message = format_siwe_message(
            &SiweConfig {
                domain: request.domain.clone(),
                uri: request.uri.clone(),
                statement: request.statement.clone(),
                ..SiweConfig::default()
            },
            &SiweMessageParams {
                address: address.clone(),
                chain,
                nonce: request.nonce.clone(),
                issued_at: request.issued_at.clone(),
            },
        );
        let signature = self.deterministic_signature(&address, message.as_bytes());
        let mut g = self.lock()?;
        Self::emit_accounts_changed(&mut g);
        Ok(Some(SignedCredential { message, signature }))
    }

    fn set_requested_chains(&self, chains: &[ChainId]) -> Result<(), PortError> {
        let mut g = self.lock()?;
        g.requested_chains = chains.to_vec();
        g.requested_chains_log.push(chains.to_vec());
        Ok(())
    }

    fn requested_chains(&self) -> Result<Vec<ChainId>, PortError> {
        Ok(self.lock()?.requested_chains.clone())
    }

    fn session_approved_chain_refs(&self) -> Result<Option<Vec<String>>, PortError> {
        Ok(self.lock()?.approved_chain_refs.clone())
    }

    fn smart_account_enabled_chain_refs(&self) -> Result<Vec<String>, PortError> {
        Ok(self.lock()?.smart_account_chain_refs.clone())
    }

    fn fetch_identity(&self, address: &str) -> Result<Option<IdentityProfile>, PortError> {
        let mut g = self.lock()?;
        g.identity_fetch_count += 1;
        Ok(g.identities.get(&address.to_lowercase()).cloned())
    }

    fn name_service_name(&self, address: &str) -> Result<Option<String>, PortError> {
        Ok(self.lock()?.names.get(&address.to_lowercase()).cloned())
    }

    fn name_service_avatar(&self, name: &str) -> Result<Option<String>, PortError> {
        Ok(self.lock()?.avatars.get(name).cloned())
    }

    fn name_service_address(&self, name: &str) -> Result<Option<String>, PortError> {
        let g = self.lock()?;
        Ok(g.names
            .iter()
            .find(|(_, n)| n.as_str() == name)
            .map(|(addr, _)| addr.clone()))
    }

    fn remote_signer_name(&self, address: &str) -> Result<Option<String>, PortError> {
        Ok(self.lock()?.remote_names.get(&address.to_lowercase()).cloned())
    }

    fn balance(&self, address: &str, chain_ref: &str) -> Result<Option<NativeBalance>, PortError> {
        Ok(self
            .lock()?
            .balances
            .get(&(address.to_lowercase(), chain_ref.to_owned()))
            .cloned())
    }

    fn wallet_metadata(&self) -> Result<Option<WalletMetadata>, PortError> {
        Ok(self.lock()?.metadata.clone())
    }

    fn drain_events(&self) -> Result<Vec<RuntimeEvent>, PortError> {
        Ok(std::mem::take(&mut self.lock()?.events))
    }
}
