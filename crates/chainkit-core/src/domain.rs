use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for a blockchain ecosystem with its own address/chain-id format
/// (e.g. "eip155", "solana").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Namespace(String);

impl Namespace {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn eip155() -> Self {
        Self::new("eip155")
    }

    pub fn solana() -> Self {
        Self::new("solana")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Namespace-qualified chain reference, globally unique across namespaces.
/// The CAIP string form is `namespace:reference` (e.g. "eip155:1").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChainId {
    pub namespace: Namespace,
    pub reference: String,
}

impl ChainId {
    pub fn new(namespace: Namespace, reference: impl Into<String>) -> Self {
        Self {
            namespace,
            reference: reference.into(),
        }
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.reference)
    }
}

/// Network descriptor published to consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaipNetwork {
    pub id: ChainId,
    pub name: String,
    pub image_id: Option<String>,
    pub image_url: Option<String>,
}

impl CaipNetwork {
    pub fn new(id: ChainId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            image_id: None,
            image_url: None,
        }
    }
}

/// Chain-scoped account address, `namespace:reference:address`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaipAddress {
    pub chain: ChainId,
    pub address: String,
}

impl CaipAddress {
    pub fn new(chain: ChainId, address: impl Into<String>) -> Self {
        Self {
            chain,
            address: address.into(),
        }
    }
}

impl fmt::Display for CaipAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chain, self.address)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountKind {
    Eoa,
    SmartAccount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceAccount {
    pub address: String,
    pub kind: AccountKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectedWalletInfo {
    pub name: String,
    pub icon: Option<String>,
    pub url: Option<String>,
}

/// Per-namespace account slice. `is_connected == false` implies
/// `caip_address` is absent and `all_accounts` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    pub is_connected: bool,
    pub caip_address: Option<CaipAddress>,
    pub balance: Option<String>,
    pub balance_symbol: Option<String>,
    pub profile_name: Option<String>,
    pub profile_image: Option<String>,
    pub address_explorer_url: Option<String>,
    pub preferred_account_type: Option<AccountKind>,
    pub smart_account_deployed: bool,
    pub current_tab: u32,
    pub connected_wallet_info: Option<ConnectedWalletInfo>,
    pub all_accounts: Vec<NamespaceAccount>,
}

impl Default for AccountState {
    fn default() -> Self {
        Self {
            is_connected: false,
            caip_address: None,
            balance: None,
            balance_symbol: None,
            profile_name: None,
            profile_image: None,
            address_explorer_url: None,
            preferred_account_type: None,
            smart_account_deployed: false,
            current_tab: 0,
            connected_wallet_info: None,
            all_accounts: Vec::new(),
        }
    }
}

/// Per-namespace network slice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkState {
    pub active_network: Option<CaipNetwork>,
    pub requested_networks: Vec<CaipNetwork>,
    pub supports_all_networks: bool,
    pub approved_network_ids: Option<Vec<ChainId>>,
    pub smart_account_enabled_networks: Vec<String>,
}

impl Default for NetworkState {
    fn default() -> Self {
        Self {
            active_network: None,
            requested_networks: Vec::new(),
            supports_all_networks: true,
            approved_network_ids: None,
            smart_account_enabled_networks: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectorKind {
    Injected,
    Announced,
    WalletConnect,
    Auth,
    External,
}

/// Descriptor of a connection method within a namespace, unique by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connector {
    pub id: String,
    pub name: String,
    pub kind: ConnectorKind,
    pub image_id: Option<String>,
    pub image_url: Option<String>,
}

impl Connector {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: ConnectorKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            image_id: None,
            image_url: None,
        }
    }
}

/// Capability flags the embedded/auth connector registers with, separate from
/// the generic connector list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConnectorCapabilities {
    pub email: bool,
    pub social_providers: Vec<String>,
    pub show_wallets: bool,
    pub wallet_features: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConnector {
    pub connector: Connector,
    pub capabilities: AuthConnectorCapabilities,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthStatus {
    Idle,
    Authenticating,
    Success,
    Error,
}

impl AuthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Authenticating => "authenticating",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// Server-trusted session bound to a wallet address. Exists only while a
/// sign-in handshake is outstanding or has succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub address: String,
    pub chain: ChainId,
}

/// Closed set of events a namespace adapter feeds into the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterEvent {
    AccountChanged {
        address: String,
        chain_ref: String,
        accounts: Vec<NamespaceAccount>,
        connector_id: Option<String>,
    },
    ConnectorsChanged {
        connectors: Vec<Connector>,
    },
    Disconnected,
}

/// Snapshot projected to legacy single-chain consumers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicState {
    pub active_namespace: Option<Namespace>,
    pub selected_network: Option<ChainId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendTransactionArgs {
    pub address: String,
    pub to: String,
    pub value: Option<String>,
    pub gas: Option<String>,
    pub gas_price: Option<String>,
    pub data: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateGasArgs {
    pub address: String,
    pub to: String,
    pub data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteContractArgs {
    pub token_address: String,
    pub receiver_address: String,
    pub token_amount: String,
    pub method: String,
}
