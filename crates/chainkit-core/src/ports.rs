use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{CaipNetwork, ChainId, EstimateGasArgs, SendTransactionArgs, WriteContractArgs};

#[derive(Debug, Error)]
pub enum PortError {
    /// Host application mis-registered adapters; never recovered from silently.
    #[error("wiring error: {0}")]
    Wiring(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("policy violation: {0}")]
    Policy(String),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("timed out: {0}")]
    Timeout(String),
    #[error("conflict: {0}")]
    Conflict(String),
}

/// Command surface for connection operations, one per namespace adapter.
pub trait ConnectionClientPort: Send + Sync {
    /// Connects through a remote signer. The pairing URI is delivered through
    /// `on_uri` before the call blocks on provider approval.
    fn connect_wallet_connect(&self, on_uri: &mut dyn FnMut(&str)) -> Result<(), PortError>;
    fn connect_external(&self, connector_id: &str) -> Result<(), PortError>;
    fn disconnect(&self) -> Result<(), PortError>;
    fn sign_message(&self, message: &str) -> Result<String, PortError>;
    /// Never rejects; estimation failures yield a zero sentinel.
    fn estimate_gas(&self, args: &EstimateGasArgs) -> Result<u128, PortError>;
    /// Resolves only once the transaction is confirmed, within a bounded timeout.
    fn send_transaction(&self, args: &SendTransactionArgs) -> Result<String, PortError>;
    fn write_contract(&self, args: &WriteContractArgs) -> Result<String, PortError>;
    fn resolve_name(&self, name: &str) -> Result<Option<String>, PortError>;
    fn resolve_avatar(&self, name: &str) -> Result<Option<String>, PortError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovedNetworks {
    pub approved_network_ids: Option<Vec<ChainId>>,
    pub supports_all_networks: bool,
}

impl ApprovedNetworks {
    pub fn all() -> Self {
        Self {
            approved_network_ids: None,
            supports_all_networks: true,
        }
    }
}

/// Command surface for network operations, one per namespace adapter.
pub trait NetworkClientPort: Send + Sync {
    fn switch_network(&self, network: &CaipNetwork) -> Result<(), PortError>;
    fn approved_networks(&self) -> Result<ApprovedNetworks, PortError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPayload {
    pub address: String,
    pub chain_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatePayload {
    pub message: String,
    pub signature: String,
    pub client_id: Option<String>,
}

/// Trust-anchor HTTP boundary. Non-2xx responses map to `Ok(None)` (not
/// authenticated); only genuine network failures surface as `Transport`.
pub trait TrustAnchorPort: Send + Sync {
    fn fetch_nonce(&self) -> Result<Option<String>, PortError>;
    fn fetch_session(&self) -> Result<Option<SessionPayload>, PortError>;
    /// Returns the issued token when verification succeeds.
    fn authenticate(&self, payload: &AuthenticatePayload) -> Result<Option<String>, PortError>;
    fn update_user(&self, metadata: &serde_json::Value) -> Result<(), PortError>;
    fn sign_out(&self) -> Result<(), PortError>;
}

/// Connection UI driven by the embedded-provider gate.
pub trait UiPort: Send + Sync {
    fn open(&self);
    fn close(&self);
    fn is_open(&self) -> bool;
    fn show_error(&self, message: &str);
}

/// Reject hook into the embedded provider's outstanding RPC requests.
pub trait EmbeddedProviderPort: Send + Sync {
    fn reject_rpc_requests(&self) -> Result<(), PortError>;
}

pub trait ClockPort: Send + Sync {
    fn now_ms(&self) -> Result<u64, PortError>;
}
