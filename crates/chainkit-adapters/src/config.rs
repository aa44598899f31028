use chainkit_core::GateConfig;

/// Adapter-wide tunables. Hosts override individual fields from
/// `..Default::default()`.
#[derive(Debug, Clone)]
pub struct ChainAdapterConfig {
    pub trust_anchor_base_url: String,
    pub http_timeout_ms: u64,
    /// Upper bound on waiting for a sent transaction's confirmation.
    pub confirmation_timeout_ms: u64,
    pub confirmation_poll_interval_ms: u64,
    /// Delay before rejecting unsupported embedded-provider methods.
    pub unknown_reject_delay_ms: u64,
    /// Chain reference against which directory name lookups run.
    pub name_service_chain_ref: String,
    pub remote_name_suffix: String,
    pub client_id: Option<String>,
}

impl ChainAdapterConfig {
    /// Gate settings derived from the adapter-wide tunables, so the reject
    /// delay has a single source of truth.
    pub fn gate_config(&self) -> GateConfig {
        GateConfig {
            unknown_reject_delay_ms: self.unknown_reject_delay_ms,
        }
    }
}

impl Default for ChainAdapterConfig {
    fn default() -> Self {
        Self {
            trust_anchor_base_url: "https://api.web3modal.org".to_owned(),
            http_timeout_ms: 15_000,
            confirmation_timeout_ms: 25_000,
            confirmation_poll_interval_ms: 1_000,
            unknown_reject_delay_ms: 300,
            name_service_chain_ref: "1".to_owned(),
            remote_name_suffix: ".reown.id".to_owned(),
            client_id: None,
        }
    }
}
