use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::ports::{EmbeddedProviderPort, PortError, UiPort};

/// Read-only methods forwarded without any UI involvement.
pub const SAFE_RPC_METHODS: &[&str] = &[
    "eth_accounts",
    "eth_blockNumber",
    "eth_call",
    "eth_chainId",
    "eth_estimateGas",
    "eth_feeHistory",
    "eth_gasPrice",
    "eth_getAccount",
    "eth_getBalance",
    "eth_getBlockByHash",
    "eth_getBlockByNumber",
    "eth_getBlockTransactionCountByHash",
    "eth_getBlockTransactionCountByNumber",
    "eth_getCode",
    "eth_getFilterChanges",
    "eth_getFilterLogs",
    "eth_getLogs",
    "eth_getProof",
    "eth_getStorageAt",
    "eth_getTransactionByBlockHashAndIndex",
    "eth_getTransactionByBlockNumberAndIndex",
    "eth_getTransactionByHash",
    "eth_getTransactionCount",
    "eth_getTransactionReceipt",
    "eth_getUncleCountByBlockHash",
    "eth_getUncleCountByBlockNumber",
    "eth_maxPriorityFeePerGas",
    "eth_newBlockFilter",
    "eth_newFilter",
    "eth_newPendingTransactionFilter",
    "eth_sendRawTransaction",
    "eth_syncing",
    "eth_uninstallFilter",
    "wallet_getCallsStatus",
    "wallet_getCapabilities",
];

/// Methods requiring explicit approval in the connection UI.
pub const RISKY_RPC_METHODS: &[&str] = &[
    "eth_sendTransaction",
    "eth_sign",
    "eth_signTypedData",
    "eth_signTypedData_v4",
    "personal_sign",
    "solana_signMessage",
    "solana_signTransaction",
    "solana_signAllTransactions",
    "solana_signAndSendTransaction",
    "wallet_addEthereumChain",
    "wallet_grantPermissions",
    "wallet_revokePermissions",
    "wallet_sendCalls",
    "wallet_switchEthereumChain",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodClass {
    Safe,
    Risky,
    Unknown,
}

pub fn classify_method(method: &str) -> MethodClass {
    if SAFE_RPC_METHODS.contains(&method) {
        MethodClass::Safe
    } else if RISKY_RPC_METHODS.contains(&method) {
        MethodClass::Risky
    } else {
        MethodClass::Unknown
    }
}

#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Delay before the rejection of an unknown method, so the UI settles
    /// on the error view before the provider reports the failure.
    pub unknown_reject_delay_ms: u64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            unknown_reject_delay_ms: 300,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcRequest {
    pub id: u64,
    pub method: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateEvent {
    UiOpened,
    UiClosed,
    ErrorShown { method: String },
    RequestsRejected,
    ApprovalPushed { id: u64 },
    ApprovalPopped { id: u64 },
}

#[derive(Default)]
struct GateState {
    /// Risky requests currently awaiting approval; settles newest first.
    outstanding: Vec<u64>,
    /// Ids already accounted for; defends against duplicate error reports.
    settled: HashSet<u64>,
    events: Vec<GateEvent>,
}

/// Mediates embedded-provider RPC traffic through the connection UI:
/// risky methods hold the UI open until settled, unknown methods are
/// surfaced as an error and rejected wholesale.
pub struct EmbeddedGate {
    ui: Arc<dyn UiPort>,
    provider: Arc<dyn EmbeddedProviderPort>,
    config: GateConfig,
    state: Mutex<GateState>,
}

impl EmbeddedGate {
    pub fn new(
        ui: Arc<dyn UiPort>,
        provider: Arc<dyn EmbeddedProviderPort>,
        config: GateConfig,
    ) -> Self {
        Self {
            ui,
            provider,
            config,
            state: Mutex::new(GateState::default()),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, GateState>, PortError> {
        self.state
            .lock()
            .map_err(|e| PortError::Conflict(format!("gate lock poisoned: {e}")))
    }

    pub fn outstanding(&self) -> Result<Vec<u64>, PortError> {
        Ok(self.lock()?.outstanding.clone())
    }

    pub fn drain_events(&self) -> Result<Vec<GateEvent>, PortError> {
        Ok(std::mem::take(&mut self.lock()?.events))
    }

    pub fn on_rpc_request(&self, request: &RpcRequest) -> Result<(), PortError> {
        match classify_method(&request.method) {
            MethodClass::Safe => Ok(()),
            MethodClass::Risky => {
                let mut g = self.lock()?;
                if !self.ui.is_open() {
                    self.ui.open();
                    g.events.push(GateEvent::UiOpened);
                }
                // A fresh batch may reuse ids settled in earlier batches.
                if g.outstanding.is_empty() {
                    g.settled.clear();
                }
                g.outstanding.push(request.id);
                g.events.push(GateEvent::ApprovalPushed { id: request.id });
                Ok(())
            }
            MethodClass::Unknown => {
                tracing::warn!(method = %request.method, "unsupported rpc method rejected");
                {
                    let mut g = self.lock()?;
                    if !self.ui.is_open() {
                        self.ui.open();
                        g.events.push(GateEvent::UiOpened);
                    }
                }
                std::thread::sleep(Duration::from_millis(self.config.unknown_reject_delay_ms));
                self.ui
                    .show_error(&format!("method not allowed: {}", request.method));
                self.provider.reject_rpc_requests()?;
                let mut g = self.lock()?;
                g.settled.insert(request.id);
                // The provider rejects wholesale, taking pending approvals
                // down with the offending request.
                let ids: Vec<u64> = g.outstanding.drain(..).collect();
                for id in ids {
                    g.settled.insert(id);
                }
                g.events.push(GateEvent::ErrorShown {
                    method: request.method.clone(),
                });
                g.events.push(GateEvent::RequestsRejected);
                Ok(())
            }
        }
    }

    /// Pops exactly one pending approval per distinct failure; with none
    /// pending the UI closes instead.
    pub fn on_rpc_error(&self, request_id: u64) -> Result<(), PortError> {
        let mut g = self.lock()?;
        if !g.settled.insert(request_id) {
            return Ok(());
        }
        match g.outstanding.pop() {
            Some(id) => g.events.push(GateEvent::ApprovalPopped { id }),
            None => {
                self.ui.close();
                g.events.push(GateEvent::UiClosed);
            }
        }
        Ok(())
    }

    pub fn on_rpc_success(&self, request: &RpcRequest) -> Result<(), PortError> {
        if classify_method(&request.method) == MethodClass::Safe {
            return Ok(());
        }
        let mut g = self.lock()?;
        g.settled.insert(request.id);
        if let Some(id) = g.outstanding.pop() {
            g.events.push(GateEvent::ApprovalPopped { id });
        }
        if g.outstanding.is_empty() {
            self.ui.close();
            g.events.push(GateEvent::UiClosed);
        }
        Ok(())
    }

    /// User dismissed the UI: every pending approval is rejected at once.
    pub fn on_ui_closed(&self) -> Result<(), PortError> {
        let mut g = self.lock()?;
        if g.outstanding.is_empty() {
            return Ok(());
        }
        self.provider.reject_rpc_requests()?;
        let ids: Vec<u64> = g.outstanding.drain(..).collect();
        for id in ids {
            g.settled.insert(id);
            g.events.push(GateEvent::ApprovalPopped { id });
        }
        g.events.push(GateEvent::RequestsRejected);
        Ok(())
    }
}
