use std::sync::Arc;
use std::time::Duration;

use chainkit_core::auth::{format_iso8601, reorder_chains};
use chainkit_core::domain::{
    AccountKind, AdapterEvent, AuthConnector, AuthConnectorCapabilities, AuthSession, CaipNetwork,
    Connector, ConnectorKind, ConnectedWalletInfo, EstimateGasArgs, NamespaceAccount,
    SendTransactionArgs, WriteContractArgs,
};
use chainkit_core::ports::ApprovedNetworks;
use chainkit_core::{
    AccountPatch, AuthController, CaipAddress, ChainCoordinator, ChainId, ClockPort,
    ConnectionClientPort, IngestOutcome, Namespace, NetworkClientPort, NetworkPatch, PortError,
};

use crate::resolver::{resolve_profile, ProfileResolver};
use crate::runtime::{AuthRequest, RuntimeEventKind, WalletRuntimePort};
use crate::ChainAdapterConfig;

pub const WALLET_CONNECT_CONNECTOR_ID: &str = "walletConnect";
pub const AUTH_CONNECTOR_ID: &str = "embeddedAuth";

/// Namespace adapter: translates one wallet runtime's events and commands
/// into coordinator state, and fronts the runtime as the namespace's
/// connection and network clients.
pub struct WalletAdapter {
    namespace: Namespace,
    runtime: Arc<dyn WalletRuntimePort>,
    coordinator: Arc<ChainCoordinator>,
    auth: Arc<AuthController>,
    clock: Arc<dyn ClockPort>,
    config: ChainAdapterConfig,
    resolvers: Vec<Box<dyn ProfileResolver>>,
}

impl WalletAdapter {
    pub fn new(
        namespace: Namespace,
        runtime: Arc<dyn WalletRuntimePort>,
        coordinator: Arc<ChainCoordinator>,
        auth: Arc<AuthController>,
        clock: Arc<dyn ClockPort>,
        config: ChainAdapterConfig,
        resolvers: Vec<Box<dyn ProfileResolver>>,
    ) -> Self {
        Self {
            namespace,
            runtime,
            coordinator,
            auth,
            clock,
            config,
            resolvers,
        }
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Drains runtime events and folds them into coordinator state. Hosts
    /// call this after every runtime interaction (or on a poll loop).
    pub fn pump(&self) -> Result<(), PortError> {
        for event in self.runtime.drain_events()? {
            match event.kind {
                RuntimeEventKind::AccountsChanged {
                    accounts,
                    chain_ref,
                    connector_id,
                } => self.handle_accounts_changed(accounts, chain_ref, connector_id)?,
                RuntimeEventKind::ChainChanged { chain_ref } => {
                    self.handle_chain_changed(&chain_ref)?
                }
                RuntimeEventKind::ConnectorsChanged => self.sync_connectors()?,
                RuntimeEventKind::Disconnected => {
                    self.coordinator
                        .ingest(&self.namespace, AdapterEvent::Disconnected)?;
                    self.auth.on_disconnect()?;
                }
            }
        }
        Ok(())
    }

    fn handle_accounts_changed(
        &self,
        accounts: Vec<String>,
        chain_ref: String,
        connector_id: Option<String>,
    ) -> Result<(), PortError> {
        let address = match accounts.first() {
            Some(address) => address.clone(),
            None => {
                self.coordinator
                    .ingest(&self.namespace, AdapterEvent::Disconnected)?;
                self.auth.on_disconnect()?;
                return Ok(());
            }
        };
        let all_accounts = accounts
            .iter()
            .map(|a| NamespaceAccount {
                address: a.clone(),
                kind: AccountKind::Eoa,
            })
            .collect();
        let outcome = self.coordinator.ingest(
            &self.namespace,
            AdapterEvent::AccountChanged {
                address: address.clone(),
                chain_ref: chain_ref.clone(),
                accounts: all_accounts,
                connector_id,
            },
        )?;
        if outcome == IngestOutcome::Duplicate {
            return Ok(());
        }
        self.auth.on_account_changed(&address)?;
        let caip = CaipAddress::new(
            ChainId::new(self.namespace.clone(), chain_ref),
            address,
        );
        self.enrich_account(&caip)?;
        Ok(())
    }

    fn handle_chain_changed(&self, chain_ref: &str) -> Result<(), PortError> {
        let chain = ChainId::new(self.namespace.clone(), chain_ref);
        let network = self
            .coordinator
            .network_state(Some(&self.namespace))?
            .requested_networks
            .iter()
            .find(|n| n.id == chain)
            .cloned()
            .unwrap_or_else(|| CaipNetwork::new(chain.clone(), chain.to_string()));
        self.coordinator.set_active_network(network)?;
        self.auth.on_network_changed(&chain)?;
        Ok(())
    }

    /// Profile, balance, and network-approval enrichment for the given
    /// canonical address. Runs after the identity update; late results
    /// against a superseded address are discarded by the coordinator guard.
    fn enrich_account(&self, caip: &CaipAddress) -> Result<(), PortError> {
        self.sync_approved_networks(caip)?;
        let mut patch = AccountPatch::default();
        if let Some(profile) = resolve_profile(&self.resolvers, &caip.address, &caip.chain) {
            patch.profile_name = Some(profile.name);
            patch.profile_image = Some(profile.avatar);
        }
        if let Some(balance) = self.runtime.balance(&caip.address, &caip.chain.reference)? {
            patch.balance = Some(Some(balance.amount));
            patch.balance_symbol = Some(Some(balance.symbol));
        }
        if let Some(metadata) = self.runtime.wallet_metadata()? {
            patch.connected_wallet_info = Some(Some(ConnectedWalletInfo {
                name: metadata.name,
                icon: metadata.icon,
                url: metadata.url,
            }));
        }
        if patch == AccountPatch::default() {
            return Ok(());
        }
        self.coordinator
            .apply_enrichment(&self.namespace, caip, patch)?;
        Ok(())
    }

    /// Publishes the connector's network-approval set, skipped when the
    /// account has already moved on.
    fn sync_approved_networks(&self, caip: &CaipAddress) -> Result<(), PortError> {
        let approved = self.approved_networks()?;
        let current = self
            .coordinator
            .account_state(Some(&self.namespace))?
            .caip_address;
        if current.as_ref() != Some(caip) {
            return Ok(());
        }
        self.coordinator.set_chain_network_data(
            &self.namespace,
            NetworkPatch {
                supports_all_networks: Some(approved.supports_all_networks),
                approved_network_ids: Some(approved.approved_network_ids),
                ..NetworkPatch::default()
            },
            false,
        )?;
        Ok(())
    }

    /// Publishes the runtime's connector list. Embedded auth connectors are
    /// split out and registered with their capability flags instead of
    /// appearing in the plain list.
    pub fn sync_connectors(&self) -> Result<(), PortError> {
        let mut connectors = Vec::new();
        for rc in self.runtime.connectors()? {
            let mut connector = Connector::new(rc.id.clone(), rc.name.clone(), rc.kind);
            connector.image_url = rc.image_url.clone();
            if rc.kind == ConnectorKind::Auth {
                self.coordinator.register_auth_connector(AuthConnector {
                    connector,
                    capabilities: AuthConnectorCapabilities {
                        email: true,
                        social_providers: Vec::new(),
                        show_wallets: true,
                        wallet_features: true,
                    },
                })?;
            } else {
                connectors.push(connector);
            }
        }
        self.coordinator.set_connectors(connectors)?;
        Ok(())
    }

    fn canonical_address(&self) -> Result<CaipAddress, PortError> {
        self.coordinator
            .account_state(Some(&self.namespace))?
            .caip_address
            .ok_or_else(|| PortError::Policy("no account connected".to_owned()))
    }

    fn requested_chains(&self) -> Result<Vec<ChainId>, PortError> {
        Ok(self
            .coordinator
            .network_state(Some(&self.namespace))?
            .requested_networks
            .iter()
            .map(|n| n.id.clone())
            .collect())
    }

    fn one_click_connect(&self, on_uri: &mut dyn FnMut(&str)) -> Result<bool, PortError> {
        let chains = self.requested_chains()?;
        if chains.is_empty() {
            return Ok(false);
        }
        let ordered = match self.coordinator.active_network()? {
            Some(active) => reorder_chains(&chains, &active.id),
            None => chains,
        };
        // Requested chains go down before the handshake so session
        // settlement is judged against them, not a stale set.
        self.runtime.set_requested_chains(&ordered)?;

        let nonce = self.auth.request_nonce()?;
        let request = AuthRequest {
            chains: ordered.clone(),
            domain: self.auth.config().domain.clone(),
            uri: self.auth.config().uri.clone(),
            statement: self.auth.config().statement.clone(),
            nonce,
            issued_at: format_iso8601(self.clock.now_ms()?),
        };
        on_uri(&self.runtime.pairing_uri()?);
        self.auth.mark_authenticating()?;
        let credential = match self.runtime.authenticate(&request) {
            Ok(Some(credential)) => credential,
            Ok(None) => {
                self.auth.mark_failure()?;
                return Ok(false);
            }
            Err(err) => {
                self.auth.mark_failure()?;
                return Err(err);
            }
        };
        self.pump()?;

        // Session is installed ahead of verification so the account is
        // usable immediately; a failed verify rolls the whole thing back.
        let address = self.canonical_address()?;
        let chain = ordered
            .first()
            .cloned()
            .ok_or_else(|| PortError::Validation("empty chain list".to_owned()))?;
        self.auth.set_session(AuthSession {
            address: address.address.clone(),
            chain,
        })?;

        let verified = self.auth.verify(
            &credential.message,
            &credential.signature,
            self.config.client_id.clone(),
        )?;
        if !verified {
            tracing::warn!(address = %address, "one-click verification failed; rolling back session");
            // Teardown first; the failure status lands after the
            // disconnect-driven sign-out so it is what callers observe.
            self.runtime.disconnect()?;
            self.pump()?;
            self.auth.mark_failure()?;
            return Err(PortError::Auth(
                "signature rejected by trust anchor".to_owned(),
            ));
        }
        self.auth.mark_success()?;
        Ok(true)
    }
}

impl ConnectionClientPort for WalletAdapter {
    fn connect_wallet_connect(&self, on_uri: &mut dyn FnMut(&str)) -> Result<(), PortError> {
        if self.runtime.supports_one_click_auth()? && self.one_click_connect(on_uri)? {
            return Ok(());
        }
        // Plain pairing, then the sequential handshake.
        on_uri(&self.runtime.pairing_uri()?);
        self.runtime.connect(None)?;
        self.pump()?;
        let caip = self.canonical_address()?;
        self.auth.sign_in(self, &caip.address, &caip.chain)?;
        Ok(())
    }

    fn connect_external(&self, connector_id: &str) -> Result<(), PortError> {
        self.runtime.connect(Some(connector_id))?;
        self.pump()
    }

    fn disconnect(&self) -> Result<(), PortError> {
        self.runtime.disconnect()?;
        self.pump()
    }

    fn sign_message(&self, message: &str) -> Result<String, PortError> {
        let caip = self.canonical_address()?;
        self.runtime.sign_message(&caip.address, message)
    }

    fn estimate_gas(&self, args: &EstimateGasArgs) -> Result<u128, PortError> {
        match self.runtime.estimate_gas(args) {
            Ok(gas) => Ok(gas),
            Err(err) => {
                tracing::warn!(error = %err, "gas estimation failed; reporting zero");
                Ok(0)
            }
        }
    }

    fn send_transaction(&self, args: &SendTransactionArgs) -> Result<String, PortError> {
        let hash = self.runtime.send_transaction(args)?;
        let started = self.clock.now_ms()?;
        loop {
            if self.runtime.transaction_receipt(&hash)?.is_some() {
                break;
            }
            if self.clock.now_ms()?.saturating_sub(started) >= self.config.confirmation_timeout_ms {
                return Err(PortError::Timeout(format!(
                    "transaction not confirmed within {}ms: {hash}",
                    self.config.confirmation_timeout_ms
                )));
            }
            std::thread::sleep(Duration::from_millis(self.config.confirmation_poll_interval_ms));
        }
        if let Ok(caip) = self.canonical_address() {
            self.enrich_account(&caip)?;
        }
        Ok(hash)
    }

    fn write_contract(&self, args: &WriteContractArgs) -> Result<String, PortError> {
        self.runtime.write_contract(args)
    }

    fn resolve_name(&self, name: &str) -> Result<Option<String>, PortError> {
        self.runtime.name_service_address(name)
    }

    fn resolve_avatar(&self, name: &str) -> Result<Option<String>, PortError> {
        self.runtime.name_service_avatar(name)
    }
}

impl NetworkClientPort for WalletAdapter {
    fn switch_network(&self, network: &CaipNetwork) -> Result<(), PortError> {
        if network.id.namespace != self.namespace {
            return Err(PortError::Validation(format!(
                "network {} does not belong to namespace {}",
                network.id, self.namespace
            )));
        }
        self.runtime.switch_chain(&network.id.reference)?;
        self.coordinator.set_active_network(network.clone())?;
        self.auth.on_network_changed(&network.id)?;
        self.pump()
    }

    /// The first matching branch is authoritative; later branches never
    /// widen an earlier narrow answer.
    fn approved_networks(&self) -> Result<ApprovedNetworks, PortError> {
        let active = self.runtime.active_connector_id()?;
        match active.as_deref() {
            Some(AUTH_CONNECTOR_ID) => {
                let refs = self.runtime.smart_account_enabled_chain_refs()?;
                Ok(ApprovedNetworks {
                    approved_network_ids: Some(
                        refs.iter()
                            .map(|r| ChainId::new(self.namespace.clone(), r.clone()))
                            .collect(),
                    ),
                    supports_all_networks: false,
                })
            }
            Some(WALLET_CONNECT_CONNECTOR_ID) => {
                let refs = self.runtime.session_approved_chain_refs()?;
                Ok(ApprovedNetworks {
                    approved_network_ids: refs.map(|refs| {
                        refs.iter()
                            .map(|r| ChainId::new(self.namespace.clone(), r.clone()))
                            .collect()
                    }),
                    supports_all_networks: false,
                })
            }
            _ => Ok(ApprovedNetworks::all()),
        }
    }
}
