use std::sync::{Arc, Mutex};

use crate::domain::{
    AccountKind, AccountState, AdapterEvent, AuthConnector, CaipAddress, CaipNetwork, ChainId,
    Connector, ConnectorKind, ConnectedWalletInfo, NamespaceAccount, Namespace, NetworkState,
    PublicState,
};
use crate::ports::{ConnectionClientPort, NetworkClientPort, PortError};

/// Registration entry consumed by [`ChainCoordinator::initialize`]; the first
/// descriptor's namespace becomes active.
#[derive(Clone)]
pub struct AdapterDescriptor {
    pub namespace: Namespace,
    pub connection_client: Arc<dyn ConnectionClientPort>,
    pub network_client: Arc<dyn NetworkClientPort>,
    pub default_network: CaipNetwork,
}

/// Shallow merge patch for a namespace's account slice. `None` retains the
/// current value; double-option fields distinguish "retain" from "clear".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountPatch {
    pub is_connected: Option<bool>,
    pub caip_address: Option<Option<CaipAddress>>,
    pub balance: Option<Option<String>>,
    pub balance_symbol: Option<Option<String>>,
    pub profile_name: Option<Option<String>>,
    pub profile_image: Option<Option<String>>,
    pub address_explorer_url: Option<Option<String>>,
    pub preferred_account_type: Option<Option<AccountKind>>,
    pub smart_account_deployed: Option<bool>,
    pub current_tab: Option<u32>,
    pub connected_wallet_info: Option<Option<ConnectedWalletInfo>>,
    pub all_accounts: Option<Vec<NamespaceAccount>>,
}

impl AccountPatch {
    /// Patch restoring every field to its disconnected default.
    pub fn reset() -> Self {
        Self {
            is_connected: Some(false),
            caip_address: Some(None),
            balance: Some(None),
            balance_symbol: Some(None),
            profile_name: Some(None),
            profile_image: Some(None),
            address_explorer_url: Some(None),
            preferred_account_type: Some(None),
            smart_account_deployed: Some(false),
            current_tab: Some(0),
            connected_wallet_info: Some(None),
            all_accounts: Some(Vec::new()),
        }
    }

    fn apply(&self, state: &mut AccountState) {
        if let Some(v) = self.is_connected {
            state.is_connected = v;
        }
        if let Some(v) = &self.caip_address {
            state.caip_address = v.clone();
        }
        if let Some(v) = &self.balance {
            state.balance = v.clone();
        }
        if let Some(v) = &self.balance_symbol {
            state.balance_symbol = v.clone();
        }
        if let Some(v) = &self.profile_name {
            state.profile_name = v.clone();
        }
        if let Some(v) = &self.profile_image {
            state.profile_image = v.clone();
        }
        if let Some(v) = &self.address_explorer_url {
            state.address_explorer_url = v.clone();
        }
        if let Some(v) = &self.preferred_account_type {
            state.preferred_account_type = *v;
        }
        if let Some(v) = self.smart_account_deployed {
            state.smart_account_deployed = v;
        }
        if let Some(v) = self.current_tab {
            state.current_tab = v;
        }
        if let Some(v) = &self.connected_wallet_info {
            state.connected_wallet_info = v.clone();
        }
        if let Some(v) = &self.all_accounts {
            state.all_accounts = v.clone();
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkPatch {
    pub active_network: Option<Option<CaipNetwork>>,
    pub requested_networks: Option<Vec<CaipNetwork>>,
    pub supports_all_networks: Option<bool>,
    pub approved_network_ids: Option<Option<Vec<ChainId>>>,
    pub smart_account_enabled_networks: Option<Vec<String>>,
}

impl NetworkPatch {
    pub fn reset() -> Self {
        Self {
            active_network: Some(None),
            requested_networks: None,
            supports_all_networks: Some(true),
            approved_network_ids: Some(None),
            smart_account_enabled_networks: Some(Vec::new()),
        }
    }

    fn apply(&self, state: &mut NetworkState) {
        if let Some(v) = &self.active_network {
            state.active_network = v.clone();
        }
        if let Some(v) = &self.requested_networks {
            state.requested_networks = v.clone();
        }
        if let Some(v) = self.supports_all_networks {
            state.supports_all_networks = v;
        }
        if let Some(v) = &self.approved_network_ids {
            state.approved_network_ids = v.clone();
        }
        if let Some(v) = &self.smart_account_enabled_networks {
            state.smart_account_enabled_networks = v.clone();
        }
    }
}

/// Value-comparable snapshot of one namespace's adapter record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSnapshot {
    pub namespace: Namespace,
    pub account_state: AccountState,
    pub network_state: NetworkState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateKey {
    ActiveNamespace,
    ActiveNetwork,
    ActiveConnector,
    Connectors,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateValue {
    ActiveNamespace(Option<Namespace>),
    ActiveNetwork(Option<CaipNetwork>),
    ActiveConnector(Option<Connector>),
    Connectors(Vec<Connector>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordProp {
    AccountState,
    NetworkState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordPropValue {
    AccountState(AccountState),
    NetworkState(NetworkState),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    Applied,
    /// The normalized account+chain pair already matched canonical state.
    Duplicate,
}

struct ChainRecord {
    namespace: Namespace,
    connection_client: Arc<dyn ConnectionClientPort>,
    network_client: Arc<dyn NetworkClientPort>,
    account_state: AccountState,
    network_state: NetworkState,
}

#[derive(Default)]
struct CoordinatorState {
    initialized: bool,
    multichain_enabled: bool,
    active_namespace: Option<Namespace>,
    active_network: Option<CaipNetwork>,
    active_connector: Option<Connector>,
    connectors: Vec<Connector>,
    auth_connector: Option<AuthConnector>,
    records: Vec<ChainRecord>,
    public_state: PublicState,
}

impl CoordinatorState {
    fn record(&self, ns: &Namespace) -> Option<&ChainRecord> {
        self.records.iter().find(|r| &r.namespace == ns)
    }

    fn record_mut(&mut self, ns: &Namespace) -> Option<&mut ChainRecord> {
        self.records.iter_mut().find(|r| &r.namespace == ns)
    }

    fn active_record(&self) -> Option<&ChainRecord> {
        self.active_namespace.as_ref().and_then(|ns| self.record(ns))
    }
}

type KeyCallback = Arc<dyn Fn(&StateValue) + Send + Sync>;
type RecordCallback = Arc<dyn Fn(&RecordSnapshot) + Send + Sync>;
type PropCallback = Arc<dyn Fn(&RecordPropValue) + Send + Sync>;

enum Subscriber {
    Key {
        key: StateKey,
        prev: Option<StateValue>,
        callback: KeyCallback,
    },
    Record {
        prev: Option<RecordSnapshot>,
        callback: RecordCallback,
    },
    Prop {
        prop: RecordProp,
        prev: Option<RecordPropValue>,
        callback: PropCallback,
    },
}

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    entries: Vec<(u64, Subscriber)>,
}

/// Unsubscribe handle; invoke on teardown.
pub struct SubscriptionHandle {
    id: u64,
    subscribers: std::sync::Weak<Mutex<Subscribers>>,
}

impl SubscriptionHandle {
    pub fn unsubscribe(self) {
        if let Some(subs) = self.subscribers.upgrade() {
            if let Ok(mut g) = subs.lock() {
                g.entries.retain(|(id, _)| *id != self.id);
            }
        }
    }
}

/// Process-wide registry of active namespace, active network, and
/// per-namespace account/network slices. Explicitly constructed; hosts keep
/// one instance per application and pass it by reference.
pub struct ChainCoordinator {
    state: Arc<Mutex<CoordinatorState>>,
    subscribers: Arc<Mutex<Subscribers>>,
}

impl Default for ChainCoordinator {
    fn default() -> Self {
        Self::new(false)
    }
}

impl ChainCoordinator {
    pub fn new(multichain_enabled: bool) -> Self {
        let state = CoordinatorState {
            multichain_enabled,
            ..CoordinatorState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
            subscribers: Arc::new(Mutex::new(Subscribers::default())),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, CoordinatorState>, PortError> {
        self.state
            .lock()
            .map_err(|e| PortError::Conflict(format!("coordinator lock poisoned: {e}")))
    }

    /// Registers one adapter per namespace. The first descriptor's namespace
    /// becomes active and its default network is seeded.
    pub fn initialize(&self, adapters: Vec<AdapterDescriptor>) -> Result<(), PortError> {
        let first = adapters
            .first()
            .cloned()
            .ok_or_else(|| PortError::Wiring("adapter list is empty; nothing to activate".into()))?;

        {
            let mut g = self.lock()?;
            if g.initialized {
                return Err(PortError::Wiring("coordinator already initialized".into()));
            }
            for adapter in adapters {
                if g.record(&adapter.namespace).is_some() {
                    return Err(PortError::Wiring(format!(
                        "namespace registered twice: {}",
                        adapter.namespace
                    )));
                }
                g.records.push(ChainRecord {
                    namespace: adapter.namespace,
                    connection_client: adapter.connection_client,
                    network_client: adapter.network_client,
                    account_state: AccountState::default(),
                    network_state: NetworkState::default(),
                });
            }
            g.initialized = true;
            g.active_namespace = Some(first.namespace.clone());
            g.public_state.active_namespace = Some(first.namespace.clone());
        }
        tracing::debug!(namespace = %first.namespace, "coordinator initialized");
        self.set_active_network(first.default_network)
    }

    /// Clears registrations and subscribers; the instance can be re-initialized.
    pub fn dispose(&self) -> Result<(), PortError> {
        let mut g = self.lock()?;
        let multichain_enabled = g.multichain_enabled;
        *g = CoordinatorState {
            multichain_enabled,
            ..CoordinatorState::default()
        };
        drop(g);
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.entries.clear();
        }
        Ok(())
    }

    /// No-op when the namespace is already active or unregistered.
    pub fn set_active_namespace(&self, namespace: &Namespace) -> Result<(), PortError> {
        {
            let mut g = self.lock()?;
            if g.active_namespace.as_ref() == Some(namespace) || g.record(namespace).is_none() {
                return Ok(());
            }
            g.active_namespace = Some(namespace.clone());
            g.public_state.active_namespace = Some(namespace.clone());
            let network = g
                .record(namespace)
                .and_then(|r| r.network_state.active_network.clone());
            g.public_state.selected_network = network.as_ref().map(|n| n.id.clone());
            g.active_network = network;
        }
        tracing::debug!(namespace = %namespace, "active namespace switched");
        self.notify();
        Ok(())
    }

    /// Stores the network as its namespace's active network, activating that
    /// namespace first when it differs from the current one.
    pub fn set_active_network(&self, network: CaipNetwork) -> Result<(), PortError> {
        let ns = network.id.namespace.clone();
        self.set_active_namespace(&ns)?;
        self.set_chain_network_data(
            &ns,
            NetworkPatch {
                active_network: Some(Some(network.clone())),
                ..NetworkPatch::default()
            },
            false,
        )?;
        {
            let mut g = self.lock()?;
            g.active_network = Some(network.clone());
            g.public_state.selected_network = Some(network.id);
        }
        self.notify();
        Ok(())
    }

    pub fn set_active_connector(&self, connector: Connector) -> Result<(), PortError> {
        {
            let mut g = self.lock()?;
            g.active_connector = Some(connector);
        }
        self.notify();
        Ok(())
    }

    /// Merge-patches the addressed namespace's account slice. The merge is
    /// fully applied before any observer fires.
    pub fn set_chain_account_data(
        &self,
        namespace: &Namespace,
        patch: AccountPatch,
    ) -> Result<(), PortError> {
        {
            let mut g = self.lock()?;
            let record = g.record_mut(namespace).ok_or_else(|| {
                PortError::Wiring(format!("namespace not registered: {namespace}"))
            })?;
            patch.apply(&mut record.account_state);
        }
        self.notify();
        Ok(())
    }

    /// Merge-patches the network slice. `republish` additionally projects the
    /// change to the top-level active network when the namespace is active.
    pub fn set_chain_network_data(
        &self,
        namespace: &Namespace,
        patch: NetworkPatch,
        republish: bool,
    ) -> Result<(), PortError> {
        {
            let mut g = self.lock()?;
            let record = g.record_mut(namespace).ok_or_else(|| {
                PortError::Wiring(format!("namespace not registered: {namespace}"))
            })?;
            patch.apply(&mut record.network_state);
            if republish && g.active_namespace.as_ref() == Some(namespace) {
                let active = g
                    .record(namespace)
                    .and_then(|r| r.network_state.active_network.clone());
                g.public_state.selected_network = active.as_ref().map(|n| n.id.clone());
                g.active_network = active;
            }
        }
        self.notify();
        Ok(())
    }

    /// Restores the addressed namespace's account slice to disconnected
    /// defaults (the active namespace when multichain mode is off).
    pub fn reset_account(&self, namespace: Option<&Namespace>) -> Result<(), PortError> {
        let ns = self.resolve_namespace(namespace)?;
        self.set_chain_account_data(&ns, AccountPatch::reset())
    }

    fn resolve_namespace(&self, namespace: Option<&Namespace>) -> Result<Namespace, PortError> {
        let g = self.lock()?;
        let ns = if g.multichain_enabled {
            namespace.cloned().or_else(|| g.active_namespace.clone())
        } else {
            g.active_namespace.clone()
        };
        ns.ok_or_else(|| PortError::Wiring("no namespace is active".into()))
    }

    pub fn get_connection_client(
        &self,
        namespace: Option<&Namespace>,
    ) -> Result<Arc<dyn ConnectionClientPort>, PortError> {
        let g = self.lock()?;
        let ns = namespace
            .cloned()
            .or_else(|| g.active_namespace.clone())
            .ok_or_else(|| PortError::Wiring("no namespace is active".into()))?;
        let record = g
            .record(&ns)
            .ok_or_else(|| PortError::Wiring(format!("chain adapter not found: {ns}")))?;
        Ok(Arc::clone(&record.connection_client))
    }

    pub fn get_network_client(
        &self,
        namespace: Option<&Namespace>,
    ) -> Result<Arc<dyn NetworkClientPort>, PortError> {
        let g = self.lock()?;
        let ns = namespace
            .cloned()
            .or_else(|| g.active_namespace.clone())
            .ok_or_else(|| PortError::Wiring("no namespace is active".into()))?;
        let record = g
            .record(&ns)
            .ok_or_else(|| PortError::Wiring(format!("chain adapter not found: {ns}")))?;
        Ok(Arc::clone(&record.network_client))
    }

    /// Single ingestion point for the adapter event set.
    pub fn ingest(
        &self,
        namespace: &Namespace,
        event: AdapterEvent,
    ) -> Result<IngestOutcome, PortError> {
        match event {
            AdapterEvent::AccountChanged {
                address,
                chain_ref,
                accounts,
                connector_id: _,
            } => self.ingest_account_changed(namespace, address, chain_ref, accounts),
            AdapterEvent::ConnectorsChanged { connectors } => {
                self.set_connectors(connectors)?;
                Ok(IngestOutcome::Applied)
            }
            AdapterEvent::Disconnected => {
                self.set_chain_account_data(namespace, AccountPatch::reset())?;
                self.set_chain_network_data(namespace, NetworkPatch::reset(), true)?;
                tracing::debug!(namespace = %namespace, "account disconnected");
                Ok(IngestOutcome::Applied)
            }
        }
    }

    fn ingest_account_changed(
        &self,
        namespace: &Namespace,
        address: String,
        chain_ref: String,
        accounts: Vec<NamespaceAccount>,
    ) -> Result<IngestOutcome, PortError> {
        let chain = ChainId::new(namespace.clone(), chain_ref);
        let caip = CaipAddress::new(chain.clone(), address);

        let network = {
            let g = self.lock()?;
            let record = g.record(namespace).ok_or_else(|| {
                PortError::Wiring(format!("namespace not registered: {namespace}"))
            })?;
            if record.account_state.caip_address.as_ref() == Some(&caip) {
                return Ok(IngestOutcome::Duplicate);
            }
            record
                .network_state
                .requested_networks
                .iter()
                .find(|n| n.id == chain)
                .cloned()
                .unwrap_or_else(|| CaipNetwork::new(chain.clone(), chain.to_string()))
        };

        self.set_chain_network_data(
            namespace,
            NetworkPatch {
                active_network: Some(Some(network)),
                ..NetworkPatch::default()
            },
            true,
        )?;
        self.set_chain_account_data(
            namespace,
            AccountPatch {
                is_connected: Some(true),
                caip_address: Some(Some(caip.clone())),
                all_accounts: Some(accounts),
                ..AccountPatch::default()
            },
        )?;
        tracing::debug!(address = %caip, "canonical account updated");
        Ok(IngestOutcome::Applied)
    }

    /// Applies an enrichment patch only while `expected` is still the
    /// canonical address, discarding results of stale in-flight lookups.
    pub fn apply_enrichment(
        &self,
        namespace: &Namespace,
        expected: &CaipAddress,
        patch: AccountPatch,
    ) -> Result<bool, PortError> {
        {
            let g = self.lock()?;
            let record = g.record(namespace).ok_or_else(|| {
                PortError::Wiring(format!("namespace not registered: {namespace}"))
            })?;
            if record.account_state.caip_address.as_ref() != Some(expected) {
                tracing::debug!(address = %expected, "stale enrichment discarded");
                return Ok(false);
            }
        }
        self.set_chain_account_data(namespace, patch)?;
        Ok(true)
    }

    /// Publishes the deduplicated connector list (first occurrence wins); the
    /// embedded/auth connector is registered through
    /// [`ChainCoordinator::register_auth_connector`] instead.
    pub fn set_connectors(&self, connectors: Vec<Connector>) -> Result<(), PortError> {
        {
            let mut g = self.lock()?;
            let mut seen = std::collections::HashSet::new();
            g.connectors = connectors
                .into_iter()
                .filter(|c| c.kind != ConnectorKind::Auth && seen.insert(c.id.clone()))
                .collect();
        }
        self.notify();
        Ok(())
    }

    pub fn register_auth_connector(&self, connector: AuthConnector) -> Result<(), PortError> {
        let mut g = self.lock()?;
        g.auth_connector = Some(connector);
        Ok(())
    }

    // -- Snapshot accessors --------------------------------------------------

    pub fn active_namespace(&self) -> Result<Option<Namespace>, PortError> {
        Ok(self.lock()?.active_namespace.clone())
    }

    pub fn active_network(&self) -> Result<Option<CaipNetwork>, PortError> {
        Ok(self.lock()?.active_network.clone())
    }

    pub fn public_state(&self) -> Result<PublicState, PortError> {
        Ok(self.lock()?.public_state.clone())
    }

    pub fn connectors(&self) -> Result<Vec<Connector>, PortError> {
        Ok(self.lock()?.connectors.clone())
    }

    pub fn auth_connector(&self) -> Result<Option<AuthConnector>, PortError> {
        Ok(self.lock()?.auth_connector.clone())
    }

    pub fn account_state(&self, namespace: Option<&Namespace>) -> Result<AccountState, PortError> {
        let ns = self.resolve_target(namespace)?;
        let g = self.lock()?;
        g.record(&ns)
            .map(|r| r.account_state.clone())
            .ok_or_else(|| PortError::Wiring(format!("namespace not registered: {ns}")))
    }

    pub fn network_state(&self, namespace: Option<&Namespace>) -> Result<NetworkState, PortError> {
        let ns = self.resolve_target(namespace)?;
        let g = self.lock()?;
        g.record(&ns)
            .map(|r| r.network_state.clone())
            .ok_or_else(|| PortError::Wiring(format!("namespace not registered: {ns}")))
    }

    fn resolve_target(&self, namespace: Option<&Namespace>) -> Result<Namespace, PortError> {
        match namespace {
            Some(ns) => Ok(ns.clone()),
            None => self
                .lock()?
                .active_namespace
                .clone()
                .ok_or_else(|| PortError::Wiring("no namespace is active".into())),
        }
    }

    // -- Subscriptions -------------------------------------------------------

    pub fn subscribe_key(
        &self,
        key: StateKey,
        callback: impl Fn(&StateValue) + Send + Sync + 'static,
    ) -> SubscriptionHandle {
        self.push_subscriber(Subscriber::Key {
            key,
            prev: None,
            callback: Arc::new(callback),
        })
    }

    /// Fires when the active namespace's adapter record changes identity.
    pub fn subscribe_record(
        &self,
        callback: impl Fn(&RecordSnapshot) + Send + Sync + 'static,
    ) -> SubscriptionHandle {
        self.push_subscriber(Subscriber::Record {
            prev: None,
            callback: Arc::new(callback),
        })
    }

    /// Fires when one property of the active adapter record changes by value.
    pub fn subscribe_record_prop(
        &self,
        prop: RecordProp,
        callback: impl Fn(&RecordPropValue) + Send + Sync + 'static,
    ) -> SubscriptionHandle {
        self.push_subscriber(Subscriber::Prop {
            prop,
            prev: None,
            callback: Arc::new(callback),
        })
    }

    fn push_subscriber(&self, subscriber: Subscriber) -> SubscriptionHandle {
        let mut subs = match self.subscribers.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        subs.next_id += 1;
        let id = subs.next_id;
        subs.entries.push((id, subscriber));
        SubscriptionHandle {
            id,
            subscribers: Arc::downgrade(&self.subscribers),
        }
    }

    fn key_value(state: &CoordinatorState, key: StateKey) -> StateValue {
        match key {
            StateKey::ActiveNamespace => StateValue::ActiveNamespace(state.active_namespace.clone()),
            StateKey::ActiveNetwork => StateValue::ActiveNetwork(state.active_network.clone()),
            StateKey::ActiveConnector => StateValue::ActiveConnector(state.active_connector.clone()),
            StateKey::Connectors => StateValue::Connectors(state.connectors.clone()),
        }
    }

    fn prop_value(record: &ChainRecord, prop: RecordProp) -> RecordPropValue {
        match prop {
            RecordProp::AccountState => RecordPropValue::AccountState(record.account_state.clone()),
            RecordProp::NetworkState => RecordPropValue::NetworkState(record.network_state.clone()),
        }
    }

    /// Compares fresh snapshots against each subscriber's last observed value
    /// and fires only on change. Callbacks run outside both locks.
    fn notify(&self) {
        enum Pending {
            Key(KeyCallback, StateValue),
            Record(RecordCallback, RecordSnapshot),
            Prop(PropCallback, RecordPropValue),
        }

        let mut pending = Vec::new();
        {
            let state = match self.state.lock() {
                Ok(g) => g,
                Err(_) => return,
            };
            let mut subs = match self.subscribers.lock() {
                Ok(g) => g,
                Err(_) => return,
            };
            let active = state.active_record();
            for (_, sub) in subs.entries.iter_mut() {
                match sub {
                    Subscriber::Key { key, prev, callback } => {
                        let next = Self::key_value(&state, *key);
                        if prev.as_ref() != Some(&next) {
                            *prev = Some(next.clone());
                            pending.push(Pending::Key(Arc::clone(callback), next));
                        }
                    }
                    Subscriber::Record { prev, callback } => {
                        if let Some(record) = active {
                            let next = RecordSnapshot {
                                namespace: record.namespace.clone(),
                                account_state: record.account_state.clone(),
                                network_state: record.network_state.clone(),
                            };
                            if prev.as_ref() != Some(&next) {
                                *prev = Some(next.clone());
                                pending.push(Pending::Record(Arc::clone(callback), next));
                            }
                        }
                    }
                    Subscriber::Prop {
                        prop,
                        prev,
                        callback,
                    } => {
                        if let Some(record) = active {
                            let next = Self::prop_value(record, *prop);
                            if prev.as_ref() != Some(&next) {
                                *prev = Some(next.clone());
                                pending.push(Pending::Prop(Arc::clone(callback), next));
                            }
                        }
                    }
                }
            }
        }
        for entry in pending {
            match entry {
                Pending::Key(cb, value) => cb(&value),
                Pending::Record(cb, value) => cb(&value),
                Pending::Prop(cb, value) => cb(&value),
            }
        }
    }
}
