pub mod auth;
pub mod coordinator;
pub mod domain;
pub mod gate;
pub mod ports;
pub mod state_machine;

pub use auth::{AuthController, SiweConfig, SiweMessageParams};
pub use coordinator::{
    AccountPatch, AdapterDescriptor, ChainCoordinator, IngestOutcome, NetworkPatch, RecordProp,
    RecordPropValue, RecordSnapshot, StateKey, StateValue, SubscriptionHandle,
};
pub use domain::{AdapterEvent, CaipAddress, CaipNetwork, ChainId, Namespace};
pub use gate::{EmbeddedGate, GateConfig, GateEvent, RpcRequest};
pub use ports::{
    ClockPort, ConnectionClientPort, EmbeddedProviderPort, NetworkClientPort, PortError,
    TrustAnchorPort, UiPort,
};
pub use state_machine::{ConnectionAction, ConnectionState, StateTransition};
