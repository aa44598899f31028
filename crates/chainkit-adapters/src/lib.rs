pub mod clock;
pub mod config;
pub mod resolver;
pub mod runtime;
pub mod trust_anchor;
pub mod wallet;

pub use clock::SystemClock;
pub use config::ChainAdapterConfig;
pub use resolver::{
    DirectoryResolver, NameServiceResolver, ProfileResolver, RemoteSignerNameResolver,
};
pub use runtime::{AuthRequest, SignedCredential, WalletRuntime, WalletRuntimePort};
pub use trust_anchor::TrustAnchorHttp;
pub use wallet::{WalletAdapter, AUTH_CONNECTOR_ID, WALLET_CONNECT_CONNECTOR_ID};
