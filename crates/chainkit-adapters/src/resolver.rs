use std::sync::Arc;

use chainkit_core::{ChainId, Namespace, PortError};

use crate::runtime::{IdentityProfile, WalletRuntimePort};

/// One stage of the profile lookup cascade. `Ok(None)` means "no result
/// here, try the next stage".
pub trait ProfileResolver: Send + Sync {
    fn resolve(&self, address: &str, chain: &ChainId) -> Result<Option<IdentityProfile>, PortError>;
}

/// Wallet directory lookup; the canonical source, tried first.
pub struct DirectoryResolver {
    runtime: Arc<dyn WalletRuntimePort>,
}

impl DirectoryResolver {
    pub fn new(runtime: Arc<dyn WalletRuntimePort>) -> Self {
        Self { runtime }
    }
}

impl ProfileResolver for DirectoryResolver {
    fn resolve(&self, address: &str, _chain: &ChainId) -> Result<Option<IdentityProfile>, PortError> {
        self.runtime.fetch_identity(address)
    }
}

/// On-chain name service lookup, restricted to one chain; name registries
/// live on the canonical chain only and reverse records elsewhere are
/// untrustworthy.
pub struct NameServiceResolver {
    runtime: Arc<dyn WalletRuntimePort>,
    chain_ref: String,
}

impl NameServiceResolver {
    pub fn new(runtime: Arc<dyn WalletRuntimePort>, chain_ref: &str) -> Self {
        Self {
            runtime,
            chain_ref: chain_ref.to_owned(),
        }
    }
}

impl ProfileResolver for NameServiceResolver {
    fn resolve(&self, address: &str, chain: &ChainId) -> Result<Option<IdentityProfile>, PortError> {
        if chain.namespace != Namespace::eip155() || chain.reference != self.chain_ref {
            return Ok(None);
        }
        let name = match self.runtime.name_service_name(address)? {
            Some(name) => name,
            None => return Ok(None),
        };
        let avatar = self.runtime.name_service_avatar(&name)?;
        Ok(Some(IdentityProfile {
            name: Some(name),
            avatar,
        }))
    }
}

/// Remote-signer name registry; last resort, yields a name but no avatar.
/// Bare labels are qualified with the registry suffix.
pub struct RemoteSignerNameResolver {
    runtime: Arc<dyn WalletRuntimePort>,
    suffix: String,
}

impl RemoteSignerNameResolver {
    pub fn new(runtime: Arc<dyn WalletRuntimePort>, suffix: &str) -> Self {
        Self {
            runtime,
            suffix: suffix.to_owned(),
        }
    }
}

impl ProfileResolver for RemoteSignerNameResolver {
    fn resolve(&self, address: &str, _chain: &ChainId) -> Result<Option<IdentityProfile>, PortError> {
        Ok(self.runtime.remote_signer_name(address)?.map(|name| {
            let name = if name.ends_with(&self.suffix) {
                name
            } else {
                format!("{name}{}", self.suffix)
            };
            IdentityProfile {
                name: Some(name),
                avatar: None,
            }
        }))
    }
}

/// First stage to produce a profile wins; stage failures are logged and the
/// cascade continues, so a flaky directory never hides an on-chain name.
pub fn resolve_profile(
    resolvers: &[Box<dyn ProfileResolver>],
    address: &str,
    chain: &ChainId,
) -> Option<IdentityProfile> {
    for resolver in resolvers {
        match resolver.resolve(address, chain) {
            Ok(Some(profile)) => return Some(profile),
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(error = %err, address, "profile resolver stage failed");
            }
        }
    }
    None
}
