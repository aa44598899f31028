use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};

use crate::domain::{AuthSession, AuthStatus, ChainId, Namespace};
use crate::ports::{
    AuthenticatePayload, ClockPort, ConnectionClientPort, PortError, TrustAnchorPort,
};
use crate::state_machine::{auth_transition, AuthAction, StateTransition};

/// Host-supplied identity for sign-in messages, plus the reactive sign-out
/// policy toggles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiweConfig {
    pub domain: String,
    pub uri: String,
    pub statement: Option<String>,
    pub sign_out_on_disconnect: bool,
    pub sign_out_on_account_change: bool,
    pub sign_out_on_network_change: bool,
}

impl Default for SiweConfig {
    fn default() -> Self {
        Self {
            domain: String::new(),
            uri: String::new(),
            statement: None,
            sign_out_on_disconnect: true,
            sign_out_on_account_change: true,
            sign_out_on_network_change: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiweMessageParams {
    pub address: String,
    pub chain: ChainId,
    pub nonce: String,
    pub issued_at: String,
}

/// Renders the EIP-4361 plaintext. The statement block is omitted entirely
/// when unset; the chain id line carries the bare reference.
pub fn format_siwe_message(config: &SiweConfig, params: &SiweMessageParams) -> String {
    let mut message = format!(
        "{} wants you to sign in with your Ethereum account:\n{}\n",
        config.domain, params.address
    );
    if let Some(statement) = &config.statement {
        message.push_str(&format!("\n{statement}\n"));
    }
    message.push_str(&format!(
        "\nURI: {}\nVersion: 1\nChain ID: {}\nNonce: {}\nIssued At: {}",
        config.uri, params.chain.reference, params.nonce, params.issued_at
    ));
    message
}

/// Moves the active chain to the front so a one-click session is issued
/// against it; relative order of the rest is preserved.
pub fn reorder_chains(chains: &[ChainId], active: &ChainId) -> Vec<ChainId> {
    let mut ordered = Vec::with_capacity(chains.len());
    for chain in chains {
        if chain == active {
            ordered.insert(0, chain.clone());
        } else {
            ordered.push(chain.clone());
        }
    }
    ordered
}

/// UTC "YYYY-MM-DDTHH:MM:SSZ" from a unix-epoch millisecond timestamp.
pub fn format_iso8601(epoch_ms: u64) -> String {
    let dt = i64::try_from(epoch_ms)
        .ok()
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
        .unwrap_or(DateTime::UNIX_EPOCH);
    dt.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

fn parse_chain_id(raw: &str) -> ChainId {
    match raw.split_once(':') {
        Some((ns, reference)) => ChainId::new(Namespace::new(ns), reference),
        // Bare numeric chain ids come from EVM-only trust anchors.
        None => ChainId::new(Namespace::eip155(), raw),
    }
}

struct AuthState {
    status: AuthStatus,
    session: Option<AuthSession>,
    transitions: Vec<StateTransition>,
}

/// Drives the sign-in handshake against a trust anchor and tracks the
/// current session alongside the auth status machine.
pub struct AuthController {
    trust_anchor: Arc<dyn TrustAnchorPort>,
    clock: Arc<dyn ClockPort>,
    config: SiweConfig,
    state: Mutex<AuthState>,
}

impl AuthController {
    pub fn new(
        trust_anchor: Arc<dyn TrustAnchorPort>,
        clock: Arc<dyn ClockPort>,
        config: SiweConfig,
    ) -> Self {
        Self {
            trust_anchor,
            clock,
            config,
            state: Mutex::new(AuthState {
                status: AuthStatus::Idle,
                session: None,
                transitions: Vec::new(),
            }),
        }
    }

    pub fn config(&self) -> &SiweConfig {
        &self.config
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, AuthState>, PortError> {
        self.state
            .lock()
            .map_err(|e| PortError::Conflict(format!("auth lock poisoned: {e}")))
    }

    pub fn status(&self) -> Result<AuthStatus, PortError> {
        Ok(self.lock()?.status)
    }

    pub fn session(&self) -> Result<Option<AuthSession>, PortError> {
        Ok(self.lock()?.session.clone())
    }

    pub fn transitions(&self) -> Result<Vec<StateTransition>, PortError> {
        Ok(self.lock()?.transitions.clone())
    }

    fn apply(&self, action: AuthAction) -> Result<(), PortError> {
        let mut g = self.lock()?;
        let (next, transition) = auth_transition(g.status, action)?;
        tracing::debug!(from = transition.from, to = transition.to, reason = transition.reason, "auth transition");
        g.status = next;
        g.transitions.push(transition);
        Ok(())
    }

    /// A missing nonce is an authentication failure, not a transport one.
    pub fn request_nonce(&self) -> Result<String, PortError> {
        self.trust_anchor
            .fetch_nonce()?
            .ok_or_else(|| PortError::Auth("trust anchor issued no nonce".into()))
    }

    pub fn create_message(&self, params: &SiweMessageParams) -> String {
        format_siwe_message(&self.config, params)
    }

    /// Submits the signed message. A definitive trust-anchor "no" and a
    /// transport failure both report unverified; transport failures are
    /// logged and never propagated.
    pub fn verify(&self, message: &str, signature: &str, client_id: Option<String>) -> Result<bool, PortError> {
        let payload = AuthenticatePayload {
            message: message.to_owned(),
            signature: signature.to_owned(),
            client_id,
        };
        match self.trust_anchor.authenticate(&payload) {
            Ok(token) => Ok(token.is_some()),
            Err(err) => {
                tracing::warn!(error = %err, "trust anchor verification transport failure");
                Ok(false)
            }
        }
    }

    /// Sequential handshake: nonce, message, wallet signature, verification.
    /// Used directly and as the fallback when one-click auth is unavailable.
    pub fn sign_in(
        &self,
        connection: &dyn ConnectionClientPort,
        address: &str,
        chain: &ChainId,
    ) -> Result<AuthSession, PortError> {
        self.apply(AuthAction::Begin)?;
        let result = self.sign_in_inner(connection, address, chain);
        match &result {
            Ok(session) => {
                self.apply(AuthAction::Succeed)?;
                let mut g = self.lock()?;
                g.session = Some(session.clone());
            }
            Err(_) => self.apply(AuthAction::Fail)?,
        }
        result
    }

    fn sign_in_inner(
        &self,
        connection: &dyn ConnectionClientPort,
        address: &str,
        chain: &ChainId,
    ) -> Result<AuthSession, PortError> {
        let nonce = self.request_nonce()?;
        let issued_at = format_iso8601(self.clock.now_ms()?);
        let params = SiweMessageParams {
            address: address.to_owned(),
            chain: chain.clone(),
            nonce,
            issued_at,
        };
        let message = self.create_message(&params);
        let signature = connection.sign_message(&message)?;
        if self.verify(&message, &signature, None)? {
            Ok(AuthSession {
                address: address.to_owned(),
                chain: chain.clone(),
            })
        } else {
            Err(PortError::Auth("signature rejected by trust anchor".into()))
        }
    }

    /// Installs a session ahead of verification; the caller rolls it back
    /// with [`AuthController::sign_out`] when verification fails.
    pub fn set_session(&self, session: AuthSession) -> Result<(), PortError> {
        let mut g = self.lock()?;
        g.session = Some(session);
        Ok(())
    }

    pub fn mark_authenticating(&self) -> Result<(), PortError> {
        self.apply(AuthAction::Begin)
    }

    pub fn mark_success(&self) -> Result<(), PortError> {
        self.apply(AuthAction::Succeed)
    }

    pub fn mark_failure(&self) -> Result<(), PortError> {
        self.apply(AuthAction::Fail)
    }

    /// Queries the trust anchor for a server-side session and adopts it.
    pub fn restore_session(&self) -> Result<Option<AuthSession>, PortError> {
        let payload = match self.trust_anchor.fetch_session()? {
            Some(payload) => payload,
            None => return Ok(None),
        };
        let session = AuthSession {
            address: payload.address,
            chain: parse_chain_id(&payload.chain_id),
        };
        let mut g = self.lock()?;
        g.session = Some(session.clone());
        g.status = AuthStatus::Success;
        Ok(Some(session))
    }

    /// Best effort: both the trust-anchor call and the local reset always
    /// run, with failures logged rather than propagated.
    pub fn sign_out(&self) -> Result<(), PortError> {
        if let Err(err) = self.trust_anchor.sign_out() {
            tracing::warn!(error = %err, "trust anchor sign-out failed");
        }
        let reset = self.apply(AuthAction::Reset);
        if let Err(err) = &reset {
            tracing::warn!(error = %err, "auth status reset failed");
        }
        let mut g = self.lock()?;
        g.session = None;
        Ok(())
    }

    pub fn on_disconnect(&self) -> Result<(), PortError> {
        if self.config.sign_out_on_disconnect {
            self.sign_out()?;
        }
        Ok(())
    }

    pub fn on_account_changed(&self, address: &str) -> Result<(), PortError> {
        let changed = {
            let g = self.lock()?;
            g.session
                .as_ref()
                .is_some_and(|s| !s.address.eq_ignore_ascii_case(address))
        };
        if changed && self.config.sign_out_on_account_change {
            self.sign_out()?;
        }
        Ok(())
    }

    pub fn on_network_changed(&self, chain: &ChainId) -> Result<(), PortError> {
        let changed = {
            let g = self.lock()?;
            g.session.as_ref().is_some_and(|s| &s.chain != chain)
        };
        if changed && self.config.sign_out_on_network_change {
            self.sign_out()?;
        }
        Ok(())
    }
}
