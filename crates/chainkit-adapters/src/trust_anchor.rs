use serde::Deserialize;

use chainkit_core::ports::{AuthenticatePayload, SessionPayload};
use chainkit_core::{PortError, TrustAnchorPort};

use crate::ChainAdapterConfig;

#[derive(Debug, Deserialize)]
struct NonceResponse {
    nonce: String,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    address: String,
    #[serde(rename = "chainId")]
    chain_id: String,
}

#[derive(Debug, Deserialize)]
struct AuthenticateResponse {
    token: Option<String>,
}

/// Trust-anchor client over blocking HTTP. The cookie store carries the
/// session cookie across the nonce, authenticate, and me calls.
#[derive(Debug, Clone)]
pub struct TrustAnchorHttp {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl TrustAnchorHttp {
    pub fn new(config: &ChainAdapterConfig) -> Result<Self, PortError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_millis(config.http_timeout_ms))
            .cookie_store(true)
            .build()
            .map_err(|e| PortError::Transport(format!("trust anchor client init failed: {e}")))?;
        Ok(Self {
            base_url: config.trust_anchor_base_url.trim_end_matches('/').to_owned(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base_url)
    }
}

impl TrustAnchorPort for TrustAnchorHttp {
    fn fetch_nonce(&self) -> Result<Option<String>, PortError> {
        let response = self
            .client
            .get(self.url("nonce"))
            .send()
            .map_err(|e| PortError::Transport(format!("nonce request failed: {e}")))?;
        if !response.status().is_success() {
            return Ok(None);
        }
        let body: NonceResponse = response
            .json()
            .map_err(|e| PortError::Transport(format!("nonce decode failed: {e}")))?;
        Ok(Some(body.nonce))
    }

    fn fetch_session(&self) -> Result<Option<SessionPayload>, PortError> {
        let response = self
            .client
            .get(self.url("me"))
            .send()
            .map_err(|e| PortError::Transport(format!("session request failed: {e}")))?;
        if !response.status().is_success() {
            return Ok(None);
        }
        let body: SessionResponse = match response.json() {
            Ok(body) => body,
            // An empty body means "no session", not a protocol failure.
            Err(_) => return Ok(None),
        };
        Ok(Some(SessionPayload {
            address: body.address,
            chain_id: body.chain_id,
        }))
    }

    fn authenticate(&self, payload: &AuthenticatePayload) -> Result<Option<String>, PortError> {
        let body = serde_json::json!({
            "message": payload.message,
            "signature": payload.signature,
            "clientId": payload.client_id,
        });
        let response = self
            .client
            .post(self.url("authenticate"))
            .json(&body)
            .send()
            .map_err(|e| PortError::Transport(format!("authenticate request failed: {e}")))?;
        if !response.status().is_success() {
            return Ok(None);
        }
        let body: AuthenticateResponse = response
            .json()
            .map_err(|e| PortError::Transport(format!("authenticate decode failed: {e}")))?;
        Ok(body.token)
    }

    fn update_user(&self, metadata: &serde_json::Value) -> Result<(), PortError> {
        let response = self
            .client
            .post(self.url("update-user"))
            .json(&serde_json::json!({ "metadata": metadata }))
            .send()
            .map_err(|e| PortError::Transport(format!("update-user request failed: {e}")))?;
        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "trust anchor rejected user update");
        }
        Ok(())
    }

    fn sign_out(&self) -> Result<(), PortError> {
        let response = self
            .client
            .post(self.url("sign-out"))
            .send()
            .map_err(|e| PortError::Transport(format!("sign-out request failed: {e}")))?;
        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "trust anchor rejected sign-out");
        }
        Ok(())
    }
}
