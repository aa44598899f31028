use crate::domain::AuthStatus;
use crate::ports::PortError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTransition {
    pub from: &'static str,
    pub to: &'static str,
    pub reason: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAction {
    Begin,
    Succeed,
    Fail,
    Reset,
}

pub fn auth_transition(
    status: AuthStatus,
    action: AuthAction,
) -> Result<(AuthStatus, StateTransition), PortError> {
    let next = match (status, action) {
        // Begin also retries out of a failed handshake.
        (AuthStatus::Idle | AuthStatus::Error, AuthAction::Begin) => AuthStatus::Authenticating,
        (AuthStatus::Authenticating, AuthAction::Succeed) => AuthStatus::Success,
        (AuthStatus::Authenticating, AuthAction::Fail) => AuthStatus::Error,
        // Rollback tears the session down before recording the failure, so
        // Fail can land on an already-reset machine.
        (AuthStatus::Idle, AuthAction::Fail) => AuthStatus::Error,
        // Sign-out and disconnect return both terminal states to idle; an
        // in-flight handshake abandoned by disconnect resets the same way.
        (AuthStatus::Success | AuthStatus::Error | AuthStatus::Authenticating, AuthAction::Reset) => {
            AuthStatus::Idle
        }
        (AuthStatus::Idle, AuthAction::Reset) => AuthStatus::Idle,
        (from, action) => {
            return Err(PortError::Conflict(format!(
                "illegal auth transition: {} on {:?}",
                from.as_str(),
                action
            )))
        }
    };
    Ok((
        next,
        StateTransition {
            from: status.as_str(),
            to: next.as_str(),
            reason: auth_reason(action),
        },
    ))
}

fn auth_reason(action: AuthAction) -> &'static str {
    match action {
        AuthAction::Begin => "handshake_started",
        AuthAction::Succeed => "verification_succeeded",
        AuthAction::Fail => "verification_failed",
        AuthAction::Reset => "session_cleared",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionAction {
    Connect,
    Established,
    Drop,
}

pub fn connection_transition(
    state: ConnectionState,
    action: ConnectionAction,
) -> Result<(ConnectionState, StateTransition), PortError> {
    let next = match (state, action) {
        (ConnectionState::Disconnected, ConnectionAction::Connect) => ConnectionState::Connecting,
        (ConnectionState::Connecting, ConnectionAction::Established) => ConnectionState::Connected,
        // Events can report an established session without an explicit
        // connect round trip (provider-initiated reconnects).
        (ConnectionState::Disconnected, ConnectionAction::Established) => ConnectionState::Connected,
        (ConnectionState::Connecting | ConnectionState::Connected, ConnectionAction::Drop) => {
            ConnectionState::Disconnected
        }
        (from, action) => {
            return Err(PortError::Conflict(format!(
                "illegal connection transition: {} on {:?}",
                from.as_str(),
                action
            )))
        }
    };
    Ok((
        next,
        StateTransition {
            from: state.as_str(),
            to: next.as_str(),
            reason: connection_reason(action),
        },
    ))
}

fn connection_reason(action: ConnectionAction) -> &'static str {
    match action {
        ConnectionAction::Connect => "connect_requested",
        ConnectionAction::Established => "session_established",
        ConnectionAction::Drop => "session_dropped",
    }
}
