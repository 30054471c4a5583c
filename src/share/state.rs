use chrono::{DateTime, Utc};

use crate::gateway::GatewayError;
use crate::payload::{PayloadRejection, ScannedIdentity};
use crate::tokens::{IssuedToken, TokenView};

/// Where the check-in flow currently stands.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionState {
    /// Waiting for a valid code.
    Idle,
    Scanned {
        identity: ScannedIdentity,
    },
    /// Listing tokens to see whether this facility already issued one.
    CheckingExisting {
        identity: ScannedIdentity,
    },
    ShowingExistingToken {
        identity: ScannedIdentity,
        token: IssuedToken,
    },
    AwaitingConsent {
        identity: ScannedIdentity,
        /// Failure of the previous attempt, if any.
        last_error: Option<GatewayError>,
    },
    Submitting {
        identity: ScannedIdentity,
    },
    /// Share accepted; waiting for the counter to issue a token.
    Polling {
        identity: ScannedIdentity,
    },
    ShowingNewToken {
        identity: ScannedIdentity,
        token: IssuedToken,
    },
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Scanned { .. } => "scanned",
            SessionState::CheckingExisting { .. } => "checking-existing",
            SessionState::ShowingExistingToken { .. } => "showing-existing-token",
            SessionState::AwaitingConsent { .. } => "awaiting-consent",
            SessionState::Submitting { .. } => "submitting",
            SessionState::Polling { .. } => "polling",
            SessionState::ShowingNewToken { .. } => "showing-new-token",
        }
    }

    pub fn identity(&self) -> Option<&ScannedIdentity> {
        match self {
            SessionState::Idle => None,
            SessionState::Scanned { identity }
            | SessionState::CheckingExisting { identity }
            | SessionState::ShowingExistingToken { identity, .. }
            | SessionState::AwaitingConsent { identity, .. }
            | SessionState::Submitting { identity }
            | SessionState::Polling { identity }
            | SessionState::ShowingNewToken { identity, .. } => Some(identity),
        }
    }

    pub fn selected_token(&self) -> Option<&IssuedToken> {
        match self {
            SessionState::ShowingExistingToken { token, .. }
            | SessionState::ShowingNewToken { token, .. } => Some(token),
            _ => None,
        }
    }

    pub fn selected_token_view(&self, now: DateTime<Utc>) -> Option<TokenView> {
        self.selected_token()
            .map(|token| TokenView::compute(token, now))
    }

    pub fn last_error(&self) -> Option<&GatewayError> {
        match self {
            SessionState::AwaitingConsent { last_error, .. } => last_error.as_ref(),
            _ => None,
        }
    }

    pub fn dialog(&self) -> Dialog {
        match self {
            SessionState::AwaitingConsent { .. }
            | SessionState::Submitting { .. }
            | SessionState::Polling { .. } => Dialog::Consent,
            SessionState::ShowingExistingToken { .. } | SessionState::ShowingNewToken { .. } => {
                Dialog::Token
            }
            _ => Dialog::None,
        }
    }

    /// The "I agree" button is only live while a prompt waits for an answer.
    pub fn confirm_enabled(&self) -> bool {
        matches!(self, SessionState::AwaitingConsent { .. })
    }

    /// The prompt shows "Waiting for token..." instead of the confirm label.
    pub fn is_waiting_for_token(&self) -> bool {
        matches!(
            self,
            SessionState::Submitting { .. } | SessionState::Polling { .. }
        )
    }
}

/// The single dialog on screen. Consent and token dialogs never show together.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dialog {
    None,
    Consent,
    Token,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DecodeOutcome {
    /// The payload was a counter code; carries the state reached for it.
    Accepted(SessionState),
    /// Not a counter code; the session is unchanged.
    Rejected(PayloadRejection),
}

impl DecodeOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, DecodeOutcome::Accepted(_))
    }
}
