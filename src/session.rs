use std::fmt;

use crate::auth::{mask_secret, TokenResponse};

/// Where a session stands in its authentication lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated,
    /// Holds an access token but cannot renew it once it expires.
    AuthenticatedNoRefresh,
    /// A refresh was impossible or was rejected by the token endpoint.
    Unrecoverable,
}

/// In-memory token state. Tokens are only ever replaced as a pair.
#[derive(Clone, Default)]
pub struct Session {
    access_token: String,
    refresh_token: Option<String>,
    unrecoverable: bool,
}

impl Session {
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.filter(|t| !t.is_empty()),
            unrecoverable: false,
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    pub fn state(&self) -> SessionState {
        if self.unrecoverable {
            SessionState::Unrecoverable
        } else if self.access_token.is_empty() {
            SessionState::Unauthenticated
        } else if self.refresh_token.is_none() {
            SessionState::AuthenticatedNoRefresh
        } else {
            SessionState::Authenticated
        }
    }

    pub(crate) fn replace(&mut self, tokens: TokenResponse) {
        self.access_token = tokens.access_token;
        self.refresh_token = tokens.refresh_token.filter(|t| !t.is_empty());
        self.unrecoverable = false;
    }

    pub(crate) fn mark_unrecoverable(&mut self) {
        self.unrecoverable = true;
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &mask_secret(&self.access_token))
            .field("refresh_token", &self.refresh_token.as_deref().map(mask_secret))
            .field("state", &self.state())
            .finish()
    }
}
