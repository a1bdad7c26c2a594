// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Authenticated-session signal
//!
//! Login and logout flows publish here; the coordinator reads the current
//! token before every remote call.

use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub authenticated: bool,
    pub token: Option<String>,
}

impl Session {
    pub fn authenticated(token: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            token: Some(token.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    /// The bearer token, only while authenticated
    pub fn token(&self) -> Option<&str> {
        if self.authenticated {
            self.token.as_deref()
        } else {
            None
        }
    }
}

/// Shared, observable session state
#[derive(Clone)]
pub struct SessionSignal {
    tx: Arc<watch::Sender<Session>>,
}

impl Default for SessionSignal {
    fn default() -> Self {
        Self::new(Session::anonymous())
    }
}

impl SessionSignal {
    pub fn new(initial: Session) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    pub fn current(&self) -> Session {
        self.tx.borrow().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.tx.borrow().token().map(str::to_string)
    }

    pub fn login(&self, token: impl Into<String>) {
        self.set(Session::authenticated(token));
    }

    pub fn logout(&self) {
        self.set(Session::anonymous());
    }

    pub fn set(&self, session: Session) {
        tracing::info!(authenticated = session.authenticated, "session changed");
        self.tx.send_replace(session);
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
