// SPDX-License-Identifier: MIT

//! Server-side session store for the OAuth anti-forgery state.
//!
//! The install handler mints a session ID (carried back by the browser in a
//! cookie) and parks the state nonce under it. The callback handler takes the
//! nonce back out exactly once. Entries expire after a short TTL so abandoned
//! install flows do not accumulate.
//!
//! The store is process-local; a multi-instance deployment would back this
//! with a shared cache, keyed the same way.

use crate::error::AppError;
use crate::nonce;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;

/// How long an install flow may sit between redirect and callback.
const STATE_TTL_MINUTES: i64 = 10;

/// Name of the cookie carrying the session ID.
pub const SESSION_COOKIE: &str = "shoplink_session";

#[derive(Debug, Clone)]
struct SessionEntry {
    state: String,
    expires_at: DateTime<Utc>,
}

/// In-memory session store keyed by session ID.
#[derive(Clone)]
pub struct SessionStore {
    entries: Arc<DashMap<String, SessionEntry>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl: Duration::minutes(STATE_TTL_MINUTES),
        }
    }

    /// Mint a new session with a fresh state nonce.
    ///
    /// Returns `(session_id, state)`. The session ID goes into the browser
    /// cookie; the state goes into the authorization URL.
    pub fn create_state(&self) -> Result<(String, String), AppError> {
        self.purge_expired();

        let session_id = nonce::random_hex(16)?;
        let state = nonce::random_hex(16)?;

        self.entries.insert(
            session_id.clone(),
            SessionEntry {
                state: state.clone(),
                expires_at: Utc::now() + self.ttl,
            },
        );

        Ok((session_id, state))
    }

    /// Remove and return the state for a session (single use).
    ///
    /// Returns `None` for unknown sessions and for entries past their TTL.
    pub fn take_state(&self, session_id: &str) -> Option<String> {
        let (_, entry) = self.entries.remove(session_id)?;
        if entry.expires_at < Utc::now() {
            return None;
        }
        Some(entry.state)
    }

    /// Read the state without consuming it (for tests and diagnostics).
    pub fn peek_state(&self, session_id: &str) -> Option<String> {
        self.entries.get(session_id).map(|e| e.state.clone())
    }

    /// Drop entries past their TTL.
    fn purge_expired(&self) {
        let now = Utc::now();
        self.entries.retain(|_, entry| entry.expires_at >= now);
    }
}
