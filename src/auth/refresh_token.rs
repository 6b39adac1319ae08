/// Refresh Token Ledger
///
/// Server-side record of live refresh tokens. A refresh token is usable only
/// while its ledger entry exists and has not passed its expiry.
/// - Tokens are hashed with SHA-256 before they become map keys
/// - Expired entries behave as absent on lookup, even before a sweep
/// - One reader/writer lock guards the whole map
/// - A background task sweeps expired entries to bound memory

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
struct LedgerEntry {
    user_id: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct RefreshTokenLedger {
    entries: RwLock<HashMap<String, LedgerEntry>>,
}

impl RefreshTokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a refresh token. Overwrites any entry for the same token.
    pub fn save(&self, token: &str, user_id: &str, expires_at: DateTime<Utc>) {
        let entry = LedgerEntry {
            user_id: user_id.to_string(),
            expires_at,
        };
        self.write().insert(hash_token(token), entry);
    }

    /// Owning user of a live token; `None` if absent or expired.
    pub fn lookup(&self, token: &str) -> Option<String> {
        self.lookup_at(token, Utc::now())
    }

    pub fn lookup_at(&self, token: &str, now: DateTime<Utc>) -> Option<String> {
        self.read()
            .get(&hash_token(token))
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.user_id.clone())
    }

    /// Remove a token. Returns whether an entry existed.
    pub fn delete(&self, token: &str) -> bool {
        self.write().remove(&hash_token(token)).is_some()
    }

    /// Remove every entry expiring at or before `now`. Returns how many were removed.
    pub fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.write();
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    /// Number of entries, expired-but-unswept ones included.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Critical sections never panic midway, so a poisoned map is still consistent.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, LedgerEntry>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, LedgerEntry>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Hash a refresh token using SHA-256
fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Start the periodic sweep of expired refresh tokens.
///
/// The task stops when `shutdown` is cancelled; await the returned handle to
/// join it.
pub fn spawn_refresh_token_sweeper(
    ledger: Arc<RefreshTokenLedger>,
    period: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!(interval_secs = period.as_secs(), "Refresh token sweeper started");

        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("Refresh token sweeper stopped");
                    break;
                }
                _ = ticker.tick() => {
                    let removed = ledger.sweep_expired(Utc::now());
                    tracing::debug!(removed, remaining = ledger.len(), "Swept expired refresh tokens");
                }
            }
        }
    })
}
