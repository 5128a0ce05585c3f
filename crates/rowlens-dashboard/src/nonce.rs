//! Anti-forgery tokens.
//!
//! A token is a truncated SHA-256 digest over the secret, the action, the
//! user and the current tick, where a tick is half the configured lifetime.
//! A token verifies during the tick it was issued in and the following one,
//! so it lives between half and the whole lifetime.

use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};

/// Action for the table data endpoint and viewer fragments.
pub const ACTION_TABLE_DATA: &str = "rowlens_table_data";

/// Action for the admin row count endpoint.
pub const ACTION_ADMIN: &str = "rowlens_admin";

/// Hex characters kept from the digest.
const TOKEN_LEN: usize = 20;

#[derive(Clone)]
pub struct NonceIssuer {
    secret: Vec<u8>,
    tick_secs: u64,
}

impl std::fmt::Debug for NonceIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NonceIssuer")
            .field("tick_secs", &self.tick_secs)
            .finish_non_exhaustive()
    }
}

pub(crate) fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl NonceIssuer {
    pub fn new(secret: impl Into<Vec<u8>>, lifetime_secs: u64) -> Self {
        Self {
            secret: secret.into(),
            tick_secs: (lifetime_secs / 2).max(1),
        }
    }

    /// Issuer with a random secret; tokens do not survive a restart.
    pub fn random(lifetime_secs: u64) -> Self {
        let secret: [u8; 32] = rand::random();
        Self::new(secret.to_vec(), lifetime_secs)
    }

    pub(crate) fn secret(&self) -> &[u8] {
        &self.secret
    }

    fn tick(&self, now: u64) -> u64 {
        now.div_ceil(self.tick_secs)
    }

    fn digest(&self, action: &str, user: &str, tick: u64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.secret);
        hasher.update(b"|");
        hasher.update(action.as_bytes());
        hasher.update(b"|");
        hasher.update(user.as_bytes());
        hasher.update(b"|");
        hasher.update(tick.to_be_bytes());
        let mut token = hex::encode(hasher.finalize());
        token.truncate(TOKEN_LEN);
        token
    }

    pub fn create(&self, action: &str, user: &str) -> String {
        self.create_at(action, user, now_secs())
    }

    pub fn create_at(&self, action: &str, user: &str, now: u64) -> String {
        self.digest(action, user, self.tick(now))
    }

    pub fn verify(&self, action: &str, user: &str, token: &str) -> bool {
        self.verify_at(action, user, token, now_secs())
    }

    pub fn verify_at(&self, action: &str, user: &str, token: &str, now: u64) -> bool {
        if token.len() != TOKEN_LEN {
            return false;
        }
        let tick = self.tick(now);
        [tick, tick.saturating_sub(1)]
            .iter()
            .any(|t| constant_time_eq(self.digest(action, user, *t).as_bytes(), token.as_bytes()))
    }
}

pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: u64 = 86_400;

    fn issuer() -> NonceIssuer {
        NonceIssuer::new(b"test-secret".to_vec(), DAY)
    }

    #[test]
    fn token_verifies_for_same_action_and_user() {
        let nonces = issuer();
        let now = 1_700_000_000;
        let token = nonces.create_at(ACTION_TABLE_DATA, "", now);
        assert_eq!(token.len(), TOKEN_LEN);
        assert!(nonces.verify_at(ACTION_TABLE_DATA, "", &token, now));
        assert!(!nonces.verify_at(ACTION_ADMIN, "", &token, now));
        assert!(!nonces.verify_at(ACTION_TABLE_DATA, "admin", &token, now));
    }

    #[test]
    fn token_survives_one_tick() {
        let nonces = issuer();
        let now = 1_700_000_000;
        let token = nonces.create_at(ACTION_ADMIN, "admin", now);
        assert!(nonces.verify_at(ACTION_ADMIN, "admin", &token, now + DAY / 2));
        assert!(!nonces.verify_at(ACTION_ADMIN, "admin", &token, now + DAY + DAY / 2));
    }

    #[test]
    fn different_secrets_disagree() {
        let a = issuer();
        let b = NonceIssuer::new(b"other".to_vec(), DAY);
        let token = a.create_at(ACTION_ADMIN, "", 10);
        assert!(!b.verify_at(ACTION_ADMIN, "", &token, 10));
    }

    #[test]
    fn garbage_is_rejected() {
        let nonces = issuer();
        assert!(!nonces.verify_at(ACTION_ADMIN, "", "", 10));
        assert!(!nonces.verify_at(ACTION_ADMIN, "", "not-a-token-at-all!!", 10));
    }
}
