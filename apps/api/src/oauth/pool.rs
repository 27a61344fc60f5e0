//! Token Pool: a small, ordered set of bearer tokens shared by concurrent
//! classification calls and handed out round-robin.
//!
//! The pool is filled once at startup. Slots whose token has expired are
//! refreshed on demand before each dispatch; slots that fail to mint are
//! dropped, so the pool can shrink (even to empty). Callers fall back to a
//! single fresh token when it is empty.

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use super::{AccessToken, AuthError, OAuthClient};

/// Returns `items[index mod len]`, or `None` for an empty slice.
pub fn round_robin<T>(items: &[T], index: usize) -> Option<&T> {
    if items.is_empty() {
        None
    } else {
        items.get(index % items.len())
    }
}

#[derive(Default)]
pub struct TokenPool {
    slots: RwLock<Vec<AccessToken>>,
}

impl TokenPool {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn from_tokens(tokens: Vec<AccessToken>) -> Self {
        Self {
            slots: RwLock::new(tokens),
        }
    }

    /// Performs `size` independent token requests and replaces the pool with
    /// the ones that succeeded, in request order. Returns the new pool size.
    pub async fn populate(&self, auth: &OAuthClient, size: usize) -> usize {
        let mut tokens = Vec::with_capacity(size);
        for slot in 0..size {
            match auth.fetch_token().await {
                Ok(token) => tokens.push(token),
                Err(e) => error!("Failed to generate token for pool slot {slot}: {e}"),
            }
        }

        let populated = tokens.len();
        if populated < size {
            warn!("Token pool populated with {populated} of {size} requested tokens");
        } else {
            info!("Token pool populated with {populated} tokens");
        }

        *self.slots.write().await = tokens;
        populated
    }

    pub async fn len(&self) -> usize {
        self.slots.read().await.len()
    }

    /// The token for the `index`-th caller, rotating through the pool.
    pub async fn next(&self, index: usize) -> Option<String> {
        let slots = self.slots.read().await;
        round_robin(&slots, index).map(|t| t.value.clone())
    }

    /// Replaces every expired slot with a freshly minted token.
    /// A slot whose refresh fails is dropped. Returns the number refreshed.
    ///
    /// Minting happens under the write lock, so concurrent callers wait and
    /// then find the pool already refreshed.
    pub async fn refresh_expired(&self, auth: &OAuthClient) -> usize {
        let any_expired = {
            let now = Utc::now();
            self.slots.read().await.iter().any(|t| t.is_expired(now))
        };
        if !any_expired {
            return 0;
        }

        let mut slots = self.slots.write().await;
        let now = Utc::now();
        if !slots.iter().any(|t| t.is_expired(now)) {
            return 0;
        }

        let mut refreshed = 0;
        let current = std::mem::take(&mut *slots);
        let mut next_slots = Vec::with_capacity(current.len());
        for token in current {
            if !token.is_expired(now) {
                next_slots.push(token);
                continue;
            }
            match auth.fetch_token().await {
                Ok(fresh) => {
                    refreshed += 1;
                    next_slots.push(fresh);
                }
                Err(e) => error!("Failed to refresh expired token, dropping slot: {e}"),
            }
        }

        info!(
            "Refreshed {refreshed} expired tokens; pool size is now {}",
            next_slots.len()
        );
        *slots = next_slots;
        refreshed
    }

    /// The first pooled token, or a single fresh one when the pool is empty.
    /// The fresh token is not added to the pool.
    pub async fn first_or_fresh(&self, auth: &OAuthClient) -> Result<String, AuthError> {
        self.refresh_expired(auth).await;
        if let Some(token) = self.next(0).await {
            return Ok(token);
        }
        warn!("Token pool is empty, requesting a fresh token");
        auth.fetch_token().await.map(|t| t.value)
    }

    /// Bearer tokens for a concurrent dispatch, in pool order. Never empty on
    /// success: an empty pool falls back to one freshly minted token.
    pub async fn dispatch_tokens(&self, auth: &OAuthClient) -> Result<Vec<String>, AuthError> {
        self.refresh_expired(auth).await;
        let tokens: Vec<String> = self
            .slots
            .read()
            .await
            .iter()
            .map(|t| t.value.clone())
            .collect();
        if !tokens.is_empty() {
            return Ok(tokens);
        }
        warn!("Token pool is empty, dispatching with a single fresh token");
        let fresh = auth.fetch_token().await?;
        Ok(vec![fresh.value])
    }
}
