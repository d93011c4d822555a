//! Shared fakes for the core integration suites.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use nexus_domain::{Result, TokenPair};

/// Refresh endpoint stand-in issuing `a<n>`/`r<n>` on the n-th redeem.
#[derive(Clone, Default)]
pub struct RotatingIssuer {
    issued: Arc<AtomicUsize>,
    presented: Arc<parking_lot::Mutex<Vec<String>>>,
}

impl RotatingIssuer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Redeem `refresh_token`, yielding after a short delay so concurrent
    /// callers overlap.
    pub async fn redeem(&self, refresh_token: String) -> Result<TokenPair> {
        self.presented.lock().push(refresh_token);
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(TokenPair::new(format!("a{n}"), format!("r{n}")))
    }

    pub fn issued(&self) -> usize {
        self.issued.load(Ordering::SeqCst)
    }

    /// Refresh tokens presented so far, in order
    pub fn presented(&self) -> Vec<String> {
        self.presented.lock().clone()
    }
}
