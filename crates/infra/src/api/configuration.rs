//! Scoped configuration header

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::client::ClientCore;

/// Clears the configuration header when dropped.
///
/// Returned by [`NexusClient::attach_configuration`](super::NexusClient::attach_configuration).
/// Dropping an older guard after attaching newer configuration clears the
/// newer value as well; the header is per client, not per guard.
#[must_use = "dropping the guard immediately clears the configuration"]
pub struct ConfigurationGuard {
    core: Arc<ClientCore>,
}

impl ConfigurationGuard {
    pub(crate) fn new(core: Arc<ClientCore>) -> Self {
        Self { core }
    }
}

impl Drop for ConfigurationGuard {
    fn drop(&mut self) {
        self.core.set_configuration(None);
        debug!("Configuration cleared");
    }
}

impl fmt::Debug for ConfigurationGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigurationGuard").finish_non_exhaustive()
    }
}
