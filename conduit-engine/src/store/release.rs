//! Release collection

use conduit_core::domain::release::Release;
use tracing::debug;

use super::{Store, lock};

impl Store {
    pub fn add_release(&self, release: Release) {
        debug!("Release added: {} {}", release.service, release.version);
        lock(&self.releases).insert(0, release);
    }

    /// Snapshot of all releases, newest first
    pub fn list_releases(&self) -> Vec<Release> {
        lock(&self.releases).clone()
    }
}
