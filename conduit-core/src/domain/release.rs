//! Release domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tagged release of a service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub version: String,
    pub service: String,
    pub timestamp: DateTime<Utc>,
    pub status: ReleaseStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseStatus {
    Draft,
    Released,
}
