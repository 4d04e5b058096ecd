use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::engine::{PolicyOverrides, PolicyParameters};

/// Audit entry for one applied policy update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyChange {
    pub sequence: u64,
    pub changed_at: DateTime<Utc>,
    pub actor: String,
    pub overrides: PolicyOverrides,
    pub previous: PolicyParameters,
    pub resulting: PolicyParameters,
}

/// Number of policy changes retained by [`PolicyHistory::default`].
pub const DEFAULT_HISTORY_LIMIT: usize = 1_000;

/// Log of policy updates, oldest first. Once `limit` entries are held the oldest is dropped;
/// sequence numbers keep counting across dropped entries.
#[derive(Debug, Clone)]
pub struct PolicyHistory {
    entries: Vec<PolicyChange>,
    limit: usize,
    recorded: u64,
}

impl Default for PolicyHistory {
    fn default() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }
}

impl PolicyHistory {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            limit: limit.max(1),
            recorded: 0,
        }
    }

    pub(crate) fn record(
        &mut self,
        actor: String,
        overrides: PolicyOverrides,
        previous: PolicyParameters,
        resulting: PolicyParameters,
    ) -> &PolicyChange {
        self.recorded += 1;
        if self.entries.len() >= self.limit {
            let excess = self.entries.len() + 1 - self.limit;
            self.entries.drain(..excess);
        }
        self.entries.push(PolicyChange {
            sequence: self.recorded,
            changed_at: Utc::now(),
            actor,
            overrides,
            previous,
            resulting,
        });
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[PolicyChange] {
        &self.entries
    }
}
