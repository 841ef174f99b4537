//! Identifier lookups, ordered by request rather than by arrival.
//!
//! Each accepted edit of the identifier field bumps a shared generation
//! counter. A lookup carries the generation it was issued under; its result is
//! only applied while that generation is still the latest, so a slow answer
//! for an old identifier can never overwrite a newer one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pdvisit_core::{IdentifierCode, LookupMatch};
use pdvisit_remote::RemoteClient;

#[derive(Debug, Clone, Default)]
pub struct LookupGate {
    current: Arc<AtomicU64>,
}

impl LookupGate {
    /// Invalidates every outstanding lookup and returns the new generation.
    pub fn supersede(&self) -> u64 {
        self.current.fetch_add(1, Ordering::AcqRel) + 1
    }

    #[must_use]
    pub fn is_current(&self, generation: u64) -> bool {
        self.current.load(Ordering::Acquire) == generation
    }

    /// Starts a new generation for `code`.
    #[must_use]
    pub fn issue(&self, code: IdentifierCode) -> PendingLookup {
        PendingLookup {
            generation: self.supersede(),
            code,
            gate: self.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Found(String),
    NotFound,
    Failed,
    /// A newer edit arrived before the request went out; nothing was sent.
    Superseded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupResponse {
    pub generation: u64,
    pub code: IdentifierCode,
    pub outcome: LookupOutcome,
}

/// A lookup that has been issued but not yet sent.
#[derive(Debug)]
pub struct PendingLookup {
    generation: u64,
    code: IdentifierCode,
    gate: LookupGate,
}

impl PendingLookup {
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn code(&self) -> &IdentifierCode {
        &self.code
    }

    /// Waits out `debounce`, then queries the lookup table unless a newer
    /// edit has superseded this one in the meantime.
    ///
    /// Remote errors are logged and reported as [`LookupOutcome::Failed`].
    pub async fn run(
        self,
        client: &RemoteClient,
        mode: LookupMatch,
        debounce: Duration,
    ) -> LookupResponse {
        if !debounce.is_zero() {
            tokio::time::sleep(debounce).await;
        }

        let outcome = if self.gate.is_current(self.generation) {
            match client.lookup_name(&self.code, mode).await {
                Ok(Some(name)) => LookupOutcome::Found(name),
                Ok(None) => LookupOutcome::NotFound,
                Err(e) => {
                    tracing::warn!(code = %self.code, error = %e, "identifier lookup failed");
                    LookupOutcome::Failed
                }
            }
        } else {
            tracing::debug!(
                code = %self.code,
                generation = self.generation,
                "lookup superseded before sending"
            );
            LookupOutcome::Superseded
        };

        LookupResponse {
            generation: self.generation,
            code: self.code,
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(raw: &str) -> IdentifierCode {
        IdentifierCode::parse(raw).unwrap()
    }

    #[test]
    fn newest_issue_is_the_only_current_one() {
        let gate = LookupGate::default();
        let first = gate.issue(code("11111111"));
        let second = gate.issue(code("22222222"));

        assert!(!gate.is_current(first.generation()));
        assert!(gate.is_current(second.generation()));
    }

    #[test]
    fn supersede_invalidates_outstanding_lookups() {
        let gate = LookupGate::default();
        let pending = gate.issue(code("11111111"));
        gate.supersede();
        assert!(!gate.is_current(pending.generation()));
    }

    #[test]
    fn clones_share_the_counter() {
        let gate = LookupGate::default();
        let pending = gate.issue(code("11111111"));
        let other = gate.clone();
        other.supersede();
        assert!(!gate.is_current(pending.generation()));
    }
}
