//! Submission lifecycle.
//!
//! ```text
//! Idle -> Validating -> Rejected -> Idle
//!                    -> Submitting -> Succeeded -> Idle (after the reset delay)
//!                                  -> Failed -> Idle
//! ```

use thiserror::Error;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitPhase {
    #[default]
    Idle,
    Validating,
    Rejected,
    Submitting,
    /// The success indicator is showing until `until`.
    Succeeded { until: Instant },
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitEvent {
    Submit,
    Invalid,
    Valid,
    Saved { until: Instant },
    SaveFailed,
    /// The agent has seen the rejection or failure message.
    Acknowledge,
    /// The success delay has elapsed.
    Expired,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("illegal submit transition: {event:?} while {from:?}")]
pub struct TransitionError {
    pub from: SubmitPhase,
    pub event: SubmitEvent,
}

impl SubmitPhase {
    /// The phase reached by applying `event`.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] when `event` is not legal in this phase.
    pub fn next(self, event: SubmitEvent) -> Result<SubmitPhase, TransitionError> {
        use SubmitEvent as E;
        use SubmitPhase as P;

        match (self, event) {
            (P::Idle, E::Submit) => Ok(P::Validating),
            (P::Validating, E::Invalid) => Ok(P::Rejected),
            (P::Validating, E::Valid) => Ok(P::Submitting),
            (P::Submitting, E::Saved { until }) => Ok(P::Succeeded { until }),
            (P::Submitting, E::SaveFailed) => Ok(P::Failed),
            (P::Rejected | P::Failed, E::Acknowledge) | (P::Succeeded { .. }, E::Expired) => {
                Ok(P::Idle)
            }
            (from, event) => Err(TransitionError { from, event }),
        }
    }

    /// Resolves an elapsed success indicator back to `Idle`.
    #[must_use]
    pub fn settled(self, now: Instant) -> SubmitPhase {
        match self {
            SubmitPhase::Succeeded { until } if now >= until => SubmitPhase::Idle,
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn happy_path_reaches_succeeded_then_idle() {
        let until = Instant::now() + Duration::from_secs(3);
        let phase = SubmitPhase::Idle
            .next(SubmitEvent::Submit)
            .and_then(|p| p.next(SubmitEvent::Valid))
            .and_then(|p| p.next(SubmitEvent::Saved { until }))
            .unwrap();
        assert_eq!(phase, SubmitPhase::Succeeded { until });
        assert_eq!(phase.next(SubmitEvent::Expired).unwrap(), SubmitPhase::Idle);
    }

    #[test]
    fn rejection_returns_to_idle() {
        let phase = SubmitPhase::Idle
            .next(SubmitEvent::Submit)
            .and_then(|p| p.next(SubmitEvent::Invalid))
            .unwrap();
        assert_eq!(phase, SubmitPhase::Rejected);
        assert_eq!(
            phase.next(SubmitEvent::Acknowledge).unwrap(),
            SubmitPhase::Idle
        );
    }

    #[test]
    fn failure_returns_to_idle() {
        let phase = SubmitPhase::Submitting.next(SubmitEvent::SaveFailed).unwrap();
        assert_eq!(phase, SubmitPhase::Failed);
        assert_eq!(
            phase.next(SubmitEvent::Acknowledge).unwrap(),
            SubmitPhase::Idle
        );
    }

    #[test]
    fn cannot_submit_while_submitting_or_showing_success() {
        let err = SubmitPhase::Submitting
            .next(SubmitEvent::Submit)
            .unwrap_err();
        assert_eq!(err.from, SubmitPhase::Submitting);

        let until = Instant::now() + Duration::from_secs(3);
        assert!(SubmitPhase::Succeeded { until }
            .next(SubmitEvent::Submit)
            .is_err());
    }

    #[test]
    fn cannot_skip_validation() {
        assert!(SubmitPhase::Idle.next(SubmitEvent::Valid).is_err());
        assert!(SubmitPhase::Idle.next(SubmitEvent::SaveFailed).is_err());
    }

    #[test]
    fn settled_only_clears_elapsed_success() {
        let now = Instant::now();
        let pending = SubmitPhase::Succeeded {
            until: now + Duration::from_secs(1),
        };
        assert_eq!(pending.settled(now), pending);
        assert_eq!(
            pending.settled(now + Duration::from_secs(1)),
            SubmitPhase::Idle
        );
        assert_eq!(SubmitPhase::Failed.settled(now), SubmitPhase::Failed);
    }
}
