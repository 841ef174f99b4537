//! The visit form session.
//!
//! [`VisitCapture`] owns the draft, the submit phase, connectivity status and
//! the feedback messages. Long-running steps come in two halves so a UI loop
//! can keep handling input while they are in flight: a `&mut self` method
//! that starts the step and returns a detached future, and an `apply_*` /
//! `complete_*` method that folds the result back in. The `async` methods
//! (`enter_identifier`, `submit`) chain both halves for sequential callers.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use pdvisit_core::{
    accepts_identifier_input, AppConfig, Fix, IdentifierCode, LookupMatch, ResolvedName,
    RouteCode, ValidationError, VisitDraft, IDENTIFIER_LEN,
};
use pdvisit_remote::{RemoteClient, RemoteError, VisitRow};
use tokio::time::Instant;
use uuid::Uuid;

use crate::location::{request_fix, LocationError, LocationProvider, PositionOptions};
use crate::lookup::{LookupGate, LookupOutcome, LookupResponse, PendingLookup};
use crate::phase::{SubmitEvent, SubmitPhase};

const MSG_IDENTIFIER_LENGTH: &str = "The MDN must contain exactly 8 digits.";
const MSG_IDENTIFIER_HINT: &str = "The MDN has 8 digits.";
const MSG_MISSING_FIELDS: &str = "You need the PDV code, route and location.";
const MSG_SAVE_FAILED: &str = "Oops, something went wrong while saving.";
const MSG_DATABASE_PROBLEM: &str = "Problem with the database.";
const MSG_CANNOT_CONNECT: &str = "Cannot connect.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureSettings {
    pub position: PositionOptions,
    pub lookup_match: LookupMatch,
    pub lookup_debounce: Duration,
    pub success_reset: Duration,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            position: PositionOptions::default(),
            lookup_match: LookupMatch::Exact,
            lookup_debounce: Duration::from_millis(250),
            success_reset: Duration::from_secs(3),
        }
    }
}

impl CaptureSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            position: PositionOptions {
                timeout: Duration::from_millis(config.location_timeout_ms),
                ..PositionOptions::default()
            },
            lookup_match: config.lookup_match,
            lookup_debounce: Duration::from_millis(config.lookup_debounce_ms),
            success_reset: Duration::from_millis(config.success_reset_ms),
        }
    }
}

/// Result of the last connectivity probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connectivity {
    #[default]
    Untested,
    Reachable,
    Unreachable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Saved,
    Rejected(ValidationError),
    Failed,
    /// The submit control is disabled: a submit is in flight, the success
    /// indicator is still showing, or the remote is known unreachable.
    Blocked,
}

/// An insert that has passed validation and is ready to send.
#[derive(Debug)]
pub struct PendingSubmit {
    row: VisitRow,
}

impl PendingSubmit {
    #[must_use]
    pub fn row(&self) -> &VisitRow {
        &self.row
    }
}

#[derive(Debug)]
pub struct SubmitResponse {
    result: Result<(), RemoteError>,
}

pub struct VisitCapture {
    session_id: Uuid,
    client: Arc<RemoteClient>,
    settings: CaptureSettings,
    draft: VisitDraft,
    phase: SubmitPhase,
    connectivity: Connectivity,
    locating: bool,
    error: Option<String>,
    location_error: Option<String>,
    lookups: LookupGate,
}

impl VisitCapture {
    #[must_use]
    pub fn new(client: Arc<RemoteClient>, settings: CaptureSettings) -> Self {
        let session_id = Uuid::new_v4();
        tracing::debug!(session = %session_id, "visit capture session started");
        Self {
            session_id,
            client,
            settings,
            draft: VisitDraft::default(),
            phase: SubmitPhase::Idle,
            connectivity: Connectivity::Untested,
            // A session starts out waiting for its first fix.
            locating: true,
            error: None,
            location_error: None,
            lookups: LookupGate::default(),
        }
    }

    #[must_use]
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    #[must_use]
    pub fn draft(&self) -> &VisitDraft {
        &self.draft
    }

    #[must_use]
    pub fn settings(&self) -> &CaptureSettings {
        &self.settings
    }

    /// Current submit phase, with an elapsed success indicator reported as
    /// `Idle`.
    #[must_use]
    pub fn phase(&self) -> SubmitPhase {
        self.phase.settled(Instant::now())
    }

    #[must_use]
    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    /// The single user-facing error message, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Inline hint for a partially typed identifier.
    #[must_use]
    pub fn identifier_hint(&self) -> Option<&'static str> {
        let len = self.draft.identifier.len();
        (len != 0 && len != IDENTIFIER_LEN).then_some(MSG_IDENTIFIER_HINT)
    }

    #[must_use]
    pub fn location_error(&self) -> Option<&str> {
        self.location_error.as_deref()
    }

    #[must_use]
    pub fn is_locating(&self) -> bool {
        self.locating
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.phase == SubmitPhase::Submitting
    }

    #[must_use]
    pub fn is_showing_success(&self) -> bool {
        matches!(self.phase(), SubmitPhase::Succeeded { .. })
    }

    /// Whether the submit control is enabled.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        !self.locating
            && self.draft.location.is_some()
            && self.phase() == SubmitPhase::Idle
            && self.connectivity != Connectivity::Unreachable
    }

    // ---------------------------------------------------------------------
    // Location
    // ---------------------------------------------------------------------

    /// Requests the session's one position fix and records the result.
    pub async fn acquire_location<P>(&mut self, provider: &P)
    where
        P: LocationProvider + Sync,
    {
        self.locating = true;
        let result = request_fix(provider, &self.settings.position).await;
        self.apply_location(result);
    }

    /// Records the outcome of a position request made elsewhere.
    pub fn apply_location(&mut self, result: Result<Fix, LocationError>) {
        self.locating = false;
        match result {
            Ok(fix) => {
                tracing::info!(
                    session = %self.session_id,
                    latitude = fix.latitude,
                    longitude = fix.longitude,
                    accuracy = fix.accuracy,
                    "position acquired"
                );
                self.draft.location = Some(fix);
                self.location_error = None;
            }
            Err(e) => {
                tracing::warn!(session = %self.session_id, error = %e, "position unavailable");
                self.location_error = Some(e.user_message().to_string());
            }
        }
    }

    // ---------------------------------------------------------------------
    // Identifier lookup
    // ---------------------------------------------------------------------

    /// Applies an edit of the identifier field.
    ///
    /// Edits that are not up to eight digits are ignored. A complete
    /// identifier returns the lookup to run; anything shorter clears the
    /// resolved name and cancels outstanding lookups.
    pub fn edit_identifier(&mut self, text: &str) -> Option<PendingLookup> {
        if !accepts_identifier_input(text) {
            tracing::debug!(session = %self.session_id, "ignoring non-numeric identifier edit");
            return None;
        }
        if text == self.draft.identifier {
            return None;
        }

        self.draft.identifier = text.to_string();
        self.draft.resolved_name = ResolvedName::Unresolved;

        if let Ok(code) = IdentifierCode::parse(text) {
            Some(self.lookups.issue(code))
        } else {
            self.lookups.supersede();
            None
        }
    }

    /// Detached future running `pending` against the remote. Safe to spawn.
    pub fn lookup_task(
        &self,
        pending: PendingLookup,
    ) -> impl Future<Output = LookupResponse> + Send + 'static {
        let client = Arc::clone(&self.client);
        let mode = self.settings.lookup_match;
        let debounce = self.settings.lookup_debounce;
        async move { pending.run(&client, mode, debounce).await }
    }

    /// Folds a lookup result into the draft. Returns `false` if the response
    /// was stale and discarded.
    pub fn apply_lookup(&mut self, response: LookupResponse) -> bool {
        if response.outcome == LookupOutcome::Superseded
            || !self.lookups.is_current(response.generation)
        {
            tracing::debug!(
                session = %self.session_id,
                code = %response.code,
                generation = response.generation,
                "discarding stale lookup response"
            );
            return false;
        }

        self.draft.resolved_name = match response.outcome {
            LookupOutcome::Found(name) => ResolvedName::Found(name),
            LookupOutcome::NotFound => ResolvedName::NotFound,
            LookupOutcome::Failed | LookupOutcome::Superseded => ResolvedName::LookupFailed,
        };
        true
    }

    /// Edits the identifier and, when complete, resolves its name in place.
    pub async fn enter_identifier(&mut self, text: &str) {
        if let Some(pending) = self.edit_identifier(text) {
            let response = self.lookup_task(pending).await;
            self.apply_lookup(response);
        }
    }

    // ---------------------------------------------------------------------
    // Other fields
    // ---------------------------------------------------------------------

    pub fn set_route(&mut self, route: Option<RouteCode>) {
        self.draft.route = route;
    }

    pub fn set_has_inventory(&mut self, value: bool) {
        self.draft.has_inventory = value;
    }

    pub fn set_inventory_count(&mut self, count: Option<u32>) {
        self.draft.inventory_count = count;
    }

    pub fn set_left_inventory(&mut self, value: bool) {
        self.draft.left_inventory = value;
    }

    pub fn set_left_inventory_count(&mut self, count: Option<u32>) {
        self.draft.left_inventory_count = count;
    }

    // ---------------------------------------------------------------------
    // Submission
    // ---------------------------------------------------------------------

    /// Validates the draft and moves to `Submitting`.
    ///
    /// # Errors
    ///
    /// Returns the final outcome instead of a pending insert when the submit
    /// is blocked or the draft is rejected. Neither touches the network.
    pub fn begin_submit(&mut self) -> Result<PendingSubmit, SubmitOutcome> {
        self.phase = self.phase();
        if self.phase != SubmitPhase::Idle || self.connectivity == Connectivity::Unreachable {
            tracing::debug!(
                session = %self.session_id,
                phase = ?self.phase,
                connectivity = ?self.connectivity,
                "submit blocked"
            );
            return Err(SubmitOutcome::Blocked);
        }

        self.transition(SubmitEvent::Submit);
        match self.draft.validate() {
            Err(e) => {
                tracing::info!(session = %self.session_id, reason = %e, "submit rejected");
                self.error = Some(validation_message(&e).to_string());
                self.transition(SubmitEvent::Invalid);
                self.transition(SubmitEvent::Acknowledge);
                Err(SubmitOutcome::Rejected(e))
            }
            Ok(record) => {
                self.error = None;
                self.transition(SubmitEvent::Valid);
                Ok(PendingSubmit {
                    row: VisitRow::from(&record),
                })
            }
        }
    }

    /// Detached future sending `pending` to the remote. Safe to spawn.
    pub fn submit_task(
        &self,
        pending: PendingSubmit,
    ) -> impl Future<Output = SubmitResponse> + Send + 'static {
        let client = Arc::clone(&self.client);
        async move {
            SubmitResponse {
                result: client.insert_visit(&pending.row).await,
            }
        }
    }

    /// Folds the insert result back in: on success the entries reset and the
    /// success indicator starts; on failure the entries are kept.
    pub fn complete_submit(&mut self, response: SubmitResponse) -> SubmitOutcome {
        match response.result {
            Ok(()) => {
                let until = Instant::now() + self.settings.success_reset;
                self.transition(SubmitEvent::Saved { until });
                self.draft.reset_entries();
                // A lookup still in flight belongs to the identifier just saved.
                self.lookups.supersede();
                tracing::info!(session = %self.session_id, "visit saved");
                SubmitOutcome::Saved
            }
            Err(e) => {
                tracing::warn!(session = %self.session_id, error = %e, "visit insert failed");
                self.error = Some(MSG_SAVE_FAILED.to_string());
                self.transition(SubmitEvent::SaveFailed);
                self.transition(SubmitEvent::Acknowledge);
                SubmitOutcome::Failed
            }
        }
    }

    /// Validates and inserts the current draft.
    pub async fn submit(&mut self) -> SubmitOutcome {
        match self.begin_submit() {
            Ok(pending) => {
                let response = self.submit_task(pending).await;
                self.complete_submit(response)
            }
            Err(outcome) => outcome,
        }
    }

    /// Sleeps until the success indicator has cleared.
    pub async fn wait_for_success_reset(&mut self) {
        if let SubmitPhase::Succeeded { until } = self.phase {
            tokio::time::sleep_until(until).await;
            self.transition(SubmitEvent::Expired);
        }
    }

    // ---------------------------------------------------------------------
    // Connectivity
    // ---------------------------------------------------------------------

    /// Runs the count-only probe and records reachability.
    pub async fn probe_connectivity(&mut self) -> Connectivity {
        self.connectivity = Connectivity::Untested;
        self.error = None;

        self.connectivity = match self.client.probe().await {
            Ok(count) => {
                tracing::info!(session = %self.session_id, ?count, "remote reachable");
                Connectivity::Reachable
            }
            Err(e) => {
                tracing::warn!(session = %self.session_id, error = %e, "remote probe failed");
                let message = if e.is_transport() {
                    MSG_CANNOT_CONNECT
                } else {
                    MSG_DATABASE_PROBLEM
                };
                self.error = Some(message.to_string());
                Connectivity::Unreachable
            }
        };
        self.connectivity
    }

    fn transition(&mut self, event: SubmitEvent) {
        let next = self.phase.next(event);
        debug_assert!(next.is_ok(), "submit phase out of sync: {next:?}");
        match next {
            Ok(next) => {
                tracing::trace!(
                    session = %self.session_id,
                    from = ?self.phase,
                    to = ?next,
                    "submit phase"
                );
                self.phase = next;
            }
            Err(e) => {
                tracing::error!(session = %self.session_id, error = %e, "submit phase out of sync");
            }
        }
    }
}

fn validation_message(err: &ValidationError) -> &'static str {
    match err {
        ValidationError::IdentifierLength { .. } | ValidationError::IdentifierNotNumeric => {
            MSG_IDENTIFIER_LENGTH
        }
        ValidationError::MissingField(_) => MSG_MISSING_FIELDS,
    }
}
