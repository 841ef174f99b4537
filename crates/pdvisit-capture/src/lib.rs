//! The visit-capture workflow: one agent, one form, one record at a time.

pub mod capture;
pub mod location;
pub mod lookup;
pub mod phase;

pub use capture::{
    CaptureSettings, Connectivity, PendingSubmit, SubmitOutcome, SubmitResponse, VisitCapture,
};
pub use location::{FixedLocation, LocationError, LocationProvider, NoLocation, PositionOptions};
pub use lookup::{LookupGate, LookupOutcome, LookupResponse, PendingLookup};
pub use phase::{SubmitEvent, SubmitPhase, TransitionError};
