//! One-shot device position acquisition.

use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use pdvisit_core::Fix;
use thiserror::Error;

/// Parameters for a single position request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest cached fix the provider may hand back. Zero forces a fresh one.
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::ZERO,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("device has no location support")]
    Unsupported,

    #[error("location permission denied")]
    PermissionDenied,

    #[error("position unavailable: {0}")]
    Unavailable(String),

    #[error("no position within {0:?}")]
    Timeout(Duration),
}

impl LocationError {
    /// Message shown to the agent.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            LocationError::Unsupported => "This device does not support GPS. Use a modern phone.",
            LocationError::PermissionDenied
            | LocationError::Unavailable(_)
            | LocationError::Timeout(_) => {
                "We could not get your location. Enable GPS and location permissions."
            }
        }
    }
}

/// Source of device position fixes.
pub trait LocationProvider {
    fn current_position(
        &self,
        options: &PositionOptions,
    ) -> impl Future<Output = Result<Fix, LocationError>> + Send;
}

/// Requests one fix from `provider`, bounded by `options.timeout`.
///
/// # Errors
///
/// Returns the provider's error, or [`LocationError::Timeout`] if no answer
/// arrives in time.
pub async fn request_fix<P>(provider: &P, options: &PositionOptions) -> Result<Fix, LocationError>
where
    P: LocationProvider + Sync,
{
    match tokio::time::timeout(options.timeout, provider.current_position(options)).await {
        Ok(result) => result,
        Err(_) => Err(LocationError::Timeout(options.timeout)),
    }
}

/// Coordinates supplied by the caller, e.g. from command-line flags.
/// Each request is stamped with the current time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: f64,
}

impl LocationProvider for FixedLocation {
    async fn current_position(&self, _options: &PositionOptions) -> Result<Fix, LocationError> {
        if !(-90.0..=90.0).contains(&self.latitude) || !(-180.0..=180.0).contains(&self.longitude)
        {
            return Err(LocationError::Unavailable(format!(
                "coordinates out of range: ({}, {})",
                self.latitude, self.longitude
            )));
        }
        Ok(Fix {
            latitude: self.latitude,
            longitude: self.longitude,
            accuracy: self.accuracy.max(0.0),
            captured_at: Utc::now(),
        })
    }
}

/// A device without positioning hardware.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocation;

impl LocationProvider for NoLocation {
    async fn current_position(&self, _options: &PositionOptions) -> Result<Fix, LocationError> {
        Err(LocationError::Unsupported)
    }
}
