//! Visit form state and the validated record produced from it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identifier::{IdentifierCode, IDENTIFIER_LEN};
use crate::route::RouteCode;
use crate::ValidationError;

/// A single device position fix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    pub latitude: f64,
    pub longitude: f64,
    /// Horizontal accuracy radius in metres.
    pub accuracy: f64,
    pub captured_at: DateTime<Utc>,
}

/// Display-name resolution state for the identifier currently entered.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResolvedName {
    #[default]
    Unresolved,
    Found(String),
    NotFound,
    LookupFailed,
}

impl ResolvedName {
    /// The name to persist. Anything but a successful match persists as `None`.
    #[must_use]
    pub fn persisted(&self) -> Option<&str> {
        match self {
            ResolvedName::Found(name) => Some(name.as_str()),
            _ => None,
        }
    }

    /// Text shown under the identifier field, if any.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        match self {
            ResolvedName::Found(name) => Some(name.as_str()),
            ResolvedName::NotFound => Some("Not found"),
            ResolvedName::Unresolved | ResolvedName::LookupFailed => None,
        }
    }
}

/// Everything the agent has entered so far. Mutated field by field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisitDraft {
    pub route: Option<RouteCode>,
    pub identifier: String,
    pub resolved_name: ResolvedName,
    pub location: Option<Fix>,
    pub has_inventory: bool,
    pub inventory_count: Option<u32>,
    pub left_inventory: bool,
    pub left_inventory_count: Option<u32>,
}

/// A validated visit, ready to be persisted as one row.
#[derive(Debug, Clone, PartialEq)]
pub struct VisitRecord {
    pub route: RouteCode,
    pub identifier: IdentifierCode,
    pub resolved_name: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: f64,
    pub has_inventory: bool,
    pub inventory_count: Option<u32>,
    pub left_inventory: bool,
    pub left_inventory_count: Option<u32>,
}

impl VisitDraft {
    /// Checks the draft and builds the record to insert.
    ///
    /// Counts are only carried over when their paired flag is set.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::IdentifierLength`] if the identifier is not exactly
    ///   eight characters. Checked first.
    /// - [`ValidationError::MissingField`] for a missing route or location.
    /// - [`ValidationError::IdentifierNotNumeric`] if the identifier has the
    ///   right length but contains non-digits.
    pub fn validate(&self) -> Result<VisitRecord, ValidationError> {
        let identifier = self.identifier.trim();
        let len = identifier.chars().count();
        if len != IDENTIFIER_LEN {
            return Err(ValidationError::IdentifierLength { len });
        }

        let route = self.route.ok_or(ValidationError::MissingField("route"))?;
        let fix = self
            .location
            .ok_or(ValidationError::MissingField("location"))?;
        let identifier =
            IdentifierCode::parse(identifier).map_err(|_| ValidationError::IdentifierNotNumeric)?;

        Ok(VisitRecord {
            route,
            identifier,
            resolved_name: self.resolved_name.persisted().map(str::to_owned),
            latitude: fix.latitude,
            longitude: fix.longitude,
            accuracy: fix.accuracy,
            has_inventory: self.has_inventory,
            inventory_count: self.inventory_count.filter(|_| self.has_inventory),
            left_inventory: self.left_inventory,
            left_inventory_count: self.left_inventory_count.filter(|_| self.left_inventory),
        })
    }

    /// Clears every user-entered field. The location fix is device state and
    /// survives.
    pub fn reset_entries(&mut self) {
        *self = VisitDraft {
            location: self.location,
            ..VisitDraft::default()
        };
    }
}
