//! Delete policies.
//!
//! Each entity declares how a delete request is handled when other rows
//! still reference it. The storage layer runs a single generic delete
//! routine driven by this value.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a delete request is resolved for an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeletePolicy {
    /// Remove the row; dependents follow the schema's cascade rules.
    HardDelete,
    /// Mark the row inactive when dependents exist, remove it otherwise.
    SoftDeleteIfReferenced,
    /// Keep the row untouched when dependents exist, remove it otherwise.
    RefuseIfReferenced,
}

impl DeletePolicy {
    /// Resolve the outcome for a row that exists and has `referenced`
    /// dependents.
    #[must_use]
    pub fn resolve(self, referenced: bool) -> DeleteOutcome {
        match (self, referenced) {
            (DeletePolicy::HardDelete, _) => DeleteOutcome::Deleted,
            (DeletePolicy::SoftDeleteIfReferenced, true) => DeleteOutcome::Deactivated,
            (DeletePolicy::RefuseIfReferenced, true) => DeleteOutcome::Refused,
            (_, false) => DeleteOutcome::Deleted,
        }
    }

    /// Whether the policy needs a dependent-row lookup before acting.
    #[must_use]
    pub fn checks_references(self) -> bool {
        !matches!(self, DeletePolicy::HardDelete)
    }
}

/// Result of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeleteOutcome {
    /// Row removed.
    Deleted,
    /// Row kept but flagged inactive.
    Deactivated,
    /// Row kept because dependents exist.
    Refused,
    /// No row with the given id.
    NotFound,
}

impl DeleteOutcome {
    /// `true` when the row is gone or no longer active.
    ///
    /// This is the boolean the repositories' `delete` methods return.
    #[inline]
    #[must_use]
    pub fn removed(self) -> bool {
        matches!(self, DeleteOutcome::Deleted | DeleteOutcome::Deactivated)
    }
}

impl fmt::Display for DeleteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DeleteOutcome::Deleted => write!(f, "deleted"),
            DeleteOutcome::Deactivated => write!(f, "deactivated"),
            DeleteOutcome::Refused => write!(f, "refused"),
            DeleteOutcome::NotFound => write!(f, "not found"),
        }
    }
}
