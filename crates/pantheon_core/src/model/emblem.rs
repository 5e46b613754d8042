//! Emblem domain model.

use crate::model::validation::{normalize_name, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for an emblem record.
pub type EmblemId = Uuid;

/// Symbol associated with gods (many-to-many, held on the god side only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Emblem {
    pub id: EmblemId,
    pub name: String,
}

impl Emblem {
    /// Builds an emblem with a generated id and a validated name.
    pub fn create(name: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            id: Uuid::new_v4(),
            name: normalize_name(name)?,
        })
    }
}
