//! Abode domain model.

use crate::model::validation::{normalize_name, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for an abode record.
pub type AbodeId = Uuid;

/// Dwelling place a god can be assigned to (many gods to one abode).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Abode {
    pub id: AbodeId,
    pub name: String,
    /// Free-form coordinate text, may be empty.
    pub coordinates: String,
}

impl Abode {
    /// Builds an abode with a generated id and a validated name.
    pub fn create(
        name: &str,
        coordinates: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            id: Uuid::new_v4(),
            name: normalize_name(name)?,
            coordinates: coordinates.into(),
        })
    }
}

/// Sparse field update for an abode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AbodePatch {
    pub name: Option<String>,
    pub coordinates: Option<String>,
}

impl AbodePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.coordinates.is_none()
    }

    pub fn normalized(&self) -> Result<Self, ValidationError> {
        let name = match self.name.as_deref() {
            Some(value) => Some(normalize_name(value)?),
            None => None,
        };
        Ok(Self {
            name,
            coordinates: self.coordinates.clone(),
        })
    }
}
