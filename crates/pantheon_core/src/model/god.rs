//! God domain model.
//!
//! # Responsibility
//! - Define the canonical god record and its enumerated fields.
//! - Define the relationship kinds and their inverse pairing.
//!
//! # Invariants
//! - `id` is stable and never reused for another god.
//! - `domains` and `emblem_ids` contain no duplicate entries.
//! - `version` increases by one on every write touching this god.

use crate::model::abode::AbodeId;
use crate::model::emblem::EmblemId;
use crate::model::validation::{normalize_name, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier for a god record.
pub type GodId = Uuid;

/// Enumerated god type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GodKind {
    God,
    Goddess,
}

impl GodKind {
    /// Stable storage/wire value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::God => "god",
            Self::Goddess => "goddess",
        }
    }
}

impl Display for GodKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GodKind {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "god" => Ok(Self::God),
            "goddess" => Ok(Self::Goddess),
            _ => Err(ValidationError::UnknownGodKind(value.to_string())),
        }
    }
}

/// Relation kind between two gods, seen from the first god.
///
/// `Parent` means "the relative is my parent".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    Parent,
    Child,
    Sibling,
}

impl Relationship {
    pub const ALL: [Relationship; 3] = [Self::Parent, Self::Child, Self::Sibling];

    /// Relationship as seen from the relative's side.
    pub fn inverse(self) -> Self {
        match self {
            Self::Parent => Self::Child,
            Self::Child => Self::Parent,
            Self::Sibling => Self::Sibling,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Parent => "parent",
            Self::Child => "child",
            Self::Sibling => "sibling",
        }
    }
}

impl Display for Relationship {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Relationship {
    type Err = ValidationError;

    /// Accepts singular kinds and the plural list names.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "parent" | "parents" => Ok(Self::Parent),
            "child" | "children" => Ok(Self::Child),
            "sibling" | "siblings" => Ok(Self::Sibling),
            _ => Err(ValidationError::UnknownRelationship(value.to_string())),
        }
    }
}

/// Canonical persisted god record.
///
/// Relations are resolved through the relation repository, not stored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct God {
    pub id: GodId,
    pub name: String,
    /// Serialized as `type` to match external schema naming.
    #[serde(rename = "type")]
    pub kind: GodKind,
    pub description: String,
    /// Insertion-ordered, duplicate-free.
    pub domains: Vec<String>,
    pub abode_id: Option<AbodeId>,
    /// Insertion-ordered, duplicate-free.
    pub emblem_ids: Vec<EmblemId>,
    /// Optimistic concurrency counter, starts at 1.
    pub version: i64,
}

impl God {
    /// Builds a fresh god with a generated id and empty associations.
    pub fn new(kind: GodKind, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            description: description.into(),
            domains: Vec::new(),
            abode_id: None,
            emblem_ids: Vec::new(),
            version: 1,
        }
    }

    /// Checks record-level invariants before persistence.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::BlankName);
        }
        Ok(())
    }
}

/// Create request for a god.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGod {
    pub name: String,
    pub kind: GodKind,
    pub description: String,
}

impl NewGod {
    pub fn new(name: impl Into<String>, kind: GodKind, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            description: description.into(),
        }
    }

    /// Normalizes the request into a persistable record.
    pub fn into_god(self) -> Result<God, ValidationError> {
        let name = normalize_name(&self.name)?;
        Ok(God::new(self.kind, name, self.description))
    }
}

/// Sparse field update for a god.
///
/// `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GodPatch {
    pub name: Option<String>,
    pub kind: Option<GodKind>,
    pub description: Option<String>,
}

impl GodPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.kind.is_none() && self.description.is_none()
    }

    /// Returns a copy with a trimmed, non-blank name when one is supplied.
    pub fn normalized(&self) -> Result<Self, ValidationError> {
        let name = match self.name.as_deref() {
            Some(value) => Some(normalize_name(value)?),
            None => None,
        };
        Ok(Self {
            name,
            kind: self.kind,
            description: self.description.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{GodKind, GodPatch, NewGod, Relationship};
    use crate::model::validation::ValidationError;

    #[test]
    fn god_kind_parses_case_insensitively() {
        assert_eq!("God".parse::<GodKind>().unwrap(), GodKind::God);
        assert_eq!(" GODDESS ".parse::<GodKind>().unwrap(), GodKind::Goddess);
        assert!(matches!(
            "titan".parse::<GodKind>(),
            Err(ValidationError::UnknownGodKind(_))
        ));
    }

    #[test]
    fn relationship_inverse_pairs() {
        assert_eq!(Relationship::Parent.inverse(), Relationship::Child);
        assert_eq!(Relationship::Child.inverse(), Relationship::Parent);
        assert_eq!(Relationship::Sibling.inverse(), Relationship::Sibling);
    }

    #[test]
    fn relationship_accepts_list_names() {
        assert_eq!("children".parse::<Relationship>().unwrap(), Relationship::Child);
        assert_eq!("Parents".parse::<Relationship>().unwrap(), Relationship::Parent);
        assert!("cousin".parse::<Relationship>().is_err());
    }

    #[test]
    fn new_god_rejects_blank_name() {
        let err = NewGod::new("   ", GodKind::God, "").into_god().unwrap_err();
        assert_eq!(err, ValidationError::BlankName);
    }

    #[test]
    fn new_god_starts_empty() {
        let god = NewGod::new(" Zeus ", GodKind::God, "sky").into_god().unwrap();
        assert_eq!(god.name, "Zeus");
        assert!(god.domains.is_empty());
        assert!(god.emblem_ids.is_empty());
        assert_eq!(god.abode_id, None);
        assert_eq!(god.version, 1);
    }

    #[test]
    fn patch_normalizes_supplied_name_only() {
        let patch = GodPatch {
            description: Some("x".to_string()),
            ..GodPatch::default()
        };
        assert_eq!(patch.normalized().unwrap(), patch);
        assert!(!patch.is_empty());
        assert!(GodPatch::default().is_empty());
    }
}
