//! Input validation shared by all write paths.

use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Validation failure for caller-provided input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required name is blank after trim.
    BlankName,
    /// A domain value is blank after trim.
    BlankDomain,
    /// God type is not one of `god|goddess`.
    UnknownGodKind(String),
    /// Relationship is not one of `parent|child|sibling`.
    UnknownRelationship(String),
    /// A god cannot be related to itself.
    SelfRelation(Uuid),
    /// Identifier text is not a valid uuid.
    MalformedId(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "name must not be blank"),
            Self::BlankDomain => write!(f, "domain must not be blank"),
            Self::UnknownGodKind(value) => {
                write!(f, "unknown god type `{value}`; expected god|goddess")
            }
            Self::UnknownRelationship(value) => write!(
                f,
                "unknown relationship `{value}`; expected parent|child|sibling"
            ),
            Self::SelfRelation(id) => write!(f, "god cannot be its own relative: {id}"),
            Self::MalformedId(value) => write!(f, "malformed id `{value}`"),
        }
    }
}

impl Error for ValidationError {}

/// Trims a record name and rejects blank values.
pub fn normalize_name(value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::BlankName);
    }
    Ok(trimmed.to_string())
}

/// Trims a domain value and rejects blank values.
///
/// Case is preserved: `Sun` and `sun` are distinct domains.
pub fn normalize_domain(value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::BlankDomain);
    }
    Ok(trimmed.to_string())
}

/// Parses a uuid from caller text.
pub fn parse_id(value: &str) -> Result<Uuid, ValidationError> {
    Uuid::parse_str(value.trim()).map_err(|_| ValidationError::MalformedId(value.to_string()))
}
