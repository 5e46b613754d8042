//! Request decoding for the query/mutation surface.
//!
//! # Responsibility
//! - Decode `{"op": ..., "args": {...}}` envelopes into typed [`Request`]s.
//! - Reject unknown ops, unknown args and malformed values up front.
//!
//! # Invariants
//! - Decoding never touches storage.
//! - Every decode failure maps to `VALIDATION_FAILED`.

use pantheon_core::{
    parse_id, AbodeId, AbodePatch, EmblemId, GodId, GodKind, GodPatch, NewGod, Relationship,
    ValidationError,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Typed operation with decoded arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Gods {
        depth: Option<u32>,
    },
    God {
        id: GodId,
        depth: Option<u32>,
    },
    Abodes,
    Abode {
        id: AbodeId,
    },
    Emblems,
    Emblem {
        id: EmblemId,
    },
    NewGod(NewGod),
    UpdateGod {
        id: GodId,
        patch: GodPatch,
        expected_version: Option<i64>,
    },
    DeleteGod {
        id: GodId,
    },
    AddGodRelative {
        god_id: GodId,
        relative_id: GodId,
        relationship: Relationship,
    },
    RemoveGodRelative {
        god_id: GodId,
        relative_id: GodId,
        relationship: Relationship,
    },
    AddGodEmblem {
        god_id: GodId,
        emblem_id: EmblemId,
    },
    RemoveGodEmblem {
        god_id: GodId,
        emblem_id: EmblemId,
    },
    /// `abode_id: None` clears the abode.
    UpdateGodAbode {
        god_id: GodId,
        abode_id: Option<AbodeId>,
    },
    AddGodDomain {
        god_id: GodId,
        domain: String,
    },
    RemoveGodDomain {
        god_id: GodId,
        domain: String,
    },
    NewAbode {
        name: String,
        coordinates: String,
    },
    DeleteAbode {
        id: AbodeId,
    },
    UpdateAbode {
        id: AbodeId,
        patch: AbodePatch,
    },
    NewEmblem {
        name: String,
    },
    DeleteEmblem {
        id: EmblemId,
    },
    UpdateEmblem {
        id: EmblemId,
        name: String,
    },
}

/// Request decoding failure.
#[derive(Debug)]
pub enum RequestError {
    /// Body is not a JSON request envelope.
    Envelope(serde_json::Error),
    UnknownOp(String),
    /// Args do not match the op's argument shape.
    InvalidArgs {
        op: &'static str,
        source: serde_json::Error,
    },
    /// Args parsed but carry an invalid id, type or relationship.
    Validation(ValidationError),
}

impl Display for RequestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Envelope(err) => write!(f, "malformed request: {err}"),
            Self::UnknownOp(op) => write!(f, "unknown op `{op}`"),
            Self::InvalidArgs { op, source } => write!(f, "invalid args for `{op}`: {source}"),
            Self::Validation(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RequestError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Envelope(err) => Some(err),
            Self::InvalidArgs { source, .. } => Some(source),
            Self::Validation(err) => Some(err),
            Self::UnknownOp(_) => None,
        }
    }
}

impl From<ValidationError> for RequestError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl Request {
    /// Decodes one JSON request body.
    pub fn from_json(text: &str) -> Result<Self, RequestError> {
        let envelope: Envelope = serde_json::from_str(text).map_err(RequestError::Envelope)?;
        Self::from_parts(&envelope.op, envelope.args.unwrap_or(Value::Null))
    }

    /// Decodes an op name and its raw args; `null` args count as `{}`.
    pub fn from_parts(op: &str, args: Value) -> Result<Self, RequestError> {
        let args = match args {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };

        let request = match op {
            "gods" => {
                let a: DepthArgs = decode("gods", args)?;
                Self::Gods { depth: a.depth }
            }
            "god" => {
                let a: IdDepthArgs = decode("god", args)?;
                Self::God {
                    id: parse_id(&a.id)?,
                    depth: a.depth,
                }
            }
            "abodes" => {
                decode::<NoArgs>("abodes", args)?;
                Self::Abodes
            }
            "abode" => Self::Abode {
                id: decode_id("abode", args)?,
            },
            "emblems" => {
                decode::<NoArgs>("emblems", args)?;
                Self::Emblems
            }
            "emblem" => Self::Emblem {
                id: decode_id("emblem", args)?,
            },
            "newGod" => {
                let a: NewGodArgs = decode("newGod", args)?;
                Self::NewGod(NewGod::new(
                    a.name,
                    a.kind.parse::<GodKind>()?,
                    a.description.unwrap_or_default(),
                ))
            }
            "updateGod" => {
                let a: UpdateGodArgs = decode("updateGod", args)?;
                let kind = match a.kind.as_deref() {
                    Some(value) => Some(value.parse::<GodKind>()?),
                    None => None,
                };
                Self::UpdateGod {
                    id: parse_id(&a.id)?,
                    patch: GodPatch {
                        name: a.name,
                        kind,
                        description: a.description,
                    },
                    expected_version: a.expected_version,
                }
            }
            "deleteGod" => Self::DeleteGod {
                id: decode_id("deleteGod", args)?,
            },
            "addGodRelative" => {
                let a: RelativeArgs = decode("addGodRelative", args)?;
                Self::AddGodRelative {
                    god_id: parse_id(&a.god_id)?,
                    relative_id: parse_id(&a.relative_id)?,
                    relationship: a.relationship.parse()?,
                }
            }
            "removeGodRelative" => {
                let a: RelativeArgs = decode("removeGodRelative", args)?;
                Self::RemoveGodRelative {
                    god_id: parse_id(&a.god_id)?,
                    relative_id: parse_id(&a.relative_id)?,
                    relationship: a.relationship.parse()?,
                }
            }
            "addGodEmblem" => {
                let a: GodEmblemArgs = decode("addGodEmblem", args)?;
                Self::AddGodEmblem {
                    god_id: parse_id(&a.god_id)?,
                    emblem_id: parse_id(&a.emblem_id)?,
                }
            }
            "removeGodEmblem" => {
                let a: GodEmblemArgs = decode("removeGodEmblem", args)?;
                Self::RemoveGodEmblem {
                    god_id: parse_id(&a.god_id)?,
                    emblem_id: parse_id(&a.emblem_id)?,
                }
            }
            "updateGodAbode" => {
                let a: GodAbodeArgs = decode("updateGodAbode", args)?;
                let abode_id = match a.abode_id.as_deref() {
                    Some(value) => Some(parse_id(value)?),
                    None => None,
                };
                Self::UpdateGodAbode {
                    god_id: parse_id(&a.god_id)?,
                    abode_id,
                }
            }
            "addGodDomain" => {
                let a: GodDomainArgs = decode("addGodDomain", args)?;
                Self::AddGodDomain {
                    god_id: parse_id(&a.god_id)?,
                    domain: a.domain,
                }
            }
            "removeGodDomain" => {
                let a: GodDomainArgs = decode("removeGodDomain", args)?;
                Self::RemoveGodDomain {
                    god_id: parse_id(&a.god_id)?,
                    domain: a.domain,
                }
            }
            "newAbode" => {
                let a: NewAbodeArgs = decode("newAbode", args)?;
                Self::NewAbode {
                    name: a.name,
                    coordinates: a.coordinates.unwrap_or_default(),
                }
            }
            "deleteAbode" => Self::DeleteAbode {
                id: decode_id("deleteAbode", args)?,
            },
            "updateAbode" => {
                let a: UpdateAbodeArgs = decode("updateAbode", args)?;
                Self::UpdateAbode {
                    id: parse_id(&a.id)?,
                    patch: AbodePatch {
                        name: Some(a.name),
                        coordinates: a.coordinates,
                    },
                }
            }
            "newEmblem" => {
                let a: NameArgs = decode("newEmblem", args)?;
                Self::NewEmblem { name: a.name }
            }
            "deleteEmblem" => Self::DeleteEmblem {
                id: decode_id("deleteEmblem", args)?,
            },
            "updateEmblem" => {
                let a: IdNameArgs = decode("updateEmblem", args)?;
                Self::UpdateEmblem {
                    id: parse_id(&a.id)?,
                    name: a.name,
                }
            }
            other => return Err(RequestError::UnknownOp(other.to_string())),
        };
        Ok(request)
    }

    /// Wire name of the operation.
    pub fn op(&self) -> &'static str {
        match self {
            Self::Gods { .. } => "gods",
            Self::God { .. } => "god",
            Self::Abodes => "abodes",
            Self::Abode { .. } => "abode",
            Self::Emblems => "emblems",
            Self::Emblem { .. } => "emblem",
            Self::NewGod(_) => "newGod",
            Self::UpdateGod { .. } => "updateGod",
            Self::DeleteGod { .. } => "deleteGod",
            Self::AddGodRelative { .. } => "addGodRelative",
            Self::RemoveGodRelative { .. } => "removeGodRelative",
            Self::AddGodEmblem { .. } => "addGodEmblem",
            Self::RemoveGodEmblem { .. } => "removeGodEmblem",
            Self::UpdateGodAbode { .. } => "updateGodAbode",
            Self::AddGodDomain { .. } => "addGodDomain",
            Self::RemoveGodDomain { .. } => "removeGodDomain",
            Self::NewAbode { .. } => "newAbode",
            Self::DeleteAbode { .. } => "deleteAbode",
            Self::UpdateAbode { .. } => "updateAbode",
            Self::NewEmblem { .. } => "newEmblem",
            Self::DeleteEmblem { .. } => "deleteEmblem",
            Self::UpdateEmblem { .. } => "updateEmblem",
        }
    }

    /// Whether the op only reads.
    pub fn is_query(&self) -> bool {
        matches!(
            self,
            Self::Gods { .. }
                | Self::God { .. }
                | Self::Abodes
                | Self::Abode { .. }
                | Self::Emblems
                | Self::Emblem { .. }
        )
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Envelope {
    op: String,
    #[serde(default)]
    args: Option<Value>,
}

fn decode<T: DeserializeOwned>(op: &'static str, args: Value) -> Result<T, RequestError> {
    serde_json::from_value(args).map_err(|source| RequestError::InvalidArgs { op, source })
}

fn decode_id(op: &'static str, args: Value) -> Result<uuid::Uuid, RequestError> {
    let a: IdArgs = decode(op, args)?;
    Ok(parse_id(&a.id)?)
}

/// Required but nullable: a missing field is still an error.
fn nullable<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct NoArgs {}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DepthArgs {
    #[serde(default)]
    depth: Option<u32>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct IdArgs {
    id: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct IdDepthArgs {
    id: String,
    #[serde(default)]
    depth: Option<u32>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct NameArgs {
    name: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct IdNameArgs {
    id: String,
    name: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct NewGodArgs {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct UpdateGodArgs {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    expected_version: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RelativeArgs {
    god_id: String,
    relative_id: String,
    relationship: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct GodEmblemArgs {
    god_id: String,
    emblem_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct GodAbodeArgs {
    god_id: String,
    #[serde(deserialize_with = "nullable")]
    abode_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct GodDomainArgs {
    god_id: String,
    domain: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct NewAbodeArgs {
    name: String,
    #[serde(default)]
    coordinates: Option<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct UpdateAbodeArgs {
    id: String,
    name: String,
    #[serde(default)]
    coordinates: Option<String>,
}
