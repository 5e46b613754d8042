//! Response envelope and catalog projections.

use pantheon_core::{Abode, AbodeId, Emblem, EmblemId, God, GodId};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Wire error payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    /// One of `NOT_FOUND|VALIDATION_FAILED|CONFLICT|TIMEOUT|STORAGE`.
    pub code: &'static str,
    pub message: String,
}

/// Result envelope: `{"ok":true,"data":...}` or `{"ok":false,"error":{...}}`.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Success(Value),
    Failure(ErrorBody),
}

impl Response {
    pub fn failure(code: &'static str, message: impl Into<String>) -> Self {
        Self::Failure(ErrorBody {
            code,
            message: message.into(),
        })
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Payload of a successful response.
    pub fn data(&self) -> Option<&Value> {
        match self {
            Self::Success(data) => Some(data),
            Self::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorBody> {
        match self {
            Self::Success(_) => None,
            Self::Failure(body) => Some(body),
        }
    }
}

impl Serialize for Response {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Response", 2)?;
        match self {
            Self::Success(data) => {
                state.serialize_field("ok", &true)?;
                state.serialize_field("data", data)?;
            }
            Self::Failure(body) => {
                state.serialize_field("ok", &false)?;
                state.serialize_field("error", body)?;
            }
        }
        state.end()
    }
}

/// Id and name of a god referencing a catalog record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GodSummary {
    pub id: GodId,
    pub name: String,
}

impl From<God> for GodSummary {
    fn from(god: God) -> Self {
        Self {
            id: god.id,
            name: god.name,
        }
    }
}

/// Abode projection with its residents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbodeView {
    pub id: AbodeId,
    pub name: String,
    pub coordinates: String,
    pub gods: Vec<GodSummary>,
}

impl AbodeView {
    pub fn new(abode: Abode, gods: Vec<God>) -> Self {
        Self {
            id: abode.id,
            name: abode.name,
            coordinates: abode.coordinates,
            gods: gods.into_iter().map(GodSummary::from).collect(),
        }
    }
}

/// Emblem projection with the gods that carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmblemView {
    pub id: EmblemId,
    pub name: String,
    pub gods: Vec<GodSummary>,
}

impl EmblemView {
    pub fn new(emblem: Emblem, gods: Vec<God>) -> Self {
        Self {
            id: emblem.id,
            name: emblem.name,
            gods: gods.into_iter().map(GodSummary::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Response;
    use serde_json::{json, Value};

    #[test]
    fn envelope_keeps_null_data_on_success() {
        let encoded = serde_json::to_value(Response::Success(Value::Null)).unwrap();
        assert_eq!(encoded, json!({"ok": true, "data": null}));
    }

    #[test]
    fn envelope_carries_code_and_message_on_failure() {
        let response = Response::failure("NOT_FOUND", "god not found: x");
        assert!(!response.is_ok());
        assert!(response.data().is_none());
        let encoded = serde_json::to_value(&response).unwrap();
        assert_eq!(
            encoded,
            json!({"ok": false, "error": {"code": "NOT_FOUND", "message": "god not found: x"}})
        );
    }
}
