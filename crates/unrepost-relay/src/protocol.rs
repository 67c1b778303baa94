//! Wire message types for the page/orchestrator boundary.
//!
//! Requests are internally tagged JSON objects whose `type` field names the
//! operation. Responses echo the request tag with a `_RESULT` suffix, or a
//! `_ERROR` suffix when the operation failed. Because the error tag is
//! derived from the request tag at runtime, responses convert to and from
//! JSON by hand rather than through a serde tag.

use crate::error::RelayError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use unrepost_core::PageResult;
use uuid::Uuid;

/// Correlation id pairing a response with its in-flight request.
///
/// The identity request carries no id: there is never more than one
/// identity lookup in flight, and its response is unambiguous without one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Mint a fresh correlation id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The operations the relay knows how to carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Resolve the logged-in account's stable identity.
    GetSecUid,
    /// Fetch one page of reposted items.
    GetRepostItems,
    /// Remove a single reposted item.
    RemoveRepostItem,
}

impl RequestKind {
    /// The request's wire tag.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::GetSecUid => "GET_SEC_UID",
            Self::GetRepostItems => "GET_REPOST_ITEMS",
            Self::RemoveRepostItem => "REMOVE_REPOST_ITEM",
        }
    }

    /// Parse a wire tag back into a kind.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "GET_SEC_UID" => Some(Self::GetSecUid),
            "GET_REPOST_ITEMS" => Some(Self::GetRepostItems),
            "REMOVE_REPOST_ITEM" => Some(Self::RemoveRepostItem),
            _ => None,
        }
    }
}

/// A request travelling from the orchestrator to the page world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RelayRequest {
    /// Ask the page for the account's secUid.
    #[serde(rename = "GET_SEC_UID")]
    GetSecUid,

    /// Ask the page for the repost page at `cursor`.
    #[serde(rename = "GET_REPOST_ITEMS")]
    GetRepostItems {
        /// Opaque pagination cursor.
        cursor: String,
        /// Correlation id echoed in the response.
        #[serde(rename = "requestId")]
        request_id: RequestId,
    },

    /// Ask the page to remove one reposted item.
    #[serde(rename = "REMOVE_REPOST_ITEM")]
    RemoveRepostItem {
        /// Identifier of the item to remove.
        #[serde(rename = "itemId")]
        item_id: String,
        /// Correlation id echoed in the response.
        #[serde(rename = "requestId")]
        request_id: RequestId,
    },
}

impl RelayRequest {
    /// The operation this request performs.
    #[must_use]
    pub fn kind(&self) -> RequestKind {
        match self {
            Self::GetSecUid => RequestKind::GetSecUid,
            Self::GetRepostItems { .. } => RequestKind::GetRepostItems,
            Self::RemoveRepostItem { .. } => RequestKind::RemoveRepostItem,
        }
    }
}

/// A response travelling from the page world back to the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayResponse {
    /// The resolved account identity.
    SecUidResult {
        /// The account's stable identifier.
        sec_uid: String,
    },
    /// One fetched page of reposts.
    GetRepostItemsResult {
        /// Correlation id of the originating request.
        request_id: RequestId,
        /// The normalized page.
        result: PageResult,
    },
    /// Outcome of a single removal.
    RemoveRepostItemResult {
        /// Correlation id of the originating request.
        request_id: RequestId,
        /// Whether the item was removed.
        result: bool,
    },
    /// The operation failed in the page world.
    Error {
        /// Which operation failed.
        kind: RequestKind,
        /// Correlation id, absent for identity lookups.
        request_id: Option<RequestId>,
        /// Human-readable failure description.
        error: String,
    },
}

impl RelayResponse {
    /// This response's wire tag.
    #[must_use]
    pub fn tag(&self) -> String {
        match self {
            Self::SecUidResult { .. } => "SEC_UID_RESULT".to_string(),
            Self::GetRepostItemsResult { .. } => "GET_REPOST_ITEMS_RESULT".to_string(),
            Self::RemoveRepostItemResult { .. } => "REMOVE_REPOST_ITEM_RESULT".to_string(),
            Self::Error { kind, .. } => format!("{}_ERROR", kind.tag()),
        }
    }

    /// Whether `tag` names a response this relay should forward.
    #[must_use]
    pub fn is_recognized_tag(tag: &str) -> bool {
        matches!(
            tag,
            "SEC_UID_RESULT" | "GET_REPOST_ITEMS_RESULT" | "REMOVE_REPOST_ITEM_RESULT"
        ) || tag
            .strip_suffix("_ERROR")
            .is_some_and(|prefix| RequestKind::from_tag(prefix).is_some())
    }

    /// Serialize to the boundary's JSON shape.
    #[must_use]
    pub fn to_wire(&self) -> Value {
        match self {
            Self::SecUidResult { sec_uid } => json!({
                "type": "SEC_UID_RESULT",
                "secUid": sec_uid,
            }),
            Self::GetRepostItemsResult { request_id, result } => json!({
                "type": "GET_REPOST_ITEMS_RESULT",
                "requestId": request_id,
                "result": result,
            }),
            Self::RemoveRepostItemResult { request_id, result } => json!({
                "type": "REMOVE_REPOST_ITEM_RESULT",
                "requestId": request_id,
                "result": result,
            }),
            Self::Error {
                kind,
                request_id,
                error,
            } => json!({
                "type": format!("{}_ERROR", kind.tag()),
                "requestId": request_id,
                "error": error,
            }),
        }
    }

    /// Parse a boundary JSON object back into a response.
    pub fn from_wire(payload: &Value) -> Result<Self, RelayError> {
        let tag = payload
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| RelayError::Malformed("missing type tag".to_string()))?;

        match tag {
            "SEC_UID_RESULT" => {
                let sec_uid = required_str(payload, "secUid")?;
                Ok(Self::SecUidResult { sec_uid })
            }
            "GET_REPOST_ITEMS_RESULT" => Ok(Self::GetRepostItemsResult {
                request_id: required_id(payload)?,
                result: required_field(payload, "result")?,
            }),
            "REMOVE_REPOST_ITEM_RESULT" => Ok(Self::RemoveRepostItemResult {
                request_id: required_id(payload)?,
                result: required_field(payload, "result")?,
            }),
            other => {
                let kind = other
                    .strip_suffix("_ERROR")
                    .and_then(RequestKind::from_tag)
                    .ok_or_else(|| RelayError::UnrecognizedType(other.to_string()))?;
                let request_id = match payload.get("requestId") {
                    None | Some(Value::Null) => None,
                    Some(v) => Some(
                        serde_json::from_value(v.clone())
                            .map_err(|e| RelayError::Malformed(format!("requestId: {e}")))?,
                    ),
                };
                Ok(Self::Error {
                    kind,
                    request_id,
                    error: required_str(payload, "error")?,
                })
            }
        }
    }
}

fn required_str(payload: &Value, field: &str) -> Result<String, RelayError> {
    payload
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| RelayError::Malformed(format!("missing field {field}")))
}

fn required_id(payload: &Value) -> Result<RequestId, RelayError> {
    let value = payload
        .get("requestId")
        .ok_or_else(|| RelayError::Malformed("missing field requestId".to_string()))?;
    serde_json::from_value(value.clone())
        .map_err(|e| RelayError::Malformed(format!("requestId: {e}")))
}

fn required_field<T: serde::de::DeserializeOwned>(
    payload: &Value,
    field: &str,
) -> Result<T, RelayError> {
    let value = payload
        .get(field)
        .ok_or_else(|| RelayError::Malformed(format!("missing field {field}")))?;
    serde_json::from_value(value.clone())
        .map_err(|e| RelayError::Malformed(format!("{field}: {e}")))
}
