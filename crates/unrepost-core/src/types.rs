//! Shared types used across the unrepost crates.
//!
//! This module defines the newtypes and records that model one scan/delete
//! cycle: the session identity, item identifiers, pagination cursors, and the
//! normalized page shape.

use crate::error::UnrepostError;
use once_cell::sync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Newtype for the platform's secure user identifier with validation.
///
/// A secUid is an opaque URL-safe token issued by the platform; it scopes the
/// repost listing query to the current user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecUid(String);

impl SecUid {
    /// Create a new `SecUid` from a string.
    ///
    /// # Errors
    /// Returns error if the value is empty or contains characters outside
    /// the URL-safe alphabet.
    pub fn new(id: impl Into<String>) -> Result<Self, UnrepostError> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validate secUid format: URL-safe characters, 8-256 long.
    fn validate(id: &str) -> Result<(), UnrepostError> {
        static SEC_UID_REGEX: OnceCell<Regex> = OnceCell::new();
        let regex = SEC_UID_REGEX
            .get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]{8,256}$").expect("valid regex"));

        if regex.is_match(id) {
            Ok(())
        } else {
            Err(UnrepostError::Validation(format!(
                "invalid secUid: must be 8-256 URL-safe characters, got '{id}'"
            )))
        }
    }
}

impl fmt::Display for SecUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Newtype for repost item identifiers with validation.
///
/// Item IDs are the platform's numeric video identifiers, carried as strings
/// because they exceed 53 bits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(String);

impl ItemId {
    /// Create a new `ItemId` from a string.
    ///
    /// # Errors
    /// Returns error if the ID is not a non-empty decimal string.
    pub fn new(id: impl Into<String>) -> Result<Self, UnrepostError> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validate item ID format: 1-30 decimal digits.
    fn validate(id: &str) -> Result<(), UnrepostError> {
        static ITEM_ID_REGEX: OnceCell<Regex> = OnceCell::new();
        let regex =
            ITEM_ID_REGEX.get_or_init(|| Regex::new(r"^[0-9]{1,30}$").expect("valid regex"));

        if regex.is_match(id) {
            Ok(())
        } else {
            Err(UnrepostError::Validation(format!(
                "invalid item ID: must be 1-30 decimal digits, got '{id}'"
            )))
        }
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque pagination cursor issued by the remote API.
///
/// The only value ever synthesized locally is the start-of-list sentinel;
/// every other cursor is passed back verbatim from a previous response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor(String);

impl Cursor {
    /// The start-of-list sentinel (`"0"`).
    #[must_use]
    pub fn start() -> Self {
        Self("0".to_string())
    }

    /// Wrap a cursor value received from the remote API.
    #[must_use]
    pub fn from_response(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::start()
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One repost attributable to the acting user, as normalized from an API
/// response. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepostItem {
    /// Platform item identifier
    pub id: ItemId,
    /// Original author's handle, `@`-prefixed
    pub author_handle: String,
    /// Item description/caption
    pub description: String,
    /// Canonical URL of the item on the platform
    pub canonical_url: String,
}

/// One page of scan results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult {
    /// Items in the order the API returned them; ids are unique within a page
    pub items: Vec<RepostItem>,
    /// Whether the API reported further pages
    pub has_more: bool,
    /// Cursor for the next page; present only when `has_more`
    pub next_cursor: Option<Cursor>,
}
