// crates/folio-core/src/record.rs
// ============================================================================
// Module: Folio Typed Records
// Description: Typed views of payloads that passed structural validation.
// Purpose: Let callers work with checked fields instead of raw JSON.
// Dependencies: crate::{schema, validator}, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! [`InputRecord`] is only built from a payload that passes
//! [`validate_structure`], so its fields always satisfy the rule table.
//! Unknown top-level keys survive in [`InputRecord::extra`]. For plain
//! records (`ccc == 10`) the `ddd` key is irrelevant and is dropped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::schema::DISCRIMINATOR_FIELD;
use crate::schema::ITEMIZED_DISCRIMINATOR;
use crate::schema::ITEMS_FIELD;
use crate::validator::ValidationResult;
use crate::validator::validate_structure;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Validated catalog payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRecord {
    /// Datetime text.
    pub aaa: String,
    /// Non-empty text.
    pub bbb: String,
    /// Discriminator, `10` or `11`.
    pub ccc: i64,
    /// Items, present only for itemized records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ddd: Option<Vec<ItemRecord>>,
    /// Unknown top-level keys, preserved as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Validated element of `ddd`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ItemRecord {
    /// Reference into the `Zzz` set.
    pub zzz: i64,
    /// Reference into the `Yyy` set.
    pub yyy: i64,
    /// Positive quantity.
    pub xxx: i64,
    /// Non-empty text.
    pub www: String,
}

/// Errors raised while building an [`InputRecord`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecordError {
    /// The payload failed validation.
    #[error("record failed validation with {} error(s)", .0.errors.len())]
    Invalid(ValidationResult),
    /// The payload passed validation but could not be decoded.
    #[error("record decode error: {0}")]
    Decode(String),
}

impl InputRecord {
    /// Builds a typed record from a structurally valid payload.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Invalid`] with the full result when validation
    /// fails.
    pub fn from_value(record: &Value) -> Result<Self, RecordError> {
        let result = validate_structure(record);
        if !result.is_valid {
            return Err(RecordError::Invalid(result));
        }
        let mut fields = record.as_object().cloned().unwrap_or_default();
        if fields.get(DISCRIMINATOR_FIELD).and_then(Value::as_i64) != Some(ITEMIZED_DISCRIMINATOR) {
            fields.remove(ITEMS_FIELD);
        }
        serde_json::from_value(Value::Object(fields))
            .map_err(|err| RecordError::Decode(err.to_string()))
    }

    /// Returns the record as an untyped payload.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Decode`] when serialization fails.
    pub fn to_value(&self) -> Result<Value, RecordError> {
        serde_json::to_value(self).map_err(|err| RecordError::Decode(err.to_string()))
    }
}
