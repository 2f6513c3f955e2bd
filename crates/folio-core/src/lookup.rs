// crates/folio-core/src/lookup.rs
// ============================================================================
// Module: Folio Reference Lookup
// Description: Entity-existence interface and the allow-list strategy.
// Purpose: Decouple reference checks from how entities are stored.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Item fields `zzz` and `yyy` may have to name an existing entity. The
//! validator never knows how entities are stored; it asks a
//! [`ReferenceLookup`] instead. Two strategies exist: a live lookup (see the
//! `folio-store-sqlite` crate) and the pre-fetched [`AllowListLookup`] used
//! where no round trip is possible.
//!
//! [`ReferenceConstraint`] is the single-value form of the same check. It is
//! the only place that can report a usage error, which is kept distinct from
//! a validation violation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Reference Sets
// ============================================================================

/// External entity collections that item fields may reference.
///
/// # Invariants
/// - Names returned by [`ReferenceSet::as_str`] are stable storage keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ReferenceSet {
    /// Entities referenced by `ddd[i].zzz`.
    Zzz,
    /// Entities referenced by `ddd[i].yyy`.
    Yyy,
}

impl ReferenceSet {
    /// All reference sets in item field declaration order.
    pub const ALL: [Self; 2] = [Self::Zzz, Self::Yyy];

    /// Returns the stable entity set name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Zzz => "Zzz",
            Self::Yyy => "Yyy",
        }
    }

    /// Returns the item field that references this set.
    #[must_use]
    pub const fn field_name(self) -> &'static str {
        match self {
            Self::Zzz => "zzz",
            Self::Yyy => "yyy",
        }
    }
}

/// Result of resolving a single reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceStatus {
    /// The entity exists.
    Found,
    /// The entity does not exist.
    Missing,
    /// The strategy has no data for this set; the check is skipped.
    Unchecked,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Infrastructure failure while resolving a reference.
///
/// # Invariants
/// - Never used to report a missing entity; that is [`ReferenceStatus::Missing`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    /// The backing store could not be reached or opened.
    #[error("reference lookup unavailable: {0}")]
    Unavailable(String),
    /// The backing store rejected or failed the query.
    #[error("reference lookup failed: {0}")]
    Backend(String),
}

/// Errors raised by [`ReferenceConstraint::check`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReferenceCheckError {
    /// Caller passed a value that is not an integer id.
    #[error("reference id for {set} must be an integer, found {found}")]
    NonIntegerId {
        /// Reference set name.
        set: &'static str,
        /// JSON kind of the offending value.
        found: &'static str,
    },
    /// Lookup failed.
    #[error(transparent)]
    Lookup(#[from] LookupError),
}

// ============================================================================
// SECTION: Lookup Interface
// ============================================================================

/// Entity-existence capability injected into the validator.
pub trait ReferenceLookup {
    /// Resolves whether `id` names an entity in `set`.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] when the backing store fails.
    fn resolve(&self, set: ReferenceSet, id: i64) -> Result<ReferenceStatus, LookupError>;

    /// Returns a short label describing the strategy for audit records.
    fn strategy(&self) -> &'static str {
        "custom"
    }
}

// ============================================================================
// SECTION: Allow-List Strategy
// ============================================================================

/// Pre-fetched id lists in their wire form (`validZzzIds`, `validYyyIds`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowLists {
    /// Known `Zzz` ids, if fetched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_zzz_ids: Option<Vec<i64>>,
    /// Known `Yyy` ids, if fetched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_yyy_ids: Option<Vec<i64>>,
}

/// Reference lookup answering from in-memory allow-lists.
///
/// # Invariants
/// - An empty list means "not supplied": lookups on that set are
///   [`ReferenceStatus::Unchecked`], never [`ReferenceStatus::Missing`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowListLookup {
    /// Known `Zzz` ids.
    zzz: BTreeSet<i64>,
    /// Known `Yyy` ids.
    yyy: BTreeSet<i64>,
}

impl AllowListLookup {
    /// Creates a lookup with no lists; every check is skipped.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds ids to the list for `set`.
    #[must_use]
    pub fn with_ids(mut self, set: ReferenceSet, ids: impl IntoIterator<Item = i64>) -> Self {
        self.ids_mut(set).extend(ids);
        self
    }

    /// Returns the ids known for `set`.
    #[must_use]
    pub const fn ids(&self, set: ReferenceSet) -> &BTreeSet<i64> {
        match set {
            ReferenceSet::Zzz => &self.zzz,
            ReferenceSet::Yyy => &self.yyy,
        }
    }

    /// Returns the mutable id list for `set`.
    const fn ids_mut(&mut self, set: ReferenceSet) -> &mut BTreeSet<i64> {
        match set {
            ReferenceSet::Zzz => &mut self.zzz,
            ReferenceSet::Yyy => &mut self.yyy,
        }
    }
}

impl From<AllowLists> for AllowListLookup {
    fn from(lists: AllowLists) -> Self {
        Self::new()
            .with_ids(ReferenceSet::Zzz, lists.valid_zzz_ids.unwrap_or_default())
            .with_ids(ReferenceSet::Yyy, lists.valid_yyy_ids.unwrap_or_default())
    }
}

impl ReferenceLookup for AllowListLookup {
    fn resolve(&self, set: ReferenceSet, id: i64) -> Result<ReferenceStatus, LookupError> {
        let ids = self.ids(set);
        if ids.is_empty() {
            return Ok(ReferenceStatus::Unchecked);
        }
        if ids.contains(&id) { Ok(ReferenceStatus::Found) } else { Ok(ReferenceStatus::Missing) }
    }

    fn strategy(&self) -> &'static str {
        "allow_list"
    }
}

// ============================================================================
// SECTION: Reference Constraint
// ============================================================================

/// Single-value reference check bound to one set and one lookup.
///
/// # Invariants
/// - `null` and `""` pass; required-ness belongs to the required rule.
/// - Non-integer values are usage errors, not violations.
pub struct ReferenceConstraint<'a> {
    /// Set the value must reference.
    set: ReferenceSet,
    /// Lookup used to resolve ids.
    lookup: &'a dyn ReferenceLookup,
}

impl<'a> ReferenceConstraint<'a> {
    /// Creates a constraint for `set` backed by `lookup`.
    #[must_use]
    pub const fn new(set: ReferenceSet, lookup: &'a dyn ReferenceLookup) -> Self {
        Self {
            set,
            lookup,
        }
    }

    /// Returns true when `value` is absent or names an entity that may exist.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceCheckError::NonIntegerId`] when `value` is not an
    /// integer and [`ReferenceCheckError::Lookup`] when the lookup fails.
    pub fn check(&self, value: &Value) -> Result<bool, ReferenceCheckError> {
        if value.is_null() || value.as_str() == Some("") {
            return Ok(true);
        }
        let Some(id) = value.as_i64() else {
            return Err(ReferenceCheckError::NonIntegerId {
                set: self.set.as_str(),
                found: value_kind(value),
            });
        };
        let status = self.lookup.resolve(self.set, id)?;
        Ok(status != ReferenceStatus::Missing)
    }
}

/// Returns a stable label for the JSON kind of `value`.
const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions are permitted.")]

    use serde_json::json;

    use super::*;

    #[test]
    fn allow_list_skips_sets_without_ids() {
        let lookup = AllowListLookup::new().with_ids(ReferenceSet::Zzz, [1, 2]);
        assert_eq!(lookup.resolve(ReferenceSet::Zzz, 2).unwrap(), ReferenceStatus::Found);
        assert_eq!(lookup.resolve(ReferenceSet::Zzz, 3).unwrap(), ReferenceStatus::Missing);
        assert_eq!(lookup.resolve(ReferenceSet::Yyy, 3).unwrap(), ReferenceStatus::Unchecked);
    }

    #[test]
    fn allow_lists_decode_wire_names() {
        let lists: AllowLists =
            serde_json::from_value(json!({ "validZzzIds": [4], "validYyyIds": [] })).unwrap();
        let lookup = AllowListLookup::from(lists);
        assert!(lookup.ids(ReferenceSet::Zzz).contains(&4));
        assert!(lookup.ids(ReferenceSet::Yyy).is_empty());
    }

    #[test]
    fn constraint_passes_null_and_empty() {
        let lookup = AllowListLookup::new().with_ids(ReferenceSet::Yyy, [7]);
        let constraint = ReferenceConstraint::new(ReferenceSet::Yyy, &lookup);
        assert!(constraint.check(&Value::Null).unwrap());
        assert!(constraint.check(&json!("")).unwrap());
    }

    #[test]
    fn constraint_rejects_non_integer_as_usage_error() {
        let lookup = AllowListLookup::new();
        let constraint = ReferenceConstraint::new(ReferenceSet::Zzz, &lookup);
        let err = constraint.check(&json!("42")).unwrap_err();
        assert_eq!(err, ReferenceCheckError::NonIntegerId {
            set: "Zzz",
            found: "string",
        });
    }

    #[test]
    fn constraint_reports_missing_entities() {
        let lookup = AllowListLookup::new().with_ids(ReferenceSet::Zzz, [1]);
        let constraint = ReferenceConstraint::new(ReferenceSet::Zzz, &lookup);
        assert!(constraint.check(&json!(1)).unwrap());
        assert!(!constraint.check(&json!(42)).unwrap());
    }

    #[test]
    fn constraint_propagates_lookup_failures() {
        struct Down;
        impl ReferenceLookup for Down {
            fn resolve(&self, _: ReferenceSet, _: i64) -> Result<ReferenceStatus, LookupError> {
                Err(LookupError::Backend("disk I/O error".to_string()))
            }
        }
        let constraint = ReferenceConstraint::new(ReferenceSet::Yyy, &Down);
        let err = constraint.check(&json!(3)).unwrap_err();
        assert_eq!(
            err,
            ReferenceCheckError::Lookup(LookupError::Backend("disk I/O error".to_string()))
        );
        assert!(constraint.check(&Value::Null).unwrap());
    }
}
