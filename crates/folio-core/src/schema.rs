// crates/folio-core/src/schema.rs
// ============================================================================
// Module: Folio Rule Table
// Description: Declarative field rules for the base and item schemas.
// Purpose: Single source of truth for field names, kinds, and messages.
// Dependencies: crate::{datetime, lookup}, serde_json
// ============================================================================

//! ## Overview
//! Every field the validator checks is described by a [`FieldRule`]: its
//! name, value kind, optional extra predicate, optional reference set, and
//! message templates. Rule evaluation is pure; reference resolution is left
//! to the caller through [`RuleOutcome::Reference`].
//!
//! Messages are built as `"<field> <template>"`, e.g. `xxx must be positive`.
//! All rules in both tables are required fields.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;

use crate::datetime::is_valid_datetime;
use crate::lookup::ReferenceSet;

// ============================================================================
// SECTION: Discriminator
// ============================================================================

/// Field selecting the conditional schema.
pub const DISCRIMINATOR_FIELD: &str = "ccc";
/// Discriminator value for plain records.
pub const PLAIN_DISCRIMINATOR: i64 = 10;
/// Discriminator value that activates the item schema.
pub const ITEMIZED_DISCRIMINATOR: i64 = 11;
/// Accepted discriminator values.
pub const DISCRIMINATOR_VALUES: &[i64] = &[PLAIN_DISCRIMINATOR, ITEMIZED_DISCRIMINATOR];

/// Sequence field validated when the record is itemized.
pub const ITEMS_FIELD: &str = "ddd";
/// Template used when the item sequence is absent.
pub const ITEMS_REQUIRED_MESSAGE: &str = "is required when ccc = 11";
/// Template used when the item sequence is not an array.
pub const ITEMS_TYPE_MESSAGE: &str = "must be an array";
/// Template used when an item is not an object.
pub const ITEM_OBJECT_MESSAGE: &str = "must be an object";
/// Template used for item keys outside the item schema.
pub const ITEM_UNKNOWN_FIELD_MESSAGE: &str = "is not allowed";

// ============================================================================
// SECTION: Rule Types
// ============================================================================

/// Value kind enforced by a rule's type check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Text parsing as a date or date-time.
    DateTime,
    /// Any JSON string.
    Text,
    /// JSON integer representable as `i64`.
    Integer,
}

/// Extra predicate applied after the type check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPredicate {
    /// Text must not be empty.
    NonEmpty,
    /// Integer must be strictly greater than zero.
    Positive,
    /// Integer must be one of the listed values.
    OneOf(&'static [i64]),
}

impl FieldPredicate {
    /// Returns true when the text satisfies the predicate.
    const fn accepts_text(self, text: &str) -> bool {
        match self {
            Self::NonEmpty => !text.is_empty(),
            Self::Positive | Self::OneOf(_) => true,
        }
    }

    /// Returns true when the integer satisfies the predicate.
    fn accepts_integer(self, value: i64) -> bool {
        match self {
            Self::NonEmpty => true,
            Self::Positive => value > 0,
            Self::OneOf(allowed) => allowed.contains(&value),
        }
    }
}

/// Predicate paired with its failure template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Constraint {
    /// Predicate to evaluate.
    pub predicate: FieldPredicate,
    /// Template reported when the predicate fails.
    pub message: &'static str,
}

/// Reference set paired with its failure template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceRule {
    /// Set the integer must reference.
    pub set: ReferenceSet,
    /// Template reported when the entity is missing.
    pub message: &'static str,
}

/// Declarative description of one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    /// Field name within its object.
    pub name: &'static str,
    /// Type check applied to present values.
    pub kind: FieldKind,
    /// Template reported when the field is absent or null.
    pub required_message: &'static str,
    /// Template reported when the type check fails.
    pub type_message: &'static str,
    /// Optional extra predicate.
    pub constraint: Option<Constraint>,
    /// Optional entity-existence check.
    pub reference: Option<ReferenceRule>,
}

/// Result of evaluating a rule against one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOutcome {
    /// The value satisfies the rule.
    Satisfied,
    /// The value violates the rule; carries the template.
    Violated(&'static str),
    /// The value is well-formed but must still be resolved against a set.
    Reference {
        /// Reference rule to apply.
        rule: ReferenceRule,
        /// Integer id to resolve.
        id: i64,
    },
}

impl FieldRule {
    /// Evaluates the rule against an optional value.
    #[must_use]
    pub fn evaluate(&self, value: Option<&Value>) -> RuleOutcome {
        let Some(value) = value.filter(|value| !value.is_null()) else {
            return RuleOutcome::Violated(self.required_message);
        };
        match self.kind {
            FieldKind::DateTime => match value.as_str() {
                Some("") => RuleOutcome::Violated(self.required_message),
                Some(text) if is_valid_datetime(text) => RuleOutcome::Satisfied,
                _ => RuleOutcome::Violated(self.type_message),
            },
            FieldKind::Text => match value.as_str() {
                Some(text) => self.check_text(text),
                None => RuleOutcome::Violated(self.type_message),
            },
            FieldKind::Integer => match value.as_i64() {
                Some(number) => self.check_integer(number),
                None => RuleOutcome::Violated(self.type_message),
            },
        }
    }

    /// Formats the full message for a template.
    #[must_use]
    pub fn message(&self, template: &str) -> String {
        format!("{} {template}", self.name)
    }

    /// Applies the text predicate, if any.
    fn check_text(&self, text: &str) -> RuleOutcome {
        match self.constraint {
            Some(constraint) if !constraint.predicate.accepts_text(text) => {
                RuleOutcome::Violated(constraint.message)
            }
            _ => RuleOutcome::Satisfied,
        }
    }

    /// Applies the integer predicate and reference rule, if any.
    fn check_integer(&self, number: i64) -> RuleOutcome {
        if let Some(constraint) = self.constraint
            && !constraint.predicate.accepts_integer(number)
        {
            return RuleOutcome::Violated(constraint.message);
        }
        match self.reference {
            Some(rule) => RuleOutcome::Reference {
                rule,
                id: number,
            },
            None => RuleOutcome::Satisfied,
        }
    }
}

// ============================================================================
// SECTION: Rule Tables
// ============================================================================

/// Template for a missing required field.
const REQUIRED: &str = "is required";
/// Template for a missing or empty `www`.
const REQUIRED_NON_EMPTY: &str = "is required and cannot be empty";
/// Template for non-string text fields.
const MUST_BE_STRING: &str = "must be a string";
/// Template for non-integer fields.
const MUST_BE_INTEGER: &str = "must be an integer";
/// Template for discriminator type and membership failures.
const MUST_BE_DISCRIMINATOR: &str = "must be either 10 or 11";
/// Template for a reference to an unknown entity.
const INVALID_ENTITY: &str = "references an invalid entity";

/// Top-level fields, checked on every record.
pub const BASE_RULES: [FieldRule; 3] = [
    FieldRule {
        name: "aaa",
        kind: FieldKind::DateTime,
        required_message: REQUIRED,
        type_message: "is not a valid datetime",
        constraint: None,
        reference: None,
    },
    FieldRule {
        name: "bbb",
        kind: FieldKind::Text,
        required_message: REQUIRED,
        type_message: MUST_BE_STRING,
        constraint: Some(Constraint {
            predicate: FieldPredicate::NonEmpty,
            message: REQUIRED,
        }),
        reference: None,
    },
    FieldRule {
        name: DISCRIMINATOR_FIELD,
        kind: FieldKind::Integer,
        required_message: REQUIRED,
        type_message: MUST_BE_DISCRIMINATOR,
        constraint: Some(Constraint {
            predicate: FieldPredicate::OneOf(DISCRIMINATOR_VALUES),
            message: MUST_BE_DISCRIMINATOR,
        }),
        reference: None,
    },
];

/// Fields of each `ddd` element, in declaration order.
pub const ITEM_RULES: [FieldRule; 4] = [
    FieldRule {
        name: "zzz",
        kind: FieldKind::Integer,
        required_message: REQUIRED,
        type_message: MUST_BE_INTEGER,
        constraint: None,
        reference: Some(ReferenceRule {
            set: ReferenceSet::Zzz,
            message: INVALID_ENTITY,
        }),
    },
    FieldRule {
        name: "yyy",
        kind: FieldKind::Integer,
        required_message: REQUIRED,
        type_message: MUST_BE_INTEGER,
        constraint: None,
        reference: Some(ReferenceRule {
            set: ReferenceSet::Yyy,
            message: INVALID_ENTITY,
        }),
    },
    FieldRule {
        name: "xxx",
        kind: FieldKind::Integer,
        required_message: REQUIRED,
        type_message: MUST_BE_INTEGER,
        constraint: Some(Constraint {
            predicate: FieldPredicate::Positive,
            message: "must be positive",
        }),
        reference: None,
    },
    FieldRule {
        name: "www",
        kind: FieldKind::Text,
        required_message: REQUIRED_NON_EMPTY,
        type_message: MUST_BE_STRING,
        constraint: Some(Constraint {
            predicate: FieldPredicate::NonEmpty,
            message: REQUIRED_NON_EMPTY,
        }),
        reference: None,
    },
];

/// Returns true when `name` belongs to the item schema.
#[must_use]
pub fn is_item_field(name: &str) -> bool {
    ITEM_RULES.iter().any(|rule| rule.name == name)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
