// crates/folio-core/src/validator.rs
// ============================================================================
// Module: Folio Conditional Payload Validator
// Description: Base pass, discriminator dispatch, and item pass.
// Purpose: Turn an untyped record into an ordered list of field violations.
// Dependencies: crate::{audit, lookup, schema}, serde, serde_json
// ============================================================================

//! ## Overview
//! Validation runs in three steps:
//! 1. Base pass over [`BASE_RULES`], collecting every violation.
//! 2. If the base pass failed, stop. Otherwise, if `ccc == 11`, run the
//!    conditional pass; any other discriminator is valid as-is.
//! 3. Conditional pass: `ddd` must be present and an array (one structural
//!    error and stop otherwise), then each element is checked against
//!    [`ITEM_RULES`] and every violated field is reported.
//!
//! Error order is item index order, then field declaration order, then
//! unknown item keys in key order. Reference checks run sequentially.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::convert::Infallible;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::audit::NoopAuditSink;
use crate::audit::ValidationAuditEvent;
use crate::audit::ValidationAuditEventParams;
use crate::audit::ValidationAuditSink;
use crate::audit::ValidationOutcome;
use crate::lookup::LookupError;
use crate::lookup::ReferenceLookup;
use crate::lookup::ReferenceSet;
use crate::lookup::ReferenceStatus;
use crate::schema::BASE_RULES;
use crate::schema::DISCRIMINATOR_FIELD;
use crate::schema::FieldRule;
use crate::schema::ITEM_OBJECT_MESSAGE;
use crate::schema::ITEM_RULES;
use crate::schema::ITEM_UNKNOWN_FIELD_MESSAGE;
use crate::schema::ITEMIZED_DISCRIMINATOR;
use crate::schema::ITEMS_FIELD;
use crate::schema::ITEMS_REQUIRED_MESSAGE;
use crate::schema::ITEMS_TYPE_MESSAGE;
use crate::schema::RuleOutcome;
use crate::schema::is_item_field;

// ============================================================================
// SECTION: Result Types
// ============================================================================

/// A single field violation.
///
/// # Invariants
/// - `property` locates the field, e.g. `bbb` or `ddd[2].zzz`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Path of the offending field.
    pub property: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl ValidationError {
    /// Creates a violation for `property`.
    #[must_use]
    pub fn new(property: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            message: message.into(),
        }
    }
}

/// Outcome of validating one record.
///
/// # Invariants
/// - `is_valid` is true iff `errors` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// True when no violations were found.
    pub is_valid: bool,
    /// Violations in report order.
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    /// Builds a result from collected violations.
    #[must_use]
    pub fn from_errors(errors: Vec<ValidationError>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    /// Returns the violated property paths in report order.
    pub fn properties(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(|error| error.property.as_str())
    }
}

// ============================================================================
// SECTION: Entry Points
// ============================================================================

/// Validates `record`, resolving references through `lookup` when supplied.
///
/// Without a lookup every reference check is skipped.
///
/// # Errors
///
/// Returns [`LookupError`] only when the lookup itself fails; data problems
/// are always reported inside the [`ValidationResult`].
pub fn validate(
    record: &Value,
    lookup: Option<&dyn ReferenceLookup>,
) -> Result<ValidationResult, LookupError> {
    run_validation(record, |set, id| {
        lookup.map_or(Ok(ReferenceStatus::Unchecked), |lookup| lookup.resolve(set, id))
    })
}

/// Validates `record` without any reference checks.
#[must_use]
pub fn validate_structure(record: &Value) -> ValidationResult {
    match run_validation(record, |_, _| Ok::<_, Infallible>(ReferenceStatus::Unchecked)) {
        Ok(result) => result,
        Err(never) => match never {},
    }
}

/// Runs every pass with `resolve` answering reference checks.
fn run_validation<E>(
    record: &Value,
    mut resolve: impl FnMut(ReferenceSet, i64) -> Result<ReferenceStatus, E>,
) -> Result<ValidationResult, E> {
    let fields = record.as_object();
    let mut errors = Vec::new();
    for rule in &BASE_RULES {
        let value = fields.and_then(|fields| fields.get(rule.name));
        apply_rule(rule, rule.name.to_string(), value, &mut resolve, &mut errors)?;
    }
    if !errors.is_empty() {
        return Ok(ValidationResult::from_errors(errors));
    }
    let Some(fields) = fields else {
        return Ok(ValidationResult::from_errors(errors));
    };
    let discriminator = fields.get(DISCRIMINATOR_FIELD).and_then(Value::as_i64);
    if discriminator == Some(ITEMIZED_DISCRIMINATOR) {
        validate_items(fields, &mut resolve, &mut errors)?;
    }
    Ok(ValidationResult::from_errors(errors))
}

// ============================================================================
// SECTION: Passes
// ============================================================================

/// Conditional pass over the `ddd` sequence.
fn validate_items<E>(
    fields: &Map<String, Value>,
    resolve: &mut impl FnMut(ReferenceSet, i64) -> Result<ReferenceStatus, E>,
    errors: &mut Vec<ValidationError>,
) -> Result<(), E> {
    let Some(items) = fields.get(ITEMS_FIELD).filter(|value| !value.is_null()) else {
        errors.push(ValidationError::new(
            ITEMS_FIELD,
            format!("{ITEMS_FIELD} {ITEMS_REQUIRED_MESSAGE}"),
        ));
        return Ok(());
    };
    let Some(items) = items.as_array() else {
        errors.push(ValidationError::new(
            ITEMS_FIELD,
            format!("{ITEMS_FIELD} {ITEMS_TYPE_MESSAGE}"),
        ));
        return Ok(());
    };
    for (index, item) in items.iter().enumerate() {
        validate_item(index, item, resolve, errors)?;
    }
    Ok(())
}

/// Item pass for `ddd[index]`.
fn validate_item<E>(
    index: usize,
    item: &Value,
    resolve: &mut impl FnMut(ReferenceSet, i64) -> Result<ReferenceStatus, E>,
    errors: &mut Vec<ValidationError>,
) -> Result<(), E> {
    let path = format!("{ITEMS_FIELD}[{index}]");
    let Some(fields) = item.as_object() else {
        errors.push(ValidationError::new(path.clone(), format!("{path} {ITEM_OBJECT_MESSAGE}")));
        return Ok(());
    };
    for rule in &ITEM_RULES {
        let property = format!("{path}.{}", rule.name);
        apply_rule(rule, property, fields.get(rule.name), resolve, errors)?;
    }
    for key in fields.keys().filter(|key| !is_item_field(key)) {
        errors.push(ValidationError::new(
            format!("{path}.{key}"),
            format!("{key} {ITEM_UNKNOWN_FIELD_MESSAGE}"),
        ));
    }
    Ok(())
}

/// Evaluates one rule and records at most one violation.
fn apply_rule<E>(
    rule: &FieldRule,
    property: String,
    value: Option<&Value>,
    resolve: &mut impl FnMut(ReferenceSet, i64) -> Result<ReferenceStatus, E>,
    errors: &mut Vec<ValidationError>,
) -> Result<(), E> {
    match rule.evaluate(value) {
        RuleOutcome::Satisfied => {}
        RuleOutcome::Violated(template) => {
            errors.push(ValidationError::new(property, rule.message(template)));
        }
        RuleOutcome::Reference {
            rule: reference,
            id,
        } => {
            if resolve(reference.set, id)? == ReferenceStatus::Missing {
                errors.push(ValidationError::new(property, rule.message(reference.message)));
            }
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Payload Validator
// ============================================================================

/// Validator bound to a reference lookup strategy and an audit sink.
///
/// # Invariants
/// - Holds no per-call state; repeated calls on the same input agree.
pub struct PayloadValidator {
    /// Optional lookup strategy for reference checks.
    lookup: Option<Box<dyn ReferenceLookup + Send + Sync>>,
    /// Audit sink receiving one event per call.
    audit: Arc<dyn ValidationAuditSink>,
}

impl Default for PayloadValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl PayloadValidator {
    /// Creates a validator without lookup or audit output.
    #[must_use]
    pub fn new() -> Self {
        Self {
            lookup: None,
            audit: Arc::new(NoopAuditSink),
        }
    }

    /// Uses `lookup` for reference checks.
    #[must_use]
    pub fn with_lookup(mut self, lookup: impl ReferenceLookup + Send + Sync + 'static) -> Self {
        self.lookup = Some(Box::new(lookup));
        self
    }

    /// Sends audit events to `audit`.
    #[must_use]
    pub fn with_audit(mut self, audit: Arc<dyn ValidationAuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Returns the label of the configured lookup strategy.
    #[must_use]
    pub fn lookup_strategy(&self) -> &'static str {
        self.lookup.as_ref().map_or("none", |lookup| lookup.strategy())
    }

    /// Validates `record` and records an audit event.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] when the configured lookup fails.
    pub fn validate(&self, record: &Value) -> Result<ValidationResult, LookupError> {
        let lookup = self.lookup.as_deref().map(|lookup| lookup as &dyn ReferenceLookup);
        let result = validate(record, lookup);
        self.audit.record(&ValidationAuditEvent::new(ValidationAuditEventParams {
            outcome: match &result {
                Ok(result) if result.is_valid => ValidationOutcome::Valid,
                Ok(_) => ValidationOutcome::Invalid,
                Err(_) => ValidationOutcome::Error,
            },
            discriminator: record.get(DISCRIMINATOR_FIELD).and_then(Value::as_i64),
            item_count: record.get(ITEMS_FIELD).and_then(Value::as_array).map(Vec::len),
            properties: result
                .as_ref()
                .map(|result| result.properties().map(str::to_string).collect())
                .unwrap_or_default(),
            lookup: self.lookup_strategy(),
            failure: result.as_ref().err().map(ToString::to_string),
        }));
        result
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
