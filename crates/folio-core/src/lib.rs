// crates/folio-core/src/lib.rs
// ============================================================================
// Module: Folio Core Library
// Description: Public API surface for the Folio payload validator.
// Purpose: Expose the rule table, validator, reference lookups, and audit sinks.
// Dependencies: crate::{audit, datetime, lookup, record, schema, validator}
// ============================================================================

//! ## Overview
//! Folio core validates untyped catalog payloads against a fixed base schema
//! and a conditional item schema selected by the `ccc` discriminator. It is
//! stateless and backend-agnostic: entity-existence checks go through the
//! [`ReferenceLookup`] interface, and every data problem is reported as a
//! [`ValidationError`] entry rather than a Rust error.
//!
//! Security posture: payloads are untrusted; audit events carry property
//! paths only, never field values.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod datetime;
pub mod lookup;
pub mod record;
pub mod schema;
pub mod validator;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use audit::ValidationAuditEvent;
pub use audit::ValidationAuditSink;
pub use audit::ValidationOutcome;
pub use lookup::AllowListLookup;
pub use lookup::AllowLists;
pub use lookup::LookupError;
pub use lookup::ReferenceCheckError;
pub use lookup::ReferenceConstraint;
pub use lookup::ReferenceLookup;
pub use lookup::ReferenceSet;
pub use lookup::ReferenceStatus;
pub use record::InputRecord;
pub use record::ItemRecord;
pub use record::RecordError;
pub use validator::PayloadValidator;
pub use validator::ValidationError;
pub use validator::ValidationResult;
pub use validator::validate;
pub use validator::validate_structure;
