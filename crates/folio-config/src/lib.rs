// crates/folio-config/src/lib.rs
// ============================================================================
// Module: Folio Config Library
// Description: Canonical config model and validation for folio.toml.
// Purpose: Single source of truth for lookup, audit, and limit settings.
// Dependencies: folio-core, folio-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! `folio-config` defines the configuration model for the `folio` binary.
//! Loading is strict: unknown keys, inconsistent lookup sections, and
//! out-of-range limits are rejected instead of defaulted.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
