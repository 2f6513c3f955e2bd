// crates/folio-cli/src/lib.rs
// ============================================================================
// Module: Folio CLI Library
// Description: Shared helpers for the folio command-line interface.
// Purpose: Provide the message catalog for the CLI binary and tests.
// Dependencies: Standard library.
// ============================================================================

//! ## Overview
//! This library houses the message catalog used by the `folio` binary. The
//! entry point (`src/main.rs`) routes every user-facing string through
//! [`t!`] so output stays consistent across commands.

// ============================================================================
// SECTION: Modules
// ============================================================================

/// Message catalog and formatting helpers.
pub mod i18n;
