// crates/folio-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Reference Store
// Description: Live ReferenceLookup backend using SQLite.
// Purpose: Resolve zzz/yyy entity references against a local database.
// Dependencies: folio-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed [`folio_core::ReferenceLookup`]. Each
//! reference set is a named partition of one `reference_entities` table, and
//! every lookup is an indexed point query. Unlike the allow-list strategy the
//! store always answers `Found` or `Missing`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SqliteReferenceStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
