// crates/folio-core/src/datetime.rs
// ============================================================================
// Module: Folio Datetime Parsing
// Description: Accepted textual forms for the `aaa` datetime field.
// Purpose: Decide whether a string names a real calendar date/time.
// Dependencies: time
// ============================================================================

//! ## Overview
//! `aaa` arrives as text. It is accepted when it parses as RFC 3339, as an
//! offset-less ISO 8601 date-time, or as a plain calendar date. Parsing is
//! calendar-aware: `2023-02-29` is rejected.

// ============================================================================
// SECTION: Imports
// ============================================================================

use time::Date;
use time::OffsetDateTime;
use time::PrimitiveDateTime;
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

// ============================================================================
// SECTION: Formats
// ============================================================================

/// Offset-less date-time layouts, most specific first.
const LOCAL_DATE_TIME_FORMATS: [&[BorrowedFormatItem<'static>]; 5] = [
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
];

/// Calendar date layout.
const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Returns true when `text` parses as a supported date or date-time.
#[must_use]
pub fn is_valid_datetime(text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() {
        return false;
    }
    if OffsetDateTime::parse(text, &Rfc3339).is_ok() {
        return true;
    }
    if LOCAL_DATE_TIME_FORMATS.iter().any(|format| PrimitiveDateTime::parse(text, format).is_ok())
    {
        return true;
    }
    Date::parse(text, DATE_FORMAT).is_ok()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
