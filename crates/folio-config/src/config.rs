// crates/folio-config/src/config.rs
// ============================================================================
// Module: Folio Configuration
// Description: Configuration loading and validation for the folio binary.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: folio-core, folio-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! The path comes from the caller, then `FOLIO_CONFIG`, then `./folio.toml`.
//! Only the last of these may be absent, in which case defaults apply: no
//! reference lookup, no audit output, and a 1 MiB payload limit.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use folio_core::AllowListLookup;
use folio_core::ReferenceSet;
use folio_store_sqlite::SqliteStoreConfig;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "folio.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "FOLIO_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default maximum payload size accepted for validation.
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 1024 * 1024;
/// Hard upper bound for `limits.max_payload_bytes`.
pub const MAX_PAYLOAD_BYTES: usize = 16 * 1024 * 1024;
/// Maximum number of ids per allow-list.
pub const MAX_ALLOW_LIST_IDS: usize = 100_000;
/// Maximum `SQLite` busy timeout in milliseconds.
const MAX_BUSY_TIMEOUT_MS: u64 = 60_000;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Folio configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FolioConfig {
    /// Reference lookup configuration.
    #[serde(default)]
    pub lookup: LookupConfig,
    /// Audit output configuration.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Input limits.
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Path the configuration was loaded from, if any.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl FolioConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path, env::var(CONFIG_ENV_VAR).ok())?;
        if !resolved.explicit && !resolved.path.exists() {
            return Ok(Self::default());
        }
        Self::load_file(&resolved.path)
    }

    /// Loads and validates the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, parsed, or
    /// validated.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        validate_path(path)?;
        let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.source = Some(path.to_path_buf());
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.lookup.validate()?;
        self.audit.validate()?;
        self.limits.validate()
    }
}

/// Reference lookup strategy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LookupMode {
    /// Skip every reference check.
    #[default]
    None,
    /// Answer from configured allow-lists.
    AllowList,
    /// Answer from a `SQLite` reference store.
    Sqlite,
}

impl LookupMode {
    /// Returns the configuration label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::AllowList => "allow_list",
            Self::Sqlite => "sqlite",
        }
    }
}

/// Reference lookup configuration.
///
/// # Invariants
/// - Exactly the section matching `mode` may be present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LookupConfig {
    /// Selected strategy.
    #[serde(default)]
    pub mode: LookupMode,
    /// Allow-list settings for [`LookupMode::AllowList`].
    #[serde(default)]
    pub allow_list: Option<AllowListConfig>,
    /// Store settings for [`LookupMode::Sqlite`].
    #[serde(default)]
    pub sqlite: Option<SqliteStoreConfig>,
}

impl LookupConfig {
    /// Validates the lookup section.
    fn validate(&self) -> Result<(), ConfigError> {
        match self.mode {
            LookupMode::None => {
                if self.allow_list.is_some() {
                    return Err(ConfigError::Invalid(
                        "lookup.mode none must not set lookup.allow_list".to_string(),
                    ));
                }
                if self.sqlite.is_some() {
                    return Err(ConfigError::Invalid(
                        "lookup.mode none must not set lookup.sqlite".to_string(),
                    ));
                }
                Ok(())
            }
            LookupMode::AllowList => {
                if self.sqlite.is_some() {
                    return Err(ConfigError::Invalid(
                        "lookup.mode allow_list must not set lookup.sqlite".to_string(),
                    ));
                }
                let Some(allow_list) = &self.allow_list else {
                    return Err(ConfigError::Invalid(
                        "lookup.mode allow_list requires lookup.allow_list".to_string(),
                    ));
                };
                allow_list.validate()
            }
            LookupMode::Sqlite => {
                if self.allow_list.is_some() {
                    return Err(ConfigError::Invalid(
                        "lookup.mode sqlite must not set lookup.allow_list".to_string(),
                    ));
                }
                let Some(sqlite) = &self.sqlite else {
                    return Err(ConfigError::Invalid(
                        "lookup.mode sqlite requires lookup.sqlite".to_string(),
                    ));
                };
                validate_sqlite(sqlite)
            }
        }
    }
}

/// Allow-list ids per reference set.
///
/// # Invariants
/// - An omitted or empty list means the set is not checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AllowListConfig {
    /// Known `Zzz` ids.
    #[serde(default)]
    pub zzz: Vec<i64>,
    /// Known `Yyy` ids.
    #[serde(default)]
    pub yyy: Vec<i64>,
}

impl AllowListConfig {
    /// Builds the in-memory lookup for these lists.
    #[must_use]
    pub fn to_lookup(&self) -> AllowListLookup {
        AllowListLookup::new()
            .with_ids(ReferenceSet::Zzz, self.zzz.iter().copied())
            .with_ids(ReferenceSet::Yyy, self.yyy.iter().copied())
    }

    /// Validates list sizes.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.zzz.is_empty() && self.yyy.is_empty() {
            return Err(ConfigError::Invalid(
                "lookup.allow_list must list zzz or yyy ids".to_string(),
            ));
        }
        for (field, ids) in [("zzz", &self.zzz), ("yyy", &self.yyy)] {
            if ids.len() > MAX_ALLOW_LIST_IDS {
                return Err(ConfigError::Invalid(format!(
                    "lookup.allow_list.{field} exceeds {MAX_ALLOW_LIST_IDS} ids"
                )));
            }
        }
        Ok(())
    }
}

/// Validates the `SQLite` lookup section.
fn validate_sqlite(config: &SqliteStoreConfig) -> Result<(), ConfigError> {
    validate_path_string("lookup.sqlite.path", &config.path.to_string_lossy())?;
    if config.busy_timeout_ms == 0 || config.busy_timeout_ms > MAX_BUSY_TIMEOUT_MS {
        return Err(ConfigError::Invalid(format!(
            "lookup.sqlite.busy_timeout_ms must be between 1 and {MAX_BUSY_TIMEOUT_MS}"
        )));
    }
    Ok(())
}

/// Audit output destinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuditMode {
    /// Discard audit events.
    #[default]
    Off,
    /// Write JSON lines to stderr.
    Stderr,
    /// Append JSON lines to `audit.path`.
    File,
}

impl AuditMode {
    /// Returns the configuration label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Stderr => "stderr",
            Self::File => "file",
        }
    }
}

/// Audit output configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Audit destination.
    #[serde(default)]
    pub mode: AuditMode,
    /// Log file path for [`AuditMode::File`].
    #[serde(default)]
    pub path: Option<String>,
}

impl AuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.mode, &self.path) {
            (AuditMode::File, Some(path)) => validate_path_string("audit.path", path),
            (AuditMode::File, None) => {
                Err(ConfigError::Invalid("audit.mode file requires audit.path".to_string()))
            }
            (_, Some(_)) => {
                Err(ConfigError::Invalid("audit.path requires audit.mode file".to_string()))
            }
            (_, None) => Ok(()),
        }
    }
}

/// Input size limits.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    /// Maximum payload size in bytes.
    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
        }
    }
}

impl LimitsConfig {
    /// Validates limit ranges.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_payload_bytes == 0 || self.max_payload_bytes > MAX_PAYLOAD_BYTES {
            return Err(ConfigError::Invalid(format!(
                "limits.max_payload_bytes must be between 1 and {MAX_PAYLOAD_BYTES}"
            )));
        }
        Ok(())
    }
}

/// Returns the default payload size limit.
const fn default_max_payload_bytes() -> usize {
    DEFAULT_MAX_PAYLOAD_BYTES
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Config path plus whether the caller or environment named it.
#[derive(Debug, PartialEq, Eq)]
struct ResolvedPath {
    /// Path to read.
    path: PathBuf,
    /// False only for the implicit default filename.
    explicit: bool,
}

/// Resolves the config path from the argument, then the environment value.
fn resolve_path(
    path: Option<&Path>,
    env_path: Option<String>,
) -> Result<ResolvedPath, ConfigError> {
    if let Some(path) = path {
        return Ok(ResolvedPath {
            path: path.to_path_buf(),
            explicit: true,
        });
    }
    if let Some(env_path) = env_path {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(ResolvedPath {
            path: PathBuf::from(env_path),
            explicit: true,
        });
    }
    Ok(ResolvedPath {
        path: PathBuf::from(DEFAULT_CONFIG_NAME),
        explicit: false,
    })
}

/// Validates the config file path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    if path.as_os_str().len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    if path.components().any(|component| component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH)
    {
        return Err(ConfigError::Invalid("config path component too long".to_string()));
    }
    Ok(())
}

/// Validates a path-valued field.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    if Path::new(trimmed)
        .components()
        .any(|component| component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH)
    {
        return Err(ConfigError::Invalid(format!("{field} path component too long")));
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions are permitted.")]

    use super::*;

    #[test]
    fn argument_wins_over_environment() {
        let resolved =
            resolve_path(Some(Path::new("a.toml")), Some("b.toml".to_string())).unwrap();
        assert_eq!(resolved, ResolvedPath {
            path: PathBuf::from("a.toml"),
            explicit: true,
        });
    }

    #[test]
    fn environment_path_is_explicit() {
        let resolved = resolve_path(None, Some("b.toml".to_string())).unwrap();
        assert!(resolved.explicit);
        assert_eq!(resolved.path, PathBuf::from("b.toml"));
    }

    #[test]
    fn default_path_is_implicit() {
        let resolved = resolve_path(None, None).unwrap();
        assert!(!resolved.explicit);
        assert_eq!(resolved.path, PathBuf::from(DEFAULT_CONFIG_NAME));
    }

    #[test]
    fn overlong_environment_path_is_rejected() {
        let err = resolve_path(None, Some("x".repeat(MAX_TOTAL_PATH_LENGTH + 1))).unwrap_err();
        assert_eq!(err, ConfigError::Invalid("config path exceeds max length".to_string()));
    }
}
