//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. Request handling never reads environment variables; the binary
//! parses them with the `*_from_env_value` helpers and builds a [`CoreConfig`].

use crate::constants::{
    BYTES_PER_KB, DEFAULT_ALLOWED_FILE_TYPES, DEFAULT_MAX_FILE_SIZE_KB, DEFAULT_STORAGE_DIR,
};
use crate::{FileManagementError, FileManagementResult};
use filedrop_types::NonEmptyText;
use std::path::{Path, PathBuf};

/// Upload acceptance rules: size limit and MIME type allow-list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoragePolicy {
    max_file_size_kb: u64,
    allowed_types: Vec<NonEmptyText>,
    verify_content_type: bool,
}

impl StoragePolicy {
    /// Create a new `StoragePolicy`.
    ///
    /// # Errors
    ///
    /// Returns `FileManagementError::InvalidConfig` if the size limit is zero or overflows when
    /// converted to bytes, or if the allow-list is empty.
    pub fn new(
        max_file_size_kb: u64,
        allowed_types: Vec<NonEmptyText>,
    ) -> FileManagementResult<Self> {
        if max_file_size_kb == 0 {
            return Err(FileManagementError::InvalidConfig(
                "max file size must be greater than 0 KB".into(),
            ));
        }
        if max_file_size_kb.checked_mul(BYTES_PER_KB).is_none() {
            return Err(FileManagementError::InvalidConfig(format!(
                "max file size of {}KB is too large",
                max_file_size_kb
            )));
        }
        if allowed_types.is_empty() {
            return Err(FileManagementError::InvalidConfig(
                "at least one allowed file type is required".into(),
            ));
        }

        Ok(Self {
            max_file_size_kb,
            allowed_types,
            verify_content_type: false,
        })
    }

    /// Enables or disables magic-byte verification of the declared type.
    pub fn with_content_verification(mut self, enabled: bool) -> Self {
        self.verify_content_type = enabled;
        self
    }

    pub fn max_file_size_kb(&self) -> u64 {
        self.max_file_size_kb
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        // Overflow ruled out in `new`.
        self.max_file_size_kb * BYTES_PER_KB
    }

    pub fn allowed_types(&self) -> &[NonEmptyText] {
        &self.allowed_types
    }

    /// Exact, case-sensitive membership test. No wildcards or prefixes.
    pub fn allows(&self, mime_type: &str) -> bool {
        self.allowed_types.iter().any(|t| t.as_str() == mime_type)
    }

    pub fn verify_content_type(&self) -> bool {
        self.verify_content_type
    }
}

impl Default for StoragePolicy {
    fn default() -> Self {
        Self {
            max_file_size_kb: DEFAULT_MAX_FILE_SIZE_KB,
            allowed_types: DEFAULT_ALLOWED_FILE_TYPES
                .iter()
                .filter_map(|t| NonEmptyText::new(t).ok())
                .collect(),
            verify_content_type: false,
        }
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    storage_dir: PathBuf,
    policy: StoragePolicy,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    pub fn new(storage_dir: PathBuf, policy: StoragePolicy) -> FileManagementResult<Self> {
        if storage_dir.as_os_str().is_empty() {
            return Err(FileManagementError::InvalidConfig(
                "storage directory cannot be empty".into(),
            ));
        }

        Ok(Self {
            storage_dir,
            policy,
        })
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    pub fn policy(&self) -> &StoragePolicy {
        &self.policy
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse the storage directory from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_STORAGE_DIR`].
pub fn storage_dir_from_env_value(value: Option<String>) -> PathBuf {
    PathBuf::from(non_blank(value).unwrap_or_else(|| DEFAULT_STORAGE_DIR.into()))
}

/// Parse the maximum file size in KB from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_MAX_FILE_SIZE_KB`].
pub fn max_file_size_kb_from_env_value(value: Option<String>) -> FileManagementResult<u64> {
    let Some(value) = non_blank(value) else {
        return Ok(DEFAULT_MAX_FILE_SIZE_KB);
    };

    let kb = value.parse::<u64>().map_err(|e| {
        FileManagementError::InvalidConfig(format!("invalid max file size '{}': {}", value, e))
    })?;

    if kb == 0 || kb.checked_mul(BYTES_PER_KB).is_none() {
        return Err(FileManagementError::InvalidConfig(format!(
            "max file size out of range: {}",
            value
        )));
    }

    Ok(kb)
}

/// Parse a comma-separated MIME type allow-list from an optional string value.
///
/// Entries are trimmed, empty entries dropped and duplicates removed (first occurrence wins).
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_ALLOWED_FILE_TYPES`].
pub fn allowed_types_from_env_value(
    value: Option<String>,
) -> FileManagementResult<Vec<NonEmptyText>> {
    let Some(value) = non_blank(value) else {
        return Ok(StoragePolicy::default().allowed_types);
    };

    let mut types: Vec<NonEmptyText> = Vec::new();
    for entry in value.split(',') {
        let Ok(mime) = NonEmptyText::new(entry) else {
            continue;
        };
        if !types.contains(&mime) {
            types.push(mime);
        }
    }

    if types.is_empty() {
        return Err(FileManagementError::InvalidConfig(format!(
            "allowed file types list has no entries: '{}'",
            value
        )));
    }

    Ok(types)
}

/// Parse the content-verification switch from an optional string value.
///
/// Accepts `true/false`, `1/0`, `yes/no`, `on/off` in any case. Unset means `false`.
pub fn verify_content_type_from_env_value(value: Option<String>) -> FileManagementResult<bool> {
    let Some(value) = non_blank(value) else {
        return Ok(false);
    };

    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(FileManagementError::InvalidConfig(format!(
            "invalid boolean for content verification: {}",
            value
        ))),
    }
}

/// Build a [`CoreConfig`] from the raw environment values.
///
/// Each value is parsed with its `*_from_env_value` helper, so unset or blank values fall back
/// to the defaults.
pub fn core_config_from_env_values(
    storage_dir: Option<String>,
    max_file_size_kb: Option<String>,
    allowed_file_types: Option<String>,
    verify_content_type: Option<String>,
) -> FileManagementResult<CoreConfig> {
    let policy = StoragePolicy::new(
        max_file_size_kb_from_env_value(max_file_size_kb)?,
        allowed_types_from_env_value(allowed_file_types)?,
    )?
    .with_content_verification(verify_content_type_from_env_value(verify_content_type)?);

    CoreConfig::new(storage_dir_from_env_value(storage_dir), policy)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types(list: &[&str]) -> Vec<NonEmptyText> {
        list.iter().map(|t| NonEmptyText::new(t).unwrap()).collect()
    }

    #[test]
    fn default_policy_matches_constants() {
        let policy = StoragePolicy::default();
        assert_eq!(policy.max_file_size_kb(), 1000);
        assert_eq!(policy.max_file_size_bytes(), 1_024_000);
        assert!(policy.allows("image/png"));
        assert!(policy.allows("application/pdf"));
        assert!(!policy.verify_content_type());
    }

    #[test]
    fn policy_membership_is_exact() {
        let policy = StoragePolicy::new(10, types(&["image/png"])).unwrap();
        assert!(policy.allows("image/png"));
        assert!(!policy.allows("image/PNG"));
        assert!(!policy.allows("image/*"));
        assert!(!policy.allows("image/png; charset=binary"));
        assert!(!policy.allows(""));
    }

    #[test]
    fn policy_rejects_zero_and_overflowing_size() {
        assert!(matches!(
            StoragePolicy::new(0, types(&["image/png"])),
            Err(FileManagementError::InvalidConfig(_))
        ));
        assert!(matches!(
            StoragePolicy::new(u64::MAX, types(&["image/png"])),
            Err(FileManagementError::InvalidConfig(_))
        ));
    }

    #[test]
    fn policy_rejects_empty_allow_list() {
        assert!(matches!(
            StoragePolicy::new(10, Vec::new()),
            Err(FileManagementError::InvalidConfig(_))
        ));
    }

    #[test]
    fn core_config_rejects_empty_storage_dir() {
        assert!(matches!(
            CoreConfig::new(PathBuf::new(), StoragePolicy::default()),
            Err(FileManagementError::InvalidConfig(_))
        ));
    }

    #[test]
    fn max_size_parsing() {
        assert_eq!(max_file_size_kb_from_env_value(None).unwrap(), 1000);
        assert_eq!(max_file_size_kb_from_env_value(Some("  ".into())).unwrap(), 1000);
        assert_eq!(max_file_size_kb_from_env_value(Some(" 250 ".into())).unwrap(), 250);
        assert!(max_file_size_kb_from_env_value(Some("0".into())).is_err());
        assert!(max_file_size_kb_from_env_value(Some("-5".into())).is_err());
        assert!(max_file_size_kb_from_env_value(Some("lots".into())).is_err());
        assert!(max_file_size_kb_from_env_value(Some(u64::MAX.to_string())).is_err());
    }

    #[test]
    fn allowed_types_parsing_trims_and_dedups() {
        let parsed =
            allowed_types_from_env_value(Some("image/png, application/pdf,,image/png ".into()))
                .unwrap();
        assert_eq!(parsed, types(&["image/png", "application/pdf"]));
    }

    #[test]
    fn allowed_types_parsing_defaults_and_rejects_empty() {
        assert_eq!(
            allowed_types_from_env_value(None).unwrap(),
            types(&["image/jpeg", "image/png", "application/pdf"])
        );
        assert!(matches!(
            allowed_types_from_env_value(Some(" , ,".into())),
            Err(FileManagementError::InvalidConfig(_))
        ));
    }

    #[test]
    fn verify_flag_parsing() {
        assert!(!verify_content_type_from_env_value(None).unwrap());
        assert!(verify_content_type_from_env_value(Some("TRUE".into())).unwrap());
        assert!(verify_content_type_from_env_value(Some("1".into())).unwrap());
        assert!(!verify_content_type_from_env_value(Some("off".into())).unwrap());
        assert!(verify_content_type_from_env_value(Some("maybe".into())).is_err());
    }

    #[test]
    fn storage_dir_parsing() {
        assert_eq!(storage_dir_from_env_value(None), PathBuf::from("storage"));
        assert_eq!(
            storage_dir_from_env_value(Some("/srv/files".into())),
            PathBuf::from("/srv/files")
        );
    }

    #[test]
    fn core_config_from_env_values_uses_defaults() {
        let cfg = core_config_from_env_values(None, None, None, None).unwrap();
        assert_eq!(cfg.storage_dir(), Path::new("storage"));
        assert_eq!(cfg.policy(), &StoragePolicy::default());
    }

    #[test]
    fn core_config_from_env_values_applies_overrides() {
        let cfg = core_config_from_env_values(
            Some("/srv/files".into()),
            Some("20".into()),
            Some("text/csv".into()),
            Some("yes".into()),
        )
        .unwrap();
        assert_eq!(cfg.policy().max_file_size_kb(), 20);
        assert!(cfg.policy().allows("text/csv"));
        assert!(!cfg.policy().allows("image/png"));
        assert!(cfg.policy().verify_content_type());
    }
}
