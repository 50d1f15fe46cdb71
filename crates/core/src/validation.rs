//! Upload validation.
//!
//! All policy decisions live here so that the storage adapter and the HTTP layer stay
//! policy-free. Checks run in a fixed order so the reported error is deterministic:
//! empty, then size, then declared type, then (optionally) sniffed type.

use crate::config::StoragePolicy;
use crate::{FileManagementError, FileManagementResult};

/// Validates an upload against `policy`.
///
/// `size` is the byte count reported by the caller; `content` is only inspected for emptiness
/// and, when the policy asks for it, for magic bytes.
///
/// # Errors
///
/// - `EmptyFile` if `size` is zero or `content` is empty
/// - `FileTooLarge` if `size` exceeds the policy limit
/// - `UnsupportedType` if the declared type is not allowed, or content verification is on and
///   the content is recognisably something else
pub fn validate_upload(
    policy: &StoragePolicy,
    content: &[u8],
    declared_mime_type: &str,
    size: u64,
) -> FileManagementResult<()> {
    if size == 0 || content.is_empty() {
        return Err(FileManagementError::EmptyFile);
    }

    if size > policy.max_file_size_bytes() {
        return Err(FileManagementError::FileTooLarge {
            max_size_kb: policy.max_file_size_kb(),
        });
    }

    if !policy.allows(declared_mime_type) {
        return Err(unsupported(policy, declared_mime_type));
    }

    if policy.verify_content_type() {
        if let Some(detected) = sniffed_type_mismatch(content, declared_mime_type) {
            tracing::warn!(
                "declared type {} does not match detected type {}",
                declared_mime_type,
                detected
            );
            return Err(unsupported(policy, declared_mime_type));
        }
    }

    Ok(())
}

/// Returns the detected MIME type when the content is recognised and differs from `declared`.
///
/// Unrecognised content returns `None`: the declared type stands.
fn sniffed_type_mismatch(content: &[u8], declared: &str) -> Option<&'static str> {
    let detected = infer::get(content)?.mime_type();
    (detected != declared).then_some(detected)
}

fn unsupported(policy: &StoragePolicy, declared: &str) -> FileManagementError {
    FileManagementError::UnsupportedType {
        declared: declared.to_owned(),
        allowed: policy
            .allowed_types()
            .iter()
            .map(|t| t.as_str().to_owned())
            .collect(),
    }
}
