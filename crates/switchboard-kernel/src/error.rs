//! Folding internal errors into the wire taxonomy.

use switchboard_audit::AuditError;
use switchboard_core::ApiError;
use switchboard_effectors::EffectorError;
use switchboard_storage::StorageError;

pub(crate) fn map_storage(e: StorageError) -> ApiError {
    match e {
        StorageError::Conflict(msg) => ApiError::conflict(msg),
        StorageError::NotFound(msg) => ApiError::not_found(msg),
        other => ApiError::internal(other.to_string()),
    }
}

pub(crate) fn map_audit(e: AuditError) -> ApiError {
    ApiError::internal(e.to_string())
}

pub(crate) fn map_effector(e: EffectorError) -> ApiError {
    match e {
        EffectorError::Validation(msg) => ApiError::validation(msg),
        other => ApiError::internal(other.to_string()),
    }
}
