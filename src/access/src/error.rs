//! Error types for role resolution and access control

use thiserror::Error;

/// Access-control errors
///
/// Expected runtime conditions (a failed lookup inside the resolver, a
/// missing permission) are encoded in return values instead. These variants
/// cover collaborator failures and configuration mistakes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccessError {
    /// Role lookup collaborator failed
    #[error("Role lookup failed: {0}")]
    LookupFailed(String),

    /// Role name not in the role vocabulary
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    /// Permission name not in the permission vocabulary
    #[error("Unknown permission: {0}")]
    UnknownPermission(String),

    /// Permission table breaks the role lattice
    #[error("Invalid permission table: {0}")]
    InvalidPermissionTable(String),

    /// Route definition rejected
    #[error("Invalid route: {0}")]
    InvalidRoute(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for access-control operations
pub type Result<T> = std::result::Result<T, AccessError>;
