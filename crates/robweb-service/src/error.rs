// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types raised by the benchmark engine.
//!
//! The HTTP layer translates each variant into a fixed status code, so the
//! variants describe *what kind* of failure happened rather than where.

use std::fmt;

/// Result type using ServiceError
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Kind of object a lookup failed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// Workflow (benchmark) template.
    Workflow,
    /// User group (submission).
    Group,
    /// Workflow run.
    Run,
    /// Registered user.
    User,
    /// Uploaded or generated file.
    File,
    /// Password reset request.
    Request,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ObjectKind::Workflow => "workflow",
            ObjectKind::Group => "group",
            ObjectKind::Run => "run",
            ObjectKind::User => "user",
            ObjectKind::File => "file",
            ObjectKind::Request => "request",
        };
        f.write_str(name)
    }
}

/// Errors reported by a service session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ServiceError {
    /// A domain constraint was violated (duplicate name, invalid state, ...).
    #[error("{0}")]
    ConstraintViolation(String),

    /// The access token is missing, unknown or expired.
    #[error("not logged in")]
    Unauthenticated,

    /// The authenticated user may not perform the operation.
    #[error("{0}")]
    Unauthorized(String),

    /// A referenced object does not exist.
    #[error("unknown {kind} '{id}'")]
    UnknownObject {
        /// Kind of the missing object.
        kind: ObjectKind,
        /// Identifier that was looked up.
        id: String,
    },

    /// A run argument names a parameter the workflow does not declare.
    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),

    /// Unexpected engine failure.
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    /// Create an `UnknownObject` error.
    pub fn unknown(kind: ObjectKind, id: impl Into<String>) -> Self {
        ServiceError::UnknownObject {
            kind,
            id: id.into(),
        }
    }

    /// Create a `ConstraintViolation` error.
    pub fn constraint(message: impl Into<String>) -> Self {
        ServiceError::ConstraintViolation(message.into())
    }

    /// Create an `Unauthorized` error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        ServiceError::Unauthorized(message.into())
    }

    /// True if this is a lookup miss for the given object kind.
    pub fn is_unknown(&self, expected: ObjectKind) -> bool {
        matches!(self, ServiceError::UnknownObject { kind, .. } if *kind == expected)
    }
}

impl From<std::io::Error> for ServiceError {
    fn from(e: std::io::Error) -> Self {
        ServiceError::Internal(e.to_string())
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(e: serde_json::Error) -> Self {
        ServiceError::Internal(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_object_message() {
        let err = ServiceError::unknown(ObjectKind::Run, "abc");
        assert_eq!(err.to_string(), "unknown run 'abc'");
        assert!(err.is_unknown(ObjectKind::Run));
        assert!(!err.is_unknown(ObjectKind::User));
    }

    #[test]
    fn test_unauthenticated_message() {
        assert_eq!(ServiceError::Unauthenticated.to_string(), "not logged in");
    }
}
