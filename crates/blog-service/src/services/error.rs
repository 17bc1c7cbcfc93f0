//! Service layer error types
//!
//! Provides a unified error type for all service operations.

use blog_core::{DenyReason, DomainError};
use std::fmt;
use validator::ValidationErrors;

/// Service layer error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// No principal, or the identity no longer resolves to an account
    Unauthenticated,

    /// Principal is known but the operation is refused
    Forbidden(DenyReason),

    /// Resource not found
    NotFound { resource: &'static str, id: String },

    /// Payload failed a structural check
    Validation { field: String, reason: String },

    /// Conflict (e.g., duplicate resource)
    Conflict(String),

    /// Internal error
    Internal(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthenticated => f.write_str("Authentication required"),
            Self::Forbidden(reason) => write!(f, "Forbidden: {reason}"),
            Self::NotFound { resource, id } => write!(f, "{resource} not found: {id}"),
            Self::Validation { field, reason } => {
                write!(f, "Validation error on {field}: {reason}")
            }
            Self::Conflict(msg) => write!(f, "Conflict: {msg}"),
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ServiceError {}

impl ServiceError {
    /// Create a not found error
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }

    /// Create a forbidden error
    pub fn forbidden(reason: DenyReason) -> Self {
        Self::from(reason)
    }

    /// Create a validation error
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a conflict error
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// The deny reason, for `Forbidden` errors
    pub fn deny_reason(&self) -> Option<DenyReason> {
        match self {
            Self::Forbidden(reason) => Some(*reason),
            _ => None,
        }
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Unauthenticated => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound { .. } => 404,
            Self::Validation { .. } => 400,
            Self::Conflict(_) => 409,
            Self::Internal(_) => 500,
        }
    }

    /// Get the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Forbidden(reason) => match reason {
                DenyReason::Unauthenticated => "UNAUTHENTICATED",
                DenyReason::MissingPermission(_) => "MISSING_PERMISSIONS",
                DenyReason::NotOwner => "NOT_OWNER",
                DenyReason::NotDraft => "NOT_DRAFT",
                DenyReason::SelfDemotion => "SELF_DEMOTION",
                DenyReason::SelfDeletion => "SELF_DELETION",
                DenyReason::SelfDeactivation => "SELF_DEACTIVATION",
                DenyReason::AccountInactive => "ACCOUNT_INACTIVE",
            },
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<DenyReason> for ServiceError {
    fn from(reason: DenyReason) -> Self {
        match reason {
            DenyReason::Unauthenticated => Self::Unauthenticated,
            other => Self::Forbidden(other),
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::UserNotFound(id) => Self::not_found("User", id.to_string()),
            DomainError::PostNotFound(id) => Self::not_found("Post", id),
            DomainError::CommentNotFound(id) => Self::not_found("Comment", id.to_string()),
            DomainError::ValidationError { field, reason } => Self::validation(field, reason),
            DomainError::ContentTooLong { max } => {
                Self::validation("content", format!("must be at most {max} characters"))
            }
            DomainError::EmailAlreadyExists
            | DomainError::SlugAlreadyExists(_)
            | DomainError::DuplicateReport => Self::Conflict(err.to_string()),
            DomainError::InvalidTransition { .. } => Self::Forbidden(DenyReason::NotDraft),
            DomainError::NotPostOwner(_) => Self::Forbidden(DenyReason::NotOwner),
            DomainError::DatabaseError(msg) | DomainError::InternalError(msg) => {
                Self::Internal(msg)
            }
        }
    }
}

impl From<ValidationErrors> for ServiceError {
    /// Reports the alphabetically first failing field
    fn from(errors: ValidationErrors) -> Self {
        let first = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let reason = errs.first().map_or_else(
                    || "invalid value".to_string(),
                    |e| {
                        e.message
                            .as_ref()
                            .map_or_else(|| e.code.to_string(), ToString::to_string)
                    },
                );
                (field.to_string(), reason)
            })
            .min_by(|a, b| a.0.cmp(&b.0));

        match first {
            Some((field, reason)) => Self::Validation { field, reason },
            None => Self::validation("request", "invalid request"),
        }
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
