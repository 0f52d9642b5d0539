//! RPC Error Types
//!
//! Maps application errors to JSON-RPC error codes.

use jsonrpsee::types::ErrorObjectOwned;
use sajilo_core::domain::DomainError;
use sajilo_core::error::AppError;

/// RPC Error Codes
pub mod code {
    pub const VALIDATION_ERROR: i32 = 4000;
    pub const NOT_FOUND: i32 = 4001;
    pub const CONFLICT: i32 = 4002;
    pub const THROTTLED: i32 = 4003;
    pub const FORBIDDEN: i32 = 4004;
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const DB_ERROR: i32 = 5001;
    pub const NOT_CONFIGURED: i32 = 5003;
}

/// Convert AppError to JSON-RPC ErrorObject
pub fn to_rpc_error(err: AppError) -> ErrorObjectOwned {
    match err {
        AppError::Validation(msg) => {
            ErrorObjectOwned::owned(code::VALIDATION_ERROR, msg, None::<()>)
        }
        AppError::NotFound(msg) => ErrorObjectOwned::owned(code::NOT_FOUND, msg, None::<()>),
        AppError::Conflict(msg) => ErrorObjectOwned::owned(code::CONFLICT, msg, None::<()>),
        AppError::InvalidState(msg) => ErrorObjectOwned::owned(code::CONFLICT, msg, None::<()>),
        AppError::Forbidden(msg) => ErrorObjectOwned::owned(code::FORBIDDEN, msg, None::<()>),
        AppError::Database(msg) => ErrorObjectOwned::owned(code::DB_ERROR, msg, None::<()>),
        AppError::Config(msg) => ErrorObjectOwned::owned(code::NOT_CONFIGURED, msg, None::<()>),
        AppError::Internal(msg) => ErrorObjectOwned::owned(code::INTERNAL_ERROR, msg, None::<()>),
        AppError::Serialization(e) => {
            ErrorObjectOwned::owned(code::VALIDATION_ERROR, e.to_string(), None::<()>)
        }
        AppError::Domain(e) => {
            let code = match &e {
                DomainError::InvalidStateTransition { .. } => code::CONFLICT,
                DomainError::RoleRequired { .. } => code::FORBIDDEN,
                DomainError::UnknownStatus(_)
                | DomainError::UnknownRole(_)
                | DomainError::ValidationError(_) => code::VALIDATION_ERROR,
            };
            ErrorObjectOwned::owned(code, e.to_string(), None::<()>)
        }
    }
}

pub fn throttled() -> ErrorObjectOwned {
    ErrorObjectOwned::owned(
        code::THROTTLED,
        "Rate limit exceeded. Please slow down.",
        None::<()>,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(to_rpc_error(AppError::not_configured()).code(), code::NOT_CONFIGURED);
        assert_eq!(
            to_rpc_error(AppError::Conflict("taken".into())).code(),
            code::CONFLICT
        );
        assert_eq!(
            to_rpc_error(AppError::Domain(DomainError::RoleRequired {
                required: "dealer".into(),
                actual: "rider".into(),
            }))
            .code(),
            code::FORBIDDEN
        );
        assert_eq!(
            to_rpc_error(AppError::Domain(DomainError::InvalidStateTransition {
                from: "available".into(),
                to: "completed".into(),
            }))
            .code(),
            code::CONFLICT
        );
    }

    #[test]
    fn test_message_is_kept() {
        let err = to_rpc_error(AppError::not_configured());
        assert_eq!(err.message(), "Database not configured");
    }
}
