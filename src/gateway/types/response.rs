//! API Response types and error codes
//!
//! - `ApiResponse<T>`: Unified response wrapper
//! - `ApiError` / `ApiResult<T>`: Handler-side error plumbing
//! - `error_codes`: Standard error code constants

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::withdrawal::WithdrawalError;

// ============================================================================
// Unified API Response Format
// ============================================================================

/// Unified API response wrapper
///
/// All API responses follow this structure:
/// - code: 0 = success, non-zero = error code
/// - msg: short message description
/// - data: actual data (success) or null (error)
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response code: 0 for success, non-zero for errors
    #[schema(example = 0)]
    pub code: i32,
    /// Response message
    #[schema(example = "ok")]
    pub msg: String,
    /// Response data (only present when code == 0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create success response
    pub fn success(data: T) -> Self {
        Self {
            code: 0,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }

    /// Create error response
    pub fn error(code: i32, msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            code,
            msg: msg.into(),
            data: None,
        }
    }
}

// ============================================================================
// Error Codes
// ============================================================================

/// Standard API error codes
pub mod error_codes {
    // Success
    pub const SUCCESS: i32 = 0;

    // Parameter errors (-1xxx)
    pub const INVALID_PARAMETER: i32 = -1001;
    pub const AMOUNT_BELOW_MINIMUM: i32 = -1002;
    pub const INVALID_PAYOUT_ACCOUNT: i32 = -1003;

    // Balance / campaign errors (-2xxx)
    pub const INSUFFICIENT_FUNDS: i32 = -2001;
    pub const CAMPAIGN_NOT_WITHDRAWABLE: i32 = -2002;

    // Concurrency errors (-3xxx)
    pub const CONFLICT: i32 = -3001;

    // Auth errors (-4xxx)
    pub const UNAUTHORIZED: i32 = -4001;
    pub const FORBIDDEN: i32 = -4003;

    // Server errors (-5xxx)
    pub const INTERNAL_ERROR: i32 = -5000;
    pub const SERVICE_UNAVAILABLE: i32 = -5001;

    // Resource / state errors (-6xxx)
    pub const WITHDRAWAL_NOT_FOUND: i32 = -6001;
    pub const CAMPAIGN_NOT_FOUND: i32 = -6002;
    pub const INVALID_STATE: i32 = -6003;
}

// ============================================================================
// Handler Error Plumbing
// ============================================================================

/// Handler-side error carrying HTTP status + numeric code + message
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: i32,
    pub msg: String,
}

/// Handler result type: success envelope or ApiError
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Wrap data in the success envelope
pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

impl ApiError {
    pub fn new(status: StatusCode, code: i32, msg: impl Into<String>) -> Self {
        Self {
            status,
            code,
            msg: msg.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error_codes::INVALID_PARAMETER, msg)
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, error_codes::UNAUTHORIZED, msg)
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, error_codes::FORBIDDEN, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            error_codes::INTERNAL_ERROR,
            msg,
        )
    }

    pub fn service_unavailable(msg: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            error_codes::SERVICE_UNAVAILABLE,
            msg,
        )
    }

    pub fn into_err<T>(self) -> ApiResult<T> {
        Err(self)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ApiResponse::<()>::error(self.code, self.msg))).into_response()
    }
}

/// Map a core error to (StatusCode, numeric code, message)
impl From<WithdrawalError> for ApiError {
    fn from(e: WithdrawalError) -> Self {
        let status = match e.http_status() {
            400 => StatusCode::BAD_REQUEST,
            403 => StatusCode::FORBIDDEN,
            404 => StatusCode::NOT_FOUND,
            409 => StatusCode::CONFLICT,
            422 => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let code = match e.code() {
            "AMOUNT_BELOW_MINIMUM" | "AMOUNT_NOT_COVERING_FEE" => {
                error_codes::AMOUNT_BELOW_MINIMUM
            }
            "INVALID_PAYOUT_ACCOUNT" => error_codes::INVALID_PAYOUT_ACCOUNT,
            "EMPTY_REASON" | "EMPTY_REFERENCE" => error_codes::INVALID_PARAMETER,
            "INSUFFICIENT_FUNDS" => error_codes::INSUFFICIENT_FUNDS,
            "CAMPAIGN_NOT_WITHDRAWABLE" => error_codes::CAMPAIGN_NOT_WITHDRAWABLE,
            "FORBIDDEN" => error_codes::FORBIDDEN,
            "INVALID_STATE" => error_codes::INVALID_STATE,
            "CONFLICT" => error_codes::CONFLICT,
            "WITHDRAWAL_NOT_FOUND" => error_codes::WITHDRAWAL_NOT_FOUND,
            "CAMPAIGN_NOT_FOUND" => error_codes::CAMPAIGN_NOT_FOUND,
            _ => error_codes::INTERNAL_ERROR,
        };

        ApiError::new(status, code, e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope() {
        let resp = ApiResponse::success(42);
        assert_eq!(resp.code, 0);
        assert_eq!(resp.msg, "ok");
        assert_eq!(resp.data, Some(42));
    }

    #[test]
    fn core_error_mapping() {
        let err: ApiError = WithdrawalError::Forbidden.into();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert_eq!(err.code, error_codes::FORBIDDEN);

        let err: ApiError = WithdrawalError::Conflict.into();
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.code, error_codes::CONFLICT);

        let err: ApiError = WithdrawalError::InsufficientFunds.into();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.code, error_codes::INSUFFICIENT_FUNDS);

        let err: ApiError = WithdrawalError::Database("boom".into()).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code, error_codes::INTERNAL_ERROR);
    }
}
