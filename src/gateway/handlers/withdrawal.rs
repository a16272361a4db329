//! Withdrawal lifecycle handlers

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
};
use serde::{Deserialize, Serialize};

use crate::money::StrictRupiah;
use crate::withdrawal::{PayoutAccount, WithdrawalId, WithdrawalRecord};

use super::super::state::AppState;
use super::super::types::{ApiError, ApiResult, ok};
use super::helpers::resolve_actor;

// ============================================================================
// API Request/Response Types
// ============================================================================

/// API request for creating a withdrawal
#[derive(Debug, Deserialize)]
pub struct WithdrawalApiRequest {
    /// Campaign to withdraw from
    pub campaign_id: i64,
    /// Gross amount as string (whole rupiah)
    pub amount: StrictRupiah,
    /// Payout destination, tagged by method
    pub account: PayoutAccount,
}

/// API request for rejecting a withdrawal
#[derive(Debug, Deserialize)]
pub struct RejectApiRequest {
    pub reason: String,
}

/// API request for completing a withdrawal
#[derive(Debug, Deserialize)]
pub struct CompleteApiRequest {
    pub reference_number: String,
}

/// API response for withdrawal operations
#[derive(Debug, Serialize)]
pub struct WithdrawalApiResponse {
    pub withdrawal_id: String,
    pub campaign_id: i64,
    /// Gross amount as string (whole rupiah)
    pub amount: String,
    pub fee_amount: String,
    pub net_amount: String,
    /// Payout method: "bank_transfer" or "e_wallet"
    pub method: String,
    /// Current FSM state
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<i64>,
    /// Timestamps in milliseconds
    pub requested_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
}

impl From<WithdrawalRecord> for WithdrawalApiResponse {
    fn from(r: WithdrawalRecord) -> Self {
        Self {
            withdrawal_id: r.withdrawal_id.to_string(),
            campaign_id: r.campaign_id,
            amount: r.amount.to_string(),
            fee_amount: r.fee_amount.to_string(),
            net_amount: r.net_amount.to_string(),
            method: r.account.method().to_string(),
            status: r.state.to_string(),
            notes: r.notes,
            reference_number: r.reference_number,
            approved_by: r.approved_by,
            requested_at: r.requested_at.timestamp_millis(),
            approved_at: r.approved_at.map(|t| t.timestamp_millis()),
            processed_at: r.processed_at.map(|t| t.timestamp_millis()),
            completed_at: r.completed_at.map(|t| t.timestamp_millis()),
        }
    }
}

/// Parse withdrawal id from path segment (ULID format)
fn parse_id(s: &str) -> Result<WithdrawalId, ApiError> {
    s.parse()
        .map_err(|_| ApiError::bad_request("Invalid withdrawal ID format"))
}

// ============================================================================
// Handlers
// ============================================================================

/// Request a withdrawal (campaign owner)
///
/// POST /api/v1/withdrawals
#[utoipa::path(
    post,
    path = "/api/v1/withdrawals",
    request_body(content = String, description = "Withdrawal request: campaign_id, amount, account", content_type = "application/json"),
    responses(
        (status = 200, description = "Withdrawal created in PENDING state", content_type = "application/json"),
        (status = 400, description = "Invalid parameters"),
        (status = 403, description = "Actor is not the campaign owner"),
        (status = 422, description = "Insufficient funds or campaign not withdrawable")
    ),
    tag = "Withdrawal"
)]
pub async fn request_withdrawal(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<WithdrawalApiRequest>,
) -> ApiResult<WithdrawalApiResponse> {
    let actor = resolve_actor(&state, &headers).await?;

    let record = state
        .service
        .request(actor, req.campaign_id, req.amount.inner(), req.account)
        .await
        .map_err(ApiError::from)?;

    ok(record.into())
}

/// Get a withdrawal by id (campaign owner or admin)
///
/// GET /api/v1/withdrawals/{id}
#[utoipa::path(
    get,
    path = "/api/v1/withdrawals/{id}",
    params(("id" = String, Path, description = "Withdrawal ID (ULID format)")),
    responses(
        (status = 200, description = "Withdrawal record", content_type = "application/json"),
        (status = 404, description = "Withdrawal not found")
    ),
    tag = "Withdrawal"
)]
pub async fn get_withdrawal(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<WithdrawalApiResponse> {
    let actor = resolve_actor(&state, &headers).await?;
    let id = parse_id(&id)?;

    let record = state.service.get(actor, id).await.map_err(ApiError::from)?;
    ok(record.into())
}

/// Approve a pending withdrawal (admin)
///
/// POST /api/v1/withdrawals/{id}/approve
#[utoipa::path(
    post,
    path = "/api/v1/withdrawals/{id}/approve",
    params(("id" = String, Path, description = "Withdrawal ID (ULID format)")),
    responses(
        (status = 200, description = "Withdrawal approved", content_type = "application/json"),
        (status = 403, description = "Actor is not an admin"),
        (status = 409, description = "Concurrent modification"),
        (status = 422, description = "Not in PENDING state")
    ),
    tag = "Withdrawal"
)]
pub async fn approve_withdrawal(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<WithdrawalApiResponse> {
    let actor = resolve_actor(&state, &headers).await?;
    let id = parse_id(&id)?;

    let record = state
        .service
        .approve(actor, id)
        .await
        .map_err(ApiError::from)?;
    ok(record.into())
}

/// Reject a pending withdrawal with a reason (admin)
///
/// POST /api/v1/withdrawals/{id}/reject
#[utoipa::path(
    post,
    path = "/api/v1/withdrawals/{id}/reject",
    params(("id" = String, Path, description = "Withdrawal ID (ULID format)")),
    request_body(content = String, description = "Rejection reason", content_type = "application/json"),
    responses(
        (status = 200, description = "Withdrawal rejected", content_type = "application/json"),
        (status = 400, description = "Empty reason"),
        (status = 403, description = "Actor is not an admin"),
        (status = 422, description = "Not in PENDING state")
    ),
    tag = "Withdrawal"
)]
pub async fn reject_withdrawal(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<RejectApiRequest>,
) -> ApiResult<WithdrawalApiResponse> {
    let actor = resolve_actor(&state, &headers).await?;
    let id = parse_id(&id)?;

    let record = state
        .service
        .reject(actor, id, req.reason)
        .await
        .map_err(ApiError::from)?;
    ok(record.into())
}

/// Hand an approved withdrawal to the payout processor (admin)
///
/// POST /api/v1/withdrawals/{id}/process
#[utoipa::path(
    post,
    path = "/api/v1/withdrawals/{id}/process",
    params(("id" = String, Path, description = "Withdrawal ID (ULID format)")),
    responses(
        (status = 200, description = "Withdrawal processing", content_type = "application/json"),
        (status = 403, description = "Actor is not an admin"),
        (status = 422, description = "Not in APPROVED state")
    ),
    tag = "Withdrawal"
)]
pub async fn process_withdrawal(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<WithdrawalApiResponse> {
    let actor = resolve_actor(&state, &headers).await?;
    let id = parse_id(&id)?;

    let record = state
        .service
        .mark_processing(actor, id)
        .await
        .map_err(ApiError::from)?;
    ok(record.into())
}

/// Complete a processing withdrawal and settle the campaign balance (admin)
///
/// POST /api/v1/withdrawals/{id}/complete
#[utoipa::path(
    post,
    path = "/api/v1/withdrawals/{id}/complete",
    params(("id" = String, Path, description = "Withdrawal ID (ULID format)")),
    request_body(content = String, description = "Payout reference number", content_type = "application/json"),
    responses(
        (status = 200, description = "Withdrawal completed, balance debited", content_type = "application/json"),
        (status = 400, description = "Empty reference number"),
        (status = 403, description = "Actor is not an admin"),
        (status = 409, description = "Concurrent modification"),
        (status = 422, description = "Not in PROCESSING state or insufficient funds")
    ),
    tag = "Withdrawal"
)]
pub async fn complete_withdrawal(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<CompleteApiRequest>,
) -> ApiResult<WithdrawalApiResponse> {
    let actor = resolve_actor(&state, &headers).await?;
    let id = parse_id(&id)?;

    let record = state
        .service
        .complete(actor, id, req.reference_number)
        .await
        .map_err(ApiError::from)?;
    ok(record.into())
}

/// Cancel a withdrawal before processing (campaign owner)
///
/// POST /api/v1/withdrawals/{id}/cancel
#[utoipa::path(
    post,
    path = "/api/v1/withdrawals/{id}/cancel",
    params(("id" = String, Path, description = "Withdrawal ID (ULID format)")),
    responses(
        (status = 200, description = "Withdrawal cancelled", content_type = "application/json"),
        (status = 403, description = "Actor is not the campaign owner"),
        (status = 422, description = "Not cancellable from current state")
    ),
    tag = "Withdrawal"
)]
pub async fn cancel_withdrawal(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<WithdrawalApiResponse> {
    let actor = resolve_actor(&state, &headers).await?;
    let id = parse_id(&id)?;

    let record = state
        .service
        .cancel(actor, id)
        .await
        .map_err(ApiError::from)?;
    ok(record.into())
}

/// Withdrawal history for a campaign (its owner or admin)
///
/// GET /api/v1/campaigns/{id}/withdrawals
#[utoipa::path(
    get,
    path = "/api/v1/campaigns/{id}/withdrawals",
    params(("id" = i64, Path, description = "Campaign ID")),
    responses(
        (status = 200, description = "Withdrawal history, newest first", content_type = "application/json"),
        (status = 403, description = "Actor may not view this campaign"),
        (status = 404, description = "Campaign not found")
    ),
    tag = "Withdrawal"
)]
pub async fn campaign_withdrawals(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(campaign_id): Path<i64>,
) -> ApiResult<Vec<WithdrawalApiResponse>> {
    let actor = resolve_actor(&state, &headers).await?;

    let records = state
        .service
        .history(actor, campaign_id)
        .await
        .map_err(ApiError::from)?;

    ok(records.into_iter().map(Into::into).collect())
}
