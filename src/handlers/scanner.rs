use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::auth::StaffUser;
use crate::services::redemption::{self, RedemptionOutcome};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{error as error_response, success};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    #[serde(default)]
    pub qr_code: Option<String>,
}

/// POST /api/scanner/validate — the scan path. Exactly one concurrent scan of
/// a code succeeds; the rest learn who beat them and when.
pub async fn validate_ticket(
    State(state): State<AppState>,
    StaffUser(scanner): StaffUser,
    Json(request): Json<ValidateRequest>,
) -> Result<Response, AppError> {
    let qr_code = request
        .qr_code
        .as_deref()
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .ok_or_else(|| AppError::ValidationError("QR code required".to_string()))?;

    let outcome = redemption::redeem(&state.pool, qr_code, &scanner).await?;

    let response = match outcome {
        RedemptionOutcome::Accepted(ticket) => success(
            json!({ "valid": true, "ticket": ticket }),
            "Ticket validated successfully",
        )
        .into_response(),
        RedemptionOutcome::AlreadyUsed {
            ticket,
            previous_check_in,
            scanned_by,
        } => error_response(
            "CONFLICT",
            "Ticket already used",
            Some(json!({
                "valid": false,
                "ticket": ticket,
                "previousCheckIn": previous_check_in,
                "scannedBy": scanned_by,
            })),
            StatusCode::CONFLICT,
        ),
        RedemptionOutcome::Cancelled { ticket } => error_response(
            "CONFLICT",
            "Ticket has been cancelled",
            Some(json!({ "valid": false, "ticket": ticket })),
            StatusCode::CONFLICT,
        ),
        RedemptionOutcome::NotFound => error_response(
            "NOT_FOUND",
            "Invalid ticket",
            Some(json!({ "valid": false })),
            StatusCode::NOT_FOUND,
        ),
    };

    Ok(response)
}

/// GET /api/scanner/history — this scanner's recent check-ins.
pub async fn get_scan_history(
    State(state): State<AppState>,
    StaffUser(scanner): StaffUser,
) -> Result<Response, AppError> {
    let history = redemption::scan_history(&state.pool, scanner.id).await?;

    Ok(success(json!({ "history": history }), "Scan history").into_response())
}

/// GET /api/scanner/stats
pub async fn get_scanner_stats(
    State(state): State<AppState>,
    StaffUser(scanner): StaffUser,
) -> Result<Response, AppError> {
    let stats = redemption::scanner_stats(&state.pool, scanner.id).await?;

    Ok(success(stats, "Scanner statistics").into_response())
}

/// GET /api/scanner/lookup/:ticket_number
pub async fn lookup_ticket(
    State(state): State<AppState>,
    StaffUser(_scanner): StaffUser,
    Path(ticket_number): Path<String>,
) -> Result<Response, AppError> {
    let ticket = redemption::lookup(&state.pool, &ticket_number)
        .await?
        .ok_or_else(|| AppError::NotFound("Ticket not found".to_string()))?;

    Ok(success(json!({ "ticket": ticket }), "Ticket found").into_response())
}
