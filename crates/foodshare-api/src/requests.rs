use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::warn;
use uuid::Uuid;

use foodshare_db::Database;
use foodshare_db::models::{FoodRow, RequestRow};
use foodshare_types::api::{FoodResponse, SubmitRequestBody, UpdateOutcome};

use crate::error::{ApiError, ApiResult};
use crate::foods::{food_response, parse_food_id, run_blocking};
use crate::session::AppState;

pub async fn submit_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<SubmitRequestBody>,
) -> ApiResult<impl IntoResponse> {
    let db = state.clone();
    let outcome = run_blocking(move || Ok(run_submit_request(&db.db, &id, &body))).await??;

    Ok(Json(outcome))
}

pub async fn list_donor_requests(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let db = state.clone();
    let rows = run_blocking(move || Ok(donor_pending_requests(&db.db, &email))).await??;

    let foods: Vec<FoodResponse> = rows.into_iter().map(food_response).collect();
    Ok(Json(foods))
}

/// The compound "recipient requests a food" effect: two ordered writes
/// with no cross-table transaction. The claim record goes in first so
/// the donor's request list can never miss a claim; a request row whose
/// status transition then fails is the accepted residue of the reverse
/// anomaly. There is no precondition on the item's current status, so
/// concurrent submits against the same food all succeed and the last
/// status write wins.
pub fn run_submit_request(
    db: &Database,
    raw_food_id: &str,
    body: &SubmitRequestBody,
) -> ApiResult<UpdateOutcome> {
    let food_id = parse_food_id(raw_food_id)?;

    let now = chrono::Utc::now().to_rfc3339();
    let row = RequestRow {
        id: Uuid::new_v4().to_string(),
        food_name: body.food_name.clone(),
        food_image: body.food_image.clone(),
        food_quantity: body.food_quantity,
        pickup_location: body.pickup_location.clone(),
        expire_date: body.expire_date.clone(),
        donor_email: body.donor_email.clone(),
        recipient_email: body.recipient_email.clone(),
        request_date: body.request_date.to_rfc3339(),
        notes: body.notes.clone(),
        status: body.status.as_str().to_string(),
        created_at: now.clone(),
    };

    db.insert_request(&row).map_err(ApiError::RequestPersistFailed)?;

    let outcome = db.set_food_status(&food_id.to_string(), body.status.as_str(), &now)?;
    if outcome.matched == 0 {
        warn!(
            "request {} recorded against unknown food {}",
            row.id, food_id
        );
    }

    Ok(outcome)
}

/// Foods of one donor with a pending claim. An empty result is a
/// user-visible "nothing pending" signal, surfaced as `NotFound` rather
/// than an empty 200.
pub fn donor_pending_requests(db: &Database, email: &str) -> ApiResult<Vec<FoodRow>> {
    let rows = db.list_requested_foods(email)?;
    if rows.is_empty() {
        return Err(ApiError::NotFound(format!(
            "no requests found for {}",
            email
        )));
    }
    Ok(rows)
}
