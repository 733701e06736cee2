use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::{error, warn};
use uuid::Uuid;

use foodshare_db::Database;
use foodshare_db::models::FoodRow;
use foodshare_types::api::{Claims, CreateFoodRequest, FoodResponse, UpdateFoodRequest};
use foodshare_types::models::FoodStatus;

use crate::error::{ApiError, ApiResult};
use crate::session::AppState;

#[derive(Debug, Deserialize)]
pub struct FoodQuery {
    pub status: Option<FoodStatus>,
    /// `desc` sorts newest-expiring first; anything else is ascending.
    pub sort: Option<String>,
}

pub async fn create_food(
    State(state): State<AppState>,
    Json(req): Json<CreateFoodRequest>,
) -> ApiResult<impl IntoResponse> {
    let now = chrono::Utc::now().to_rfc3339();
    let row = FoodRow {
        id: Uuid::new_v4().to_string(),
        food_name: req.food_name,
        food_image: req.food_image,
        food_quantity: req.food_quantity,
        pickup_location: req.pickup_location,
        expire_date: req.expire_date,
        donor_email: req.donor_email,
        status: req.status.as_str().to_string(),
        updated_at: now.clone(),
        created_at: now,
    };

    let db = state.clone();
    let inserted = row.clone();
    run_blocking(move || {
        db.db.insert_food(&inserted)?;
        Ok(())
    })
    .await?;

    Ok((StatusCode::CREATED, Json(food_response(row))))
}

pub async fn list_foods(
    State(state): State<AppState>,
    Query(query): Query<FoodQuery>,
) -> ApiResult<impl IntoResponse> {
    let status = query.status.unwrap_or(FoodStatus::Available);
    let sort = match query.sort.as_deref() {
        Some("desc") => foodshare_db::queries::ExpirySort::Desc,
        _ => foodshare_db::queries::ExpirySort::Asc,
    };

    let db = state.clone();
    let rows = run_blocking(move || db.db.list_foods_by_status(status.as_str(), sort)).await?;

    let foods: Vec<FoodResponse> = rows.into_iter().map(food_response).collect();
    Ok(Json(foods))
}

pub async fn get_food(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let food_id = parse_food_id(&id)?;

    let db = state.clone();
    let row = run_blocking(move || db.db.get_food(&food_id.to_string()))
        .await?
        .ok_or_else(|| ApiError::NotFound("food not found".to_string()))?;

    Ok(Json(food_response(row)))
}

pub async fn update_food(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<UpdateFoodRequest>,
) -> ApiResult<impl IntoResponse> {
    let db = state.clone();
    run_blocking(move || Ok(apply_food_patch(&db.db, &id, &patch))).await??;

    Ok(Json(serde_json::json!({ "message": "food updated" })))
}

pub async fn delete_food(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let food_id = parse_food_id(&id)?;

    let db = state.clone();
    let deleted = run_blocking(move || db.db.delete_food(&food_id.to_string())).await?;

    Ok(Json(serde_json::json!({ "deleted": deleted })))
}

/// Donor-scoped listing. The email comes from the verified session
/// claims, never from a caller-supplied parameter.
pub async fn list_my_foods(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let db = state.clone();
    let rows = run_blocking(move || db.db.list_foods_by_donor(&claims.sub)).await?;

    let foods: Vec<FoodResponse> = rows.into_iter().map(food_response).collect();
    Ok(Json(foods))
}

/// Apply a descriptive-field patch. "No such food" and "nothing
/// changed" both collapse to `NotFound`.
pub fn apply_food_patch(db: &Database, raw_id: &str, patch: &UpdateFoodRequest) -> ApiResult<()> {
    let food_id = parse_food_id(raw_id)?;

    let changed = db.update_food_fields(
        &food_id.to_string(),
        patch.food_name.as_deref(),
        patch.food_image.as_deref(),
        patch.food_quantity,
        patch.pickup_location.as_deref(),
    )?;

    if changed == 0 {
        return Err(ApiError::NotFound(
            "food not found or no changes made".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn parse_food_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::InvalidId)
}

/// Run blocking DB work off the async runtime.
pub(crate) async fn run_blocking<T, F>(f: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Database(anyhow::anyhow!("task join error: {}", e))
        })?
        .map_err(ApiError::from)
}

pub(crate) fn food_response(row: FoodRow) -> FoodResponse {
    FoodResponse {
        id: row.id.parse().unwrap_or_else(|e| {
            warn!("Corrupt food id '{}': {}", row.id, e);
            Uuid::default()
        }),
        status: FoodStatus::parse(&row.status).unwrap_or_else(|| {
            warn!("Unknown status '{}' on food '{}'", row.status, row.id);
            FoodStatus::Available
        }),
        updated_at: parse_timestamp(&row.updated_at, &row.id),
        created_at: parse_timestamp(&row.created_at, &row.id),
        food_name: row.food_name,
        food_image: row.food_image,
        food_quantity: row.food_quantity,
        pickup_location: row.pickup_location,
        expire_date: row.expire_date,
        donor_email: row.donor_email,
    }
}

fn parse_timestamp(value: &str, food_id: &str) -> chrono::DateTime<chrono::Utc> {
    value
        .parse::<chrono::DateTime<chrono::Utc>>()
        .or_else(|_| {
            // SQLite column defaults are "YYYY-MM-DD HH:MM:SS" without
            // timezone. Parse as naive UTC and convert.
            chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
                .map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}' on food '{}': {}", value, food_id, e);
            chrono::DateTime::default()
        })
}
