use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::FoodStatus;

// -- Session claims --

/// JWT claims shared between foodshare-api (issuance) and the session
/// middleware. Canonical definition lives here in foodshare-types to
/// eliminate duplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Donor/recipient email the session was minted for.
    pub sub: String,
    pub exp: usize,
}

// -- Session --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IssueSessionRequest {
    pub email: String,
}

// -- Foods --

#[derive(Debug, Deserialize)]
pub struct CreateFoodRequest {
    pub food_name: String,
    pub food_image: String,
    pub food_quantity: i64,
    pub pickup_location: String,
    pub expire_date: String,
    pub donor_email: String,
    #[serde(default)]
    pub status: FoodStatus,
}

/// Partial update of a listing's descriptive fields. `status` has no
/// field here on purpose: the only path that moves status is the
/// request workflow. Unknown keys in the body are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateFoodRequest {
    pub food_name: Option<String>,
    pub food_image: Option<String>,
    pub food_quantity: Option<i64>,
    pub pickup_location: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FoodResponse {
    pub id: Uuid,
    pub food_name: String,
    pub food_image: String,
    pub food_quantity: i64,
    pub pickup_location: String,
    pub expire_date: String,
    pub donor_email: String,
    pub status: FoodStatus,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

// -- Requests --

/// Point-in-time snapshot of the listing plus the requester's details.
/// The target item id travels in the URL, never in this body — a stray
/// `id` key is rejected at deserialization.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubmitRequestBody {
    pub food_name: String,
    pub food_image: String,
    pub food_quantity: i64,
    pub pickup_location: String,
    pub expire_date: String,
    pub donor_email: String,
    pub recipient_email: String,
    pub request_date: chrono::DateTime<chrono::Utc>,
    #[serde(default)]
    pub notes: String,
    pub status: FoodStatus,
}

/// Outcome of the status-transition write, reported back to the caller
/// as-is (matched/modified counts, plus the id when the write upserted
/// a previously unknown item).
///
/// SQLite reports one change count per statement, so `matched` and
/// `modified` are always equal here: a matched row that already held
/// the written status still counts as modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateOutcome {
    pub matched: u64,
    pub modified: u64,
    pub upserted_id: Option<String>,
}
