/// Database row types — these map directly to SQLite rows.
/// Distinct from foodshare-types API models to keep the DB layer independent.

#[derive(Debug, Clone)]
pub struct FoodRow {
    pub id: String,
    pub food_name: String,
    pub food_image: String,
    pub food_quantity: i64,
    pub pickup_location: String,
    pub expire_date: String,
    pub donor_email: String,
    pub status: String,
    pub updated_at: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct RequestRow {
    pub id: String,
    pub food_name: String,
    pub food_image: String,
    pub food_quantity: i64,
    pub pickup_location: String,
    pub expire_date: String,
    pub donor_email: String,
    pub recipient_email: String,
    pub request_date: String,
    pub notes: String,
    pub status: String,
    pub created_at: String,
}
