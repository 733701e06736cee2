use crate::Database;
use crate::models::{FoodRow, RequestRow};
use anyhow::Result;
use foodshare_types::api::UpdateOutcome;
use rusqlite::{Connection, OptionalExtension, params};

/// Sort direction for expiry-ordered listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpirySort {
    Asc,
    Desc,
}

impl ExpirySort {
    fn as_sql(self) -> &'static str {
        match self {
            ExpirySort::Asc => "ASC",
            ExpirySort::Desc => "DESC",
        }
    }
}

impl Database {
    // -- Foods --

    pub fn insert_food(&self, row: &FoodRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO foods (id, food_name, food_image, food_quantity, pickup_location,
                                    expire_date, donor_email, status, updated_at, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    row.id,
                    row.food_name,
                    row.food_image,
                    row.food_quantity,
                    row.pickup_location,
                    row.expire_date,
                    row.donor_email,
                    row.status,
                    row.updated_at,
                    row.created_at,
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_food(&self, id: &str) -> Result<Option<FoodRow>> {
        self.with_conn(|conn| query_food(conn, id))
    }

    pub fn list_foods_by_status(&self, status: &str, sort: ExpirySort) -> Result<Vec<FoodRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT id, food_name, food_image, food_quantity, pickup_location,
                        expire_date, donor_email, status, updated_at, created_at
                 FROM foods WHERE status = ?1
                 ORDER BY expire_date {}",
                sort.as_sql()
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([status], food_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn list_foods_by_donor(&self, donor_email: &str) -> Result<Vec<FoodRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, food_name, food_image, food_quantity, pickup_location,
                        expire_date, donor_email, status, updated_at, created_at
                 FROM foods WHERE donor_email = ?1
                 ORDER BY created_at DESC",
            )?;
            let rows = stmt
                .query_map([donor_email], food_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Foods a given donor currently has pending claims against.
    pub fn list_requested_foods(&self, donor_email: &str) -> Result<Vec<FoodRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, food_name, food_image, food_quantity, pickup_location,
                        expire_date, donor_email, status, updated_at, created_at
                 FROM foods WHERE donor_email = ?1 AND status = 'requested'
                 ORDER BY updated_at DESC",
            )?;
            let rows = stmt
                .query_map([donor_email], food_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Partial update of the descriptive columns. `status` is not
    /// reachable through this path. Returns the number of rows changed;
    /// an empty patch changes nothing.
    pub fn update_food_fields(
        &self,
        id: &str,
        food_name: Option<&str>,
        food_image: Option<&str>,
        food_quantity: Option<i64>,
        pickup_location: Option<&str>,
    ) -> Result<usize> {
        self.with_conn(|conn| {
            let mut sets: Vec<String> = Vec::new();
            let mut values: Vec<&dyn rusqlite::types::ToSql> = Vec::new();

            if let Some(ref v) = food_name {
                values.push(v);
                sets.push(format!("food_name = ?{}", values.len()));
            }
            if let Some(ref v) = food_image {
                values.push(v);
                sets.push(format!("food_image = ?{}", values.len()));
            }
            if let Some(ref v) = food_quantity {
                values.push(v);
                sets.push(format!("food_quantity = ?{}", values.len()));
            }
            if let Some(ref v) = pickup_location {
                values.push(v);
                sets.push(format!("pickup_location = ?{}", values.len()));
            }

            if sets.is_empty() {
                return Ok(0);
            }

            values.push(&id);
            let sql = format!(
                "UPDATE foods SET {} WHERE id = ?{}",
                sets.join(", "),
                values.len()
            );
            let changed = conn.execute(&sql, values.as_slice())?;
            Ok(changed)
        })
    }

    /// The one write path for `status`. Updates the row if it exists;
    /// an unknown id gets a stub row carrying only the transition
    /// (upsert), reported via `upserted_id`.
    pub fn set_food_status(&self, id: &str, status: &str, updated_at: &str) -> Result<UpdateOutcome> {
        self.with_conn(|conn| {
            let matched = conn.execute(
                "UPDATE foods SET status = ?2, updated_at = ?3 WHERE id = ?1",
                params![id, status, updated_at],
            )?;
            if matched > 0 {
                return Ok(UpdateOutcome {
                    matched: matched as u64,
                    modified: matched as u64,
                    upserted_id: None,
                });
            }

            conn.execute(
                "INSERT INTO foods (id, status, updated_at) VALUES (?1, ?2, ?3)",
                params![id, status, updated_at],
            )?;
            Ok(UpdateOutcome {
                matched: 0,
                modified: 0,
                upserted_id: Some(id.to_string()),
            })
        })
    }

    pub fn delete_food(&self, id: &str) -> Result<usize> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM foods WHERE id = ?1", [id])?;
            Ok(deleted)
        })
    }

    // -- Requests --

    pub fn insert_request(&self, row: &RequestRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO requests (id, food_name, food_image, food_quantity, pickup_location,
                                       expire_date, donor_email, recipient_email, request_date,
                                       notes, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    row.id,
                    row.food_name,
                    row.food_image,
                    row.food_quantity,
                    row.pickup_location,
                    row.expire_date,
                    row.donor_email,
                    row.recipient_email,
                    row.request_date,
                    row.notes,
                    row.status,
                    row.created_at,
                ],
            )?;
            Ok(())
        })
    }

}

fn query_food(conn: &Connection, id: &str) -> Result<Option<FoodRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, food_name, food_image, food_quantity, pickup_location,
                expire_date, donor_email, status, updated_at, created_at
         FROM foods WHERE id = ?1",
    )?;

    let row = stmt.query_row([id], food_from_row).optional()?;
    Ok(row)
}

fn food_from_row(row: &rusqlite::Row) -> rusqlite::Result<FoodRow> {
    Ok(FoodRow {
        id: row.get(0)?,
        food_name: row.get(1)?,
        food_image: row.get(2)?,
        food_quantity: row.get(3)?,
        pickup_location: row.get(4)?,
        expire_date: row.get(5)?,
        donor_email: row.get(6)?,
        status: row.get(7)?,
        updated_at: row.get(8)?,
        created_at: row.get(9)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn food(id: &str, donor: &str, status: &str) -> FoodRow {
        FoodRow {
            id: id.to_string(),
            food_name: "Sourdough loaf".to_string(),
            food_image: "https://img.example/loaf.jpg".to_string(),
            food_quantity: 2,
            pickup_location: "Marktplatz 4".to_string(),
            expire_date: "2026-09-15".to_string(),
            donor_email: donor.to_string(),
            status: status.to_string(),
            updated_at: "2026-08-28T10:00:00+00:00".to_string(),
            created_at: "2026-08-28T10:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn insert_and_get_food() {
        let db = Database::open_in_memory().unwrap();
        db.insert_food(&food("f1", "d@x.com", "available")).unwrap();

        let got = db.get_food("f1").unwrap().unwrap();
        assert_eq!(got.food_name, "Sourdough loaf");
        assert_eq!(got.status, "available");

        assert!(db.get_food("missing").unwrap().is_none());
    }

    #[test]
    fn set_food_status_updates_existing_row() {
        let db = Database::open_in_memory().unwrap();
        db.insert_food(&food("f1", "d@x.com", "available")).unwrap();

        let outcome = db
            .set_food_status("f1", "requested", "2026-08-28T12:00:00+00:00")
            .unwrap();
        assert_eq!(outcome.matched, 1);
        assert_eq!(outcome.modified, 1);
        assert!(outcome.upserted_id.is_none());

        let got = db.get_food("f1").unwrap().unwrap();
        assert_eq!(got.status, "requested");
        assert_eq!(got.updated_at, "2026-08-28T12:00:00+00:00");
        // Descriptive fields are untouched by the transition.
        assert_eq!(got.food_name, "Sourdough loaf");
    }

    #[test]
    fn set_food_status_upserts_unknown_id() {
        let db = Database::open_in_memory().unwrap();

        let outcome = db
            .set_food_status("ghost", "requested", "2026-08-28T12:00:00+00:00")
            .unwrap();
        assert_eq!(outcome.matched, 0);
        assert_eq!(outcome.modified, 0);
        assert_eq!(outcome.upserted_id.as_deref(), Some("ghost"));

        let stub = db.get_food("ghost").unwrap().unwrap();
        assert_eq!(stub.status, "requested");
        assert_eq!(stub.food_name, "");
    }

    #[test]
    fn set_food_status_counts_a_same_value_write_as_modified() {
        let db = Database::open_in_memory().unwrap();
        db.insert_food(&food("f1", "d@x.com", "requested")).unwrap();

        // SQLite counts every matched row as changed, even when the
        // stored value is already the one being written.
        let outcome = db
            .set_food_status("f1", "requested", "2026-08-28T13:00:00+00:00")
            .unwrap();
        assert_eq!(outcome.matched, 1);
        assert_eq!(outcome.modified, 1);
    }

    #[test]
    fn update_food_fields_is_partial_and_never_touches_status() {
        let db = Database::open_in_memory().unwrap();
        db.insert_food(&food("f1", "d@x.com", "requested")).unwrap();

        let changed = db
            .update_food_fields("f1", Some("Rye loaf"), None, None, None)
            .unwrap();
        assert_eq!(changed, 1);

        let got = db.get_food("f1").unwrap().unwrap();
        assert_eq!(got.food_name, "Rye loaf");
        assert_eq!(got.food_quantity, 2);
        assert_eq!(got.status, "requested");
    }

    #[test]
    fn update_food_fields_unknown_id_changes_nothing() {
        let db = Database::open_in_memory().unwrap();
        let changed = db
            .update_food_fields("missing", Some("Rye loaf"), None, Some(5), None)
            .unwrap();
        assert_eq!(changed, 0);
    }

    #[test]
    fn update_food_fields_empty_patch_is_a_noop() {
        let db = Database::open_in_memory().unwrap();
        db.insert_food(&food("f1", "d@x.com", "available")).unwrap();
        let changed = db.update_food_fields("f1", None, None, None, None).unwrap();
        assert_eq!(changed, 0);
    }

    #[test]
    fn list_requested_foods_filters_by_donor_and_status() {
        let db = Database::open_in_memory().unwrap();
        db.insert_food(&food("f1", "d@x.com", "requested")).unwrap();
        db.insert_food(&food("f2", "d@x.com", "available")).unwrap();
        db.insert_food(&food("f3", "other@x.com", "requested")).unwrap();

        let rows = db.list_requested_foods("d@x.com").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "f1");

        assert!(db.list_requested_foods("nobody@x.com").unwrap().is_empty());
    }

    #[test]
    fn list_foods_by_status_sorts_by_expiry() {
        let db = Database::open_in_memory().unwrap();
        let mut early = food("f1", "d@x.com", "available");
        early.expire_date = "2026-09-01".to_string();
        let mut late = food("f2", "d@x.com", "available");
        late.expire_date = "2026-10-01".to_string();
        db.insert_food(&late).unwrap();
        db.insert_food(&early).unwrap();

        let asc = db.list_foods_by_status("available", ExpirySort::Asc).unwrap();
        assert_eq!(asc[0].id, "f1");

        let desc = db.list_foods_by_status("available", ExpirySort::Desc).unwrap();
        assert_eq!(desc[0].id, "f2");
    }

    #[test]
    fn delete_food_reports_rows_removed() {
        let db = Database::open_in_memory().unwrap();
        db.insert_food(&food("f1", "d@x.com", "available")).unwrap();
        assert_eq!(db.delete_food("f1").unwrap(), 1);
        assert_eq!(db.delete_food("f1").unwrap(), 0);
    }
}
