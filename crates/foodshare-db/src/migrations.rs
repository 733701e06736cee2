use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS foods (
            id              TEXT PRIMARY KEY,
            food_name       TEXT NOT NULL DEFAULT '',
            food_image      TEXT NOT NULL DEFAULT '',
            food_quantity   INTEGER NOT NULL DEFAULT 0,
            pickup_location TEXT NOT NULL DEFAULT '',
            expire_date     TEXT NOT NULL DEFAULT '',
            donor_email     TEXT NOT NULL DEFAULT '',
            status          TEXT NOT NULL DEFAULT 'available',
            updated_at      TEXT NOT NULL DEFAULT (datetime('now')),
            created_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_foods_status
            ON foods(status, expire_date);

        CREATE INDEX IF NOT EXISTS idx_foods_donor
            ON foods(donor_email, status);

        -- No food id column here: a request is a point-in-time snapshot
        -- of the listing, not a live reference to it.
        CREATE TABLE IF NOT EXISTS requests (
            id              TEXT PRIMARY KEY,
            food_name       TEXT NOT NULL DEFAULT '',
            food_image      TEXT NOT NULL DEFAULT '',
            food_quantity   INTEGER NOT NULL DEFAULT 0,
            pickup_location TEXT NOT NULL DEFAULT '',
            expire_date     TEXT NOT NULL DEFAULT '',
            donor_email     TEXT NOT NULL DEFAULT '',
            recipient_email TEXT NOT NULL,
            request_date    TEXT NOT NULL,
            notes           TEXT NOT NULL DEFAULT '',
            status          TEXT NOT NULL,
            created_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
