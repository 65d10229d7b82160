use libsql::Connection;

use crate::error::Result;

pub async fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Dining records: the recommender's training data
        CREATE TABLE IF NOT EXISTS dining_records (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL,
            meal_type TEXT,
            mood INTEGER NOT NULL,
            weather INTEGER NOT NULL,
            is_work INTEGER NOT NULL,
            food_name TEXT NOT NULL,
            restaurant_name TEXT NOT NULL,
            lat REAL,
            lng REAL
        );

        CREATE INDEX IF NOT EXISTS idx_dining_records_date ON dining_records(date);

        -- Deals cache: wholly replaced on every refresh cycle
        CREATE TABLE IF NOT EXISTS deals_cache (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            chain_name TEXT NOT NULL,
            title TEXT NOT NULL,
            link TEXT NOT NULL,
            source TEXT NOT NULL,
            fetched_date TEXT NOT NULL
        );
        "#,
    )
    .await?;

    migrate_dining_records_columns(conn).await?;

    Ok(())
}

/// Additive migration for databases created before `meal_type` and the
/// `lat`/`lng` coordinates existed. Existing rows keep their data and read
/// back NULL for the new columns.
async fn migrate_dining_records_columns(conn: &Connection) -> Result<()> {
    for (column, definition) in [
        ("meal_type", "meal_type TEXT"),
        ("lat", "lat REAL"),
        ("lng", "lng REAL"),
    ] {
        if !column_exists(conn, "dining_records", column).await? {
            tracing::info!("Migrating dining_records table: adding {column} column");
            conn.execute(
                &format!("ALTER TABLE dining_records ADD COLUMN {definition}"),
                (),
            )
            .await?;
            tracing::info!("Migration complete: {column} column added");
        }
    }

    Ok(())
}

async fn column_exists(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let exists = conn
        .query(
            &format!("SELECT COUNT(*) FROM pragma_table_info('{table}') WHERE name='{column}'"),
            (),
        )
        .await?
        .next()
        .await?
        .map(|row| row.get::<i64>(0).unwrap_or(0) > 0)
        .unwrap_or(false);

    Ok(exists)
}
