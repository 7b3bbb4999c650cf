pub mod stock_queries;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
}

/// Create the stock summary table if it does not exist yet.
///
/// The UNIQUE constraint is what makes insert-if-absent atomic at the store
/// level; the ingest workflow relies on the resulting constraint violation
/// to detect a lost check-then-insert race.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS stock (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            ticker TEXT NOT NULL,
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            max_price REAL NOT NULL,
            min_price REAL NOT NULL,
            mean_price REAL NOT NULL,
            UNIQUE (ticker, start_date, end_date)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
