//! Common test fixtures: small in-memory SQLite databases with known
//! distributions, used by the integration tests and doc examples.

use crate::sources::{ExecutorResult, SqliteExecutor};

/// An `orders` table with 100 rows: integer primary key, a three-valued
/// status column, fractional amounts, and ISO dates spread over one year.
pub fn orders_database() -> ExecutorResult<SqliteExecutor> {
    let db = SqliteExecutor::open_in_memory()?;
    db.execute_batch(
        "CREATE TABLE orders (
            id INTEGER PRIMARY KEY,
            status TEXT NOT NULL,
            amount REAL,
            created_at TEXT
        );",
    )?;

    let statuses = ["pending", "shipped", "delivered"];
    let mut inserts = String::from("INSERT INTO orders (id, status, amount, created_at) VALUES ");
    for i in 0..100u32 {
        let status = statuses[(i % 3) as usize];
        let amount = 10.0 + i as f64 + 0.25;
        let month = (i % 12) + 1;
        let day = (i % 28) + 1;
        if i > 0 {
            inserts.push_str(", ");
        }
        inserts.push_str(&format!(
            "({}, '{}', {}, '2024-{:02}-{:02}')",
            i + 1,
            status,
            amount,
            month,
            day
        ));
    }
    inserts.push(';');
    db.execute_batch(&inserts)?;

    Ok(db)
}

/// A `measurements` table whose `reading` column holds the integers 1..=10.
pub fn measurements_database() -> ExecutorResult<SqliteExecutor> {
    let db = SqliteExecutor::open_in_memory()?;
    db.execute_batch(
        "CREATE TABLE measurements (reading INTEGER);
         INSERT INTO measurements (reading) VALUES
           (1), (2), (3), (4), (5), (6), (7), (8), (9), (10);",
    )?;
    Ok(db)
}

/// A `labels` table whose `tag` column holds 'a', 'a', 'b', 'c'.
pub fn labels_database() -> ExecutorResult<SqliteExecutor> {
    let db = SqliteExecutor::open_in_memory()?;
    db.execute_batch(
        "CREATE TABLE labels (tag TEXT);
         INSERT INTO labels (tag) VALUES ('a'), ('a'), ('b'), ('c');",
    )?;
    Ok(db)
}
