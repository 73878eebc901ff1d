use std::path::Path;

use chrono::NaiveDate;
use rusqlite::Connection;

use crate::error::Result;
use crate::models::Dataset;
use crate::workbook;

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    user_id INTEGER NOT NULL,
    full_name TEXT NOT NULL,
    gender TEXT NOT NULL,
    birth_date TEXT,
    age INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS items (
    item_id INTEGER NOT NULL,
    item_name TEXT NOT NULL,
    category TEXT NOT NULL,
    item_tags TEXT NOT NULL,
    season TEXT NOT NULL,
    printing TEXT NOT NULL,
    price REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS transactions (
    id INTEGER PRIMARY KEY,
    transaction_id INTEGER,
    user_id INTEGER NOT NULL,
    item_id INTEGER NOT NULL,
    amount REAL NOT NULL,
    order_date TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_users_user_id ON users(user_id);
CREATE INDEX IF NOT EXISTS idx_items_item_id ON items(item_id);

CREATE VIEW IF NOT EXISTS sales AS
SELECT t.id AS id,
       u.full_name AS full_name,
       u.age AS age,
       u.gender AS gender,
       i.item_name AS item_name,
       i.category AS category,
       i.item_tags AS item_tags,
       i.season AS season,
       i.printing AS printing,
       i.price AS price,
       t.amount AS amount,
       t.order_date AS order_date,
       t.amount * i.price AS total,
       CAST(substr(t.order_date, 6, 2) AS INTEGER) AS month
FROM transactions t
JOIN users u ON u.user_id = t.user_id
JOIN items i ON i.item_id = t.item_id;
";

/// Row counts after loading a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub users: usize,
    pub items: usize,
    pub transactions: usize,
    /// Transactions that found both their user and their item.
    pub joined: usize,
}

impl LoadSummary {
    pub fn unmatched(&self) -> usize {
        self.transactions.saturating_sub(self.joined)
    }
}

pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    init_db(&conn)?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

fn iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn load_dataset(conn: &mut Connection, dataset: &Dataset) -> Result<LoadSummary> {
    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO users (user_id, full_name, gender, birth_date, age) VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for u in &dataset.users {
            stmt.execute(rusqlite::params![
                u.user_id,
                u.full_name,
                u.gender,
                u.birth_date.map(iso),
                u.age
            ])?;
        }

        let mut stmt = tx.prepare(
            "INSERT INTO items (item_id, item_name, category, item_tags, season, printing, price) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        for i in &dataset.items {
            stmt.execute(rusqlite::params![
                i.item_id,
                i.item_name,
                i.category,
                i.item_tags,
                i.season,
                i.printing,
                i.price
            ])?;
        }

        let mut stmt = tx.prepare(
            "INSERT INTO transactions (transaction_id, user_id, item_id, amount, order_date) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for t in &dataset.transactions {
            stmt.execute(rusqlite::params![
                t.transaction_id,
                t.user_id,
                t.item_id,
                t.amount,
                iso(t.order_date)
            ])?;
        }
    }
    tx.commit()?;

    let joined: i64 = conn.query_row("SELECT count(*) FROM sales", [], |r| r.get(0))?;
    let summary = LoadSummary {
        users: dataset.users.len(),
        items: dataset.items.len(),
        transactions: dataset.transactions.len(),
        joined: joined as usize,
    };
    if summary.unmatched() > 0 {
        tracing::warn!(
            unmatched = summary.unmatched(),
            "Transactions without a matching user or item were left out"
        );
    }
    tracing::debug!(?summary, "Dataset loaded");
    Ok(summary)
}

/// Read a workbook (or CSV directory) and load it into a fresh in-memory database.
pub fn open_dataset(path: &Path, as_of: NaiveDate) -> Result<(Connection, LoadSummary)> {
    let dataset = workbook::load_dataset(path, as_of)?;
    let mut conn = open_in_memory()?;
    let summary = load_dataset(&mut conn, &dataset)?;
    Ok((conn, summary))
}
