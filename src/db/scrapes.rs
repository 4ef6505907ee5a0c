use crate::errors::StoreError;
use rusqlite::{params, Connection};

#[derive(Debug)]
pub struct ScrapeRun {
    pub id: i64,
    pub region: String,
    pub started_at: i64,
    pub finished_at: Option<i64>,
    pub listings_found: Option<i64>,
    pub success: bool,
    pub error_message: Option<String>,
}

pub fn start_scrape_run(conn: &Connection, region: &str, now: i64) -> Result<i64, StoreError> {
    conn.execute(
        "INSERT INTO scrape_runs (region, started_at, success) VALUES (?, ?, 0)",
        params![region, now],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn end_scrape_run(
    conn: &Connection,
    run_id: i64,
    now: i64,
    listings: usize,
    success: bool,
    error: Option<String>,
) -> Result<(), StoreError> {
    conn.execute(
        "UPDATE scrape_runs SET finished_at = ?, listings_found = ?, success = ?, error_message = ? WHERE id = ?",
        params![now, listings as i64, success, error, run_id],
    )?;
    Ok(())
}

pub fn get_recent_scrapes(conn: &Connection, limit: usize) -> Result<Vec<ScrapeRun>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, region, started_at, finished_at, listings_found, success, error_message
         FROM scrape_runs ORDER BY started_at DESC, id DESC LIMIT ?",
    )?;

    let rows = stmt.query_map(params![limit as i64], |row| {
        Ok(ScrapeRun {
            id: row.get(0)?,
            region: row.get(1)?,
            started_at: row.get(2)?,
            finished_at: row.get(3)?,
            listings_found: row.get(4)?,
            success: row.get(5)?,
            error_message: row.get(6)?,
        })
    })?;

    let mut runs = Vec::new();
    for r in rows {
        runs.push(r?);
    }
    Ok(runs)
}
