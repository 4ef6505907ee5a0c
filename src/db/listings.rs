use crate::domain::listing::Listing;
use crate::errors::StoreError;
use chrono::Utc;
use rusqlite::{params, Connection};

fn to_json(values: &[String]) -> Result<String, StoreError> {
    serde_json::to_string(values).map_err(|e| StoreError::DbError(e.to_string()))
}

fn from_json(text: &str) -> Vec<String> {
    serde_json::from_str(text).unwrap_or_default()
}

/// Stores a run's final listings in report order. Saving the same run twice
/// replaces the earlier rows.
pub fn save_listings(conn: &mut Connection, run_id: i64, listings: &[Listing]) -> Result<usize, StoreError> {
    let now = Utc::now().naive_utc();
    let tx = conn.transaction()?;

    tx.execute("DELETE FROM listings WHERE run_id = ?", params![run_id])?;

    for (position, listing) in listings.iter().enumerate() {
        tx.execute(
            r#"
            INSERT INTO listings (
                run_id, position, listing_url, source, description, address,
                rental_cost, purchase_cost, image_urls, local_image_paths, saved_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                run_id,
                position as i64,
                listing.listing_url,
                listing.source,
                listing.description,
                listing.address,
                listing.rental_cost,
                listing.purchase_cost,
                to_json(&listing.image_urls)?,
                to_json(&listing.local_image_paths)?,
                now,
            ],
        )?;
    }

    tx.commit()?;
    Ok(listings.len())
}

pub fn listings_for_run(conn: &Connection, run_id: i64) -> Result<Vec<Listing>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT listing_url, source, description, address, rental_cost, purchase_cost,
                image_urls, local_image_paths
         FROM listings WHERE run_id = ? ORDER BY position",
    )?;

    let rows = stmt.query_map(params![run_id], |row| {
        Ok(Listing {
            listing_url: row.get(0)?,
            source: row.get(1)?,
            description: row.get(2)?,
            address: row.get(3)?,
            rental_cost: row.get(4)?,
            purchase_cost: row.get(5)?,
            image_urls: from_json(&row.get::<_, String>(6)?),
            local_image_paths: from_json(&row.get::<_, String>(7)?),
            address_is_placeholder: false,
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
