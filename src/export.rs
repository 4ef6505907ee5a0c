// export.rs
use crate::domain::listing::Listing;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

pub const LISTINGS_FILE: &str = "listings.json";

/// Writes the final listings for the report renderer to pick up.
pub fn write_listings_json(listings: &[Listing], out_dir: &Path) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(out_dir)?;
    let path = out_dir.join(LISTINGS_FILE);
    let writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(writer, listings)?;
    Ok(path)
}
