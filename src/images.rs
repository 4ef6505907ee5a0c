// images.rs
use crate::domain::listing::Listing;
use crate::scraper::browser::USER_AGENT;
use reqwest::blocking::Client;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Anything this small is a placeholder or a broken response.
const MIN_IMAGE_BYTES: usize = 1000;

pub const IMAGES_DIR: &str = "images";

pub struct ImageDownloader {
    client: Client,
}

impl ImageDownloader {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    /// Downloads every listing's images into `<out_dir>/images` and records
    /// the relative paths on the listing. A failed image is logged and skipped.
    /// Returns the number of files written.
    pub fn download_all(&self, listings: &mut [Listing], out_dir: &Path) -> std::io::Result<usize> {
        let images_dir = out_dir.join(IMAGES_DIR);
        std::fs::create_dir_all(&images_dir)?;

        let mut written = 0;
        for (listing_idx, listing) in listings.iter_mut().enumerate() {
            for (img_idx, url) in listing.image_urls.iter().enumerate() {
                let file_name = image_file_name(listing_idx + 1, img_idx + 1, url);

                let bytes = match self.fetch(url) {
                    Ok(b) => b,
                    Err(e) => {
                        debug!("Failed to download image {url}: {e}");
                        continue;
                    }
                };
                if bytes.len() <= MIN_IMAGE_BYTES {
                    debug!(size = bytes.len(), "Skipping tiny image {url}");
                    continue;
                }

                if let Err(e) = std::fs::write(images_dir.join(&file_name), &bytes) {
                    debug!("Failed to write image {file_name}: {e}");
                    continue;
                }

                debug!("Downloaded {url} -> {file_name}");
                listing.local_image_paths.push(format!("{IMAGES_DIR}/{file_name}"));
                written += 1;
            }
        }

        info!(written, "🖼️ Downloaded images to {}", images_dir.display());
        Ok(written)
    }

    fn fetch(&self, url: &str) -> Result<Vec<u8>, reqwest::Error> {
        let resp = self.client.get(url).send()?.error_for_status()?;
        Ok(resp.bytes()?.to_vec())
    }
}

/// `listing_03_img_01.png` style names, stable for a given listing order.
pub fn image_file_name(listing_no: usize, image_no: usize, url: &str) -> String {
    format!("listing_{listing_no:02}_img_{image_no:02}{}", image_extension(url))
}

pub fn image_extension(url: &str) -> &'static str {
    let lower = url.to_lowercase();
    if lower.contains(".png") {
        ".png"
    } else if lower.contains(".webp") {
        ".webp"
    } else if lower.contains(".gif") {
        ".gif"
    } else {
        ".jpg"
    }
}
