pub mod adapter;
pub mod browser;
pub mod scripts;
pub mod sources;
mod scraper_error;

pub use adapter::SearchContext;
pub use browser::{Browser, HttpBrowser, PageScript};
pub use scraper_error::BrowseError;
pub use sources::SourceKind;
