pub mod classify;
pub mod listing;
pub mod listing_set;
pub mod normalize;
pub mod patterns;
