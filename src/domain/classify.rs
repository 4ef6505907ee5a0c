// src/domain/classify.rs

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

const DEFAULT_POLICY: &str = include_str!("../../config/classifier_policy.json");

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("Failed to read policy {path}: {msg}")]
    Read { path: String, msg: String },

    #[error("Invalid policy: {0}")]
    Parse(String),
}

/// Keyword lists that gate which candidates become listings.
///
/// The lists are hand-tuned against what the sources actually return. They are
/// not exhaustive, and an unsuitable keyword can overlap an office override
/// term; the blocklist is checked first.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierPolicy {
    pub residential_url_paths: Vec<String>,
    pub residential_keywords: Vec<String>,
    pub min_title_len: usize,
    pub unsuitable_keywords: Vec<String>,
    pub office_keyword: String,
    pub office_overrides: Vec<String>,
}

impl ClassifierPolicy {
    /// The policy compiled into the binary.
    pub fn embedded() -> Result<Self, PolicyError> {
        Self::from_json(DEFAULT_POLICY)
    }

    /// Reads an override file, or falls back to the embedded policy.
    pub fn load(path: Option<&Path>) -> Result<Self, PolicyError> {
        match path {
            Some(p) => Self::from_file(p),
            None => Self::embedded(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, PolicyError> {
        serde_json::from_str(json).map_err(|e| PolicyError::Parse(e.to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self, PolicyError> {
        let json = std::fs::read_to_string(path).map_err(|e| PolicyError::Read {
            path: path.display().to_string(),
            msg: e.to_string(),
        })?;
        Self::from_json(&json)
    }

    /// True when the listing looks residential: either the URL sits under a
    /// residential category path or the title names a residential unit.
    pub fn is_residential(&self, title: &str, url: &str) -> bool {
        let lower_url = url.to_lowercase();
        if self
            .residential_url_paths
            .iter()
            .any(|p| lower_url.contains(p.as_str()))
        {
            return true;
        }

        let lower = title.to_lowercase();
        self.residential_keywords
            .iter()
            .any(|k| lower.contains(k.as_str()))
    }

    /// True when the title describes space that could work as a studio.
    ///
    /// Anything commercial is accepted unless it is too short to mean
    /// anything, names a business type on the blocklist, or is a plain office
    /// with no studio/warehouse/creative context.
    pub fn is_suitable(&self, title: &str) -> bool {
        let lower = title.to_lowercase();

        if lower.trim().chars().count() < self.min_title_len {
            return false;
        }

        if self
            .unsuitable_keywords
            .iter()
            .any(|k| lower.contains(k.as_str()))
        {
            return false;
        }

        if !self.office_keyword.is_empty()
            && lower.contains(self.office_keyword.as_str())
            && !self
                .office_overrides
                .iter()
                .any(|k| lower.contains(k.as_str()))
        {
            return false;
        }

        true
    }
}
