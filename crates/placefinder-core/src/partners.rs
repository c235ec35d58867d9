use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::category::CategoryTag;
use crate::ConfigError;

/// Priority class of a curated partner venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartnerTier {
    /// Paid, verified partner.
    Premium,
    /// Secondary partner.
    Allied,
}

impl std::fmt::Display for PartnerTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PartnerTier::Premium => write!(f, "premium"),
            PartnerTier::Allied => write!(f, "allied"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerConfig {
    pub id: String,
    pub name: String,
    pub category: CategoryTag,
    pub tier: PartnerTier,
    /// City label, informational only; queries filter by distance.
    pub city: String,
    pub lat: f64,
    pub lng: f64,
    pub rating: Option<f64>,
    #[serde(default)]
    pub address: String,
    pub phone: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PartnersFile {
    pub partners: Vec<PartnerConfig>,
}

/// Load and validate the partner directory from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_partners(path: &Path) -> Result<PartnersFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::PartnersFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_partners(&content)
}

/// Parse and validate partner directory YAML already in memory.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML cannot be parsed or fails validation.
pub fn parse_partners(content: &str) -> Result<PartnersFile, ConfigError> {
    let partners_file: PartnersFile =
        serde_yaml::from_str(content).map_err(ConfigError::PartnersFileParse)?;

    validate_partners(&partners_file)?;

    Ok(partners_file)
}

fn validate_partners(partners_file: &PartnersFile) -> Result<(), ConfigError> {
    let mut seen_ids = HashSet::new();
    let mut seen_names = HashSet::new();

    for partner in &partners_file.partners {
        if partner.id.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "partner '{}' has an empty id",
                partner.name
            )));
        }

        if partner.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "partner '{}' has an empty name",
                partner.id
            )));
        }

        if !seen_ids.insert(partner.id.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate partner id: '{}'",
                partner.id
            )));
        }

        let name_key = (partner.category, partner.name.trim().to_lowercase());
        if !seen_names.insert(name_key) {
            return Err(ConfigError::Validation(format!(
                "duplicate partner name '{}' in category {}",
                partner.name, partner.category
            )));
        }

        let lat_ok = partner.lat.is_finite() && (-90.0..=90.0).contains(&partner.lat);
        let lng_ok = partner.lng.is_finite() && (-180.0..=180.0).contains(&partner.lng);
        if !lat_ok || !lng_ok {
            return Err(ConfigError::Validation(format!(
                "partner '{}' has invalid coordinates ({}, {})",
                partner.id, partner.lat, partner.lng
            )));
        }

        if let Some(rating) = partner.rating {
            if !(0.0..=5.0).contains(&rating) {
                return Err(ConfigError::Validation(format!(
                    "partner '{}' has rating {rating}; must be within 0..=5",
                    partner.id
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "partners_test.rs"]
mod tests;
