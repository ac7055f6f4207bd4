//! The static filament catalog: every SKU the tracker scrapes, in display order.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Filament material family. Carbon-fibre blends are listed separately since
/// they need hardened hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Material {
    #[serde(rename = "PLA")]
    Pla,
    #[serde(rename = "PETG")]
    Petg,
    #[serde(rename = "ABS")]
    Abs,
    #[serde(rename = "ASA")]
    Asa,
    #[serde(rename = "TPU")]
    Tpu,
    #[serde(rename = "PC")]
    Pc,
    #[serde(rename = "PA")]
    Pa,
    #[serde(rename = "PVA")]
    Pva,
    #[serde(rename = "PETG-CF")]
    PetgCf,
    #[serde(rename = "PLA-CF")]
    PlaCf,
    #[serde(rename = "PA-CF")]
    PaCf,
    #[serde(rename = "ASA-CF")]
    AsaCf,
}

impl Material {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Material::Pla => "PLA",
            Material::Petg => "PETG",
            Material::Abs => "ABS",
            Material::Asa => "ASA",
            Material::Tpu => "TPU",
            Material::Pc => "PC",
            Material::Pa => "PA",
            Material::Pva => "PVA",
            Material::PetgCf => "PETG-CF",
            Material::PlaCf => "PLA-CF",
            Material::PaCf => "PA-CF",
            Material::AsaCf => "ASA-CF",
        }
    }
}

impl std::fmt::Display for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One catalog SKU. Loaded once at startup and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub brand: String,
    pub material: Material,
    pub product: String,
    pub url: String,
    /// Net filament weight per spool, in kilograms.
    #[serde(alias = "weight_kg")]
    pub weight_kg: f64,
    /// Informational only: the material wears standard brass/stainless nozzles.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub abrasive: bool,
}

#[derive(Debug, Deserialize)]
pub struct CatalogFile {
    pub products: Vec<CatalogEntry>,
}

/// Load and validate the catalog from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_catalog(path: &Path) -> Result<Vec<CatalogEntry>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CatalogFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_catalog(&content)
}

/// Parse and validate catalog YAML already in memory.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_catalog(content: &str) -> Result<Vec<CatalogEntry>, ConfigError> {
    let catalog_file: CatalogFile = serde_yaml::from_str(content)?;
    validate_catalog(&catalog_file.products)?;
    Ok(catalog_file.products)
}

fn validate_catalog(entries: &[CatalogEntry]) -> Result<(), ConfigError> {
    let mut seen_urls = HashSet::new();

    for entry in entries {
        if entry.brand.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "entry with url '{}' has an empty brand",
                entry.url
            )));
        }

        if entry.product.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "entry with url '{}' has an empty product name",
                entry.url
            )));
        }

        if !(entry.url.starts_with("https://") || entry.url.starts_with("http://")) {
            return Err(ConfigError::Validation(format!(
                "product '{} {}' has non-http url '{}'",
                entry.brand, entry.product, entry.url
            )));
        }

        if !entry.weight_kg.is_finite() || entry.weight_kg <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "product '{} {}' has invalid weight {}; must be a positive number of kg",
                entry.brand, entry.product, entry.weight_kg
            )));
        }

        if !seen_urls.insert(entry.url.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate product url: '{}'",
                entry.url
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
