//! Organization settings loading from portfolio.toml
//!
//! This module provides functionality to load the organization-level
//! configuration: the default hourly rate applied when neither a project nor
//! a resource rate is usable, the reporting currency, and the initial
//! resource roster used to seed the database on first run.
//!
//! Configuration problems fail fast here. Bad *data* degrades inside the
//! analytics engine, but a bad config *file* is an operator error and is
//! reported before the application starts.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire portfolio.toml file
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// Organization-wide rate and currency settings
    pub organization: OrganizationSettings,
    /// Initial resource roster to seed, may be empty
    #[serde(default)]
    pub resources: Vec<ResourceSeed>,
}

/// Organization-wide analytics settings
#[derive(Debug, Clone, Deserialize)]
pub struct OrganizationSettings {
    /// Hourly rate applied when no project or resource rate is usable
    pub default_hourly_rate: f64,
    /// ISO currency code used for budgets and rates
    pub currency: String,
}

/// Configuration for a single seeded resource
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceSeed {
    /// Display name of the person
    pub name: String,
    /// Billing rate per logged hour
    pub per_hour_rate: f64,
}

/// Loads settings from a TOML file and validates them.
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
/// - The default hourly rate or a seeded rate is not a finite, non-negative
///   number
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read settings file: {e}"),
    })?;

    let settings: Settings = toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse portfolio.toml: {e}"),
    })?;

    validate_settings(&settings)?;
    Ok(settings)
}

/// Loads settings from the default location (./portfolio.toml)
pub fn load_default_settings() -> Result<Settings> {
    load_settings("portfolio.toml")
}

/// Checks loaded settings for usable values: a finite non-negative default
/// rate, a non-empty currency code, and well-formed roster seeds.
/// [`load_settings`] applies this automatically; it is exposed for callers
/// that build a [`Settings`] by other means.
pub fn validate_settings(settings: &Settings) -> Result<()> {
    let rate = settings.organization.default_hourly_rate;
    if !rate.is_finite() || rate < 0.0 {
        return Err(Error::Config {
            message: format!("Organization default hourly rate must be non-negative, got {rate}"),
        });
    }

    if settings.organization.currency.trim().is_empty() {
        return Err(Error::Config {
            message: "Organization currency cannot be empty".to_string(),
        });
    }

    for seed in &settings.resources {
        if seed.name.trim().is_empty() {
            return Err(Error::Config {
                message: "Seeded resource name cannot be empty".to_string(),
            });
        }
        if !seed.per_hour_rate.is_finite() || seed.per_hour_rate < 0.0 {
            return Err(Error::Config {
                message: format!(
                    "Seeded rate for '{}' must be non-negative, got {}",
                    seed.name, seed.per_hour_rate
                ),
            });
        }
    }

    Ok(())
}
