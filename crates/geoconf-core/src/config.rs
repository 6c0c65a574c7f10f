//! Scoring configuration.
//!
//! [`ScoringSettings`] is the serde image of the settings object handed to
//! [`crate::pipeline::setup`], using the camelCase keys deployments already
//! write. It is validated once into a [`ScoringConfig`], which is immutable
//! and shared by reference for every request.

use crate::error::ConfigError;
use crate::model::{ADDRESS_PARTS, PARENT};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Language sentinel that is always matched.
pub const DEFAULT_LANGUAGE: &str = "default";

/// File name looked up in the working directory during discovery.
pub const CONFIG_FILE_NAME: &str = "geoconf.toml";

// ---------------------------------------------------------------------------
// AddressPartSpec
// ---------------------------------------------------------------------------

/// How one parsed-query field is compared against a hit.
///
/// The hit value is read from `hit[parent_key][field]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressPartSpec {
    /// Parsed-query field name (`number`, `street`, ...).
    pub key: String,
    /// Hit group holding the value (`address_parts` or `parent`).
    #[serde(alias = "parent")]
    pub parent_key: String,
    /// Field inside the hit group.
    pub field: String,
    /// The hit is expected to supply this even when the query does not.
    #[serde(default, alias = "enrich")]
    pub requires_enrichment: bool,
    /// Compare by integer distance before falling back to fuzzy matching.
    #[serde(default, alias = "numeric")]
    pub is_numeric: bool,
    pub weight: f64,
}

impl AddressPartSpec {
    #[must_use]
    pub fn new(
        key: impl Into<String>,
        parent_key: impl Into<String>,
        field: impl Into<String>,
        weight: f64,
    ) -> Self {
        Self {
            key: key.into(),
            parent_key: parent_key.into(),
            field: field.into(),
            requires_enrichment: false,
            is_numeric: false,
            weight,
        }
    }

    #[must_use]
    pub const fn enriched(mut self) -> Self {
        self.requires_enrichment = true;
        self
    }

    #[must_use]
    pub const fn numeric(mut self) -> Self {
        self.is_numeric = true;
        self
    }

    fn validate(&self, index: usize) -> Result<(), ConfigError> {
        for (name, value) in [
            ("key", &self.key),
            ("parentKey", &self.parent_key),
            ("field", &self.field),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::EmptyAddressPartField { index, field: name });
            }
        }
        if ![ADDRESS_PARTS, PARENT].contains(&self.parent_key.as_str()) {
            return Err(ConfigError::UnknownHitGroup {
                key: self.key.clone(),
                group: self.parent_key.clone(),
            });
        }
        if !self.weight.is_finite() || self.weight <= 0.0 {
            return Err(ConfigError::InvalidWeight {
                key: self.key.clone(),
                weight: self.weight,
            });
        }
        Ok(())
    }
}

/// Built-in address checks, in application order with ascending weights.
#[must_use]
pub fn default_address_parts() -> Vec<AddressPartSpec> {
    vec![
        AddressPartSpec::new("number", ADDRESS_PARTS, "number", 1.0).numeric(),
        AddressPartSpec::new("street", ADDRESS_PARTS, "street", 2.0).enriched(),
        AddressPartSpec::new("postalcode", ADDRESS_PARTS, "zip", 3.0).enriched(),
        AddressPartSpec::new("state", PARENT, "region_a", 4.0).enriched(),
        AddressPartSpec::new("country", PARENT, "country_a", 5.0).enriched(),
    ]
}

// ---------------------------------------------------------------------------
// ScoringSettings
// ---------------------------------------------------------------------------

/// Raw settings as read from a config file or supplied by an embedding
/// application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringSettings {
    /// Defaults to `true` when a settings object is supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_scores: Option<bool>,
    /// Extra languages merged after the `default` sentinel.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_confidence: Option<f64>,
    /// Fraction of the best confidence used as a dynamic floor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_min_confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub localization: Option<LocalizationSettings>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizationSettings {
    /// Admin hierarchy keys probed on `hit.parent`. Unset disables admin
    /// scoring.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_admin_properties: Option<Vec<String>>,
    /// Replaces the built-in address checks entirely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_address_parts: Option<Vec<AddressPartSpec>>,
}

// ---------------------------------------------------------------------------
// ScoringConfig
// ---------------------------------------------------------------------------

/// Validated, read-only scoring configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringConfig {
    relative_scores: bool,
    languages: Vec<String>,
    min_confidence: f64,
    relative_min_confidence: Option<f64>,
    admin_properties: Option<Vec<String>>,
    address_parts: Vec<AddressPartSpec>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            relative_scores: false,
            languages: vec![DEFAULT_LANGUAGE.to_string()],
            min_confidence: 0.0,
            relative_min_confidence: None,
            admin_properties: None,
            address_parts: default_address_parts(),
        }
    }
}

impl ScoringConfig {
    /// Validate `settings` and merge them over the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an address part has an empty name, reads
    /// from a group other than `address_parts` or `parent`, has a
    /// non-positive weight, or repeats a key, or if a threshold is not a
    /// finite number.
    pub fn from_settings(settings: &ScoringSettings) -> Result<Self, ConfigError> {
        let mut config = Self {
            relative_scores: settings.relative_scores.unwrap_or(true),
            ..Self::default()
        };

        let mut seen: HashSet<String> = config.languages.iter().cloned().collect();
        for lang in &settings.languages {
            if seen.insert(lang.clone()) {
                config.languages.push(lang.clone());
            }
        }

        if let Some(min) = settings.min_confidence {
            if !min.is_finite() {
                return Err(ConfigError::NonFiniteThreshold {
                    name: "minConfidence",
                    value: min,
                });
            }
            config.min_confidence = min;
        }

        if let Some(relative) = settings.relative_min_confidence {
            if !relative.is_finite() {
                return Err(ConfigError::NonFiniteThreshold {
                    name: "relativeMinConfidence",
                    value: relative,
                });
            }
            config.relative_min_confidence = (relative != 0.0).then_some(relative);
        }

        if let Some(localization) = &settings.localization {
            if let Some(admin) = &localization.confidence_admin_properties {
                config.admin_properties = Some(admin.clone());
            }
            if let Some(parts) = &localization.confidence_address_parts {
                let mut keys = HashSet::new();
                for (index, part) in parts.iter().enumerate() {
                    part.validate(index)?;
                    if !keys.insert(part.key.as_str()) {
                        return Err(ConfigError::DuplicateAddressPart(part.key.clone()));
                    }
                }
                config.address_parts = parts.clone();
            }
        }

        debug!(
            languages = ?config.languages,
            min_confidence = config.min_confidence,
            relative_min_confidence = ?config.relative_min_confidence,
            admin_properties = ?config.admin_properties,
            address_parts = config.address_parts.len(),
            "scoring config ready"
        );

        Ok(config)
    }

    /// Whether relative engine-score factors were requested. Not currently
    /// folded into the confidence formula.
    #[must_use]
    pub const fn relative_scores(&self) -> bool {
        self.relative_scores
    }

    #[must_use]
    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    #[must_use]
    pub fn is_language_enabled(&self, lang: &str) -> bool {
        self.languages.iter().any(|l| l == lang)
    }

    #[must_use]
    pub const fn min_confidence(&self) -> f64 {
        self.min_confidence
    }

    #[must_use]
    pub const fn relative_min_confidence(&self) -> Option<f64> {
        self.relative_min_confidence
    }

    /// `None` when admin scoring is disabled.
    #[must_use]
    pub fn admin_properties(&self) -> Option<&[String]> {
        self.admin_properties.as_deref()
    }

    #[must_use]
    pub fn address_parts(&self) -> &[AddressPartSpec] {
        &self.address_parts
    }
}

impl TryFrom<&ScoringSettings> for ScoringConfig {
    type Error = ConfigError;

    fn try_from(settings: &ScoringSettings) -> Result<Self, Self::Error> {
        Self::from_settings(settings)
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Read settings from a TOML file, or JSON when the extension is `.json`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not parse.
pub fn load_settings(path: &Path) -> Result<ScoringSettings> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str::<ScoringSettings>(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    } else {
        toml::from_str::<ScoringSettings>(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }
}

/// Locate the settings file: an explicit path wins, then `geoconf.toml` in
/// `working_dir`, then `<user config dir>/geoconf/config.toml`.
#[must_use]
pub fn discover_settings_path(explicit: Option<&Path>, working_dir: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let local = working_dir.join(CONFIG_FILE_NAME);
    if local.exists() {
        return Some(local);
    }

    let user = dirs::config_dir()?.join("geoconf/config.toml");
    user.exists().then_some(user)
}

/// Load and validate the effective configuration. Without a settings file the
/// built-in defaults apply.
///
/// # Errors
///
/// Returns an error if a discovered file cannot be loaded or fails
/// validation.
pub fn resolve_config(explicit: Option<&Path>, working_dir: &Path) -> Result<ScoringConfig> {
    let Some(path) = discover_settings_path(explicit, working_dir) else {
        debug!("no settings file found, using built-in scoring defaults");
        return Ok(ScoringConfig::default());
    };

    let settings = load_settings(&path)?;
    ScoringConfig::from_settings(&settings)
        .with_context(|| format!("Invalid scoring settings in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_cover_five_address_parts_with_ascending_weights() {
        let config = ScoringConfig::default();
        let keys: Vec<&str> = config
            .address_parts()
            .iter()
            .map(|p| p.key.as_str())
            .collect();
        assert_eq!(keys, ["number", "street", "postalcode", "state", "country"]);

        let weights: Vec<f64> = config.address_parts().iter().map(|p| p.weight).collect();
        assert_eq!(weights, [1.0, 2.0, 3.0, 4.0, 5.0]);

        assert!(config.address_parts()[0].is_numeric);
        assert!(!config.address_parts()[0].requires_enrichment);
        assert!(config.address_parts()[1..].iter().all(|p| p.requires_enrichment));
        assert!(!config.relative_scores());
        assert!(config.admin_properties().is_none());
    }

    #[test]
    fn settings_object_enables_relative_scores_by_default() {
        let config = ScoringConfig::from_settings(&ScoringSettings::default()).expect("valid");
        assert!(config.relative_scores());

        let config = ScoringConfig::from_settings(&ScoringSettings {
            relative_scores: Some(false),
            ..ScoringSettings::default()
        })
        .expect("valid");
        assert!(!config.relative_scores());
    }

    #[test]
    fn languages_merge_after_default_without_duplicates() {
        let config = ScoringConfig::from_settings(&ScoringSettings {
            languages: vec!["fi".into(), "default".into(), "sv".into(), "fi".into()],
            ..ScoringSettings::default()
        })
        .expect("valid");
        assert_eq!(config.languages(), ["default", "fi", "sv"]);
        assert!(config.is_language_enabled("sv"));
        assert!(!config.is_language_enabled("en"));
    }

    #[test]
    fn zero_relative_floor_is_disabled() {
        let config = ScoringConfig::from_settings(&ScoringSettings {
            min_confidence: Some(0.3),
            relative_min_confidence: Some(0.0),
            ..ScoringSettings::default()
        })
        .expect("valid");
        assert!((config.min_confidence() - 0.3).abs() < 1e-12);
        assert_eq!(config.relative_min_confidence(), None);
    }

    #[test]
    fn rejects_non_positive_weights() {
        let settings = ScoringSettings {
            localization: Some(LocalizationSettings {
                confidence_admin_properties: None,
                confidence_address_parts: Some(vec![AddressPartSpec::new(
                    "number",
                    ADDRESS_PARTS,
                    "number",
                    0.0,
                )]),
            }),
            ..ScoringSettings::default()
        };
        assert_eq!(
            ScoringConfig::from_settings(&settings),
            Err(ConfigError::InvalidWeight {
                key: "number".into(),
                weight: 0.0
            })
        );
    }

    #[test]
    fn rejects_duplicate_and_empty_address_parts() {
        let dup = ScoringSettings {
            localization: Some(LocalizationSettings {
                confidence_admin_properties: None,
                confidence_address_parts: Some(vec![
                    AddressPartSpec::new("street", ADDRESS_PARTS, "street", 1.0),
                    AddressPartSpec::new("street", PARENT, "street", 2.0),
                ]),
            }),
            ..ScoringSettings::default()
        };
        assert_eq!(
            ScoringConfig::from_settings(&dup),
            Err(ConfigError::DuplicateAddressPart("street".into()))
        );

        let empty = ScoringSettings {
            localization: Some(LocalizationSettings {
                confidence_admin_properties: None,
                confidence_address_parts: Some(vec![AddressPartSpec::new(
                    "street", "", "street", 1.0,
                )]),
            }),
            ..ScoringSettings::default()
        };
        assert_eq!(
            ScoringConfig::from_settings(&empty),
            Err(ConfigError::EmptyAddressPartField {
                index: 0,
                field: "parentKey"
            })
        );
    }

    #[test]
    fn rejects_parts_outside_the_hit_groups() {
        let settings = ScoringSettings {
            localization: Some(LocalizationSettings {
                confidence_admin_properties: None,
                confidence_address_parts: Some(vec![
                    AddressPartSpec::new("street", ADDRESS_PARTS, "street", 2.0),
                    AddressPartSpec::new("name", "name", "default", 1.0),
                ]),
            }),
            ..ScoringSettings::default()
        };
        assert_eq!(
            ScoringConfig::from_settings(&settings),
            Err(ConfigError::UnknownHitGroup {
                key: "name".into(),
                group: "name".into(),
            })
        );
    }

    #[test]
    fn rejects_non_finite_thresholds() {
        let settings = ScoringSettings {
            min_confidence: Some(f64::NAN),
            ..ScoringSettings::default()
        };
        assert!(matches!(
            ScoringConfig::from_settings(&settings),
            Err(ConfigError::NonFiniteThreshold {
                name: "minConfidence",
                ..
            })
        ));
    }

    #[test]
    fn toml_settings_use_camel_case_keys() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            r#"
languages = ["fi", "sv"]
minConfidence = 0.4
relativeMinConfidence = 0.7

[localization]
confidenceAdminProperties = ["localadmin", "locality"]

[[localization.confidenceAddressParts]]
key = "number"
parent = "address_parts"
field = "number"
numeric = true
weight = 1

[[localization.confidenceAddressParts]]
key = "street"
parentKey = "address_parts"
field = "street"
requiresEnrichment = true
weight = 3
"#,
        )
        .expect("write config");

        let config = resolve_config(None, dir.path()).expect("config loads");
        assert_eq!(config.languages(), ["default", "fi", "sv"]);
        assert_eq!(config.relative_min_confidence(), Some(0.7));
        assert_eq!(
            config.admin_properties(),
            Some(&["localadmin".to_string(), "locality".to_string()][..])
        );
        assert_eq!(
            config.address_parts(),
            [
                AddressPartSpec::new("number", ADDRESS_PARTS, "number", 1.0).numeric(),
                AddressPartSpec::new("street", ADDRESS_PARTS, "street", 3.0).enriched(),
            ]
        );
    }

    #[test]
    fn json_settings_are_detected_by_extension() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("scoring.json");
        std::fs::write(&path, r#"{ "minConfidence": 0.25, "relativeScores": false }"#)
            .expect("write config");

        let config = resolve_config(Some(&path), dir.path()).expect("config loads");
        assert!((config.min_confidence() - 0.25).abs() < 1e-12);
        assert!(!config.relative_scores());
    }

    #[test]
    fn invalid_file_reports_its_path() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "minConfidence = \"high\"").expect("write config");

        let err = resolve_config(None, dir.path()).expect_err("parse should fail");
        assert!(format!("{err:#}").contains(CONFIG_FILE_NAME));
    }
}
