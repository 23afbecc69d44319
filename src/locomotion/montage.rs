use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

/// Section every montage starts with.
pub const DEFAULT_SECTION: &str = "Default";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MontageError {
    #[error("{0} montage is not configured")]
    Missing(&'static str),
    #[error("montage '{montage}' has no section named '{section}'")]
    MissingSection { montage: String, section: String },
    #[error("montage '{montage}' section '{section}' has non-positive length {length}")]
    InvalidSectionLength {
        montage: String,
        section: String,
        length: f32,
    },
    #[error("montage '{montage}' rate scale must be positive, got {rate_scale}")]
    InvalidRateScale { montage: String, rate_scale: f32 },
}

fn default_blend_out() -> f32 {
    0.25
}

/// Named animation montage and the lengths of its sections in seconds.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct MontageSpec {
    pub name: String,
    #[serde(default = "default_blend_out")]
    pub blend_out: f32,
    pub sections: BTreeMap<String, f32>,
}

impl MontageSpec {
    pub fn new(name: &str, sections: &[(&str, f32)]) -> Self {
        Self {
            name: name.to_string(),
            blend_out: default_blend_out(),
            sections: sections
                .iter()
                .map(|(section, length)| (section.to_string(), *length))
                .collect(),
        }
    }

    pub fn section_length(&self, section: &str) -> Result<f32, MontageError> {
        let length = *self
            .sections
            .get(section)
            .ok_or_else(|| MontageError::MissingSection {
                montage: self.name.clone(),
                section: section.to_string(),
            })?;

        if length > 0.0 {
            Ok(length)
        } else {
            Err(MontageError::InvalidSectionLength {
                montage: self.name.clone(),
                section: section.to_string(),
                length,
            })
        }
    }

    /// Section length divided by a playback rate scale.
    pub fn scaled_section_length(&self, section: &str, rate_scale: f32) -> Result<f32, MontageError> {
        if rate_scale <= 0.0 {
            return Err(MontageError::InvalidRateScale {
                montage: self.name.clone(),
                rate_scale,
            });
        }
        Ok(self.section_length(section)? / rate_scale)
    }
}

/// Montages the flight controllers play. A missing entry disables the
/// sequence that depends on it.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AnimationLibrary {
    pub divebomb: Option<MontageSpec>,
    pub takeoff: Option<MontageSpec>,
    pub hard_landing: Option<MontageSpec>,
}

impl Default for AnimationLibrary {
    fn default() -> Self {
        Self {
            divebomb: Some(MontageSpec::new(
                "Divebomb",
                &[(DEFAULT_SECTION, 1.0), ("Land", 2.4)],
            )),
            takeoff: Some(MontageSpec::new(
                "TakeOff",
                &[(DEFAULT_SECTION, 0.8), ("ChargeLoop", 1.2), ("TakeOff", 1.5)],
            )),
            hard_landing: Some(MontageSpec::new("HardLanding", &[(DEFAULT_SECTION, 1.8)])),
        }
    }
}

impl AnimationLibrary {
    /// Looks a montage up by name.
    pub fn find(&self, name: &str) -> Option<&MontageSpec> {
        [&self.divebomb, &self.takeoff, &self.hard_landing]
            .into_iter()
            .flatten()
            .find(|montage| montage.name == name)
    }

    pub fn is_hard_landing(&self, name: &str) -> bool {
        self.hard_landing
            .as_ref()
            .is_some_and(|montage| montage.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled_section_length() {
        let montage = MontageSpec::new("Divebomb", &[(DEFAULT_SECTION, 1.0), ("Land", 2.4)]);
        assert_eq!(montage.scaled_section_length("Land", 2.0), Ok(1.2));
    }

    #[test]
    fn test_find_by_name() {
        let library = AnimationLibrary::default();
        assert_eq!(library.find("TakeOff").unwrap().sections.len(), 3);
        assert!(library.find("Swim").is_none());
        assert!(library.is_hard_landing("HardLanding"));
        assert!(!library.is_hard_landing("Divebomb"));
    }

    #[test]
    fn test_missing_section_is_reported() {
        let montage = MontageSpec::new("TakeOff", &[(DEFAULT_SECTION, 0.8)]);
        assert!(matches!(
            montage.section_length("ChargeLoop"),
            Err(MontageError::MissingSection { .. })
        ));
    }

    #[test]
    fn test_non_positive_lengths_and_rates_are_rejected() {
        let montage = MontageSpec::new("TakeOff", &[(DEFAULT_SECTION, 0.0)]);
        assert!(matches!(
            montage.section_length(DEFAULT_SECTION),
            Err(MontageError::InvalidSectionLength { .. })
        ));

        let montage = MontageSpec::new("Divebomb", &[(DEFAULT_SECTION, 1.0)]);
        assert!(matches!(
            montage.scaled_section_length(DEFAULT_SECTION, 0.0),
            Err(MontageError::InvalidRateScale { .. })
        ));
    }
}
