//! Named configuration presets.

use crate::{ConfigError, QuerentConfig};

pub const PRESET_NAMES: [&str; 3] = ["default", "minimal", "enhanced"];

impl QuerentConfig {
    /// Default configuration adjusted by a named preset.
    pub fn preset(name: &str) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_preset(name)?;
        Ok(config)
    }

    /// Adjust this configuration in place.
    ///
    /// - `default` leaves it unchanged
    /// - `minimal` turns off spelling corrections and abbreviation expansion
    /// - `enhanced` adds extra spelling corrections
    pub fn apply_preset(&mut self, name: &str) -> Result<(), ConfigError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "default" => {}
            "minimal" => {
                self.normalizer.spelling = false;
                self.normalizer.abbreviations = false;
            }
            "enhanced" => {
                self.normalizer.spelling = true;
                self.normalizer.abbreviations = true;
                for (from, to) in [("wat", "what"), ("wht", "what"), ("plz", "please")] {
                    self.normalizer
                        .extra_spelling
                        .entry(from.to_string())
                        .or_insert_with(|| to.to_string());
                }
            }
            _ => return Err(ConfigError::UnknownPreset(name.to_string())),
        }
        Ok(())
    }
}
