//! Encoder configuration
//!
//! Encode defaults can come from an optional TOML file; explicit command
//! line flags always win.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::aot::AudioObjectType;
use crate::error::{AacBoxError, Result};

pub const DEFAULT_AOT: i32 = 2;
pub const DEFAULT_BITRATE: u32 = 64000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodeConfig {
    /// Audio object type id (2 = LC, 5 = HE, 29 = HEv2, 23 = LD, 39 = ELD)
    pub aot: i32,
    /// Constant bitrate in bits per second
    pub bitrate: u32,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self { aot: DEFAULT_AOT, bitrate: DEFAULT_BITRATE }
    }
}

impl EncodeConfig {
    /// Load from a TOML config file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AacBoxError::config(format!("failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| AacBoxError::config(format!("failed to parse config file: {}", e)))
    }

    /// Resolve the effective config: file values (if any) overridden by
    /// explicit CLI flags, then validated.
    pub fn resolve(
        config_file: Option<&Path>,
        aot: Option<i32>,
        bitrate: Option<u32>,
    ) -> Result<Self> {
        let mut config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(aot) = aot {
            config.aot = aot;
        }
        if let Some(bitrate) = bitrate {
            config.bitrate = bitrate;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if AudioObjectType::from_id(self.aot).is_none() {
            return Err(AacBoxError::unsupported(format!(
                "invalid audio object type: {}",
                self.aot
            )));
        }
        if self.bitrate == 0 {
            return Err(AacBoxError::unsupported("bitrate must be greater than 0"));
        }
        Ok(())
    }

    pub fn audio_object_type(&self) -> AudioObjectType {
        // validate() has pinned the id to the table
        AudioObjectType::from_id(self.aot).unwrap_or(AudioObjectType::Lc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = EncodeConfig::default();
        assert_eq!(config.aot, 2);
        assert_eq!(config.bitrate, 64000);
        assert!(config.validate().is_ok());
        assert_eq!(config.audio_object_type(), AudioObjectType::Lc);
    }

    #[test]
    fn test_validation() {
        let mut config = EncodeConfig::default();

        config.aot = 3;
        assert!(config.validate().is_err());
        config.aot = 5;
        assert!(config.validate().is_ok());

        config.bitrate = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_flags_override_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "aot = 5\nbitrate = 96000").unwrap();

        let config = EncodeConfig::resolve(Some(file.path()), None, None).unwrap();
        assert_eq!(config.aot, 5);
        assert_eq!(config.bitrate, 96000);

        let config = EncodeConfig::resolve(Some(file.path()), Some(29), Some(48000)).unwrap();
        assert_eq!(config.aot, 29);
        assert_eq!(config.bitrate, 48000);
    }

    #[test]
    fn test_resolve_rejects_bad_flag() {
        assert!(EncodeConfig::resolve(None, Some(4), None).is_err());
        assert!(EncodeConfig::resolve(None, None, Some(0)).is_err());
    }

    #[test]
    fn test_missing_config_file() {
        let result = EncodeConfig::resolve(Some(Path::new("/no/such/file.toml")), None, None);
        assert!(matches!(result, Err(AacBoxError::Config { .. })));
    }
}
