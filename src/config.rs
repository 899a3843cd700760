use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::engine::normalize::Normalizer;
use crate::engine::segment::{self, DEFAULT_SEGMENT_KEY};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_quiz_count")]
    pub quiz_count: usize,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_range")]
    pub default_range: String,
    #[serde(default)]
    pub bank_dir: Option<String>,
    #[serde(default)]
    pub normalize: NormalizeConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NormalizeConfig {
    #[serde(default = "default_strip_long_vowel")]
    pub strip_long_vowel: bool,
    /// Extra old-form to modern-form character pairs, e.g. `"澤" = "沢"`.
    #[serde(default)]
    pub extra_variants: BTreeMap<String, String>,
}

fn default_quiz_count() -> usize {
    10
}
fn default_theme() -> String {
    "catppuccin-mocha".to_string()
}
fn default_range() -> String {
    DEFAULT_SEGMENT_KEY.to_string()
}
fn default_strip_long_vowel() -> bool {
    true
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            strip_long_vowel: default_strip_long_vowel(),
            extra_variants: BTreeMap::new(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            quiz_count: default_quiz_count(),
            theme: default_theme(),
            default_range: default_range(),
            bank_dir: None,
            normalize: NormalizeConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.normalize_range_key();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("rekiken")
    }

    fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// User bank directory: the configured one, else `<config dir>/banks`.
    pub fn bank_dir(&self) -> PathBuf {
        self.bank_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| Self::config_dir().join("banks"))
    }

    /// Reset `default_range` to the whole bank if it names no known segment.
    pub fn normalize_range_key(&mut self) {
        let key = self.default_range.trim().to_lowercase();
        self.default_range = if segment::is_known_key(&key) {
            key
        } else {
            default_range()
        };
    }

    pub fn normalizer(&self) -> Normalizer {
        let (normalizer, skipped) = Normalizer::new(self.normalize.strip_long_vowel)
            .with_variants(&self.normalize.extra_variants);
        for pair in skipped {
            log::warn!("ignoring variant mapping {pair}: both sides must be one character");
        }
        normalizer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serde_defaults_from_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.quiz_count, 10);
        assert_eq!(config.default_range, "all");
        assert!(config.bank_dir.is_none());
        assert!(config.normalize.strip_long_vowel);
        assert!(config.normalize.extra_variants.is_empty());
    }

    #[test]
    fn test_config_partial_fields() {
        let toml_str = r#"
quiz_count = 5
default_range = "20-40"

[normalize]
extra_variants = { "澤" = "沢" }
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.quiz_count, 5);
        assert_eq!(config.default_range, "20-40");
        assert_eq!(config.theme, "catppuccin-mocha");
        assert!(config.normalize.strip_long_vowel);
        assert!(config.normalizer().is_correct("吉澤", &["吉沢"]));
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let mut config = Config::default();
        config.bank_dir = Some("/tmp/banks".to_string());
        config
            .normalize
            .extra_variants
            .insert("廣".to_string(), "広".to_string());
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(deserialized.bank_dir.as_deref(), Some("/tmp/banks"));
        assert_eq!(deserialized.normalize.extra_variants.len(), 1);
    }

    #[test]
    fn test_normalize_range_key_invalid_resets() {
        let mut config = Config::default();
        config.default_range = "10-30".to_string();
        config.normalize_range_key();
        assert_eq!(config.default_range, "all");
    }

    #[test]
    fn test_normalize_range_key_case_folded() {
        let mut config = Config::default();
        config.default_range = " 60-80 ".to_string();
        config.normalize_range_key();
        assert_eq!(config.default_range, "60-80");
    }

    #[test]
    fn test_long_vowel_switch_reaches_normalizer() {
        let mut config = Config::default();
        config.normalize.strip_long_vowel = false;
        assert!(!config.normalizer().strips_long_vowel());
    }

    #[test]
    fn test_bank_dir_override() {
        let mut config = Config::default();
        assert!(config.bank_dir().ends_with("banks"));
        config.bank_dir = Some("/srv/quiz".to_string());
        assert_eq!(config.bank_dir(), PathBuf::from("/srv/quiz"));
    }
}
