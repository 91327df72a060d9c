use anyhow::{Context, Result};
use monies_core::config::{DEFAULT_MARGIN_X, DEFAULT_ZONE};
use monies_core::ParserConfig;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::{ensure_monies_home, monies_home};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub parser: ParserSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserSection {
    /// IANA zone statement dates are anchored in
    pub zone: String,
    /// Left margin of the card bill's transaction columns (PDF units).
    /// Adjust if the issuer changes the bill template.
    pub margin_x: f32,
    /// Accepted difference between itemized sum and stated total
    pub tolerance: Decimal,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            parser: ParserSection::default(),
        }
    }
}

impl Default for ParserSection {
    fn default() -> Self {
        let defaults = ParserConfig::default();
        Self {
            zone: DEFAULT_ZONE.name().to_string(),
            margin_x: DEFAULT_MARGIN_X,
            tolerance: defaults.tolerance,
        }
    }
}

impl Config {
    pub fn parser_config(&self) -> Result<ParserConfig> {
        let cfg = ParserConfig {
            margin_x: self.parser.margin_x,
            tolerance: self.parser.tolerance,
            ..ParserConfig::default()
        };
        Ok(cfg.with_zone_name(&self.parser.zone)?)
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(monies_home()?.join("config.toml"))
}

/// Load `path`, falling back to defaults when it does not exist.
pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", path.display()))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn save_config(cfg: &Config) -> Result<PathBuf> {
    let p = ensure_monies_home()?.join("config.toml");
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(p)
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    let p = save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_parser_defaults() {
        let cfg = Config::default().parser_config().unwrap();
        assert_eq!(cfg, ParserConfig::default());
    }

    #[test]
    fn test_parse_toml() {
        let cfg: Config = toml::from_str(
            r#"
[parser]
zone = "Europe/Stockholm"
margin_x = 42.0
tolerance = "0.005"
"#,
        )
        .unwrap();
        let pc = cfg.parser_config().unwrap();
        assert_eq!(pc.zone.name(), "Europe/Stockholm");
        assert_eq!(pc.margin_x, 42.0);
        assert_eq!(pc.tolerance, Decimal::new(5, 3));
    }

    #[test]
    fn test_invalid_zone() {
        let mut cfg = Config::default();
        cfg.parser.zone = "Nowhere/Special".to_string();
        assert!(cfg.parser_config().is_err());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(cfg.parser.zone, "Europe/Helsinki");
    }

    #[test]
    fn test_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.parser.margin_x = 40.5;
        fs::write(&p, toml::to_string_pretty(&cfg).unwrap()).unwrap();
        let loaded = load_config_from(&p).unwrap();
        assert_eq!(loaded.parser.margin_x, 40.5);
        assert_eq!(loaded.parser.tolerance, cfg.parser.tolerance);
    }
}
