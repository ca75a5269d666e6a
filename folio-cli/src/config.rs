use anyhow::{Context, Result};
use folio_scan::ScanConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::{default_data_dir, ensure_folio_home};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub scan: ScanConfig,
    #[serde(default)]
    pub log: LogSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogSection {
    /// Filter used when RUST_LOG is not set, e.g. "info" or "folio_scan=debug"
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn with_data_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            scan: ScanConfig::with_data_dir(dir),
            log: LogSection::default(),
        }
    }

    /// Scan settings with the broker folders moved under `dir` for one run
    pub fn scan_for(&self, data_dir: Option<&Path>) -> ScanConfig {
        match data_dir {
            Some(dir) => ScanConfig {
                espp_fallback_symbol: self.scan.espp_fallback_symbol.clone(),
                ..ScanConfig::with_data_dir(dir)
            },
            None => self.scan.clone(),
        }
    }
}

pub fn default_config() -> Result<Config> {
    Ok(Config::with_data_dir(default_data_dir()?))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_folio_home()?.join("config.toml"))
}

pub fn parse_config(s: &str) -> Result<Config> {
    toml::from_str(s).context("parse config.toml")
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return default_config();
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    parse_config(&s)
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    let cfg = default_config()?;
    save_config(&cfg)?;
    cfg.scan.ensure_folders()?;
    println!("Wrote {}", p.display());
    for folder in &cfg.scan.folders {
        println!("  {:<15} {}", folder.institution.label(), folder.path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_ingest::Institution;

    #[test]
    fn test_toml_round_trip() {
        let cfg = Config::with_data_dir("/srv/folio");
        let text = toml::to_string_pretty(&cfg).unwrap();
        assert!(text.contains("[scan]"));
        assert!(text.contains("[log]"));
        assert_eq!(parse_config(&text).unwrap(), cfg);
    }

    #[test]
    fn test_parse_hand_written_config() {
        let cfg = parse_config(
            r#"
[scan]
espp_fallback_symbol = "ACME"

[[scan.folders]]
institution = "morgan_stanley"
path = "/statements/ms"
"#,
        )
        .unwrap();
        assert_eq!(cfg.scan.espp_fallback_symbol, "ACME");
        assert_eq!(cfg.scan.folders.len(), 1);
        assert_eq!(cfg.scan.folders[0].institution, Institution::MorganStanley);
        assert_eq!(cfg.log.level, "info");
    }

    #[test]
    fn test_data_dir_override_keeps_symbol() {
        let mut cfg = Config::with_data_dir("/a");
        cfg.scan.espp_fallback_symbol = "ACME".to_string();
        let scan = cfg.scan_for(Some(Path::new("/b")));
        assert_eq!(scan.folders[0].path, Path::new("/b/fidelity"));
        assert_eq!(scan.espp_fallback_symbol, "ACME");
        assert_eq!(cfg.scan_for(None), cfg.scan);
    }
}
