use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// `$MONIES_HOME`, else `~/.monies`.
pub fn monies_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("MONIES_HOME") {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".monies"))
}

pub fn ensure_monies_home() -> Result<PathBuf> {
    let dir = monies_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}
