/* src/server/core/rust/src/config/loader.rs */

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use super::GadgetConfig;

pub const CONFIG_FILE_NAME: &str = "gadget.toml";

/// Walk upward from `start` to find `gadget.toml`, like Cargo.toml discovery
pub fn find_gadget_config(start: &Path) -> Result<PathBuf> {
  let mut dir =
    start.canonicalize().with_context(|| format!("failed to canonicalize {}", start.display()))?;
  loop {
    let candidate = dir.join(CONFIG_FILE_NAME);
    if candidate.is_file() {
      return Ok(candidate);
    }
    if !dir.pop() {
      bail!("{CONFIG_FILE_NAME} not found (searched upward from {})", start.display());
    }
  }
}

pub fn parse_gadget_config(content: &str) -> Result<GadgetConfig> {
  let config: GadgetConfig = toml::from_str(content)?;
  config.validate()?;
  Ok(config)
}

pub fn load_gadget_config(path: &Path) -> Result<GadgetConfig> {
  let content =
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
  parse_gadget_config(&content).with_context(|| format!("failed to load {}", path.display()))
}
