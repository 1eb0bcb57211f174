use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::style::StyleDefaults;

pub const DEFAULT_MARKER: &str = "PAGE CONFIGURATION";
pub const DEFAULT_BINDING: &str = "pageConfig";
pub const DEFAULT_PAGE_FILE_NAMES: &[&str] = &["page.jsx"];
pub const DEFAULT_EXCLUDED_DIRS: &[&str] =
    &["node_modules", ".next", "dist", "build", "packages", "data"];

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct PagekitConfig {
    #[serde(default)]
    pub scan: ScanSection,
    #[serde(default)]
    pub inject: InjectSection,
    #[serde(default)]
    pub style: StyleDefaults,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScanSection {
    pub content_dir: Option<String>,
    pub file_names: Vec<String>,
    pub excluded_dirs: Vec<String>,
}

impl Default for ScanSection {
    fn default() -> Self {
        Self {
            content_dir: None,
            file_names: DEFAULT_PAGE_FILE_NAMES
                .iter()
                .map(|name| (*name).to_string())
                .collect(),
            excluded_dirs: DEFAULT_EXCLUDED_DIRS
                .iter()
                .map(|name| (*name).to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct InjectSection {
    pub marker: String,
    pub binding: String,
}

impl Default for InjectSection {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
            binding: DEFAULT_BINDING.to_string(),
        }
    }
}

impl PagekitConfig {
    fn validate(&self, config_path: &Path) -> Result<()> {
        if self.inject.marker.trim().is_empty() {
            bail!(
                "[inject].marker cannot be empty in {}",
                config_path.display()
            );
        }
        if !is_identifier(&self.inject.binding) {
            bail!(
                "[inject].binding must be a plain identifier, got `{}` in {}",
                self.inject.binding,
                config_path.display()
            );
        }
        if self.scan.file_names.iter().all(|name| name.trim().is_empty()) {
            bail!(
                "[scan].file_names must name at least one page file in {}",
                config_path.display()
            );
        }
        Ok(())
    }
}

/// Load and parse a PagekitConfig from a TOML file. Returns default if file doesn't exist.
pub fn load_config(config_path: &Path) -> Result<PagekitConfig> {
    if !config_path.exists() {
        return Ok(PagekitConfig::default());
    }
    let content = fs::read_to_string(config_path)
        .with_context(|| format!("failed to read {}", config_path.display()))?;
    let parsed: PagekitConfig = toml::from_str(&content)
        .with_context(|| format!("failed to parse {}", config_path.display()))?;
    parsed.validate(config_path)?;
    Ok(parsed)
}

fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_' || first == '$')
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '$')
}
