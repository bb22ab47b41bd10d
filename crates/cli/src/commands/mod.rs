pub mod admin;
pub mod build;
pub mod init;
pub mod serve;
pub mod validate;

use anyhow::{Context, Result};
use std::path::Path;
use tadilat_core::{Site, parse_site_toml};

pub const SITE_TOML: &str = "site.toml";

/// Load `site.toml` from a site directory
pub fn load_site(path: &Path) -> Result<Site> {
    if !path.exists() {
        anyhow::bail!("Site directory does not exist: {}", path.display());
    }

    let site_toml = path.join(SITE_TOML);
    if !site_toml.exists() {
        anyhow::bail!(
            "site.toml not found in {}\nRun 'tadilat init {}' first",
            path.display(),
            path.display()
        );
    }

    parse_site_toml(&site_toml).context("Failed to parse site.toml")
}
