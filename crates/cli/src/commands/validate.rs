use std::path::PathBuf;
use tadilat_validator::validate_site;

use super::load_site;

pub async fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("Validating site at: {}", path.display());

    let site = load_site(&path)?;
    println!("✓ site.toml valid");
    println!("  Site: {} ({})", site.info.name, site.info.url);
    println!("  Pages: {}", site.pages.len());

    let report = validate_site(&site, &path);

    for info in &report.info {
        println!("  ℹ {}", info);
    }
    for warning in &report.warnings {
        println!("  ⚠ {}", warning);
    }
    for error in &report.errors {
        eprintln!("  ✗ {}", error);
    }

    if !report.is_ok() {
        anyhow::bail!("Validation failed with {} error(s)", report.errors.len());
    }

    println!();
    println!("✅ Site is valid ({} warning(s))", report.warnings.len());
    Ok(())
}
