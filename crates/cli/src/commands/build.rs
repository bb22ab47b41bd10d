use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tadilat_backend::SupabaseClient;
use tadilat_backend::blog::load_site_content;
use tadilat_core::config::PUBLIC_DIR;
use tadilat_core::{Site, SiteContent};
use tadilat_generator::{GeneratedSite, generate_site};
use walkdir::WalkDir;

use super::load_site;

/// Build static site for deployment
pub async fn run(path: PathBuf, output: PathBuf, offline: bool) -> Result<()> {
    println!("🔨 Building static site...");
    println!("   Source: {}", path.display());
    println!("   Output: {}", output.display());
    println!();

    let site = load_site(&path)?;

    println!("✓ Loaded: {}", site.info.name);
    println!("  URL: {}", site.info.url);
    println!("  Landing pages: {}", site.pages.len());
    println!();

    let content = if offline {
        println!("📴 Offline: skipping blog posts and page overrides");
        SiteContent::default()
    } else {
        println!("📡 Fetching blog posts and page content...");
        let content = fetch_content(&site).await?;
        println!(
            "   ✓ {} published posts, {} page overrides",
            content.posts.len(),
            content.pages.len()
        );
        content
    };

    println!("📄 Generating pages...");
    let generated = generate_site(&site, &content);
    let written = write_site(&generated, &output)?;
    println!("   ✓ Wrote {} files", written);

    println!("🖼  Copying static files...");
    let copied = copy_public(&path.join(PUBLIC_DIR), &output)?;
    println!("   ✓ Copied {} files", copied);

    println!();
    println!("✅ Build complete!");
    println!("   Output: {}", output.display());
    println!();
    println!("To test locally:");
    println!("   tadilat serve {}", path.display());
    println!();

    Ok(())
}

/// Published posts and page overrides from the hosted backend
pub async fn fetch_content(site: &Site) -> Result<SiteContent> {
    let client = SupabaseClient::from_config(&site.backend)
        .context("Backend not configured (use --offline to build without it)")?;
    load_site_content(&client)
        .await
        .context("Failed to load blog posts and page content")
}

/// Write generated pages and assets under `output`
pub fn write_site(generated: &GeneratedSite, output: &Path) -> Result<usize> {
    fs::create_dir_all(output).context("Failed to create output directory")?;

    let files = generated
        .pages
        .iter()
        .map(|(path, html)| (path, html.as_bytes()))
        .chain(generated.assets.iter().map(|(path, data)| (path, data.as_slice())));

    let mut written = 0;
    for (relative, data) in files {
        let dst = output.join(relative);
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&dst, data).with_context(|| format!("Failed to write {}", dst.display()))?;
        written += 1;
    }
    Ok(written)
}

/// Copy everything under `public/` to the output root, keeping subdirectories
pub fn copy_public(public: &Path, output: &Path) -> Result<usize> {
    if !public.is_dir() {
        return Ok(0);
    }

    let mut copied = 0;
    for entry in WalkDir::new(public).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(public)
            .context("Static file outside public directory")?;
        let dst = output.join(relative);
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(entry.path(), &dst)
            .with_context(|| format!("Failed to copy {}", entry.path().display()))?;
        copied += 1;
    }
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::init;
    use tempfile::TempDir;

    #[test]
    fn test_copy_public_keeps_layout() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        fs::create_dir_all(src.path().join("images")).unwrap();
        fs::write(src.path().join("favicon.png"), b"png").unwrap();
        fs::write(src.path().join("images/mutfak.jpg"), b"jpg").unwrap();

        let copied = copy_public(src.path(), out.path()).unwrap();
        assert_eq!(copied, 2);
        assert!(out.path().join("images/mutfak.jpg").exists());
    }

    #[test]
    fn test_copy_public_missing_dir() {
        let out = TempDir::new().unwrap();
        assert_eq!(copy_public(&out.path().join("nope"), out.path()).unwrap(), 0);
    }

    #[tokio::test]
    async fn test_offline_build_writes_site() {
        let dir = TempDir::new().unwrap();
        let site_dir = dir.path().join("site");
        fs::create_dir_all(&site_dir).unwrap();
        init::run(site_dir.clone(), None, None).await.unwrap();
        let out = dir.path().join("dist");

        run(site_dir, out.clone(), true).await.unwrap();

        assert!(out.join("index.html").exists());
        assert!(out.join("mutfak-tadilati/index.html").exists());
        assert!(out.join("blog/index.html").exists());
        assert!(out.join("404.html").exists());
        assert!(out.join("sitemap.xml").exists());
        assert!(out.join("robots.txt").exists());
        assert!(out.join("style.css").exists());
    }

    #[tokio::test]
    async fn test_build_requires_site_toml() {
        let dir = TempDir::new().unwrap();
        let err = run(dir.path().to_path_buf(), dir.path().join("out"), true)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("site.toml not found"));
    }
}
