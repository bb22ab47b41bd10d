use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tadilat_backend::admin::EDITABLE_PAGES;
use tadilat_core::config::{PUBLIC_DIR, parse_site_toml_str};

use super::SITE_TOML;

const OG_IMAGE_NAMES: &[&str] = &[
    "og-image.jpg",
    "og-image.png",
    "og.jpg",
    "og.png",
    "share.jpg",
    "share.png",
];
const DEFAULT_NAME: &str = "Tadilat İzmir";
const DEFAULT_URL: &str = "https://www.example.com";

/// Escape a string for a TOML basic string
fn toml_escape_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\x08', "\\b")
        .replace('\x0C', "\\f")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

/// District pages are named `{district}-tadilat`
fn is_location(slug: &str) -> bool {
    slug.ends_with("-tadilat")
}

/// Create a site directory skeleton: `site.toml` with every editable landing
/// page and an empty `public/`.
pub async fn run(path: PathBuf, name: Option<String>, url: Option<String>) -> Result<()> {
    println!("Initializing site directory: {}", path.display());

    if !path.exists() {
        anyhow::bail!(
            "Directory '{}' does not exist. Create it first: mkdir {}",
            path.display(),
            path.display()
        );
    }

    let site_toml_path = path.join(SITE_TOML);
    if site_toml_path.exists() {
        anyhow::bail!(
            "site.toml already exists at {}\nHint: Delete it first or use a different directory",
            site_toml_path.display()
        );
    }

    if let Some(url) = &url
        && !url.starts_with("https://")
    {
        anyhow::bail!("Site URL must start with https://, got '{}'", url);
    }

    let public = path.join(PUBLIC_DIR);
    fs::create_dir_all(&public).context("Failed to create public directory")?;

    let og_image = detect_og_image(&public);
    if let Some(image) = &og_image {
        println!("✓ Detected share image: {}/{}", PUBLIC_DIR, image);
    }

    let toml = generate_site_toml(
        name.as_deref().unwrap_or(DEFAULT_NAME),
        url.as_deref().unwrap_or(DEFAULT_URL),
        og_image.as_deref(),
    )?;
    fs::write(&site_toml_path, toml).context("Failed to write site.toml")?;

    let services = EDITABLE_PAGES.iter().filter(|(s, _)| !is_location(s)).count();
    println!("\n✓ Initialization complete!");
    println!("\nGenerated structure:");
    println!("  {}/", path.display());
    println!(
        "  ├── site.toml   ← Contact details, {} services, {} districts",
        services,
        EDITABLE_PAGES.len() - services
    );
    println!("  └── public/     ← favicon.png, images");

    println!("\nNext steps:");
    println!("  1. Edit site.toml (phone, WhatsApp, address, backend url)");
    println!("  2. Set {} or [backend].anon_key", tadilat_core::config::BACKEND_KEY_ENV);
    println!("  3. Preview: tadilat serve {} --offline", path.display());

    Ok(())
}

fn detect_og_image(public: &Path) -> Option<String> {
    OG_IMAGE_NAMES
        .iter()
        .find(|name| public.join(name).is_file())
        .map(|name| name.to_string())
}

fn generate_site_toml(name: &str, url: &str, og_image: Option<&str>) -> Result<String> {
    let name = toml_escape_string(name);
    let url = toml_escape_string(url);
    let image_line = match og_image {
        Some(image) => format!("default_image = \"{}\"\n", toml_escape_string(image)),
        None => "# default_image = \"og-image.jpg\"  # 1200x630, relative to public/\n".to_string(),
    };

    let areas: Vec<String> = EDITABLE_PAGES
        .iter()
        .filter(|(slug, _)| is_location(slug))
        .map(|(_, label)| format!("\"{}\"", label.trim_end_matches(" Tadilat")))
        .collect();

    let mut toml = format!(
        "# Generated by tadilat init\n\
# Edit this file to customize your site\n\
\n\
[site]\n\
name = \"{name}\"\n\
tagline = \"İzmir'de Anahtar Teslim Tadilat ve İç Mimarlık\"\n\
url = \"{url}\"\n\
{image_line}\
areas = [{areas}]\n\
\n\
[contact]\n\
phone = \"+90 532 000 00 00\"  # TODO: Set phone\n\
phone_display = \"0532 000 00 00\"\n\
whatsapp = \"https://wa.me/905320000000\"\n\
whatsapp_message = \"Merhaba, tadilat için ücretsiz keşif talep etmek istiyorum.\"\n\
email = \"info@example.com\"\n\
address = \"İzmir\"\n\
\n\
# [seo]\n\
# title = \"...\"\n\
# description = \"...\"\n\
\n\
[backend]\n\
url = \"https://your-project.supabase.co\"  # TODO: Set backend url\n\
# anon_key = \"...\"  # or set TADILAT_BACKEND_KEY\n\
\n",
        areas = areas.join(", ")
    );

    for (slug, label) in EDITABLE_PAGES {
        let (kind, description) = if is_location(slug) {
            (
                "location",
                format!(
                    "{} bölgesinde ev ve iş yeri tadilatı. Ücretsiz keşif, şeffaf fiyat.",
                    label.trim_end_matches(" Tadilat")
                ),
            )
        } else {
            (
                "service",
                format!("İzmir'de {} hizmeti. Ücretsiz keşif ve detaylı teklif.", label),
            )
        };
        toml.push_str("[[page]]\n");
        toml.push_str(&format!("slug = \"{}\"\n", slug));
        toml.push_str(&format!("kind = \"{}\"\n", kind));
        toml.push_str(&format!("title = \"{}\"\n", toml_escape_string(label)));
        toml.push_str(&format!("description = \"{}\"\n", toml_escape_string(&description)));
        toml.push_str(&format!("content = [\"{}\"]\n", toml_escape_string(&description)));
        toml.push('\n');
    }

    parse_site_toml_str(&toml)
        .context("Generated site.toml is invalid - this is a bug in the template generator")?;

    Ok(toml)
}
