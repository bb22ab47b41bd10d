use crate::error::{Error, Result};
use crate::types::*;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Static files copied to the site root; image paths in site.toml are relative to it
pub const PUBLIC_DIR: &str = "public";

/// Environment variable overriding `[backend].url`
pub const BACKEND_URL_ENV: &str = "TADILAT_BACKEND_URL";
/// Environment variable overriding `[backend].anon_key`
pub const BACKEND_KEY_ENV: &str = "TADILAT_BACKEND_KEY";

/// Raw TOML configuration structure
/// This matches the site.toml file structure exactly
#[derive(Debug, Deserialize)]
struct RawConfig {
    site: RawSiteInfo,
    contact: Contact,
    #[serde(default)]
    seo: Option<RawSeo>,
    backend: BackendConfig,
    #[serde(default)]
    page: Vec<RawPage>,
}

#[derive(Debug, Deserialize)]
struct RawSiteInfo {
    name: String,
    tagline: String,
    url: String,
    default_image: Option<String>, // Convert to PathBuf
    #[serde(default)]
    areas: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawSeo {
    title: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPage {
    slug: String,
    kind: PageKind,
    title: String,
    description: String,
    meta_title: Option<String>,
    image: Option<String>, // Convert to PathBuf
    #[serde(default)]
    content: Vec<String>,
}

/// Parse site.toml from a file path, applying environment overrides
pub fn parse_site_toml<P: AsRef<Path>>(path: P) -> Result<Site> {
    let content = fs::read_to_string(path)?;
    let mut site = parse_site_toml_str(&content)?;
    apply_env_overrides(
        &mut site,
        std::env::var(BACKEND_URL_ENV).ok(),
        std::env::var(BACKEND_KEY_ENV).ok(),
    );
    Ok(site)
}

/// Parse site.toml from a string (useful for testing)
pub fn parse_site_toml_str(content: &str) -> Result<Site> {
    let raw: RawConfig = toml::from_str(content)?;

    if !raw.site.url.starts_with("http://") && !raw.site.url.starts_with("https://") {
        return Err(Error::ConfigParse(format!(
            "site.url must be an absolute http(s) URL, got '{}'",
            raw.site.url
        )));
    }

    let default_image = if let Some(image) = raw.site.default_image {
        Some(validate_path(&image, "site.default_image")?)
    } else {
        None
    };

    let seo = default_seo(&raw.site.name, &raw.site.tagline, raw.seo);

    // Convert pages, validating all paths
    let pages: Result<Vec<LandingPage>> = raw
        .page
        .into_iter()
        .map(|p| {
            if p.slug.trim().is_empty() {
                return Err(Error::ConfigParse(format!(
                    "Empty slug for page '{}'",
                    p.title
                )));
            }

            let image = if let Some(image_path) = p.image {
                Some(validate_path(&image_path, "page.image")?)
            } else {
                None
            };

            Ok(LandingPage {
                meta_title: p.meta_title.unwrap_or_else(|| p.title.clone()),
                slug: p.slug,
                kind: p.kind,
                title: p.title,
                description: p.description,
                image,
                content: p.content,
            })
        })
        .collect();

    Ok(Site {
        info: SiteInfo {
            name: raw.site.name,
            tagline: raw.site.tagline,
            url: raw.site.url,
            default_image,
            areas: raw.site.areas,
        },
        contact: raw.contact,
        seo,
        backend: raw.backend,
        pages: pages?,
    })
}

/// Fill in missing SEO defaults from the site name and tagline
fn default_seo(name: &str, tagline: &str, raw: Option<RawSeo>) -> SeoDefaults {
    let (title, description) = match raw {
        Some(seo) => (seo.title, seo.description),
        None => (None, None),
    };

    SeoDefaults {
        title: title.unwrap_or_else(|| {
            format!("{} | Anahtar Teslim Tadilat ve İç Mimarlık Hizmetleri", name)
        }),
        description: description
            .unwrap_or_else(|| format!("{}. Ücretsiz keşif ve şeffaf fiyatlandırma.", tagline)),
    }
}

/// Let deployment secrets come from the environment instead of site.toml
pub fn apply_env_overrides(site: &mut Site, url: Option<String>, anon_key: Option<String>) {
    if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
        site.backend.url = url;
    }
    if let Some(key) = anon_key.filter(|k| !k.trim().is_empty()) {
        site.backend.anon_key = Some(key);
    }
}

/// Validate and convert a path string to PathBuf.
///
/// Rejects absolute paths and parent directory references (`..`) so a
/// site.toml cannot point the build at files outside the project directory.
fn validate_path(path_str: &str, field_name: &str) -> Result<PathBuf> {
    let path = Path::new(path_str);

    // Ensure path is not empty
    if path_str.trim().is_empty() {
        return Err(Error::ConfigParse(format!(
            "Empty path in '{}' field",
            field_name
        )));
    }

    // Reject absolute paths
    if path.is_absolute() || path_str.starts_with('/') {
        return Err(Error::ConfigParse(format!(
            "Absolute paths not allowed in '{}': '{}'. Use paths relative to the site directory.",
            field_name, path_str
        )));
    }

    // Check for parent directory references
    for component in path.components() {
        if component == std::path::Component::ParentDir {
            return Err(Error::ConfigParse(format!(
                "Parent directory references (..) not allowed in '{}': '{}'",
                field_name, path_str
            )));
        }
    }

    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r##"
[site]
name = "Tadilat İzmir"
tagline = "İzmir'de anahtar teslim tadilat"
url = "https://tadilatizmir.net"
areas = ["Bornova", "Karşıyaka"]

[contact]
phone = "+90 533 478 99 23"
phone_display = "0533 478 9923"
whatsapp = "https://wa.me/905334789923"
whatsapp_message = "Merhaba"
email = "info@tadilatizmir.net"
address = "İzmir, Türkiye"

[backend]
url = "https://example.supabase.co"

[[page]]
slug = "bornova-tadilat"
kind = "location"
title = "Bornova Tadilat Hizmetleri"
description = "Bornova'da tadilat"
"##;

    fn with_page_image(image: &str) -> String {
        format!(
            "{}image = \"{}\"\n",
            MINIMAL, image
        )
    }

    #[test]
    fn test_validate_path_valid_relative() {
        assert!(validate_path("images/mutfak.jpg", "image").is_ok());
        assert!(validate_path("favicon.png", "default_image").is_ok());
        assert!(validate_path("a/b/c.webp", "image").is_ok());
    }

    #[test]
    fn test_validate_path_rejects_absolute() {
        let result = validate_path("/etc/passwd", "page.image");
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Absolute paths not allowed")
        );
    }

    #[test]
    fn test_validate_path_rejects_parent_dir() {
        let result = validate_path("../secret.jpg", "page.image");
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Parent directory references")
        );

        assert!(validate_path("images/../../etc/passwd", "page.image").is_err());
    }

    #[test]
    fn test_validate_path_rejects_empty() {
        let result = validate_path("   ", "page.image");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Empty path"));
    }

    #[test]
    fn test_parse_minimal_config() {
        let site = parse_site_toml_str(MINIMAL).unwrap();
        assert_eq!(site.info.name, "Tadilat İzmir");
        assert_eq!(site.info.areas.len(), 2);
        assert_eq!(site.pages.len(), 1);
        assert_eq!(site.pages[0].kind, PageKind::Location);
        // meta_title falls back to title
        assert_eq!(site.pages[0].meta_title, "Bornova Tadilat Hizmetleri");
        assert!(site.backend.anon_key.is_none());
    }

    #[test]
    fn test_parse_config_derives_seo_defaults() {
        let site = parse_site_toml_str(MINIMAL).unwrap();
        assert_eq!(
            site.seo.title,
            "Tadilat İzmir | Anahtar Teslim Tadilat ve İç Mimarlık Hizmetleri"
        );
        assert!(site.seo.description.ends_with("Ücretsiz keşif ve şeffaf fiyatlandırma."));
    }

    #[test]
    fn test_parse_config_rejects_relative_site_url() {
        let toml = MINIMAL.replace("https://tadilatizmir.net", "tadilatizmir.net");
        let result = parse_site_toml_str(&toml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("site.url"));
    }

    #[test]
    fn test_parse_config_rejects_path_traversal_in_page_image() {
        let result = parse_site_toml_str(&with_page_image("../../etc/shadow"));
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Parent directory references")
        );
    }

    #[test]
    fn test_parse_config_rejects_unknown_page_kind() {
        let toml = MINIMAL.replace("kind = \"location\"", "kind = \"villa\"");
        assert!(parse_site_toml_str(&toml).is_err());
    }

    #[test]
    fn test_env_overrides_replace_backend_settings() {
        let mut site = parse_site_toml_str(MINIMAL).unwrap();
        apply_env_overrides(
            &mut site,
            Some("https://other.supabase.co".to_string()),
            Some("anon-123".to_string()),
        );
        assert_eq!(site.backend.url, "https://other.supabase.co");
        assert_eq!(site.backend.anon_key.as_deref(), Some("anon-123"));

        // Blank values are ignored
        apply_env_overrides(&mut site, Some(" ".to_string()), None);
        assert_eq!(site.backend.url, "https://other.supabase.co");
    }
}
