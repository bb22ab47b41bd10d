// Site validation: config sanity, referenced files, image sizes, asset inventory

use std::collections::HashSet;
use std::path::Path;
use tadilat_core::blog::generate_slug;
use tadilat_core::config::PUBLIC_DIR;
use tadilat_core::lead::validate::validate_phone;
use tadilat_core::Site;
use tracing::debug;
use walkdir::WalkDir;

/// Open Graph images smaller than this are cropped or ignored by most previews
pub const OG_MIN_WIDTH: u32 = 1200;
pub const OG_MIN_HEIGHT: u32 = 630;
/// Search engines cut descriptions beyond this length
pub const META_DESCRIPTION_MAX_CHARS: usize = 160;

/// Paths served by the site itself
const RESERVED_SLUGS: &[&str] = &["blog", "admin", "iletisim", "_reload"];

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub info: Vec<String>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

pub fn validate_site(site: &Site, root: &Path) -> ValidationReport {
    let mut report = ValidationReport::default();

    check_site(site, &mut report);
    check_contact(site, &mut report);
    check_pages(site, &mut report);
    check_images(site, root, &mut report);
    inventory_assets(root, &mut report);

    debug!(
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "validation finished"
    );
    report
}

fn check_site(site: &Site, report: &mut ValidationReport) {
    if !site.info.url.starts_with("https://") {
        report
            .errors
            .push(format!("site.url must use https: {}", site.info.url));
    }
    if site.info.areas.is_empty() {
        report
            .warnings
            .push("site.areas is empty; the contact form has no district example".to_string());
    }
    if site.seo.description.chars().count() > META_DESCRIPTION_MAX_CHARS {
        report.warnings.push(format!(
            "seo.description is {} characters (over {})",
            site.seo.description.chars().count(),
            META_DESCRIPTION_MAX_CHARS
        ));
    }
    if site.backend.anon_key.is_none() {
        report.warnings.push(
            "backend.anon_key not set; contact submissions need it at runtime".to_string(),
        );
    }
}

fn check_contact(site: &Site, report: &mut ValidationReport) {
    let contact = &site.contact;
    if validate_phone(&contact.phone_display).is_err() {
        report.errors.push(format!(
            "contact.phone_display is not a valid phone number: '{}'",
            contact.phone_display
        ));
    }
    if !contact.whatsapp.starts_with("https://wa.me/") {
        report.warnings.push(format!(
            "contact.whatsapp should be a https://wa.me/ link: {}",
            contact.whatsapp
        ));
    }
    if !contact.email.contains('@') {
        report
            .errors
            .push(format!("contact.email is not an address: '{}'", contact.email));
    }
}

fn check_pages(site: &Site, report: &mut ValidationReport) {
    let mut seen = HashSet::new();
    for page in &site.pages {
        if !seen.insert(page.slug.as_str()) {
            report
                .errors
                .push(format!("Duplicate page slug: {}", page.slug));
        }
        if generate_slug(&page.slug) != page.slug {
            report.errors.push(format!(
                "Malformed slug '{}' (expected '{}')",
                page.slug,
                generate_slug(&page.slug)
            ));
        }
        if RESERVED_SLUGS.contains(&page.slug.as_str()) {
            report
                .errors
                .push(format!("Slug '{}' is reserved by the site", page.slug));
        }
        if page.description.chars().count() > META_DESCRIPTION_MAX_CHARS {
            report.warnings.push(format!(
                "Description of '{}' is {} characters (over {})",
                page.slug,
                page.description.chars().count(),
                META_DESCRIPTION_MAX_CHARS
            ));
        }
        if page.content.is_empty() {
            report
                .warnings
                .push(format!("Page '{}' has no content paragraphs", page.slug));
        }
    }
    report.info.push(format!("{} landing pages", site.pages.len()));
}

fn check_images(site: &Site, root: &Path, report: &mut ValidationReport) {
    let public = root.join(PUBLIC_DIR);
    let images = site
        .info
        .default_image
        .iter()
        .map(|p| ("site.default_image".to_string(), p))
        .chain(
            site.pages
                .iter()
                .filter_map(|page| page.image.as_ref().map(|p| (format!("page '{}'", page.slug), p))),
        );

    for (owner, relative) in images {
        let path = public.join(relative);
        if !path.exists() {
            report
                .errors
                .push(format!("Image for {} not found: {}", owner, path.display()));
            continue;
        }
        match image::image_dimensions(&path) {
            Ok((w, h)) if w < OG_MIN_WIDTH || h < OG_MIN_HEIGHT => {
                report.warnings.push(format!(
                    "Image for {} is {}x{}; social previews want at least {}x{}",
                    owner, w, h, OG_MIN_WIDTH, OG_MIN_HEIGHT
                ));
            }
            Ok(_) => {}
            Err(e) => report.warnings.push(format!(
                "Could not read image {}: {}",
                path.display(),
                e
            )),
        }
    }
}

fn inventory_assets(root: &Path, report: &mut ValidationReport) {
    let public = root.join(PUBLIC_DIR);
    if !public.is_dir() {
        report
            .info
            .push(format!("No {}/ directory; only generated files will be published", PUBLIC_DIR));
        return;
    }

    let (files, bytes) = WalkDir::new(&public)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .fold((0usize, 0u64), |(n, total), entry| {
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            (n + 1, total + size)
        });

    report.info.push(format!(
        "{} static files in {}/ ({} KB)",
        files,
        PUBLIC_DIR,
        bytes.div_ceil(1024)
    ));
}
