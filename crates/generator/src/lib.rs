// Static site generation with Leptos SSR

pub mod components;
pub mod document;
pub mod pages;

use chrono::{DateTime, Utc};
use tadilat_core::lead::FormView;
use tadilat_core::seo::html_escape;
use tadilat_core::{Site, SiteContent};
use tracing::debug;

pub use document::{STYLESHEET, render_document};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Adds the preview badge and the live-reload script
    pub preview: bool,
}

pub struct GeneratedSite {
    pub pages: Vec<(String, String)>,   // (path, html)
    pub assets: Vec<(String, Vec<u8>)>, // (path, data)
}

impl GeneratedSite {
    pub fn page(&self, path: &str) -> Option<&str> {
        self.pages
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, html)| html.as_str())
    }
}

/// Output path of the page served at `/{slug}`
pub fn page_file(slug: &str) -> String {
    if slug.is_empty() {
        "index.html".to_string()
    } else {
        format!("{}/index.html", slug.trim_matches('/'))
    }
}

pub fn generate_site(site: &Site, content: &SiteContent) -> GeneratedSite {
    generate_site_with(site, content, &RenderOptions::default())
}

/// Render every page plus stylesheet, sitemap and robots.txt
pub fn generate_site_with(site: &Site, content: &SiteContent, options: &RenderOptions) -> GeneratedSite {
    let form = FormView::empty();
    let mut pages = vec![(page_file(""), pages::home_page(site, &form, options))];

    for page in &site.pages {
        debug!(slug = %page.slug, "rendering landing page");
        let html = pages::landing_page(site, page, content.page(&page.slug), &form, options);
        pages.push((page_file(&page.slug), html));
    }

    pages.push((page_file("blog"), pages::blog_index_page(site, &content.posts, options)));
    for post in &content.posts {
        let html = pages::blog_post_page(site, post, options);
        pages.push((page_file(&format!("blog/{}", post.slug)), html));
    }

    pages.push(("404.html".to_string(), pages::not_found_page(site, options)));

    let assets = vec![
        ("style.css".to_string(), STYLESHEET.as_bytes().to_vec()),
        ("sitemap.xml".to_string(), generate_sitemap(site, content).into_bytes()),
        ("robots.txt".to_string(), generate_robots(site).into_bytes()),
    ];

    GeneratedSite { pages, assets }
}

fn sitemap_entry(loc: &str, lastmod: Option<&DateTime<Utc>>, priority: &str) -> String {
    let lastmod = lastmod
        .map(|d| format!("    <lastmod>{}</lastmod>\n", d.format("%Y-%m-%d")))
        .unwrap_or_default();
    format!(
        "  <url>\n    <loc>{}</loc>\n{}    <priority>{}</priority>\n  </url>\n",
        html_escape(loc),
        lastmod,
        priority
    )
}

pub fn generate_sitemap(site: &Site, content: &SiteContent) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    xml.push_str(&sitemap_entry(&site.absolute_url("/"), None, "1.0"));
    for page in &site.pages {
        let lastmod = content.page(&page.slug).and_then(|p| p.updated_at.as_ref());
        xml.push_str(&sitemap_entry(&site.absolute_url(&page.path()), lastmod, "0.8"));
    }
    xml.push_str(&sitemap_entry(&site.absolute_url("/blog"), None, "0.7"));
    for post in &content.posts {
        let lastmod = post.updated_at.as_ref().unwrap_or(&post.created_at);
        let loc = site.absolute_url(&format!("/blog/{}", post.slug));
        xml.push_str(&sitemap_entry(&loc, Some(lastmod), "0.6"));
    }
    xml.push_str("</urlset>\n");
    xml
}

pub fn generate_robots(site: &Site) -> String {
    format!(
        "User-agent: *\nAllow: /\nDisallow: /admin\n\nSitemap: {}\n",
        site.absolute_url("/sitemap.xml")
    )
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use tadilat_core::config::parse_site_toml_str;
    use tadilat_core::{BlogPost, PageContent};

    pub(crate) fn sample_site() -> Site {
        parse_site_toml_str(
            r#"
[site]
name = "Tadilat İzmir"
tagline = "İzmir'de Anahtar Teslim Tadilat"
url = "https://tadilatizmir.net"
areas = ["Bornova", "Karşıyaka"]

[contact]
phone = "+90 533 478 99 23"
phone_display = "0533 478 9923"
whatsapp = "https://wa.me/905334789923"
whatsapp_message = "Merhaba, tadilat için teklif almak istiyorum."
email = "info@tadilatizmir.net"
address = "Bornova, İzmir"

[backend]
url = "https://example.supabase.co"

[[page]]
slug = "mutfak-tadilati"
kind = "service"
title = "Mutfak Tadilatı"
description = "Modern ve fonksiyonel mutfaklar."
meta_title = "Mutfak Tadilatı İzmir"
content = ["Config paragrafı."]

[[page]]
slug = "bornova-tadilat"
kind = "location"
title = "Bornova Tadilat"
description = "Bornova'da tadilat hizmetleri."
"#,
        )
        .unwrap()
    }

    fn post(slug: &str, published_day: u32) -> BlogPost {
        BlogPost {
            id: slug.to_string(),
            title: format!("Yazı {}", slug),
            slug: slug.to_string(),
            content: "<p>Banyo &amp; mutfak <strong>ipuçları</strong></p>".to_string(),
            excerpt: None,
            featured_image: None,
            meta_title: None,
            meta_description: None,
            published: Some(true),
            created_at: Utc.with_ymd_and_hms(2025, 3, published_day, 9, 0, 0).unwrap(),
            updated_at: None,
        }
    }

    #[test]
    fn test_page_file() {
        assert_eq!(page_file(""), "index.html");
        assert_eq!(page_file("blog/ornek"), "blog/ornek/index.html");
    }

    #[test]
    fn test_generate_site_layout() {
        let site = sample_site();
        let content = SiteContent {
            posts: vec![post("ilk-yazi", 2)],
            pages: vec![],
        };
        let generated = generate_site(&site, &content);

        let paths: Vec<&str> = generated.pages.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "index.html",
                "mutfak-tadilati/index.html",
                "bornova-tadilat/index.html",
                "blog/index.html",
                "blog/ilk-yazi/index.html",
                "404.html",
            ]
        );
        let assets: Vec<&str> = generated.assets.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(assets, vec!["style.css", "sitemap.xml", "robots.txt"]);
    }

    #[test]
    fn test_home_page_contents() {
        let site = sample_site();
        let generated = generate_site(&site, &SiteContent::default());
        let home = generated.page("index.html").unwrap();

        assert!(home.starts_with("<!DOCTYPE html>"));
        assert!(home.contains("<html lang=\"tr\">"));
        assert!(home.contains("Ücretsiz Keşif ve Teklif Formu"));
        assert!(home.contains("href=\"/mutfak-tadilati\""));
        assert!(home.contains("Örn: Bornova, Atatürk Mahallesi"));
        assert!(home.contains("https://wa.me/905334789923?text=Merhaba%2C%20tadilat"));
        assert!(home.contains("tel:+905334789923"));
    }

    #[test]
    fn test_blog_pages() {
        let site = sample_site();
        let content = SiteContent {
            posts: vec![post("ikinci", 5), post("ilk", 2)],
            pages: vec![],
        };
        let generated = generate_site(&site, &content);

        let index = generated.page("blog/index.html").unwrap();
        assert!(index.contains("\"@type\":\"Blog\""));
        assert!(index.contains("Yazı ikinci"));
        assert!(index.contains("05 Mar 2025"));
        assert!(index.contains("1 dk okuma"));

        let article = generated.page("blog/ilk/index.html").unwrap();
        assert!(article.contains("<strong>ipuçları</strong>"));
        assert!(article.contains("\"@type\":\"BlogPosting\""));
        assert!(article.contains("content=\"article\""));
    }

    #[test]
    fn test_empty_blog_index() {
        let generated = generate_site(&sample_site(), &SiteContent::default());
        let index = generated.page("blog/index.html").unwrap();
        assert!(index.contains("Henüz blog yazısı bulunmuyor."));
    }

    #[test]
    fn test_sitemap_and_robots() {
        let site = sample_site();
        let mut page = PageContent::empty("bornova-tadilat");
        page.updated_at = Some(Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap());
        let content = SiteContent {
            posts: vec![post("ilk", 2)],
            pages: vec![page],
        };

        let sitemap = generate_sitemap(&site, &content);
        assert!(sitemap.contains("<loc>https://tadilatizmir.net/</loc>"));
        assert!(sitemap.contains("<loc>https://tadilatizmir.net/blog/ilk</loc>"));
        assert!(sitemap.contains("<lastmod>2025-03-02</lastmod>"));
        assert!(sitemap.contains("<lastmod>2025-04-01</lastmod>"));

        let robots = generate_robots(&site);
        assert!(robots.contains("Disallow: /admin"));
        assert!(robots.contains("Sitemap: https://tadilatizmir.net/sitemap.xml"));
    }
}
