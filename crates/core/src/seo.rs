use serde_json::{Value, json};

use crate::blog::{DEFAULT_EXCERPT_CHARS, get_excerpt};
use crate::types::{BlogPost, Site};

pub const OG_LOCALE: &str = "tr_TR";

/// HTML-escape a string for text and attribute positions
///
/// Escapes: & < > " '
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TwitterCard {
    Summary,
    SummaryLargeImage,
}

impl TwitterCard {
    pub fn as_str(self) -> &'static str {
        match self {
            TwitterCard::Summary => "summary",
            TwitterCard::SummaryLargeImage => "summary_large_image",
        }
    }
}

/// Head metadata for one page
#[derive(Debug, Clone, PartialEq)]
pub struct SeoMeta {
    pub site_name: String,
    pub title: String,
    pub description: String,
    pub canonical_url: String,
    pub image: String,
    pub og_type: String,
    pub twitter_card: TwitterCard,
    pub structured_data: Option<Value>,
}

impl SeoMeta {
    /// Metadata for `path`; missing title/description fall back to the site defaults
    pub fn new(site: &Site, title: Option<&str>, description: Option<&str>, path: &str) -> Self {
        let title = match title.map(str::trim).filter(|t| !t.is_empty()) {
            Some(t) => format!("{} | {}", t, site.info.name),
            None => site.seo.title.clone(),
        };
        let description = description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| site.seo.description.clone());

        Self {
            site_name: site.info.name.clone(),
            title,
            description,
            canonical_url: site.absolute_url(path),
            image: default_image(site),
            og_type: "website".to_string(),
            twitter_card: TwitterCard::SummaryLargeImage,
            structured_data: None,
        }
    }

    /// Relative images are resolved against the site URL
    pub fn with_image(mut self, site: &Site, image: &str) -> Self {
        if !image.trim().is_empty() {
            self.image = site.absolute_url(image);
        }
        self
    }

    pub fn with_type(mut self, og_type: &str) -> Self {
        self.og_type = og_type.to_string();
        self
    }

    pub fn with_structured_data(mut self, data: Value) -> Self {
        self.structured_data = Some(data);
        self
    }

    /// `<title>`, meta, canonical and JSON-LD tags for the document head
    pub fn render_head(&self) -> String {
        let mut head = String::new();
        let title = html_escape(&self.title);
        let description = html_escape(&self.description);
        let url = html_escape(&self.canonical_url);
        let image = html_escape(&self.image);
        let site_name = html_escape(&self.site_name);

        head.push_str(&format!("<title>{}</title>\n", title));
        push_meta(&mut head, "name", "description", &description);
        push_meta(&mut head, "name", "author", &site_name);
        head.push_str(&format!("<link rel=\"canonical\" href=\"{}\">\n", url));

        push_meta(&mut head, "property", "og:title", &title);
        push_meta(&mut head, "property", "og:description", &description);
        push_meta(&mut head, "property", "og:type", &html_escape(&self.og_type));
        push_meta(&mut head, "property", "og:url", &url);
        push_meta(&mut head, "property", "og:image", &image);
        push_meta(&mut head, "property", "og:site_name", &site_name);
        push_meta(&mut head, "property", "og:locale", OG_LOCALE);

        push_meta(&mut head, "name", "twitter:card", self.twitter_card.as_str());
        push_meta(&mut head, "name", "twitter:title", &title);
        push_meta(&mut head, "name", "twitter:description", &description);
        push_meta(&mut head, "name", "twitter:image", &image);

        if let Some(data) = &self.structured_data {
            // A literal "</" inside the JSON would end the script element
            let json = data.to_string().replace("</", "<\\/");
            head.push_str(&format!(
                "<script type=\"application/ld+json\" data-seo=\"true\">{}</script>\n",
                json
            ));
        }

        head
    }
}

fn push_meta(head: &mut String, attribute: &str, key: &str, content: &str) {
    head.push_str(&format!(
        "<meta {}=\"{}\" content=\"{}\">\n",
        attribute, key, content
    ));
}

fn default_image(site: &Site) -> String {
    match &site.info.default_image {
        Some(path) => site.absolute_url(&path.to_string_lossy()),
        None => site.absolute_url("favicon.png"),
    }
}

fn organization(site: &Site) -> Value {
    json!({
        "@type": "Organization",
        "name": site.info.name,
        "url": site.base_url(),
    })
}

/// schema.org `Blog` for the listing page
pub fn blog_listing_json_ld(site: &Site) -> Value {
    json!({
        "@context": "https://schema.org",
        "@type": "Blog",
        "name": format!("{} Blog", site.info.name),
        "description": "Tadilat ve dekorasyon hakkında güncel bilgiler, ipuçları ve ilham veren içerikler",
        "url": site.absolute_url("blog"),
        "publisher": organization(site),
    })
}

/// Description used for a post: meta description, excerpt, then the text itself
pub fn post_description(post: &BlogPost) -> String {
    post.meta_description
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .or(post.excerpt.as_deref().filter(|e| !e.trim().is_empty()))
        .map(str::to_string)
        .unwrap_or_else(|| get_excerpt(&post.content, DEFAULT_EXCERPT_CHARS))
}

/// schema.org `BlogPosting` for a single post
pub fn blog_posting_json_ld(site: &Site, post: &BlogPost) -> Value {
    let url = site.absolute_url(&format!("blog/{}", post.slug));
    let image = post
        .featured_image
        .as_deref()
        .map(|img| site.absolute_url(img))
        .unwrap_or_else(|| default_image(site));
    let mut publisher = organization(site);
    publisher["logo"] = json!({
        "@type": "ImageObject",
        "url": default_image(site),
    });

    json!({
        "@context": "https://schema.org",
        "@type": "BlogPosting",
        "headline": post.meta_title.as_deref().unwrap_or(&post.title),
        "description": post_description(post),
        "articleBody": get_excerpt(&post.content, 500),
        "author": organization(site),
        "publisher": publisher,
        "datePublished": post.created_at.to_rfc3339(),
        "dateModified": post.updated_at.unwrap_or(post.created_at).to_rfc3339(),
        "image": image,
        "mainEntityOfPage": {
            "@type": "WebPage",
            "@id": url,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::*;
    use chrono::{TimeZone, Utc};

    fn site() -> Site {
        Site {
            info: SiteInfo {
                name: "Tadilat İzmir".to_string(),
                tagline: "Anahtar teslim".to_string(),
                url: "https://tadilatizmir.net/".to_string(),
                default_image: None,
                areas: vec![],
            },
            contact: Contact {
                phone: "+90 533 478 99 23".to_string(),
                phone_display: "0533 478 9923".to_string(),
                whatsapp: "https://wa.me/905334789923".to_string(),
                whatsapp_message: String::new(),
                email: "info@tadilatizmir.net".to_string(),
                address: "İzmir".to_string(),
            },
            seo: SeoDefaults {
                title: "Tadilat İzmir | Varsayılan".to_string(),
                description: "Varsayılan açıklama".to_string(),
            },
            backend: BackendConfig {
                url: "https://example.supabase.co".to_string(),
                anon_key: None,
            },
            pages: vec![],
        }
    }

    fn post() -> BlogPost {
        BlogPost {
            id: "1".to_string(),
            title: "Banyo Rehberi".to_string(),
            slug: "banyo-rehberi".to_string(),
            content: "<p>Banyo yenilerken dikkat edilecekler.</p>".to_string(),
            excerpt: None,
            featured_image: Some("/images/banyo.jpg".to_string()),
            meta_title: None,
            meta_description: None,
            published: Some(true),
            created_at: Utc.with_ymd_and_hms(2025, 1, 5, 8, 0, 0).unwrap(),
            updated_at: None,
        }
    }

    #[test]
    fn test_html_escape_basic_characters() {
        assert_eq!(html_escape("<script>"), "&lt;script&gt;");
        assert_eq!(html_escape("a & b"), "a &amp; b");
        assert_eq!(html_escape("\"x\" 'y'"), "&quot;x&quot; &#x27;y&#x27;");
        assert_eq!(html_escape("Çeşme"), "Çeşme");
    }

    #[test]
    fn test_title_and_description_fallbacks() {
        let site = site();
        let meta = SeoMeta::new(&site, None, Some("  "), "/");
        assert_eq!(meta.title, "Tadilat İzmir | Varsayılan");
        assert_eq!(meta.description, "Varsayılan açıklama");
        assert_eq!(meta.canonical_url, "https://tadilatizmir.net/");
        assert_eq!(meta.image, "https://tadilatizmir.net/favicon.png");

        let meta = SeoMeta::new(&site, Some("Blog"), Some("Yazılar"), "/blog");
        assert_eq!(meta.title, "Blog | Tadilat İzmir");
        assert_eq!(meta.canonical_url, "https://tadilatizmir.net/blog");
    }

    #[test]
    fn test_with_image_resolves_relative_paths() {
        let site = site();
        let meta = SeoMeta::new(&site, None, None, "/").with_image(&site, "/images/a.jpg");
        assert_eq!(meta.image, "https://tadilatizmir.net/images/a.jpg");
        let meta = meta.with_image(&site, "https://cdn.example/b.jpg");
        assert_eq!(meta.image, "https://cdn.example/b.jpg");
    }

    #[test]
    fn test_render_head_escapes_and_includes_og_tags() {
        let site = site();
        let meta = SeoMeta::new(&site, Some("Mutfak <Özel>"), None, "/mutfak-tadilati");
        let head = meta.render_head();
        assert!(head.contains("<title>Mutfak &lt;Özel&gt; | Tadilat İzmir</title>"));
        assert!(head.contains("<meta property=\"og:locale\" content=\"tr_TR\">"));
        assert!(head.contains("<meta name=\"twitter:card\" content=\"summary_large_image\">"));
        assert!(head.contains(
            "<link rel=\"canonical\" href=\"https://tadilatizmir.net/mutfak-tadilati\">"
        ));
        assert!(!head.contains("application/ld+json"));
    }

    #[test]
    fn test_render_head_guards_script_close_in_json_ld() {
        let site = site();
        let meta = SeoMeta::new(&site, None, None, "/")
            .with_structured_data(json!({ "name": "</script><b>" }));
        let head = meta.render_head();
        assert!(head.contains("<\\/script>"));
        assert_eq!(head.matches("</script>").count(), 1);
    }

    #[test]
    fn test_blog_posting_json_ld() {
        let site = site();
        let data = blog_posting_json_ld(&site, &post());
        assert_eq!(data["@type"], "BlogPosting");
        assert_eq!(data["headline"], "Banyo Rehberi");
        assert_eq!(data["image"], "https://tadilatizmir.net/images/banyo.jpg");
        assert_eq!(
            data["mainEntityOfPage"]["@id"],
            "https://tadilatizmir.net/blog/banyo-rehberi"
        );
        assert_eq!(data["dateModified"], data["datePublished"]);
        assert_eq!(data["description"], "Banyo yenilerken dikkat edilecekler.");
    }

    #[test]
    fn test_post_description_prefers_meta_then_excerpt() {
        let mut p = post();
        p.excerpt = Some("Özet".to_string());
        assert_eq!(post_description(&p), "Özet");
        p.meta_description = Some("Meta".to_string());
        assert_eq!(post_description(&p), "Meta");
    }

    #[test]
    fn test_blog_listing_json_ld() {
        let data = blog_listing_json_ld(&site());
        assert_eq!(data["name"], "Tadilat İzmir Blog");
        assert_eq!(data["url"], "https://tadilatizmir.net/blog");
    }
}
