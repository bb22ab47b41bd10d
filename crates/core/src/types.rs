use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Complete site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    pub info: SiteInfo,
    pub contact: Contact,
    pub seo: SeoDefaults,
    pub backend: BackendConfig,
    pub pages: Vec<LandingPage>,
}

impl Site {
    /// Site URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.info.url.trim_end_matches('/')
    }

    /// Absolute URL for a site-relative path
    pub fn absolute_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url(), path.trim_start_matches('/'))
    }

    pub fn page(&self, slug: &str) -> Option<&LandingPage> {
        self.pages.iter().find(|p| p.slug == slug)
    }

    pub fn pages_of_kind(&self, kind: PageKind) -> impl Iterator<Item = &LandingPage> {
        self.pages.iter().filter(move |p| p.kind == kind)
    }
}

/// Business identity shown across every page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteInfo {
    pub name: String,
    pub tagline: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_image: Option<PathBuf>,
    pub areas: Vec<String>,
}

/// Contact channels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub phone: String,
    pub phone_display: String,
    pub whatsapp: String,
    pub whatsapp_message: String,
    pub email: String,
    pub address: String,
}

impl Contact {
    /// `tel:` link target with whitespace removed
    pub fn tel_href(&self) -> String {
        let digits: String = self.phone.chars().filter(|c| !c.is_whitespace()).collect();
        format!("tel:{}", digits)
    }
}

/// Fallback title and description for pages without their own
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeoDefaults {
    pub title: String,
    pub description: String,
}

/// Hosted backend connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anon_key: Option<String>,
}

/// Service or location landing page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandingPage {
    pub slug: String,
    pub kind: PageKind,
    pub title: String,
    pub description: String,
    pub meta_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<PathBuf>,
    pub content: Vec<String>,
}

impl LandingPage {
    pub fn path(&self) -> String {
        format!("/{}", self.slug)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    Service,
    Location,
}

/// Renovation category offered in the contact form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RenovationType {
    #[serde(rename = "mutfak")]
    Kitchen,
    #[serde(rename = "banyo")]
    Bathroom,
    #[serde(rename = "komple")]
    FullHome,
    #[serde(rename = "diger")]
    Other,
}

impl RenovationType {
    pub const ALL: [RenovationType; 4] = [
        RenovationType::Kitchen,
        RenovationType::Bathroom,
        RenovationType::FullHome,
        RenovationType::Other,
    ];

    /// Key stored in the `renovation_type` column
    pub fn key(self) -> &'static str {
        match self {
            RenovationType::Kitchen => "mutfak",
            RenovationType::Bathroom => "banyo",
            RenovationType::FullHome => "komple",
            RenovationType::Other => "diger",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RenovationType::Kitchen => "Mutfak Tadilatı",
            RenovationType::Bathroom => "Banyo Tadilatı",
            RenovationType::FullHome => "Komple Ev Tadilatı",
            RenovationType::Other => "Diğer",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.key() == key)
    }
}

impl fmt::Display for RenovationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for RenovationType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_key(s).ok_or_else(|| format!("unknown renovation type '{}'", s))
    }
}

/// Label for a stored renovation type key; unknown keys are shown as-is
pub fn renovation_type_label(key: Option<&str>) -> String {
    match key {
        Some(k) => RenovationType::from_key(k)
            .map(|t| t.label().to_string())
            .unwrap_or_else(|| k.to_string()),
        None => "-".to_string(),
    }
}

/// Row of the `contact_submissions` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub district: Option<String>,
    pub renovation_type: Option<String>,
    pub details: Option<String>,
    pub is_read: Option<bool>,
    pub created_at: DateTime<Utc>,
}

impl ContactSubmission {
    pub fn is_read(&self) -> bool {
        self.is_read.unwrap_or(false)
    }
}

/// Row of the `blog_posts` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub published: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl BlogPost {
    pub fn is_published(&self) -> bool {
        self.published.unwrap_or(false)
    }
}

/// Row of the `page_content` table: admin overrides for a landing page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub slug: String,
    pub title: Option<String>,
    pub heading: Option<String>,
    pub body: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl PageContent {
    pub fn empty(slug: &str) -> Self {
        Self {
            slug: slug.to_string(),
            ..Self::default()
        }
    }
}

/// Backend-managed content merged into the rendered site
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteContent {
    /// Published posts, newest first
    pub posts: Vec<BlogPost>,
    pub pages: Vec<PageContent>,
}

impl SiteContent {
    pub fn page(&self, slug: &str) -> Option<&PageContent> {
        self.pages.iter().find(|p| p.slug == slug)
    }

    pub fn post(&self, slug: &str) -> Option<&BlogPost> {
        self.posts.iter().find(|p| p.slug == slug)
    }
}

/// Counters shown on the admin dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_contacts: u64,
    pub unread_contacts: u64,
    pub total_posts: u64,
    pub published_posts: u64,
}
