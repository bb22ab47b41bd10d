//! Blog helpers: slugs, reading time, excerpts and the admin post draft.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::BlogPost;

pub const SLUG_MAX_CHARS: usize = 100;
pub const WORDS_PER_MINUTE: usize = 200;
pub const DEFAULT_EXCERPT_CHARS: usize = 160;

const TR_MONTHS: [&str; 12] = [
    "Oca", "Şub", "Mar", "Nis", "May", "Haz", "Tem", "Ağu", "Eyl", "Eki", "Kas", "Ara",
];

/// URL slug from a (Turkish) title: "Banyo Tadilatı İpuçları" -> "banyo-tadilati-ipuclari"
pub fn generate_slug(title: &str) -> String {
    let folded: String = title
        .trim()
        .chars()
        .flat_map(|c| {
            let mapped = match c {
                'ğ' | 'Ğ' => Some('g'),
                'ü' | 'Ü' => Some('u'),
                'ş' | 'Ş' => Some('s'),
                'ı' | 'İ' => Some('i'),
                'ö' | 'Ö' => Some('o'),
                'ç' | 'Ç' => Some('c'),
                _ => None,
            };
            match mapped {
                Some(m) => vec![m],
                None => c.to_lowercase().collect(),
            }
        })
        .collect();

    let mut slug = String::with_capacity(folded.len());
    let mut pending_dash = false;
    for c in folded.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    let truncated: String = slug.chars().take(SLUG_MAX_CHARS).collect();
    truncated.trim_end_matches('-').to_string()
}

/// Plain text of an HTML fragment, whitespace collapsed
pub fn strip_tags(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(open) = rest.find('<') {
        // A `<` with no closing `>` is plain text
        let Some(close) = rest[open..].find('>') else {
            break;
        };
        text.push_str(&rest[..open]);
        text.push(' ');
        rest = &rest[open + close + 1..];
    }
    text.push_str(rest);
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Minutes to read at 200 words per minute, never less than one
pub fn calculate_reading_time(html: &str) -> usize {
    let words = strip_tags(html).split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1)
}

/// First `max_chars` characters of plain text, with "..." when cut
pub fn get_excerpt(html: &str, max_chars: usize) -> String {
    let text = strip_tags(html);
    if text.chars().count() <= max_chars {
        return text;
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}

/// True if the editor output has any visible text
pub fn has_content(html: &str) -> bool {
    let trimmed = html.trim();
    if trimmed.is_empty() || matches!(trimmed, "<p></p>" | "<p><br></p>" | "<p><br/></p>") {
        return false;
    }
    !strip_tags(trimmed).is_empty()
}

/// Trimmed value, or None for blank input
pub fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn istanbul(dt: &DateTime<Utc>) -> DateTime<FixedOffset> {
    // Turkey stays on UTC+3 all year
    match FixedOffset::east_opt(3 * 3600) {
        Some(offset) => dt.with_timezone(&offset),
        None => dt.fixed_offset(),
    }
}

/// "05 Mar 2025"
pub fn format_date(dt: &DateTime<Utc>) -> String {
    use chrono::Datelike;
    let local = istanbul(dt);
    format!(
        "{:02} {} {}",
        local.day(),
        TR_MONTHS[local.month0() as usize],
        local.year()
    )
}

/// "05 Mar 2025 12:30"
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    let local = istanbul(dt);
    format!("{} {}", format_date(dt), local.format("%H:%M"))
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("Başlık ve slug zorunludur.")]
    MissingTitleOrSlug,
    #[error("İçerik zorunludur. Lütfen blog yazısı içeriğini girin.")]
    MissingContent,
}

/// Post being edited in the admin panel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogPostDraft {
    pub id: Option<String>,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: String,
    pub featured_image: String,
    pub meta_title: String,
    pub meta_description: String,
    pub published: bool,
}

impl BlogPostDraft {
    pub fn from_post(post: &BlogPost) -> Self {
        Self {
            id: Some(post.id.clone()),
            title: post.title.clone(),
            slug: post.slug.clone(),
            content: post.content.clone(),
            excerpt: post.excerpt.clone().unwrap_or_default(),
            featured_image: post.featured_image.clone().unwrap_or_default(),
            meta_title: post.meta_title.clone().unwrap_or_default(),
            meta_description: post.meta_description.clone().unwrap_or_default(),
            published: post.is_published(),
        }
    }

    /// Set the title; an empty slug follows it
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        if self.slug.is_empty() {
            self.slug = generate_slug(&self.title);
        }
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Row to write: required fields checked, blank optionals as null
    pub fn to_payload(&self) -> Result<BlogPostPayload, DraftError> {
        let (Some(title), Some(slug)) = (non_empty(&self.title), non_empty(&self.slug)) else {
            return Err(DraftError::MissingTitleOrSlug);
        };
        if !has_content(&self.content) {
            return Err(DraftError::MissingContent);
        }

        Ok(BlogPostPayload {
            title,
            slug,
            content: self.content.trim().to_string(),
            excerpt: non_empty(&self.excerpt),
            featured_image: non_empty(&self.featured_image),
            meta_title: non_empty(&self.meta_title),
            meta_description: non_empty(&self.meta_description),
            published: self.published,
        })
    }
}

/// Body of a `blog_posts` insert or update
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlogPostPayload {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub published: bool,
}
