// Admin panel operations: contact inbox, dashboard counters, page overrides

use chrono::{SecondsFormat, Utc};
use serde_json::json;
use tadilat_core::blog::{DraftError, non_empty};
use tadilat_core::{ContactSubmission, DashboardStats, PageContent};
use thiserror::Error;
use tracing::info;

use crate::error::BackendError;
use crate::query::Query;
use crate::{BLOG_TABLE, Backend, CONTACT_TABLE, PAGE_TABLE, decode_row, decode_rows};

/// Landing pages whose text can be overridden from the admin panel
pub const EDITABLE_PAGES: [(&str, &str); 16] = [
    ("mutfak-tadilati", "Mutfak Tadilatı"),
    ("banyo-tadilati", "Banyo Tadilatı"),
    ("komple-ev-tadilati", "Komple Ev Tadilatı"),
    ("ic-mimarlik", "İç Mimarlık"),
    ("bornova-tadilat", "Bornova Tadilat"),
    ("karsiyaka-tadilat", "Karşıyaka Tadilat"),
    ("buca-tadilat", "Buca Tadilat"),
    ("konak-tadilat", "Konak Tadilat"),
    ("alsancak-tadilat", "Alsancak Tadilat"),
    ("gaziemir-tadilat", "Gaziemir Tadilat"),
    ("mavisehir-tadilat", "Mavişehir Tadilat"),
    ("narlidere-tadilat", "Narlıdere Tadilat"),
    ("urla-tadilat", "Urla Tadilat"),
    ("cesme-tadilat", "Çeşme Tadilat"),
    ("guzelbahce-tadilat", "Güzelbahçe Tadilat"),
    ("bayrakli-tadilat", "Bayraklı Tadilat"),
];

pub fn is_editable_page(slug: &str) -> bool {
    EDITABLE_PAGES.iter().any(|(s, _)| *s == slug)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdminError {
    #[error("{0}")]
    Draft(#[from] DraftError),
    #[error("Bu slug zaten kullanılıyor. Lütfen farklı bir slug girin.")]
    SlugTaken,
    #[error("Kayıt bulunamadı: {0}")]
    NotFound(String),
    #[error("Düzenlenebilir bir sayfa değil: {0}")]
    UnknownPage(String),
    #[error("İşlem başarısız: {0}")]
    Backend(#[from] BackendError),
}

pub type Result<T> = std::result::Result<T, AdminError>;

/// Contact requests, newest first
pub async fn list_contacts<B: Backend + ?Sized>(
    backend: &B,
    unread_only: bool,
) -> Result<Vec<ContactSubmission>> {
    let mut query = Query::new().order("created_at", false);
    if unread_only {
        query = query.eq("is_read", false);
    }
    let rows = backend.select(CONTACT_TABLE, &query).await?;
    Ok(decode_rows(rows)?)
}

pub async fn mark_as_read<B: Backend + ?Sized>(backend: &B, id: &str) -> Result<ContactSubmission> {
    let rows = backend
        .update(CONTACT_TABLE, &Query::by("id", id), json!({ "is_read": true }))
        .await?;
    let row = rows
        .into_iter()
        .next()
        .ok_or_else(|| AdminError::NotFound(id.to_string()))?;
    info!(id, "contact marked as read");
    Ok(decode_row(row)?)
}

/// Dashboard counters, fetched concurrently
pub async fn dashboard_stats<B: Backend + ?Sized>(backend: &B) -> Result<DashboardStats> {
    let all = Query::new();
    let unread = Query::by("is_read", false);
    let published = Query::by("published", true);

    let (total_contacts, unread_contacts, total_posts, published_posts) = tokio::try_join!(
        backend.count(CONTACT_TABLE, &all),
        backend.count(CONTACT_TABLE, &unread),
        backend.count(BLOG_TABLE, &all),
        backend.count(BLOG_TABLE, &published),
    )?;

    Ok(DashboardStats {
        total_contacts,
        unread_contacts,
        total_posts,
        published_posts,
    })
}

/// Stored overrides for `slug`, or an empty record when none exist yet
pub async fn load_page<B: Backend + ?Sized>(backend: &B, slug: &str) -> Result<PageContent> {
    if !is_editable_page(slug) {
        return Err(AdminError::UnknownPage(slug.to_string()));
    }
    let rows = backend
        .select(PAGE_TABLE, &Query::by("slug", slug).limit(1))
        .await?;
    match rows.into_iter().next() {
        Some(row) => Ok(decode_row(row)?),
        None => Ok(PageContent::empty(slug)),
    }
}

/// All stored page overrides
pub async fn list_pages<B: Backend + ?Sized>(backend: &B) -> Result<Vec<PageContent>> {
    let rows = backend.select(PAGE_TABLE, &Query::new()).await?;
    Ok(decode_rows(rows)?)
}

/// Upsert page overrides by slug; blank fields are cleared
pub async fn save_page<B: Backend + ?Sized>(backend: &B, page: &PageContent) -> Result<()> {
    if !is_editable_page(&page.slug) {
        return Err(AdminError::UnknownPage(page.slug.clone()));
    }

    let text = |value: &Option<String>| value.as_deref().and_then(non_empty);
    let row = json!({
        "slug": page.slug,
        "title": text(&page.title),
        "heading": text(&page.heading),
        "body": text(&page.body),
        "meta_title": text(&page.meta_title),
        "meta_description": text(&page.meta_description),
        "updated_at": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    });

    backend.upsert(PAGE_TABLE, row, "slug").await?;
    info!(slug = %page.slug, "page content saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryBackend;
    use pretty_assertions::assert_eq;

    fn contacts() -> MemoryBackend {
        MemoryBackend::new().with_rows(
            CONTACT_TABLE,
            vec![
                json!({
                    "id": "c1", "name": "Ali", "phone": "05321234567",
                    "district": "Buca", "renovation_type": "mutfak", "details": null,
                    "is_read": true, "created_at": "2025-01-01T09:00:00Z"
                }),
                json!({
                    "id": "c2", "name": "Ayşe", "phone": "05441234567",
                    "district": null, "renovation_type": "banyo", "details": "acil",
                    "is_read": false, "created_at": "2025-02-01T09:00:00Z"
                }),
            ],
        )
    }

    #[tokio::test]
    async fn test_list_contacts_newest_first() {
        let backend = contacts();
        let list = list_contacts(&backend, false).await.unwrap();
        let ids: Vec<&str> = list.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c2", "c1"]);

        let unread = list_contacts(&backend, true).await.unwrap();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].name, "Ayşe");
    }

    #[tokio::test]
    async fn test_mark_as_read() {
        let backend = contacts();
        let contact = mark_as_read(&backend, "c2").await.unwrap();
        assert!(contact.is_read());
        assert!(list_contacts(&backend, true).await.unwrap().is_empty());

        assert_eq!(
            mark_as_read(&backend, "missing").await,
            Err(AdminError::NotFound("missing".to_string()))
        );
    }

    #[tokio::test]
    async fn test_dashboard_stats() {
        let backend = contacts().with_rows(
            BLOG_TABLE,
            vec![
                json!({ "slug": "a", "published": true }),
                json!({ "slug": "b", "published": false }),
                json!({ "slug": "c", "published": true }),
            ],
        );
        let stats = dashboard_stats(&backend).await.unwrap();
        assert_eq!(
            stats,
            DashboardStats {
                total_contacts: 2,
                unread_contacts: 1,
                total_posts: 3,
                published_posts: 2,
            }
        );
    }

    #[tokio::test]
    async fn test_load_page_defaults_to_empty_record() {
        let backend = MemoryBackend::new();
        let page = load_page(&backend, "urla-tadilat").await.unwrap();
        assert_eq!(page, PageContent::empty("urla-tadilat"));

        assert_eq!(
            load_page(&backend, "hakkimizda").await,
            Err(AdminError::UnknownPage("hakkimizda".to_string()))
        );
    }

    #[tokio::test]
    async fn test_save_page_normalizes_and_upserts() {
        let backend = MemoryBackend::new();
        let mut page = PageContent::empty("cesme-tadilat");
        page.title = Some("  Çeşme Tadilat  ".to_string());
        page.body = Some("   ".to_string());
        save_page(&backend, &page).await.unwrap();

        page.heading = Some("Yazlık Yenileme".to_string());
        save_page(&backend, &page).await.unwrap();

        let rows = backend.rows(PAGE_TABLE).await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["title"], "Çeşme Tadilat");
        assert_eq!(rows[0]["body"], serde_json::Value::Null);
        assert!(rows[0]["updated_at"].is_string());

        let loaded = load_page(&backend, "cesme-tadilat").await.unwrap();
        assert_eq!(loaded.heading.as_deref(), Some("Yazlık Yenileme"));
    }
}
