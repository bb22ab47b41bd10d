use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use tadilat_core::blog::BlogPostDraft;
use tadilat_core::{BlogPost, SiteContent};
use tracing::info;

use crate::admin::{AdminError, Result, list_pages};
use crate::error::BackendError;
use crate::query::Query;
use crate::{BLOG_TABLE, Backend, decode_row, decode_rows};

fn newest_first() -> Query {
    Query::new().order("created_at", false)
}

/// Every post, drafts included, newest first
pub async fn list_posts<B: Backend + ?Sized>(backend: &B) -> Result<Vec<BlogPost>> {
    let rows = backend.select(BLOG_TABLE, &newest_first()).await?;
    Ok(decode_rows(rows)?)
}

pub async fn get_post<B: Backend + ?Sized>(backend: &B, id: &str) -> Result<BlogPost> {
    let rows = backend
        .select(BLOG_TABLE, &Query::by("id", id).limit(1))
        .await?;
    match rows.into_iter().next() {
        Some(row) => Ok(decode_row(row)?),
        None => Err(AdminError::NotFound(id.to_string())),
    }
}

fn slug_conflict(err: BackendError) -> AdminError {
    if err.is_unique_violation() {
        AdminError::SlugTaken
    } else {
        AdminError::Backend(err)
    }
}

/// Insert a new post or update an existing one
pub async fn save_post<B: Backend + ?Sized>(backend: &B, draft: &BlogPostDraft) -> Result<BlogPost> {
    let payload = draft.to_payload()?;
    let mut row = serde_json::to_value(&payload).map_err(BackendError::from)?;

    let saved = match &draft.id {
        None => backend
            .insert_returning(BLOG_TABLE, row)
            .await
            .map_err(slug_conflict)?,
        Some(id) => {
            if let Value::Object(fields) = &mut row {
                fields.insert(
                    "updated_at".to_string(),
                    Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
                );
            }
            backend
                .update(BLOG_TABLE, &Query::by("id", id), row)
                .await
                .map_err(slug_conflict)?
                .into_iter()
                .next()
                .ok_or_else(|| AdminError::NotFound(id.clone()))?
        }
    };

    let post: BlogPost = decode_row(saved)?;
    info!(slug = %post.slug, published = post.is_published(), "blog post saved");
    Ok(post)
}

pub async fn delete_post<B: Backend + ?Sized>(backend: &B, id: &str) -> Result<()> {
    backend.delete(BLOG_TABLE, &Query::by("id", id)).await?;
    info!(id, "blog post deleted");
    Ok(())
}

/// Published posts for the public blog, newest first
pub async fn published_posts<B: Backend + ?Sized>(backend: &B) -> Result<Vec<BlogPost>> {
    let rows = backend
        .select(BLOG_TABLE, &newest_first().eq("published", true))
        .await?;
    Ok(decode_rows(rows)?)
}

/// One published post by slug; drafts are not visible
pub async fn published_post<B: Backend + ?Sized>(
    backend: &B,
    slug: &str,
) -> Result<Option<BlogPost>> {
    let query = Query::by("slug", slug).eq("published", true).limit(1);
    let rows = backend.select(BLOG_TABLE, &query).await?;
    match rows.into_iter().next() {
        Some(row) => Ok(Some(decode_row(row)?)),
        None => Ok(None),
    }
}

/// Everything the public site renders from the backend
pub async fn load_site_content<B: Backend + ?Sized>(backend: &B) -> Result<SiteContent> {
    let (posts, pages) = tokio::try_join!(published_posts(backend), list_pages(backend))?;
    Ok(SiteContent { posts, pages })
}
