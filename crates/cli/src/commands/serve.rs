use anyhow::{Context, Result};
use axum::{
    Form, Router,
    extract::{Path as UrlPath, Request, State},
    http::{Method, StatusCode, header},
    response::{
        Html, IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::{get, post},
};
use notify::{Event as NotifyEvent, EventKind, RecursiveMode, Watcher};
use serde::Deserialize;
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tadilat_backend::blog::{load_site_content, published_post};
use tadilat_backend::{Backend, ContactSubmissions, MemoryBackend, SupabaseClient};
use tadilat_core::config::PUBLIC_DIR;
use tadilat_core::lead::{ContactForm, Field, FormView, SubmitOutcome};
use tadilat_core::seo::html_escape;
use tadilat_core::{Site, SiteContent};
use tadilat_generator::components::CONTACT_ACTION;
use tadilat_generator::{RenderOptions, STYLESHEET, generate_robots, generate_sitemap, pages};
use tokio::sync::broadcast;
use tower::ServiceExt;
use tower_http::services::ServeDir;
use tracing::{info, warn};

use super::load_site;

#[derive(Clone)]
struct AppState {
    root: PathBuf,
    backend: Arc<dyn Backend>,
    options: RenderOptions,
    reload_tx: broadcast::Sender<()>,
}

impl AppState {
    /// site.toml is re-read on every request so edits show up without a restart
    fn site(&self) -> Result<Site> {
        load_site(&self.root)
    }

    async fn content(&self) -> SiteContent {
        match load_site_content(self.backend.as_ref()).await {
            Ok(content) => content,
            Err(err) => {
                warn!(%err, "backend content unavailable, rendering site.toml only");
                SiteContent::default()
            }
        }
    }
}

/// Fields posted by the contact form
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ContactInput {
    action: String,
    name: String,
    phone: String,
    district: String,
    #[serde(rename = "type")]
    renovation_type: String,
    details: String,
    website: String,
}

impl ContactInput {
    fn into_fields(self) -> [(Field, String); 6] {
        [
            (Field::Name, self.name),
            (Field::Phone, self.phone),
            (Field::District, self.district),
            (Field::RenovationType, self.renovation_type),
            (Field::Details, self.details),
            (Field::Honeypot, self.website),
        ]
    }
}

/// Serve the site locally: pages rendered per request, a working contact
/// form and optional live reload.
pub async fn run(path: PathBuf, port: u16, offline: bool, live_reload: bool) -> Result<()> {
    println!("🏠 Starting local server...");
    println!("   Site: {}", path.display());

    let site = load_site(&path)?;
    println!("   ✓ Loaded: {}", site.info.name);
    println!("   ✓ Landing pages: {}", site.pages.len());

    let backend: Arc<dyn Backend> = if offline {
        println!("   📴 Offline: contact requests are kept in memory");
        Arc::new(MemoryBackend::new())
    } else {
        let client = SupabaseClient::from_config(&site.backend)
            .context("Backend not configured (use --offline to serve without it)")?;
        println!("   ✓ Backend: {}", client.base_url());
        Arc::new(client)
    };

    let (reload_tx, _) = broadcast::channel::<()>(100);

    let state = AppState {
        root: path.clone(),
        backend,
        options: RenderOptions {
            preview: live_reload,
        },
        reload_tx: reload_tx.clone(),
    };

    let app = router(state);

    if live_reload {
        let watcher_path = path.clone();
        tokio::spawn(async move {
            if let Err(e) = watch_files(watcher_path, reload_tx).await {
                warn!(error = %e, "file watcher stopped");
            }
        });
    }

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    println!("\n🚀 Site ready at: http://localhost:{}", port);
    println!("   Press Ctrl+C to stop\n");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to port")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home_handler))
        .route(CONTACT_ACTION, post(contact_handler))
        .route("/blog", get(blog_index_handler))
        .route("/blog/{slug}", get(blog_post_handler))
        .route("/style.css", get(stylesheet_handler))
        .route("/sitemap.xml", get(sitemap_handler))
        .route("/robots.txt", get(robots_handler))
        .route("/_reload", get(sse_handler))
        .fallback(fallback_handler)
        .with_state(state)
}

/// Watch for file changes and trigger reload
async fn watch_files(path: PathBuf, reload_tx: broadcast::Sender<()>) -> Result<()> {
    let (tx, mut rx) = tokio::sync::mpsc::channel(100);

    let mut watcher =
        notify::recommended_watcher(move |res: Result<NotifyEvent, notify::Error>| {
            if let Ok(event) = res {
                let _ = tx.blocking_send(event);
            }
        })?;

    watcher.watch(&path, RecursiveMode::Recursive)?;

    while let Some(event) = rx.recv().await {
        if let EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_) = event.kind
            && event.paths.iter().any(|p| {
                let filename = p.file_name().unwrap_or_default().to_string_lossy();
                !filename.starts_with('.') && !filename.ends_with('~')
            })
        {
            println!("   📝 File changed, reloading...");
            let _ = reload_tx.send(());
        }
    }

    Ok(())
}

/// SSE endpoint for live reload
async fn sse_handler(
    State(state): State<AppState>,
) -> Sse<impl futures::Stream<Item = Result<Event, std::convert::Infallible>>> {
    let mut rx = state.reload_tx.subscribe();

    let stream = async_stream::stream! {
        loop {
            if rx.recv().await.is_ok() {
                yield Ok(Event::default().data("reload"));
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

fn config_error(err: anyhow::Error) -> Response {
    let body = format!(
        "<!DOCTYPE html>\n<html lang=\"tr\"><body><h1>site.toml hatası</h1><pre>{}</pre></body></html>",
        html_escape(&format!("{:#}", err))
    );
    (StatusCode::INTERNAL_SERVER_ERROR, Html(body)).into_response()
}

fn not_found(site: &Site, options: &RenderOptions) -> Response {
    (
        StatusCode::NOT_FOUND,
        Html(pages::not_found_page(site, options)),
    )
        .into_response()
}

async fn home_handler(State(state): State<AppState>) -> Response {
    match state.site() {
        Ok(site) => Html(pages::home_page(&site, &FormView::empty(), &state.options)).into_response(),
        Err(e) => config_error(e),
    }
}

/// Form post: one `ContactForm` per request, re-rendered with its outcome
async fn contact_handler(State(state): State<AppState>, Form(input): Form<ContactInput>) -> Response {
    let site = match state.site() {
        Ok(site) => site,
        Err(e) => return config_error(e),
    };

    let mut form = ContactForm::new(ContactSubmissions::new(Arc::clone(&state.backend)));

    if input.action == "new" {
        form.new_request();
    } else {
        for (field, value) in input.into_fields() {
            form.set_field(field, value);
        }
        match form.submit().await {
            SubmitOutcome::Submitted => info!("contact request received"),
            SubmitOutcome::Invalid(errors) => info!(errors = errors.len(), "contact form rejected"),
            SubmitOutcome::Failed(err) => warn!(%err, "contact request not stored"),
            SubmitOutcome::Ignored => {}
        }
    }

    Html(pages::home_page(&site, &form.view(), &state.options)).into_response()
}

async fn blog_index_handler(State(state): State<AppState>) -> Response {
    let site = match state.site() {
        Ok(site) => site,
        Err(e) => return config_error(e),
    };
    let content = state.content().await;
    Html(pages::blog_index_page(&site, &content.posts, &state.options)).into_response()
}

async fn blog_post_handler(State(state): State<AppState>, UrlPath(slug): UrlPath<String>) -> Response {
    let site = match state.site() {
        Ok(site) => site,
        Err(e) => return config_error(e),
    };
    match published_post(state.backend.as_ref(), &slug).await {
        Ok(Some(post)) => Html(pages::blog_post_page(&site, &post, &state.options)).into_response(),
        Ok(None) => not_found(&site, &state.options),
        Err(err) => {
            warn!(%err, %slug, "failed to load blog post");
            not_found(&site, &state.options)
        }
    }
}

async fn stylesheet_handler() -> Response {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], STYLESHEET).into_response()
}

async fn sitemap_handler(State(state): State<AppState>) -> Response {
    let site = match state.site() {
        Ok(site) => site,
        Err(e) => return config_error(e),
    };
    let content = state.content().await;
    (
        [(header::CONTENT_TYPE, "application/xml")],
        generate_sitemap(&site, &content),
    )
        .into_response()
}

async fn robots_handler(State(state): State<AppState>) -> Response {
    match state.site() {
        Ok(site) => ([(header::CONTENT_TYPE, "text/plain")], generate_robots(&site)).into_response(),
        Err(e) => config_error(e),
    }
}

/// Landing pages by slug, then files from `public/`, then the 404 page
async fn fallback_handler(State(state): State<AppState>, request: Request) -> Response {
    let site = match state.site() {
        Ok(site) => site,
        Err(e) => return config_error(e),
    };

    let slug = request.uri().path().trim_matches('/').to_string();
    if request.method() == Method::GET
        && let Some(page) = site.page(&slug)
    {
        let content = state.content().await;
        let html = pages::landing_page(
            &site,
            page,
            content.page(&slug),
            &FormView::empty(),
            &state.options,
        );
        return Html(html).into_response();
    }

    match ServeDir::new(state.root.join(PUBLIC_DIR)).oneshot(request).await {
        Ok(response) if response.status() != StatusCode::NOT_FOUND => response.into_response(),
        _ => not_found(&site, &state.options),
    }
}
