use anyhow::{Context, Result};
use pulldown_cmark::{Options, Parser, html};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
#[cfg(unix)]
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};
use tadilat_backend::admin::{self as panel, EDITABLE_PAGES};
use tadilat_backend::auth::{self, Access};
use tadilat_backend::blog;
use tadilat_backend::{Auth, Backend, Session, SupabaseClient};
use tadilat_core::blog::{BlogPostDraft, format_datetime};
use tadilat_core::{BlogPost, PageContent, renovation_type_label};

use super::load_site;

/// Password for non-interactive sign-in
pub const PASSWORD_ENV: &str = "TADILAT_ADMIN_PASSWORD";

/// Changes to a blog post; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct PostEdit {
    pub file: PathBuf,
    pub id: Option<String>,
    pub title: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub image: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub published: Option<bool>,
}

/// Changes to a landing page's stored texts
#[derive(Debug, Clone, Default)]
pub struct PageEdit {
    pub title: Option<String>,
    pub heading: Option<String>,
    pub body: Option<PathBuf>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
}

// ============================================================================
// Session storage
// ============================================================================

fn session_path() -> Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .context("Could not determine home directory")?;
    Ok(PathBuf::from(home).join(".tadilat").join("session.toml"))
}

fn load_session_from(path: &Path) -> Result<Option<Session>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path).context("Failed to read session file")?;
    let session = toml::from_str(&contents).context("Failed to parse session file")?;
    Ok(Some(session))
}

fn save_session_to(path: &Path, session: &Session) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let contents = toml::to_string_pretty(session).context("Failed to serialize session")?;
    // Holds bearer tokens: owner-only
    let mut options = OpenOptions::new();
    options.truncate(true).write(true).create(true);
    #[cfg(unix)]
    {
        options.mode(0o600);
    }
    let mut file = options.open(path).context("Failed to open session file")?;
    #[cfg(unix)]
    file.set_permissions(fs::Permissions::from_mode(0o600))
        .context("Failed to restrict session file")?;
    file.write_all(contents.as_bytes()).context("Failed to write session file")?;
    file.flush()?;
    Ok(())
}

/// Helper to read user input
fn read_input(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}

/// Backend client for the site, without a session
fn site_client(site_dir: &Path) -> Result<SupabaseClient> {
    let site = load_site(site_dir)?;
    SupabaseClient::from_config(&site.backend).context("Backend not configured")
}

/// Client carrying the stored session; fails unless it belongs to an admin
async fn admin_client(site_dir: &Path) -> Result<SupabaseClient> {
    let session = load_session_from(&session_path()?)?
        .context("Not signed in. Run 'tadilat admin login' first")?;
    let client = site_client(site_dir)?.with_session(session);
    require_admin(&client).await?;
    Ok(client)
}

async fn require_admin<A: Auth + ?Sized>(auth: &A) -> Result<()> {
    match auth::check(auth).await.access(true) {
        Access::Granted => Ok(()),
        Access::Login => anyhow::bail!("Session expired. Run 'tadilat admin login' again"),
        Access::Home => anyhow::bail!("Admin yetkiniz bulunmuyor."),
    }
}

// ============================================================================
// Markdown and edits
// ============================================================================

/// Post bodies are written in markdown and stored as HTML
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options);
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

fn apply_post_edit(draft: &mut BlogPostDraft, edit: PostEdit, markdown: &str) {
    // Slug first so an explicit one is not replaced by the title's
    if let Some(slug) = edit.slug {
        draft.slug = slug;
    }
    if let Some(title) = edit.title {
        draft.set_title(title);
    }
    draft.content = markdown_to_html(markdown);
    if let Some(excerpt) = edit.excerpt {
        draft.excerpt = excerpt;
    }
    if let Some(image) = edit.image {
        draft.featured_image = image;
    }
    if let Some(meta_title) = edit.meta_title {
        draft.meta_title = meta_title;
    }
    if let Some(meta_description) = edit.meta_description {
        draft.meta_description = meta_description;
    }
    if let Some(published) = edit.published {
        draft.published = published;
    }
}

async fn save_post_edit<B: Backend + ?Sized>(backend: &B, edit: PostEdit) -> Result<BlogPost> {
    let markdown = fs::read_to_string(&edit.file)
        .with_context(|| format!("Failed to read {}", edit.file.display()))?;

    let mut draft = match &edit.id {
        Some(id) => BlogPostDraft::from_post(&blog::get_post(backend, id).await?),
        None => BlogPostDraft::default(),
    };
    apply_post_edit(&mut draft, edit, &markdown);

    Ok(blog::save_post(backend, &draft).await?)
}

fn apply_page_edit(page: &mut PageContent, edit: PageEdit) -> Result<()> {
    if let Some(title) = edit.title {
        page.title = Some(title);
    }
    if let Some(heading) = edit.heading {
        page.heading = Some(heading);
    }
    if let Some(path) = edit.body {
        let body = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        page.body = Some(body);
    }
    if let Some(meta_title) = edit.meta_title {
        page.meta_title = Some(meta_title);
    }
    if let Some(meta_description) = edit.meta_description {
        page.meta_description = Some(meta_description);
    }
    Ok(())
}

async fn save_page_edit<B: Backend + ?Sized>(backend: &B, slug: &str, edit: PageEdit) -> Result<()> {
    let mut page = panel::load_page(backend, slug).await?;
    apply_page_edit(&mut page, edit)?;
    panel::save_page(backend, &page).await?;
    Ok(())
}

fn page_label(slug: &str) -> &str {
    EDITABLE_PAGES
        .iter()
        .find(|(s, _)| *s == slug)
        .map(|(_, label)| *label)
        .unwrap_or(slug)
}

// ============================================================================
// Admin Commands
// ============================================================================

pub async fn login(site_dir: PathBuf, email: Option<String>) -> Result<()> {
    println!("🔐 Admin girişi");

    let client = site_client(&site_dir)?;
    let email = match email {
        Some(email) => email,
        None => read_input("Email: ")?,
    };
    let password = match std::env::var(PASSWORD_ENV) {
        Ok(password) => password,
        Err(_) => read_input("Şifre: ")?,
    };

    let session = auth::sign_in(&client, &email, &password).await?;
    let path = session_path()?;
    save_session_to(&path, &session)?;

    println!("✅ Giriş başarılı: {}", email.trim());
    println!("   Session saved to: {}", path.display());
    Ok(())
}

pub async fn logout(site_dir: PathBuf) -> Result<()> {
    let path = session_path()?;
    let Some(session) = load_session_from(&path)? else {
        println!("Not signed in");
        return Ok(());
    };

    let client = site_client(&site_dir)?.with_session(session);
    if let Err(err) = client.sign_out().await {
        eprintln!("   ⚠ Warning: sign-out request failed: {}", err);
    }
    fs::remove_file(&path).context("Failed to remove session file")?;

    println!("👋 Signed out");
    Ok(())
}

pub async fn stats(site_dir: PathBuf) -> Result<()> {
    let client = admin_client(&site_dir).await?;
    let stats = panel::dashboard_stats(&client).await?;

    println!("📊 Dashboard");
    println!("   Toplam talep:       {}", stats.total_contacts);
    println!("   Okunmamış talep:    {}", stats.unread_contacts);
    println!("   Toplam blog yazısı: {}", stats.total_posts);
    println!("   Yayında:            {}", stats.published_posts);
    Ok(())
}

pub async fn contacts(site_dir: PathBuf, unread: bool) -> Result<()> {
    let client = admin_client(&site_dir).await?;
    let contacts = panel::list_contacts(&client, unread).await?;

    if contacts.is_empty() {
        println!("Henüz talep yok.");
        return Ok(());
    }

    for contact in &contacts {
        let marker = if contact.is_read() { " " } else { "●" };
        println!(
            "{} {}  {}  {}",
            marker,
            format_datetime(&contact.created_at),
            contact.name,
            contact.phone
        );
        println!(
            "    {} / {}",
            contact.district.as_deref().unwrap_or("-"),
            renovation_type_label(contact.renovation_type.as_deref())
        );
        if let Some(details) = &contact.details {
            println!("    {}", details);
        }
        println!("    id: {}", contact.id);
    }
    println!();
    println!("{} talep", contacts.len());
    Ok(())
}

pub async fn read(site_dir: PathBuf, id: String) -> Result<()> {
    let client = admin_client(&site_dir).await?;
    let contact = panel::mark_as_read(&client, &id).await?;
    println!("✓ Okundu olarak işaretlendi: {}", contact.name);
    Ok(())
}

pub async fn posts(site_dir: PathBuf) -> Result<()> {
    let client = admin_client(&site_dir).await?;
    let posts = blog::list_posts(&client).await?;

    if posts.is_empty() {
        println!("Henüz blog yazısı yok.");
        return Ok(());
    }

    for post in &posts {
        let status = if post.is_published() { "Yayında" } else { "Taslak " };
        println!(
            "[{}] {}  {}  /blog/{}",
            status,
            format_datetime(&post.created_at),
            post.title,
            post.slug
        );
        println!("          id: {}", post.id);
    }
    Ok(())
}

pub async fn post_save(site_dir: PathBuf, edit: PostEdit) -> Result<()> {
    let client = admin_client(&site_dir).await?;
    let creating = edit.id.is_none();
    let post = save_post_edit(&client, edit).await?;

    if creating {
        println!("✅ Blog yazısı oluşturuldu: {}", post.title);
    } else {
        println!("✅ Blog yazısı güncellendi: {}", post.title);
    }
    println!("   /blog/{}  (id: {})", post.slug, post.id);
    if !post.is_published() {
        println!("   💡 Taslak olarak kaydedildi. Yayınlamak için --publish kullanın");
    }
    Ok(())
}

pub async fn post_delete(site_dir: PathBuf, id: String) -> Result<()> {
    let client = admin_client(&site_dir).await?;
    blog::delete_post(&client, &id).await?;
    println!("🗑  Blog yazısı silindi: {}", id);
    Ok(())
}

pub async fn page(site_dir: PathBuf, slug: String) -> Result<()> {
    let client = admin_client(&site_dir).await?;
    let page = panel::load_page(&client, &slug).await?;

    let show = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
    println!("📄 {} (/{})", page_label(&slug), page.slug);
    println!("   Başlık:          {}", show(&page.title));
    println!("   Ana başlık:      {}", show(&page.heading));
    println!("   Meta başlık:     {}", show(&page.meta_title));
    println!("   Meta açıklama:   {}", show(&page.meta_description));
    if let Some(updated) = &page.updated_at {
        println!("   Güncellendi:     {}", format_datetime(updated));
    }
    if let Some(body) = &page.body {
        println!();
        println!("{}", body);
    }
    Ok(())
}

pub async fn page_save(site_dir: PathBuf, slug: String, edit: PageEdit) -> Result<()> {
    let client = admin_client(&site_dir).await?;
    save_page_edit(&client, &slug, edit).await?;
    println!("✅ Sayfa içeriği kaydedildi: {}", page_label(&slug));
    Ok(())
}
