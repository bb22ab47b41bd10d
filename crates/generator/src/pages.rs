use leptos::prelude::*;
use tadilat_core::lead::FormView;
use tadilat_core::seo::{SeoMeta, blog_listing_json_ld, blog_posting_json_ld, post_description};
use tadilat_core::{BlogPost, LandingPage, PageContent, PageKind, Site};

use crate::RenderOptions;
use crate::components::*;
use crate::document::render_document;

/// Render a view to an HTML string under a fresh reactive owner
fn render<V: IntoView>(build: impl FnOnce() -> V) -> String {
    let owner = Owner::new();
    owner.with(|| build().to_html())
}

fn pages_of(site: &Site, kind: PageKind) -> Vec<LandingPage> {
    site.pages_of_kind(kind).cloned().collect()
}

#[component]
fn Layout(site: Site, preview: bool, children: Children) -> impl IntoView {
    let services = pages_of(&site, PageKind::Service);
    let areas = pages_of(&site, PageKind::Location);
    let whatsapp = whatsapp_href(&site.contact);

    view! {
        <Header site_name={site.info.name.clone()} contact={site.contact.clone()} />
        <main>{children()}</main>
        <Footer
            site_name={site.info.name.clone()}
            tagline={site.info.tagline.clone()}
            contact={site.contact.clone()}
            services=services
            areas=areas
            preview=preview
        />
        <WhatsAppButton href=whatsapp />
    }
}

fn district_hint(site: &Site) -> String {
    let first = site.info.areas.first().map(String::as_str).unwrap_or("Bornova");
    format!("Örn: {}, Atatürk Mahallesi", first)
}

/// Non-blank override value
fn pick(value: &Option<String>) -> Option<String> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

/// Blank-line separated text as paragraphs
fn paragraphs(text: &str) -> Vec<String> {
    text.split("\n\n")
        .map(|p| p.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|p| !p.is_empty())
        .collect()
}

pub fn home_page(site: &Site, form: &FormView, options: &RenderOptions) -> String {
    let meta = SeoMeta::new(site, None, None, "/");
    let site_owned = site.clone();
    let services = pages_of(site, PageKind::Service);
    let areas = pages_of(site, PageKind::Location);
    let hero_title = site.info.tagline.clone();
    let hero_lead = site.seo.description.clone();
    let whatsapp = whatsapp_href(&site.contact);
    let hint = district_hint(site);
    let form = form.clone();
    let preview = options.preview;

    let body = render(move || {
        view! {
            <Layout site=site_owned preview=preview>
                <Hero title=hero_title lead=hero_lead whatsapp=whatsapp />
                <PageCards id="hizmetler" heading="Hizmetlerimiz" pages=services />
                <PageCards id="bolgeler" heading="Hizmet Bölgelerimiz" pages=areas />
                <ContactSection form=form district_hint=hint />
            </Layout>
        }
    });
    render_document(&meta, &body, options.preview)
}

/// Service or location page; stored overrides win over site.toml text
pub fn landing_page(
    site: &Site,
    page: &LandingPage,
    overrides: Option<&PageContent>,
    form: &FormView,
    options: &RenderOptions,
) -> String {
    let empty = PageContent::empty(&page.slug);
    let overrides = overrides.unwrap_or(&empty);

    let heading = pick(&overrides.heading)
        .or_else(|| pick(&overrides.title))
        .unwrap_or_else(|| page.title.clone());
    let meta_title = pick(&overrides.meta_title).unwrap_or_else(|| page.meta_title.clone());
    let description = pick(&overrides.meta_description).unwrap_or_else(|| page.description.clone());
    let body = match pick(&overrides.body) {
        Some(text) => paragraphs(&text),
        None => page.content.clone(),
    };
    let image = page
        .image
        .as_ref()
        .map(|p| format!("/{}", p.to_string_lossy().trim_start_matches('/')));

    let mut meta = SeoMeta::new(site, Some(&meta_title), Some(&description), &page.path());
    if let Some(img) = &image {
        meta = meta.with_image(site, img);
    }

    let site_owned = site.clone();
    let hint = district_hint(site);
    let form = form.clone();
    let preview = options.preview;
    let intro = description.clone();

    let html = render(move || {
        view! {
            <Layout site=site_owned preview=preview>
                <LandingContent heading=heading intro=intro paragraphs=body image=image />
                <ContactSection form=form district_hint=hint />
            </Layout>
        }
    });
    render_document(&meta, &html, options.preview)
}

pub fn blog_index_page(site: &Site, posts: &[BlogPost], options: &RenderOptions) -> String {
    let meta = SeoMeta::new(
        site,
        Some("Blog"),
        Some("Tadilat ve dekorasyon hakkında güncel bilgiler, ipuçları ve ilham veren içerikler"),
        "/blog",
    )
    .with_structured_data(blog_listing_json_ld(site));

    let site_owned = site.clone();
    let posts = posts.to_vec();
    let preview = options.preview;

    let html = render(move || {
        let list = if posts.is_empty() {
            view! { <p class="empty">"Henüz blog yazısı bulunmuyor."</p> }.into_any()
        } else {
            posts
                .into_iter()
                .map(|post| view! { <BlogCard post=post /> })
                .collect_view()
                .into_any()
        };
        view! {
            <Layout site=site_owned preview=preview>
                <section class="blog-index">
                    <h1>"Blog"</h1>
                    <p class="lead">"Tadilat ve dekorasyon hakkında ipuçları, rehberler ve ilham."</p>
                    {list}
                </section>
            </Layout>
        }
    });
    render_document(&meta, &html, options.preview)
}

pub fn blog_post_page(site: &Site, post: &BlogPost, options: &RenderOptions) -> String {
    let title = post.meta_title.clone().unwrap_or_else(|| post.title.clone());
    let mut meta = SeoMeta::new(
        site,
        Some(&title),
        Some(&post_description(post)),
        &format!("/blog/{}", post.slug),
    )
    .with_type("article")
    .with_structured_data(blog_posting_json_ld(site, post));
    if let Some(image) = &post.featured_image {
        meta = meta.with_image(site, image);
    }

    let site_owned = site.clone();
    let post = post.clone();
    let preview = options.preview;

    let html = render(move || {
        view! {
            <Layout site=site_owned preview=preview>
                <BlogArticle post=post />
            </Layout>
        }
    });
    render_document(&meta, &html, options.preview)
}

pub fn not_found_page(site: &Site, options: &RenderOptions) -> String {
    let meta = SeoMeta::new(site, Some("Sayfa Bulunamadı"), None, "/404");
    let site_owned = site.clone();
    let preview = options.preview;

    let html = render(move || {
        view! {
            <Layout site=site_owned preview=preview>
                <NotFound />
            </Layout>
        }
    });
    render_document(&meta, &html, options.preview)
}
