//! Page building blocks rendered with Leptos SSR

use leptos::prelude::*;
use tadilat_core::blog::{calculate_reading_time, format_date, get_excerpt, DEFAULT_EXCERPT_CHARS};
use tadilat_core::lead::{Field, FormView, NoticeLevel};
use tadilat_core::{BlogPost, Contact, LandingPage, RenovationType};

/// Form endpoint handled by the local server
pub const CONTACT_ACTION: &str = "/iletisim";

/// `wa.me` link with a prefilled message
pub fn whatsapp_href(contact: &Contact) -> String {
    if contact.whatsapp_message.is_empty() {
        contact.whatsapp.clone()
    } else {
        format!(
            "{}?text={}",
            contact.whatsapp,
            urlencoding::encode(&contact.whatsapp_message)
        )
    }
}

#[component]
pub fn Header(site_name: String, contact: Contact) -> impl IntoView {
    view! {
        <header class="site-header">
            <a href="/" class="brand">{site_name}</a>
            <nav class="main-nav">
                <a href="/">"Ana Sayfa"</a>
                <a href="/#hizmetler">"Hizmetler"</a>
                <a href="/blog">"Blog"</a>
                <a href="/#iletisim">"İletişim"</a>
            </nav>
            <a href={contact.tel_href()} class="header-phone">{contact.phone_display.clone()}</a>
        </header>
    }
}

#[component]
pub fn Footer(
    site_name: String,
    tagline: String,
    contact: Contact,
    services: Vec<LandingPage>,
    areas: Vec<LandingPage>,
    preview: bool,
) -> impl IntoView {
    let year = chrono::Utc::now().format("%Y").to_string();
    let note = if preview {
        "Önizleme modu, durdurmak için Ctrl+C"
    } else {
        "Tüm hakları saklıdır."
    };

    view! {
        <footer class="site-footer">
            <div class="footer-about">
                <strong>{site_name.clone()}</strong>
                <p>{tagline}</p>
            </div>
            <div class="footer-links">
                <h4>"Hizmetlerimiz"</h4>
                <ul>
                    {services
                        .into_iter()
                        .map(|p| view! { <li><a href={p.path()}>{p.title.clone()}</a></li> })
                        .collect_view()}
                </ul>
            </div>
            <div class="footer-links">
                <h4>"Hizmet Bölgeleri"</h4>
                <ul>
                    {areas
                        .into_iter()
                        .map(|p| view! { <li><a href={p.path()}>{p.title.clone()}</a></li> })
                        .collect_view()}
                </ul>
            </div>
            <div class="footer-contact">
                <h4>"İletişim"</h4>
                <a href={contact.tel_href()}>{contact.phone_display.clone()}</a>
                <a href={format!("mailto:{}", contact.email)}>{contact.email.clone()}</a>
                <address>{contact.address.clone()}</address>
            </div>
            <p class="copyright">{format!("© {} {}. ", year, site_name)}{note}</p>
        </footer>
    }
}

#[component]
pub fn WhatsAppButton(href: String) -> impl IntoView {
    view! {
        <a
            href=href
            class="whatsapp-button"
            target="_blank"
            rel="noopener noreferrer"
            aria-label="WhatsApp ile iletişime geçin"
        >
            "WhatsApp"
        </a>
    }
}

#[component]
pub fn Hero(title: String, lead: String, whatsapp: String) -> impl IntoView {
    view! {
        <section class="hero">
            <span class="badge">"İzmir Geneli Ücretsiz Keşif"</span>
            <h1>{title}</h1>
            <p>{lead}</p>
            <div class="hero-actions">
                <a href=whatsapp class="btn btn-whatsapp" target="_blank" rel="noopener noreferrer">
                    "WhatsApp'tan Yazın"
                </a>
                <a href="#iletisim" class="btn btn-primary">"Ücretsiz Keşif Formu"</a>
            </div>
        </section>
    }
}

/// Cards linking to landing pages
#[component]
pub fn PageCards(id: &'static str, heading: &'static str, pages: Vec<LandingPage>) -> impl IntoView {
    view! {
        <section id=id class="page-cards">
            <h2>{heading}</h2>
            <div class="cards">
                {pages
                    .into_iter()
                    .map(|p| {
                        view! {
                            <a href={p.path()} class="card">
                                <h3>{p.title.clone()}</h3>
                                <p>{p.description.clone()}</p>
                            </a>
                        }
                    })
                    .collect_view()}
            </div>
        </section>
    }
}

#[component]
fn Notice(form: FormView) -> impl IntoView {
    form.notice.map(|notice| {
        let class = match notice.level {
            NoticeLevel::Success => "notice notice-success",
            NoticeLevel::Error => "notice notice-error",
        };
        view! {
            <div class=class role="status">
                <strong>{notice.title}</strong>
                <p>{notice.description}</p>
            </div>
        }
    })
}

#[component]
fn InlineError(message: Option<&'static str>) -> impl IntoView {
    message.map(|m| view! { <p class="field-error">{m}</p> })
}

fn field_class(form: &FormView, field: Field) -> &'static str {
    if form.error(field).is_some() {
        "input input-error"
    } else {
        "input"
    }
}

/// Lead form: inputs, inline errors, sending state and the confirmation panel
#[component]
pub fn ContactSection(form: FormView, district_hint: String) -> impl IntoView {
    if form.submitted {
        return view! {
            <section id="iletisim" class="contact contact-done" aria-live="polite">
                <Notice form={form.clone()} />
                <h2>"Talebinizi Aldık!"</h2>
                <p>
                    "Aynı gün içinde sizinle iletişime geçeceğiz. Acil bir durum için WhatsApp'tan bize ulaşabilirsiniz."
                </p>
                <form method="post" action=CONTACT_ACTION>
                    <input type="hidden" name="action" value="new" />
                    <button type="submit" class="btn btn-primary">"Yeni Talep Oluştur"</button>
                </form>
            </section>
        }
        .into_any();
    }

    let values = form.values.clone();
    let disabled = form.submitting;
    let button_label = if form.submitting {
        "Gönderiliyor..."
    } else {
        "Ücretsiz Keşif Talep Et"
    };
    let type_options = RenovationType::ALL
        .into_iter()
        .map(|t| {
            let selected = values.renovation_type == t.key();
            view! { <option value={t.key()} selected=selected>{t.label()}</option> }
        })
        .collect_view();

    view! {
        <section id="iletisim" class="contact">
            <div class="contact-intro">
                <h2>"Ücretsiz Keşif ve Teklif Formu"</h2>
                <p>
                    "Formu doldurun, aynı gün içinde sizi arayalım. Ücretsiz keşif yapıp detaylı fiyat teklifi sunalım."
                </p>
                <ul class="benefits">
                    <li>"İzmir geneli ücretsiz keşif"</li>
                    <li>"Şeffaf ve detaylı fiyat teklifi"</li>
                    <li>"2 yıl işçilik garantisi"</li>
                    <li>"Profesyonel iç mimar desteği"</li>
                </ul>
            </div>
            <form method="post" action=CONTACT_ACTION class="contact-form" novalidate=true>
                <Notice form={form.clone()} />
                <div class="honeypot" aria-hidden="true">
                    <label for="website">"Website (boş bırakın)"</label>
                    <input
                        type="text"
                        id="website"
                        name="website"
                        tabindex="-1"
                        autocomplete="off"
                        value={values.honeypot.clone()}
                    />
                </div>

                <label for="name">"Ad Soyad *"</label>
                <input
                    type="text"
                    id="name"
                    name="name"
                    class={field_class(&form, Field::Name)}
                    placeholder="Adınız ve soyadınız"
                    maxlength="100"
                    value={values.name.clone()}
                    disabled=disabled
                />
                <InlineError message={form.error(Field::Name)} />

                <label for="phone">"Telefon *"</label>
                <input
                    type="tel"
                    id="phone"
                    name="phone"
                    class={field_class(&form, Field::Phone)}
                    placeholder="0500 000 00 00"
                    maxlength="20"
                    value={values.phone.clone()}
                    disabled=disabled
                />
                <InlineError message={form.error(Field::Phone)} />

                <label for="district">"İlçe / Mahalle *"</label>
                <input
                    type="text"
                    id="district"
                    name="district"
                    class={field_class(&form, Field::District)}
                    placeholder=district_hint
                    value={values.district.clone()}
                    disabled=disabled
                />
                <InlineError message={form.error(Field::District)} />

                <label for="type">"Tadilat Türü *"</label>
                <select
                    id="type"
                    name="type"
                    class={field_class(&form, Field::RenovationType)}
                    disabled=disabled
                >
                    <option value="" selected={values.renovation_type.is_empty()}>"Seçiniz"</option>
                    {type_options}
                </select>
                <InlineError message={form.error(Field::RenovationType)} />

                <label for="details">"Proje Detayı *"</label>
                <textarea
                    id="details"
                    name="details"
                    rows="4"
                    maxlength="800"
                    class={field_class(&form, Field::Details)}
                    placeholder="Projeniz hakkında kısa bilgi verin..."
                    disabled=disabled
                >
                    {values.details.clone()}
                </textarea>
                <div class="field-footer">
                    <InlineError message={form.error(Field::Details)} />
                    <span class="counter">{form.details_counter()}</span>
                </div>

                <button type="submit" class="btn btn-primary" disabled={!form.submit_enabled}>
                    {button_label}
                </button>
                <p class="privacy">
                    "Bilgileriniz gizli tutulur ve sadece sizinle iletişim için kullanılır."
                </p>
            </form>
        </section>
    }
    .into_any()
}

/// Landing page body: heading, intro and paragraphs
#[component]
pub fn LandingContent(
    heading: String,
    intro: String,
    paragraphs: Vec<String>,
    image: Option<String>,
) -> impl IntoView {
    view! {
        <section class="landing">
            <h1>{heading}</h1>
            <p class="lead">{intro}</p>
            {image.map(|src| view! { <img src=src alt="" class="landing-image" /> })}
            {paragraphs.into_iter().map(|p| view! { <p>{p}</p> }).collect_view()}
        </section>
    }
}

/// One post in the blog listing
#[component]
pub fn BlogCard(post: BlogPost) -> impl IntoView {
    let href = format!("/blog/{}", post.slug);
    let excerpt = post
        .excerpt
        .clone()
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| get_excerpt(&post.content, DEFAULT_EXCERPT_CHARS));
    let minutes = format!("{} dk okuma", calculate_reading_time(&post.content));

    view! {
        <article class="blog-card">
            {post.featured_image.clone().map(|src| {
                view! { <img src=src alt={post.title.clone()} loading="lazy" /> }
            })}
            <div class="blog-meta">
                <time datetime={post.created_at.to_rfc3339()}>{format_date(&post.created_at)}</time>
                <span>{minutes}</span>
            </div>
            <h2><a href={href.clone()}>{post.title.clone()}</a></h2>
            <p>{excerpt}</p>
            <a href=href class="read-more">"Devamını Oku"</a>
        </article>
    }
}

/// Full article; `content` is stored editor HTML
#[component]
pub fn BlogArticle(post: BlogPost) -> impl IntoView {
    let minutes = format!("{} dk okuma", calculate_reading_time(&post.content));

    view! {
        <article class="blog-post">
            <a href="/blog" class="back-link">"← Blog'a Dön"</a>
            <h1>{post.title.clone()}</h1>
            <div class="blog-meta">
                <time datetime={post.created_at.to_rfc3339()}>{format_date(&post.created_at)}</time>
                <span>{minutes}</span>
            </div>
            {post.featured_image.clone().map(|src| {
                view! { <img src=src alt={post.title.clone()} class="featured-image" /> }
            })}
            <div class="blog-content" inner_html={post.content.clone()}></div>
            <aside class="blog-cta">
                <p>"Projeniz için ücretsiz keşif ister misiniz?"</p>
                <a href="/#iletisim" class="btn btn-primary">"Teklif Alın"</a>
            </aside>
        </article>
    }
}

#[component]
pub fn NotFound() -> impl IntoView {
    view! {
        <section class="not-found">
            <h1>"404"</h1>
            <p>"Aradığınız sayfa bulunamadı."</p>
            <a href="/" class="btn btn-primary">"Ana Sayfaya Dön"</a>
        </section>
    }
}
