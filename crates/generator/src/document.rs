use tadilat_core::seo::SeoMeta;

/// Shared by `build` and `serve` so previews match the deployed site
pub const STYLESHEET: &str = r#":root {
  --primary: #c2410c;
  --primary-dark: #9a3412;
  --text: #1f2937;
  --muted: #6b7280;
  --surface: #f9fafb;
  --error: #dc2626;
  --success: #15803d;
  --whatsapp: #25d366;
}
* { margin: 0; padding: 0; box-sizing: border-box; }
body { font-family: system-ui, -apple-system, "Segoe UI", Roboto, sans-serif; line-height: 1.6; color: var(--text); }
a { color: var(--primary); text-decoration: none; }
main { max-width: 1100px; margin: 0 auto; padding: 2rem 1rem; }
.site-header { display: flex; gap: 2rem; align-items: center; justify-content: space-between; padding: 1rem 2rem; border-bottom: 1px solid #e5e7eb; }
.brand { font-weight: 700; font-size: 1.25rem; color: var(--text); }
.main-nav { display: flex; gap: 1.25rem; }
.hero { padding: 4rem 0; }
.hero h1 { font-size: 2.5rem; line-height: 1.2; margin: 1rem 0; }
.badge { background: var(--surface); padding: .25rem .75rem; border-radius: 999px; font-size: .875rem; }
.btn { display: inline-block; padding: .75rem 1.5rem; border-radius: 6px; font-weight: 600; border: 0; cursor: pointer; }
.btn-primary { background: var(--primary); color: #fff; }
.btn-primary:disabled { opacity: .6; cursor: not-allowed; }
.btn-whatsapp { background: var(--whatsapp); color: #fff; }
.cards { display: grid; grid-template-columns: repeat(auto-fit, minmax(240px, 1fr)); gap: 1rem; margin-top: 1.5rem; }
.card { border: 1px solid #e5e7eb; border-radius: 8px; padding: 1.25rem; color: var(--text); }
.page-cards, .contact, .landing { padding: 3rem 0; }
.contact { display: grid; grid-template-columns: 1fr 1fr; gap: 3rem; }
.contact-form { display: flex; flex-direction: column; gap: .5rem; }
.input { padding: .625rem .75rem; border: 1px solid #d1d5db; border-radius: 6px; font: inherit; }
.input-error { border-color: var(--error); }
.field-error { color: var(--error); font-size: .875rem; }
.field-footer { display: flex; justify-content: space-between; }
.counter, .privacy { color: var(--muted); font-size: .75rem; }
.honeypot { position: absolute; left: -9999px; width: 1px; height: 1px; overflow: hidden; }
.notice { padding: 1rem; border-radius: 6px; margin-bottom: 1rem; }
.notice-success { background: #dcfce7; color: var(--success); }
.notice-error { background: #fee2e2; color: var(--error); }
.contact-done { display: block; text-align: center; }
.blog-card { border-bottom: 1px solid #e5e7eb; padding: 1.5rem 0; }
.blog-meta { display: flex; gap: 1rem; color: var(--muted); font-size: .875rem; }
.blog-content { margin-top: 2rem; }
.blog-content p, .blog-content h2, .blog-content ul { margin-bottom: 1rem; }
.featured-image, .landing-image, .blog-card img { max-width: 100%; border-radius: 8px; }
.whatsapp-button { position: fixed; right: 1.5rem; bottom: 1.5rem; background: var(--whatsapp); color: #fff; padding: .875rem 1.25rem; border-radius: 999px; font-weight: 600; }
.preview-badge { background: #fef3c7; text-align: center; padding: .25rem; font-size: .875rem; }
.site-footer { background: var(--surface); padding: 3rem 2rem; display: grid; grid-template-columns: repeat(auto-fit, minmax(200px, 1fr)); gap: 2rem; }
.copyright { grid-column: 1 / -1; color: var(--muted); font-size: .875rem; }
@media (max-width: 768px) { .contact { grid-template-columns: 1fr; } .main-nav { display: none; } }
"#;

const RELOAD_SCRIPT: &str = r#"<script>
  // Live reload via Server-Sent Events
  const eventSource = new EventSource('/_reload');
  eventSource.onmessage = () => location.reload();
  eventSource.onerror = () => eventSource.close();
</script>"#;

/// Wrap a rendered body in the full HTML document
pub fn render_document(meta: &SeoMeta, body: &str, preview: bool) -> String {
    let (badge, reload) = if preview {
        (
            "<div class=\"preview-badge\">🚀 Önizleme: değişiklikler otomatik yüklenir</div>\n",
            RELOAD_SCRIPT,
        )
    } else {
        ("", "")
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="tr">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
{}<link rel="icon" href="/favicon.png">
<link rel="stylesheet" href="/style.css">
</head>
<body>
{}{}
{}
</body>
</html>
"#,
        meta.render_head(),
        badge,
        body,
        reload
    )
}
