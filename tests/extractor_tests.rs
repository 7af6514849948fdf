use seointel::analysis::extract::extract_profile;
use select::document::Document;

fn extract(html: &str, url: &str) -> seointel::analysis::extract::ExtractedDocument {
    let document = Document::from(html);
    extract_profile(&document, url, false)
}

#[test]
fn test_missing_title_and_meta_default_to_empty() {
    let extracted = extract("<html><body><p>hello</p></body></html>", "https://example.com/");
    assert_eq!(extracted.profile.title, "");
    assert_eq!(extracted.profile.title_length, 0);
    assert_eq!(extracted.profile.meta_description, "");
    assert_eq!(extracted.profile.meta_description_length, 0);
}

#[test]
fn test_basic_fields() {
    let html = r#"<html><head>
        <title>My Test Page About Widgets</title>
        <meta name="description" content="A page about widgets.">
        <meta charset="utf-8">
        <meta name="viewport" content="width=device-width">
        <link rel="canonical" href="https://example.com/widgets">
        <link rel="icon" href="/favicon.ico">
        </head><body>
        <h1>Widgets</h1>
        <h2>Types</h2><h2>Prices</h2>
        <p>Widgets are great. They do many things.</p>
        </body></html>"#;
    let extracted = extract(html, "https://example.com/widgets");
    let p = &extracted.profile;

    assert_eq!(p.title, "My Test Page About Widgets");
    assert_eq!(p.meta_description, "A page about widgets.");
    assert_eq!(p.domain, "example.com");
    assert!(p.is_https);
    assert_eq!(p.heading_count(1), 1);
    assert_eq!(p.heading_count(2), 2);
    assert_eq!(p.heading_texts(2), &["Types".to_string(), "Prices".to_string()]);
    assert!(p.technical.has_viewport);
    assert!(p.technical.has_charset);
    assert_eq!(p.technical.canonical_url, "https://example.com/widgets");
    assert!(p.technical.has_favicon);
}

#[test]
fn test_link_classification() {
    let html = r##"<html><body>
        <a href="/about">internal root-relative</a>
        <a href="https://example.com/contact">internal absolute</a>
        <a href="https://other.org/page">external</a>
        <a href="http://third.net/">external</a>
        <a href="#section">fragment, neither</a>
        <a href="mailto:x@example.org">mailto, neither</a>
        </body></html>"##;
    let extracted = extract(html, "https://example.com/");
    assert_eq!(extracted.profile.internal_link_count, 2);
    // mailto contains no scheme prefix we classify; example.org in the
    // mailto href does not match the page host example.com
    assert_eq!(extracted.profile.external_link_count, 2);
}

#[test]
fn test_image_stats() {
    let html = r#"<html><body>
        <img src="/a.webp" alt="a" width="10" height="10" loading="lazy">
        <img src="/b.jpg" alt="b">
        <img src="/c.png">
        </body></html>"#;
    let extracted = extract(html, "https://example.com/");
    let images = &extracted.profile.images;
    assert_eq!(images.total, 3);
    assert_eq!(images.with_alt, 2);
    assert_eq!(images.without_alt, 1);
    assert_eq!(images.with_dimensions, 1);
    assert_eq!(images.lazy_loaded_count, 1);
    assert_eq!(images.modern_format_count, 1);
}

#[test]
fn test_malformed_json_ld_is_skipped() {
    let html = r#"<html><head>
        <script type="application/ld+json">{not valid json</script>
        <script type="application/ld+json">{"@type": "Organization"}</script>
        <script type="application/ld+json">[{"@type": "WebSite"}, {"@type": "Article"}]</script>
        </head><body></body></html>"#;
    let extracted = extract(html, "https://example.com/");
    let types = &extracted.profile.schema_types;
    assert_eq!(types.len(), 3);
    assert!(types.contains("Organization"));
    assert!(types.contains("WebSite"));
    assert!(types.contains("Article"));
}

#[test]
fn test_schema_type_array_at_root_object() {
    let html = r#"<html><head>
        <script type="application/ld+json">{"@type": ["Organization", "LocalBusiness"]}</script>
        </head><body></body></html>"#;
    let extracted = extract(html, "https://example.com/");
    assert!(extracted.profile.schema_types.contains("Organization"));
    assert!(extracted.profile.schema_types.contains("LocalBusiness"));
}

#[test]
fn test_render_blocking_scripts() {
    let html = r#"<html><head>
        <script src="/a.js"></script>
        <script src="/b.js" defer></script>
        <script src="/c.js" async></script>
        <script>var inline = true;</script>
        </head><body></body></html>"#;
    let extracted = extract(html, "https://example.com/");
    assert_eq!(extracted.profile.performance.script_count, 3);
    assert_eq!(extracted.profile.performance.render_blocking_script_count, 1);
}

#[test]
fn test_http_page_is_not_https() {
    let extracted = extract("<html><body>x</body></html>", "http://example.com/");
    assert!(!extracted.profile.is_https);
}

#[test]
fn test_unparseable_url_degrades_instead_of_failing() {
    let extracted = extract("<html><body>x</body></html>", "not a url");
    assert_eq!(extracted.profile.domain, "");
    assert!(!extracted.profile.is_https);
}

#[test]
fn test_responsive_signals() {
    let html = r#"<html><head>
        <meta name="viewport" content="width=device-width">
        <style>@media (max-width: 600px) { .x { display: flex; } }</style>
        </head><body>
        <img src="/a.jpg" srcset="/a-2x.jpg 2x">
        </body></html>"#;
    let extracted = extract(html, "https://example.com/");
    let responsive = &extracted.profile.responsive;
    assert!(responsive.has_viewport);
    assert!(responsive.has_media_queries);
    assert!(responsive.has_responsive_images);
    assert!(responsive.uses_flexbox);
    assert!(!responsive.uses_grid);
    // 30 + 25 + 20 + 15
    assert_eq!(responsive.score(), 90);
}

#[test]
fn test_body_word_count() {
    let extracted = extract(
        "<html><body><h1>Two words</h1>\n<p>and three more</p></body></html>",
        "https://example.com/",
    );
    assert_eq!(extracted.profile.content_word_count, 5);
    assert!(extracted.body_text.contains("three"));
}
