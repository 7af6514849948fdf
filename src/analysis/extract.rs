use select::document::Document;
use select::predicate::{Attr, Name, Predicate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use url::Url;
use utoipa::ToSchema;

/// Count and text content for one heading level.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct HeadingStats {
    pub count: usize,
    pub texts: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ImageStats {
    pub total: usize,
    pub with_alt: usize,
    pub without_alt: usize,
    /// Images declaring both width and height attributes.
    pub with_dimensions: usize,
    pub lazy_loaded_count: usize,
    /// Images served as webp or avif.
    pub modern_format_count: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct OpenGraphTags {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct TechnicalSignals {
    pub has_viewport: bool,
    pub has_charset: bool,
    /// Empty string when no canonical link is present.
    pub canonical_url: String,
    pub has_favicon: bool,
    pub open_graph: OpenGraphTags,
    pub twitter_card: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct PerformanceSignals {
    pub script_count: usize,
    pub stylesheet_count: usize,
    /// Elements carrying a style attribute.
    pub inline_style_count: usize,
    /// External scripts loaded without async or defer.
    pub render_blocking_script_count: usize,
    /// preload / prefetch / preconnect / dns-prefetch links.
    pub resource_hints: usize,
}

/// Presence signals feeding the weighted responsive-design score.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ResponsiveSignals {
    pub has_viewport: bool,
    pub has_media_queries: bool,
    pub has_responsive_images: bool,
    pub uses_flexbox: bool,
    pub uses_grid: bool,
}

impl ResponsiveSignals {
    /// Weighted average of the five presence signals, as a percentage.
    /// Viewport dominates since nothing else matters without it.
    pub fn score(&self) -> u32 {
        let mut score = 0u32;
        if self.has_viewport {
            score += 30;
        }
        if self.has_media_queries {
            score += 25;
        }
        if self.has_responsive_images {
            score += 20;
        }
        if self.uses_flexbox {
            score += 15;
        }
        if self.uses_grid {
            score += 10;
        }
        score
    }
}

/// Structured feature summary of one analyzed document.
///
/// Built once per analyzed URL by [`extract_profile`] and treated as
/// immutable by the rule engine, comparator and report synthesizer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct PageProfile {
    pub url: String,
    pub domain: String,
    pub title: String,
    pub title_length: usize,
    pub meta_description: String,
    pub meta_description_length: usize,
    /// Heading stats keyed by level (1-6). All six levels are always present.
    pub headings: BTreeMap<u8, HeadingStats>,
    pub content_word_count: usize,
    pub readability_score: u32,
    pub internal_link_count: usize,
    pub external_link_count: usize,
    pub images: ImageStats,
    pub technical: TechnicalSignals,
    pub performance: PerformanceSignals,
    pub responsive: ResponsiveSignals,
    pub schema_types: BTreeSet<String>,
    pub is_https: bool,
    pub is_pillar_post: bool,
}

impl PageProfile {
    pub fn heading_count(&self, level: u8) -> usize {
        self.headings.get(&level).map(|h| h.count).unwrap_or(0)
    }

    pub fn heading_texts(&self, level: u8) -> &[String] {
        self.headings
            .get(&level)
            .map(|h| h.texts.as_slice())
            .unwrap_or(&[])
    }
}

/// A profile plus the raw body text it was extracted from. The body text is
/// not part of the profile but the readability and keyword analyzers need it.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    pub profile: PageProfile,
    pub body_text: String,
}

const HEADING_TAGS: [(u8, &str); 6] = [
    (1, "h1"),
    (2, "h2"),
    (3, "h3"),
    (4, "h4"),
    (5, "h5"),
    (6, "h6"),
];

const RESOURCE_HINT_RELS: [&str; 4] = ["preload", "prefetch", "preconnect", "dns-prefetch"];

/// Build a [`PageProfile`] from a parsed document and its source URL.
///
/// Absent title/meta-description become empty strings so length checks are
/// always defined. Malformed JSON-LD blocks are skipped without aborting
/// extraction. The readability score is left at 0 here; the pipeline fills
/// it in from the returned body text.
pub fn extract_profile(document: &Document, url: &str, is_pillar_post: bool) -> ExtractedDocument {
    let (domain, is_https) = match Url::parse(url) {
        Ok(parsed) => (
            parsed.host_str().unwrap_or("").to_string(),
            parsed.scheme() == "https",
        ),
        Err(_) => (String::new(), false),
    };

    let title = document
        .find(Name("title"))
        .next()
        .map(|n| n.text().trim().to_string())
        .unwrap_or_default();

    let meta_description = document
        .find(Name("meta").and(Attr("name", "description")))
        .next()
        .and_then(|n| n.attr("content"))
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    let mut headings = BTreeMap::new();
    for (level, tag) in HEADING_TAGS {
        let texts: Vec<String> = document
            .find(Name(tag))
            .map(|n| n.text().trim().to_string())
            .collect();
        headings.insert(
            level,
            HeadingStats {
                count: texts.len(),
                texts,
            },
        );
    }

    let body_text = document
        .find(Name("body"))
        .next()
        .map(|n| n.text())
        .unwrap_or_default();
    let content_word_count = body_text.split_whitespace().count();

    let (internal_link_count, external_link_count) = count_links(document, &domain);
    let images = collect_image_stats(document);
    let technical = collect_technical_signals(document);
    let performance = collect_performance_signals(document);
    let responsive = collect_responsive_signals(document, technical.has_viewport);
    let schema_types = collect_schema_types(document);

    let profile = PageProfile {
        url: url.to_string(),
        domain,
        title_length: title.chars().count(),
        title,
        meta_description_length: meta_description.chars().count(),
        meta_description,
        headings,
        content_word_count,
        readability_score: 0,
        internal_link_count,
        external_link_count,
        images,
        technical,
        performance,
        responsive,
        schema_types,
        is_https,
        is_pillar_post,
    };

    ExtractedDocument { profile, body_text }
}

/// Internal = root-relative href or href containing the page's hostname.
/// Otherwise external when the href carries an absolute scheme. Fragment
/// and mailto-style links fall into neither bucket.
fn count_links(document: &Document, domain: &str) -> (usize, usize) {
    let mut internal = 0;
    let mut external = 0;
    for node in document.find(Name("a")) {
        let Some(href) = node.attr("href") else {
            continue;
        };
        if href.starts_with('/') || (!domain.is_empty() && href.contains(domain)) {
            internal += 1;
        } else if href.starts_with("http://") || href.starts_with("https://") {
            external += 1;
        }
    }
    (internal, external)
}

fn collect_image_stats(document: &Document) -> ImageStats {
    let mut stats = ImageStats::default();
    for img in document.find(Name("img")) {
        stats.total += 1;
        if img.attr("alt").is_some() {
            stats.with_alt += 1;
        } else {
            stats.without_alt += 1;
        }
        if img.attr("width").is_some() && img.attr("height").is_some() {
            stats.with_dimensions += 1;
        }
        if img.attr("loading").map(|l| l.eq_ignore_ascii_case("lazy")) == Some(true) {
            stats.lazy_loaded_count += 1;
        }
        let src = img.attr("src").unwrap_or("").to_lowercase();
        if src.contains(".webp") || src.contains(".avif") {
            stats.modern_format_count += 1;
        }
    }
    stats
}

fn collect_technical_signals(document: &Document) -> TechnicalSignals {
    let has_viewport = document
        .find(Name("meta").and(Attr("name", "viewport")))
        .next()
        .is_some();
    let has_charset = document
        .find(Name("meta").and(Attr("charset", ())))
        .next()
        .is_some();
    let canonical_url = document
        .find(Name("link").and(Attr("rel", "canonical")))
        .next()
        .and_then(|n| n.attr("href"))
        .unwrap_or("")
        .to_string();
    let has_favicon = document
        .find(Name("link").and(Attr("rel", ())))
        .any(|n| n.attr("rel").unwrap_or("").to_lowercase().contains("icon"));
    let open_graph = OpenGraphTags {
        title: meta_property_content(document, "og:title"),
        description: meta_property_content(document, "og:description"),
    };
    let twitter_card = document
        .find(Name("meta").and(Attr("name", "twitter:card")))
        .next()
        .and_then(|n| n.attr("content"))
        .unwrap_or("")
        .to_string();

    TechnicalSignals {
        has_viewport,
        has_charset,
        canonical_url,
        has_favicon,
        open_graph,
        twitter_card,
    }
}

fn meta_property_content(document: &Document, property: &str) -> String {
    document
        .find(Name("meta").and(Attr("property", property)))
        .next()
        .and_then(|n| n.attr("content"))
        .unwrap_or("")
        .to_string()
}

fn collect_performance_signals(document: &Document) -> PerformanceSignals {
    let mut script_count = 0;
    let mut render_blocking_script_count = 0;
    for script in document.find(Name("script")) {
        if script.attr("src").is_none() {
            continue;
        }
        script_count += 1;
        if script.attr("async").is_none() && script.attr("defer").is_none() {
            render_blocking_script_count += 1;
        }
    }

    let mut stylesheet_count = 0;
    let mut resource_hints = 0;
    for link in document.find(Name("link")) {
        let rel = link.attr("rel").unwrap_or("").to_lowercase();
        if rel == "stylesheet" {
            stylesheet_count += 1;
        } else if RESOURCE_HINT_RELS.contains(&rel.as_str()) {
            resource_hints += 1;
        }
    }

    let inline_style_count = document.find(Attr("style", ())).count();

    PerformanceSignals {
        script_count,
        stylesheet_count,
        inline_style_count,
        render_blocking_script_count,
        resource_hints,
    }
}

fn collect_responsive_signals(document: &Document, has_viewport: bool) -> ResponsiveSignals {
    // Pool style blocks and style attributes for the CSS keyword checks.
    let mut css_text = String::new();
    for style in document.find(Name("style")) {
        css_text.push_str(&style.text());
    }
    for node in document.find(Attr("style", ())) {
        if let Some(inline) = node.attr("style") {
            css_text.push_str(inline);
            css_text.push(' ');
        }
    }

    ResponsiveSignals {
        has_viewport,
        has_media_queries: css_text.contains("@media"),
        has_responsive_images: document.find(Name("img").and(Attr("srcset", ()))).next().is_some(),
        uses_flexbox: css_text.contains("flex"),
        uses_grid: css_text.contains("grid"),
    }
}

/// Every JSON-LD block is parsed independently; blocks that fail to parse
/// are skipped. `@type` is read from the root object or, when the root is
/// an array, unioned across its elements.
fn collect_schema_types(document: &Document) -> BTreeSet<String> {
    let mut types = BTreeSet::new();
    for script in document.find(Name("script").and(Attr("type", "application/ld+json"))) {
        let raw = script.text();
        let Ok(value) = serde_json::from_str::<serde_json::Value>(&raw) else {
            tracing::debug!("Skipping malformed JSON-LD block");
            continue;
        };
        match value {
            serde_json::Value::Array(items) => {
                for item in items {
                    push_schema_type(&item, &mut types);
                }
            }
            other => push_schema_type(&other, &mut types),
        }
    }
    types
}

fn push_schema_type(value: &serde_json::Value, types: &mut BTreeSet<String>) {
    match value.get("@type") {
        Some(serde_json::Value::String(t)) => {
            types.insert(t.clone());
        }
        Some(serde_json::Value::Array(items)) => {
            for item in items {
                if let Some(t) = item.as_str() {
                    types.insert(t.to_string());
                }
            }
        }
        _ => {}
    }
}
