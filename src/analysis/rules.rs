use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::extract::PageProfile;
use super::keyword::KeywordAnalysis;

/// Severity of an observation. Success entries are kept so the report can
/// show what a page already does right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Success,
    Info,
}

/// Priority of an instruction, ordered critical > high > medium > low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    /// Sort key: lower ranks first.
    pub fn rank(&self) -> u8 {
        match self {
            Priority::Critical => 0,
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }
}

/// An observation about the page. Not an instruction.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Issue {
    pub severity: Severity,
    pub category: String,
    pub message: String,
}

/// An instruction to the page owner, independent of any issue severity.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Recommendation {
    pub priority: Priority,
    pub action: String,
}

/// Content classification selecting the threshold column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ContentProfile {
    Regular,
    Pillar,
}

impl ContentProfile {
    pub fn from_flag(is_pillar_post: bool) -> Self {
        if is_pillar_post {
            ContentProfile::Pillar
        } else {
            ContentProfile::Regular
        }
    }

    fn thresholds(&self) -> Thresholds {
        match self {
            ContentProfile::Regular => Thresholds {
                min_content_words: 300,
                short_content_priority: Priority::Medium,
                long_content_words: Some(5000),
                min_h2_sections: None,
                min_internal_links: None,
            },
            ContentProfile::Pillar => Thresholds {
                min_content_words: 2000,
                short_content_priority: Priority::Critical,
                long_content_words: None,
                min_h2_sections: Some(5),
                min_internal_links: Some(10),
            },
        }
    }
}

struct Thresholds {
    min_content_words: usize,
    short_content_priority: Priority,
    long_content_words: Option<usize>,
    min_h2_sections: Option<usize>,
    min_internal_links: Option<usize>,
}

const TITLE_MIN: usize = 30;
const TITLE_MAX: usize = 60;
const META_MIN: usize = 120;
const META_MAX: usize = 160;
const READABILITY_LOW: u32 = 30;
const READABILITY_HIGH: u32 = 70;
const RESPONSIVE_MIN: u32 = 60;
const MODERN_IMAGE_MIN_PCT: usize = 50;
const DENSITY_MIN: f64 = 0.5;
const DENSITY_MAX: f64 = 3.0;

/// Issues and recommendations emitted by one rule-engine pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RuleOutcome {
    pub issues: Vec<Issue>,
    pub recommendations: Vec<Recommendation>,
}

impl RuleOutcome {
    fn issue(&mut self, severity: Severity, category: &str, message: impl Into<String>) {
        self.issues.push(Issue {
            severity,
            category: category.to_string(),
            message: message.into(),
        });
    }

    fn recommend(&mut self, priority: Priority, action: impl Into<String>) {
        self.recommendations.push(Recommendation {
            priority,
            action: action.into(),
        });
    }
}

/// Run the full ordered check table against a profile.
///
/// Every check runs unconditionally; none short-circuits another, so a page
/// can collect a success in one category alongside warnings in others.
/// Recommendations come out unsorted; ordering belongs to the synthesizer.
pub fn run_checks(profile: &PageProfile, keyword: Option<&KeywordAnalysis>) -> RuleOutcome {
    let content = ContentProfile::from_flag(profile.is_pillar_post);
    let t = content.thresholds();
    let mut out = RuleOutcome::default();

    check_title(profile, &mut out);
    check_headings(profile, &mut out);
    check_meta_description(profile, &mut out);
    check_technical(profile, &mut out);
    check_images(profile, &mut out);
    check_content_length(profile, &t, &mut out);
    check_readability(profile, &mut out);
    check_schema(profile, &mut out);
    check_https(profile, &mut out);
    check_mobile(profile, &mut out);
    check_performance(profile, &mut out);
    check_pillar_structure(profile, &t, &mut out);
    if let Some(kw) = keyword {
        check_keyword(kw, &mut out);
    }

    out
}

fn check_title(profile: &PageProfile, out: &mut RuleOutcome) {
    if profile.title.is_empty() {
        out.issue(Severity::Error, "Title", "Missing title tag");
        out.recommend(
            Priority::Critical,
            "Add a descriptive title tag (30-60 characters)",
        );
    } else if profile.title_length < TITLE_MIN {
        out.issue(
            Severity::Warning,
            "Title",
            format!("Title is too short ({} characters)", profile.title_length),
        );
        out.recommend(Priority::High, "Expand the title to 30-60 characters");
    } else if profile.title_length > TITLE_MAX {
        out.issue(
            Severity::Warning,
            "Title",
            format!("Title is too long ({} characters)", profile.title_length),
        );
        out.recommend(
            Priority::Medium,
            "Shorten the title to 60 characters or fewer so it displays fully",
        );
    } else {
        out.issue(Severity::Success, "Title", "Title length is in the ideal range");
    }
}

fn check_headings(profile: &PageProfile, out: &mut RuleOutcome) {
    let h1_count = profile.heading_count(1);
    if h1_count == 0 {
        out.issue(Severity::Error, "Headings", "No H1 tag found");
        out.recommend(Priority::Critical, "Add exactly one H1 tag to the page");
    } else if h1_count > 1 {
        out.issue(
            Severity::Error,
            "Headings",
            format!("Found {} H1 tags", h1_count),
        );
        out.recommend(Priority::High, "Use only one H1 tag per page");
    } else {
        out.issue(Severity::Success, "Headings", "H1 structure is correct");
    }

    // Skipped levels: an empty level N with a populated N+1 below it.
    for level in 1..=5u8 {
        if profile.heading_count(level) == 0 && profile.heading_count(level + 1) > 0 {
            out.issue(
                Severity::Warning,
                "Headings",
                format!("H{} used without any H{}", level + 1, level),
            );
            out.recommend(
                Priority::Medium,
                format!("Fix the heading hierarchy: add an H{} before using H{}", level, level + 1),
            );
        }
    }
}

fn check_meta_description(profile: &PageProfile, out: &mut RuleOutcome) {
    if profile.meta_description.is_empty() {
        out.issue(Severity::Error, "Meta", "Missing meta description");
        out.recommend(
            Priority::Critical,
            "Add a compelling meta description (120-160 characters)",
        );
    } else if profile.meta_description_length < META_MIN {
        out.issue(
            Severity::Warning,
            "Meta",
            format!(
                "Meta description is too short ({} characters)",
                profile.meta_description_length
            ),
        );
        out.recommend(Priority::High, "Expand the meta description to 120-160 characters");
    } else if profile.meta_description_length > META_MAX {
        out.issue(
            Severity::Warning,
            "Meta",
            format!(
                "Meta description is too long ({} characters)",
                profile.meta_description_length
            ),
        );
        out.recommend(
            Priority::Medium,
            "Shorten the meta description to 160 characters or fewer",
        );
    } else {
        out.issue(
            Severity::Success,
            "Meta",
            "Meta description length is in the ideal range",
        );
    }
}

fn check_technical(profile: &PageProfile, out: &mut RuleOutcome) {
    if !profile.technical.has_viewport {
        out.issue(Severity::Error, "Technical", "Missing viewport meta tag");
        out.recommend(Priority::High, "Add a viewport meta tag for mobile rendering");
    }
    if !profile.technical.has_charset {
        out.issue(Severity::Warning, "Technical", "Missing charset declaration");
        out.recommend(Priority::Medium, "Declare the document charset in a meta tag");
    }
    if profile.technical.canonical_url.is_empty() {
        out.issue(Severity::Warning, "Technical", "Missing canonical URL");
        out.recommend(
            Priority::Medium,
            "Add a canonical link to guard against duplicate-content issues",
        );
    }
    if !profile.technical.has_favicon {
        out.issue(Severity::Warning, "Technical", "No favicon link found");
        out.recommend(Priority::Low, "Add a favicon for branding in search results");
    }
    if profile.technical.open_graph.title.is_empty()
        && profile.technical.open_graph.description.is_empty()
    {
        out.issue(Severity::Warning, "Social", "No Open Graph tags found");
        out.recommend(
            Priority::Medium,
            "Add og:title and og:description tags for social sharing",
        );
    }
}

fn check_images(profile: &PageProfile, out: &mut RuleOutcome) {
    if profile.images.without_alt > 0 {
        out.issue(
            Severity::Warning,
            "Images",
            format!("{} images missing alt text", profile.images.without_alt),
        );
        out.recommend(Priority::High, "Add descriptive alt text to all images");
    }
    if profile.images.total > 0 && profile.images.lazy_loaded_count == 0 {
        out.issue(Severity::Warning, "Images", "No images use lazy loading");
        out.recommend(
            Priority::Medium,
            "Add loading=\"lazy\" to below-the-fold images",
        );
    }
}

fn check_content_length(profile: &PageProfile, t: &Thresholds, out: &mut RuleOutcome) {
    let words = profile.content_word_count;
    if words < t.min_content_words {
        out.issue(
            Severity::Warning,
            "Content",
            format!(
                "Content is short ({} words, minimum {})",
                words, t.min_content_words
            ),
        );
        out.recommend(
            t.short_content_priority,
            format!("Expand the content to at least {} words", t.min_content_words),
        );
    } else if let Some(long) = t.long_content_words {
        if words > long {
            out.issue(
                Severity::Info,
                "Content",
                format!("Content is very long ({} words)", words),
            );
            out.recommend(
                Priority::Low,
                "Consider splitting very long content into focused pages",
            );
        }
    }
}

fn check_readability(profile: &PageProfile, out: &mut RuleOutcome) {
    if profile.readability_score < READABILITY_LOW {
        out.issue(
            Severity::Warning,
            "Readability",
            format!(
                "Content is hard to read (score {})",
                profile.readability_score
            ),
        );
        out.recommend(
            Priority::Medium,
            "Use shorter sentences and simpler words to improve readability",
        );
    } else if profile.readability_score > READABILITY_HIGH {
        out.issue(
            Severity::Success,
            "Readability",
            format!("Content is easy to read (score {})", profile.readability_score),
        );
    }
}

fn check_schema(profile: &PageProfile, out: &mut RuleOutcome) {
    if profile.schema_types.is_empty() {
        out.issue(Severity::Warning, "Schema", "No structured data found");
        out.recommend(
            Priority::Medium,
            "Add JSON-LD structured data for better search visibility",
        );
    }
    if !profile.schema_types.contains("Organization") {
        out.recommend(Priority::Medium, "Add Organization schema markup");
    }
    if !profile.schema_types.contains("WebSite") {
        out.recommend(Priority::Medium, "Add WebSite schema markup");
    }
    if profile.heading_count(2) > 0 && !profile.schema_types.contains("BreadcrumbList") {
        out.recommend(Priority::Low, "Add BreadcrumbList schema for structured pages");
    }
}

fn check_https(profile: &PageProfile, out: &mut RuleOutcome) {
    if !profile.is_https {
        out.issue(Severity::Error, "Security", "Page is not served over HTTPS");
        out.recommend(Priority::Critical, "Serve the page over HTTPS");
    }
}

fn check_mobile(profile: &PageProfile, out: &mut RuleOutcome) {
    let score = profile.responsive.score();
    if score < RESPONSIVE_MIN {
        out.issue(
            Severity::Warning,
            "Mobile",
            format!("Weak responsive design signals (score {}%)", score),
        );
        out.recommend(
            Priority::High,
            "Add responsive design: viewport meta, media queries and flexible layout",
        );
    }
}

fn check_performance(profile: &PageProfile, out: &mut RuleOutcome) {
    let without_dimensions = profile.images.total - profile.images.with_dimensions;
    if without_dimensions > 0 {
        out.issue(
            Severity::Warning,
            "Performance",
            format!(
                "{} images without explicit width and height (layout shift risk)",
                without_dimensions
            ),
        );
        out.recommend(
            Priority::High,
            "Set width and height attributes on images to avoid layout shift",
        );
    }
    if profile.performance.render_blocking_script_count > 0 {
        out.issue(
            Severity::Warning,
            "Performance",
            format!(
                "{} render-blocking scripts",
                profile.performance.render_blocking_script_count
            ),
        );
        out.recommend(Priority::High, "Load scripts with async or defer");
    }
    if profile.images.total > 0 {
        let modern_pct = profile.images.modern_format_count * 100 / profile.images.total;
        if modern_pct < MODERN_IMAGE_MIN_PCT {
            out.issue(
                Severity::Warning,
                "Performance",
                format!("Only {}% of images use modern formats", modern_pct),
            );
            out.recommend(Priority::Medium, "Serve images as WebP or AVIF");
        }
    }
}

fn check_pillar_structure(profile: &PageProfile, t: &Thresholds, out: &mut RuleOutcome) {
    if let Some(min_h2) = t.min_h2_sections {
        if profile.heading_count(2) < min_h2 {
            out.issue(
                Severity::Warning,
                "Content",
                format!(
                    "Pillar post has only {} H2 sections (minimum {})",
                    profile.heading_count(2),
                    min_h2
                ),
            );
            out.recommend(
                Priority::High,
                format!("Structure the pillar post into at least {} H2 sections", min_h2),
            );
        }
    }
    if let Some(min_links) = t.min_internal_links {
        if profile.internal_link_count < min_links {
            out.issue(
                Severity::Warning,
                "Content",
                format!(
                    "Pillar post has only {} internal links (minimum {})",
                    profile.internal_link_count, min_links
                ),
            );
            out.recommend(
                Priority::High,
                format!("Link the pillar post to at least {} related pages", min_links),
            );
        }
    }
}

fn check_keyword(kw: &KeywordAnalysis, out: &mut RuleOutcome) {
    let fields = [
        ("title tag", &kw.title_match),
        ("H1 tag", &kw.h1_match),
        ("meta description", &kw.meta_match),
    ];
    for (label, m) in fields {
        if !m.exact_match {
            if m.partial_match {
                out.recommend(
                    Priority::Medium,
                    format!(
                        "Turn the partial keyword match in the {} into the exact phrase \"{}\"",
                        label, kw.keyword
                    ),
                );
            } else {
                out.recommend(
                    Priority::High,
                    format!("Include your target keyword \"{}\" in the {}", kw.keyword, label),
                );
            }
        }
    }

    if kw.exact_density_pct < DENSITY_MIN && kw.partial_density_pct < DENSITY_MIN * 2.0 {
        out.issue(
            Severity::Warning,
            "Keywords",
            format!("Keyword density is low ({}%)", kw.exact_density_pct),
        );
        out.recommend(
            Priority::Medium,
            format!("Use \"{}\" more often in the body content", kw.keyword),
        );
    } else if kw.exact_density_pct > DENSITY_MAX {
        out.issue(
            Severity::Warning,
            "Keywords",
            format!("Keyword density is too high ({}%)", kw.exact_density_pct),
        );
        out.recommend(
            Priority::Medium,
            "Reduce keyword usage to avoid over-optimization",
        );
    } else {
        out.issue(
            Severity::Success,
            "Keywords",
            format!("Keyword density is healthy ({}%)", kw.exact_density_pct),
        );
    }
}
