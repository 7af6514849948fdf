use select::document::Document;
use seointel::analysis::compare::{compare_profiles, Impact};
use seointel::analysis::extract::{extract_profile, PageProfile};
use seointel::analysis::keyword::{FieldMatch, KeywordAnalysis};

fn profile(html: &str, url: &str) -> PageProfile {
    extract_profile(&Document::from(html), url, false).profile
}

fn page_with_words(n: usize) -> PageProfile {
    let words = (0..n)
        .map(|i| format!("word{}", i))
        .collect::<Vec<_>>()
        .join(" ");
    profile(
        &format!("<html><body><p>{}</p></body></html>", words),
        "https://mysite.com/page",
    )
}

fn keyword_analysis(exact_title: bool, exact_h1: bool, density: f64) -> KeywordAnalysis {
    let matched = |exact: bool| FieldMatch {
        exact_match: exact,
        partial_match: exact,
        ..Default::default()
    };
    KeywordAnalysis {
        keyword: "widget repair".to_string(),
        title_match: matched(exact_title),
        h1_match: matched(exact_h1),
        meta_match: FieldMatch::default(),
        exact_density_pct: density,
        partial_density_pct: density,
    }
}

#[test]
fn test_competitor_content_lead_is_a_high_gap() {
    let yours = page_with_words(800);
    let competitor = page_with_words(2000);
    let comparison = compare_profiles(&yours, &competitor, None);

    assert_eq!(comparison.gaps.len(), 1);
    let gap = &comparison.gaps[0];
    assert_eq!(gap.category, "Content Depth");
    assert_eq!(gap.impact, Impact::High);
    assert!(comparison.advantages.is_empty());
    assert_eq!(comparison.competitive_score, 70);
    assert!(comparison.summary.contains("70"));
}

#[test]
fn test_content_thresholds_are_asymmetric() {
    // Your 1200-word lead is an advantage (threshold 500)...
    let comparison = compare_profiles(&page_with_words(2000), &page_with_words(800), None);
    assert!(comparison.gaps.is_empty());
    assert_eq!(comparison.advantages.len(), 1);
    assert_eq!(comparison.advantages[0].category, "Content Depth");
    assert_eq!(comparison.competitive_score, 90);

    // ...but the competitor's 900-word lead is below the 1000-word gap
    // threshold, so swapping the profiles does not mirror the result.
    let comparison = compare_profiles(&page_with_words(800), &page_with_words(1700), None);
    assert!(comparison.gaps.is_empty());
    assert!(comparison.advantages.is_empty());
    assert_eq!(comparison.competitive_score, 85);
}

#[test]
fn test_keyword_placement_and_density_gaps() {
    let yours = page_with_words(500);
    let competitor = page_with_words(500);
    let your_kw = keyword_analysis(false, false, 0.5);
    let their_kw = keyword_analysis(true, true, 1.5);

    let comparison = compare_profiles(&yours, &competitor, Some((&your_kw, &their_kw)));

    let placement_gaps: Vec<_> = comparison
        .gaps
        .iter()
        .filter(|g| g.category == "Keyword Placement")
        .collect();
    assert_eq!(placement_gaps.len(), 2);
    assert!(placement_gaps.iter().all(|g| g.impact == Impact::High));

    let density_gap = comparison
        .gaps
        .iter()
        .find(|g| g.category == "Keyword Density")
        .expect("density gap");
    assert_eq!(density_gap.impact, Impact::Medium);

    // 85 - 15 - 15 - 5
    assert_eq!(comparison.competitive_score, 50);
}

#[test]
fn test_no_density_gap_when_competitor_over_optimized() {
    let yours = page_with_words(500);
    let competitor = page_with_words(500);
    let your_kw = keyword_analysis(true, true, 0.2);
    let their_kw = keyword_analysis(true, true, 3.5);

    let comparison = compare_profiles(&yours, &competitor, Some((&your_kw, &their_kw)));
    assert!(!comparison
        .gaps
        .iter()
        .any(|g| g.category == "Keyword Density"));
}

#[test]
fn test_missing_organization_schema_is_critical() {
    let yours = profile(
        r#"<html><head>
        <script type="application/ld+json">{"@type": "Article"}</script>
        </head><body>x</body></html>"#,
        "https://mysite.com/",
    );
    let competitor = profile(
        r#"<html><head>
        <script type="application/ld+json">{"@type": "Organization"}</script>
        </head><body>x</body></html>"#,
        "https://rival.com/",
    );

    let comparison = compare_profiles(&yours, &competitor, None);

    let gap = comparison
        .gaps
        .iter()
        .find(|g| g.category == "Rich Snippets")
        .expect("schema gap");
    assert_eq!(gap.impact, Impact::Critical);
    assert_eq!(
        gap.details.as_deref(),
        Some(&["Organization".to_string()][..])
    );

    // Your Article schema counts as an advantage the other way.
    let advantage = comparison
        .advantages
        .iter()
        .find(|a| a.category == "Rich Snippets")
        .expect("schema advantage");
    assert!(advantage.description.contains("Article"));

    // 85 - 25 + 5
    assert_eq!(comparison.competitive_score, 65);
}

#[test]
fn test_topic_coverage_requires_content_lead_too() {
    let h2s = "<h2>A</h2>\n<h2>B</h2>\n<h2>C</h2>\n<h2>D</h2>\n<h2>E</h2>\n<h2>F</h2>";

    // More H2s but no word-count lead: not a gap.
    let yours = page_with_words(500);
    let same_length = profile(
        &format!(
            "<html><body>{}\n<p>{}</p></body></html>",
            h2s,
            (0..494).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ")
        ),
        "https://rival.com/",
    );
    let comparison = compare_profiles(&yours, &same_length, None);
    assert!(!comparison.gaps.iter().any(|g| g.category == "Topic Coverage"));

    // More H2s and more words: gap, with the competitor's section titles
    // carried as details.
    let longer = profile(
        &format!(
            "<html><body>{}\n<p>{}</p></body></html>",
            h2s,
            (0..800).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ")
        ),
        "https://rival.com/",
    );
    let comparison = compare_profiles(&yours, &longer, None);
    let gap = comparison
        .gaps
        .iter()
        .find(|g| g.category == "Topic Coverage")
        .expect("topic gap");
    assert_eq!(gap.impact, Impact::Medium);
    let details = gap.details.as_ref().expect("competitor section titles");
    assert_eq!(details.len(), 6);
    assert!(details.contains(&"A".to_string()));
}

#[test]
fn test_score_is_clamped_to_100() {
    // Five advantages: content depth, topic coverage, extra schema, keyword
    // in title, keyword in H1. 85 + 25 would exceed the ceiling.
    let your_html = format!(
        r#"<html><head>
        <script type="application/ld+json">{{"@type": "Article"}}</script>
        </head><body>
        <h2>A</h2>
        <h2>B</h2>
        <h2>C</h2>
        <h2>D</h2>
        <h2>E</h2>
        <p>{}</p></body></html>"#,
        (0..2000).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ")
    );
    let yours = profile(&your_html, "https://mysite.com/");
    let competitor = page_with_words(800);
    let your_kw = keyword_analysis(true, true, 1.0);
    let their_kw = keyword_analysis(false, false, 1.0);

    let comparison = compare_profiles(&yours, &competitor, Some((&your_kw, &their_kw)));
    assert_eq!(comparison.advantages.len(), 5);
    assert!(comparison.gaps.is_empty());
    assert_eq!(comparison.competitive_score, 100);
}

#[test]
fn test_score_is_floored_at_zero() {
    let competitor_html = format!(
        r#"<html><head>
        <title>{}</title>
        <meta name="description" content="{}">
        <script type="application/ld+json">{{"@type": "Organization"}}</script>
        </head><body>
        <h2>A</h2>
        <h2>B</h2>
        <h2>C</h2>
        <h2>D</h2>
        <h2>E</h2>
        <h2>F</h2>
        <p>{}</p></body></html>"#,
        "T".repeat(55),
        "D".repeat(155),
        (0..2200).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ")
    );
    let competitor = profile(&competitor_html, "https://rival.com/");
    let yours = page_with_words(100);
    let your_kw = keyword_analysis(false, false, 0.0);
    let their_kw = keyword_analysis(true, true, 1.0);

    let comparison = compare_profiles(&yours, &competitor, Some((&your_kw, &their_kw)));

    // Content (15) + two placements (30) + density (5) + title band (5)
    // + meta band (5) + critical schema (25) + topic coverage (5) = 90.
    assert_eq!(comparison.gaps.len(), 8);
    assert_eq!(comparison.competitive_score, 0);
}
