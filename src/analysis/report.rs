use serde::{Deserialize, Serialize};
use std::fmt::Write;
use utoipa::ToSchema;

use super::compare::{Comparison, Impact};
use super::extract::PageProfile;
use super::intel::IntelReport;
use super::keyword::KeywordAnalysis;
use super::rules::{Issue, Priority, Recommendation, Severity};
use super::PageAnalysis;

/// The merged result of one analysis request. Built once by [`synthesize`]
/// and not mutated afterwards; persistence, if any, is the caller's concern.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Report {
    pub profile: PageProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword_analysis: Option<KeywordAnalysis>,
    pub issues: Vec<Issue>,
    /// Sorted by priority, critical first, stable for ties.
    pub recommendations: Vec<Recommendation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub competitor_profile: Option<PageProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<Comparison>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intel: Option<IntelReport>,
    /// Deterministic sectioned text rendering of everything above.
    pub digest: String,
}

/// Merge the pipeline outputs into one report and render its digest.
pub fn synthesize(
    page: PageAnalysis,
    competitor: Option<PageAnalysis>,
    comparison: Option<Comparison>,
    intel: Option<IntelReport>,
) -> Report {
    let PageAnalysis {
        profile,
        keyword,
        outcome,
    } = page;

    let mut recommendations = outcome.recommendations;
    recommendations.sort_by_key(|r| r.priority.rank());

    let mut intel = intel;
    if let Some(intel) = intel.as_mut() {
        intel.action_items.sort_by_key(|a| a.priority.rank());
    }

    let mut report = Report {
        profile,
        keyword_analysis: keyword,
        issues: outcome.issues,
        recommendations,
        competitor_profile: competitor.map(|c| c.profile),
        comparison,
        intel,
        digest: String::new(),
    };
    report.digest = render_digest(&report);
    report
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn impact_label(impact: Impact) -> &'static str {
    match impact {
        Impact::Critical => "critical",
        Impact::High => "high",
        Impact::Medium => "medium",
        Impact::Low => "low",
    }
}

fn priority_label(priority: Priority) -> &'static str {
    match priority {
        Priority::Critical => "critical",
        Priority::High => "high",
        Priority::Medium => "medium",
        Priority::Low => "low",
    }
}

/// Render the sectioned text digest. Pure: same report, same text.
pub fn render_digest(report: &Report) -> String {
    let mut out = String::new();
    let p = &report.profile;

    let _ = writeln!(out, "== PAGE ==");
    let _ = writeln!(out, "URL: {}", p.url);
    let _ = writeln!(out, "Domain: {}", p.domain);
    let _ = writeln!(out, "Title ({} chars): {}", p.title_length, p.title);
    let _ = writeln!(
        out,
        "Meta description ({} chars): {}",
        p.meta_description_length, p.meta_description
    );
    let _ = writeln!(out, "Pillar post: {}", yes_no(p.is_pillar_post));

    let _ = writeln!(out, "\n== CONTENT ==");
    let _ = writeln!(out, "Words: {}", p.content_word_count);
    let _ = writeln!(out, "Readability: {}/100", p.readability_score);
    let heading_counts: Vec<String> = (1..=6u8)
        .map(|level| format!("H{}:{}", level, p.heading_count(level)))
        .collect();
    let _ = writeln!(out, "Headings: {}", heading_counts.join(" "));
    let _ = writeln!(
        out,
        "Links: {} internal / {} external",
        p.internal_link_count, p.external_link_count
    );
    let _ = writeln!(
        out,
        "Images: {} total ({} missing alt, {} lazy-loaded)",
        p.images.total, p.images.without_alt, p.images.lazy_loaded_count
    );

    let _ = writeln!(out, "\n== TECHNICAL ==");
    let _ = writeln!(out, "HTTPS: {}", yes_no(p.is_https));
    let _ = writeln!(out, "Viewport: {}", yes_no(p.technical.has_viewport));
    let _ = writeln!(out, "Charset: {}", yes_no(p.technical.has_charset));
    let _ = writeln!(
        out,
        "Canonical: {}",
        if p.technical.canonical_url.is_empty() {
            "not set"
        } else {
            &p.technical.canonical_url
        }
    );
    let _ = writeln!(out, "Favicon: {}", yes_no(p.technical.has_favicon));
    let _ = writeln!(
        out,
        "Open Graph: {}",
        yes_no(!p.technical.open_graph.title.is_empty()
            || !p.technical.open_graph.description.is_empty())
    );
    let _ = writeln!(
        out,
        "Render-blocking scripts: {}",
        p.performance.render_blocking_script_count
    );
    let _ = writeln!(out, "Responsive score: {}%", p.responsive.score());

    let _ = writeln!(out, "\n== SCHEMA ==");
    if p.schema_types.is_empty() {
        let _ = writeln!(out, "No structured data found");
    } else {
        let types: Vec<&str> = p.schema_types.iter().map(|s| s.as_str()).collect();
        let _ = writeln!(out, "Types: {}", types.join(", "));
    }

    let _ = writeln!(out, "\n== KEYWORD ==");
    match &report.keyword_analysis {
        Some(kw) => {
            let _ = writeln!(out, "Keyword: {}", kw.keyword);
            let _ = writeln!(out, "Title match: {}", match_label(&kw.title_match));
            let _ = writeln!(out, "H1 match: {}", match_label(&kw.h1_match));
            let _ = writeln!(out, "Meta match: {}", match_label(&kw.meta_match));
            let _ = writeln!(
                out,
                "Density: {}% exact / {}% partial",
                kw.exact_density_pct, kw.partial_density_pct
            );
        }
        None => {
            let _ = writeln!(out, "Not available (no target keyword supplied)");
        }
    }

    let _ = writeln!(out, "\n== COMPETITOR ==");
    match (&report.competitor_profile, &report.comparison) {
        (Some(cp), Some(cmp)) => {
            let _ = writeln!(out, "URL: {}", cp.url);
            let _ = writeln!(out, "Words: {}", cp.content_word_count);
            let _ = writeln!(out, "Competitive score: {}/100", cmp.competitive_score);
            let _ = writeln!(out, "{}", cmp.summary);

            let critical: Vec<_> = cmp
                .gaps
                .iter()
                .filter(|g| g.impact == Impact::Critical)
                .collect();
            if !critical.is_empty() {
                let _ = writeln!(out, "\n== CRITICAL GAPS ==");
                for gap in critical {
                    let _ = writeln!(out, "- [{}] {}", gap.category, gap.description);
                }
            }

            let _ = writeln!(out, "\n== GAPS ==");
            if cmp.gaps.is_empty() {
                let _ = writeln!(out, "None found");
            }
            for gap in &cmp.gaps {
                let _ = writeln!(
                    out,
                    "- [{}] {}: {}",
                    impact_label(gap.impact),
                    gap.category,
                    gap.description
                );
                if let Some(details) = &gap.details {
                    for detail in details {
                        let _ = writeln!(out, "    * {}", detail);
                    }
                }
            }

            let _ = writeln!(out, "\n== ADVANTAGES ==");
            if cmp.advantages.is_empty() {
                let _ = writeln!(out, "None found");
            }
            for adv in &cmp.advantages {
                let _ = writeln!(out, "- [{}] {}", adv.category, adv.description);
            }
        }
        _ => {
            let _ = writeln!(out, "Not available (no competitor supplied)");
        }
    }

    let _ = writeln!(out, "\n== ISSUES ==");
    write_issue_section(&mut out, "Errors", &report.issues, Severity::Error);
    write_issue_section(&mut out, "Warnings", &report.issues, Severity::Warning);
    write_issue_section(&mut out, "Info", &report.issues, Severity::Info);
    write_issue_section(&mut out, "Passed", &report.issues, Severity::Success);

    let _ = writeln!(out, "\n== ACTION PLAN ==");
    let mut plan: Vec<(Priority, String)> = report
        .recommendations
        .iter()
        .map(|r| (r.priority, r.action.clone()))
        .collect();
    if let Some(intel) = &report.intel {
        plan.extend(
            intel
                .action_items
                .iter()
                .map(|a| (a.priority, a.title.clone())),
        );
    }
    plan.sort_by_key(|(priority, _)| priority.rank());
    for (index, (priority, action)) in plan.iter().enumerate() {
        let _ = writeln!(out, "{}. [{}] {}", index + 1, priority_label(*priority), action);
    }

    if let Some(intel) = &report.intel {
        let _ = writeln!(out, "\n== COMPETITIVE INTELLIGENCE ==");
        let _ = writeln!(
            out,
            "Keyword gaps: {} / Backlink gaps: {}",
            intel.keyword_gap_count, intel.backlink_gap_count
        );
        let _ = writeln!(out, "Intel score: {}/100", intel.competitive_score);
        for insight in &intel.metric_insights {
            let _ = writeln!(out, "- {}", insight);
        }
        for degraded in &intel.degraded_files {
            let _ = writeln!(out, "- Could not interpret export file: {}", degraded);
        }
    }

    out
}

fn match_label(field: &super::keyword::FieldMatch) -> &'static str {
    if field.exact_match {
        "exact"
    } else if field.partial_match {
        "partial"
    } else {
        "none"
    }
}

fn write_issue_section(out: &mut String, label: &str, issues: &[Issue], severity: Severity) {
    let selected: Vec<&Issue> = issues.iter().filter(|i| i.severity == severity).collect();
    let _ = writeln!(out, "{} ({}):", label, selected.len());
    for issue in selected {
        let _ = writeln!(out, "- [{}] {}", issue.category, issue.message);
    }
}
