use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use utoipa::ToSchema;

use super::rules::Priority;

/// Where an action item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SourceType {
    Keyword,
    Backlink,
    DomainMetric,
}

/// A recommended action derived from exported competitor-intelligence data.
/// Never references a page profile; tabular sources stand on their own.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActionItem {
    pub priority: Priority,
    pub title: String,
    pub description: String,
    /// Why the competitor is ahead on this row.
    pub reason: String,
    pub source_type: SourceType,
    pub metrics: BTreeMap<String, f64>,
}

/// Kind of rank-tracker export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ExportKind {
    KeywordGap,
    BacklinkGap,
}

/// One parsed export file: ordered headers plus rows of untyped strings.
/// The reader that produced it (CSV or otherwise) lives outside the engine.
#[derive(Debug, Clone)]
pub struct ExportTable {
    pub name: String,
    pub kind: Option<ExportKind>,
    pub headers: Vec<String>,
    pub rows: Vec<HashMap<String, String>>,
}

/// Resolved per-domain columns for one export file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedColumns {
    pub your_col: String,
    pub competitor_col: String,
}

/// Domain-level metrics scraped from free-form report text.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct DomainMetrics {
    pub authority_score: Option<f64>,
    pub organic_traffic: Option<f64>,
    pub total_backlinks: Option<f64>,
    pub referring_domains: Option<f64>,
    pub organic_keywords: Option<f64>,
    pub traffic_value: Option<f64>,
}

/// Output of the external-intelligence analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct IntelReport {
    pub action_items: Vec<ActionItem>,
    /// Plain-language explanations of why the competitor domain is ahead.
    pub metric_insights: Vec<String>,
    pub keyword_gap_count: usize,
    pub backlink_gap_count: usize,
    /// 0-100; base 50 adjusted by gap counts and the authority-score gap.
    pub competitive_score: u32,
    /// Files whose columns could not be resolved; they contributed nothing.
    pub degraded_files: Vec<String>,
}

const MIN_SEARCH_VOLUME: f64 = 50.0;
const MIN_AUTHORITY: f64 = 20.0;
const UNRANKED_SENTINEL: f64 = 999.0;

/// Analyze all export tables plus optional domain metrics for both sides.
///
/// Each file is independent: a file whose columns cannot be detected is
/// recorded as degraded and skipped, never failing the whole analysis.
#[tracing::instrument(skip_all, fields(files = tables.len(), your_domain = %your_domain))]
pub fn analyze_intel(
    tables: &[ExportTable],
    your_domain: &str,
    your_metrics: Option<&DomainMetrics>,
    competitor_metrics: Option<&DomainMetrics>,
) -> IntelReport {
    let mut report = IntelReport::default();

    for table in tables {
        let Some(columns) = detect_columns(&table.headers, your_domain) else {
            tracing::warn!(file = %table.name, "Could not detect domain columns; skipping file");
            report.degraded_files.push(table.name.clone());
            continue;
        };
        let Some(kind) = table.kind.or_else(|| detect_kind(&table.headers)) else {
            tracing::warn!(file = %table.name, "Could not classify export kind; skipping file");
            report.degraded_files.push(table.name.clone());
            continue;
        };
        match kind {
            ExportKind::KeywordGap => analyze_keyword_gaps(table, &columns, &mut report),
            ExportKind::BacklinkGap => analyze_backlink_gaps(table, &columns, &mut report),
        }
    }

    if let (Some(yours), Some(theirs)) = (your_metrics, competitor_metrics) {
        compare_domain_metrics(yours, theirs, &mut report);
    }

    report.competitive_score = intel_score(&report, your_metrics, competitor_metrics);
    report
}

/// Resolve the "your domain" and competitor columns from export headers.
///
/// Domain-like headers are those resembling a domain or URL. The your-domain
/// column must contain the configured domain (scheme and www stripped) or
/// the literal token "your"; the first remaining domain-like column becomes
/// the competitor. `None` means this file cannot be interpreted.
pub fn detect_columns(headers: &[String], your_domain_hint: &str) -> Option<DetectedColumns> {
    let hint = normalize_domain(your_domain_hint);

    let your_col = headers.iter().find(|h| {
        let lower = h.to_lowercase();
        (!hint.is_empty() && lower.contains(&hint)) || lower.contains("your")
    })?;

    let competitor_col = headers
        .iter()
        .find(|h| looks_like_domain(h) && *h != your_col)?;

    Some(DetectedColumns {
        your_col: your_col.clone(),
        competitor_col: competitor_col.clone(),
    })
}

fn normalize_domain(domain: &str) -> String {
    domain
        .trim()
        .to_lowercase()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_start_matches("www.")
        .trim_end_matches('/')
        .to_string()
}

fn looks_like_domain(header: &str) -> bool {
    let lower = header.to_lowercase();
    lower.contains(".com") || lower.contains(".net") || lower.contains(".org") || lower.contains("://")
}

fn detect_kind(headers: &[String]) -> Option<ExportKind> {
    let joined = headers.join(" ").to_lowercase();
    if joined.contains("volume") || joined.contains("keyword") {
        Some(ExportKind::KeywordGap)
    } else if joined.contains("backlink") || joined.contains("authority") || joined.contains("domain") {
        Some(ExportKind::BacklinkGap)
    } else {
        None
    }
}

fn analyze_keyword_gaps(table: &ExportTable, columns: &DetectedColumns, report: &mut IntelReport) {
    let keyword_col = find_header(&table.headers, &["keyword"]);
    let volume_col = find_header(&table.headers, &["volume"]);

    for row in &table.rows {
        let keyword = keyword_col
            .and_then(|c| row.get(c))
            .cloned()
            .unwrap_or_default();
        let volume = volume_col.and_then(|c| row.get(c)).map_or(0.0, |v| parse_number(v));
        let your_rank = rank_value(row, &columns.your_col);
        let their_rank = rank_value(row, &columns.competitor_col);

        // Lower rank is better.
        if their_rank >= your_rank || volume <= MIN_SEARCH_VOLUME {
            continue;
        }
        let rank_gap = your_rank - their_rank;

        let priority = if volume > 500.0 && rank_gap > 5.0 {
            Priority::Critical
        } else if volume > 200.0 && rank_gap > 3.0 {
            Priority::High
        } else {
            Priority::Medium
        };

        let mut metrics = BTreeMap::new();
        metrics.insert("your_rank".to_string(), your_rank);
        metrics.insert("competitor_rank".to_string(), their_rank);
        metrics.insert("search_volume".to_string(), volume);
        metrics.insert("rank_gap".to_string(), rank_gap);

        report.keyword_gap_count += 1;
        report.action_items.push(ActionItem {
            priority,
            title: format!("Close the ranking gap for \"{}\"", keyword),
            description: format!(
                "Competitor ranks #{} while you rank #{} for \"{}\"",
                their_rank as i64, your_rank as i64, keyword
            ),
            reason: format!(
                "The competitor is {} positions ahead on a keyword with {} monthly searches",
                rank_gap as i64, volume as i64
            ),
            source_type: SourceType::Keyword,
            metrics,
        });
    }
}

fn analyze_backlink_gaps(table: &ExportTable, columns: &DetectedColumns, report: &mut IntelReport) {
    let domain_col = find_header(&table.headers, &["domain", "source"]);
    let authority_col = find_header(&table.headers, &["authority", "score"]);

    for row in &table.rows {
        let referring_domain = domain_col
            .and_then(|c| row.get(c))
            .cloned()
            .unwrap_or_default();
        let authority = authority_col
            .and_then(|c| row.get(c))
            .map_or(0.0, |v| parse_number(v));
        let your_links = row.get(&columns.your_col).map_or(0.0, |v| parse_number(v));
        let their_links = row
            .get(&columns.competitor_col)
            .map_or(0.0, |v| parse_number(v));

        if your_links != 0.0 || their_links <= 0.0 || authority <= MIN_AUTHORITY {
            continue;
        }

        let priority = if authority > 70.0 {
            Priority::Critical
        } else if authority > 50.0 {
            Priority::High
        } else {
            Priority::Medium
        };

        let mut metrics = BTreeMap::new();
        metrics.insert("authority_score".to_string(), authority);
        metrics.insert("competitor_backlinks".to_string(), their_links);

        report.backlink_gap_count += 1;
        report.action_items.push(ActionItem {
            priority,
            title: format!("Earn a backlink from {}", referring_domain),
            description: format!(
                "{} links to your competitor {} times but never to you",
                referring_domain, their_links as i64
            ),
            reason: format!(
                "A domain with authority score {} strengthens the competitor's profile",
                authority as i64
            ),
            source_type: SourceType::Backlink,
            metrics,
        });
    }
}

fn compare_domain_metrics(yours: &DomainMetrics, theirs: &DomainMetrics, report: &mut IntelReport) {
    let tracked = [
        ("authority score", yours.authority_score, theirs.authority_score),
        ("organic traffic", yours.organic_traffic, theirs.organic_traffic),
        ("total backlinks", yours.total_backlinks, theirs.total_backlinks),
        ("referring domains", yours.referring_domains, theirs.referring_domains),
    ];

    for (label, your_value, their_value) in tracked {
        let (Some(your_value), Some(their_value)) = (your_value, their_value) else {
            continue;
        };
        if their_value <= your_value {
            continue;
        }

        report.metric_insights.push(format!(
            "Competitor's {} is {} versus your {}",
            label, their_value, your_value
        ));

        let priority = if label == "authority score" {
            let gap = their_value - your_value;
            if gap > 20.0 {
                Priority::Critical
            } else if gap > 10.0 {
                Priority::High
            } else {
                Priority::Medium
            }
        } else if their_value > your_value * 2.0 {
            Priority::High
        } else {
            Priority::Medium
        };

        let mut metrics = BTreeMap::new();
        metrics.insert("your_value".to_string(), your_value);
        metrics.insert("competitor_value".to_string(), their_value);

        report.action_items.push(ActionItem {
            priority,
            title: format!("Improve your {}", label),
            description: format!(
                "Competitor leads on {}: {} versus {}",
                label, their_value, your_value
            ),
            reason: format!(
                "A stronger {} is part of why the competitor domain outranks you",
                label
            ),
            source_type: SourceType::DomainMetric,
            metrics,
        });
    }
}

/// Base 50, adjusted by gap counts on fixed breakpoints, with an extra
/// penalty for an authority-score deficit. Clamped to [0, 100].
fn intel_score(
    report: &IntelReport,
    your_metrics: Option<&DomainMetrics>,
    competitor_metrics: Option<&DomainMetrics>,
) -> u32 {
    let mut score = 50i32;
    score += count_adjustment(report.keyword_gap_count, (10, 5, 3));
    score += count_adjustment(report.backlink_gap_count, (50, 20, 10));

    if let (Some(yours), Some(theirs)) = (your_metrics, competitor_metrics) {
        if let (Some(your_as), Some(their_as)) = (yours.authority_score, theirs.authority_score) {
            let gap = their_as - your_as;
            if gap > 20.0 {
                score -= 25;
            } else if gap > 10.0 {
                score -= 15;
            } else if gap > 5.0 {
                score -= 10;
            }
        }
    }

    score.clamp(0, 100) as u32
}

fn count_adjustment(count: usize, breakpoints: (usize, usize, usize)) -> i32 {
    let (b0, b1, b2) = breakpoints;
    if count > b0 {
        -20
    } else if count > b1 {
        -15
    } else if count > b2 {
        -10
    } else if count > 0 {
        -5
    } else {
        5
    }
}

fn find_header<'a>(headers: &'a [String], needles: &[&str]) -> Option<&'a String> {
    headers.iter().find(|h| {
        let lower = h.to_lowercase();
        needles.iter().any(|n| lower.contains(n))
    })
}

/// Numeric coercion for untyped export cells: thousands separators and
/// percent/currency markers are stripped; anything unparseable is 0.
fn parse_number(value: &str) -> f64 {
    let cleaned: String = value
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    cleaned.parse().unwrap_or(0.0)
}

/// Rank cells default to a large sentinel so a missing rank always loses.
fn rank_value(row: &HashMap<String, String>, col: &str) -> f64 {
    let Some(raw) = row.get(col) else {
        return UNRANKED_SENTINEL;
    };
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    cleaned.parse().unwrap_or(UNRANKED_SENTINEL)
}

static METRIC_PATTERNS: Lazy<Vec<(MetricField, Regex)>> = Lazy::new(|| {
    let pattern = |label: &str| {
        // Label followed by optional separators, then the first number.
        Regex::new(&format!(r"(?i){}\D{{0,24}}?([\d][\d,]*\.?\d*)", label))
            .expect("metric pattern is valid")
    };
    vec![
        (MetricField::AuthorityScore, pattern(r"authority\s*score")),
        (MetricField::OrganicTraffic, pattern(r"organic\s*(?:search\s*)?traffic")),
        (MetricField::TotalBacklinks, pattern(r"(?:total\s*)?backlinks")),
        (MetricField::ReferringDomains, pattern(r"referring\s*domains")),
        (MetricField::OrganicKeywords, pattern(r"organic\s*keywords")),
        (MetricField::TrafficValue, pattern(r"traffic\s*(?:value|cost)")),
    ]
});

#[derive(Debug, Clone, Copy)]
enum MetricField {
    AuthorityScore,
    OrganicTraffic,
    TotalBacklinks,
    ReferringDomains,
    OrganicKeywords,
    TrafficValue,
}

/// Best-effort labeled-number extraction from free-form report text.
/// The first match for each label wins; thousands separators are stripped.
pub fn extract_domain_metrics(text: &str) -> DomainMetrics {
    let mut metrics = DomainMetrics::default();
    for (field, pattern) in METRIC_PATTERNS.iter() {
        let Some(captures) = pattern.captures(text) else {
            continue;
        };
        let Some(value) = captures
            .get(1)
            .and_then(|m| m.as_str().replace(',', "").parse::<f64>().ok())
        else {
            continue;
        };
        let slot = match field {
            MetricField::AuthorityScore => &mut metrics.authority_score,
            MetricField::OrganicTraffic => &mut metrics.organic_traffic,
            MetricField::TotalBacklinks => &mut metrics.total_backlinks,
            MetricField::ReferringDomains => &mut metrics.referring_domains,
            MetricField::OrganicKeywords => &mut metrics.organic_keywords,
            MetricField::TrafficValue => &mut metrics.traffic_value,
        };
        if slot.is_none() {
            *slot = Some(value);
        }
    }
    metrics
}
