use std::collections::HashMap;

use seointel::analysis::intel::{
    analyze_intel, detect_columns, extract_domain_metrics, DomainMetrics, ExportKind, ExportTable,
    SourceType,
};
use seointel::analysis::rules::Priority;

fn table(kind: Option<ExportKind>, headers: &[&str], rows: &[&[&str]]) -> ExportTable {
    let headers: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let rows = rows
        .iter()
        .map(|cells| {
            headers
                .iter()
                .cloned()
                .zip(cells.iter().map(|c| c.to_string()))
                .collect::<HashMap<String, String>>()
        })
        .collect();
    ExportTable {
        name: "export.csv".to_string(),
        kind,
        headers,
        rows,
    }
}

#[test]
fn test_detect_columns_by_domain_hint() {
    let headers: Vec<String> = ["Keyword", "mysite.com", "competitor.com", "Volume"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    // Scheme and www prefix on the hint are ignored.
    let columns = detect_columns(&headers, "https://www.mysite.com/").expect("columns detected");
    assert_eq!(columns.your_col, "mysite.com");
    assert_eq!(columns.competitor_col, "competitor.com");
}

#[test]
fn test_detect_columns_by_your_token() {
    let headers: Vec<String> = ["Keyword", "Your Position", "rival.net", "Volume"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    let columns = detect_columns(&headers, "unrelated.example").expect("columns detected");
    assert_eq!(columns.your_col, "Your Position");
    assert_eq!(columns.competitor_col, "rival.net");
}

#[test]
fn test_detect_columns_none_when_unresolvable() {
    let headers: Vec<String> = ["Keyword", "Volume", "Difficulty"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    assert!(detect_columns(&headers, "mysite.com").is_none());
}

#[test]
fn test_keyword_gap_priorities() {
    let export = table(
        Some(ExportKind::KeywordGap),
        &["Keyword", "Search Volume", "mysite.com", "rival.com"],
        &[
            // Volume > 500 and rank gap > 5: critical.
            &["best widgets", "600", "15", "3"],
            // Volume > 200 and rank gap > 3: high.
            &["widget prices", "250", "9", "4"],
            // Qualifies but clears no breakpoint: medium.
            &["widget faq", "80", "7", "5"],
            // Volume at the floor: skipped.
            &["cheap widgets", "50", "20", "1"],
            // You already rank better: skipped.
            &["widget repair", "900", "2", "8"],
        ],
    );

    let report = analyze_intel(&[export], "mysite.com", None, None);

    assert_eq!(report.keyword_gap_count, 3);
    assert_eq!(report.backlink_gap_count, 0);
    assert!(report.degraded_files.is_empty());

    let priorities: Vec<Priority> = report.action_items.iter().map(|a| a.priority).collect();
    assert_eq!(
        priorities,
        vec![Priority::Critical, Priority::High, Priority::Medium]
    );
    assert!(report
        .action_items
        .iter()
        .all(|a| a.source_type == SourceType::Keyword));

    let critical = &report.action_items[0];
    assert!(critical.title.contains("best widgets"));
    assert_eq!(critical.metrics["rank_gap"], 12.0);
    assert_eq!(critical.metrics["search_volume"], 600.0);

    // 3 keyword gaps: exactly at the medium breakpoint, -5. No backlink
    // gaps: +5. 50 - 5 + 5.
    assert_eq!(report.competitive_score, 50);
}

#[test]
fn test_missing_rank_loses_to_any_ranked_competitor() {
    let export = table(
        Some(ExportKind::KeywordGap),
        &["Keyword", "Volume", "mysite.com", "rival.com"],
        &[&["widget guide", "100", "", "3"]],
    );

    let report = analyze_intel(&[export], "mysite.com", None, None);
    assert_eq!(report.keyword_gap_count, 1);
    assert_eq!(report.action_items[0].metrics["your_rank"], 999.0);
    // Huge rank gap, but volume clears no breakpoint.
    assert_eq!(report.action_items[0].priority, Priority::Medium);
}

#[test]
fn test_thousands_separators_in_volume() {
    let export = table(
        Some(ExportKind::KeywordGap),
        &["Keyword", "Volume", "mysite.com", "rival.com"],
        &[&["widget hub", "1,200", "12", "2"]],
    );

    let report = analyze_intel(&[export], "mysite.com", None, None);
    assert_eq!(report.action_items[0].priority, Priority::Critical);
    assert_eq!(report.action_items[0].metrics["search_volume"], 1200.0);
}

#[test]
fn test_backlink_gap_priorities() {
    // Kind omitted; "Referring Domain" in the headers classifies the file.
    let export = table(
        None,
        &["Referring Domain", "Authority Score", "mysite.com", "rival.com"],
        &[
            &["news.com", "75", "0", "3"],
            &["blog.net", "55", "0", "1"],
            &["forum.org", "30", "0", "2"],
            // You already have a link: skipped.
            &["already.com", "80", "2", "5"],
            // Authority at or below the floor: skipped.
            &["lowauth.com", "20", "0", "4"],
        ],
    );

    let report = analyze_intel(&[export], "mysite.com", None, None);

    assert_eq!(report.backlink_gap_count, 3);
    let priorities: Vec<Priority> = report.action_items.iter().map(|a| a.priority).collect();
    assert_eq!(
        priorities,
        vec![Priority::Critical, Priority::High, Priority::Medium]
    );
    assert!(report.action_items[0].title.contains("news.com"));
    assert!(report
        .action_items
        .iter()
        .all(|a| a.source_type == SourceType::Backlink));
}

#[test]
fn test_unresolvable_file_degrades_without_failing() {
    let good = table(
        Some(ExportKind::KeywordGap),
        &["Keyword", "Volume", "mysite.com", "rival.com"],
        &[&["widgets", "600", "15", "3"]],
    );
    let mut bad = table(None, &["Keyword", "Volume", "Difficulty"], &[]);
    bad.name = "mystery.csv".to_string();

    let report = analyze_intel(&[good, bad], "mysite.com", None, None);

    assert_eq!(report.keyword_gap_count, 1);
    assert_eq!(report.degraded_files, vec!["mystery.csv".to_string()]);
}

#[test]
fn test_domain_metric_comparison() {
    let yours = DomainMetrics {
        authority_score: Some(30.0),
        organic_traffic: Some(1000.0),
        total_backlinks: Some(500.0),
        ..Default::default()
    };
    let theirs = DomainMetrics {
        authority_score: Some(60.0),
        organic_traffic: Some(2500.0),
        total_backlinks: Some(400.0),
        ..Default::default()
    };

    let report = analyze_intel(&[], "mysite.com", Some(&yours), Some(&theirs));

    // Authority gap of 30 is critical; traffic more than doubled is high.
    // Backlinks where you lead produce nothing.
    assert_eq!(report.action_items.len(), 2);
    assert_eq!(report.action_items[0].priority, Priority::Critical);
    assert_eq!(report.action_items[0].source_type, SourceType::DomainMetric);
    assert_eq!(report.action_items[1].priority, Priority::High);
    assert_eq!(report.metric_insights.len(), 2);

    // 50 + 5 + 5 for zero gap counts, -25 for the authority deficit.
    assert_eq!(report.competitive_score, 35);
}

#[test]
fn test_empty_input_scores_above_baseline() {
    let report = analyze_intel(&[], "mysite.com", None, None);
    assert!(report.action_items.is_empty());
    assert_eq!(report.competitive_score, 60);
}

#[test]
fn test_extract_domain_metrics_from_report_text() {
    let text = "Overview for mysite.com\n\
                Authority Score: 42\n\
                Organic Search Traffic 1,234.5 visits\n\
                Total Backlinks: 10,000\n\
                Referring Domains - 321";
    let metrics = extract_domain_metrics(text);
    assert_eq!(metrics.authority_score, Some(42.0));
    assert_eq!(metrics.organic_traffic, Some(1234.5));
    assert_eq!(metrics.total_backlinks, Some(10000.0));
    assert_eq!(metrics.referring_domains, Some(321.0));
    assert_eq!(metrics.organic_keywords, None);
    assert_eq!(metrics.traffic_value, None);
}

#[test]
fn test_extract_domain_metrics_first_match_wins() {
    let text = "Authority Score: 42 was previously Authority Score: 17";
    let metrics = extract_domain_metrics(text);
    assert_eq!(metrics.authority_score, Some(42.0));
}
