use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::extract::PageProfile;
use super::keyword::KeywordAnalysis;

/// Impact of a competitive finding. Critical is reserved for gaps that by
/// themselves sink a page's chances (for example missing Organization or
/// LocalBusiness schema while the competitor has it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Critical,
    High,
    Medium,
    Low,
}

impl Impact {
    fn score_penalty(&self) -> i32 {
        match self {
            Impact::Critical => 25,
            Impact::High => 15,
            Impact::Medium | Impact::Low => 5,
        }
    }
}

/// The competitor is ahead in this area.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Gap {
    pub category: String,
    pub description: String,
    pub impact: Impact,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

/// The analyzed page is ahead in this area.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Advantage {
    pub category: String,
    pub description: String,
    pub impact: Impact,
}

/// Result of diffing two page profiles.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Comparison {
    pub gaps: Vec<Gap>,
    pub advantages: Vec<Advantage>,
    /// 0-100; starts at 85, weighted gap penalties down, advantages up.
    pub competitive_score: u32,
    pub summary: String,
}

const CONTENT_GAP_WORDS: usize = 1000;
const CONTENT_ADVANTAGE_WORDS: usize = 500;
const DENSITY_GAP_POINTS: f64 = 0.5;
const DENSITY_OVER_OPTIMIZED: f64 = 3.0;
const TITLE_IDEAL: (usize, usize) = (50, 60);
const META_IDEAL: (usize, usize) = (150, 160);
const TOPIC_H2_GAP: usize = 3;
const BASE_SCORE: i32 = 85;

/// Diff your profile against a competitor's.
///
/// Thresholds are deliberately asymmetric: a gap is flagged only when the
/// competitor's lead is material, while an advantage takes a smaller lead.
/// Swapping the two profiles does not mirror the result.
pub fn compare_profiles(
    yours: &PageProfile,
    competitor: &PageProfile,
    keywords: Option<(&KeywordAnalysis, &KeywordAnalysis)>,
) -> Comparison {
    let mut gaps = Vec::new();
    let mut advantages = Vec::new();

    compare_content_depth(yours, competitor, &mut gaps, &mut advantages);
    if let Some((your_kw, their_kw)) = keywords {
        compare_keyword_placement(your_kw, their_kw, &mut gaps, &mut advantages);
    }
    compare_search_appearance(yours, competitor, &mut gaps);
    compare_rich_snippets(yours, competitor, &mut gaps, &mut advantages);
    compare_topic_coverage(yours, competitor, &mut gaps, &mut advantages);

    let competitive_score = score(&gaps, &advantages);
    let summary = format!(
        "{} competitive gaps and {} advantages versus {} (score {}/100)",
        gaps.len(),
        advantages.len(),
        competitor.domain,
        competitive_score
    );

    Comparison {
        gaps,
        advantages,
        competitive_score,
        summary,
    }
}

fn score(gaps: &[Gap], advantages: &[Advantage]) -> u32 {
    let mut score = BASE_SCORE;
    for gap in gaps {
        score -= gap.impact.score_penalty();
    }
    score += 5 * advantages.len() as i32;
    score.clamp(0, 100) as u32
}

fn compare_content_depth(
    yours: &PageProfile,
    competitor: &PageProfile,
    gaps: &mut Vec<Gap>,
    advantages: &mut Vec<Advantage>,
) {
    if competitor.content_word_count > yours.content_word_count + CONTENT_GAP_WORDS {
        gaps.push(Gap {
            category: "Content Depth".to_string(),
            description: format!(
                "Competitor has {} words of content versus your {}",
                competitor.content_word_count, yours.content_word_count
            ),
            impact: Impact::High,
            action: Some(format!(
                "Expand the content by roughly {} words to match competitor depth",
                competitor.content_word_count - yours.content_word_count
            )),
            details: None,
        });
    } else if yours.content_word_count > competitor.content_word_count + CONTENT_ADVANTAGE_WORDS {
        advantages.push(Advantage {
            category: "Content Depth".to_string(),
            description: format!(
                "Your content is deeper: {} words versus competitor's {}",
                yours.content_word_count, competitor.content_word_count
            ),
            impact: Impact::Medium,
        });
    }
}

fn compare_keyword_placement(
    yours: &KeywordAnalysis,
    theirs: &KeywordAnalysis,
    gaps: &mut Vec<Gap>,
    advantages: &mut Vec<Advantage>,
) {
    let placements = [
        ("title", yours.title_match.exact_match, theirs.title_match.exact_match),
        ("H1", yours.h1_match.exact_match, theirs.h1_match.exact_match),
    ];
    for (field, you_have, they_have) in placements {
        if they_have && !you_have {
            gaps.push(Gap {
                category: "Keyword Placement".to_string(),
                description: format!(
                    "Competitor uses \"{}\" in their {} and you do not",
                    theirs.keyword, field
                ),
                impact: Impact::High,
                action: Some(format!("Add \"{}\" to your {}", yours.keyword, field)),
                details: None,
            });
        } else if you_have && !they_have {
            advantages.push(Advantage {
                category: "Keyword Placement".to_string(),
                description: format!(
                    "You use \"{}\" in your {} and the competitor does not",
                    yours.keyword, field
                ),
                impact: Impact::Medium,
            });
        }
    }

    // Only a gap when the competitor leads by a real margin without being
    // over-optimized themselves.
    let density_lead = theirs.exact_density_pct - yours.exact_density_pct;
    if density_lead > DENSITY_GAP_POINTS && theirs.exact_density_pct <= DENSITY_OVER_OPTIMIZED {
        gaps.push(Gap {
            category: "Keyword Density".to_string(),
            description: format!(
                "Competitor's keyword density is {}% versus your {}%",
                theirs.exact_density_pct, yours.exact_density_pct
            ),
            impact: Impact::Medium,
            action: Some(format!(
                "Work \"{}\" into the body copy more often",
                yours.keyword
            )),
            details: None,
        });
    }
}

fn compare_search_appearance(yours: &PageProfile, competitor: &PageProfile, gaps: &mut Vec<Gap>) {
    let in_band = |len: usize, band: (usize, usize)| len >= band.0 && len <= band.1;

    if in_band(competitor.title_length, TITLE_IDEAL) && !in_band(yours.title_length, TITLE_IDEAL) {
        gaps.push(Gap {
            category: "Search Appearance".to_string(),
            description: format!(
                "Competitor's title length ({}) sits in the ideal 50-60 band; yours ({}) does not",
                competitor.title_length, yours.title_length
            ),
            impact: Impact::Medium,
            action: Some("Rewrite the title to 50-60 characters".to_string()),
            details: None,
        });
    }
    if in_band(competitor.meta_description_length, META_IDEAL)
        && !in_band(yours.meta_description_length, META_IDEAL)
    {
        gaps.push(Gap {
            category: "Search Appearance".to_string(),
            description: format!(
                "Competitor's meta description length ({}) sits in the ideal 150-160 band; yours ({}) does not",
                competitor.meta_description_length, yours.meta_description_length
            ),
            impact: Impact::Medium,
            action: Some("Rewrite the meta description to 150-160 characters".to_string()),
            details: None,
        });
    }
}

fn compare_rich_snippets(
    yours: &PageProfile,
    competitor: &PageProfile,
    gaps: &mut Vec<Gap>,
    advantages: &mut Vec<Advantage>,
) {
    let missing: Vec<String> = competitor
        .schema_types
        .difference(&yours.schema_types)
        .cloned()
        .collect();
    if !missing.is_empty() {
        let critical = missing
            .iter()
            .any(|t| t == "Organization" || t == "LocalBusiness");
        let impact = if critical {
            Impact::Critical
        } else if missing.len() > 2 {
            Impact::High
        } else {
            Impact::Medium
        };
        gaps.push(Gap {
            category: "Rich Snippets".to_string(),
            description: format!(
                "Competitor has {} schema types you lack",
                missing.len()
            ),
            impact,
            action: Some("Add the missing structured data types".to_string()),
            details: Some(missing),
        });
    }

    let extra: Vec<String> = yours
        .schema_types
        .difference(&competitor.schema_types)
        .cloned()
        .collect();
    if !extra.is_empty() {
        advantages.push(Advantage {
            category: "Rich Snippets".to_string(),
            description: format!(
                "You have {} schema types the competitor lacks: {}",
                extra.len(),
                extra.join(", ")
            ),
            impact: Impact::Medium,
        });
    }
}

/// Topic breadth alone is not enough; the competitor must also lead on
/// content length for this to count as a gap.
fn compare_topic_coverage(
    yours: &PageProfile,
    competitor: &PageProfile,
    gaps: &mut Vec<Gap>,
    advantages: &mut Vec<Advantage>,
) {
    let your_h2 = yours.heading_count(2);
    let their_h2 = competitor.heading_count(2);

    if their_h2 > your_h2 + TOPIC_H2_GAP
        && competitor.content_word_count > yours.content_word_count
    {
        gaps.push(Gap {
            category: "Topic Coverage".to_string(),
            description: format!(
                "Competitor covers {} H2 sections versus your {}",
                their_h2, your_h2
            ),
            impact: Impact::Medium,
            action: Some("Add sections covering the subtopics the competitor addresses".to_string()),
            details: Some(competitor.heading_texts(2).to_vec()),
        });
    } else if your_h2 > their_h2 + TOPIC_H2_GAP
        && yours.content_word_count > competitor.content_word_count
    {
        advantages.push(Advantage {
            category: "Topic Coverage".to_string(),
            description: format!(
                "You cover {} H2 sections versus the competitor's {}",
                your_h2, their_h2
            ),
            impact: Impact::Medium,
        });
    }
}
