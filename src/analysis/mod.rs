//! The analysis engine: pure, synchronous computation over already-fetched
//! inputs. One document in, one report graph out; no state survives a call.

pub mod compare;
pub mod extract;
pub mod intel;
pub mod keyword;
pub mod readability;
pub mod report;
pub mod rules;

use select::document::Document;

use crate::error::AppError;
use extract::{ExtractedDocument, PageProfile};
use keyword::KeywordAnalysis;
use rules::RuleOutcome;

/// Caller-supplied context for a single page analysis.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    pub target_keyword: Option<String>,
    pub is_pillar_post: bool,
}

/// Everything the engine derives from one document.
#[derive(Debug, Clone)]
pub struct PageAnalysis {
    pub profile: PageProfile,
    pub keyword: Option<KeywordAnalysis>,
    pub outcome: RuleOutcome,
}

/// Run the full single-page pipeline: extraction, readability, keyword
/// analysis and the rule table.
///
/// An empty document is the only fatal condition; everything else degrades
/// field by field.
#[tracing::instrument(skip(html, opts), fields(url = %url, html_len = html.len()))]
pub fn analyze_document(
    html: &str,
    url: &str,
    opts: &AnalyzeOptions,
) -> Result<PageAnalysis, AppError> {
    if html.trim().is_empty() {
        return Err(AppError::MissingDocument(format!(
            "empty document body for {}",
            url
        )));
    }

    let document = Document::from(html);
    let ExtractedDocument {
        mut profile,
        body_text,
    } = extract::extract_profile(&document, url, opts.is_pillar_post);

    profile.readability_score = readability::flesch_reading_ease(&body_text);

    let keyword = opts
        .target_keyword
        .as_deref()
        .filter(|k| !k.trim().is_empty())
        .map(|k| {
            let h1_joined = profile.heading_texts(1).join(" ");
            keyword::analyze_keyword(
                k,
                &profile.title,
                &h1_joined,
                &profile.meta_description,
                &body_text,
                profile.content_word_count,
            )
        });

    let outcome = rules::run_checks(&profile, keyword.as_ref());

    Ok(PageAnalysis {
        profile,
        keyword,
        outcome,
    })
}
