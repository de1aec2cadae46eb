//! Digest drafts built from a research batch.
//!
//! A draft is plain data: the agent fills in the big story and closing notes,
//! then runs [`validate`] and [`preview`] before handing it to a publisher.
//! [`organize_sections`] orders raw content by editorial priority before drafting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};

use crate::models::Item;

const MAX_PAPERS: usize = 5;
const MAX_REPOSITORIES: usize = 5;
const MAX_PRODUCTS: usize = 3;
const MAX_POSTS: usize = 3;
/// Below this many papers or repositories validation warns
const MIN_LISTED: usize = 3;
const PREVIEW_PAPERS: usize = 3;
const RULE_WIDTH: usize = 60;

/// Section order used when the editor gives none
pub const DEFAULT_PRIORITIES: [&str; 5] = ["big_story", "papers", "products", "repositories", "tweets"];

/// A digest draft
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Digest {
    pub metadata: DigestMetadata,
    pub sections: DigestSections,
    pub status: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DigestMetadata {
    pub issue_number: Option<u32>,
    /// Human-readable date, e.g. "January 15, 2024"
    pub date: String,
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DigestSections {
    pub big_story: BigStory,
    pub top_papers: Vec<Item>,
    pub repositories: Vec<Item>,
    pub products: Vec<Item>,
    pub posts: Vec<Item>,
    pub closing_notes: String,
}

impl DigestSections {
    /// Number of sections that carry content
    pub fn populated(&self) -> usize {
        [
            !self.big_story.title.trim().is_empty() || !self.big_story.content.trim().is_empty(),
            !self.top_papers.is_empty(),
            !self.repositories.is_empty(),
            !self.products.is_empty(),
            !self.posts.is_empty(),
            !self.closing_notes.trim().is_empty(),
        ]
        .iter()
        .filter(|present| **present)
        .count()
    }
}

/// Lead story, written by the editor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BigStory {
    pub title: String,
    pub content: String,
    pub source: String,
}

/// Build a draft from `research_data` keyed by source id
pub fn create_draft(
    research_data: &BTreeMap<String, Vec<Item>>,
    issue_number: u32,
    title: &str,
) -> Digest {
    create_draft_at(research_data, issue_number, title, Utc::now())
}

/// [`create_draft`] with an explicit clock
pub fn create_draft_at(
    research_data: &BTreeMap<String, Vec<Item>>,
    issue_number: u32,
    title: &str,
    now: DateTime<Utc>,
) -> Digest {
    let take = |source: &str, max: usize| -> Vec<Item> {
        research_data
            .get(source)
            .map(|items| items.iter().take(max).cloned().collect())
            .unwrap_or_default()
    };

    let digest = Digest {
        metadata: DigestMetadata {
            issue_number: Some(issue_number),
            date: now.format("%B %d, %Y").to_string(),
            title: format!("{} #{}", title, issue_number),
        },
        sections: DigestSections {
            big_story: BigStory::default(),
            top_papers: take("papers", MAX_PAPERS),
            repositories: take("repositories", MAX_REPOSITORIES),
            products: take("products", MAX_PRODUCTS),
            posts: take("tweets", MAX_POSTS),
            closing_notes: String::new(),
        },
        status: "draft".to_string(),
        created_at: now.to_rfc3339(),
    };

    tracing::info!(issue_number, "Created digest draft");
    digest
}

/// Outcome class of [`validate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    Success,
    Warning,
}

/// Completeness check for a draft
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub status: ValidationStatus,
    pub valid: bool,
    /// Problems that block publishing
    pub issues: Vec<String>,
    /// Thin sections worth another look
    pub warnings: Vec<String>,
    pub sections_count: usize,
}

/// Check a draft for missing required parts and thin sections
pub fn validate(digest: &Digest) -> ValidationReport {
    let sections = &digest.sections;
    let mut issues = Vec::new();
    let mut warnings = Vec::new();

    if sections.top_papers.len() < MIN_LISTED {
        warnings.push(format!(
            "Less than {} papers - consider adding more",
            MIN_LISTED
        ));
    }
    if sections.repositories.len() < MIN_LISTED {
        warnings.push(format!(
            "Less than {} GitHub repos - consider adding more",
            MIN_LISTED
        ));
    }

    if sections.big_story.content.trim().is_empty() {
        issues.push("Big story content is missing".to_string());
    }
    if sections.big_story.title.trim().is_empty() {
        issues.push("Big story title is missing".to_string());
    }
    if digest.metadata.issue_number.unwrap_or(0) == 0 {
        issues.push("Issue number is missing".to_string());
    }

    tracing::info!(
        issues = issues.len(),
        warnings = warnings.len(),
        "Validated digest draft"
    );

    ValidationReport {
        status: if issues.is_empty() {
            ValidationStatus::Success
        } else {
            ValidationStatus::Warning
        },
        valid: issues.is_empty(),
        issues,
        warnings,
        sections_count: sections.populated(),
    }
}

/// Plain-text summary of a draft
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preview {
    pub preview: String,
    pub word_count: usize,
}

/// Render a short plain-text overview of a draft
pub fn preview(digest: &Digest) -> Preview {
    let metadata = &digest.metadata;
    let sections = &digest.sections;
    let rule = "=".repeat(RULE_WIDTH);

    let title = if metadata.title.is_empty() {
        "Digest Preview"
    } else {
        metadata.title.as_str()
    };
    let issue = metadata
        .issue_number
        .map(|n| n.to_string())
        .unwrap_or_else(|| "N/A".to_string());
    let big_story = if sections.big_story.title.is_empty() {
        "Not set"
    } else {
        sections.big_story.title.as_str()
    };

    let mut text = format!(
        "{rule}\n{title}\nIssue #{issue} | {date}\n{rule}\n\n\
         CONTENT SUMMARY:\n\
         - Papers: {papers}\n\
         - GitHub Repos: {repos}\n\
         - Products: {products}\n\
         - Posts: {posts}\n\n\
         BIG STORY:\n{big_story}\n\n\
         TOP PAPERS:\n",
        date = metadata.date,
        papers = sections.top_papers.len(),
        repos = sections.repositories.len(),
        products = sections.products.len(),
        posts = sections.posts.len(),
    );

    for (i, paper) in sections.top_papers.iter().take(PREVIEW_PAPERS).enumerate() {
        let paper_title = if paper.title().is_empty() {
            "Untitled"
        } else {
            paper.title()
        };
        text.push_str(&format!("{}. {}\n", i + 1, paper_title));
    }
    text.push_str(&rule);
    text.push('\n');

    Preview {
        word_count: text.split_whitespace().count(),
        preview: text,
    }
}

/// One named section of raw content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentSection {
    pub name: String,
    pub content: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizedMetadata {
    /// Entries across every list-valued section
    pub total_items: usize,
    pub sections_count: usize,
}

/// Raw content arranged in priority order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrganizedContent {
    pub sections: Vec<ContentSection>,
    pub metadata: OrganizedMetadata,
}

/// Arrange `raw_content` into sections following `priorities`.
///
/// Names missing from `raw_content` are skipped, as are keys not named in
/// `priorities`. A name listed twice is placed once, at its first position.
pub fn organize_sections<S: AsRef<str>>(
    raw_content: &Map<String, Value>,
    priorities: &[S],
) -> OrganizedContent {
    let mut seen = HashSet::new();
    let mut organized = OrganizedContent::default();

    for name in priorities.iter().map(AsRef::as_ref) {
        let Some(content) = raw_content.get(name) else {
            continue;
        };
        if !seen.insert(name) {
            continue;
        }
        if let Value::Array(entries) = content {
            organized.metadata.total_items += entries.len();
        }
        organized.sections.push(ContentSection {
            name: name.to_string(),
            content: content.clone(),
        });
    }
    organized.metadata.sections_count = organized.sections.len();

    tracing::info!(
        sections = organized.metadata.sections_count,
        items = organized.metadata.total_items,
        "Organized content into sections"
    );
    organized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::mock::{make_paper, make_post, make_product, make_repository};

    fn research_data() -> BTreeMap<String, Vec<Item>> {
        let mut data = BTreeMap::new();
        data.insert("papers".to_string(), (0..8).map(make_paper).collect());
        data.insert("repositories".to_string(), (0..2).map(make_repository).collect());
        data.insert("products".to_string(), (0..6).map(make_product).collect());
        data.insert("tweets".to_string(), (0..10).map(make_post).collect());
        data
    }

    fn section_names(organized: &OrganizedContent) -> Vec<&str> {
        organized.sections.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_organize_default_priorities() {
        let raw = serde_json::json!({
            "tweets": [1, 2],
            "repositories": [1, 2, 3],
            "papers": [1, 2, 3, 4],
            "big_story": {"title": "Lead"},
            "unlisted": [1]
        });
        let organized = organize_sections(raw.as_object().unwrap(), &DEFAULT_PRIORITIES);

        assert_eq!(
            section_names(&organized),
            vec!["big_story", "papers", "repositories", "tweets"]
        );
        assert_eq!(organized.metadata.sections_count, 4);
        // big_story is not a list
        assert_eq!(organized.metadata.total_items, 9);
        assert_eq!(organized.sections[0].content["title"], "Lead");
    }

    #[test]
    fn test_organize_custom_priorities() {
        let raw = serde_json::json!({"papers": [1], "products": [1, 2]});
        let priorities = vec!["products", "missing", "papers", "products"];
        let organized = organize_sections(raw.as_object().unwrap(), &priorities);

        assert_eq!(section_names(&organized), vec!["products", "papers"]);
        assert_eq!(organized.metadata.total_items, 3);
    }

    fn at() -> DateTime<Utc> {
        "2024-01-15T09:30:00Z".parse().unwrap()
    }

    #[test]
    fn test_create_draft_caps_sections() {
        let draft = create_draft_at(&research_data(), 4, "AI Research Digest", at());

        assert_eq!(draft.metadata.issue_number, Some(4));
        assert_eq!(draft.metadata.title, "AI Research Digest #4");
        assert_eq!(draft.metadata.date, "January 15, 2024");
        assert_eq!(draft.status, "draft");
        assert_eq!(draft.sections.top_papers.len(), 5);
        assert_eq!(draft.sections.repositories.len(), 2);
        assert_eq!(draft.sections.products.len(), 3);
        assert_eq!(draft.sections.posts.len(), 3);
        assert_eq!(draft.sections.top_papers[0].title(), "Paper 0");
        assert!(draft.sections.big_story.title.is_empty());
    }

    #[test]
    fn test_draft_from_empty_data() {
        let draft = create_draft_at(&BTreeMap::new(), 1, "Digest", at());
        assert!(draft.sections.top_papers.is_empty());
        assert!(draft.sections.posts.is_empty());
        assert_eq!(draft.sections.populated(), 0);
    }

    #[test]
    fn test_validate_fresh_draft() {
        let draft = create_draft_at(&research_data(), 4, "Digest", at());
        let report = validate(&draft);

        assert_eq!(report.status, ValidationStatus::Warning);
        assert!(!report.valid);
        assert_eq!(
            report.issues,
            vec!["Big story content is missing", "Big story title is missing"]
        );
        // two repositories only
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("GitHub repos"));
        assert_eq!(report.sections_count, 4);
    }

    #[test]
    fn test_validate_complete_draft() {
        let mut draft = create_draft_at(&research_data(), 4, "Digest", at());
        draft.sections.big_story = BigStory {
            title: "Open weights catch up".to_string(),
            content: "A long story.".to_string(),
            source: "https://example.com".to_string(),
        };
        draft.sections.repositories = (0..3).map(make_repository).collect();

        let report = validate(&draft);
        assert_eq!(report.status, ValidationStatus::Success);
        assert!(report.valid);
        assert!(report.issues.is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_validate_missing_issue_number() {
        let report = validate(&Digest::default());
        assert!(report
            .issues
            .contains(&"Issue number is missing".to_string()));
        assert_eq!(report.warnings.len(), 2);
    }

    #[test]
    fn test_preview() {
        let draft = create_draft_at(&research_data(), 2, "AI Research Digest", at());
        let preview = preview(&draft);

        assert!(preview.preview.contains("AI Research Digest #2"));
        assert!(preview.preview.contains("Issue #2 | January 15, 2024"));
        assert!(preview.preview.contains("- Papers: 5"));
        assert!(preview.preview.contains("BIG STORY:\nNot set"));
        assert!(preview.preview.contains("1. Paper 0\n2. Paper 1\n3. Paper 2\n"));
        assert!(!preview.preview.contains("Paper 3"));
        assert_eq!(preview.word_count, preview.preview.split_whitespace().count());
    }

    #[test]
    fn test_partial_draft_deserializes() {
        let draft: Digest = serde_json::from_value(serde_json::json!({
            "metadata": {"issue_number": 3},
            "sections": {"big_story": {"title": "T", "content": "C"}}
        }))
        .unwrap();

        let report = validate(&draft);
        assert!(report.valid);
        assert_eq!(preview(&draft).preview.lines().nth(1), Some("Digest Preview"));
    }
}
