//! Release-note extraction.
//!
//! Pulls breaking changes, new features, and connector-scoped items out of a
//! single release-note HTML page. Extraction is heuristic: it looks for
//! headings by text and walks forward through the document collecting
//! bullet items until the next section boundary.
//!
//! # Section walk
//!
//! Starting after a matched heading, block elements (`h1`–`h6`, `p`, `ul`)
//! are visited in document order:
//!
//! - a `ul` contributes the text of each direct `li` child; anything nested
//!   inside a collected list is not visited again,
//! - a `p` contributes its text only for breaking-change sections, and only
//!   when it does not start with `note:` or `warning:`,
//! - a heading ends the walk when it is at the same or a higher level than
//!   the starting heading and has non-empty text. Deeper or empty headings
//!   are stepped over.
//!
//! Connector sections (any heading containing "connector") are always filed
//! under new features, annotated with the connector name taken from the
//! heading.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::models::{VersionChanges, VersionItemGroup};

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("document contains no markup")]
    NotMarkup,

    #[error("invalid selector: {0}")]
    Selector(String),

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Compiled selectors and heading patterns.
///
/// Build once per comparison and reuse it for every version.
pub struct Extractor {
    blocks: Selector,
    breaking: Regex,
    features: Regex,
    connector: Regex,
    admonition: Regex,
}

impl Extractor {
    pub fn new() -> Result<Self, ExtractError> {
        let blocks = Selector::parse("h1, h2, h3, h4, h5, h6, p, ul")
            .map_err(|e| ExtractError::Selector(e.to_string()))?;

        Ok(Self {
            blocks,
            breaking: Regex::new(r"(?i)breaking changes")?,
            features: Regex::new(r"(?i)new features|feature changes")?,
            connector: Regex::new(r"(?i)connector")?,
            admonition: Regex::new(r"(?i)^(note|warning):")?,
        })
    }

    /// Extracts every matched section from one release-note document.
    ///
    /// A document with no matching headings yields empty change lists.
    pub fn extract(&self, version: &str, html: &str) -> Result<VersionChanges, ExtractError> {
        if !html.contains('<') {
            return Err(ExtractError::NotMarkup);
        }

        let document = Html::parse_document(html);
        let blocks: Vec<ElementRef<'_>> = document.select(&self.blocks).collect();
        let mut changes = VersionChanges {
            version: version.to_string(),
            ..Default::default()
        };

        if let Some(start) = self.find_heading(&blocks, &self.breaking) {
            let items = collect_section(&blocks, start, Some(&self.admonition));
            if !items.is_empty() {
                changes
                    .breaking_changes
                    .push(VersionItemGroup::new(version, items));
            }
        }

        if let Some(start) = self.find_heading(&blocks, &self.features) {
            let items = collect_section(&blocks, start, None);
            if !items.is_empty() {
                changes.new_features.push(VersionItemGroup::new(version, items));
            }
        }

        for (start, block) in blocks.iter().enumerate() {
            if heading_level(block).is_none() {
                continue;
            }
            let title = heading_text(block);
            if !self.connector.is_match(&title) {
                continue;
            }
            let items = collect_section(&blocks, start, None);
            if items.is_empty() {
                continue;
            }
            let name = self.connector.replace_all(&title, "").trim().to_string();
            let group = if name.is_empty() {
                VersionItemGroup::new(version, items)
            } else {
                VersionItemGroup::for_connector(version, name, items)
            };
            changes.new_features.push(group);
        }

        Ok(changes)
    }

    fn find_heading(&self, blocks: &[ElementRef<'_>], pattern: &Regex) -> Option<usize> {
        blocks.iter().position(|block| {
            heading_level(block).is_some() && pattern.is_match(&heading_text(block))
        })
    }
}

/// Convenience wrapper that compiles a fresh [`Extractor`].
pub fn extract_changes(version: &str, html: &str) -> Result<VersionChanges, ExtractError> {
    Extractor::new()?.extract(version, html)
}

fn collect_section(
    blocks: &[ElementRef<'_>],
    start: usize,
    paragraphs: Option<&Regex>,
) -> Vec<String> {
    let level = heading_level(&blocks[start]).unwrap_or(6);
    let mut items = Vec::new();
    let mut lists: Vec<ElementRef<'_>> = Vec::new();

    for block in &blocks[start + 1..] {
        if let Some(next_level) = heading_level(block) {
            if next_level <= level && !heading_text(block).is_empty() {
                break;
            }
            continue;
        }

        if lists.iter().any(|list| is_inside(block, list)) {
            continue;
        }

        match block.value().name() {
            "ul" => {
                items.extend(
                    block
                        .children()
                        .filter_map(ElementRef::wrap)
                        .filter(|child| child.value().name() == "li")
                        .map(|li| element_text(&li))
                        .filter(|text| !text.is_empty()),
                );
                lists.push(*block);
            }
            "p" => {
                if let Some(admonition) = paragraphs {
                    let text = element_text(block);
                    if !text.is_empty() && !admonition.is_match(&text) {
                        items.push(text);
                    }
                }
            }
            _ => {}
        }
    }

    items
}

fn heading_level(element: &ElementRef<'_>) -> Option<u8> {
    match element.value().name() {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

fn is_inside(element: &ElementRef<'_>, container: &ElementRef<'_>) -> bool {
    element.ancestors().any(|node| node.id() == container.id())
}

/// Text content with runs of whitespace collapsed to single spaces.
fn element_text(element: &ElementRef<'_>) -> String {
    let raw: String = element.text().collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Heading text without Sphinx permalink glyphs.
fn heading_text(element: &ElementRef<'_>) -> String {
    element_text(element).replace('¶', "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(html: &str) -> VersionChanges {
        extract_changes("402", html).unwrap()
    }

    #[test]
    fn test_breaking_changes_bullets_and_paragraphs() {
        let html = r#"
            <h2>Breaking changes</h2>
            <p>Upgrade carefully.</p>
            <p>Note: this is informational.</p>
            <p>WARNING: also informational.</p>
            <ul><li>Removed the Accumulo connector</li><li>Dropped <code>foo</code> property</li></ul>
            <h2>General</h2>
            <ul><li>Unrelated</li></ul>
        "#;
        let changes = extract(html);
        assert_eq!(changes.breaking_changes.len(), 1);
        assert_eq!(
            changes.breaking_changes[0].items,
            vec![
                "Upgrade carefully.",
                "Removed the Accumulo connector",
                "Dropped foo property"
            ]
        );
        assert!(changes.new_features.is_empty());
    }

    #[test]
    fn test_missing_heading_is_empty() {
        let html = "<h1>Release 403</h1><h2>General</h2><ul><li>Something</li></ul>";
        let changes = extract(html);
        assert!(changes.is_empty());
        assert_eq!(changes.version, "402");
    }

    #[test]
    fn test_features_skip_paragraphs() {
        let html = r#"
            <h2>New features</h2>
            <p>Intro text</p>
            <ul><li>Add A</li></ul>
            <ul><li>Add B</li></ul>
            <h2>Other</h2>
        "#;
        let changes = extract(html);
        assert_eq!(changes.new_features.len(), 1);
        assert_eq!(changes.new_features[0].items, vec!["Add A", "Add B"]);
        assert_eq!(changes.new_features[0].connector, None);
    }

    #[test]
    fn test_feature_changes_heading_variant() {
        let html = "<h3>Feature Changes</h3><ul><li>Add C</li></ul>";
        let changes = extract(html);
        assert_eq!(changes.new_features[0].items, vec!["Add C"]);
    }

    #[test]
    fn test_empty_heading_is_not_a_boundary() {
        let html = r#"
            <h2>Breaking changes</h2>
            <ul><li>One</li></ul>
            <h2> </h2>
            <ul><li>Two</li></ul>
            <h2>Next</h2>
            <ul><li>Three</li></ul>
        "#;
        let changes = extract(html);
        assert_eq!(changes.breaking_changes[0].items, vec!["One", "Two"]);
    }

    #[test]
    fn test_deeper_heading_is_not_a_boundary() {
        let html = r#"
            <h2>Breaking changes</h2>
            <ul><li>One</li></ul>
            <h3>Details</h3>
            <ul><li>Two</li></ul>
            <h1>Top</h1>
            <ul><li>Three</li></ul>
        "#;
        let changes = extract(html);
        assert_eq!(changes.breaking_changes[0].items, vec!["One", "Two"]);
    }

    #[test]
    fn test_nested_lists_not_duplicated() {
        let html = r#"
            <h2>Breaking changes</h2>
            <ul>
              <li>Outer <ul><li>inner</li></ul></li>
              <li>Second</li>
            </ul>
            <h2>End</h2>
        "#;
        let changes = extract(html);
        assert_eq!(changes.breaking_changes[0].items, vec!["Outer inner", "Second"]);
    }

    #[test]
    fn test_connector_sections() {
        let html = r#"
            <section><h2>General</h2><ul><li>Faster</li></ul></section>
            <section><h2>BigQuery connector¶</h2><ul><li>Support views</li></ul></section>
            <section><h2>Hive Connector</h2><ul><li>Fix stats</li><li>Add caching</li></ul></section>
            <section><h2>Kafka connector</h2><p>No changes.</p></section>
        "#;
        let changes = extract(html);
        assert!(changes.breaking_changes.is_empty());
        assert_eq!(changes.new_features.len(), 2);
        assert_eq!(changes.new_features[0].connector.as_deref(), Some("BigQuery"));
        assert_eq!(changes.new_features[0].items, vec!["Support views"]);
        assert_eq!(changes.new_features[1].connector.as_deref(), Some("Hive"));
        assert_eq!(changes.new_features[1].items, vec!["Fix stats", "Add caching"]);
    }

    #[test]
    fn test_not_markup_is_error() {
        assert!(matches!(
            extract_changes("402", "   "),
            Err(ExtractError::NotMarkup)
        ));
        assert!(matches!(
            extract_changes("402", "plain text only"),
            Err(ExtractError::NotMarkup)
        ));
    }

    #[test]
    fn test_malformed_markup_is_best_effort() {
        let html = "<h2>Breaking changes<ul><li>Unclosed item";
        let changes = extract(html);
        assert!(changes.new_features.is_empty());
    }
}
