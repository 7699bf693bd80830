//! Text transformation
//!
//! Rewrites qualifying text leaves into processed regions whose word
//! heads are wrapped in bold spans, and turns processed regions back into
//! plain text.

mod bolding;
mod walker;

pub use bolding::{bold_length, letters_for_word, segment, Segment, MAX_BOLD};
pub use walker::{collect_candidates, is_editable, SkipRules, OPAQUE_TAGS};

use crate::config::TransformConfig;
use crate::dom::{Document, NodeId};
use crate::error::Result;
use tracing::{debug, instrument};

/// Summary of one transformation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Leaves that qualified
    pub candidates: usize,
    /// Leaves replaced by a processed region
    pub transformed: usize,
    /// Whether the style element had to be inserted
    pub style_inserted: bool,
}

/// Applies and reverses the bolding transformation on a [`Document`]
#[derive(Debug, Clone, Default)]
pub struct Transformer {
    config: TransformConfig,
}

impl Transformer {
    /// Create a transformer with the given markup settings
    pub fn new(config: TransformConfig) -> Self {
        Self { config }
    }

    /// Markup settings
    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    fn skip_rules(&self) -> SkipRules<'_> {
        SkipRules {
            processed_class: &self.config.processed_class,
            extra_tags: &self.config.extra_skip_tags,
        }
    }

    /// Node the traversal starts from: `<body>`, else the document element
    pub fn content_root(doc: &Document) -> Option<NodeId> {
        doc.body().or_else(|| doc.document_element())
    }

    /// The CSS rule making bold heads bold
    pub fn style_rule(&self) -> String {
        format!(".{}{{font-weight:bold;}}", self.config.bold_class)
    }

    /// Insert the global style element unless it already exists
    ///
    /// Returns whether an element was inserted. Documents with neither a
    /// head nor a document element are left alone.
    pub fn ensure_style(&self, doc: &mut Document) -> Result<bool> {
        if doc.get_element_by_id(&self.config.style_id).is_some() {
            return Ok(false);
        }
        let Some(parent) = doc.head().or_else(|| doc.document_element()) else {
            return Ok(false);
        };

        let style = doc.create_element("style");
        doc.set_attribute(style, "id", &self.config.style_id)?;
        let rule = doc.create_text(self.style_rule());
        doc.append_detached(style, rule)?;
        doc.append_child(parent, style)?;
        Ok(true)
    }

    /// Build a processed region for `text` (detached)
    pub fn build_region(&self, doc: &mut Document, text: &str) -> Result<NodeId> {
        let region = doc.create_element_with_class("span", &self.config.processed_class);
        for piece in segment(text) {
            match piece {
                Segment::Gap(gap) => {
                    let node = doc.create_text(gap);
                    doc.append_detached(region, node)?;
                }
                Segment::Word { head, tail } => {
                    let bold = doc.create_element_with_class("span", &self.config.bold_class);
                    let head = doc.create_text(head);
                    doc.append_detached(bold, head)?;
                    doc.append_detached(region, bold)?;
                    if !tail.is_empty() {
                        let tail = doc.create_text(tail);
                        doc.append_detached(region, tail)?;
                    }
                }
            }
        }
        Ok(region)
    }

    /// Replace one text leaf with its processed region
    ///
    /// Returns false when the leaf is gone or no longer qualifies.
    pub fn transform_leaf(&self, doc: &mut Document, leaf: NodeId) -> Result<bool> {
        let Some(text) = doc.text(leaf).map(str::to_string) else {
            return Ok(false);
        };
        if text.trim().is_empty() || !doc.is_attached(leaf) {
            return Ok(false);
        }
        if doc.closest_with_class(leaf, &self.config.processed_class).is_some() {
            return Ok(false);
        }

        let region = self.build_region(doc, &text)?;
        doc.replace(leaf, region)?;
        doc.release(leaf);
        Ok(true)
    }

    /// Run one full pass over the document
    #[instrument(skip_all)]
    pub fn apply(&self, doc: &mut Document) -> Result<PassReport> {
        let mut report = PassReport {
            style_inserted: self.ensure_style(doc)?,
            ..PassReport::default()
        };
        let Some(root) = Self::content_root(doc) else {
            debug!("Document has no content root");
            return Ok(report);
        };

        let candidates = collect_candidates(doc, root, &self.skip_rules());
        report.candidates = candidates.len();

        for leaf in candidates {
            if self.transform_leaf(doc, leaf)? {
                report.transformed += 1;
            }
        }

        debug!(
            candidates = report.candidates,
            transformed = report.transformed,
            "Pass complete"
        );
        Ok(report)
    }

    /// Replace every processed region with a single text leaf
    ///
    /// Returns the number of regions reverted.
    #[instrument(skip_all)]
    pub fn revert(&self, doc: &mut Document) -> Result<usize> {
        let regions = doc.elements_with_class(&self.config.processed_class);
        let mut reverted = 0;
        for region in regions {
            let text = doc.text_content(region);
            let leaf = doc.create_text(text);
            doc.replace(region, leaf)?;
            doc.release(region);
            reverted += 1;
        }
        debug!(reverted, "Reverted processed regions");
        Ok(reverted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transformer() -> Transformer {
        Transformer::default()
    }

    #[test]
    fn test_apply_marks_up_words() {
        let mut doc = Document::parse_html("<p>Hi, world!</p>");
        let report = transformer().apply(&mut doc).unwrap();
        assert_eq!(report.transformed, 1);
        assert!(report.style_inserted);

        let body = doc.body().unwrap();
        assert_eq!(
            doc.inner_html(body),
            "<p><span class=\"hl-processed\"><span class=\"hl-bold\">H</span>i, <span class=\"hl-bold\">wo</span>rld!</span></p>"
        );
        assert_eq!(doc.text_content(body), "Hi, world!");
    }

    #[test]
    fn test_style_inserted_once() {
        let mut doc = Document::parse_html("<p>text</p>");
        let t = transformer();
        t.apply(&mut doc).unwrap();
        let second = t.apply(&mut doc).unwrap();
        assert!(!second.style_inserted);
        assert_eq!(second.transformed, 0);

        let head = doc.head().unwrap();
        assert_eq!(
            doc.inner_html(head),
            "<style id=\"hl-first-letters-style\">.hl-bold{font-weight:bold;}</style>"
        );
    }

    #[test]
    fn test_style_present_before_first_region() {
        let mut doc = Document::parse_html("<p>one two</p>");
        doc.observe();
        let report = transformer().apply(&mut doc).unwrap();
        assert!(report.style_inserted);

        let records = doc.take_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].target, doc.head().unwrap());
        assert_eq!(doc.tag(records[1].target), Some("p"));
    }

    #[test]
    fn test_style_without_head_goes_to_document_element() {
        let mut doc = Document::new();
        let root = doc.root();
        let html = doc.create_element("html");
        doc.append_child(root, html).unwrap();
        assert!(transformer().ensure_style(&mut doc).unwrap());
        assert_eq!(doc.children(html).len(), 1);
    }

    #[test]
    fn test_style_skipped_without_elements() {
        let mut doc = Document::new();
        assert!(!transformer().ensure_style(&mut doc).unwrap());
    }

    #[test]
    fn test_revert_restores_text() {
        let source = "<div><p>The quick brown fox</p><ul><li>jumps over</li></ul> the lazy dog.</div>";
        let mut doc = Document::parse_html(source);
        let body = doc.body().unwrap();
        let before = doc.inner_html(body);

        let t = transformer();
        let report = t.apply(&mut doc).unwrap();
        assert_eq!(report.transformed, 3);
        assert_ne!(doc.inner_html(body), before);

        assert_eq!(t.revert(&mut doc).unwrap(), 3);
        assert_eq!(doc.inner_html(body), before);
    }

    #[test]
    fn test_replaced_nodes_are_released() {
        let mut doc = Document::parse_html("<p>one two</p>");
        let t = transformer();
        t.ensure_style(&mut doc).unwrap();
        let live = doc.live_nodes();

        t.apply(&mut doc).unwrap();
        // region, two bold spans with their heads, two tails and a gap; minus the leaf
        assert_eq!(doc.live_nodes(), live + 8 - 1);

        t.revert(&mut doc).unwrap();
        assert_eq!(doc.live_nodes(), live);
    }

    #[test]
    fn test_transform_leaf_rejects_detached_and_processed() {
        let mut doc = Document::parse_html("<p>x</p>");
        let t = transformer();
        let loose = doc.create_text("loose");
        assert!(!t.transform_leaf(&mut doc, loose).unwrap());

        t.apply(&mut doc).unwrap();
        let region = doc.elements_with_class("hl-processed")[0];
        let inner = doc.descendants(region)
            .into_iter()
            .find(|&id| doc.text(id).is_some())
            .unwrap();
        assert!(!t.transform_leaf(&mut doc, inner).unwrap());
    }

    #[test]
    fn test_locked_document_fails_with_access_denied() {
        let mut doc = Document::parse_html("<p>text</p>");
        doc.set_locked(true);
        let err = transformer().apply(&mut doc).unwrap_err();
        assert!(err.is_access_denied());
    }

    #[test]
    fn test_custom_classes() {
        let config = TransformConfig {
            processed_class: "done".to_string(),
            bold_class: "b".to_string(),
            style_id: "s".to_string(),
            extra_skip_tags: vec![],
        };
        let t = Transformer::new(config);
        let mut doc = Document::parse_html("<p>ab</p>");
        t.apply(&mut doc).unwrap();
        let body = doc.body().unwrap();
        assert_eq!(
            doc.inner_html(body),
            "<p><span class=\"done\"><span class=\"b\">a</span>b</span></p>"
        );
        assert!(doc.get_element_by_id("s").is_some());
        assert_eq!(t.style_rule(), ".b{font-weight:bold;}");
    }
}
