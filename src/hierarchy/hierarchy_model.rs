use crate::hierarchy::element_model::{Element, find_in};
use crate::hierarchy::fingerprint::fingerprint;
use crate::hierarchy::semantics::ScreenCategory;

/// Bump when the compressed representation changes shape.
pub const HIERARCHY_FORMAT_VERSION: u32 = 1;

// ============================================================================
// CompressedHierarchy — an immutable screen snapshot with a computed identity
// ============================================================================

/// A bounded, prioritized snapshot of one screen: the surviving elements,
/// the screenshot taken alongside them, an optional detected category, and
/// the structural fingerprint.
///
/// The fingerprint is computed exactly once, at construction, from element
/// structure only. It is never accepted from wire data — anything loading a
/// persisted hierarchy goes back through `new()` and recomputes it.
#[derive(Debug, Clone)]
pub struct CompressedHierarchy {
    pub elements: Vec<Element>,
    pub screenshot: Vec<u8>,
    pub category: Option<ScreenCategory>,
    pub version: u32,
    fingerprint: String,
}

impl CompressedHierarchy {
    pub fn new(
        elements: Vec<Element>,
        screenshot: Vec<u8>,
        category: Option<ScreenCategory>,
    ) -> Self {
        let fingerprint = fingerprint(&elements);
        CompressedHierarchy {
            elements,
            screenshot,
            category,
            version: HIERARCHY_FORMAT_VERSION,
            fingerprint,
        }
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Total element count across the forest.
    pub fn element_count(&self) -> usize {
        self.elements.iter().map(Element::subtree_size).sum()
    }

    /// Look up an element by id or label, case-insensitively.
    pub fn find_element(&self, needle: &str) -> Option<&Element> {
        find_in(&self.elements, needle)
    }
}
