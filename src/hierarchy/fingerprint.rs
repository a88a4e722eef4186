use sha2::{Digest, Sha256};

use crate::hierarchy::element_model::{Element, walk};

// ============================================================================
// Screen fingerprinting — structural identity, stable across re-renders
// ============================================================================

const SIGNATURE_DELIMITER: &str = "|";

/// Build the structural signature of an element forest: the pre-order
/// concatenation of `type:id:label` per element.
///
/// Element values and screenshot bytes are deliberately excluded — a screen
/// keeps its identity while text fields fill in or animations run, but any
/// structural change (new element, renamed label, reordering) produces a
/// different signature.
pub fn structural_signature(elements: &[Element]) -> String {
    let mut parts: Vec<String> = Vec::new();
    walk(elements, &mut |el| {
        parts.push(format!(
            "{}:{}:{}",
            el.kind.as_str(),
            el.id.as_deref().unwrap_or(""),
            el.label.as_deref().unwrap_or("")
        ));
    });
    parts.join(SIGNATURE_DELIMITER)
}

/// SHA-256 hex digest of the structural signature.
pub fn fingerprint(elements: &[Element]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(structural_signature(elements).as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Short prefix for logs and diagrams.
pub fn short(fingerprint: &str) -> &str {
    &fingerprint[..fingerprint.len().min(8)]
}
