use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::decision::decision_model::ExplorationAction;
use crate::hierarchy::element_model::Element;
use crate::hierarchy::hierarchy_model::CompressedHierarchy;
use crate::hierarchy::semantics::ScreenCategory;

// ============================================================================
// Navigation graph data model
// ============================================================================

/// A screen discovered during exploration, keyed by its fingerprint.
///
/// Created on first discovery; rediscovery only bumps `visit_count` — the
/// captured elements and screenshot stay as seen the first time.
#[derive(Debug, Clone)]
pub struct ScreenNode {
    pub fingerprint: String,
    pub category: Option<ScreenCategory>,
    pub elements: Vec<Element>,
    pub screenshot: Vec<u8>,

    /// Hops from the start screen at first discovery.
    pub depth: usize,

    /// Fingerprint of the screen this one was first reached from.
    pub parent: Option<String>,

    pub visit_count: u32,
}

impl ScreenNode {
    pub fn from_hierarchy(
        hierarchy: &CompressedHierarchy,
        depth: usize,
        parent: Option<String>,
    ) -> Self {
        ScreenNode {
            fingerprint: hierarchy.fingerprint().to_string(),
            category: hierarchy.category,
            elements: hierarchy.elements.clone(),
            screenshot: hierarchy.screenshot.clone(),
            depth,
            parent,
            visit_count: 1,
        }
    }
}

/// A directed edge: one executed action and its observed outcome.
/// Append-only; parallel edges between the same screens are expected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenTransition {
    pub from: String,
    pub to: String,
    pub action: ExplorationAction,
    pub duration: Duration,
    pub timestamp_ms: u128,
    pub success: bool,
}

impl ScreenTransition {
    pub fn new(
        from: &str,
        to: &str,
        action: ExplorationAction,
        duration: Duration,
        success: bool,
    ) -> Self {
        ScreenTransition {
            from: from.to_string(),
            to: to.to_string(),
            action,
            duration,
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis(),
            success,
        }
    }
}

/// Graph completeness report. Coverage is measured against discovered
/// screens — ground-truth application size is unknowable from outside.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageStats {
    pub total_screens: usize,
    pub explored_screens: usize,
    pub coverage_percentage: f64,
    pub total_edges: usize,
    pub average_depth: f64,
}
