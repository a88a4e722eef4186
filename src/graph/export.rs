use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::graph::graph_model::{ScreenNode, ScreenTransition};
use crate::graph::navigation::NavigationGraph;
use crate::hierarchy::element_model::Element;
use crate::hierarchy::fingerprint::{fingerprint, short};
use crate::hierarchy::semantics::ScreenCategory;

// ============================================================================
// Human-readable diagram
// ============================================================================

/// Render the graph as an indented text diagram: one line per screen
/// (category, short fingerprint, depth, visits), then its outgoing edges
/// labeled by action and destination.
pub fn to_diagram(graph: &NavigationGraph) -> String {
    let mut out = String::new();
    out.push_str("=== Navigation Map ===\n");

    let mut nodes: Vec<&ScreenNode> = graph.nodes().collect();
    nodes.sort_by_key(|n| (n.depth, n.fingerprint.clone()));

    for node in nodes {
        let marker = if graph.start_node() == Some(node.fingerprint.as_str()) {
            "*"
        } else {
            " "
        };
        out.push_str(&format!(
            "{} [{}] {:?} (depth={}, visits={})\n",
            marker,
            short(&node.fingerprint),
            node.category.unwrap_or(ScreenCategory::Other),
            node.depth,
            node.visit_count
        ));

        for edge in graph.edges().iter().filter(|e| e.from == node.fingerprint) {
            let status = if edge.success { "" } else { " [failed]" };
            out.push_str(&format!(
                "    --{}--> [{}]{}\n",
                edge.action.describe(),
                short(&edge.to),
                status
            ));
        }
    }

    out
}

// ============================================================================
// Machine-readable snapshot
// ============================================================================

/// Persisted form of the graph. Derived, not authoritative: stored
/// fingerprints are hints only — loading recomputes every fingerprint from
/// element content and remaps edges accordingly, so stale or tampered
/// snapshots cannot smuggle a wrong identity back in.
///
/// Screenshot bytes are not persisted; fingerprints ignore them and
/// resumption does not need them.
#[derive(Debug, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub version: u32,
    pub start: Option<String>,
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<ScreenTransition>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NodeRecord {
    pub fingerprint: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub category: Option<ScreenCategory>,
    pub elements: Vec<Element>,
    pub depth: usize,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub parent: Option<String>,
    pub visit_count: u32,
}

pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

impl GraphSnapshot {
    pub fn from_graph(graph: &NavigationGraph) -> Self {
        let mut nodes: Vec<NodeRecord> = graph
            .nodes()
            .map(|n| NodeRecord {
                fingerprint: n.fingerprint.clone(),
                category: n.category,
                elements: n.elements.clone(),
                depth: n.depth,
                parent: n.parent.clone(),
                visit_count: n.visit_count,
            })
            .collect();
        nodes.sort_by(|a, b| a.fingerprint.cmp(&b.fingerprint));

        GraphSnapshot {
            version: SNAPSHOT_FORMAT_VERSION,
            start: graph.start_node().map(str::to_string),
            nodes,
            edges: graph.edges().to_vec(),
        }
    }

    /// Rebuild an in-memory graph, recomputing node identities.
    pub fn into_graph(self) -> NavigationGraph {
        // Stored fingerprint -> recomputed fingerprint.
        let mut remap: HashMap<String, String> = HashMap::new();
        let mut records = Vec::new();
        for record in self.nodes {
            let recomputed = fingerprint(&record.elements);
            remap.insert(record.fingerprint.clone(), recomputed.clone());
            records.push((recomputed, record));
        }
        let remapped = |fp: &str| remap.get(fp).cloned().unwrap_or_else(|| fp.to_string());

        let mut graph = NavigationGraph::new();

        // Insert the start node first so add_node pins it as the start.
        if let Some(start) = &self.start {
            let start = remapped(start);
            records.sort_by_key(|(fp, _)| (*fp != start, fp.clone()));
        }

        for (recomputed, record) in records {
            let visit_count = record.visit_count;
            let node = ScreenNode {
                fingerprint: recomputed,
                category: record.category,
                elements: record.elements,
                screenshot: Vec::new(),
                depth: record.depth,
                parent: record.parent.as_deref().map(&remapped),
                visit_count,
            };
            graph.add_node(node);
        }

        for edge in self.edges {
            graph.add_transition(
                &remapped(&edge.from),
                &remapped(&edge.to),
                edge.action,
                edge.duration,
                edge.success,
            );
        }

        graph
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
