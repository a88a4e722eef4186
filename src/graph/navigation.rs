use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;

use crate::decision::decision_model::ExplorationAction;
use crate::graph::graph_model::{CoverageStats, ScreenNode, ScreenTransition};

// ============================================================================
// NavigationGraph — directed multigraph of screens keyed by fingerprint
// ============================================================================

/// Owns screen deduplication, cycle detection, shortest paths, and coverage.
/// Nodes are never removed or replaced; edges are append-only.
#[derive(Debug, Clone, Default)]
pub struct NavigationGraph {
    nodes: HashMap<String, ScreenNode>,
    edges: Vec<ScreenTransition>,
    start: Option<String>,
    current: Option<String>,
}

impl NavigationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, or bump the visit count of an already-known one.
    ///
    /// Returns true when the fingerprint was unseen. The very first node
    /// ever added becomes the start node, permanently. Either way the node
    /// becomes the current node.
    pub fn add_node(&mut self, node: ScreenNode) -> bool {
        let fingerprint = node.fingerprint.clone();
        let is_new = match self.nodes.get_mut(&fingerprint) {
            Some(existing) => {
                existing.visit_count += 1;
                false
            }
            None => {
                if self.start.is_none() {
                    self.start = Some(fingerprint.clone());
                }
                self.nodes.insert(fingerprint.clone(), node);
                true
            }
        };
        self.current = Some(fingerprint);
        is_new
    }

    /// Append a transition edge and move `current` to its destination.
    pub fn add_transition(
        &mut self,
        from: &str,
        to: &str,
        action: ExplorationAction,
        duration: Duration,
        success: bool,
    ) {
        self.edges
            .push(ScreenTransition::new(from, to, action, duration, success));
        self.current = Some(to.to_string());
    }

    pub fn node(&self, fingerprint: &str) -> Option<&ScreenNode> {
        self.nodes.get(fingerprint)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &ScreenNode> {
        self.nodes.values()
    }

    pub fn edges(&self) -> &[ScreenTransition] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn start_node(&self) -> Option<&str> {
        self.start.as_deref()
    }

    pub fn current_node(&self) -> Option<&str> {
        self.current.as_deref()
    }

    fn neighbors(&self, from: &str) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for edge in &self.edges {
            if edge.from == from && seen.insert(edge.to.as_str()) {
                out.push(edge.to.as_str());
            }
        }
        out
    }

    // ------------------------------------------------------------------
    // Cycle detection
    // ------------------------------------------------------------------

    /// Enumerate elementary cycles of length >= 2 as fingerprint lists.
    /// Returns empty for any DAG.
    ///
    /// Each cycle is reported once, rooted at its lexicographically
    /// smallest fingerprint; the DFS only walks nodes >= the current root,
    /// the standard dedup trick for elementary-cycle enumeration.
    pub fn find_cycles(&self) -> Vec<Vec<String>> {
        let mut keys: Vec<&String> = self.nodes.keys().collect();
        keys.sort();

        let mut cycles = Vec::new();
        for (root_index, root) in keys.iter().enumerate() {
            let allowed: HashSet<&str> = keys[root_index..].iter().map(|k| k.as_str()).collect();
            let mut path = vec![root.as_str()];
            let mut on_path: HashSet<&str> = path.iter().copied().collect();
            self.cycle_dfs(root, root, &allowed, &mut path, &mut on_path, &mut cycles);
        }
        cycles
    }

    fn cycle_dfs<'a>(
        &'a self,
        root: &str,
        from: &'a str,
        allowed: &HashSet<&'a str>,
        path: &mut Vec<&'a str>,
        on_path: &mut HashSet<&'a str>,
        cycles: &mut Vec<Vec<String>>,
    ) {
        for next in self.neighbors(from) {
            if next == root {
                if path.len() >= 2 {
                    cycles.push(path.iter().map(|s| s.to_string()).collect());
                }
                continue;
            }
            if !allowed.contains(next) || on_path.contains(next) {
                continue;
            }
            path.push(next);
            on_path.insert(next);
            self.cycle_dfs(root, next, allowed, path, on_path, cycles);
            on_path.remove(next);
            path.pop();
        }
    }

    /// True iff `to` is already reachable from `from` (including
    /// `to == from`) — adding `from -> to` would close a back-edge.
    pub fn would_create_cycle(&self, from: &str, to: &str) -> bool {
        if from == to {
            return true;
        }
        let mut queue: VecDeque<&str> = VecDeque::new();
        let mut visited: HashSet<&str> = HashSet::new();
        queue.push_back(from);
        visited.insert(from);
        while let Some(node) = queue.pop_front() {
            for next in self.neighbors(node) {
                if next == to {
                    return true;
                }
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        false
    }

    // ------------------------------------------------------------------
    // Shortest path
    // ------------------------------------------------------------------

    /// Dijkstra weighted by edge duration, not hop count. Parallel edges
    /// compete individually; equal-cost ties go to the earlier-inserted
    /// edge. Returns the action sequence, or None when unreachable.
    pub fn shortest_path(&self, from: &str, to: &str) -> Option<Vec<ExplorationAction>> {
        if !self.nodes.contains_key(from) || !self.nodes.contains_key(to) {
            return None;
        }
        if from == to {
            return Some(Vec::new());
        }

        let mut dist: HashMap<&str, f64> = HashMap::new();
        let mut via_edge: HashMap<&str, usize> = HashMap::new();
        let mut settled: HashSet<&str> = HashSet::new();
        dist.insert(from, 0.0);

        loop {
            // Linear min-scan keeps f64 weights out of an Ord heap and makes
            // tie-breaking deterministic.
            let next = dist
                .iter()
                .filter(|(node, _)| !settled.contains(*node))
                .min_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
                .map(|(node, d)| (*node, *d));

            let Some((node, node_dist)) = next else {
                return None;
            };
            if node == to {
                break;
            }
            settled.insert(node);

            for (edge_index, edge) in self.edges.iter().enumerate() {
                if edge.from != node {
                    continue;
                }
                let candidate = node_dist + edge.duration.as_secs_f64();
                let better = match dist.get(edge.to.as_str()) {
                    Some(existing) => candidate < *existing,
                    None => true,
                };
                if better {
                    dist.insert(edge.to.as_str(), candidate);
                    via_edge.insert(edge.to.as_str(), edge_index);
                }
            }
        }

        // Walk predecessors back from the destination.
        let mut actions = Vec::new();
        let mut cursor = to;
        while cursor != from {
            let edge_index = *via_edge.get(cursor)?;
            let edge = &self.edges[edge_index];
            actions.push(edge.action.clone());
            cursor = edge.from.as_str();
        }
        actions.reverse();
        Some(actions)
    }

    // ------------------------------------------------------------------
    // Coverage
    // ------------------------------------------------------------------

    pub fn coverage_stats(&self) -> CoverageStats {
        let total_screens = self.nodes.len();
        let explored_screens = self.nodes.values().filter(|n| n.visit_count > 0).count();
        let coverage_percentage = if total_screens == 0 {
            0.0
        } else {
            100.0 * explored_screens as f64 / total_screens as f64
        };
        let average_depth = if total_screens == 0 {
            0.0
        } else {
            self.nodes.values().map(|n| n.depth as f64).sum::<f64>() / total_screens as f64
        };

        CoverageStats {
            total_screens,
            explored_screens,
            coverage_percentage,
            total_edges: self.edges.len(),
            average_depth,
        }
    }
}
