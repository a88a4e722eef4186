use crate::hierarchy::element_model::{Element, ElementType, SemanticIntent};
use crate::hierarchy::hierarchy_model::CompressedHierarchy;
use crate::hierarchy::semantics::{
    HeuristicCategorizer, HeuristicSemanticAnalyzer, ScreenCategorizer, SemanticAnalyzer,
};

// ============================================================================
// Priority scoring constants
// ============================================================================

const INTERACTIVE_BONUS: f32 = 10.0;
const ID_BONUS: f32 = 4.0;
const LABEL_BONUS: f32 = 3.0;

fn intent_bonus(intent: SemanticIntent) -> f32 {
    match intent {
        SemanticIntent::Submit => 5.0,
        SemanticIntent::Navigation => 4.0,
        SemanticIntent::Neutral => 2.0,
        SemanticIntent::Destructive => 1.0,
    }
}

fn type_bonus(kind: ElementType) -> f32 {
    match kind {
        ElementType::Input => 4.0,
        ElementType::Button | ElementType::Toggle | ElementType::Picker => 3.0,
        ElementType::Link | ElementType::Tab | ElementType::Slider => 2.0,
        ElementType::Image | ElementType::Text => 1.0,
        ElementType::Scrollable | ElementType::Container => 0.0,
    }
}

// ============================================================================
// Compressor configuration
// ============================================================================

#[derive(Debug, Clone)]
pub struct CompressorConfig {
    /// Maximum traversal depth below the root (0 keeps only the root).
    pub max_depth: usize,

    /// Maximum children kept per node (0 yields childless nodes).
    pub max_children: usize,

    /// Drop system input-method elements (on-screen keyboards etc.).
    pub exclude_system_input: bool,

    /// Run intent assignment and screen categorization.
    pub semantic_enrichment: bool,

    /// Target total element count after trimming.
    pub max_elements: usize,
}

impl Default for CompressorConfig {
    fn default() -> Self {
        Self {
            max_depth: 10,
            max_children: 20,
            exclude_system_input: true,
            semantic_enrichment: true,
            max_elements: 50,
        }
    }
}

// ============================================================================
// HierarchyCompressor
// ============================================================================

/// Reduces a raw, unbounded element tree into a `CompressedHierarchy`.
///
/// Strategies are constructor-injected with heuristic defaults; passing a
/// custom analyzer or categorizer replaces the default, an explicit `None`
/// for categorization never happens — absence of a category comes from the
/// categorizer itself declining.
pub struct HierarchyCompressor {
    config: CompressorConfig,
    analyzer: Box<dyn SemanticAnalyzer>,
    categorizer: Box<dyn ScreenCategorizer>,
}

impl HierarchyCompressor {
    pub fn new(config: CompressorConfig) -> Self {
        Self {
            config,
            analyzer: Box::new(HeuristicSemanticAnalyzer),
            categorizer: Box::new(HeuristicCategorizer),
        }
    }

    pub fn with_analyzer(mut self, analyzer: Box<dyn SemanticAnalyzer>) -> Self {
        self.analyzer = analyzer;
        self
    }

    pub fn with_categorizer(mut self, categorizer: Box<dyn ScreenCategorizer>) -> Self {
        self.categorizer = categorizer;
        self
    }

    pub fn config(&self) -> &CompressorConfig {
        &self.config
    }

    /// Compress a raw tree into a bounded snapshot.
    ///
    /// Selection order: depth/children caps and system-input exclusion while
    /// walking, noise pruning on the way back up, semantic enrichment and
    /// priority scoring, then trimming down to the element cap. Interactive
    /// elements are unconditionally retained.
    pub fn compress(&self, root: &Element, screenshot: Vec<u8>) -> CompressedHierarchy {
        let mut elements = match self.walk_element(root, 0) {
            Some(el) => vec![el],
            None => Vec::new(),
        };

        if self.config.semantic_enrichment {
            for el in &mut elements {
                self.enrich(el);
            }
        }
        for el in &mut elements {
            score(el);
        }

        trim_to_cap(&mut elements, self.config.max_elements);

        let category = if self.config.semantic_enrichment {
            self.categorizer.categorize(&elements)
        } else {
            None
        };

        CompressedHierarchy::new(elements, screenshot, category)
    }

    fn walk_element(&self, el: &Element, depth: usize) -> Option<Element> {
        if self.config.exclude_system_input && is_system_input(el) {
            return None;
        }

        let children = if depth < self.config.max_depth {
            el.children
                .iter()
                .take(self.config.max_children)
                .filter_map(|child| self.walk_element(child, depth + 1))
                .collect()
        } else {
            Vec::new()
        };

        let kept = Element {
            children,
            ..clone_shallow(el)
        };

        // Pure noise: nothing to interact with, no identity, no text, not an
        // image, and no surviving children worth keeping structure for.
        let noise = !kept.interactive
            && kept.id.is_none()
            && kept.label.is_none()
            && kept.kind != ElementType::Image
            && kept.children.is_empty();

        // The root survives even when bare, so depth 0 always yields a node.
        if noise && depth > 0 { None } else { Some(kept) }
    }

    fn enrich(&self, el: &mut Element) {
        if el.intent.is_none() {
            el.intent = self.analyzer.intent_of(el);
        }
        for child in &mut el.children {
            self.enrich(child);
        }
    }
}

fn clone_shallow(el: &Element) -> Element {
    Element {
        kind: el.kind,
        id: el.id.clone(),
        label: el.label.clone(),
        interactive: el.interactive,
        value: el.value.clone(),
        intent: el.intent,
        priority: el.priority,
        children: Vec::new(),
    }
}

/// System input-method surfaces carry no app structure and churn with focus.
fn is_system_input(el: &Element) -> bool {
    let id = el.id.as_deref().unwrap_or("").to_lowercase();
    let label = el.label.as_deref().unwrap_or("").to_lowercase();
    id.contains("keyboard")
        || id.starts_with("ime")
        || label.contains("keyboard")
        || label.contains("input method")
}

// ============================================================================
// Priority scoring and trimming
// ============================================================================

fn score(el: &mut Element) {
    let mut priority = 0.0;
    if el.interactive {
        priority += INTERACTIVE_BONUS;
    }
    if el.id.is_some() {
        priority += ID_BONUS;
    }
    if el.label.is_some() {
        priority += LABEL_BONUS;
    }
    if let Some(intent) = el.intent {
        priority += intent_bonus(intent);
    }
    priority += type_bonus(el.kind);

    el.priority = Some(priority);
    for child in &mut el.children {
        score(child);
    }
}

fn total_count(elements: &[Element]) -> usize {
    elements.iter().map(Element::subtree_size).sum()
}

/// Trim lowest-priority non-interactive elements until the forest fits the
/// cap. An element shielding interactive descendants is never removed, so
/// every interactive element survives and hierarchy is preserved.
fn trim_to_cap(elements: &mut Vec<Element>, cap: usize) {
    while total_count(elements) > cap {
        let Some(path) = lowest_removable(elements) else {
            break;
        };
        remove_at(elements, &path);
    }
}

/// Path (child indices) to the removable element with the lowest priority.
fn lowest_removable(elements: &[Element]) -> Option<Vec<usize>> {
    let mut best: Option<(f32, Vec<usize>)> = None;
    let mut path = Vec::new();
    search_removable(elements, &mut path, &mut best);
    best.map(|(_, p)| p)
}

fn search_removable(
    elements: &[Element],
    path: &mut Vec<usize>,
    best: &mut Option<(f32, Vec<usize>)>,
) {
    for (i, el) in elements.iter().enumerate() {
        path.push(i);
        if !el.interactive && !el.has_interactive_descendant() {
            let priority = el.priority.unwrap_or(0.0);
            let better = match best {
                Some((p, _)) => priority < *p,
                None => true,
            };
            if better {
                *best = Some((priority, path.clone()));
            }
        }
        search_removable(&el.children, path, best);
        path.pop();
    }
}

fn remove_at(elements: &mut Vec<Element>, path: &[usize]) {
    match path {
        [] => {}
        [i] => {
            elements.remove(*i);
        }
        [i, rest @ ..] => remove_at(&mut elements[*i].children, rest),
    }
}
