use serde::{Deserialize, Serialize};

// ============================================================================
// UI element tree — the raw material every capture produces
// ============================================================================

/// Kind of a UI element, as reported by the platform inspector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Button,
    Input,
    Text,
    Image,
    Toggle,
    Link,
    Tab,
    Scrollable,
    Container,
    Picker,
    Slider,
}

impl ElementType {
    /// Stable lowercase name used in structural signatures.
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Button => "button",
            ElementType::Input => "input",
            ElementType::Text => "text",
            ElementType::Image => "image",
            ElementType::Toggle => "toggle",
            ElementType::Link => "link",
            ElementType::Tab => "tab",
            ElementType::Scrollable => "scrollable",
            ElementType::Container => "container",
            ElementType::Picker => "picker",
            ElementType::Slider => "slider",
        }
    }
}

/// Semantic role of an element, inferred during compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticIntent {
    Submit,
    Navigation,
    Neutral,
    Destructive,
}

/// A node in a captured UI tree.
///
/// Optional fields are omitted from serialized form when absent — the
/// representation is handed to a token-metered decision capability, so
/// empty markers are never emitted (omission, not null).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    #[serde(rename = "type")]
    pub kind: ElementType,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub label: Option<String>,

    pub interactive: bool,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub value: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub intent: Option<SemanticIntent>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub priority: Option<f32>,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(kind: ElementType) -> Self {
        Element {
            kind,
            id: None,
            label: None,
            interactive: false,
            value: None,
            intent: None,
            priority: None,
            children: Vec::new(),
        }
    }

    /// Interactive element with an id and a label (the common case in tests
    /// and scenario files).
    pub fn interactive(kind: ElementType, id: &str, label: &str) -> Self {
        Element {
            id: Some(id.to_string()),
            label: Some(label.to_string()),
            interactive: true,
            ..Element::new(kind)
        }
    }

    pub fn container(children: Vec<Element>) -> Self {
        Element {
            children,
            ..Element::new(ElementType::Container)
        }
    }

    pub fn text(label: &str) -> Self {
        Element {
            label: Some(label.to_string()),
            ..Element::new(ElementType::Text)
        }
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = Some(value.to_string());
        self
    }

    pub fn with_children(mut self, children: Vec<Element>) -> Self {
        self.children = children;
        self
    }

    /// True when the element matches an identifier or label, ignoring case.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.id
            .as_deref()
            .is_some_and(|id| id.to_lowercase() == needle)
            || self
                .label
                .as_deref()
                .is_some_and(|label| label.to_lowercase() == needle)
    }

    /// Depth-first search for an element by id or label.
    pub fn find(&self, needle: &str) -> Option<&Element> {
        if self.matches(needle) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(needle))
    }

    pub fn find_mut(&mut self, needle: &str) -> Option<&mut Element> {
        if self.matches(needle) {
            return Some(self);
        }
        self.children
            .iter_mut()
            .find_map(|child| child.find_mut(needle))
    }

    /// Total node count of this subtree, including self.
    pub fn subtree_size(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(Element::subtree_size)
            .sum::<usize>()
    }

    pub fn has_interactive_descendant(&self) -> bool {
        self.children
            .iter()
            .any(|c| c.interactive || c.has_interactive_descendant())
    }
}

/// DFS over a forest, yielding every element in pre-order.
pub fn walk<'a>(elements: &'a [Element], visit: &mut impl FnMut(&'a Element)) {
    for el in elements {
        visit(el);
        walk(&el.children, visit);
    }
}

/// Find an element by id or label anywhere in a forest.
pub fn find_in<'a>(elements: &'a [Element], needle: &str) -> Option<&'a Element> {
    elements.iter().find_map(|el| el.find(needle))
}
