use serde::{Deserialize, Serialize};

use crate::hierarchy::element_model::{Element, ElementType, SemanticIntent, walk};

// ============================================================================
// Semantic enrichment strategies — injectable, with heuristic defaults
// ============================================================================

/// High-level category of a screen, inferred from its elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScreenCategory {
    Login,
    Registration,
    Search,
    Dashboard,
    Settings,
    List,
    Detail,
    Checkout,
    Error,
    Other,
}

/// Assigns a semantic intent to individual elements.
pub trait SemanticAnalyzer {
    fn intent_of(&self, element: &Element) -> Option<SemanticIntent>;
}

/// Detects what kind of screen an element forest represents.
pub trait ScreenCategorizer {
    fn categorize(&self, elements: &[Element]) -> Option<ScreenCategory>;
}

// ============================================================================
// Default heuristics — keyword-based, no model calls
// ============================================================================

pub struct HeuristicSemanticAnalyzer;

impl SemanticAnalyzer for HeuristicSemanticAnalyzer {
    fn intent_of(&self, element: &Element) -> Option<SemanticIntent> {
        if !element.interactive {
            return None;
        }

        let label = element.label.as_deref().unwrap_or("").to_lowercase();

        if label.contains("delete")
            || label.contains("remove")
            || label.contains("log out")
            || label.contains("logout")
        {
            return Some(SemanticIntent::Destructive);
        }
        if label.contains("submit")
            || label.contains("sign in")
            || label.contains("login")
            || label.contains("save")
            || label.contains("confirm")
            || label.contains("continue")
        {
            return Some(SemanticIntent::Submit);
        }
        if matches!(element.kind, ElementType::Link | ElementType::Tab)
            || label.contains("back")
            || label.contains("next")
            || label.contains("menu")
        {
            return Some(SemanticIntent::Navigation);
        }

        Some(SemanticIntent::Neutral)
    }
}

pub struct HeuristicCategorizer;

impl ScreenCategorizer for HeuristicCategorizer {
    fn categorize(&self, elements: &[Element]) -> Option<ScreenCategory> {
        let mut text = String::new();
        let mut input_count = 0usize;
        walk(elements, &mut |el| {
            if let Some(label) = &el.label {
                text.push_str(&label.to_lowercase());
                text.push(' ');
            }
            if let Some(id) = &el.id {
                text.push_str(&id.to_lowercase());
                text.push(' ');
            }
            if el.kind == ElementType::Input {
                input_count += 1;
            }
        });

        let category = if text.contains("password")
            && (text.contains("login") || text.contains("sign in"))
        {
            ScreenCategory::Login
        } else if text.contains("register") || text.contains("sign up") {
            ScreenCategory::Registration
        } else if text.contains("search") && input_count > 0 {
            ScreenCategory::Search
        } else if text.contains("dashboard") || text.contains("overview") {
            ScreenCategory::Dashboard
        } else if text.contains("settings") || text.contains("preferences") {
            ScreenCategory::Settings
        } else if text.contains("checkout") || text.contains("payment") {
            ScreenCategory::Checkout
        } else if text.contains("error") || text.contains("404") || text.contains("500") {
            ScreenCategory::Error
        } else if elements.is_empty() {
            return None;
        } else {
            ScreenCategory::Other
        };

        Some(category)
    }
}
