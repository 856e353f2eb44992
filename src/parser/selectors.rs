//! CSS selectors for TestFlight join pages
//!
//! Name heuristics are tried in declaration order. Some of them only count
//! when the matched element's text contains a marker, which stands in for
//! the `:contains()` pseudo-class CSS does not have.

use lazy_static::lazy_static;
use scraper::Selector;

// Helper macro to parse selectors safely at compile time
macro_rules! parse_selector {
    ($s:expr) => {
        Selector::parse($s).expect(concat!("Invalid CSS selector: ", $s))
    };
}

/// One display-name heuristic
pub struct NameHeuristic {
    /// Elements to consider; the first one passing `must_contain` is used
    pub selector: Selector,

    /// Substring the element text must contain, case-sensitive
    pub must_contain: Option<&'static str>,
}

lazy_static! {
    static ref NAME_HEURISTICS: Vec<NameHeuristic> = vec![
        NameHeuristic {
            selector: parse_selector!(".app-header__title"),
            must_contain: None,
        },
        NameHeuristic {
            selector: parse_selector!("h1.beta-status__app-title"),
            must_contain: None,
        },
        NameHeuristic {
            selector: parse_selector!(".beta-status__app-name"),
            must_contain: None,
        },
        NameHeuristic {
            selector: parse_selector!("h1"),
            must_contain: Some("Join the beta"),
        },
        NameHeuristic {
            selector: parse_selector!(".beta-status__title"),
            must_contain: Some("beta"),
        },
        NameHeuristic {
            selector: parse_selector!("title"),
            must_contain: None,
        },
    ];

    static ref FALLBACK_HEADINGS: Selector = parse_selector!("h1, h2");

    static ref BODY: Selector = parse_selector!("body");

    static ref JOIN_CONTROLS: Selector = parse_selector!("button, [role='button']");
}

/// Phrases whose presence in the body means no slots are open
pub const FULL_PHRASES: &[&str] = &[
    "This beta is full",
    "Beta program is currently full",
    "No longer accepting new testers",
];

/// Labels of controls that let a visitor join right now
pub const JOIN_LABELS: &[&str] = &["Join the Beta", "Start Testing"];

/// Words that disqualify a fallback heading from naming the app
pub const GENERIC_HEADING_WORDS: &[&str] = &["testflight", "beta"];

/// Selector bundle used by the availability classifier
pub struct PageSelectors {
    pub name_heuristics: &'static [NameHeuristic],
    pub fallback_headings: &'static Selector,
    pub body: &'static Selector,
    pub join_controls: &'static Selector,
}

impl PageSelectors {
    pub fn new() -> Self {
        Self {
            name_heuristics: &NAME_HEURISTICS,
            fallback_headings: &FALLBACK_HEADINGS,
            body: &BODY,
            join_controls: &JOIN_CONTROLS,
        }
    }
}

impl Default for PageSelectors {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_selectors_initialize() {
        let selectors = PageSelectors::new();
        assert_eq!(selectors.name_heuristics.len(), 6);
        assert!(selectors.name_heuristics[3].must_contain.is_some());
    }

    #[test]
    fn test_join_controls_match_role_button() {
        let doc = Html::parse_document(
            r#"<html><body><a role="button" href="/join">Start Testing</a></body></html>"#,
        );
        let selectors = PageSelectors::new();
        assert_eq!(doc.select(selectors.join_controls).count(), 1);
    }

    #[test]
    fn test_fallback_headings_in_document_order() {
        let doc = Html::parse_document("<html><body><h2>First</h2><h1>Second</h1></body></html>");
        let selectors = PageSelectors::new();
        let texts: Vec<String> = doc
            .select(selectors.fallback_headings)
            .map(|el| el.text().collect())
            .collect();
        assert_eq!(texts, vec!["First", "Second"]);
    }
}
