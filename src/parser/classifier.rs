//! Availability classification of TestFlight join pages
//!
//! The verdict is a heuristic over page text and is brittle to upstream
//! page redesigns. Missing "full" phrases count as available, and an
//! explicit join control wins over any "full" text.

use scraper::{ElementRef, Html};

use crate::parser::sanitize::{clean_display_name, mentions_any};
use crate::parser::selectors::{
    PageSelectors, FULL_PHRASES, GENERIC_HEADING_WORDS, JOIN_LABELS,
};
use crate::parser::{AvailabilityResult, UNKNOWN_APP};
use crate::utils::error::ParseError;

/// Pure classifier from page HTML to an availability verdict
pub struct AvailabilityClassifier {
    selectors: PageSelectors,
}

impl AvailabilityClassifier {
    #[must_use]
    pub fn new() -> Self {
        Self {
            selectors: PageSelectors::new(),
        }
    }

    /// Classify a fetched page
    ///
    /// # Errors
    ///
    /// Returns `ParseError::EmptyDocument` if the page has no content at all
    pub fn classify(&self, html: &str) -> Result<AvailabilityResult, ParseError> {
        // An empty 200 body counts as a failed check, never as "no full
        // text found", so a blank page cannot announce an open beta.
        if html.trim().is_empty() {
            return Err(ParseError::EmptyDocument);
        }

        let document = Html::parse_document(html);

        let extracted = self
            .extract_structural_name(&document)
            .or_else(|| self.extract_fallback_name(&document));

        let full = self.has_full_signal(&document);
        let joinable = self.has_join_control(&document);
        let is_available = joinable || !full;

        let subject = extracted.as_deref().unwrap_or("the app");
        let message = if is_available {
            format!("TestFlight for {subject} has available slots!")
        } else {
            format!("TestFlight for {subject} is currently full.")
        };

        tracing::debug!(
            available = is_available,
            full_text = full,
            join_control = joinable,
            app = extracted.as_deref().unwrap_or("Unknown"),
            "Classified page"
        );

        Ok(AvailabilityResult {
            is_available,
            display_name: extracted.unwrap_or_else(|| UNKNOWN_APP.to_string()),
            message,
        })
    }

    /// Try the ordered structural heuristics; first non-empty name wins
    fn extract_structural_name(&self, document: &Html) -> Option<String> {
        self.selectors.name_heuristics.iter().find_map(|heuristic| {
            let element = document.select(&heuristic.selector).find(|el| {
                heuristic
                    .must_contain
                    .map_or(true, |marker| element_text(el).contains(marker))
            })?;
            let name = clean_display_name(&element_text(&element));
            (!name.is_empty()).then_some(name)
        })
    }

    /// First heading that does not itself talk about TestFlight or the beta
    fn extract_fallback_name(&self, document: &Html) -> Option<String> {
        document
            .select(self.selectors.fallback_headings)
            .map(|el| element_text(&el).trim().to_string())
            .find(|text| !text.is_empty() && !mentions_any(text, GENERIC_HEADING_WORDS))
    }

    fn has_full_signal(&self, document: &Html) -> bool {
        let body_text: String = document
            .select(self.selectors.body)
            .map(|body| element_text(&body))
            .collect();

        FULL_PHRASES.iter().any(|phrase| body_text.contains(phrase))
    }

    fn has_join_control(&self, document: &Html) -> bool {
        document.select(self.selectors.join_controls).any(|el| {
            let text = element_text(&el);
            JOIN_LABELS.iter().any(|label| text.contains(label))
        })
    }
}

impl Default for AvailabilityClassifier {
    fn default() -> Self {
        Self::new()
    }
}

fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect()
}
