//! HTML parsing and availability classification
//!
//! This module turns a fetched TestFlight join page into an
//! [`AvailabilityResult`]. Everything here is pure and testable without
//! network access.

pub mod classifier;
pub mod sanitize;
pub mod selectors;

pub use classifier::AvailabilityClassifier;

use serde::{Deserialize, Serialize};

/// Display name used when no heuristic yields one
pub const UNKNOWN_APP: &str = "Unknown App";

/// Verdict for one check of one target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityResult {
    /// Whether the beta appears to accept testers
    pub is_available: bool,

    /// Best-effort app name, or [`UNKNOWN_APP`]
    pub display_name: String,

    /// Human-readable summary for logs
    pub message: String,
}

/// Classify a page with a default classifier
///
/// # Errors
///
/// See [`AvailabilityClassifier::classify`]
pub fn classify(html: &str) -> Result<AvailabilityResult, crate::utils::error::ParseError> {
    AvailabilityClassifier::new().classify(html)
}
