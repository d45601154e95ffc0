//! Expansion of a business niche into ordered, validated search queries.
//!
//! Generation is pure: the same niche, catalog and request always produce
//! the same searches in the same order.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::LocationCatalog;
use crate::search::{canonicalize, is_canonical_search_valid};

pub const MIN_NICHE_LEN: usize = 2;
pub const MAX_NICHE_LEN: usize = 50;

pub const MIN_MAX_RESULTS: usize = 100;
pub const MAX_MAX_RESULTS: usize = 5000;
pub const DEFAULT_MAX_RESULTS: usize = 1000;

/// Number of templates each location is expanded through.
pub const TEMPLATE_COUNT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error("niche must be between 2 and 50 characters, got {length}")]
    InvalidNiche { length: usize },

    #[error("at least one of cities or counties must be selected")]
    InvalidLocationSelection,
}

/// Options for a single [`generate`] call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub niche: String,
    /// Clamped into `100..=5000` before use.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_include_cities")]
    pub include_cities: bool,
    #[serde(default)]
    pub include_counties: bool,
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

fn default_include_cities() -> bool {
    true
}

impl GenerationRequest {
    /// A request with default options: 1000 results, cities only.
    #[must_use]
    pub fn new(niche: impl Into<String>) -> Self {
        Self {
            niche: niche.into(),
            max_results: DEFAULT_MAX_RESULTS,
            include_cities: true,
            include_counties: false,
        }
    }

    #[must_use]
    pub fn max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    #[must_use]
    pub fn cities(mut self, include: bool) -> Self {
        self.include_cities = include;
        self
    }

    #[must_use]
    pub fn counties(mut self, include: bool) -> Self {
        self.include_counties = include;
        self
    }

    /// The effective result cap after clamping.
    #[must_use]
    pub fn result_limit(&self) -> usize {
        self.max_results.clamp(MIN_MAX_RESULTS, MAX_MAX_RESULTS)
    }
}

/// Generate searches for `request.niche` across the selected locations.
///
/// Searches mentioning a top-tier city come first; each tier is in
/// code-point order. Candidates that fail [`crate::validate_search`] are
/// dropped, and the result holds at most `request.result_limit()` entries.
///
/// # Errors
///
/// Returns [`GenerateError::InvalidNiche`] if the trimmed, lower-cased niche
/// is not 2 to 50 characters, or [`GenerateError::InvalidLocationSelection`]
/// if neither cities nor counties are selected.
pub fn generate(
    catalog: &LocationCatalog,
    request: &GenerationRequest,
) -> Result<Vec<String>, GenerateError> {
    let niche = canonicalize(&request.niche);
    let length = niche.chars().count();
    if !(MIN_NICHE_LEN..=MAX_NICHE_LEN).contains(&length) {
        return Err(GenerateError::InvalidNiche { length });
    }
    if !request.include_cities && !request.include_counties {
        return Err(GenerateError::InvalidLocationSelection);
    }

    let mut locations: Vec<&str> = Vec::new();
    if request.include_cities {
        locations.extend(catalog.cities.iter().map(String::as_str));
    }
    if request.include_counties {
        locations.extend(catalog.counties.iter().map(String::as_str));
    }

    // BTreeSet gives dedup and code-point order in one pass.
    let mut candidates: BTreeSet<String> = BTreeSet::new();
    for location in locations {
        let location = canonicalize(location);
        if location.is_empty() {
            continue;
        }
        for candidate in expand(&niche, &location) {
            if is_canonical_search_valid(&candidate) {
                candidates.insert(candidate);
            }
        }
    }

    let top_tier = catalog.top_tier_cities();
    let (preferred, rest): (Vec<String>, Vec<String>) = candidates
        .into_iter()
        .partition(|c| top_tier.iter().any(|city| c.contains(city.as_str())));

    let limit = request.result_limit();
    let searches: Vec<String> = preferred.into_iter().chain(rest).take(limit).collect();

    tracing::debug!(
        niche = %niche,
        count = searches.len(),
        limit,
        "generated searches"
    );

    Ok(searches)
}

/// Apply every template to an already-canonical niche and location.
fn expand(niche: &str, location: &str) -> [String; TEMPLATE_COUNT] {
    [
        format!("{niche} in {location}"),
        format!("{location} {niche}"),
        format!("best {niche} in {location}"),
        format!("{niche} near {location}"),
        format!("{location} {niche} services"),
        format!("top {niche} {location}"),
        format!("{niche} {location} uk"),
        format!("find {niche} {location}"),
        format!("{niche} companies {location}"),
        format!("{location} local {niche}"),
    ]
}

#[cfg(test)]
#[path = "generator_test.rs"]
mod tests;
