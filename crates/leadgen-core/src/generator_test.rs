use std::collections::HashSet;

use super::*;
use crate::search::validate_search;

fn builtin() -> &'static LocationCatalog {
    LocationCatalog::builtin()
}

fn small_catalog() -> LocationCatalog {
    LocationCatalog::new(
        vec!["Leeds".to_string(), "York".to_string()],
        vec!["Kent".to_string()],
        1,
    )
    .unwrap()
}

fn is_top_tier(search: &str) -> bool {
    builtin()
        .top_tier_cities()
        .iter()
        .any(|city| search.contains(city.as_str()))
}

// -----------------------------------------------------------------------
// Input validation
// -----------------------------------------------------------------------

#[test]
fn rejects_single_character_niche() {
    let err = generate(builtin(), &GenerationRequest::new("a")).unwrap_err();
    assert_eq!(err, GenerateError::InvalidNiche { length: 1 });
}

#[test]
fn rejects_niche_over_fifty_characters() {
    let niche = "a".repeat(51);
    let err = generate(builtin(), &GenerationRequest::new(niche)).unwrap_err();
    assert_eq!(err, GenerateError::InvalidNiche { length: 51 });
}

#[test]
fn rejects_whitespace_only_niche() {
    let err = generate(builtin(), &GenerationRequest::new("    ")).unwrap_err();
    assert_eq!(err, GenerateError::InvalidNiche { length: 0 });
}

#[test]
fn niche_length_is_measured_after_trimming() {
    // 50 significant characters padded with whitespace is still valid.
    let niche = format!("  {}  ", "a".repeat(50));
    assert!(generate(builtin(), &GenerationRequest::new(niche)).is_ok());
    assert!(generate(builtin(), &GenerationRequest::new(" ab ")).is_ok());
}

#[test]
fn rejects_empty_location_selection() {
    let request = GenerationRequest::new("roofers")
        .cities(false)
        .counties(false);
    let err = generate(builtin(), &request).unwrap_err();
    assert_eq!(err, GenerateError::InvalidLocationSelection);
}

#[test]
fn error_messages_are_user_readable() {
    assert_eq!(
        GenerateError::InvalidNiche { length: 1 }.to_string(),
        "niche must be between 2 and 50 characters, got 1"
    );
    assert_eq!(
        GenerateError::InvalidLocationSelection.to_string(),
        "at least one of cities or counties must be selected"
    );
}

// -----------------------------------------------------------------------
// Output contents
// -----------------------------------------------------------------------

#[test]
fn roofers_in_cities_contains_expected_searches() {
    let searches = generate(builtin(), &GenerationRequest::new("roofers")).unwrap();
    assert!(searches.contains(&"roofers in london".to_string()));
    assert!(searches.contains(&"london roofers".to_string()));
    assert!(searches.contains(&"best roofers in bath".to_string()));
    assert!(searches.contains(&"roofers stoke-on-trent uk".to_string()));
    assert!(searches
        .iter()
        .all(|s| s.chars().all(|c| c.is_ascii_lowercase()
            || c.is_ascii_digit()
            || c == ' '
            || c == '-')));
}

#[test]
fn locations_with_disallowed_characters_are_dropped() {
    let searches = generate(builtin(), &GenerationRequest::new("roofers")).unwrap();
    assert!(searches.iter().all(|s| !s.contains('\'')));
    assert!(!searches.iter().any(|s| s.contains("lynn")));
}

#[test]
fn every_template_is_applied() {
    let request = GenerationRequest::new("plumbers").counties(true);
    let searches = generate(&small_catalog(), &request).unwrap();
    for expected in [
        "plumbers in york",
        "york plumbers",
        "best plumbers in york",
        "plumbers near york",
        "york plumbers services",
        "top plumbers york",
        "plumbers york uk",
        "find plumbers york",
        "plumbers companies york",
        "york local plumbers",
    ] {
        assert!(searches.contains(&expected.to_string()), "missing {expected}");
    }
    assert_eq!(searches.len(), 3 * TEMPLATE_COUNT);
}

#[test]
fn output_has_no_duplicates_and_all_entries_validate() {
    for (cities, counties) in [(true, false), (false, true), (true, true)] {
        let request = GenerationRequest::new("Roofers")
            .max_results(5000)
            .cities(cities)
            .counties(counties);
        let searches = generate(builtin(), &request).unwrap();
        let unique: HashSet<&String> = searches.iter().collect();
        assert_eq!(unique.len(), searches.len());
        assert!(searches.iter().all(|s| validate_search(s)));
    }
}

#[test]
fn duplicate_locations_across_lists_are_merged() {
    let catalog = LocationCatalog::new(
        vec!["Bristol".to_string()],
        vec!["Bristol".to_string(), "bristol ".to_string()],
        20,
    )
    .unwrap();
    let request = GenerationRequest::new("roofers").counties(true);
    let searches = generate(&catalog, &request).unwrap();
    assert_eq!(searches.len(), TEMPLATE_COUNT);
}

#[test]
fn counties_only_uses_county_names() {
    let request = GenerationRequest::new("roofers")
        .cities(false)
        .counties(true);
    let searches = generate(builtin(), &request).unwrap();
    assert!(searches.contains(&"roofers in kent".to_string()));
    assert!(!searches.contains(&"roofers in bath".to_string()));
}

#[test]
fn niche_is_canonicalized_before_expansion() {
    let upper = generate(builtin(), &GenerationRequest::new("  ROOFERS ")).unwrap();
    let lower = generate(builtin(), &GenerationRequest::new("roofers")).unwrap();
    assert_eq!(upper, lower);
}

#[test]
fn niche_with_punctuation_yields_no_searches() {
    let searches = generate(builtin(), &GenerationRequest::new("roofers!")).unwrap();
    assert!(searches.is_empty());
}

#[test]
fn long_niche_drops_searches_over_length_limit() {
    let niche = "a".repeat(50);
    let request = GenerationRequest::new(niche).counties(true);
    let searches = generate(builtin(), &request).unwrap();
    assert!(!searches.is_empty());
    assert!(searches.iter().all(|s| s.len() <= 80));
}

// -----------------------------------------------------------------------
// Ordering and truncation
// -----------------------------------------------------------------------

#[test]
fn top_tier_searches_sort_first() {
    let request = GenerationRequest::new("roofers")
        .max_results(5000)
        .counties(true);
    let searches = generate(builtin(), &request).unwrap();

    let last_london = searches
        .iter()
        .rposition(|s| s.contains("london"))
        .expect("london searches present");
    let first_low_priority = searches
        .iter()
        .position(|s| !is_top_tier(s))
        .expect("low priority searches present");
    assert!(last_london < first_low_priority);
}

#[test]
fn each_tier_is_in_code_point_order() {
    let searches = generate(&small_catalog(), &GenerationRequest::new("plumbers").counties(true))
        .unwrap();
    let (top, rest) = searches.split_at(TEMPLATE_COUNT);

    assert!(top.iter().all(|s| s.contains("leeds")));
    assert!(rest.iter().all(|s| !s.contains("leeds")));
    assert!(top.windows(2).all(|w| w[0] < w[1]));
    assert!(rest.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(top[0], "best plumbers in leeds");
    assert_eq!(rest[0], "best plumbers in kent");
}

#[test]
fn output_is_deterministic() {
    let request = GenerationRequest::new("electricians").counties(true);
    let first = generate(builtin(), &request).unwrap();
    let second = generate(builtin(), &request).unwrap();
    assert_eq!(first, second);
}

#[test]
fn truncates_to_max_results() {
    let request = GenerationRequest::new("roofers")
        .max_results(150)
        .counties(true);
    let searches = generate(builtin(), &request).unwrap();
    assert_eq!(searches.len(), 150);
}

#[test]
fn truncation_keeps_the_highest_priority_prefix() {
    let full = generate(
        builtin(),
        &GenerationRequest::new("roofers").max_results(5000).counties(true),
    )
    .unwrap();
    let short = generate(
        builtin(),
        &GenerationRequest::new("roofers").max_results(100).counties(true),
    )
    .unwrap();
    assert_eq!(short.as_slice(), &full[..100]);
    assert!(short.iter().all(|s| is_top_tier(s)));
}

#[test]
fn fewer_candidates_than_limit_are_returned_unpadded() {
    let searches = generate(&small_catalog(), &GenerationRequest::new("plumbers")).unwrap();
    assert_eq!(searches.len(), 2 * TEMPLATE_COUNT);
}

#[test]
fn max_results_is_clamped_into_bounds() {
    assert_eq!(GenerationRequest::new("x").max_results(10).result_limit(), 100);
    assert_eq!(
        GenerationRequest::new("x").max_results(1_000_000).result_limit(),
        5000
    );
    assert_eq!(GenerationRequest::new("x").result_limit(), 1000);

    let searches = generate(
        builtin(),
        &GenerationRequest::new("roofers").max_results(1),
    )
    .unwrap();
    assert_eq!(searches.len(), 100);
}

#[test]
fn request_deserializes_with_defaults() {
    let request: GenerationRequest = serde_json::from_str(r#"{"niche":"roofers"}"#).unwrap();
    assert_eq!(request, GenerationRequest::new("roofers"));
}
