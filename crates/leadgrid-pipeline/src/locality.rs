//! Locality resolution and filtering.
//!
//! Free-text search regularly returns businesses from adjacent
//! municipalities; records whose resolved city is not one of the requested
//! cities are discarded. The tagged `locality` address component is
//! authoritative when present; the formatted address is the fallback.

use leadgrid_places::AddressComponent;

/// City-level component types, in order of preference.
const CITY_COMPONENT_TYPES: &[&str] = &[
    "locality",
    "administrative_area_level_2",
    "administrative_area_level_1",
];

/// Neighborhood-level component types, in order of preference.
const NEIGHBORHOOD_COMPONENT_TYPES: &[&str] = &["sublocality", "neighborhood"];

fn find_component<'a>(
    components: &'a [AddressComponent],
    wanted: &str,
) -> Option<&'a AddressComponent> {
    components
        .iter()
        .find(|c| c.types.iter().any(|t| t == wanted))
}

/// Extracts the record's city from tagged address components.
#[must_use]
pub fn extract_city(components: &[AddressComponent]) -> Option<String> {
    CITY_COMPONENT_TYPES
        .iter()
        .find_map(|t| find_component(components, t))
        .map(|c| c.long_name.clone())
        .filter(|name| !name.is_empty())
}

/// Extracts the record's neighborhood from tagged address components.
#[must_use]
pub fn extract_neighborhood(components: &[AddressComponent]) -> Option<String> {
    NEIGHBORHOOD_COMPONENT_TYPES
        .iter()
        .find_map(|t| find_component(components, t))
        .map(|c| c.long_name.clone())
        .filter(|name| !name.is_empty())
}

/// Matches a record against the requested cities.
///
/// A tagged city must match exactly (case-insensitive); without one — or
/// when the tagged city matches nothing — any requested city appearing as a
/// substring of the formatted address counts. Returns the canonical
/// (as-requested) spelling, or `None` when the record belongs elsewhere.
#[must_use]
pub fn match_city<'a>(
    extracted_city: Option<&str>,
    formatted_address: &str,
    selected: &'a [String],
) -> Option<&'a str> {
    let extracted = extracted_city.unwrap_or("").trim().to_lowercase();
    if !extracted.is_empty() {
        for city in selected {
            if extracted == city.to_lowercase() {
                return Some(city);
            }
        }
    }

    let address = formatted_address.to_lowercase();
    selected
        .iter()
        .find(|city| address.contains(&city.to_lowercase()))
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(long_name: &str, types: &[&str]) -> AddressComponent {
        AddressComponent {
            long_name: long_name.to_owned(),
            short_name: long_name.to_owned(),
            types: types.iter().map(|t| (*t).to_owned()).collect(),
        }
    }

    fn cities(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn extract_city_prefers_locality() {
        let components = vec![
            component("São Paulo", &["administrative_area_level_2"]),
            component("Guarujá", &["locality", "political"]),
        ];
        assert_eq!(extract_city(&components).as_deref(), Some("Guarujá"));
    }

    #[test]
    fn extract_city_falls_back_through_admin_levels() {
        let level2 = vec![component("Santos", &["administrative_area_level_2"])];
        assert_eq!(extract_city(&level2).as_deref(), Some("Santos"));

        let level1 = vec![component("São Paulo", &["administrative_area_level_1"])];
        assert_eq!(extract_city(&level1).as_deref(), Some("São Paulo"));

        assert_eq!(extract_city(&[]), None);
    }

    #[test]
    fn extract_neighborhood_prefers_sublocality() {
        let components = vec![
            component("Gonzaga", &["sublocality", "political"]),
            component("Centro", &["neighborhood"]),
        ];
        assert_eq!(extract_neighborhood(&components).as_deref(), Some("Gonzaga"));
    }

    #[test]
    fn tagged_city_matches_case_insensitively_and_returns_canonical_spelling() {
        let selected = cities(&["São Paulo", "Guarujá"]);
        let matched = match_city(Some("são paulo"), "whatever", &selected);
        assert_eq!(matched, Some("São Paulo"));
    }

    #[test]
    fn neighboring_city_is_rejected() {
        // Requested São Paulo; record resolves to Santo André.
        let selected = cities(&["São Paulo"]);
        let matched = match_city(
            Some("Santo André"),
            "Av. Industrial, 600 - Santo André - SP",
            &selected,
        );
        assert_eq!(matched, None);
    }

    #[test]
    fn address_substring_is_the_fallback() {
        let selected = cities(&["Guarujá"]);
        let matched = match_city(None, "Rua das Gaivotas, 10 - Guarujá - SP", &selected);
        assert_eq!(matched, Some("Guarujá"));
    }

    #[test]
    fn unmatched_tagged_city_still_tries_the_address() {
        // The tagged component names the metro region; the address carries
        // the municipality the caller asked for.
        let selected = cities(&["Santos"]);
        let matched = match_city(
            Some("Região Metropolitana da Baixada Santista"),
            "Av. Ana Costa, 340 - Santos - SP",
            &selected,
        );
        assert_eq!(matched, Some("Santos"));
    }

    #[test]
    fn no_match_anywhere_rejects_the_record() {
        let selected = cities(&["Campinas"]);
        assert_eq!(match_city(None, "Rua A, 1 - Santos - SP", &selected), None);
    }
}
