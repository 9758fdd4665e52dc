//! Keyword expansion: widen recall against the external search API.
//!
//! Best-effort by design — an irrelevant expansion costs one extra query,
//! a missed synonym only narrows recall. Correctness never depends on this
//! module.

/// Hard cap on the expanded term list; bounds external-API cost.
pub const MAX_TERMS: usize = 18;

/// Substituted when the caller supplies no keywords at all.
pub const DEFAULT_KEYWORDS: &[&str] = &["Munck", "Guindastes", "Guindaste", "Caminhão Munck"];

const MUNCK_SYNONYMS: &[&str] = &[
    "caminhão munck",
    "caminhao munck",
    "locação munck",
    "locacao munck",
    "guindauto",
    "guindaste articulado",
    "caminhão munck aluguel",
    "aluguel de munck",
];

const CRANE_SYNONYMS: &[&str] = &[
    "locação de guindaste",
    "locacao de guindaste",
    "aluguel de guindaste",
    "guindaste móvel",
    "guindaste movel",
    "guindaste telescópico",
    "guindaste telescopico",
    "guindaste para obra",
];

const PRECAST_SYNONYMS: &[&str] = &[
    "blocos de concreto",
    "artefatos de concreto",
    "pré-moldados",
    "pre moldados",
    "pré fabricados",
    "pre fabricados",
    "fábrica de blocos",
    "fabrica de blocos",
];

/// Expands raw keywords into a deduplicated, order-preserving query list.
///
/// Every original term is kept. Terms matching the crane/precast vocabulary
/// gain their fixed synonym sets; any term of three or more characters also
/// gains generic rental variants. The result is deduplicated
/// case-insensitively (first spelling wins) and truncated to [`MAX_TERMS`].
#[must_use]
pub fn expand_keywords(base: &[String]) -> Vec<String> {
    let cleaned: Vec<&str> = base
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .collect();

    let defaults: Vec<&str>;
    let source: &[&str] = if cleaned.is_empty() {
        defaults = DEFAULT_KEYWORDS.to_vec();
        &defaults
    } else {
        &cleaned
    };

    let mut expanded: Vec<String> = Vec::new();
    for keyword in source {
        let low = keyword.to_lowercase();

        expanded.push((*keyword).to_owned());

        if low.contains("munck") || low.contains("munk") || low.contains("guindauto") {
            expanded.extend(MUNCK_SYNONYMS.iter().map(|s| (*s).to_owned()));
        }

        if low.contains("guindast") {
            expanded.extend(CRANE_SYNONYMS.iter().map(|s| (*s).to_owned()));
        }

        if low.contains("bloco")
            || low.contains("pré")
            || low.contains("pre")
            || low.contains("concreto")
        {
            expanded.extend(PRECAST_SYNONYMS.iter().map(|s| (*s).to_owned()));
        }

        // Generic wideners for anything that is not a stop-word-sized token.
        if keyword.chars().count() >= 3 {
            expanded.push(format!("locação {keyword}"));
            expanded.push(format!("aluguel {keyword}"));
        }
    }

    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for term in expanded {
        let trimmed = term.trim();
        if trimmed.is_empty() {
            continue;
        }
        if seen.insert(trimmed.to_lowercase()) {
            out.push(trimmed.to_owned());
            if out.len() == MAX_TERMS {
                break;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(terms: &[&str]) -> Vec<String> {
        terms.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn keeps_every_original_term() {
        let terms = expand_keywords(&owned(&["Munck", "Empilhadeira"]));
        assert!(terms.iter().any(|t| t == "Munck"));
        assert!(terms.iter().any(|t| t == "Empilhadeira"));
    }

    #[test]
    fn never_exceeds_the_cap() {
        let base = owned(&["Munck", "Guindaste", "Blocos de concreto", "Pré-moldados"]);
        assert!(expand_keywords(&base).len() <= MAX_TERMS);
    }

    #[test]
    fn empty_input_substitutes_the_default_set() {
        let terms = expand_keywords(&[]);
        assert!(!terms.is_empty());
        assert!(terms.iter().any(|t| t == "Munck"));
        assert!(terms.len() <= MAX_TERMS);
    }

    #[test]
    fn blank_only_input_substitutes_the_default_set() {
        let terms = expand_keywords(&owned(&["  ", ""]));
        assert!(terms.iter().any(|t| t == "Munck"));
    }

    #[test]
    fn munck_vocabulary_gains_its_synonyms() {
        let terms = expand_keywords(&owned(&["caminhão munck"]));
        assert!(terms.iter().any(|t| t == "guindauto"));
        assert!(terms.iter().any(|t| t == "aluguel de munck"));
    }

    #[test]
    fn crane_vocabulary_gains_its_synonyms() {
        let terms = expand_keywords(&owned(&["Guindastes"]));
        assert!(terms.iter().any(|t| t == "guindaste telescópico"));
    }

    #[test]
    fn long_terms_gain_generic_rental_variants() {
        let terms = expand_keywords(&owned(&["Empilhadeira"]));
        assert!(terms.iter().any(|t| t == "locação Empilhadeira"));
        assert!(terms.iter().any(|t| t == "aluguel Empilhadeira"));
    }

    #[test]
    fn short_terms_do_not_gain_generic_variants() {
        let terms = expand_keywords(&owned(&["ab"]));
        assert_eq!(terms, vec!["ab"]);
    }

    #[test]
    fn dedup_is_case_insensitive_and_keeps_first_spelling() {
        let terms = expand_keywords(&owned(&["Guindauto", "guindauto"]));
        let count = terms
            .iter()
            .filter(|t| t.eq_ignore_ascii_case("guindauto"))
            .count();
        assert_eq!(count, 1);
        assert!(terms.iter().any(|t| t == "Guindauto"));
    }

    #[test]
    fn expansion_is_deterministic() {
        let base = owned(&["Munck", "Blocos"]);
        assert_eq!(expand_keywords(&base), expand_keywords(&base));
    }
}
