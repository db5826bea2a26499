//! Merchant name matching and normalization.

use crate::models::dictionary::ProviderDictionary;

use super::patterns::{LEGAL_SUFFIX_SA, LEGAL_SUFFIX_SL};

/// Sentinel canonical name for empty/unusable provider text.
const UNKNOWN_PROVIDER: &str = "Desconocido";

/// Maps raw OCR merchant text to a canonical name via the alias dictionary,
/// with a cleanup transform as fallback.
#[derive(Debug, Clone)]
pub struct ProviderMatcher {
    dictionary: ProviderDictionary,
}

impl ProviderMatcher {
    pub fn new(dictionary: ProviderDictionary) -> Self {
        Self { dictionary }
    }

    /// Canonical name for the first dictionary alias that is a
    /// case-insensitive substring of `text`. Scans in configured order,
    /// first hit wins, no scoring.
    ///
    /// Aliases are matched without word-boundary anchoring, so a short alias
    /// can hit inside unrelated text. That tolerance is intentional: OCR
    /// output is noisy and aliases are maintained by the user.
    pub fn find_in(&self, text: &str) -> Option<&str> {
        if text.trim().is_empty() {
            return None;
        }

        let haystack = text.to_lowercase();
        for mapping in &self.dictionary.providers {
            for name in &mapping.names {
                if haystack.contains(&name.to_lowercase()) {
                    return Some(&mapping.normalized_name);
                }
            }
        }

        None
    }

    /// Normalize a raw provider name to its canonical form.
    ///
    /// The dictionary lookup here is bidirectional (alias contains raw OR raw
    /// contains alias) to tolerate partial OCR extraction. If no entry
    /// matches, falls back to [`clean_provider_name`].
    pub fn normalize(&self, raw: &str) -> String {
        if raw.trim().is_empty() {
            return clean_provider_name(raw);
        }

        let lowered = raw.to_lowercase();
        for mapping in &self.dictionary.providers {
            for name in &mapping.names {
                let alias = name.to_lowercase();
                if lowered.contains(&alias) || alias.contains(&lowered) {
                    return mapping.normalized_name.clone();
                }
            }
        }

        clean_provider_name(raw)
    }
}

/// Cleanup transform for provider names with no dictionary entry: trim,
/// strip legal-entity suffixes ("S.A.", "S.L." and punctuation variants),
/// drop trailing punctuation, then title-case.
pub fn clean_provider_name(raw: &str) -> String {
    let cleaned = raw.trim();
    if cleaned.is_empty() {
        return UNKNOWN_PROVIDER.to_string();
    }

    let cleaned = LEGAL_SUFFIX_SA.replace_all(cleaned, "");
    let cleaned = LEGAL_SUFFIX_SL.replace_all(&cleaned, "");
    let cleaned = cleaned.trim().trim_end_matches(['.', ',', ' ']);

    title_case(cleaned)
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::dictionary::ProviderMapping;

    fn test_dictionary() -> ProviderDictionary {
        let entry = |names: &[&str], canonical: &str| ProviderMapping {
            names: names.iter().map(|s| s.to_string()).collect(),
            normalized_name: canonical.to_string(),
        };

        ProviderDictionary {
            providers: vec![
                entry(&["MERCADONA", "MERCADONA S.A."], "Mercadona"),
                entry(&["CARREFOUR", "CARREFOUR EXPRESS"], "Carrefour"),
                entry(&["DIA", "DIA %"], "Dia"),
                entry(&["LIDL"], "Lidl"),
                entry(&["AHORRAMAS", "AHORRA MAS", "AHORAMAS"], "Ahorramas"),
            ],
        }
    }

    #[test]
    fn test_find_in_known_provider() {
        let matcher = ProviderMatcher::new(test_dictionary());

        assert_eq!(matcher.find_in("MERCADONA S.A."), Some("Mercadona"));
        assert_eq!(matcher.find_in("mercadona"), Some("Mercadona"));
        assert_eq!(matcher.find_in("CARREFOUR EXPRESS"), Some("Carrefour"));
        assert_eq!(matcher.find_in("Factura de LIDL supermercados"), Some("Lidl"));
        assert_eq!(matcher.find_in("AHORRA MAS tienda"), Some("Ahorramas"));
    }

    #[test]
    fn test_find_in_unknown_provider() {
        let matcher = ProviderMatcher::new(test_dictionary());

        assert_eq!(matcher.find_in(""), None);
        assert_eq!(matcher.find_in("   "), None);
        assert_eq!(matcher.find_in("Unknown Store"), None);
        assert_eq!(matcher.find_in("Random text without provider"), None);
    }

    #[test]
    fn test_normalize_via_dictionary() {
        let matcher = ProviderMatcher::new(test_dictionary());

        assert_eq!(matcher.normalize("MERCADONA"), "Mercadona");
        assert_eq!(matcher.normalize("Carrefour Express"), "Carrefour");
    }

    #[test]
    fn test_normalize_partial_ocr_matches_alias() {
        let matcher = ProviderMatcher::new(test_dictionary());

        // Raw text is a substring of the alias "CARREFOUR EXPRESS"
        assert_eq!(matcher.normalize("rrefour expr"), "Carrefour");
    }

    #[test]
    fn test_normalize_fallback_cleanup() {
        let matcher = ProviderMatcher::new(test_dictionary());

        assert_eq!(matcher.normalize("Some Random Store S.A."), "Some Random Store");
        assert_eq!(matcher.normalize("Tienda Local S.L."), "Tienda Local");
        assert_eq!(matcher.normalize("PANADERIA PEPE, S.L."), "Panaderia Pepe");
    }

    #[test]
    fn test_normalize_empty_is_sentinel() {
        let matcher = ProviderMatcher::new(test_dictionary());

        assert_eq!(matcher.normalize(""), "Desconocido");
        assert_eq!(matcher.normalize("   "), "Desconocido");
    }

    #[test]
    fn test_clean_provider_name_title_cases() {
        assert_eq!(clean_provider_name("FRUTERIA LA HUERTA"), "Fruteria La Huerta");
        assert_eq!(clean_provider_name("  bar manolo.  "), "Bar Manolo");
    }
}
