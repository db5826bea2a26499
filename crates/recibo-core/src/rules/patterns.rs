//! Common regex patterns for receipt text extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Date patterns, in precedence order
    pub static ref DATE_YMD: Regex = Regex::new(
        r"\b(\d{4})[/-](\d{2})[/-](\d{2})\b"
    ).unwrap();

    pub static ref DATE_DMY: Regex = Regex::new(
        r"\b(\d{2})[/-](\d{2})[/-](\d{4})\b"
    ).unwrap();

    // Spanish long form: "5 de marzo de 2026", the "de" particles optional
    pub static ref DATE_SPANISH_LONG: Regex = Regex::new(
        r"(?i)\b(\d{1,2})\s+(?:de\s+)?(\p{L}+)\s+(?:de\s+)?(\d{4})\b"
    ).unwrap();

    // Legal-entity suffixes stripped during provider cleanup
    pub static ref LEGAL_SUFFIX_SA: Regex = Regex::new(
        r"(?i),?\s*\bS\.?\s*A\.?\b\.?"
    ).unwrap();

    pub static ref LEGAL_SUFFIX_SL: Regex = Regex::new(
        r"(?i),?\s*\bS\.?\s*L\.?\b\.?"
    ).unwrap();

    // Matches "timestamp | original_name → ..." in operation log lines
    pub static ref LOG_LINE: Regex = Regex::new(
        r"\|([^→|]+)→"
    ).unwrap();
}
