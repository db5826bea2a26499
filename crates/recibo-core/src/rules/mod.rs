//! Rule-based extraction from OCR text of Spanish receipts.

pub mod dates;
pub mod patterns;
pub mod provider;

pub use dates::parse_date;
pub use provider::ProviderMatcher;
