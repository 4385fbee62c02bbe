//! Address normalization used as the grouping key.
//!
//! Two spellings of the same address must land in the same group, so the key
//! is lowercased, trimmed and has every whitespace run collapsed to a single
//! space.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::Record;

/// Regex matching any run of whitespace (tabs and newlines included)
pub static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Normalize an address for grouping.
pub fn normalize_address(address: &str) -> String {
    let lower = address.to_lowercase();
    WHITESPACE_RUN.replace_all(lower.trim(), " ").into_owned()
}

/// Return new records whose `address` is the normalized key.
pub fn normalize_records(records: &[Record]) -> Vec<Record> {
    records
        .iter()
        .map(|r| Record {
            address: normalize_address(&r.address),
            ..r.clone()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_address_basic() {
        assert_eq!(normalize_address("123 Main St"), "123 main st");
        assert_eq!(normalize_address("  5 Oak Ave  "), "5 oak ave");
        assert_eq!(normalize_address("5   OAK\tAve"), "5 oak ave");
        assert_eq!(normalize_address("5 oak\n ave"), "5 oak ave");
    }

    #[test]
    fn test_normalize_address_empty() {
        assert_eq!(normalize_address(""), "");
        assert_eq!(normalize_address("   "), "");
    }

    #[test]
    fn test_normalize_address_unicode_case() {
        assert_eq!(normalize_address("12 RUE DE L'ÉGLISE"), "12 rue de l'église");
    }

    #[test]
    fn test_normalize_records_leaves_other_fields() {
        let record = Record {
            address: " 5 Oak  Ave".to_string(),
            in_search: true,
            rating: Some(4.0),
            rating_count: Some(10.0),
            categories: vec![Some("cafe".to_string()), None],
            primary_slot: Some(0),
            cells: vec![" 5 Oak  Ave".to_string(), "True".to_string()],
        };
        let normalized = normalize_records(std::slice::from_ref(&record));
        assert_eq!(normalized[0].address, "5 oak ave");
        assert_eq!(normalized[0].categories, record.categories);
        assert_eq!(normalized[0].cells, record.cells);
        assert_eq!(record.address, " 5 Oak  Ave");
    }
}
