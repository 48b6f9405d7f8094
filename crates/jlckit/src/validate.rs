use log::warn;
use regex::Regex;

/// Filter raw user input down to well-formed LCSC part numbers.
///
/// Identifiers are trimmed and kept in input order; duplicates of a
/// valid identifier are preserved. Every rejected entry gets its own
/// warning so typos in a long batch are all visible at once.
pub fn validate_part_numbers(raw: &[String]) -> Vec<String> {
    let pattern = Regex::new(r"^C[0-9]{1,8}$").unwrap();

    let mut valid = Vec::with_capacity(raw.len());
    for entry in raw {
        let trimmed = entry.trim();
        if pattern.is_match(trimmed) {
            valid.push(trimmed.to_string());
        } else {
            warn!("Invalid LCSC part number: {trimmed:?}. Skipping.");
        }
    }
    valid
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn keeps_matching_ids_in_order() {
        let out = validate_part_numbers(&ids(&["C2904912", "bad-id", "C12345678"]));
        assert_eq!(out, vec!["C2904912", "C12345678"]);
    }

    #[test]
    fn trims_whitespace_before_matching() {
        let out = validate_part_numbers(&ids(&["  C123  ", "\tC456\n"]));
        assert_eq!(out, vec!["C123", "C456"]);
    }

    #[test]
    fn preserves_valid_duplicates() {
        let out = validate_part_numbers(&ids(&["C1", "C1"]));
        assert_eq!(out, vec!["C1", "C1"]);
    }

    #[test]
    fn rejects_out_of_shape_ids() {
        let out = validate_part_numbers(&ids(&[
            "",
            "C",
            "c123",
            "C123456789", // nine digits
            "X123",
            "C12a",
        ]));
        assert!(out.is_empty());
    }

    #[test]
    fn empty_input_is_not_an_error() {
        assert!(validate_part_numbers(&[]).is_empty());
    }
}
