// src/domain/phone_number.rs
//
// Format-tolerant phone number comparison.
//
// Two numbers are considered equivalent when their trailing significant
// digits agree, which absorbs country-code and trunk-prefix differences
// ("+358 50 1234567" vs "050 1234567"). Shorter numbers (short codes,
// voicemail speed dials) must agree exactly after normalization.
//
// Pure functions only: no state, no I/O, unparsable input never matches.

/// Trailing digits that must agree for two long numbers to match.
const MIN_SIGNIFICANT_DIGITS: usize = 7;

/// Symmetric, format-tolerant equivalence of two phone number strings.
pub fn numbers_match(a: &str, b: &str) -> bool {
    let a = normalize(a);
    let b = normalize(b);

    if a.is_empty() || b.is_empty() {
        return false;
    }

    if a.len() >= MIN_SIGNIFICANT_DIGITS && b.len() >= MIN_SIGNIFICANT_DIGITS {
        a[a.len() - MIN_SIGNIFICANT_DIGITS..] == b[b.len() - MIN_SIGNIFICANT_DIGITS..]
    } else {
        a == b
    }
}

/// Reduce a dial string to its digits. Visual separators (spaces, dashes,
/// dots, parentheses) and the international prefix are dropped; anything
/// after a dial-control character (pause/wait) is ignored.
fn normalize(number: &str) -> String {
    let mut digits = String::with_capacity(number.len());

    for c in number.chars() {
        match c {
            '0'..='9' => digits.push(c),
            ' ' | '-' | '.' | '(' | ')' | '+' => {}
            'p' | 'P' | 'w' | 'W' | ',' | ';' => break,
            // Unknown character: not a dialable number.
            _ => return String::new(),
        }
    }

    digits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert!(numbers_match("5001", "5001"));
        assert!(numbers_match("0501234567", "0501234567"));
    }

    #[test]
    fn test_formatting_is_ignored() {
        assert!(numbers_match("050 123-4567", "0501234567"));
        assert!(numbers_match("(050) 123.4567", "050 1234567"));
    }

    #[test]
    fn test_country_code_prefix_is_tolerated() {
        assert!(numbers_match("+358501234567", "0501234567"));
        assert!(numbers_match("0501234567", "+358501234567"));
        assert!(numbers_match("+1234", "1234"));
    }

    #[test]
    fn test_different_numbers_do_not_match() {
        assert!(!numbers_match("0501234567", "0507654321"));
        assert!(!numbers_match("5001", "9999"));
    }

    #[test]
    fn test_short_codes_require_exact_digits() {
        assert!(!numbers_match("5001", "15001"));
        assert!(!numbers_match("123", "1234"));
    }

    #[test]
    fn test_dial_control_suffix_is_dropped() {
        assert!(numbers_match("0501234567p123", "0501234567"));
        assert!(numbers_match("0501234567,9", "0501234567"));
    }

    #[test]
    fn test_unparsable_input_never_matches() {
        assert!(!numbers_match("", "5001"));
        assert!(!numbers_match("voicemail", "voicemail"));
        assert!(!numbers_match("  ", "  "));
    }

    #[test]
    fn test_symmetry() {
        let pairs = [
            ("+358501234567", "0501234567"),
            ("5001", "5001"),
            ("abc", "5001"),
        ];
        for (a, b) in pairs {
            assert_eq!(numbers_match(a, b), numbers_match(b, a));
        }
    }
}
