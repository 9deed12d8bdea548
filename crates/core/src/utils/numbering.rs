//! Human-facing document numbers for quotes and policies.
//!
//! Quote numbers look like `QI-19102026-123456` (issue date plus six random
//! digits). Policy numbers look like `PI-123456`.

use chrono::NaiveDate;
use rand::Rng;

use crate::constants::{POLICY_NUMBER_PREFIX, QUOTE_NUMBER_PREFIX};

/// Returns six random digits, zero padded.
pub fn random_six_digits() -> String {
    let value: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{:06}", value)
}

/// Builds a quote number for the given issue date.
pub fn generate_quote_number(issued_on: NaiveDate) -> String {
    format!(
        "{}-{}-{}",
        QUOTE_NUMBER_PREFIX,
        issued_on.format("%d%m%Y"),
        random_six_digits()
    )
}

/// Builds a random policy number.
pub fn generate_policy_number() -> String {
    format!("{}-{}", POLICY_NUMBER_PREFIX, random_six_digits())
}

/// Derives a policy number from the trailing segment of a quote number,
/// so `QI-19102026-123456` becomes `PI-123456`.
pub fn policy_number_from_quote_number(quote_number: &str) -> String {
    let suffix = quote_number
        .rsplit('-')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(quote_number);
    format!("{}-{}", POLICY_NUMBER_PREFIX, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_number_format() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let number = generate_quote_number(date);

        let parts: Vec<&str> = number.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "QI");
        assert_eq!(parts[1], "19102026");
        assert_eq!(parts[2].len(), 6);
        assert!(parts[2].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_policy_number_format() {
        let number = generate_policy_number();
        assert!(number.starts_with("PI-"));
        assert_eq!(number.len(), 9);
    }

    #[test]
    fn test_policy_number_from_quote_number() {
        assert_eq!(
            policy_number_from_quote_number("QI-19102026-004217"),
            "PI-004217"
        );
        assert_eq!(policy_number_from_quote_number("LEGACY"), "PI-LEGACY");
    }
}
