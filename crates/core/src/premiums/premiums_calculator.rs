//! Rate-card lookups for event coverage premiums.
//!
//! All functions are pure. Inputs that fall outside a table resolve to a zero
//! premium rather than an error so partially completed quotes still price.

use rust_decimal::Decimal;

use super::premiums_model::{GuestRange, LiabilityOption};

/// Base premium by coverage level (index 0 is level 1).
const BASE_PREMIUMS: [i64; 10] = [160, 200, 250, 300, 355, 450, 600, 750, 900, 1025];

/// Insured limit by coverage level (index 0 is level 1).
const COVERAGE_LIMITS: [i64; 10] = [
    7_500, 15_000, 25_000, 35_000, 50_000, 75_000, 100_000, 125_000, 150_000, 175_000,
];

/// Returns the base premium for a coverage level in `1..=10`, or zero.
pub fn calculate_base_premium(coverage_level: Option<i32>) -> Decimal {
    coverage_level
        .and_then(level_index)
        .map(|idx| Decimal::from(BASE_PREMIUMS[idx]))
        .unwrap_or(Decimal::ZERO)
}

/// Returns the liability add-on premium for an option code.
///
/// `none`, a missing code, and unrecognized codes all price at zero.
pub fn calculate_liability_premium(liability_coverage: Option<&str>) -> Decimal {
    let amount = match liability_coverage.and_then(LiabilityOption::from_code) {
        Some(LiabilityOption::Option1) => 165,
        Some(LiabilityOption::Option2) => 180,
        Some(LiabilityOption::Option3) => 200,
        Some(LiabilityOption::Option4) => 380,
        Some(LiabilityOption::Option5) => 395,
        Some(LiabilityOption::Option6) => 415,
        Some(LiabilityOption::None) | None => 0,
    };
    Decimal::from(amount)
}

/// Returns the liquor liability premium for a guest-range label such as
/// `"101-150"`. Zero when liquor is not served or the range is unknown.
pub fn calculate_liquor_liability_premium(
    has_liquor_liability: bool,
    guest_range: Option<&str>,
) -> Decimal {
    if !has_liquor_liability {
        return Decimal::ZERO;
    }

    let amount = match guest_range.and_then(GuestRange::from_label) {
        Some(GuestRange::UpTo50) | Some(GuestRange::UpTo100) => 65,
        Some(GuestRange::UpTo150) | Some(GuestRange::UpTo200) => 85,
        Some(GuestRange::UpTo250) | Some(GuestRange::UpTo300) => 100,
        Some(GuestRange::UpTo350) | Some(GuestRange::UpTo400) => 150,
        None => 0,
    };
    Decimal::from(amount)
}

/// Maps a raw guest count to its bucket.
///
/// Counts above 400, below 1, or that do not parse as an integer have no
/// bucket.
pub fn map_max_guests_to_guest_range(max_guests: &str) -> Option<GuestRange> {
    let guests: i64 = max_guests.trim().parse().ok()?;
    if guests < 1 {
        return None;
    }

    GuestRange::ALL
        .iter()
        .copied()
        .find(|range| guests <= i64::from(range.upper_bound()))
}

/// Returns the insured limit for a coverage level, or `None` outside `1..=10`.
pub fn coverage_limit(coverage_level: i32) -> Option<Decimal> {
    level_index(coverage_level).map(|idx| Decimal::from(COVERAGE_LIMITS[idx]))
}

fn level_index(level: i32) -> Option<usize> {
    if (1..=10).contains(&level) {
        Some((level - 1) as usize)
    } else {
        None
    }
}
