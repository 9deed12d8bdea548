//! Premiums module - rate tables and premium breakdowns.
//!
//! Premiums are rate-card lookups, not formulas. Every value in the tables
//! below is a published rate and must be reproduced exactly.

mod premiums_calculator;
mod premiums_model;


pub use premiums_calculator::{
    calculate_base_premium, calculate_liability_premium, calculate_liquor_liability_premium,
    coverage_limit, map_max_guests_to_guest_range,
};
pub use premiums_model::{GuestRange, LiabilityOption, PremiumBreakdown, PremiumInputs};
