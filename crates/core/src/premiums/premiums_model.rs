//! Premium domain models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::premiums_calculator::{
    calculate_base_premium, calculate_liability_premium, calculate_liquor_liability_premium,
    map_max_guests_to_guest_range,
};

/// One of the eight guest-count buckets used for liquor-liability rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GuestRange {
    #[serde(rename = "1-50")]
    UpTo50,
    #[serde(rename = "51-100")]
    UpTo100,
    #[serde(rename = "101-150")]
    UpTo150,
    #[serde(rename = "151-200")]
    UpTo200,
    #[serde(rename = "201-250")]
    UpTo250,
    #[serde(rename = "251-300")]
    UpTo300,
    #[serde(rename = "301-350")]
    UpTo350,
    #[serde(rename = "351-400")]
    UpTo400,
}

impl GuestRange {
    /// All buckets in ascending order.
    pub const ALL: [GuestRange; 8] = [
        GuestRange::UpTo50,
        GuestRange::UpTo100,
        GuestRange::UpTo150,
        GuestRange::UpTo200,
        GuestRange::UpTo250,
        GuestRange::UpTo300,
        GuestRange::UpTo350,
        GuestRange::UpTo400,
    ];

    /// Inclusive upper bound of the bucket.
    pub fn upper_bound(&self) -> u32 {
        match self {
            GuestRange::UpTo50 => 50,
            GuestRange::UpTo100 => 100,
            GuestRange::UpTo150 => 150,
            GuestRange::UpTo200 => 200,
            GuestRange::UpTo250 => 250,
            GuestRange::UpTo300 => 300,
            GuestRange::UpTo350 => 350,
            GuestRange::UpTo400 => 400,
        }
    }

    /// Inclusive lower bound of the bucket.
    pub fn lower_bound(&self) -> u32 {
        self.upper_bound() - 49
    }

    pub fn label(&self) -> &'static str {
        match self {
            GuestRange::UpTo50 => "1-50",
            GuestRange::UpTo100 => "51-100",
            GuestRange::UpTo150 => "101-150",
            GuestRange::UpTo200 => "151-200",
            GuestRange::UpTo250 => "201-250",
            GuestRange::UpTo300 => "251-300",
            GuestRange::UpTo350 => "301-350",
            GuestRange::UpTo400 => "351-400",
        }
    }

    /// Parses a bucket label such as `"101-150"`.
    pub fn from_label(label: &str) -> Option<Self> {
        GuestRange::ALL
            .iter()
            .copied()
            .find(|range| range.label() == label.trim())
    }
}

/// Liability add-on selected on a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiabilityOption {
    None,
    Option1,
    Option2,
    Option3,
    Option4,
    Option5,
    Option6,
}

impl LiabilityOption {
    /// Maps an option code (`none`, `option1` … `option6`) to the option.
    /// Unrecognized codes return `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "none" => Some(LiabilityOption::None),
            "option1" => Some(LiabilityOption::Option1),
            "option2" => Some(LiabilityOption::Option2),
            "option3" => Some(LiabilityOption::Option3),
            "option4" => Some(LiabilityOption::Option4),
            "option5" => Some(LiabilityOption::Option5),
            "option6" => Some(LiabilityOption::Option6),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            LiabilityOption::None => "none",
            LiabilityOption::Option1 => "option1",
            LiabilityOption::Option2 => "option2",
            LiabilityOption::Option3 => "option3",
            LiabilityOption::Option4 => "option4",
            LiabilityOption::Option5 => "option5",
            LiabilityOption::Option6 => "option6",
        }
    }
}

/// The four inputs that drive a quote's premium.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PremiumInputs {
    pub coverage_level: Option<i32>,
    pub liability_coverage: Option<String>,
    pub liquor_liability: bool,
    pub max_guests: Option<String>,
}

/// Premium components of a quote. `total_premium` is always the sum of the
/// three components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PremiumBreakdown {
    pub base_premium: Decimal,
    pub liability_premium: Decimal,
    pub liquor_liability_premium: Decimal,
    pub total_premium: Decimal,
}

impl PremiumBreakdown {
    /// Computes every component from the rate tables.
    pub fn calculate(inputs: &PremiumInputs) -> Self {
        let guest_range = inputs
            .max_guests
            .as_deref()
            .and_then(map_max_guests_to_guest_range);

        let base_premium = calculate_base_premium(inputs.coverage_level);
        let liability_premium = calculate_liability_premium(inputs.liability_coverage.as_deref());
        let liquor_liability_premium = calculate_liquor_liability_premium(
            inputs.liquor_liability,
            guest_range.map(|range| range.label()),
        );

        Self {
            base_premium,
            liability_premium,
            liquor_liability_premium,
            total_premium: base_premium + liability_premium + liquor_liability_premium,
        }
    }

    /// Whether the stored total matches the sum of its components.
    pub fn is_consistent(&self) -> bool {
        self.total_premium
            == self.base_premium + self.liability_premium + self.liquor_liability_premium
    }
}
