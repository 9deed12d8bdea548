//! Database models for users and quotes.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use eventcover_core::details::{EventDetails, PolicyHolderDetails};
use eventcover_core::quotes::{Quote, QuoteRecord};

use crate::utils::{parse_decimal, parse_enum};

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserDB {
    pub id: String,
    pub email: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Database model for quotes
#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::quotes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct QuoteDB {
    pub id: String,
    pub quote_number: String,
    pub status: String,
    pub source: String,
    pub converted_to_policy: bool,
    pub user_id: String,
    pub email: String,
    pub coverage_level: Option<i32>,
    pub liability_coverage: Option<String>,
    pub liquor_liability: bool,
    pub base_premium: String,
    pub liability_premium: String,
    pub liquor_liability_premium: String,
    pub total_premium: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl QuoteDB {
    pub fn from_record(
        id: String,
        user_id: String,
        record: &QuoteRecord,
        timestamp: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            quote_number: record.quote_number.clone(),
            status: record.status.as_str().to_string(),
            source: record.source.as_str().to_string(),
            converted_to_policy: false,
            user_id,
            email: record.email.clone(),
            coverage_level: record.coverage_level,
            liability_coverage: record.liability_coverage.clone(),
            liquor_liability: record.liquor_liability,
            base_premium: record.premiums.base_premium.to_string(),
            liability_premium: record.premiums.liability_premium.to_string(),
            liquor_liability_premium: record.premiums.liquor_liability_premium.to_string(),
            total_premium: record.premiums.total_premium.to_string(),
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    pub fn into_domain(
        self,
        event: Option<EventDetails>,
        policy_holder: Option<PolicyHolderDetails>,
    ) -> Quote {
        Quote {
            status: parse_enum(&self.status, "quote status"),
            source: parse_enum(&self.source, "quote source"),
            base_premium: parse_decimal(&self.base_premium, "base_premium"),
            liability_premium: parse_decimal(&self.liability_premium, "liability_premium"),
            liquor_liability_premium: parse_decimal(
                &self.liquor_liability_premium,
                "liquor_liability_premium",
            ),
            total_premium: parse_decimal(&self.total_premium, "total_premium"),
            id: self.id,
            quote_number: self.quote_number,
            converted_to_policy: self.converted_to_policy,
            user_id: self.user_id,
            email: self.email,
            coverage_level: self.coverage_level,
            liability_coverage: self.liability_coverage,
            liquor_liability: self.liquor_liability,
            event,
            policy_holder,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Mutable quote columns. `None` clears the column.
///
/// `converted_to_policy` is absent: only conversion and policy deletion
/// write it.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::quotes)]
#[diesel(treat_none_as_null = true)]
pub struct QuoteChangesDB {
    pub status: String,
    pub user_id: String,
    pub email: String,
    pub coverage_level: Option<i32>,
    pub liability_coverage: Option<String>,
    pub liquor_liability: bool,
    pub base_premium: String,
    pub liability_premium: String,
    pub liquor_liability_premium: String,
    pub total_premium: String,
    pub updated_at: NaiveDateTime,
}

impl QuoteChangesDB {
    pub fn new(quote: &Quote, user_id: String, timestamp: NaiveDateTime) -> Self {
        Self {
            status: quote.status.as_str().to_string(),
            user_id,
            email: quote.email.clone(),
            coverage_level: quote.coverage_level,
            liability_coverage: quote.liability_coverage.clone(),
            liquor_liability: quote.liquor_liability,
            base_premium: quote.base_premium.to_string(),
            liability_premium: quote.liability_premium.to_string(),
            liquor_liability_premium: quote.liquor_liability_premium.to_string(),
            total_premium: quote.total_premium.to_string(),
            updated_at: timestamp,
        }
    }
}
