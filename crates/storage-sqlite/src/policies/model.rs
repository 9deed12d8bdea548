//! Database models for policies and policy versions.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use eventcover_core::details::{EventDetails, PolicyHolderDetails};
use eventcover_core::policies::{NewPolicyVersion, Policy, PolicyVersion};

/// Database model for policies
#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::policies)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PolicyDB {
    pub id: String,
    pub policy_number: String,
    pub quote_id: Option<String>,
    pub pdf_url: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl PolicyDB {
    pub fn into_domain(
        self,
        event: Option<EventDetails>,
        policy_holder: Option<PolicyHolderDetails>,
    ) -> Policy {
        Policy {
            id: self.id,
            policy_number: self.policy_number,
            quote_id: self.quote_id,
            pdf_url: self.pdf_url,
            event,
            policy_holder,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(
    Queryable, Identifiable, Insertable, Selectable, Associations, PartialEq, Debug, Clone,
)]
#[diesel(belongs_to(PolicyDB, foreign_key = policy_id))]
#[diesel(table_name = crate::schema::policy_versions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PolicyVersionDB {
    pub id: String,
    pub policy_id: String,
    pub data: String,
    pub pdf_file_name: Option<String>,
    pub created_at: NaiveDateTime,
}

impl PolicyVersionDB {
    pub fn new(id: String, version: NewPolicyVersion) -> Self {
        Self {
            id,
            policy_id: version.policy_id,
            data: version.data,
            pdf_file_name: Some(version.pdf_file_name),
            created_at: version.created_at,
        }
    }
}

impl From<PolicyVersionDB> for PolicyVersion {
    fn from(db: PolicyVersionDB) -> Self {
        Self {
            id: db.id,
            policy_id: db.policy_id,
            data: db.data,
            pdf_file_name: db.pdf_file_name,
            created_at: db.created_at,
        }
    }
}
