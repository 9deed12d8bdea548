//! Database models for event, venue, and policy holder details.

use chrono::NaiveDate;
use diesel::prelude::*;

use eventcover_core::details::{EventDetails, PolicyHolderDetails, VenueDetails};

/// Row that owns a set of details.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailsOwner<'a> {
    Quote(&'a str),
    Policy(&'a str),
}

impl<'a> DetailsOwner<'a> {
    fn quote_id(&self) -> Option<String> {
        match self {
            DetailsOwner::Quote(id) => Some(id.to_string()),
            DetailsOwner::Policy(_) => None,
        }
    }

    fn policy_id(&self) -> Option<String> {
        match self {
            DetailsOwner::Quote(_) => None,
            DetailsOwner::Policy(id) => Some(id.to_string()),
        }
    }
}

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::events)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct EventDB {
    pub id: String,
    pub quote_id: Option<String>,
    pub policy_id: Option<String>,
    pub event_type: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub max_guests: Option<String>,
    pub honoree1_first_name: Option<String>,
    pub honoree1_last_name: Option<String>,
    pub honoree2_first_name: Option<String>,
    pub honoree2_last_name: Option<String>,
}

impl EventDB {
    pub fn new(id: String, owner: DetailsOwner<'_>, event: &EventDetails) -> Self {
        Self {
            id,
            quote_id: owner.quote_id(),
            policy_id: owner.policy_id(),
            event_type: event.event_type.clone(),
            event_date: event.event_date,
            max_guests: event.max_guests.clone(),
            honoree1_first_name: event.honoree1_first_name.clone(),
            honoree1_last_name: event.honoree1_last_name.clone(),
            honoree2_first_name: event.honoree2_first_name.clone(),
            honoree2_last_name: event.honoree2_last_name.clone(),
        }
    }

    pub fn into_details(self, venue: Option<VenueDB>) -> EventDetails {
        EventDetails {
            event_type: self.event_type,
            event_date: self.event_date,
            max_guests: self.max_guests,
            honoree1_first_name: self.honoree1_first_name,
            honoree1_last_name: self.honoree1_last_name,
            honoree2_first_name: self.honoree2_first_name,
            honoree2_last_name: self.honoree2_last_name,
            venue: venue.map(VenueDetails::from),
        }
    }
}

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::venues)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct VenueDB {
    pub id: String,
    pub event_id: String,
    pub name: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    pub location_type: Option<String>,
    pub ceremony_location_type: Option<String>,
}

impl VenueDB {
    pub fn new(id: String, event_id: String, venue: &VenueDetails) -> Self {
        Self {
            id,
            event_id,
            name: venue.name.clone(),
            address1: venue.address1.clone(),
            address2: venue.address2.clone(),
            city: venue.city.clone(),
            state: venue.state.clone(),
            zip: venue.zip.clone(),
            country: venue.country.clone(),
            location_type: venue.location_type.clone(),
            ceremony_location_type: venue.ceremony_location_type.clone(),
        }
    }
}

impl From<VenueDB> for VenueDetails {
    fn from(db: VenueDB) -> Self {
        Self {
            name: db.name,
            address1: db.address1,
            address2: db.address2,
            city: db.city,
            state: db.state,
            zip: db.zip,
            country: db.country,
            location_type: db.location_type,
            ceremony_location_type: db.ceremony_location_type,
        }
    }
}

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::policy_holders)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PolicyHolderDB {
    pub id: String,
    pub quote_id: Option<String>,
    pub policy_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub relationship: Option<String>,
    pub hear_about_us: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    pub legal_notices: Option<bool>,
    pub completing_form_name: Option<String>,
}

impl PolicyHolderDB {
    pub fn new(id: String, owner: DetailsOwner<'_>, holder: &PolicyHolderDetails) -> Self {
        Self {
            id,
            quote_id: owner.quote_id(),
            policy_id: owner.policy_id(),
            first_name: holder.first_name.clone(),
            last_name: holder.last_name.clone(),
            phone: holder.phone.clone(),
            relationship: holder.relationship.clone(),
            hear_about_us: holder.hear_about_us.clone(),
            address: holder.address.clone(),
            city: holder.city.clone(),
            state: holder.state.clone(),
            zip: holder.zip.clone(),
            country: holder.country.clone(),
            legal_notices: holder.legal_notices,
            completing_form_name: holder.completing_form_name.clone(),
        }
    }
}

impl From<PolicyHolderDB> for PolicyHolderDetails {
    fn from(db: PolicyHolderDB) -> Self {
        Self {
            first_name: db.first_name,
            last_name: db.last_name,
            phone: db.phone,
            relationship: db.relationship,
            hear_about_us: db.hear_about_us,
            address: db.address,
            city: db.city,
            state: db.state,
            zip: db.zip,
            country: db.country,
            legal_notices: db.legal_notices,
            completing_form_name: db.completing_form_name,
        }
    }
}
