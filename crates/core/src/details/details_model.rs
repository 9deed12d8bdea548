//! Descriptive records attached to a quote or a policy.
//!
//! Every field is optional: the multi-step quote form fills them in over
//! several requests. `merge` applies a partial update, keeping existing
//! values for fields the update leaves empty.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueDetails {
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

impl VenueDetails {
    pub fn merge(&mut self, update: VenueDetails) {
        merge_field(&mut self.name, update.name);
        merge_field(&mut self.address1, update.address1);
        merge_field(&mut self.address2, update.address2);
        merge_field(&mut self.city, update.city);
        merge_field(&mut self.state, update.state);
        merge_field(&mut self.zip, update.zip);
        merge_field(&mut self.country, update.country);
        merge_field(&mut self.location_type, update.location_type);
        merge_field(&mut self.ceremony_location_type, update.ceremony_location_type);
    }

    /// Fills a missing ceremony location type from the venue's location type.
    ///
    /// Returns true when the record changed.
    pub fn reconcile_location_types(&mut self) -> bool {
        let ceremony_missing = self
            .ceremony_location_type
            .as_deref()
            .map_or(true, |value| value.trim().is_empty());

        if ceremony_missing && self.location_type.is_some() {
            self.ceremony_location_type = self.location_type.clone();
            return true;
        }
        false
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetails {
    pub event_type: Option<String>,
    pub event_date: Option<NaiveDate>,
    /// Raw guest count as entered on the form.
    pub max_guests: Option<String>,
    pub honoree1_first_name: Option<String>,
    pub honoree1_last_name: Option<String>,
    pub honoree2_first_name: Option<String>,
    pub honoree2_last_name: Option<String>,
    pub venue: Option<VenueDetails>,
}

impl EventDetails {
    pub fn merge(&mut self, update: EventDetails) {
        merge_field(&mut self.event_type, update.event_type);
        merge_field(&mut self.event_date, update.event_date);
        merge_field(&mut self.max_guests, update.max_guests);
        merge_field(&mut self.honoree1_first_name, update.honoree1_first_name);
        merge_field(&mut self.honoree1_last_name, update.honoree1_last_name);
        merge_field(&mut self.honoree2_first_name, update.honoree2_first_name);
        merge_field(&mut self.honoree2_last_name, update.honoree2_last_name);

        if let Some(venue_update) = update.venue {
            match self.venue.as_mut() {
                Some(venue) => venue.merge(venue_update),
                None => self.venue = Some(venue_update),
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyHolderDetails {
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

impl PolicyHolderDetails {
    pub fn merge(&mut self, update: PolicyHolderDetails) {
        merge_field(&mut self.first_name, update.first_name);
        merge_field(&mut self.last_name, update.last_name);
        merge_field(&mut self.phone, update.phone);
        merge_field(&mut self.relationship, update.relationship);
        merge_field(&mut self.hear_about_us, update.hear_about_us);
        merge_field(&mut self.address, update.address);
        merge_field(&mut self.city, update.city);
        merge_field(&mut self.state, update.state);
        merge_field(&mut self.zip, update.zip);
        merge_field(&mut self.country, update.country);
        merge_field(&mut self.legal_notices, update.legal_notices);
        merge_field(&mut self.completing_form_name, update.completing_form_name);
    }

    pub fn full_name(&self) -> Option<String> {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
            (Some(name), None) | (None, Some(name)) => Some(name.to_string()),
            (None, None) => None,
        }
    }
}

fn merge_field<T>(target: &mut Option<T>, update: Option<T>) {
    if update.is_some() {
        *target = update;
    }
}
