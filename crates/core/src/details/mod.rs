//! Event, venue, and policy holder details shared by quotes and policies.

mod details_model;

pub use details_model::{EventDetails, PolicyHolderDetails, VenueDetails};
