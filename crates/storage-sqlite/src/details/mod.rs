//! Event, venue, and policy holder rows owned by a quote or a policy.
//!
//! These helpers run on a caller-supplied connection so the quote and
//! policy repositories can write details inside their own transactions.

mod model;

pub use model::{DetailsOwner, EventDB, PolicyHolderDB, VenueDB};

use diesel::prelude::*;
use diesel::SqliteConnection;

use eventcover_core::details::{EventDetails, PolicyHolderDetails};

use crate::schema::{events, policy_holders, venues};
use crate::utils::new_id;

fn find_event(conn: &mut SqliteConnection, owner: DetailsOwner<'_>) -> QueryResult<Option<EventDB>> {
    match owner {
        DetailsOwner::Quote(id) => events::table
            .filter(events::quote_id.eq(id))
            .select(EventDB::as_select())
            .first(conn)
            .optional(),
        DetailsOwner::Policy(id) => events::table
            .filter(events::policy_id.eq(id))
            .select(EventDB::as_select())
            .first(conn)
            .optional(),
    }
}

pub fn load_event(
    conn: &mut SqliteConnection,
    owner: DetailsOwner<'_>,
) -> QueryResult<Option<EventDetails>> {
    let Some(event) = find_event(conn, owner)? else {
        return Ok(None);
    };
    let venue = venues::table
        .filter(venues::event_id.eq(&event.id))
        .select(VenueDB::as_select())
        .first(conn)
        .optional()?;
    Ok(Some(event.into_details(venue)))
}

pub fn load_policy_holder(
    conn: &mut SqliteConnection,
    owner: DetailsOwner<'_>,
) -> QueryResult<Option<PolicyHolderDetails>> {
    let row = match owner {
        DetailsOwner::Quote(id) => policy_holders::table
            .filter(policy_holders::quote_id.eq(id))
            .select(PolicyHolderDB::as_select())
            .first(conn)
            .optional()?,
        DetailsOwner::Policy(id) => policy_holders::table
            .filter(policy_holders::policy_id.eq(id))
            .select(PolicyHolderDB::as_select())
            .first(conn)
            .optional()?,
    };
    Ok(row.map(PolicyHolderDetails::from))
}

/// Replaces the owner's event and venue rows with `event`.
pub fn replace_event(
    conn: &mut SqliteConnection,
    owner: DetailsOwner<'_>,
    event: Option<&EventDetails>,
) -> QueryResult<()> {
    // Venue rows follow through ON DELETE CASCADE.
    match owner {
        DetailsOwner::Quote(id) => {
            diesel::delete(events::table.filter(events::quote_id.eq(id))).execute(conn)?
        }
        DetailsOwner::Policy(id) => {
            diesel::delete(events::table.filter(events::policy_id.eq(id))).execute(conn)?
        }
    };

    let Some(event) = event else {
        return Ok(());
    };

    let event_row = EventDB::new(new_id(), owner, event);
    diesel::insert_into(events::table)
        .values(&event_row)
        .execute(conn)?;

    if let Some(venue) = event.venue.as_ref() {
        diesel::insert_into(venues::table)
            .values(&VenueDB::new(new_id(), event_row.id.clone(), venue))
            .execute(conn)?;
    }
    Ok(())
}

/// Replaces the owner's policy holder row with `holder`.
pub fn replace_policy_holder(
    conn: &mut SqliteConnection,
    owner: DetailsOwner<'_>,
    holder: Option<&PolicyHolderDetails>,
) -> QueryResult<()> {
    match owner {
        DetailsOwner::Quote(id) => diesel::delete(
            policy_holders::table.filter(policy_holders::quote_id.eq(id)),
        )
        .execute(conn)?,
        DetailsOwner::Policy(id) => diesel::delete(
            policy_holders::table.filter(policy_holders::policy_id.eq(id)),
        )
        .execute(conn)?,
    };

    if let Some(holder) = holder {
        diesel::insert_into(policy_holders::table)
            .values(&PolicyHolderDB::new(new_id(), owner, holder))
            .execute(conn)?;
    }
    Ok(())
}
