//! Wire model of the ticketing service.
//!
//! Events and tickets travel as JSON. The pipeline never inspects an event's
//! tickets, they are kept only because the service sends them.

use serde::{Deserialize, Deserializer, Serialize};

/// Identifier the service assigns to an [`Event`].
pub type EventId = i32;

/// An event as known to the service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Event {
    /// Identifier assigned by the service on creation
    pub id: EventId,
    /// Display name
    pub name: String,
    /// Upper bound on the tickets the service will issue
    pub capacity: i32,
    /// Tickets issued against this event, as reported by the service
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tickets: Vec<Ticket>,
}

// Equality is identity plus descriptor. The ticket list is informational and
// varies with whoever last fetched the event.
impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.name == other.name && self.capacity == other.capacity
    }
}

impl Eq for Event {}

/// The descriptor submitted to create an [`Event`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NewEvent {
    /// Display name
    pub name: String,
    /// Upper bound on the tickets the service will issue
    pub capacity: i32,
}

/// A ticket issued against an [`Event`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Ticket {
    /// The event this ticket belongs to
    pub event_id: EventId,
    /// Display name
    pub name: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Ticket>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Ticket>>::deserialize(deserializer)?.unwrap_or_default())
}
