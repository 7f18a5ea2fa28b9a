//! Pipeline stages
//!
//! Four stages push load into the ticketing service. The [`producer`] creates
//! events and hands each to the [`saturator`] which requests tickets until
//! the service stops issuing them, then hands the event to the [`deleter`].
//! Hand-off queues hold at most one event, so a slow stage stalls the one
//! upstream of it. The [`poller`] lists events on its own schedule and talks
//! to no other stage.
//!
//! Every stage works the same basic way: construct with `new`, then `spin`
//! until the input queue closes or an unrecoverable error occurs.

use crate::client;

pub mod deleter;
pub mod poller;
pub mod producer;
pub mod saturator;

#[cfg(test)]
pub(crate) mod stub;

#[derive(thiserror::Error, Debug)]
/// Errors produced by pipeline stages.
pub enum Error {
    /// Event creation failed and the producer is configured to abort.
    #[error("Failed to create event: {0}")]
    CreateEvent(#[source] client::Error),
    /// The queue to the named downstream stage is closed.
    #[error("Queue to the {0} is closed")]
    QueueClosed(&'static str),
    /// See [`crate::stage::saturator::state_machine::Error`] for details.
    #[error(transparent)]
    StateMachine(#[from] saturator::state_machine::Error),
}
