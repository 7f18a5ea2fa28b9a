//! The event deleter.
//!
//! Removes events the saturator reports as exhausted. Failures are logged and
//! the event dropped: there is no retry and no requeue.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::Error;
use crate::{client::Api, event::Event};

#[derive(Debug)]
/// The event deleter.
pub struct Deleter<A> {
    api: Arc<A>,
    exhausted: mpsc::Receiver<Event>,
}

impl<A> Deleter<A>
where
    A: Api,
{
    /// Create a new [`Deleter`] reading `exhausted`.
    #[must_use]
    pub fn new(api: Arc<A>, exhausted: mpsc::Receiver<Event>) -> Self {
        Self { api, exhausted }
    }

    /// Run [`Deleter`] until its input queue closes.
    ///
    /// # Errors
    ///
    /// None known. The signature matches the other stages.
    pub async fn spin(mut self) -> Result<(), Error> {
        while let Some(event) = self.exhausted.recv().await {
            match self.api.delete_event(event.id).await {
                Ok(status) if status.is_success() => {
                    info!(id = event.id, name = %event.name, %status, "deleted event");
                }
                Ok(status) => {
                    warn!(id = event.id, %status, "service answered deletion without success");
                }
                Err(err) => {
                    error!("Could not delete event ID {id}: {err}", id = event.id);
                }
            }
        }
        debug!("exhausted queue closed");
        Ok(())
    }
}
