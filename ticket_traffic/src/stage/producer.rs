//! The event producer.
//!
//! Creates events with random names and capacities, without pause beyond a
//! small random jitter, and hands each to the saturator. The hand-off queue
//! holds one event so the producer stalls whenever the saturator is busy.

use std::sync::Arc;

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tokio::{sync::mpsc, time::sleep};
use tracing::{error, info, warn};

use super::Error;
use crate::{client::Api, event::Event, random};

fn default_jitter_millis() -> u64 {
    10
}

fn default_maximum_capacity() -> u16 {
    500
}

/// What the producer does when the service fails to create an event.
#[derive(Debug, Default, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum OnCreateFailure {
    /// Stop the producer, and with it the process.
    #[default]
    Abort,
    /// Log the failure and try again after the usual jitter.
    Retry,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(deny_unknown_fields)]
/// Configuration of the producer.
pub struct Config {
    /// Exclusive upper bound, in milliseconds, of the pause between creations
    #[serde(default = "default_jitter_millis")]
    pub jitter_millis: u64,
    /// Exclusive upper bound of the capacity given to new events
    #[serde(default = "default_maximum_capacity")]
    pub maximum_capacity: u16,
    /// Behavior when event creation fails
    #[serde(default)]
    pub on_create_failure: OnCreateFailure,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            jitter_millis: default_jitter_millis(),
            maximum_capacity: default_maximum_capacity(),
            on_create_failure: OnCreateFailure::default(),
        }
    }
}

#[derive(Debug)]
/// The event producer.
pub struct Producer<A> {
    config: Config,
    maximum_name_length: usize,
    api: Arc<A>,
    rng: StdRng,
    events: mpsc::Sender<Event>,
}

impl<A> Producer<A>
where
    A: Api,
{
    /// Create a new [`Producer`] feeding `events`.
    #[must_use]
    pub fn new(
        config: Config,
        maximum_name_length: usize,
        api: Arc<A>,
        rng: StdRng,
        events: mpsc::Sender<Event>,
    ) -> Self {
        Self {
            config,
            maximum_name_length,
            api,
            rng,
            events,
        }
    }

    /// Run [`Producer`] until event creation fails or the saturator goes
    /// away.
    ///
    /// # Errors
    ///
    /// Function will return an error if event creation fails under
    /// [`OnCreateFailure::Abort`] or if the saturator's queue is closed.
    pub async fn spin(mut self) -> Result<(), Error> {
        loop {
            let name = random::name(&mut self.rng, self.maximum_name_length);
            let capacity = random::capacity(&mut self.rng, self.config.maximum_capacity);

            match self.api.create_event(&name, capacity).await {
                Ok(event) => {
                    info!(id = event.id, capacity = event.capacity, "created event");
                    self.events
                        .send(event)
                        .await
                        .map_err(|_| Error::QueueClosed("saturator"))?;
                }
                Err(err) => match self.config.on_create_failure {
                    OnCreateFailure::Abort => {
                        error!("Failed to create event, aborting: {err}");
                        return Err(Error::CreateEvent(err));
                    }
                    OnCreateFailure::Retry => {
                        warn!("Failed to create event, retrying: {err}");
                    }
                },
            }

            sleep(random::jitter(&mut self.rng, self.config.jitter_millis)).await;
        }
    }
}
