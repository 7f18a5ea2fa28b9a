//! The ticket saturator.
//!
//! Takes one event at a time and requests tickets against it back to back
//! until a request fails. Any failure ends the loop, whether the service
//! refused or the request never completed; the distinction is logged but not
//! acted on. The exhausted event is then handed to the deleter. There is no
//! capacity check and no bound on the number of requests, the service alone
//! decides when an event is full.
//!
//! The request loop is driven by [`state_machine`]; this module deals only
//! with the queues and the service.

use std::{sync::Arc, time::Duration};

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tokio::{sync::mpsc, time::sleep};
use tracing::{debug, info, warn};

use super::Error;
use crate::{client::Api, event::Event, random};

pub mod state_machine;

use state_machine::{Input, Operation, StateMachine};

/// Pause applied between successful ticket requests.
#[derive(Debug, Default, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
#[serde(deny_unknown_fields)]
pub enum Pacing {
    /// Request tickets as fast as the service answers.
    #[default]
    AllOut,
    /// Sleep a fixed time after every issued ticket.
    Fixed {
        /// Pause in milliseconds
        millis: u64,
    },
}

#[derive(Debug, Default, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(deny_unknown_fields)]
/// Configuration of the saturator.
pub struct Config {
    /// Pause between successful ticket requests
    #[serde(default)]
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub pacing: Pacing,
}

#[derive(Debug)]
/// The ticket saturator.
pub struct Saturator<A> {
    config: Config,
    maximum_name_length: usize,
    api: Arc<A>,
    rng: StdRng,
    events: mpsc::Receiver<Event>,
    exhausted: mpsc::Sender<Event>,
}

impl<A> Saturator<A>
where
    A: Api,
{
    /// Create a new [`Saturator`] reading `events` and feeding `exhausted`.
    #[must_use]
    pub fn new(
        config: Config,
        maximum_name_length: usize,
        api: Arc<A>,
        rng: StdRng,
        events: mpsc::Receiver<Event>,
        exhausted: mpsc::Sender<Event>,
    ) -> Self {
        Self {
            config,
            maximum_name_length,
            api,
            rng,
            events,
            exhausted,
        }
    }

    /// Run [`Saturator`] until its input queue closes.
    ///
    /// # Errors
    ///
    /// Function will return an error if the deleter's queue is closed.
    pub async fn spin(mut self) -> Result<(), Error> {
        let mut machine = StateMachine::new();
        while let Some(event) = self.events.recv().await {
            self.saturate(&mut machine, event).await?;
        }
        debug!("event queue closed");
        Ok(())
    }

    async fn saturate(&mut self, machine: &mut StateMachine, event: Event) -> Result<(), Error> {
        debug!(id = event.id, capacity = event.capacity, "saturating event");
        let mut operation = machine.next(Input::Received)?;
        loop {
            match operation {
                Operation::RequestTicket => {
                    let name = random::name(&mut self.rng, self.maximum_name_length);
                    let input = match self.api.create_ticket(event.id, &name).await {
                        Ok(ticket) => {
                            info!(event_id = ticket.event_id, name = %ticket.name, "created ticket");
                            self.pace().await;
                            Input::TicketCreated
                        }
                        Err(err) if err.is_refusal() => {
                            info!(id = event.id, "event exhausted: {err}");
                            Input::TicketFailed
                        }
                        Err(err) => {
                            warn!(id = event.id, "ticket request failed, treating event as exhausted: {err}");
                            Input::TicketFailed
                        }
                    };
                    operation = machine.next(input)?;
                }
                Operation::Forward => {
                    self.exhausted
                        .send(event)
                        .await
                        .map_err(|_| Error::QueueClosed("deleter"))?;
                    machine.next(Input::Forwarded)?;
                    return Ok(());
                }
                Operation::Wait => return Ok(()),
            }
        }
    }

    async fn pace(&self) {
        if let Pacing::Fixed { millis } = self.config.pacing {
            sleep(Duration::from_millis(millis)).await;
        }
    }
}
