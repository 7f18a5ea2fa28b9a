//! The event poller.
//!
//! Lists every event, forever, pausing a small random jitter between
//! listings. The results are not used; the poller exists to put read load on
//! the service alongside the write load of the other stages.

use std::sync::Arc;

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{debug, warn};

use super::Error;
use crate::{client::Api, random};

fn default_jitter_millis() -> u64 {
    10
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(deny_unknown_fields)]
/// Configuration of the poller.
pub struct Config {
    /// Exclusive upper bound, in milliseconds, of the pause between listings
    #[serde(default = "default_jitter_millis")]
    pub jitter_millis: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            jitter_millis: default_jitter_millis(),
        }
    }
}

#[derive(Debug)]
/// The event poller.
pub struct Poller<A> {
    config: Config,
    api: Arc<A>,
    rng: StdRng,
}

impl<A> Poller<A>
where
    A: Api,
{
    /// Create a new [`Poller`].
    #[must_use]
    pub fn new(config: Config, api: Arc<A>, rng: StdRng) -> Self {
        Self { config, api, rng }
    }

    /// Run [`Poller`] forever.
    ///
    /// # Errors
    ///
    /// None, the function does not return. The signature matches the other
    /// stages.
    pub async fn spin(mut self) -> Result<(), Error> {
        loop {
            match self.api.list_events().await {
                Ok(events) => debug!(count = events.len(), "listed events"),
                Err(err) => warn!("Failed to list events: {err}"),
            }
            sleep(random::jitter(&mut self.rng, self.config.jitter_millis)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rand::SeedableRng;
    use tokio::sync::mpsc;

    use super::*;
    use crate::stage::{
        producer::{self, Producer},
        stub::{Call, StubApi},
    };

    #[tokio::test(start_paused = true)]
    async fn polls_until_stopped() {
        let api = Arc::new(StubApi::new());
        let poller = Poller::new(Config::default(), Arc::clone(&api), StdRng::seed_from_u64(1));

        let handle = tokio::spawn(poller.spin());
        sleep(Duration::from_secs(1)).await;

        assert!(!handle.is_finished());
        // Pauses are below 10ms, so a second holds well over 100 listings.
        assert!(api.count_list_events() > 100);
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn polling_continues_while_producer_is_stalled() {
        let api = Arc::new(StubApi::new());

        // Nothing drains the producer's queue, so it stalls after two events.
        let (snd, _rcv) = mpsc::channel(1);
        let producer = Producer::new(
            producer::Config::default(),
            50,
            Arc::clone(&api),
            StdRng::seed_from_u64(2),
            snd,
        );
        let poller = Poller::new(Config::default(), Arc::clone(&api), StdRng::seed_from_u64(1));

        let producer = tokio::spawn(producer.spin());
        let poller = tokio::spawn(poller.spin());

        sleep(Duration::from_secs(1)).await;
        let first = api.count_list_events();
        sleep(Duration::from_secs(1)).await;
        let second = api.count_list_events();

        assert_eq!(api.count(Call::CreateEvent), 2);
        assert!(first > 0);
        assert!(second > first);

        producer.abort();
        poller.abort();
    }
}
