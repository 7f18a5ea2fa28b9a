//! Wiring of the stages.
//!
//! [`Pipeline::run`] connects producer, saturator and deleter with two
//! queues of capacity one, starts the poller next to them and runs until the
//! producer gives up or a spawned stage fails. The producer runs on the
//! caller's task; the other stages are spawned.

use std::sync::Arc;

use tokio::{sync::mpsc, task::JoinSet};
use tracing::{debug, error, info};

use crate::{
    client::Api,
    config::Config,
    random,
    stage::{
        self,
        deleter::Deleter,
        poller::Poller,
        producer::Producer,
        saturator::Saturator,
    },
};

/// Capacity of each hand-off queue. At most one event waits at any hand-off.
const QUEUE_CAPACITY: usize = 1;

#[derive(thiserror::Error, Debug)]
/// Errors produced by [`Pipeline`].
pub enum Error {
    /// See [`crate::stage::Error`] for details.
    #[error(transparent)]
    Stage(#[from] stage::Error),
    /// A spawned stage panicked or was cancelled.
    #[error("Could not join a spawned stage: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Debug)]
/// The assembled load pipeline.
pub struct Pipeline<A> {
    config: Config,
    api: Arc<A>,
}

impl<A> Pipeline<A>
where
    A: Api + 'static,
{
    /// Create a new [`Pipeline`] speaking to the service through `api`.
    #[must_use]
    pub fn new(config: Config, api: A) -> Self {
        Self {
            config,
            api: Arc::new(api),
        }
    }

    /// Run the [`Pipeline`].
    ///
    /// Under normal operation this function does not return.
    ///
    /// # Errors
    ///
    /// Function will return an error if the producer aborts on a failed event
    /// creation, or if any stage fails or panics.
    pub async fn run(self) -> Result<(), Error> {
        let Self { config, api } = self;
        let mut rng = random::root(config.seed);

        let (event_snd, event_rcv) = mpsc::channel(QUEUE_CAPACITY);
        let (exhausted_snd, exhausted_rcv) = mpsc::channel(QUEUE_CAPACITY);

        let mut stages = JoinSet::new();
        stages.spawn(Deleter::new(Arc::clone(&api), exhausted_rcv).spin());
        stages.spawn(
            Saturator::new(
                config.saturator,
                config.maximum_name_length,
                Arc::clone(&api),
                random::fork(&mut rng),
                event_rcv,
                exhausted_snd,
            )
            .spin(),
        );
        stages.spawn(Poller::new(config.poller, Arc::clone(&api), random::fork(&mut rng)).spin());

        let producer = Producer::new(
            config.producer,
            config.maximum_name_length,
            api,
            random::fork(&mut rng),
            event_snd,
        )
        .spin();
        tokio::pin!(producer);

        info!(target_uri = %config.target_uri, "pipeline running");
        loop {
            tokio::select! {
                res = &mut producer => {
                    return res.map_err(Error::from);
                }
                Some(res) = stages.join_next() => {
                    match res {
                        Ok(Ok(())) => debug!("stage shut down"),
                        Ok(Err(err)) => {
                            error!("Stage shut down unexpectedly: {err}");
                            return Err(Error::Stage(err));
                        }
                        Err(err) => {
                            error!("Could not join the spawned stage: {err}");
                            return Err(Error::Join(err));
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rand::{SeedableRng, rngs::StdRng};
    use tokio::time::sleep;

    use super::*;
    use crate::{
        event::Event,
        stage::{
            producer, saturator,
            stub::{Call, StubApi},
        },
    };

    #[tokio::test(start_paused = true)]
    async fn creation_failure_ends_pipeline() {
        let pipeline = Pipeline::new(Config::default(), StubApi::new().failing_creation());

        let result = pipeline.run().await;

        assert!(matches!(
            result,
            Err(Error::Stage(stage::Error::CreateEvent(_)))
        ));
    }

    #[tokio::test]
    async fn saturated_event_is_deleted_after_its_tickets() {
        let api = Arc::new(StubApi::new().with_event(1, 2));
        let (event_snd, event_rcv) = mpsc::channel(QUEUE_CAPACITY);
        let (exhausted_snd, exhausted_rcv) = mpsc::channel(QUEUE_CAPACITY);

        let saturator = tokio::spawn(
            Saturator::new(
                saturator::Config::default(),
                50,
                Arc::clone(&api),
                StdRng::seed_from_u64(5),
                event_rcv,
                exhausted_snd,
            )
            .spin(),
        );
        let deleter = tokio::spawn(Deleter::new(Arc::clone(&api), exhausted_rcv).spin());

        event_snd
            .send(Event {
                id: 1,
                name: "gala".to_string(),
                capacity: 2,
                tickets: Vec::new(),
            })
            .await
            .expect("saturator stopped");
        drop(event_snd);

        saturator
            .await
            .expect("saturator panicked")
            .expect("saturator failed");
        deleter
            .await
            .expect("deleter panicked")
            .expect("deleter failed");

        let observed: Vec<Call> = api
            .calls()
            .into_iter()
            .filter(|call| matches!(call, Call::TicketIssued(_) | Call::DeleteEvent(_)))
            .collect();
        assert_eq!(
            observed,
            vec![
                Call::TicketIssued(1),
                Call::TicketIssued(1),
                Call::DeleteEvent(1)
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn every_created_event_is_deleted_once_in_order() {
        let api = Arc::new(StubApi::new());
        let config = Config {
            seed: Some([9; 32]),
            producer: producer::Config {
                maximum_capacity: 8,
                ..producer::Config::default()
            },
            ..Config::default()
        };
        let pipeline = Pipeline {
            config,
            api: Arc::clone(&api),
        };

        let handle = tokio::spawn(pipeline.run());
        sleep(Duration::from_secs(2)).await;
        handle.abort();

        let calls = api.calls();
        let created = calls.iter().filter(|c| **c == Call::CreateEvent).count();
        let deleted: Vec<i32> = calls
            .iter()
            .filter_map(|call| match call {
                Call::DeleteEvent(id) => Some(*id),
                _ => None,
            })
            .collect();

        assert!(!deleted.is_empty());
        // Stub identifiers count up from one in creation order.
        let expected: Vec<i32> = (1..=i32::try_from(deleted.len()).expect("too many")).collect();
        assert_eq!(deleted, expected);
        // At most one event waits at each queue, one is being saturated and
        // one is being created.
        assert!(created - deleted.len() <= 4);
        assert!(api.count_list_events() > 0);
    }
}
