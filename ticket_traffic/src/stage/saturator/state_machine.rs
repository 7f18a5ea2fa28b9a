//! Pure state machine for ticket saturation of a single event

/// The state of the saturator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// No event held, waiting on the input queue
    Idle,
    /// An event is held and a ticket request is outstanding or about to be
    AwaitingTicket,
    /// The service stopped issuing tickets, event must be forwarded
    Exhausted,
}

/// Operations the state machine can request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Operation {
    /// Request another ticket for the held event
    RequestTicket,
    /// Hand the held event to the deleter
    Forward,
    /// Wait for the next event
    Wait,
}

/// Inputs that drive the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// An event was taken off the input queue.
    Received,
    /// The service issued a ticket.
    TicketCreated,
    /// Ticket creation failed, by refusal or otherwise.
    TicketFailed,
    /// The held event was handed to the deleter.
    Forwarded,
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
/// Errors produced by [`StateMachine`]
pub enum Error {
    /// Transition is not valid
    #[error("Invalid transition from {from:?} via {via:?}")]
    InvalidTransition {
        /// State the machine was in
        from: State,
        /// Input that was rejected
        via: Input,
    },
}

/// State machine for the saturator
///
/// Holds the transition logic without IO, leaving `super::Saturator` to deal
/// with the queues and the service. The saturator follows the output of
/// `next` without consideration. Note there is no bound on the number of
/// `TicketCreated` inputs while a ticket is awaited; only the service ends the
/// loop.
#[derive(Debug, Clone, Copy)]
pub(super) struct StateMachine {
    state: State,
}

impl StateMachine {
    pub(super) fn new() -> Self {
        Self { state: State::Idle }
    }

    #[cfg(test)]
    pub(super) fn state(&self) -> State {
        self.state
    }

    /// Process an input and return the next operation
    ///
    /// # Errors
    ///
    /// Function will error with `InvalidTransition` if `input` is not valid
    /// for the present state.
    pub(super) fn next(&mut self, input: Input) -> Result<Operation, Error> {
        let (next_state, operation) = match (self.state, input) {
            (State::Idle, Input::Received) | (State::AwaitingTicket, Input::TicketCreated) => {
                (State::AwaitingTicket, Operation::RequestTicket)
            }
            (State::AwaitingTicket, Input::TicketFailed) => (State::Exhausted, Operation::Forward),
            (State::Exhausted, Input::Forwarded) => (State::Idle, Operation::Wait),
            (from, via) => return Err(Error::InvalidTransition { from, via }),
        };

        self.state = next_state;
        Ok(operation)
    }
}
