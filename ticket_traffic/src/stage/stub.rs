//! A recording [`Api`] for stage tests.

use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicI32, Ordering},
    },
};

use async_trait::async_trait;
use http::StatusCode;

use crate::{
    client::{Api, Error},
    event::{Event, EventId, Ticket},
};

/// A call made against [`StubApi`], in the order made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Call {
    ListEvents,
    CreateEvent,
    CreateTicket(EventId),
    TicketIssued(EventId),
    DeleteEvent(EventId),
}

/// Issues tickets against each event until its capacity is used, then
/// refuses. Failure modes are switched on by the builder methods.
#[derive(Debug)]
pub(crate) struct StubApi {
    calls: Mutex<Vec<Call>>,
    capacities: Mutex<HashMap<EventId, i32>>,
    issued: Mutex<HashMap<EventId, i32>>,
    next_id: AtomicI32,
    fail_creation: bool,
    fail_deletion: bool,
    break_tickets: bool,
}

fn broken() -> Error {
    let source = serde_json::from_str::<Ticket>("{").expect_err("input is malformed");
    Error::Decode {
        uri: "stub".to_string(),
        source,
    }
}

impl StubApi {
    pub(crate) fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            capacities: Mutex::new(HashMap::new()),
            issued: Mutex::new(HashMap::new()),
            next_id: AtomicI32::new(1),
            fail_creation: false,
            fail_deletion: false,
            break_tickets: false,
        }
    }

    /// Register an event the stub did not create itself.
    pub(crate) fn with_event(self, id: EventId, capacity: i32) -> Self {
        self.capacities
            .lock()
            .expect("lock poisoned")
            .insert(id, capacity);
        self
    }

    pub(crate) fn failing_creation(mut self) -> Self {
        self.fail_creation = true;
        self
    }

    pub(crate) fn failing_deletion(mut self) -> Self {
        self.fail_deletion = true;
        self
    }

    /// Ticket requests fail without the service answering.
    pub(crate) fn broken_tickets(mut self) -> Self {
        self.break_tickets = true;
        self
    }

    fn record(&self, call: Call) {
        self.calls.lock().expect("lock poisoned").push(call);
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("lock poisoned").clone()
    }

    pub(crate) fn count(&self, call: Call) -> usize {
        self.calls().into_iter().filter(|c| *c == call).count()
    }

    pub(crate) fn count_list_events(&self) -> usize {
        self.count(Call::ListEvents)
    }
}

#[async_trait]
impl Api for StubApi {
    async fn list_events(&self) -> Result<Vec<Event>, Error> {
        self.record(Call::ListEvents);
        Ok(Vec::new())
    }

    async fn create_event(&self, name: &str, capacity: i32) -> Result<Event, Error> {
        self.record(Call::CreateEvent);
        if self.fail_creation {
            return Err(broken());
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.capacities
            .lock()
            .expect("lock poisoned")
            .insert(id, capacity);
        Ok(Event {
            id,
            name: name.to_string(),
            capacity,
            tickets: Vec::new(),
        })
    }

    async fn delete_event(&self, id: EventId) -> Result<StatusCode, Error> {
        self.record(Call::DeleteEvent(id));
        if self.fail_deletion {
            return Err(broken());
        }
        Ok(StatusCode::NO_CONTENT)
    }

    async fn create_ticket(&self, event_id: EventId, name: &str) -> Result<Ticket, Error> {
        self.record(Call::CreateTicket(event_id));
        if self.break_tickets {
            return Err(broken());
        }
        let capacity = self
            .capacities
            .lock()
            .expect("lock poisoned")
            .get(&event_id)
            .copied()
            .unwrap_or(0);
        let mut issued = self.issued.lock().expect("lock poisoned");
        let count = issued.entry(event_id).or_insert(0);
        if *count >= capacity {
            return Err(Error::Refused {
                uri: format!("/events/{event_id}/ticket"),
                status: StatusCode::BAD_REQUEST,
            });
        }
        *count += 1;
        drop(issued);
        self.record(Call::TicketIssued(event_id));
        Ok(Ticket {
            event_id,
            name: name.to_string(),
        })
    }
}
