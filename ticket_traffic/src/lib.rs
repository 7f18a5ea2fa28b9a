//! The ticket-traffic load generation tool.
//!
//! This library supports the ticket-traffic binary found elsewhere in this
//! project. Load is pushed into an event ticketing service by a small
//! pipeline of stages: a producer creates events, a saturator issues tickets
//! against each event until the service refuses, and a deleter removes the
//! exhausted event. A poller lists events alongside, independent of the rest.

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
#![deny(clippy::dbg_macro)]
#![deny(unused_extern_crates)]
#![deny(unused_allocation)]
#![deny(unused_assignments)]
#![deny(unused_comparisons)]
#![deny(unreachable_pub)]
#![deny(missing_docs)]
#![deny(missing_copy_implementations)]
#![deny(missing_debug_implementations)]
#![allow(clippy::multiple_crate_versions)]

pub mod client;
pub mod config;
pub mod event;
pub mod pipeline;
pub(crate) mod random;
pub mod stage;
