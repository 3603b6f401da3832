//! Request lifecycle tracking
//!
//! Each generator owns one [`Stage`], which pairs the visible
//! [`Lifecycle`] state with the ticket of the request currently in flight.
//! A stage refuses to start a second request while one is loading, and
//! completions carrying an outdated ticket are dropped.

use crate::{Error, Result};

/// Tagged status of one asynchronous remote call.
#[derive(Debug)]
pub enum Lifecycle<T> {
    Idle,
    Loading,
    Success(T),
    Error(Error),
}

impl<T> Default for Lifecycle<T> {
    fn default() -> Self {
        Lifecycle::Idle
    }
}

impl<T> Lifecycle<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, Lifecycle::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Lifecycle::Loading)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Lifecycle::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Lifecycle::Error(_))
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            Lifecycle::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&Error> {
        match self {
            Lifecycle::Error(err) => Some(err),
            _ => None,
        }
    }
}

/// Identifies one issued request so its completion can be matched up later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Lifecycle state plus the in-flight guard for one generator.
#[derive(Debug)]
pub struct Stage<T> {
    name: &'static str,
    state: Lifecycle<T>,
    in_flight: Option<Ticket>,
    issued: u64,
}

impl<T> Stage<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: Lifecycle::Idle,
            in_flight: None,
            issued: 0,
        }
    }

    pub fn state(&self) -> &Lifecycle<T> {
        &self.state
    }

    pub fn in_flight(&self) -> Option<Ticket> {
        self.in_flight
    }

    /// Enter Loading and hand out a fresh ticket, or `None` if a request is
    /// already in flight.
    pub fn begin(&mut self) -> Option<Ticket> {
        if let Some(ticket) = self.in_flight {
            tracing::warn!(
                "[{}] request {} still in flight; ignoring new request",
                self.name,
                ticket.id()
            );
            return None;
        }

        self.issued += 1;
        let ticket = Ticket(self.issued);
        self.in_flight = Some(ticket);
        self.state = Lifecycle::Loading;
        tracing::debug!("[{}] request {} started", self.name, ticket.id());
        Some(ticket)
    }

    /// Apply a completion. Returns `false` when the ticket is stale and the
    /// outcome was discarded.
    pub fn finish(&mut self, ticket: Ticket, outcome: Result<T>) -> bool {
        if self.in_flight != Some(ticket) {
            tracing::debug!(
                "[{}] dropping stale completion for request {}",
                self.name,
                ticket.id()
            );
            return false;
        }

        self.in_flight = None;
        self.state = match outcome {
            Ok(value) => {
                tracing::info!("[{}] request {} succeeded", self.name, ticket.id());
                Lifecycle::Success(value)
            }
            Err(err) => {
                tracing::error!("[{}] request {} failed: {}", self.name, ticket.id(), err);
                Lifecycle::Error(err)
            }
        };
        true
    }

    /// Back to Idle; any in-flight completion becomes stale.
    pub fn reset(&mut self) {
        self.in_flight = None;
        self.state = Lifecycle::Idle;
    }
}
