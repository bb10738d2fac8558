//! ResultSet Loader: one location-scoped venue query at a time.
//!
//! # Design
//! `QueryModel` is a plain reducer over `QueryEvent`s and owns the
//! `Idle / Loading / Loaded / Failed` machine. `ResultSetLoader` drives it
//! around the network round-trip: it applies `Requested`, awaits the
//! transport with the model unlocked, then applies `Resolved`. A resolution is
//! committed only if its `(key, ticket)` still matches the request in flight,
//! so a response for a superseded query can never overwrite newer state.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::client::VenueClient;
use crate::transport::Transport;
use crate::types::{BudgetTier, QueryKey, Venue};

/// User-facing reason stored in `QueryState::Failed`.
pub const LOAD_FAILED_REASON: &str = "Failed to load restaurants.";

#[derive(Debug, Clone, Default, PartialEq)]
pub enum QueryState {
    #[default]
    Idle,
    Loading,
    /// Venues in the order the discovery endpoint returned them.
    Loaded(Vec<Venue>),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryEvent {
    Requested(QueryKey),
    Resolved {
        key: QueryKey,
        ticket: u64,
        outcome: Result<Vec<Venue>, String>,
    },
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryTransition {
    /// Issue a request for the key, tagging its resolution with this ticket.
    Issue(u64),
    /// The same key is already in flight; nothing to send.
    AlreadyInFlight,
    Committed,
    /// The resolution belonged to a superseded request and was dropped.
    Stale,
}

#[derive(Debug, Default)]
pub struct QueryModel {
    state: QueryState,
    in_flight: Option<(QueryKey, u64)>,
    next_ticket: u64,
}

impl QueryModel {
    pub fn state(&self) -> &QueryState {
        &self.state
    }

    pub fn in_flight(&self) -> Option<&QueryKey> {
        self.in_flight.as_ref().map(|(key, _)| key)
    }

    pub fn apply(&mut self, event: QueryEvent) -> QueryTransition {
        match event {
            QueryEvent::Requested(key) => {
                if self.in_flight() == Some(&key) {
                    return QueryTransition::AlreadyInFlight;
                }
                self.next_ticket += 1;
                let ticket = self.next_ticket;
                self.in_flight = Some((key, ticket));
                self.state = QueryState::Loading;
                QueryTransition::Issue(ticket)
            }
            QueryEvent::Resolved { key, ticket, outcome } => {
                match &self.in_flight {
                    Some((current, current_ticket)) if *current == key && *current_ticket == ticket => {}
                    _ => return QueryTransition::Stale,
                }
                self.in_flight = None;
                self.state = match outcome {
                    Ok(venues) => QueryState::Loaded(venues),
                    Err(reason) => QueryState::Failed(reason),
                };
                QueryTransition::Committed
            }
            QueryEvent::Reset => {
                self.in_flight = None;
                self.state = QueryState::Idle;
                QueryTransition::Committed
            }
        }
    }
}

pub struct ResultSetLoader {
    client: VenueClient,
    transport: Arc<dyn Transport>,
    model: Mutex<QueryModel>,
}

impl ResultSetLoader {
    pub fn new(client: VenueClient, transport: Arc<dyn Transport>) -> Self {
        Self {
            client,
            transport,
            model: Mutex::new(QueryModel::default()),
        }
    }

    pub fn state(&self) -> QueryState {
        self.model().state().clone()
    }

    /// Back to `Idle`; any in-flight response will be discarded.
    pub fn reset(&self) {
        self.model().apply(QueryEvent::Reset);
    }

    /// Loads venues for `location`, returning the state visible once this
    /// call settles. A blank location is a no-op. If a newer query
    /// superseded this one, the returned state is the newer query's.
    pub async fn load(&self, location: &str, budget: BudgetTier) -> QueryState {
        let Some(key) = QueryKey::new(location, budget) else {
            debug!("blank location, not querying");
            return self.state();
        };

        let transition = self.model().apply(QueryEvent::Requested(key.clone()));
        let QueryTransition::Issue(ticket) = transition else {
            debug!(location = key.location(), budget = %key.budget(), "query already in flight");
            return self.state();
        };

        debug!(location = key.location(), budget = %key.budget(), ticket, "loading venues");
        let request = self.client.build_search_venues(&key);
        let outcome = match self.transport.execute(request).await {
            Ok(response) => self.client.parse_search_venues(response),
            Err(err) => Err(err),
        };
        let outcome = outcome.map_err(|err| {
            warn!(location = key.location(), error = %err, "venue search failed");
            LOAD_FAILED_REASON.to_string()
        });
        let count = outcome.as_ref().map(Vec::len).ok();

        let location = key.location().to_string();
        let transition = self.model().apply(QueryEvent::Resolved { key, ticket, outcome });
        match transition {
            QueryTransition::Committed => info!(location = %location, ?count, "venue query settled"),
            _ => debug!(location = %location, ticket, "discarding response for superseded query"),
        }
        self.state()
    }

    fn model(&self) -> MutexGuard<'_, QueryModel> {
        self.model.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
