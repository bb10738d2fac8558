//! Venue discovery and saved-venue synchronization core.
//!
//! # Overview
//! Two independent components, merged only at render time through
//! `SavedSet::contains`:
//! - `ResultSetLoader` queries the discovery endpoint for one location at a
//!   time and exposes `Idle / Loading / Loaded / Failed`.
//! - `SavedSetSynchronizer` loads a user's saved venue identifiers and runs
//!   confirmed save/unsave toggles against the remote store.
//!
//! # Design
//! - `VenueClient` is stateless: it builds `HttpRequest` values and parses
//!   `HttpResponse` values. The actual I/O goes through an injected
//!   `Transport`, so everything above it runs against scripted transports in
//!   tests.
//! - Both state machines are reducers (`QueryModel`, `SavedModel`) that can be
//!   driven without any transport at all.
//! - Navigation and sharing are host capabilities (`Navigator`, `Sharer`).

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod loader;
pub mod platform;
pub mod saved;
pub mod transport;
pub mod types;
pub mod view;

pub use client::VenueClient;
pub use config::ClientConfig;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use loader::{QueryState, ResultSetLoader, LOAD_FAILED_REASON};
pub use platform::{NavigationTarget, Navigator, NoopNavigator, ShareError, SharePayload, Sharer};
pub use saved::{SavedSet, SavedSetSynchronizer, SyncState, ToggleAction};
pub use transport::{ReqwestTransport, Transport};
pub use types::{BudgetTier, Coordinates, QueryKey, UserId, Venue, VenueId};
