//! Saved-Set Synchronizer: per-user saved venues kept in step with the
//! remote store.
//!
//! # Design
//! `SavedModel` is the reducer for the `Unauthenticated / Loading / Ready`
//! machine plus the set of venues with a toggle in flight. Every identity
//! change starts a new session number; saved-set loads and toggle writes
//! carry the session they were issued under, and completions from an older
//! session are discarded, so switching users can never leak the previous
//! user's identifiers.
//!
//! The saved set is published as an `Arc<SavedSet>` snapshot and replaced
//! wholesale, never mutated behind a reader's back. Membership only changes
//! when the remote store has confirmed a write; a failed write changes
//! nothing. A second toggle on a venue whose first toggle is unresolved is
//! rejected with `Conflict` rather than queued.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::client::VenueClient;
use crate::error::ApiError;
use crate::platform::{NavigationTarget, Navigator};
use crate::transport::Transport;
use crate::types::{UserId, Venue, VenueId};

/// Canonical identifiers of the venues one user has saved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SavedSet(HashSet<VenueId>);

impl SavedSet {
    pub fn contains(&self, id: &VenueId) -> bool {
        self.0.contains(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VenueId> {
        self.0.iter()
    }

    fn with(&self, id: VenueId) -> Self {
        let mut next = self.0.clone();
        next.insert(id);
        SavedSet(next)
    }

    fn without(&self, id: &VenueId) -> Self {
        let mut next = self.0.clone();
        next.remove(id);
        SavedSet(next)
    }
}

impl FromIterator<VenueId> for SavedSet {
    fn from_iter<I: IntoIterator<Item = VenueId>>(iter: I) -> Self {
        SavedSet(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SyncState {
    #[default]
    Unauthenticated,
    Loading {
        user: UserId,
    },
    Ready {
        user: UserId,
        saved: Arc<SavedSet>,
    },
}

impl SyncState {
    pub fn user(&self) -> Option<&UserId> {
        match self {
            SyncState::Unauthenticated => None,
            SyncState::Loading { user } | SyncState::Ready { user, .. } => Some(user),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleAction {
    Save,
    Unsave,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// The host supplied an identity (or signed out).
    IdentityChanged(Option<UserId>),
    /// The saved-set fetch for `session` finished; `None` means it failed.
    LoadResolved {
        session: u64,
        ids: Option<Vec<VenueId>>,
    },
    ToggleRequested(VenueId),
    ToggleResolved {
        session: u64,
        venue_id: VenueId,
        action: ToggleAction,
        confirmed: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncEffect {
    Idle,
    FetchSaved { user: UserId, session: u64 },
    Write { user: UserId, session: u64, action: ToggleAction },
    Committed,
    /// A failed write was cleared without touching membership.
    RolledBack,
    /// The completion belonged to an earlier session.
    Discarded,
}

#[derive(Debug, Default)]
pub struct SavedModel {
    state: SyncState,
    session: u64,
    pending: HashSet<VenueId>,
    /// The last fetch failed and `Ready` holds a stand-in empty set.
    degraded: bool,
}

impl SavedModel {
    pub fn state(&self) -> &SyncState {
        &self.state
    }

    pub fn is_pending(&self, id: &VenueId) -> bool {
        self.pending.contains(id)
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// The current snapshot; empty unless `Ready`.
    pub fn saved(&self) -> Arc<SavedSet> {
        match &self.state {
            SyncState::Ready { saved, .. } => Arc::clone(saved),
            _ => Arc::default(),
        }
    }

    pub fn apply(&mut self, event: SyncEvent) -> Result<SyncEffect, ApiError> {
        match event {
            SyncEvent::IdentityChanged(identity) => Ok(self.change_identity(identity)),
            SyncEvent::LoadResolved { session, ids } => Ok(self.resolve_load(session, ids)),
            SyncEvent::ToggleRequested(venue_id) => self
                .begin_toggle(venue_id)
                .map(|(user, session, action)| SyncEffect::Write { user, session, action }),
            SyncEvent::ToggleResolved {
                session,
                venue_id,
                action,
                confirmed,
            } => Ok(self.resolve_toggle(session, venue_id, action, confirmed)),
        }
    }

    /// The current identity is refetched only when its last load failed.
    fn change_identity(&mut self, identity: Option<UserId>) -> SyncEffect {
        if identity.as_ref() == self.state.user() && !self.degraded {
            return SyncEffect::Idle;
        }
        self.session += 1;
        self.pending.clear();
        self.degraded = false;
        match identity {
            None => {
                self.state = SyncState::Unauthenticated;
                SyncEffect::Idle
            }
            Some(user) => {
                self.state = SyncState::Loading { user: user.clone() };
                SyncEffect::FetchSaved {
                    user,
                    session: self.session,
                }
            }
        }
    }

    fn resolve_load(&mut self, session: u64, ids: Option<Vec<VenueId>>) -> SyncEffect {
        let SyncState::Loading { user } = &self.state else {
            return SyncEffect::Discarded;
        };
        if session != self.session {
            return SyncEffect::Discarded;
        }
        let user = user.clone();
        self.degraded = ids.is_none();
        let saved: SavedSet = ids.unwrap_or_default().into_iter().collect();
        self.state = SyncState::Ready {
            user,
            saved: Arc::new(saved),
        };
        SyncEffect::Committed
    }

    /// Marks `venue_id` pending and returns who writes it, under which session,
    /// and whether the write saves or unsaves.
    pub fn begin_toggle(&mut self, venue_id: VenueId) -> Result<(UserId, u64, ToggleAction), ApiError> {
        let (user, saved) = match &self.state {
            SyncState::Unauthenticated => return Err(ApiError::Unauthorized),
            SyncState::Loading { .. } => return Err(ApiError::Conflict(venue_id)),
            SyncState::Ready { user, saved } => (user.clone(), saved),
        };
        let action = if saved.contains(&venue_id) {
            ToggleAction::Unsave
        } else {
            ToggleAction::Save
        };
        if !self.pending.insert(venue_id.clone()) {
            return Err(ApiError::Conflict(venue_id));
        }
        Ok((user, self.session, action))
    }

    fn resolve_toggle(
        &mut self,
        session: u64,
        venue_id: VenueId,
        action: ToggleAction,
        confirmed: bool,
    ) -> SyncEffect {
        if session != self.session {
            return SyncEffect::Discarded;
        }
        let SyncState::Ready { saved, .. } = &mut self.state else {
            return SyncEffect::Discarded;
        };
        self.pending.remove(&venue_id);
        if !confirmed {
            return SyncEffect::RolledBack;
        }
        let next = match action {
            ToggleAction::Save => saved.with(venue_id),
            ToggleAction::Unsave => saved.without(&venue_id),
        };
        *saved = Arc::new(next);
        SyncEffect::Committed
    }
}

pub struct SavedSetSynchronizer {
    client: VenueClient,
    transport: Arc<dyn Transport>,
    navigator: Arc<dyn Navigator>,
    model: Mutex<SavedModel>,
}

impl SavedSetSynchronizer {
    pub fn new(client: VenueClient, transport: Arc<dyn Transport>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            client,
            transport,
            navigator,
            model: Mutex::new(SavedModel::default()),
        }
    }

    pub fn state(&self) -> SyncState {
        self.model().state().clone()
    }

    /// Immutable snapshot for one render.
    pub fn saved(&self) -> Arc<SavedSet> {
        self.model().saved()
    }

    pub fn is_saved(&self, venue: &Venue) -> bool {
        self.saved().contains(&venue.id)
    }

    /// Switches to `identity` and loads its saved set. An absent identity
    /// leaves the synchronizer `Unauthenticated` with an empty set; a failed
    /// fetch degrades to `Ready` with an empty set. Re-supplying the current
    /// identity is a no-op unless its last fetch failed, in which case it is
    /// fetched again.
    pub async fn load_saved(&self, identity: Option<UserId>) -> SyncState {
        let effect = self.apply(SyncEvent::IdentityChanged(identity));
        let Ok(SyncEffect::FetchSaved { user, session }) = effect else {
            return self.state();
        };

        debug!(user = %user, session, "loading saved venues");
        let ids = match self.fetch_saved(&user).await {
            Ok(ids) => Some(ids),
            Err(err) => {
                warn!(user = %user, error = %err, "saved venues unavailable, continuing with none");
                None
            }
        };

        match self.apply(SyncEvent::LoadResolved { session, ids }) {
            Ok(SyncEffect::Committed) => info!(user = %user, count = self.saved().len(), "saved venues ready"),
            _ => debug!(user = %user, session, "discarding saved venues for superseded identity"),
        }
        self.state()
    }

    /// Saves the venue if it is not saved, unsaves it otherwise, and returns
    /// the action the remote store confirmed.
    ///
    /// Without an identity this fails with `Unauthorized`, signals the sign-in
    /// flow and sends nothing. While the saved set is loading, or while an
    /// earlier toggle on the same venue is unresolved, it fails with
    /// `Conflict`. Remote failures are returned and leave membership as it was.
    pub async fn toggle_saved(&self, venue: &Venue) -> Result<ToggleAction, ApiError> {
        let begun = self.model().begin_toggle(venue.id.clone());
        let (user, session, action) = match begun {
            Ok(begun) => begun,
            Err(err) => {
                if err.requires_sign_in() {
                    debug!(venue = %venue.id, "toggle without identity, requesting sign-in");
                    self.navigator.navigate(NavigationTarget::SignIn);
                } else {
                    debug!(venue = %venue.id, error = %err, "toggle rejected");
                }
                return Err(err);
            }
        };

        debug!(user = %user, venue = %venue.id, ?action, "writing saved state");
        let result = self.write(&user, venue, action).await;

        let resolved = self.apply(SyncEvent::ToggleResolved {
            session,
            venue_id: venue.id.clone(),
            action,
            confirmed: result.is_ok(),
        });
        match (&result, resolved) {
            (Ok(()), Ok(SyncEffect::Committed)) => info!(user = %user, venue = %venue.id, ?action, "saved state updated"),
            (Err(err), _) => warn!(user = %user, venue = %venue.id, ?action, error = %err, "saved state unchanged"),
            _ => debug!(user = %user, venue = %venue.id, "toggle finished after identity changed"),
        }
        result.map(|()| action)
    }

    async fn fetch_saved(&self, user: &UserId) -> Result<Vec<VenueId>, ApiError> {
        let request = self.client.build_list_saved(user)?;
        let response = self.transport.execute(request).await?;
        self.client.parse_list_saved(response)
    }

    async fn write(&self, user: &UserId, venue: &Venue, action: ToggleAction) -> Result<(), ApiError> {
        let request = match action {
            ToggleAction::Save => self.client.build_save_venue(user, venue)?,
            ToggleAction::Unsave => self.client.build_delete_venue(user, &venue.id)?,
        };
        let response = self.transport.execute(request).await?;
        match action {
            ToggleAction::Save => self.client.parse_save_venue(response),
            ToggleAction::Unsave => self.client.parse_delete_venue(response),
        }
    }

    fn apply(&self, event: SyncEvent) -> Result<SyncEffect, ApiError> {
        self.model().apply(event)
    }

    fn model(&self) -> MutexGuard<'_, SavedModel> {
        self.model.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
