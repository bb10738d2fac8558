//! Pure helpers the rendering layer builds on.

use tracing::warn;

use crate::loader::QueryState;
use crate::platform::{NavigationTarget, Navigator, ShareError, SharePayload, Sharer};
use crate::saved::SavedSet;
use crate::types::{Coordinates, Venue};

pub const PLACEHOLDER_PHOTO_URL: &str = "https://via.placeholder.com/250x150.png?text=No+Image";
pub const SHARE_UNSUPPORTED_NOTICE: &str = "Sharing is not supported on this device.";
pub const LOADING_NOTICE: &str = "Loading...";
pub const EMPTY_RESULTS_NOTICE: &str = "No restaurants available for the selected location.";

const UNNAMED_VENUE: &str = "Unnamed restaurant";
const UNKNOWN_ADDRESS: &str = "Address unavailable";

pub fn is_saved(saved: &SavedSet, venue: &Venue) -> bool {
    saved.contains(&venue.id)
}

/// Directions to the venue in the maps application.
pub fn maps_deep_link(coords: Coordinates) -> String {
    format!(
        "https://www.google.com/maps/dir/?api=1&destination={},{}",
        coords.latitude, coords.longitude
    )
}

/// A pin on the venue, used inside shared text.
pub fn maps_search_link(coords: Coordinates) -> String {
    format!(
        "https://www.google.com/maps/search/?api=1&query={},{}",
        coords.latitude, coords.longitude
    )
}

pub fn photo_url(venue: &Venue) -> &str {
    venue.photo.as_deref().unwrap_or(PLACEHOLDER_PHOTO_URL)
}

pub fn display_name(venue: &Venue) -> &str {
    non_blank(&venue.name).unwrap_or(UNNAMED_VENUE)
}

pub fn display_address(venue: &Venue) -> &str {
    non_blank(&venue.address).unwrap_or(UNKNOWN_ADDRESS)
}

pub fn share_text(venue: &Venue) -> String {
    let name = display_name(venue);
    let address = display_address(venue);
    format!(
        "\u{1F37D} Check out \"{name}\" in \"{address}\"\n\
         \u{1F3E0} Address: {address}\n\
         \u{1F5FA} Google Maps: {}",
        maps_search_link(venue.coordinates)
    )
}

pub fn share_payload(venue: &Venue) -> SharePayload {
    SharePayload {
        title: display_name(venue).to_string(),
        text: share_text(venue),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    /// No share surface; the host shows the notice instead.
    Unsupported { notice: &'static str },
    Failed(String),
}

pub fn share_venue(sharer: &dyn Sharer, venue: &Venue) -> ShareOutcome {
    match sharer.share(&share_payload(venue)) {
        Ok(()) => ShareOutcome::Shared,
        Err(ShareError::Unsupported) => ShareOutcome::Unsupported {
            notice: SHARE_UNSUPPORTED_NOTICE,
        },
        Err(ShareError::Failed(reason)) => {
            warn!(venue = %venue.id, %reason, "share failed");
            ShareOutcome::Failed(reason)
        }
    }
}

pub fn open_directions(navigator: &dyn Navigator, venue: &Venue) {
    navigator.navigate(NavigationTarget::External(maps_deep_link(venue.coordinates)));
}

/// Status line for the result list, if any.
pub fn query_notice(state: &QueryState) -> Option<&str> {
    match state {
        QueryState::Idle => None,
        QueryState::Loading => Some(LOADING_NOTICE),
        QueryState::Loaded(venues) if venues.is_empty() => Some(EMPTY_RESULTS_NOTICE),
        QueryState::Loaded(_) => None,
        QueryState::Failed(reason) => Some(reason),
    }
}

fn non_blank(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
