//! Stateless request builder and response parser for the venue APIs.
//!
//! # Design
//! `VenueClient` holds only a `base_url`. Each endpoint is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method that
//! consumes an `HttpResponse`; the loader and synchronizer run the round-trip
//! through an injected `Transport` in between.

use url::{form_urlencoded, Url};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{DeleteVenue, QueryKey, SaveVenue, SavedRecord, UserId, Venue, VenueId};

#[derive(Debug, Clone)]
pub struct VenueClient {
    base_url: String,
}

impl VenueClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /restaurants?location=..&budget=..`
    pub fn build_search_venues(&self, key: &QueryKey) -> HttpRequest {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("location", key.location())
            .append_pair("budget", &key.budget().to_string())
            .finish();
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/restaurants?{query}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    /// `GET /saved-restaurants/:user`
    ///
    /// The user is pushed as a single percent-encoded path segment, so a
    /// space is `%20` and a `/` cannot split it.
    pub fn build_list_saved(&self, user: &UserId) -> Result<HttpRequest, ApiError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| ApiError::Config {
            key: "base_url",
            message: e.to_string(),
        })?;
        url.path_segments_mut()
            .map_err(|()| ApiError::Config {
                key: "base_url",
                message: format!("{} cannot carry a path", self.base_url),
            })?
            .pop_if_empty()
            .push("saved-restaurants")
            .push(user.as_str());
        Ok(HttpRequest {
            method: HttpMethod::Get,
            path: url.into(),
            headers: Vec::new(),
            body: None,
        })
    }

    /// `POST /save-restaurant` carrying a snapshot of the venue.
    pub fn build_save_venue(&self, user: &UserId, venue: &Venue) -> Result<HttpRequest, ApiError> {
        self.json_post("save-restaurant", &SaveVenue::new(user, venue))
    }

    /// `POST /delete-restaurant`
    pub fn build_delete_venue(&self, user: &UserId, venue_id: &VenueId) -> Result<HttpRequest, ApiError> {
        let body = DeleteVenue {
            user_id: user,
            venue_id,
        };
        self.json_post("delete-restaurant", &body)
    }

    pub fn parse_search_venues(&self, response: HttpResponse) -> Result<Vec<Venue>, ApiError> {
        check_status(&response)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::MalformedResponse(e.to_string()))
    }

    /// Returns the saved identifiers in the order the store listed them.
    pub fn parse_list_saved(&self, response: HttpResponse) -> Result<Vec<VenueId>, ApiError> {
        check_status(&response)?;
        let records: Vec<SavedRecord> =
            serde_json::from_str(&response.body).map_err(|e| ApiError::MalformedResponse(e.to_string()))?;
        Ok(records.into_iter().map(|r| r.restaurant_id).collect())
    }

    pub fn parse_save_venue(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    pub fn parse_delete_venue(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    fn json_post<T: serde::Serialize>(&self, endpoint: &str, body: &T) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(body).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/{endpoint}", self.base_url),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }
}

/// Any 2xx is success; everything else is a rejection carrying the raw body.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::RemoteRejection {
        status: response.status,
        body: response.body.clone(),
    })
}
