//! HTTP requests and responses as plain data.
//!
//! # Design
//! `VenueClient` builds `HttpRequest` values and parses `HttpResponse` values
//! without touching the network. Whoever executes the round-trip (a
//! `Transport`, or a host doing its own I/O) sits between the two halves,
//! which keeps request construction and response interpretation deterministic
//! and testable on their own.

/// HTTP method for a request. The venue APIs only use these two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// An HTTP request described as plain data. `path` is the absolute URL,
/// query string included.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
