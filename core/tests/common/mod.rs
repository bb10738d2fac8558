//! Scripted transport and capability doubles shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::oneshot;
use venue_core::{
    ApiError, HttpMethod, HttpRequest, HttpResponse, NavigationTarget, Navigator, SavedSetSynchronizer,
    Transport, VenueClient,
};

pub const BASE_URL: &str = "http://venues.test";

type Responder = dyn Fn(&HttpRequest) -> Result<HttpResponse, ApiError> + Send + Sync;

/// Answers requests from a closure and records every request it saw.
///
/// A request whose path contains a gated fragment waits until the test
/// releases the gate, which lets tests resolve overlapping requests in a
/// chosen order.
pub struct ScriptedTransport {
    responder: Box<Responder>,
    gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
    calls: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new(responder: impl Fn(&HttpRequest) -> Result<HttpResponse, ApiError> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            responder: Box::new(responder),
            gates: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Hold the next request whose path contains `fragment` until the
    /// returned sender fires.
    pub fn gate(&self, fragment: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(fragment.to_string(), rx);
        tx
    }

    pub fn calls(&self) -> Vec<HttpRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn posts_to(&self, endpoint: &str) -> Vec<serde_json::Value> {
        self.calls()
            .into_iter()
            .filter(|r| r.method == HttpMethod::Post && r.path.ends_with(endpoint))
            .map(|r| serde_json::from_str(r.body.as_deref().unwrap()).unwrap())
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.calls.lock().unwrap().push(request.clone());
        let gate = {
            let mut gates = self.gates.lock().unwrap();
            let key = gates.keys().find(|fragment| request.path.contains(fragment.as_str())).cloned();
            key.and_then(|k| gates.remove(&k))
        };
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        (self.responder)(&request)
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    targets: Mutex<Vec<NavigationTarget>>,
}

impl RecordingNavigator {
    pub fn targets(&self) -> Vec<NavigationTarget> {
        self.targets.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, target: NavigationTarget) {
        self.targets.lock().unwrap().push(target);
    }
}

pub fn respond(status: u16, body: serde_json::Value) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse {
        status,
        headers: Vec::new(),
        body: body.to_string(),
    })
}

pub fn venue_json(id: serde_json::Value, name: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "location": {"formatted_address": format!("{name} Street")},
        "geocodes": {"main": {"latitude": 47.6, "longitude": -122.3}},
    })
}

pub fn synchronizer(
    transport: Arc<ScriptedTransport>,
    navigator: Arc<RecordingNavigator>,
) -> SavedSetSynchronizer {
    SavedSetSynchronizer::new(VenueClient::new(BASE_URL), transport, navigator)
}
