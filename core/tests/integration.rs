//! End-to-end runs against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port per test. The async tests drive
//! the loader and synchronizer through `ReqwestTransport`; the sync test
//! plays the host itself, executing the client's built requests with ureq.

use std::net::SocketAddr;
use std::sync::Arc;

use mock_server::{restaurant, Restaurant, Store};
use venue_core::{
    ApiError, BudgetTier, ClientConfig, HttpMethod, HttpRequest, HttpResponse, NoopNavigator, QueryKey, QueryState,
    ReqwestTransport, ResultSetLoader, SavedSetSynchronizer, SyncState, ToggleAction, UserId, VenueClient, VenueId,
};

fn seattle_store() -> Store {
    Store::default().with_restaurants(
        "Seattle",
        vec![
            restaurant("A", "Pike Place Chowder", "1530 Post Alley, Seattle", 47.6097, -122.3422),
            restaurant("1042", "Tilikum Place Cafe", "407 Cedar St, Seattle", 47.6178, -122.3474),
        ],
    )
}

/// Serve `store` on a random port from a dedicated thread.
fn start_server(store: Store) -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::serve(listener, store).await
        })
        .unwrap();
    });

    addr
}

fn config_for(addr: SocketAddr) -> ClientConfig {
    ClientConfig {
        base_url: format!("http://{addr}"),
        ..ClientConfig::default()
    }
}

fn components(addr: SocketAddr) -> (ResultSetLoader, SavedSetSynchronizer) {
    components_with(&config_for(addr))
}

fn components_with(config: &ClientConfig) -> (ResultSetLoader, SavedSetSynchronizer) {
    let client = VenueClient::new(&config.base_url);
    let transport = Arc::new(ReqwestTransport::new(config).unwrap());
    let loader = ResultSetLoader::new(client.clone(), transport.clone());
    let sync = SavedSetSynchronizer::new(client, transport, Arc::new(NoopNavigator));
    (loader, sync)
}

#[tokio::test]
async fn discover_and_toggle_over_http() {
    let addr = start_server(seattle_store().with_saved("u1", &["A"]));
    let (loader, sync) = components(addr);

    let QueryState::Loaded(venues) = loader.load("Seattle", BudgetTier::default()).await else {
        panic!("expected venues, got {:?}", loader.state());
    };
    assert_eq!(venues.len(), 2);
    assert_eq!(venues[0].id, VenueId::from("A"));

    sync.load_saved(UserId::new("u1")).await;
    assert!(sync.is_saved(&venues[0]));
    assert!(!sync.is_saved(&venues[1]));

    assert_eq!(sync.toggle_saved(&venues[1]).await, Ok(ToggleAction::Save));
    assert!(sync.is_saved(&venues[1]));
    assert_eq!(sync.toggle_saved(&venues[0]).await, Ok(ToggleAction::Unsave));
    assert!(!sync.is_saved(&venues[0]));

    // A fresh synchronizer sees what the store persisted.
    let (_, fresh) = components(addr);
    fresh.load_saved(UserId::new("u1")).await;
    assert!(fresh.is_saved(&venues[1]));
    assert!(!fresh.is_saved(&venues[0]));
    assert_eq!(fresh.saved().len(), 1);
}

#[tokio::test]
async fn saved_set_survives_reload_for_user_with_space() {
    let addr = start_server(seattle_store());
    let (loader, sync) = components(addr);

    let QueryState::Loaded(venues) = loader.load("Seattle", BudgetTier::default()).await else {
        panic!("expected venues");
    };
    sync.load_saved(UserId::new("Jane Doe")).await;
    assert_eq!(sync.toggle_saved(&venues[0]).await, Ok(ToggleAction::Save));

    let (_, fresh) = components(addr);
    fresh.load_saved(UserId::new("Jane Doe")).await;
    assert!(fresh.is_saved(&venues[0]));

    // The stored membership drives the next toggle to a delete.
    assert_eq!(fresh.toggle_saved(&venues[0]).await, Ok(ToggleAction::Unsave));
    assert!(fresh.saved().is_empty());
}

#[tokio::test]
async fn configured_budget_limits_search() {
    let pricey = Restaurant {
        price: Some(4),
        ..restaurant("P", "Canlis", "2576 Aurora Ave N, Seattle", 47.6431, -122.3467)
    };
    let cheap = Restaurant {
        price: Some(1),
        ..restaurant("Q", "Dick's Drive-In", "115 Broadway E, Seattle", 47.6194, -122.3212)
    };
    let addr = start_server(Store::default().with_restaurants("Seattle", vec![pricey, cheap]));
    let config = ClientConfig {
        budget: BudgetTier::new(1).unwrap(),
        ..config_for(addr)
    };
    let (loader, _) = components_with(&config);

    let QueryState::Loaded(venues) = loader.load("Seattle", config.budget).await else {
        panic!("expected venues, got {:?}", loader.state());
    };
    let ids: Vec<_> = venues.iter().map(|v| v.id.clone()).collect();
    assert_eq!(ids, vec![VenueId::from("Q")]);
}

#[tokio::test]
async fn rejected_save_leaves_set_unchanged() {
    let addr = start_server(seattle_store().rejecting_writes_for("u1"));
    let (loader, sync) = components(addr);

    let QueryState::Loaded(venues) = loader.load("seattle", BudgetTier::default()).await else {
        panic!("expected venues");
    };
    sync.load_saved(UserId::new("u1")).await;

    let err = sync.toggle_saved(&venues[0]).await.unwrap_err();
    assert!(matches!(err, ApiError::RemoteRejection { status: 503, .. }));
    assert!(sync.saved().is_empty());
}

#[tokio::test]
async fn unreachable_server_fails_load_and_degrades_saved() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let (loader, sync) = components(addr);

    let state = loader.load("Seattle", BudgetTier::default()).await;
    assert!(matches!(state, QueryState::Failed(_)));

    let state = sync.load_saved(UserId::new("u1")).await;
    assert!(matches!(state, SyncState::Ready { ref saved, .. } if saved.is_empty()));
}

/// Execute an `HttpRequest` using ureq and return an `HttpResponse`.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data and the client interprets them.
fn execute(req: HttpRequest) -> HttpResponse {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let mut response = match (req.method, req.body) {
        (HttpMethod::Get, _) => agent.get(&req.path).call(),
        (HttpMethod::Post, Some(body)) => agent
            .post(&req.path)
            .content_type("application/json")
            .send(body.as_bytes()),
        (HttpMethod::Post, None) => agent.post(&req.path).send_empty(),
    }
    .expect("HTTP transport error");

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();

    HttpResponse {
        status,
        headers: Vec::new(),
        body,
    }
}

#[test]
fn host_driven_save_lifecycle() {
    let addr = start_server(seattle_store());
    let client = VenueClient::new(&format!("http://{addr}"));
    let user = UserId::new("host-user").unwrap();

    // Step 1: search.
    let key = QueryKey::new("Seattle", BudgetTier::default()).unwrap();
    let venues = client.parse_search_venues(execute(client.build_search_venues(&key))).unwrap();
    assert_eq!(venues.len(), 2);

    // Step 2: nothing saved yet.
    let saved = client.parse_list_saved(execute(client.build_list_saved(&user).unwrap())).unwrap();
    assert!(saved.is_empty());

    // Step 3: save the numeric-looking venue.
    let req = client.build_save_venue(&user, &venues[1]).unwrap();
    client.parse_save_venue(execute(req)).unwrap();
    let saved = client.parse_list_saved(execute(client.build_list_saved(&user).unwrap())).unwrap();
    assert_eq!(saved, vec![VenueId::from(1042u64)]);

    // Step 4: delete it.
    let req = client.build_delete_venue(&user, &venues[1].id).unwrap();
    client.parse_delete_venue(execute(req)).unwrap();

    // Step 5: deleting again is rejected by the store.
    let req = client.build_delete_venue(&user, &venues[1].id).unwrap();
    let err = client.parse_delete_venue(execute(req)).unwrap_err();
    assert!(matches!(err, ApiError::RemoteRejection { status: 404, .. }));

    // Step 6: a blank search is a 400 from the store.
    let req = HttpRequest {
        method: HttpMethod::Get,
        path: format!("http://{addr}/restaurants?location=&budget=2"),
        headers: Vec::new(),
        body: None,
    };
    let err = client.parse_search_venues(execute(req)).unwrap_err();
    assert!(matches!(err, ApiError::RemoteRejection { status: 400, .. }));
}
