use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: String,
    pub name: String,
    pub location: Address,
    pub geocodes: Geocodes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    /// Price tier, 1..=4. Searches only return venues at or under the budget.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<u8>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub formatted_address: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Geocodes {
    pub main: LatLng,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedRestaurant {
    pub user_id: String,
    pub restaurant_id: String,
    pub name: String,
    pub address: String,
    pub photo: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub location: Option<String>,
    pub budget: Option<u8>,
}

#[derive(Deserialize)]
pub struct SaveRestaurant {
    pub user_id: String,
    #[serde(rename = "restaurantId")]
    pub restaurant_id: serde_json::Value,
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub photo: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Deserialize)]
pub struct DeleteRestaurant {
    pub user_id: String,
    #[serde(rename = "restaurantId")]
    pub restaurant_id: serde_json::Value,
}

/// In-memory backing store. `restaurants` is keyed by lower-cased location.
#[derive(Debug, Default)]
pub struct Store {
    pub restaurants: HashMap<String, Vec<Restaurant>>,
    pub saved: HashMap<String, Vec<SavedRestaurant>>,
    /// Users whose writes are answered with 503.
    pub rejected_users: HashSet<String>,
}

impl Store {
    pub fn with_restaurants(mut self, location: &str, restaurants: Vec<Restaurant>) -> Self {
        self.restaurants.insert(location_key(location), restaurants);
        self
    }

    pub fn with_saved(mut self, user_id: &str, restaurant_ids: &[&str]) -> Self {
        let rows = restaurant_ids
            .iter()
            .map(|id| SavedRestaurant {
                user_id: user_id.to_string(),
                restaurant_id: id.to_string(),
                name: String::new(),
                address: String::new(),
                photo: None,
                latitude: 0.0,
                longitude: 0.0,
            })
            .collect();
        self.saved.insert(user_id.to_string(), rows);
        self
    }

    pub fn rejecting_writes_for(mut self, user_id: &str) -> Self {
        self.rejected_users.insert(user_id.to_string());
        self
    }

    /// Two Seattle venues for running locally.
    pub fn demo() -> Self {
        Store::default().with_restaurants(
            "Seattle",
            vec![
                restaurant("A", "Pike Place Chowder", "1530 Post Alley, Seattle, WA", 47.6097, -122.3422),
                restaurant("1042", "Tilikum Place Cafe", "407 Cedar St, Seattle, WA", 47.6178, -122.3474),
            ],
        )
    }
}

pub fn restaurant(id: &str, name: &str, address: &str, latitude: f64, longitude: f64) -> Restaurant {
    Restaurant {
        id: id.to_string(),
        name: name.to_string(),
        location: Address {
            formatted_address: address.to_string(),
        },
        geocodes: Geocodes {
            main: LatLng { latitude, longitude },
        },
        photo: None,
        price: None,
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    app_with(Store::default())
}

pub fn app_with(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/restaurants", get(search_restaurants))
        .route("/saved-restaurants/{user_id}", get(list_saved))
        .route("/save-restaurant", post(save_restaurant))
        .route("/delete-restaurant", post(delete_restaurant))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, Store::demo()).await
}

pub async fn serve(listener: TcpListener, store: Store) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(store)).await
}

fn location_key(location: &str) -> String {
    location.trim().to_lowercase()
}

/// Ids arrive as JSON strings or numbers; the store keeps the string form.
/// Whole floats are stored without a fraction, so `7.0` and `7` are one id.
fn id_string(raw: &serde_json::Value) -> Option<String> {
    match raw {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(i.to_string());
            }
            if let Some(u) = n.as_u64() {
                return Some(u.to_string());
            }
            n.as_f64().map(|f| {
                if f.fract() == 0.0 && f.abs() < 1e15 {
                    format!("{}", f as i64)
                } else {
                    f.to_string()
                }
            })
        }
        _ => None,
    }
}

async fn search_restaurants(
    State(db): State<Db>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Restaurant>>, StatusCode> {
    let location = params
        .location
        .filter(|l| !l.trim().is_empty())
        .ok_or(StatusCode::BAD_REQUEST)?;
    let budget = params.budget.unwrap_or(4);
    let store = db.read().await;
    let found = store
        .restaurants
        .get(&location_key(&location))
        .map(|all| {
            all.iter()
                .filter(|r| r.price.map_or(true, |p| p <= budget))
                .cloned()
                .collect()
        })
        .unwrap_or_default();
    Ok(Json(found))
}

async fn list_saved(State(db): State<Db>, Path(user_id): Path<String>) -> Json<Vec<SavedRestaurant>> {
    let store = db.read().await;
    Json(store.saved.get(&user_id).cloned().unwrap_or_default())
}

async fn save_restaurant(
    State(db): State<Db>,
    Json(input): Json<SaveRestaurant>,
) -> Result<(StatusCode, Json<SavedRestaurant>), StatusCode> {
    let restaurant_id = id_string(&input.restaurant_id).ok_or(StatusCode::UNPROCESSABLE_ENTITY)?;
    let mut store = db.write().await;
    if store.rejected_users.contains(&input.user_id) {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }

    let rows = store.saved.entry(input.user_id.clone()).or_default();
    if let Some(existing) = rows.iter().find(|r| r.restaurant_id == restaurant_id) {
        return Ok((StatusCode::OK, Json(existing.clone())));
    }
    let row = SavedRestaurant {
        user_id: input.user_id,
        restaurant_id,
        name: input.name,
        address: input.address,
        photo: input.photo,
        latitude: input.latitude,
        longitude: input.longitude,
    };
    rows.push(row.clone());
    info!(user = %row.user_id, restaurant = %row.restaurant_id, "saved restaurant");
    Ok((StatusCode::CREATED, Json(row)))
}

async fn delete_restaurant(
    State(db): State<Db>,
    Json(input): Json<DeleteRestaurant>,
) -> Result<StatusCode, StatusCode> {
    let restaurant_id = id_string(&input.restaurant_id).ok_or(StatusCode::UNPROCESSABLE_ENTITY)?;
    let mut store = db.write().await;
    if store.rejected_users.contains(&input.user_id) {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }

    let rows = store.saved.get_mut(&input.user_id).ok_or(StatusCode::NOT_FOUND)?;
    let before = rows.len();
    rows.retain(|r| r.restaurant_id != restaurant_id);
    if rows.len() == before {
        return Err(StatusCode::NOT_FOUND);
    }
    info!(user = %input.user_id, restaurant = %restaurant_id, "deleted restaurant");
    Ok(StatusCode::OK)
}
