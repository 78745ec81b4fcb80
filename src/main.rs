//! UrbanEdge Storefront - HTTP surface
//!
//! Thin axum front over the session engine. The whole service is one
//! logical session scope; concurrent instances over the same store file are
//! last-writer-wins.

use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use urbanedge_storefront::domain::catalog;
use urbanedge_storefront::session::FilterDimension;
use urbanedge_storefront::storage::JsonFileStore;
use urbanedge_storefront::{
    format_money, CartItem, Order, OrderStatus, ProfilePatch, ShippingInfo, SortKey, Storefront,
    StorefrontError, User,
};

type Engine = Arc<Mutex<Storefront<JsonFileStore>>>;

#[derive(Clone)]
struct AppState {
    engine: Engine,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let store_path =
        std::env::var("STORE_PATH").unwrap_or_else(|_| "urbanedge-store.json".to_string());
    let store = JsonFileStore::open(&store_path)?;
    let engine = Arc::new(Mutex::new(Storefront::open(store, catalog::seed())));
    let state = AppState { engine };

    let app = Router::new()
        .route("/health", get(|| async {
            Json(serde_json::json!({"status": "healthy", "service": "urbanedge-storefront"}))
        }))
        .route("/api/v1/products", get(list_products))
        .route("/api/v1/products/:id", get(get_product))
        .route("/api/v1/products/:id/stock", put(set_stock))
        .route("/api/v1/categories", get(list_categories))
        .route("/api/v1/search", get(search))
        .route("/api/v1/filters/toggle", post(toggle_filter))
        .route("/api/v1/filters/sort", put(set_sort))
        .route("/api/v1/filters/price", put(set_price))
        .route("/api/v1/filters", delete(clear_filters))
        .route("/api/v1/cart", get(get_cart).post(add_to_cart))
        .route("/api/v1/cart/:id", put(update_cart).delete(remove_from_cart))
        .route("/api/v1/auth/signup", post(sign_up))
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/logout", post(logout))
        .route("/api/v1/account", get(account).put(update_account))
        .route("/api/v1/wishlist", get(wishlist))
        .route("/api/v1/wishlist/:id", post(toggle_wishlist))
        .route("/api/v1/checkout", post(checkout))
        .route("/api/v1/orders", get(my_orders))
        .route("/api/v1/orders/track/:id", get(track_order))
        .route("/api/v1/orders/:id/advance", post(advance_order))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    tracing::info!("UrbanEdge storefront listening on 0.0.0.0:{}", port);
    axum::serve(
        tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?,
        app,
    )
    .await?;
    Ok(())
}

type ApiError = (StatusCode, String);

fn api_error(e: StorefrontError) -> ApiError {
    let status = match e {
        StorefrontError::NotFound => StatusCode::NOT_FOUND,
        StorefrontError::DuplicateEmail => StatusCode::CONFLICT,
        StorefrontError::InvalidCredentials | StorefrontError::Unauthenticated => {
            StatusCode::UNAUTHORIZED
        }
        StorefrontError::InvalidQuantity | StorefrontError::Validation(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        StorefrontError::ExternalService(_) => StatusCode::BAD_GATEWAY,
        StorefrontError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}

/// Public projection of a user; the password hash never leaves the store.
#[derive(Serialize)]
struct UserView {
    id: u64,
    name: String,
    email: String,
    member_since: String,
}

impl From<User> for UserView {
    fn from(u: User) -> Self {
        Self { id: u.id, name: u.name, email: u.email, member_since: u.member_since }
    }
}

#[derive(Serialize)]
struct CartLine {
    product_id: u32,
    name: String,
    quantity: u32,
    line_total: Decimal,
}

#[derive(Serialize)]
struct CartView {
    items: Vec<CartLine>,
    item_count: u32,
    subtotal: Decimal,
    total: Decimal,
    total_display: String,
}

fn cart_line(item: &CartItem) -> CartLine {
    CartLine {
        product_id: item.product.id,
        name: item.product.name.clone(),
        quantity: item.quantity,
        line_total: item.line_total(),
    }
}

#[derive(Serialize)]
struct OrderView {
    id: String,
    date: chrono::DateTime<Utc>,
    total: Decimal,
    status: OrderStatus,
    items: Vec<CartLine>,
}

impl From<&Order> for OrderView {
    fn from(o: &Order) -> Self {
        Self {
            id: o.id.clone(),
            date: o.date,
            total: o.total,
            status: o.status,
            items: o.items.iter().map(cart_line).collect(),
        }
    }
}

async fn list_products(State(s): State<AppState>) -> Json<serde_json::Value> {
    let engine = s.engine.lock().await;
    let products = engine.filtered_products();
    Json(serde_json::json!({
        "total": products.len(),
        "data": products,
        "filters": engine.filters(),
    }))
}

async fn get_product(
    State(s): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let engine = s.engine.lock().await;
    let product = engine
        .catalog()
        .get(id)
        .ok_or_else(|| api_error(StorefrontError::NotFound))?;
    Ok(Json(serde_json::json!({
        "product": product,
        "price_display": format_money(product.price),
        "in_wishlist": engine.wishlist_contains(id),
    })))
}

#[derive(Deserialize)]
struct StockUpdate {
    stock: u32,
}

async fn set_stock(
    State(s): State<AppState>,
    Path(id): Path<u32>,
    Json(r): Json<StockUpdate>,
) -> Result<StatusCode, ApiError> {
    s.engine.lock().await.set_stock(id, r.stock).map_err(api_error)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_categories(State(s): State<AppState>) -> Json<serde_json::Value> {
    let engine = s.engine.lock().await;
    Json(serde_json::json!(engine.catalog().categories()))
}

#[derive(Deserialize)]
struct SearchParams {
    q: String,
}

async fn search(State(s): State<AppState>, Query(p): Query<SearchParams>) -> Json<serde_json::Value> {
    let mut engine = s.engine.lock().await;
    let results = engine.search(&p.q);
    Json(serde_json::json!({"query": p.q, "results": results}))
}

#[derive(Deserialize)]
struct ToggleFilterRequest {
    dimension: FilterDimension,
    value: String,
}

async fn toggle_filter(
    State(s): State<AppState>,
    Json(r): Json<ToggleFilterRequest>,
) -> Result<StatusCode, ApiError> {
    s.engine
        .lock()
        .await
        .toggle_filter(r.dimension, &r.value)
        .map_err(api_error)?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
struct SortRequest {
    sort: SortKey,
}

async fn set_sort(State(s): State<AppState>, Json(r): Json<SortRequest>) -> Result<StatusCode, ApiError> {
    s.engine.lock().await.set_sort(r.sort).map_err(api_error)?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
struct PriceRequest {
    min: Option<Decimal>,
    max: Option<Decimal>,
}

async fn set_price(State(s): State<AppState>, Json(r): Json<PriceRequest>) -> Result<StatusCode, ApiError> {
    let mut engine = s.engine.lock().await;
    if let Some(min) = r.min {
        engine.set_price_min(min).map_err(api_error)?;
    }
    if let Some(max) = r.max {
        engine.set_price_max(max).map_err(api_error)?;
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn clear_filters(State(s): State<AppState>) -> Result<StatusCode, ApiError> {
    s.engine.lock().await.clear_filters().map_err(api_error)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_cart(State(s): State<AppState>) -> Json<CartView> {
    let engine = s.engine.lock().await;
    Json(CartView {
        items: engine.cart().iter().map(cart_line).collect(),
        item_count: engine.cart_item_count(),
        subtotal: engine.cart_subtotal(),
        total: engine.cart_total(),
        total_display: format_money(engine.cart_total()),
    })
}

#[derive(Deserialize)]
struct AddToCartRequest {
    product_id: u32,
    quantity: u32,
}

async fn add_to_cart(
    State(s): State<AppState>,
    Json(r): Json<AddToCartRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let mut engine = s.engine.lock().await;
    let now = Utc::now();
    engine.add_to_cart(r.product_id, r.quantity, now).map_err(api_error)?;
    let notice = engine.active_notice(now).map(|n| n.message.clone());
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({"item_count": engine.cart_item_count(), "notice": notice})),
    ))
}

#[derive(Deserialize)]
struct QuantityUpdate {
    quantity: u32,
}

async fn update_cart(
    State(s): State<AppState>,
    Path(id): Path<u32>,
    Json(r): Json<QuantityUpdate>,
) -> StatusCode {
    s.engine.lock().await.update_cart_quantity(id, r.quantity);
    StatusCode::NO_CONTENT
}

async fn remove_from_cart(State(s): State<AppState>, Path(id): Path<u32>) -> StatusCode {
    s.engine.lock().await.remove_from_cart(id);
    StatusCode::NO_CONTENT
}

#[derive(Deserialize)]
struct SignUpRequest {
    name: String,
    email: String,
    password: String,
}

async fn sign_up(
    State(s): State<AppState>,
    Json(r): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<UserView>), ApiError> {
    let user = s
        .engine
        .lock()
        .await
        .sign_up(&r.name, &r.email, &r.password)
        .map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

async fn login(State(s): State<AppState>, Json(r): Json<LoginRequest>) -> Result<Json<UserView>, ApiError> {
    let user = s.engine.lock().await.login(&r.email, &r.password).map_err(api_error)?;
    Ok(Json(user.into()))
}

async fn logout(State(s): State<AppState>) -> Result<StatusCode, ApiError> {
    s.engine.lock().await.logout().map_err(api_error)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn account(State(s): State<AppState>) -> Result<Json<UserView>, ApiError> {
    let engine = s.engine.lock().await;
    let user = engine
        .current_user()
        .cloned()
        .ok_or_else(|| api_error(StorefrontError::Unauthenticated))?;
    Ok(Json(user.into()))
}

async fn update_account(
    State(s): State<AppState>,
    Json(patch): Json<ProfilePatch>,
) -> Result<Json<UserView>, ApiError> {
    let user = s.engine.lock().await.update_profile(patch).map_err(api_error)?;
    Ok(Json(user.into()))
}

async fn wishlist(State(s): State<AppState>) -> Json<serde_json::Value> {
    let engine = s.engine.lock().await;
    Json(serde_json::json!({
        "count": engine.wishlist_count(),
        "products": engine.wishlist_products(),
    }))
}

async fn toggle_wishlist(State(s): State<AppState>, Path(id): Path<u32>) -> Result<StatusCode, ApiError> {
    s.engine.lock().await.toggle_wishlist(id).map_err(api_error)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn checkout(
    State(s): State<AppState>,
    Json(shipping): Json<ShippingInfo>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let order_id = s.engine.lock().await.place_order(shipping).map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(serde_json::json!({"order_id": order_id}))))
}

async fn my_orders(State(s): State<AppState>) -> Json<Vec<OrderView>> {
    let engine = s.engine.lock().await;
    Json(engine.my_orders().into_iter().map(OrderView::from).collect())
}

async fn track_order(State(s): State<AppState>, Path(id): Path<String>) -> Result<Json<OrderView>, ApiError> {
    let engine = s.engine.lock().await;
    let order = engine
        .track_order(&id)
        .ok_or_else(|| api_error(StorefrontError::NotFound))?;
    Ok(Json(order.into()))
}

async fn advance_order(
    State(s): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let status = s.engine.lock().await.advance_order(&id).map_err(api_error)?;
    Ok(Json(serde_json::json!({"status": status})))
}
