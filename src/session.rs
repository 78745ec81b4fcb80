//! Session-scoped storefront state
//!
//! One [`Storefront`] owns all mutable shopping state for a running
//! instance: cart, filters, accounts, wishlists and orders, hydrated from
//! the key-value store on open and written back after every mutation. State
//! is an explicit object handed to callers, never module-level globals.

use chrono::{DateTime, Duration, Utc};

use crate::domain::account::{AccountStore, ProfilePatch, User};
use crate::domain::cart::{Cart, CartEvent, CartItem};
use crate::domain::catalog::{Catalog, Product};
use crate::domain::filter::{self, FilterSpec, PriceRange, SortKey};
use crate::domain::order::{Order, OrderBook, OrderStatus, ShippingInfo};
use crate::domain::pricing;
use crate::domain::wishlist::Wishlists;
use crate::storage::{self, keys, KvStore};
use crate::{Result, StorefrontError};

/// How long an add-to-cart confirmation stays visible.
const NOTICE_TTL_MS: i64 = 3000;

/// Page identity with payload per variant; rendering matches exhaustively.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum View {
    Home,
    Shop,
    Product { product_id: u32 },
    Cart,
    Checkout,
    Account,
    OrderConfirmation { order_id: String },
    Wishlist,
    Search { query: String },
    OrderTracking,
    About,
    Contact,
    Faq,
    Login,
    SignUp,
}

impl View {
    /// Destinations that require an authenticated session.
    pub fn is_protected(&self) -> bool {
        matches!(
            self,
            Self::Account | Self::Checkout | Self::Wishlist | Self::OrderTracking
        )
    }

    fn is_browse(&self) -> bool {
        matches!(
            self,
            Self::Home | Self::Shop | Self::Wishlist | Self::Search { .. }
        )
    }
}

/// Transient add-to-cart confirmation. A new add replaces the previous
/// notice, restarting the clock rather than stacking timers.
#[derive(Clone, Debug)]
pub struct Notice {
    pub message: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterDimension {
    Category,
    Color,
    Size,
    Fabric,
    Fit,
}

pub struct Storefront<S: KvStore> {
    store: S,
    catalog: Catalog,
    cart: Cart,
    accounts: AccountStore,
    orders: OrderBook,
    wishlists: Wishlists,
    filters: FilterSpec,
    view: View,
    last_browse: View,
    auth_redirect: Option<View>,
    notice: Option<Notice>,
}

impl<S: KvStore> Storefront<S> {
    /// Hydrates session state from the store. Malformed persisted data
    /// degrades to defaults; it never aborts the session.
    pub fn open(store: S, catalog: Catalog) -> Self {
        let users: Vec<User> = storage::load_or_default(&store, keys::USERS);
        let current: Option<u64> = storage::load(&store, keys::CURRENT_USER_ID);
        let orders: Vec<Order> = storage::load_or_default(&store, keys::ORDERS);
        let wishlists: Wishlists = storage::load_or_default(&store, keys::WISHLISTS);

        let mut filters: FilterSpec = storage::load_or_default(&store, keys::SHOP_FILTERS);
        let saved_range: Option<PriceRange> = storage::load(&store, keys::SHOP_PRICE_RANGE);
        filters.price = match saved_range {
            // A never-touched or degenerate range falls back to bounds
            // derived from the catalog.
            Some(range) if range != PriceRange::default() && range.min <= range.max => range,
            _ => PriceRange::from_catalog(&catalog),
        };

        Self {
            store,
            catalog,
            cart: Cart::default(),
            accounts: AccountStore::new(users, current),
            orders: OrderBook::new(orders),
            wishlists,
            filters,
            view: View::Home,
            last_browse: View::Home,
            auth_redirect: None,
            notice: None,
        }
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Navigate, bouncing anonymous visitors off protected destinations to
    /// the login view while remembering where they were headed.
    pub fn navigate(&mut self, to: View) -> &View {
        if to.is_protected() && !self.accounts.is_authenticated() {
            self.auth_redirect = Some(to);
            self.view = View::Login;
            return &self.view;
        }
        if to.is_browse() {
            self.last_browse = to.clone();
        }
        self.view = to;
        &self.view
    }

    /// Product detail returns to the page it was opened from; checkout
    /// returns to the cart.
    pub fn go_back(&mut self) -> &View {
        self.view = match &self.view {
            View::Product { .. } => self.last_browse.clone(),
            View::Checkout => View::Cart,
            other => other.clone(),
        };
        &self.view
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    // ------------------------------------------------------------------
    // Catalog and filters
    // ------------------------------------------------------------------

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn filters(&self) -> &FilterSpec {
        &self.filters
    }

    pub fn filtered_products(&self) -> Vec<Product> {
        filter::apply(&self.catalog, &self.filters)
    }

    pub fn search(&mut self, query: &str) -> Vec<Product> {
        let results = self.catalog.search(query).into_iter().cloned().collect();
        self.navigate(View::Search { query: query.to_string() });
        results
    }

    pub fn toggle_filter(&mut self, dimension: FilterDimension, value: &str) -> Result<()> {
        let set = match dimension {
            FilterDimension::Category => &mut self.filters.category,
            FilterDimension::Color => &mut self.filters.color,
            FilterDimension::Size => &mut self.filters.size,
            FilterDimension::Fabric => &mut self.filters.fabric,
            FilterDimension::Fit => &mut self.filters.fit,
        };
        FilterSpec::toggle(set, value);
        self.persist_filters()
    }

    pub fn set_sort(&mut self, sort: SortKey) -> Result<()> {
        self.filters.sort = sort;
        self.persist_filters()
    }

    pub fn set_price_min(&mut self, min: rust_decimal::Decimal) -> Result<()> {
        self.filters.price.set_min(min);
        self.persist_filters()
    }

    pub fn set_price_max(&mut self, max: rust_decimal::Decimal) -> Result<()> {
        self.filters.price.set_max(max);
        self.persist_filters()
    }

    pub fn clear_filters(&mut self) -> Result<()> {
        let sort = self.filters.sort;
        self.filters = FilterSpec {
            price: PriceRange::from_catalog(&self.catalog),
            sort,
            ..FilterSpec::default()
        };
        self.persist_filters()
    }

    /// Seller-facing stock update; the only product mutation in the system.
    pub fn set_stock(&mut self, product_id: u32, stock: u32) -> Result<()> {
        self.catalog.set_stock(product_id, stock)
    }

    // ------------------------------------------------------------------
    // Cart
    // ------------------------------------------------------------------

    pub fn cart(&self) -> &[CartItem] {
        self.cart.items()
    }

    pub fn cart_item_count(&self) -> u32 {
        self.cart.item_count()
    }

    pub fn cart_subtotal(&self) -> rust_decimal::Decimal {
        pricing::subtotal(self.cart.items())
    }

    pub fn cart_total(&self) -> rust_decimal::Decimal {
        pricing::total(self.cart.items())
    }

    pub fn add_to_cart(&mut self, product_id: u32, quantity: u32, now: DateTime<Utc>) -> Result<()> {
        let product = self
            .catalog
            .get(product_id)
            .ok_or(StorefrontError::NotFound)?
            .clone();
        self.cart.add(product, quantity)?;
        for event in self.cart.take_events() {
            let CartEvent::ItemAdded { name, quantity } = event;
            self.notice = Some(Notice {
                message: format!("{quantity} x {name} added to cart!"),
                expires_at: now + Duration::milliseconds(NOTICE_TTL_MS),
            });
        }
        Ok(())
    }

    pub fn update_cart_quantity(&mut self, product_id: u32, quantity: u32) {
        self.cart.update_quantity(product_id, quantity);
    }

    pub fn remove_from_cart(&mut self, product_id: u32) {
        self.cart.remove(product_id);
    }

    pub fn active_notice(&self, now: DateTime<Utc>) -> Option<&Notice> {
        self.notice.as_ref().filter(|n| now < n.expires_at)
    }

    // ------------------------------------------------------------------
    // Accounts
    // ------------------------------------------------------------------

    pub fn current_user(&self) -> Option<&User> {
        self.accounts.current()
    }

    pub fn sign_up(&mut self, name: &str, email: &str, password: &str) -> Result<User> {
        let user = self.accounts.sign_up(name, email, password)?;
        self.persist_accounts()?;
        self.resume_after_auth();
        Ok(user)
    }

    pub fn login(&mut self, email: &str, password: &str) -> Result<User> {
        let user = self.accounts.login(email, password)?;
        self.persist_accounts()?;
        self.resume_after_auth();
        Ok(user)
    }

    /// The cart survives logout; only the session reference is dropped.
    pub fn logout(&mut self) -> Result<()> {
        self.accounts.logout();
        self.store.remove(keys::CURRENT_USER_ID)?;
        self.view = View::Home;
        Ok(())
    }

    pub fn update_profile(&mut self, patch: ProfilePatch) -> Result<User> {
        let id = self
            .accounts
            .current_id()
            .ok_or(StorefrontError::Unauthenticated)?;
        let user = self.accounts.update_profile(id, patch)?.clone();
        self.persist_accounts()?;
        Ok(user)
    }

    fn resume_after_auth(&mut self) {
        let destination = self.auth_redirect.take().unwrap_or(View::Account);
        self.navigate(destination);
    }

    // ------------------------------------------------------------------
    // Wishlist
    // ------------------------------------------------------------------

    /// Anonymous toggles redirect to login instead of silently operating.
    pub fn toggle_wishlist(&mut self, product_id: u32) -> Result<()> {
        let Some(user_id) = self.accounts.current_id() else {
            self.auth_redirect = Some(View::Shop);
            self.view = View::Login;
            return Err(StorefrontError::Unauthenticated);
        };
        self.wishlists.toggle(user_id, product_id);
        storage::save(&mut self.store, keys::WISHLISTS, &self.wishlists)
    }

    pub fn wishlist_contains(&self, product_id: u32) -> bool {
        self.accounts
            .current_id()
            .is_some_and(|id| self.wishlists.contains(id, product_id))
    }

    /// Empty while anonymous.
    pub fn wishlist_products(&self) -> Vec<&Product> {
        let Some(user_id) = self.accounts.current_id() else {
            return Vec::new();
        };
        self.wishlists
            .ids_for(user_id)
            .iter()
            .filter_map(|&id| self.catalog.get(id))
            .collect()
    }

    pub fn wishlist_count(&self) -> usize {
        self.accounts
            .current_id()
            .map_or(0, |id| self.wishlists.count(id))
    }

    // ------------------------------------------------------------------
    // Orders
    // ------------------------------------------------------------------

    /// Snapshots the cart into a new order, clears the cart and lands on the
    /// confirmation view.
    pub fn place_order(&mut self, shipping_info: ShippingInfo) -> Result<String> {
        let Some(user_id) = self.accounts.current_id() else {
            self.auth_redirect = Some(View::Checkout);
            self.view = View::Login;
            return Err(StorefrontError::Unauthenticated);
        };
        let order_id = self
            .orders
            .place(user_id, self.cart.snapshot(), shipping_info)?;
        self.cart.clear();
        self.persist_orders()?;
        self.view = View::OrderConfirmation { order_id: order_id.clone() };
        Ok(order_id)
    }

    /// Newest-first order history for the signed-in user.
    pub fn my_orders(&self) -> Vec<&Order> {
        self.accounts
            .current_id()
            .map(|id| self.orders.orders_for(id))
            .unwrap_or_default()
    }

    /// Tracking looks up only the signed-in user's orders; the id match is
    /// trimmed and case-insensitive.
    pub fn track_order(&self, id: &str) -> Option<&Order> {
        let user_id = self.accounts.current_id()?;
        self.orders.find(id).filter(|o| o.user_id == user_id)
    }

    /// Administrative status advancement, outside the shopping flow.
    pub fn advance_order(&mut self, id: &str) -> Result<OrderStatus> {
        let status = self
            .orders
            .find_mut(id)
            .ok_or(StorefrontError::NotFound)?
            .advance()?;
        self.persist_orders()?;
        Ok(status)
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    fn persist_accounts(&mut self) -> Result<()> {
        storage::save(&mut self.store, keys::USERS, &self.accounts.users().to_vec())?;
        match self.accounts.current_id() {
            Some(id) => storage::save(&mut self.store, keys::CURRENT_USER_ID, &id),
            None => self.store.remove(keys::CURRENT_USER_ID),
        }
    }

    fn persist_orders(&mut self) -> Result<()> {
        storage::save(&mut self.store, keys::ORDERS, &self.orders.orders().to_vec())
    }

    fn persist_filters(&mut self) -> Result<()> {
        storage::save(&mut self.store, keys::SHOP_FILTERS, &self.filters)?;
        storage::save(&mut self.store, keys::SHOP_PRICE_RANGE, &self.filters.price)
    }

    /// Hands the underlying store back, e.g. to reopen a fresh session over
    /// the same persisted state.
    pub fn into_store(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog;
    use crate::storage::MemoryStore;

    fn shipping() -> ShippingInfo {
        ShippingInfo {
            full_name: "Alex Mercer".into(),
            address: "123 Urban St.".into(),
            city: "Mumbai".into(),
            postal_code: "400001".into(),
            country: "India".into(),
        }
    }

    fn open() -> Storefront<MemoryStore> {
        Storefront::open(MemoryStore::default(), catalog::seed())
    }

    fn sign_in(shop: &mut Storefront<MemoryStore>) {
        shop.sign_up("Alex", "alex@example.com", "secret123").unwrap();
    }

    #[test]
    fn test_protected_navigation_redirects_then_resumes() {
        let mut shop = open();
        shop.navigate(View::Checkout);
        assert_eq!(shop.view(), &View::Login);
        sign_in(&mut shop);
        assert_eq!(shop.view(), &View::Checkout);
    }

    #[test]
    fn test_login_without_pending_redirect_lands_on_account() {
        let mut shop = open();
        sign_in(&mut shop);
        shop.logout().unwrap();
        shop.navigate(View::Login);
        shop.login("alex@example.com", "secret123").unwrap();
        assert_eq!(shop.view(), &View::Account);
    }

    #[test]
    fn test_place_order_clears_cart_and_confirms() {
        let mut shop = open();
        sign_in(&mut shop);
        let now = Utc::now();
        shop.add_to_cart(2, 1, now).unwrap(); // 1299, above free shipping
        let order_id = shop.place_order(shipping()).unwrap();
        assert_eq!(shop.cart_item_count(), 0);
        assert_eq!(shop.view(), &View::OrderConfirmation { order_id: order_id.clone() });
        let order = shop.track_order(&order_id).unwrap();
        assert_eq!(order.status, OrderStatus::Processing);
    }

    #[test]
    fn test_anonymous_checkout_is_bounced_to_login() {
        let mut shop = open();
        let now = Utc::now();
        shop.add_to_cart(2, 1, now).unwrap();
        assert!(matches!(
            shop.place_order(shipping()),
            Err(StorefrontError::Unauthenticated)
        ));
        assert_eq!(shop.view(), &View::Login);
        assert_eq!(shop.cart_item_count(), 1); // cart untouched
    }

    #[test]
    fn test_notice_expires_and_restarts() {
        let mut shop = open();
        let t0 = Utc::now();
        shop.add_to_cart(1, 2, t0).unwrap();
        assert!(shop.active_notice(t0).is_some());
        assert!(shop.active_notice(t0 + Duration::milliseconds(3001)).is_none());

        // A second add replaces the notice, restarting the clock.
        let t1 = t0 + Duration::milliseconds(2000);
        shop.add_to_cart(3, 1, t1).unwrap();
        let notice = shop.active_notice(t0 + Duration::milliseconds(4000)).unwrap();
        assert!(notice.message.contains("Classic Oxford Shirt"));
    }

    #[test]
    fn test_cart_survives_logout() {
        let mut shop = open();
        sign_in(&mut shop);
        shop.add_to_cart(1, 1, Utc::now()).unwrap();
        shop.logout().unwrap();
        assert_eq!(shop.cart_item_count(), 1);
        assert_eq!(shop.view(), &View::Home);
    }

    #[test]
    fn test_wishlist_anonymous_toggle_redirects() {
        let mut shop = open();
        assert!(shop.toggle_wishlist(1).is_err());
        assert_eq!(shop.view(), &View::Login);
        assert!(shop.wishlist_products().is_empty());
    }

    #[test]
    fn test_wishlist_switches_with_account() {
        let mut shop = open();
        sign_in(&mut shop);
        shop.toggle_wishlist(1).unwrap();
        assert!(shop.wishlist_contains(1));
        shop.logout().unwrap();
        assert_eq!(shop.wishlist_count(), 0);

        shop.sign_up("Sam", "sam@example.com", "secret456").unwrap();
        assert!(!shop.wishlist_contains(1));
    }

    #[test]
    fn test_state_survives_reopen() {
        let mut shop = open();
        sign_in(&mut shop);
        shop.toggle_wishlist(1).unwrap();
        shop.add_to_cart(2, 1, Utc::now()).unwrap();
        let order_id = shop.place_order(shipping()).unwrap();
        let store = shop.into_store();

        let reopened = Storefront::open(store, catalog::seed());
        assert_eq!(reopened.current_user().unwrap().email, "alex@example.com");
        assert!(reopened.wishlist_contains(1));
        assert!(reopened.track_order(&order_id.to_uppercase()).is_some());
        assert!(reopened.cart().is_empty()); // carts are session-scoped
    }

    #[test]
    fn test_filters_persist_across_sessions() {
        let mut shop = open();
        shop.toggle_filter(FilterDimension::Category, "Jackets").unwrap();
        shop.set_sort(SortKey::PriceDesc).unwrap();
        shop.set_price_max(rust_decimal::Decimal::from(1500)).unwrap();
        let store = shop.into_store();

        let reopened = Storefront::open(store, catalog::seed());
        assert_eq!(reopened.filters().category, vec!["Jackets".to_string()]);
        assert_eq!(reopened.filters().sort, SortKey::PriceDesc);
        assert_eq!(
            reopened.filters().price.max,
            rust_decimal::Decimal::from(1500)
        );
    }

    #[test]
    fn test_go_back_from_product_and_checkout() {
        let mut shop = open();
        shop.navigate(View::Shop);
        shop.navigate(View::Product { product_id: 1 });
        shop.go_back();
        assert_eq!(shop.view(), &View::Shop);

        sign_in(&mut shop);
        shop.navigate(View::Checkout);
        shop.go_back();
        assert_eq!(shop.view(), &View::Cart);
    }
}
