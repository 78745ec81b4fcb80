//! UrbanEdge Storefront
//!
//! Storefront engine for the UrbanEdge brand: a catalog/cart/order state
//! machine with durable local key-value persistence and no database backend.
//!
//! ## Features
//! - Product catalog with filter and sort
//! - Shopping cart with quantity-merge semantics
//! - Threshold-based free shipping
//! - Accounts, per-user wishlists and order history
//! - Order lifecycle tracking

use thiserror::Error;

pub mod domain;
pub mod session;
pub mod storage;
pub mod stylist;

pub use domain::account::{AccountStore, ProfilePatch, User, UserRole};
pub use domain::cart::{Cart, CartEvent, CartItem};
pub use domain::catalog::{Catalog, Category, Product};
pub use domain::filter::{FilterSpec, PriceRange, SortKey};
pub use domain::order::{Order, OrderBook, OrderStatus, ShippingInfo};
pub use domain::pricing::format_money;
pub use domain::wishlist::Wishlists;
pub use session::{Notice, Storefront, View};

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("Not found")]
    NotFound,

    #[error("An account with this email already exists")]
    DuplicateEmail,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid quantity")]
    InvalidQuantity,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Sign in required")]
    Unauthenticated,

    #[error("External service failure: {0}")]
    ExternalService(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
