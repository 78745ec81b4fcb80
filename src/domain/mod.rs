//! Domain modules
pub mod account;
pub mod cart;
pub mod catalog;
pub mod filter;
pub mod order;
pub mod pricing;
pub mod wishlist;
