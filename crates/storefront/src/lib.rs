//! Prism Storefront - client library for the Prism backend services.
//!
//! # Architecture
//!
//! The storefront is a thin presentation-layer client over six
//! independent backend services (users, products, orders, payments,
//! shipping, reviews). It owns exactly two pieces of state:
//!
//! - [`store::SessionStore`] - the in-memory cart/session container
//! - [`local::LocalStore`] - a best-effort persisted blob (auth token,
//!   admin flag, last payment data)
//!
//! Everything else is a request/response contract: the service clients
//! in [`services`] never re-implement backend logic, and the checkout
//! sequencer in [`checkout`] only composes calls and polls for status.
//!
//! # Example
//!
//! ```rust,ignore
//! use prism_storefront::checkout::{CheckoutFlow, CheckoutForm};
//! use prism_storefront::config::StorefrontConfig;
//! use prism_storefront::local::LocalStore;
//! use prism_storefront::store::SessionStore;
//! use tokio_util::sync::CancellationToken;
//!
//! let config = StorefrontConfig::from_env()?;
//! let store = SessionStore::new();
//! let local = LocalStore::new(&config.local_store_path);
//! store.add_to_cart(product, 2, Some("red".into()), None);
//!
//! let mut flow = CheckoutFlow::new(&config, store, local);
//! let cancel = CancellationToken::new();
//! let ctx = flow.submit_order(&form).await?;
//! let payment = flow.await_payment(&ctx, &cancel).await?;
//! let tracking = flow.await_shipment(&ctx, &cancel).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod checkout;
pub mod config;
pub mod error;
pub mod local;
pub mod models;
pub mod services;
pub mod store;

pub use error::{AppError, Result};
