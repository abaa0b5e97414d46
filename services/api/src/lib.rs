//! Pedalgo marketplace API service
//!
//! Customers register, search and book bikes; owners list them; the
//! booking rule engine decides bookability and price and drives the
//! booking status machine. Exposed as a library so integration tests
//! can drive the router and the engine directly.

pub mod booking;
pub mod error;
pub mod middleware;
pub mod models;
pub mod payment;
pub mod repositories;
pub mod routes;
pub mod session;
pub mod state;
pub mod validation;
