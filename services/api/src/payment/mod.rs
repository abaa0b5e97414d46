//! Payment processing
//!
//! The gateway trait isolates the outcome decision so tests can force
//! success or failure deterministically; production wires in the
//! simulated gateway with its per-method success odds.

pub mod gateway;
pub mod service;

pub use gateway::{FixedGateway, GatewayOutcome, PaymentGateway, SimulatedGateway};
pub use service::PaymentService;
