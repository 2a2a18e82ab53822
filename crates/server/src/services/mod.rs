//! Application services.
//!
//! Services own orchestration that spans repositories or external seams:
//! [`auth`] covers credentials and session tokens, [`catalog`] covers product
//! mutations plus the cart-consistency fan-out and delete cascade.

pub mod auth;
pub mod catalog;
