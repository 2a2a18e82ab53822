//! Core types for Bazaar.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod product_key;
pub mod role;

pub use email::{Email, EmailError};
pub use id::*;
pub use product_key::{ProductKey, ProductKeyError};
pub use role::Role;
