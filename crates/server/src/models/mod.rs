//! Domain types.
//!
//! These are validated domain objects, separate from database row types
//! (which live with their repositories) and from the API view types each
//! route module serializes into the response envelope.

pub mod cart;
pub mod product;
pub mod user;

pub use cart::{CartLine, CartLineView};
pub use product::{Product, ProductView};
pub use user::{User, UserProfile};
