//! Typed connector keys and the signed token format shared by both protocol tiers.

pub mod key;
pub mod token;

pub use key::*;
pub use token::*;
