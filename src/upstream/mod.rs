//! Downstream dependencies reached over the network.
//!
//! Clients here perform single attempts only; retries and circuit breaking
//! are applied by the resilience layer around them.

pub mod product;

pub use product::{FetchError, Product, ProductClient};
