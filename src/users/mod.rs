//! Users domain: record lookup and the recommendation use case.

pub mod directory;
pub mod service;

pub use directory::{User, UserDirectory};
pub use service::UsersService;
