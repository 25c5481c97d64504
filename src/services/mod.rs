//! Business workflows behind the HTTP routes.
//!
//! Services are generic over the repository traits they need so that unit
//! tests can run them against `mockall` mocks.

pub mod access;
pub mod agents;
pub mod api;
pub mod audit;
pub mod client;
pub mod documents;
pub mod errors;
pub mod main;
pub mod meetings;
pub mod policies;
pub mod settings;
pub mod tags;

pub use errors::{ServiceError, ServiceResult};

#[cfg(all(test, feature = "test-mocks"))]
pub(crate) mod test_support;
