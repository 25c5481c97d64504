//! Database models shared across the CRM repository.

pub mod agent;
pub mod audit;
pub mod client;
#[cfg(feature = "server")]
pub mod config;
pub mod document;
pub mod meeting;
pub mod policy;
pub mod setting;
pub mod tag;
