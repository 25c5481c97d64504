//! DTO modules that bridge services with templates and APIs.

pub mod admin;
pub mod api;
pub mod client;
pub mod main;
