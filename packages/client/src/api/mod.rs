//! Transport client and typed endpoint catalog.

mod client;
pub mod endpoints;

pub use client::ApiClient;
pub use endpoints::{Endpoint, RequestBody};
