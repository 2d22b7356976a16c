//! Order construction against the remote funding service.

pub mod client;
pub mod types;

pub use client::OrderClient;
pub use types::{OrderOptions, OrderRequest, RawOrder};
