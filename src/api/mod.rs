//! Amazon Connect API access: wire models, the capability trait the
//! collector consumes, and the SigV4-signed HTTP client implementing it.

pub mod client;
pub mod models;
pub mod sign;
pub mod traits;

pub use client::ConnectClient;
pub use traits::ConnectApi;
