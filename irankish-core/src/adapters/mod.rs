//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - reqwest (blocking) for the HttpTransport port

pub mod reqwest_transport;

#[cfg(test)]
pub mod mock_gateway;

pub use reqwest_transport::ReqwestTransport;
