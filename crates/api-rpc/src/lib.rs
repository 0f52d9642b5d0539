//! JSON-RPC API Layer
//!
//! Exposes the marketplace services as versioned JSON-RPC 2.0 methods
//! (`item.accept.v1`, `pickup.offer.v1`, ...). Every mutating method takes
//! the acting user in its params.

pub mod error;
pub mod handler;
pub mod rate_limiter;
pub mod server;
pub mod types;

pub use handler::RpcHandler;
pub use rate_limiter::RateLimiter;
pub use server::{RpcServer, RpcServerConfig};
