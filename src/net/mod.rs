//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound:
//!     listener.rs (bind configured address)
//!     → Hand off to HTTP layer (axum)
//!
//! Outbound:
//!     downstream.rs (single DownstreamTarget, URI construction)
//!     → hyper-util client with dial timeout
//!     → Downstream service
//! ```
//!
//! # Design Decisions
//! - Exactly one downstream target, no pool and no failover
//! - Dial timeout bounds connection establishment only
//! - Plain HTTP downstreams only

pub mod downstream;
pub mod listener;

pub use downstream::{build_client, DownstreamClient, DownstreamError, DownstreamTarget};
pub use listener::{bind, ListenerError};
