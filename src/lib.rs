//! Allowlisting HTTP sidecar.
//!
//! Sits in front of one downstream HTTP service and forwards only requests
//! whose path matches a configured allowlist; everything else gets a fixed
//! 404 without touching the downstream.

pub mod admin;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;

pub use config::schema::SidecarConfig;
pub use http::{Gateway, HttpServer};
pub use lifecycle::Shutdown;
pub use routing::Allowlist;
