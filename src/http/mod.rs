//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum setup, every method and path to one handler)
//!     → gateway.rs (admission via routing::Allowlist)
//!         rejected → response.rs (fixed 404)
//!         admitted → request.rs (rewrite.rs hooks, downstream URI, headers)
//!                  → net::downstream client
//!                  → response.rs (relay or fixed 500)
//!     → Send to client
//! ```

pub mod gateway;
pub mod request;
pub mod response;
pub mod rewrite;
pub mod server;

pub use gateway::{Gateway, GatewayBuilder, GatewayError};
pub use response::PATH_NOT_FOUND;
pub use rewrite::{ForwardedHostHeaders, PathPrefix, RequestRewrite};
pub use server::HttpServer;
