//! Admission subsystem.
//!
//! # Data Flow
//! ```text
//! Allowlist compilation (at startup):
//!     ["/company", "/account/{id}/user", ...]
//!     → matcher.rs (normalize skeleton, substitute {id}, anchor)
//!     → allowlist.rs (ordered, immutable Allowlist)
//!
//! Incoming request target ("/Account/acc1?x=y")
//!     → matcher.rs (normalize: drop query, lower-case, trim one slash each end)
//!     → allowlist.rs (any pattern matches whole path?)
//!     → Return: admitted / not admitted
//! ```
//!
//! # Design Decisions
//! - Compiled once, immutable at runtime, shared without locks
//! - No distinct "invalid path" outcome: anything unmatched is rejected
//! - Insertion order preserved for reproducible iteration

pub mod allowlist;
pub mod matcher;

pub use allowlist::Allowlist;
pub use matcher::{normalize, Matcher, PathPattern, PatternError, ID_FORMAT, ID_PLACEHOLDER};
