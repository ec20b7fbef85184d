//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! .env (optional) → environment
//! config file (TOML, from --config / CONFIG_PATH / <exe>.toml)
//!     → loader.rs (read, deserialize, apply env overrides)
//!     → validation.rs (semantic checks)
//!     → SidecarConfig (validated, immutable)
//!     → Gateway::from_config
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_env_file, resolve_config_path, ConfigError};
pub use schema::{AdminConfig, ListenerConfig, ObservabilityConfig, RewriteConfig, SidecarConfig};
pub use validation::{validate_config, ValidationError};
