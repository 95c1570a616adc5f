//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults, or the TOML file named by PIXEL_SERVER_CONFIG
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated)
//!     → lifecycle::startup builds the immutable ResponderConfig from it
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; there is no reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_from_env, render_config, ConfigError};
pub use schema::{ListenerConfig, ObservabilityConfig, ResponseConfig, ServerConfig};
pub use validation::ValidationError;
