//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → schema.rs normalize (fold pool settings down the tree)
//!     → validation.rs (semantic checks)
//!     → RouterConfig (validated, immutable)
//!     → SourceRegistry::reconcile
//!
//! On reload signal:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → full RouterConfig sent over channel
//!     → embedder calls reconcile; registry diffs against its own live state
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes arrive as a complete new copy,
//!   never as incremental deltas
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{GroupConfig, RouterConfig, SourceConfig, TenantBinding};
pub use validation::{validate_config, ValidationError};
pub use watcher::ConfigWatcher;
