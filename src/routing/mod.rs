//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Unit of work starts (inbound request)
//!     → caller builds a RoutingContext (tenant id from its own transport layer)
//!     → query layer marks each operation: set_intent(Read | Write)
//!     → registry.acquire(ctx) resolves group → snapshot
//!     → unit of work ends: ctx is dropped or reset
//! ```
//!
//! # Design Decisions
//! - The context is an explicit value owned by the caller, never ambient
//!   thread-local state; the routing core has no hidden dependency on a
//!   framework's request-scoping mechanism
//! - Write intent is sticky for the life of the context: a write followed by
//!   a read in the same unit of work must not observe stale replica state
//! - Routing failures are typed and surface to the caller; they are never
//!   retried internally

pub mod context;
pub mod error;

pub use context::{Intent, RoutingContext};
pub use error::RoutingError;
