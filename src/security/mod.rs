//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → ignoring list (match → straight to handler, nothing below runs)
//!     → firewall.rs (reject un-normalized paths)
//!     → filter.rs (resolve + validate bearer token)
//!     → policy.rs (first matching rule, else authenticated)
//!     → handler, with Principal in request extensions
//!
//! Denied request:
//!     → error.rs (302 to the access-denied page, 400 for firewall rejects)
//! ```
//!
//! # Design Decisions
//! - Stateless: no session, no cookies, no CSRF tokens
//! - Policy compiled once at startup, immutable at runtime
//! - Ignored paths and public paths are separate rule sets
//! - Services are passed explicitly; nothing is global

pub mod chain;
pub mod context;
pub mod cors;
pub mod error;
pub mod filter;
pub mod firewall;
pub mod manager;
pub mod password;
pub mod pattern;
pub mod policy;
pub mod services;
pub mod token;
pub mod users;
pub mod web_security;

pub use context::{Authenticated, Principal};
pub use error::SecurityError;
pub use services::SecurityServices;
pub use web_security::{Decision, WebSecurity};
