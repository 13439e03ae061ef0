//! Foundation utilities shared by every brigade crate
//!
//! - [`error`]: error taxonomy and the [`error::UserFriendlyError`] reporting trait
//! - [`types`]: agent roles and resource-usage counters
//! - [`logging`]: tracing initialisation and structured phase log helpers
//! - [`redaction`]: scrubbing of credentials from transport error text

pub mod error;
pub mod logging;
pub mod redaction;
pub mod types;
