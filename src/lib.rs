//! Crate entrypoint wiring together configuration, validation, the PowerDNS
//! client and the reconciliation engine.

pub mod backend;
pub mod config;
pub mod error;
pub mod logging;
pub mod manager;
pub mod normalize;
pub mod powerdns;
pub mod report;
pub mod validation;

pub use backend::{BackendError, ZoneBackend};
pub use config::Config;
pub use error::{ConfigError, Error, ZoneError};
pub use manager::{ApplyOptions, ApplyResult, Confirm, Manager};
pub use powerdns::PowerDnsClient;
