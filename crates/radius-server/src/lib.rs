//! RADIUS Server Implementation
//!
//! Request-processing engine built on top of the `radius-proto` protocol
//! implementation.
//!
//! # Features
//!
//! - Async UDP I/O with Tokio
//! - NAS directory with exact, wildcard, CIDR and hostname matching
//! - Duplicate request detection keyed by (address, port, identifier)
//! - Bounded-concurrency dispatch with graceful drain
//! - Pluggable authentication handlers (PAP and CHAP)
//! - JSON configuration
//!
//! # Example
//!
//! ```rust,no_run
//! use radius_server::{Config, RadiusServer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_json(r#"{
//!         "listen_port": 1812,
//!         "nas": [ { "short_name": "lab",
//!                    "address": { "value": "192.168.1.0/24", "type": "ipaddr" },
//!                    "secret": "testing123" } ],
//!         "users": [ { "username": "alice", "password": "password" } ]
//!     }"#)?;
//!
//!     let server = RadiusServer::from_config(&config)?;
//!     server.run_until(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     }).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod address;
pub mod auth_handler;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod nas;
pub mod pipeline;
pub mod server;
pub mod transaction;

pub use address::{match_ip_address, DnsResolver, StaticResolver, SystemResolver};
pub use auth_handler::{AuthHandler, SimpleAuthHandler};
pub use config::{Config, ConfigError, User};
pub use dispatcher::ConcurrentPacketHandler;
pub use error::ServerError;
pub use handler::PacketHandler;
pub use nas::{DefaultNasProvider, Nas, NasAddress, NasAddressKind, NasLimits, NasProvider};
pub use pipeline::RadiusPacketHandler;
pub use server::RadiusServer;
pub use transaction::{MemoryRadiusTransaction, RadiusTransaction, TransactionConfig, TransactionKey};
