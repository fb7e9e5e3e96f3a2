//! Cookbook Connector - runtime around the cookbook entity dispatcher.
//!
//! Wires the [`EntityDispatcher`](cookbook::EntityDispatcher) to the
//! cookbook REST API, keeps the OAuth session alive, serves the entity
//! operations over HTTP and polls the recently-added feed.
//!
//! # Architecture
//!
//! ```text
//!   HTTP caller                    PollingScheduler
//!        ↓                                ↓
//! ┌─────────────────────────────────────────┐
//! │       Session                            │
//! │  - Current credentials                   │
//! │  - Refresh + retry once on expiry        │
//! └─────────────────────────────────────────┘
//!        ↓
//! ┌─────────────────────────────────────────┐
//! │       CookbookConnector                  │
//! │  - EntityDispatcher over CookbookApi     │
//! │  - Recently added feed                   │
//! └─────────────────────────────────────────┘
//!        ↓
//!   Cookbook REST service
//! ```
//!
//! # Core Types
//!
//! - [`Connector`] - Trait for polling feed sources
//! - [`CookbookConnector`] - REST-backed cookbook connector
//! - [`Session`] - Shared OAuth session with reconnect-on-expiry
//! - [`PollingScheduler`] - Interval polling with status tracking

mod connector;
pub mod api;
pub mod connectors;
pub mod scheduler;
pub mod session;

pub use connector::Connector;
pub use connectors::CookbookConnector;
pub use scheduler::{PollingScheduler, SourceCallback, SourceStatus};
pub use session::Session;

// Re-export credential and OAuth types from the core crate for convenience
pub use cookbook::config::OAuthConfig;
pub use cookbook::credentials::Credentials;
