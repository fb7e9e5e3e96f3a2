//! Cookbook core - entity model and dispatch for the cookbook service.
//!
//! Callers work with loosely-typed records and a type tag; the
//! [`EntityDispatcher`] converts them into typed entities, hands them to a
//! [`CookbookClient`], and converts the result back.
//!
//! ```text
//!   caller (type tag + GenericRecord)
//!            ↓
//! ┌─────────────────────────────────────────┐
//! │       EntityDispatcher                   │
//! │  - Resolve entity kind                   │
//! │  - Record ⇄ typed entity conversion      │
//! └─────────────────────────────────────────┘
//!            ↓
//! ┌─────────────────────────────────────────┐
//! │       CookbookClient (injected)          │
//! │  - Authenticated REST calls              │
//! └─────────────────────────────────────────┘
//!            ↓
//!     Remote cookbook service
//! ```

// Backing client port
pub mod client;

// Configuration (TOML + environment)
pub mod config;

// OAuth credential value type
pub mod credentials;

// Type-tagged entity dispatch
pub mod dispatcher;

// Entity kinds, typed entities and generic records
pub mod entity;

// Domain error taxonomy
pub mod error;

pub use client::{CookbookClient, RawResponse};
pub use dispatcher::EntityDispatcher;
pub use entity::{CookbookEntity, EntityKind, GenericRecord, Ingredient, Recipe};
pub use error::{CookbookError, CookbookResult};
