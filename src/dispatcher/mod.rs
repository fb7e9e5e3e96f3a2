//! Entity dispatcher - type-tagged CRUD over generic records.
//!
//! Translates between caller-facing [`GenericRecord`]s and the backing
//! client's typed entities:
//!
//! ```text
//! (type tag, record) ──resolve_kind──> EntityKind
//!          │                              │
//!          └──────── from_record ─────────┘
//!                        ↓
//!                 CookbookEntity ──> CookbookClient ──> CookbookEntity
//!                                                          ↓
//!                                                      to_record
//! ```
//!
//! The dispatcher is stateless. Backing-client errors propagate unchanged;
//! reconnection and retry belong to the caller.

#[cfg(test)]
mod tests;

use crate::client::CookbookClient;
use crate::entity::{resolve_kind, CookbookEntity, Entity, EntityKind, GenericRecord};
use crate::error::{CookbookError, CookbookResult};
use serde_json::Value;
use tracing::debug;

/// Dispatches generic records to a [`CookbookClient`].
pub struct EntityDispatcher<C> {
    client: C,
}

impl<C: CookbookClient> EntityDispatcher<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Creates the entity described by `payload`.
    ///
    /// # Errors
    /// - `InvalidEntity` if the tag names no known kind or the payload does
    ///   not convert
    /// - any backing-client error, unmodified
    pub async fn create(
        &self,
        type_tag: &str,
        payload: GenericRecord,
    ) -> CookbookResult<GenericRecord> {
        let entity = to_entity(type_tag, &payload)?;
        debug!(kind = %entity.kind(), "Dispatching create");
        let created = self.client.create(entity).await?;
        Ok(created.to_record())
    }

    /// Updates the entity described by `payload`.
    ///
    /// Same contract as [`create`](Self::create); additionally surfaces
    /// `EntityNotFound` from the backing client.
    pub async fn update(
        &self,
        type_tag: &str,
        payload: GenericRecord,
    ) -> CookbookResult<GenericRecord> {
        let entity = to_entity(type_tag, &payload)?;
        debug!(kind = %entity.kind(), id = ?entity.id(), "Dispatching update");
        let updated = self.client.update(entity).await?;
        Ok(updated.to_record())
    }

    /// Fetches a single entity and returns its JSON body as a record.
    ///
    /// # Errors
    /// - `RemoteFetchFailed` on a non-success status (carries status and body)
    /// - `InvalidEntity` if the body is not a JSON object
    pub async fn fetch_by_id(&self, kind: EntityKind, id: i64) -> CookbookResult<GenericRecord> {
        debug!(kind = %kind, id = id, "Dispatching fetch");
        let response = self.client.fetch_raw(kind, id).await?;

        if !response.is_success() {
            return Err(CookbookError::RemoteFetchFailed {
                status: response.status,
                body: response.body,
            });
        }

        match serde_json::from_str::<Value>(&response.body) {
            Ok(Value::Object(record)) => Ok(record),
            Ok(_) => Err(CookbookError::invalid(format!(
                "{} {} response is not a JSON object",
                kind, id
            ))),
            Err(e) => Err(CookbookError::invalid(format!(
                "{} {} response is not valid JSON: {}",
                kind, id, e
            ))),
        }
    }

    pub async fn delete(&self, kind: EntityKind, id: i64) -> CookbookResult<()> {
        debug!(kind = %kind, id = id, "Dispatching delete");
        self.client.delete(kind, id).await
    }

    /// Recently added recipes, each converted to a record.
    pub async fn recently_added(&self) -> CookbookResult<Vec<GenericRecord>> {
        let recipes = self.client.recently_added().await?;
        Ok(recipes.iter().map(|r| r.to_record()).collect())
    }
}

/// Resolves the tag and converts the payload into the matching typed entity.
fn to_entity(type_tag: &str, payload: &GenericRecord) -> CookbookResult<CookbookEntity> {
    let kind = resolve_kind(type_tag).map_err(|_| {
        CookbookError::invalid(format!("Don't know how to handle type:{}", type_tag))
    })?;
    CookbookEntity::from_record(kind, payload)
}
