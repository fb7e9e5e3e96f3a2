//! Backing client port for the remote cookbook service.

use crate::entity::{CookbookEntity, EntityKind, Recipe};
use crate::error::CookbookResult;
use async_trait::async_trait;

/// Raw HTTP response of a single-entity fetch.
///
/// The status is left for the caller to interpret so diagnostics can carry
/// the body of a failed request.
#[derive(Clone, Debug, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Authenticated access to the remote cookbook service.
///
/// Implementations own authentication and transport. Errors are reported with
/// the domain taxonomy (`SessionExpired`, `EntityNotFound`, ...) and are not
/// retried here.
#[async_trait]
pub trait CookbookClient: Send + Sync {
    /// Creates an entity; the result carries the server-assigned id.
    async fn create(&self, entity: CookbookEntity) -> CookbookResult<CookbookEntity>;

    /// Updates an existing entity.
    async fn update(&self, entity: CookbookEntity) -> CookbookResult<CookbookEntity>;

    /// Fetches a single entity as a raw JSON body.
    async fn fetch_raw(&self, kind: EntityKind, id: i64) -> CookbookResult<RawResponse>;

    async fn delete(&self, kind: EntityKind, id: i64) -> CookbookResult<()>;

    /// Recipes most recently added to the service.
    async fn recently_added(&self) -> CookbookResult<Vec<Recipe>>;
}
