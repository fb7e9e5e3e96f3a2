use async_trait::async_trait;
use cookbook::entity::{Entity, GenericRecord};
use cookbook::{
    CookbookClient, CookbookEntity, CookbookError, CookbookResult, EntityKind, RawResponse,
    Recipe,
};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// Builds the shared HTTP client used for every cookbook request.
pub fn build_http_client(timeout: Duration) -> CookbookResult<Client> {
    Client::builder()
        .user_agent("cookbook-connector/1.0")
        .timeout(timeout)
        .build()
        .map_err(transport)
}

/// HTTP client for the cookbook REST API.
///
/// Authenticates every request with an `access_token` query parameter and
/// asks for JSON responses.
pub struct CookbookApi {
    access_token: String,
    http_client: Client,
    base_url: String,
}

impl CookbookApi {
    /// Create a client against `base_url` reusing a shared `http_client`.
    pub fn new(http_client: Client, base_url: &str, access_token: String) -> Self {
        Self {
            access_token,
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn entity_url(&self, kind: EntityKind, id: i64) -> String {
        format!("{}/{}/{}", self.base_url, kind.as_str(), id)
    }

    /// Adds authentication and content negotiation, then sends.
    async fn send(&self, request: RequestBuilder) -> CookbookResult<Response> {
        request
            .query(&[("access_token", self.access_token.as_str())])
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(transport)
    }

    async fn send_entity(
        &self,
        request: RequestBuilder,
        kind: EntityKind,
        what: &str,
    ) -> CookbookResult<CookbookEntity> {
        let response = self.send(request).await?;
        let response = check_response_status(response, what).await?;
        read_entity(response, kind).await
    }
}

#[async_trait]
impl CookbookClient for CookbookApi {
    async fn create(&self, entity: CookbookEntity) -> CookbookResult<CookbookEntity> {
        let kind = entity.kind();
        let url = format!("{}/{}", self.base_url, kind.as_str());
        let request = self.http_client.post(&url).json(&entity.to_record());
        self.send_entity(request, kind, &format!("new {}", kind)).await
    }

    async fn update(&self, entity: CookbookEntity) -> CookbookResult<CookbookEntity> {
        let kind = entity.kind();
        let id = entity
            .id()
            .ok_or_else(|| CookbookError::invalid_field("id", "required for update"))?;
        let request = self
            .http_client
            .put(self.entity_url(kind, id))
            .json(&entity.to_record());
        self.send_entity(request, kind, &format!("{} {}", kind, id)).await
    }

    async fn fetch_raw(&self, kind: EntityKind, id: i64) -> CookbookResult<RawResponse> {
        let response = self.send(self.http_client.get(self.entity_url(kind, id))).await?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport)?;
        Ok(RawResponse { status, body })
    }

    async fn delete(&self, kind: EntityKind, id: i64) -> CookbookResult<()> {
        let response = self
            .send(self.http_client.delete(self.entity_url(kind, id)))
            .await?;
        check_response_status(response, &format!("{} {}", kind, id)).await?;
        Ok(())
    }

    async fn recently_added(&self) -> CookbookResult<Vec<Recipe>> {
        let url = format!("{}/recipe/recently-added", self.base_url);
        let response = self.send(self.http_client.get(&url)).await?;
        let response = check_response_status(response, "recently added recipes").await?;

        let items = match read_json(response).await? {
            Value::Array(items) => items,
            _ => return Err(CookbookError::invalid("recently added response is not an array")),
        };

        items
            .iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Object(record) => Recipe::from_record(record),
                _ => Err(CookbookError::invalid_field(
                    format!("[{}]", i),
                    "expected recipe object",
                )),
            })
            .collect()
    }
}

/// Maps a non-success response to the domain error taxonomy.
///
/// - 401 → session expired (token no longer accepted)
/// - 403 → invalid token
/// - 404 → entity not found
/// - 400 / 422 → entity rejected as malformed
/// - other non-2xx → generic API error
async fn check_response_status(response: Response, what: &str) -> CookbookResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read body>".to_string());

    Err(match status {
        StatusCode::UNAUTHORIZED => CookbookError::SessionExpired(body),
        StatusCode::FORBIDDEN => CookbookError::InvalidToken(body),
        StatusCode::NOT_FOUND => CookbookError::EntityNotFound(what.to_string()),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => CookbookError::invalid(body),
        s => CookbookError::Api {
            status: s.as_u16(),
            body,
        },
    })
}

async fn read_json(response: Response) -> CookbookResult<Value> {
    response
        .json::<Value>()
        .await
        .map_err(|e| CookbookError::invalid(format!("response is not valid JSON: {}", e)))
}

async fn read_entity(response: Response, kind: EntityKind) -> CookbookResult<CookbookEntity> {
    let record: GenericRecord = match read_json(response).await? {
        Value::Object(record) => record,
        _ => {
            return Err(CookbookError::invalid(format!(
                "{} response is not a JSON object",
                kind
            )))
        }
    };
    CookbookEntity::from_record(kind, &record)
}

fn transport(e: reqwest::Error) -> CookbookError {
    CookbookError::Transport(e.to_string())
}
