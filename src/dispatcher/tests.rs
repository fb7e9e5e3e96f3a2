use super::*;
use crate::client::RawResponse;
use crate::entity::{Ingredient, Recipe, UnitType};
use async_trait::async_trait;
use serde_json::{json, Number};
use std::sync::{Arc, Mutex};

/// Outcome the mock returns for create/update.
#[derive(Clone)]
enum Reply {
    /// Echo the entity back with this id assigned
    AssignId(i64),
    Fail(CookbookError),
}

struct MockClient {
    reply: Reply,
    fetch: CookbookResult<RawResponse>,
    recent: Vec<Recipe>,
    received: Arc<Mutex<Vec<CookbookEntity>>>,
    fetched: Arc<Mutex<Vec<(EntityKind, i64)>>>,
}

impl MockClient {
    fn new(reply: Reply) -> Self {
        Self {
            reply,
            fetch: Ok(RawResponse {
                status: 200,
                body: "{}".to_string(),
            }),
            recent: vec![],
            received: Arc::new(Mutex::new(vec![])),
            fetched: Arc::new(Mutex::new(vec![])),
        }
    }

    fn with_fetch(mut self, fetch: CookbookResult<RawResponse>) -> Self {
        self.fetch = fetch;
        self
    }

    fn respond(&self, entity: CookbookEntity) -> CookbookResult<CookbookEntity> {
        self.received.lock().unwrap().push(entity.clone());
        match &self.reply {
            Reply::AssignId(id) => Ok(match entity {
                CookbookEntity::Recipe(mut r) => {
                    r.id = Some(*id);
                    r.into()
                }
                CookbookEntity::Ingredient(mut i) => {
                    i.id = Some(*id);
                    i.into()
                }
            }),
            Reply::Fail(e) => Err(e.clone()),
        }
    }
}

#[async_trait]
impl CookbookClient for MockClient {
    async fn create(&self, entity: CookbookEntity) -> CookbookResult<CookbookEntity> {
        self.respond(entity)
    }

    async fn update(&self, entity: CookbookEntity) -> CookbookResult<CookbookEntity> {
        self.respond(entity)
    }

    async fn fetch_raw(&self, kind: EntityKind, id: i64) -> CookbookResult<RawResponse> {
        self.fetched.lock().unwrap().push((kind, id));
        self.fetch.clone()
    }

    async fn delete(&self, kind: EntityKind, id: i64) -> CookbookResult<()> {
        self.fetched.lock().unwrap().push((kind, id));
        Ok(())
    }

    async fn recently_added(&self) -> CookbookResult<Vec<Recipe>> {
        Ok(self.recent.clone())
    }
}

fn record(value: Value) -> GenericRecord {
    value.as_object().cloned().unwrap()
}

#[tokio::test]
async fn test_create_ingredient_assigns_id() {
    let dispatcher = EntityDispatcher::new(MockClient::new(Reply::AssignId(42)));

    let result = dispatcher
        .create(
            "com.cookbook.tutorial.service.Ingredient",
            record(json!({"name": "Salt", "quantity": 1})),
        )
        .await
        .unwrap();

    assert_eq!(result, record(json!({"id": 42, "name": "Salt", "quantity": 1})));
}

#[tokio::test]
async fn test_create_forwards_converted_entity() {
    let client = MockClient::new(Reply::AssignId(5));
    let received = Arc::clone(&client.received);
    let dispatcher = EntityDispatcher::new(client);

    dispatcher
        .create(
            "com.cookbook.tutorial.service.Recipe",
            record(json!({
                "name": "Toast",
                "directions": ["Slice", "Toast"],
                "ingredients": [{"name": "Bread", "quantity": 2, "unit": "UNIT"}]
            })),
        )
        .await
        .unwrap();

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 1);
    let expected: CookbookEntity = Recipe {
        name: Some("Toast".to_string()),
        directions: Some(vec!["Slice".to_string(), "Toast".to_string()]),
        ingredients: Some(vec![Ingredient {
            name: Some("Bread".to_string()),
            quantity: Some(Number::from(2)),
            unit: Some(UnitType::Unit),
            ..Default::default()
        }]),
        ..Default::default()
    }
    .into();
    assert_eq!(received[0], expected);
}

#[tokio::test]
async fn test_create_unknown_type_is_invalid_entity() {
    let client = MockClient::new(Reply::AssignId(1));
    let received = Arc::clone(&client.received);
    let dispatcher = EntityDispatcher::new(client);

    let err = dispatcher
        .create("unknown.Type", GenericRecord::new())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        CookbookError::invalid("Don't know how to handle type:unknown.Type")
    );
    assert!(received.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_create_conversion_failure_names_field() {
    let dispatcher = EntityDispatcher::new(MockClient::new(Reply::AssignId(1)));

    let err = dispatcher
        .create(
            "com.cookbook.tutorial.service.Ingredient",
            record(json!({"name": "Salt", "quantity": "lots"})),
        )
        .await
        .unwrap_err();

    assert_eq!(err.field(), Some("quantity"));
}

#[tokio::test]
async fn test_create_session_expired_propagates() {
    let expired = CookbookError::SessionExpired("token expired".to_string());
    let dispatcher = EntityDispatcher::new(MockClient::new(Reply::Fail(expired.clone())));

    let err = dispatcher
        .create(
            "com.cookbook.tutorial.service.Ingredient",
            record(json!({"name": "Salt"})),
        )
        .await
        .unwrap_err();

    assert_eq!(err, expired);
}

#[tokio::test]
async fn test_update_session_expired_propagates() {
    let expired = CookbookError::SessionExpired("token expired".to_string());
    let dispatcher = EntityDispatcher::new(MockClient::new(Reply::Fail(expired.clone())));

    let err = dispatcher
        .update(
            "com.cookbook.tutorial.service.Recipe",
            record(json!({"id": 3, "name": "Soup"})),
        )
        .await
        .unwrap_err();

    assert_eq!(err, expired);
}

#[tokio::test]
async fn test_update_not_found_propagates() {
    let not_found = CookbookError::EntityNotFound("ingredient 99".to_string());
    let dispatcher = EntityDispatcher::new(MockClient::new(Reply::Fail(not_found.clone())));

    let err = dispatcher
        .update(
            "com.cookbook.tutorial.service.Ingredient",
            record(json!({"id": 99, "name": "Pepper"})),
        )
        .await
        .unwrap_err();

    assert_eq!(err, not_found);
}

#[tokio::test]
async fn test_update_returns_client_result() {
    let dispatcher = EntityDispatcher::new(MockClient::new(Reply::AssignId(8)));
    let payload = record(json!({
        "id": 8,
        "name": "Pepper",
        "quantity": 0.5,
        "unit": "GRAMS",
        "lastModified": 1707668400000i64
    }));

    let result = dispatcher
        .update("com.cookbook.tutorial.service.Ingredient", payload.clone())
        .await
        .unwrap();

    assert_eq!(result, payload);
}

#[tokio::test]
async fn test_fetch_by_id_uses_requested_kind_and_id() {
    let client = MockClient::new(Reply::AssignId(1)).with_fetch(Ok(RawResponse {
        status: 200,
        body: r#"{"id": 12, "name": "Stew", "cookTime": 90}"#.to_string(),
    }));
    let fetched = Arc::clone(&client.fetched);
    let dispatcher = EntityDispatcher::new(client);

    let result = dispatcher.fetch_by_id(EntityKind::Recipe, 12).await.unwrap();

    assert_eq!(result, record(json!({"id": 12, "name": "Stew", "cookTime": 90})));
    assert_eq!(*fetched.lock().unwrap(), vec![(EntityKind::Recipe, 12)]);
}

#[tokio::test]
async fn test_fetch_by_id_non_success_status() {
    let client = MockClient::new(Reply::AssignId(1)).with_fetch(Ok(RawResponse {
        status: 404,
        body: r#"{"message": "No such entity"}"#.to_string(),
    }));
    let dispatcher = EntityDispatcher::new(client);

    let err = dispatcher
        .fetch_by_id(EntityKind::Ingredient, 3)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        CookbookError::RemoteFetchFailed {
            status: 404,
            body: r#"{"message": "No such entity"}"#.to_string(),
        }
    );
}

#[tokio::test]
async fn test_fetch_by_id_non_object_body() {
    let client = MockClient::new(Reply::AssignId(1)).with_fetch(Ok(RawResponse {
        status: 200,
        body: "[1, 2]".to_string(),
    }));
    let dispatcher = EntityDispatcher::new(client);

    let err = dispatcher
        .fetch_by_id(EntityKind::Ingredient, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, CookbookError::InvalidEntity { .. }));
}

#[tokio::test]
async fn test_fetch_by_id_transport_error_propagates() {
    let client = MockClient::new(Reply::AssignId(1))
        .with_fetch(Err(CookbookError::Transport("connection refused".to_string())));
    let dispatcher = EntityDispatcher::new(client);

    let err = dispatcher
        .fetch_by_id(EntityKind::Ingredient, 1)
        .await
        .unwrap_err();
    assert_eq!(err, CookbookError::Transport("connection refused".to_string()));
}

#[tokio::test]
async fn test_delete_delegates() {
    let client = MockClient::new(Reply::AssignId(1));
    let calls = Arc::clone(&client.fetched);
    let dispatcher = EntityDispatcher::new(client);

    dispatcher.delete(EntityKind::Recipe, 4).await.unwrap();
    assert_eq!(*calls.lock().unwrap(), vec![(EntityKind::Recipe, 4)]);
}

#[tokio::test]
async fn test_recently_added_as_records() {
    let mut client = MockClient::new(Reply::AssignId(1));
    client.recent = vec![
        Recipe {
            id: Some(1),
            name: Some("Soup".to_string()),
            ..Default::default()
        },
        Recipe {
            id: Some(2),
            name: Some("Salad".to_string()),
            prep_time: Some(Number::from(5)),
            ..Default::default()
        },
    ];
    let dispatcher = EntityDispatcher::new(client);

    let records = dispatcher.recently_added().await.unwrap();
    assert_eq!(
        records,
        vec![
            record(json!({"id": 1, "name": "Soup"})),
            record(json!({"id": 2, "name": "Salad", "prepTime": 5})),
        ]
    );
}
