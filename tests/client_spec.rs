mod common;

use entity_browser::client::{Body, ClientError, DeleteOutcome, EntityClient, Verb};
use entity_browser::config::ClientConfig;
use entity_browser::models::{EntityId, Params};
use serde_json::json;

use common::{spawn, widget, Backend};

async fn setup(backend: &Backend) -> EntityClient {
    let url = spawn(backend.clone()).await;
    EntityClient::new(url).expect("Failed to build client")
}

mod get_entity {
    use super::*;

    #[tokio::test]
    async fn returns_entity_with_numeric_id() {
        let backend = Backend::new();
        backend.insert(widget());
        let client = setup(&backend).await;

        let entity = client
            .get_entity(&EntityId::from("42"))
            .await
            .expect("Request failed");

        assert_eq!(entity.id, EntityId::from(42u64));
        assert_eq!(entity.kind, "widget");
        assert_eq!(entity.param, Some(Params::Text("x".to_string())));
    }

    #[tokio::test]
    async fn res_null_maps_to_not_found() {
        let backend = Backend::new();
        let client = setup(&backend).await;

        let result = client.get_entity(&EntityId::from("404")).await;

        assert!(matches!(result, Err(ClientError::NotFound(_))));
    }

    #[tokio::test]
    async fn server_error_is_reported() {
        let backend = Backend::new();
        let client = setup(&backend).await;

        let result = client.get_entity(&EntityId::from("boom")).await;

        match result {
            Err(ClientError::Server(msg)) => assert!(msg.contains("database exploded")),
            other => panic!("expected server error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn malformed_json_is_a_decode_error() {
        let backend = Backend::new();
        backend.raw_body("9", "<html>oops</html>");
        let client = setup(&backend).await;

        let result = client.get_entity(&EntityId::from("9")).await;

        assert!(matches!(result, Err(ClientError::Decode(_))));
    }

    #[tokio::test]
    async fn rejects_ids_that_are_not_a_path_segment() {
        let backend = Backend::new();
        let client = setup(&backend).await;

        for id in ["", "  ", "1/param", "1?x", "1#y"] {
            let result = client.get_entity(&EntityId::from(id)).await;
            assert!(
                matches!(result, Err(ClientError::InvalidId(_))),
                "id {:?} should be rejected",
                id
            );
        }
    }

    #[tokio::test]
    async fn times_out_instead_of_hanging() {
        let backend = Backend::new();
        backend.insert(widget()).delay("42", 2_000);
        let url = spawn(backend.clone()).await;
        let client = EntityClient::from_config(&ClientConfig {
            base_url: url,
            request_timeout_ms: 50,
            ..ClientConfig::default()
        })
        .expect("Failed to build client");

        let result = client.get_entity(&EntityId::from("42")).await;

        match result {
            Err(ClientError::Http(e)) => assert!(e.is_timeout()),
            other => panic!("expected timeout, got {:?}", other),
        }
    }
}

mod get_params {
    use super::*;

    #[tokio::test]
    async fn unwraps_res_envelope() {
        let backend = Backend::new();
        backend.insert(json!({ "id": 5, "type": "trial", "param": { "color": "red" } }));
        let client = setup(&backend).await;

        let params = client
            .get_params(&EntityId::from("5"))
            .await
            .expect("Request failed");

        match params {
            Some(Params::Map(map)) => assert_eq!(map["color"], json!("red")),
            other => panic!("expected map, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn entity_without_params_returns_none() {
        let backend = Backend::new();
        backend.insert(json!({ "id": 6, "type": "trial" }));
        let client = setup(&backend).await;

        let params = client
            .get_params(&EntityId::from("6"))
            .await
            .expect("Request failed");

        assert!(params.is_none());
    }
}

mod delete_entity {
    use super::*;

    #[tokio::test]
    async fn deletes_existing_entity() {
        let backend = Backend::new();
        backend.insert(widget());
        let client = setup(&backend).await;

        let outcome = client
            .delete_entity(&EntityId::from("42"))
            .await
            .expect("Request failed");

        assert_eq!(outcome, DeleteOutcome::Deleted);
        assert!(!backend.contains("42"));
    }

    #[tokio::test]
    async fn unknown_entity_is_missing() {
        let backend = Backend::new();
        let client = setup(&backend).await;

        let outcome = client
            .delete_entity(&EntityId::from("77"))
            .await
            .expect("Request failed");

        assert_eq!(outcome, DeleteOutcome::Missing);
    }

    #[tokio::test]
    async fn plain_text_body_counts_as_deleted() {
        let backend = Backend::new();
        backend.insert(widget()).plain_delete("42", "OK");
        let client = setup(&backend).await;

        let outcome = client
            .delete_entity(&EntityId::from("42"))
            .await
            .expect("Request failed");

        assert_eq!(outcome, DeleteOutcome::Deleted);
        assert!(!backend.contains("42"));
    }

    #[tokio::test]
    async fn empty_body_counts_as_deleted() {
        let backend = Backend::new();
        backend.insert(widget()).plain_delete("42", "");
        let client = setup(&backend).await;

        let outcome = client
            .delete_entity(&EntityId::from("42"))
            .await
            .expect("Request failed");

        assert_eq!(outcome, DeleteOutcome::Deleted);
    }
}

mod send {
    use super::*;

    #[tokio::test]
    async fn put_goes_through_the_same_call_shape() {
        let backend = Backend::new();
        let client = setup(&backend).await;
        let body = json!({ "type": "gadget" });

        let response = client
            .send(Verb::Put, "/entity/50", Body::Json(&body))
            .await
            .expect("Request failed");

        assert!(response.status().is_success());
        let answer: serde_json::Value = response.json().await.expect("Bad JSON");
        assert_eq!(answer, json!({ "res": "PUT50" }));
        assert_eq!(
            backend.get("50"),
            Some(json!({ "id": "50", "type": "gadget" }))
        );

        let entity = client
            .get_entity(&EntityId::from("50"))
            .await
            .expect("Request failed");
        assert_eq!(entity.kind, "gadget");
    }
}

mod submit_text {
    use super::*;

    #[tokio::test]
    async fn returns_backend_markup() {
        let backend = Backend::new();
        let client = setup(&backend).await;

        let html = client.submit_text("hello there").await.expect("Request failed");

        assert_eq!(html, "hello there");
    }
}

mod auth {
    use super::*;

    #[tokio::test]
    async fn sends_bearer_token() {
        let backend = Backend::new().with_api_key("s3cret");
        backend.insert(widget());
        let url = spawn(backend.clone()).await;

        let anonymous = EntityClient::new(url.clone()).expect("Failed to build client");
        let result = anonymous.get_entity(&EntityId::from("42")).await;
        assert!(matches!(result, Err(ClientError::Unauthorized)));

        let client = EntityClient::from_config(&ClientConfig {
            base_url: url,
            api_key: Some("s3cret".to_string()),
            ..ClientConfig::default()
        })
        .expect("Failed to build client");
        let entity = client
            .get_entity(&EntityId::from("42"))
            .await
            .expect("Request failed");
        assert_eq!(entity.kind, "widget");
    }
}

#[tokio::test]
async fn trailing_slash_in_base_url_is_ignored() {
    let backend = Backend::new();
    backend.insert(widget());
    let url = spawn(backend.clone()).await;
    let client = EntityClient::new(format!("{}/", url)).expect("Failed to build client");

    assert_eq!(client.base_url(), url);
    assert!(client.get_entity(&EntityId::from("42")).await.is_ok());
}
