use std::sync::Arc;

use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use argsync_core::argument::{ArgumentPatch, ArgumentSpec, desired_set};
use argsync_core::reconciler::Reconciler;
use argsync_core::store::{ParameterStore, StoreError};
use argsync_scalr::{ProviderConfigurationCreate, ScalrClient, ScalrError};

fn client(server: &MockServer) -> ScalrClient {
    ScalrClient::with_base_url(server.uri(), "test-token").unwrap()
}

fn parameter_json(id: &str, key: &str, value: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "provider-configuration-parameters",
        "id": id,
        "attributes": { "key": key, "value": value, "sensitive": false }
    })
}

#[tokio::test]
async fn list_parameters_parses_document() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/provider-configurations/pcfg-1/parameters"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [
                parameter_json("pcfg-param-1", "region", "us-east-1"),
                {
                    "type": "provider-configuration-parameters",
                    "id": "pcfg-param-2",
                    "attributes": { "key": "token", "sensitive": true }
                }
            ]
        })))
        .mount(&server)
        .await;

    let arguments = client(&server).list_parameters("pcfg-1").await.unwrap();

    assert_eq!(arguments.len(), 2);
    assert_eq!(arguments[0].id, "pcfg-param-1");
    assert_eq!(arguments[0].value.as_deref(), Some("us-east-1"));
    assert_eq!(arguments[1].key, "token");
    assert!(arguments[1].sensitive);
    assert_eq!(arguments[1].value, None);
}

#[tokio::test]
async fn create_parameter_posts_json_api_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/provider-configurations/pcfg-1/parameters"))
        .and(body_partial_json(serde_json::json!({
            "data": {
                "type": "provider-configuration-parameters",
                "attributes": { "key": "region", "value": "us-east-1", "sensitive": false }
            }
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "data": parameter_json("pcfg-param-9", "region", "us-east-1")
            })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let spec = ArgumentSpec::new("region").with_value("us-east-1");
    let argument = client(&server)
        .create_parameter("pcfg-1", &spec)
        .await
        .unwrap();

    assert_eq!(argument.id, "pcfg-param-9");
    assert_eq!(argument.key, "region");
}

#[tokio::test]
async fn update_parameter_patches_by_id() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/provider-configuration-parameters/pcfg-param-1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": parameter_json("pcfg-param-1", "region", "eu-west-1")
            })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let patch = ArgumentPatch {
        id: "pcfg-param-1".to_string(),
        key: "region".to_string(),
        value: Some("eu-west-1".to_string()),
        sensitive: false,
        description: None,
    };
    let argument = client(&server).update_parameter(&patch).await.unwrap();

    assert_eq!(argument.value.as_deref(), Some("eu-west-1"));
}

#[tokio::test]
async fn missing_parameter_maps_to_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/provider-configuration-parameters/pcfg-param-1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "errors": [{"title": "Not Found", "detail": "parameter does not exist"}]
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .delete_parameter("pcfg-param-1")
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(err.to_string().contains("parameter does not exist"));
}

#[tokio::test]
async fn rejected_token_maps_to_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/provider-configurations/pcfg-1/parameters"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "errors": [{"title": "Unauthorized"}]
        })))
        .mount(&server)
        .await;

    let err = client(&server).list_parameters("pcfg-1").await.unwrap_err();
    assert!(matches!(err, StoreError::Auth(_)));
}

#[tokio::test]
async fn reconciler_syncs_against_live_endpoints() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/provider-configurations/pcfg-1/parameters"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [
                parameter_json("pcfg-param-a", "a", "1"),
                parameter_json("pcfg-param-c", "c", "3")
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/provider-configuration-parameters/pcfg-param-c"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/provider-configurations/pcfg-1/parameters"))
        .and(body_partial_json(serde_json::json!({
            "data": { "attributes": { "key": "b" } }
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "data": parameter_json("pcfg-param-b", "b", "2")
            })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let desired = desired_set([
        ArgumentSpec::new("a").with_value("1"),
        ArgumentSpec::new("b").with_value("2"),
    ]);
    let outcome = Reconciler::new(Arc::new(client(&server)))
        .sync("pcfg-1", &desired)
        .await
        .unwrap();

    assert_eq!(outcome.created.len(), 1);
    assert_eq!(outcome.created[0].id, "pcfg-param-b");
    assert_eq!(outcome.deleted, vec!["pcfg-param-c".to_string()]);
    assert!(outcome.updated.is_empty());
}

#[tokio::test]
async fn failed_argument_creation_rolls_back_the_configuration() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/provider-configurations"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "data": {
                "type": "provider-configurations",
                "id": "pcfg-9",
                "attributes": { "name": "managed", "provider-name": "opsgenie", "is-custom": true }
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/provider-configurations/pcfg-9/parameters"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": [] })),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/provider-configurations/pcfg-9/parameters"))
        .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
            "errors": [{"detail": "key has already been taken"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/provider-configurations/pcfg-9"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let scalr = Arc::new(client(&server));
    let desired = desired_set([ArgumentSpec::new("api_key").with_value("x")]);
    let err = scalr
        .create_with_arguments(&ProviderConfigurationCreate::custom("managed", "opsgenie"), &desired)
        .await
        .unwrap_err();

    match err {
        ScalrError::RolledBack { id, source } => {
            assert_eq!(id, "pcfg-9");
            assert!(source.to_string().contains("api_key"));
        }
        other => panic!("expected RolledBack, got {other}"),
    }
}

#[tokio::test]
async fn failed_rollback_reports_both_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/provider-configurations"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "data": {
                "type": "provider-configurations",
                "id": "pcfg-9",
                "attributes": { "name": "managed", "provider-name": "opsgenie", "is-custom": true }
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/provider-configurations/pcfg-9/parameters"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": [] })),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/provider-configurations/pcfg-9/parameters"))
        .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
            "errors": [{"detail": "key has already been taken"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/provider-configurations/pcfg-9"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let scalr = Arc::new(client(&server));
    let desired = desired_set([ArgumentSpec::new("api_key").with_value("x")]);
    let err = scalr
        .create_with_arguments(&ProviderConfigurationCreate::custom("managed", "opsgenie"), &desired)
        .await
        .unwrap_err();

    match err {
        ScalrError::RollbackFailed { id, source, cleanup } => {
            assert_eq!(id, "pcfg-9");
            assert!(source.to_string().contains("api_key"));
            assert!(matches!(*cleanup, ScalrError::Api { status: 500, .. }));
        }
        other => panic!("expected RollbackFailed, got {other}"),
    }
}

#[tokio::test]
async fn read_provider_configuration_includes_parameters() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/provider-configurations/pcfg-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {
                "type": "provider-configurations",
                "id": "pcfg-1",
                "attributes": {
                    "name": "managed",
                    "provider-name": "opsgenie",
                    "is-custom": true,
                    "export-shell-variables": false
                }
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/provider-configurations/pcfg-1/parameters"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [parameter_json("pcfg-param-a", "a", "1")]
        })))
        .mount(&server)
        .await;

    let configuration = client(&server)
        .read_provider_configuration("pcfg-1")
        .await
        .unwrap();

    assert_eq!(configuration.id, "pcfg-1");
    assert_eq!(configuration.provider_name, "opsgenie");
    assert!(configuration.is_custom);
    assert_eq!(configuration.parameters.len(), 1);
    assert_eq!(configuration.parameters[0].key, "a");
}
