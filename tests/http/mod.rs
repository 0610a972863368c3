use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

use recordform::backend::http::HttpBackend;
use recordform::backend::BackendClient;
use recordform::context::FormContext;
use recordform::form::{RecordForm, RecordFormProps, SubmitOutcome};
use recordform::nav::RecordingNavigator;

async fn mount(server: &MockServer, method_name: &str, response: serde_json::Value) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "packageName": "crm",
            "className": "account",
            "methodName": method_name,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .mount(server)
        .await;
}

async fn make_mock_rpc_server() -> MockServer {
    let server = MockServer::start().await;
    mount(
        &server,
        "schemaGet",
        json!({"ok": true, "data": {
            "name": "Accounts",
            "schema": {
                "id": {"primaryKey": true, "table": "account"},
                "company": {"friendlyName": "Company", "table": "account"}
            }
        }}),
    )
    .await;
    server
}

fn context(server: &MockServer) -> (FormContext, Arc<RecordingNavigator>) {
    let backend = HttpBackend::try_new(&server.uri(), None).unwrap();
    let navigator = Arc::new(RecordingNavigator::new());
    let ctx = FormContext::new(BackendClient::new(Arc::new(backend)), navigator.clone());
    (ctx, navigator)
}

#[tokio::test]
async fn test_create_over_http() {
    let server = make_mock_rpc_server().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "methodName": "recordCreate",
            "args": {"data": {"company": "Globex"}},
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "data": {"id": 42}})))
        .expect(1)
        .mount(&server)
        .await;

    let (ctx, navigator) = context(&server);
    let mut form = RecordForm::new(ctx, RecordFormProps::create("crm", "account"));
    form.load().await.unwrap();
    form.handle_change("company", json!("Globex")).unwrap();

    let outcome = form.submit().await.unwrap();
    assert_eq!(outcome, SubmitOutcome::Navigated("/crm/account/42".parse().unwrap()));
    assert_eq!(navigator.history().len(), 1);
}

#[tokio::test]
async fn test_rejected_create_shows_server_message() {
    let server = make_mock_rpc_server().await;
    mount(
        &server,
        "recordCreate",
        json!({"ok": false, "data": {"error": "Company already exists"}}),
    )
    .await;

    let (ctx, navigator) = context(&server);
    let mut form = RecordForm::new(ctx, RecordFormProps::create("crm", "account"));
    form.load().await.unwrap();
    form.handle_change("company", json!("Acme")).unwrap();

    assert!(form.submit().await.is_err());
    let error = form.render().layout().and_then(|l| l.error.clone()).unwrap();
    assert!(error.contains("Company already exists"));
    assert_eq!(form.value("company"), json!("Acme"));
    assert!(navigator.history().is_empty());
}

#[tokio::test]
async fn test_missing_created_id() {
    let server = make_mock_rpc_server().await;
    mount(&server, "recordCreate", json!({"ok": true, "data": {}})).await;

    let (ctx, _) = context(&server);
    let mut form = RecordForm::new(ctx, RecordFormProps::create("crm", "account"));
    form.load().await.unwrap();

    assert!(matches!(
        form.submit().await,
        Err(recordform::form::FormError::MissingCreatedId)
    ));
}

#[tokio::test]
async fn test_schema_fetch_failure_keeps_loading() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (ctx, _) = context(&server);
    let mut form = RecordForm::new(ctx, RecordFormProps::create("crm", "account"));

    assert!(form.load().await.is_err());
    assert!(form.render().layout().is_none());
}
