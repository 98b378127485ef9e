use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::Response;
use axum::routing::{get, post};
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tesouraria_core::models::{Beneficiary, ClassificationRule};
use tesouraria_core::{MemoryStore, TextExtractor};
use tesouraria_functions::{AppState, WhatsAppSettings, router};
use tower::ServiceExt;

fn rule(id: &str, term: &str, category: &str, beneficiary: Option<&str>) -> ClassificationRule {
    ClassificationRule {
        id: id.to_string(),
        owner_id: "owner-1".to_string(),
        term: term.to_string(),
        category_id: Some(category.to_string()),
        beneficiary_id: beneficiary.map(str::to_string),
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
    }
}

fn store() -> MemoryStore {
    MemoryStore::new()
        .with_rule(rule("r-luz", "energia", "cat-luz", Some("b-cemig")))
        .with_beneficiary(Beneficiary::new("b-cemig", "owner-1", "Cemig Distribuição"))
        .with_beneficiary(Beneficiary::new("b-maria", "owner-1", "Maria Silva Santos"))
        .with_beneficiary(Beneficiary::new("b-other", "owner-2", "Maria"))
}

fn direct_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

fn state(whatsapp: WhatsAppSettings) -> AppState {
    AppState::new(Some(Arc::new(store())), TextExtractor::default(), whatsapp).with_http(direct_client())
}

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_preflight_answers_ok_with_cors() {
    for uri in ["/analisar-comprovante", "/whatsapp-send-message"] {
        let request = Request::builder().method("OPTIONS").uri(uri).body(Body::empty()).unwrap();
        let response = router(state(WhatsAppSettings::default())).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        assert_eq!(
            response.headers()["access-control-allow-headers"],
            "authorization, x-client-info, apikey, content-type"
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"ok");
    }
}

#[tokio::test]
async fn test_classifier_rejects_other_methods() {
    let request = Request::builder()
        .method("GET")
        .uri("/analisar-comprovante")
        .body(Body::empty())
        .unwrap();
    let response = router(state(WhatsAppSettings::default())).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"Method not allowed");
}

#[tokio::test]
async fn test_classifier_missing_fields() {
    let response = router(state(WhatsAppSettings::default()))
        .oneshot(post_json("/analisar-comprovante", r#"{"url": "https://x"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({"success": false, "error": "missing url/file_url or user_id"})
    );
}

#[tokio::test]
async fn test_classifier_malformed_body_is_server_error() {
    let response = router(state(WhatsAppSettings::default()))
        .oneshot(post_json("/analisar-comprovante", "not json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["success"], false);
}

#[tokio::test]
async fn test_unreachable_document_classifies_on_url() {
    let body = json!({
        "file_url": "http://127.0.0.1:1/Conta-ENERGIA-cemig-distribuicao.pdf",
        "user_id": "owner-1"
    });
    let response = router(state(WhatsAppSettings::default()))
        .oneshot(post_json("/analisar-comprovante", &body.to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let value = body_json(response).await;
    assert_eq!(value["success"], true);
    assert_eq!(value["sugestao"]["categoria_id"], "cat-luz");
    assert_eq!(value["sugestao"]["motivo"], "term matched: energia");
    assert_eq!(value["recebedor_nome"], Value::Null);
    assert_eq!(value["beneficiario_id"], "b-cemig");
}

#[tokio::test]
async fn test_text_document_names_receiver() {
    let upstream = spawn(Router::new().route(
        "/comprovante.txt",
        get(|| async {
            (
                [(CONTENT_TYPE, "text/plain; charset=utf-8")],
                "Comprovante de transferência PIX\nPara: Maria Silva Santos\nValor: R$ 10,00",
            )
        }),
    ))
    .await;
    let body = json!({
        "url": format!("{}/comprovante.txt", upstream),
        "user_id": "owner-1",
        "descricao": "ajuda de custo"
    });
    let response = router(state(WhatsAppSettings::default()))
        .oneshot(post_json("/analisar-comprovante", &body.to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({
            "success": true,
            "sugestao": null,
            "recebedor_nome": "Maria Silva Santos",
            "beneficiario_id": "b-maria"
        })
    );
}

#[tokio::test]
async fn test_classifier_without_store() {
    let state = AppState::new(None, TextExtractor::default(), WhatsAppSettings::default());
    let body = json!({"url": "http://127.0.0.1:1/x.pdf", "user_id": "owner-1"});
    let response = router(state)
        .oneshot(post_json("/analisar-comprovante", &body.to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["success"], false);
}

#[tokio::test]
async fn test_whatsapp_without_credentials() {
    let response = router(state(WhatsAppSettings::default()))
        .oneshot(post_json("/whatsapp-send-message", r#"{"numero": "1", "mensagem": "oi"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn test_whatsapp_missing_field() {
    let settings = WhatsAppSettings::new("http://127.0.0.1:1", "token-1");
    let response = router(state(settings))
        .oneshot(post_json("/whatsapp-send-message", r#"{"numero": "11999998888"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({"error": "numero and mensagem are required"})
    );
}

type Received = Arc<Mutex<Vec<(Option<String>, Value)>>>;

fn provider(status: StatusCode, answer: Value, received: Received) -> Router {
    Router::new().route(
        "/send/text",
        post(move |headers: HeaderMap, axum::Json(body): axum::Json<Value>| {
            let received = received.clone();
            let answer = answer.clone();
            async move {
                let token = headers
                    .get("token")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                received.lock().unwrap().push((token, body));
                (status, axum::Json(answer))
            }
        }),
    )
}

#[tokio::test]
async fn test_whatsapp_relays_formatted_number() {
    let received: Received = Arc::default();
    let base = spawn(provider(StatusCode::OK, json!({"id": "msg-1"}), received.clone())).await;

    let response = router(state(WhatsAppSettings::new(base, "token-1")))
        .oneshot(post_json(
            "/whatsapp-send-message",
            r#"{"numero": "(11) 99999-8888", "mensagem": "Olá"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"success": true, "result": {"id": "msg-1"}})
    );

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].0.as_deref(), Some("token-1"));
    assert_eq!(received[0].1, json!({"number": "5511999998888", "text": "Olá"}));
}

#[tokio::test]
async fn test_whatsapp_passes_provider_status_through() {
    let received: Received = Arc::default();
    let base = spawn(provider(
        StatusCode::UNAUTHORIZED,
        json!({"message": "invalid token"}),
        received,
    ))
    .await;

    let response = router(state(WhatsAppSettings::new(base, "bad")))
        .oneshot(post_json(
            "/whatsapp-send-message",
            r#"{"numero": "5511999998888", "mensagem": "Olá"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await,
        json!({"error": "failed to send message", "details": {"message": "invalid token"}})
    );
}
