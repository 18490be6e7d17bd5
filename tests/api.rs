//! HTTP surface integration tests
//!
//! Drives the real router with in-memory mock providers via
//! `tower::ServiceExt::oneshot` — no network, no real vendors.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use http_body_util::BodyExt;
use remodely::server;
use remodely_llm::{
    CallOptions, ChatProvider, Error, Message, Orchestrator, ProviderCost, ProviderMetadata,
    ProviderRegistry, ProviderReply, Result,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

struct MockProvider {
    meta: ProviderMetadata,
    reply: Option<&'static str>,
}

impl MockProvider {
    fn answering(name: &'static str, reply: &'static str) -> Self {
        Self {
            meta: ProviderMetadata {
                name,
                display_name: name,
                model: format!("{name}-model"),
                enabled: true,
                cost: Some(ProviderCost {
                    input_per_1k: 0.001,
                    output_per_1k: 0.002,
                }),
                quality_tier: Some(5),
            },
            reply: Some(reply),
        }
    }

    fn failing(name: &'static str) -> Self {
        let mut mock = Self::answering(name, "");
        mock.reply = None;
        mock
    }

    fn disabled(name: &'static str) -> Self {
        let mut mock = Self::answering(name, "unused");
        mock.meta.enabled = false;
        mock
    }
}

#[async_trait]
impl ChatProvider for MockProvider {
    fn meta(&self) -> &ProviderMetadata {
        &self.meta
    }

    async fn chat(&self, _messages: &[Message], _options: &CallOptions) -> Result<ProviderReply> {
        match self.reply {
            Some(reply) => Ok(ProviderReply {
                reply: reply.to_string(),
                model: self.meta.model.clone(),
                usage: None,
            }),
            None => Err(Error::Api(format!("{} is down", self.meta.name))),
        }
    }
}

fn app_with(providers: Vec<MockProvider>) -> axum::Router {
    let mut registry = ProviderRegistry::new();
    for provider in providers {
        registry.register(Arc::new(provider));
    }
    let orchestrator = Arc::new(Orchestrator::new(Arc::new(registry)));
    server::build_router(orchestrator, None)
}

fn chat_request(body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/ai/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_version() {
    let app = app_with(vec![]);

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn chat_answers_200_with_provider_reply() {
    let app = app_with(vec![MockProvider::answering("mock", "Hello from mock")]);

    let response = app
        .oneshot(chat_request(json!({
            "messages": [{"role": "user", "content": "hi"}]
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["reply"], "Hello from mock");
    assert_eq!(body["provider"], "mock");
    assert_eq!(body["model"], "mock-model");
}

#[tokio::test]
async fn chat_with_no_providers_is_still_200_offline() {
    let app = app_with(vec![]);

    let response = app
        .oneshot(chat_request(json!({
            "messages": [{"role": "user", "content": "anyone there?"}]
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["model"], "offline");
    assert_eq!(body["provider"], "none");
    assert!(body["reply"].as_str().unwrap().contains("anyone there?"));
}

#[tokio::test]
async fn chat_total_failure_is_still_200_unavailable() {
    let app = app_with(vec![MockProvider::failing("a"), MockProvider::failing("b")]);

    let response = app
        .oneshot(chat_request(json!({
            "messages": [{"role": "user", "content": "hi"}],
            "strategy": "cost"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["model"], "unavailable");
    assert_eq!(body["errorChain"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn chat_fallback_is_visible_in_body() {
    let app = app_with(vec![
        MockProvider::failing("broken"),
        MockProvider::answering("working", "recovered"),
    ]);

    let response = app
        .oneshot(chat_request(json!({
            "messages": [{"role": "user", "content": "hi"}],
            "strategy": "cost"
        })))
        .await
        .unwrap();

    let body = json_body(response).await;
    assert_eq!(body["reply"], "recovered");
    assert_eq!(body["provider"], "working");
    assert_eq!(body["fallbackTried"], json!(["broken"]));
}

#[tokio::test]
async fn chat_pins_specific_provider() {
    let app = app_with(vec![
        MockProvider::answering("first", "from first"),
        MockProvider::answering("second", "from second"),
    ]);

    let response = app
        .oneshot(chat_request(json!({
            "messages": [{"role": "user", "content": "hi"}],
            "provider": "second"
        })))
        .await
        .unwrap();

    let body = json_body(response).await;
    assert_eq!(body["provider"], "second");
    assert_eq!(body["reply"], "from second");
}

#[tokio::test]
async fn status_lists_all_providers_with_enabled_count() {
    let app = app_with(vec![
        MockProvider::answering("up", "x"),
        MockProvider::disabled("down"),
    ]);

    let response = app
        .oneshot(Request::get("/ai/status").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["enabledCount"], 1);
    let providers = body["providers"].as_array().unwrap();
    assert_eq!(providers.len(), 2);
    assert_eq!(providers[0]["name"], "up");
    assert_eq!(providers[0]["enabled"], true);
    assert_eq!(providers[1]["name"], "down");
    assert_eq!(providers[1]["enabled"], false);
}

#[tokio::test]
async fn malformed_body_is_rejected() {
    let app = app_with(vec![MockProvider::answering("mock", "x")]);

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/ai/chat")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
