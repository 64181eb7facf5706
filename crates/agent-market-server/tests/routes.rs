use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use agent_market_core::catalog::AgentRecord;
use agent_market_core::checkout::{Billing, CheckoutSession, ValidCheckout};
use agent_market_core::config::MarketConfig;
use agent_market_core::error::Result as MarketResult;
use agent_market_core::identity::{IdentityProvider, UserIdentity};
use agent_market_core::payment::PaymentGateway;
use agent_market_core::seed::load_bundled_catalog;
use agent_market_core::store::{AgentRepository, MemoryStore};
use agent_market_core::MarketError;
use agent_market_server::{router, AppState};
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

#[derive(Default)]
struct FakeGateway {
    calls: AtomicUsize,
    last: std::sync::Mutex<Option<ValidCheckout>>,
    fail: bool,
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_session(&self, checkout: &ValidCheckout) -> MarketResult<CheckoutSession> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(checkout.clone());
        if self.fail {
            return Err(MarketError::Api {
                status: 402,
                body: "card_declined".into(),
            });
        }
        Ok(CheckoutSession {
            session_id: "cs_fake_1".into(),
            url: Some("https://pay.example.com/cs_fake_1".into()),
        })
    }
}

struct FakeIdentity;

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn lookup_session(&self, token: &str) -> MarketResult<Option<UserIdentity>> {
        Ok(match token {
            "tok_ada" => Some(UserIdentity {
                id: "user_2ada0000".into(),
                first_name: Some("Ada".into()),
            }),
            "tok_anon" => Some(UserIdentity {
                id: "user_9zzzzzzzzz".into(),
                first_name: None,
            }),
            _ => None,
        })
    }
}

/// Fails every operation, to exercise the 500 paths.
struct BrokenRepo;

impl AgentRepository for BrokenRepo {
    fn list(&self) -> MarketResult<Vec<AgentRecord>> {
        Err(MarketError::Io("disk on fire".into()))
    }
    fn get(&self, _id: u32) -> MarketResult<Option<AgentRecord>> {
        Err(MarketError::Io("disk on fire".into()))
    }
    fn replace_all(&self, _records: Vec<AgentRecord>) -> MarketResult<()> {
        Err(MarketError::Io("disk on fire".into()))
    }
}

fn seeded_state() -> AppState {
    let catalog = load_bundled_catalog().unwrap();
    AppState::new(Arc::new(MemoryStore::new(catalog.clone())), catalog)
}

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            req = req.header("content-type", "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let response = app.oneshot(req.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

#[tokio::test]
async fn health_is_ok() {
    let (status, body) = get(router(seeded_state()), "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn lists_every_agent() {
    let (status, body) = get(router(seeded_state()), "/api/agents").await;
    assert_eq!(status, StatusCode::OK);
    let agents: Vec<AgentRecord> = serde_json::from_value(body).unwrap();
    assert_eq!(agents.len(), 6);
    assert_eq!(agents[0].name, "BackgroundRemover Pro");
}

#[tokio::test]
async fn agent_json_uses_camel_case() {
    let (_, body) = get(router(seeded_state()), "/api/agents/1").await;
    assert_eq!(body["pricingDetails"]["model"], "Freemium");
    assert_eq!(body["pricingDetails"]["freeTierLimit"], 50);
    assert_eq!(body["freeTier"], "50 free images/month");
}

#[tokio::test]
async fn agent_by_id_and_misses() {
    let app = router(seeded_state());

    let (status, body) = get(app.clone(), "/api/agents/3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "ResearchAssist");

    for uri in ["/api/agents/999", "/api/agents/not-a-number", "/api/agents/-1"] {
        let (status, body) = get(app.clone(), uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body, json!({"error": "Agent not found"}));
    }
}

#[tokio::test]
async fn store_failure_is_500() {
    let state = AppState::new(Arc::new(BrokenRepo), Vec::new());
    let (status, body) = get(router(state.clone()), "/api/agents").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Failed to fetch agents"}));

    let (status, body) = get(router(state.clone()), "/api/agents/1").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Failed to fetch agent"}));

    let (status, body) = get(router(state), "/api/seed").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"success": false, "error": "Failed to seed database"}));
}

#[tokio::test]
async fn seed_replaces_store_contents() {
    let catalog = load_bundled_catalog().unwrap();
    let stale = vec![catalog[5].clone()];
    let state = AppState::new(Arc::new(MemoryStore::new(stale)), catalog[..2].to_vec());
    let app = router(state);

    let (status, body) = get(app.clone(), "/api/seed").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 2);

    // Seeding twice leaves the same contents.
    get(app.clone(), "/api/seed").await;
    let (_, body) = get(app, "/api/agents").await;
    let ids: Vec<u64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2]);
}

#[tokio::test]
async fn checkout_monthly_goes_to_gateway() {
    let gateway = Arc::new(FakeGateway::default());
    let app = router(seeded_state().with_payments(gateway.clone()));

    let (status, body) = send(
        app,
        Method::POST,
        "/api/checkout_sessions",
        Some(json!({"name": "ContentGenius AI", "price": 49, "billingUnit": "month"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sessionId"], "cs_fake_1");
    assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);

    let sent = gateway.last.lock().unwrap().clone().unwrap();
    assert_eq!(sent.billing, Billing::Monthly);
    assert_eq!(sent.amount.cents(), 4_900);
}

#[tokio::test]
async fn checkout_accepts_legacy_field_names_and_string_price() {
    let gateway = Arc::new(FakeGateway::default());
    let app = router(seeded_state().with_payments(gateway.clone()));

    let (status, _) = send(
        app,
        Method::POST,
        "/api/checkout_sessions",
        Some(json!({"agentName": "BackgroundRemover Pro", "price": "0.10", "unit": "image"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let sent = gateway.last.lock().unwrap().clone().unwrap();
    assert_eq!(sent.billing, Billing::OneTime);
    assert_eq!(sent.amount.cents(), 10);
}

#[tokio::test]
async fn invalid_checkout_is_400_and_never_reaches_gateway() {
    let gateway = Arc::new(FakeGateway::default());
    let app = router(seeded_state().with_payments(gateway.clone()));

    let bad_bodies = [
        json!({"name": "X", "price": "abc", "billingUnit": "month"}),
        json!({"name": "X", "price": 0, "billingUnit": "month"}),
        json!({"name": "X", "price": -3, "billingUnit": "month"}),
        json!({"name": "", "price": 5, "billingUnit": "month"}),
        json!({"price": 5}),
        json!({"name": "X"}),
    ];
    for bad in bad_bodies {
        let (status, body) =
            send(app.clone(), Method::POST, "/api/checkout_sessions", Some(bad.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{bad}");
        assert!(body["error"]["message"].is_string(), "{bad}");
    }
    assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn malformed_checkout_json_is_400() {
    let app = router(seeded_state());
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/checkout_sessions")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn checkout_without_gateway_is_503() {
    let (status, body) = send(
        router(seeded_state()),
        Method::POST,
        "/api/checkout_sessions",
        Some(json!({"name": "X", "price": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"]["message"].is_string());
}

#[tokio::test]
async fn gateway_failure_is_502_without_leaking_details() {
    let gateway = Arc::new(FakeGateway {
        fail: true,
        ..Default::default()
    });
    let (status, body) = send(
        router(seeded_state().with_payments(gateway)),
        Method::POST,
        "/api/checkout_sessions",
        Some(json!({"name": "X", "price": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(!body.to_string().contains("card_declined"));
}

#[tokio::test]
async fn me_greets_signed_in_user() {
    let app = router(seeded_state().with_identity(Arc::new(FakeIdentity)));

    let req = |token: &str| {
        Request::builder()
            .uri("/api/me")
            .header("authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    };

    let resp = app.clone().oneshot(req("tok_ada")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value =
        serde_json::from_slice(&to_bytes(resp.into_body(), usize::MAX).await.unwrap()).unwrap();
    assert_eq!(body, json!({"userId": "user_2ada0000", "greeting": "Hello, Ada!"}));

    let resp = app.clone().oneshot(req("tok_anon")).await.unwrap();
    let body: Value =
        serde_json::from_slice(&to_bytes(resp.into_body(), usize::MAX).await.unwrap()).unwrap();
    assert_eq!(body["greeting"], "Hello, User user_9zz!");

    let resp = app.clone().oneshot(req("tok_expired")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let (status, _) = get(app, "/api/me").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_without_identity_provider_is_503() {
    let (status, _) = get(router(seeded_state()), "/api/me").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn state_from_config() {
    let cfg = MarketConfig {
        seed_on_start: true,
        ..Default::default()
    };
    let state = AppState::from_config(&cfg).unwrap();
    assert!(state.payments.is_none());
    assert!(state.identity.is_none());
    assert_eq!(state.repo.list().unwrap().len(), 6);

    let mut cfg = MarketConfig::default();
    cfg.payment.secret_key = Some("sk_test_x".into());
    cfg.identity.session_url = Some("http://127.0.0.1:9/session".into());
    let state = AppState::from_config(&cfg).unwrap();
    assert!(state.payments.is_some());
    assert!(state.identity.is_some());
    assert!(state.repo.list().unwrap().is_empty());
}
