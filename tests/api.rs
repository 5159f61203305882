use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceExt;

use billetterie_server::config::{Config, MobileMoneyConfig};
use billetterie_server::models::PromoCode;
use billetterie_server::routes::create_routes;
use billetterie_server::state::AppState;
use billetterie_server::store::{MemoryStore, TicketStore};

fn test_config() -> Config {
    Config {
        mobile_money: MobileMoneyConfig {
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            success_rate: 1.0,
        },
        ..Config::default()
    }
}

async fn app_with(config: Config) -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    store.seed_defaults().await.unwrap();
    let app = create_routes(AppState::new(store.clone(), config));
    (app, store)
}

async fn app() -> (Router, Arc<MemoryStore>) {
    app_with(test_config()).await
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    headers: &[(&str, &str)],
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None, &[]).await
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body), &[]).await
}

async fn put(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::PUT, uri, Some(body), &[]).await
}

async fn buy(app: &Router, count: i32, payment: &str, promo: Option<&str>) -> Value {
    let (status, body) = post(
        app,
        "/api/tickets",
        json!({
            "eventId": 1,
            "nombreBillets": count,
            "typePaiement": payment,
            "codePromo": promo,
            "prixUnitaire": 5000
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

async fn remaining_stock(app: &Router) -> i64 {
    let (_, events) = get(app, "/api/events").await;
    events[0]["stock_restant"].as_i64().unwrap()
}

#[tokio::test]
async fn test_lists_seeded_event() {
    let (app, _) = app().await;
    let (status, events) = get(&app, "/api/events").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(events.as_array().unwrap().len(), 1);
    assert_eq!(events[0]["nom"], json!("Village de Noël KIDS EVENTS"));
    assert_eq!(events[0]["date_event"], json!("2024-12-25"));
    assert_eq!(events[0]["prix_unitaire"].as_f64(), Some(5000.0));
    assert_eq!(events[0]["stock_restant"], json!(200));
}

#[tokio::test]
async fn test_sold_out_events_are_hidden() {
    let (app, store) = app().await;
    store
        .add_event("Complet", None, Decimal::from(1000), 0)
        .await;

    let (_, events) = get(&app, "/api/events").await;
    assert_eq!(events.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_promo_minimum_is_enforced() {
    let (app, _) = app().await;

    let (status, body) = post(
        &app,
        "/api/validate-promo",
        json!({"code": "FAMILLE", "nombreBillets": 3}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("Ce code nécessite minimum 4 billets"));
    assert_eq!(body["minBillets"], json!(4));

    let (status, body) = post(
        &app,
        "/api/validate-promo",
        json!({"code": "famille", "nombreBillets": 4}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"code": "FAMILLE", "pourcentage": 15, "valid": true})
    );
}

#[tokio::test]
async fn test_unknown_or_inactive_promo_is_not_found() {
    let (app, store) = app().await;
    store
        .add_promo(PromoCode {
            code: "OLD".to_string(),
            percentage: 50,
            min_tickets: 1,
            max_uses: -1,
            use_count: 0,
            active: false,
            starts_on: None,
            ends_on: None,
            created_at: Utc::now(),
        })
        .await;

    for code in ["NOPE", "OLD"] {
        let (status, body) = post(
            &app,
            "/api/validate-promo",
            json!({"code": code, "nombreBillets": 2}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], json!("Code promo invalide ou expiré"));
    }
}

#[tokio::test]
async fn test_cash_ticket_is_pending_and_keeps_stock() {
    let (app, _) = app().await;
    let body = buy(&app, 3, "cash", Some("FAMILLE")).await;

    assert_eq!(body["statut"], json!("pending"));
    assert_eq!(body["reduction"], json!(0));
    assert_eq!(body["prixTotal"].as_f64(), Some(15000.0));
    assert!(body["ticketId"].as_str().unwrap().starts_with("TICKET_"));
    assert!(body["codeUnique"].as_str().unwrap().starts_with("1-"));

    let qr: Value = serde_json::from_str(body["qrCode"].as_str().unwrap()).unwrap();
    assert_eq!(qr["ticketId"], body["ticketId"]);
    assert_eq!(qr["nombreBillets"], json!(3));

    assert_eq!(remaining_stock(&app).await, 200);
}

#[tokio::test]
async fn test_mobile_money_ticket_is_confirmed_and_consumes_stock() {
    let (app, store) = app().await;
    let body = buy(&app, 4, "mobile-money", Some("FAMILLE")).await;

    assert_eq!(body["statut"], json!("confirmed"));
    assert_eq!(body["reduction"], json!(15));
    assert_eq!(body["prixTotal"].as_f64(), Some(17000.0));
    assert_eq!(remaining_stock(&app).await, 196);

    let ticket_id = body["ticketId"].as_str().unwrap();
    let (_, details) = get(&app, &format!("/api/tickets/{ticket_id}")).await;
    assert_eq!(details["ticket"]["code_promo"], json!("FAMILLE"));
    assert_eq!(details["transaction"]["statut"], json!("completed"));
    assert_eq!(details["transaction"]["montant"].as_f64(), Some(17000.0));

    let promo = store.find_promo("FAMILLE").await.unwrap().unwrap();
    assert_eq!(promo.use_count, 1);
}

#[tokio::test]
async fn test_client_unit_price_is_not_trusted() {
    let (app, _) = app().await;
    let (status, body) = post(
        &app,
        "/api/tickets",
        json!({"eventId": 1, "nombreBillets": 2, "typePaiement": "card", "prixUnitaire": 1}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["prixTotal"].as_f64(), Some(10000.0));
}

#[tokio::test]
async fn test_issuance_rejects_bad_requests() {
    let (app, _) = app().await;

    let (status, _) = post(
        &app,
        "/api/tickets",
        json!({"eventId": 99, "nombreBillets": 1, "typePaiement": "cash"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = post(
        &app,
        "/api/tickets",
        json!({"eventId": 1, "nombreBillets": 0, "typePaiement": "cash"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("VALIDATION_ERROR"));

    let (status, body) = post(
        &app,
        "/api/tickets",
        json!({"eventId": 1, "nombreBillets": 1, "typePaiement": "cheque"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_stock_never_goes_negative() {
    let (app, store) = app().await;
    let event = store
        .add_event("Petit atelier", None, Decimal::from(2000), 2)
        .await;

    let (status, body) = post(
        &app,
        "/api/tickets",
        json!({"eventId": event.id, "nombreBillets": 3, "typePaiement": "mobile-money"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], json!("Stock insuffisant"));

    let stats = store.dashboard_stats().await.unwrap();
    assert_eq!(stats.total_tickets.count, 0);
    let stored = store.find_event(event.id).await.unwrap().unwrap();
    assert_eq!(stored.remaining_stock, 2);
}

#[tokio::test]
async fn test_approving_pending_ticket_confirms_once() {
    let (app, _) = app().await;
    let ticket_id = buy(&app, 2, "cash", None).await["ticketId"]
        .as_str()
        .unwrap()
        .to_string();
    let uri = format!("/api/tickets/{ticket_id}/validate");

    let (status, body) = put(&app, &uri, json!({"action": "approve"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "statut": "confirmed"}));
    assert_eq!(remaining_stock(&app).await, 198);

    let (_, details) = get(&app, &format!("/api/tickets/{ticket_id}")).await;
    assert!(details["ticket"]["date_validation"].is_string());
    assert_eq!(details["transaction"]["statut"], json!("completed"));
    assert!(details["transaction"]["completed_at"].is_string());

    let (status, body) = put(&app, &uri, json!({"action": "approve"})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], json!("CONFLICT"));
    assert_eq!(remaining_stock(&app).await, 198);
}

#[tokio::test]
async fn test_rejecting_pending_ticket_fails_transaction() {
    let (app, _) = app().await;
    let ticket_id = buy(&app, 1, "card", None).await["ticketId"]
        .as_str()
        .unwrap()
        .to_string();

    let (status, body) = put(
        &app,
        &format!("/api/tickets/{ticket_id}/validate"),
        json!({"action": "reject"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["statut"], json!("rejected"));

    let (_, details) = get(&app, &format!("/api/tickets/{ticket_id}")).await;
    assert_eq!(details["transaction"]["statut"], json!("failed"));
    assert_eq!(remaining_stock(&app).await, 200);
}

#[tokio::test]
async fn test_validation_rejects_unknown_action_and_ticket() {
    let (app, _) = app().await;
    let ticket_id = buy(&app, 1, "cash", None).await["ticketId"]
        .as_str()
        .unwrap()
        .to_string();

    let (status, _) = put(
        &app,
        &format!("/api/tickets/{ticket_id}/validate"),
        json!({"action": "maybe"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = put(
        &app,
        "/api/tickets/TICKET_missing/validate",
        json!({"action": "approve"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_verification_grants_entry_only_when_confirmed() {
    let (app, _) = app().await;
    let confirmed = buy(&app, 2, "mobile-money", None).await;
    let pending = buy(&app, 1, "cash", None).await;

    let (status, body) = post(
        &app,
        "/api/tickets/verify",
        json!({"qrCode": confirmed["qrCode"]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], json!(true));
    assert_eq!(body["ticket"]["nombreBillets"], json!(2));
    assert_eq!(
        body["message"],
        json!("Ticket valide - 2 personne(s) - Accès autorisé")
    );

    let (_, body) = post(
        &app,
        "/api/tickets/verify",
        json!({"ticketId": confirmed["codeUnique"]}),
    )
    .await;
    assert_eq!(body["valid"], json!(true));

    let (status, body) = post(
        &app,
        "/api/tickets/verify",
        json!({"ticketId": pending["ticketId"]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], json!(false));
    assert_eq!(body["ticket"]["statut"], json!("pending"));
    assert_eq!(body["message"], json!("Ticket non confirmé - Statut: pending"));
}

#[tokio::test]
async fn test_verification_accepts_reserialized_qr_payload() {
    let (app, _) = app().await;
    let ticket = buy(&app, 1, "mobile-money", None).await;
    let payload: Value = serde_json::from_str(ticket["qrCode"].as_str().unwrap()).unwrap();
    let pretty = serde_json::to_string_pretty(&payload).unwrap();

    let (status, body) = post(&app, "/api/tickets/verify", json!({"qrCode": pretty})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], json!(true));
}

#[tokio::test]
async fn test_verification_of_missing_ticket() {
    let (app, _) = app().await;

    let (status, body) = post(
        &app,
        "/api/tickets/verify",
        json!({"ticketId": "TICKET_unknown"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"valid": false, "message": "Ticket introuvable"}));

    let (status, body) = post(&app, "/api/tickets/verify", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("QR Code ou ID ticket requis"));
}

#[tokio::test]
async fn test_dashboard_stats_aggregate_tickets_and_revenue() {
    let (app, _) = app().await;
    buy(&app, 4, "mobile-money", Some("FAMILLE")).await;
    buy(&app, 1, "mobile-money", None).await;
    let pending = buy(&app, 2, "cash", None).await;

    let (status, stats) = get(&app, "/api/admin/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["totalTickets"]["count"], json!(2));
    assert_eq!(stats["pendingTickets"]["count"], json!(1));
    assert_eq!(stats["totalRevenue"]["total"].as_f64(), Some(22000.0));
    assert_eq!(stats["ticketsPending"][0]["id"], pending["ticketId"]);
    assert_eq!(
        stats["ticketsPending"][0]["event_nom"],
        json!("Village de Noël KIDS EVENTS")
    );
    assert_eq!(stats["ticketsRecent"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_admin_token_guards_admin_routes() {
    let config = Config {
        admin_token: Some("door-staff".to_string()),
        ..test_config()
    };
    let (app, _) = app_with(config).await;

    let (status, body) = get(&app, "/api/admin/stats").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], json!("AUTH_ERROR"));

    let (status, _) = send(
        &app,
        Method::GET,
        "/api/admin/stats",
        None,
        &[("authorization", "Bearer wrong")],
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        Method::GET,
        "/api/admin/stats",
        None,
        &[("authorization", "Bearer door-stafX")],
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        Method::GET,
        "/api/admin/stats",
        None,
        &[("authorization", "Bearer door-staff")],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_webhook_confirms_pending_ticket() {
    let (app, _) = app().await;
    let ticket_id = buy(&app, 3, "card", None).await["ticketId"]
        .as_str()
        .unwrap()
        .to_string();

    let (status, body) = post(
        &app,
        "/api/webhook/mobile-money",
        json!({"transactionId": "MM_orange_1", "status": "SUCCESS", "ticketId": ticket_id, "provider": "orange"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true}));
    assert_eq!(remaining_stock(&app).await, 197);

    let (_, details) = get(&app, &format!("/api/tickets/{ticket_id}")).await;
    assert_eq!(details["ticket"]["statut"], json!("confirmed"));
    assert_eq!(details["transaction"]["reference_externe"], json!("MM_orange_1"));
    assert_eq!(details["transaction"]["mobile_money_provider"], json!("orange"));
}

#[tokio::test]
async fn test_webhook_on_confirmed_ticket_does_not_consume_stock_twice() {
    let (app, _) = app().await;
    let ticket_id = buy(&app, 2, "mobile-money", None).await["ticketId"]
        .as_str()
        .unwrap()
        .to_string();
    assert_eq!(remaining_stock(&app).await, 198);

    let (status, _) = post(
        &app,
        "/api/webhook/mobile-money",
        json!({"transactionId": "MM_mtn_9", "status": "SUCCESS", "ticketId": ticket_id, "provider": "mtn"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(remaining_stock(&app).await, 198);
}

#[tokio::test]
async fn test_webhook_failure_and_secret() {
    let config = Config {
        webhook_secret: Some("hook".to_string()),
        ..test_config()
    };
    let (app, _) = app_with(config).await;
    let ticket_id = buy(&app, 1, "card", None).await["ticketId"]
        .as_str()
        .unwrap()
        .to_string();
    let payload = json!({"transactionId": "MM_x", "status": "FAILED", "ticketId": ticket_id});

    let (status, _) = post(&app, "/api/webhook/mobile-money", payload.clone()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/webhook/mobile-money",
        Some(payload),
        &[("x-webhook-secret", "hook")],
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("Transaction échouée"));
}

#[tokio::test]
async fn test_promo_usage_cap_is_enforced() {
    let (app, store) = app().await;
    store
        .add_promo(PromoCode {
            code: "UNIQUE".to_string(),
            percentage: 50,
            min_tickets: 1,
            max_uses: 1,
            use_count: 0,
            active: true,
            starts_on: None,
            ends_on: None,
            created_at: Utc::now(),
        })
        .await;

    let first = buy(&app, 1, "cash", Some("UNIQUE")).await;
    assert_eq!(first["reduction"], json!(50));
    assert_eq!(first["prixTotal"].as_f64(), Some(2500.0));

    let second = buy(&app, 1, "cash", Some("UNIQUE")).await;
    assert_eq!(second["reduction"], json!(0));
    assert_eq!(second["prixTotal"].as_f64(), Some(5000.0));

    let (status, _) = post(
        &app,
        "/api/validate-promo",
        json!({"code": "UNIQUE", "nombreBillets": 1}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_mobile_money_simulation() {
    let (app, _) = app().await;
    let (status, body) = post(
        &app,
        "/api/mobile-money/simulate",
        json!({"provider": "wave", "montant": 17000, "numero": "0700000000"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert!(body["transactionId"].as_str().unwrap().starts_with("MM_wave_"));
    assert_eq!(body["numero"], json!("0700000000"));

    let config = Config {
        mobile_money: MobileMoneyConfig {
            success_rate: 0.0,
            ..test_config().mobile_money
        },
        ..test_config()
    };
    let (app, _) = app_with(config).await;
    let (status, body) = post(
        &app,
        "/api/mobile-money/simulate",
        json!({"provider": "wave", "montant": 17000, "numero": "0700000000"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Échec du paiement Mobile Money"));
}

#[tokio::test]
async fn test_health_endpoints() {
    let (app, _) = app().await;

    let (status, body) = get(&app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("ok"));

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], json!("billetterie-api"));
}

#[tokio::test]
async fn test_malformed_json_uses_error_body() {
    let (app, _) = app().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/validate-promo")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], json!("VALIDATION_ERROR"));
}
