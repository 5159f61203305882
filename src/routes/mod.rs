use axum::routing::{get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer};
use crate::handlers::{admin, events, health_check, liveness, payments, promos, tickets};
use crate::state::AppState;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/events", get(events::list_events))
        .route("/validate-promo", post(promos::validate_promo))
        .route("/tickets", post(tickets::create_ticket))
        .route("/tickets/verify", post(tickets::verify_ticket))
        .route("/tickets/:ticket_id", get(tickets::get_ticket))
        .route("/tickets/:ticket_id/validate", put(tickets::validate_ticket))
        .route("/admin/stats", get(admin::dashboard_stats))
        .route("/mobile-money/simulate", post(payments::simulate_mobile_money))
        .route("/webhook/mobile-money", post(payments::mobile_money_webhook))
}

pub fn create_routes(state: AppState) -> Router {
    let security = create_security_headers_layer(state.config.production);
    let cors = create_cors_layer(&state.config.allowed_origins);

    Router::new()
        .route("/health", get(liveness))
        .nest("/api", api_routes())
        .layer(security)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
