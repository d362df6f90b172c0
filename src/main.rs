mod config;
mod db;
mod error;
mod fare;
mod gateway;
mod handlers;
mod models;
mod state;
mod tariffs;
mod webhook;

use axum::extract::MatchedPath;
use axum::http::{header, header::HeaderName, Method, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use config::Config;
use gateway::GatewayClient;
use state::AppState;
use std::net::SocketAddr;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let pool = match db::connect(&cfg.db_url).await {
        Ok(p) => p,
        Err(e) => {
            tracing::error!(error = %e, "db connect failed");
            std::process::exit(2);
        }
    };

    if let Err(e) = db::ensure_schema(&pool, &cfg.db_schema).await {
        tracing::error!(error = %e, "db ensure_schema failed");
        std::process::exit(2);
    }

    let gateway = match GatewayClient::new(
        &cfg.gateway_base_url,
        cfg.gateway_api_key.clone(),
        cfg.gateway_timeout_secs,
    ) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "gateway client init failed");
            std::process::exit(2);
        }
    };

    let state = AppState {
        pool,
        db_schema: cfg.db_schema.clone(),
        env_name: cfg.env_name.clone(),
        base_currency: cfg.base_currency.clone(),
        secondary_currency: cfg.secondary_currency.clone(),
        exchange_rate: cfg.exchange_rate,
        min_payment_amount: cfg.min_payment_amount,
        public_base_url: cfg.public_base_url.clone(),
        webhook_secret: cfg.gateway_webhook_secret.clone(),
        gateway,
    };

    let cors = if cfg.allowed_origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(booking_cors_allowed_headers())
            .allow_credentials(false)
    } else {
        let origins: Vec<axum::http::HeaderValue> = cfg
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(booking_cors_allowed_headers())
            .allow_credentials(false)
            .allow_origin(AllowOrigin::list(origins))
    };

    let app = create_router(state)
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(cfg.max_body_bytes))
        // Avoid logging sensitive query parameters. We log the matched route
        // template when available, otherwise just the path (no query string).
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &axum::http::Request<_>| {
                let path = req
                    .extensions()
                    .get::<MatchedPath>()
                    .map(MatchedPath::as_str)
                    .unwrap_or_else(|| req.uri().path());
                tracing::span!(
                    tracing::Level::INFO,
                    "http_request",
                    method = %req.method(),
                    path = %path
                )
            }),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

    let addr: SocketAddr = format!("{}:{}", cfg.host, cfg.port)
        .parse()
        .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], cfg.port)));
    tracing::info!(%addr, "starting ferry_booking_service");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();
}

fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/bookings",
            get(handlers::list_bookings).post(handlers::create_booking),
        )
        .route("/bookings/:reference", get(handlers::get_booking_by_reference))
        .route("/bookings/id/:booking_id", get(handlers::get_booking_by_id))
        .route(
            "/bookings/:reference/status",
            post(handlers::update_booking_status),
        )
        .route(
            "/bookings/:reference/payment-status",
            post(handlers::update_payment_status),
        )
        .route("/payments", post(handlers::create_payment))
        .route(
            "/payments/by-booking/:booking_id",
            get(handlers::get_payment_by_booking),
        )
        .route("/payments/:intent_id/verify", post(handlers::verify_payment))
        .route("/payments/:intent_id/cancel", post(handlers::cancel_payment))
        .route("/webhooks/gateway", post(webhook::gateway_webhook))
        // Ensure unknown routes return 404 rather than any layer fallback.
        .fallback(|| async { StatusCode::NOT_FOUND })
        .with_state(state)
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}

fn booking_cors_allowed_headers() -> Vec<HeaderName> {
    vec![
        header::ACCEPT,
        header::AUTHORIZATION,
        header::CONTENT_TYPE,
        HeaderName::from_static("x-request-id"),
        HeaderName::from_static("x-user-id"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    async fn ok_handler() -> &'static str {
        "ok"
    }

    #[tokio::test]
    async fn unknown_routes_return_404() {
        let app = Router::new()
            .route("/health", get(ok_handler))
            .fallback(|| async { StatusCode::NOT_FOUND });

        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/does_not_exist")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn cors_whitelist_excludes_webhook_and_proxy_headers() {
        let headers = booking_cors_allowed_headers();
        let has = |name: &str| {
            headers
                .iter()
                .any(|h| h.as_str().eq_ignore_ascii_case(name))
        };

        assert!(has("content-type"));
        assert!(has("x-request-id"));
        assert!(has("x-user-id"));

        // The gateway signs webhooks server-to-server; browsers never send it.
        assert!(!has("x-gateway-signature"));
        assert!(!has("x-forwarded-for"));
        assert!(!has("x-forwarded-host"));
        assert!(!has("cookie"));
    }
}
