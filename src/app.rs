use std::{any::Any, net::SocketAddr, sync::Arc};

use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

use crate::{
    auth,
    config::AppConfig,
    error::{internal_response, InternalDetail, INTERNAL_MESSAGE},
    resources,
    state::AppState,
};

pub fn build_app(state: AppState) -> Router {
    let config = state.config.clone();

    let router = Router::new()
        .route("/health", get(health))
        .nest(
            "/api",
            Router::new()
                .merge(auth::router())
                .merge(resources::routes()),
        )
        .fallback(route_not_found)
        .with_state(state);
    with_layers(router, config)
}

/// Error shaping, panic recovery, CORS and request tracing, outermost last.
fn with_layers(router: Router, config: Arc<AppConfig>) -> Router {
    let development = config.development;

    router
        .layer(middleware::map_response_with_state(
            config.clone(),
            expose_internal_detail,
        ))
        .layer(CatchPanicLayer::custom(
            move |panic: Box<dyn Any + Send + 'static>| panic_response(panic, development),
        ))
        .layer(cors(&config))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "request",
                        method = %req.method(),
                        path = %req.uri().path(),
                        status = tracing::field::Empty
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", status.as_u16());
                        let elapsed_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(elapsed_ms, "request failed");
                        } else {
                            tracing::debug!(elapsed_ms, "request served");
                        }
                    },
                ),
        )
}

pub async fn serve(config: &AppConfig, app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn route_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Route not found" })),
    )
}

fn cors(config: &AppConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);
    match HeaderValue::from_str(&config.cors_origin) {
        Ok(origin) => layer.allow_origin(origin),
        Err(e) => {
            tracing::warn!(
                error = %e,
                origin = %config.cors_origin,
                "invalid CORS_ORIGIN; cross-origin requests disabled"
            );
            layer
        }
    }
}

/// Swap the generic 500 body for the real cause in development mode.
async fn expose_internal_detail(State(config): State<Arc<AppConfig>>, res: Response) -> Response {
    if !config.development {
        return res;
    }
    match res.extensions().get::<InternalDetail>().cloned() {
        Some(InternalDetail(detail)) => internal_response(&detail),
        None => res,
    }
}

fn panic_response(panic: Box<dyn Any + Send + 'static>, development: bool) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| panic.downcast_ref::<&str>().map(|s| s.to_string()))
        .unwrap_or_else(|| "unknown panic".into());
    tracing::error!(panic = %detail, "handler panicked");
    internal_response(if development { &detail } else { INTERNAL_MESSAGE })
}
