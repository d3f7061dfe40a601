use axum::{extract::DefaultBodyLimit, routing::delete, routing::get, routing::post, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;

use super::api::flights as flight_handlers;
use super::api_doc::ApiDoc;
use super::state::AppState;

pub fn router(state: AppState) -> Router {
    let max_upload_bytes = state.config.web.max_upload_bytes;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Flight API endpoints
        .route("/api/flights", post(flight_handlers::upload_flight))
        .route("/api/flights", get(flight_handlers::list_flights))
        .route("/api/flights/{id}", get(flight_handlers::get_flight))
        .route("/api/flights/{id}", delete(flight_handlers::delete_flight))
        .route(
            "/api/flights/{id}/samples",
            get(flight_handlers::list_samples),
        )
        .route("/api/flights/{id}/track", get(flight_handlers::get_track))
        // OpenAPI / Swagger
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        // Middleware
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(config: Config) -> std::io::Result<()> {
    let bind_addr = config.web.bind.clone();
    let app = router(AppState::new(config));

    log::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await
}
