use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware,
    response::Html,
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;

use crate::{handlers, middleware as mw, openapi::ApiDoc, AppState};

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = build_cors(&state.config.cors_origin);

    // /search must be registered alongside /{id}; axum prefers the static segment
    let doctor_routes = Router::new()
        .route(
            "/",
            get(handlers::doctors_handler::get_doctors).post(handlers::doctors_handler::create_doctor),
        )
        .route("/search", get(handlers::doctors_handler::search_doctors))
        .route(
            "/{id}",
            get(handlers::doctors_handler::get_doctor)
                .put(handlers::doctors_handler::update_doctor)
                .delete(handlers::doctors_handler::delete_doctor),
        );

    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request| {
        tracing::info_span!(
            "http",
            method = %request.method(),
            uri = %request.uri(),
            request_id = tracing::field::Empty,
        )
    });

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
        .nest("/api/doctors", doctor_routes)
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .route("/swagger-ui", get(swagger_ui))
        .layer(middleware::from_fn(mw::metrics_middleware))
        .layer(middleware::from_fn(mw::request_id_middleware))
        .layer(trace)
        .layer(cors)
        .with_state(state)
}

fn build_cors(origin: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_credentials(true);

    match origin.parse::<HeaderValue>() {
        Ok(origin) => cors.allow_origin(origin),
        Err(e) => {
            tracing::warn!(origin, error = %e, "Invalid CORS origin, cross-origin requests disabled");
            cors
        }
    }
}

async fn swagger_ui() -> Html<&'static str> {
    Html(r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Clinic Doctors API Documentation</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
        window.onload = () => {
            window.ui = SwaggerUIBundle({
                url: '/api-docs/openapi.json',
                dom_id: '#swagger-ui'
            });
        };
    </script>
</body>
</html>
    "#)
}
