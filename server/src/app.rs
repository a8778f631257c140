use std::path::Path;

use axum::{
    Router,
    extract::Request,
    http::{HeaderValue, header},
    middleware::{self, Next},
    response::Response,
};
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;

use crate::routes;
use crate::state::AppState;

pub(crate) fn build_app(state: AppState, dist_dir: &str) -> Router {
    let static_assets = Router::new()
        .fallback_service(
            ServeDir::new(dist_dir)
                .precompressed_br()
                .precompressed_gzip(),
        )
        .layer(middleware::from_fn(set_static_cache_control));

    let app = Router::new()
        .route("/api/health", axum::routing::get(routes::api::health))
        .route("/api/config", axum::routing::get(routes::api::get_config));

    app.layer(CompressionLayer::new())
        .fallback_service(static_assets)
        .with_state(state)
}

async fn set_static_cache_control(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    let mut response = next.run(request).await;

    if response.status().is_success()
        && !is_html(&response)
        && let Some(cache_control) = cache_control_for_path(&path)
    {
        response.headers_mut().insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static(cache_control),
        );
    }

    response
}

fn is_html(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("text/html"))
}

fn cache_control_for_path(path: &str) -> Option<&'static str> {
    if is_hashed_bundle_asset(path) {
        return Some("public, max-age=31536000, immutable");
    }

    if path.starts_with("/data/") || path.starts_with("/fonts/") || path.starts_with("/icons/") {
        return Some("public, max-age=86400");
    }

    None
}

fn is_hashed_bundle_asset(path: &str) -> bool {
    let Some(ext) = Path::new(path).extension().and_then(|ext| ext.to_str()) else {
        return false;
    };

    if !matches!(ext, "wasm" | "js" | "css") {
        return false;
    }

    let Some(filename) = Path::new(path).file_name().and_then(|name| name.to_str()) else {
        return false;
    };

    filename
        .split(['-', '_', '.'])
        .any(|segment| segment.len() >= 8 && segment.chars().all(|c| c.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use mapa_shared::MapConfig;
    use tower::ServiceExt;

    use super::*;

    #[test]
    fn immutable_cache_for_hashed_bundle_assets() {
        assert_eq!(
            cache_control_for_path("/mapa-client-71578f6b278221f3_bg.wasm"),
            Some("public, max-age=31536000, immutable")
        );
        assert_eq!(
            cache_control_for_path("/styles-a93762ff3bf6d63a.css"),
            Some("public, max-age=31536000, immutable")
        );
    }

    #[test]
    fn short_cache_for_unhashed_static_assets() {
        assert_eq!(
            cache_control_for_path("/data/br_states.json"),
            Some("public, max-age=86400")
        );
        assert_eq!(
            cache_control_for_path("/icons/pin.svg"),
            Some("public, max-age=86400")
        );
    }

    #[test]
    fn no_cache_header_override_for_html() {
        assert_eq!(cache_control_for_path("/"), None);
        assert_eq!(cache_control_for_path("/index.html"), None);
        assert_eq!(cache_control_for_path("/mapa-client.js"), None);
    }

    #[tokio::test]
    async fn api_routes_answer_without_a_built_bundle() {
        let app = build_app(AppState::new(MapConfig::default()), "does-not-exist");
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .expect("build request"),
            )
            .await
            .expect("router response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_static_asset_is_not_found() {
        let app = build_app(AppState::new(MapConfig::default()), "does-not-exist");
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/missing.wasm")
                    .body(Body::empty())
                    .expect("build request"),
            )
            .await
            .expect("router response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get(header::CACHE_CONTROL).is_none());
    }

    #[tokio::test]
    async fn stale_bundle_url_is_not_answered_with_cached_index() {
        let dist = std::env::temp_dir().join(format!("mapa-dist-stale-{}", std::process::id()));
        std::fs::create_dir_all(&dist).expect("create dist dir");
        std::fs::write(dist.join("index.html"), "<!DOCTYPE html><div id=\"app\"></div>")
            .expect("write index.html");
        let dist_dir = dist.to_str().expect("utf-8 temp path").to_owned();

        let app = build_app(AppState::new(MapConfig::default()), &dist_dir);
        let stale = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/mapa-client-deadbeef01234567_bg.wasm")
                    .body(Body::empty())
                    .expect("build request"),
            )
            .await
            .expect("router response");
        let index = app
            .oneshot(
                Request::builder()
                    .uri("/")
                    .body(Body::empty())
                    .expect("build request"),
            )
            .await
            .expect("router response");
        let _ = std::fs::remove_dir_all(&dist);

        assert_eq!(stale.status(), StatusCode::NOT_FOUND);
        assert!(stale.headers().get(header::CACHE_CONTROL).is_none());
        assert_eq!(index.status(), StatusCode::OK);
        assert!(index.headers().get(header::CACHE_CONTROL).is_none());
    }
}
