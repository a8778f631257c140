use axum::Json;
use axum::extract::State;
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};

use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "started_at": state.started_at.to_rfc3339(),
        "uptime_secs": state.uptime_secs(),
        "config_requests_total": state.config_requests(),
    }))
}

/// Map configuration for the client. Not cached so env changes apply on the
/// next page load after a restart.
pub async fn get_config(State(state): State<AppState>) -> Response {
    state.record_config_request();
    let mut response = Json(state.map_config.as_ref()).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    response
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use mapa_shared::{FeatureKind, MapConfig, MapTheme};

    use crate::state::AppState;

    async fn spawn_test_server(state: AppState) -> (SocketAddr, tokio::task::JoinHandle<()>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("listener address");
        let app = crate::app::build_app(state, "does-not-exist");
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve test app");
        });
        (addr, handle)
    }

    #[tokio::test]
    async fn health_reports_ok_and_counts_config_requests() {
        let state = AppState::new(MapConfig::default());
        let (addr, server_handle) = spawn_test_server(state).await;
        let base_url = format!("http://{addr}");
        let client = reqwest::Client::new();

        client
            .get(format!("{base_url}/api/config"))
            .send()
            .await
            .expect("config request")
            .error_for_status()
            .expect("config status");

        let health = client
            .get(format!("{base_url}/api/health"))
            .send()
            .await
            .expect("health request")
            .error_for_status()
            .expect("health status")
            .json::<serde_json::Value>()
            .await
            .expect("parse health");

        assert_eq!(health.get("status").and_then(|v| v.as_str()), Some("ok"));
        assert!(health.get("uptime_secs").and_then(|v| v.as_i64()).is_some());
        assert_eq!(
            health.get("config_requests_total").and_then(|v| v.as_u64()),
            Some(1)
        );

        server_handle.abort();
        let _ = server_handle.await;
    }

    #[tokio::test]
    async fn config_endpoint_serves_overrides_without_caching() {
        let mut config = MapConfig {
            default_theme: MapTheme::Positron,
            ..MapConfig::default()
        };
        config
            .sources
            .insert(FeatureKind::BrCity, "/data/municipios.json".to_string());
        let state = AppState::new(config.clone());
        let (addr, server_handle) = spawn_test_server(state).await;

        let response = reqwest::Client::new()
            .get(format!("http://{addr}/api/config"))
            .send()
            .await
            .expect("config request")
            .error_for_status()
            .expect("config status");
        assert_eq!(
            response
                .headers()
                .get(reqwest::header::CACHE_CONTROL)
                .and_then(|v| v.to_str().ok()),
            Some("no-cache")
        );
        let served = response.json::<MapConfig>().await.expect("parse config");
        assert_eq!(served, config);
        assert_eq!(
            served.source_url(FeatureKind::BrCity),
            "/data/municipios.json"
        );

        server_handle.abort();
        let _ = server_handle.await;
    }
}
