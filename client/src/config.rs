use mapa_shared::MapConfig;

/// Fetch the server's map configuration.
pub async fn fetch_map_config() -> Result<MapConfig, String> {
    let response = gloo_net::http::Request::get("/api/config")
        .send()
        .await
        .map_err(|e| format!("fetch error: {e}"))?;

    if !response.ok() {
        return Err(format!("HTTP {}", response.status()));
    }

    response
        .json::<MapConfig>()
        .await
        .map_err(|e| format!("parse error: {e}"))
}

/// Server config, or the compiled-in defaults when it is unavailable
/// (e.g. the bundle is served by `trunk serve` without the API).
pub async fn load_map_config() -> MapConfig {
    match fetch_map_config().await {
        Ok(config) => config,
        Err(e) => {
            web_sys::console::warn_1(
                &format!("Map config unavailable, using defaults: {e}").into(),
            );
            MapConfig::default()
        }
    }
}
