use mapa_shared::{FeatureKind, InitialView, MapConfig, MapTheme};
use tracing::warn;

pub const DEFAULT_SERVER_PORT: u16 = 3000;
pub const DEFAULT_DIST_DIR: &str = "client/dist";
pub const MAX_GEOCODER_LIMIT: u32 = 40;

pub fn server_port() -> u16 {
    std::env::var("MAPA_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_SERVER_PORT)
}

/// Directory holding the built client bundle.
pub fn dist_dir() -> String {
    non_empty_var("MAPA_DIST_DIR").unwrap_or_else(|| DEFAULT_DIST_DIR.to_string())
}

/// Map config served to the client: compiled defaults overlaid with env vars.
pub fn map_config() -> MapConfig {
    let mut config = MapConfig::default();

    if let Some(url) = non_empty_var("MAPA_STYLE_BASE_URL") {
        config.style_base_url = url;
    }
    if let Some(raw) = non_empty_var("MAPA_DEFAULT_THEME") {
        match raw.parse::<MapTheme>() {
            Ok(theme) => config.default_theme = theme,
            Err(e) => warn!(error = %e, "ignoring MAPA_DEFAULT_THEME"),
        }
    }
    if let Some(raw) = non_empty_var("MAPA_INITIAL_VIEW") {
        match parse_initial_view(&raw) {
            Some(view) => config.initial_view = view,
            None => warn!(value = %raw, "ignoring MAPA_INITIAL_VIEW, expected lng,lat,zoom"),
        }
    }
    if let Some(url) = non_empty_var("MAPA_GEOCODER_URL") {
        config.geocoder.endpoint = url;
    }
    if let Some(limit) = non_empty_var("MAPA_GEOCODER_LIMIT")
        .and_then(|value| value.parse::<u32>().ok())
        .filter(|value| *value > 0)
    {
        config.geocoder.limit = limit.min(MAX_GEOCODER_LIMIT);
    }
    for kind in FeatureKind::ALL {
        if let Some(url) = non_empty_var(&source_env_key(kind)) {
            config.sources.insert(kind, url);
        }
    }

    config
}

/// e.g. `MAPA_SOURCE_BR_CITY_URL`.
pub fn source_env_key(kind: FeatureKind) -> String {
    format!("MAPA_SOURCE_{}_URL", kind.key().to_ascii_uppercase())
}

fn parse_initial_view(raw: &str) -> Option<InitialView> {
    let mut parts = raw.split(',').map(|part| part.trim().parse::<f64>());
    let longitude = parts.next()?.ok()?;
    let latitude = parts.next()?.ok()?;
    let zoom = parts.next()?.ok()?;
    if parts.next().is_some()
        || !(-180.0..=180.0).contains(&longitude)
        || !(-90.0..=90.0).contains(&latitude)
        || !(0.0..=24.0).contains(&zoom)
    {
        return None;
    }
    Some(InitialView {
        longitude,
        latitude,
        zoom,
    })
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
