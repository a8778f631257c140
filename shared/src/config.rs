use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::layers::FeatureKind;
use crate::theme::{DEFAULT_STYLE_BASE_URL, MapTheme};

pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org/search";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialView {
    pub longitude: f64,
    pub latitude: f64,
    pub zoom: f64,
}

impl Default for InitialView {
    fn default() -> Self {
        Self {
            longitude: -60.0,
            latitude: 10.0,
            zoom: 2.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderSettings {
    /// Nominatim-compatible search endpoint.
    pub endpoint: String,
    pub min_length: u32,
    pub limit: u32,
    pub placeholder: String,
}

impl Default for GeocoderSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_GEOCODER_URL.to_string(),
            min_length: 2,
            limit: 5,
            placeholder: "Buscar localização...".to_string(),
        }
    }
}

/// Everything the client needs to build the map. Served by `/api/config`;
/// the client falls back to `MapConfig::default()` when that is unreachable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub initial_view: InitialView,
    pub style_base_url: String,
    pub default_theme: MapTheme,
    /// Data URL overrides per boundary kind.
    pub sources: HashMap<FeatureKind, String>,
    pub geocoder: GeocoderSettings,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            initial_view: InitialView::default(),
            style_base_url: DEFAULT_STYLE_BASE_URL.to_string(),
            default_theme: MapTheme::default(),
            sources: HashMap::new(),
            geocoder: GeocoderSettings::default(),
        }
    }
}

impl MapConfig {
    pub fn source_url(&self, kind: FeatureKind) -> &str {
        self.sources
            .get(&kind)
            .map(String::as_str)
            .filter(|url| !url.is_empty())
            .unwrap_or(kind.spec().default_url)
    }

    pub fn style_url(&self, theme: MapTheme) -> String {
        theme.style_url(&self.style_base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::MapConfig;
    use crate::layers::FeatureKind;
    use crate::theme::MapTheme;

    #[test]
    fn source_url_prefers_override() {
        let mut config = MapConfig::default();
        assert_eq!(
            config.source_url(FeatureKind::UsState),
            FeatureKind::UsState.spec().default_url
        );
        config
            .sources
            .insert(FeatureKind::UsState, "http://localhost/us.json".to_string());
        config.sources.insert(FeatureKind::BrCity, String::new());
        assert_eq!(config.source_url(FeatureKind::UsState), "http://localhost/us.json");
        assert_eq!(
            config.source_url(FeatureKind::BrCity),
            FeatureKind::BrCity.spec().default_url
        );
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: MapConfig = serde_json::from_str(
            r#"{"default_theme":"dark","sources":{"br_state":"/data/br.json"},"geocoder":{"limit":8}}"#,
        )
        .expect("partial config should parse");
        assert_eq!(config.default_theme, MapTheme::Dark);
        assert_eq!(config.source_url(FeatureKind::BrState), "/data/br.json");
        assert_eq!(config.geocoder.limit, 8);
        assert_eq!(config.geocoder.min_length, 2);
        assert_eq!(config.initial_view.zoom, 2.5);
        assert_eq!(
            config.style_url(MapTheme::Dark),
            "https://tiles.openfreemap.org/styles/dark"
        );
    }
}
