use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::filter::build_filter;
use crate::layers::{Domain, FeatureKind};
use crate::regions::uf_for_municipality;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

/// One hit-tested feature from a pointer-move event.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HitFeature {
    /// Id of the rendered layer the feature was hit on.
    pub layer_id: String,
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HoverEvent {
    pub lng_lat: LngLat,
    #[serde(default)]
    pub features: Vec<HitFeature>,
}

/// What the popup shows and the highlight filter matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoverInfo {
    pub longitude: f64,
    pub latitude: f64,
    pub display_name: String,
    /// Bare name when it differs from `display_name` (Brazil cities carry a
    /// state suffix in the display string only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_name: Option<String>,
}

impl HoverInfo {
    /// Name the highlight filter compares against.
    pub fn filter_name(&self) -> &str {
        self.raw_name.as_deref().unwrap_or(&self.display_name)
    }
}

/// Current hover target. At most one domain is selected at any time.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "domain", rename_all = "lowercase")]
pub enum Selection {
    #[default]
    None,
    Brazil { kind: FeatureKind, info: HoverInfo },
    Us { kind: FeatureKind, info: HoverInfo },
}

impl Selection {
    fn new(kind: FeatureKind, info: HoverInfo) -> Self {
        match kind.domain() {
            Domain::Brazil => Self::Brazil { kind, info },
            Domain::Us => Self::Us { kind, info },
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn kind(&self) -> Option<FeatureKind> {
        match self {
            Self::None => None,
            Self::Brazil { kind, .. } | Self::Us { kind, .. } => Some(*kind),
        }
    }

    pub fn info(&self) -> Option<&HoverInfo> {
        match self {
            Self::None => None,
            Self::Brazil { info, .. } | Self::Us { info, .. } => Some(info),
        }
    }

    pub fn brazil(&self) -> Option<&HoverInfo> {
        match self {
            Self::Brazil { info, .. } => Some(info),
            _ => None,
        }
    }

    pub fn us(&self) -> Option<&HoverInfo> {
        match self {
            Self::Us { info, .. } => Some(info),
            _ => None,
        }
    }

    /// Name to highlight on layers of `kind`, if the selection is one of them.
    pub fn filter_value(&self, kind: FeatureKind) -> Option<&str> {
        match self.kind() {
            Some(selected) if selected == kind => self.info().map(HoverInfo::filter_name),
            _ => None,
        }
    }

    /// Highlight predicate for the layer of `kind`.
    pub fn filter_for(&self, kind: FeatureKind) -> Value {
        build_filter(self.filter_value(kind), kind.spec().name_keys)
    }
}

/// Resolve a pointer-move event into the new selection.
///
/// Features from layers outside the boundary table are skipped. An event with
/// no boundary feature clears the selection.
pub fn resolve(event: &HoverEvent) -> Selection {
    let Some((kind, feature)) = event.features.iter().find_map(|feature| {
        FeatureKind::from_layer_id(&feature.layer_id).map(|kind| (kind, feature))
    }) else {
        return Selection::None;
    };

    let LngLat { lng, lat } = event.lng_lat;
    let (display_name, raw_name) = match kind {
        FeatureKind::BrCity => {
            let city = first_string(&feature.properties, kind.spec().name_keys);
            let abbrev = municipality_id(feature).and_then(|id| uf_for_municipality(&id));
            let display = match abbrev {
                Some(uf) if !city.is_empty() => format!("{city}, {uf}"),
                _ => city.clone(),
            };
            (display, Some(city))
        }
        FeatureKind::BrState | FeatureKind::UsState | FeatureKind::UsCounty => {
            (first_string(&feature.properties, kind.spec().name_keys), None)
        }
    };

    Selection::new(
        kind,
        HoverInfo {
            longitude: lng,
            latitude: lat,
            display_name,
            raw_name,
        },
    )
}

/// First non-empty property among `keys`, as a string. Empty when none is set.
fn first_string(properties: &Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|key| properties.get(*key))
        .filter_map(value_to_string)
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}

fn municipality_id(feature: &HitFeature) -> Option<String> {
    feature
        .properties
        .get("id")
        .or(feature.id.as_ref())
        .and_then(value_to_string)
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feature(layer_id: &str, properties: Value) -> HitFeature {
        HitFeature {
            layer_id: layer_id.to_string(),
            id: None,
            properties: properties.as_object().cloned().unwrap_or_default(),
        }
    }

    fn event(features: Vec<HitFeature>) -> HoverEvent {
        HoverEvent {
            lng_lat: LngLat {
                lng: -46.63,
                lat: -23.55,
            },
            features,
        }
    }

    #[test]
    fn brazil_city_gets_state_suffix_and_keeps_raw_name() {
        let selection = resolve(&event(vec![feature(
            "cities",
            json!({"id": "3550308", "nome": "São Paulo"}),
        )]));
        let info = selection.brazil().expect("brazil selection");
        assert_eq!(info.display_name, "São Paulo, SP");
        assert_eq!(info.raw_name.as_deref(), Some("São Paulo"));
        assert_eq!(info.longitude, -46.63);
        assert_eq!(info.latitude, -23.55);
        assert_eq!(
            selection.filter_for(FeatureKind::BrCity),
            json!(["==", ["coalesce", ["get", "nome"], ["get", "name"]], "São Paulo"])
        );
    }

    #[test]
    fn brazil_city_with_unknown_prefix_has_no_suffix() {
        let selection = resolve(&event(vec![feature(
            "cities",
            json!({"id": "9912345", "nome": "Lugar"}),
        )]));
        assert_eq!(selection.brazil().map(|i| i.display_name.as_str()), Some("Lugar"));
    }

    #[test]
    fn brazil_city_numeric_or_feature_level_id_is_accepted() {
        let selection = resolve(&event(vec![feature(
            "cities",
            json!({"id": 3304557, "name": "Rio de Janeiro"}),
        )]));
        assert_eq!(
            selection.brazil().map(|i| i.display_name.as_str()),
            Some("Rio de Janeiro, RJ")
        );

        let mut hit = feature("cities", json!({"nome": "Brasília"}));
        hit.id = Some(json!("5300108"));
        let selection = resolve(&event(vec![hit]));
        assert_eq!(
            selection.brazil().map(|i| i.display_name.as_str()),
            Some("Brasília, DF")
        );
    }

    #[test]
    fn brazil_state_falls_back_to_short_code() {
        let full = resolve(&event(vec![feature(
            "br-states",
            json!({"Estado": "Bahia", "SIGLA": "BA"}),
        )]));
        assert_eq!(full.brazil().map(|i| i.display_name.as_str()), Some("Bahia"));

        let short = resolve(&event(vec![feature("br-states", json!({"SIGLA": "BA"}))]));
        let info = short.brazil().expect("brazil selection");
        assert_eq!(info.display_name, "BA");
        assert_eq!(info.raw_name, None);
    }

    #[test]
    fn us_features_use_name_for_display_and_filter() {
        let selection = resolve(&event(vec![feature("us-counties", json!({"name": "Travis"}))]));
        assert_eq!(selection.kind(), Some(FeatureKind::UsCounty));
        assert_eq!(selection.us().map(|i| i.display_name.as_str()), Some("Travis"));
        assert_eq!(selection.filter_value(FeatureKind::UsCounty), Some("Travis"));
        assert_eq!(selection.filter_value(FeatureKind::UsState), None);
    }

    #[test]
    fn selecting_one_domain_clears_the_other() {
        let brazil = resolve(&event(vec![feature("br-states", json!({"Estado": "Pará"}))]));
        assert!(brazil.brazil().is_some());
        assert!(brazil.us().is_none());

        let us = resolve(&event(vec![feature("us-states", json!({"name": "Texas"}))]));
        assert!(us.us().is_some());
        assert!(us.brazil().is_none());
        assert_eq!(brazil.filter_value(FeatureKind::UsState), None);
        assert_eq!(us.filter_value(FeatureKind::BrState), None);
    }

    #[test]
    fn empty_hit_test_clears_selection() {
        assert_eq!(resolve(&event(Vec::new())), Selection::None);
        assert_eq!(
            resolve(&event(vec![feature("water", json!({"name": "Atlantic"}))])),
            Selection::None
        );
    }

    #[test]
    fn unrelated_layers_are_skipped_before_boundary_hit() {
        let selection = resolve(&event(vec![
            feature("cities-highlighted", json!({"nome": "Campinas"})),
            feature("us-states", json!({"name": "Ohio"})),
        ]));
        assert_eq!(selection.kind(), Some(FeatureKind::UsState));
    }

    #[test]
    fn missing_properties_degrade_to_empty_names() {
        let selection = resolve(&event(vec![feature("cities", json!({"id": "3550308"}))]));
        let info = selection.brazil().expect("brazil selection");
        assert_eq!(info.display_name, "");
        assert_eq!(info.raw_name.as_deref(), Some(""));
        assert_eq!(
            selection.filter_for(FeatureKind::BrCity)[2],
            json!(crate::filter::UNMATCHED_SENTINEL)
        );

        let us = resolve(&event(vec![feature("us-states", json!({"name": 42}))]));
        assert_eq!(us.us().map(|i| i.display_name.as_str()), Some("42"));
        let odd = resolve(&event(vec![feature("us-states", json!({"name": [1, 2]}))]));
        assert_eq!(odd.us().map(|i| i.display_name.as_str()), Some(""));
    }

    #[test]
    fn no_selection_filters_match_nothing() {
        for kind in FeatureKind::ALL {
            assert_eq!(Selection::None.filter_value(kind), None);
            assert_eq!(
                Selection::None.filter_for(kind)[2],
                json!(crate::filter::UNMATCHED_SENTINEL)
            );
        }
    }
}
