//! Mapping between a Nominatim search response and the feature shape the
//! geocoder control renders and emits on `result`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Nominatim `format=geojson` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NominatimCollection {
    #[serde(default)]
    pub features: Vec<NominatimFeature>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NominatimFeature {
    #[serde(default)]
    pub bbox: Option<[f64; 4]>,
    #[serde(default)]
    pub geometry: Option<Value>,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl NominatimFeature {
    fn display_name(&self) -> Option<&str> {
        self.properties
            .get("display_name")
            .and_then(Value::as_str)
            .filter(|name| !name.trim().is_empty())
    }

    /// Bounding-box midpoint, or the geometry itself when it is a point.
    fn center(&self) -> Option<[f64; 2]> {
        if let Some([min_lng, min_lat, max_lng, max_lat]) = self.bbox {
            return Some([
                min_lng + (max_lng - min_lng) / 2.0,
                min_lat + (max_lat - min_lat) / 2.0,
            ]);
        }
        let geometry = self.geometry.as_ref()?;
        if geometry.get("type")?.as_str()? != "Point" {
            return None;
        }
        let coords = geometry.get("coordinates")?.as_array()?;
        Some([coords.first()?.as_f64()?, coords.get(1)?.as_f64()?])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointGeometry {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: [f64; 2],
}

/// Feature in the Carmen GeoJSON shape the geocoder control expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocoderFeature {
    #[serde(rename = "type")]
    pub kind: String,
    pub geometry: PointGeometry,
    pub place_name: String,
    pub text: String,
    pub place_type: Vec<String>,
    pub center: [f64; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<[f64; 4]>,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

/// Response handed back to the geocoder control's forward-geocode hook.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct GeocoderResponse {
    pub features: Vec<GeocoderFeature>,
}

/// Convert Nominatim results, dropping entries with no name or location.
pub fn features_from_nominatim(collection: NominatimCollection) -> GeocoderResponse {
    let features = collection
        .features
        .into_iter()
        .filter_map(|feature| {
            let center = feature.center()?;
            let name = feature.display_name()?.to_string();
            Some(GeocoderFeature {
                kind: "Feature".to_string(),
                geometry: PointGeometry {
                    kind: "Point".to_string(),
                    coordinates: center,
                },
                place_name: name.clone(),
                text: name,
                place_type: vec!["place".to_string()],
                center,
                bbox: feature.bbox,
                properties: feature.properties,
            })
        })
        .collect();
    GeocoderResponse { features }
}

/// Payload of the geocoder control's `result` event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeocoderResultEvent {
    pub result: GeocoderSelection,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeocoderSelection {
    #[serde(default)]
    pub place_name: String,
    #[serde(default)]
    pub center: Option<[f64; 2]>,
}

#[cfg(test)]
mod tests {
    use super::{NominatimCollection, features_from_nominatim};

    #[test]
    fn bbox_midpoint_becomes_center() {
        let collection: NominatimCollection = serde_json::from_str(
            r#"{
                "type": "FeatureCollection",
                "features": [{
                    "type": "Feature",
                    "bbox": [-47.0, -24.0, -46.0, -23.0],
                    "properties": {"display_name": "São Paulo, Brasil", "osm_id": 298285},
                    "geometry": {"type": "Polygon", "coordinates": []}
                }]
            }"#,
        )
        .expect("nominatim payload should parse");

        let response = features_from_nominatim(collection);
        assert_eq!(response.features.len(), 1);
        let feature = &response.features[0];
        assert_eq!(feature.center, [-46.5, -23.5]);
        assert_eq!(feature.geometry.coordinates, [-46.5, -23.5]);
        assert_eq!(feature.place_name, "São Paulo, Brasil");
        assert_eq!(feature.text, "São Paulo, Brasil");
        assert_eq!(feature.place_type, vec!["place".to_string()]);
        assert_eq!(feature.properties["osm_id"], 298285);
    }

    #[test]
    fn point_geometry_is_used_without_bbox() {
        let collection: NominatimCollection = serde_json::from_str(
            r#"{"features": [{
                "properties": {"display_name": "Austin, Texas"},
                "geometry": {"type": "Point", "coordinates": [-97.74, 30.27]}
            }]}"#,
        )
        .expect("nominatim payload should parse");
        let response = features_from_nominatim(collection);
        assert_eq!(response.features[0].center, [-97.74, 30.27]);
        assert_eq!(response.features[0].bbox, None);
    }

    #[test]
    fn unlocatable_or_unnamed_results_are_dropped() {
        let collection: NominatimCollection = serde_json::from_str(
            r#"{"features": [
                {"properties": {"display_name": "Nowhere"}},
                {"bbox": [0, 0, 1, 1], "properties": {}},
                {"bbox": [0, 0, 1, 1], "properties": {"display_name": "  "}}
            ]}"#,
        )
        .expect("nominatim payload should parse");
        assert!(features_from_nominatim(collection).features.is_empty());
    }

    #[test]
    fn serialized_feature_has_control_field_names() {
        let collection: NominatimCollection = serde_json::from_str(
            r#"{"features": [{"bbox": [0, 0, 2, 2], "properties": {"display_name": "Box"}}]}"#,
        )
        .expect("nominatim payload should parse");
        let json = serde_json::to_value(features_from_nominatim(collection)).expect("serialize");
        let feature = &json["features"][0];
        assert_eq!(feature["type"], "Feature");
        assert_eq!(feature["geometry"]["type"], "Point");
        assert_eq!(feature["center"], serde_json::json!([1.0, 1.0]));
    }

    #[test]
    fn result_event_reads_place_name() {
        let event: super::GeocoderResultEvent = serde_json::from_str(
            r#"{"result": {"place_name": "Recife, Pernambuco", "center": [-34.88, -8.05], "extra": 1}}"#,
        )
        .expect("result event should parse");
        assert_eq!(event.result.place_name, "Recife, Pernambuco");
        assert_eq!(event.result.center, Some([-34.88, -8.05]));
    }
}
