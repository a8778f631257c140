//! Bindings to the MapLibre GL JS globals loaded by `index.html`
//! (`maplibregl` and `MaplibreGeocoder`).

use js_sys::{Array, Function, Reflect};
use mapa_shared::{HitFeature, HoverEvent, LngLat};
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = maplibregl, js_name = Map)]
    pub type MapLibreMap;

    #[wasm_bindgen(constructor, js_namespace = maplibregl, js_class = "Map", catch)]
    pub fn new(options: &JsValue) -> Result<MapLibreMap, JsValue>;

    #[wasm_bindgen(method)]
    pub fn on(this: &MapLibreMap, event: &str, listener: &Function);

    #[wasm_bindgen(method)]
    pub fn off(this: &MapLibreMap, event: &str, listener: &Function);

    #[wasm_bindgen(method)]
    pub fn remove(this: &MapLibreMap);

    #[wasm_bindgen(method, js_name = getZoom)]
    pub fn get_zoom(this: &MapLibreMap) -> f64;

    #[wasm_bindgen(method, js_name = isStyleLoaded)]
    pub fn is_style_loaded(this: &MapLibreMap) -> JsValue;

    #[wasm_bindgen(method, js_name = setStyle)]
    pub fn set_style(this: &MapLibreMap, style: &str, options: &JsValue);

    #[wasm_bindgen(method, js_name = getSource)]
    pub fn get_source(this: &MapLibreMap, id: &str) -> JsValue;

    #[wasm_bindgen(method, js_name = addSource, catch)]
    pub fn add_source(this: &MapLibreMap, id: &str, source: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(method, js_name = getLayer)]
    pub fn get_layer(this: &MapLibreMap, id: &str) -> JsValue;

    #[wasm_bindgen(method, js_name = addLayer, catch)]
    pub fn add_layer(this: &MapLibreMap, layer: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(method, js_name = setFilter, catch)]
    pub fn set_filter(this: &MapLibreMap, layer_id: &str, filter: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(method, js_name = setLayoutProperty, catch)]
    pub fn set_layout_property(
        this: &MapLibreMap,
        layer_id: &str,
        name: &str,
        value: &JsValue,
    ) -> Result<(), JsValue>;

    #[wasm_bindgen(method, js_name = queryRenderedFeatures, catch)]
    pub fn query_rendered_features(
        this: &MapLibreMap,
        point: &JsValue,
        options: &JsValue,
    ) -> Result<Array, JsValue>;

    #[wasm_bindgen(method, js_name = addControl)]
    pub fn add_control(this: &MapLibreMap, control: &JsValue, position: &str);

    #[wasm_bindgen(method, js_name = getCanvas)]
    pub fn get_canvas(this: &MapLibreMap) -> web_sys::HtmlElement;

    #[wasm_bindgen(js_namespace = maplibregl)]
    pub type Popup;

    #[wasm_bindgen(constructor, js_namespace = maplibregl)]
    pub fn new(options: &JsValue) -> Popup;

    #[wasm_bindgen(method, js_name = setLngLat)]
    pub fn set_lng_lat(this: &Popup, lng_lat: &JsValue) -> Popup;

    #[wasm_bindgen(method, js_name = setText)]
    pub fn set_text(this: &Popup, text: &str) -> Popup;

    #[wasm_bindgen(method, js_name = addTo)]
    pub fn add_to(this: &Popup, map: &MapLibreMap) -> Popup;

    #[wasm_bindgen(method, js_name = isOpen)]
    pub fn is_open(this: &Popup) -> bool;

    #[wasm_bindgen(method, js_name = remove)]
    pub fn remove_popup(this: &Popup) -> Popup;

    #[wasm_bindgen(js_namespace = maplibregl)]
    pub type NavigationControl;

    #[wasm_bindgen(constructor, js_namespace = maplibregl)]
    pub fn new(options: &JsValue) -> NavigationControl;

    #[wasm_bindgen(js_namespace = maplibregl)]
    pub type GeolocateControl;

    #[wasm_bindgen(constructor, js_namespace = maplibregl)]
    pub fn new(options: &JsValue) -> GeolocateControl;

    pub type MaplibreGeocoder;

    #[wasm_bindgen(constructor, catch)]
    pub fn new(api: &JsValue, options: &JsValue) -> Result<MaplibreGeocoder, JsValue>;

    #[wasm_bindgen(method)]
    pub fn query(this: &MaplibreGeocoder, text: &str) -> MaplibreGeocoder;

    #[wasm_bindgen(method, js_name = on)]
    pub fn on_event(this: &MaplibreGeocoder, event: &str, listener: &Function) -> MaplibreGeocoder;
}

/// Convert to a plain JS value (objects, not `Map`s) for the MapLibre API.
pub fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(JsValue::from)
}

/// The `maplibregl` namespace object, passed to the geocoder control.
pub fn maplibregl_namespace() -> JsValue {
    Reflect::get(&js_sys::global(), &JsValue::from_str("maplibregl")).unwrap_or(JsValue::UNDEFINED)
}

pub fn has_layer(map: &MapLibreMap, id: &str) -> bool {
    !map.get_layer(id).is_undefined()
}

pub fn has_source(map: &MapLibreMap, id: &str) -> bool {
    !map.get_source(id).is_undefined()
}

fn read_f64(target: &JsValue, key: &str) -> Option<f64> {
    Reflect::get(target, &JsValue::from_str(key)).ok()?.as_f64()
}

/// `lngLat` of a MapLibre mouse event.
pub fn event_lng_lat(event: &JsValue) -> Option<LngLat> {
    let lng_lat = Reflect::get(event, &JsValue::from_str("lngLat")).ok()?;
    Some(LngLat {
        lng: read_f64(&lng_lat, "lng")?,
        lat: read_f64(&lng_lat, "lat")?,
    })
}

/// Hit-test `layer_ids` under the event's `point` and convert the result.
pub fn hover_event(
    map: &MapLibreMap,
    event: &JsValue,
    layer_ids: &[&str],
) -> Result<HoverEvent, JsValue> {
    let lng_lat = event_lng_lat(event).unwrap_or_default();
    if layer_ids.is_empty() {
        return Ok(HoverEvent {
            lng_lat,
            features: Vec::new(),
        });
    }
    let point = Reflect::get(event, &JsValue::from_str("point"))?;
    let options = to_js(&serde_json::json!({ "layers": layer_ids }))?;
    let rendered = map.query_rendered_features(&point, &options)?;

    let features = rendered
        .iter()
        .filter_map(|feature| {
            let layer = Reflect::get(&feature, &JsValue::from_str("layer")).ok()?;
            let layer_id = Reflect::get(&layer, &JsValue::from_str("id")).ok()?.as_string()?;
            let properties = Reflect::get(&feature, &JsValue::from_str("properties"))
                .ok()
                .and_then(|props| serde_wasm_bindgen::from_value(props).ok())
                .unwrap_or_default();
            let id = Reflect::get(&feature, &JsValue::from_str("id"))
                .ok()
                .filter(|id| !id.is_undefined() && !id.is_null())
                .and_then(|id| serde_wasm_bindgen::from_value(id).ok());
            Some(HitFeature {
                layer_id,
                id,
                properties,
            })
        })
        .collect();

    Ok(HoverEvent { lng_lat, features })
}
