use std::cell::RefCell;

use js_sys::{Promise, Reflect};
use mapa_shared::GeocoderSettings;
use mapa_shared::geocode::{
    GeocoderResponse, GeocoderResultEvent, NominatimCollection, features_from_nominatim,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::maplibre::{MapLibreMap, MaplibreGeocoder, maplibregl_namespace, to_js};

struct GeocoderBinding {
    control: MaplibreGeocoder,
    _forward: Closure<dyn Fn(JsValue) -> Promise>,
    _on_result: Closure<dyn Fn(JsValue)>,
}

thread_local! {
    static GEOCODER: RefCell<Option<GeocoderBinding>> = const { RefCell::new(None) };
}

/// Query-string pairs for a Nominatim search request.
fn search_params(settings: &GeocoderSettings, query: &str) -> [(&'static str, String); 5] {
    [
        ("q", query.trim().to_string()),
        ("format", "geojson".to_string()),
        ("polygon_geojson", "1".to_string()),
        ("addressdetails", "1".to_string()),
        ("limit", settings.limit.to_string()),
    ]
}

/// Query the Nominatim-compatible endpoint and convert the results for the control.
pub async fn forward_geocode(
    settings: &GeocoderSettings,
    query: &str,
) -> Result<GeocoderResponse, String> {
    let params = search_params(settings, query);
    let response = gloo_net::http::Request::get(&settings.endpoint)
        .query(params.iter().map(|(key, value)| (*key, value.as_str())))
        .send()
        .await
        .map_err(|e| format!("fetch error: {e}"))?;

    if !response.ok() {
        return Err(format!("HTTP {}", response.status()));
    }

    let collection = response
        .json::<NominatimCollection>()
        .await
        .map_err(|e| format!("parse error: {e}"))?;
    Ok(features_from_nominatim(collection))
}

/// Add the geocoder control to `map`. `on_result` receives the place name of
/// every result the user picks (or that [`search`] resolves).
pub fn attach(map: &MapLibreMap, settings: GeocoderSettings, on_result: impl Fn(String) + 'static) {
    detach();

    let forward_settings = settings.clone();
    let forward = Closure::<dyn Fn(JsValue) -> Promise>::new(move |request: JsValue| {
        let query = Reflect::get(&request, &JsValue::from_str("query"))
            .ok()
            .and_then(|q| q.as_string())
            .unwrap_or_default();
        let settings = forward_settings.clone();
        wasm_bindgen_futures::future_to_promise(async move {
            let response = match forward_geocode(&settings, &query).await {
                Ok(response) => response,
                Err(e) => {
                    web_sys::console::warn_1(&format!("Geocoding failed: {e}").into());
                    GeocoderResponse::default()
                }
            };
            to_js(&response)
        })
    });

    let api = js_sys::Object::new();
    if Reflect::set(
        &api,
        &JsValue::from_str("forwardGeocode"),
        forward.as_ref(),
    )
    .is_err()
    {
        return;
    }

    let Ok(options) = to_js(&serde_json::json!({
        "placeholder": settings.placeholder,
        "minLength": settings.min_length,
        "limit": settings.limit,
        "showResultMarkers": false,
    })) else {
        return;
    };
    if let Err(e) = Reflect::set(
        &options,
        &JsValue::from_str("maplibregl"),
        &maplibregl_namespace(),
    ) {
        web_sys::console::warn_2(&"Geocoder could not receive the maplibregl namespace".into(), &e);
    }

    let control = match MaplibreGeocoder::new(&api, &options) {
        Ok(control) => control,
        Err(e) => {
            web_sys::console::warn_2(&"Geocoder control unavailable".into(), &e);
            return;
        }
    };

    let result_handler = Closure::<dyn Fn(JsValue)>::new(move |event: JsValue| {
        match serde_wasm_bindgen::from_value::<GeocoderResultEvent>(event) {
            Ok(event) => on_result(event.result.place_name),
            Err(e) => {
                web_sys::console::warn_1(&format!("Unreadable geocoder result: {e}").into());
            }
        }
    });
    control.on_event("result", result_handler.as_ref().unchecked_ref());
    map.add_control(&control, "top-left");

    GEOCODER.with(|slot| {
        *slot.borrow_mut() = Some(GeocoderBinding {
            control,
            _forward: forward,
            _on_result: result_handler,
        });
    });
}

/// Re-run a search for `place` through the control, as if the user typed it.
pub fn search(place: &str) {
    GEOCODER.with(|slot| {
        if let Some(binding) = slot.borrow().as_ref() {
            binding.control.query(place);
        }
    });
}

pub fn detach() {
    GEOCODER.with(|slot| {
        slot.borrow_mut().take();
    });
}

#[cfg(test)]
mod tests {
    use super::search_params;
    use mapa_shared::GeocoderSettings;

    #[test]
    fn search_requests_geojson_with_configured_limit() {
        let settings = GeocoderSettings {
            limit: 7,
            ..GeocoderSettings::default()
        };
        let params = search_params(&settings, "  Belo Horizonte ");
        assert_eq!(params[0], ("q", "Belo Horizonte".to_string()));
        assert!(params.contains(&("format", "geojson".to_string())));
        assert!(params.contains(&("polygon_geojson", "1".to_string())));
        assert!(params.contains(&("limit", "7".to_string())));
    }
}
