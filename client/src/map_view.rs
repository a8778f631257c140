use std::cell::RefCell;

use leptos::prelude::*;
use mapa_shared::{
    FeatureKind, MapConfig, MapTheme, SearchHistory, Selection, Tier, build_filter,
    interactive_layer_ids, layers::visibility, resolve,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::app::{History, HoverSelection, Theme, ZoomLevel};
use crate::geocoder;
use crate::maplibre::{
    GeolocateControl, MapLibreMap, NavigationControl, Popup, has_layer, has_source, hover_event,
    to_js,
};

struct PopupBinding {
    popup: Popup,
    class: &'static str,
}

struct MapBinding {
    map: MapLibreMap,
    popup: Option<PopupBinding>,
    handlers: Vec<(&'static str, Closure<dyn Fn(JsValue)>)>,
}

impl MapBinding {
    fn close(self) {
        for (event, handler) in &self.handlers {
            self.map.off(event, handler.as_ref().unchecked_ref());
        }
        if let Some(binding) = self.popup {
            binding.popup.remove_popup();
        }
        self.map.remove();
    }
}

thread_local! {
    static MAP_BINDING: RefCell<Option<MapBinding>> = const { RefCell::new(None) };
}

fn with_map<R>(f: impl FnOnce(&MapLibreMap) -> R) -> Option<R> {
    MAP_BINDING.with(|slot| slot.borrow().as_ref().map(|binding| f(&binding.map)))
}

fn warn(context: &str, error: &JsValue) {
    web_sys::console::warn_2(&JsValue::from_str(context), error);
}

fn style_loaded(map: &MapLibreMap) -> bool {
    map.is_style_loaded().is_truthy()
}

/// Mount the sources and layers for `tier` (once per style) and hide the other tier's.
///
/// Sources stay registered after their tier is hidden so crossing the zoom
/// threshold back and forth does not refetch boundary data.
fn sync_layers(map: &MapLibreMap, config: &MapConfig, tier: Tier, selection: &Selection) {
    for kind in FeatureKind::ALL {
        let spec = kind.spec();
        let visible = kind.tier() == tier;

        if !has_layer(map, spec.base_layer_id) {
            if !visible {
                continue;
            }
            if !has_source(map, spec.source_id) {
                let source = match to_js(&spec.source_json(config.source_url(kind))) {
                    Ok(source) => source,
                    Err(e) => return warn("Invalid source definition", &e),
                };
                if let Err(e) = map.add_source(spec.source_id, &source) {
                    warn("addSource failed", &e);
                    continue;
                }
            }
            let layers = [
                spec.base_layer_json(true),
                spec.highlight_layer_json(selection.filter_for(kind), true),
            ];
            for layer in layers {
                match to_js(&layer) {
                    Ok(layer) => {
                        if let Err(e) = map.add_layer(&layer) {
                            warn("addLayer failed", &e);
                        }
                    }
                    Err(e) => warn("Invalid layer definition", &e),
                }
            }
            continue;
        }

        let value = JsValue::from_str(visibility(visible));
        for layer_id in [spec.base_layer_id, spec.highlight_layer_id] {
            if let Err(e) = map.set_layout_property(layer_id, "visibility", &value) {
                warn("setLayoutProperty failed", &e);
            }
        }
    }
}

/// Highlighted name per layer kind, in [`FeatureKind::ALL`] order.
type HighlightNames = [Option<String>; 4];

fn highlight_names(selection: &Selection) -> HighlightNames {
    FeatureKind::ALL.map(|kind| selection.filter_value(kind).map(str::to_owned))
}

fn apply_filters(map: &MapLibreMap, names: &HighlightNames) {
    for (kind, name) in FeatureKind::ALL.into_iter().zip(names) {
        let spec = kind.spec();
        if !has_layer(map, spec.highlight_layer_id) {
            continue;
        }
        match to_js(&build_filter(name.as_deref(), spec.name_keys)) {
            Ok(filter) => {
                if let Err(e) = map.set_filter(spec.highlight_layer_id, &filter) {
                    warn("setFilter failed", &e);
                }
            }
            Err(e) => warn("Invalid filter", &e),
        }
    }
}

/// What the hover popup shows for a selection. `None` hides it.
#[derive(Debug, PartialEq)]
struct PopupContent<'a> {
    class: &'static str,
    lng_lat: [f64; 2],
    text: &'a str,
}

fn popup_content(selection: &Selection) -> Option<PopupContent<'_>> {
    let (class, info) = match (selection.brazil(), selection.us()) {
        (Some(info), _) => ("city-info", info),
        (_, Some(info)) => ("usa-city-info", info),
        _ => return None,
    };
    if info.display_name.is_empty() {
        return None;
    }
    Some(PopupContent {
        class,
        lng_lat: [info.longitude, info.latitude],
        text: &info.display_name,
    })
}

/// Move the single hover popup to the selection, creating it on first use
/// or when the domain (and so its class) changes.
fn update_popup(selection: &Selection) {
    MAP_BINDING.with(|slot| {
        let mut slot = slot.borrow_mut();
        let Some(binding) = slot.as_mut() else {
            return;
        };
        let Some(content) = popup_content(selection) else {
            if let Some(current) = &binding.popup {
                current.popup.remove_popup();
            }
            return;
        };
        if binding
            .popup
            .as_ref()
            .is_some_and(|current| current.class != content.class)
            && let Some(old) = binding.popup.take()
        {
            old.popup.remove_popup();
        }
        if binding.popup.is_none() {
            let Ok(options) = to_js(&serde_json::json!({
                "offset": [0, -10],
                "closeButton": false,
                "closeOnClick": false,
                "className": content.class,
            })) else {
                return;
            };
            binding.popup = Some(PopupBinding {
                popup: Popup::new(&options),
                class: content.class,
            });
        }
        let Some(current) = binding.popup.as_ref() else {
            return;
        };
        let Ok(lng_lat) = to_js(&content.lng_lat) else {
            return;
        };
        current.popup.set_lng_lat(&lng_lat).set_text(content.text);
        if !current.popup.is_open() {
            current.popup.add_to(&binding.map);
        }
    });
}

/// Hit-testable layer ids for `tier` that are currently mounted.
fn mounted_interactive_ids(map: &MapLibreMap, tier: Tier) -> Vec<&'static str> {
    interactive_layer_ids(tier)
        .into_iter()
        .filter(|id| has_layer(map, id))
        .collect()
}

fn set_selection(selection: RwSignal<Selection>, next: Selection) {
    if selection.with_untracked(|current| *current != next) {
        selection.set(next);
    }
}

fn set_cursor(map: &MapLibreMap, pointer: bool) {
    let canvas = map.get_canvas();
    let _ = canvas
        .style()
        .set_property("cursor", if pointer { "pointer" } else { "" });
}

struct MapSignals {
    selection: RwSignal<Selection>,
    zoom: RwSignal<f64>,
    history: RwSignal<SearchHistory>,
    tier: Memo<Tier>,
}

fn create_map(
    container: &web_sys::HtmlElement,
    config: &MapConfig,
    theme: MapTheme,
    signals: MapSignals,
) -> Result<(), JsValue> {
    let MapSignals {
        selection,
        zoom,
        history,
        tier,
    } = signals;

    let view = config.initial_view;
    let options = to_js(&serde_json::json!({
        "style": config.style_url(theme),
        "center": [view.longitude, view.latitude],
        "zoom": view.zoom,
    }))?;
    js_sys::Reflect::set(&options, &JsValue::from_str("container"), container)?;
    let map = MapLibreMap::new(&options)?;

    let nav_options = to_js(&serde_json::json!({ "visualizePitch": false }))?;
    map.add_control(&NavigationControl::new(&nav_options), "top-right");
    let geolocate_options = to_js(&serde_json::json!({
        "positionOptions": { "enableHighAccuracy": true },
        "trackUserLocation": true,
    }))?;
    map.add_control(&GeolocateControl::new(&geolocate_options), "top-right");

    geocoder::attach(&map, config.geocoder.clone(), move |place| {
        let mut next = history.get_untracked();
        if next.record(&place) {
            history.set(next);
        }
    });

    let style_config = config.clone();
    let on_style_load = Closure::<dyn Fn(JsValue)>::new(move |_event: JsValue| {
        let current = selection.get_untracked();
        with_map(|map| {
            sync_layers(map, &style_config, tier.get_untracked(), &current);
            apply_filters(map, &highlight_names(&current));
        });
    });

    let on_zoom = Closure::<dyn Fn(JsValue)>::new(move |_event: JsValue| {
        if let Some(level) = with_map(|map| map.get_zoom()) {
            zoom.set(level);
        }
    });

    let on_mouse_move = Closure::<dyn Fn(JsValue)>::new(move |event: JsValue| {
        let hovered = with_map(|map| {
            let ids = mounted_interactive_ids(map, tier.get_untracked());
            let result = hover_event(map, &event, &ids).map(|hover| resolve(&hover));
            if let Ok(next) = &result {
                set_cursor(map, !next.is_none());
            }
            result
        });
        match hovered {
            Some(Ok(next)) => set_selection(selection, next),
            Some(Err(e)) => warn("Hit-test failed", &e),
            None => {}
        }
    });

    let on_mouse_out = Closure::<dyn Fn(JsValue)>::new(move |_event: JsValue| {
        set_selection(selection, Selection::None);
    });

    let handlers = vec![
        ("style.load", on_style_load),
        ("zoom", on_zoom),
        ("mousemove", on_mouse_move),
        ("mouseout", on_mouse_out),
    ];
    for (event, handler) in &handlers {
        map.on(event, handler.as_ref().unchecked_ref());
    }

    MAP_BINDING.with(|slot| {
        if let Some(old) = slot.borrow_mut().take() {
            old.close();
        }
        *slot.borrow_mut() = Some(MapBinding {
            map,
            popup: None,
            handlers,
        });
    });
    Ok(())
}

fn close_map() {
    geocoder::detach();
    MAP_BINDING.with(|slot| {
        if let Some(binding) = slot.borrow_mut().take() {
            binding.close();
        }
    });
}

/// Full-size MapLibre map with boundary layers, hover highlight and popup.
#[component]
pub fn MapView(config: MapConfig) -> impl IntoView {
    let config = StoredValue::new(config);
    let HoverSelection(selection) = expect_context();
    let ZoomLevel(zoom) = expect_context();
    let Theme(theme) = expect_context();
    let History(history) = expect_context();
    let container = NodeRef::<leptos::html::Div>::new();

    let tier = Memo::new(move |_| Tier::for_zoom(zoom.get()));

    // Create the map once the container element exists.
    Effect::new(move || {
        let Some(element) = container.get() else {
            return;
        };
        if MAP_BINDING.with(|slot| slot.borrow().is_some()) {
            return;
        }
        let signals = MapSignals {
            selection,
            zoom,
            history,
            tier,
        };
        let result = config.with_value(|config| {
            create_map(&element, config, theme.get_untracked(), signals)
        });
        if let Err(e) = result {
            warn("Map initialisation failed", &e);
        }
    });

    on_cleanup(close_map);

    // Swap the visible boundary set whenever the zoom crosses the threshold.
    Effect::new(move || {
        let tier = tier.get();
        let current = selection.get_untracked();
        config.with_value(|config| {
            with_map(|map| {
                if style_loaded(map) {
                    sync_layers(map, config, tier, &current);
                }
            });
        });
    });

    // Filters only change with the highlighted names, not with every pointer move.
    let highlighted = Memo::new(move |_| selection.with(highlight_names));
    Effect::new(move || {
        let names = highlighted.get();
        with_map(|map| apply_filters(map, &names));
    });

    Effect::new(move || {
        selection.with(update_popup);
    });

    // Theme switch reloads the basemap; `style.load` re-mounts the boundary layers.
    Effect::new(move |previous: Option<MapTheme>| {
        let current = theme.get();
        if previous.is_some_and(|previous| previous != current) {
            let url = config.with_value(|config| config.style_url(current));
            with_map(|map| {
                if let Ok(options) = to_js(&serde_json::json!({ "diff": false })) {
                    map.set_style(&url, &options);
                }
            });
        }
        current
    });

    view! {
        <div node_ref=container style="position: absolute; inset: 0;" />
    }
}

#[cfg(test)]
mod tests {
    use super::{PopupContent, highlight_names, popup_content};
    use mapa_shared::{FeatureKind, HoverInfo, Selection};

    fn info(name: &str, longitude: f64) -> HoverInfo {
        HoverInfo {
            longitude,
            latitude: -8.05,
            display_name: name.to_string(),
            raw_name: None,
        }
    }

    #[test]
    fn popup_class_follows_domain() {
        let us = Selection::Us {
            kind: FeatureKind::UsCounty,
            info: info("Travis", -97.7),
        };
        let brazil = Selection::Brazil {
            kind: FeatureKind::BrCity,
            info: info("Recife, PE", -34.9),
        };
        assert_eq!(
            popup_content(&us),
            Some(PopupContent {
                class: "usa-city-info",
                lng_lat: [-97.7, -8.05],
                text: "Travis",
            })
        );
        assert_eq!(popup_content(&brazil).map(|c| c.class), Some("city-info"));
    }

    #[test]
    fn popup_hidden_without_a_display_name() {
        assert_eq!(popup_content(&Selection::None), None);
        let unnamed = Selection::Brazil {
            kind: FeatureKind::BrCity,
            info: info("", -34.9),
        };
        assert_eq!(popup_content(&unnamed), None);
    }

    #[test]
    fn highlight_names_ignore_pointer_position() {
        let here = Selection::Us {
            kind: FeatureKind::UsState,
            info: info("Texas", -99.0),
        };
        let there = Selection::Us {
            kind: FeatureKind::UsState,
            info: info("Texas", -98.2),
        };
        assert_ne!(here, there);
        assert_eq!(highlight_names(&here), highlight_names(&there));

        let names = highlight_names(&here);
        let texas_slot = FeatureKind::ALL
            .iter()
            .position(|kind| *kind == FeatureKind::UsState)
            .expect("us state kind");
        assert_eq!(names[texas_slot].as_deref(), Some("Texas"));
        assert_eq!(names.iter().flatten().count(), 1);
    }
}
