use std::cell::RefCell;

use gloo_storage::{LocalStorage, Storage};
use leptos::prelude::*;
use leptos::task::spawn_local;
use mapa_shared::{MapConfig, MapTheme, SearchHistory, Selection};
use serde::{Deserialize, Serialize};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::config::load_map_config;
use crate::map_view::MapView;
use crate::search_history::{self, SearchHistoryPanel};
use crate::theme_selector::ThemeSelector;

pub(crate) const SETTINGS_STORAGE_KEY: &str = "mapa_settings";

/// CSS selector of the geocoder control's text input.
const GEOCODER_INPUT_SELECTOR: &str = ".maplibregl-ctrl-geocoder--input";

struct KeydownBinding {
    window: web_sys::Window,
    _handler: Closure<dyn Fn(web_sys::KeyboardEvent)>,
}

thread_local! {
    static KEYDOWN_BINDING: RefCell<Option<KeydownBinding>> = const { RefCell::new(None) };
}

/// Newtype wrappers give each signal a distinct type for Leptos context.
#[derive(Clone, Copy)]
pub(crate) struct HoverSelection(pub RwSignal<Selection>);
#[derive(Clone, Copy)]
pub(crate) struct ZoomLevel(pub RwSignal<f64>);
#[derive(Clone, Copy)]
pub(crate) struct Theme(pub RwSignal<MapTheme>);
#[derive(Clone, Copy)]
pub(crate) struct History(pub RwSignal<SearchHistory>);

/// User preferences kept in LocalStorage. `theme` stays `None` until the user
/// picks one, so the server's default theme applies until then.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub theme: Option<MapTheme>,
}

impl Settings {
    pub(crate) fn load() -> Self {
        LocalStorage::get(SETTINGS_STORAGE_KEY).unwrap_or_default()
    }

    pub(crate) fn save(&self) {
        if let Err(e) = LocalStorage::set(SETTINGS_STORAGE_KEY, self) {
            web_sys::console::warn_1(&format!("Could not save settings: {e}").into());
        }
    }

    fn initial_theme(&self, config: &MapConfig) -> MapTheme {
        self.theme.unwrap_or(config.default_theme)
    }
}

fn focus_geocoder_input() {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    if let Some(el) = document
        .query_selector(GEOCODER_INPUT_SELECTOR)
        .ok()
        .flatten()
        && let Ok(input) = el.dyn_into::<web_sys::HtmlElement>()
    {
        input.focus().ok();
    }
}

fn bind_keyboard_shortcuts(selection: RwSignal<Selection>) {
    let Some(window) = web_sys::window() else {
        return;
    };

    unbind_keyboard_shortcuts();

    let handler =
        Closure::<dyn Fn(web_sys::KeyboardEvent)>::new(move |e: web_sys::KeyboardEvent| {
            let key = e.key();
            let target = e
                .target()
                .and_then(|t| t.dyn_into::<web_sys::HtmlElement>().ok());
            let target_tag = target.as_ref().map(|el| el.tag_name()).unwrap_or_default();

            // Typing in the geocoder box: only Escape (to leave it) is handled.
            if target_tag == "INPUT" || target_tag == "TEXTAREA" || target_tag == "SELECT" {
                if key == "Escape"
                    && let Some(el) = target
                {
                    el.blur().ok();
                }
                return;
            }

            match key.as_str() {
                "Escape" => {
                    if selection.with_untracked(|s| !s.is_none()) {
                        selection.set(Selection::None);
                    }
                }
                "/" => {
                    e.prevent_default();
                    focus_geocoder_input();
                }
                _ => {}
            }
        });

    if window
        .add_event_listener_with_callback("keydown", handler.as_ref().unchecked_ref())
        .is_ok()
    {
        KEYDOWN_BINDING.with(|slot| {
            *slot.borrow_mut() = Some(KeydownBinding {
                window,
                _handler: handler,
            });
        });
    }
}

fn unbind_keyboard_shortcuts() {
    KEYDOWN_BINDING.with(|slot| {
        if let Some(old) = slot.borrow_mut().take() {
            let _ = old.window.remove_event_listener_with_callback(
                "keydown",
                old._handler.as_ref().unchecked_ref(),
            );
        }
    });
}

/// Root application component. Provides global reactive signals via context.
#[component]
pub fn App() -> impl IntoView {
    let defaults = MapConfig::default();
    let saved = Settings::load();
    let user_picked_theme = saved.theme.is_some();

    let selection: RwSignal<Selection> = RwSignal::new(Selection::None);
    let zoom: RwSignal<f64> = RwSignal::new(defaults.initial_view.zoom);
    let theme: RwSignal<MapTheme> = RwSignal::new(saved.initial_theme(&defaults));
    let history: RwSignal<SearchHistory> = RwSignal::new(search_history::load());
    let map_config: RwSignal<Option<MapConfig>> = RwSignal::new(None);

    provide_context(HoverSelection(selection));
    provide_context(ZoomLevel(zoom));
    provide_context(Theme(theme));
    provide_context(History(history));

    spawn_local(async move {
        let config = load_map_config().await;
        if !user_picked_theme {
            theme.set(config.default_theme);
        }
        zoom.set(config.initial_view.zoom);
        map_config.set(Some(config));
    });

    // Persist search history whenever a geocoder result changes it.
    Effect::new(move || {
        history.with(search_history::persist);
    });

    Effect::new(move || {
        bind_keyboard_shortcuts(selection);
    });
    on_cleanup(unbind_keyboard_shortcuts);

    view! {
        <div style="position: fixed; inset: 0; overflow: hidden;">
            {move || {
                map_config
                    .get()
                    .map(|config| view! { <MapView config=config /> })
            }}
            <SearchHistoryPanel />
            <ThemeSelector />
        </div>
    }
}
