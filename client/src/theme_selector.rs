use leptos::prelude::*;
use mapa_shared::MapTheme;
use wasm_bindgen::JsCast;

use crate::app::{Settings, Theme};

/// Basemap picker overlaid on the map.
#[component]
pub fn ThemeSelector() -> impl IntoView {
    let Theme(theme) = expect_context();

    let on_change = move |e: web_sys::Event| {
        let Some(select) = e
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlSelectElement>().ok())
        else {
            return;
        };
        match select.value().parse::<MapTheme>() {
            Ok(next) => {
                theme.set(next);
                Settings { theme: Some(next) }.save();
            }
            Err(e) => web_sys::console::warn_1(&e.into()),
        }
    };

    view! {
        <label
            class="theme-selector"
            style="position: absolute; bottom: 30px; right: 10px; z-index: 2; background: rgba(255,255,255,0.95); border-radius: 4px; box-shadow: 0 0 0 2px rgba(0,0,0,0.1); padding: 4px 8px; font: 12px 'Helvetica Neue', Arial, sans-serif; color: #333;"
        >
            "Mapa base "
            <select on:change=on_change prop:value=move || theme.get().as_str()>
                {MapTheme::ALL
                    .into_iter()
                    .map(|option| {
                        view! {
                            <option value=option.as_str() selected=move || theme.get() == option>
                                {option.label()}
                            </option>
                        }
                    })
                    .collect_view()}
            </select>
        </label>
    }
}
