use gloo_storage::{LocalStorage, Storage};
use leptos::prelude::*;
use mapa_shared::SearchHistory;
use mapa_shared::search_history::SEARCH_HISTORY_STORAGE_KEY;

use crate::app::History;
use crate::geocoder;

/// Stored history; missing, corrupt or unreadable storage yields an empty list.
pub fn load() -> SearchHistory {
    let raw = LocalStorage::raw()
        .get_item(SEARCH_HISTORY_STORAGE_KEY)
        .ok()
        .flatten();
    SearchHistory::from_json(raw.as_deref())
}

pub fn persist(history: &SearchHistory) {
    if let Err(e) = LocalStorage::set(SEARCH_HISTORY_STORAGE_KEY, history) {
        web_sys::console::warn_1(&format!("Could not save search history: {e}").into());
    }
}

/// "Recent Searches" list; clicking an entry re-runs it through the geocoder.
#[component]
pub fn SearchHistoryPanel() -> impl IntoView {
    let History(history) = expect_context();

    view! {
        <Show when=move || history.with(|h| !h.is_empty())>
            <div
                class="search-history"
                style="position: absolute; top: 56px; left: 10px; z-index: 2; min-width: 220px; background: rgba(255,255,255,0.95); border-radius: 4px; box-shadow: 0 0 0 2px rgba(0,0,0,0.1); padding: 6px 8px; font: 12px/1.4 'Helvetica Neue', Arial, sans-serif;"
            >
                <div style="font-weight: 600; color: #333; margin-bottom: 4px;">"Recent Searches"</div>
                <For
                    each=move || history.with(|h| h.entries().to_vec())
                    key=|place| place.clone()
                    let:place
                >
                    {
                        let query = place.clone();
                        let title = place.clone();
                        view! {
                            <button
                                style="display: block; width: 100%; text-align: left; border: none; background: none; padding: 3px 0; cursor: pointer; color: #0b5394;"
                                title=title
                                on:click=move |_| geocoder::search(&query)
                            >
                                {place}
                            </button>
                        }
                    }
                </For>
            </div>
        </Show>
    }
}
