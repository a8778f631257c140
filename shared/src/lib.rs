pub mod config;
pub mod filter;
pub mod geocode;
pub mod hover;
pub mod layers;
pub mod regions;
pub mod search_history;
pub mod theme;

pub use config::{GeocoderSettings, InitialView, MapConfig};
pub use filter::{UNMATCHED_SENTINEL, build_filter};
pub use hover::{HitFeature, HoverEvent, HoverInfo, LngLat, Selection, resolve};
pub use layers::{Domain, FeatureKind, LayerSpec, Tier, interactive_layer_ids};
pub use search_history::SearchHistory;
pub use theme::MapTheme;
