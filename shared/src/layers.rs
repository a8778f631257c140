use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Zoom above which city/county boundaries replace state boundaries.
pub const FINE_ZOOM_THRESHOLD: f64 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Brazil,
    Us,
}

/// Boundary granularity shown at a given zoom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// State level.
    Coarse,
    /// City / county level.
    Fine,
}

impl Tier {
    /// Strictly greater than the threshold; no hysteresis. NaN stays coarse.
    pub fn for_zoom(zoom: f64) -> Self {
        if zoom > FINE_ZOOM_THRESHOLD {
            Self::Fine
        } else {
            Self::Coarse
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    BrState,
    BrCity,
    UsState,
    UsCounty,
}

impl FeatureKind {
    pub const ALL: [FeatureKind; 4] = [
        FeatureKind::BrState,
        FeatureKind::BrCity,
        FeatureKind::UsState,
        FeatureKind::UsCounty,
    ];

    pub fn spec(self) -> &'static LayerSpec {
        match self {
            Self::BrState => &LAYERS[0],
            Self::BrCity => &LAYERS[1],
            Self::UsState => &LAYERS[2],
            Self::UsCounty => &LAYERS[3],
        }
    }

    pub fn domain(self) -> Domain {
        match self {
            Self::BrState | Self::BrCity => Domain::Brazil,
            Self::UsState | Self::UsCounty => Domain::Us,
        }
    }

    pub fn tier(self) -> Tier {
        match self {
            Self::BrState | Self::UsState => Tier::Coarse,
            Self::BrCity | Self::UsCounty => Tier::Fine,
        }
    }

    /// Kind of the base (hit-testable) layer with this id.
    pub fn from_layer_id(layer_id: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.spec().base_layer_id == layer_id)
    }

    /// Kinds shown at the given tier, Brazil first.
    pub fn for_tier(tier: Tier) -> impl Iterator<Item = FeatureKind> {
        Self::ALL.into_iter().filter(move |kind| kind.tier() == tier)
    }

    /// Key used for this kind in config maps and env overrides.
    pub fn key(self) -> &'static str {
        match self {
            Self::BrState => "br_state",
            Self::BrCity => "br_city",
            Self::UsState => "us_state",
            Self::UsCounty => "us_county",
        }
    }
}

/// Layer ids registered as hit-testable at the given tier.
pub fn interactive_layer_ids(tier: Tier) -> Vec<&'static str> {
    FeatureKind::for_tier(tier)
        .map(|kind| kind.spec().base_layer_id)
        .collect()
}

/// Fill paint for a boundary layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillPaint {
    pub outline_color: &'static str,
    pub fill_color: &'static str,
    pub fill_opacity: Option<f64>,
}

impl FillPaint {
    pub fn to_json(&self) -> Value {
        let mut paint = json!({
            "fill-outline-color": self.outline_color,
            "fill-color": self.fill_color,
        });
        if let (Some(opacity), Some(map)) = (self.fill_opacity, paint.as_object_mut()) {
            map.insert("fill-opacity".to_string(), json!(opacity));
        }
        paint
    }
}

/// Static description of one (domain × tier) boundary dataset and its layers.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSpec {
    pub kind: FeatureKind,
    pub source_id: &'static str,
    pub default_url: &'static str,
    pub base_layer_id: &'static str,
    pub highlight_layer_id: &'static str,
    /// Properties holding the feature name, in priority order.
    pub name_keys: &'static [&'static str],
    pub base_paint: FillPaint,
    pub highlight_paint: FillPaint,
}

impl LayerSpec {
    /// GeoJSON source definition for `addSource`.
    pub fn source_json(&self, url: &str) -> Value {
        json!({ "type": "geojson", "data": url })
    }

    pub fn base_layer_json(&self, visible: bool) -> Value {
        json!({
            "id": self.base_layer_id,
            "type": "fill",
            "source": self.source_id,
            "layout": { "visibility": visibility(visible) },
            "paint": self.base_paint.to_json(),
        })
    }

    pub fn highlight_layer_json(&self, filter: Value, visible: bool) -> Value {
        json!({
            "id": self.highlight_layer_id,
            "type": "fill",
            "source": self.source_id,
            "layout": { "visibility": visibility(visible) },
            "paint": self.highlight_paint.to_json(),
            "filter": filter,
        })
    }
}

/// MapLibre `visibility` layout value.
pub fn visibility(visible: bool) -> &'static str {
    if visible { "visible" } else { "none" }
}

const STATE_BASE: FillPaint = FillPaint {
    outline_color: "rgba(0,0,0,0.3)",
    fill_color: "rgba(0,0,0,0.1)",
    fill_opacity: None,
};

const STATE_HIGHLIGHT: FillPaint = FillPaint {
    outline_color: "#484896",
    fill_color: "#6e599f",
    fill_opacity: Some(0.75),
};

const CITY_BASE: FillPaint = FillPaint {
    outline_color: "rgba(0,0,0,0.1)",
    fill_color: "rgba(0,0,0,0.05)",
    fill_opacity: None,
};

pub static LAYERS: [LayerSpec; 4] = [
    LayerSpec {
        kind: FeatureKind::BrState,
        source_id: "br-states",
        default_url: "https://raw.githubusercontent.com/giuliano-oliveira/geodata-br-states/main/geojson/br_states.json",
        base_layer_id: "br-states",
        highlight_layer_id: "br-states-highlighted",
        name_keys: &["Estado", "SIGLA"],
        base_paint: STATE_BASE,
        highlight_paint: STATE_HIGHLIGHT,
    },
    LayerSpec {
        kind: FeatureKind::BrCity,
        source_id: "cities",
        default_url: "https://raw.githubusercontent.com/tbrugz/geodata-br/master/geojson/geojs-100-mun.json",
        base_layer_id: "cities",
        highlight_layer_id: "cities-highlighted",
        name_keys: &["nome", "name"],
        base_paint: CITY_BASE,
        highlight_paint: FillPaint {
            outline_color: "#009c3b",
            fill_color: "#009c3b",
            fill_opacity: Some(0.3),
        },
    },
    LayerSpec {
        kind: FeatureKind::UsState,
        source_id: "us-states",
        default_url: "https://raw.githubusercontent.com/PublicaMundi/MappingAPI/master/data/geojson/us-states.json",
        base_layer_id: "us-states",
        highlight_layer_id: "us-states-highlighted",
        name_keys: &["name"],
        base_paint: STATE_BASE,
        highlight_paint: STATE_HIGHLIGHT,
    },
    LayerSpec {
        kind: FeatureKind::UsCounty,
        source_id: "us-counties",
        default_url: "https://raw.githubusercontent.com/plotly/datasets/master/geojson-counties-fips.json",
        base_layer_id: "us-counties",
        highlight_layer_id: "us-counties-highlighted",
        name_keys: &["name", "NAME"],
        base_paint: CITY_BASE,
        highlight_paint: FillPaint {
            outline_color: "#484896",
            fill_color: "#6e599f",
            fill_opacity: Some(0.3),
        },
    },
];
