use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const DEFAULT_STYLE_BASE_URL: &str = "https://tiles.openfreemap.org/styles";

/// Basemap style offered by the theme selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapTheme {
    #[default]
    Liberty,
    Bright,
    Positron,
    Dark,
    Fiord,
}

impl MapTheme {
    pub const ALL: [MapTheme; 5] = [
        MapTheme::Liberty,
        MapTheme::Bright,
        MapTheme::Positron,
        MapTheme::Dark,
        MapTheme::Fiord,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Liberty => "liberty",
            Self::Bright => "bright",
            Self::Positron => "positron",
            Self::Dark => "dark",
            Self::Fiord => "fiord",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Liberty => "Liberty",
            Self::Bright => "Bright",
            Self::Positron => "Positron",
            Self::Dark => "Dark",
            Self::Fiord => "Fiord",
        }
    }

    /// Style document URL under `base` (trailing slashes ignored).
    pub fn style_url(self, base: &str) -> String {
        format!("{}/{}", base.trim_end_matches('/'), self.as_str())
    }
}

impl fmt::Display for MapTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MapTheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|theme| theme.as_str() == normalized)
            .ok_or_else(|| format!("unknown map theme: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_STYLE_BASE_URL, MapTheme};

    #[test]
    fn style_url_appends_theme_name() {
        assert_eq!(
            MapTheme::Positron.style_url(DEFAULT_STYLE_BASE_URL),
            "https://tiles.openfreemap.org/styles/positron"
        );
        assert_eq!(
            MapTheme::Dark.style_url("http://localhost:8080/styles/"),
            "http://localhost:8080/styles/dark"
        );
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!(" Fiord ".parse::<MapTheme>(), Ok(MapTheme::Fiord));
        assert_eq!("liberty".parse::<MapTheme>(), Ok(MapTheme::Liberty));
        assert!("satellite".parse::<MapTheme>().is_err());
    }

    #[test]
    fn serde_uses_lowercase_names() {
        assert_eq!(
            serde_json::to_string(&MapTheme::Bright).expect("serialize"),
            r#""bright""#
        );
        let parsed: MapTheme = serde_json::from_str(r#""dark""#).expect("deserialize");
        assert_eq!(parsed, MapTheme::Dark);
    }

    #[test]
    fn every_theme_round_trips_through_as_str() {
        for theme in MapTheme::ALL {
            assert_eq!(theme.as_str().parse::<MapTheme>(), Ok(theme));
            assert!(!theme.label().is_empty());
        }
    }
}
