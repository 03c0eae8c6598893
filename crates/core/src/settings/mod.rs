//! Styling settings submitted alongside a video upload.
//!
//! These types mirror the JSON payload produced by the studio frontend, so
//! field names stay camelCase on the wire.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Invalid solid background color '{0}': expected #RRGGBB")]
    InvalidSolidColor(String),

    #[error("Invalid zoom {0}: must be greater than 0")]
    InvalidZoom(u32),
}

/// Output canvas shape. Each ratio maps to a fixed canvas resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "4:5")]
    Portrait,
    #[serde(rename = "9:16")]
    Vertical,
    #[serde(rename = "16:9")]
    Widescreen,
}

impl AspectRatio {
    /// Canvas size in pixels for this ratio.
    pub fn canvas_dimensions(&self) -> (u32, u32) {
        match self {
            Self::Square => (1080, 1080),
            Self::Portrait => (1080, 1350),
            Self::Vertical => (1080, 1920),
            Self::Widescreen => (1920, 1080),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Portrait => "4:5",
            Self::Vertical => "9:16",
            Self::Widescreen => "16:9",
        }
    }
}

/// Canvas background, tagged the way the frontend sends it:
/// `{"type": "solid", "value": "#112233"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Background {
    /// A single `#RRGGBB` color.
    Solid(String),
    /// A CSS-style linear-gradient string. Color stops are extracted with a
    /// permissive parse, unknown syntax falls back to a default ramp.
    Gradient(String),
    /// An image URL. Rendering image backgrounds is not supported by the
    /// encoder yet, so these fall back to a black fill.
    Image(String),
}

/// Video offset from the canvas center, in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

/// Full per-job styling payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudioSettings {
    pub background: Background,
    pub aspect_ratio: AspectRatio,
    #[serde(default)]
    pub border_radius: u32,
    #[serde(default = "default_zoom")]
    pub zoom: u32,
    #[serde(default)]
    pub position: Position,
}

fn default_zoom() -> u32 {
    100
}

impl StudioSettings {
    /// Reject payloads the encoder cannot act on. Everything else is
    /// normalized downstream (zoom capped, radius clamped, gradients
    /// parsed permissively).
    pub fn validate(&self) -> Result<(), SettingsError> {
        if let Background::Solid(color) = &self.background {
            if !is_hex_color(color) {
                return Err(SettingsError::InvalidSolidColor(color.clone()));
            }
        }
        if self.zoom == 0 {
            return Err(SettingsError::InvalidZoom(self.zoom));
        }
        Ok(())
    }
}

fn is_hex_color(value: &str) -> bool {
    let Some(hex) = value.strip_prefix('#') else {
        return false;
    };
    hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_json(background: &str) -> String {
        format!(
            r#"{{
                "background": {background},
                "aspectRatio": "1:1",
                "borderRadius": 20,
                "zoom": 80,
                "position": {{"x": 10, "y": -5}}
            }}"#
        )
    }

    #[test]
    fn test_deserialize_solid_settings() {
        let json = settings_json(r##"{"type": "solid", "value": "#FF0000"}"##);
        let settings: StudioSettings = serde_json::from_str(&json).unwrap();

        assert_eq!(settings.background, Background::Solid("#FF0000".to_string()));
        assert_eq!(settings.aspect_ratio, AspectRatio::Square);
        assert_eq!(settings.border_radius, 20);
        assert_eq!(settings.zoom, 80);
        assert_eq!(settings.position, Position { x: 10, y: -5 });
    }

    #[test]
    fn test_deserialize_gradient_settings() {
        let json = settings_json(
            r#"{"type": "gradient", "value": "linear-gradient(to right, #112233, #445566)"}"#,
        );
        let settings: StudioSettings = serde_json::from_str(&json).unwrap();

        assert!(matches!(settings.background, Background::Gradient(_)));
    }

    #[test]
    fn test_deserialize_defaults() {
        let json = r##"{
            "background": {"type": "solid", "value": "#000000"},
            "aspectRatio": "16:9"
        }"##;
        let settings: StudioSettings = serde_json::from_str(json).unwrap();

        assert_eq!(settings.border_radius, 0);
        assert_eq!(settings.zoom, 100);
        assert_eq!(settings.position, Position::default());
    }

    #[test]
    fn test_deserialize_unknown_aspect_ratio_fails() {
        let json = settings_json(r##"{"type": "solid", "value": "#000000"}"##)
            .replace("1:1", "3:2");
        let result: Result<StudioSettings, _> = serde_json::from_str(&json);
        assert!(result.is_err());
    }

    #[test]
    fn test_canvas_dimensions() {
        assert_eq!(AspectRatio::Square.canvas_dimensions(), (1080, 1080));
        assert_eq!(AspectRatio::Portrait.canvas_dimensions(), (1080, 1350));
        assert_eq!(AspectRatio::Vertical.canvas_dimensions(), (1080, 1920));
        assert_eq!(AspectRatio::Widescreen.canvas_dimensions(), (1920, 1080));
    }

    #[test]
    fn test_validate_accepts_valid_solid() {
        let json = settings_json(r##"{"type": "solid", "value": "#aAbBcC"}"##);
        let settings: StudioSettings = serde_json::from_str(&json).unwrap();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_solid_color() {
        for bad in ["red", "#12345", "#12345G", "112233", "#1122334"] {
            let json = settings_json(&format!(
                r#"{{"type": "solid", "value": "{bad}"}}"#
            ));
            let settings: StudioSettings = serde_json::from_str(&json).unwrap();
            assert!(
                matches!(settings.validate(), Err(SettingsError::InvalidSolidColor(_))),
                "expected rejection for {bad}"
            );
        }
    }

    #[test]
    fn test_validate_rejects_zero_zoom() {
        let json = settings_json(r##"{"type": "solid", "value": "#000000"}"##)
            .replace("\"zoom\": 80", "\"zoom\": 0");
        let settings: StudioSettings = serde_json::from_str(&json).unwrap();
        assert!(matches!(settings.validate(), Err(SettingsError::InvalidZoom(0))));
    }

    #[test]
    fn test_validate_accepts_any_gradient_string() {
        let json = settings_json(r#"{"type": "gradient", "value": "not a gradient"}"#);
        let settings: StudioSettings = serde_json::from_str(&json).unwrap();
        assert!(settings.validate().is_ok());
    }
}
