use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::plan::{ResolvedBackground, ResolvedPlan};
use crate::settings::{Background, StudioSettings};

/// Zoom above 100% is capped to keep the scaled video inside the canvas.
const MAX_ZOOM_FACTOR: f64 = 1.0;

static HEX_STOP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#([0-9a-fA-F]{6})").expect("valid hex stop pattern"));

/// Resolve studio settings into concrete render parameters.
///
/// This is a total function: any settings value that passed
/// [`StudioSettings::validate`] produces a usable plan. Out-of-range
/// values are clamped rather than rejected.
pub fn resolve(settings: &StudioSettings) -> ResolvedPlan {
    let (canvas_width, canvas_height) = settings.aspect_ratio.canvas_dimensions();

    let zoom_factor = (settings.zoom as f64 / 100.0).min(MAX_ZOOM_FACTOR);
    let scaled_width = even_floor(canvas_width as f64 * zoom_factor);
    let scaled_height = even_floor(canvas_height as f64 * zoom_factor);

    let background = resolve_background(&settings.background, canvas_width, canvas_height);

    // Radius beyond half the shorter side would make the corner circles
    // overlap, so it is clamped there.
    let corner_radius = if settings.border_radius > 0 {
        settings
            .border_radius
            .min(scaled_width.min(scaled_height) / 2)
    } else {
        0
    };

    ResolvedPlan {
        canvas_width,
        canvas_height,
        scaled_width,
        scaled_height,
        background,
        corner_radius,
        offset_x: settings.position.x,
        offset_y: settings.position.y,
    }
}

/// Encoders require even dimensions for yuv420p content.
fn even_floor(value: f64) -> u32 {
    ((value / 2.0).floor() as u32) * 2
}

fn resolve_background(
    background: &Background,
    canvas_width: u32,
    canvas_height: u32,
) -> ResolvedBackground {
    match background {
        Background::Solid(color) => ResolvedBackground::Solid {
            color: color.clone(),
        },
        Background::Gradient(spec) => {
            let (c0, c1, horizontal) = parse_gradient(spec);
            let (x1, y1) = if horizontal {
                (canvas_width, 0)
            } else {
                (0, canvas_height)
            };
            ResolvedBackground::Gradient { c0, c1, x1, y1 }
        }
        // Image backgrounds are not rendered by the encoder, fall back
        // to a black fill.
        Background::Image(_) => ResolvedBackground::Solid {
            color: "black".to_string(),
        },
    }
}

/// Extract up to two `#RRGGBB` stops from a CSS-style gradient string.
///
/// Unparseable input falls back to a black-to-white ramp; a single stop
/// is duplicated. Direction is horizontal iff the string contains
/// `"to right"`, vertical otherwise.
fn parse_gradient(spec: &str) -> (String, String, bool) {
    let mut stops = HEX_STOP
        .find_iter(spec)
        .map(|m| m.as_str().trim_start_matches('#').to_string());

    let horizontal = spec.contains("to right");
    match (stops.next(), stops.next()) {
        (Some(c0), Some(c1)) => (c0, c1, horizontal),
        (Some(c0), None) => (c0.clone(), c0, horizontal),
        (None, _) => ("000000".to_string(), "ffffff".to_string(), horizontal),
    }
}
