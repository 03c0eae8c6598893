use serde::{Deserialize, Serialize};

/// Background fill with all wire-format quirks already resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolvedBackground {
    /// Color string passed straight to ffmpeg's `color` source, so both
    /// `#RRGGBB` and named colors are valid here.
    Solid { color: String },
    /// Two-stop linear gradient. Stops are bare `RRGGBB` hex (no `#`),
    /// endpoint `(x1, y1)` encodes the direction: `(w, 0)` horizontal,
    /// `(0, h)` vertical.
    Gradient {
        c0: String,
        c1: String,
        x1: u32,
        y1: u32,
    },
}

/// Everything the filter graph builder needs, computed once per job.
///
/// All clamping and normalization happens before this struct is built:
/// scaled dimensions are even, `corner_radius` never exceeds half the
/// shorter scaled side, and a radius of zero means no mask stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPlan {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub scaled_width: u32,
    pub scaled_height: u32,
    pub background: ResolvedBackground,
    pub corner_radius: u32,
    /// Video offset from canvas center, in pixels.
    pub offset_x: i32,
    pub offset_y: i32,
}

impl ResolvedPlan {
    pub fn needs_mask(&self) -> bool {
        self.corner_radius > 0
    }
}
