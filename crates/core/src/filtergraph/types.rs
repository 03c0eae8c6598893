use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::transform::ResolvedBackground;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("Stream label '{0}' is produced more than once")]
    DuplicateLabel(String),

    #[error("Stage consumes unknown stream label '{0}'")]
    UnknownInput(String),

    #[error("Stream label '{0}' is consumed more than once")]
    LabelReused(String),

    #[error("Stream label '{0}' is produced but never consumed")]
    DanglingLabel(String),

    #[error("Graph output is '{actual}' but '{expected}' was declared")]
    OutputMismatch { expected: String, actual: String },

    #[error("Graph has no stages")]
    Empty,
}

/// One node of a filter graph. Stages reference each other through string
/// stream labels; the primary video input is always `[0:v]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterStage {
    /// Synthesize the canvas background (solid color or two-stop gradient).
    Fill {
        fill: ResolvedBackground,
        width: u32,
        height: u32,
        output: String,
    },
    /// Scale the primary video input `[0:v]` to the given size.
    Scale {
        width: u32,
        height: u32,
        output: String,
    },
    /// Cut rounded corners by attaching an alpha plane and zeroing it
    /// outside a rounded rectangle.
    Mask {
        input: String,
        width: u32,
        height: u32,
        radius: u32,
        output: String,
    },
    /// Composite the foreground onto the background, centered plus a pixel
    /// offset.
    Overlay {
        background: String,
        foreground: String,
        offset_x: i32,
        offset_y: i32,
        output: String,
    },
}

impl FilterStage {
    /// Labels this stage reads. The primary input `0:v` is external and
    /// not listed here.
    fn inputs(&self) -> Vec<&str> {
        match self {
            Self::Fill { .. } | Self::Scale { .. } => vec![],
            Self::Mask { input, .. } => vec![input.as_str()],
            Self::Overlay {
                background,
                foreground,
                ..
            } => vec![background.as_str(), foreground.as_str()],
        }
    }

    fn output(&self) -> &str {
        match self {
            Self::Fill { output, .. }
            | Self::Scale { output, .. }
            | Self::Mask { output, .. }
            | Self::Overlay { output, .. } => output,
        }
    }

    fn serialize(&self) -> String {
        match self {
            Self::Fill {
                fill: ResolvedBackground::Solid { color },
                width,
                height,
                output,
            } => format!("color=color={color}:size={width}x{height}[{output}]"),
            Self::Fill {
                fill: ResolvedBackground::Gradient { c0, c1, x1, y1 },
                width,
                height,
                output,
            } => format!(
                "gradients=s={width}x{height}:c0={c0}:c1={c1}:x0=0:y0=0:x1={x1}:y1={y1}[{output}]"
            ),
            Self::Scale {
                width,
                height,
                output,
            } => format!("[0:v]scale={width}:{height}[{output}]"),
            Self::Mask {
                input,
                width,
                height,
                radius,
                output,
            } => {
                let alpha = rounded_alpha_expr(*width, *height, *radius);
                format!(
                    "[{input}]format=yuva420p,\
                     geq=lum='lum(X,Y)':cb='cb(X,Y)':cr='cr(X,Y)':a='{alpha}'[{output}]"
                )
            }
            Self::Overlay {
                background,
                foreground,
                offset_x,
                offset_y,
                output,
            } => format!(
                "[{background}][{foreground}]overlay=(W-w)/2+({offset_x}):(H-h)/2+({offset_y})[{output}]"
            ),
        }
    }
}

/// `geq` alpha expression that keeps full opacity inside a rounded
/// rectangle of the given size and zeroes the four corner squares outside
/// their quarter circles.
fn rounded_alpha_expr(width: u32, height: u32, radius: u32) -> String {
    let r = radius;
    let wr = width.saturating_sub(radius);
    let hr = height.saturating_sub(radius);
    format!(
        "if(lt(X,{r})*lt(Y,{r}),if(lte(hypot({r}-X,{r}-Y),{r}),255,0),\
         if(gt(X,{wr})*lt(Y,{r}),if(lte(hypot(X-{wr},{r}-Y),{r}),255,0),\
         if(lt(X,{r})*gt(Y,{hr}),if(lte(hypot({r}-X,Y-{hr}),{r}),255,0),\
         if(gt(X,{wr})*gt(Y,{hr}),if(lte(hypot(X-{wr},Y-{hr}),{r}),255,0),255))))"
    )
}

/// A complete filter graph plus the auxiliary input files it references.
///
/// `aux_inputs` are extra `-i` arguments the encoder must pass and is
/// responsible for deleting once the process exits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSpec {
    pub stages: Vec<FilterStage>,
    pub aux_inputs: Vec<PathBuf>,
    pub output_label: String,
}

impl GraphSpec {
    /// Render the graph as ffmpeg `-filter_complex` syntax.
    pub fn serialize(&self) -> String {
        self.stages
            .iter()
            .map(FilterStage::serialize)
            .collect::<Vec<_>>()
            .join(";")
    }

    /// The `-map` argument selecting the graph's final video stream.
    pub fn output_map(&self) -> String {
        format!("[{}]", self.output_label)
    }

    /// Check the label wiring: every consumed label was produced exactly
    /// once before use, every label is consumed exactly once, and the
    /// single leftover label is the declared output.
    pub fn validate(&self) -> Result<(), GraphError> {
        if self.stages.is_empty() {
            return Err(GraphError::Empty);
        }

        let mut available: HashSet<&str> = HashSet::new();
        let mut seen: HashSet<&str> = HashSet::new();

        for stage in &self.stages {
            for input in stage.inputs() {
                if !available.remove(input) {
                    if seen.contains(input) {
                        return Err(GraphError::LabelReused(input.to_string()));
                    }
                    return Err(GraphError::UnknownInput(input.to_string()));
                }
            }
            let output = stage.output();
            if !seen.insert(output) {
                return Err(GraphError::DuplicateLabel(output.to_string()));
            }
            available.insert(output);
        }

        let mut leftover: Vec<&str> = available.into_iter().collect();
        leftover.sort_unstable();
        match leftover.as_slice() {
            [single] if *single == self.output_label => Ok(()),
            [single] => Err(GraphError::OutputMismatch {
                expected: self.output_label.clone(),
                actual: single.to_string(),
            }),
            labels => {
                let dangling = labels
                    .iter()
                    .find(|l| **l != self.output_label)
                    .unwrap_or(&"")
                    .to_string();
                Err(GraphError::DanglingLabel(dangling))
            }
        }
    }
}
