use super::types::{FilterStage, GraphSpec};
use crate::transform::ResolvedPlan;

const BG_LABEL: &str = "bg";
const SCALED_LABEL: &str = "scaled";
const ROUNDED_LABEL: &str = "rounded";
const OUTPUT_LABEL: &str = "composite";

/// Build the filter graph for a resolved plan.
///
/// Without a corner radius the graph is fill -> scale -> overlay; with one,
/// a mask stage slots in between scale and overlay. The returned graph
/// always passes [`GraphSpec::validate`].
pub fn build_graph(plan: &ResolvedPlan) -> GraphSpec {
    let mut stages = vec![
        FilterStage::Fill {
            fill: plan.background.clone(),
            width: plan.canvas_width,
            height: plan.canvas_height,
            output: BG_LABEL.to_string(),
        },
        FilterStage::Scale {
            width: plan.scaled_width,
            height: plan.scaled_height,
            output: SCALED_LABEL.to_string(),
        },
    ];

    let foreground = if plan.needs_mask() {
        stages.push(FilterStage::Mask {
            input: SCALED_LABEL.to_string(),
            width: plan.scaled_width,
            height: plan.scaled_height,
            radius: plan.corner_radius,
            output: ROUNDED_LABEL.to_string(),
        });
        ROUNDED_LABEL
    } else {
        SCALED_LABEL
    };

    stages.push(FilterStage::Overlay {
        background: BG_LABEL.to_string(),
        foreground: foreground.to_string(),
        offset_x: plan.offset_x,
        offset_y: plan.offset_y,
        output: OUTPUT_LABEL.to_string(),
    });

    let graph = GraphSpec {
        stages,
        aux_inputs: vec![],
        output_label: OUTPUT_LABEL.to_string(),
    };
    debug_assert!(graph.validate().is_ok());
    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::ResolvedBackground;

    fn plan(corner_radius: u32) -> ResolvedPlan {
        ResolvedPlan {
            canvas_width: 1080,
            canvas_height: 1080,
            scaled_width: 864,
            scaled_height: 864,
            background: ResolvedBackground::Solid {
                color: "#FF0000".to_string(),
            },
            corner_radius,
            offset_x: 0,
            offset_y: 0,
        }
    }

    #[test]
    fn test_graph_without_mask_has_three_stages() {
        let graph = build_graph(&plan(0));

        assert_eq!(graph.stages.len(), 3);
        assert!(graph.validate().is_ok());
        assert!(graph.aux_inputs.is_empty());

        // Overlay composites the scaled video directly.
        assert!(matches!(
            &graph.stages[2],
            FilterStage::Overlay { foreground, .. } if foreground == "scaled"
        ));
    }

    #[test]
    fn test_graph_with_mask_has_four_stages() {
        let graph = build_graph(&plan(40));

        assert_eq!(graph.stages.len(), 4);
        assert!(graph.validate().is_ok());

        assert!(matches!(
            &graph.stages[2],
            FilterStage::Mask { input, radius: 40, .. } if input == "scaled"
        ));
        assert!(matches!(
            &graph.stages[3],
            FilterStage::Overlay { foreground, .. } if foreground == "rounded"
        ));
    }

    #[test]
    fn test_mask_uses_scaled_dimensions_not_canvas() {
        let graph = build_graph(&plan(40));

        assert!(matches!(
            &graph.stages[2],
            FilterStage::Mask {
                width: 864,
                height: 864,
                ..
            }
        ));
    }

    #[test]
    fn test_serialized_graph_without_mask() {
        let graph = build_graph(&plan(0));
        assert_eq!(
            graph.serialize(),
            "color=color=#FF0000:size=1080x1080[bg];\
             [0:v]scale=864:864[scaled];\
             [bg][scaled]overlay=(W-w)/2+(0):(H-h)/2+(0)[composite]"
        );
    }

    #[test]
    fn test_offsets_flow_into_overlay() {
        let mut p = plan(0);
        p.offset_x = 25;
        p.offset_y = -60;
        let graph = build_graph(&p);

        assert!(graph
            .serialize()
            .contains("overlay=(W-w)/2+(25):(H-h)/2+(-60)"));
    }

    #[test]
    fn test_gradient_background_graph() {
        let mut p = plan(0);
        p.background = ResolvedBackground::Gradient {
            c0: "112233".to_string(),
            c1: "445566".to_string(),
            x1: 1080,
            y1: 0,
        };
        let graph = build_graph(&p);

        assert!(graph.serialize().starts_with("gradients=s=1080x1080:c0=112233"));
        assert!(graph.validate().is_ok());
    }
}
