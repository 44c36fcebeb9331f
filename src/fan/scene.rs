use crate::fan::layout::LayoutNode;
use crate::fonts::TextMeasure;
use crate::theme::ChartTheme;

/// A label may occupy at most this share of its wedge's arc length.
const ARC_FILL_RATIO: f32 = 0.85;
/// Floor for the usable label width, so tiny wedges still get a few glyphs.
const MIN_LABEL_WIDTH: f32 = 30.0;
/// Gap between a ring's outer edge and its generation caption.
const CAPTION_OFFSET: f32 = 15.0;

const GENERATION_CAPTIONS: &[&str] = &[
    "First Generation",
    "Second Generation",
    "Third Generation",
    "Fourth Generation",
    "Fifth Generation",
    "Sixth Generation",
    "Seventh Generation",
];

const EMPTY_TREE_MESSAGE: &str = "No family members to display yet";

/// Drawable primitives in a single origin-centered Cartesian frame.
/// Angle 0 points along +x and angles increase toward +y, uniformly for
/// wedges, connectors and labels.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// Faint full-circle outline marking a generation boundary.
    RingGuide { radius: f32 },
    /// Parent→child connector stroke.
    Connector { x1: f32, y1: f32, x2: f32, y2: f32 },
    /// The founder disc at the scene origin.
    Disc { radius: f32, fill: String },
    /// Annular wedge; a span of 2π covers the whole ring.
    Wedge {
        inner_radius: f32,
        outer_radius: f32,
        start_angle: f32,
        end_angle: f32,
        fill: String,
    },
    /// Text anchored at (x, y), rotated `rotation` degrees about the anchor,
    /// then shifted `dy` along the rotated baseline normal.
    Label {
        text: String,
        x: f32,
        y: f32,
        rotation: f32,
        dy: f32,
        font_size: f32,
        font_family: String,
        color: String,
    },
}

/// Axis-aligned bounds of a primitive list, used for fit-to-content framing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BBox {
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }
}

/// Walks a laid-out tree and emits primitives in back-to-front draw order:
/// ring guides, then connectors, then the founder disc and wedges, then
/// every label on top so names stay legible over the fills.
pub struct SceneBuilder<'a, T: TextMeasure> {
    theme: &'a ChartTheme,
    measure: &'a mut T,
}

impl<'a, T: TextMeasure> SceneBuilder<'a, T> {
    pub fn new(theme: &'a ChartTheme, measure: &'a mut T) -> Self {
        Self { theme, measure }
    }

    pub fn build(mut self, root: &LayoutNode) -> Vec<Primitive> {
        let mut prims = Vec::new();
        self.push_ring_guides(&mut prims, root);
        self.push_connectors(&mut prims, root);
        self.push_shapes(&mut prims, root);
        self.push_captions(&mut prims, root);
        self.push_labels(&mut prims, root);
        prims
    }

    /// Scene for the empty-tree sentinel: one informational message, no
    /// geometry.
    pub fn empty_message(self) -> Vec<Primitive> {
        vec![Primitive::Label {
            text: EMPTY_TREE_MESSAGE.to_string(),
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            dy: 0.0,
            font_size: self.theme.font_size,
            font_family: self.theme.font_family.clone(),
            color: self.theme.font_color.clone(),
        }]
    }

    fn push_ring_guides(&self, prims: &mut Vec<Primitive>, root: &LayoutNode) {
        let max_depth = root.max_depth();
        for depth in 0..=max_depth {
            prims.push(Primitive::RingGuide {
                radius: self.theme.center_radius + depth as f32 * self.theme.ring_width,
            });
        }
    }

    fn push_connectors(&self, prims: &mut Vec<Primitive>, node: &LayoutNode) {
        for child in &node.children {
            let (x1, y1) = polar(node.outer_radius, child.mid_angle);
            let (x2, y2) = polar(child.inner_radius, child.mid_angle);
            prims.push(Primitive::Connector { x1, y1, x2, y2 });
            self.push_connectors(prims, child);
        }
    }

    fn push_shapes(&self, prims: &mut Vec<Primitive>, node: &LayoutNode) {
        if node.depth == 0 {
            prims.push(Primitive::Disc {
                radius: node.outer_radius,
                fill: node.fill_color.clone(),
            });
        } else {
            prims.push(Primitive::Wedge {
                inner_radius: node.inner_radius,
                outer_radius: node.outer_radius,
                start_angle: node.start_angle,
                end_angle: node.end_angle,
                fill: node.fill_color.clone(),
            });
        }
        for child in &node.children {
            self.push_shapes(prims, child);
        }
    }

    fn push_captions(&self, prims: &mut Vec<Primitive>, root: &LayoutNode) {
        let generations = root.max_depth().min(GENERATION_CAPTIONS.len() as u32);
        for depth in 1..=generations {
            let outer = self.theme.center_radius + depth as f32 * self.theme.ring_width;
            prims.push(Primitive::Label {
                text: GENERATION_CAPTIONS[depth as usize - 1].to_string(),
                x: 0.0,
                y: -(outer + CAPTION_OFFSET),
                rotation: 0.0,
                dy: 0.0,
                font_size: self.theme.caption_font_size,
                font_family: self.theme.font_family.clone(),
                color: self.theme.caption_color.clone(),
            });
        }
    }

    fn push_labels(&mut self, prims: &mut Vec<Primitive>, node: &LayoutNode) {
        if node.depth == 0 {
            self.push_label_pair(prims, node, 0.0, 0.0, 0.0, -8.0, 12.0, node.font_size);
        } else {
            let label_radius = node.mid_radius();
            let (x, y) = polar(label_radius, node.mid_angle);
            let rotation = label_rotation(node.mid_angle);
            let arc_length = node.angle_span().abs() * label_radius;
            let max_width = (arc_length * ARC_FILL_RATIO).max(MIN_LABEL_WIDTH);
            let fitted = self.fitted_font_size(
                &node.display_name,
                &node.font_family,
                node.font_size,
                max_width,
            );
            self.push_label_pair(prims, node, x, y, rotation, -5.0, 10.0, fitted);
        }

        for child in &node.children {
            self.push_labels(prims, child);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn push_label_pair(
        &self,
        prims: &mut Vec<Primitive>,
        node: &LayoutNode,
        x: f32,
        y: f32,
        rotation: f32,
        name_dy: f32,
        year_dy: f32,
        name_size: f32,
    ) {
        prims.push(Primitive::Label {
            text: node.display_name.clone(),
            x,
            y,
            rotation,
            dy: name_dy,
            font_size: name_size,
            font_family: node.font_family.clone(),
            color: node.font_color.clone(),
        });
        prims.push(Primitive::Label {
            text: node.display_year.clone(),
            x,
            y,
            rotation,
            dy: year_dy,
            font_size: (name_size * 0.85).max(self.theme.min_font_size),
            font_family: node.font_family.clone(),
            color: node.font_color.clone(),
        });
    }

    /// Shrinks (never grows) the font until the measured name fits the
    /// wedge, floored at the theme minimum. A failed measurement keeps the
    /// resolved size rather than dropping the label.
    fn fitted_font_size(&mut self, text: &str, family: &str, size: f32, max_width: f32) -> f32 {
        let (width, _) = self.measure.measure_text(text, size, family);
        if !width.is_finite() || width <= 0.0 {
            return size;
        }
        if width <= max_width {
            return size;
        }
        (size * max_width / width).max(self.theme.min_font_size).min(size)
    }
}

fn polar(radius: f32, angle: f32) -> (f32, f32) {
    (radius * angle.cos(), radius * angle.sin())
}

/// Rotation (degrees) that lays text tangent to the ring at `mid_angle`,
/// flipped by a half turn when it would read upside-down. The emitted
/// angle, normalized to [0°, 360°), never lies strictly inside (90°, 270°).
fn label_rotation(mid_angle: f32) -> f32 {
    let degrees = mid_angle.to_degrees().rem_euclid(360.0);
    let rotation = degrees + 90.0;
    if rotation > 90.0 && rotation < 270.0 {
        degrees - 90.0
    } else {
        rotation
    }
}

/// Conservative bounds over every primitive: wedges and guides contribute
/// their full outer circle, labels a small pad around their anchor.
pub fn bounding_box(prims: &[Primitive]) -> BBox {
    let mut min_x = f32::MAX;
    let mut min_y = f32::MAX;
    let mut max_x = f32::MIN;
    let mut max_y = f32::MIN;

    let mut include = |x: f32, y: f32| {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    };

    for prim in prims {
        match prim {
            Primitive::RingGuide { radius } | Primitive::Disc { radius, .. } => {
                include(-radius, -radius);
                include(*radius, *radius);
            }
            Primitive::Wedge { outer_radius, .. } => {
                include(-outer_radius, -outer_radius);
                include(*outer_radius, *outer_radius);
            }
            Primitive::Connector { x1, y1, x2, y2 } => {
                include(*x1, *y1);
                include(*x2, *y2);
            }
            Primitive::Label {
                x, y, dy, font_size, ..
            } => {
                include(x - font_size, y + dy - font_size);
                include(x + font_size, y + dy + font_size);
            }
        }
    }

    if min_x > max_x {
        return BBox::default();
    }

    BBox {
        x: min_x,
        y: min_y,
        width: max_x - min_x,
        height: max_y - min_y,
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::{PI, TAU};

    use super::*;
    use crate::fan::layout::layout;
    use crate::theme::ChartTheme;
    use crate::tree::Member;

    /// Deterministic width stand-in: every glyph is 0.6 em wide.
    struct FixedWidthMeasure;

    impl TextMeasure for FixedWidthMeasure {
        fn measure_text(&mut self, text: &str, font_size: f32, _family: &str) -> (f32, f32) {
            (
                text.chars().count() as f32 * font_size * 0.6,
                font_size * 1.2,
            )
        }
    }

    /// A measurement backend that always fails.
    struct BrokenMeasure;

    impl TextMeasure for BrokenMeasure {
        fn measure_text(&mut self, _text: &str, _font_size: f32, _family: &str) -> (f32, f32) {
            (f32::NAN, f32::NAN)
        }
    }

    fn member(id: i64, name: &str, children: Vec<Member>) -> Member {
        Member {
            id,
            display_name: name.to_string(),
            display_year: "1900".to_string(),
            color: None,
            font_color: None,
            font_size: None,
            font_family: None,
            children,
        }
    }

    fn fan(children: usize) -> Vec<Primitive> {
        let kids = (1..=children as i64)
            .map(|id| member(id, "Kid", vec![]))
            .collect();
        let tree = member(0, "Founder", kids);
        let theme = ChartTheme::default();
        let laid = layout(&tree, &theme);
        SceneBuilder::new(&theme, &mut FixedWidthMeasure).build(&laid)
    }

    fn rank(prim: &Primitive) -> u8 {
        match prim {
            Primitive::RingGuide { .. } => 0,
            Primitive::Connector { .. } => 1,
            Primitive::Disc { .. } | Primitive::Wedge { .. } => 2,
            Primitive::Label { .. } => 3,
        }
    }

    #[test]
    fn primitives_come_out_in_draw_order() {
        let prims = fan(4);
        let ranks: Vec<u8> = prims.iter().map(rank).collect();
        let mut sorted = ranks.clone();
        sorted.sort_unstable();
        assert_eq!(ranks, sorted, "guides, connectors, shapes, labels");
    }

    #[test]
    fn founder_becomes_a_disc_at_origin() {
        let prims = fan(2);
        assert!(prims.iter().any(|p| matches!(
            p,
            Primitive::Disc { radius, .. } if (*radius - 40.0).abs() < 1e-4
        )));
    }

    #[test]
    fn lone_child_wedge_covers_the_whole_ring() {
        let prims = fan(1);
        let span = prims.iter().find_map(|p| match p {
            Primitive::Wedge {
                start_angle,
                end_angle,
                ..
            } => Some(end_angle - start_angle),
            _ => None,
        });
        assert!((span.expect("one wedge") - TAU).abs() < 1e-4);
    }

    #[test]
    fn connectors_join_parent_outer_to_child_inner() {
        let prims = fan(2);
        let connectors: Vec<_> = prims
            .iter()
            .filter(|p| matches!(p, Primitive::Connector { .. }))
            .collect();
        assert_eq!(connectors.len(), 2);
        if let Primitive::Connector { x1, y1, x2, y2 } = connectors[0] {
            // First child's mid angle is π/2: straight down the +y axis.
            assert!(x1.abs() < 1e-4 && x2.abs() < 1e-4);
            assert!((y1 - 40.0).abs() < 1e-3);
            assert!((y2 - 40.0).abs() < 1e-3);
        }
    }

    #[test]
    fn label_rotation_never_reads_upside_down() {
        for i in 0..64 {
            let angle = TAU * i as f32 / 64.0;
            let rotation = label_rotation(angle).rem_euclid(360.0);
            assert!(
                !(rotation > 90.0 && rotation < 270.0),
                "angle {angle} produced upside-down rotation {rotation}"
            );
        }
    }

    #[test]
    fn bottom_half_labels_are_flipped() {
        // The bottom of the circle (90°) flips by a half turn to read
        // left-to-right.
        assert!(label_rotation(PI / 2.0).abs() < 1e-3);
        // The top (270°) keeps the plain tangent rotation.
        assert!((label_rotation(3.0 * PI / 2.0) - 360.0).abs() < 1e-3);
    }

    #[test]
    fn long_names_shrink_but_respect_the_floor() {
        let theme = ChartTheme::default();
        let long = "An Extraordinarily Long Ancestral Name";
        let kids = (1..=24).map(|id| member(id, long, vec![])).collect();
        let laid = layout(&member(0, "Founder", kids), &theme);
        let prims = SceneBuilder::new(&theme, &mut FixedWidthMeasure).build(&laid);

        let name_sizes: Vec<f32> = prims
            .iter()
            .filter_map(|p| match p {
                Primitive::Label {
                    text, font_size, ..
                } if text == long => Some(*font_size),
                _ => None,
            })
            .collect();
        assert!(!name_sizes.is_empty());
        for size in name_sizes {
            assert!(size < theme.font_size, "cramped wedge must shrink its label");
            assert!(size >= theme.min_font_size);
        }
    }

    #[test]
    fn short_names_keep_their_resolved_size() {
        let theme = ChartTheme::default();
        let laid = layout(&member(0, "Founder", vec![member(1, "Jo", vec![])]), &theme);
        let prims = SceneBuilder::new(&theme, &mut FixedWidthMeasure).build(&laid);
        assert!(prims.iter().any(|p| matches!(
            p,
            Primitive::Label { text, font_size, .. } if text == "Jo" && *font_size == theme.font_size
        )));
    }

    #[test]
    fn broken_measurement_keeps_the_resolved_size() {
        let theme = ChartTheme::default();
        let long = "An Extraordinarily Long Ancestral Name";
        let kids = (1..=24).map(|id| member(id, long, vec![])).collect();
        let laid = layout(&member(0, "Founder", kids), &theme);
        let prims = SceneBuilder::new(&theme, &mut BrokenMeasure).build(&laid);
        assert!(prims.iter().any(|p| matches!(
            p,
            Primitive::Label { text, font_size, .. } if text == long && *font_size == theme.font_size
        )));
    }

    #[test]
    fn empty_tree_renders_one_message_and_no_geometry() {
        let theme = ChartTheme::default();
        let prims = SceneBuilder::new(&theme, &mut FixedWidthMeasure).empty_message();
        assert_eq!(prims.len(), 1);
        assert!(matches!(&prims[0], Primitive::Label { text, .. } if text.contains("No family")));
    }

    #[test]
    fn captions_follow_generations_up_to_the_named_list() {
        let deep = member(
            0,
            "Founder",
            vec![member(1, "A", vec![member(2, "B", vec![])])],
        );
        let theme = ChartTheme::default();
        let laid = layout(&deep, &theme);
        let prims = SceneBuilder::new(&theme, &mut FixedWidthMeasure).build(&laid);
        let captions: Vec<&str> = prims
            .iter()
            .filter_map(|p| match p {
                Primitive::Label { text, .. } if text.ends_with("Generation") => {
                    Some(text.as_str())
                }
                _ => None,
            })
            .collect();
        assert_eq!(captions, vec!["First Generation", "Second Generation"]);
    }

    #[test]
    fn bounding_box_is_centered_on_the_scene() {
        let prims = fan(3);
        let bbox = bounding_box(&prims);
        assert!(bbox.width > 0.0);
        assert!(bbox.center_x().abs() < 1.0);
        // Captions above the top ring pull the box slightly upward.
        assert!(bbox.center_y() <= 0.0);
    }

    #[test]
    fn bounding_box_of_nothing_is_zero() {
        assert_eq!(bounding_box(&[]), BBox::default());
    }
}
