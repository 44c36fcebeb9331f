use std::f32::consts::TAU;

use crate::theme::{ChartTheme, parse_hex_rgb};
use crate::tree::Member;

/// Geometry and resolved style for one person. The whole tree of these is
/// derived state: rebuilt from scratch on every input change, never patched.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutNode {
    pub id: i64,
    pub display_name: String,
    pub display_year: String,
    /// Generation index; 0 is the founder disc.
    pub depth: u32,
    /// Index of this node's depth-1 ancestor among the founder's children.
    pub branch_id: usize,
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub start_angle: f32,
    pub end_angle: f32,
    pub mid_angle: f32,
    pub fill_color: String,
    pub font_color: String,
    pub font_size: f32,
    pub font_family: String,
    pub children: Vec<LayoutNode>,
}

impl LayoutNode {
    pub fn angle_span(&self) -> f32 {
        self.end_angle - self.start_angle
    }

    pub fn mid_radius(&self) -> f32 {
        (self.inner_radius + self.outer_radius) / 2.0
    }

    pub fn max_depth(&self) -> u32 {
        self.children
            .iter()
            .map(LayoutNode::max_depth)
            .fold(self.depth, u32::max)
    }
}

/// Lays out the normalized tree in one depth-first pass.
///
/// The founder takes the full circle; every other node receives an equal
/// share of its parent's span, assigned in ascending id order. Equal
/// division is applied uniformly for every sibling count, so a lone child
/// inherits its parent's entire span (a full ring under the founder) with
/// no special case.
pub fn layout(root: &Member, theme: &ChartTheme) -> LayoutNode {
    layout_node(root, theme, 0, 0.0, TAU, 0)
}

fn layout_node(
    member: &Member,
    theme: &ChartTheme,
    depth: u32,
    start_angle: f32,
    end_angle: f32,
    branch_id: usize,
) -> LayoutNode {
    let (inner_radius, outer_radius) = if depth == 0 {
        (0.0, theme.center_radius)
    } else {
        let inner = theme.center_radius + (depth - 1) as f32 * theme.ring_width;
        (inner, inner + theme.ring_width)
    };

    // Sort by id so layout is deterministic regardless of storage order.
    let mut ordered: Vec<&Member> = member.children.iter().collect();
    ordered.sort_by_key(|child| child.id);

    let step = if ordered.is_empty() {
        0.0
    } else {
        (end_angle - start_angle) / ordered.len() as f32
    };

    let children = ordered
        .into_iter()
        .enumerate()
        .map(|(i, child)| {
            let child_start = start_angle + step * i as f32;
            let child_branch = if depth == 0 { i } else { branch_id };
            layout_node(
                child,
                theme,
                depth + 1,
                child_start,
                child_start + step,
                child_branch,
            )
        })
        .collect();

    LayoutNode {
        id: member.id,
        display_name: member.display_name.clone(),
        display_year: member.display_year.clone(),
        depth,
        branch_id,
        inner_radius,
        outer_radius,
        start_angle,
        end_angle,
        mid_angle: (start_angle + end_angle) / 2.0,
        fill_color: resolve_fill(member.color.as_deref(), depth, branch_id, theme),
        font_color: resolve_color(member.font_color.as_deref(), &theme.font_color),
        font_size: resolve_font_size(member.font_size.as_deref(), theme.font_size),
        font_family: resolve_family(member.font_family.as_deref(), &theme.font_family),
        children,
    }
}

fn resolve_fill(overridden: Option<&str>, depth: u32, branch_id: usize, theme: &ChartTheme) -> String {
    if let Some(color) = recognizable_color(overridden) {
        return color.to_string();
    }
    if depth == 0 {
        theme.founder_color.clone()
    } else {
        theme.branch_color(branch_id).to_string()
    }
}

fn resolve_color(overridden: Option<&str>, fallback: &str) -> String {
    recognizable_color(overridden)
        .unwrap_or(fallback)
        .to_string()
}

/// An override counts only when it parses as a hex color; empty strings and
/// junk fall through to the default rather than failing the layout.
fn recognizable_color(overridden: Option<&str>) -> Option<&str> {
    let color = overridden?.trim();
    parse_hex_rgb(color).map(|_| color)
}

/// Font sizes arrive as strings on the wire ("12", "14px"). Anything that
/// is not a positive finite number keeps the theme default.
fn resolve_font_size(overridden: Option<&str>, fallback: f32) -> f32 {
    let Some(raw) = overridden else {
        return fallback;
    };
    let trimmed = raw.trim().trim_end_matches("px").trim();
    match trimmed.parse::<f32>() {
        Ok(size) if size.is_finite() && size > 0.0 => size,
        _ => fallback,
    }
}

fn resolve_family(overridden: Option<&str>, fallback: &str) -> String {
    match overridden.map(str::trim) {
        Some(family) if !family.is_empty() => family.to_string(),
        _ => fallback.to_string(),
    }
}
