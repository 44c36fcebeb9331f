use std::f32::consts::{PI, TAU};

use crate::fan::scene::Primitive;
use crate::theme::ChartTheme;
use crate::viewport::Viewport;

/// Spans within this of a full turn are drawn as complete rings; the
/// four-point arc path degenerates when start and end coincide.
const FULL_TURN_EPSILON: f32 = 1e-4;

/// Serializes primitives into an SVG fragment, preserving list order so the
/// scene's back-to-front draw order survives into the document.
pub fn fragment(prims: &[Primitive], theme: &ChartTheme) -> String {
    let mut svg = String::new();

    for prim in prims {
        match prim {
            Primitive::RingGuide { radius } => {
                svg.push_str(&format!(
                    r#"<circle cx="0" cy="0" r="{:.2}" fill="none" stroke="{}" stroke-width="1" opacity="0.3" />"#,
                    radius, theme.guide_stroke
                ));
            }
            Primitive::Connector { x1, y1, x2, y2 } => {
                svg.push_str(&format!(
                    r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="1.5" opacity="0.5" />"#,
                    x1, y1, x2, y2, theme.connector_stroke
                ));
            }
            Primitive::Disc { radius, fill } => {
                svg.push_str(&format!(
                    r#"<circle cx="0" cy="0" r="{:.2}" fill="{}" stroke="{}" stroke-width="2" opacity="0.95" />"#,
                    radius, fill, theme.wedge_stroke
                ));
            }
            Primitive::Wedge {
                inner_radius,
                outer_radius,
                start_angle,
                end_angle,
                fill,
            } => {
                svg.push_str(&format!(
                    r#"<path d="{}" fill="{}" fill-rule="evenodd" stroke="{}" stroke-width="1.5" opacity="0.9" />"#,
                    wedge_path(*inner_radius, *outer_radius, *start_angle, *end_angle),
                    fill,
                    theme.wedge_stroke
                ));
            }
            Primitive::Label {
                text,
                x,
                y,
                rotation,
                dy,
                font_size,
                font_family,
                color,
            } => {
                svg.push_str(&format!(
                    r#"<g transform="translate({:.2} {:.2}) rotate({:.2})"><text y="{:.2}" font-family="{}" font-size="{:.1}" fill="{}" text-anchor="middle">{}</text></g>"#,
                    x,
                    y,
                    rotation,
                    dy,
                    escape_xml(font_family),
                    font_size,
                    color,
                    escape_xml(text)
                ));
            }
        }
    }

    svg
}

/// Wraps the fragment in a complete document, applying the viewport's
/// translate+scale to a single group so pan/zoom never re-lays-out the
/// scene.
pub fn document(prims: &[Primitive], viewport: &Viewport, theme: &ChartTheme) -> String {
    let (scale, tx, ty) = viewport.transform();
    let width = viewport.width();
    let height = viewport.height();

    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width:.0}" height="{height:.0}" viewBox="0 0 {width:.0} {height:.0}">
<rect width="{width:.0}" height="{height:.0}" fill="{background}"/>
<g transform="translate({tx:.2} {ty:.2}) scale({scale:.4})">
{inner}
</g>
</svg>"#,
        background = theme.background_color,
        inner = fragment(prims, theme),
    )
}

/// Path for an annular wedge in the origin-centered frame. A full-turn span
/// becomes an even-odd annulus (outer circle plus inner hole), since a
/// single arc cannot close a 2π sweep.
fn wedge_path(inner: f32, outer: f32, start: f32, end: f32) -> String {
    if end - start >= TAU - FULL_TURN_EPSILON {
        return format!("{} {}", circle_subpath(outer), circle_subpath(inner));
    }

    let large_arc = i32::from(end - start > PI);
    let (ix0, iy0) = polar(inner, start);
    let (ox0, oy0) = polar(outer, start);
    let (ox1, oy1) = polar(outer, end);
    let (ix1, iy1) = polar(inner, end);

    format!(
        "M {ox0:.2} {oy0:.2} A {outer:.2} {outer:.2} 0 {large_arc} 1 {ox1:.2} {oy1:.2} L {ix1:.2} {iy1:.2} A {inner:.2} {inner:.2} 0 {large_arc} 0 {ix0:.2} {iy0:.2} Z"
    )
}

fn circle_subpath(radius: f32) -> String {
    format!(
        "M {r:.2} 0 A {r:.2} {r:.2} 0 1 1 {nr:.2} 0 A {r:.2} {r:.2} 0 1 1 {r:.2} 0 Z",
        r = radius,
        nr = -radius,
    )
}

fn polar(radius: f32, angle: f32) -> (f32, f32) {
    (radius * angle.cos(), radius * angle.sin())
}

fn is_valid_xml_char(c: char) -> bool {
    // XML 1.0 valid ranges: 0x09/0x0A/0x0D, 0x20..=0xD7FF, 0xE000..=0xFFFD,
    // 0x10000..=0x10FFFF.
    matches!(
        c as u32,
        0x09 | 0x0A | 0x0D | 0x20..=0xD7FF | 0xE000..=0xFFFD | 0x10000..=0x10FFFF
    )
}

/// Escapes markup characters and drops characters XML 1.0 forbids outright
/// (person names come straight from user input).
pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars().filter(|&c| is_valid_xml_char(c)) {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
