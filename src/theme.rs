use serde::{Deserialize, Serialize};

const BACKGROUND: &str = "#1e2127";
const FOUNDER_COLOR: &str = "#2c3e50";
const FONT_COLOR: &str = "#ffffff";
const FONT_FAMILY: &str = "sans-serif";
const CAPTION_COLOR: &str = "#aaaaaa";
const WEDGE_STROKE: &str = "rgba(255, 255, 255, 0.3)";
const CONNECTOR_STROKE: &str = "rgba(255, 255, 255, 0.3)";
const GUIDE_STROKE: &str = "rgba(255, 255, 255, 0.1)";

const BRANCH_PALETTE: &[&str] = &[
    "#4a90e2", "#50c878", "#ff6b6b", "#ffa500", "#9b59b6", "#1abc9c", "#e74c3c", "#f39c12",
    "#3498db", "#2ecc71",
];

const FONT_SIZE: f32 = 12.0;
const MIN_FONT_SIZE: f32 = 8.0;
const CAPTION_FONT_SIZE: f32 = 10.0;
const CENTER_RADIUS: f32 = 40.0;
const RING_WIDTH: f32 = 80.0;

/// Immutable chart configuration: geometry constants, branch palette and
/// style defaults. Passed by reference into layout and scene building, so a
/// given (tree, theme) pair always produces the same output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartTheme {
    #[serde(default = "default_background")]
    pub background_color: String,
    #[serde(default = "default_founder_color")]
    pub founder_color: String,
    /// Default fill per founder-child lineage, indexed by branch id.
    #[serde(default = "default_branch_palette")]
    pub branch_palette: Vec<String>,
    #[serde(default = "default_font_color")]
    pub font_color: String,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    /// Adaptive label sizing never shrinks below this.
    #[serde(default = "default_min_font_size")]
    pub min_font_size: f32,
    #[serde(default = "default_caption_color")]
    pub caption_color: String,
    #[serde(default = "default_caption_font_size")]
    pub caption_font_size: f32,
    /// Radius of the founder disc.
    #[serde(default = "default_center_radius")]
    pub center_radius: f32,
    /// Thickness of each generation band.
    #[serde(default = "default_ring_width")]
    pub ring_width: f32,
    #[serde(default = "default_wedge_stroke")]
    pub wedge_stroke: String,
    #[serde(default = "default_connector_stroke")]
    pub connector_stroke: String,
    #[serde(default = "default_guide_stroke")]
    pub guide_stroke: String,
}

fn default_background() -> String {
    BACKGROUND.to_string()
}
fn default_founder_color() -> String {
    FOUNDER_COLOR.to_string()
}
fn default_branch_palette() -> Vec<String> {
    BRANCH_PALETTE.iter().map(|c| c.to_string()).collect()
}
fn default_font_color() -> String {
    FONT_COLOR.to_string()
}
fn default_font_family() -> String {
    FONT_FAMILY.to_string()
}
fn default_font_size() -> f32 {
    FONT_SIZE
}
fn default_min_font_size() -> f32 {
    MIN_FONT_SIZE
}
fn default_caption_color() -> String {
    CAPTION_COLOR.to_string()
}
fn default_caption_font_size() -> f32 {
    CAPTION_FONT_SIZE
}
fn default_center_radius() -> f32 {
    CENTER_RADIUS
}
fn default_ring_width() -> f32 {
    RING_WIDTH
}
fn default_wedge_stroke() -> String {
    WEDGE_STROKE.to_string()
}
fn default_connector_stroke() -> String {
    CONNECTOR_STROKE.to_string()
}
fn default_guide_stroke() -> String {
    GUIDE_STROKE.to_string()
}

impl Default for ChartTheme {
    fn default() -> Self {
        toml::from_str("").expect("empty theme must resolve to defaults")
    }
}

impl ChartTheme {
    pub fn from_toml_str(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("Failed to parse theme TOML: {}", e))
    }

    /// Default fill for a lineage. Wraps around the palette; an empty
    /// palette falls back to the founder color rather than panicking.
    pub fn branch_color(&self, branch_id: usize) -> &str {
        if self.branch_palette.is_empty() {
            return &self.founder_color;
        }
        &self.branch_palette[branch_id % self.branch_palette.len()]
    }
}

/// Parses `#rgb` or `#rrggbb`. Used to decide whether a per-person override
/// is a recognizable color; anything else falls through to the palette.
pub fn parse_hex_rgb(value: &str) -> Option<(u8, u8, u8)> {
    let hex = value.strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }

    match hex.len() {
        3 => {
            let mut chars = hex.chars();
            let mut channel = || {
                let digit = chars.next()?.to_digit(16)? as u8;
                Some(digit * 16 + digit)
            };
            Some((channel()?, channel()?, channel()?))
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some((r, g, b))
        }
        _ => None,
    }
}
