use std::collections::HashMap;

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping};

#[derive(Hash, PartialEq, Eq, Clone)]
struct MeasureKey {
    text: String,
    font_size_bits: u32,
    family: String,
}

/// Measures rendered text extents so labels can be shrunk to their wedge.
/// The scene builder treats a non-finite or non-positive width as
/// "measurement unavailable" and keeps the resolved font size.
pub trait TextMeasure {
    fn measure_text(&mut self, text: &str, font_size: f32, family: &str) -> (f32, f32);
}

pub struct CosmicTextMeasure {
    font_system: FontSystem,
    cache: HashMap<MeasureKey, (f32, f32)>,
}

impl CosmicTextMeasure {
    pub fn new() -> Result<Self, String> {
        Ok(Self {
            font_system: FontSystem::new(),
            cache: HashMap::new(),
        })
    }
}

/// Maps the generic CSS family keywords onto shaper families; anything else
/// is looked up by name.
fn resolve_family(name: &str) -> Family<'_> {
    match name.trim() {
        "serif" => Family::Serif,
        "sans-serif" => Family::SansSerif,
        "monospace" => Family::Monospace,
        "cursive" => Family::Cursive,
        "fantasy" => Family::Fantasy,
        other => Family::Name(other),
    }
}

impl TextMeasure for CosmicTextMeasure {
    fn measure_text(&mut self, text: &str, font_size: f32, family: &str) -> (f32, f32) {
        let key = MeasureKey {
            text: text.to_string(),
            font_size_bits: font_size.to_bits(),
            family: family.to_string(),
        };

        if let Some(cached) = self.cache.get(&key) {
            return *cached;
        }

        let line_height = font_size * 1.2;
        let mut buffer = Buffer::new(
            &mut self.font_system,
            Metrics {
                font_size,
                line_height,
            },
        );

        buffer.set_size(&mut self.font_system, None, None);

        let attrs = Attrs::new().family(resolve_family(family));
        buffer.set_text(&mut self.font_system, text, &attrs, Shaping::Advanced, None);

        let mut total_width: f32 = 0.0;
        let mut total_height: f32 = 0.0;

        for run in buffer.layout_runs() {
            total_width = total_width.max(run.line_w);
            total_height += run.line_height;
        }

        let measured = (total_width, total_height);
        self.cache.insert(key, measured);
        measured
    }
}

impl Default for CosmicTextMeasure {
    fn default() -> Self {
        Self::new().expect("Failed to initialize font system")
    }
}
