use std::borrow::Cow;
use std::collections::HashMap;

use crate::foundation::error::{OverlayError, OverlayResult};
use crate::layout::fonts::{FontBook, FontFace, FontSpec};
use crate::layout::text::{TextMeasurer, spaced_width};
use crate::model::color::Color;

/// Parley-backed shaping and measurement over the faces in a [`FontBook`].
///
/// Each registered face is also loaded into Parley's font collection; a request is
/// resolved through the book first so both agree on which face draws a font string.
pub struct ParleyTextEngine {
    book: FontBook,
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<Color>,
    /// `(lowercased family, weight)` -> family name Parley knows the face by.
    collection_names: HashMap<(String, u16), String>,
}

impl Default for ParleyTextEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ParleyTextEngine {
    pub fn new() -> Self {
        Self {
            book: FontBook::new(),
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            collection_names: HashMap::new(),
        }
    }

    pub fn book(&self) -> &FontBook {
        &self.book
    }

    /// Load `data` as `family` at `weight`. Overlays asking for `family` become drawable.
    pub fn register_font(&mut self, family: &str, weight: u16, data: Vec<u8>) -> OverlayResult<()> {
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(data.clone()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| OverlayError::validation("no font families registered from font data"))?;
        let collection_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| OverlayError::validation("registered font family has no name"))?
            .to_string();

        self.book.register(family, weight, data)?;
        self.collection_names
            .insert((family.trim().to_ascii_lowercase(), weight), collection_name);
        Ok(())
    }

    /// Face that draws `font`.
    pub fn face(&self, font: &FontSpec) -> OverlayResult<&FontFace> {
        self.book.resolve(font)
    }

    /// Shape one line of text with no wrapping.
    pub fn shape_line(
        &mut self,
        text: &str,
        font: &FontSpec,
        letter_spacing: f64,
        brush: Color,
    ) -> OverlayResult<parley::Layout<Color>> {
        if !font.size.is_finite() || font.size <= 0.0 {
            return Err(OverlayError::validation("font size must be finite and > 0"));
        }
        let face = self.book.resolve(font)?;
        let key = (face.family.to_ascii_lowercase(), face.weight);
        let weight = face.weight;
        let family_name = self
            .collection_names
            .get(&key)
            .cloned()
            .ok_or_else(|| OverlayError::font_not_ready(font.css()))?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(font.size as f32));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::new(f32::from(weight)),
        ));
        if letter_spacing != 0.0 {
            builder.push_default(parley::style::StyleProperty::LetterSpacing(
                letter_spacing as f32,
            ));
        }
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<Color> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

impl TextMeasurer for ParleyTextEngine {
    fn measure(&mut self, text: &str, font: &FontSpec, letter_spacing: f64) -> OverlayResult<f64> {
        self.book.resolve(font)?;
        if text.is_empty() {
            return Ok(0.0);
        }
        let layout = self.shape_line(text, font, 0.0, Color::WHITE)?;
        Ok(spaced_width(f64::from(layout.width()), text, letter_spacing))
    }

    fn font_generation(&self) -> u64 {
        self.book.generation()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/shape.rs"]
mod tests;
