//! Measurement and greedy word wrap for overlay text.
//!
//! Layout is expressed in reference pixels. The same [`TextMeasurer`] that the drawing
//! surface uses is used here, so the box the editor shows matches the glyphs it paints.

use std::collections::BTreeSet;

use crate::foundation::core::{Point, Rect, Size};
use crate::foundation::error::{OverlayError, OverlayResult};
use crate::layout::fonts::FontSpec;
use crate::model::overlay::{HorizontalAlign, Position, Styling, VerticalAnchor};

/// Something that can measure a single line of text.
pub trait TextMeasurer {
    /// Advance width of `text` in `font`, including `letter_spacing * (chars - 1)`.
    ///
    /// Returns [`OverlayError::FontNotReady`] when `font` is not loaded yet.
    fn measure(&mut self, text: &str, font: &FontSpec, letter_spacing: f64) -> OverlayResult<f64>;

    /// Changes whenever the set of loaded fonts changes.
    fn font_generation(&self) -> u64 {
        0
    }
}

/// Add inter-character spacing to a raw advance width.
pub fn spaced_width(raw: f64, text: &str, letter_spacing: f64) -> f64 {
    let chars = text.chars().count();
    if chars > 1 {
        raw + letter_spacing * (chars - 1) as f64
    } else {
        raw
    }
}

/// Fixed-advance measurer for headless use and tests.
///
/// Every character advances by `advance` pixels regardless of font size. When a set of
/// loaded families is given, any other family reports `FontNotReady`.
#[derive(Clone, Debug)]
pub struct MonospaceMeasurer {
    pub advance: f64,
    loaded: Option<BTreeSet<String>>,
    generation: u64,
}

impl MonospaceMeasurer {
    pub fn new(advance: f64) -> Self {
        Self {
            advance,
            loaded: None,
            generation: 0,
        }
    }

    /// Restrict measurement to `families`; everything else is not ready.
    pub fn with_loaded_families<I, S>(mut self, families: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.loaded = Some(
            families
                .into_iter()
                .map(|f| f.as_ref().to_ascii_lowercase())
                .collect(),
        );
        self
    }

    /// Mark `family` as loaded.
    pub fn load_family(&mut self, family: &str) {
        if let Some(loaded) = &mut self.loaded {
            loaded.insert(family.to_ascii_lowercase());
        }
        self.generation += 1;
    }

    pub fn is_ready(&self, font: &FontSpec) -> bool {
        self.loaded
            .as_ref()
            .is_none_or(|l| l.contains(&font.family.to_ascii_lowercase()))
    }
}

impl TextMeasurer for MonospaceMeasurer {
    fn measure(&mut self, text: &str, font: &FontSpec, letter_spacing: f64) -> OverlayResult<f64> {
        if !self.is_ready(font) {
            return Err(OverlayError::font_not_ready(font.css()));
        }
        let raw = self.advance * text.chars().count() as f64;
        Ok(spaced_width(raw, text, letter_spacing))
    }

    fn font_generation(&self) -> u64 {
        self.generation
    }
}

/// Lines of an overlay and the size of the box that holds them.
#[derive(Clone, Debug, PartialEq)]
pub struct TextLayout {
    pub lines: Vec<String>,
    /// Measured width of each line, same order as `lines`.
    pub line_widths: Vec<f64>,
    pub width: f64,
    pub height: f64,
    pub line_height_px: f64,
}

impl TextLayout {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Horizontal offset of line `i` from the box's left edge for `align`.
    pub fn line_offset_x(&self, i: usize, align: HorizontalAlign) -> f64 {
        let w = self.line_widths.get(i).copied().unwrap_or(0.0);
        match align {
            HorizontalAlign::Left => 0.0,
            HorizontalAlign::Center => (self.width - w) / 2.0,
            HorizontalAlign::Right => self.width - w,
        }
    }

    /// Vertical centre of line slot `i`, measured from the box's top edge.
    ///
    /// The block of lines is centred in the box, so a fixed height taller than the text
    /// leaves equal space above and below.
    pub fn line_center_y(&self, i: usize) -> f64 {
        let block = self.lines.len() as f64 * self.line_height_px;
        (self.height - block) / 2.0 + (i as f64 + 0.5) * self.line_height_px
    }

    pub fn char_count(&self) -> usize {
        self.lines.iter().map(|l| l.chars().count()).sum()
    }
}

/// Lay `text` out with `styling`.
///
/// Without `box_width` every hard line break starts a new line and nothing wraps. With a
/// box width, words are added greedily while the line still fits; a word wider than the
/// box sits alone on its line. `explicit_height` overrides the derived height.
pub fn layout_text(
    text: &str,
    styling: &Styling,
    box_width: Option<f64>,
    explicit_height: Option<f64>,
    measurer: &mut dyn TextMeasurer,
) -> OverlayResult<TextLayout> {
    let font = styling.font_spec();
    let spacing = styling.letter_spacing;
    // Fail fast on an unloaded font, even for empty text.
    measurer.measure("", &font, spacing)?;

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let paragraph = paragraph.strip_suffix('\r').unwrap_or(paragraph);
        match box_width {
            Some(max) => wrap_paragraph(paragraph, max, &font, spacing, measurer, &mut lines)?,
            None if paragraph.trim().is_empty() => {}
            None => lines.push(paragraph.to_string()),
        }
    }
    // Blank paragraphs are dropped; only text with nothing to show keeps one empty line.
    if lines.is_empty() {
        lines.push(String::new());
    }

    let line_widths = lines
        .iter()
        .map(|l| measurer.measure(l, &font, spacing))
        .collect::<OverlayResult<Vec<f64>>>()?;
    let width = match box_width {
        Some(w) => w,
        None => line_widths.iter().copied().fold(0.0, f64::max),
    };
    let line_height_px = styling.line_height_px();
    let height = explicit_height.unwrap_or(lines.len() as f64 * line_height_px);

    Ok(TextLayout {
        lines,
        line_widths,
        width,
        height,
        line_height_px,
    })
}

fn wrap_paragraph(
    paragraph: &str,
    max_width: f64,
    font: &FontSpec,
    spacing: f64,
    measurer: &mut dyn TextMeasurer,
    out: &mut Vec<String>,
) -> OverlayResult<()> {
    let mut current = String::new();
    for word in paragraph.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{current} {word}");
        if measurer.measure(&candidate, font, spacing)? <= max_width {
            current = candidate;
        } else {
            out.push(std::mem::replace(&mut current, word.to_string()));
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    Ok(())
}

/// Top-left corner of a box of `size` placed against `anchor`.
pub fn box_origin(
    anchor: Point,
    size: Size,
    alignment: HorizontalAlign,
    anchor_point: VerticalAnchor,
) -> Point {
    let x = match alignment {
        HorizontalAlign::Left => anchor.x,
        HorizontalAlign::Center => anchor.x - size.width / 2.0,
        HorizontalAlign::Right => anchor.x - size.width,
    };
    let y = match anchor_point {
        VerticalAnchor::Top => anchor.y,
        VerticalAnchor::Middle => anchor.y - size.height / 2.0,
        VerticalAnchor::Bottom => anchor.y - size.height,
    };
    Point::new(x, y)
}

/// Text box of `layout` for an overlay anchored at `anchor_px`.
pub fn text_box(anchor_px: Point, layout: &TextLayout, position: &Position) -> Rect {
    let size = layout.size();
    Rect::from_origin_size(
        box_origin(anchor_px, size, position.alignment, position.anchor_point),
        size,
    )
}

/// Hit-test and selection box: the text box grown by `padding` on every side.
pub fn padded_box(text_box: Rect, padding: f64) -> Rect {
    text_box.inflate(padding, padding)
}

#[cfg(test)]
#[path = "../../tests/unit/layout/text.rs"]
mod tests;
