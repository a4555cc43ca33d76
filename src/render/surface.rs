use crate::foundation::core::{Affine, Point, Rect, Size, Vec2};
use crate::foundation::error::OverlayResult;
use crate::layout::fonts::FontSpec;
use crate::layout::text::{MonospaceMeasurer, TextMeasurer};
use crate::model::color::Color;

/// Drop shadow applied to text drawn while it is set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadowStyle {
    pub color: Color,
    pub offset: Vec2,
    pub blur: f64,
}

/// Canvas-2D style drawing target.
///
/// State (transform, global alpha, shadow) is saved and restored as a stack. Transforms
/// compose onto the current one, so `translate` then `scale` scales around the translated
/// origin. Text is placed with its left edge at `origin.x` and its vertical middle at
/// `origin.y`.
pub trait DrawSurface: TextMeasurer {
    /// Surface size in canvas pixels.
    fn size(&self) -> Size;

    fn clear(&mut self);

    fn save(&mut self);

    fn restore(&mut self);

    /// Post-multiply `affine` onto the current transform.
    fn transform(&mut self, affine: Affine);

    fn current_transform(&self) -> Affine;

    fn set_global_alpha(&mut self, alpha: f64);

    fn global_alpha(&self) -> f64;

    fn set_shadow(&mut self, shadow: Option<ShadowStyle>);

    fn fill_text(
        &mut self,
        text: &str,
        origin: Point,
        font: &FontSpec,
        letter_spacing: f64,
        color: Color,
    ) -> OverlayResult<()>;

    fn stroke_text(
        &mut self,
        text: &str,
        origin: Point,
        font: &FontSpec,
        letter_spacing: f64,
        color: Color,
        width: f64,
    ) -> OverlayResult<()>;

    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Outline `rect`; a non-empty `dash` alternates on/off lengths.
    fn stroke_rect(&mut self, rect: Rect, color: Color, width: f64, dash: &[f64]);

    fn translate(&mut self, offset: Vec2) {
        self.transform(Affine::translate(offset));
    }

    fn rotate(&mut self, radians: f64) {
        self.transform(Affine::rotate(radians));
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.transform(Affine::scale_non_uniform(sx, sy));
    }
}

/// Graphics state captured by `save`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceState {
    pub transform: Affine,
    pub alpha: f64,
    pub shadow: Option<ShadowStyle>,
}

impl Default for SurfaceState {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            alpha: 1.0,
            shadow: None,
        }
    }
}

/// Save/restore stack shared by the surface implementations.
#[derive(Clone, Debug, Default)]
pub struct StateStack {
    pub current: SurfaceState,
    saved: Vec<SurfaceState>,
}

impl StateStack {
    pub fn save(&mut self) {
        self.saved.push(self.current);
    }

    /// Pop the last saved state; an unmatched restore is ignored.
    pub fn restore(&mut self) {
        match self.saved.pop() {
            Some(state) => self.current = state,
            None => tracing::warn!("restore without matching save"),
        }
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    pub fn reset(&mut self) {
        self.current = SurfaceState::default();
        self.saved.clear();
    }
}

/// One recorded draw call with the state it was issued under.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Clear,
    Save,
    Restore,
    Text {
        text: String,
        origin: Point,
        font: String,
        color: Color,
        /// `Some(width)` for stroked text.
        stroke_width: Option<f64>,
        transform: Affine,
        alpha: f64,
        shadow: Option<ShadowStyle>,
    },
    FillRect {
        rect: Rect,
        color: Color,
        transform: Affine,
        alpha: f64,
    },
    StrokeRect {
        rect: Rect,
        color: Color,
        width: f64,
        dash: Vec<f64>,
        transform: Affine,
        alpha: f64,
    },
}

/// Surface that records calls instead of drawing; measures with a [`MonospaceMeasurer`].
#[derive(Clone, Debug)]
pub struct RecordingSurface {
    size: Size,
    state: StateStack,
    measurer: MonospaceMeasurer,
    commands: Vec<DrawCommand>,
    max_depth: usize,
}

impl RecordingSurface {
    pub fn new(size: Size, measurer: MonospaceMeasurer) -> Self {
        Self {
            size,
            state: StateStack::default(),
            measurer,
            commands: Vec::new(),
            max_depth: 0,
        }
    }

    pub fn measurer_mut(&mut self) -> &mut MonospaceMeasurer {
        &mut self.measurer
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        self.max_depth = 0;
        std::mem::take(&mut self.commands)
    }

    /// Deepest save nesting seen since the last `take_commands`.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn depth(&self) -> usize {
        self.state.depth()
    }

    /// Every save has a matching restore and no restore runs ahead of its save.
    pub fn is_balanced(&self) -> bool {
        let mut depth = 0i64;
        for c in &self.commands {
            match c {
                DrawCommand::Save => depth += 1,
                DrawCommand::Restore => {
                    depth -= 1;
                    if depth < 0 {
                        return false;
                    }
                }
                _ => {}
            }
        }
        depth == 0
    }

    /// Text of every fill-text call, in draw order.
    pub fn filled_texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text {
                    text,
                    stroke_width: None,
                    ..
                } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn push_text(
        &mut self,
        text: &str,
        origin: Point,
        font: &FontSpec,
        color: Color,
        stroke_width: Option<f64>,
    ) -> OverlayResult<()> {
        // Drawing with an unloaded font fails the same way measuring does.
        self.measurer.measure("", font, 0.0)?;
        let s = self.state.current;
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            origin,
            font: font.css(),
            color,
            stroke_width,
            transform: s.transform,
            alpha: s.alpha,
            shadow: s.shadow,
        });
        Ok(())
    }
}

impl TextMeasurer for RecordingSurface {
    fn measure(&mut self, text: &str, font: &FontSpec, letter_spacing: f64) -> OverlayResult<f64> {
        self.measurer.measure(text, font, letter_spacing)
    }

    fn font_generation(&self) -> u64 {
        self.measurer.font_generation()
    }
}

impl DrawSurface for RecordingSurface {
    fn size(&self) -> Size {
        self.size
    }

    fn clear(&mut self) {
        self.commands.push(DrawCommand::Clear);
    }

    fn save(&mut self) {
        self.state.save();
        self.max_depth = self.max_depth.max(self.state.depth());
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        self.state.restore();
        self.commands.push(DrawCommand::Restore);
    }

    fn transform(&mut self, affine: Affine) {
        self.state.current.transform = self.state.current.transform * affine;
    }

    fn current_transform(&self) -> Affine {
        self.state.current.transform
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.state.current.alpha = alpha.clamp(0.0, 1.0);
    }

    fn global_alpha(&self) -> f64 {
        self.state.current.alpha
    }

    fn set_shadow(&mut self, shadow: Option<ShadowStyle>) {
        self.state.current.shadow = shadow;
    }

    fn fill_text(
        &mut self,
        text: &str,
        origin: Point,
        font: &FontSpec,
        _letter_spacing: f64,
        color: Color,
    ) -> OverlayResult<()> {
        self.push_text(text, origin, font, color, None)
    }

    fn stroke_text(
        &mut self,
        text: &str,
        origin: Point,
        font: &FontSpec,
        _letter_spacing: f64,
        color: Color,
        width: f64,
    ) -> OverlayResult<()> {
        self.push_text(text, origin, font, color, Some(width))
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let s = self.state.current;
        self.commands.push(DrawCommand::FillRect {
            rect,
            color,
            transform: s.transform,
            alpha: s.alpha,
        });
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, width: f64, dash: &[f64]) {
        let s = self.state.current;
        self.commands.push(DrawCommand::StrokeRect {
            rect,
            color,
            width,
            dash: dash.to_vec(),
            transform: s.transform,
            alpha: s.alpha,
        });
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
