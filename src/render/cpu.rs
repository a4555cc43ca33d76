use std::collections::HashMap;

use crate::foundation::core::{Affine, Point, Rect, Size};
use crate::foundation::error::{OverlayError, OverlayResult};
use crate::layout::fonts::FontSpec;
use crate::layout::shape::ParleyTextEngine;
use crate::layout::text::TextMeasurer;
use crate::model::color::Color;
use crate::render::frame::FrameRGBA;
use crate::render::surface::{DrawSurface, ShadowStyle, StateStack};

/// Rasterizing surface backed by `vello_cpu`, with text shaped by Parley.
///
/// Draw calls are queued on the render context; [`CpuSurface::finish`] rasterizes them
/// into a premultiplied RGBA8 frame and resets the context for the next frame.
pub struct CpuSurface {
    width: u16,
    height: u16,
    ctx: vello_cpu::RenderContext,
    engine: ParleyTextEngine,
    font_cache: HashMap<(String, u16), vello_cpu::peniko::FontData>,
    state: StateStack,
}

enum GlyphPaint {
    Fill,
    Stroke(f64),
}

impl CpuSurface {
    pub fn new(width: u32, height: u32) -> OverlayResult<Self> {
        Self::with_engine(width, height, ParleyTextEngine::new())
    }

    pub fn with_engine(width: u32, height: u32, engine: ParleyTextEngine) -> OverlayResult<Self> {
        let width_u16: u16 = width
            .try_into()
            .map_err(|_| OverlayError::validation("surface width exceeds u16"))?;
        let height_u16: u16 = height
            .try_into()
            .map_err(|_| OverlayError::validation("surface height exceeds u16"))?;
        if width_u16 == 0 || height_u16 == 0 {
            return Err(OverlayError::validation("surface width/height must be > 0"));
        }
        Ok(Self {
            width: width_u16,
            height: height_u16,
            ctx: vello_cpu::RenderContext::new(width_u16, height_u16),
            engine,
            font_cache: HashMap::new(),
            state: StateStack::default(),
        })
    }

    pub fn engine(&self) -> &ParleyTextEngine {
        &self.engine
    }

    pub fn register_font(&mut self, family: &str, weight: u16, data: Vec<u8>) -> OverlayResult<()> {
        self.engine.register_font(family, weight, data)?;
        self.font_cache.clear();
        Ok(())
    }

    /// Rasterize everything drawn since the last `clear` or `finish`.
    pub fn finish(&mut self) -> FrameRGBA {
        let mut pixmap = vello_cpu::Pixmap::new(self.width, self.height);
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut pixmap);
        self.ctx.reset();
        self.state.reset();
        FrameRGBA {
            width: u32::from(self.width),
            height: u32::from(self.height),
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        }
    }

    fn font_data(&mut self, font: &FontSpec) -> OverlayResult<vello_cpu::peniko::FontData> {
        let face = self.engine.face(font)?;
        let key = (face.family.to_ascii_lowercase(), face.weight);
        if let Some(data) = self.font_cache.get(&key) {
            return Ok(data.clone());
        }
        let bytes = face.data.as_ref().clone();
        let data = vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes), 0);
        self.font_cache.insert(key, data.clone());
        Ok(data)
    }

    fn begin_alpha(&mut self) -> bool {
        let alpha = self.state.current.alpha;
        if alpha < 1.0 {
            self.ctx.push_opacity_layer(alpha as f32);
            true
        } else {
            false
        }
    }

    fn end_alpha(&mut self, pushed: bool) {
        if pushed {
            self.ctx.pop_layer();
        }
    }

    fn draw_glyphs(
        &mut self,
        text: &str,
        origin: Point,
        font: &FontSpec,
        letter_spacing: f64,
        color: Color,
        paint: GlyphPaint,
    ) -> OverlayResult<()> {
        let font_data = self.font_data(font)?;
        if text.is_empty() {
            return Ok(());
        }
        let layout = self.engine.shape_line(text, font, letter_spacing, color)?;
        let top = origin.y - f64::from(layout.height()) / 2.0;

        let mut glyphs = Vec::new();
        let mut font_size = font.size as f32;
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                font_size = run.run().font_size();
                glyphs.extend(run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: (origin.x + f64::from(g.x)) as f32,
                    y: (top + f64::from(g.y)) as f32,
                }));
            }
        }

        let pushed = self.begin_alpha();
        let transform = self.state.current.transform;
        // Canvas shadows are offset in device space, outside the current transform.
        if let Some(ShadowStyle {
            color: shadow_color,
            offset,
            ..
        }) = self.state.current.shadow
            && shadow_color.a != 0
        {
            self.paint_glyphs(
                &font_data,
                font_size,
                &glyphs,
                Affine::translate(offset) * transform,
                shadow_color,
                &paint,
            );
        }
        self.paint_glyphs(&font_data, font_size, &glyphs, transform, color, &paint);
        self.end_alpha(pushed);
        Ok(())
    }

    fn paint_glyphs(
        &mut self,
        font_data: &vello_cpu::peniko::FontData,
        font_size: f32,
        glyphs: &[vello_cpu::Glyph],
        transform: Affine,
        color: Color,
        paint: &GlyphPaint,
    ) {
        self.ctx.set_transform(affine_to_cpu(transform));
        self.ctx.set_paint(color_to_cpu(color));
        if let GlyphPaint::Stroke(width) = paint {
            self.ctx.set_stroke(vello_cpu::kurbo::Stroke::new(*width));
        }
        let run = self.ctx.glyph_run(font_data).font_size(font_size);
        match paint {
            GlyphPaint::Fill => run.fill_glyphs(glyphs.iter().copied()),
            GlyphPaint::Stroke(_) => run.stroke_glyphs(glyphs.iter().copied()),
        }
    }
}

impl TextMeasurer for CpuSurface {
    fn measure(&mut self, text: &str, font: &FontSpec, letter_spacing: f64) -> OverlayResult<f64> {
        self.engine.measure(text, font, letter_spacing)
    }

    fn font_generation(&self) -> u64 {
        self.engine.font_generation()
    }
}

impl DrawSurface for CpuSurface {
    fn size(&self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }

    fn clear(&mut self) {
        self.ctx.reset();
    }

    fn save(&mut self) {
        self.state.save();
    }

    fn restore(&mut self) {
        self.state.restore();
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
        letter_spacing: f64,
        color: Color,
    ) -> OverlayResult<()> {
        self.draw_glyphs(text, origin, font, letter_spacing, color, GlyphPaint::Fill)
    }

    fn stroke_text(
        &mut self,
        text: &str,
        origin: Point,
        font: &FontSpec,
        letter_spacing: f64,
        color: Color,
        width: f64,
    ) -> OverlayResult<()> {
        self.draw_glyphs(
            text,
            origin,
            font,
            letter_spacing,
            color,
            GlyphPaint::Stroke(width),
        )
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let pushed = self.begin_alpha();
        self.ctx
            .set_transform(affine_to_cpu(self.state.current.transform));
        self.ctx.set_paint(color_to_cpu(color));
        self.ctx.fill_rect(&rect_to_cpu(rect));
        self.end_alpha(pushed);
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, width: f64, dash: &[f64]) {
        let mut stroke = vello_cpu::kurbo::Stroke::new(width);
        if !dash.is_empty() {
            stroke = stroke.with_dashes(0.0, dash.iter().copied());
        }
        let pushed = self.begin_alpha();
        self.ctx
            .set_transform(affine_to_cpu(self.state.current.transform));
        self.ctx.set_paint(color_to_cpu(color));
        self.ctx.set_stroke(stroke);
        self.ctx.stroke_rect(&rect_to_cpu(rect));
        self.end_alpha(pushed);
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn color_to_cpu(c: Color) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
