//! Per-frame composition of the visible overlay set onto a [`DrawSurface`].
//!
//! A frame is a pure function of its [`FrameInput`]: the visible set is filtered by time,
//! painted bottom-to-top by `layerIndex`, and each overlay is drawn inside its own
//! save/restore pair. An overlay that cannot be drawn (its font is not loaded yet) is
//! skipped and reported; it never aborts the rest of the frame.

use std::collections::BTreeSet;

use crate::animation::state::{AnimationState, state_at, typewriter_visible_chars};
use crate::editor::input::Handle;
use crate::foundation::config::EditorConfig;
use crate::foundation::core::{OverlayKey, Point, Rect, Vec2};
use crate::foundation::error::{OverlayError, OverlayResult};
use crate::layout::cache::LayoutCache;
use crate::layout::fonts::FontSpec;
use crate::layout::text::{TextLayout, padded_box, text_box};
use crate::model::overlay::Overlay;
use crate::model::store::OverlayStore;
use crate::model::template::{FieldValues, Template, resolve_text};
use crate::render::surface::{DrawSurface, ShadowStyle};
use crate::transform::coords::{CoordinateMapper, Viewport};

const HOVER_DASH: [f64; 2] = [4.0, 4.0];
const OUTLINE_WIDTH: f64 = 2.0;
const HOVER_WIDTH: f64 = 1.0;

/// Boxes an overlay occupied in the last frame, in reference pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitBox {
    pub key: OverlayKey,
    pub layer_index: i64,
    pub text_box: Rect,
    /// `text_box` grown by the configured padding; used for hit testing and outlines.
    pub padded: Rect,
}

/// An overlay left out of a frame and why.
#[derive(Clone, Debug, PartialEq)]
pub struct SkippedOverlay {
    pub key: OverlayKey,
    pub reason: String,
    /// True when the overlay will draw once its font registers.
    pub font_pending: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
    pub time: f64,
    /// Drawn overlays in paint order.
    pub drawn: Vec<OverlayKey>,
    pub skipped: Vec<SkippedOverlay>,
    /// Hit boxes of drawn overlays, bottom-to-top.
    pub hit_boxes: Vec<HitBox>,
}

impl FrameReport {
    pub fn hit_box(&self, key: OverlayKey) -> Option<&HitBox> {
        self.hit_boxes.iter().find(|h| h.key == key)
    }
}

/// Everything a frame depends on.
pub struct FrameInput<'a> {
    pub store: &'a OverlayStore,
    pub fields: &'a FieldValues,
    pub time: f64,
    pub mapper: CoordinateMapper,
    pub viewport: Viewport,
    pub selected: Option<OverlayKey>,
    pub hovered: Option<OverlayKey>,
    pub locked: Option<&'a BTreeSet<OverlayKey>>,
    /// Draw selection and hover decoration; off for export renders.
    pub decorate: bool,
}

impl FrameInput<'_> {
    fn is_locked(&self, key: OverlayKey) -> bool {
        self.locked.is_some_and(|l| l.contains(&key))
    }
}

#[derive(Debug, Default)]
pub struct Compositor {
    config: EditorConfig,
    cache: LayoutCache,
}

impl Compositor {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            cache: LayoutCache::new(),
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn cache(&self) -> &LayoutCache {
        &self.cache
    }

    /// Layout of `overlay` as the next frame would draw it.
    pub fn layout_overlay(
        &mut self,
        overlay: &Overlay,
        fields: &FieldValues,
        mapper: &CoordinateMapper,
        surface: &mut dyn DrawSurface,
    ) -> OverlayResult<TextLayout> {
        let text = resolve_text(overlay, fields);
        let box_width = overlay.dimensions.width.map(|w| mapper.width_to_pixels(w));
        let box_height = overlay.dimensions.height.map(|h| mapper.height_to_pixels(h));
        self.cache
            .layout(text, &overlay.styling, box_width, box_height, surface)
    }

    #[tracing::instrument(skip_all, fields(time = input.time))]
    pub fn compose(&mut self, surface: &mut dyn DrawSurface, input: &FrameInput<'_>) -> FrameReport {
        let mut report = FrameReport {
            time: input.time,
            ..FrameReport::default()
        };

        surface.clear();
        surface.save();
        surface.transform(input.viewport.base_transform());

        for key in input
            .store
            .visible_at(input.time, self.config.visibility_epsilon)
        {
            let Some(overlay) = input.store.get(key) else {
                continue;
            };
            match self.draw_overlay(surface, input, key, overlay) {
                Ok(hit) => {
                    report.drawn.push(key);
                    report.hit_boxes.push(hit);
                }
                Err(err) => {
                    let font_pending = matches!(err, OverlayError::FontNotReady(_));
                    if font_pending {
                        tracing::debug!(%key, error = %err, "overlay skipped until font loads");
                    } else {
                        tracing::warn!(%key, error = %err, "overlay skipped");
                    }
                    report.skipped.push(SkippedOverlay {
                        key,
                        reason: err.to_string(),
                        font_pending,
                    });
                }
            }
        }

        if input.decorate {
            if let Some(hovered) = input.hovered
                && input.selected != Some(hovered)
                && let Some(hit) = report.hit_box(hovered)
            {
                surface.stroke_rect(
                    hit.padded,
                    self.config.hover_color,
                    self.screen_len(input, HOVER_WIDTH),
                    &HOVER_DASH.map(|d| self.screen_len(input, d)),
                );
            }
            if let Some(selected) = input.selected
                && let Some(hit) = report.hit_box(selected).copied()
                && let Some(overlay) = input.store.get(selected)
            {
                self.draw_selection(surface, input, overlay, &hit);
            }
        }

        surface.restore();
        report
    }

    /// Render a template at `time` without editor decoration.
    pub fn render_template(
        &mut self,
        surface: &mut dyn DrawSurface,
        template: &Template,
        time: f64,
    ) -> OverlayResult<FrameReport> {
        let store =
            OverlayStore::from_overlays(template.overlays.iter().cloned(), template.duration_seconds)?;
        let mapper = CoordinateMapper::new(template.resolution);
        let input = FrameInput {
            store: &store,
            fields: &template.fields,
            time,
            mapper,
            viewport: Viewport::new(surface.size(), mapper.reference()),
            selected: None,
            hovered: None,
            locked: None,
            decorate: false,
        };
        Ok(self.compose(surface, &input))
    }

    fn draw_overlay(
        &mut self,
        surface: &mut dyn DrawSurface,
        input: &FrameInput<'_>,
        key: OverlayKey,
        overlay: &Overlay,
    ) -> OverlayResult<HitBox> {
        let layout = self.layout_overlay(overlay, input.fields, &input.mapper, surface)?;
        let anchor = input
            .mapper
            .percent_to_pixel(Point::new(overlay.position.x, overlay.position.y));
        let tb = text_box(anchor, &layout, &overlay.position);
        let anim = state_at(overlay, input.time);
        let reveal = typewriter_visible_chars(overlay, input.time, layout.char_count());

        surface.save();
        let drawn = draw_text_block(surface, overlay, &layout, tb, anim, reveal);
        surface.restore();
        drawn?;

        Ok(HitBox {
            key,
            layer_index: overlay.layer_index,
            text_box: tb,
            padded: padded_box(tb, self.config.box_padding),
        })
    }

    fn draw_selection(
        &self,
        surface: &mut dyn DrawSurface,
        input: &FrameInput<'_>,
        overlay: &Overlay,
        hit: &HitBox,
    ) {
        let locked = input.is_locked(hit.key);
        let color = if locked {
            self.config.locked_color
        } else {
            self.config.selection_color
        };
        surface.stroke_rect(hit.padded, color, self.screen_len(input, OUTLINE_WIDTH), &[]);

        let label = format!(
            "x: {}% y: {}% w: {}px",
            overlay.position.x,
            overlay.position.y,
            hit.text_box.width().round()
        );
        let font = FontSpec::new(
            &self.config.label_font_family,
            400,
            self.screen_len(input, self.config.label_font_size),
        );
        let origin = Point::new(hit.padded.x0, hit.padded.y0 - font.size);
        if let Err(err) = surface.fill_text(&label, origin, &font, 0.0, color) {
            tracing::debug!(error = %err, "selection label not drawn");
        }

        if locked {
            return;
        }
        let half = self.screen_len(input, self.config.handle_size) / 2.0;
        for handle in Handle::ALL {
            let c = handle.position(hit.padded);
            surface.fill_rect(Rect::new(c.x - half, c.y - half, c.x + half, c.y + half), color);
        }
    }

    /// Reference-pixel length that shows as `canvas_len` on screen.
    fn screen_len(&self, input: &FrameInput<'_>, canvas_len: f64) -> f64 {
        input.viewport.canvas_len_to_reference(canvas_len)
    }
}

/// Draw an overlay's lines inside the current save/restore scope.
///
/// The transform pivots on the box centre: opacity, then scale, rotation and translation.
fn draw_text_block(
    surface: &mut dyn DrawSurface,
    overlay: &Overlay,
    layout: &TextLayout,
    tb: Rect,
    anim: AnimationState,
    reveal: Option<usize>,
) -> OverlayResult<()> {
    let styling = &overlay.styling;
    let pivot = tb.center();
    surface.translate(pivot.to_vec2());
    surface.set_global_alpha(surface.global_alpha() * anim.opacity.clamp(0.0, 1.0));
    surface.scale(anim.scale, anim.scale);
    surface.rotate(anim.rotation);
    surface.translate(Vec2::new(anim.translate_x, anim.translate_y));

    let font = styling.font_spec();
    let shadow = styling.shadow.map(|s| ShadowStyle {
        color: s.color,
        offset: Vec2::new(s.offset_x, s.offset_y),
        blur: s.blur,
    });
    let mut remaining = reveal.unwrap_or(usize::MAX);

    for (i, line) in layout.lines.iter().enumerate() {
        let shown: String = line.chars().take(remaining).collect();
        remaining = remaining.saturating_sub(line.chars().count());
        if shown.is_empty() {
            continue;
        }
        let origin = Point::new(
            -layout.width / 2.0 + layout.line_offset_x(i, styling.text_align),
            -layout.height / 2.0 + layout.line_center_y(i),
        );
        surface.set_shadow(shadow);
        if let Some(stroke) = styling.active_stroke() {
            surface.stroke_text(
                &shown,
                origin,
                &font,
                styling.letter_spacing,
                stroke.color,
                stroke.width,
            )?;
            surface.set_shadow(None);
        }
        surface.fill_text(&shown, origin, &font, styling.letter_spacing, styling.color)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
