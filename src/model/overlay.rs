use crate::animation::ease::Easing;
use crate::animation::kind::AnimationKind;
use crate::foundation::error::{OverlayError, OverlayResult};
use crate::layout::fonts::FontSpec;
use crate::model::color::Color;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// A time-bound, styled text field bound to a wedding data field.
///
/// Every spatial value is a percentage of the template's reference resolution and every
/// temporal value is in seconds; pixels are never persisted.
pub struct Overlay {
    /// Backend-assigned id; absent until the overlay has been saved once.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Data field that supplies the real text at render time (e.g. `coupleNames`).
    pub endpoint_key: String,
    /// Editor-only display name.
    #[serde(default)]
    pub label: String,
    /// Editor-only preview text shown while the real value is unknown.
    #[serde(default)]
    pub placeholder_text: String,
    pub position: Position,
    #[serde(default)]
    pub dimensions: Dimensions,
    pub timing: Timing,
    #[serde(default)]
    pub styling: Styling,
    #[serde(default)]
    pub animation: OverlayAnimation,
    /// Small-viewport overrides; stored only, never computed here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsive: Option<Responsive>,
    /// Paint order; larger values draw on top. Need not be contiguous.
    #[serde(default)]
    pub layer_index: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    /// Anchor x in percent of reference width.
    pub x: f64,
    /// Anchor y in percent of reference height.
    pub y: f64,
    /// Horizontal relation between the box and the anchor.
    #[serde(default)]
    pub alignment: HorizontalAlign,
    /// Vertical relation between the box and the anchor.
    #[serde(default)]
    pub anchor_point: VerticalAnchor,
    #[serde(default)]
    pub unit: PositionUnit,
}

impl Position {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            alignment: HorizontalAlign::default(),
            anchor_point: VerticalAnchor::default(),
            unit: PositionUnit::Percent,
        }
    }
}

/// Persisted positions are always percentages; any other unit fails to load.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum PositionUnit {
    #[default]
    #[serde(rename = "percent")]
    Percent,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlign {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAnchor {
    Top,
    #[default]
    Middle,
    Bottom,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimensions {
    /// Wrap box width in percent; `None` lays the text out on a single line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Fixed box height in percent; `None` derives it from the line count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timing {
    pub start_time: f64,
    pub end_time: f64,
}

impl Timing {
    pub fn new(start_time: f64, end_time: f64) -> OverlayResult<Self> {
        let t = Self {
            start_time,
            end_time,
        };
        t.validate(None)?;
        Ok(t)
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Check `0 <= start < end` and, when the template length is known, `end <= length`.
    pub fn validate(&self, template_duration: Option<f64>) -> OverlayResult<()> {
        if !self.start_time.is_finite() || !self.end_time.is_finite() {
            return Err(OverlayError::validation("timing must be finite"));
        }
        if self.start_time < 0.0 {
            return Err(OverlayError::validation("timing startTime must be >= 0"));
        }
        if self.end_time <= self.start_time {
            return Err(OverlayError::validation(
                "timing endTime must be greater than startTime",
            ));
        }
        if let Some(d) = template_duration
            && self.end_time > d
        {
            return Err(OverlayError::validation(format!(
                "timing endTime {} exceeds template duration {d}",
                self.end_time
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Styling {
    pub font_family: String,
    /// Font size in reference pixels.
    pub font_size: f64,
    pub font_weight: u16,
    pub color: Color,
    /// Alignment of lines inside the box.
    pub text_align: HorizontalAlign,
    /// Extra advance between characters, in reference pixels.
    pub letter_spacing: f64,
    /// Line height as a multiple of font size.
    pub line_height: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow: Option<Shadow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Stroke>,
}

impl Default for Styling {
    fn default() -> Self {
        Self {
            font_family: "Playfair Display".to_string(),
            font_size: 48.0,
            font_weight: 400,
            color: Color::WHITE,
            text_align: HorizontalAlign::Center,
            letter_spacing: 0.0,
            line_height: 1.2,
            shadow: None,
            stroke: None,
        }
    }
}

impl Styling {
    pub fn font_spec(&self) -> FontSpec {
        FontSpec::new(&self.font_family, self.font_weight, self.font_size)
    }

    /// Height of one line in reference pixels.
    pub fn line_height_px(&self) -> f64 {
        self.font_size * self.line_height
    }

    /// Stroke settings, if stroking is switched on.
    pub fn active_stroke(&self) -> Option<&Stroke> {
        self.stroke.as_ref().filter(|s| s.enabled && s.width > 0.0)
    }

    pub fn validate(&self) -> OverlayResult<()> {
        if self.font_family.trim().is_empty() {
            return Err(OverlayError::validation("styling fontFamily must be non-empty"));
        }
        if !self.font_size.is_finite() || self.font_size <= 0.0 {
            return Err(OverlayError::validation(
                "styling fontSize must be finite and > 0",
            ));
        }
        if !(1..=1000).contains(&self.font_weight) {
            return Err(OverlayError::validation(
                "styling fontWeight must be within 1..=1000",
            ));
        }
        if !self.letter_spacing.is_finite() {
            return Err(OverlayError::validation(
                "styling letterSpacing must be finite",
            ));
        }
        if !self.line_height.is_finite() || self.line_height <= 0.0 {
            return Err(OverlayError::validation(
                "styling lineHeight must be finite and > 0",
            ));
        }
        if let Some(shadow) = &self.shadow
            && !(shadow.offset_x.is_finite()
                && shadow.offset_y.is_finite()
                && shadow.blur.is_finite()
                && shadow.blur >= 0.0)
        {
            return Err(OverlayError::validation(
                "styling shadow offsets must be finite and blur >= 0",
            ));
        }
        if let Some(stroke) = &self.stroke
            && (!stroke.width.is_finite() || stroke.width < 0.0)
        {
            return Err(OverlayError::validation(
                "styling stroke width must be finite and >= 0",
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Shadow {
    pub color: Color,
    pub offset_x: f64,
    pub offset_y: f64,
    pub blur: f64,
}

impl Default for Shadow {
    fn default() -> Self {
        Self {
            color: Color::rgba8(0, 0, 0, 128),
            offset_x: 2.0,
            offset_y: 2.0,
            blur: 4.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Stroke {
    pub enabled: bool,
    pub color: Color,
    pub width: f64,
}

impl Default for Stroke {
    fn default() -> Self {
        Self {
            enabled: false,
            color: Color::BLACK,
            width: 2.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OverlayAnimation {
    pub entrance: AnimationSpec,
    pub exit: AnimationSpec,
}

impl Default for OverlayAnimation {
    fn default() -> Self {
        Self {
            entrance: AnimationSpec::new(AnimationKind::FadeIn, 1.0, Easing::EaseInOut),
            exit: AnimationSpec::new(AnimationKind::FadeOut, 1.0, Easing::EaseInOut),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnimationSpec {
    #[serde(rename = "type")]
    pub kind: AnimationKind,
    /// Phase length in seconds.
    pub duration: f64,
    pub easing: Easing,
}

impl AnimationSpec {
    pub fn new(kind: AnimationKind, duration: f64, easing: Easing) -> Self {
        Self {
            kind,
            duration,
            easing,
        }
    }

    pub fn none() -> Self {
        Self::default()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Responsive {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<ResponsivePosition>,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResponsivePosition {
    pub x: f64,
    pub y: f64,
}

impl Overlay {
    /// A freshly added overlay with editor defaults, painted above `layer_index - 1` others.
    pub fn with_defaults(layer_index: i64, template_duration: Option<f64>) -> Self {
        let end = template_duration.map_or(5.0, |d| d.min(5.0));
        Self {
            id: None,
            endpoint_key: "custom".to_string(),
            label: "New Text".to_string(),
            placeholder_text: "Your text here".to_string(),
            position: Position::at(50.0, 50.0),
            dimensions: Dimensions::default(),
            timing: Timing {
                start_time: 0.0,
                end_time: end,
            },
            styling: Styling {
                shadow: Some(Shadow::default()),
                ..Styling::default()
            },
            animation: OverlayAnimation::default(),
            responsive: None,
            layer_index,
        }
    }

    /// Text shown in the editor preview: placeholder first, then label.
    pub fn preview_text(&self) -> &str {
        if !self.placeholder_text.is_empty() {
            &self.placeholder_text
        } else {
            &self.label
        }
    }

    pub fn validate(&self, template_duration: Option<f64>) -> OverlayResult<()> {
        if self.endpoint_key.trim().is_empty() {
            return Err(OverlayError::validation("overlay endpointKey must be non-empty"));
        }
        for (name, v) in [("x", self.position.x), ("y", self.position.y)] {
            if !v.is_finite() || !(0.0..=100.0).contains(&v) {
                return Err(OverlayError::validation(format!(
                    "overlay position.{name} must be within 0..=100 percent"
                )));
            }
        }
        for (name, v) in [
            ("width", self.dimensions.width),
            ("height", self.dimensions.height),
        ] {
            if let Some(v) = v
                && (!v.is_finite() || v <= 0.0 || v > 100.0)
            {
                return Err(OverlayError::validation(format!(
                    "overlay dimensions.{name} must be within (0, 100] percent"
                )));
            }
        }
        self.timing.validate(template_duration)?;
        self.styling.validate()?;
        for (name, spec) in [
            ("entrance", &self.animation.entrance),
            ("exit", &self.animation.exit),
        ] {
            if !spec.duration.is_finite() || spec.duration < 0.0 {
                return Err(OverlayError::validation(format!(
                    "overlay animation.{name}.duration must be finite and >= 0"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/overlay.rs"]
mod tests;
