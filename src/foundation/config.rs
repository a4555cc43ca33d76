use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{OverlayError, OverlayResult};
use crate::model::color::Color;

/// Tunables for the interactive editor and compositor.
///
/// Every field has a default, so a config file only needs to name what it overrides.
/// Pixel values are on-screen canvas pixels unless stated otherwise.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct EditorConfig {
    /// Half-extent of the square hit area around each resize handle.
    pub handle_size: f64,
    /// Minimum overlay box width in reference pixels.
    pub min_overlay_width: f64,
    /// Minimum overlay box height in reference pixels.
    pub min_overlay_height: f64,
    /// Padding added around the text box for hit testing and selection outline.
    pub box_padding: f64,
    /// Offset applied to both axes when duplicating, in reference pixels.
    pub duplicate_offset: f64,
    /// Arrow-key nudge distance.
    pub nudge_step: f64,
    /// Arrow-key nudge distance while Shift is held.
    pub nudge_step_large: f64,
    /// Tolerance around `[start, end]` when testing overlay visibility, in seconds.
    pub visibility_epsilon: f64,
    /// Quiet period before queued edits are sent to the backend, in milliseconds.
    pub debounce_ms: u64,
    /// Maximum number of undoable commands kept.
    pub history_limit: usize,
    /// Selection outline and handle color.
    pub selection_color: Color,
    /// Outline color used when the selected overlay is locked.
    pub locked_color: Color,
    /// Dashed hover hint color.
    pub hover_color: Color,
    /// Font family used for the live position label.
    pub label_font_family: String,
    /// Font size of the live position label.
    pub label_font_size: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            handle_size: 8.0,
            min_overlay_width: 50.0,
            min_overlay_height: 20.0,
            box_padding: 10.0,
            duplicate_offset: 20.0,
            nudge_step: 1.0,
            nudge_step_large: 10.0,
            visibility_epsilon: 1.0 / 60.0,
            debounce_ms: 100,
            history_limit: 100,
            selection_color: Color::rgba8(0x3b, 0x82, 0xf6, 0xff),
            locked_color: Color::rgba8(0x9c, 0xa3, 0xaf, 0xff),
            hover_color: Color::rgba8(0x93, 0xc5, 0xfd, 0xb3),
            label_font_family: "Inter".to_string(),
            label_font_size: 12.0,
        }
    }
}

impl EditorConfig {
    /// Load a JSON config file and validate it.
    pub fn from_path(path: &Path) -> OverlayResult<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read editor config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_str(&raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> OverlayResult<()> {
        for (name, value) in [
            ("handleSize", self.handle_size),
            ("minOverlayWidth", self.min_overlay_width),
            ("minOverlayHeight", self.min_overlay_height),
            ("boxPadding", self.box_padding),
            ("duplicateOffset", self.duplicate_offset),
            ("nudgeStep", self.nudge_step),
            ("nudgeStepLarge", self.nudge_step_large),
            ("visibilityEpsilon", self.visibility_epsilon),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(OverlayError::validation(format!(
                    "config {name} must be finite and >= 0"
                )));
            }
        }
        if self.min_overlay_width <= 0.0 || self.min_overlay_height <= 0.0 {
            return Err(OverlayError::validation(
                "config minimum overlay size must be > 0",
            ));
        }
        if self.history_limit == 0 {
            return Err(OverlayError::validation("config historyLimit must be > 0"));
        }
        if !self.label_font_size.is_finite() || self.label_font_size <= 0.0 {
            return Err(OverlayError::validation(
                "config labelFontSize must be finite and > 0",
            ));
        }
        Ok(())
    }

    pub fn debounce(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.debounce_ms)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
