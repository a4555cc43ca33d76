use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context as _;

use crate::foundation::core::Resolution;
use crate::foundation::error::{OverlayError, OverlayResult};
use crate::model::overlay::Overlay;

/// Wedding data values keyed by overlay `endpointKey`.
pub type FieldValues = BTreeMap<String, String>;

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// A video template's overlay set together with its authored resolution.
pub struct Template {
    /// Authored video resolution; the reference for every percent conversion.
    #[serde(default)]
    pub resolution: Resolution,
    /// Template video length in seconds, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
    #[serde(default)]
    pub overlays: Vec<Overlay>,
    /// Sample values used when previewing outside the live product.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: FieldValues,
}

impl Template {
    pub fn from_json(raw: &str) -> OverlayResult<Self> {
        let template: Self = serde_json::from_str(raw)?;
        template.validate()?;
        Ok(template)
    }

    pub fn from_path(path: &Path) -> OverlayResult<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read template '{}'", path.display()))?;
        Self::from_json(&raw)
    }

    pub fn validate(&self) -> OverlayResult<()> {
        Resolution::new(self.resolution.width, self.resolution.height)?;
        if let Some(d) = self.duration_seconds
            && (!d.is_finite() || d <= 0.0)
        {
            return Err(OverlayError::validation(
                "template durationSeconds must be finite and > 0",
            ));
        }
        for (i, overlay) in self.overlays.iter().enumerate() {
            overlay.validate(self.duration_seconds).map_err(|e| {
                OverlayError::validation(format!("overlays[{i}] ({}): {e}", overlay.label))
            })?;
        }
        Ok(())
    }
}

/// Text an overlay displays: the bound field's value, else the editor placeholder.
pub fn resolve_text<'a>(overlay: &'a Overlay, fields: &'a FieldValues) -> &'a str {
    match fields.get(&overlay.endpoint_key) {
        Some(v) if !v.is_empty() => v.as_str(),
        _ => overlay.preview_text(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/template.rs"]
mod tests;
