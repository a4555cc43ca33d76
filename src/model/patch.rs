use crate::foundation::error::OverlayResult;
use crate::model::overlay::{
    Dimensions, Overlay, OverlayAnimation, Position, Responsive, Styling, Timing,
};

/// Partial update of an overlay; `None` fields are left untouched.
///
/// This is the payload of `updateOverlay(id, patch)` and of the editor's
/// `OverlayUpdated` event, so it serializes to the same camelCase shape as [`Overlay`].
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timing: Option<Timing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styling: Option<Styling>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<OverlayAnimation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsive: Option<Responsive>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_index: Option<i64>,
}

impl OverlayPatch {
    pub fn position(position: Position) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    pub fn dimensions(dimensions: Dimensions) -> Self {
        Self {
            dimensions: Some(dimensions),
            ..Self::default()
        }
    }

    pub fn timing(timing: Timing) -> Self {
        Self {
            timing: Some(timing),
            ..Self::default()
        }
    }

    pub fn styling(styling: Styling) -> Self {
        Self {
            styling: Some(styling),
            ..Self::default()
        }
    }

    pub fn animation(animation: OverlayAnimation) -> Self {
        Self {
            animation: Some(animation),
            ..Self::default()
        }
    }

    pub fn layer_index(layer_index: i64) -> Self {
        Self {
            layer_index: Some(layer_index),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Fold a later patch into this one; fields set in `later` win.
    pub fn merge(&mut self, later: OverlayPatch) {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if later.$field.is_some() {
                    self.$field = later.$field;
                })*
            };
        }
        take!(
            endpoint_key,
            label,
            placeholder_text,
            position,
            dimensions,
            timing,
            styling,
            animation,
            responsive,
            layer_index
        );
    }

    /// Overlay with this patch applied, validated as a whole. `base` is left untouched.
    pub fn applied_to(&self, base: &Overlay, template_duration: Option<f64>) -> OverlayResult<Overlay> {
        let mut next = base.clone();
        if let Some(v) = &self.endpoint_key {
            next.endpoint_key = v.clone();
        }
        if let Some(v) = &self.label {
            next.label = v.clone();
        }
        if let Some(v) = &self.placeholder_text {
            next.placeholder_text = v.clone();
        }
        if let Some(v) = self.position {
            next.position = v;
        }
        if let Some(v) = self.dimensions {
            next.dimensions = v;
        }
        if let Some(v) = self.timing {
            next.timing = v;
        }
        if let Some(v) = &self.styling {
            next.styling = v.clone();
        }
        if let Some(v) = self.animation {
            next.animation = v;
        }
        if let Some(v) = self.responsive {
            next.responsive = Some(v);
        }
        if let Some(v) = self.layer_index {
            next.layer_index = v;
        }
        next.validate(template_duration)?;
        Ok(next)
    }

    /// Patch that turns `before` into `after`, naming only the fields that differ.
    pub fn diff(before: &Overlay, after: &Overlay) -> Self {
        fn changed<T: PartialEq + Clone>(a: &T, b: &T) -> Option<T> {
            (a != b).then(|| b.clone())
        }
        Self {
            endpoint_key: changed(&before.endpoint_key, &after.endpoint_key),
            label: changed(&before.label, &after.label),
            placeholder_text: changed(&before.placeholder_text, &after.placeholder_text),
            position: changed(&before.position, &after.position),
            dimensions: changed(&before.dimensions, &after.dimensions),
            timing: changed(&before.timing, &after.timing),
            styling: changed(&before.styling, &after.styling),
            animation: changed(&before.animation, &after.animation),
            responsive: if before.responsive != after.responsive {
                after.responsive
            } else {
                None
            },
            layer_index: changed(&before.layer_index, &after.layer_index),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/patch.rs"]
mod tests;
