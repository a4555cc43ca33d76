use std::collections::HashMap;

use crate::foundation::error::OverlayResult;
use crate::foundation::math::Fnv1a64;
use crate::layout::text::{TextLayout, TextMeasurer, layout_text};
use crate::model::overlay::Styling;

const MAX_ENTRIES: usize = 1024;

/// Memoized text layouts keyed by everything that changes the result.
///
/// Only successful layouts are stored. The cache empties itself when the measurer's font
/// generation moves, so a late-loading font never leaves stale metrics behind.
#[derive(Debug, Default)]
pub struct LayoutCache {
    entries: HashMap<u64, TextLayout>,
    generation: u64,
    hits: u64,
    misses: u64,
}

impl LayoutCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn layout(
        &mut self,
        text: &str,
        styling: &Styling,
        box_width: Option<f64>,
        explicit_height: Option<f64>,
        measurer: &mut dyn TextMeasurer,
    ) -> OverlayResult<TextLayout> {
        let generation = measurer.font_generation();
        if generation != self.generation {
            tracing::debug!(
                from = self.generation,
                to = generation,
                "font generation changed, clearing layout cache"
            );
            self.entries.clear();
            self.generation = generation;
        }

        let key = layout_key(text, styling, box_width, explicit_height);
        if let Some(hit) = self.entries.get(&key) {
            self.hits += 1;
            return Ok(hit.clone());
        }
        self.misses += 1;

        let layout = layout_text(text, styling, box_width, explicit_height, measurer)?;
        if self.entries.len() >= MAX_ENTRIES {
            self.entries.clear();
        }
        self.entries.insert(key, layout.clone());
        Ok(layout)
    }
}

fn layout_key(
    text: &str,
    styling: &Styling,
    box_width: Option<f64>,
    explicit_height: Option<f64>,
) -> u64 {
    let mut h = Fnv1a64::new();
    h.write_str(text);
    h.write_str(&styling.font_spec().css());
    h.write_f64(styling.letter_spacing);
    h.write_f64(styling.line_height);
    h.write_opt_f64(box_width);
    h.write_opt_f64(explicit_height);
    h.finish()
}

#[cfg(test)]
#[path = "../../tests/unit/layout/cache.rs"]
mod tests;
