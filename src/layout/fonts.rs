use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;

use crate::foundation::error::{OverlayError, OverlayResult};

/// The font an overlay asks for, in the shape a 2D canvas font string takes.
#[derive(Clone, Debug, PartialEq)]
pub struct FontSpec {
    pub family: String,
    pub weight: u16,
    /// Size in layout pixels.
    pub size: f64,
}

impl FontSpec {
    pub fn new(family: &str, weight: u16, size: f64) -> Self {
        Self {
            family: family.to_string(),
            weight,
            size,
        }
    }

    pub fn with_size(&self, size: f64) -> Self {
        Self {
            size,
            ..self.clone()
        }
    }

    /// CSS-style font string, e.g. `700 72px "Great Vibes"`.
    pub fn css(&self) -> String {
        format!("{} {}px \"{}\"", self.weight, self.size, self.family)
    }
}

impl std::fmt::Display for FontSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.css())
    }
}

/// One registered face: raw font bytes under a family name and weight.
#[derive(Clone, Debug)]
pub struct FontFace {
    pub family: String,
    pub weight: u16,
    pub data: Arc<Vec<u8>>,
}

/// Registry of loaded fonts; registration is the "font ready" signal.
///
/// Family lookup is case-insensitive. A request for a weight that is not registered
/// resolves to the nearest registered weight of the same family.
#[derive(Clone, Debug, Default)]
pub struct FontBook {
    faces: Vec<FontFace>,
    generation: u64,
}

impl FontBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Bumped on every registration; layout caches compare against it.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Register `data` as `family` at `weight`, replacing an existing face with the same key.
    pub fn register(&mut self, family: &str, weight: u16, data: Vec<u8>) -> OverlayResult<()> {
        let family = family.trim();
        if family.is_empty() {
            return Err(OverlayError::validation("font family must be non-empty"));
        }
        if data.is_empty() {
            return Err(OverlayError::validation(format!(
                "font data for \"{family}\" is empty"
            )));
        }
        let face = FontFace {
            family: family.to_string(),
            weight,
            data: Arc::new(data),
        };
        match self
            .faces
            .iter_mut()
            .find(|f| f.weight == weight && f.family.eq_ignore_ascii_case(family))
        {
            Some(existing) => *existing = face,
            None => self.faces.push(face),
        }
        self.generation += 1;
        tracing::debug!(family, weight, generation = self.generation, "font registered");
        Ok(())
    }

    pub fn has_family(&self, family: &str) -> bool {
        self.faces
            .iter()
            .any(|f| f.family.eq_ignore_ascii_case(family.trim()))
    }

    pub fn is_ready(&self, spec: &FontSpec) -> bool {
        self.has_family(&spec.family)
    }

    /// Face that will draw `spec`, or `FontNotReady` when its family is not loaded.
    pub fn resolve(&self, spec: &FontSpec) -> OverlayResult<&FontFace> {
        let target = i32::from(spec.weight);
        self.faces
            .iter()
            .filter(|f| f.family.eq_ignore_ascii_case(spec.family.trim()))
            .min_by_key(|f| ((i32::from(f.weight) - target).abs(), f.weight))
            .ok_or_else(|| OverlayError::font_not_ready(spec.css()))
    }

    pub fn families(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self.faces.iter().map(|f| f.family.as_str()).collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    pub fn faces(&self) -> &[FontFace] {
        &self.faces
    }
}

/// Read a font file from disk.
pub fn read_font_file(path: &Path) -> OverlayResult<Vec<u8>> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))?;
    Ok(bytes)
}

/// Family name embedded in a font file's name table.
pub fn detect_family_name(bytes: &[u8]) -> OverlayResult<String> {
    let mut font_ctx = parley::FontContext::default();
    let families = font_ctx
        .collection
        .register_fonts(parley::fontique::Blob::from(bytes.to_vec()), None);
    let family_id = families
        .first()
        .map(|(id, _)| *id)
        .ok_or_else(|| OverlayError::validation("no font families found in font data"))?;
    font_ctx
        .collection
        .family_name(family_id)
        .map(str::to_string)
        .ok_or_else(|| OverlayError::validation("font family has no name"))
}

#[cfg(test)]
#[path = "../../tests/unit/layout/fonts.rs"]
mod tests;
