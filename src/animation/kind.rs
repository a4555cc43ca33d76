use std::f64::consts::{PI, TAU};

use crate::animation::state::AnimationState;
use crate::foundation::error::{OverlayError, OverlayResult};

/// Layout units a slide travels at zero progress.
pub const SLIDE_DISTANCE: f64 = 100.0;
/// Shorter travel used by the combined fade-slide.
pub const FADE_SLIDE_DISTANCE: f64 = 30.0;
const BLUR_SCALE: f64 = 0.1;

/// Catalogue of entrance/exit transforms.
///
/// Whether a transform counts up from nothing or down to nothing is decided by the phase
/// it runs in, not by its name: `fade-out` used as an entrance still fades in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AnimationKind {
    #[default]
    None,
    FadeIn,
    FadeOut,
    SlideUp,
    SlideDown,
    SlideLeft,
    SlideRight,
    ScaleUp,
    ScaleDown,
    ZoomIn,
    Bounce,
    RotateIn,
    Spin,
    BlurIn,
    BlurOut,
    FadeSlideUp,
    ScaleFade,
    /// Character reveal; the render loop handles it, the transform is identity.
    Typewriter,
    KenBurns,
}

impl AnimationKind {
    pub const ALL: [AnimationKind; 19] = [
        Self::None,
        Self::FadeIn,
        Self::FadeOut,
        Self::SlideUp,
        Self::SlideDown,
        Self::SlideLeft,
        Self::SlideRight,
        Self::ScaleUp,
        Self::ScaleDown,
        Self::ZoomIn,
        Self::Bounce,
        Self::RotateIn,
        Self::Spin,
        Self::BlurIn,
        Self::BlurOut,
        Self::FadeSlideUp,
        Self::ScaleFade,
        Self::Typewriter,
        Self::KenBurns,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::FadeIn => "fade-in",
            Self::FadeOut => "fade-out",
            Self::SlideUp => "slide-up",
            Self::SlideDown => "slide-down",
            Self::SlideLeft => "slide-left",
            Self::SlideRight => "slide-right",
            Self::ScaleUp => "scale-up",
            Self::ScaleDown => "scale-down",
            Self::ZoomIn => "zoom-in",
            Self::Bounce => "bounce",
            Self::RotateIn => "rotate-in",
            Self::Spin => "spin",
            Self::BlurIn => "blur-in",
            Self::BlurOut => "blur-out",
            Self::FadeSlideUp => "fade-slide-up",
            Self::ScaleFade => "scale-fade",
            Self::Typewriter => "typewriter",
            Self::KenBurns => "ken-burns",
        }
    }

    pub fn parse(name: &str) -> OverlayResult<Self> {
        let key: String = name
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        let kind = match key.as_str() {
            "" | "none" => Self::None,
            "fade" | "fadein" => Self::FadeIn,
            "fadeout" => Self::FadeOut,
            "slideup" | "slideinup" => Self::SlideUp,
            "slidedown" | "slideindown" => Self::SlideDown,
            "slideleft" | "slideinleft" => Self::SlideLeft,
            "slideright" | "slideinright" => Self::SlideRight,
            "scale" | "scaleup" | "scalein" => Self::ScaleUp,
            "scaledown" | "scaleout" => Self::ScaleDown,
            "zoom" | "zoomin" => Self::ZoomIn,
            "bounce" | "bouncein" => Self::Bounce,
            "rotate" | "rotatein" => Self::RotateIn,
            "spin" => Self::Spin,
            "blur" | "blurin" => Self::BlurIn,
            "blurout" => Self::BlurOut,
            "fadeslideup" | "fadeinup" => Self::FadeSlideUp,
            "scalefade" => Self::ScaleFade,
            "typewriter" | "typing" => Self::Typewriter,
            "kenburns" | "random" => Self::KenBurns,
            _ => {
                return Err(OverlayError::validation(format!(
                    "unknown animation type '{name}'"
                )));
            }
        };
        Ok(kind)
    }

    /// Instantaneous transform for eased progress `p` within the phase.
    pub fn transform(self, p: f64, is_entrance: bool) -> AnimationState {
        // `shown` is 0 when the overlay is fully absent and 1 when fully present.
        let shown = if is_entrance { p } else { 1.0 - p };
        let hidden = 1.0 - shown;
        let mut s = AnimationState::IDENTITY;

        match self {
            Self::None | Self::Typewriter => {}
            Self::FadeIn | Self::FadeOut => s.opacity = shown,
            Self::SlideUp => s.translate_y = SLIDE_DISTANCE * hidden,
            Self::SlideDown => s.translate_y = -SLIDE_DISTANCE * hidden,
            Self::SlideLeft => s.translate_x = SLIDE_DISTANCE * hidden,
            Self::SlideRight => s.translate_x = -SLIDE_DISTANCE * hidden,
            Self::ScaleUp => {
                s.opacity = shown;
                s.scale = shown;
            }
            Self::ScaleDown => {
                s.opacity = shown;
                s.scale = 1.0 + hidden;
            }
            Self::ZoomIn => {
                s.opacity = shown;
                s.scale = 0.5 + 0.5 * shown;
            }
            Self::Bounce => {
                // Damped oscillation about full size: 0 when hidden, overshoots past 1.
                s.scale = 1.0 - hidden * hidden * (3.0 * PI * shown).cos();
            }
            Self::RotateIn => {
                s.opacity = shown;
                s.rotation = -TAU * hidden;
            }
            Self::Spin => {
                s.opacity = shown;
                s.rotation = 2.0 * TAU * hidden;
            }
            Self::BlurIn | Self::BlurOut => {
                s.opacity = shown;
                s.scale = 1.0 + BLUR_SCALE * hidden;
            }
            Self::FadeSlideUp => {
                s.opacity = shown;
                s.translate_y = FADE_SLIDE_DISTANCE * hidden;
            }
            Self::ScaleFade => {
                s.opacity = shown;
                s.scale = 0.8 + 0.2 * shown;
            }
            Self::KenBurns => {
                s.opacity = shown;
                s.scale = 1.0 + 0.1 * hidden;
                s.translate_x = 20.0 * hidden;
            }
        }
        s
    }
}

impl TryFrom<String> for AnimationKind {
    type Error = OverlayError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AnimationKind> for String {
    fn from(value: AnimationKind) -> Self {
        value.as_str().to_string()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/kind.rs"]
mod tests;
