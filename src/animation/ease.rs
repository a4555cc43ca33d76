use kurbo::{CubicBez, ParamCurve, Point};

use crate::foundation::error::{OverlayError, OverlayResult};

/// Easing curve applied to raw animation progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Easing {
    Linear,
    EaseIn,
    EaseOut,
    #[default]
    EaseInOut,
    /// Overshooting cubic-bezier approximation of a bounce.
    Bounce,
}

/// Control points of the bounce curve, `cubic-bezier(0.68, -0.55, 0.265, 1.55)`.
const BOUNCE_BEZIER: [(f64, f64); 2] = [(0.68, -0.55), (0.265, 1.55)];

impl Easing {
    pub const ALL: [Easing; 5] = [
        Easing::Linear,
        Easing::EaseIn,
        Easing::EaseOut,
        Easing::EaseInOut,
        Easing::Bounce,
    ];

    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t,
            Self::EaseOut => t * (2.0 - t),
            Self::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Self::Bounce => cubic_bezier_y_for_x(BOUNCE_BEZIER[0], BOUNCE_BEZIER[1], t),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::EaseIn => "ease-in",
            Self::EaseOut => "ease-out",
            Self::EaseInOut => "ease-in-out",
            Self::Bounce => "bounce",
        }
    }

    pub fn parse(name: &str) -> OverlayResult<Self> {
        let key: String = name
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "linear" => Ok(Self::Linear),
            "easein" | "in" => Ok(Self::EaseIn),
            "easeout" | "out" => Ok(Self::EaseOut),
            "easeinout" | "ease" | "inout" => Ok(Self::EaseInOut),
            "bounce" | "easeinoutback" | "back" => Ok(Self::Bounce),
            "" => Err(OverlayError::validation("easing must be non-empty")),
            _ => Err(OverlayError::validation(format!("unknown easing '{name}'"))),
        }
    }
}

impl TryFrom<String> for Easing {
    type Error = OverlayError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Easing> for String {
    fn from(value: Easing) -> Self {
        value.as_str().to_string()
    }
}

/// Evaluate a CSS-style `cubic-bezier(p1, p2)` timing curve at `x`.
///
/// The x polynomial is monotone for every control pair whose x lies in `[0, 1]`, so
/// bisection on the curve parameter converges.
fn cubic_bezier_y_for_x(p1: (f64, f64), p2: (f64, f64), x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let curve = CubicBez::new(
        Point::new(0.0, 0.0),
        Point::new(p1.0, p1.1),
        Point::new(p2.0, p2.1),
        Point::new(1.0, 1.0),
    );

    let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
    let mut s = x;
    for _ in 0..48 {
        let px = curve.eval(s).x;
        if (px - x).abs() < 1e-9 {
            break;
        }
        if px < x {
            lo = s;
        } else {
            hi = s;
        }
        s = 0.5 * (lo + hi);
    }
    curve.eval(s).y
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
