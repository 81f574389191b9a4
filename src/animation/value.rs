use smallvec::SmallVec;

use crate::foundation::core::Rgba8;

/// Interpolation contract for animatable values.
pub trait Lerp: Sized {
    /// Interpolate from `a` to `b` with eased factor `t`.
    ///
    /// `t` is normally in `[0, 1]` but may overshoot for back/elastic curves.
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl Lerp for Rgba8 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        fn lerp_u8(a: u8, b: u8, t: f64) -> u8 {
            let a = f64::from(a);
            let b = f64::from(b);
            (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
        }

        Self {
            r: lerp_u8(a.r, b.r, t),
            g: lerp_u8(a.g, b.g, t),
            b: lerp_u8(a.b, b.b, t),
            a: lerp_u8(a.a, b.a, t),
        }
    }
}

/// Component storage for vector values (points are usually 2 or 3 wide).
pub type Components = SmallVec<[f64; 4]>;

/// A keyframeable property value.
///
/// JSON form: `true`, `1.5`, `[0, 1, 0]`, `{"color": "#ff0000"}`, `"label"`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Discrete flag.
    Bool(bool),
    /// Single number.
    Scalar(f64),
    /// Fixed-width numeric vector (positions, scales).
    Vector(Components),
    /// Colour, interpolated per channel.
    Color {
        /// Colour value.
        color: Rgba8,
    },
    /// Discrete text.
    Text(String),
}

impl Value {
    /// Build a vector value from a slice.
    pub fn vector(components: &[f64]) -> Self {
        Self::Vector(components.iter().copied().collect())
    }

    /// Build a colour value.
    pub fn color(color: Rgba8) -> Self {
        Self::Color { color }
    }

    /// Short name of the variant, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Scalar(_) => "scalar",
            Self::Vector(_) => "vector",
            Self::Color { .. } => "color",
            Self::Text(_) => "text",
        }
    }

    /// Human-readable shape, e.g. `vector[3]`.
    pub fn shape(&self) -> String {
        match self {
            Self::Vector(v) => format!("vector[{}]", v.len()),
            other => other.kind_name().to_string(),
        }
    }

    /// Return `true` when `self` and `other` can be interpolated against each other.
    pub fn same_shape(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Vector(a), Self::Vector(b)) => a.len() == b.len(),
            (a, b) => std::mem::discriminant(a) == std::mem::discriminant(b),
        }
    }

    /// Return `true` for values that switch instead of interpolating.
    pub fn is_discrete(&self) -> bool {
        matches!(self, Self::Bool(_) | Self::Text(_))
    }

    /// Return `true` when every numeric component is finite.
    pub fn is_finite(&self) -> bool {
        match self {
            Self::Scalar(v) => v.is_finite(),
            Self::Vector(v) => v.iter().all(|c| c.is_finite()),
            Self::Bool(_) | Self::Color { .. } | Self::Text(_) => true,
        }
    }

    /// Scalar payload, if any.
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    /// Vector payload, if any.
    pub fn as_vector(&self) -> Option<&[f64]> {
        match self {
            Self::Vector(v) => Some(v),
            _ => None,
        }
    }

    /// Colour payload, if any.
    pub fn as_color(&self) -> Option<Rgba8> {
        match self {
            Self::Color { color } => Some(*color),
            _ => None,
        }
    }
}

impl Lerp for Value {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        match (a, b) {
            (Self::Scalar(x), Self::Scalar(y)) => Self::Scalar(<f64 as Lerp>::lerp(x, y, t)),
            (Self::Vector(x), Self::Vector(y)) if x.len() == y.len() => Self::Vector(
                x.iter()
                    .zip(y.iter())
                    .map(|(x, y)| <f64 as Lerp>::lerp(x, y, t))
                    .collect(),
            ),
            (Self::Color { color: x }, Self::Color { color: y }) => Self::Color {
                color: <Rgba8 as Lerp>::lerp(x, y, t),
            },
            // Discrete values (and mismatched shapes) hold until the segment completes.
            _ => {
                if t >= 1.0 {
                    b.clone()
                } else {
                    a.clone()
                }
            }
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Scalar(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl<const N: usize> From<[f64; N]> for Value {
    fn from(v: [f64; N]) -> Self {
        Self::vector(&v)
    }
}

impl From<Rgba8> for Value {
    fn from(color: Rgba8) -> Self {
        Self::Color { color }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/value.rs"]
mod tests;
