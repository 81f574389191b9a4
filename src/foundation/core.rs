use crate::foundation::error::{ChoreoError, ChoreoResult};

/// Two times closer than this (in seconds) are considered equal.
pub const TIME_EPSILON: f64 = 1e-9;

/// Frames-per-second represented as a rational `num/den`.
///
/// Deserializes from either a plain integer (`30`) or an object (`{"num": 30000, "den": 1001}`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl<'de> serde::Deserialize<'de> for Fps {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Int(u32),
            Ratio { num: u32, den: u32 },
        }

        let (num, den) = match Repr::deserialize(deserializer)? {
            Repr::Int(num) => (num, 1),
            Repr::Ratio { num, den } => (num, den),
        };
        Fps::new(num, den).map_err(serde::de::Error::custom)
    }
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> ChoreoResult<Self> {
        if den == 0 {
            return Err(ChoreoError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(ChoreoError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Convert a frame index to its presentation time in seconds.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * self.frame_duration_secs()
    }

    /// Convert seconds to a frame index using floor semantics.
    pub fn secs_to_frames_floor(self, secs: f64) -> u64 {
        (secs * self.as_f64() + TIME_EPSILON).floor().max(0.0) as u64
    }

    /// Number of frames needed to cover `secs` seconds.
    pub fn frame_count(self, secs: f64) -> u64 {
        (secs * self.as_f64() - TIME_EPSILON).ceil().max(0.0) as u64
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 30, den: 1 }
    }
}

/// Output resolution in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Resolution {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Resolution {
    /// Create a validated resolution.
    pub fn new(width: u32, height: u32) -> ChoreoResult<Self> {
        if width == 0 || height == 0 {
            return Err(ChoreoError::validation(
                "resolution width/height must be > 0",
            ));
        }
        Ok(Self { width, height })
    }

    /// Width divided by height.
    pub fn aspect_ratio(self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// Straight-alpha RGBA8 colour.
///
/// Serialized as a `#rrggbbaa` hex string; parses `#rgb`, `#rrggbb`, `#rrggbbaa` and a small set of
/// palette names (`"blue"`, `"white"`, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

const PALETTE: &[(&str, &str)] = &[
    ("white", "#ffffff"),
    ("black", "#000000"),
    ("gray", "#888888"),
    ("grey", "#888888"),
    ("blue", "#58c4dd"),
    ("red", "#fc6255"),
    ("green", "#83c167"),
    ("yellow", "#f7d96f"),
    ("orange", "#ff862f"),
    ("purple", "#9a72ac"),
    ("pink", "#d147bd"),
    ("teal", "#5cd0b3"),
    ("gold", "#f0ac5f"),
];

impl Rgba8 {
    /// Opaque colour from RGB channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Parse a hex string or palette name.
    pub fn parse(s: &str) -> ChoreoResult<Self> {
        let trimmed = s.trim();
        let lower = trimmed.to_ascii_lowercase();
        if let Some((_, hex)) = PALETTE.iter().find(|(name, _)| *name == lower) {
            return Self::parse_hex(hex);
        }
        Self::parse_hex(trimmed)
    }

    fn parse_hex(s: &str) -> ChoreoResult<Self> {
        let bad = || ChoreoError::validation(format!("invalid colour '{s}'"));
        let digits = s.strip_prefix('#').ok_or_else(bad)?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(bad());
        }
        let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| bad());
        match digits.len() {
            3 => {
                let nib = |i: usize| {
                    u8::from_str_radix(&digits[i..i + 1], 16)
                        .map(|v| v * 17)
                        .map_err(|_| bad())
                };
                Ok(Self::rgb(nib(0)?, nib(1)?, nib(2)?))
            }
            6 => Ok(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Self {
                r: byte(0)?,
                g: byte(2)?,
                b: byte(4)?,
                a: byte(6)?,
            }),
            _ => Err(bad()),
        }
    }

    /// Format as `#rrggbbaa`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

impl serde::Serialize for Rgba8 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Rgba8 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Rgba8::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Return `true` when `a` and `b` denote the same instant.
pub fn same_time(a: f64, b: f64) -> bool {
    (a - b).abs() <= TIME_EPSILON
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
