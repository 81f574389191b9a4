//! Semantic layers and stable per-layer z-ordering.

mod depth;

pub use depth::{DEPTH_SPACING, DepthManager, DepthUpdate, LAYER_STRIDE, MAX_OFFSET};

/// Named band of the scene's z-range, back to front.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SemanticLayer {
    /// Backdrops.
    Background,
    /// Scenery behind the subject.
    Environment,
    /// Primary content.
    #[default]
    Main,
    /// Highlights, particles, glows.
    Effects,
    /// Elements in front of the subject.
    Foreground,
    /// Captions and annotations.
    Overlay,
    /// Interface chrome, always on top.
    Ui,
}

impl SemanticLayer {
    /// All layers, back to front.
    pub const ALL: [SemanticLayer; 7] = [
        Self::Background,
        Self::Environment,
        Self::Main,
        Self::Effects,
        Self::Foreground,
        Self::Overlay,
        Self::Ui,
    ];

    /// Position in the back-to-front order.
    pub fn rank(self) -> i64 {
        self as i64
    }

    /// Depth of the first member of this layer.
    pub fn base_depth(self) -> i64 {
        self.rank() * LAYER_STRIDE
    }

    /// Lowercase name as used in descriptors.
    pub fn name(self) -> &'static str {
        match self {
            Self::Background => "background",
            Self::Environment => "environment",
            Self::Main => "main",
            Self::Effects => "effects",
            Self::Foreground => "foreground",
            Self::Overlay => "overlay",
            Self::Ui => "ui",
        }
    }
}
