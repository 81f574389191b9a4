//! Declarative scene descriptor (`{"scene": {...}}`).

use std::{collections::BTreeMap, path::Path};

use crate::{
    animation::{bridge::RateFunctionRef, ease::RateFunction, value::Value},
    foundation::{
        core::{Fps, Resolution, Rgba8},
        error::{ChoreoError, ChoreoResult},
    },
    layering::SemanticLayer,
};

fn one() -> f64 {
    1.0
}

fn enabled() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SceneFile {
    pub scene: SceneSpec,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SceneSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Seconds; derived from the last animation/effect when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<Fps>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Rgba8>,
    /// Named rate functions usable by `rate_func` below.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub rate_functions: BTreeMap<String, RateFunction>,
    #[serde(default)]
    pub objects: Vec<ObjectSpec>,
    #[serde(default)]
    pub animations: Vec<AnimationSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<EffectSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera: Option<CameraSpec>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub markers: BTreeMap<String, f64>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ObjectSpec {
    pub id: String,
    #[serde(default)]
    pub layer: SemanticLayer,
    #[serde(default)]
    pub position: [f64; 3],
    #[serde(default = "one")]
    pub opacity: f64,
    #[serde(default = "one")]
    pub scale: f64,
    /// Radians.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub z_offset: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgba8>,
    #[serde(flatten)]
    pub kind: ObjectKind,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectKind {
    Text {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        font_size: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        font: Option<String>,
    },
    Shape {
        shape: ShapeKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        width: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        height: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        radius: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fill_opacity: Option<f64>,
    },
    /// Logical container; children inherit its transform and opacity.
    Group { children: Vec<String> },
}

impl ObjectKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Shape { .. } => "shape",
            Self::Group { .. } => "group",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Circle,
    Square,
    Rectangle,
    Triangle,
    Dot,
    Line,
    Arrow,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnimationSpec {
    pub target: String,
    #[serde(flatten)]
    pub kind: AnimationKind,
    #[serde(default)]
    pub start: f64,
    #[serde(default = "one")]
    pub duration: f64,
    /// Falls back to the config's `default_rate_func`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_func: Option<RateFunctionRef>,
}

impl AnimationSpec {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnimationKind {
    FadeIn,
    FadeOut,
    MoveTo {
        to: [f64; 3],
    },
    Shift {
        by: [f64; 3],
    },
    Scale {
        factor: f64,
    },
    Rotate {
        angle: f64,
    },
    Color {
        to: Rgba8,
    },
    /// Arbitrary keyframed property, e.g. `stroke_width`.
    Property {
        property: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<Value>,
        to: Value,
    },
}

/// Built-in object properties and their names on the object's track.
pub const POSITION: &str = "position";
pub const OPACITY: &str = "opacity";
pub const SCALE: &str = "scale";
pub const ROTATION: &str = "rotation";
pub const COLOR: &str = "color";

impl AnimationKind {
    /// Property written by this animation.
    pub fn property(&self) -> &str {
        match self {
            Self::FadeIn | Self::FadeOut => OPACITY,
            Self::MoveTo { .. } | Self::Shift { .. } => POSITION,
            Self::Scale { .. } => SCALE,
            Self::Rotate { .. } => ROTATION,
            Self::Color { .. } => COLOR,
            Self::Property { property, .. } => property,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::FadeIn => "fade_in",
            Self::FadeOut => "fade_out",
            Self::MoveTo { .. } => "move_to",
            Self::Shift { .. } => "shift",
            Self::Scale { .. } => "scale",
            Self::Rotate { .. } => "rotate",
            Self::Color { .. } => "color",
            Self::Property { .. } => "property",
        }
    }
}

/// One-shot effect; becomes a timeline event.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EffectSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default)]
    pub time: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub params: serde_json::Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default = "enabled")]
    pub enabled: bool,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CameraSpec {
    #[serde(default)]
    pub position: [f64; 3],
    #[serde(default = "one")]
    pub zoom: f64,
    #[serde(default)]
    pub keyframes: Vec<CameraKey>,
}

impl Default for CameraSpec {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            zoom: 1.0,
            keyframes: Vec::new(),
        }
    }
}

/// Camera keyframe; its rate function shapes the move that arrives at it.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CameraKey {
    pub time: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<[f64; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_func: Option<RateFunctionRef>,
}

impl SceneFile {
    pub fn from_json(text: &str) -> ChoreoResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> ChoreoResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ChoreoError::validation(format!("read scene '{}': {e}", path.display()))
        })?;
        Self::from_json(&text)
    }
}

impl SceneSpec {
    pub fn object(&self, id: &str) -> Option<&ObjectSpec> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Explicit duration, or the end of the last animation/effect/camera key (at least 1s).
    pub fn effective_duration(&self) -> f64 {
        if let Some(d) = self.duration {
            return d;
        }
        let anims = self.animations.iter().map(AnimationSpec::end);
        let effects = self
            .effects
            .iter()
            .map(|e| e.time + e.duration.unwrap_or(0.0));
        let camera = self
            .camera
            .iter()
            .flat_map(|c| c.keyframes.iter().map(|k| k.time));
        anims
            .chain(effects)
            .chain(camera)
            .filter(|t| t.is_finite())
            .fold(1.0, f64::max)
    }
}
