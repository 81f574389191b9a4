//! Choreo is a timeline, keyframe and easing engine for declarative animated scenes.
//!
//! Rendering is left to an external engine. Choreo owns the choreography:
//!
//! - Parse and validate a JSON [`SceneFile`]
//! - Build it into a [`Timeline`] of layers, tracks and keyframes with a [`SceneBuilder`]
//! - Evaluate frames into [`FramePlan`]s (or a whole [`RenderPlan`]) with the [`Evaluator`]
#![forbid(unsafe_code)]

pub mod animation;
pub mod config;
pub mod eval;
pub mod foundation;
pub mod layering;
pub mod scene;
pub mod timeline;

pub use crate::animation::bridge::{CombinatorRef, RateFunctionBridge, RateFunctionRef};
pub use crate::animation::ease::{Curve, RateFunction};
pub use crate::animation::value::{Lerp, Value};
pub use crate::config::RenderConfig;
pub use crate::eval::{Evaluator, FramePlan, RenderPlan};
pub use crate::foundation::core::{Fps, Resolution, Rgba8};
pub use crate::foundation::error::{ChoreoError, ChoreoResult};
pub use crate::layering::{DepthManager, SemanticLayer};
pub use crate::scene::{BuiltScene, SceneBuilder, SceneFile};
pub use crate::timeline::{Event, Keyframe, KeyframeList, Layer, Timeline, Track, TrackKind};
