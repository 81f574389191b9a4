//! Scene descriptors: schema, validation, text factory and timeline construction.

pub mod build;
pub mod model;
pub mod text;
pub mod validate;

pub use build::{BuiltObject, BuiltScene, SceneBuilder};
pub use model::{
    AnimationKind, AnimationSpec, CameraKey, CameraSpec, EffectSpec, ObjectKind, ObjectSpec,
    SceneFile, SceneSpec, ShapeKind,
};
pub use text::{TextFactory, TextObject, TextPolicy};
pub use validate::{Diagnostic, Diagnostics, Severity};
