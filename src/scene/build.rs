use std::collections::{BTreeMap, BTreeSet};

use crate::{
    animation::{
        bridge::RateFunctionBridge,
        ease::{Curve, RateFunction},
        value::{Lerp, Value},
    },
    config::RenderConfig,
    foundation::{
        core::{Rgba8, same_time},
        error::{ChoreoError, ChoreoResult},
    },
    layering::{DepthManager, SemanticLayer},
    scene::{
        model::{
            AnimationKind, AnimationSpec, COLOR, CameraSpec, OPACITY, ObjectKind, ObjectSpec,
            POSITION, ROTATION, SCALE, SceneFile,
        },
        text::{TextFactory, TextObject},
        validate::Diagnostics,
    },
    timeline::{Event, Keyframe, Layer, Timeline, Track, TrackKind},
};

/// Timeline layer holding the camera track.
pub const CAMERA_LAYER: &str = "camera";
/// Camera track name inside [`CAMERA_LAYER`].
pub const CAMERA_TRACK: &str = "camera";
/// Camera zoom property.
pub const ZOOM: &str = "zoom";

/// Rate functions this close to 1 at the end land exactly on the target.
const SETTLE_EPSILON: f64 = 1e-9;

/// A drawable (or group) object after building.
#[derive(Clone, Debug, PartialEq)]
pub struct BuiltObject {
    pub id: String,
    pub layer: SemanticLayer,
    pub kind: ObjectKind,
    pub parent: Option<String>,
    /// Descriptor position; children follow their group's displacement from here.
    pub origin: [f64; 3],
    /// Present for text objects.
    pub text: Option<TextObject>,
}

/// Everything the frame evaluator needs.
#[derive(Clone, Debug)]
pub struct BuiltScene {
    pub config: RenderConfig,
    pub timeline: Timeline,
    pub depths: DepthManager,
    pub objects: Vec<BuiltObject>,
    /// Warnings and infos from validation.
    pub diagnostics: Diagnostics,
}

impl BuiltScene {
    pub fn object(&self, id: &str) -> Option<&BuiltObject> {
        self.objects.iter().find(|o| o.id == id)
    }
}

/// Turns a validated [`SceneFile`] into a [`BuiltScene`].
///
/// Each object gets an animation track on the timeline layer named after its semantic layer.
/// Its descriptor values become hold keyframes at `t = 0`; each animation, in start order, adds a start
/// keyframe carrying the animation's rate function and an end keyframe holding the value the
/// rate function settles on (the target, for curves that finish at 1).
#[derive(Clone, Debug, Default)]
pub struct SceneBuilder {
    config: RenderConfig,
    texts: TextFactory,
}

impl SceneBuilder {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            texts: TextFactory::default(),
        }
    }

    pub fn with_text_factory(mut self, texts: TextFactory) -> Self {
        self.texts = texts;
        self
    }

    #[tracing::instrument(skip_all, fields(scene = file.scene.name.as_deref().unwrap_or("")))]
    pub fn build(&self, file: &SceneFile) -> ChoreoResult<BuiltScene> {
        let diagnostics = file.validate(&self.texts).into_result()?;
        let scene = &file.scene;

        let mut config = self.config.clone();
        if let Some(fps) = scene.fps {
            config.fps = fps;
        }
        if let Some(res) = scene.resolution {
            config.resolution = res;
        }
        if let Some(bg) = scene.background_color {
            config.background_color = bg;
        }
        config.validate()?;

        let bridge = scene.rate_function_bridge()?;
        let default_rate = bridge.get_rate_function(&config.default_rate_func)?;
        let hold = RateFunction::from(Curve::Hold);

        let mut timeline = Timeline::new(&config, scene.effective_duration())?;
        let mut depths = DepthManager::new();
        let mut objects = Vec::with_capacity(scene.objects.len());

        let parents: BTreeMap<&str, &str> = scene
            .objects
            .iter()
            .flat_map(|o| match &o.kind {
                ObjectKind::Group { children } => children
                    .iter()
                    .map(|c| (c.as_str(), o.id.as_str()))
                    .collect::<Vec<_>>(),
                _ => Vec::new(),
            })
            .collect();

        for o in &scene.objects {
            depths.add_with_offset(&o.id, o.layer, o.z_offset)?;
            let layer_name = o.layer.name();
            if timeline.layer(layer_name).is_none() {
                let z = i32::try_from(o.layer.rank()).unwrap_or(i32::MAX);
                timeline.add_layer(Layer::new(layer_name).with_z_index(z))?;
            }
            let track = timeline
                .require_layer_mut(layer_name)?
                .add_track(Track::new(o.id.clone(), TrackKind::Animation))?;
            for (property, value) in initial_values(o) {
                track.set_keyframe(property, Keyframe::new(0.0, value).with_easing(hold.clone()))?;
            }

            let text = match &o.kind {
                ObjectKind::Text {
                    text,
                    font_size,
                    font,
                } => Some(self.texts.make(&o.id, text, *font_size, font.as_deref())?),
                _ => None,
            };
            objects.push(BuiltObject {
                id: o.id.clone(),
                layer: o.layer,
                kind: o.kind.clone(),
                parent: parents.get(o.id.as_str()).map(|p| (*p).to_string()),
                origin: o.position,
                text,
            });
        }

        let mut order: Vec<&AnimationSpec> = scene.animations.iter().collect();
        order.sort_by(|a, b| a.start.total_cmp(&b.start));
        let mut faded: BTreeSet<&str> = BTreeSet::new();
        let mut started_at_zero: BTreeSet<(&str, &str)> = BTreeSet::new();
        for a in order {
            let spec = scene
                .object(&a.target)
                .ok_or_else(|| ChoreoError::validation(format!("unknown object '{}'", a.target)))?;
            let rate = match &a.rate_func {
                Some(r) => bridge.resolve(r)?,
                None => default_rate.clone(),
            };
            let is_fade = matches!(a.kind, AnimationKind::FadeIn | AnimationKind::FadeOut);
            let first_fade = is_fade && faded.insert(a.target.as_str());

            let track = timeline
                .require_layer_mut(spec.layer.name())?
                .track_mut(&a.target)?
                .ok_or_else(|| ChoreoError::timeline(format!("no track for '{}'", a.target)))?;

            // An object whose first opacity change is a fade-in starts hidden, unless an
            // earlier animation already owns its opacity at t = 0.
            if first_fade
                && matches!(a.kind, AnimationKind::FadeIn)
                && !started_at_zero.contains(&(a.target.as_str(), OPACITY))
            {
                track.set_keyframe(OPACITY, Keyframe::new(0.0, 0.0).with_easing(hold.clone()))?;
            }

            let property = a.kind.property();
            if same_time(a.start, 0.0) {
                started_at_zero.insert((a.target.as_str(), property));
            }
            let current = track.get_value_at_time(property, a.start);
            let (from, to) = endpoints(&a.kind, spec, current)?;
            // The animation settles where its rate function finishes, which is short of
            // `to` for curves such as there_and_back.
            let settled = rate.apply(1.0);
            let end_value = if (settled - 1.0).abs() < SETTLE_EPSILON {
                to
            } else {
                Value::lerp(&from, &to, settled)
            };
            tracing::trace!(
                object = %a.target,
                property = %property,
                start = a.start,
                end = a.end(),
                "animate"
            );

            let list = track.keyframes_mut(property);
            list.remove_between(a.start, a.end());
            list.upsert(Keyframe::new(a.start, from).with_easing(rate))?;
            list.upsert(Keyframe::new(a.end(), end_value).with_easing(hold.clone()))?;
        }

        for (i, e) in scene.effects.iter().enumerate() {
            let mut params = match &e.params {
                serde_json::Value::Object(m) => m.clone(),
                serde_json::Value::Null => serde_json::Map::new(),
                other => {
                    let mut m = serde_json::Map::new();
                    m.insert("value".to_string(), other.clone());
                    m
                }
            };
            if let Some(t) = &e.target {
                params.insert("target".to_string(), serde_json::Value::from(t.clone()));
            }
            if let Some(d) = e.duration {
                params.insert("duration".to_string(), serde_json::Value::from(d));
            }
            let id = e.id.clone().unwrap_or_else(|| format!("effect_{i}"));
            let mut event = Event::new(id, e.time, e.kind.clone())
                .with_params(serde_json::Value::Object(params))
                .enabled(e.enabled);
            for tag in &e.tags {
                event = event.with_tag(tag.clone());
            }
            timeline.add_event(event)?;
        }

        if let Some(camera) = &scene.camera {
            add_camera(&mut timeline, camera, &bridge, &default_rate, &hold)?;
        }

        for (name, t) in &scene.markers {
            timeline.add_marker(name.clone(), *t)?;
        }

        tracing::debug!(
            objects = objects.len(),
            layers = timeline.layers().len(),
            events = timeline.events().len(),
            duration = timeline.duration(),
            "scene built"
        );

        Ok(BuiltScene {
            config,
            timeline,
            depths,
            objects,
            diagnostics,
        })
    }
}

fn initial_values(o: &ObjectSpec) -> Vec<(&'static str, Value)> {
    let mut out = vec![
        (POSITION, Value::from(o.position)),
        (OPACITY, Value::from(o.opacity)),
        (SCALE, Value::from(o.scale)),
        (ROTATION, Value::from(o.rotation)),
    ];
    if let Some(c) = o.color {
        out.push((COLOR, Value::from(c)));
    }
    out
}

/// Start and end values of an animation given the property's value at its start.
fn endpoints(
    kind: &AnimationKind,
    spec: &ObjectSpec,
    current: Option<Value>,
) -> ChoreoResult<(Value, Value)> {
    let scalar = |fallback: f64| current.as_ref().and_then(Value::as_scalar).unwrap_or(fallback);
    let position = || {
        current
            .as_ref()
            .and_then(Value::as_vector)
            .and_then(|v| <[f64; 3]>::try_from(v).ok())
            .unwrap_or(spec.position)
    };

    Ok(match kind {
        AnimationKind::FadeIn => {
            let target = if spec.opacity > 0.0 { spec.opacity } else { 1.0 };
            (Value::from(scalar(0.0)), Value::from(target))
        }
        AnimationKind::FadeOut => (Value::from(scalar(spec.opacity)), Value::from(0.0)),
        AnimationKind::MoveTo { to } => (Value::from(position()), Value::from(*to)),
        AnimationKind::Shift { by } => {
            let p = position();
            let to = [p[0] + by[0], p[1] + by[1], p[2] + by[2]];
            (Value::from(p), Value::from(to))
        }
        AnimationKind::Scale { factor } => {
            let s = scalar(spec.scale);
            (Value::from(s), Value::from(s * factor))
        }
        AnimationKind::Rotate { angle } => {
            let r = scalar(spec.rotation);
            (Value::from(r), Value::from(r + angle))
        }
        AnimationKind::Color { to } => {
            let from = current
                .as_ref()
                .and_then(Value::as_color)
                .or(spec.color)
                .unwrap_or(Rgba8::WHITE);
            (Value::from(from), Value::from(*to))
        }
        AnimationKind::Property { property, from, to } => {
            let from = from
                .clone()
                .or_else(|| current.clone())
                .ok_or_else(|| {
                    ChoreoError::validation(format!(
                        "property animation of '{}.{property}' needs 'from' (no earlier value)",
                        spec.id
                    ))
                })?;
            (from, to.clone())
        }
    })
}

fn add_camera(
    timeline: &mut Timeline,
    camera: &CameraSpec,
    bridge: &RateFunctionBridge,
    default_rate: &RateFunction,
    hold: &RateFunction,
) -> ChoreoResult<()> {
    let z = i32::try_from(SemanticLayer::Ui.rank() + 1).unwrap_or(i32::MAX);
    let layer = timeline.add_layer(Layer::new(CAMERA_LAYER).with_z_index(z))?;
    let track = layer.add_track(Track::new(CAMERA_TRACK, TrackKind::Camera))?;

    let mut keys: Vec<_> = camera.keyframes.iter().collect();
    keys.sort_by(|a, b| a.time.total_cmp(&b.time));

    let mut positions = vec![(0.0, Value::from(camera.position), hold.clone())];
    let mut zooms = vec![(0.0, Value::from(camera.zoom), hold.clone())];
    for k in keys {
        let rate = match &k.rate_func {
            Some(r) => bridge.resolve(r)?,
            None => default_rate.clone(),
        };
        if let Some(p) = k.position {
            positions.push((k.time, Value::from(p), rate.clone()));
        }
        if let Some(z) = k.zoom {
            zooms.push((k.time, Value::from(z), rate));
        }
    }

    // A camera key's rate function shapes the move that arrives at it, so each keyframe
    // carries the easing of its successor.
    for (property, keys) in [(POSITION, positions), (ZOOM, zooms)] {
        for (i, (time, value, _)) in keys.iter().enumerate() {
            let easing = keys.get(i + 1).map_or_else(|| hold.clone(), |next| next.2.clone());
            track.set_keyframe(
                property,
                Keyframe::new(*time, value.clone()).with_easing(easing),
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/scene/build.rs"]
mod tests;
