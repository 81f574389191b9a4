//! Frame evaluation: turns a built scene into per-frame render plans for an external renderer.

mod fingerprint;

use std::{collections::BTreeMap, ops::Range};

pub use fingerprint::{FrameFingerprint, fingerprint_frame};

use crate::{
    animation::value::Value,
    foundation::{
        core::{Fps, Resolution, Rgba8, TIME_EPSILON},
        error::{ChoreoError, ChoreoResult},
    },
    layering::SemanticLayer,
    scene::{
        BuiltScene,
        build::{BuiltObject, CAMERA_LAYER, CAMERA_TRACK, ZOOM},
        model::{OPACITY, ObjectKind, POSITION, ROTATION, SCALE, ShapeKind},
        text::TextObject,
    },
    timeline::{Event, TimelineState},
};

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ObjectPlan {
    pub id: String,
    pub layer: SemanticLayer,
    pub depth: i64,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<ShapeKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<TextObject>,
    /// Evaluated properties, group transforms applied.
    pub properties: BTreeMap<String, Value>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct CameraPlan {
    pub position: [f64; 3],
    pub zoom: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct FramePlan {
    pub frame: u64,
    pub time: f64,
    /// Visible objects, back to front.
    pub objects: Vec<ObjectPlan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera: Option<CameraPlan>,
    /// Events firing in `[time, time + 1 frame)`.
    pub events: Vec<Event>,
    pub fingerprint: String,
    /// Earliest frame of the identical run this frame belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_of: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct RenderPlan {
    pub fps: Fps,
    pub resolution: Resolution,
    pub background_color: Rgba8,
    pub duration: f64,
    pub frame_count: u64,
    pub frames: Vec<FramePlan>,
}

impl RenderPlan {
    /// Frames that differ from their predecessor.
    pub fn unique_frames(&self) -> usize {
        self.frames.iter().filter(|f| f.static_of.is_none()).count()
    }
}

pub struct Evaluator;

impl Evaluator {
    #[tracing::instrument(skip(scene))]
    pub fn eval_frame(scene: &BuiltScene, frame: u64) -> ChoreoResult<FramePlan> {
        let timeline = &scene.timeline;
        let frame_count = timeline.frame_count();
        if frame >= frame_count {
            return Err(ChoreoError::evaluation(format!(
                "frame {frame} is out of bounds (frame count {frame_count})"
            )));
        }

        let fps = timeline.fps();
        let time = fps.frames_to_secs(frame).min(timeline.duration());
        let state = timeline.evaluate(time);

        let mut objects = Vec::new();
        for (id, depth) in scene.depths.draw_order() {
            let Some(object) = scene.object(id) else {
                continue;
            };
            if matches!(object.kind, ObjectKind::Group { .. }) {
                continue;
            }
            let Some(mut properties) = object_values(&state, object) else {
                continue;
            };
            apply_groups(scene, &state, object, &mut properties);
            for (k, v) in static_properties(&object.kind) {
                properties.entry(k.to_string()).or_insert(v);
            }

            if !is_visible(&properties) {
                continue;
            }
            let shape = match &object.kind {
                ObjectKind::Shape { shape, .. } => Some(*shape),
                _ => None,
            };
            objects.push(ObjectPlan {
                id: object.id.clone(),
                layer: object.layer,
                depth,
                kind: object.kind.type_name(),
                shape,
                text: object.text.clone(),
                properties,
            });
        }

        let camera = state
            .layer(CAMERA_LAYER)
            .and_then(|l| l.track(CAMERA_TRACK))
            .map(|t| CameraPlan {
                position: t
                    .values
                    .get(POSITION)
                    .and_then(Value::as_vector)
                    .and_then(|v| <[f64; 3]>::try_from(v).ok())
                    .unwrap_or([0.0; 3]),
                zoom: t.values.get(ZOOM).and_then(Value::as_scalar).unwrap_or(1.0),
            });

        let next = fps.frames_to_secs(frame + 1);
        let window_end = if frame + 1 == frame_count {
            next.max(timeline.duration() + 2.0 * TIME_EPSILON)
        } else {
            next
        };
        let events: Vec<Event> = timeline
            .events_between(time, window_end)
            .into_iter()
            .cloned()
            .collect();

        let fingerprint = fingerprint_frame(&objects, camera.as_ref(), &events).to_hex();
        Ok(FramePlan {
            frame,
            time,
            objects,
            camera,
            events,
            fingerprint,
            static_of: None,
        })
    }

    /// Evaluate `frames` (all frames when `None`) and link repeated frames via `static_of`.
    #[tracing::instrument(skip(scene))]
    pub fn render_plan(
        scene: &BuiltScene,
        frames: Option<Range<u64>>,
    ) -> ChoreoResult<RenderPlan> {
        let frame_count = scene.timeline.frame_count();
        let range = frames.unwrap_or(0..frame_count);
        if range.start >= range.end || range.end > frame_count {
            return Err(ChoreoError::evaluation(format!(
                "frame range {}..{} is outside 0..{frame_count}",
                range.start, range.end
            )));
        }

        let mut out: Vec<FramePlan> = Vec::with_capacity((range.end - range.start) as usize);
        for frame in range {
            let mut plan = Self::eval_frame(scene, frame)?;
            if let Some(prev) = out.last() {
                if prev.fingerprint == plan.fingerprint {
                    plan.static_of = Some(prev.static_of.unwrap_or(prev.frame));
                }
            }
            out.push(plan);
        }

        let plan = RenderPlan {
            fps: scene.config.fps,
            resolution: scene.config.resolution,
            background_color: scene.config.background_color,
            duration: scene.timeline.duration(),
            frame_count,
            frames: out,
        };
        tracing::info!(
            frames = plan.frames.len(),
            unique = plan.unique_frames(),
            "render plan ready"
        );
        Ok(plan)
    }
}

fn object_values(
    state: &TimelineState,
    object: &BuiltObject,
) -> Option<BTreeMap<String, Value>> {
    state
        .layer(object.layer.name())?
        .track(&object.id)
        .map(|t| t.values.clone())
}

/// Compose ancestor groups: displacement adds, opacity and scale multiply, rotation adds.
fn apply_groups(
    scene: &BuiltScene,
    state: &TimelineState,
    object: &BuiltObject,
    properties: &mut BTreeMap<String, Value>,
) {
    let mut parent = object.parent.as_deref();
    let mut hops = 0;
    while let Some(pid) = parent {
        hops += 1;
        let Some(group) = scene.object(pid) else {
            break;
        };
        if hops > scene.objects.len() {
            break;
        }
        let Some(values) = object_values(state, group) else {
            // A hidden group layer hides its children.
            properties.insert(OPACITY.to_string(), Value::Scalar(0.0));
            return;
        };

        if let Some(gp) = values.get(POSITION).and_then(Value::as_vector) {
            if let Some(Value::Vector(p)) = properties.get_mut(POSITION) {
                for ((c, g), o) in p.iter_mut().zip(gp).zip(group.origin) {
                    *c += g - o;
                }
            }
        }
        for (key, combine) in [
            (OPACITY, (|a: f64, b: f64| a * b) as fn(f64, f64) -> f64),
            (SCALE, |a, b| a * b),
            (ROTATION, |a, b| a + b),
        ] {
            if let (Some(Value::Scalar(own)), Some(g)) = (
                properties.get_mut(key),
                values.get(key).and_then(Value::as_scalar),
            ) {
                *own = combine(*own, g);
            }
        }
        parent = group.parent.as_deref();
    }
}

fn static_properties(kind: &ObjectKind) -> Vec<(&'static str, Value)> {
    match kind {
        ObjectKind::Shape {
            width,
            height,
            radius,
            fill_opacity,
            ..
        } => [
            ("width", width),
            ("height", height),
            ("radius", radius),
            ("fill_opacity", fill_opacity),
        ]
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| (k, Value::Scalar(v))))
        .collect(),
        _ => Vec::new(),
    }
}

fn is_visible(properties: &BTreeMap<String, Value>) -> bool {
    let positive = |key: &str| {
        properties
            .get(key)
            .and_then(Value::as_scalar)
            .is_none_or(|v| v > 0.0)
    };
    positive(OPACITY) && positive(SCALE)
}

#[cfg(test)]
#[path = "../../tests/unit/eval/plan.rs"]
mod tests;
