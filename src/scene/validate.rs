use std::{collections::BTreeMap, fmt};

use crate::{
    animation::{
        bridge::{RateFunctionBridge, RateFunctionRef},
        value::Value,
    },
    foundation::{
        core::Resolution,
        error::{ChoreoError, ChoreoResult},
    },
    layering::MAX_OFFSET,
    scene::{
        model::{
            AnimationKind, AnimationSpec, COLOR, CameraSpec, EffectSpec, OPACITY, ObjectKind,
            ObjectSpec, POSITION, ROTATION, SCALE, SceneFile, SceneSpec,
        },
        text::TextFactory,
    },
};

/// How serious a [`Diagnostic`] is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// The scene cannot be built.
    Error,
    /// Builds, but probably not what was meant.
    Warning,
    /// Informational.
    Info,
}

/// One finding, located by a JSON-ish path such as `scene.objects[2].opacity`.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub path: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sev = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        write!(f, "{sev}: {}: {}", self.path, self.message)
    }
}

/// All findings of one validation pass, in discovery order.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.0.iter().filter(|d| d.severity == severity).count()
    }

    /// `Err` listing every error when any is present.
    pub fn into_result(self) -> ChoreoResult<Self> {
        if !self.has_errors() {
            return Ok(self);
        }
        let msg = self
            .0
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .map(|d| format!("{}: {}", d.path, d.message))
            .collect::<Vec<_>>()
            .join("; ");
        Err(ChoreoError::validation(msg))
    }

    fn push(&mut self, severity: Severity, path: impl Into<String>, message: impl Into<String>) {
        self.0.push(Diagnostic {
            severity,
            path: path.into(),
            message: message.into(),
        });
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.push(Severity::Error, path, message);
    }

    fn warning(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.push(Severity::Warning, path, message);
    }

    fn info(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.push(Severity::Info, path, message);
    }
}

impl SceneSpec {
    /// Bridge with this scene's named rate functions registered.
    pub fn rate_function_bridge(&self) -> ChoreoResult<RateFunctionBridge> {
        let mut bridge = RateFunctionBridge::new();
        for (name, f) in &self.rate_functions {
            bridge.register(name, f.clone())?;
        }
        Ok(bridge)
    }
}

impl SceneFile {
    /// Check the whole descriptor and collect every finding.
    pub fn validate(&self, texts: &TextFactory) -> Diagnostics {
        let scene = &self.scene;
        let mut d = Diagnostics::default();

        let duration = scene.effective_duration();
        match scene.duration {
            Some(v) if !v.is_finite() || v <= 0.0 => {
                d.error("scene.duration", format!("must be finite and > 0 (got {v})"))
            }
            Some(_) => {}
            None => d.info(
                "scene.duration",
                format!("not set; using {duration}s from the animations"),
            ),
        }
        if let Some(r) = scene.resolution {
            if let Err(e) = Resolution::new(r.width, r.height) {
                d.error("scene.resolution", e.to_string());
            }
        }

        let mut bridge = RateFunctionBridge::new();
        for (name, f) in &scene.rate_functions {
            if let Err(e) = bridge.register(name, f.clone()) {
                d.error(format!("scene.rate_functions.{name}"), e.to_string());
            }
        }

        if scene.objects.is_empty() {
            d.warning("scene.objects", "scene has no objects");
        }
        let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
        for (i, o) in scene.objects.iter().enumerate() {
            let path = format!("scene.objects[{i}]");
            if o.id.trim().is_empty() {
                d.error(format!("{path}.id"), "must be non-empty");
            } else if let Some(first) = seen.insert(o.id.as_str(), i) {
                d.error(
                    format!("{path}.id"),
                    format!("duplicate id '{}' (first at objects[{first}])", o.id),
                );
            }
            check_object(&mut d, &path, o, scene, texts);
        }
        check_group_cycles(&mut d, scene);

        for (i, a) in scene.animations.iter().enumerate() {
            let path = format!("scene.animations[{i}]");
            check_animation(&mut d, &path, a, scene, &bridge, duration);
        }
        check_overlaps(&mut d, &scene.animations);
        check_property_shapes(&mut d, scene);

        let mut effect_ids = BTreeMap::new();
        for (i, e) in scene.effects.iter().enumerate() {
            let path = format!("scene.effects[{i}]");
            if let Some(id) = &e.id {
                if effect_ids.insert(id.as_str(), i).is_some() {
                    d.error(format!("{path}.id"), format!("duplicate effect id '{id}'"));
                }
            }
            check_effect(&mut d, &path, e, scene, duration);
        }

        if let Some(camera) = &scene.camera {
            check_camera(&mut d, camera, &bridge);
        }

        for (name, t) in &scene.markers {
            if !t.is_finite() || *t < 0.0 || *t > duration {
                d.error(
                    format!("scene.markers.{name}"),
                    format!("{t}s is outside [0, {duration}]"),
                );
            }
        }

        d
    }
}

fn check_object(
    d: &mut Diagnostics,
    path: &str,
    o: &ObjectSpec,
    scene: &SceneSpec,
    texts: &TextFactory,
) {
    if o.position.iter().any(|c| !c.is_finite()) {
        d.error(format!("{path}.position"), "must be finite");
    }
    if !(0.0..=1.0).contains(&o.opacity) {
        d.error(format!("{path}.opacity"), format!("{} is outside [0, 1]", o.opacity));
    }
    if !o.scale.is_finite() || o.scale < 0.0 {
        d.error(format!("{path}.scale"), "must be finite and >= 0");
    }
    if !o.rotation.is_finite() {
        d.error(format!("{path}.rotation"), "must be finite");
    }
    if !(-MAX_OFFSET..=MAX_OFFSET).contains(&o.z_offset) {
        d.error(
            format!("{path}.z_offset"),
            format!("{} is outside [-{MAX_OFFSET}, {MAX_OFFSET}]", o.z_offset),
        );
    }

    match &o.kind {
        ObjectKind::Text {
            text,
            font_size,
            font,
        } => match texts.make(&o.id, text, *font_size, font.as_deref()) {
            Ok(t) => {
                if let Some(req) = t.clamped_from() {
                    d.warning(
                        format!("{path}.font_size"),
                        format!("{req} clamped to {}", t.font_size()),
                    );
                }
            }
            Err(e) => d.error(format!("{path}.text"), e.to_string()),
        },
        ObjectKind::Shape {
            width,
            height,
            radius,
            fill_opacity,
            ..
        } => {
            for (name, v) in [("width", width), ("height", height), ("radius", radius)] {
                if let Some(v) = v {
                    if !v.is_finite() || *v <= 0.0 {
                        d.error(format!("{path}.{name}"), "must be finite and > 0");
                    }
                }
            }
            if let Some(f) = fill_opacity {
                if !(0.0..=1.0).contains(f) {
                    d.error(format!("{path}.fill_opacity"), "must be in [0, 1]");
                }
            }
        }
        ObjectKind::Group { children } => {
            if children.is_empty() {
                d.warning(format!("{path}.children"), "group is empty");
            }
            for (j, c) in children.iter().enumerate() {
                if c == &o.id {
                    d.error(format!("{path}.children[{j}]"), "group contains itself");
                } else if scene.object(c).is_none() {
                    d.error(format!("{path}.children[{j}]"), format!("unknown object '{c}'"));
                }
            }
        }
    }
}

/// Every object may have at most one parent and group nesting must be acyclic.
fn check_group_cycles(d: &mut Diagnostics, scene: &SceneSpec) {
    let mut parent: BTreeMap<&str, &str> = BTreeMap::new();
    for o in &scene.objects {
        if let ObjectKind::Group { children } = &o.kind {
            for c in children {
                if c == &o.id {
                    continue;
                }
                if let Some(prev) = parent.insert(c.as_str(), o.id.as_str()) {
                    if prev != o.id {
                        d.error(
                            format!("scene.objects.{}", o.id),
                            format!("'{c}' already belongs to group '{prev}'"),
                        );
                    }
                }
            }
        }
    }
    for start in parent.keys() {
        let mut cur = *start;
        let mut steps = 0;
        while let Some(p) = parent.get(cur) {
            cur = *p;
            steps += 1;
            if cur == *start || steps > parent.len() {
                d.error(
                    format!("scene.objects.{start}"),
                    "group nesting forms a cycle",
                );
                break;
            }
        }
    }
}

fn check_rate_ref(
    d: &mut Diagnostics,
    path: String,
    r: &RateFunctionRef,
    bridge: &RateFunctionBridge,
) {
    if let Err(e) = bridge.resolve(r) {
        d.error(path, e.to_string());
    }
}

fn check_animation(
    d: &mut Diagnostics,
    path: &str,
    a: &AnimationSpec,
    scene: &SceneSpec,
    bridge: &RateFunctionBridge,
    duration: f64,
) {
    let target = scene.object(&a.target);
    if target.is_none() {
        d.error(format!("{path}.target"), format!("unknown object '{}'", a.target));
    }
    if !a.start.is_finite() || a.start < 0.0 {
        d.error(format!("{path}.start"), "must be finite and >= 0");
    }
    if !a.duration.is_finite() || a.duration <= 0.0 {
        d.error(format!("{path}.duration"), "must be finite and > 0");
    } else if a.end() > duration + 1e-9 {
        d.warning(
            path.to_string(),
            format!("ends at {}s, after the scene ends ({duration}s)", a.end()),
        );
    }
    if let Some(r) = &a.rate_func {
        check_rate_ref(d, format!("{path}.rate_func"), r, bridge);
    }

    match &a.kind {
        AnimationKind::MoveTo { to: v } | AnimationKind::Shift { by: v } => {
            if v.iter().any(|c| !c.is_finite()) {
                d.error(path.to_string(), "vector must be finite");
            }
        }
        AnimationKind::Scale { factor } => {
            if !factor.is_finite() || *factor < 0.0 {
                d.error(format!("{path}.factor"), "must be finite and >= 0");
            }
        }
        AnimationKind::Rotate { angle } => {
            if !angle.is_finite() {
                d.error(format!("{path}.angle"), "must be finite");
            }
        }
        AnimationKind::Property { property, from, to } => {
            if property.trim().is_empty() {
                d.error(format!("{path}.property"), "must be non-empty");
            }
            if !to.is_finite() {
                d.error(format!("{path}.to"), "must be finite");
            }
            if let Some(from) = from {
                if !from.same_shape(to) {
                    d.error(
                        format!("{path}.from"),
                        format!("{} does not match 'to' ({})", from.shape(), to.shape()),
                    );
                }
            }
        }
        AnimationKind::FadeIn | AnimationKind::FadeOut | AnimationKind::Color { .. } => {}
    }

    if let Some(ObjectKind::Group { .. }) = target.map(|t| &t.kind) {
        if matches!(a.kind, AnimationKind::Color { .. }) {
            d.warning(path.to_string(), "color animations on groups have no effect");
        }
    }
}

/// Overlapping animations of the same property on the same target blend unpredictably.
fn check_overlaps(d: &mut Diagnostics, animations: &[AnimationSpec]) {
    for (i, a) in animations.iter().enumerate() {
        for (j, b) in animations.iter().enumerate().skip(i + 1) {
            if a.target == b.target
                && a.kind.property() == b.kind.property()
                && a.start < b.end() - 1e-9
                && b.start < a.end() - 1e-9
            {
                d.warning(
                    format!("scene.animations[{j}]"),
                    format!(
                        "overlaps animations[{i}] on '{}.{}'",
                        a.target,
                        a.kind.property()
                    ),
                );
            }
        }
    }
}

/// Walks the animations in build order (stable by start) and checks that each one writes
/// values of the shape its property already holds.
fn check_property_shapes(d: &mut Diagnostics, scene: &SceneSpec) {
    let mut order: Vec<(usize, &AnimationSpec)> = scene.animations.iter().enumerate().collect();
    order.sort_by(|(_, a), (_, b)| a.start.total_cmp(&b.start));

    let mut known: BTreeMap<(&str, &str), Value> = BTreeMap::new();
    for (i, a) in order {
        let Some(object) = scene.object(&a.target) else {
            continue;
        };
        let property = a.kind.property();
        let key = (a.target.as_str(), property);
        let expected = known
            .get(&key)
            .cloned()
            .or_else(|| initial_value(object, property));
        let written = written_value(&a.kind);
        let path = format!("scene.animations[{i}]");

        match (&expected, &a.kind) {
            (Some(e), _) if !e.same_shape(&written) => {
                let at = match a.kind {
                    AnimationKind::Property { .. } => format!("{path}.to"),
                    _ => path.clone(),
                };
                d.error(
                    at,
                    format!(
                        "writes {} but '{}.{property}' holds {}",
                        written.shape(),
                        a.target,
                        e.shape()
                    ),
                );
                continue;
            }
            (None, AnimationKind::Property { from: None, .. }) => {
                d.error(
                    format!("{path}.from"),
                    format!("required: '{}.{property}' has no earlier value", a.target),
                );
            }
            _ => {}
        }
        known.entry(key).or_insert(written);
    }
}

fn initial_value(o: &ObjectSpec, property: &str) -> Option<Value> {
    match property {
        POSITION => Some(Value::from(o.position)),
        OPACITY => Some(Value::from(o.opacity)),
        SCALE => Some(Value::from(o.scale)),
        ROTATION => Some(Value::from(o.rotation)),
        COLOR => o.color.map(Value::from),
        _ => None,
    }
}

/// A value with the shape `kind` writes to its property.
fn written_value(kind: &AnimationKind) -> Value {
    match kind {
        AnimationKind::FadeIn
        | AnimationKind::FadeOut
        | AnimationKind::Scale { .. }
        | AnimationKind::Rotate { .. } => Value::Scalar(0.0),
        AnimationKind::MoveTo { to } => Value::from(*to),
        AnimationKind::Shift { by } => Value::from(*by),
        AnimationKind::Color { to } => Value::color(*to),
        AnimationKind::Property { to, .. } => to.clone(),
    }
}

fn check_effect(
    d: &mut Diagnostics,
    path: &str,
    e: &EffectSpec,
    scene: &SceneSpec,
    duration: f64,
) {
    if e.kind.trim().is_empty() {
        d.error(format!("{path}.kind"), "must be non-empty");
    }
    if !e.time.is_finite() || e.time < 0.0 {
        d.error(format!("{path}.time"), "must be finite and >= 0");
    } else if e.time > duration {
        d.warning(
            format!("{path}.time"),
            format!("{}s is after the scene ends; the effect never fires", e.time),
        );
    }
    if let Some(dur) = e.duration {
        if !dur.is_finite() || dur < 0.0 {
            d.error(format!("{path}.duration"), "must be finite and >= 0");
        }
    }
    if let Some(t) = &e.target {
        if scene.object(t).is_none() {
            d.error(format!("{path}.target"), format!("unknown object '{t}'"));
        }
    }
    if !e.enabled {
        d.info(path.to_string(), "effect is disabled");
    }
}

fn check_camera(d: &mut Diagnostics, camera: &CameraSpec, bridge: &RateFunctionBridge) {
    if camera.position.iter().any(|c| !c.is_finite()) {
        d.error("scene.camera.position", "must be finite");
    }
    if !camera.zoom.is_finite() || camera.zoom <= 0.0 {
        d.error("scene.camera.zoom", "must be finite and > 0");
    }
    let mut times: Vec<f64> = Vec::new();
    for (i, k) in camera.keyframes.iter().enumerate() {
        let path = format!("scene.camera.keyframes[{i}]");
        if !k.time.is_finite() || k.time < 0.0 {
            d.error(format!("{path}.time"), "must be finite and >= 0");
        } else if times.iter().any(|t| (t - k.time).abs() <= 1e-9) {
            d.error(format!("{path}.time"), format!("duplicate camera key at {}s", k.time));
        } else {
            times.push(k.time);
        }
        if k.position.is_none() && k.zoom.is_none() {
            d.warning(path.clone(), "sets neither position nor zoom");
        }
        if let Some(z) = k.zoom {
            if !z.is_finite() || z <= 0.0 {
                d.error(format!("{path}.zoom"), "must be finite and > 0");
            }
        }
        if let Some(p) = k.position {
            if p.iter().any(|c| !c.is_finite()) {
                d.error(format!("{path}.position"), "must be finite");
            }
        }
        if let Some(r) = &k.rate_func {
            check_rate_ref(d, format!("{path}.rate_func"), r, bridge);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/validate.rs"]
mod tests;
