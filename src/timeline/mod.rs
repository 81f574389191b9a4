//! Timeline model: layers of tracks of keyframed properties, plus one-shot events.

pub mod event;
pub mod inspect;
pub mod keyframe;
pub mod layer;
pub mod track;

use std::collections::BTreeMap;

use crate::{
    animation::value::Value,
    config::RenderConfig,
    foundation::{
        core::{Fps, TIME_EPSILON},
        error::{ChoreoError, ChoreoResult},
    },
};

pub use event::Event;
pub use keyframe::{Keyframe, KeyframeList};
pub use layer::Layer;
pub use track::{Track, TrackKind};

/// Values of one track at a point in time.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TrackState {
    /// Track name.
    pub name: String,
    /// Track kind.
    pub kind: TrackKind,
    /// Property values.
    pub values: BTreeMap<String, Value>,
}

/// Values of one layer at a point in time.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct LayerState {
    /// Layer name.
    pub name: String,
    /// Layer z-index.
    pub z_index: i32,
    /// Unmuted tracks in insertion order.
    pub tracks: Vec<TrackState>,
}

impl LayerState {
    /// State of the named track.
    pub fn track(&self, name: &str) -> Option<&TrackState> {
        self.tracks.iter().find(|t| t.name == name)
    }
}

/// Evaluated timeline at time `time`: active layers in draw order.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TimelineState {
    /// Evaluation time in seconds.
    pub time: f64,
    /// Active layers, back to front.
    pub layers: Vec<LayerState>,
}

impl TimelineState {
    /// State of the named layer, if active.
    pub fn layer(&self, name: &str) -> Option<&LayerState> {
        self.layers.iter().find(|l| l.name == name)
    }
}

/// Owns layers, events and markers over a fixed duration, with a playhead.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Timeline {
    duration: f64,
    fps: Fps,
    #[serde(default)]
    current_time: f64,
    #[serde(default)]
    layers: Vec<Layer>,
    #[serde(default)]
    events: Vec<Event>,
    #[serde(default)]
    markers: BTreeMap<String, f64>,
}

impl Timeline {
    /// Empty timeline of `duration` seconds at the configured frame rate.
    pub fn new(config: &RenderConfig, duration: f64) -> ChoreoResult<Self> {
        check_duration(duration)?;
        Ok(Self {
            duration,
            fps: config.fps,
            current_time: 0.0,
            layers: Vec::new(),
            events: Vec::new(),
            markers: BTreeMap::new(),
        })
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Frame rate.
    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Playhead position in seconds.
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Playhead position as a frame index.
    pub fn current_frame(&self) -> u64 {
        self.fps.secs_to_frames_floor(self.current_time)
    }

    /// Frames needed to cover the duration (at least one).
    pub fn frame_count(&self) -> u64 {
        self.fps.frame_count(self.duration).max(1)
    }

    /// Change the duration; the playhead is clamped into the new range.
    pub fn set_duration(&mut self, duration: f64) -> ChoreoResult<()> {
        check_duration(duration)?;
        self.duration = duration;
        self.current_time = self.current_time.min(duration);
        Ok(())
    }

    /// Layers in insertion order.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Append a layer. Names must be unique.
    pub fn add_layer(&mut self, layer: Layer) -> ChoreoResult<&mut Layer> {
        layer.validate()?;
        if self.layer(&layer.name).is_some() {
            return Err(ChoreoError::timeline(format!(
                "layer '{}' already exists",
                layer.name
            )));
        }
        tracing::debug!(layer = %layer.name, z_index = layer.z_index, "add layer");
        self.layers.push(layer);
        let last = self.layers.len() - 1;
        Ok(&mut self.layers[last])
    }

    /// Remove and return the named layer.
    pub fn remove_layer(&mut self, name: &str) -> Option<Layer> {
        let i = self.layers.iter().position(|l| l.name == name)?;
        Some(self.layers.remove(i))
    }

    /// Named layer.
    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name == name)
    }

    /// Mutable named layer.
    pub fn layer_mut(&mut self, name: &str) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.name == name)
    }

    /// Named layer, or a timeline error.
    pub fn require_layer_mut(&mut self, name: &str) -> ChoreoResult<&mut Layer> {
        self.layer_mut(name)
            .ok_or_else(|| ChoreoError::timeline(format!("unknown layer '{name}'")))
    }

    /// All layers sorted back to front by z-index; ties keep insertion order.
    pub fn layers_in_draw_order(&self) -> Vec<&Layer> {
        let mut out: Vec<&Layer> = self.layers.iter().collect();
        out.sort_by_key(|l| l.z_index);
        out
    }

    /// Layers that take part in evaluation, in draw order.
    ///
    /// A layer is active when visible and, if any layer is solo, itself solo.
    pub fn active_layers(&self) -> Vec<&Layer> {
        let any_solo = self.layers.iter().any(|l| l.solo);
        self.layers_in_draw_order()
            .into_iter()
            .filter(|l| l.visible && (!any_solo || l.solo))
            .collect()
    }

    /// Move the playhead; the target is clamped to `[0, duration]`.
    pub fn seek(&mut self, time: f64) -> ChoreoResult<f64> {
        if !time.is_finite() {
            return Err(ChoreoError::timeline("seek time must be finite"));
        }
        self.current_time = time.clamp(0.0, self.duration);
        Ok(self.current_time)
    }

    /// Move the playhead to the start of `frame`.
    pub fn seek_frame(&mut self, frame: u64) -> f64 {
        self.current_time = self.fps.frames_to_secs(frame).clamp(0.0, self.duration);
        self.current_time
    }

    /// Step the playhead forward one frame. Returns `false` once the end is reached.
    pub fn advance_frame(&mut self) -> bool {
        let next = self.current_frame() + 1;
        if next >= self.frame_count() {
            self.current_time = self.duration;
            return false;
        }
        self.seek_frame(next);
        true
    }

    /// Named time positions.
    pub fn markers(&self) -> &BTreeMap<String, f64> {
        &self.markers
    }

    /// Add or move a marker. Marker times must lie inside the timeline.
    pub fn add_marker(&mut self, name: impl Into<String>, time: f64) -> ChoreoResult<()> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ChoreoError::validation("marker name must be non-empty"));
        }
        if !time.is_finite() || time < 0.0 || time > self.duration + f64::EPSILON {
            return Err(ChoreoError::timeline(format!(
                "marker '{name}' at {time}s is outside [0, {}]",
                self.duration
            )));
        }
        self.markers.insert(name, time);
        Ok(())
    }

    /// Move the playhead to a marker.
    pub fn seek_marker(&mut self, name: &str) -> ChoreoResult<f64> {
        let time = *self
            .markers
            .get(name)
            .ok_or_else(|| ChoreoError::timeline(format!("unknown marker '{name}'")))?;
        self.seek(time)
    }

    /// Events sorted by time.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Schedule an event. Ids must be unique; equal times keep insertion order.
    pub fn add_event(&mut self, event: Event) -> ChoreoResult<()> {
        event.validate()?;
        if self.events.iter().any(|e| e.id == event.id) {
            return Err(ChoreoError::timeline(format!(
                "event '{}' already exists",
                event.id
            )));
        }
        let idx = self.events.partition_point(|e| e.time <= event.time);
        self.events.insert(idx, event);
        Ok(())
    }

    /// Remove and return the event with `id`.
    pub fn remove_event(&mut self, id: &str) -> Option<Event> {
        let i = self.events.iter().position(|e| e.id == id)?;
        Some(self.events.remove(i))
    }

    /// Enabled events with `start <= time < end`.
    ///
    /// Consecutive windows `[a, b)`, `[b, c)` fire each event exactly once.
    pub fn events_between(&self, start: f64, end: f64) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| {
                e.enabled && e.time >= start - TIME_EPSILON && e.time < end - TIME_EPSILON
            })
            .collect()
    }

    /// Events carrying `tag`, enabled or not.
    pub fn events_with_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Event> + 'a {
        self.events.iter().filter(move |e| e.has_tag(tag))
    }

    /// Value of `property` on `layer`/`track` at `t`.
    ///
    /// `Ok(None)` when the property has no keyframes; an error when the layer or track is unknown.
    pub fn get_value_at_time(
        &self,
        layer: &str,
        track: &str,
        property: &str,
        t: f64,
    ) -> ChoreoResult<Option<Value>> {
        let layer = self
            .layer(layer)
            .ok_or_else(|| ChoreoError::timeline(format!("unknown layer '{layer}'")))?;
        let track = layer.track(track).ok_or_else(|| {
            ChoreoError::timeline(format!(
                "layer '{}' has no track '{track}'",
                layer.name
            ))
        })?;
        Ok(track.get_value_at_time(property, t))
    }

    /// Evaluate every active layer and unmuted track at `t`.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn evaluate(&self, t: f64) -> TimelineState {
        let layers = self
            .active_layers()
            .into_iter()
            .map(|layer| LayerState {
                name: layer.name.clone(),
                z_index: layer.z_index,
                tracks: layer
                    .tracks()
                    .iter()
                    .filter(|track| !track.muted)
                    .map(|track| TrackState {
                        name: track.name.clone(),
                        kind: track.kind,
                        values: track.sample(t),
                    })
                    .collect(),
            })
            .collect();
        TimelineState { time: t, layers }
    }

    /// Evaluate at the playhead.
    pub fn evaluate_current(&self) -> TimelineState {
        self.evaluate(self.current_time)
    }

    /// Check cross-cutting invariants (used after deserialization).
    pub fn validate(&self) -> ChoreoResult<()> {
        check_duration(self.duration)?;
        Fps::new(self.fps.num, self.fps.den)?;
        if !(0.0..=self.duration).contains(&self.current_time) {
            return Err(ChoreoError::timeline("playhead is outside the timeline"));
        }
        for (i, layer) in self.layers.iter().enumerate() {
            layer.validate()?;
            if self.layers[..i].iter().any(|l| l.name == layer.name) {
                return Err(ChoreoError::validation(format!(
                    "duplicate layer '{}'",
                    layer.name
                )));
            }
        }
        for (i, event) in self.events.iter().enumerate() {
            event.validate()?;
            if self.events[..i].iter().any(|e| e.id == event.id) {
                return Err(ChoreoError::validation(format!(
                    "duplicate event '{}'",
                    event.id
                )));
            }
        }
        if self.events.windows(2).any(|w| w[1].time < w[0].time) {
            return Err(ChoreoError::validation("events must be sorted by time"));
        }
        Ok(())
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> ChoreoResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and validate a timeline exported with [`Timeline::to_json`].
    pub fn from_json(text: &str) -> ChoreoResult<Self> {
        let timeline: Self = serde_json::from_str(text)?;
        timeline.validate()?;
        Ok(timeline)
    }
}

fn check_duration(duration: f64) -> ChoreoResult<()> {
    if !duration.is_finite() || duration <= 0.0 {
        return Err(ChoreoError::validation(format!(
            "timeline duration must be finite and > 0 (got {duration})"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/timeline.rs"]
mod tests;
