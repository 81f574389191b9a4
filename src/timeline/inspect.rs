//! Timeline debugging: structural summaries, lint warnings and sampled curves.

use std::fmt;

use crate::{
    animation::{ease::RateFunction, value::Value},
    foundation::error::{ChoreoError, ChoreoResult},
    timeline::{Timeline, TrackKind},
};

/// One keyframed property.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct PropertySummary {
    /// Property name.
    pub name: String,
    /// Keyframe count.
    pub keyframes: usize,
    /// First keyframe time.
    pub start: f64,
    /// Last keyframe time.
    pub end: f64,
    /// Value shape, e.g. `vector[3]`.
    pub shape: String,
}

/// One track.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TrackSummary {
    /// Track name.
    pub name: String,
    /// Track kind.
    pub kind: TrackKind,
    /// Muted flag.
    pub muted: bool,
    /// Properties in name order.
    pub properties: Vec<PropertySummary>,
}

/// One layer.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct LayerSummary {
    /// Layer name.
    pub name: String,
    /// Z-index.
    pub z_index: i32,
    /// Visibility flag.
    pub visible: bool,
    /// Lock flag.
    pub locked: bool,
    /// Solo flag.
    pub solo: bool,
    /// Tracks in insertion order.
    pub tracks: Vec<TrackSummary>,
}

/// Structural report over a whole timeline.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TimelineReport {
    /// Duration in seconds.
    pub duration: f64,
    /// Frame rate as a float.
    pub fps: f64,
    /// Frame count.
    pub frame_count: u64,
    /// Layers in draw order.
    pub layers: Vec<LayerSummary>,
    /// Event count.
    pub events: usize,
    /// Marker count.
    pub markers: usize,
    /// Suspicious but legal findings.
    pub warnings: Vec<String>,
}

impl TimelineReport {
    /// Summarise `timeline`.
    pub fn new(timeline: &Timeline) -> Self {
        let duration = timeline.duration();
        let mut warnings = Vec::new();

        let layers = timeline
            .layers_in_draw_order()
            .into_iter()
            .map(|layer| {
                if layer.tracks().is_empty() {
                    warnings.push(format!("layer '{}' has no tracks", layer.name));
                }
                let tracks = layer
                    .tracks()
                    .iter()
                    .map(|track| {
                        if track.keyframe_count() == 0 {
                            warnings.push(format!(
                                "track '{}/{}' has no keyframes",
                                layer.name, track.name
                            ));
                        }
                        let properties = track
                            .properties()
                            .filter_map(|(name, list)| {
                                let (start, end) = list.time_range()?;
                                if end > duration {
                                    warnings.push(format!(
                                        "'{}/{}/{name}' has keyframes after the end ({end}s > {duration}s)",
                                        layer.name, track.name
                                    ));
                                }
                                Some(PropertySummary {
                                    name: name.to_string(),
                                    keyframes: list.len(),
                                    start,
                                    end,
                                    shape: list.keys()[0].value.shape(),
                                })
                            })
                            .collect();
                        TrackSummary {
                            name: track.name.clone(),
                            kind: track.kind,
                            muted: track.muted,
                            properties,
                        }
                    })
                    .collect();
                LayerSummary {
                    name: layer.name.clone(),
                    z_index: layer.z_index,
                    visible: layer.visible,
                    locked: layer.locked,
                    solo: layer.solo,
                    tracks,
                }
            })
            .collect::<Vec<_>>();

        for e in timeline.events() {
            if e.time > duration {
                warnings.push(format!(
                    "event '{}' at {}s never fires (duration {duration}s)",
                    e.id, e.time
                ));
            }
        }
        let solo: Vec<&str> = layers
            .iter()
            .filter(|l| l.solo)
            .map(|l| l.name.as_str())
            .collect();
        if !solo.is_empty() {
            warnings.push(format!("solo active: only {} evaluated", solo.join(", ")));
        }

        Self {
            duration,
            fps: timeline.fps().as_f64(),
            frame_count: timeline.frame_count(),
            layers,
            events: timeline.events().len(),
            markers: timeline.markers().len(),
            warnings,
        }
    }
}

impl fmt::Display for TimelineReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "timeline: {:.3}s @ {:.3} fps ({} frames), {} events, {} markers",
            self.duration, self.fps, self.frame_count, self.events, self.markers
        )?;
        for layer in &self.layers {
            let mut flags = Vec::new();
            if !layer.visible {
                flags.push("hidden");
            }
            if layer.locked {
                flags.push("locked");
            }
            if layer.solo {
                flags.push("solo");
            }
            write!(f, "  layer {} (z={})", layer.name, layer.z_index)?;
            if !flags.is_empty() {
                write!(f, " [{}]", flags.join(", "))?;
            }
            writeln!(f)?;
            for track in &layer.tracks {
                let muted = if track.muted { " [muted]" } else { "" };
                writeln!(f, "    track {} ({:?}){muted}", track.name, track.kind)?;
                for p in &track.properties {
                    writeln!(
                        f,
                        "      {}: {} keys {:.3}s..{:.3}s {}",
                        p.name, p.keyframes, p.start, p.end, p.shape
                    )?;
                }
            }
        }
        for w in &self.warnings {
            writeln!(f, "warning: {w}")?;
        }
        Ok(())
    }
}

/// `samples` evenly spaced values of a property over `[0, duration]`.
pub fn sample_property(
    timeline: &Timeline,
    layer: &str,
    track: &str,
    property: &str,
    samples: usize,
) -> ChoreoResult<Vec<(f64, Value)>> {
    if samples < 2 {
        return Err(ChoreoError::validation("samples must be >= 2"));
    }
    let step = timeline.duration() / (samples - 1) as f64;
    let mut out = Vec::with_capacity(samples);
    for i in 0..samples {
        let t = step * i as f64;
        if let Some(v) = timeline.get_value_at_time(layer, track, property, t)? {
            out.push((t, v));
        }
    }
    Ok(out)
}

/// `samples` evenly spaced `(t, f(t))` points over `[0, 1]`.
pub fn sample_rate_function(f: &RateFunction, samples: usize) -> Vec<(f64, f64)> {
    let n = samples.max(2);
    (0..n)
        .map(|i| {
            let t = i as f64 / (n - 1) as f64;
            (t, f.apply(t))
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/inspect.rs"]
mod tests;
