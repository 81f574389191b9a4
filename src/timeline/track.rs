use std::collections::BTreeMap;

use crate::{
    animation::{ease::RateFunction, value::Value},
    foundation::error::ChoreoResult,
    timeline::keyframe::{Keyframe, KeyframeList},
};

/// What a track drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackKind {
    /// Object properties.
    Animation,
    /// Audio parameters (volume, pan).
    Audio,
    /// Effect parameters.
    Effect,
    /// Camera position/zoom.
    Camera,
    /// Caption text.
    Subtitle,
    /// Annotation-only values.
    Marker,
}

/// Named set of per-property keyframe lists.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Track {
    /// Name, unique within its layer.
    pub name: String,
    /// Track kind.
    pub kind: TrackKind,
    /// Muted tracks are skipped during evaluation.
    #[serde(default)]
    pub muted: bool,
    #[serde(default)]
    properties: BTreeMap<String, KeyframeList>,
}

impl Track {
    /// Empty track.
    pub fn new(name: impl Into<String>, kind: TrackKind) -> Self {
        Self {
            name: name.into(),
            kind,
            muted: false,
            properties: BTreeMap::new(),
        }
    }

    /// Insert a keyframe; the time must be free for `property`.
    pub fn add_keyframe(
        &mut self,
        property: &str,
        time: f64,
        value: impl Into<Value>,
        easing: RateFunction,
    ) -> ChoreoResult<()> {
        let key = Keyframe::new(time, value).with_easing(easing);
        self.properties
            .entry(property.to_string())
            .or_default()
            .insert(key)?;
        Ok(())
    }

    /// Insert or replace a keyframe.
    pub fn set_keyframe(&mut self, property: &str, key: Keyframe) -> ChoreoResult<Option<Keyframe>> {
        self.properties
            .entry(property.to_string())
            .or_default()
            .upsert(key)
    }

    /// Remove the keyframe of `property` at `time`. Empty properties are dropped.
    pub fn remove_keyframe(&mut self, property: &str, time: f64) -> Option<Keyframe> {
        let list = self.properties.get_mut(property)?;
        let removed = list.remove_at(time);
        if list.is_empty() {
            self.properties.remove(property);
        }
        removed
    }

    /// Keyframes of `property`.
    pub fn keyframes(&self, property: &str) -> Option<&KeyframeList> {
        self.properties.get(property)
    }

    /// Mutable keyframes of `property`, created on demand.
    pub fn keyframes_mut(&mut self, property: &str) -> &mut KeyframeList {
        self.properties.entry(property.to_string()).or_default()
    }

    /// Property names in sorted order.
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    /// `(property, keyframes)` pairs in sorted order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &KeyframeList)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Total keyframes across all properties.
    pub fn keyframe_count(&self) -> usize {
        self.properties.values().map(KeyframeList::len).sum()
    }

    /// Earliest and latest keyframe time across properties.
    pub fn time_range(&self) -> Option<(f64, f64)> {
        self.properties
            .values()
            .filter_map(KeyframeList::time_range)
            .reduce(|(a0, a1), (b0, b1)| (a0.min(b0), a1.max(b1)))
    }

    /// Interpolated value of `property` at `t`; `None` when it has no keyframes.
    pub fn get_value_at_time(&self, property: &str, t: f64) -> Option<Value> {
        self.properties.get(property)?.value_at(t)
    }

    /// Every property's value at `t`.
    pub fn sample(&self, t: f64) -> BTreeMap<String, Value> {
        self.properties
            .iter()
            .filter_map(|(name, list)| Some((name.clone(), list.value_at(t)?)))
            .collect()
    }

    /// Shift every keyframe by `delta` seconds.
    pub fn shift(&mut self, delta: f64) -> ChoreoResult<()> {
        for list in self.properties.values_mut() {
            list.shift(delta)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/track.rs"]
mod tests;
