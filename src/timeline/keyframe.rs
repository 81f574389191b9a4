use crate::{
    animation::{
        ease::RateFunction,
        value::{Lerp, Value},
    },
    foundation::core::same_time,
    foundation::error::{ChoreoError, ChoreoResult},
};

/// One anchor point of a property curve.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Keyframe {
    /// Time in seconds (>= 0).
    pub time: f64,
    /// Value at `time`.
    pub value: Value,
    /// Rate function shaping the segment toward the next keyframe.
    #[serde(default)]
    pub easing: RateFunction,
}

impl Keyframe {
    /// Keyframe with linear easing.
    pub fn new(time: f64, value: impl Into<Value>) -> Self {
        Self {
            time,
            value: value.into(),
            easing: RateFunction::linear(),
        }
    }

    /// Replace the outgoing easing.
    pub fn with_easing(mut self, easing: RateFunction) -> Self {
        self.easing = easing;
        self
    }

    fn check(&self) -> ChoreoResult<()> {
        if !self.time.is_finite() || self.time < 0.0 {
            return Err(ChoreoError::timeline(format!(
                "keyframe time must be finite and >= 0 (got {})",
                self.time
            )));
        }
        if !self.value.is_finite() {
            return Err(ChoreoError::timeline(format!(
                "keyframe value at t={} is not finite",
                self.time
            )));
        }
        Ok(())
    }
}

/// Time-ordered keyframes of a single property.
///
/// Invariants: strictly ascending times (no two within `TIME_EPSILON`) and a single value shape.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "Vec<Keyframe>", into = "Vec<Keyframe>")]
pub struct KeyframeList {
    keys: Vec<Keyframe>,
}

impl TryFrom<Vec<Keyframe>> for KeyframeList {
    type Error = ChoreoError;

    fn try_from(keys: Vec<Keyframe>) -> ChoreoResult<Self> {
        let list = Self { keys };
        list.validate()?;
        Ok(list)
    }
}

impl From<KeyframeList> for Vec<Keyframe> {
    fn from(list: KeyframeList) -> Self {
        list.keys
    }
}

impl KeyframeList {
    /// Empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keyframes.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Return `true` when there are no keyframes.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keyframes in time order.
    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    /// First and last keyframe times.
    pub fn time_range(&self) -> Option<(f64, f64)> {
        Some((self.keys.first()?.time, self.keys.last()?.time))
    }

    /// Check ordering, uniqueness and shape invariants.
    pub fn validate(&self) -> ChoreoResult<()> {
        for k in &self.keys {
            k.check()?;
        }
        for w in self.keys.windows(2) {
            if same_time(w[0].time, w[1].time) {
                return Err(ChoreoError::timeline(format!(
                    "duplicate keyframe time {}",
                    w[1].time
                )));
            }
            if w[1].time < w[0].time {
                return Err(ChoreoError::timeline(
                    "keyframes must be sorted by time",
                ));
            }
        }
        if let Some(first) = self.keys.first() {
            if let Some(bad) = self.keys.iter().find(|k| !k.value.same_shape(&first.value)) {
                return Err(shape_error(&first.value, &bad.value, bad.time));
            }
        }
        Ok(())
    }

    /// Insert at the sorted position. A keyframe at an existing time is rejected.
    pub fn insert(&mut self, key: Keyframe) -> ChoreoResult<usize> {
        self.check_insertable(&key)?;
        let idx = self.keys.partition_point(|k| k.time < key.time);
        let clash = |i: usize| self.keys.get(i).is_some_and(|k| same_time(k.time, key.time));
        if clash(idx) || (idx > 0 && clash(idx - 1)) {
            return Err(ChoreoError::timeline(format!(
                "a keyframe already exists at t={}",
                key.time
            )));
        }
        self.keys.insert(idx, key);
        Ok(idx)
    }

    /// Insert, replacing any keyframe at the same time. Returns the replaced keyframe.
    pub fn upsert(&mut self, key: Keyframe) -> ChoreoResult<Option<Keyframe>> {
        self.check_insertable(&key)?;
        if let Some(i) = self.position_of(key.time) {
            return Ok(Some(std::mem::replace(&mut self.keys[i], key)));
        }
        let idx = self.keys.partition_point(|k| k.time < key.time);
        self.keys.insert(idx, key);
        Ok(None)
    }

    /// Remove the keyframe at `time`, if any.
    pub fn remove_at(&mut self, time: f64) -> Option<Keyframe> {
        let i = self.position_of(time)?;
        Some(self.keys.remove(i))
    }

    /// Remove keyframes strictly inside `(start, end)`. Returns how many were removed.
    pub fn remove_between(&mut self, start: f64, end: f64) -> usize {
        let before = self.keys.len();
        self.keys.retain(|k| {
            let inside = k.time > start && k.time < end;
            !inside || same_time(k.time, start) || same_time(k.time, end)
        });
        before - self.keys.len()
    }

    /// Shift every keyframe by `delta` seconds.
    pub fn shift(&mut self, delta: f64) -> ChoreoResult<()> {
        if !delta.is_finite() {
            return Err(ChoreoError::timeline("shift delta must be finite"));
        }
        if let Some(first) = self.keys.first() {
            if first.time + delta < 0.0 {
                return Err(ChoreoError::timeline(
                    "shift would move keyframes before t=0",
                ));
            }
        }
        for k in &mut self.keys {
            k.time += delta;
        }
        Ok(())
    }

    /// Interpolated value at `t`.
    ///
    /// `None` without keyframes; the first/last value outside the keyframe range; the exact
    /// keyframe value when `t` lands on a keyframe; otherwise the outgoing keyframe's easing
    /// applied between the two bracketing keyframes. Discrete values hold the left keyframe
    /// until the right keyframe's time, whatever the easing returns.
    pub fn value_at(&self, t: f64) -> Option<Value> {
        let first = self.keys.first()?;
        let idx = self.keys.partition_point(|k| k.time <= t);

        if idx == 0 {
            return Some(first.value.clone());
        }
        if idx >= self.keys.len() {
            return self.keys.last().map(|k| k.value.clone());
        }

        let a = &self.keys[idx - 1];
        let b = &self.keys[idx];
        if same_time(t, a.time) {
            return Some(a.value.clone());
        }
        if same_time(t, b.time) {
            return Some(b.value.clone());
        }
        if a.value.is_discrete() || !a.value.same_shape(&b.value) {
            return Some(a.value.clone());
        }

        let local = (t - a.time) / (b.time - a.time);
        let eased = a.easing.apply(local);
        Some(Value::lerp(&a.value, &b.value, eased))
    }

    fn position_of(&self, time: f64) -> Option<usize> {
        self.keys.iter().position(|k| same_time(k.time, time))
    }

    fn check_insertable(&self, key: &Keyframe) -> ChoreoResult<()> {
        key.check()?;
        match self.keys.first() {
            Some(first) if !first.value.same_shape(&key.value) => {
                Err(shape_error(&first.value, &key.value, key.time))
            }
            _ => Ok(()),
        }
    }
}

fn shape_error(expected: &Value, got: &Value, time: f64) -> ChoreoError {
    ChoreoError::timeline(format!(
        "keyframe at t={time} holds {} but the property holds {}",
        got.shape(),
        expected.shape()
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/keyframe.rs"]
mod tests;
