use crate::{
    foundation::error::{ChoreoError, ChoreoResult},
    timeline::track::Track,
};

fn visible_by_default() -> bool {
    true
}

/// Named, z-ordered container of tracks.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Layer {
    /// Name, unique within its timeline.
    pub name: String,
    /// Hidden layers are not evaluated.
    #[serde(default = "visible_by_default")]
    pub visible: bool,
    /// Locked layers reject track and keyframe edits.
    #[serde(default)]
    pub locked: bool,
    /// When any layer is solo, only solo layers are evaluated.
    #[serde(default)]
    pub solo: bool,
    /// Draw order; higher draws later.
    #[serde(default)]
    pub z_index: i32,
    #[serde(default)]
    tracks: Vec<Track>,
}

impl Layer {
    /// Visible, unlocked layer at z-index 0.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visible: true,
            locked: false,
            solo: false,
            z_index: 0,
            tracks: Vec::new(),
        }
    }

    /// Builder-style z-index.
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Tracks in insertion order.
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Append a track. Names must be unique.
    pub fn add_track(&mut self, track: Track) -> ChoreoResult<&mut Track> {
        self.ensure_unlocked()?;
        if self.track(&track.name).is_some() {
            return Err(ChoreoError::timeline(format!(
                "layer '{}' already has a track named '{}'",
                self.name, track.name
            )));
        }
        self.tracks.push(track);
        let last = self.tracks.len() - 1;
        Ok(&mut self.tracks[last])
    }

    /// Remove and return the named track.
    pub fn remove_track(&mut self, name: &str) -> ChoreoResult<Option<Track>> {
        self.ensure_unlocked()?;
        Ok(self
            .tracks
            .iter()
            .position(|t| t.name == name)
            .map(|i| self.tracks.remove(i)))
    }

    /// Named track.
    pub fn track(&self, name: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.name == name)
    }

    /// Mutable named track; fails on locked layers.
    pub fn track_mut(&mut self, name: &str) -> ChoreoResult<Option<&mut Track>> {
        self.ensure_unlocked()?;
        Ok(self.tracks.iter_mut().find(|t| t.name == name))
    }

    /// Earliest and latest keyframe time across tracks.
    pub fn time_range(&self) -> Option<(f64, f64)> {
        self.tracks
            .iter()
            .filter_map(Track::time_range)
            .reduce(|(a0, a1), (b0, b1)| (a0.min(b0), a1.max(b1)))
    }

    pub(crate) fn validate(&self) -> ChoreoResult<()> {
        if self.name.trim().is_empty() {
            return Err(ChoreoError::validation("layer name must be non-empty"));
        }
        for (i, t) in self.tracks.iter().enumerate() {
            if self.tracks[..i].iter().any(|o| o.name == t.name) {
                return Err(ChoreoError::validation(format!(
                    "layer '{}' has duplicate track '{}'",
                    self.name, t.name
                )));
            }
        }
        Ok(())
    }

    fn ensure_unlocked(&self) -> ChoreoResult<()> {
        if self.locked {
            return Err(ChoreoError::timeline(format!(
                "layer '{}' is locked",
                self.name
            )));
        }
        Ok(())
    }
}
